use crate::ecs::EcsSubnet;
use crate::record_type::RecordType;
use std::sync::Arc;

/// One immutable query tuple.
#[derive(Debug, Clone)]
pub struct DnsQuery {
    pub name: Arc<str>,
    pub record_type: RecordType,
    pub ecs: Option<EcsSubnet>,
}

impl DnsQuery {
    pub fn new(name: impl Into<Arc<str>>, record_type: RecordType) -> Self {
        Self {
            name: name.into(),
            record_type,
            ecs: None,
        }
    }

    pub fn with_ecs(mut self, ecs: Option<EcsSubnet>) -> Self {
        self.ecs = ecs;
        self
    }

    /// `syscall` label for errors raised on behalf of this query.
    pub fn syscall(&self) -> String {
        format!("query{}", self.record_type.syscall_suffix())
    }
}
