use compact_str::{format_compact, CompactString};
use ember_dns_domain::{EcsSubnet, RecordType};

/// Cache key: `rrtype:[ecs:]name`, lowercased. The ECS segment partitions
/// entries so subnet-scoped answers never leak across clients.
pub fn cache_key(rrtype: RecordType, ecs: Option<&EcsSubnet>, name: &str) -> CompactString {
    let rrtype = rrtype.as_str().to_ascii_lowercase();
    let name = name.to_ascii_lowercase();
    match ecs {
        Some(subnet) => format_compact!("{}:{}:{}", rrtype, subnet, name),
        None => format_compact!("{}:{}", rrtype, name),
    }
}
