pub mod config;
pub mod ecs;
pub mod errors;
pub mod hosts;
pub mod query;
pub mod record_data;
pub mod record_type;
pub mod services;

pub use config::{DnsOrder, DohProtocol, HttpMethod, QueryIdMode, ResolverConfig};
pub use ecs::EcsSubnet;
pub use errors::{ArgumentError, DnsError, ErrorCode, HttpErrorDetail, ResolveError};
pub use hosts::{HostsRule, HostsTable};
pub use query::DnsQuery;
pub use record_data::{
    cert_type_name, AnyRecord, CaaRecord, CertRecord, HostAddress, LookupAddress, MxRecord,
    NaptrRecord, ServiceInfo, SoaRecord, SrvRecord, TlsaRecord,
};
pub use record_type::{RecordType, ANY_TYPES};
pub use services::service_for_port;
