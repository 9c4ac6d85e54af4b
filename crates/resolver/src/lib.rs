//! A DNS-over-HTTPS stub resolver (RFC 8484) with the surface of the
//! platform resolver API: per-rrtype `resolve*` operations, a composite
//! `ANY`, `lookup`, `reverse` and `lookup_service`, backed by a TTL-aware
//! pluggable cache and smart server rotation.

pub mod cache;
pub mod classify;
pub mod codec;
pub mod engine;
pub mod hosts;
pub mod resolver;
pub mod rotation;
pub mod system;
pub mod transport;

pub use cache::{cache_key, CacheStore, MemoryCache};
pub use codec::{spoof_response, Answer, AnswerData, DecodedResponse, ResponseFlags};
pub use resolver::{
    LookupOptions, ResolveOptions, Resolver, RrAnswers, ADDRCONFIG, ALL, V4MAPPED,
};
pub use rotation::ServerSet;
pub use transport::{DohTransport, HttpsTransport, TransportError};

pub use ember_dns_domain as domain;
