//! The resolver facade: the per-rrtype surface of the platform resolver,
//! answered over DoH.

pub mod any;
pub mod lookup;
pub mod project;
pub mod reverse;

use crate::cache::{cache_key, entry, CacheStore, MemoryCache};
use crate::codec::{spoof_response, AnswerData, DecodedResponse};
use crate::engine::QueryEngine;
use crate::hosts::load_hosts;
use crate::rotation::ServerSet;
use crate::transport::{DohTransport, HttpsTransport};
use dashmap::DashMap;
use ember_dns_domain::{
    AnyRecord, CaaRecord, CertRecord, DnsError, DnsQuery, EcsSubnet, ErrorCode, HostAddress,
    HostsTable, MxRecord, NaptrRecord, RecordType, ResolveError, ResolverConfig, SoaRecord,
    SrvRecord, TlsaRecord,
};
use rustc_hash::FxBuildHasher;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// `lookup` hint flags, with the platform `AI_*` values.
pub const V4MAPPED: u32 = 8;
pub const ALL: u32 = 16;
pub const ADDRCONFIG: u32 = 32;

/// Per-call options for the `resolve*` family.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Include per-answer TTLs in `resolve4`/`resolve6` results.
    pub ttl: bool,
    /// EDNS client-subnet hint; also partitions the cache key.
    pub ecs_subnet: Option<String>,
    /// Skip any cached entry and overwrite it after resolution.
    pub purge_cache: bool,
    /// Treat an empty answer set as an empty list instead of `NODATA`.
    /// `lookup` composes its A/AAAA halves with this; rarely useful
    /// directly.
    pub no_throw_on_nodata: bool,
}

/// Per-call options for `lookup`.
#[derive(Debug, Clone, Default)]
pub struct LookupOptions {
    /// 0 (both), 4 or 6.
    pub family: u8,
    /// Bitmask of [`ADDRCONFIG`], [`V4MAPPED`], [`ALL`].
    pub hints: u32,
    /// Return every address instead of the first.
    pub all: bool,
    /// Skip the ipv4first ordering; `None` defers to the resolver's
    /// `dns_order`.
    pub verbatim: Option<bool>,
    pub purge_cache: bool,
}

impl LookupOptions {
    pub fn family(family: u8) -> Self {
        Self {
            family,
            ..Default::default()
        }
    }
}

/// Reply of the string-typed `resolve`.
#[derive(Debug, Clone, PartialEq)]
pub enum RrAnswers {
    A(Vec<HostAddress>),
    Aaaa(Vec<HostAddress>),
    Caa(Vec<CaaRecord>),
    Cert(Vec<CertRecord>),
    Cname(Vec<String>),
    Mx(Vec<MxRecord>),
    Naptr(Vec<NaptrRecord>),
    Ns(Vec<String>),
    Ptr(Vec<String>),
    Soa(SoaRecord),
    Srv(Vec<SrvRecord>),
    Tlsa(Vec<TlsaRecord>),
    Txt(Vec<Vec<String>>),
    Any(Vec<AnyRecord>),
}

/// Registry of cancellation handles for in-flight operations.
struct ActiveHandles {
    map: DashMap<u64, CancellationToken, FxBuildHasher>,
    next: AtomicU64,
}

impl ActiveHandles {
    fn new() -> Self {
        Self {
            map: DashMap::with_hasher(FxBuildHasher),
            next: AtomicU64::new(0),
        }
    }

    fn register(&self, token: CancellationToken) -> u64 {
        let id = self.next.fetch_add(1, Ordering::Relaxed);
        self.map.insert(id, token);
        id
    }

    fn deregister(&self, id: u64) {
        self.map.remove(&id);
    }

    fn cancel_all(&self) {
        self.map.retain(|_, token| {
            token.cancel();
            false
        });
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}

/// Deregisters the handle when the operation settles, cancelled or not.
struct HandleGuard<'a> {
    handles: &'a ActiveHandles,
    id: u64,
}

impl Drop for HandleGuard<'_> {
    fn drop(&mut self) {
        self.handles.deregister(self.id);
    }
}

/// A DNS-over-HTTPS stub resolver with the platform resolver's surface.
///
/// Safe to share (`Arc`) and to call concurrently; no locks are held across
/// I/O.
pub struct Resolver {
    config: ResolverConfig,
    servers: Arc<ServerSet>,
    transport: Arc<dyn DohTransport>,
    cache: Option<Arc<dyn CacheStore>>,
    hosts: HostsTable,
    active: ActiveHandles,
}

impl Resolver {
    pub fn new() -> Result<Self, DnsError> {
        Self::with_config(ResolverConfig::default())
    }

    pub fn with_config(mut config: ResolverConfig) -> Result<Self, DnsError> {
        config.validate()?;

        let servers = Arc::new(ServerSet::new(config.servers.clone())?);
        let transport: Arc<dyn DohTransport> = Arc::new(HttpsTransport::new(&config)?);
        let cache: Option<Arc<dyn CacheStore>> = config
            .cache_enabled
            .then(|| Arc::new(MemoryCache::new()) as Arc<dyn CacheStore>);
        let hosts = load_hosts(config.hosts_path.as_deref());

        Ok(Self {
            config,
            servers,
            transport,
            cache,
            hosts,
            active: ActiveHandles::new(),
        })
    }

    /// Swap in a different cache backend.
    pub fn with_cache(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(store);
        self
    }

    /// Swap in a different transport (tests, exotic deployments).
    pub fn with_transport(mut self, transport: Arc<dyn DohTransport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn cache(&self) -> Option<&Arc<dyn CacheStore>> {
        self.cache.as_ref()
    }

    pub fn hosts_table(&self) -> &HostsTable {
        &self.hosts
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn set_servers(&self, servers: Vec<String>) -> Result<(), DnsError> {
        self.servers.set(servers)?;
        Ok(())
    }

    pub fn get_servers(&self) -> Vec<String> {
        self.servers.snapshot()
    }

    /// Cancel every in-flight operation and empty the handle set. Further
    /// resolves get fresh handles.
    pub fn cancel(&self) {
        self.active.cancel_all();
    }

    /// Number of currently-active cancellation handles.
    pub fn active_handles(&self) -> usize {
        self.active.len()
    }

    fn engine(&self) -> QueryEngine {
        QueryEngine::new(
            Arc::clone(&self.transport),
            Arc::clone(&self.servers),
            self.config.timeout_ms,
            self.config.tries,
            self.config.smart_rotate,
            self.config.query_id,
        )
    }

    /// Seed the cache with a synthesized response, bypassing the network.
    /// The test seam behind spoofed-answer flows.
    pub async fn spoof_cache(&self, name: &str, rrtype: RecordType, data: Vec<AnswerData>) {
        let Some(store) = &self.cache else {
            warn!("spoof_cache called with cache disabled");
            return;
        };
        let response = spoof_response(name, rrtype, data);
        let enriched = entry::enrich(
            response,
            self.config.default_ttl_seconds,
            self.config.max_ttl_seconds,
            entry::now_epoch_ms(),
        );
        let ttl = Duration::from_secs(u64::from(enriched.ttl.unwrap_or(1)));
        let key = cache_key(rrtype, None, name);
        match serde_json::to_value(&enriched) {
            Ok(value) => store.set(&key, value, ttl).await,
            Err(e) => warn!(error = %e, "Failed to serialize spoofed response"),
        }
    }

    /// The shared pipeline: cache read, engine execution, cache write,
    /// rcode mapping. Returns the decoded (possibly cached) response.
    pub(crate) async fn resolve_decoded(
        &self,
        name: &str,
        rrtype: RecordType,
        opts: &ResolveOptions,
        parent: Option<&CancellationToken>,
    ) -> Result<DecodedResponse, DnsError> {
        let syscall = format!("query{}", rrtype.syscall_suffix());
        validate_name(name, &syscall)?;

        let ecs = match &opts.ecs_subnet {
            Some(raw) => Some(raw.parse::<EcsSubnet>()?),
            None => None,
        };
        let query = DnsQuery::new(name, rrtype).with_ecs(ecs);

        let response = self.run_query(&query, opts, parent).await?;

        if let Some(code) = map_rcode(&response.rcode) {
            return Err(ResolveError::new(
                code,
                query.syscall(),
                name,
                format!("server answered {}", response.rcode),
            )
            .into());
        }

        Ok(response)
    }

    async fn run_query(
        &self,
        query: &DnsQuery,
        opts: &ResolveOptions,
        parent: Option<&CancellationToken>,
    ) -> Result<DecodedResponse, ResolveError> {
        let key = cache_key(query.record_type, query.ecs.as_ref(), &query.name);

        if !opts.purge_cache {
            if let Some(store) = &self.cache {
                if let Some(value) = store.get(&key).await {
                    if let Some(response) = entry::revive(value, entry::now_epoch_ms()) {
                        debug!(key = %key, "Cache hit");
                        return Ok(response);
                    }
                    debug!(key = %key, "Cache entry expired");
                }
            }
        }

        let token = match parent {
            Some(parent) => parent.child_token(),
            None => CancellationToken::new(),
        };
        let _guard = HandleGuard {
            handles: &self.active,
            id: self.active.register(token.clone()),
        };

        let result = self.engine().execute(query, &token).await;

        let response = match result {
            Ok(response) => response,
            Err(mut error) => {
                if !self.config.return_http_errors {
                    error.http = None;
                }
                return Err(error);
            }
        };

        if response.rcode != "NOERROR" {
            return Ok(response);
        }

        if response.flags.tc {
            debug!(key = %key, "Truncated response, not caching");
            return Ok(response);
        }

        let Some(store) = &self.cache else {
            return Ok(response);
        };

        let enriched = entry::enrich(
            response,
            self.config.default_ttl_seconds,
            self.config.max_ttl_seconds,
            entry::now_epoch_ms(),
        );
        let ttl = Duration::from_secs(u64::from(enriched.ttl.unwrap_or(1)));
        match serde_json::to_value(&enriched) {
            Ok(value) => store.set(&key, value, ttl).await,
            // Cache trouble is logged, never surfaced over a good answer.
            Err(e) => warn!(key = %key, error = %e, "Failed to serialize cache entry"),
        }

        Ok(enriched)
    }

    fn nodata_guard(
        &self,
        count: usize,
        name: &str,
        rrtype: RecordType,
        opts: &ResolveOptions,
    ) -> Result<(), DnsError> {
        if count == 0 && !opts.no_throw_on_nodata {
            return Err(ResolveError::new(
                ErrorCode::NoData,
                format!("query{}", rrtype.syscall_suffix()),
                name,
                "empty answer set",
            )
            .into());
        }
        Ok(())
    }

    pub async fn resolve4(
        &self,
        name: &str,
        opts: &ResolveOptions,
    ) -> Result<Vec<HostAddress>, DnsError> {
        let response = self.resolve_decoded(name, RecordType::A, opts, None).await?;
        let out = project::addresses(&response, RecordType::A, opts.ttl);
        self.nodata_guard(out.len(), name, RecordType::A, opts)?;
        Ok(out)
    }

    pub async fn resolve6(
        &self,
        name: &str,
        opts: &ResolveOptions,
    ) -> Result<Vec<HostAddress>, DnsError> {
        let response = self
            .resolve_decoded(name, RecordType::AAAA, opts, None)
            .await?;
        let out = project::addresses(&response, RecordType::AAAA, opts.ttl);
        self.nodata_guard(out.len(), name, RecordType::AAAA, opts)?;
        Ok(out)
    }

    pub async fn resolve_cname(
        &self,
        name: &str,
        opts: &ResolveOptions,
    ) -> Result<Vec<String>, DnsError> {
        let response = self
            .resolve_decoded(name, RecordType::CNAME, opts, None)
            .await?;
        let out = project::names(&response, RecordType::CNAME);
        self.nodata_guard(out.len(), name, RecordType::CNAME, opts)?;
        Ok(out)
    }

    pub async fn resolve_ns(
        &self,
        name: &str,
        opts: &ResolveOptions,
    ) -> Result<Vec<String>, DnsError> {
        let response = self
            .resolve_decoded(name, RecordType::NS, opts, None)
            .await?;
        let out = project::names(&response, RecordType::NS);
        self.nodata_guard(out.len(), name, RecordType::NS, opts)?;
        Ok(out)
    }

    pub async fn resolve_ptr(
        &self,
        name: &str,
        opts: &ResolveOptions,
    ) -> Result<Vec<String>, DnsError> {
        let response = self
            .resolve_decoded(name, RecordType::PTR, opts, None)
            .await?;
        let out = project::names(&response, RecordType::PTR);
        self.nodata_guard(out.len(), name, RecordType::PTR, opts)?;
        Ok(out)
    }

    pub async fn resolve_mx(
        &self,
        name: &str,
        opts: &ResolveOptions,
    ) -> Result<Vec<MxRecord>, DnsError> {
        let response = self
            .resolve_decoded(name, RecordType::MX, opts, None)
            .await?;
        let out = project::mx(&response);
        self.nodata_guard(out.len(), name, RecordType::MX, opts)?;
        Ok(out)
    }

    pub async fn resolve_txt(
        &self,
        name: &str,
        opts: &ResolveOptions,
    ) -> Result<Vec<Vec<String>>, DnsError> {
        let response = self
            .resolve_decoded(name, RecordType::TXT, opts, None)
            .await?;
        let out = project::txt(&response);
        self.nodata_guard(out.len(), name, RecordType::TXT, opts)?;
        Ok(out)
    }

    pub async fn resolve_soa(
        &self,
        name: &str,
        opts: &ResolveOptions,
    ) -> Result<SoaRecord, DnsError> {
        let response = self
            .resolve_decoded(name, RecordType::SOA, opts, None)
            .await?;
        let mut records = project::soa(&response);
        self.nodata_guard(records.len(), name, RecordType::SOA, opts)?;
        if records.len() > 1 {
            debug!(name = %name, count = records.len(), "Multiple SOA answers, keeping the first");
        }
        Ok(records.remove(0))
    }

    pub async fn resolve_srv(
        &self,
        name: &str,
        opts: &ResolveOptions,
    ) -> Result<Vec<SrvRecord>, DnsError> {
        let response = self
            .resolve_decoded(name, RecordType::SRV, opts, None)
            .await?;
        let out = project::srv(&response);
        self.nodata_guard(out.len(), name, RecordType::SRV, opts)?;
        Ok(out)
    }

    pub async fn resolve_caa(
        &self,
        name: &str,
        opts: &ResolveOptions,
    ) -> Result<Vec<CaaRecord>, DnsError> {
        let response = self
            .resolve_decoded(name, RecordType::CAA, opts, None)
            .await?;
        let out = project::caa(&response);
        self.nodata_guard(out.len(), name, RecordType::CAA, opts)?;
        Ok(out)
    }

    pub async fn resolve_naptr(
        &self,
        name: &str,
        opts: &ResolveOptions,
    ) -> Result<Vec<NaptrRecord>, DnsError> {
        let response = self
            .resolve_decoded(name, RecordType::NAPTR, opts, None)
            .await?;
        let out = project::naptr(&response);
        self.nodata_guard(out.len(), name, RecordType::NAPTR, opts)?;
        Ok(out)
    }

    pub async fn resolve_cert(
        &self,
        name: &str,
        opts: &ResolveOptions,
    ) -> Result<Vec<CertRecord>, DnsError> {
        let response = self
            .resolve_decoded(name, RecordType::CERT, opts, None)
            .await?;
        let out = project::cert(&response);
        self.nodata_guard(out.len(), name, RecordType::CERT, opts)?;
        Ok(out)
    }

    pub async fn resolve_tlsa(
        &self,
        name: &str,
        opts: &ResolveOptions,
    ) -> Result<Vec<TlsaRecord>, DnsError> {
        let response = self
            .resolve_decoded(name, RecordType::TLSA, opts, None)
            .await?;
        let out = project::tlsa(&response);
        self.nodata_guard(out.len(), name, RecordType::TLSA, opts)?;
        Ok(out)
    }

    /// String-typed entry point: dispatches on `rrtype` after checking it
    /// against the registry.
    pub async fn resolve(
        &self,
        name: &str,
        rrtype: &str,
        opts: &ResolveOptions,
    ) -> Result<RrAnswers, DnsError> {
        let rrtype: RecordType = rrtype.parse().map_err(|e: String| {
            DnsError::Argument(ember_dns_domain::ArgumentError::InvalidArgValue(e))
        })?;

        Ok(match rrtype {
            RecordType::A => RrAnswers::A(self.resolve4(name, opts).await?),
            RecordType::AAAA => RrAnswers::Aaaa(self.resolve6(name, opts).await?),
            RecordType::CAA => RrAnswers::Caa(self.resolve_caa(name, opts).await?),
            RecordType::CERT => RrAnswers::Cert(self.resolve_cert(name, opts).await?),
            RecordType::CNAME => RrAnswers::Cname(self.resolve_cname(name, opts).await?),
            RecordType::MX => RrAnswers::Mx(self.resolve_mx(name, opts).await?),
            RecordType::NAPTR => RrAnswers::Naptr(self.resolve_naptr(name, opts).await?),
            RecordType::NS => RrAnswers::Ns(self.resolve_ns(name, opts).await?),
            RecordType::PTR => RrAnswers::Ptr(self.resolve_ptr(name, opts).await?),
            RecordType::SOA => RrAnswers::Soa(self.resolve_soa(name, opts).await?),
            RecordType::SRV => RrAnswers::Srv(self.resolve_srv(name, opts).await?),
            RecordType::TLSA => RrAnswers::Tlsa(self.resolve_tlsa(name, opts).await?),
            RecordType::TXT => RrAnswers::Txt(self.resolve_txt(name, opts).await?),
            RecordType::ANY => RrAnswers::Any(self.resolve_any(name, opts).await?),
        })
    }
}

/// Reject names the resolver never puts on the wire: a leading dot (other
/// than the bare root, which `lookup` handles) or consecutive dots.
pub(crate) fn validate_name(name: &str, syscall: &str) -> Result<(), ResolveError> {
    if name.is_empty() || name.starts_with('.') || name.contains("..") {
        return Err(ResolveError::new(
            ErrorCode::BadName,
            syscall,
            name,
            format!("malformed name: {name:?}"),
        ));
    }
    Ok(())
}

fn map_rcode(rcode: &str) -> Option<ErrorCode> {
    match rcode {
        "NOERROR" => None,
        "FORMERR" => Some(ErrorCode::FormErr),
        "SERVFAIL" => Some(ErrorCode::ServFail),
        "NXDOMAIN" => Some(ErrorCode::NotFound),
        "NOTIMP" => Some(ErrorCode::NotImp),
        "REFUSED" => Some(ErrorCode::Refused),
        _ => Some(ErrorCode::BadResp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_name_rules() {
        assert!(validate_name("example.com", "queryA").is_ok());
        assert!(validate_name("sub.example.com", "queryA").is_ok());
        assert!(validate_name(".", "queryA").is_err());
        assert!(validate_name(".example.com", "queryA").is_err());
        assert!(validate_name("a..b", "queryA").is_err());
        assert!(validate_name("", "queryA").is_err());
    }

    #[test]
    fn rcode_mapping_matches_taxonomy() {
        assert_eq!(map_rcode("NOERROR"), None);
        assert_eq!(map_rcode("FORMERR"), Some(ErrorCode::FormErr));
        assert_eq!(map_rcode("SERVFAIL"), Some(ErrorCode::ServFail));
        assert_eq!(map_rcode("NXDOMAIN"), Some(ErrorCode::NotFound));
        assert_eq!(map_rcode("NOTIMP"), Some(ErrorCode::NotImp));
        assert_eq!(map_rcode("REFUSED"), Some(ErrorCode::Refused));
        assert_eq!(map_rcode("YXDOMAIN"), Some(ErrorCode::BadResp));
    }

    #[test]
    fn handle_registry_cancels_and_empties() {
        let handles = ActiveHandles::new();
        let a = CancellationToken::new();
        let b = CancellationToken::new();
        handles.register(a.clone());
        handles.register(b.clone());
        assert_eq!(handles.len(), 2);

        handles.cancel_all();
        assert_eq!(handles.len(), 0);
        assert!(a.is_cancelled());
        assert!(b.is_cancelled());
    }

    #[test]
    fn handle_guard_deregisters_on_drop() {
        let handles = ActiveHandles::new();
        let id = handles.register(CancellationToken::new());
        {
            let _guard = HandleGuard {
                handles: &handles,
                id,
            };
            assert_eq!(handles.len(), 1);
        }
        assert_eq!(handles.len(), 0);
    }
}
