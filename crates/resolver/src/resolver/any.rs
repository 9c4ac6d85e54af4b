//! `resolve_any`: bounded-concurrency fan-out over the fixed type vector.

use super::{project, validate_name, HandleGuard, ResolveOptions, Resolver};
use crate::codec::DecodedResponse;
use ember_dns_domain::{AnyRecord, DnsError, ErrorCode, RecordType, ANY_TYPES};
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

impl Resolver {
    /// Resolve the composite `ANY` by querying every type in the fixed
    /// vector with at most `concurrency` children in flight.
    ///
    /// Output order follows the type vector, not completion order. A child
    /// coming back empty contributes nothing; a child failure other than
    /// `NODATA` cancels the remaining children and propagates.
    pub async fn resolve_any(
        &self,
        name: &str,
        opts: &ResolveOptions,
    ) -> Result<Vec<AnyRecord>, DnsError> {
        validate_name(name, "queryAny")?;

        let parent = CancellationToken::new();
        let _guard = HandleGuard {
            handles: &self.active,
            id: self.active.register(parent.clone()),
        };
        let shared = parent.child_token();

        let child_opts = ResolveOptions {
            ttl: false,
            ecs_subnet: opts.ecs_subnet.clone(),
            purge_cache: opts.purge_cache,
            no_throw_on_nodata: true,
        };

        let mut children = stream::iter(ANY_TYPES.into_iter().map(|rrtype| {
            let shared = shared.clone();
            let child_opts = child_opts.clone();
            async move { self.any_child(name, rrtype, &child_opts, &shared).await }
        }))
        .buffered(self.config.concurrency);

        let mut out = Vec::new();
        while let Some(result) = children.next().await {
            match result {
                Ok(mut records) => out.append(&mut records),
                Err(error) => {
                    debug!(name = %name, error = %error, "ANY child failed, cancelling siblings");
                    shared.cancel();
                    return Err(error);
                }
            }
        }

        Ok(out)
    }

    async fn any_child(
        &self,
        name: &str,
        rrtype: RecordType,
        opts: &ResolveOptions,
        parent: &CancellationToken,
    ) -> Result<Vec<AnyRecord>, DnsError> {
        let response = match self.resolve_decoded(name, rrtype, opts, Some(parent)).await {
            Ok(response) => response,
            Err(DnsError::Resolve(e)) if e.code == ErrorCode::NoData => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        Ok(tag_answers(&response, rrtype))
    }
}

fn tag_answers(response: &DecodedResponse, rrtype: RecordType) -> Vec<AnyRecord> {
    match rrtype {
        RecordType::A => project::addresses(response, rrtype, true)
            .into_iter()
            .map(|a| AnyRecord::A {
                address: a.address,
                ttl: a.ttl.unwrap_or(0),
            })
            .collect(),
        RecordType::AAAA => project::addresses(response, rrtype, true)
            .into_iter()
            .map(|a| AnyRecord::AAAA {
                address: a.address,
                ttl: a.ttl.unwrap_or(0),
            })
            .collect(),
        RecordType::CNAME => project::names(response, rrtype)
            .into_iter()
            .map(|value| AnyRecord::CNAME { value })
            .collect(),
        RecordType::MX => project::mx(response)
            .into_iter()
            .map(|r| AnyRecord::MX {
                exchange: r.exchange,
                priority: r.priority,
            })
            .collect(),
        RecordType::NAPTR => project::naptr(response)
            .into_iter()
            .map(|value| AnyRecord::NAPTR { value })
            .collect(),
        RecordType::NS => project::names(response, rrtype)
            .into_iter()
            .map(|value| AnyRecord::NS { value })
            .collect(),
        RecordType::PTR => project::names(response, rrtype)
            .into_iter()
            .map(|value| AnyRecord::PTR { value })
            .collect(),
        RecordType::SOA => project::soa(response)
            .into_iter()
            .take(1)
            .map(|record| AnyRecord::SOA { record })
            .collect(),
        RecordType::SRV => project::srv(response)
            .into_iter()
            .map(|value| AnyRecord::SRV { value })
            .collect(),
        RecordType::TXT => project::txt(response)
            .into_iter()
            .map(|entries| AnyRecord::TXT { entries })
            .collect(),
        // Not part of the ANY vector.
        _ => Vec::new(),
    }
}
