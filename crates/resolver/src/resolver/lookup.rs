//! `lookup`: hostname to address with the platform `getaddrinfo` contract.

use super::{LookupOptions, ResolveOptions, Resolver, ADDRCONFIG, ALL, V4MAPPED};
use crate::system;
use ember_dns_domain::{
    DnsError, DnsOrder, ErrorCode, LookupAddress, RecordType, ResolveError,
};
use std::net::IpAddr;
use tracing::debug;

const GETADDRINFO: &str = "getaddrinfo";

/// Outcome of one family's branch: addresses, or the error it failed with.
type FamilyOutcome = Result<Vec<IpAddr>, ResolveError>;

impl Resolver {
    /// Resolve `name` to one address (or all of them with `all`), honoring
    /// hosts-file entries, IP literals, family filters, hints and ordering.
    ///
    /// Returns a single-element vector unless `all` (or the `ALL` hint) is
    /// set.
    pub async fn lookup(
        &self,
        name: &str,
        options: &LookupOptions,
    ) -> Result<Vec<LookupAddress>, DnsError> {
        let mut opts = options.clone();

        if name == "." {
            // The bare root is an authoritative "not found" for lookup.
            return Err(ResolveError::new(
                ErrorCode::NotFound,
                GETADDRINFO,
                name,
                "the root name has no addresses",
            )
            .into());
        }
        if name.is_empty() || name.starts_with('.') || name.contains("..") {
            return Err(ResolveError::new(
                ErrorCode::BadName,
                GETADDRINFO,
                name,
                format!("malformed name: {name:?}"),
            )
            .into());
        }
        if !matches!(opts.family, 0 | 4 | 6) {
            return Err(ResolveError::new(
                ErrorCode::BadFamily,
                GETADDRINFO,
                name,
                format!("family must be 0, 4 or 6, got {}", opts.family),
            )
            .into());
        }
        if opts.hints & !(ADDRCONFIG | V4MAPPED | ALL) != 0 {
            return Err(ResolveError::new(
                ErrorCode::BadFlags,
                GETADDRINFO,
                name,
                format!("unknown hint bits in {:#x}", opts.hints),
            )
            .into());
        }

        // ADDRCONFIG narrows the family before dispatch: a family with no
        // non-loopback route is never queried.
        if opts.hints & ADDRCONFIG != 0 {
            match system::configured_families() {
                (true, false) => opts.family = 4,
                (false, true) => opts.family = 6,
                _ => {}
            }
        }
        if opts.hints & ALL != 0 {
            opts.all = true;
        }

        let (seed_v4, seed_v6) = self.seed_buckets(name);
        let (v4, v6) = self.dispatch(name, &opts, seed_v4, seed_v6).await;

        let mut answers: Vec<IpAddr> = Vec::new();
        let mut errors: Vec<ResolveError> = Vec::new();
        let mut v4_count = 0usize;
        let mut v6_count = 0usize;

        match v4 {
            Ok(addrs) => {
                v4_count = addrs.len();
                answers.extend(addrs);
            }
            Err(e) => errors.push(e),
        }
        match v6 {
            Ok(addrs) => {
                v6_count = addrs.len();
                answers.extend(addrs);
            }
            Err(e) => errors.push(e),
        }

        if answers.is_empty() && !errors.is_empty() {
            let first_code = errors[0].code;
            let error = if errors.iter().all(|e| e.code == first_code) {
                let code = if first_code == ErrorCode::BadName {
                    ErrorCode::NotFound
                } else {
                    first_code
                };
                ResolveError::new(code, GETADDRINFO, name, errors[0].message.clone())
            } else {
                ResolveError::combine(errors).with_syscall(GETADDRINFO)
            };
            return Err(error.into());
        }

        if opts.family == 0 && (v4_count == 0) != (v6_count == 0) {
            debug!(
                name = %name,
                v4 = v4_count,
                v6 = v6_count,
                "Single family yielded answers"
            );
        }

        if answers.is_empty() {
            return Err(ResolveError::new(
                ErrorCode::NoData,
                GETADDRINFO,
                name,
                "empty answer set",
            )
            .into());
        }

        if opts.hints & V4MAPPED != 0
            && opts.family == 6
            && !answers.iter().any(|a| a.is_ipv6())
        {
            debug!(name = %name, "No AAAA answers, applying V4MAPPED");
            for addr in &mut answers {
                if let IpAddr::V4(v4) = addr {
                    *addr = IpAddr::V6(v4.to_ipv6_mapped());
                }
            }
        }

        if opts.family != 0 {
            answers.retain(|a| match opts.family {
                4 => a.is_ipv4(),
                _ => a.is_ipv6(),
            });
        }

        if answers.is_empty() {
            return Err(ResolveError::new(
                ErrorCode::NoData,
                GETADDRINFO,
                name,
                "no addresses of the requested family",
            )
            .into());
        }

        let mut results: Vec<LookupAddress> =
            answers.into_iter().map(LookupAddress::new).collect();

        let verbatim = opts
            .verbatim
            .unwrap_or(self.config.dns_order == DnsOrder::Verbatim);
        if !verbatim {
            // Stable sort: IPv4 precedes IPv6, ties keep resolver order.
            results.sort_by_key(|a| a.family);
        }

        if !opts.all {
            results.truncate(1);
        }
        Ok(results)
    }

    /// Hosts-file shortcut plus IP-literal and localhost handling. A seeded
    /// bucket skips the network for that family.
    fn seed_buckets(&self, name: &str) -> (Option<Vec<IpAddr>>, Option<Vec<IpAddr>>) {
        if let Ok(literal) = name.parse::<IpAddr>() {
            return match literal {
                IpAddr::V4(_) => (Some(vec![literal]), Some(Vec::new())),
                IpAddr::V6(_) => (Some(Vec::new()), Some(vec![literal])),
            };
        }

        let mut v4: Vec<IpAddr> = Vec::new();
        let mut v6: Vec<IpAddr> = Vec::new();
        for ip in self.hosts.addresses_for(name) {
            match ip {
                IpAddr::V4(_) => v4.push(ip),
                IpAddr::V6(_) => v6.push(ip),
            }
        }

        if name.eq_ignore_ascii_case("localhost") || name.eq_ignore_ascii_case("localhost.") {
            if v4.is_empty() {
                v4.push(IpAddr::V4(std::net::Ipv4Addr::LOCALHOST));
            }
            if v6.is_empty() {
                v6.push(IpAddr::V6(std::net::Ipv6Addr::LOCALHOST));
            }
        }

        (
            (!v4.is_empty()).then_some(v4),
            (!v6.is_empty()).then_some(v6),
        )
    }

    /// Launch the A and AAAA halves together; a pre-seeded bucket is an
    /// immediate success for its family.
    async fn dispatch(
        &self,
        name: &str,
        opts: &LookupOptions,
        seed_v4: Option<Vec<IpAddr>>,
        seed_v6: Option<Vec<IpAddr>>,
    ) -> (FamilyOutcome, FamilyOutcome) {
        let resolve_opts = ResolveOptions {
            ttl: false,
            ecs_subnet: None,
            purge_cache: opts.purge_cache,
            no_throw_on_nodata: true,
        };

        let both_seeded = seed_v4.is_some() && seed_v6.is_some();
        if both_seeded {
            return (Ok(seed_v4.unwrap()), Ok(seed_v6.unwrap()));
        }

        let v4_branch = async {
            match seed_v4 {
                Some(addrs) => Ok(addrs),
                None => self
                    .query_family(name, RecordType::A, &resolve_opts)
                    .await,
            }
        };
        let v6_branch = async {
            match seed_v6 {
                Some(addrs) => Ok(addrs),
                None => self
                    .query_family(name, RecordType::AAAA, &resolve_opts)
                    .await,
            }
        };

        tokio::join!(v4_branch, v6_branch)
    }

    async fn query_family(
        &self,
        name: &str,
        rrtype: RecordType,
        opts: &ResolveOptions,
    ) -> FamilyOutcome {
        let result = match rrtype {
            RecordType::A => self.resolve4(name, opts).await,
            _ => self.resolve6(name, opts).await,
        };
        match result {
            Ok(addresses) => Ok(addresses.into_iter().map(|a| a.address).collect()),
            Err(DnsError::Resolve(e)) => Err(e),
            Err(DnsError::Argument(e)) => Err(ResolveError::new(
                ErrorCode::Einval,
                GETADDRINFO,
                name,
                e.to_string(),
            )),
        }
    }
}
