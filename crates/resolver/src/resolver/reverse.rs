//! Reverse (PTR) and service-name lookups.

use super::{ResolveOptions, Resolver};
use ember_dns_domain::{
    service_for_port, ArgumentError, DnsError, ErrorCode, ResolveError, ServiceInfo,
};
use std::net::IpAddr;
use tracing::debug;

const GET_HOST_BY_ADDR: &str = "getHostByAddr";
const GETNAMEINFO: &str = "getnameinfo";

/// `a.b.c.d` -> `d.c.b.a.in-addr.arpa`; IPv6 expands to reversed nibbles
/// under `ip6.arpa`.
pub fn reverse_name(ip: &IpAddr) -> String {
    match ip {
        IpAddr::V4(v4) => {
            let octets = v4.octets();
            format!(
                "{}.{}.{}.{}.in-addr.arpa",
                octets[3], octets[2], octets[1], octets[0]
            )
        }
        IpAddr::V6(v6) => {
            let mut nibbles = Vec::with_capacity(32);
            for byte in v6.octets().iter().rev() {
                nibbles.push(format!("{:x}", byte & 0x0f));
                nibbles.push(format!("{:x}", (byte >> 4) & 0x0f));
            }
            format!("{}.ip6.arpa", nibbles.join("."))
        }
    }
}

impl Resolver {
    /// Hostnames for `ip`: hosts-file rules first, PTR query otherwise.
    pub async fn reverse(&self, ip: &str) -> Result<Vec<String>, DnsError> {
        let addr: IpAddr = ip.parse().map_err(|_| {
            ArgumentError::InvalidArgValue(format!("not an IP address: {ip:?}"))
        })?;

        // A hosts rule's tokens are the address followed by its names;
        // dropping the leading address leaves the full name list.
        let matched: Vec<String> = self
            .hosts
            .names_for(addr)
            .into_iter()
            .flatten()
            .cloned()
            .collect();
        if !matched.is_empty() {
            debug!(ip = %ip, names = matched.len(), "Reverse answered from hosts file");
            return Ok(matched);
        }

        let name = reverse_name(&addr);
        let opts = ResolveOptions::default();
        match self.resolve_ptr(&name, &opts).await {
            Ok(names) => Ok(names),
            Err(DnsError::Resolve(e)) => Err(e.with_syscall(GET_HOST_BY_ADDR)
                .with_hostname(ip)
                .into()),
            Err(other) => Err(other),
        }
    }

    /// Service name for `address:port`, via `reverse` plus the static
    /// services table (TCP first, then UDP). An unnamed port keeps its
    /// decimal form.
    pub async fn lookup_service(
        &self,
        address: &str,
        port: u32,
    ) -> Result<ServiceInfo, DnsError> {
        if port > u16::MAX as u32 {
            return Err(ArgumentError::SocketBadPort(port.to_string()).into());
        }
        if address.parse::<IpAddr>().is_err() {
            return Err(ArgumentError::InvalidArgValue(format!(
                "not an IP address: {address:?}"
            ))
            .into());
        }

        let hostnames = match self.reverse(address).await {
            Ok(names) => names,
            Err(DnsError::Resolve(e)) => {
                return Err(e.with_syscall(GETNAMEINFO).into());
            }
            Err(other) => return Err(other),
        };

        let hostname = hostnames.into_iter().next().ok_or_else(|| {
            ResolveError::new(
                ErrorCode::NotFound,
                GETNAMEINFO,
                address,
                "no hostname for address",
            )
        })?;

        let service = service_for_port(port as u16)
            .map(str::to_string)
            .unwrap_or_else(|| port.to_string());

        Ok(ServiceInfo { hostname, service })
    }
}
