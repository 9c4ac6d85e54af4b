use crate::errors::ArgumentError;
use ipnetwork::IpNetwork;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// An EDNS client-subnet hint (RFC 7871).
///
/// Parsed from `"addr/prefix"` or a bare address (host-length prefix).
/// The canonical string form partitions cache keys, so `Display` always
/// includes the prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EcsSubnet {
    pub address: IpAddr,
    pub prefix: u8,
}

impl EcsSubnet {
    pub fn family(&self) -> u16 {
        match self.address {
            IpAddr::V4(_) => 1,
            IpAddr::V6(_) => 2,
        }
    }
}

impl FromStr for EcsSubnet {
    type Err = ArgumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(addr) = s.parse::<IpAddr>() {
            let prefix = if addr.is_ipv4() { 32 } else { 128 };
            return Ok(Self {
                address: addr,
                prefix,
            });
        }

        let network: IpNetwork = s
            .parse()
            .map_err(|_| ArgumentError::InvalidArgValue(format!("bad ECS subnet: {s}")))?;
        Ok(Self {
            address: network.network(),
            prefix: network.prefix(),
        })
    }
}

impl fmt::Display for EcsSubnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cidr() {
        let ecs: EcsSubnet = "192.0.2.0/24".parse().unwrap();
        assert_eq!(ecs.prefix, 24);
        assert_eq!(ecs.family(), 1);
        assert_eq!(ecs.to_string(), "192.0.2.0/24");
    }

    #[test]
    fn bare_address_gets_host_prefix() {
        let v4: EcsSubnet = "198.51.100.7".parse().unwrap();
        assert_eq!(v4.prefix, 32);
        let v6: EcsSubnet = "2001:db8::1".parse().unwrap();
        assert_eq!(v6.prefix, 128);
        assert_eq!(v6.family(), 2);
    }

    #[test]
    fn rejects_garbage() {
        assert!("not-a-subnet".parse::<EcsSubnet>().is_err());
    }
}
