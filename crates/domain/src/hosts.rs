use std::net::IpAddr;

/// One hosts-file rule: an address and the names that map to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostsRule {
    pub ip: IpAddr,
    pub names: Vec<String>,
}

/// The parsed platform hosts file. Loaded once at resolver construction,
/// read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct HostsTable {
    pub rules: Vec<HostsRule>,
}

impl HostsTable {
    /// Parse hosts-file text. Unparseable lines are skipped, not errors:
    /// real hosts files accumulate junk.
    pub fn parse(contents: &str) -> Self {
        let mut rules = Vec::new();

        for line in contents.lines() {
            let line = match line.find('#') {
                Some(idx) => &line[..idx],
                None => line,
            };
            let mut fields = line.split_whitespace();
            let Some(ip_field) = fields.next() else {
                continue;
            };
            let Ok(ip) = ip_field.parse::<IpAddr>() else {
                continue;
            };
            let names: Vec<String> = fields.map(|n| n.to_string()).collect();
            if names.is_empty() {
                continue;
            }
            rules.push(HostsRule { ip, names });
        }

        Self { rules }
    }

    /// Addresses of every rule whose name list contains `name`
    /// (case-insensitive).
    pub fn addresses_for(&self, name: &str) -> Vec<IpAddr> {
        self.rules
            .iter()
            .filter(|rule| {
                rule.names
                    .iter()
                    .any(|n| n.eq_ignore_ascii_case(name))
            })
            .map(|rule| rule.ip)
            .collect()
    }

    /// Name lists of every rule whose address equals `ip`.
    pub fn names_for(&self, ip: IpAddr) -> Vec<&[String]> {
        self.rules
            .iter()
            .filter(|rule| rule.ip == ip)
            .map(|rule| rule.names.as_slice())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# localhost entries
127.0.0.1\tlocalhost loopback
::1\tlocalhost ip6-localhost ip6-loopback
10.0.0.5\tbuild-server build # inline comment
not-an-ip\tbogus
192.168.1.9
";

    #[test]
    fn parses_rules_and_skips_junk() {
        let table = HostsTable::parse(SAMPLE);
        assert_eq!(table.rules.len(), 3);
        assert_eq!(table.rules[0].names, vec!["localhost", "loopback"]);
    }

    #[test]
    fn addresses_for_is_case_insensitive() {
        let table = HostsTable::parse(SAMPLE);
        let addrs = table.addresses_for("LOCALHOST");
        assert_eq!(addrs.len(), 2);
        assert!(addrs.contains(&"127.0.0.1".parse().unwrap()));
        assert!(addrs.contains(&"::1".parse().unwrap()));
    }

    #[test]
    fn names_for_matches_exact_ip() {
        let table = HostsTable::parse(SAMPLE);
        let names = table.names_for("10.0.0.5".parse().unwrap());
        assert_eq!(names, vec![&["build-server".to_string(), "build".to_string()][..]]);
        assert!(table.names_for("10.0.0.6".parse().unwrap()).is_empty());
    }
}
