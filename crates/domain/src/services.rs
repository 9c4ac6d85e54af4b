/// Static port/protocol to service-name table, the subset of the IANA
/// services registry `lookup_service` consults. TCP rows are matched before
/// UDP rows.
const SERVICES: &[(u16, &str, &str)] = &[
    (7, "tcp", "echo"),
    (7, "udp", "echo"),
    (20, "tcp", "ftp-data"),
    (21, "tcp", "ftp"),
    (22, "tcp", "ssh"),
    (23, "tcp", "telnet"),
    (25, "tcp", "smtp"),
    (53, "tcp", "domain"),
    (53, "udp", "domain"),
    (67, "udp", "bootps"),
    (68, "udp", "bootpc"),
    (69, "udp", "tftp"),
    (80, "tcp", "http"),
    (110, "tcp", "pop3"),
    (119, "tcp", "nntp"),
    (123, "udp", "ntp"),
    (135, "tcp", "epmap"),
    (137, "udp", "netbios-ns"),
    (139, "tcp", "netbios-ssn"),
    (143, "tcp", "imap"),
    (161, "udp", "snmp"),
    (162, "udp", "snmptrap"),
    (179, "tcp", "bgp"),
    (194, "tcp", "irc"),
    (389, "tcp", "ldap"),
    (443, "tcp", "https"),
    (443, "udp", "https"),
    (445, "tcp", "microsoft-ds"),
    (465, "tcp", "submissions"),
    (514, "udp", "syslog"),
    (543, "tcp", "klogin"),
    (587, "tcp", "submission"),
    (631, "tcp", "ipp"),
    (636, "tcp", "ldaps"),
    (853, "tcp", "domain-s"),
    (873, "tcp", "rsync"),
    (993, "tcp", "imaps"),
    (995, "tcp", "pop3s"),
    (1080, "tcp", "socks"),
    (1194, "udp", "openvpn"),
    (1433, "tcp", "ms-sql-s"),
    (1521, "tcp", "ncube-lm"),
    (1723, "tcp", "pptp"),
    (2049, "tcp", "nfs"),
    (3128, "tcp", "ndl-aas"),
    (3306, "tcp", "mysql"),
    (3389, "tcp", "ms-wbt-server"),
    (5060, "tcp", "sip"),
    (5060, "udp", "sip"),
    (5222, "tcp", "xmpp-client"),
    (5432, "tcp", "postgresql"),
    (5671, "tcp", "amqps"),
    (5672, "tcp", "amqp"),
    (6379, "tcp", "redis"),
    (8080, "tcp", "http-alt"),
];

/// Service name for `port`, trying TCP first, then UDP.
pub fn service_for_port(port: u16) -> Option<&'static str> {
    SERVICES
        .iter()
        .find(|(p, proto, _)| *p == port && *proto == "tcp")
        .or_else(|| {
            SERVICES
                .iter()
                .find(|(p, proto, _)| *p == port && *proto == "udp")
        })
        .map(|(_, _, name)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tcp_wins_over_udp() {
        assert_eq!(service_for_port(53), Some("domain"));
        assert_eq!(service_for_port(80), Some("http"));
    }

    #[test]
    fn udp_only_ports_resolve() {
        assert_eq!(service_for_port(123), Some("ntp"));
        assert_eq!(service_for_port(69), Some("tftp"));
    }

    #[test]
    fn unknown_port_is_none() {
        assert_eq!(service_for_port(49_151), None);
    }
}
