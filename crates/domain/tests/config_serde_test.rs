use ember_dns_domain::{DnsOrder, HttpMethod, QueryIdMode, ResolverConfig};

#[test]
fn minimal_json_fills_defaults() {
    let config: ResolverConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config.servers, vec!["1.1.1.1", "1.0.0.1"]);
    assert_eq!(config.timeout_ms, 5000);
    assert_eq!(config.tries, 4);
    assert_eq!(config.method, HttpMethod::Get);
    assert_eq!(config.dns_order, DnsOrder::Verbatim);
    assert!(config.cache_enabled);
    assert!(!config.smart_rotate);
}

#[test]
fn explicit_fields_override_defaults() {
    let config: ResolverConfig = serde_json::from_str(
        r#"{
            "servers": ["dns.example"],
            "method": "POST",
            "dns_order": "ipv4first",
            "query_id": "random",
            "smart_rotate": true
        }"#,
    )
    .unwrap();
    assert_eq!(config.servers, vec!["dns.example"]);
    assert_eq!(config.method, HttpMethod::Post);
    assert_eq!(config.dns_order, DnsOrder::Ipv4First);
    assert_eq!(config.query_id, QueryIdMode::Random);
    assert!(config.smart_rotate);
}

#[test]
fn config_roundtrips_through_json() {
    let config = ResolverConfig::default();
    let json = serde_json::to_string(&config).unwrap();
    let back: ResolverConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back.servers, config.servers);
    assert_eq!(back.max_ttl_seconds, config.max_ttl_seconds);
}
