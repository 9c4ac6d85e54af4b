//! Cache-seeded resolution: every scenario here settles without touching
//! the network.

mod helpers;

use ember_dns_resolver::domain::{ErrorCode, MxRecord, RecordType};
use ember_dns_resolver::{CacheStore, ResolveOptions};
use helpers::builders::{a_answer, mx_answer, txt_answer, TestResolver};
use std::time::{SystemTime, UNIX_EPOCH};

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}

#[tokio::test]
async fn txt_spoof_via_cache() {
    let test = TestResolver::with_hosts("");
    test.resolver
        .spoof_cache(
            "forwardemail.net",
            RecordType::TXT,
            vec![txt_answer("v=spf1 ip4:127.0.0.1 -all")],
        )
        .await;

    let records = test
        .resolver
        .resolve_txt("forwardemail.net", &ResolveOptions::default())
        .await
        .unwrap();
    assert_eq!(records, vec![vec!["v=spf1 ip4:127.0.0.1 -all".to_string()]]);
}

#[tokio::test]
async fn mx_spoof_via_cache() {
    let test = TestResolver::with_hosts("");
    test.resolver
        .spoof_cache(
            "forwardemail.net",
            RecordType::MX,
            vec![
                mx_answer("mx1.forwardemail.net", 0),
                mx_answer("mx2.forwardemail.net", 0),
            ],
        )
        .await;

    let records = test
        .resolver
        .resolve_mx("forwardemail.net", &ResolveOptions::default())
        .await
        .unwrap();
    assert_eq!(
        records,
        vec![
            MxRecord {
                exchange: "mx1.forwardemail.net".into(),
                priority: 0
            },
            MxRecord {
                exchange: "mx2.forwardemail.net".into(),
                priority: 0
            },
        ]
    );
}

#[tokio::test]
async fn consecutive_reads_are_structurally_equal() {
    let test = TestResolver::with_hosts("");
    test.resolver
        .spoof_cache("example.com", RecordType::TXT, vec![txt_answer("hello")])
        .await;

    let opts = ResolveOptions::default();
    let first = test.resolver.resolve_txt("example.com", &opts).await.unwrap();
    let second = test.resolver.resolve_txt("example.com", &opts).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn cache_key_is_case_insensitive() {
    let test = TestResolver::with_hosts("");
    test.resolver
        .spoof_cache("example.com", RecordType::A, vec![a_answer("1.2.3.4")])
        .await;

    let addrs = test
        .resolver
        .resolve4("EXAMPLE.COM", &ResolveOptions::default())
        .await
        .unwrap();
    assert_eq!(addrs[0].address.to_string(), "1.2.3.4");
}

#[tokio::test]
async fn ttl_option_exposes_answer_ttls() {
    let test = TestResolver::with_hosts("");
    test.resolver
        .spoof_cache("example.com", RecordType::A, vec![a_answer("1.2.3.4")])
        .await;

    let plain = test
        .resolver
        .resolve4("example.com", &ResolveOptions::default())
        .await
        .unwrap();
    assert_eq!(plain[0].ttl, None);

    let with_ttl = test
        .resolver
        .resolve4(
            "example.com",
            &ResolveOptions {
                ttl: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let ttl = with_ttl[0].ttl.expect("ttl requested");
    assert!(ttl >= 1 && ttl <= 300, "decayed ttl out of range: {ttl}");
}

/// The string-valued backend contract: a JSON string whose TXT payloads use
/// the `{type: "Buffer", data: [..]}` envelope projects identically to one
/// using plain integer arrays.
#[tokio::test]
async fn string_backed_entries_hydrate_buffers_either_way() {
    let test = TestResolver::with_hosts("");
    let store = test.resolver.cache().unwrap();
    let expires = now_ms() + 300_000;

    let spf = b"v=spf1 -all";
    let as_array: Vec<u8> = spf.to_vec();

    let envelope_entry = serde_json::json!({
        "id": 0,
        "rcode": "NOERROR",
        "flags": {"tc": false, "ra": false, "ad": false, "cd": false},
        "answers": [{
            "name": "envelope.example",
            "rrtype": "TXT",
            "ttl": 300,
            "data": {"kind": "txt", "segments": [{"type": "Buffer", "data": as_array}]}
        }],
        "ttl": 300,
        "expires": expires,
    });
    let array_entry = serde_json::json!({
        "id": 0,
        "rcode": "NOERROR",
        "flags": {"tc": false, "ra": false, "ad": false, "cd": false},
        "answers": [{
            "name": "array.example",
            "rrtype": "TXT",
            "ttl": 300,
            "data": {"kind": "txt", "segments": [as_array]}
        }],
        "ttl": 300,
        "expires": expires,
    });

    store
        .set(
            "txt:envelope.example",
            serde_json::Value::String(envelope_entry.to_string()),
            std::time::Duration::from_secs(300),
        )
        .await;
    store
        .set(
            "txt:array.example",
            serde_json::Value::String(array_entry.to_string()),
            std::time::Duration::from_secs(300),
        )
        .await;

    let opts = ResolveOptions::default();
    let from_envelope = test
        .resolver
        .resolve_txt("envelope.example", &opts)
        .await
        .unwrap();
    let from_array = test
        .resolver
        .resolve_txt("array.example", &opts)
        .await
        .unwrap();
    assert_eq!(from_envelope, vec![vec!["v=spf1 -all".to_string()]]);
    assert_eq!(from_envelope, from_array);
}

#[tokio::test]
async fn unknown_rrtype_is_invalid_arg_value() {
    let test = TestResolver::with_hosts("");
    let err = test
        .resolver
        .resolve("example.com", "AXFR", &ResolveOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ERR_INVALID_ARG_VALUE");
}

#[tokio::test]
async fn malformed_names_are_badname() {
    let test = TestResolver::with_hosts("");
    let opts = ResolveOptions::default();

    for name in [".example.com", "a..b", "."] {
        let err = test.resolver.resolve_txt(name, &opts).await.unwrap_err();
        assert_eq!(
            err.resolve_code(),
            Some(ErrorCode::BadName),
            "expected BADNAME for {name:?}"
        );
    }
}

#[tokio::test]
async fn spoofed_empty_answers_raise_nodata() {
    let test = TestResolver::with_hosts("");
    test.resolver
        .spoof_cache("empty.example", RecordType::TXT, vec![])
        .await;

    let err = test
        .resolver
        .resolve_txt("empty.example", &ResolveOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.resolve_code(), Some(ErrorCode::NoData));
}

#[tokio::test]
async fn cancel_empties_the_handle_set() {
    let test = TestResolver::with_hosts("");
    test.resolver.cancel();
    assert_eq!(test.resolver.active_handles(), 0);
}

#[tokio::test]
async fn set_servers_roundtrips_in_order() {
    let test = TestResolver::with_hosts("");
    test.resolver
        .set_servers(vec![
            "9.9.9.9".into(),
            "149.112.112.112".into(),
            "9.9.9.9".into(),
        ])
        .unwrap();
    assert_eq!(
        test.resolver.get_servers(),
        vec!["9.9.9.9", "149.112.112.112"]
    );
    assert!(test.resolver.set_servers(vec![]).is_err());
}
