//! `resolve_any` fan-out, driven entirely from cache-seeded responses.

mod helpers;

use ember_dns_resolver::domain::{AnyRecord, RecordType, ANY_TYPES};
use ember_dns_resolver::ResolveOptions;
use helpers::builders::{
    a_answer, aaaa_answer, cname_answer, mx_answer, soa_answer, txt_answer, TestResolver,
};

async fn seed_all_types(test: &TestResolver, name: &str) {
    let r = &test.resolver;
    r.spoof_cache(name, RecordType::A, vec![a_answer("192.0.2.1")])
        .await;
    r.spoof_cache(name, RecordType::AAAA, vec![aaaa_answer("2001:db8::1")])
        .await;
    r.spoof_cache(name, RecordType::CNAME, vec![cname_answer("alias.example")])
        .await;
    r.spoof_cache(name, RecordType::MX, vec![mx_answer("mx.example", 10)])
        .await;
    r.spoof_cache(name, RecordType::NAPTR, vec![]).await;
    r.spoof_cache(name, RecordType::NS, vec![]).await;
    r.spoof_cache(name, RecordType::PTR, vec![]).await;
    r.spoof_cache(name, RecordType::SOA, vec![soa_answer()])
        .await;
    r.spoof_cache(name, RecordType::SRV, vec![]).await;
    r.spoof_cache(name, RecordType::TXT, vec![txt_answer("v=spf1 -all")])
        .await;
}

fn tag_of(record: &AnyRecord) -> &'static str {
    match record {
        AnyRecord::A { .. } => "A",
        AnyRecord::AAAA { .. } => "AAAA",
        AnyRecord::CNAME { .. } => "CNAME",
        AnyRecord::MX { .. } => "MX",
        AnyRecord::NAPTR { .. } => "NAPTR",
        AnyRecord::NS { .. } => "NS",
        AnyRecord::PTR { .. } => "PTR",
        AnyRecord::SOA { .. } => "SOA",
        AnyRecord::SRV { .. } => "SRV",
        AnyRecord::TXT { .. } => "TXT",
    }
}

#[tokio::test]
async fn any_fans_out_and_tags_results() {
    let test = TestResolver::with_hosts("");
    seed_all_types(&test, "example.com").await;

    let records = test
        .resolver
        .resolve_any("example.com", &ResolveOptions::default())
        .await
        .unwrap();

    assert!(!records.is_empty());
    let tags: Vec<&str> = records.iter().map(tag_of).collect();
    assert_eq!(tags, vec!["A", "AAAA", "CNAME", "MX", "SOA", "TXT"]);

    for record in &records {
        match record {
            AnyRecord::A { ttl, .. } | AnyRecord::AAAA { ttl, .. } => assert!(*ttl > 0),
            AnyRecord::MX { exchange, priority } => {
                assert_eq!(exchange, "mx.example");
                assert_eq!(*priority, 10);
            }
            AnyRecord::TXT { entries } => assert_eq!(entries, &vec!["v=spf1 -all".to_string()]),
            _ => {}
        }
    }
}

/// Output order must follow the type vector even though children complete
/// in arbitrary order under the bounded fan-out.
#[tokio::test]
async fn any_output_preserves_type_vector_order() {
    let test = TestResolver::with_hosts("");
    seed_all_types(&test, "ordered.example").await;

    for _ in 0..4 {
        let records = test
            .resolver
            .resolve_any("ordered.example", &ResolveOptions::default())
            .await
            .unwrap();
        let tags: Vec<&str> = records.iter().map(tag_of).collect();

        let vector_order: Vec<&str> = ANY_TYPES.iter().map(|t| t.as_str()).collect();
        let mut last_index = 0;
        for tag in &tags {
            let index = vector_order.iter().position(|t| t == tag).unwrap();
            assert!(index >= last_index, "out of order: {tags:?}");
            last_index = index;
        }
    }
}

#[tokio::test]
async fn any_swallows_empty_types() {
    let test = TestResolver::with_hosts("");
    seed_all_types(&test, "sparse.example").await;

    let records = test
        .resolver
        .resolve_any("sparse.example", &ResolveOptions::default())
        .await
        .unwrap();
    assert!(!records.iter().any(|r| matches!(r, AnyRecord::NS { .. })));
    assert!(!records.iter().any(|r| matches!(r, AnyRecord::SRV { .. })));
}

#[tokio::test]
async fn any_handles_settle_and_deregister() {
    let test = TestResolver::with_hosts("");
    seed_all_types(&test, "handles.example").await;

    test.resolver
        .resolve_any("handles.example", &ResolveOptions::default())
        .await
        .unwrap();
    assert_eq!(test.resolver.active_handles(), 0);
}
