//! End-to-end scenarios against real DoH upstreams. Ignored by default;
//! run with `cargo test -- --ignored` on a machine with outbound HTTPS.

use ember_dns_resolver::domain::{ErrorCode, ResolverConfig};
use ember_dns_resolver::{ResolveOptions, Resolver};

fn cloudflare() -> Resolver {
    Resolver::with_config(ResolverConfig {
        servers: vec!["1.1.1.1".into(), "1.0.0.1".into()],
        ..Default::default()
    })
    .unwrap()
}

#[tokio::test]
#[ignore = "requires network"]
async fn any_smoke_against_cloudflare() {
    let resolver = cloudflare();
    let records = resolver
        .resolve_any("cloudflare.com", &ResolveOptions::default())
        .await
        .unwrap();
    assert!(!records.is_empty());
}

#[tokio::test]
#[ignore = "requires network"]
async fn reverse_cloudflare_resolver_ip() {
    let resolver = cloudflare();
    let names = resolver.reverse("1.1.1.1").await.unwrap();
    assert_eq!(names, vec!["one.one.one.one"]);
}

#[tokio::test]
#[ignore = "requires network"]
async fn lookup_service_http_on_cloudflare() {
    let resolver = cloudflare();
    let info = resolver.lookup_service("1.1.1.1", 80).await.unwrap();
    assert_eq!(info.hostname, "one.one.one.one");
    assert_eq!(info.service, "http");
}

#[tokio::test]
#[ignore = "requires network"]
async fn smart_rotation_demotes_dead_server() {
    let resolver = Resolver::with_config(ResolverConfig {
        servers: vec!["bad.invalid".into(), "1.1.1.1".into()],
        smart_rotate: true,
        tries: 1,
        timeout_ms: 200,
        ..Default::default()
    })
    .unwrap();

    resolver
        .resolve4("cloudflare.com", &ResolveOptions::default())
        .await
        .unwrap();
    assert_eq!(resolver.get_servers(), vec!["1.1.1.1", "bad.invalid"]);
}

#[tokio::test]
#[ignore = "requires network"]
async fn one_millisecond_budget_times_out() {
    let resolver = Resolver::with_config(ResolverConfig {
        servers: vec!["1.1.1.1".into()],
        timeout_ms: 1,
        tries: 1,
        cache_enabled: false,
        ..Default::default()
    })
    .unwrap();

    let err = resolver
        .resolve4("cloudflare.com", &ResolveOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err.resolve_code(),
        Some(ErrorCode::Timeout) | Some(ErrorCode::Cancelled)
    ));
}
