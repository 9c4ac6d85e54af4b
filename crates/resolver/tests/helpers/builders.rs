#![allow(dead_code)]

use ember_dns_resolver::domain::ResolverConfig;
use ember_dns_resolver::{AnswerData, Resolver};
use std::io::Write;
use std::path::PathBuf;

/// A resolver wired to a throwaway hosts file, for tests that must never
/// touch the real machine's configuration.
pub struct TestResolver {
    pub resolver: Resolver,
    hosts_path: PathBuf,
}

impl TestResolver {
    pub fn with_hosts(hosts: &str) -> Self {
        Self::build(hosts, ResolverConfig::default())
    }

    pub fn with_hosts_and_config(hosts: &str, config: ResolverConfig) -> Self {
        Self::build(hosts, config)
    }

    fn build(hosts: &str, mut config: ResolverConfig) -> Self {
        let hosts_path = std::env::temp_dir().join(format!(
            "ember-dns-test-hosts-{}-{:x}",
            std::process::id(),
            fastrand::u64(..)
        ));
        let mut file = std::fs::File::create(&hosts_path).expect("create temp hosts");
        file.write_all(hosts.as_bytes()).expect("write temp hosts");

        config.hosts_path = Some(hosts_path.clone());
        let resolver = Resolver::with_config(config).expect("build resolver");
        Self {
            resolver,
            hosts_path,
        }
    }
}

impl Drop for TestResolver {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.hosts_path);
    }
}

pub fn txt_answer(text: &str) -> AnswerData {
    AnswerData::Txt {
        segments: vec![text.as_bytes().to_vec()],
    }
}

pub fn mx_answer(exchange: &str, preference: u16) -> AnswerData {
    AnswerData::Mx {
        preference,
        exchange: exchange.to_string(),
    }
}

pub fn a_answer(address: &str) -> AnswerData {
    AnswerData::A {
        address: address.parse().expect("ipv4 literal"),
    }
}

pub fn aaaa_answer(address: &str) -> AnswerData {
    AnswerData::Aaaa {
        address: address.parse().expect("ipv6 literal"),
    }
}

pub fn cname_answer(value: &str) -> AnswerData {
    AnswerData::Cname {
        value: value.to_string(),
    }
}

pub fn soa_answer() -> AnswerData {
    AnswerData::Soa {
        mname: "ns1.example.com".into(),
        rname: "hostmaster.example.com".into(),
        serial: 2024_01_01,
        refresh: 7200,
        retry: 3600,
        expire: 1_209_600,
        minimum: 300,
    }
}
