//! Normalization of decoded answers onto the public per-rrtype shapes.
//!
//! Every function filters the answer set down to its own record type first,
//! so a response carrying a CNAME chain alongside the requested records
//! projects cleanly.

use crate::codec::{AnswerData, DecodedResponse};
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use ember_dns_domain::{
    cert_type_name, CaaRecord, CertRecord, HostAddress, MxRecord, NaptrRecord, RecordType,
    SoaRecord, SrvRecord, TlsaRecord,
};
use std::net::IpAddr;
use tracing::debug;

pub fn addresses(resp: &DecodedResponse, rrtype: RecordType, want_ttl: bool) -> Vec<HostAddress> {
    resp.answers_of(rrtype)
        .filter_map(|answer| {
            let address: IpAddr = match &answer.data {
                AnswerData::A { address } => (*address).into(),
                AnswerData::Aaaa { address } => (*address).into(),
                _ => return None,
            };
            Some(HostAddress {
                address,
                ttl: want_ttl.then_some(answer.ttl),
            })
        })
        .collect()
}

/// CNAME / NS / PTR all project to plain name strings.
pub fn names(resp: &DecodedResponse, rrtype: RecordType) -> Vec<String> {
    resp.answers_of(rrtype)
        .filter_map(|answer| match &answer.data {
            AnswerData::Cname { value } | AnswerData::Ns { value } | AnswerData::Ptr { value } => {
                Some(value.clone())
            }
            _ => None,
        })
        .collect()
}

pub fn mx(resp: &DecodedResponse) -> Vec<MxRecord> {
    resp.answers_of(RecordType::MX)
        .filter_map(|answer| match &answer.data {
            AnswerData::Mx {
                preference,
                exchange,
            } => Some(MxRecord {
                exchange: exchange.clone(),
                priority: *preference,
            }),
            _ => None,
        })
        .collect()
}

/// Each TXT answer is a list of byte-strings; a singleton stays wrapped.
pub fn txt(resp: &DecodedResponse) -> Vec<Vec<String>> {
    resp.answers_of(RecordType::TXT)
        .filter_map(|answer| match &answer.data {
            AnswerData::Txt { segments } => Some(
                segments
                    .iter()
                    .map(|s| String::from_utf8_lossy(s).into_owned())
                    .collect(),
            ),
            _ => None,
        })
        .collect()
}

pub fn soa(resp: &DecodedResponse) -> Vec<SoaRecord> {
    resp.answers_of(RecordType::SOA)
        .filter_map(|answer| match &answer.data {
            AnswerData::Soa {
                mname,
                rname,
                serial,
                refresh,
                retry,
                expire,
                minimum,
            } => Some(SoaRecord {
                nsname: mname.clone(),
                hostmaster: rname.clone(),
                serial: *serial,
                refresh: *refresh,
                retry: *retry,
                expire: *expire,
                minttl: *minimum,
            }),
            _ => None,
        })
        .collect()
}

pub fn srv(resp: &DecodedResponse) -> Vec<SrvRecord> {
    resp.answers_of(RecordType::SRV)
        .filter_map(|answer| match &answer.data {
            AnswerData::Srv {
                priority,
                weight,
                port,
                target,
            } => Some(SrvRecord {
                name: target.clone(),
                port: *port,
                priority: *priority,
                weight: *weight,
            }),
            _ => None,
        })
        .collect()
}

pub fn caa(resp: &DecodedResponse) -> Vec<CaaRecord> {
    resp.answers_of(RecordType::CAA)
        .filter_map(|answer| match &answer.data {
            AnswerData::Caa { flags, tag, value } => Some(CaaRecord {
                critical: *flags,
                tag: tag.clone(),
                value: value.clone(),
            }),
            _ => None,
        })
        .collect()
}

pub fn naptr(resp: &DecodedResponse) -> Vec<NaptrRecord> {
    resp.answers_of(RecordType::NAPTR)
        .filter_map(|answer| match &answer.data {
            AnswerData::Naptr {
                order,
                preference,
                flags,
                services,
                regexp,
                replacement,
            } => Some(NaptrRecord {
                flags: flags.clone(),
                service: services.clone(),
                regexp: regexp.clone(),
                replacement: replacement.clone(),
                order: *order,
                preference: *preference,
            }),
            _ => None,
        })
        .collect()
}

/// CERT RDATA layout: 2 bytes type, 2 bytes key tag, 1 byte algorithm,
/// base64 remainder. Malformed blobs are dropped, not errors.
pub fn cert(resp: &DecodedResponse) -> Vec<CertRecord> {
    resp.answers_of(RecordType::CERT)
        .filter_map(|answer| {
            let AnswerData::Raw { data } = &answer.data else {
                return None;
            };
            if data.len() < 5 {
                debug!(name = %answer.name, len = data.len(), "CERT RDATA too short");
                return None;
            }
            let type_code = u16::from_be_bytes([data[0], data[1]]);
            Some(CertRecord {
                name: answer.name.clone(),
                ttl: answer.ttl,
                certificate_type: cert_type_name(type_code)
                    .map(str::to_string)
                    .unwrap_or_else(|| type_code.to_string()),
                key_tag: u16::from_be_bytes([data[2], data[3]]),
                algorithm: data[4],
                certificate: BASE64_STANDARD.encode(&data[5..]),
            })
        })
        .collect()
}

/// TLSA RDATA layout: 1 byte usage, 1 byte selector, 1 byte matching type,
/// raw certificate association data.
pub fn tlsa(resp: &DecodedResponse) -> Vec<TlsaRecord> {
    resp.answers_of(RecordType::TLSA)
        .filter_map(|answer| {
            let AnswerData::Raw { data } = &answer.data else {
                return None;
            };
            if data.len() < 3 {
                debug!(name = %answer.name, len = data.len(), "TLSA RDATA too short");
                return None;
            }
            Some(TlsaRecord {
                name: answer.name.clone(),
                ttl: answer.ttl,
                usage: data[0],
                selector: data[1],
                mtype: data[2],
                cert: data[3..].to_vec(),
            })
        })
        .collect()
}
