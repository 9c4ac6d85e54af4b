//! Decoded DNS responses in the structured form the resolver caches and
//! projects from.

use super::buffer;
use ember_dns_domain::{ErrorCode, RecordType, ResolveError};
use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::rdata::caa;
use hickory_proto::rr::{Name, RData, RecordType as WireType};
use hickory_proto::serialize::binary::BinEncodable;
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, Ipv6Addr};
use tracing::debug;

/// Header flags the resolver cares about. DNSSEC bits are carried through
/// verbatim, never interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseFlags {
    pub tc: bool,
    pub ra: bool,
    pub ad: bool,
    pub cd: bool,
}

/// Typed RDATA for the record types in the registry. CERT and TLSA keep the
/// raw RDATA blob; the projection layer parses their inner layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AnswerData {
    A {
        address: Ipv4Addr,
    },
    Aaaa {
        address: Ipv6Addr,
    },
    Cname {
        value: String,
    },
    Ns {
        value: String,
    },
    Ptr {
        value: String,
    },
    Mx {
        preference: u16,
        exchange: String,
    },
    Txt {
        #[serde(with = "buffer::list")]
        segments: Vec<Vec<u8>>,
    },
    Soa {
        mname: String,
        rname: String,
        serial: u32,
        refresh: u32,
        retry: u32,
        expire: u32,
        minimum: u32,
    },
    Srv {
        priority: u16,
        weight: u16,
        port: u16,
        target: String,
    },
    Caa {
        flags: u8,
        tag: String,
        value: String,
    },
    Naptr {
        order: u16,
        preference: u16,
        flags: String,
        services: String,
        regexp: String,
        replacement: String,
    },
    Raw {
        #[serde(with = "buffer")]
        data: Vec<u8>,
    },
}

/// One answer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub name: String,
    pub rrtype: RecordType,
    pub ttl: u32,
    pub data: AnswerData,
}

/// A decoded response, optionally enriched with the cache envelope
/// (`ttl` seconds and absolute `expires` epoch-ms) before being written to
/// a cache store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedResponse {
    pub id: u16,
    pub rcode: String,
    pub flags: ResponseFlags,
    pub answers: Vec<Answer>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ttl: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub expires: Option<u64>,
}

impl DecodedResponse {
    /// Minimum finite TTL across answers, if any.
    pub fn min_answer_ttl(&self) -> Option<u32> {
        self.answers.iter().map(|a| a.ttl).min()
    }

    /// Answers whose type matches `rrtype`.
    pub fn answers_of(&self, rrtype: RecordType) -> impl Iterator<Item = &Answer> {
        self.answers.iter().filter(move |a| a.rrtype == rrtype)
    }
}

pub fn rcode_to_status(rcode: ResponseCode) -> &'static str {
    match rcode {
        ResponseCode::NoError => "NOERROR",
        ResponseCode::FormErr => "FORMERR",
        ResponseCode::ServFail => "SERVFAIL",
        ResponseCode::NXDomain => "NXDOMAIN",
        ResponseCode::NotImp => "NOTIMP",
        ResponseCode::Refused => "REFUSED",
        _ => "UNKNOWN",
    }
}

fn name_string(name: &Name) -> String {
    let mut s = name.to_utf8();
    if s.len() > 1 && s.ends_with('.') {
        s.pop();
    }
    s
}

fn caa_value_string(value: &caa::Value) -> String {
    match value {
        caa::Value::Issuer(name, params) => {
            let mut out = match name {
                Some(n) => name_string(n),
                None => ";".to_string(),
            };
            for kv in params {
                out.push_str("; ");
                out.push_str(kv.key());
                out.push('=');
                out.push_str(kv.value());
            }
            out
        }
        caa::Value::Url(url) => url.to_string(),
        caa::Value::Unknown(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Decode a wire-format DNS message into the structured response shape.
///
/// Records of types outside the registry are dropped; the projection layer
/// filters per-rrtype anyway.
pub fn decode_response(bytes: &[u8], hostname: &str) -> Result<DecodedResponse, ResolveError> {
    let message = Message::from_vec(bytes).map_err(|e| {
        ResolveError::new(
            ErrorCode::BadResp,
            "query",
            hostname,
            format!("failed to decode DNS response: {e}"),
        )
    })?;

    let flags = ResponseFlags {
        tc: message.truncated(),
        ra: message.recursion_available(),
        ad: message.authentic_data(),
        cd: message.checking_disabled(),
    };

    let mut answers = Vec::with_capacity(message.answers().len());
    for record in message.answers() {
        let Some(rrtype) = RecordType::from_u16(u16::from(record.record_type())) else {
            continue;
        };
        let data = match record.data() {
            RData::A(a) => AnswerData::A { address: a.0 },
            RData::AAAA(aaaa) => AnswerData::Aaaa { address: aaaa.0 },
            RData::CNAME(name) => AnswerData::Cname {
                value: name_string(name),
            },
            RData::NS(name) => AnswerData::Ns {
                value: name_string(name),
            },
            RData::PTR(name) => AnswerData::Ptr {
                value: name_string(name),
            },
            RData::MX(mx) => AnswerData::Mx {
                preference: mx.preference(),
                exchange: name_string(mx.exchange()),
            },
            RData::TXT(txt) => AnswerData::Txt {
                segments: txt.txt_data().iter().map(|s| s.to_vec()).collect(),
            },
            RData::SOA(soa) => AnswerData::Soa {
                mname: name_string(soa.mname()),
                rname: name_string(soa.rname()),
                serial: soa.serial(),
                refresh: soa.refresh() as u32,
                retry: soa.retry() as u32,
                expire: soa.expire() as u32,
                minimum: soa.minimum(),
            },
            RData::SRV(srv) => AnswerData::Srv {
                priority: srv.priority(),
                weight: srv.weight(),
                port: srv.port(),
                target: name_string(srv.target()),
            },
            RData::CAA(rec) => AnswerData::Caa {
                flags: if rec.issuer_critical() { 128 } else { 0 },
                tag: rec.tag().as_str().to_string(),
                value: caa_value_string(rec.value()),
            },
            RData::NAPTR(naptr) => AnswerData::Naptr {
                order: naptr.order(),
                preference: naptr.preference(),
                flags: String::from_utf8_lossy(naptr.flags()).into_owned(),
                services: String::from_utf8_lossy(naptr.services()).into_owned(),
                regexp: String::from_utf8_lossy(naptr.regexp()).into_owned(),
                replacement: name_string(naptr.replacement()),
            },
            other if matches!(rrtype, RecordType::CERT | RecordType::TLSA) => {
                match other.to_bytes() {
                    Ok(data) => AnswerData::Raw { data },
                    Err(e) => {
                        debug!(rrtype = %rrtype, error = %e, "Skipping unencodable RDATA");
                        continue;
                    }
                }
            }
            _ => continue,
        };

        answers.push(Answer {
            name: name_string(record.name()),
            rrtype,
            ttl: record.ttl(),
            data,
        });
    }

    debug!(
        rcode = rcode_to_status(message.response_code()),
        answers = answers.len(),
        truncated = flags.tc,
        "DNS response decoded"
    );

    Ok(DecodedResponse {
        id: message.id(),
        rcode: rcode_to_status(message.response_code()).to_string(),
        flags,
        answers,
        ttl: None,
        expires: None,
    })
}

/// Build a synthetic `NOERROR` response. The supported seam for tests and
/// for seeding a cache without touching the network.
pub fn spoof_response(name: &str, rrtype: RecordType, data: Vec<AnswerData>) -> DecodedResponse {
    let answers = data
        .into_iter()
        .map(|data| Answer {
            name: name.to_string(),
            rrtype,
            ttl: 300,
            data,
        })
        .collect();

    DecodedResponse {
        id: 0,
        rcode: "NOERROR".to_string(),
        flags: ResponseFlags::default(),
        answers,
        ttl: None,
        expires: None,
    }
}

/// `WireType` for our registry; used when the same conversion is needed
/// outside message building.
pub fn to_wire_type(rrtype: RecordType) -> WireType {
    WireType::from(rrtype.to_u16())
}
