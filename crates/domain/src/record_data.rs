use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::net::IpAddr;

/// One `A`/`AAAA` answer.
///
/// `ttl` is populated only when the caller asked for it (`ttl: true`),
/// matching the platform resolver's two return shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostAddress {
    pub address: IpAddr,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MxRecord {
    pub exchange: String,
    pub priority: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrvRecord {
    pub name: String,
    pub port: u16,
    pub priority: u16,
    pub weight: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoaRecord {
    pub nsname: String,
    pub hostmaster: String,
    pub serial: u32,
    pub refresh: u32,
    pub retry: u32,
    pub expire: u32,
    pub minttl: u32,
}

/// A CAA answer: `critical` carries the raw flags octet, `tag` is the
/// property name (`issue`, `iodef`, ...) and `value` its string form.
///
/// Serializes as `{"critical": flags, "<tag>": value}` — the property name
/// becomes the key, e.g. `{"critical": 0, "issue": "letsencrypt.org"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaaRecord {
    pub critical: u8,
    pub tag: String,
    pub value: String,
}

impl Serialize for CaaRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("critical", &self.critical)?;
        map.serialize_entry(self.tag.as_str(), &self.value)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for CaaRecord {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CaaVisitor;

        impl<'de> Visitor<'de> for CaaVisitor {
            type Value = CaaRecord;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map with \"critical\" and one tag-named entry")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut critical: Option<u8> = None;
                let mut tagged: Option<(String, String)> = None;
                while let Some(key) = map.next_key::<String>()? {
                    if key == "critical" {
                        critical = Some(map.next_value()?);
                    } else {
                        tagged = Some((key, map.next_value()?));
                    }
                }
                let critical = critical.ok_or_else(|| de::Error::missing_field("critical"))?;
                let (tag, value) =
                    tagged.ok_or_else(|| de::Error::custom("missing tag entry"))?;
                Ok(CaaRecord {
                    critical,
                    tag,
                    value,
                })
            }
        }

        deserializer.deserialize_map(CaaVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NaptrRecord {
    pub flags: String,
    pub service: String,
    pub regexp: String,
    pub replacement: String,
    pub order: u16,
    pub preference: u16,
}

/// A CERT answer, projected from the raw RDATA blob
/// (2 bytes type, 2 bytes key tag, 1 byte algorithm, base64 remainder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertRecord {
    pub name: String,
    pub ttl: u32,
    #[serde(rename = "certificateType")]
    pub certificate_type: String,
    #[serde(rename = "keyTag")]
    pub key_tag: u16,
    pub algorithm: u8,
    pub certificate: String,
}

/// Mnemonic for a CERT type code, per the IANA certificate-type registry.
pub fn cert_type_name(code: u16) -> Option<&'static str> {
    match code {
        1 => Some("PKIX"),
        2 => Some("SPKI"),
        3 => Some("PGP"),
        4 => Some("IPKIX"),
        5 => Some("ISPKI"),
        6 => Some("IPGP"),
        7 => Some("ACPKIX"),
        8 => Some("IACPKIX"),
        253 => Some("URI"),
        254 => Some("OID"),
        _ => None,
    }
}

/// A TLSA answer (1 byte usage, 1 byte selector, 1 byte matching type,
/// raw certificate association data).
///
/// Serializes with all eight keys of the platform shape: `matchingType`
/// and `certificate` are emitted as aliases of `mtype` and `cert`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TlsaRecord {
    pub name: String,
    pub ttl: u32,
    pub usage: u8,
    pub selector: u8,
    pub mtype: u8,
    pub cert: Vec<u8>,
}

impl TlsaRecord {
    pub fn matching_type(&self) -> u8 {
        self.mtype
    }

    pub fn certificate(&self) -> &[u8] {
        &self.cert
    }
}

impl Serialize for TlsaRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(8))?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("ttl", &self.ttl)?;
        map.serialize_entry("usage", &self.usage)?;
        map.serialize_entry("selector", &self.selector)?;
        map.serialize_entry("mtype", &self.mtype)?;
        map.serialize_entry("cert", &self.cert)?;
        map.serialize_entry("matchingType", &self.mtype)?;
        map.serialize_entry("certificate", &self.cert)?;
        map.end()
    }
}

/// One element of a `resolve_any` reply, tagged with its record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AnyRecord {
    A {
        address: IpAddr,
        ttl: u32,
    },
    AAAA {
        address: IpAddr,
        ttl: u32,
    },
    CNAME {
        value: String,
    },
    MX {
        exchange: String,
        priority: u16,
    },
    NAPTR {
        value: NaptrRecord,
    },
    NS {
        value: String,
    },
    PTR {
        value: String,
    },
    SOA {
        #[serde(flatten)]
        record: SoaRecord,
    },
    SRV {
        value: SrvRecord,
    },
    TXT {
        entries: Vec<String>,
    },
}

/// The address (plus derived family) `lookup` hands back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupAddress {
    pub address: IpAddr,
    pub family: u8,
}

impl LookupAddress {
    pub fn new(address: IpAddr) -> Self {
        let family = if address.is_ipv4() { 4 } else { 6 };
        Self { address, family }
    }
}

/// Reply of `lookup_service`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub hostname: String,
    pub service: String,
}
