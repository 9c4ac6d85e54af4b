use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Record types the resolver accepts.
///
/// `ANY` is a composite: it is answered by fanning out over [`ANY_TYPES`]
/// rather than by putting `ANY` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    A,
    AAAA,
    CAA,
    CERT,
    CNAME,
    MX,
    NAPTR,
    NS,
    PTR,
    SOA,
    SRV,
    TLSA,
    TXT,
    ANY,
}

/// The fixed type vector behind `resolve_any`.
pub const ANY_TYPES: [RecordType; 10] = [
    RecordType::A,
    RecordType::AAAA,
    RecordType::CNAME,
    RecordType::MX,
    RecordType::NAPTR,
    RecordType::NS,
    RecordType::PTR,
    RecordType::SOA,
    RecordType::SRV,
    RecordType::TXT,
];

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::AAAA => "AAAA",
            RecordType::CAA => "CAA",
            RecordType::CERT => "CERT",
            RecordType::CNAME => "CNAME",
            RecordType::MX => "MX",
            RecordType::NAPTR => "NAPTR",
            RecordType::NS => "NS",
            RecordType::PTR => "PTR",
            RecordType::SOA => "SOA",
            RecordType::SRV => "SRV",
            RecordType::TLSA => "TLSA",
            RecordType::TXT => "TXT",
            RecordType::ANY => "ANY",
        }
    }

    pub fn to_u16(&self) -> u16 {
        match self {
            RecordType::A => 1,
            RecordType::NS => 2,
            RecordType::CNAME => 5,
            RecordType::SOA => 6,
            RecordType::PTR => 12,
            RecordType::MX => 15,
            RecordType::TXT => 16,
            RecordType::AAAA => 28,
            RecordType::SRV => 33,
            RecordType::NAPTR => 35,
            RecordType::CERT => 37,
            RecordType::TLSA => 52,
            RecordType::ANY => 255,
            RecordType::CAA => 257,
        }
    }

    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            1 => Some(RecordType::A),
            2 => Some(RecordType::NS),
            5 => Some(RecordType::CNAME),
            6 => Some(RecordType::SOA),
            12 => Some(RecordType::PTR),
            15 => Some(RecordType::MX),
            16 => Some(RecordType::TXT),
            28 => Some(RecordType::AAAA),
            33 => Some(RecordType::SRV),
            35 => Some(RecordType::NAPTR),
            37 => Some(RecordType::CERT),
            52 => Some(RecordType::TLSA),
            255 => Some(RecordType::ANY),
            257 => Some(RecordType::CAA),
            _ => None,
        }
    }

    /// TitleCase suffix used when labelling the `syscall` on errors
    /// (`"query" + suffix`, e.g. `queryTxt`, `queryAaaa`).
    pub fn syscall_suffix(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::AAAA => "Aaaa",
            RecordType::CAA => "Caa",
            RecordType::CERT => "Cert",
            RecordType::CNAME => "Cname",
            RecordType::MX => "Mx",
            RecordType::NAPTR => "Naptr",
            RecordType::NS => "Ns",
            RecordType::PTR => "Ptr",
            RecordType::SOA => "Soa",
            RecordType::SRV => "Srv",
            RecordType::TLSA => "Tlsa",
            RecordType::TXT => "Txt",
            RecordType::ANY => "Any",
        }
    }

    pub fn is_address(&self) -> bool {
        matches!(self, RecordType::A | RecordType::AAAA)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "A" => Ok(RecordType::A),
            "AAAA" => Ok(RecordType::AAAA),
            "CAA" => Ok(RecordType::CAA),
            "CERT" => Ok(RecordType::CERT),
            "CNAME" => Ok(RecordType::CNAME),
            "MX" => Ok(RecordType::MX),
            "NAPTR" => Ok(RecordType::NAPTR),
            "NS" => Ok(RecordType::NS),
            "PTR" => Ok(RecordType::PTR),
            "SOA" => Ok(RecordType::SOA),
            "SRV" => Ok(RecordType::SRV),
            "TLSA" => Ok(RecordType::TLSA),
            "TXT" => Ok(RecordType::TXT),
            "ANY" => Ok(RecordType::ANY),
            _ => Err(format!("Unknown record type: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_wire_codes() {
        for rt in [
            RecordType::A,
            RecordType::AAAA,
            RecordType::CAA,
            RecordType::CERT,
            RecordType::CNAME,
            RecordType::MX,
            RecordType::NAPTR,
            RecordType::NS,
            RecordType::PTR,
            RecordType::SOA,
            RecordType::SRV,
            RecordType::TLSA,
            RecordType::TXT,
            RecordType::ANY,
        ] {
            assert_eq!(RecordType::from_u16(rt.to_u16()), Some(rt));
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("txt".parse::<RecordType>(), Ok(RecordType::TXT));
        assert_eq!("Aaaa".parse::<RecordType>(), Ok(RecordType::AAAA));
        assert!("AXFR".parse::<RecordType>().is_err());
    }

    #[test]
    fn any_vector_has_no_binary_types() {
        assert!(!ANY_TYPES.contains(&RecordType::CERT));
        assert!(!ANY_TYPES.contains(&RecordType::TLSA));
        assert!(!ANY_TYPES.contains(&RecordType::CAA));
        assert_eq!(ANY_TYPES.len(), 10);
    }
}
