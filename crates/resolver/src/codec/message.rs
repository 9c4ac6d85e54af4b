//! DNS query construction, a thin adapter over `hickory-proto`.

use ember_dns_domain::{EcsSubnet, ErrorCode, RecordType, ResolveError};
use hickory_proto::op::{Edns, Message, MessageType, OpCode, Query};
use hickory_proto::rr::rdata::opt::{ClientSubnet, EdnsOption};
use hickory_proto::rr::{DNSClass, Name};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::str::FromStr;

use super::response::to_wire_type;

const EDNS_MAX_PAYLOAD: u16 = 4096;

/// Encode one query. `name` is IDNA-mapped to ASCII by the codec; callers
/// pass the user-supplied form.
pub fn build_query(
    id: u16,
    name: &str,
    rrtype: RecordType,
    ecs: Option<&EcsSubnet>,
) -> Result<Vec<u8>, ResolveError> {
    let qname = Name::from_utf8(name).map_err(|e| {
        ResolveError::new(
            ErrorCode::BadName,
            "query",
            name,
            format!("invalid name '{name}': {e}"),
        )
    })?;

    let mut query = Query::new();
    query.set_name(qname);
    query.set_query_type(to_wire_type(rrtype));
    query.set_query_class(DNSClass::IN);

    let mut message = Message::new();
    message.set_id(id);
    message.set_message_type(MessageType::Query);
    message.set_op_code(OpCode::Query);
    message.set_recursion_desired(true);
    message.add_query(query);
    message.set_edns(build_edns(name, ecs)?);

    serialize_message(&message, name)
}

fn build_edns(name: &str, ecs: Option<&EcsSubnet>) -> Result<Edns, ResolveError> {
    let mut edns = Edns::new();
    edns.set_max_payload(EDNS_MAX_PAYLOAD);
    edns.set_version(0);

    if let Some(subnet) = ecs {
        let client_subnet = ClientSubnet::from_str(&subnet.to_string()).map_err(|e| {
            ResolveError::new(
                ErrorCode::Einval,
                "query",
                name,
                format!("invalid ECS subnet '{subnet}': {e}"),
            )
        })?;
        edns.options_mut().insert(EdnsOption::Subnet(client_subnet));
    }

    Ok(edns)
}

fn serialize_message(message: &Message, name: &str) -> Result<Vec<u8>, ResolveError> {
    let mut buf = Vec::with_capacity(512);
    let mut encoder = BinEncoder::new(&mut buf);

    message.emit(&mut encoder).map_err(|e| {
        ResolveError::new(
            ErrorCode::Einval,
            "query",
            name,
            format!("failed to serialize DNS message: {e}"),
        )
    })?;

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::response::decode_response;

    #[test]
    fn builds_a_well_formed_query() {
        let bytes = build_query(0, "example.com", RecordType::A, None).unwrap();
        // Header is 12 bytes; qname + qtype + qclass + OPT follow.
        assert!(bytes.len() > 12);
        assert_eq!(&bytes[0..2], &[0, 0]);
    }

    #[test]
    fn query_id_lands_in_header() {
        let bytes = build_query(0xBEEF, "example.com", RecordType::TXT, None).unwrap();
        assert_eq!(&bytes[0..2], &[0xBE, 0xEF]);
    }

    #[test]
    fn ecs_option_changes_the_packet() {
        let plain = build_query(0, "example.com", RecordType::A, None).unwrap();
        let subnet: EcsSubnet = "192.0.2.0/24".parse().unwrap();
        let with_ecs = build_query(0, "example.com", RecordType::A, Some(&subnet)).unwrap();
        assert!(with_ecs.len() > plain.len());
    }

    #[test]
    fn rejects_unencodable_names() {
        assert!(build_query(0, "exa mple com..", RecordType::A, None).is_err());
    }

    #[test]
    fn idna_names_are_ascii_encoded() {
        let bytes = build_query(0, "münich.example", RecordType::A, None).unwrap();
        // The punycoded label must appear in the wire form.
        let wire = String::from_utf8_lossy(&bytes);
        assert!(wire.contains("xn--"), "expected IDNA ASCII form in {wire:?}");
    }

    #[test]
    fn a_message_built_here_decodes_there() {
        let bytes = build_query(7, "example.com", RecordType::MX, None).unwrap();
        let decoded = decode_response(&bytes, "example.com").unwrap();
        assert_eq!(decoded.id, 7);
        assert!(decoded.answers.is_empty());
    }
}
