//! Last-resort parser: every non-blank line becomes one packet.

use crate::{DetailValue, Format, PacketRecord, ParseResult, RAW_LINE_KEY};

use super::patterns::{IPV4_ANYWHERE, PROTOCOL_KEYWORD, capture};
use super::payload_lines;

pub fn parse_generic(content: &str) -> ParseResult {
    let packets = payload_lines(content).map(parse_line).collect();
    ParseResult::new(Format::Unknown, packets)
}

fn parse_line(line: &str) -> PacketRecord {
    let mut packet = PacketRecord {
        info: line.to_string(),
        ..PacketRecord::default()
    };

    // Positional: the first two addresses, whatever their role in the line.
    let mut addresses = IPV4_ANYWHERE.find_iter(line);
    if let (Some(first), Some(second)) = (addresses.next(), addresses.next()) {
        packet.source = first.as_str().to_string();
        packet.destination = second.as_str().to_string();
    }
    if let Some(keyword) = capture(&PROTOCOL_KEYWORD, line) {
        packet.protocol = keyword.to_ascii_uppercase();
    }
    packet
        .details
        .insert(RAW_LINE_KEY.to_string(), DetailValue::from(line));
    packet
}
