//! Protocol-analyzer text dumps.
//!
//! A line starting with `Frame ` opens a new packet block; the following lines
//! fill the in-progress record. A block is emitted only once its protocol was
//! set explicitly by a `Protocol: ` line: blocks still carrying the `Unknown`
//! placeholder are discarded, both when the next `Frame ` line arrives and at
//! end of input. Lines before the first `Frame ` line belong to no block.

use regex::Regex;
use tracing::trace;

use crate::{DetailValue, Format, PacketRecord, ParseResult};

use super::patterns::{
    IPV4_DST, IPV4_SRC, LENGTH_FIELD, MAC_DST, MAC_SRC, PROTOCOL_FIELD, capture,
};
use super::payload_lines;

const FRAME_PREFIX: &str = "Frame ";
const ETHERNET_MARKER: &str = "Ethernet II";
const IP_MARKER: &str = "Internet Protocol";
const PROTOCOL_MARKER: &str = "Protocol: ";
const LENGTH_MARKER: &str = "Length: ";

pub fn parse_wireshark(content: &str) -> ParseResult {
    let mut packets = Vec::new();
    let mut current: Option<PacketRecord> = None;

    for line in payload_lines(content) {
        if line.starts_with(FRAME_PREFIX) {
            if let Some(finished) = current.take() {
                flush(&mut packets, finished);
            }
            current = Some(PacketRecord::default());
        }
        if let Some(packet) = current.as_mut() {
            apply_line(packet, line);
        }
    }
    if let Some(finished) = current {
        flush(&mut packets, finished);
    }

    ParseResult::new(Format::Wireshark, packets)
}

fn flush(packets: &mut Vec<PacketRecord>, packet: PacketRecord) {
    if packet.has_default_protocol() {
        trace!(details = packet.details.len(), "dropping frame block without protocol");
        return;
    }
    packets.push(packet);
}

fn apply_line(packet: &mut PacketRecord, line: &str) {
    if line.contains(ETHERNET_MARKER) {
        assign_endpoints(packet, line, &MAC_SRC, &MAC_DST);
    }
    // Usually follows the Ethernet line, so IP addresses replace MACs.
    if line.contains(IP_MARKER) {
        assign_endpoints(packet, line, &IPV4_SRC, &IPV4_DST);
    }
    if line.contains(PROTOCOL_MARKER) {
        if let Some(protocol) = capture(&PROTOCOL_FIELD, line) {
            packet.protocol = protocol.to_string();
        }
    }
    if line.contains(LENGTH_MARKER) {
        if let Some(length) = capture(&LENGTH_FIELD, line).and_then(|len| len.parse().ok()) {
            packet.length = length;
        }
    }
    if !line.starts_with(FRAME_PREFIX) {
        let mut segments = line.splitn(3, ':');
        if let (Some(key), Some(value)) = (segments.next(), segments.next()) {
            let (key, value) = (key.trim(), value.trim());
            if !key.is_empty() && !value.is_empty() {
                packet
                    .details
                    .insert(key.to_string(), DetailValue::from(value));
            }
        }
    }
}

fn assign_endpoints(packet: &mut PacketRecord, line: &str, src: &Regex, dst: &Regex) {
    if let Some(source) = capture(src, line) {
        packet.source = source.to_string();
    }
    if let Some(destination) = capture(dst, line) {
        packet.destination = destination.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::parse_wireshark;
    use crate::Format;

    const TWO_FRAMES: &str = "\
Frame 1: 74 bytes on wire (592 bits), 74 bytes captured (592 bits)
Ethernet II, Src: 00:11:22:33:44:55, Dst: 66:77:88:99:aa:bb
Internet Protocol Version 4, Src: 192.168.1.10, Dst: 93.184.216.34
    Protocol: TCP (6)
    Total Length: 60
Frame 2: 90 bytes on wire (720 bits), 90 bytes captured (720 bits)
Ethernet II, Src: 66:77:88:99:aa:bb, Dst: 00:11:22:33:44:55
    Protocol: UDP (17)
    Length: 56
";

    #[test]
    fn parses_blocks_in_input_order() {
        let result = parse_wireshark(TWO_FRAMES);
        assert_eq!(result.format(), Format::Wireshark);
        assert_eq!(result.total_packets(), 2);

        let first = &result.packets()[0];
        assert_eq!(first.protocol, "TCP");
        assert_eq!(first.source, "192.168.1.10");
        assert_eq!(first.destination, "93.184.216.34");
        assert_eq!(first.length, 60);

        let second = &result.packets()[1];
        assert_eq!(second.protocol, "UDP");
        assert_eq!(second.source, "66:77:88:99:aa:bb");
        assert_eq!(second.destination, "00:11:22:33:44:55");
        assert_eq!(second.length, 56);
    }

    #[test]
    fn details_hold_trimmed_key_values_except_frame_lines() {
        let result = parse_wireshark(TWO_FRAMES);
        let details = &result.packets()[0].details;
        assert_eq!(details["Protocol"].as_str(), Some("TCP (6)"));
        assert_eq!(details["Total Length"].as_str(), Some("60"));
        assert!(details.keys().all(|key| !key.starts_with("Frame")));
    }

    #[test]
    fn detail_value_stops_at_second_colon() {
        let payload = "Frame 1\nArrival Time: Jan 1, 2024 12:00:00.000\nProtocol: TCP";
        let result = parse_wireshark(payload);
        let details = &result.packets()[0].details;
        assert_eq!(details["Arrival Time"].as_str(), Some("Jan 1, 2024 12"));

        let result = parse_wireshark(TWO_FRAMES);
        let details = &result.packets()[0].details;
        assert_eq!(details["Ethernet II, Src"].as_str(), Some("00"));
    }

    #[test]
    fn duplicate_detail_keys_keep_last_value() {
        let result = parse_wireshark("Frame 1\nProtocol: TCP\nFlags: 0x002\nFlags: 0x010");
        let details = &result.packets()[0].details;
        assert_eq!(details["Flags"].as_str(), Some("0x010"));
        assert_eq!(details.len(), 2);
    }

    #[test]
    fn blocks_without_protocol_are_dropped() {
        let payload = "Frame 1\nLength: 10\nFrame 2\nProtocol: ARP\nFrame 3\nLength: 30";
        let result = parse_wireshark(payload);
        assert_eq!(result.total_packets(), 1);
        assert_eq!(result.packets()[0].protocol, "ARP");
    }

    #[test]
    fn lines_before_first_frame_are_ignored() {
        let result = parse_wireshark("Protocol: TCP\nHeader: value\nFrame 1\nProtocol: UDP");
        assert_eq!(result.total_packets(), 1);
        let packet = &result.packets()[0];
        assert_eq!(packet.protocol, "UDP");
        assert!(!packet.details.contains_key("Header"));
    }

    #[test]
    fn ethernet_only_block_keeps_mac_endpoints() {
        let payload = "Frame 7\nEthernet II, Src: aa:bb:cc:dd:ee:ff, Dst: ff:ff:ff:ff:ff:ff\nProtocol: ARP";
        let result = parse_wireshark(payload);
        let packet = &result.packets()[0];
        assert_eq!(packet.source, "aa:bb:cc:dd:ee:ff");
        assert_eq!(packet.destination, "ff:ff:ff:ff:ff:ff");
        assert_eq!(packet.length, 0);
        assert_eq!(packet.info, "");
    }

    #[test]
    fn empty_input_yields_no_packets() {
        let result = parse_wireshark("");
        assert_eq!(result.total_packets(), 0);
        assert_eq!(result.format(), Format::Wireshark);
    }
}
