//! One-line-per-packet capture-tool logs.
//!
//! Unlike the other parsers, lines that do not carry both a capture time and
//! a `SOURCE > DESTINATION:` pair produce no packet at all.

use tracing::trace;

use crate::{
    DEFAULT_PROTOCOL, DetailValue, Details, Format, PacketRecord, ParseResult, RAW_LINE_KEY,
};

use super::patterns::{CAPTURE_TIME, CONNECTION, LENGTH_KEYWORD, capture};
use super::payload_lines;

/// Protocol names checked in this order, case-insensitively.
const PROTOCOL_ORDER: [&str; 5] = ["UDP", "TCP", "ICMP", "ARP", "DNS"];

pub fn parse_tcpdump(content: &str) -> ParseResult {
    let packets = payload_lines(content).filter_map(parse_line).collect();
    ParseResult::new(Format::Tcpdump, packets)
}

fn parse_line(line: &str) -> Option<PacketRecord> {
    let Some(timestamp) = CAPTURE_TIME.find(line) else {
        trace!(line, "skipping line without capture time");
        return None;
    };
    let Some(connection) = CONNECTION.captures(line) else {
        trace!(line, "skipping line without connection");
        return None;
    };

    let length = capture(&LENGTH_KEYWORD, line)
        .and_then(|len| len.parse().ok())
        .unwrap_or(0);
    let info = match line.split_once(": ") {
        Some((_, rest)) if !rest.is_empty() => rest,
        _ => line,
    };
    let mut details = Details::new();
    details.insert(RAW_LINE_KEY.to_string(), DetailValue::from(line));

    Some(PacketRecord {
        protocol: protocol_label(line).to_string(),
        source: connection[1].to_string(),
        destination: connection[2].to_string(),
        length,
        info: info.to_string(),
        timestamp: Some(timestamp.as_str().to_string()),
        details,
    })
}

fn protocol_label(line: &str) -> &'static str {
    let upper = line.to_ascii_uppercase();
    PROTOCOL_ORDER
        .iter()
        .copied()
        .find(|name| upper.contains(name))
        .unwrap_or(DEFAULT_PROTOCOL)
}

#[cfg(test)]
mod tests {
    use super::parse_tcpdump;
    use crate::{Format, RAW_LINE_KEY};

    #[test]
    fn parses_tcp_handshake_line() {
        let line = "12:00:00.123456 1.2.3.4.80 > 5.6.7.8.443: Flags [S], length 40";
        let result = parse_tcpdump(line);
        assert_eq!(result.format(), Format::Tcpdump);
        assert_eq!(result.total_packets(), 1);

        let packet = &result.packets()[0];
        assert_eq!(packet.timestamp.as_deref(), Some("12:00:00.123456"));
        assert_eq!(packet.source, "1.2.3.4.80");
        assert_eq!(packet.destination, "5.6.7.8.443");
        assert_eq!(packet.length, 40);
        assert_eq!(packet.protocol, "Unknown");
        assert_eq!(packet.info, "Flags [S], length 40");
        assert_eq!(packet.details[RAW_LINE_KEY].as_str(), Some(line));
    }

    #[test]
    fn lines_without_arrow_or_time_are_dropped() {
        let payload = "\
12:00:00.100000 10.0.0.1.5000 10.0.0.2.53: UDP, length 20
listening on eth0, link-type EN10MB
12:00:01.000000 IP 10.0.0.1.5000 > 10.0.0.2.53: UDP, length 31
";
        let result = parse_tcpdump(payload);
        assert_eq!(result.total_packets(), 1);
        assert_eq!(result.packets()[0].length, 31);
    }

    #[test]
    fn protocol_is_first_match_in_fixed_order() {
        let result = parse_tcpdump("12:00:00.1 a > b: tcp over udp tunnel");
        assert_eq!(result.packets()[0].protocol, "UDP");

        let result = parse_tcpdump("12:00:00.1 a > b: ICMP echo request, icmp");
        assert_eq!(result.packets()[0].protocol, "ICMP");

        let result = parse_tcpdump("12:00:00.1 a > b: dns query");
        assert_eq!(result.packets()[0].protocol, "DNS");
    }

    #[test]
    fn missing_length_defaults_to_zero() {
        let result = parse_tcpdump("12:00:00.1 a > b: ARP who-has");
        let packet = &result.packets()[0];
        assert_eq!(packet.length, 0);
        assert_eq!(packet.protocol, "ARP");
    }

    #[test]
    fn info_falls_back_to_whole_line() {
        let line = "12:00:00.1 a > b:";
        let result = parse_tcpdump(line);
        assert_eq!(result.packets()[0].info, line);
    }

    #[test]
    fn empty_input_yields_no_packets() {
        assert_eq!(parse_tcpdump("").total_packets(), 0);
    }
}
