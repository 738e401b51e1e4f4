//! Format-specific parsers.
//!
//! Each parser consumes a complete payload and returns a `ParseResult` tagged
//! with its own format:
//! - `wireshark`: stateful scan over "Frame"-delimited protocol dumps
//! - `tcpdump`: one packet per matching log line, other lines dropped
//! - `json`: flat documents and layered search-index documents
//! - `csv`: header-driven column roles over comma-split rows
//! - `generic`: one packet per line, last resort
//!
//! Parsers are total and contain no I/O. Shared line patterns live in
//! `patterns`.

mod csv;
mod generic;
mod json;
pub(crate) mod patterns;
mod tcpdump;
mod wireshark;

pub use csv::parse_csv;
pub use generic::parse_generic;
pub use json::parse_json;
pub use tcpdump::parse_tcpdump;
pub use wireshark::parse_wireshark;

use tracing::debug;

use crate::ParseResult;
use crate::detect::select_rule;

/// Detect the payload format and parse it with the matching parser.
///
/// # Examples
/// ```
/// use textshark_core::{Format, parse_packet_data};
///
/// let result = parse_packet_data("12:00:00.123456 1.2.3.4.80 > 5.6.7.8.443: Flags [S], length 40");
/// assert_eq!(result.format(), Format::Tcpdump);
/// assert_eq!(result.packets()[0].length, 40);
/// ```
pub fn parse_packet_data(content: &str) -> ParseResult {
    let rule = select_rule(content);
    debug!(format = %rule.format, bytes = content.len(), "detected payload format");
    let result = (rule.parse)(content);
    debug!(
        format = %result.format(),
        packets = result.total_packets(),
        "parsed payload"
    );
    result
}

/// Non-blank lines of a payload, in order and otherwise untouched.
pub(crate) fn payload_lines(content: &str) -> impl Iterator<Item = &str> {
    content.lines().filter(|line| !line.trim().is_empty())
}

pub(crate) fn first_payload_line(content: &str) -> Option<&str> {
    payload_lines(content).next()
}

/// Unsigned integer from the leading digits of `text`, after leading
/// whitespace and an optional `+`. 0 when there are no digits.
pub(crate) fn integer_prefix(text: &str) -> u64 {
    let text = text.trim_start();
    let text = text.strip_prefix('+').unwrap_or(text);
    let end = text
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(text.len());
    text[..end].parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Format;

    #[test]
    fn payload_lines_skip_blank_lines_and_strip_crlf() {
        let lines: Vec<&str> = payload_lines("a\r\n\r\n   \n  b  \n").collect();
        assert_eq!(lines, vec!["a", "  b  "]);
    }

    #[test]
    fn integer_prefix_reads_leading_digits() {
        assert_eq!(integer_prefix("74 bytes"), 74);
        assert_eq!(integer_prefix("60.0"), 60);
        assert_eq!(integer_prefix("  +12"), 12);
        assert_eq!(integer_prefix("-5"), 0);
        assert_eq!(integer_prefix("n/a"), 0);
        assert_eq!(integer_prefix(""), 0);
    }

    #[test]
    fn total_packets_matches_packet_count_for_every_format() {
        let payloads = [
            r#"[{"protocol":"TCP"},{"protocol":"UDP"}]"#,
            "{not json",
            "source,destination\n1.1.1.1,2.2.2.2\n3.3.3.3,4.4.4.4",
            "Frame 1\nProtocol: TCP\nFrame 2\nProtocol: UDP",
            "12:00:00.1 a > b: x\nnoise",
            "one\ntwo\nthree",
            "",
        ];
        for payload in payloads {
            let result = parse_packet_data(payload);
            assert_eq!(result.total_packets(), result.packets().len(), "{payload}");
        }
    }

    #[test]
    fn malformed_json_is_routed_to_generic_parser() {
        let result = parse_packet_data("{not json");
        assert_eq!(result.format(), Format::Unknown);
        assert_eq!(result.total_packets(), 1);
    }

    #[test]
    fn parsing_is_deterministic_across_threads() {
        let payload = "Frame 1\nProtocol: TCP\nLength: 60\nFrame 2\nProtocol: UDP";
        let expected = parse_packet_data(payload);
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| parse_packet_data(payload)))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().expect("parser thread"), expected);
            }
        });
    }
}
