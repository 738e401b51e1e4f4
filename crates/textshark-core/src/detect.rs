//! Format detection.
//!
//! Detection is an ordered list of rules evaluated top to bottom; the first
//! rule whose predicate holds decides both the format tag and the parser.
//! The order is part of the contract: a payload that is valid JSON is JSON
//! even when it also looks like a CSV table or a protocol dump.

use serde_json::Value;

use crate::formats::patterns::CAPTURE_TIME;
use crate::formats::{
    first_payload_line, parse_csv, parse_generic, parse_json, parse_tcpdump, parse_wireshark,
};
use crate::{Format, ParseResult};

/// One detection rule: a predicate over the whole payload and its parser.
#[derive(Clone, Copy)]
pub struct FormatRule {
    pub format: Format,
    pub matches: fn(&str) -> bool,
    pub parse: fn(&str) -> ParseResult,
}

/// Detection rules in precedence order. The last rule always matches.
pub static FORMAT_RULES: [FormatRule; 5] = [
    FormatRule {
        format: Format::Json,
        matches: is_json,
        parse: parse_json,
    },
    FormatRule {
        format: Format::Csv,
        matches: is_csv,
        parse: parse_csv,
    },
    FormatRule {
        format: Format::Wireshark,
        matches: is_wireshark,
        parse: parse_wireshark,
    },
    FormatRule {
        format: Format::Tcpdump,
        matches: is_tcpdump,
        parse: parse_tcpdump,
    },
    FormatRule {
        format: Format::Unknown,
        matches: |_| true,
        parse: parse_generic,
    },
];

const WIRESHARK_MARKERS: [&str; 3] = ["Frame ", "Ethernet II", "Internet Protocol"];

/// Classify a payload into one format tag.
///
/// # Examples
/// ```
/// use textshark_core::{Format, detect_format};
///
/// assert_eq!(detect_format("[]"), Format::Json);
/// assert_eq!(detect_format("Frame 1: 60 bytes"), Format::Wireshark);
/// assert_eq!(detect_format("just some text"), Format::Unknown);
/// ```
pub fn detect_format(content: &str) -> Format {
    select_rule(content).format
}

pub(crate) fn select_rule(content: &str) -> &'static FormatRule {
    FORMAT_RULES
        .iter()
        .find(|rule| (rule.matches)(content))
        .unwrap_or(&FORMAT_RULES[FORMAT_RULES.len() - 1])
}

fn is_json(content: &str) -> bool {
    serde_json::from_str::<Value>(content).is_ok()
}

fn is_csv(content: &str) -> bool {
    first_payload_line(content)
        .is_some_and(|line| line.contains(',') && line.to_lowercase().contains("source"))
}

fn is_wireshark(content: &str) -> bool {
    WIRESHARK_MARKERS
        .iter()
        .any(|marker| content.contains(marker))
}

fn is_tcpdump(content: &str) -> bool {
    CAPTURE_TIME.is_match(content) && content.contains(" > ")
}
