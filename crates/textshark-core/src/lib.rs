//! TextShark core library for normalizing textual capture exports.
//!
//! This crate turns loosely-structured traffic exports into one uniform
//! sequence of packet records: protocol-analyzer text dumps, one-line-per-packet
//! capture logs, JSON documents (flat or layered search-index style) and CSV
//! tables. A payload is classified once by an ordered rule list
//! (`detect`), then consumed by exactly one format parser (`formats`).
//! Parsing is a pure function of the input text; all I/O is isolated in
//! `source`, and the read-only presentation helpers live in `view` and
//! `export`.
//!
//! Invariants:
//! - `ParseResult::total_packets()` always equals the number of packets.
//! - Packets keep their order of appearance; nothing is sorted or deduplicated.
//! - Missing fields resolve to `Unknown` / `0` / empty text, never to errors.
//!
//! # Examples
//! ```
//! use textshark_core::{Format, parse_packet_data};
//!
//! let result = parse_packet_data("source,destination,protocol\n10.0.0.1,10.0.0.2,UDP");
//! assert_eq!(result.format(), Format::Csv);
//! assert_eq!(result.total_packets(), 1);
//! assert_eq!(result.packets()[0].protocol, "UDP");
//! ```

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

mod detect;
pub mod export;
mod formats;
mod source;
pub mod view;

pub use detect::{FORMAT_RULES, FormatRule, detect_format};
pub use export::{ExportError, ExportFormat, export_packets, export_to_string};
pub use formats::parse_packet_data;
pub use source::{ACCEPTED_EXTENSIONS, SourceError, parse_file, read_payload, read_payload_from};

/// Protocol label used when no protocol could be determined.
pub const DEFAULT_PROTOCOL: &str = "Unknown";
/// Endpoint label used when no address could be determined.
pub const DEFAULT_ENDPOINT: &str = "Unknown";
/// Details key holding the unmodified input line for line-oriented formats.
pub const RAW_LINE_KEY: &str = "rawLine";

/// Ordered, string-keyed bag of format-specific fields.
pub type Details = IndexMap<String, DetailValue>;

/// Value stored in a details bag.
///
/// Serializes as plain JSON, so a details bag round-trips through exports.
///
/// # Examples
/// ```
/// use textshark_core::DetailValue;
///
/// let value = DetailValue::from(serde_json::json!({"ip.src": "10.0.0.1"}));
/// let map = value.as_map().expect("nested map");
/// assert_eq!(map["ip.src"].as_str(), Some("10.0.0.1"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetailValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    List(Vec<DetailValue>),
    Map(Details),
}

impl DetailValue {
    /// Borrow the text content, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DetailValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Borrow the nested map, if this is a map value.
    pub fn as_map(&self) -> Option<&Details> {
        match self {
            DetailValue::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl From<Value> for DetailValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => DetailValue::Null,
            Value::Bool(flag) => DetailValue::Bool(flag),
            Value::Number(number) => DetailValue::Number(number),
            Value::String(text) => DetailValue::Text(text),
            Value::Array(items) => {
                DetailValue::List(items.into_iter().map(DetailValue::from).collect())
            }
            Value::Object(fields) => DetailValue::Map(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, DetailValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for DetailValue {
    fn from(value: &str) -> Self {
        DetailValue::Text(value.to_string())
    }
}

impl From<String> for DetailValue {
    fn from(value: String) -> Self {
        DetailValue::Text(value)
    }
}

/// Input format recognised by the detector.
///
/// # Examples
/// ```
/// use textshark_core::Format;
///
/// assert_eq!(Format::Tcpdump.as_str(), "tcpdump");
/// assert_eq!(serde_json::to_string(&Format::Unknown).unwrap(), "\"unknown\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Wireshark,
    Tcpdump,
    Json,
    Csv,
    Unknown,
}

impl Format {
    /// Lowercase tag used in serialized results.
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Wireshark => "wireshark",
            Format::Tcpdump => "tcpdump",
            Format::Json => "json",
            Format::Csv => "csv",
            Format::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized packet.
///
/// # Examples
/// ```
/// use textshark_core::PacketRecord;
///
/// let packet = PacketRecord::default();
/// assert_eq!(packet.protocol, "Unknown");
/// assert_eq!(packet.length, 0);
/// assert!(packet.details.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketRecord {
    /// Short protocol label (e.g., "TCP").
    pub protocol: String,
    /// Source endpoint, `address` or `address:port`.
    pub source: String,
    /// Destination endpoint, `address` or `address:port`.
    pub destination: String,
    /// Packet length in bytes (0 when unknown).
    pub length: u64,
    /// Free-text summary.
    pub info: String,
    /// Capture time as found in the input, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Format-specific raw fields kept for inspection.
    #[serde(default)]
    pub details: Details,
}

impl Default for PacketRecord {
    fn default() -> Self {
        Self {
            protocol: DEFAULT_PROTOCOL.to_string(),
            source: DEFAULT_ENDPOINT.to_string(),
            destination: DEFAULT_ENDPOINT.to_string(),
            length: 0,
            info: String::new(),
            timestamp: None,
            details: Details::new(),
        }
    }
}

impl PacketRecord {
    /// Whether the protocol is still the `Unknown` placeholder.
    pub fn has_default_protocol(&self) -> bool {
        self.protocol == DEFAULT_PROTOCOL
    }
}

/// Result of a single parse: packets in input order plus the detected format.
///
/// The packet count is derived from the packet list at construction, so the
/// two can never disagree.
///
/// # Examples
/// ```
/// use textshark_core::{Format, PacketRecord, ParseResult};
///
/// let result = ParseResult::new(Format::Csv, vec![PacketRecord::default()]);
/// assert_eq!(result.total_packets(), 1);
///
/// let value = serde_json::to_value(&result).unwrap();
/// assert_eq!(value["totalPackets"], 1);
/// assert_eq!(value["format"], "csv");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    packets: Vec<PacketRecord>,
    format: Format,
    total_packets: usize,
}

impl ParseResult {
    pub fn new(format: Format, packets: Vec<PacketRecord>) -> Self {
        Self {
            total_packets: packets.len(),
            packets,
            format,
        }
    }

    pub fn packets(&self) -> &[PacketRecord] {
        &self.packets
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn total_packets(&self) -> usize {
        self.total_packets
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    pub fn into_packets(self) -> Vec<PacketRecord> {
        self.packets
    }
}
