use serde_json::Value;
use tracing::trace;

use crate::{Format, PacketRecord, ParseResult};

use super::document::JsonDocument;
use super::layers::normalize;

/// Parse a JSON payload into packets.
///
/// Invalid JSON yields an empty result still tagged `json`; no other parser is
/// tried.
pub fn parse_json(content: &str) -> ParseResult {
    let value: Value = match serde_json::from_str(content) {
        Ok(value) => value,
        Err(err) => {
            trace!(error = %err, "payload is not valid JSON");
            return ParseResult::new(Format::Json, Vec::new());
        }
    };

    let elements = match value {
        Value::Array(items) => items,
        other => vec![other],
    };
    let packets = elements.into_iter().map(document_to_packet).collect();
    ParseResult::new(Format::Json, packets)
}

fn document_to_packet(element: Value) -> PacketRecord {
    match JsonDocument::classify(element) {
        JsonDocument::Flat(doc) => doc.into_record(),
        JsonDocument::Layered(doc) => normalize(doc),
    }
}
