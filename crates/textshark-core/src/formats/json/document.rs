use serde_json::{Map, Value};

use crate::{DEFAULT_ENDPOINT, DEFAULT_PROTOCOL, DetailValue, Details, PacketRecord};

use super::layout;
use super::reader::{
    first_present, leading_integer, object_field, present_length, present_text, text_field,
};

/// One JSON element, classified by the `_source.layers` discriminator.
#[derive(Debug)]
pub enum JsonDocument {
    Flat(FlatPacketDocument),
    Layered(LayeredCaptureDocument),
}

impl JsonDocument {
    pub fn classify(value: Value) -> Self {
        if let Some(layers) = value.pointer(layout::LAYERS_POINTER).and_then(Value::as_object) {
            return JsonDocument::Layered(LayeredCaptureDocument::from_layers(layers));
        }
        JsonDocument::Flat(FlatPacketDocument::from_value(value))
    }
}

/// Flat packet object read through field aliases.
#[derive(Debug)]
pub struct FlatPacketDocument {
    pub protocol: Option<String>,
    pub source: Option<String>,
    pub destination: Option<String>,
    pub length: Option<u64>,
    pub info: Option<String>,
    pub timestamp: Option<String>,
    pub raw: Value,
}

impl FlatPacketDocument {
    pub fn from_value(raw: Value) -> Self {
        let empty = Map::new();
        let fields = raw.as_object().unwrap_or(&empty);
        Self {
            protocol: first_present(fields, layout::PROTOCOL_ALIASES, present_text),
            source: first_present(fields, layout::SOURCE_ALIASES, present_text),
            destination: first_present(fields, layout::DESTINATION_ALIASES, present_text),
            length: first_present(fields, layout::LENGTH_ALIASES, present_length),
            info: first_present(fields, layout::INFO_ALIASES, present_text),
            timestamp: first_present(fields, layout::TIMESTAMP_ALIASES, present_text),
            raw,
        }
    }

    pub fn into_record(self) -> PacketRecord {
        let details = match DetailValue::from(self.raw) {
            DetailValue::Map(fields) => fields,
            other => Details::from([(layout::SCALAR_DETAILS_KEY.to_string(), other)]),
        };
        PacketRecord {
            protocol: self.protocol.unwrap_or_else(|| DEFAULT_PROTOCOL.to_string()),
            source: self.source.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            destination: self
                .destination
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            length: self.length.unwrap_or(0),
            info: self.info.unwrap_or_default(),
            timestamp: self.timestamp,
            details,
        }
    }
}

/// Search-index capture document with per-protocol layers.
#[derive(Debug)]
pub struct LayeredCaptureDocument {
    pub layers: Map<String, Value>,
    pub frame: FrameLayer,
    pub eth: AddressLayer,
    pub ip: AddressLayer,
    pub tcp: TransportLayer,
    pub udp: TransportLayer,
}

impl LayeredCaptureDocument {
    pub fn from_layers(layers: &Map<String, Value>) -> Self {
        Self {
            frame: FrameLayer::read(&object_field(layers, layout::FRAME_LAYER)),
            eth: AddressLayer::read(
                object_field(layers, layout::ETH_LAYER),
                layout::ETH_SRC,
                layout::ETH_DST,
            ),
            ip: AddressLayer::read(
                object_field(layers, layout::IP_LAYER),
                layout::IP_SRC,
                layout::IP_DST,
            ),
            tcp: TransportLayer::read(
                object_field(layers, layout::TCP_LAYER),
                layout::TCP_SRCPORT,
                layout::TCP_DSTPORT,
            ),
            udp: TransportLayer::read(
                object_field(layers, layout::UDP_LAYER),
                layout::UDP_SRCPORT,
                layout::UDP_DSTPORT,
            ),
            layers: layers.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub struct FrameLayer {
    pub number: Option<String>,
    pub time: Option<String>,
    pub len: u64,
    /// Protocol stack string, empty when absent.
    pub protocols: String,
}

impl FrameLayer {
    fn read(fields: &Map<String, Value>) -> Self {
        Self {
            number: text_field(fields, layout::FRAME_NUMBER),
            time: text_field(fields, layout::FRAME_TIME)
                .or_else(|| text_field(fields, layout::FRAME_TIME_UTC)),
            len: fields.get(layout::FRAME_LEN).map_or(0, leading_integer),
            protocols: text_field(fields, layout::FRAME_PROTOCOLS).unwrap_or_default(),
        }
    }
}

/// Ethernet or IP layer: two addresses plus the raw layer fields.
#[derive(Debug, Default)]
pub struct AddressLayer {
    pub src: Option<String>,
    pub dst: Option<String>,
    pub fields: Map<String, Value>,
}

impl AddressLayer {
    fn read(fields: Map<String, Value>, src_key: &str, dst_key: &str) -> Self {
        Self {
            src: text_field(&fields, src_key),
            dst: text_field(&fields, dst_key),
            fields,
        }
    }
}

/// TCP or UDP layer: two ports, TCP flags and the raw layer fields.
#[derive(Debug, Default)]
pub struct TransportLayer {
    pub src_port: Option<String>,
    pub dst_port: Option<String>,
    pub flags: TcpFlags,
    pub fields: Map<String, Value>,
}

impl TransportLayer {
    fn read(fields: Map<String, Value>, src_key: &str, dst_key: &str) -> Self {
        Self {
            src_port: text_field(&fields, src_key),
            dst_port: text_field(&fields, dst_key),
            flags: TcpFlags::read(&object_field(&fields, layout::TCP_FLAGS_TREE)),
            fields,
        }
    }

    /// Both ports, when both are present.
    pub fn ports(&self) -> Option<(&str, &str)> {
        Some((self.src_port.as_deref()?, self.dst_port.as_deref()?))
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TcpFlags {
    pub syn: bool,
    pub ack: bool,
    pub fin: bool,
    pub push: bool,
    pub reset: bool,
}

impl TcpFlags {
    fn read(tree: &Map<String, Value>) -> Self {
        let is_set = |key: &str| tree.get(key).and_then(Value::as_str) == Some(layout::FLAG_SET);
        Self {
            syn: is_set(layout::TCP_FLAG_SYN),
            ack: is_set(layout::TCP_FLAG_ACK),
            fin: is_set(layout::TCP_FLAG_FIN),
            push: is_set(layout::TCP_FLAG_PUSH),
            reset: is_set(layout::TCP_FLAG_RESET),
        }
    }

    /// Names of the set flags in display order.
    pub fn names(&self) -> Vec<&'static str> {
        [
            (self.syn, "SYN"),
            (self.ack, "ACK"),
            (self.fin, "FIN"),
            (self.push, "PSH"),
            (self.reset, "RST"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
        .collect()
    }
}
