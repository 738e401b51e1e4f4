//! Normalization of layered capture documents.
//!
//! The protocol label comes from the frame's protocol stack, tested in a fixed
//! priority that favours the outermost understood layer (a `tcp:tls` stack is
//! TLS). Endpoints prefer IP addresses over MAC addresses, then gain TCP ports,
//! or UDP ports when no TCP pair is present.

use serde_json::{Map, Value};

use crate::{DEFAULT_ENDPOINT, DEFAULT_PROTOCOL, DetailValue, Details, PacketRecord};

use super::document::LayeredCaptureDocument;
use super::layout;

pub fn normalize(doc: LayeredCaptureDocument) -> PacketRecord {
    let protocol = stack_label(&doc.frame.protocols);
    let (source, destination) = endpoints(&doc);
    let info = summary(&doc);
    let details = layer_details(&doc);

    PacketRecord {
        protocol: protocol.to_string(),
        source,
        destination,
        length: doc.frame.len,
        info,
        timestamp: doc.frame.time,
        details,
    }
}

pub fn stack_label(protocols: &str) -> &'static str {
    layout::STACK_PRIORITY
        .iter()
        .find(|(needle, _)| protocols.contains(needle))
        .map_or(DEFAULT_PROTOCOL, |(_, label)| *label)
}

fn endpoints(doc: &LayeredCaptureDocument) -> (String, String) {
    let address_layer = if doc.ip.src.is_some() {
        Some(&doc.ip)
    } else if doc.eth.src.is_some() {
        Some(&doc.eth)
    } else {
        None
    };
    let (mut source, mut destination) = match address_layer {
        Some(layer) => (
            layer.src.clone().unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            layer.dst.clone().unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        ),
        None => (DEFAULT_ENDPOINT.to_string(), DEFAULT_ENDPOINT.to_string()),
    };

    if let Some((src_port, dst_port)) = doc.tcp.ports().or_else(|| doc.udp.ports()) {
        source.push(':');
        source.push_str(src_port);
        destination.push(':');
        destination.push_str(dst_port);
    }
    (source, destination)
}

fn summary(doc: &LayeredCaptureDocument) -> String {
    let number = doc.frame.number.as_deref().unwrap_or(DEFAULT_PROTOCOL);
    let mut info = format!("Frame {number}");
    if !doc.frame.protocols.is_empty() {
        info.push_str(&format!(" ({})", doc.frame.protocols));
    }
    let flags = doc.tcp.flags.names();
    if !flags.is_empty() {
        info.push_str(&format!(" [{}]", flags.join(", ")));
    }
    info
}

fn layer_details(doc: &LayeredCaptureDocument) -> Details {
    let mut details = Details::new();
    details.insert(
        layout::DETAILS_FRAME_NUMBER.to_string(),
        DetailValue::from(doc.frame.number.as_deref().unwrap_or(DEFAULT_PROTOCOL)),
    );
    details.insert(
        layout::DETAILS_LAYERS.to_string(),
        object_value(&doc.layers),
    );
    details.insert(
        layout::DETAILS_PROTOCOLS.to_string(),
        DetailValue::from(doc.frame.protocols.as_str()),
    );

    let flattened = [
        (layout::DETAILS_ETHERNET, &doc.eth.fields),
        (layout::DETAILS_IP, &doc.ip.fields),
        (layout::DETAILS_TCP, &doc.tcp.fields),
        (layout::DETAILS_UDP, &doc.udp.fields),
    ];
    for (key, fields) in flattened {
        if !fields.is_empty() {
            details.insert(key.to_string(), object_value(fields));
        }
    }
    details
}

fn object_value(fields: &Map<String, Value>) -> DetailValue {
    DetailValue::from(Value::Object(fields.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn layered(layers: Value) -> LayeredCaptureDocument {
        LayeredCaptureDocument::from_layers(layers.as_object().expect("layers object"))
    }

    #[test]
    fn stack_label_prefers_outermost_known_layer() {
        assert_eq!(stack_label("eth:ethertype:ip:tcp:tls"), "TLS");
        assert_eq!(stack_label("eth:ethertype:ip:tcp:http"), "HTTP");
        assert_eq!(stack_label("eth:ethertype:ip:tcp"), "TCP");
        assert_eq!(stack_label("eth:ethertype:ip:udp:dns"), "UDP");
        assert_eq!(stack_label("eth:ethertype:arp"), "ARP");
        assert_eq!(stack_label(""), "Unknown");
    }

    #[test]
    fn ip_endpoints_gain_tcp_ports() {
        let packet = normalize(layered(json!({
            "frame": {"frame.number": "3", "frame.len": "66", "frame.protocols": "eth:ethertype:ip:tcp"},
            "eth": {"eth.src": "00:11:22:33:44:55", "eth.dst": "66:77:88:99:aa:bb"},
            "ip": {"ip.src": "10.0.0.1", "ip.dst": "10.0.0.2"},
            "tcp": {
                "tcp.srcport": "1234",
                "tcp.dstport": "80",
                "tcp.flags_tree": {"tcp.flags.syn": "1", "tcp.flags.ack": "1"}
            },
            "udp": {"udp.srcport": "9", "udp.dstport": "9"}
        })));
        assert_eq!(packet.protocol, "TCP");
        assert_eq!(packet.source, "10.0.0.1:1234");
        assert_eq!(packet.destination, "10.0.0.2:80");
        assert_eq!(packet.length, 66);
        assert_eq!(packet.info, "Frame 3 (eth:ethertype:ip:tcp) [SYN, ACK]");
        assert_eq!(packet.timestamp, None);
    }

    #[test]
    fn mac_endpoints_used_without_ip_and_udp_ports_appended() {
        let packet = normalize(layered(json!({
            "frame": {"frame.number": "9", "frame.protocols": "eth:llc:udp", "frame.time": "Jan  1, 2024"},
            "eth": {"eth.src": "aa:aa:aa:aa:aa:aa", "eth.dst": "bb:bb:bb:bb:bb:bb"},
            "udp": {"udp.srcport": "68", "udp.dstport": "67"}
        })));
        assert_eq!(packet.source, "aa:aa:aa:aa:aa:aa:68");
        assert_eq!(packet.destination, "bb:bb:bb:bb:bb:bb:67");
        assert_eq!(packet.timestamp.as_deref(), Some("Jan  1, 2024"));
        assert_eq!(packet.length, 0);
    }

    #[test]
    fn empty_layers_produce_placeholders() {
        let packet = normalize(layered(json!({})));
        assert_eq!(packet.protocol, "Unknown");
        assert_eq!(packet.source, "Unknown");
        assert_eq!(packet.destination, "Unknown");
        assert_eq!(packet.info, "Frame Unknown");
        let keys: Vec<&str> = packet.details.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["frameNumber", "layers", "protocols"]);
    }

    #[test]
    fn details_include_only_non_empty_layers() {
        let packet = normalize(layered(json!({
            "frame": {"frame.number": "1"},
            "ip": {"ip.src": "10.0.0.1"},
            "tcp": {}
        })));
        assert!(packet.details.contains_key("ip"));
        assert!(!packet.details.contains_key("tcp"));
        assert!(!packet.details.contains_key("ethernet"));
        assert_eq!(packet.destination, "Unknown");
        let layers = packet.details["layers"].as_map().expect("layers map");
        assert!(layers.contains_key("tcp"));
    }
}
