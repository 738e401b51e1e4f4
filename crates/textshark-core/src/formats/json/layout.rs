/// JSON pointer that marks a layered capture document.
pub const LAYERS_POINTER: &str = "/_source/layers";

pub const PROTOCOL_ALIASES: &[&str] = &["protocol"];
pub const SOURCE_ALIASES: &[&str] = &["source", "src"];
pub const DESTINATION_ALIASES: &[&str] = &["destination", "dst"];
pub const LENGTH_ALIASES: &[&str] = &["length", "size"];
pub const INFO_ALIASES: &[&str] = &["info", "description"];
pub const TIMESTAMP_ALIASES: &[&str] = &["timestamp", "time"];

/// Details key for a top-level value that is not an object.
pub const SCALAR_DETAILS_KEY: &str = "value";

pub const FRAME_LAYER: &str = "frame";
pub const ETH_LAYER: &str = "eth";
pub const IP_LAYER: &str = "ip";
pub const TCP_LAYER: &str = "tcp";
pub const UDP_LAYER: &str = "udp";

pub const FRAME_NUMBER: &str = "frame.number";
pub const FRAME_TIME: &str = "frame.time";
pub const FRAME_TIME_UTC: &str = "frame.time_utc";
pub const FRAME_LEN: &str = "frame.len";
pub const FRAME_PROTOCOLS: &str = "frame.protocols";

pub const ETH_SRC: &str = "eth.src";
pub const ETH_DST: &str = "eth.dst";
pub const IP_SRC: &str = "ip.src";
pub const IP_DST: &str = "ip.dst";
pub const TCP_SRCPORT: &str = "tcp.srcport";
pub const TCP_DSTPORT: &str = "tcp.dstport";
pub const UDP_SRCPORT: &str = "udp.srcport";
pub const UDP_DSTPORT: &str = "udp.dstport";

pub const TCP_FLAGS_TREE: &str = "tcp.flags_tree";
pub const TCP_FLAG_SYN: &str = "tcp.flags.syn";
pub const TCP_FLAG_ACK: &str = "tcp.flags.ack";
pub const TCP_FLAG_FIN: &str = "tcp.flags.fin";
pub const TCP_FLAG_PUSH: &str = "tcp.flags.push";
pub const TCP_FLAG_RESET: &str = "tcp.flags.reset";
/// Value of a set TCP flag.
pub const FLAG_SET: &str = "1";

/// Protocol-stack substrings and their labels, outermost layer first.
pub const STACK_PRIORITY: [(&str, &str); 7] = [
    ("tls", "TLS"),
    ("http", "HTTP"),
    ("tcp", "TCP"),
    ("udp", "UDP"),
    ("icmp", "ICMP"),
    ("arp", "ARP"),
    ("dns", "DNS"),
];

pub const DETAILS_FRAME_NUMBER: &str = "frameNumber";
pub const DETAILS_LAYERS: &str = "layers";
pub const DETAILS_PROTOCOLS: &str = "protocols";
pub const DETAILS_ETHERNET: &str = "ethernet";
pub const DETAILS_IP: &str = "ip";
pub const DETAILS_TCP: &str = "tcp";
pub const DETAILS_UDP: &str = "udp";
