//! Line patterns shared by the text parsers and the detector.
//!
//! All patterns are compiled once. The `regex` engine runs in linear time, so
//! large or adversarial payloads cannot trigger catastrophic backtracking.

use std::sync::LazyLock;

use regex::Regex;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static pattern is valid")
}

/// `HH:MM:SS.fraction` capture time.
pub(crate) static CAPTURE_TIME: LazyLock<Regex> =
    LazyLock::new(|| compile(r"[0-9]{2}:[0-9]{2}:[0-9]{2}\.[0-9]+"));

/// `SOURCE > DESTINATION:` connection in capture-tool logs.
pub(crate) static CONNECTION: LazyLock<Regex> = LazyLock::new(|| compile(r"(\S+) > (\S+):"));

/// `length N` trailer in capture-tool logs.
pub(crate) static LENGTH_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| compile(r"length ([0-9]+)"));

pub(crate) static MAC_SRC: LazyLock<Regex> =
    LazyLock::new(|| compile(r"Src: ([a-fA-F0-9:]+)"));
pub(crate) static MAC_DST: LazyLock<Regex> =
    LazyLock::new(|| compile(r"Dst: ([a-fA-F0-9:]+)"));

pub(crate) static IPV4_SRC: LazyLock<Regex> =
    LazyLock::new(|| compile(r"Src: ([0-9]+\.[0-9]+\.[0-9]+\.[0-9]+)"));
pub(crate) static IPV4_DST: LazyLock<Regex> =
    LazyLock::new(|| compile(r"Dst: ([0-9]+\.[0-9]+\.[0-9]+\.[0-9]+)"));

/// Any dotted-quad shaped token.
pub(crate) static IPV4_ANYWHERE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"[0-9]+\.[0-9]+\.[0-9]+\.[0-9]+"));

/// `Protocol: NAME`, where the name is ASCII word characters only.
pub(crate) static PROTOCOL_FIELD: LazyLock<Regex> =
    LazyLock::new(|| compile(r"Protocol: ([A-Za-z0-9_]+)"));
pub(crate) static LENGTH_FIELD: LazyLock<Regex> = LazyLock::new(|| compile(r"Length: ([0-9]+)"));

/// Well-known protocol names as whole words in ASCII case-insensitive form,
/// captured in group 1. Non-ASCII letters count as word boundaries.
pub(crate) static PROTOCOL_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?:^|[^A-Za-z0-9_])((?i-u:TCP|UDP|ICMP|HTTP|HTTPS|FTP|SSH|DNS))(?:$|[^A-Za-z0-9_])",
    )
});

/// First capture group of `pattern` in `line`.
pub(crate) fn capture<'a>(pattern: &Regex, line: &'a str) -> Option<&'a str> {
    pattern
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|group| group.as_str())
}
