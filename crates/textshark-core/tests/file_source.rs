use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use textshark_core::{Format, SourceError, parse_file, read_payload};

fn temp_path(name: &str) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("textshark_{unique}_{name}"))
}

#[test]
fn parse_file_reads_and_detects() {
    let path = temp_path("dump.log");
    fs::write(
        &path,
        "12:00:00.000001 IP 10.0.0.1.5353 > 224.0.0.251.5353: UDP, length 40\n",
    )
    .unwrap();
    let result = parse_file(&path);
    let _ = fs::remove_file(&path);

    let result = result.unwrap();
    assert_eq!(result.format(), Format::Tcpdump);
    assert_eq!(result.total_packets(), 1);
    assert_eq!(result.packets()[0].length, 40);
}

#[test]
fn binary_capture_is_read_as_lossy_text() {
    let path = temp_path("capture.pcapng");
    fs::write(&path, [0x0a, 0x0d, 0x0d, 0x0a, 0xff, 0x00]).unwrap();
    let result = parse_file(&path);
    let _ = fs::remove_file(&path);

    let result = result.unwrap();
    assert_eq!(result.format(), Format::Unknown);
    assert_eq!(result.total_packets(), result.packets().len());
}

#[test]
fn missing_file_is_io_error() {
    let path = temp_path("missing.json");
    let err = read_payload(&path).unwrap_err();
    assert!(matches!(err, SourceError::Io(_)));
}

#[test]
fn unsupported_extension_is_rejected() {
    let path = temp_path("notes.md");
    fs::write(&path, "source,destination\n").unwrap();
    let err = read_payload(&path).unwrap_err();
    let _ = fs::remove_file(&path);

    assert!(matches!(err, SourceError::UnsupportedExtension { .. }));
}
