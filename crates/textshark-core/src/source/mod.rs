//! Payload sources.
//!
//! All file and stream I/O lives here. Bytes are decoded as UTF-8 lossily and
//! handed to the parser as one complete text payload; binary capture files are
//! accepted by extension but never decoded as captures.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::{ParseResult, parse_packet_data};

/// File extensions accepted as inputs (compared case-insensitively).
pub const ACCEPTED_EXTENSIONS: [&str; 6] = ["txt", "log", "json", "csv", "pcap", "pcapng"];

const BYTE_ORDER_MARK: char = '\u{feff}';

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported input extension: {}", path.display())]
    UnsupportedExtension { path: PathBuf },
}

/// Read a whole file as a text payload.
///
/// # Errors
/// Returns `SourceError::UnsupportedExtension` for extensions outside
/// `ACCEPTED_EXTENSIONS`, and `SourceError::Io` when the file cannot be read.
pub fn read_payload(path: &Path) -> Result<String, SourceError> {
    if !has_accepted_extension(path) {
        return Err(SourceError::UnsupportedExtension {
            path: path.to_path_buf(),
        });
    }
    let bytes = fs::read(path)?;
    debug!(path = %path.display(), bytes = bytes.len(), "read payload file");
    Ok(decode(&bytes))
}

/// Read a whole stream (e.g. stdin) as a text payload.
pub fn read_payload_from<R: Read>(mut reader: R) -> Result<String, SourceError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    debug!(bytes = bytes.len(), "read payload stream");
    Ok(decode(&bytes))
}

/// Read and parse a file in one step.
pub fn parse_file(path: &Path) -> Result<ParseResult, SourceError> {
    let payload = read_payload(path)?;
    Ok(parse_packet_data(&payload))
}

pub(crate) fn has_accepted_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
}

fn decode(bytes: &[u8]) -> String {
    let mut text = String::from_utf8_lossy(bytes).into_owned();
    if text.starts_with(BYTE_ORDER_MARK) {
        text.remove(0);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn accepted_extensions_ignore_case() {
        assert!(has_accepted_extension(Path::new("dump.TXT")));
        assert!(has_accepted_extension(Path::new("capture.pcapng")));
        assert!(!has_accepted_extension(Path::new("notes.md")));
        assert!(!has_accepted_extension(Path::new("no_extension")));
    }

    #[test]
    fn decode_strips_bom_and_replaces_invalid_bytes() {
        let mut bytes = "\u{feff}[]".as_bytes().to_vec();
        assert_eq!(decode(&bytes), "[]");
        bytes.push(0xff);
        assert_eq!(decode(&bytes), "[]\u{fffd}");
    }

    #[test]
    fn read_payload_from_stream() {
        let payload = read_payload_from(Cursor::new(b"line one\nline two")).unwrap();
        assert_eq!(payload, "line one\nline two");
    }

    #[test]
    fn unsupported_extension_is_rejected_before_io() {
        let err = read_payload(Path::new("/nonexistent/input.exe")).unwrap_err();
        assert!(matches!(err, SourceError::UnsupportedExtension { .. }));
    }
}
