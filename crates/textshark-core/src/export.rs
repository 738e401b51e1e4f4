//! Re-serialization of parsed packets.
//!
//! Exports are field-preserving: every packet field, the details bag
//! included, appears in each format. JSON exports are plain packet arrays and
//! parse back as `json` with the same packet count.

use std::io::{self, Write};
use std::path::Path;

use thiserror::Error;

use crate::{DetailValue, PacketRecord};

/// CSV export columns, in order.
pub const CSV_HEADERS: [&str; 7] = [
    "Protocol",
    "Source",
    "Destination",
    "Length",
    "Info",
    "Timestamp",
    "Details",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// One `key: value` block per packet.
    Text,
    /// Pretty-printed array of packets.
    Json,
    /// Fully quoted table with the details bag as a JSON cell.
    Csv,
}

impl ExportFormat {
    /// Infer the export format from a file extension.
    ///
    /// # Examples
    /// ```
    /// use std::path::Path;
    ///
    /// use textshark_core::ExportFormat;
    ///
    /// assert_eq!(ExportFormat::from_extension(Path::new("out.CSV")), Some(ExportFormat::Csv));
    /// assert_eq!(ExportFormat::from_extension(Path::new("out.bin")), None);
    /// ```
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "txt" | "text" | "log" => Some(ExportFormat::Text),
            "json" => Some(ExportFormat::Json),
            "csv" => Some(ExportFormat::Csv),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),
}

/// Write packets to `writer` in the requested format.
///
/// # Errors
/// Returns `ExportError` when serialization or the underlying writer fails.
pub fn export_packets<'a, I, W>(
    packets: I,
    format: ExportFormat,
    writer: W,
) -> Result<(), ExportError>
where
    I: IntoIterator<Item = &'a PacketRecord>,
    W: Write,
{
    let packets: Vec<&PacketRecord> = packets.into_iter().collect();
    match format {
        ExportFormat::Text => write_text(&packets, writer),
        ExportFormat::Json => write_json(&packets, writer),
        ExportFormat::Csv => write_csv(&packets, writer),
    }
}

/// Export into an in-memory string.
///
/// # Examples
/// ```
/// use textshark_core::{ExportFormat, export_to_string, parse_packet_data};
///
/// let result = parse_packet_data(r#"[{"protocol":"DNS","length":70}]"#);
/// let json = export_to_string(result.packets(), ExportFormat::Json).unwrap();
/// let again = parse_packet_data(&json);
/// assert_eq!(again.total_packets(), 1);
/// assert_eq!(again.packets()[0].protocol, "DNS");
/// ```
pub fn export_to_string<'a, I>(packets: I, format: ExportFormat) -> Result<String, ExportError>
where
    I: IntoIterator<Item = &'a PacketRecord>,
{
    let mut buffer = Vec::new();
    export_packets(packets, format, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn write_json<W: Write>(packets: &[&PacketRecord], mut writer: W) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(&mut writer, packets)?;
    writeln!(writer)?;
    Ok(())
}

fn write_csv<W: Write>(packets: &[&PacketRecord], writer: W) -> Result<(), ExportError> {
    let mut csv = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);
    csv.write_record(CSV_HEADERS)?;
    for packet in packets {
        let length = packet.length.to_string();
        let details = serde_json::to_string(&packet.details)?;
        csv.write_record([
            packet.protocol.as_str(),
            packet.source.as_str(),
            packet.destination.as_str(),
            length.as_str(),
            packet.info.as_str(),
            packet.timestamp.as_deref().unwrap_or(""),
            details.as_str(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

fn write_text<W: Write>(packets: &[&PacketRecord], mut writer: W) -> Result<(), ExportError> {
    for (index, packet) in packets.iter().enumerate() {
        if index > 0 {
            writeln!(writer)?;
        }
        writeln!(writer, "Packet {}", index + 1)?;
        writeln!(writer, "protocol: {}", packet.protocol)?;
        writeln!(writer, "source: {}", packet.source)?;
        writeln!(writer, "destination: {}", packet.destination)?;
        writeln!(writer, "length: {}", packet.length)?;
        writeln!(writer, "info: {}", packet.info)?;
        if let Some(timestamp) = &packet.timestamp {
            writeln!(writer, "timestamp: {timestamp}")?;
        }
        if !packet.details.is_empty() {
            writeln!(writer, "details:")?;
            for (key, value) in &packet.details {
                writeln!(writer, "  {key}: {}", detail_text(value)?)?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

fn detail_text(value: &DetailValue) -> Result<String, ExportError> {
    match value {
        DetailValue::Text(text) => Ok(text.clone()),
        other => Ok(serde_json::to_string(other)?),
    }
}
