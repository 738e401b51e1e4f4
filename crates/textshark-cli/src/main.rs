use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::builder::TypedValueParser;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use comfy_table::{Cell, Table};
use glob::glob;
use tracing::info;
use tracing_subscriber::EnvFilter;

use textshark_core::view::{self, PacketFilter, PageMarker};
use textshark_core::{
    ACCEPTED_EXTENSIONS, ExportFormat, PacketRecord, ParseResult, SourceError, export_packets,
    parse_packet_data, read_payload, read_payload_from,
};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ncommit: ",
    env!("TEXTSHARK_BUILD_COMMIT_FULL"),
    "\nbuild date: ",
    env!("TEXTSHARK_BUILD_DATE"),
);

const STDIN_INPUT: &str = "-";

#[derive(Parser, Debug)]
#[command(name = "textshark")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TEXTSHARK_BUILD_COMMIT"), ")"))]
#[command(long_version = LONG_VERSION)]
#[command(
    about = "Normalize textual packet-capture exports (Wireshark text, tcpdump, JSON, CSV).",
    long_about = None,
    after_help = "Examples:\n  textshark parse capture.txt -o packets.json\n  textshark export dump.log -o packets.csv --protocol tcp\n  textshark show export.json --search 10.0.0.1 --page 2"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a capture export and write the normalized result as JSON.
    #[command(
        after_help = "Examples:\n  textshark parse capture.txt -o packets.json\n  cat dump.log | textshark parse - --stdout --pretty"
    )]
    Parse {
        /// Input file, glob pattern, or - for stdin
        input: PathBuf,

        /// Output path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        report: Option<PathBuf>,

        /// Write JSON to stdout
        #[arg(long, conflicts_with = "report")]
        stdout: bool,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,

        /// Exit with a non-zero code if no packets were parsed
        #[arg(long)]
        strict: bool,
    },
    /// Export (optionally filtered) packets as text, JSON or CSV.
    #[command(
        after_help = "Examples:\n  textshark export capture.txt -o packets.csv\n  textshark export dump.log --format text --stdout --search 443"
    )]
    Export {
        /// Input file, glob pattern, or - for stdin
        input: PathBuf,

        /// Export format (defaults from the output extension, JSON on stdout)
        #[arg(short, long, value_enum)]
        format: Option<ExportFormatArg>,

        /// Output path
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        output: Option<PathBuf>,

        /// Write the export to stdout
        #[arg(long, conflicts_with = "output")]
        stdout: bool,

        /// Keep packets whose endpoints, protocol or info contain this text
        #[arg(long)]
        search: Option<String>,

        /// Keep packets whose protocol contains this text ("all" keeps every packet)
        #[arg(long)]
        protocol: Option<String>,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,
    },
    /// Print one page of packets as a table.
    Show {
        /// Input file, glob pattern, or - for stdin
        input: PathBuf,

        /// Keep packets whose endpoints, protocol or info contain this text
        #[arg(long)]
        search: Option<String>,

        /// Keep packets whose protocol contains this text ("all" keeps every packet)
        #[arg(long)]
        protocol: Option<String>,

        /// Page to display (1-based)
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Packets per page
        #[arg(long, default_value_t = view::DEFAULT_PAGE_SIZE, value_parser = clap::value_parser!(u16).range(1..).map(usize::from))]
        per_page: usize,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ExportFormatArg {
    Text,
    Json,
    Csv,
}

impl From<ExportFormatArg> for ExportFormat {
    fn from(arg: ExportFormatArg) -> Self {
        match arg {
            ExportFormatArg::Text => ExportFormat::Text,
            ExportFormatArg::Json => ExportFormat::Json,
            ExportFormatArg::Csv => ExportFormat::Csv,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Parse {
            input,
            report,
            stdout,
            pretty,
            compact,
            quiet,
            strict,
        } => cmd_parse(input, report, stdout, pretty, compact, quiet, strict),
        Commands::Export {
            input,
            format,
            output,
            stdout,
            search,
            protocol,
            quiet,
        } => cmd_export(
            input,
            format.map(Into::into),
            output,
            stdout,
            PacketFilter { query: search, protocol },
            quiet,
        ),
        Commands::Show {
            input,
            search,
            protocol,
            page,
            per_page,
        } => cmd_show(input, PacketFilter { query: search, protocol }, page, per_page),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()))
        .with_writer(io::stderr)
        .init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

/// A parsed input together with its canonical path (absent for stdin).
struct LoadedInput {
    result: ParseResult,
    path: Option<PathBuf>,
}

fn cmd_parse(
    input: PathBuf,
    report: Option<PathBuf>,
    stdout: bool,
    pretty: bool,
    compact: bool,
    quiet: bool,
    strict: bool,
) -> Result<(), CliError> {
    let loaded = load_input(&input)?;
    let report = if stdout {
        None
    } else {
        Some(report.ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?)
    };

    let json = serialize_result(&loaded.result, pretty, compact)?;

    match report {
        None => print!("{}", json),
        Some(report) => {
            ensure_distinct_output(loaded.path.as_deref(), &report)?;
            create_parent_dir(&report)?;
            fs::write(&report, json)
                .with_context(|| format!("Failed to write result: {}", report.display()))?;
            if !quiet {
                eprintln!(
                    "OK: {} packets ({}) -> {}",
                    loaded.result.total_packets(),
                    loaded.result.format(),
                    report.display()
                );
            }
        }
    }

    if strict && loaded.result.is_empty() {
        return Err(CliError::new(
            "no packets parsed",
            Some("check that the input is a supported capture export".to_string()),
        ));
    }
    Ok(())
}

fn cmd_export(
    input: PathBuf,
    format: Option<ExportFormat>,
    output: Option<PathBuf>,
    stdout: bool,
    filter: PacketFilter,
    quiet: bool,
) -> Result<(), CliError> {
    let loaded = load_input(&input)?;
    let output = if stdout {
        None
    } else {
        Some(output.ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--output or --stdout".to_string()),
            )
        })?)
    };
    let format = resolve_export_format(format, output.as_deref())?;
    let selected = filter.apply(loaded.result.packets());
    info!(
        selected = selected.len(),
        total = loaded.result.total_packets(),
        format = format.extension(),
        "exporting packets"
    );

    match output {
        None => {
            let stdout = io::stdout();
            export_packets(selected.iter().copied(), format, stdout.lock())
                .context("Export failed")?;
        }
        Some(output) => {
            ensure_distinct_output(loaded.path.as_deref(), &output)?;
            create_parent_dir(&output)?;
            let file = fs::File::create(&output)
                .with_context(|| format!("Failed to create export: {}", output.display()))?;
            let mut writer = BufWriter::new(file);
            export_packets(selected.iter().copied(), format, &mut writer)
                .with_context(|| format!("Failed to write export: {}", output.display()))?;
            writer
                .flush()
                .with_context(|| format!("Failed to write export: {}", output.display()))?;
            if !quiet {
                eprintln!(
                    "OK: exported {} of {} packets -> {}",
                    selected.len(),
                    loaded.result.total_packets(),
                    output.display()
                );
            }
        }
    }
    Ok(())
}

fn cmd_show(
    input: PathBuf,
    filter: PacketFilter,
    page: usize,
    per_page: usize,
) -> Result<(), CliError> {
    let loaded = load_input(&input)?;
    let selected = filter.apply(loaded.result.packets());
    let page = view::paginate(&selected, page, per_page);

    let mut out = io::stdout().lock();
    render_page(&mut out, &loaded.result, &page)
        .context("Failed to write to stdout")
        .map_err(Into::into)
}

fn render_page<W: Write>(
    out: &mut W,
    result: &ParseResult,
    page: &view::Page<'_, &PacketRecord>,
) -> io::Result<()> {
    writeln!(
        out,
        "Format: {} ({} packets)",
        result.format(),
        result.total_packets()
    )?;
    if page.total_items == 0 {
        writeln!(out, "No packets match.")?;
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "#",
        "Protocol",
        "Source",
        "Destination",
        "Length",
        "Info",
        "Timestamp",
    ]);
    for (offset, packet) in page.items.iter().enumerate() {
        table.add_row(vec![
            Cell::new(page.first_index() + offset),
            Cell::new(&packet.protocol),
            Cell::new(&packet.source),
            Cell::new(&packet.destination),
            Cell::new(packet.length),
            Cell::new(&packet.info),
            Cell::new(packet.timestamp.as_deref().unwrap_or("")),
        ]);
    }
    writeln!(out, "{table}")?;
    writeln!(
        out,
        "Showing {}-{} of {} packets",
        page.first_index(),
        page.last_index(),
        page.total_items
    )?;
    if page.total_pages > 1 {
        writeln!(out, "Pages: {}", page_bar(page.page, page.total_pages))?;
    }
    Ok(())
}

fn page_bar(current: usize, total_pages: usize) -> String {
    view::visible_page_numbers(current, total_pages)
        .into_iter()
        .map(|marker| match marker {
            PageMarker::Page(n) if n == current => format!("[{n}]"),
            PageMarker::Page(n) => n.to_string(),
            PageMarker::Ellipsis => "...".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn serialize_result(result: &ParseResult, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(result)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(result)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn resolve_export_format(
    format: Option<ExportFormat>,
    output: Option<&Path>,
) -> Result<ExportFormat, CliError> {
    if let Some(format) = format {
        return Ok(format);
    }
    match output {
        None => Ok(ExportFormat::Json),
        Some(path) => ExportFormat::from_extension(path).ok_or_else(|| {
            CliError::new(
                format!("cannot infer export format from '{}'", path.display()),
                Some("use --format text|json|csv or a .txt/.json/.csv output".to_string()),
            )
        }),
    }
}

fn load_input(input: &Path) -> Result<LoadedInput, CliError> {
    if input.as_os_str() == STDIN_INPUT {
        let payload = read_payload_from(io::stdin().lock())
            .map_err(|err| CliError::new(format!("failed to read stdin: {err}"), None))?;
        let result = parse_packet_data(&payload);
        log_parsed(&result, "stdin");
        return Ok(LoadedInput { result, path: None });
    }

    let resolved = resolve_input_path(input)?;
    validate_input_file(&resolved)?;
    let payload = read_payload(&resolved).map_err(|err| match err {
        SourceError::UnsupportedExtension { path } => CliError::new(
            format!("unsupported input format '{}'", path.display()),
            Some(format!("expected one of {}", accepted_extensions_list())),
        ),
        SourceError::Io(err) => CliError::new(
            format!("failed to read input file {}: {err}", resolved.display()),
            None,
        ),
    })?;
    let path = fs::canonicalize(&resolved)
        .with_context(|| format!("Failed to resolve input path: {}", resolved.display()))?;

    let result = parse_packet_data(&payload);
    log_parsed(&result, &resolved.display().to_string());
    Ok(LoadedInput {
        result,
        path: Some(path),
    })
}

fn log_parsed(result: &ParseResult, origin: &str) {
    info!(
        origin,
        format = %result.format(),
        packets = result.total_packets(),
        "parsed input"
    );
}

fn ensure_distinct_output(input: Option<&Path>, output: &Path) -> Result<(), CliError> {
    let Some(input_abs) = input else {
        return Ok(());
    };
    let output_dir = output
        .parent()
        .map(|parent| {
            if parent.as_os_str().is_empty() {
                fs::canonicalize(".")
            } else {
                fs::canonicalize(parent)
            }
        })
        .transpose();
    // A missing output directory cannot contain the input.
    let Ok(Some(output_dir)) = output_dir else {
        return Ok(());
    };
    let file_name = output
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid output path: {}", output.display()))?;
    if output_dir.join(file_name) == input_abs {
        return Err(CliError::new(
            format!("output path must differ from input: {}", output.display()),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn create_parent_dir(path: &Path) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    Ok(())
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some(format!(
                "pass one of {}, or - for stdin",
                accepted_extensions_list()
            )),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some(format!("expected one of {}", accepted_extensions_list())),
        ));
    }
    Ok(())
}

fn accepted_extensions_list() -> String {
    ACCEPTED_EXTENSIONS
        .iter()
        .map(|ext| format!(".{ext}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some(format!(
                "check the path or quote the pattern; expected {}",
                accepted_extensions_list()
            )),
        ));
    }
    if matches.len() > 1 {
        let hint = "pass a single capture export, or run once per file".to_string();
        let mut message = format!(
            "multiple files match pattern '{}' ({} matches)",
            pattern,
            matches.len()
        );
        let listed = matches
            .iter()
            .take(3)
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>();
        message.push_str("; matches: ");
        message.push_str(&listed.join(", "));
        if matches.len() > 3 {
            message.push_str(", ...");
        }
        return Err(CliError::new(message, Some(hint)));
    }

    Ok(matches.remove(0))
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_bar_marks_current_page() {
        assert_eq!(page_bar(2, 3), "1 [2] 3");
        assert_eq!(page_bar(10, 20), "1 ... 8 9 [10] 11 12 ... 20");
    }

    #[test]
    fn export_format_from_output_or_default() {
        assert_eq!(
            resolve_export_format(None, Some(Path::new("out.csv"))).unwrap(),
            ExportFormat::Csv
        );
        assert_eq!(resolve_export_format(None, None).unwrap(), ExportFormat::Json);
        assert_eq!(
            resolve_export_format(Some(ExportFormat::Text), Some(Path::new("out.csv"))).unwrap(),
            ExportFormat::Text
        );
        assert!(resolve_export_format(None, Some(Path::new("out.bin"))).is_err());
    }

    #[test]
    fn glob_detection() {
        assert!(is_glob_pattern("captures/*.txt"));
        assert!(!is_glob_pattern("captures/dump.txt"));
    }
}
