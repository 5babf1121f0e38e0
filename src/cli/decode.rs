use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, Read, Write};
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use serde::Serialize;
use thiserror::Error;

use crate::config::DecoderConfig;
use crate::drivers::xbox_ble::{
    decoder::{DecodeError, DecodedReport},
    router::AttRouter,
    tree::{LabelStyle, ReportTree, Summary, SummaryStyle},
};

/// Represents all possible errors reading a capture record
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Invalid hex payload: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("Invalid ATT handle: {0}")]
    InvalidHandle(String),
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Field tree with labels
    #[default]
    Tree,
    /// One JSON object per report
    Json,
    /// Protocol and info columns only
    Summary,
}

#[derive(Args, Debug, Clone)]
pub struct DecodeCommand {
    /// Reports as hex strings (e.g. "00 64 ff 9c ...")
    pub reports: Vec<String>,
    /// Capture log to read records from, one "[HANDLE:] HEX" record per
    /// line. Use "-" to read from stdin.
    #[arg(long, short)]
    pub file: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Tree)]
    pub format: OutputFormat,
    /// Override the label style from the config
    #[arg(long, value_enum)]
    pub labels: Option<LabelStyle>,
    /// Override the summary style from the config
    #[arg(long, value_enum)]
    pub summary: Option<SummaryStyle>,
}

/// One line of a capture log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRecord {
    /// ATT handle the payload was received on, if the log records one
    pub handle: Option<u16>,
    pub payload: Vec<u8>,
}

impl CaptureRecord {
    /// Parse a record like "0x001e: 00 64 ff 9c", "0064ff9c" or
    /// "00:64:ff:9c". Returns `None` for blank lines and comments.
    pub fn parse(line: &str) -> Option<Result<Self, RecordError>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let (handle, payload) = split_handle(line);
        let handle = match handle.map(parse_handle).transpose() {
            Ok(handle) => handle,
            Err(e) => return Some(Err(e)),
        };

        let digits: String = payload
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ':')
            .collect();
        let result = hex::decode(digits)
            .map(|payload| Self { handle, payload })
            .map_err(RecordError::from);
        Some(result)
    }
}

/// Split the handle prefix off a record. A colon directly between two single
/// bytes ("00:64") separates payload bytes, not a handle.
fn split_handle(line: &str) -> (Option<&str>, &str) {
    let Some((prefix, rest)) = line.split_once(':') else {
        return (None, line);
    };
    let prefix = prefix.trim();
    if prefix.len() == 2 && !rest.starts_with(char::is_whitespace) {
        return (None, line);
    }
    (Some(prefix), rest)
}

fn parse_handle(value: &str) -> Result<u16, RecordError> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    u16::from_str_radix(digits, 16).map_err(|_| RecordError::InvalidHandle(value.to_string()))
}

#[derive(Debug, Serialize)]
struct Truncation {
    bytes_available: usize,
    bytes_expected: usize,
}

#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    handle: Option<u16>,
    summary: &'a Summary,
    report: &'a DecodedReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    truncated: Option<Truncation>,
}

/// Decoded record ready to be printed
#[derive(Debug)]
pub struct DecodedRecord {
    pub index: usize,
    pub handle: Option<u16>,
    pub report: DecodedReport,
    pub truncated: Option<(usize, usize)>,
}

/// Decode a record with the router. Records that carry a handle are only
/// decoded if the handle is routed; records without one are always decoded.
pub fn decode_record(
    router: &AttRouter,
    index: usize,
    record: &CaptureRecord,
) -> Option<DecodedRecord> {
    let result = match record.handle {
        Some(handle) => router.dispatch(handle, &record.payload)?,
        None => router.decoder().decode(&record.payload),
    };
    let (report, truncated) = match result {
        Ok(report) => (report, None),
        Err(e) => {
            log::warn!("Record {index}: {e}");
            let truncated = match &e {
                DecodeError::TruncatedPacket {
                    bytes_available,
                    bytes_expected,
                    ..
                } => (*bytes_available, *bytes_expected),
            };
            (e.into_partial(), Some(truncated))
        }
    };

    Some(DecodedRecord {
        index,
        handle: record.handle,
        report,
        truncated,
    })
}

/// How decoded records are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub labels: LabelStyle,
    pub summary: SummaryStyle,
    pub format: OutputFormat,
}

/// Number of records decoded and skipped by [decode_lines]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    pub decoded: usize,
    pub skipped: usize,
}

pub fn handle_decode(
    config: &DecoderConfig,
    cmd: DecodeCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = RenderOptions {
        labels: cmd.labels.unwrap_or(config.labels),
        summary: cmd.summary.unwrap_or(config.summary),
        format: cmd.format,
    };
    let router = config.router();

    // Records from the arguments come first, then the capture log
    let args: String = cmd
        .reports
        .iter()
        .map(|report| format!("{report}\n"))
        .collect();
    let capture: Box<dyn BufRead> = match cmd.file.as_ref() {
        None => Box::new(io::empty()),
        Some(path) if path.as_os_str() == "-" => Box::new(BufReader::new(io::stdin())),
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
    };
    let reader = Cursor::new(args).chain(capture);

    let stats = decode_lines(&router, reader, &mut io::stdout().lock(), options)?;
    log::info!(
        "Decoded {} report(s), skipped {} record(s)",
        stats.decoded,
        stats.skipped
    );

    Ok(())
}

/// Decode every record read from the given reader and write the rendered
/// reports. Records that fail to parse or are not routed are logged and
/// skipped; decoding continues with the next line.
pub fn decode_lines<R: BufRead, W: Write>(
    router: &AttRouter,
    reader: R,
    out: &mut W,
    options: RenderOptions,
) -> Result<DecodeStats, Box<dyn std::error::Error>> {
    let mut stats = DecodeStats::default();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let record = match CaptureRecord::parse(&line) {
            None => continue,
            Some(Ok(record)) => record,
            Some(Err(e)) => {
                log::error!("Record {index}: {e}");
                stats.skipped += 1;
                continue;
            }
        };
        let Some(record) = decode_record(router, index, &record) else {
            stats.skipped += 1;
            continue;
        };
        stats.decoded += 1;
        write_record(out, &record, router, options)?;
    }

    Ok(stats)
}

fn write_record<W: Write>(
    out: &mut W,
    record: &DecodedRecord,
    router: &AttRouter,
    options: RenderOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let tree = ReportTree::new(
        &record.report,
        router.decoder().layout(),
        options.labels,
        options.summary,
    );
    match options.format {
        OutputFormat::Tree => {
            writeln!(out, "#{}  {}", record.index, tree.summary)?;
            if let Some((available, expected)) = record.truncated {
                writeln!(out, "[Truncated: {available} of {expected} bytes]")?;
            }
            writeln!(out, "{tree}")?;
        }
        OutputFormat::Json => {
            let output = JsonOutput {
                index: record.index,
                handle: record.handle,
                summary: &tree.summary,
                report: &record.report,
                truncated: record
                    .truncated
                    .map(|(bytes_available, bytes_expected)| Truncation {
                        bytes_available,
                        bytes_expected,
                    }),
            };
            writeln!(out, "{}", serde_json::to_string(&output)?)?;
        }
        OutputFormat::Summary => {
            writeln!(out, "#{}  {}", record.index, tree.summary)?;
        }
    }

    Ok(())
}
