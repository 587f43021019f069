use std::path::{Path, PathBuf};

use thiserror::Error;

use super::encoding::TextEncoding;
use super::model::{RawTable, RecordSet};
use super::normalize::normalize;
use crate::config::DashboardConfig;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a data file could not be turned into a table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{} is missing or unreadable", path.display())]
    FileUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} could not be decoded as delimited text: {reason}", path.display())]
    DecodeError { path: PathBuf, reason: String },

    #[error("{} is a {detected} document, not a delimited text file", path.display())]
    WrongFormat { path: PathBuf, detected: &'static str },
}

impl LoadError {
    /// Advice shown under the error message in the dashboard.
    pub fn tip(&self) -> &'static str {
        match self {
            LoadError::FileUnavailable { .. } => {
                "Make sure the CSV file sits next to the application or pick it via File → Open…"
            }
            LoadError::DecodeError { .. } => {
                "Re-export the file as CSV (UTF-8) from your spreadsheet tool."
            }
            LoadError::WrongFormat { .. } => {
                "The file is a web page, not data. Download the raw CSV instead of the page that links to it."
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Read `path`, trying each configured encoding until one yields a table.
pub fn load(path: &Path, config: &DashboardConfig) -> Result<RawTable, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::FileUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    decode_table(&bytes, path, config)
}

/// Load and normalize in one step.
pub fn load_dataset(path: &Path, config: &DashboardConfig) -> Result<RecordSet, LoadError> {
    let raw = load(path, config)?;
    log::info!(
        "Loaded {} rows ({} malformed skipped) from {} via {}",
        raw.rows.len(),
        raw.skipped_lines,
        path.display(),
        raw.encoding.map(TextEncoding::label).unwrap_or("text")
    );
    Ok(normalize(raw, config))
}

/// Parse already-decoded delimited text.
pub fn parse_str(text: &str, config: &DashboardConfig) -> Result<RawTable, LoadError> {
    let origin = Path::new("<memory>");
    if let Some(detected) = detect_markup(text) {
        return Err(LoadError::WrongFormat {
            path: origin.to_path_buf(),
            detected,
        });
    }
    parse_delimited(text, config.delimiter_byte()).map_err(|reason| LoadError::DecodeError {
        path: origin.to_path_buf(),
        reason,
    })
}

// ---------------------------------------------------------------------------
// Encoding detection
// ---------------------------------------------------------------------------

fn decode_table(bytes: &[u8], path: &Path, config: &DashboardConfig) -> Result<RawTable, LoadError> {
    let mut last_failure = String::from("no configured encoding could decode the file");

    for &encoding in &config.encodings {
        let Some(text) = encoding.decode(bytes) else {
            log::debug!("{}: not valid {encoding}", path.display());
            continue;
        };

        if let Some(detected) = detect_markup(&text) {
            return Err(LoadError::WrongFormat {
                path: path.to_path_buf(),
                detected,
            });
        }

        match parse_delimited(&text, config.delimiter_byte()) {
            Ok(mut table) => {
                table.encoding = Some(encoding);
                return Ok(table);
            }
            Err(reason) => {
                log::debug!("{}: decoded as {encoding} but did not parse: {reason}", path.display());
                last_failure = format!("{encoding}: {reason}");
            }
        }
    }

    Err(LoadError::DecodeError {
        path: path.to_path_buf(),
        reason: last_failure,
    })
}

/// Recognise HTML/XML content that was saved under a `.csv` name.
fn detect_markup(text: &str) -> Option<&'static str> {
    let head: String = text
        .trim_start_matches('\u{feff}')
        .trim_start()
        .chars()
        .take(16)
        .collect::<String>()
        .to_ascii_lowercase();

    if head.starts_with("<!doctype html") || head.starts_with("<html") {
        Some("HTML")
    } else if head.starts_with("<?xml") {
        Some("XML")
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Delimited text parsing
// ---------------------------------------------------------------------------

/// Parse `text` into a [`RawTable`]. Lines with more fields than the header
/// are skipped; short lines are padded with empty fields.
fn parse_delimited(text: &str, delimiter: u8) -> Result<RawTable, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| format!("reading header row: {e}"))?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err("no header row".to_string());
    }

    let mut rows = Vec::new();
    let mut skipped_lines = 0;

    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| format!("row {row_no}: {e}"))?;
        if record.len() > headers.len() {
            skipped_lines += 1;
            continue;
        }
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(headers.len(), String::new());
        rows.push(row);
    }

    if skipped_lines > 0 {
        log::warn!("Skipped {skipped_lines} malformed line(s) with extra fields");
    }

    Ok(RawTable {
        headers,
        rows,
        encoding: None,
        skipped_lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file
    }

    #[test]
    fn missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("nope.csv"), &DashboardConfig::default()).unwrap_err();
        assert!(matches!(err, LoadError::FileUnavailable { .. }));
    }

    #[test]
    fn html_doctype_is_wrong_format() {
        let file = write_temp(b"<!DOCTYPE html>\n<html><body>MNC,Latitude</body></html>\n");
        let err = load(file.path(), &DashboardConfig::default()).unwrap_err();
        assert!(matches!(err, LoadError::WrongFormat { detected: "HTML", .. }));
    }

    #[test]
    fn html_after_bom_and_whitespace_is_wrong_format() {
        let file = write_temp(b"\xEF\xBB\xBF\n  <html lang=\"en\">");
        let err = load(file.path(), &DashboardConfig::default()).unwrap_err();
        assert!(matches!(err, LoadError::WrongFormat { .. }));
    }

    #[test]
    fn latin1_file_falls_through_to_latin1() {
        let file = write_temp(b"MNC,Cell_ID,Latitude,Longitude,Gen\n30,Ik\xE9ja,6.6,3.3,2G\n");
        let table = load(file.path(), &DashboardConfig::default()).unwrap();
        assert_eq!(table.encoding, Some(TextEncoding::Latin1));
        assert_eq!(table.rows[0][1], "Ikéja");
    }

    #[test]
    fn utf8_file_uses_first_encoding() {
        let file = write_temp("MNC,Gen\n30,4G\n".as_bytes());
        let table = load(file.path(), &DashboardConfig::default()).unwrap();
        assert_eq!(table.encoding, Some(TextEncoding::Utf8));
        assert_eq!(table.headers, ["MNC", "Gen"]);
    }

    #[test]
    fn undecodable_in_every_candidate_is_decode_error() {
        let config = DashboardConfig {
            encodings: vec![TextEncoding::Utf8, TextEncoding::Utf8Sig],
            ..DashboardConfig::default()
        };
        let file = write_temp(b"MNC\n\xFF\xFE\n");
        let err = load(file.path(), &config).unwrap_err();
        assert!(matches!(err, LoadError::DecodeError { .. }));
    }

    #[test]
    fn long_lines_are_skipped_and_short_lines_padded() {
        let table = parse_str(
            "MNC,Latitude,Longitude\n30,6.5,3.3\n30,6.5,3.3,extra\n50,7.1\n",
            &DashboardConfig::default(),
        )
        .unwrap();
        assert_eq!(table.skipped_lines, 1);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], ["50", "7.1", ""]);
    }

    #[test]
    fn all_empty_rows_reach_the_table() {
        let table = parse_str("MNC,Latitude,Longitude\n30,6.5,3.3\n,,\n", &DashboardConfig::default())
            .unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], ["", "", ""]);
    }

    #[test]
    fn cp1252_is_used_when_ordered_before_latin1() {
        let config = DashboardConfig {
            encodings: vec![TextEncoding::Utf8, TextEncoding::Windows1252, TextEncoding::Latin1],
            ..DashboardConfig::default()
        };
        let file = write_temp(b"MNC,Cell_ID,Latitude,Longitude\n30,\x93Ikeja\x94,6.6,3.3\n");
        let table = load(file.path(), &config).unwrap();
        assert_eq!(table.encoding, Some(TextEncoding::Windows1252));
        assert_eq!(table.rows[0][1], "\u{201C}Ikeja\u{201D}");
    }

    #[test]
    fn cp1252_hole_falls_through_to_latin1() {
        let config = DashboardConfig {
            encodings: vec![TextEncoding::Windows1252, TextEncoding::Latin1],
            ..DashboardConfig::default()
        };
        let file = write_temp(b"MNC,Cell_ID\n30,a\x81b\n");
        let table = load(file.path(), &config).unwrap();
        assert_eq!(table.encoding, Some(TextEncoding::Latin1));
        assert_eq!(table.rows[0][1], "a\u{81}b");
    }

    #[test]
    fn semicolon_delimiter_is_configurable() {
        let config = DashboardConfig {
            delimiter: ';',
            ..DashboardConfig::default()
        };
        let table = parse_str("MNC;Gen\n30;3G\n", &config).unwrap();
        assert_eq!(table.rows, vec![vec!["30".to_string(), "3G".to_string()]]);
    }
}
