use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use harmonize_model::{CellValue, RecordBatch};
use tracing::debug;

use crate::digest::digest_bytes;

/// Candidate delimiters in order of preference when counts tie.
const DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalize_cell(raw: &str) -> CellValue {
    let trimmed = raw.trim_matches('\u{feff}');
    if trimmed.trim().is_empty() {
        CellValue::Null
    } else {
        CellValue::text(trimmed)
    }
}

/// Picks the delimiter that occurs most often (outside quotes) on the first
/// non-empty line. Falls back to `,`.
pub fn sniff_delimiter(text: &str) -> u8 {
    let Some(line) = text.lines().find(|l| !l.trim().is_empty()) else {
        return b',';
    };
    let mut counts = [0usize; DELIMITERS.len()];
    let mut quoted = false;
    for byte in line.bytes() {
        if byte == b'"' {
            quoted = !quoted;
            continue;
        }
        if quoted {
            continue;
        }
        if let Some(idx) = DELIMITERS.iter().position(|d| *d == byte) {
            counts[idx] += 1;
        }
    }
    let mut best = 0;
    for idx in 1..DELIMITERS.len() {
        if counts[idx] > counts[best] {
            best = idx;
        }
    }
    DELIMITERS[best]
}

/// Reads a CSV file into a record batch, recording its path and digest.
pub fn read_batch(path: &Path) -> Result<RecordBatch> {
    let bytes = fs::read(path).with_context(|| format!("read csv: {}", path.display()))?;
    let mut batch =
        parse_batch(&bytes).with_context(|| format!("parse csv: {}", path.display()))?;
    batch.source = Some(path.display().to_string());
    debug!(
        path = %path.display(),
        columns = batch.headers.len(),
        rows = batch.row_count(),
        "csv loaded"
    );
    Ok(batch)
}

/// Parses CSV bytes. The first non-blank record is the header; fully blank
/// records are skipped and short records are padded with nulls.
pub fn parse_batch(bytes: &[u8]) -> Result<RecordBatch> {
    let text = std::str::from_utf8(bytes).context("input is not valid UTF-8")?;
    let delimiter = sniff_delimiter(text);
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut batch: Option<RecordBatch> = None;
    for (idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("read record {}", idx + 1))?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        match batch.as_mut() {
            None => {
                batch = Some(RecordBatch::new(record.iter().map(normalize_header).collect()));
            }
            Some(batch) => {
                let mut cells: Vec<CellValue> = record.iter().map(normalize_cell).collect();
                // Trailing delimiters produce empty cells past the header.
                while cells.len() > batch.headers.len()
                    && cells.last().is_some_and(CellValue::is_blank)
                {
                    cells.pop();
                }
                batch.push_row(cells);
            }
        }
    }

    let mut batch = batch.unwrap_or_default();
    batch.digest = Some(digest_bytes(bytes));
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_common_delimiters() {
        assert_eq!(sniff_delimiter("a,b,c\n1,2,3"), b',');
        assert_eq!(sniff_delimiter("a;b;c\n1,5;2;3"), b';');
        assert_eq!(sniff_delimiter("\n\na\tb\tc"), b'\t');
        assert_eq!(sniff_delimiter("a|b"), b'|');
        assert_eq!(sniff_delimiter("single"), b',');
    }

    #[test]
    fn quoted_delimiters_are_ignored() {
        assert_eq!(sniff_delimiter("\"a,b,c\";d;e"), b';');
    }

    #[test]
    fn headers_are_trimmed_and_bom_stripped() {
        let batch = parse_batch("\u{feff} cliente ;  precio   unitario\nAna;3\n".as_bytes())
            .expect("parse");
        assert_eq!(batch.headers, vec!["cliente", "precio unitario"]);
        assert_eq!(batch.rows[0], vec![CellValue::text("Ana"), CellValue::text("3")]);
    }

    #[test]
    fn blank_lines_skipped_and_short_rows_padded() {
        let batch = parse_batch(b"a,b,c\n\n1,2\n,,\n4,5,6\n").expect("parse");
        assert_eq!(batch.row_count(), 2);
        assert_eq!(batch.rows[0][2], CellValue::Null);
        assert_eq!(batch.rows[1][2], CellValue::text("6"));
    }

    #[test]
    fn trailing_delimiters_are_dropped() {
        let batch = parse_batch(b"a,b\n1,2,\n").expect("parse");
        assert_eq!(batch.rows[0].len(), 2);
        assert!(batch.validate().is_ok());
    }

    #[test]
    fn extra_data_cells_fail_validation() {
        let batch = parse_batch(b"a,b\n1,2,3\n").expect("parse");
        let err = batch.validate().expect_err("invalid");
        assert!(err.to_string().contains("row 1 has 3 cells"));
    }

    #[test]
    fn empty_input_has_no_header() {
        let batch = parse_batch(b"\n\n").expect("parse");
        assert!(batch.headers.is_empty());
        assert!(batch.validate().is_err());
    }
}
