//! CSV source reader
//!
//! The corpus is small enough to load whole. Records are produced with
//! `csv_core`, which handles quoted cells containing commas, quotes and line
//! breaks.

use csv_core::{ReadFieldResult, Reader};
use prag_common::{Error, Result};
use std::path::Path;

/// Header plus data rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Read and parse a CSV file
pub fn read_table(path: &Path) -> Result<Table> {
    let content = std::fs::read_to_string(path)?;
    parse_table(&content)
}

/// Parse CSV text; the first record is the header
pub fn parse_table(content: &str) -> Result<Table> {
    let mut records = parse_records(content)?;
    if records.is_empty() {
        return Err(Error::InvalidInput("source has no header row".to_string()));
    }
    let header = records.remove(0);
    Ok(Table {
        header,
        rows: records,
    })
}

/// Split CSV text into records of cells; blank lines are skipped
pub fn parse_records(content: &str) -> Result<Vec<Vec<String>>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut rdr = Reader::new();
    let mut bytes = content.as_bytes();
    let mut output = [0; 4096];
    let mut cell: Vec<u8> = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut records = Vec::new();

    loop {
        let (result, nin, nout) = rdr.read_field(bytes, &mut output);
        bytes = &bytes[nin..];
        cell.extend_from_slice(&output[..nout]);

        match result {
            // Input fully handed over; the next call sees end of input
            ReadFieldResult::InputEmpty => {}
            ReadFieldResult::OutputFull => {}
            ReadFieldResult::Field { record_end } => {
                let text = String::from_utf8(std::mem::take(&mut cell))
                    .map_err(|e| Error::Csv(format!("invalid UTF-8 in cell: {}", e)))?;
                record.push(text);
                if record_end {
                    let finished = std::mem::take(&mut record);
                    if !(finished.len() == 1 && finished[0].is_empty()) {
                        records.push(finished);
                    }
                }
            }
            ReadFieldResult::End => break,
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_records() {
        let records = parse_records("a,b\nc,d\n").unwrap();
        assert_eq!(records, vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn test_quoted_cells() {
        let records =
            parse_records("ДФ,Примеры\n\"ну, и ну\",\"Он сказал \"\"ну\"\"\nи ушёл\"\n").unwrap();
        assert_eq!(records[1][0], "ну, и ну");
        assert_eq!(records[1][1], "Он сказал \"ну\"\nи ушёл");
    }

    #[test]
    fn test_no_trailing_newline_and_crlf() {
        let records = parse_records("a,b\r\nc,\r\n\r\nd,e").unwrap();
        assert_eq!(records, vec![vec!["a", "b"], vec!["c", ""], vec!["d", "e"]]);
    }

    #[test]
    fn test_bom_is_stripped() {
        let table = parse_table("\u{feff}ДФ\nда\n").unwrap();
        assert_eq!(table.header, vec!["ДФ"]);
        assert_eq!(table.rows, vec![vec!["да"]]);
    }

    #[test]
    fn test_empty_source_is_invalid() {
        assert!(matches!(parse_table(""), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_long_cell_spans_output_buffer() {
        let long = "я".repeat(5000);
        let records = parse_records(&format!("{},x\n", long)).unwrap();
        assert_eq!(records[0][0], long);
        assert_eq!(records[0][1], "x");
    }
}
