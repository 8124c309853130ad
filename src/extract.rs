//! Tabular extraction — turns the downloaded file into ordered row groups.
//!
//! The first row of every sheet is the header row. Headers are normalized
//! (whitespace stripped, uppercased), values trimmed. Sheets and rows keep
//! their source order. No shape validation happens here; a column the form
//! does not know surfaces later as a mapping fault.

use crate::config::normalize_header;
use crate::data::{Row, RowSet};
use crate::Result;
use calamine::{open_workbook_auto, Reader};
use std::path::Path;
use tracing::debug;

/// Read a tabular file into ordered row groups, choosing the reader by
/// extension: `.csv` gets the CSV reader, everything else is treated as a
/// workbook.
pub fn read_rows(path: &Path) -> Result<RowSet> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "csv" => read_csv(path),
        _ => read_workbook(path),
    }
}

fn read_workbook(path: &Path) -> Result<RowSet> {
    let mut workbook = open_workbook_auto(path)?;
    let mut set = RowSet::default();

    for name in workbook.sheet_names().to_owned() {
        let range = workbook.worksheet_range(&name)?;
        let mut rows = range.rows();
        let Some(header_cells) = rows.next() else {
            debug!("sheet '{}' is empty, skipping", name);
            continue;
        };
        let headers: Vec<String> = header_cells
            .iter()
            .map(|cell| normalize_header(&cell.to_string()))
            .collect();

        let mut group = Vec::new();
        for cells in rows {
            let mut row = Row::new();
            for (header, cell) in headers.iter().zip(cells.iter()) {
                if header.is_empty() {
                    continue;
                }
                row.push(header.clone(), cell.to_string().trim());
            }
            // Workbook ranges pad with blank rows; don't submit those.
            if row.iter().all(|(_, value)| value.is_empty()) {
                continue;
            }
            group.push(row);
        }

        debug!("sheet '{}': {} rows", name, group.len());
        set.groups.push(group);
    }

    Ok(set)
}

fn read_csv(path: &Path) -> Result<RowSet> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(normalize_header)
        .collect();

    let mut group = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row = Row::new();
        for (header, value) in headers.iter().zip(record.iter()) {
            if header.is_empty() {
                continue;
            }
            row.push(header.clone(), value.trim());
        }
        group.push(row);
    }

    debug!("csv '{}': {} rows", path.display(), group.len());
    Ok(RowSet {
        groups: vec![group],
    })
}
