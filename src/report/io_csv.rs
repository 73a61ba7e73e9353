// Primitives for reading CSV files.

use std::io::Read;

use crate::report::*;

pub fn read_csv(path: &str) -> ReportResult<RawTable> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    read_records(rdr)
}

fn read_records<R: Read>(rdr: csv::Reader<R>) -> ReportResult<RawTable> {
    let mut rows: Vec<Vec<RawCell>> = Vec::new();
    for (idx, line_r) in rdr.into_records().enumerate() {
        // The index starts at 1 to respect most conventions in the excel world
        let lineno = idx + 1;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        let row: Vec<RawCell> = line
            .iter()
            .map(|s| {
                if s.trim().is_empty() {
                    RawCell::Empty
                } else {
                    RawCell::Text(s.to_string())
                }
            })
            .collect();
        rows.push(row);
    }
    debug!("read_csv: {} rows", rows.len());
    Ok(RawTable::new(rows))
}
