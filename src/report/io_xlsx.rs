// Reading the survey exports from Excel workbooks.

use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::report::io_common::excel_serial_to_datetime;
use crate::report::*;

pub fn read_xlsx(path: &str, worksheet_name: Option<&str>) -> ReportResult<RawTable> {
    let wrange = get_range(path, worksheet_name)?;
    let rows: Vec<Vec<RawCell>> = wrange
        .rows()
        .map(|row| row.iter().map(read_cell).collect())
        .collect();
    debug!("read_xlsx: {:?}: {} rows", path, rows.len());
    Ok(RawTable::new(rows))
}

fn read_cell(cell: &DataType) -> RawCell {
    match cell {
        DataType::String(s) if s.trim().is_empty() => RawCell::Empty,
        DataType::String(s) => RawCell::Text(s.clone()),
        DataType::Float(f) => RawCell::Number(*f),
        DataType::Int(i) => RawCell::Number(*i as f64),
        DataType::Bool(b) => RawCell::Text(b.to_string()),
        DataType::DateTime(serial) => match excel_serial_to_datetime(*serial) {
            Some(ts) => RawCell::Timestamp(ts),
            None => RawCell::Number(*serial),
        },
        DataType::Empty => RawCell::Empty,
        #[allow(unreachable_patterns)]
        x => {
            debug!("read_cell: ignoring cell {:?}", x);
            RawCell::Empty
        }
    }
}

fn get_range(path: &str, worksheet_name_o: Option<&str>) -> ReportResult<calamine::Range<DataType>> {
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        &path, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(worksheet_name)
            .context(MissingWorksheetSnafu {
                name: worksheet_name,
                path,
            })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let all_worksheets = workbook.worksheets();
        match all_worksheets.as_slice() {
            [] => EmptyExcelSnafu { path }.fail(),
            [(worksheet_name, wrange)] => {
                debug!(
                    "get_range: path: {:?} worksheet: {:?}",
                    &path, &worksheet_name
                );
                Ok(wrange.clone())
            }
            _ => AmbiguousWorksheetSnafu { path }.fail(),
        }
    }
}
