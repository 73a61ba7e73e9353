use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::path::Path;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// The provider for a file, from its extension.
pub fn input_type_from_path(path: &str) -> Option<String> {
    let ext = Path::new(path).extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "xlsx" | "xlsm" => Some("xlsx".to_string()),
        "csv" => Some("csv".to_string()),
        _ => None,
    }
}

/// `<respondent>_<period>_Action_Plan.txt`, with the separators and the whitespace replaced.
pub fn action_plan_file_name(respondent: &str, period: &str) -> String {
    let clean = |s: &str| -> String {
        s.split_whitespace()
            .collect::<Vec<&str>>()
            .join("_")
            .replace(['/', '\\', ':'], "_")
    };
    format!("{}_{}_Action_Plan.txt", clean(respondent), clean(period))
}

/// Converts the serial date of a spreadsheet (days since 1899-12-30) to a date time.
///
/// Precision is rounded to the second.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let days = serial.trunc() as i64;
    let seconds = ((serial - serial.trunc()) * 86400.0).round() as i64;
    epoch.checked_add_signed(Duration::days(days) + Duration::seconds(seconds))
}
