//! CSV export of a finished report

use cas_core::ClientReportRow;
use chrono::NaiveDate;

pub const CSV_HEADER: &str = "Company name,Managed machines,Endpoints";

/// Render the report as CSV.
///
/// Names are wrapped in double quotes as-is; quotes inside a name are not
/// escaped. Lines are `\n`-separated with no trailing newline.
pub fn to_csv(rows: &[ClientReportRow]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(CSV_HEADER.to_string());
    lines.extend(
        rows.iter()
            .map(|row| format!("\"{}\",{},{}", row.name, row.machines, row.endpoints)),
    );
    lines.join("\n")
}

/// Download name for an export made on `date`
pub fn csv_filename(date: NaiveDate) -> String {
    format!("BD Report {}.csv", date.format("%m-%d-%Y"))
}
