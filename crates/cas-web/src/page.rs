//! Report page markup

use cas_core::ClientReportRow;

use crate::session::ReportSession;

pub const PAGE_TITLE: &str = "CAS Billing Report";

/// Escape text for use in HTML content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn report_table(rows: &[ClientReportRow]) -> String {
    let body: String = rows
        .iter()
        .map(|row| {
            format!(
                "      <tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape_html(&row.name),
                row.machines,
                row.endpoints
            )
        })
        .collect();
    let machines: u64 = rows.iter().map(|r| r.machines).sum();
    let endpoints: u64 = rows.iter().map(|r| r.endpoints).sum();

    format!(
        r#"  <table>
    <thead><tr><th>Company name</th><th>Managed machines</th><th>Endpoints</th></tr></thead>
    <tbody>
{body}    </tbody>
    <tfoot><tr><th>{count} clients</th><th>{machines}</th><th>{endpoints}</th></tr></tfoot>
  </table>
  <p><a href="/report/export.csv">Download CSV</a></p>
"#,
        body = body,
        count = rows.len(),
        machines = machines,
        endpoints = endpoints,
    )
}

/// Full page for one session
pub fn render_index(session: &ReportSession) -> String {
    let content = match &session.report {
        Some(rows) => report_table(rows),
        None => "  <p>No report loaded.</p>\n".to_string(),
    };
    let diagnostics = if session.diagnostics.is_empty() {
        String::new()
    } else {
        format!(
            "  <h2>Diagnostics</h2>\n  <pre>{}</pre>\n",
            escape_html(session.diagnostics.as_str())
        )
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{title}</title>
  <style>
    body {{ font-family: sans-serif; margin: 2rem; }}
    table {{ border-collapse: collapse; }}
    th, td {{ border: 1px solid #ccc; padding: 0.3rem 0.8rem; text-align: left; }}
    pre {{ background: #f6f6f6; padding: 0.8rem; }}
  </style>
</head>
<body>
  <h1>{title}</h1>
  <p><a href="/report/run">Run report</a> (last month)</p>
{content}{diagnostics}</body>
</html>
"#,
        title = PAGE_TITLE,
        content = content,
        diagnostics = diagnostics,
    )
}
