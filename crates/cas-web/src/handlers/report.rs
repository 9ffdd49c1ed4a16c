//! Report page, report runs and CSV export

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Json, Redirect, Response},
};
use cas_core::Report;
use cas_report::{csv_filename, to_csv, DiagnosticLog};
use chrono::Local;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::page::render_index;
use crate::session::{resolve_session, session_cookie};
use crate::state::AppState;

#[derive(Serialize)]
pub struct SessionReportResponse {
    pub report: Option<Report>,
    pub diagnostics: String,
}

fn with_session_cookie(response: impl IntoResponse, id: &str, fresh: bool) -> Response {
    let mut response = response.into_response();
    if fresh {
        match HeaderValue::try_from(session_cookie(id).to_string()) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => warn!("Session {}: cookie not sent: {}", id, e),
        }
    }
    response
}

/// GET / - Report page for this session
pub async fn index_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let (id, fresh) = resolve_session(&headers);
    let session = state.sessions.get_or_new(&id).await;
    with_session_cookie(Html(render_index(&session)), &id, fresh)
}

/// GET /report/run - Run the report for last month and go back to the page
///
/// The run's outcome is merged into the session when it finishes, so runs
/// overlapping in one session each keep their diagnostics.
pub async fn run_report_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let (id, fresh) = resolve_session(&headers);

    info!("Running report for session {}", id);
    let mut run_log = DiagnosticLog::new();
    let report = state.builder.build_report(&mut run_log).await;
    match &report {
        Some(report) => info!("Session {}: report ready ({} clients)", id, report.len()),
        None => warn!("Session {}: report failed", id),
    }

    state
        .sessions
        .modify(&id, |session| {
            session.report = report;
            session.diagnostics.append(&run_log);
        })
        .await;
    with_session_cookie(Redirect::to("/"), &id, fresh)
}

/// GET /report/export.csv - CSV attachment of the session's report
pub async fn export_csv_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let (id, fresh) = resolve_session(&headers);
    let session = state.sessions.get_or_new(&id).await;

    let response = match session.report {
        Some(report) => {
            let filename = csv_filename(Local::now().date_naive());
            (
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", filename),
                    ),
                ],
                to_csv(&report),
            )
                .into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            "No report available, run the report first.",
        )
            .into_response(),
    };
    with_session_cookie(response, &id, fresh)
}

/// GET /api/report - Session report and diagnostics as JSON
pub async fn api_report_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let (id, fresh) = resolve_session(&headers);
    let session = state.sessions.get_or_new(&id).await;

    let body = Json(SessionReportResponse {
        report: session.report,
        diagnostics: session.diagnostics.to_string(),
    });
    with_session_cookie(body, &id, fresh)
}
