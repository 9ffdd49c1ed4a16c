//! cas-web: web front end for the CAS billing report
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 cas-billing-web (:8080)                  │
//! ├──────────────────────────────────────────────────────────┤
//! │  /                    - Report page for this session     │
//! │  /report/run          - Run the report, back to /        │
//! │  /report/export.csv   - CSV download of the last report  │
//! │  /api/report          - Session report as JSON           │
//! │  /api/health          - Health check                     │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Report results live only in the caller's session.

pub mod handlers;
pub mod page;
pub mod routes;
pub mod session;
pub mod state;

pub use routes::create_router;
pub use state::AppState;
