//! cas-report: billing report over the vendor management API
//!
//! Walks every managed client's group tree, counts managed machines and
//! licensed endpoints, and produces one row per client. All vendor calls are
//! issued strictly one after another.
//!
//! ```text
//! ReportBuilder
//!     └── ClientAggregator (per client)
//!         ├── GroupResolver   (getCustomGroupsList, walked as a worklist)
//!         ├── monthly usage   (getMonthlyUsagePerProductType, diagnostic only)
//!         └── EndpointCounter (getEndpointsList + getManagedEndpointDetails)
//! ```

pub mod aggregate;
pub mod builder;
pub mod csv;
pub mod diagnostics;
pub mod endpoints;
pub mod error;
pub mod groups;
pub mod paging;
pub mod period;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregate::ClientAggregator;
pub use builder::{ReportBuilder, ReportOptions};
pub use csv::{csv_filename, to_csv};
pub use diagnostics::DiagnosticLog;
pub use endpoints::EndpointCounter;
pub use error::{ReportError, Result, Stage};
pub use groups::GroupResolver;
pub use period::last_period;
