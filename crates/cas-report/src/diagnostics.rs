//! Accumulated failure text shown to the person running the report

use serde::Serialize;
use std::fmt;

/// Append-only diagnostic text, one `> message` line per failure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DiagnosticLog(String);

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl fmt::Display) {
        self.0.push_str(&format!("> {}\n", message));
    }

    /// Append every line of `other`
    pub fn append(&mut self, other: &DiagnosticLog) {
        self.0.push_str(&other.0);
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DiagnosticLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_accumulate() {
        let mut log = DiagnosticLog::new();
        log.push("first");
        log.push(format_args!("second {}", 2));
        assert_eq!(log.as_str(), "> first\n> second 2\n");
    }

    #[test]
    fn test_append_keeps_existing_lines() {
        let mut session = DiagnosticLog::new();
        session.push("earlier run");
        let mut run = DiagnosticLog::new();
        run.push("this run");

        session.append(&run);
        assert_eq!(session.as_str(), "> earlier run\n> this run\n");
    }
}
