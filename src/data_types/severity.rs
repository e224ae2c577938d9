use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Severity attached to a log record.
///
/// Ordered from least to most severe, so that severities can be
/// compared directly for filtering.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
    Critical,
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        };
        write!(f, "{label}")
    }
}
