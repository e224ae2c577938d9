use bytes::Bytes;
use chrono::DateTime;
use serde::{Deserialize, Serialize};

use super::severity::Severity;

/// A record sent by a client.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClientRecord {
    severity: Severity,
    message: Bytes,
}

impl ClientRecord {
    pub fn new(severity: Severity, message: Bytes) -> Self {
        Self { severity, message }
    }

    /// Consume this [`ClientRecord`] and turn it into the corresponding
    /// [`LogRecord`], stamped with the given timestamp.
    pub fn into_log_record(self, timestamp: i64) -> LogRecord {
        LogRecord {
            severity: self.severity,
            message: self.message,
            timestamp,
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Get the contained message bytes.
    pub fn message(&self) -> Bytes {
        self.message.clone()
    }
}

/// A record which has been accepted by the logging subsystem.
///
/// The timestamp is microseconds since the Unix epoch, assigned on
/// arrival rather than taken from the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    severity: Severity,
    message: Bytes,
    timestamp: i64,
}

impl LogRecord {
    pub fn new(severity: Severity, message: Bytes, timestamp: i64) -> Self {
        Self {
            severity,
            message,
            timestamp,
        }
    }

    #[cfg(test)]
    pub fn test_record(timestamp: i64) -> Self {
        Self::new(Severity::Info, "hello world".into(), timestamp)
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> Bytes {
        self.message.clone() // cheaply clonable
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Render the record into its single output line, newline included.
    pub fn render(&self) -> String {
        let timestamp = DateTime::from_timestamp_micros(self.timestamp).unwrap_or_default();
        format!(
            "{} [{}] {}\n",
            timestamp.format("%Y-%m-%dT%H:%M:%S%.6fZ"),
            self.severity,
            String::from_utf8_lossy(&self.message)
        )
    }
}
