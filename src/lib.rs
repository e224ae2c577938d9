pub mod channel;
pub mod client;
pub mod data_types;
mod rotate;
pub mod server;

pub use channel::{Channel, ConsoleChannel, FileChannel};
pub use client::LogPipeClient;
pub use data_types::record::{ClientRecord, LogRecord};
pub use data_types::severity::Severity;

use std::io;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use rotate::{rotate_log, DEFAULT_MAX_LOG_SIZE};

/// The logging subsystem context.
///
/// Holds the single active output [`Channel`]. Reconfiguration holds
/// the internal lock for its full duration so that no concurrent
/// writer observes a half-torn-down channel; the lock is released on
/// every exit path when the guard drops.
#[derive(Debug)]
pub struct LogPipe {
    /// The currently active output channel. Absent until one is
    /// configured, and absent again after a failed reconfiguration.
    active: Mutex<Option<Arc<dyn Channel>>>,
    /// Size, in bytes, at which an existing log file is rotated aside
    /// by [`configure_file_channel`](LogPipe::configure_file_channel).
    max_log_size: u64,
}

impl Default for LogPipe {
    fn default() -> Self {
        Self::new(None)
    }
}

impl LogPipe {
    pub fn new(max_log_size: Option<u64>) -> Self {
        Self {
            active: Mutex::new(None),
            max_log_size: max_log_size.unwrap_or(DEFAULT_MAX_LOG_SIZE),
        }
    }

    /// Configure a file in a mounted file system at `path` as the
    /// output channel.
    ///
    /// Any previously active channel is torn down first. An existing
    /// file at `path` which has grown to the configured size limit is
    /// rotated aside to `<path>.0` before the new file is opened. The
    /// file is created if missing and appended to otherwise, so records
    /// written before this call are not included in it.
    ///
    /// Returns the new channel handle, or `None` when the file could
    /// not be opened, in which case no channel is left active.
    pub fn configure_file_channel(&self, path: &Path) -> Option<Arc<FileChannel>> {
        let mut active = self.active.lock();

        if let Some(previous) = active.take() {
            teardown(&previous);
        }

        rotate_log(path, self.max_log_size);

        let channel = match FileChannel::init(path) {
            Ok(channel) => Arc::new(channel),
            Err(e) => {
                warn!(%e, path = %path.display(), "file channel initialization failed");
                return None;
            }
        };

        *active = Some(Arc::clone(&channel) as Arc<dyn Channel>);
        Some(channel)
    }

    /// Install `channel` as the active output channel, tearing down any
    /// previously active one.
    pub fn set_channel(&self, channel: Arc<dyn Channel>) {
        let mut active = self.active.lock();
        if let Some(previous) = active.take() {
            teardown(&previous);
        }
        *active = Some(channel);
    }

    /// Write a record through the active channel, returning the number
    /// of bytes accepted.
    ///
    /// Records are dropped when no channel is configured.
    pub fn write(&self, record: &LogRecord) -> io::Result<usize> {
        match self.active.lock().as_ref() {
            Some(channel) => channel.write_record(record),
            None => {
                debug!("no active channel, dropping record");
                Ok(0)
            }
        }
    }

    /// Flush the active channel, if any.
    pub fn flush(&self) -> io::Result<()> {
        match self.active.lock().as_ref() {
            Some(channel) => channel.flush(),
            None => Ok(()),
        }
    }

    /// Get a handle to the active channel, if one is configured.
    pub fn active_channel(&self) -> Option<Arc<dyn Channel>> {
        self.active.lock().clone()
    }
}

/// Flush a channel that is being replaced before its handle is
/// released.
fn teardown(channel: &Arc<dyn Channel>) {
    if let Err(e) = channel.flush() {
        warn!(%e, "flush failed while tearing down channel");
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    use crate::{LogPipe, LogRecord};

    #[test]
    fn configure_file_channel() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kernel.log");

        let pipe = LogPipe::new(None);
        let channel = pipe.configure_file_channel(&path).unwrap();
        assert_eq!(channel.path(), &path);
        assert!(path.exists());

        pipe.write(&LogRecord::test_record(0)).unwrap();
        pipe.flush().unwrap();
        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .contains("hello world"));
    }

    #[test]
    fn reconfigure_replaces_channel() {
        let dir = TempDir::new().unwrap();
        let path_one = dir.path().join("one.log");
        let path_two = dir.path().join("two.log");

        let pipe = LogPipe::new(None);

        let first = pipe.configure_file_channel(&path_one).unwrap();
        pipe.write(&LogRecord::test_record(1)).unwrap();

        let second = pipe.configure_file_channel(&path_two).unwrap();
        pipe.write(&LogRecord::test_record(2)).unwrap();
        pipe.flush().unwrap();

        assert_eq!(
            std::sync::Arc::strong_count(&first),
            1,
            "Context should have released its handle to the replaced channel"
        );
        assert_eq!(std::sync::Arc::strong_count(&second), 2);

        // The replaced channel was flushed on teardown, so its record
        // reached its own file rather than the new one.
        assert!(std::fs::read_to_string(&path_one)
            .unwrap()
            .contains("hello world"));
        assert!(!std::fs::read_to_string(&path_two)
            .unwrap()
            .contains("1970-01-01T00:00:00.000001Z"));
    }

    #[test]
    fn oversized_log_rotated_on_configure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kernel.log");
        let old_contents = "old boot log\n";
        std::fs::write(&path, old_contents).unwrap();

        let pipe = LogPipe::new(Some(old_contents.len() as u64));
        pipe.configure_file_channel(&path).unwrap();
        pipe.write(&LogRecord::test_record(0)).unwrap();
        pipe.flush().unwrap();

        let backup = dir.path().join("kernel.log.0");
        assert_eq!(std::fs::read_to_string(backup).unwrap(), old_contents);
        assert!(
            !std::fs::read_to_string(&path).unwrap().contains("old boot"),
            "A fresh file should have been started at the original path"
        );
    }

    #[test]
    fn undersized_log_untouched_on_configure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kernel.log");
        std::fs::write(&path, "old boot log\n").unwrap();

        let pipe = LogPipe::new(None); // default 1 MiB limit
        pipe.configure_file_channel(&path).unwrap();

        assert!(!dir.path().join("kernel.log.0").exists());
        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .starts_with("old boot log\n"));
    }

    #[test]
    fn failed_configure_leaves_channel_absent() {
        let dir = TempDir::new().unwrap();
        let good_path = dir.path().join("kernel.log");
        let bad_path = dir.path().join("missing_directory").join("kernel.log");

        let pipe = LogPipe::new(None);
        pipe.configure_file_channel(&good_path).unwrap();

        assert!(pipe.configure_file_channel(&bad_path).is_none());
        assert!(pipe.active_channel().is_none());

        // Subsequent writes are dropped rather than directed anywhere.
        assert_matches!(pipe.write(&LogRecord::test_record(0)), Ok(0));
        assert!(!bad_path.exists());
    }

    #[test]
    fn write_without_channel_drops_record() {
        let pipe = LogPipe::default();
        assert_matches!(pipe.write(&LogRecord::test_record(0)), Ok(0));
        pipe.flush().unwrap();
    }
}
