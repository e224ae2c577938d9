use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use bytes::{BufMut, BytesMut};
use parking_lot::Mutex;
use tracing::debug;

use super::{Channel, LOG_FILE_MODE, MAX_CHANNEL_BUFFER_SIZE};
use crate::data_types::record::LogRecord;

/// A channel backed by a file in a mounted file system.
///
/// The file is opened in append mode: an existing file keeps its
/// contents and new records land at the end. Records are staged in an
/// in-memory buffer which is written through and synced once it fills,
/// or on an explicit [`flush`](Channel::flush).
#[derive(Debug)]
pub struct FileChannel {
    filepath: PathBuf,
    inner: Mutex<ChannelInner>,
}

#[derive(Debug)]
struct ChannelInner {
    file: File,
    buf: BytesMut,
}

impl FileChannel {
    /// Open the file at `path` for appending, creating it with fixed
    /// permissions if it does not exist.
    pub fn init(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .mode(LOG_FILE_MODE)
            .open(path)?;
        Ok(Self {
            filepath: path.to_path_buf(),
            inner: Mutex::new(ChannelInner {
                file,
                buf: BytesMut::with_capacity(MAX_CHANNEL_BUFFER_SIZE as usize),
            }),
        })
    }

    /// Flush buffered records through before the handle is released.
    ///
    /// The file itself closes once the last handle is dropped.
    pub fn uninit(&self) -> io::Result<()> {
        self.flush()
    }

    /// Get the path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.filepath
    }
}

impl Channel for FileChannel {
    fn write_record(&self, record: &LogRecord) -> io::Result<usize> {
        let line = record.render();
        let mut inner = self.inner.lock();
        inner.buf.put_slice(line.as_bytes());

        if inner.buf.len() >= MAX_CHANNEL_BUFFER_SIZE as usize {
            inner.flush()?;
        }

        Ok(line.len())
    }

    fn flush(&self) -> io::Result<()> {
        self.inner.lock().flush()
    }
}

impl ChannelInner {
    /// Write the staged records from the internal buffer to the
    /// underlying file.
    fn flush(&mut self) -> io::Result<()> {
        debug!("flushing internal channel buffer");
        self.file.write_all(&self.buf)?;
        self.file.sync_all()?;
        self.buf.clear();
        Ok(())
    }
}
