use std::io::Write;
use std::net::TcpStream;

use crate::data_types::record::ClientRecord;

/// Client for submitting records to a running logpipe daemon.
pub struct LogPipeClient {
    addr: String,
}

impl LogPipeClient {
    /// Construct a new [`LogPipeClient`].
    pub fn new(addr: &str) -> Self {
        Self {
            addr: addr.to_string(),
        }
    }

    /// Send a single record to the configured daemon.
    pub fn send(&self, record: &ClientRecord) -> Result<(), Box<dyn std::error::Error>> {
        let mut stream = TcpStream::connect(&self.addr)?;
        stream.write_all(&rmp_serde::to_vec(record)?)?;
        Ok(())
    }
}
