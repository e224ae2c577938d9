use std::net::{TcpListener, TcpStream};
use std::sync::Arc;

use tracing::{info, warn};

use crate::data_types::record::ClientRecord;
use crate::LogPipe;

/// Accept client records on `listener` and write them through `pipe`.
///
/// Each connection carries a single msgpack-encoded [`ClientRecord`].
/// The record is stamped with its arrival time and appended to the
/// active channel. A connection that cannot be handled is logged and
/// skipped; it does not take the daemon down.
pub fn run_server(listener: TcpListener, pipe: Arc<LogPipe>) -> Result<(), Box<dyn std::error::Error>> {
    info!(addr = %listener.local_addr()?, "logpipe accepting records");

    for stream in listener.incoming() {
        let stream = stream?;
        if let Err(e) = handle_connection(stream, &pipe) {
            warn!(%e, "failed to handle connection");
        }
    }
    Ok(())
}

fn handle_connection(stream: TcpStream, pipe: &LogPipe) -> Result<(), Box<dyn std::error::Error>> {
    let record: ClientRecord = rmp_serde::from_read(stream)?;

    let timestamp = chrono::Utc::now().timestamp_micros();
    pipe.write(&record.into_log_record(timestamp))?;
    pipe.flush()?;
    Ok(())
}
