use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};

use logpipe::{ClientRecord, ConsoleChannel, LogPipe, LogPipeClient, Severity};

#[derive(Parser)]
struct Cli {
    #[clap(subcommand)]
    commands: Commands,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a record into a running logpipe daemon.
    Write {
        message: String,
        /// Severity to attach to the record.
        #[arg(long, value_enum, default_value = "info")]
        severity: Severity,
        /// Address of the daemon to write to.
        #[arg(long, env = "LOGPIPE_ADDRESS", default_value = "0.0.0.0:7060")]
        addr: String,
    },
    /// Start a logpipe daemon.
    Server {
        /// Bind address for the daemon.
        #[arg(long, env = "LOGPIPE_ADDRESS", default_value = "0.0.0.0:7060")]
        addr: String,

        /// File to use as the output channel. Records are written to
        /// the console when no file is given.
        #[arg(long, env = "LOGPIPE_LOG_FILE")]
        log_file: Option<PathBuf>,

        /// Size, in bytes, at which an existing log file is rotated
        /// aside before the channel is configured.
        #[arg(long, env = "LOGPIPE_MAX_LOG_SIZE")]
        max_log_size: Option<u64>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity.tracing_level_filter())
        .init();

    match cli.commands {
        Commands::Write {
            message,
            severity,
            addr,
        } => {
            let record = ClientRecord::new(severity, message.into());
            LogPipeClient::new(&addr).send(&record)?;
        }
        Commands::Server {
            addr,
            log_file,
            max_log_size,
        } => {
            let pipe = Arc::new(LogPipe::new(max_log_size));

            match log_file {
                Some(path) => {
                    if pipe.configure_file_channel(&path).is_none() {
                        return Err(
                            format!("could not configure file channel at {}", path.display())
                                .into(),
                        );
                    }
                }
                None => pipe.set_channel(Arc::new(ConsoleChannel)),
            }

            let listener = TcpListener::bind(addr)?;
            logpipe::server::run_server(listener, pipe)?;
        }
    }
    Ok(())
}
