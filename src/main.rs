//! zipzopd - the zipzop chatroom server.
//!
//! ```bash
//! # Defaults, or ./config.toml if present
//! zipzopd
//!
//! # Explicit config file
//! zipzopd /etc/zipzop/config.toml
//! ```
//!
//! Type `/shutdown` on stdin to count down and close the room.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use clap::error::ErrorKind;
use tokio::io::BufReader;
use tracing::{error, info};

use zipzop::Server;
use zipzop::config::{Config, ConfigError, LogConfig};
use zipzop::error::StartupError;
use zipzop::lifecycle::AdminOutcome;
use zipzop::telemetry;

const DEFAULT_CONFIG: &str = "config.toml";

/// zipzopd - real-time chatroom server
#[derive(Parser, Debug)]
#[command(name = "zipzopd")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (TOML). Defaults to ./config.toml when present.
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => return usage(e),
    };

    let config = match load_config(args.config) {
        Ok(config) => config,
        Err(e) => {
            telemetry::init(&LogConfig::default());
            return fail(&e);
        }
    };
    telemetry::init(&config.log);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => return fail(&StartupError::Runtime(e)),
    };

    let result = runtime.block_on(serve(config));
    // A blocked stdin read must not hold the process open.
    runtime.shutdown_timeout(Duration::from_secs(1));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

async fn serve(config: Config) -> Result<(), StartupError> {
    info!(
        server = %config.server.name,
        address = %config.listen.address,
        "Starting zipzopd"
    );

    let server = Server::bind(config).await?;
    let admin = BufReader::new(tokio::io::stdin());
    match server.run(admin).await {
        AdminOutcome::Shutdown(report) => {
            info!(
                sessions = report.sessions,
                aborted = report.aborted,
                "Server stopped"
            );
        }
        AdminOutcome::InputClosed => info!("Acceptor stopped"),
    }
    Ok(())
}

/// An explicit path must exist; the implicit default may be absent.
fn load_config(path: Option<PathBuf>) -> Result<Config, StartupError> {
    match path {
        Some(path) => Ok(Config::load(path)?),
        None => match Config::load(DEFAULT_CONFIG) {
            Ok(config) => Ok(config),
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Config::default())
            }
            Err(e) => Err(e.into()),
        },
    }
}

fn usage(e: clap::Error) -> ExitCode {
    let _ = e.print();
    match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
        _ => exit_code(&StartupError::BadArgs(e.to_string())),
    }
}

fn fail(e: &StartupError) -> ExitCode {
    error!(error = %e, code = e.error_code(), "Fatal");
    exit_code(e)
}

fn exit_code(e: &StartupError) -> ExitCode {
    ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
}
