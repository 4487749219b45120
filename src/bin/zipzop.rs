//! zipzop - the zipzop chatroom client.
//!
//! ```bash
//! zipzop chat.example.org alice
//! zipzop 127.0.0.1 bob --port 4000
//! ```
//!
//! Type a line to send it, `/exit` to leave.

use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use tokio::io::BufReader;
use tracing::error;

use zipzop::client::{self, ClientExit};
use zipzop::config::{DEFAULT_PORT, LogConfig};
use zipzop::error::StartupError;
use zipzop::telemetry;
use zipzop_proto::{DEFAULT_MAX_NAME_LEN, validate_name};

/// zipzop - real-time chatroom client
#[derive(Parser, Debug)]
#[command(name = "zipzop")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server host name or address
    server: String,

    /// Name shown next to your messages
    name: String,

    /// TCP port the server listens on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => exit_code(&StartupError::BadArgs(e.to_string())),
            };
        }
    };

    // Console traffic owns stdout; logs stay quiet on stderr.
    telemetry::init(&LogConfig {
        level: "warn".to_string(),
        ..LogConfig::default()
    });

    if let Err(e) = validate_name(&args.name, DEFAULT_MAX_NAME_LEN) {
        return fail(&StartupError::BadArgs(e.to_string()));
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => return fail(&StartupError::Runtime(e)),
    };

    let code = runtime.block_on(chat(args));
    // Speak may still be parked on a stdin read.
    runtime.shutdown_background();
    code
}

async fn chat(args: Args) -> ExitCode {
    let stream = match client::connect(&args.server, args.port).await {
        Ok(stream) => stream,
        Err(e) => return fail(&e),
    };

    let transport = match client::join(stream, &args.name).await {
        Ok(transport) => transport,
        Err(e) => {
            error!(error = %e, "Introduction failed");
            return ExitCode::from(e.exit_code() as u8);
        }
    };

    let stdin = BufReader::new(tokio::io::stdin());
    match client::run(transport, &args.name, stdin, tokio::io::stdout()).await {
        Ok(ClientExit::UserExit | ClientExit::InputClosed | ClientExit::ServerClosed) => {
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Session ended");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn fail(e: &StartupError) -> ExitCode {
    error!(error = %e, code = e.error_code(), "Fatal");
    exit_code(e)
}

fn exit_code(e: &StartupError) -> ExitCode {
    ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
}
