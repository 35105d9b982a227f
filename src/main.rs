use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

mod args;
mod auth;
mod client;
mod config;
mod error;
mod model;
mod rank;
mod ui;

/// Log to stderr so nothing ends up between the prompts
///
/// RUST_LOG takes precedence over the verbosity flags.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let matches = args::parse();
    init_logging(args::verbosity(&matches));

    match args::run(matches).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");

            let code = e
                .downcast_ref::<error::Error>()
                .map(error::Error::exit_code)
                .unwrap_or(1);

            ExitCode::from(code)
        }
    }
}
