//! n8n-stack - Single-instance n8n deployment on AWS

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use n8n_stack::cli::Cli;
use n8n_stack::domain::error::error_code;
use n8n_stack::output::json::format_error;

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG` wins over
/// `-v`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "n8n_stack=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let json = cli.json;

    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            let message = format!("{e:#}");
            match format_error(&message, error_code(&e)) {
                Ok(obj) if json => println!("{obj}"),
                _ => eprintln!("Error: {message}"),
            }
            ExitCode::FAILURE
        }
    }
}
