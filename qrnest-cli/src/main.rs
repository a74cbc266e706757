//! Qrnest CLI
//!
//! Generates a composite PNG of three visually nested QR codes from a URL,
//! a key string, and a message.

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;

mod commands;

#[derive(Parser)]
#[command(name = "qrnest")]
#[command(about = "Generate a composite image of three nested QR codes", long_about = None)]
#[command(version)]
struct Cli {
    /// URL carried by the primary QR code
    url: String,

    /// Key string the message is encrypted under (also embedded as the
    /// tertiary QR code)
    key: String,

    /// Message embedded as an encrypted token in the secondary QR code
    message: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit();
        }
        Err(_) => {
            println!("Usage: qrnest <URL> <Key> <Message>");
            std::process::exit(1);
        }
    };

    // Initialize tracing; diagnostics go to stderr so the contractual
    // stdout lines stay clean.
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("qrnest=debug,qrnest_lib=debug")
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("qrnest=warn,qrnest_lib=warn")
            .with_writer(std::io::stderr)
            .init();
    }

    commands::generate::run(&cli.url, &cli.key, &cli.message)
}
