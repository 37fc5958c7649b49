use clap::Parser;
use umbra_cli::commands::{Cmd, Command};

/// Umbra CLI
///
/// Umbra is a source-to-source obfuscator for JavaScript, Python, and Lua.
/// It renames identifiers, pools and encodes string literals, rewrites
/// numeric and sentinel literals, and optionally flattens control flow and
/// injects protective guards.
#[derive(Parser)]
#[command(name = "umbra")]
#[command(about = "Umbra: source code obfuscator")]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

/// Runs the umbra CLI with the provided arguments.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_ansi(false)
        .without_time()
        .init();

    let cli = Cli::parse();
    cli.command.execute()
}
