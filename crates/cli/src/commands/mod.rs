use clap::Subcommand;
use std::error::Error;

pub mod languages;
pub mod obfuscate;
pub mod seed;

use thiserror::Error;

/// Errors that can occur while running a subcommand.
#[derive(Debug, Error)]
pub enum CliError {
    /// File read/write error.
    #[error("file error: {0}")]
    File(#[from] std::io::Error),
    /// The option map was not valid JSON or used wrong value types.
    #[error("invalid options: {0}")]
    InvalidOptions(String),
    /// Obfuscation engine error.
    #[error("obfuscation error: {0}")]
    Engine(#[from] umbra_core::Error),
    /// JSON serialization error.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// CLI subcommands for umbra.
#[derive(Subcommand)]
pub enum Cmd {
    /// Obfuscate a source file or inline snippet.
    Obfuscate(obfuscate::ObfuscateArgs),
    /// List supported languages and their identifier style support.
    Languages(languages::LanguagesArgs),
    /// Generate a fresh random seed for reproducible runs.
    Seed(seed::SeedArgs),
}

/// Trait for executing CLI subcommands.
pub trait Command {
    /// Executes the subcommand.
    fn execute(self) -> Result<(), Box<dyn Error>>;
}

impl Command for Cmd {
    fn execute(self) -> Result<(), Box<dyn Error>> {
        match self {
            Cmd::Obfuscate(args) => args.execute(),
            Cmd::Languages(args) => args.execute(),
            Cmd::Seed(args) => args.execute(),
        }
    }
}
