//! Module for the `obfuscate` subcommand, which runs the full obfuscation
//! pipeline over one source unit and reports the outcome.

use crate::commands::CliError;
use clap::Args;
use std::error::Error;
use std::fs;
use std::path::Path;
use tracing::debug;
use umbra_core::options::ObfuscationOptions;
use umbra_core::seed::Seed;
use umbra_lang::{obfuscate, Language, PipelineConfig};

/// Arguments for the `obfuscate` subcommand.
#[derive(Args)]
pub struct ObfuscateArgs {
    /// Input source: a file path, or inline source text if no such file exists.
    pub input: String,
    /// Source language (javascript, python, lua).
    #[arg(long, short)]
    pub lang: Language,
    /// Option map as inline JSON or a path to a JSON file. Unknown keys are
    /// ignored; absent keys take their defaults.
    #[arg(long)]
    options: Option<String>,
    /// Hex seed for deterministic output (64 hex chars, 0x prefix optional).
    #[arg(long)]
    seed: Option<String>,
    /// Write obfuscated source to this path instead of stdout.
    #[arg(long, short)]
    out: Option<String>,
    /// Path to emit a JSON run report (sizes, stages, seed).
    #[arg(long)]
    emit: Option<String>,
}

impl super::Command for ObfuscateArgs {
    fn execute(self) -> Result<(), Box<dyn Error>> {
        let ObfuscateArgs {
            input,
            lang,
            options,
            seed,
            out,
            emit,
        } = self;

        // Step 1: read the source.
        let source = read_source(&input)?;
        debug!(lang = %lang, bytes = source.len(), "read input source");

        // Step 2: parse the option map.
        let options = parse_options(options.as_deref())?;

        // Step 3: resolve the seed.
        let config = match seed {
            Some(hex) => PipelineConfig {
                seed: Seed::from_hex(&hex).map_err(CliError::Engine)?,
            },
            None => PipelineConfig::default(),
        };

        // Step 4: run the pipeline.
        let result = obfuscate(lang, &source, &options, config)?;
        debug!(
            stages = result.metadata.stages_applied.len(),
            renamed = result.renamed_identifiers,
            "pipeline finished"
        );

        // Step 5: emit the run report if requested. Line and character
        // statistics are a presentation concern, so they are computed here
        // rather than in the engine.
        if let Some(path) = emit.as_ref() {
            let report = serde_json::json!({
                "language": result.metadata.language,
                "seed": result.metadata.seed,
                "stages_applied": result.metadata.stages_applied,
                "original_size": result.original_size,
                "obfuscated_size": result.obfuscated_size,
                "size_increase_percentage": result.size_increase_percentage,
                "original_lines": source.lines().count(),
                "obfuscated_lines": result.output.lines().count(),
                "original_chars": source.chars().count(),
                "obfuscated_chars": result.output.chars().count(),
                "pool_entries": result.pool_entries,
                "renamed_identifiers": result.renamed_identifiers,
            });
            fs::write(path, serde_json::to_string_pretty(&report)?)?;
            eprintln!("wrote run report to {path}");
        }

        // Step 6: output.
        match out {
            Some(path) => {
                fs::write(&path, &result.output)?;
                eprintln!(
                    "wrote {} bytes to {path} (seed {})",
                    result.obfuscated_size, result.metadata.seed
                );
            }
            None => println!("{}", result.output),
        }

        Ok(())
    }
}

/// Reads the input as a file when one exists at that path, otherwise treats
/// it as inline source text.
fn read_source(input: &str) -> Result<String, CliError> {
    if Path::new(input).is_file() {
        Ok(fs::read_to_string(input)?)
    } else {
        Ok(input.to_string())
    }
}

/// Parses the option map from inline JSON or a JSON file. No argument means
/// all defaults.
fn parse_options(spec: Option<&str>) -> Result<ObfuscationOptions, CliError> {
    let Some(spec) = spec else {
        return Ok(ObfuscationOptions::default());
    };
    let text = if Path::new(spec).is_file() {
        fs::read_to_string(spec)?
    } else {
        spec.to_string()
    };
    serde_json::from_str(&text).map_err(|e| CliError::InvalidOptions(e.to_string()))
}
