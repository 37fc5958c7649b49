//! Pipeline orchestrator.
//!
//! Stages run in a fixed order regardless of which are enabled; any stage
//! error aborts the whole run with no partial output. All randomness flows
//! from one seeded generator, so a fixed seed and option map reproduce the
//! output byte for byte.

use crate::grammar::{apply_renames, Grammar};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::debug;
use umbra_core::literal::{encode_number, NumericOptions};
use umbra_core::options::ObfuscationOptions;
use umbra_core::pool::replace_placeholders;
use umbra_core::seed::Seed;
use umbra_core::{ObfuscatorState, Result};

use crate::Language;

/// Run configuration beyond the option map.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Seed for the run's generator. Defaults to a fresh random seed.
    pub seed: Seed,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            seed: Seed::generate(),
        }
    }
}

/// Outcome of one obfuscation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObfuscationResult {
    /// The transformed source text.
    pub output: String,
    /// Input length in bytes.
    pub original_size: usize,
    /// Output length in bytes.
    pub obfuscated_size: usize,
    /// Relative growth, in percent. Negative when compaction shrinks the
    /// output below the input.
    pub size_increase_percentage: f64,
    /// Unique strings interned in the pool this run. Grammars that encode
    /// strings inline leave this at zero.
    pub pool_entries: usize,
    /// Identifiers renamed this run.
    pub renamed_identifiers: usize,
    pub metadata: ObfuscationMetadata,
}

/// Reproducibility record attached to every result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObfuscationMetadata {
    pub language: String,
    /// Names of the stages that actually ran, in execution order.
    pub stages_applied: Vec<String>,
    /// Hex seed that reproduces this output with the same options.
    pub seed: String,
}

/// Runs the full obfuscation pipeline over one source unit.
pub fn obfuscate(
    language: Language,
    source: &str,
    options: &ObfuscationOptions,
    config: PipelineConfig,
) -> Result<ObfuscationResult> {
    let grammar = language.grammar();
    let mut rng: StdRng = config.seed.create_deterministic_rng();
    let style = grammar.effective_style(options.identifier_generator);
    let mut state =
        ObfuscatorState::new(options, style, grammar.ident_charset(), grammar.reserved_words());
    let mut stages = Vec::new();

    debug!(
        language = grammar.name(),
        seed = %config.seed.to_hex(),
        "starting obfuscation pipeline"
    );

    // Step 1: strip comments. Always on; everything downstream assumes
    // comment-free text.
    let mut text = grammar.strip_comments(source);
    stages.push("strip_comments".to_string());
    debug!(step = 1, len = text.len(), "stripped comments");

    // Step 2: pool or inline-encode string literals. Runs before renaming so
    // string contents are never damaged by identifier substitution.
    if options.string_array {
        text = grammar.process_strings(&text, &mut state, options, &mut rng)?;
        stages.push("strings".to_string());
        debug!(step = 2, entries = state.pool.len(), "processed string literals");
    }

    // Step 3: rename declared identifiers.
    if options.rename_variables || options.rename_functions {
        let declared = grammar.declarations(&text, options);
        text = apply_renames(&text, declared, &mut state, &mut rng)?;
        stages.push("rename".to_string());
        debug!(step = 3, renamed = state.rename_map.len(), "renamed identifiers");
    }

    // Step 4: literal sentinels.
    if options.transform_booleans
        || options.transform_undefined
        || options.transform_null
        || options.transform_infinity
        || options.transform_nan
    {
        text = grammar.transform_sentinels(&text, options, &mut rng);
        stages.push("sentinels".to_string());
        debug!(step = 4, "transformed literal sentinels");
    }

    // Step 5: numeric literals.
    if options.numbers_to_expressions || options.numbers_to_hex || options.numbers_to_bitwise {
        text = grammar.transform_numbers(&text, options, &mut rng)?;
        stages.push("numbers".to_string());
        debug!(step = 5, "transformed numeric literals");
    }

    // Step 6: control-flow flattening, where the grammar supports it.
    if options.control_flow_flattening {
        if let Some(flattener) = grammar.flattener() {
            text = flattener.flatten(&text, &mut state, options, &mut rng)?;
            stages.push("flatten".to_string());
            debug!(step = 6, "flattened control flow");
        }
    }

    // Step 7: dead-code injection.
    if options.dead_code_injection {
        if let Some(injector) = grammar.dead_code() {
            text = injector.inject(&text, &mut state, options, &mut rng)?;
            stages.push("dead_code".to_string());
            debug!(step = 7, "injected dead code");
        }
    }

    // Step 8: protective guards.
    if options.self_defending || options.anti_debug || options.disable_console {
        if let Some(guards) = grammar.guards() {
            text = guards.apply(&text, &mut state, options, &mut rng)?;
            stages.push("guards".to_string());
            debug!(step = 8, "applied protective guards");
        }
    }

    // Step 9: fix the pool layout, resolve placeholders, prepend the array
    // declaration and accessor. Layout must be final before any index text
    // is written.
    let pool_entries = state.pool.len();
    if pool_entries > 0 {
        if let Some(renderer) = grammar.pool_renderer() {
            let layout = state.pool.finalize(
                options.shuffle_string_array,
                options.rotate_string_array,
                &mut rng,
            );
            let numeric = NumericOptions::from_options(options);
            let syntax = grammar.number_syntax();
            text = replace_placeholders(&text, |logical| {
                let embedded = layout.embedded_index(logical)?;
                encode_number(embedded as u64, &numeric, syntax, &mut rng)
            })?;
            let (declaration, accessor) =
                renderer.render(&layout, &mut state, options, &mut rng)?;
            text = format!("{declaration}\n{accessor}\n{text}");
            stages.push("pool".to_string());
            debug!(step = 9, entries = pool_entries, "rendered string pool");
        }
    }

    // Step 10: compaction.
    if options.compact {
        text = grammar.compact(&text);
        stages.push("compact".to_string());
        debug!(step = 10, len = text.len(), "compacted output");
    }

    let original_size = source.len();
    let obfuscated_size = text.len();
    let size_increase_percentage = if original_size > 0 {
        (obfuscated_size as f64 - original_size as f64) / original_size as f64 * 100.0
    } else {
        0.0
    };

    debug!(
        original_size,
        obfuscated_size,
        renamed = state.rename_map.len(),
        "pipeline complete"
    );

    Ok(ObfuscationResult {
        output: text,
        original_size,
        obfuscated_size,
        size_increase_percentage,
        pool_entries,
        renamed_identifiers: state.rename_map.len(),
        metadata: ObfuscationMetadata {
            language: grammar.name().to_string(),
            stages_applied: stages,
            seed: config.seed.to_hex(),
        },
    })
}
