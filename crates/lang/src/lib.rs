//! Grammar variants and the obfuscation pipeline.
//!
//! One [`Grammar`] implementation per supported source language, plus the
//! fixed-order pipeline in [`pipeline`] that drives them.

pub mod grammar;
pub mod javascript;
pub mod lua;
pub mod pipeline;
pub mod python;

pub use grammar::Grammar;
pub use javascript::JavaScript;
pub use lua::Lua;
pub use pipeline::{obfuscate, ObfuscationMetadata, ObfuscationResult, PipelineConfig};
pub use python::Python;

use serde::{Deserialize, Serialize};

static JAVASCRIPT: JavaScript = JavaScript;
static PYTHON: Python = Python;
static LUA: Lua = Lua;

/// A supported source language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    Python,
    Lua,
}

impl Language {
    /// The grammar implementation for this language.
    pub fn grammar(&self) -> &'static dyn Grammar {
        match self {
            Language::JavaScript => &JAVASCRIPT,
            Language::Python => &PYTHON,
            Language::Lua => &LUA,
        }
    }

    /// Parses a language name, tolerating common aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "javascript" | "js" => Some(Language::JavaScript),
            "python" | "py" => Some(Language::Python),
            "lua" => Some(Language::Lua),
            _ => None,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.grammar().name())
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unsupported language: {s}"))
    }
}
