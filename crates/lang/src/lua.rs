//! Lua grammar.
//!
//! The most restrictive variant: ASCII-only identifiers, no bitwise operator
//! forms in the numeric encoder, and `string.char` as the only string
//! encoding.

use crate::grammar::{replace_all_fallible, unescape_source, Grammar};
use crate::javascript::transform_int_literals;
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::Rng;
use regex::{Captures, Regex};
use umbra_core::literal::{pick_idiom, NumberSyntax, NumericOptions};
use umbra_core::names::IdentCharset;
use umbra_core::options::{IdentifierStyle, ObfuscationOptions, StringEncoding};
use umbra_core::{ObfuscatorState, Result};

const RESERVED: &[&str] = &[
    // Keywords
    "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "goto", "if",
    "in", "local", "nil", "not", "or", "repeat", "return", "then", "true", "until", "while",
    // Globals
    "print", "string", "table", "math", "io", "os", "pairs", "ipairs", "type", "tostring",
    "tonumber", "require", "pcall", "xpcall", "error", "assert", "select", "unpack", "rawget",
    "rawset", "rawequal", "rawlen", "next", "setmetatable", "getmetatable", "coroutine", "load",
    "loadstring", "dofile", "collectgarbage", "_G", "_ENV", "arg", "self",
];

const CHARSET: IdentCharset = IdentCharset {
    first: "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_",
    rest: "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_0123456789",
};

// No portable bitwise operator forms before Lua 5.3, so none are offered.
static NUMBER_SYNTAX: NumberSyntax = NumberSyntax {
    hex_literals: true,
    bitwise: &[],
    zero_idioms: &["(1-1)"],
    one_idioms: &["(2-1)"],
};

const TRUE_IDIOMS: &[&str] = &["(1==1)"];
const FALSE_IDIOMS: &[&str] = &["(1==0)"];
const NIL_IDIOMS: &[&str] = &["(({})[1])"];

static BLOCK_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"--\[\[(?s:.*?)\]\]").unwrap());
static LINE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)--.*$").unwrap());

static STRING_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""(?:\\.|[^"\\\n])*"|'(?:\\.|[^'\\\n])*'"#).unwrap());

static LOCAL_DECL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\blocal\s+(?:function\s+)?([A-Za-z_][A-Za-z0-9_]*)").unwrap());
static FUNC_DECL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bfunction\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(").unwrap());

static TRUE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\btrue\b").unwrap());
static FALSE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bfalse\b").unwrap());
static NIL_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bnil\b").unwrap());

static TRAILING_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)[ \t]+$").unwrap());

/// The Lua grammar.
#[derive(Debug, Default)]
pub struct Lua;

impl Grammar for Lua {
    fn name(&self) -> &'static str {
        "lua"
    }

    fn reserved_words(&self) -> &'static [&'static str] {
        RESERVED
    }

    fn ident_charset(&self) -> IdentCharset {
        CHARSET
    }

    fn effective_style(&self, requested: IdentifierStyle) -> IdentifierStyle {
        match requested {
            IdentifierStyle::Alphanumeric
            | IdentifierStyle::Hexadecimal
            | IdentifierStyle::Mangled
            | IdentifierStyle::Dictionary
            | IdentifierStyle::Confusables => requested,
            // Lua identifiers are ASCII letters, digits, and underscore.
            _ => IdentifierStyle::Confusables,
        }
    }

    fn strip_comments(&self, src: &str) -> String {
        // Block form first so `--[[ ... ]]` is not truncated at its first
        // line boundary by the line rule.
        let src = BLOCK_COMMENT.replace_all(src, "");
        LINE_COMMENT.replace_all(&src, "").into_owned()
    }

    fn declarations(&self, src: &str, options: &ObfuscationOptions) -> Vec<String> {
        let mut found = Vec::new();

        if options.rename_variables {
            for caps in LOCAL_DECL.captures_iter(src) {
                found.push(caps[1].to_string());
            }
        }

        // Only plain global function names; dotted and method names
        // (`function M.f`, `function M:f`) stay untouched.
        if options.rename_functions {
            for caps in FUNC_DECL.captures_iter(src) {
                found.push(caps[1].to_string());
            }
        }

        found
    }

    fn process_strings(
        &self,
        src: &str,
        _state: &mut ObfuscatorState,
        options: &ObfuscationOptions,
        rng: &mut StdRng,
    ) -> Result<String> {
        let threshold = options.string_threshold_pct();

        replace_all_fallible(&STRING_LITERAL, src, |caps: &Captures| {
            let lit = &caps[0];
            let body = &lit[1..lit.len() - 1];

            if body.chars().count() < 2 {
                return Ok(None);
            }
            if rng.random_range(0.0..100.0) > threshold {
                return Ok(None);
            }
            // Plain escaping keeps the literal as written.
            if options.string_encoding == StringEncoding::None {
                return Ok(None);
            }

            // string.char over the UTF-8 bytes of the runtime value is the
            // one decoder every Lua build has.
            let value = unescape_source(body);
            let bytes: Vec<String> = value.bytes().map(|b| b.to_string()).collect();
            Ok(Some(format!("string.char({})", bytes.join(","))))
        })
    }

    fn transform_sentinels(
        &self,
        src: &str,
        options: &ObfuscationOptions,
        rng: &mut StdRng,
    ) -> String {
        let mut out = src.to_string();

        if options.transform_booleans {
            out = TRUE_WORD
                .replace_all(&out, |_: &Captures| pick_idiom(TRUE_IDIOMS, rng).to_string())
                .into_owned();
            out = FALSE_WORD
                .replace_all(&out, |_: &Captures| {
                    pick_idiom(FALSE_IDIOMS, rng).to_string()
                })
                .into_owned();
        }
        if options.transform_null {
            out = NIL_WORD
                .replace_all(&out, |_: &Captures| pick_idiom(NIL_IDIOMS, rng).to_string())
                .into_owned();
        }

        out
    }

    fn number_syntax(&self) -> &'static NumberSyntax {
        &NUMBER_SYNTAX
    }

    fn transform_numbers(
        &self,
        src: &str,
        options: &ObfuscationOptions,
        rng: &mut StdRng,
    ) -> Result<String> {
        let opts = NumericOptions::from_options(options);
        transform_int_literals(src, &opts, &NUMBER_SYNTAX, rng)
    }

    /// Line structure terminates statements in common Lua styles, so only
    /// trailing whitespace and blank lines go.
    fn compact(&self, src: &str) -> String {
        let trimmed = TRAILING_WS.replace_all(src, "");
        let lines: Vec<&str> = trimmed.lines().filter(|l| !l.is_empty()).collect();
        lines.join("\n")
    }
}
