//! Python grammar.
//!
//! Strings are encoded inline rather than pooled: there is no prelude-friendly
//! place for an array declaration in arbitrary Python fragments, so each
//! literal carries its own decoder expression.

use crate::grammar::{replace_all_fallible, unescape_source, Grammar};
use crate::javascript::transform_int_literals;
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::Rng;
use regex::{Captures, Regex};
use umbra_core::literal::{pick_idiom, BitwiseIdentity, NumberSyntax, NumericOptions};
use umbra_core::names::IdentCharset;
use umbra_core::options::{IdentifierStyle, ObfuscationOptions, StringEncoding};
use umbra_core::{ObfuscatorState, Result};

const RESERVED: &[&str] = &[
    // Keywords
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
    // Builtins
    "abs", "all", "any", "bool", "bytes", "callable", "chr", "dict", "dir", "divmod",
    "enumerate", "eval", "exec", "filter", "float", "format", "frozenset", "getattr", "globals",
    "hasattr", "hash", "hex", "id", "input", "int", "isinstance", "issubclass", "iter", "len",
    "list", "locals", "map", "max", "min", "next", "object", "oct", "open", "ord", "pow",
    "print", "property", "range", "repr", "reversed", "round", "set", "setattr", "slice",
    "sorted", "staticmethod", "str", "sum", "super", "tuple", "type", "vars", "zip", "self",
    "cls", "__init__", "__main__", "__name__", "__file__",
];

const CHARSET: IdentCharset = IdentCharset {
    first: "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_",
    rest: "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_0123456789",
};

static NUMBER_SYNTAX: NumberSyntax = NumberSyntax {
    hex_literals: true,
    bitwise: &[
        BitwiseIdentity::OrZero,
        BitwiseIdentity::XorZero,
        BitwiseIdentity::DoubleNot,
    ],
    zero_idioms: &["(1-1)", "(0|0)"],
    one_idioms: &["(1-0)", "(2-1)"],
};

// Idioms avoid the sentinel words themselves so one pass cannot feed the next.
const TRUE_IDIOMS: &[&str] = &["(1==1)", "(not 0)", "bool(1)"];
const FALSE_IDIOMS: &[&str] = &["(1==0)", "(not 1)", "bool(0)"];
const NONE_IDIOMS: &[&str] = &["([].append(0))"];

static LINE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)#.*$").unwrap());
static DOCSTRING_DQ: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)^[ \t]*"{3}(?s:.*?)"{3}[ \t]*$"#).unwrap());
static DOCSTRING_SQ: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*'{3}(?s:.*?)'{3}[ \t]*$").unwrap());

static STRING_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""(?:\\.|[^"\\\n])*"|'(?:\\.|[^'\\\n])*'"#).unwrap());

static ASSIGNMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*([A-Za-z_][A-Za-z0-9_]*)\s*=[^=]").unwrap());
static DEF_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bdef\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap());
static DEF_PARAMS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bdef\s+[A-Za-z_][A-Za-z0-9_]*\s*\(([^)]*)\)").unwrap());
static IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

static TRUE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bTrue\b").unwrap());
static FALSE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bFalse\b").unwrap());
static NONE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bNone\b").unwrap());

static TRAILING_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)[ \t]+$").unwrap());

/// The Python grammar.
#[derive(Debug, Default)]
pub struct Python;

impl Grammar for Python {
    fn name(&self) -> &'static str {
        "python"
    }

    fn reserved_words(&self) -> &'static [&'static str] {
        RESERVED
    }

    fn ident_charset(&self) -> IdentCharset {
        CHARSET
    }

    fn effective_style(&self, requested: IdentifierStyle) -> IdentifierStyle {
        match requested {
            // Zero-width characters and emoji are not XID identifier
            // characters in Python.
            IdentifierStyle::Invisible | IdentifierStyle::Emoji => IdentifierStyle::Confusables,
            other => other,
        }
    }

    fn strip_comments(&self, src: &str) -> String {
        let src = DOCSTRING_DQ.replace_all(src, "");
        let src = DOCSTRING_SQ.replace_all(&src, "");
        LINE_COMMENT.replace_all(&src, "").into_owned()
    }

    fn declarations(&self, src: &str, options: &ObfuscationOptions) -> Vec<String> {
        let mut found = Vec::new();

        if options.rename_variables {
            for caps in ASSIGNMENT.captures_iter(src) {
                found.push(caps[1].to_string());
            }
            for caps in DEF_PARAMS.captures_iter(src) {
                for param in caps[1].split(',') {
                    // Strip annotations and defaults; skip *args / **kwargs.
                    let name = param
                        .split(':')
                        .next()
                        .and_then(|p| p.split('=').next())
                        .unwrap_or("")
                        .trim();
                    if IDENT.is_match(name) {
                        found.push(name.to_string());
                    }
                }
            }
        }

        if options.rename_functions {
            for caps in DEF_NAME.captures_iter(src) {
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
            let m = caps.get(0).expect("whole match");
            let lit = m.as_str();
            let body = &lit[1..lit.len() - 1];

            if body.chars().count() < 2 {
                return Ok(None);
            }
            // Prefixed literals (f-strings, raw, bytes) must keep their
            // source spelling.
            let prefix = src[..m.start()].chars().next_back();
            if matches!(prefix, Some('f' | 'F' | 'r' | 'R' | 'b' | 'B')) {
                return Ok(None);
            }
            if rng.random_range(0.0..100.0) > threshold {
                return Ok(None);
            }

            let value = unescape_source(body);
            Ok(Some(encode_inline(&value, options.string_encoding)))
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
            out = NONE_WORD
                .replace_all(&out, |_: &Captures| pick_idiom(NONE_IDIOMS, rng).to_string())
                .into_owned();
        }
        // Python has no Infinity or NaN literal to rewrite.

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

    /// Whitespace is syntax in Python; compaction only drops trailing
    /// whitespace and blank lines.
    fn compact(&self, src: &str) -> String {
        let trimmed = TRAILING_WS.replace_all(src, "");
        let lines: Vec<&str> = trimmed.lines().filter(|l| !l.is_empty()).collect();
        lines.join("\n")
    }
}

/// Encodes one literal's runtime value as a self-decoding expression.
fn encode_inline(value: &str, method: StringEncoding) -> String {
    use base64::Engine as _;
    match method {
        StringEncoding::None => {
            format!("'{}'", umbra_core::literal::escape_string_content(value))
        }
        StringEncoding::Hex => {
            let hex: String = value.bytes().map(|b| format!("{b:02x}")).collect();
            format!("bytes.fromhex('{hex}').decode('utf-8')")
        }
        // RC4 and XOR have no inline decoder here; base64 is the fallback,
        // as it also is for the declared AES method.
        StringEncoding::Base64 | StringEncoding::Aes | StringEncoding::Rc4 | StringEncoding::Xor => {
            let payload = base64::engine::general_purpose::STANDARD.encode(value.as_bytes());
            format!("__import__('base64').b64decode('{payload}').decode('utf-8')")
        }
    }
}
