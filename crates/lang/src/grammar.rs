//! The shared capability interface implemented by each host grammar.
//!
//! A grammar supplies its reserved words, comment syntax, declaration
//! patterns, sentinel idioms, and literal encodings. Capabilities that only
//! the richest grammar has (control-flow flattening, dead code, protective
//! guards, string-pool rendering) are optional extensions returning `None`
//! by default rather than forcing empty implementations on grammars that
//! lack them.

use rand::rngs::StdRng;
use regex::{Captures, Regex};
use umbra_core::literal::NumberSyntax;
use umbra_core::names::IdentCharset;
use umbra_core::options::{IdentifierStyle, ObfuscationOptions};
use umbra_core::pool::PoolLayout;
use umbra_core::{Error, ObfuscatorState, Result};

/// A host grammar the engine can obfuscate.
pub trait Grammar: Send + Sync {
    /// Grammar name for logging and the result metadata.
    fn name(&self) -> &'static str;

    /// Keywords and globals that must never be allocated or renamed.
    fn reserved_words(&self) -> &'static [&'static str];

    /// Identifier alphabet for the alphanumeric style.
    fn ident_charset(&self) -> IdentCharset;

    /// Maps the requested identifier style to one this grammar's
    /// identifiers permit. Unsupported styles fall back to confusables.
    fn effective_style(&self, requested: IdentifierStyle) -> IdentifierStyle;

    /// Removes line and block comments. Purely lexical: comment-like text
    /// inside string literals is not distinguished from real comments.
    fn strip_comments(&self, src: &str) -> String;

    /// Scans declaration patterns and returns declared names in discovery
    /// order (duplicates included; the caller dedupes).
    fn declarations(&self, src: &str, options: &ObfuscationOptions) -> Vec<String>;

    /// Pools or inline-encodes string literals.
    fn process_strings(
        &self,
        src: &str,
        state: &mut ObfuscatorState,
        options: &ObfuscationOptions,
        rng: &mut StdRng,
    ) -> Result<String>;

    /// Replaces literal sentinels (true/false/undefined-null-nil/Infinity/
    /// NaN) with random semantically-equivalent idioms, per the option
    /// toggles.
    fn transform_sentinels(
        &self,
        src: &str,
        options: &ObfuscationOptions,
        rng: &mut StdRng,
    ) -> String;

    /// Numeric literal capabilities of this grammar.
    fn number_syntax(&self) -> &'static NumberSyntax;

    /// Rewrites integer literals into equivalent expressions.
    fn transform_numbers(
        &self,
        src: &str,
        options: &ObfuscationOptions,
        rng: &mut StdRng,
    ) -> Result<String>;

    /// Strips or normalizes whitespace.
    fn compact(&self, src: &str) -> String;

    /// Control-flow flattening capability, if the grammar has one.
    fn flattener(&self) -> Option<&dyn ControlFlowFlattening> {
        None
    }

    /// Dead-code injection capability, if the grammar has one.
    fn dead_code(&self) -> Option<&dyn DeadCodeInjection> {
        None
    }

    /// Protective-guard capability, if the grammar has one.
    fn guards(&self) -> Option<&dyn ProtectiveGuards> {
        None
    }

    /// String-pool rendering capability, if the grammar has one.
    fn pool_renderer(&self) -> Option<&dyn PoolRendering> {
        None
    }
}

/// Rewrites function bodies into state-variable dispatch loops.
pub trait ControlFlowFlattening: Send + Sync {
    fn flatten(
        &self,
        src: &str,
        state: &mut ObfuscatorState,
        options: &ObfuscationOptions,
        rng: &mut StdRng,
    ) -> Result<String>;
}

/// Inserts no-op statements at random line positions.
pub trait DeadCodeInjection: Send + Sync {
    fn inject(
        &self,
        src: &str,
        state: &mut ObfuscatorState,
        options: &ObfuscationOptions,
        rng: &mut StdRng,
    ) -> Result<String>;
}

/// Prepends self-defense / anti-debug / console-disable templates.
pub trait ProtectiveGuards: Send + Sync {
    fn apply(
        &self,
        src: &str,
        state: &mut ObfuscatorState,
        options: &ObfuscationOptions,
        rng: &mut StdRng,
    ) -> Result<String>;
}

/// Emits the pool array declaration and accessor for a finalized layout.
pub trait PoolRendering: Send + Sync {
    /// Returns `(declaration, accessor)` text using freshly allocated names.
    fn render(
        &self,
        layout: &PoolLayout,
        state: &mut ObfuscatorState,
        options: &ObfuscationOptions,
        rng: &mut StdRng,
    ) -> Result<(String, String)>;
}

/// `replace_all` that can fail and can decline a match.
///
/// The closure returns `Ok(None)` to keep the match unchanged. Any error
/// aborts the whole rewrite, per the no-partial-output policy.
pub fn replace_all_fallible<F>(re: &Regex, src: &str, mut f: F) -> Result<String>
where
    F: FnMut(&Captures) -> Result<Option<String>>,
{
    let mut out = String::with_capacity(src.len());
    let mut last = 0usize;
    for caps in re.captures_iter(src) {
        let m = caps.get(0).expect("capture group 0 always exists");
        out.push_str(&src[last..m.start()]);
        match f(&caps)? {
            Some(replacement) => out.push_str(&replacement),
            None => out.push_str(m.as_str()),
        }
        last = m.end();
    }
    out.push_str(&src[last..]);
    Ok(out)
}

/// Decodes the escape sequences of a scanned string literal body so encoders
/// operate on the actual runtime value (the round-trip contract is on
/// values, not on source spellings).
///
/// Handles the common subset shared by the host grammars: `\\`, `\'`, `\"`,
/// `` \` ``, `\n`, `\r`, `\t`, `\0`, `\xNN`, `\uXXXX`, and `\u{...}`.
/// Unknown escapes decode to the escaped character itself.
pub fn unescape_source(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(esc) = chars.next() else {
            out.push('\\');
            break;
        };
        match esc {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            '0' => out.push('\0'),
            'x' => {
                let hi = chars.next();
                let lo = chars.next();
                match (hi, lo) {
                    (Some(h), Some(l)) => {
                        let hex: String = [h, l].iter().collect();
                        match u8::from_str_radix(&hex, 16) {
                            Ok(byte) => out.push(byte as char),
                            Err(_) => {
                                out.push('x');
                                out.push(h);
                                out.push(l);
                            }
                        }
                    }
                    _ => out.push('x'),
                }
            }
            'u' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    let mut hex = String::new();
                    for c in chars.by_ref() {
                        if c == '}' {
                            break;
                        }
                        hex.push(c);
                    }
                    match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                        Some(ch) => out.push(ch),
                        None => out.push_str(&hex),
                    }
                } else {
                    let hex: String = chars.by_ref().take(4).collect();
                    match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                        Some(ch) => out.push(ch),
                        None => {
                            out.push('u');
                            out.push_str(&hex);
                        }
                    }
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Allocates a replacement for each newly discovered, non-reserved, unmapped
/// name and performs a global boundary-aware substitution of every mapped
/// name across the whole text.
///
/// Renaming is injective within a run (the allocator guarantees it) but not
/// scope-aware: distinct-scope declarations sharing a name collide. That is
/// a structural limitation of the lexical engine, preserved deliberately.
pub fn apply_renames(
    src: &str,
    declared: Vec<String>,
    state: &mut ObfuscatorState,
    rng: &mut StdRng,
) -> Result<String> {
    for name in declared {
        if state.allocator.is_reserved(&name) || state.rename_map.contains_key(&name) {
            continue;
        }
        let replacement = state.allocator.allocate(rng)?;
        state.rename_map.insert(name, replacement);
    }

    let mut out = src.to_string();
    for (original, generated) in &state.rename_map {
        let pattern = format!(r"\b{}\b", regex::escape(original));
        let re = Regex::new(&pattern)
            .map_err(|e| Error::Transform(format!("rename pattern for '{original}': {e}")))?;
        out = re.replace_all(&out, generated.as_str()).into_owned();
    }
    Ok(out)
}
