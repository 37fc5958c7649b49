//! Literal encoding primitives shared by every grammar variant.
//!
//! The core correctness contract: evaluating `encode(x)` under the target
//! grammar's runtime reproduces `x` exactly, for every method and every
//! representable value. Encodings are never cached, so identical values may
//! encode differently across occurrences.

use crate::result::{Error, Result};
use crate::MAX_SAFE_INTEGER;
use rand::rngs::StdRng;
use rand::Rng;

/// Bitwise identity forms a grammar can evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitwiseIdentity {
    /// `(n|0)`
    OrZero,
    /// `(n^0)`
    XorZero,
    /// `(~~n)`
    DoubleNot,
}

/// Grammar capabilities consulted by the numeric encoder.
#[derive(Debug, Clone, Copy)]
pub struct NumberSyntax {
    /// Whether `0x` integer literals are legal.
    pub hex_literals: bool,
    /// Bitwise identity forms the grammar evaluates correctly. Empty means
    /// the grammar has no usable bitwise forms.
    pub bitwise: &'static [BitwiseIdentity],
    /// Fixed idioms evaluating to 0.
    pub zero_idioms: &'static [&'static str],
    /// Fixed idioms evaluating to 1.
    pub one_idioms: &'static [&'static str],
}

/// Numeric encoding toggles extracted from the option map.
#[derive(Debug, Clone, Copy)]
pub struct NumericOptions {
    pub expressions: bool,
    pub hex: bool,
    pub bitwise: bool,
    pub complexity: u32,
}

impl NumericOptions {
    pub fn from_options(options: &crate::options::ObfuscationOptions) -> Self {
        Self {
            expressions: options.numbers_to_expressions,
            hex: options.numbers_to_hex,
            bitwise: options.numbers_to_bitwise,
            // Depth is a recursion bound; anything past a handful of levels
            // only bloats output.
            complexity: options.number_complexity.min(8),
        }
    }
}

/// Encodes a non-negative integer as an expression evaluating to it.
///
/// With expressions disabled this degrades to a hex literal (when enabled)
/// or the plain decimal literal. Values above [`MAX_SAFE_INTEGER`] are
/// rejected rather than risking precision loss at evaluation time.
pub fn encode_number(
    n: u64,
    opts: &NumericOptions,
    syntax: &NumberSyntax,
    rng: &mut StdRng,
) -> Result<String> {
    if n > MAX_SAFE_INTEGER {
        return Err(Error::Encoding(format!(
            "integer {n} exceeds the grammar's safe range"
        )));
    }

    if !opts.expressions {
        if opts.hex && syntax.hex_literals {
            return Ok(format!("0x{n:x}"));
        }
        return Ok(n.to_string());
    }

    Ok(expression(n, opts.complexity, opts, syntax, rng))
}

/// Recursively synthesizes an arithmetic expression evaluating to `n`.
///
/// Candidates are collected in a fixed order, then one is drawn uniformly at
/// random, so RNG consumption is deterministic for a fixed seed.
fn expression(
    n: u64,
    depth: u32,
    opts: &NumericOptions,
    syntax: &NumberSyntax,
    rng: &mut StdRng,
) -> String {
    if depth == 0 {
        return n.to_string();
    }

    let mut candidates: Vec<String> = Vec::new();

    // Additive split
    if n > 1 {
        let a = rng.random_range(1..n);
        let b = n - a;
        candidates.push(format!(
            "({}+{})",
            expression(a, depth - 1, opts, syntax, rng),
            expression(b, depth - 1, opts, syntax, rng)
        ));
    }

    // Subtractive split: target plus a random offset, then the difference
    if n < 1000 {
        let offset = rng.random_range(1..=100u64);
        let a = n + offset;
        candidates.push(format!("({a}-{offset})"));
    }

    // First non-trivial factor pair
    let mut i = 2u64;
    while i * i <= n {
        if n % i == 0 {
            candidates.push(format!("({}*{})", i, n / i));
            break;
        }
        i += 1;
    }

    // Bitwise identities
    if opts.bitwise {
        for form in syntax.bitwise {
            candidates.push(match form {
                BitwiseIdentity::OrZero => format!("({n}|0)"),
                BitwiseIdentity::XorZero => format!("({n}^0)"),
                BitwiseIdentity::DoubleNot => format!("(~~{n})"),
            });
        }
    }

    // Hex literal
    if opts.hex && syntax.hex_literals && n > 9 {
        candidates.push(format!("0x{n:x}"));
    }

    // Fixed idioms for 0 and 1
    if n == 0 {
        candidates.extend(syntax.zero_idioms.iter().map(|s| s.to_string()));
    }
    if n == 1 {
        candidates.extend(syntax.one_idioms.iter().map(|s| s.to_string()));
    }

    if candidates.is_empty() {
        return n.to_string();
    }
    let pick = rng.random_range(0..candidates.len());
    candidates.swap_remove(pick)
}

/// Picks one idiom uniformly at random from a fixed set.
pub fn pick_idiom<'a>(idioms: &[&'a str], rng: &mut StdRng) -> &'a str {
    idioms[rng.random_range(0..idioms.len())]
}

/// Escapes string content so it stays syntactically valid inside single or
/// double quotes: backslash, both quote characters, newline, carriage
/// return, tab, and NUL.
pub fn escape_string_content(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes and double-quotes a string literal.
pub fn escape_string(s: &str) -> String {
    format!("\"{}\"", escape_string_content(s))
}

/// Escapes every code unit above 127 as `\uXXXX`. Operates on UTF-16 code
/// units so astral characters become surrogate-pair escapes, which the
/// JavaScript runtime reassembles exactly.
pub fn to_unicode_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for unit in s.encode_utf16() {
        if unit > 127 {
            out.push_str(&format!("\\u{unit:04x}"));
        } else {
            // Unit is ASCII, hence a valid char.
            out.push(unit as u8 as char);
        }
    }
    out
}

/// Escapes every byte of an ASCII-range string as `\xNN`.
pub fn to_hex_escape(s: &str) -> String {
    s.encode_utf16()
        .map(|unit| format!("\\x{:02x}", unit & 0xff))
        .collect()
}

/// Escapes every UTF-16 code unit as `\uXXXX` unconditionally. Used to embed
/// stream-cipher output, whose units are arbitrary (including control
/// characters and lone surrogates, both legal in JavaScript strings when
/// written as escapes).
pub fn units_to_unicode_escape(units: &[u16]) -> String {
    units.iter().map(|u| format!("\\u{u:04x}")).collect()
}

/// Applies the RC4 keystream to UTF-16 code units (low byte XOR).
///
/// Symmetric: applying it twice with the same key is the identity, which is
/// the round-trip guarantee the inline decoder relies on.
pub fn rc4_apply(units: &[u16], key: &[u8]) -> Vec<u16> {
    debug_assert!(!key.is_empty());

    let mut s: [u8; 256] = [0; 256];
    for (i, slot) in s.iter_mut().enumerate() {
        *slot = i as u8;
    }

    let mut j: u8 = 0;
    for i in 0..256 {
        j = j
            .wrapping_add(s[i])
            .wrapping_add(key[i % key.len()]);
        s.swap(i, j as usize);
    }

    let mut i: u8 = 0;
    let mut j: u8 = 0;
    let mut out = Vec::with_capacity(units.len());
    for &unit in units {
        i = i.wrapping_add(1);
        j = j.wrapping_add(s[i as usize]);
        s.swap(i as usize, j as usize);
        let k = s[(s[i as usize].wrapping_add(s[j as usize])) as usize];
        out.push(unit ^ k as u16);
    }
    out
}
