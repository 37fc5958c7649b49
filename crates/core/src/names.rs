//! Collision-free identifier generation.
//!
//! The allocator owns the per-run used-name set and the sequential counter
//! for the mangled style, so both reset by construction on every invocation.
//! Generation retries up to [`MAX_ATTEMPTS`] times before failing with
//! [`Error::NameExhaustion`]; it never loops forever on a small alphabet.

use crate::options::IdentifierStyle;
use crate::result::{Error, Result};
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::HashSet;

/// Upper bound on generation attempts per allocation.
pub const MAX_ATTEMPTS: usize = 1000;

const DICTIONARY_WORDS: &[&str] = &[
    "data", "info", "temp", "val", "item", "obj", "arr", "str", "num", "fn", "cb", "res", "req",
    "cfg", "opt", "ctx", "ref", "key", "idx", "len", "max", "min", "sum", "cnt", "ptr", "buf",
    "msg", "err", "log", "out",
];

// Latin Extended-A, Latin Extended-B, IPA Extensions.
const UNICODE_RANGES: &[(u32, u32)] = &[(0x0100, 0x017F), (0x0180, 0x024F), (0x0250, 0x02AF)];

const ZALGO_UP: &[char] = &[
    '\u{0300}', '\u{0301}', '\u{0302}', '\u{0303}', '\u{0304}', '\u{0305}', '\u{0306}', '\u{0307}',
    '\u{0308}', '\u{0309}', '\u{030A}', '\u{030B}', '\u{030C}', '\u{030D}', '\u{030E}', '\u{030F}',
];
const ZALGO_DOWN: &[char] = &[
    '\u{0316}', '\u{0317}', '\u{0318}', '\u{0319}', '\u{031C}', '\u{031D}', '\u{031E}', '\u{031F}',
    '\u{0320}', '\u{0324}', '\u{0325}', '\u{0326}', '\u{0329}', '\u{032A}', '\u{032B}', '\u{032C}',
];
const ZALGO_MID: &[char] = &['\u{0334}', '\u{0335}', '\u{0336}', '\u{0337}', '\u{0338}'];

const INVISIBLES: &[char] = &['\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}'];

const CONFUSABLE_FIRST: &[char] = &['I', 'l', 'O', 'o'];
const CONFUSABLE_REST: &[char] = &['I', 'l', '1', 'O', '0', 'o'];

const GREEK: &[char] = &[
    'α', 'β', 'γ', 'δ', 'ε', 'ζ', 'η', 'θ', 'ι', 'κ', 'λ', 'μ', 'ν', 'ξ', 'ο', 'π', 'ρ', 'σ',
    'τ', 'υ', 'φ', 'χ', 'ψ', 'ω',
];

const EMOJI_VARIABLES: &[&str] = &[
    "$🔒", "$🔐", "$🔑", "$🛡", "$⚡", "$🔥", "$💀", "$👻", "$🎭", "$🌀",
];

/// Grammar-legal identifier alphabet for the alphanumeric style.
///
/// Both fields must be ASCII (they are indexed bytewise).
#[derive(Debug, Clone, Copy)]
pub struct IdentCharset {
    /// Characters legal in the first position.
    pub first: &'static str,
    /// Characters legal in continuation positions.
    pub rest: &'static str,
}

/// Generates collision-free, grammar-legal identifiers in multiple styles.
#[derive(Debug)]
pub struct NameAllocator {
    style: IdentifierStyle,
    length: usize,
    prefix: String,
    charset: IdentCharset,
    reserved: HashSet<String>,
    used: HashSet<String>,
    /// Per-run counter for the sequential mangled style.
    mangled_counter: u64,
}

impl NameAllocator {
    /// Creates an allocator for one obfuscation run.
    pub fn new(
        style: IdentifierStyle,
        length: usize,
        prefix: String,
        charset: IdentCharset,
    ) -> Self {
        Self {
            style,
            length: length.max(1),
            prefix,
            charset,
            reserved: HashSet::new(),
            used: HashSet::new(),
            mangled_counter: 0,
        }
    }

    /// Adds names to the reserved set (grammar keywords, globals, and the
    /// user-supplied block-list).
    pub fn reserve<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved.extend(names.into_iter().map(Into::into));
    }

    /// Returns true if the name may not be allocated or renamed.
    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains(name)
    }

    /// Number of names handed out so far in this run.
    pub fn allocated_count(&self) -> usize {
        self.used.len()
    }

    /// Returns a fresh identifier that is unused in this run and not in the
    /// reserved set. Every success is recorded in the used-name set.
    pub fn allocate(&mut self, rng: &mut StdRng) -> Result<String> {
        for _ in 0..MAX_ATTEMPTS {
            let name = self.generate(rng);
            if self.used.contains(&name) || self.reserved.contains(&name) {
                continue;
            }
            self.used.insert(name.clone());
            return Ok(name);
        }
        Err(Error::NameExhaustion {
            attempts: MAX_ATTEMPTS,
        })
    }

    fn generate(&mut self, rng: &mut StdRng) -> String {
        let body = match self.style {
            IdentifierStyle::Alphanumeric => self.random_alpha(rng),
            IdentifierStyle::Hexadecimal => format!("_0x{}", random_hex(self.length, rng)),
            IdentifierStyle::Mangled => self.mangled_name(),
            IdentifierStyle::Dictionary => dictionary_name(rng),
            IdentifierStyle::RandomUnicode => unicode_name(self.length, rng),
            IdentifierStyle::Zalgo => zalgo_name(self.length, rng),
            IdentifierStyle::Invisible => invisible_name(self.length, rng),
            IdentifierStyle::Confusables => confusable_name(self.length, rng),
            IdentifierStyle::Greek => greek_name(self.length, rng),
            IdentifierStyle::Emoji => emoji_name(rng),
        };
        format!("{}{}", self.prefix, body)
    }

    fn random_alpha(&self, rng: &mut StdRng) -> String {
        let first = self.charset.first.as_bytes();
        let rest = self.charset.rest.as_bytes();
        let mut out = String::with_capacity(self.length);
        out.push(first[rng.random_range(0..first.len())] as char);
        for _ in 1..self.length {
            out.push(rest[rng.random_range(0..rest.len())] as char);
        }
        out
    }

    /// Sequential base-26 counter: a, b, ... z, aa, ab, ...
    fn mangled_name(&mut self) -> String {
        const CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
        let mut n = self.mangled_counter as i64;
        self.mangled_counter += 1;

        let mut out = String::new();
        loop {
            out.insert(0, CHARS[(n % 26) as usize] as char);
            n = n / 26 - 1;
            if n < 0 {
                break;
            }
        }
        out
    }
}

fn random_hex(length: usize, rng: &mut StdRng) -> String {
    const CHARS: &[u8] = b"0123456789abcdef";
    (0..length)
        .map(|_| CHARS[rng.random_range(0..16)] as char)
        .collect()
}

fn dictionary_name(rng: &mut StdRng) -> String {
    let word = DICTIONARY_WORDS[rng.random_range(0..DICTIONARY_WORDS.len())];
    format!("_{}{}", word, rng.random_range(0..1000))
}

fn unicode_name(length: usize, rng: &mut StdRng) -> String {
    let mut out = String::from("_");
    for _ in 0..length {
        let (lo, hi) = UNICODE_RANGES[rng.random_range(0..UNICODE_RANGES.len())];
        let cp = rng.random_range(lo..=hi);
        // Every codepoint in these ranges is a valid char.
        if let Some(c) = char::from_u32(cp) {
            out.push(c);
        }
    }
    out
}

fn zalgo_name(length: usize, rng: &mut StdRng) -> String {
    let mut out = String::from("_");
    for _ in 0..length {
        out.push(ZALGO_UP[rng.random_range(0..ZALGO_UP.len())]);
        out.push(ZALGO_MID[rng.random_range(0..ZALGO_MID.len())]);
        out.push(ZALGO_DOWN[rng.random_range(0..ZALGO_DOWN.len())]);
    }
    out
}

fn invisible_name(length: usize, rng: &mut StdRng) -> String {
    let mut out = String::from("_");
    for _ in 0..length {
        out.push(INVISIBLES[rng.random_range(0..INVISIBLES.len())]);
    }
    out
}

fn confusable_name(length: usize, rng: &mut StdRng) -> String {
    let mut out = String::new();
    out.push(CONFUSABLE_FIRST[rng.random_range(0..CONFUSABLE_FIRST.len())]);
    for _ in 1..length {
        out.push(CONFUSABLE_REST[rng.random_range(0..CONFUSABLE_REST.len())]);
    }
    out
}

fn greek_name(length: usize, rng: &mut StdRng) -> String {
    (0..length)
        .map(|_| GREEK[rng.random_range(0..GREEK.len())])
        .collect()
}

fn emoji_name(rng: &mut StdRng) -> String {
    let base = EMOJI_VARIABLES[rng.random_range(0..EMOJI_VARIABLES.len())];
    format!("{}{}", base, rng.random_range(0..1000))
}
