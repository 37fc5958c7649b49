//! Obfuscation options.
//!
//! Options arrive as a flat JSON map from the caller. Field names keep the
//! camelCase keys of the option map wire format; unrecognized keys are
//! ignored and absent keys take their defaults, so partial maps are valid.

use serde::{Deserialize, Serialize};

/// Identifier generation style for [`crate::names::NameAllocator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum IdentifierStyle {
    /// Plain alphanumeric using the grammar's identifier charset.
    Alphanumeric,
    /// Hex-suffixed names of the form `_0x3f2a91`.
    #[default]
    Hexadecimal,
    /// Sequential base-26 counter: a, b, ... z, aa, ab, ...
    Mangled,
    /// Short dictionary word plus a numeric suffix.
    Dictionary,
    /// Extended-Latin / IPA codepoints.
    RandomUnicode,
    /// Combining-mark decoration stacked on an underscore.
    Zalgo,
    /// Zero-width / invisible codepoint sequences.
    Invisible,
    /// Visually confusable I/l/1/O/0/o sequences.
    Confusables,
    /// Lowercase Greek letters.
    Greek,
    /// Emoji variable plus a numeric suffix.
    Emoji,
}

/// String literal encoding method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StringEncoding {
    /// Plain escaping only.
    None,
    /// Base64 with an inline runtime decoder.
    #[default]
    Base64,
    /// RC4 stream cipher with embedded key and self-contained inline decoder.
    Rc4,
    /// Single-byte XOR over code units.
    Xor,
    /// Declared AES method. Currently falls back to base64; kept as a
    /// documented gap so the output format contract stays stable.
    Aes,
    /// Hex byte string (Python `bytes.fromhex` path).
    Hex,
}

/// Flat option map controlling every pipeline stage.
///
/// Bounded numeric options are clamped where they are consumed (thresholds to
/// 0..=100, complexity to a small recursion depth), never rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObfuscationOptions {
    // Identifiers
    pub rename_variables: bool,
    pub rename_functions: bool,
    pub identifier_generator: IdentifierStyle,
    pub name_length: usize,
    pub identifier_prefix: String,
    /// Comma-separated user block-list merged into the grammar reserved set.
    pub reserved_names: String,

    // Strings
    pub string_array: bool,
    /// Percentage of occurrences pooled, compared against a random draw.
    pub string_threshold: f64,
    pub string_encoding: StringEncoding,
    pub shuffle_string_array: bool,
    pub rotate_string_array: bool,
    pub wrap_string_calls: bool,
    /// Escape non-ASCII pool entries as `\uXXXX`.
    pub unicode_escape: bool,

    // Numbers
    pub numbers_to_expressions: bool,
    pub numbers_to_hex: bool,
    pub numbers_to_bitwise: bool,
    pub number_complexity: u32,

    // Literal sentinels
    pub transform_booleans: bool,
    pub transform_undefined: bool,
    pub transform_null: bool,
    pub transform_infinity: bool,
    pub transform_nan: bool,

    // Control flow (richest variant only)
    pub control_flow_flattening: bool,
    pub flattening_threshold: f64,
    pub dead_code_injection: bool,
    pub dead_code_amount: f64,

    // Protection (richest variant only)
    pub self_defending: bool,
    pub anti_debug: bool,
    pub disable_console: bool,

    // Output
    pub compact: bool,
}

impl Default for ObfuscationOptions {
    fn default() -> Self {
        Self {
            rename_variables: true,
            rename_functions: true,
            identifier_generator: IdentifierStyle::Hexadecimal,
            name_length: 6,
            identifier_prefix: String::new(),
            reserved_names: String::new(),

            string_array: true,
            string_threshold: 75.0,
            string_encoding: StringEncoding::Base64,
            shuffle_string_array: true,
            rotate_string_array: true,
            wrap_string_calls: false,
            unicode_escape: false,

            numbers_to_expressions: false,
            numbers_to_hex: false,
            numbers_to_bitwise: false,
            number_complexity: 2,

            transform_booleans: true,
            transform_undefined: false,
            transform_null: false,
            transform_infinity: false,
            transform_nan: false,

            control_flow_flattening: false,
            flattening_threshold: 75.0,
            dead_code_injection: false,
            dead_code_amount: 20.0,

            self_defending: false,
            anti_debug: false,
            disable_console: false,

            compact: true,
        }
    }
}

impl ObfuscationOptions {
    /// Parsed user block-list from the comma-separated `reservedNames` option.
    pub fn reserved_name_list(&self) -> Vec<String> {
        self.reserved_names
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// String-pool threshold clamped to a valid percentage.
    pub fn string_threshold_pct(&self) -> f64 {
        self.string_threshold.clamp(0.0, 100.0)
    }

    /// Flattening threshold clamped to a valid percentage.
    pub fn flattening_threshold_pct(&self) -> f64 {
        self.flattening_threshold.clamp(0.0, 100.0)
    }

    /// Dead-code amount clamped to a valid percentage.
    pub fn dead_code_amount_pct(&self) -> f64 {
        self.dead_code_amount.clamp(0.0, 100.0)
    }
}
