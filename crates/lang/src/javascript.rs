//! JavaScript grammar: the richest variant.
//!
//! Implements every optional capability: control-flow flattening, dead-code
//! injection, protective guards, and string-pool rendering.

use crate::grammar::{
    replace_all_fallible, unescape_source, ControlFlowFlattening, DeadCodeInjection, Grammar,
    PoolRendering, ProtectiveGuards,
};
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::Rng;
use regex::{Captures, Regex};
use umbra_core::literal::{
    encode_number, escape_string, escape_string_content, pick_idiom, rc4_apply, to_hex_escape,
    to_unicode_escape, units_to_unicode_escape, BitwiseIdentity, NumberSyntax, NumericOptions,
};
use umbra_core::names::IdentCharset;
use umbra_core::options::{IdentifierStyle, ObfuscationOptions, StringEncoding};
use umbra_core::pool::{PoolLayout, StringPool, REF_CLOSE, REF_OPEN};
use umbra_core::{ObfuscatorState, Result};

const RESERVED: &[&str] = &[
    // Keywords
    "break", "case", "catch", "continue", "debugger", "default", "delete", "do", "else",
    "finally", "for", "function", "if", "in", "instanceof", "new", "return", "switch", "this",
    "throw", "try", "typeof", "var", "void", "while", "with", "class", "const", "enum", "export",
    "extends", "import", "super", "implements", "interface", "let", "package", "private",
    "protected", "public", "static", "yield", "async", "await", "of",
    // Globals
    "undefined", "null", "true", "false", "NaN", "Infinity", "console", "window", "document",
    "global", "process", "require", "module", "exports", "Object", "Array", "String", "Number",
    "Boolean", "Function", "Symbol", "BigInt", "Math", "JSON", "Date", "RegExp", "Error",
    "Promise", "Map", "Set", "WeakMap", "WeakSet", "Proxy", "Reflect", "eval", "parseInt",
    "parseFloat", "isNaN", "isFinite", "encodeURI", "decodeURI", "encodeURIComponent",
    "decodeURIComponent", "arguments", "self", "globalThis",
];

const CHARSET: IdentCharset = IdentCharset {
    first: "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_$",
    rest: "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_$0123456789",
};

static NUMBER_SYNTAX: NumberSyntax = NumberSyntax {
    hex_literals: true,
    bitwise: &[
        BitwiseIdentity::OrZero,
        BitwiseIdentity::XorZero,
        BitwiseIdentity::DoubleNot,
    ],
    zero_idioms: &["(+[])", "(0|0)", "(1-1)"],
    one_idioms: &["(+!![])", "(0+1)", "(-~0)"],
};

const TRUE_IDIOMS: &[&str] = &["!![]", "!0", "!!1", "!\"\"", "!!{}"];
const FALSE_IDIOMS: &[&str] = &["![]", "!1", "!!0", "!{}", "!!\"\""];
const UNDEFINED_IDIOMS: &[&str] = &["void 0", "void(0)", "[][0]", "({}[0])", "(()=>{})()"];
const NULL_IDIOMS: &[&str] = &["({}[0]||null)"];
const INFINITY_IDIOMS: &[&str] = &["1/0", "1e309", "Number.POSITIVE_INFINITY"];
const NAN_IDIOMS: &[&str] = &["0/0", "NaN", "Number.NaN", "+\"x\""];

static LINE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)//.*$").unwrap());
static BLOCK_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());

// Rust regex has no backreferences, so the three quote forms are spelled out.
// Quoted strings cannot span lines; template literals can.
static STRING_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""(?:\\.|[^"\\\n])*"|'(?:\\.|[^'\\\n])*'|`(?s:(?:\\.|[^`\\])*)`"#).unwrap()
});

static VAR_DECL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:var|let|const)\s+([A-Za-z_$][A-Za-z0-9_$]*)").unwrap());
static FUNC_DECL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bfunction\s+([A-Za-z_$][A-Za-z0-9_$]*)").unwrap());
static FUNC_PARAMS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bfunction\s*[^(]*\(([^)]*)\)").unwrap());
static ARROW_PARAMS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([^)]*)\)\s*=>").unwrap());
static IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());

static TRUE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\btrue\b").unwrap());
static FALSE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bfalse\b").unwrap());
static UNDEFINED_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bundefined\b").unwrap());
static NULL_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bnull\b").unwrap());
static INFINITY_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bInfinity\b").unwrap());
static NAN_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bNaN\b").unwrap());

static INT_LITERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d+\b").unwrap());

static FUNC_BODY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\bfunction\s*([^(]*)\(([^)]*)\)\s*\{(.*?)\}").unwrap());

static ANY_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static AROUND_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*([+\-*/%=<>!&|^~?:,;{}()\[\]])\s*").unwrap());
static KEYWORD_MERGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(var|let|const|function|return|if|else|for|while|do|switch|case|break|continue|new|typeof|instanceof|in|of|class|extends|import|export|from|as|async|await|yield|throw|try|catch|finally|delete|void)\b([A-Za-z0-9_$])",
    )
    .unwrap()
});

/// The JavaScript grammar.
#[derive(Debug, Default)]
pub struct JavaScript;

impl JavaScript {
    fn boolean_expr(&self, value: bool, options: &ObfuscationOptions, rng: &mut StdRng) -> String {
        if !options.transform_booleans {
            return if value { "true" } else { "false" }.to_string();
        }
        let idioms = if value { TRUE_IDIOMS } else { FALSE_IDIOMS };
        format!("({})", pick_idiom(idioms, rng))
    }

    /// Returns the pool array and accessor names, allocating them on first
    /// use so both exist before any access site is written.
    fn ensure_pool_names(
        &self,
        state: &mut ObfuscatorState,
        rng: &mut StdRng,
    ) -> Result<(String, String)> {
        if state.pool_array_name.is_none() {
            state.pool_array_name = Some(state.allocator.allocate(rng)?);
            state.pool_call_name = Some(state.allocator.allocate(rng)?);
        }
        match (&state.pool_array_name, &state.pool_call_name) {
            (Some(array), Some(call)) => Ok((array.clone(), call.clone())),
            _ => Err(umbra_core::Error::Transform(
                "string pool names not allocated".to_string(),
            )),
        }
    }

    /// Encodes one pool entry per the configured string encoding method.
    fn encode_pool_entry(
        &self,
        entry: &str,
        options: &ObfuscationOptions,
        rng: &mut StdRng,
    ) -> String {
        match options.string_encoding {
            StringEncoding::None => {
                if options.unicode_escape {
                    format!("\"{}\"", to_unicode_escape(&escape_string_content(entry)))
                } else {
                    escape_string(entry)
                }
            }
            StringEncoding::Hex => {
                // A \xNN escape holds one byte; entries with wider code
                // units take \uXXXX spellings instead.
                if entry.encode_utf16().all(|unit| unit <= 0xff) {
                    format!("\"{}\"", to_hex_escape(entry))
                } else {
                    let units: Vec<u16> = entry.encode_utf16().collect();
                    format!("\"{}\"", units_to_unicode_escape(&units))
                }
            }
            // The declared AES method falls back to base64; known gap kept
            // to preserve the output format contract.
            StringEncoding::Base64 | StringEncoding::Aes => {
                use base64::Engine as _;
                let payload = base64::engine::general_purpose::STANDARD.encode(entry.as_bytes());
                format!("decodeURIComponent(escape(atob(\"{payload}\")))")
            }
            StringEncoding::Rc4 => {
                let key: Vec<u8> = (0..8).map(|_| b'a' + rng.random_range(0..26u8)).collect();
                let units: Vec<u16> = entry.encode_utf16().collect();
                let cipher = units_to_unicode_escape(&rc4_apply(&units, &key));
                let key_str: String = key.iter().map(|&b| b as char).collect();
                format!(
                    "(function(s,k){{var r='',i,j=0,S=[],T=[];for(i=0;i<256;i++){{S[i]=i;T[i]=k.charCodeAt(i%k.length)}}for(i=0;i<256;i++){{j=(j+S[i]+T[i])%256;var t=S[i];S[i]=S[j];S[j]=t}}i=j=0;for(var n=0;n<s.length;n++){{i=(i+1)%256;j=(j+S[i])%256;var t=S[i];S[i]=S[j];S[j]=t;r+=String.fromCharCode(s.charCodeAt(n)^S[(S[i]+S[j])%256])}}return r}})(\"{cipher}\",\"{key_str}\")"
                )
            }
            StringEncoding::Xor => {
                let key: u16 = rng.random_range(1..=255);
                let codes: Vec<String> = entry
                    .encode_utf16()
                    .map(|unit| (unit ^ key).to_string())
                    .collect();
                format!(
                    "String.fromCharCode(...[{}].map(c=>c^{key}))",
                    codes.join(",")
                )
            }
        }
    }
}

impl Grammar for JavaScript {
    fn name(&self) -> &'static str {
        "javascript"
    }

    fn reserved_words(&self) -> &'static [&'static str] {
        RESERVED
    }

    fn ident_charset(&self) -> IdentCharset {
        CHARSET
    }

    fn effective_style(&self, requested: IdentifierStyle) -> IdentifierStyle {
        // JavaScript tolerates every style this engine generates.
        requested
    }

    fn strip_comments(&self, src: &str) -> String {
        let src = LINE_COMMENT.replace_all(src, "");
        BLOCK_COMMENT.replace_all(&src, "").into_owned()
    }

    fn declarations(&self, src: &str, options: &ObfuscationOptions) -> Vec<String> {
        let mut found = Vec::new();

        if options.rename_variables {
            for caps in VAR_DECL.captures_iter(src) {
                found.push(caps[1].to_string());
            }
        }

        if options.rename_functions {
            for caps in FUNC_DECL.captures_iter(src) {
                found.push(caps[1].to_string());
            }
        }

        // Parameters of classic and arrow functions. Only simple names are
        // taken; destructured or rest parameters pass through untouched.
        if options.rename_variables {
            for pattern in [&*FUNC_PARAMS, &*ARROW_PARAMS] {
                for caps in pattern.captures_iter(src) {
                    for param in caps[1].split(',') {
                        let name = param.split('=').next().unwrap_or("").trim();
                        if IDENT.is_match(name) {
                            found.push(name.to_string());
                        }
                    }
                }
            }
        }

        found
    }

    fn process_strings(
        &self,
        src: &str,
        state: &mut ObfuscatorState,
        options: &ObfuscationOptions,
        rng: &mut StdRng,
    ) -> Result<String> {
        let (_array, call) = self.ensure_pool_names(state, rng)?;
        let threshold = options.string_threshold_pct();

        replace_all_fallible(&STRING_LITERAL, src, |caps: &Captures| {
            let lit = &caps[0];
            let Some(quote) = lit.chars().next() else {
                return Ok(None);
            };
            let body = &lit[1..lit.len() - 1];

            // Skip empty and very short strings.
            if body.chars().count() < 2 {
                return Ok(None);
            }
            // Skip template literals with interpolation expressions.
            if quote == '`' && body.contains("${") {
                return Ok(None);
            }
            // Per-occurrence inclusion draw against the threshold.
            if rng.random_range(0.0..100.0) > threshold {
                return Ok(None);
            }

            let value = unescape_source(body);
            let index = state.pool.intern(&value);
            Ok(Some(format!("{call}({})", StringPool::placeholder(index))))
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
                .replace_all(&out, |_: &Captures| {
                    format!("({})", pick_idiom(TRUE_IDIOMS, rng))
                })
                .into_owned();
            out = FALSE_WORD
                .replace_all(&out, |_: &Captures| {
                    format!("({})", pick_idiom(FALSE_IDIOMS, rng))
                })
                .into_owned();
        }
        if options.transform_undefined {
            out = UNDEFINED_WORD
                .replace_all(&out, |_: &Captures| {
                    format!("({})", pick_idiom(UNDEFINED_IDIOMS, rng))
                })
                .into_owned();
        }
        if options.transform_null {
            out = NULL_WORD
                .replace_all(&out, |_: &Captures| pick_idiom(NULL_IDIOMS, rng).to_string())
                .into_owned();
        }
        if options.transform_infinity {
            out = INFINITY_WORD
                .replace_all(&out, |_: &Captures| {
                    format!("({})", pick_idiom(INFINITY_IDIOMS, rng))
                })
                .into_owned();
        }
        if options.transform_nan {
            out = NAN_WORD
                .replace_all(&out, |_: &Captures| {
                    format!("({})", pick_idiom(NAN_IDIOMS, rng))
                })
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

    fn compact(&self, src: &str) -> String {
        let out = ANY_WS.replace_all(src, " ");
        let out = AROUND_PUNCT.replace_all(&out, "${1}");
        let out = KEYWORD_MERGE.replace_all(&out, "${1} ${2}");
        out.replace(";}", "}").trim().to_string()
    }

    fn flattener(&self) -> Option<&dyn ControlFlowFlattening> {
        Some(self)
    }

    fn dead_code(&self) -> Option<&dyn DeadCodeInjection> {
        Some(self)
    }

    fn guards(&self) -> Option<&dyn ProtectiveGuards> {
        Some(self)
    }

    fn pool_renderer(&self) -> Option<&dyn PoolRendering> {
        Some(self)
    }
}

/// Rewrites integer literals into equivalent expressions, shared by every
/// grammar that enables numeric transforms.
pub(crate) fn transform_int_literals(
    src: &str,
    opts: &NumericOptions,
    syntax: &'static NumberSyntax,
    rng: &mut StdRng,
) -> Result<String> {
    replace_all_fallible(&INT_LITERAL, src, |caps: &Captures| {
        let m = caps.get(0).expect("whole match");

        let before = src[..m.start()].chars().next_back();
        let after = src[m.end()..].chars().next();

        // Digits inside a pool placeholder are an index, not a literal.
        if before == Some(REF_OPEN) || after == Some(REF_CLOSE) {
            return Ok(None);
        }
        // Leave the integer parts of float literals alone.
        if before == Some('.') || after == Some('.') {
            return Ok(None);
        }

        let value: u64 = match m.as_str().parse() {
            Ok(v) => v,
            Err(_) => return Ok(None),
        };
        // Skip large numbers, as the original tool does.
        if value > 10_000 {
            return Ok(None);
        }

        encode_number(value, opts, syntax, rng).map(Some)
    })
}

impl ControlFlowFlattening for JavaScript {
    /// Rewrites qualifying function bodies into a state-variable loop with
    /// one dispatch arm per original statement. Lexical and best-effort:
    /// the body match stops at the first closing brace.
    fn flatten(
        &self,
        src: &str,
        state: &mut ObfuscatorState,
        options: &ObfuscationOptions,
        rng: &mut StdRng,
    ) -> Result<String> {
        let threshold = options.flattening_threshold_pct();

        replace_all_fallible(&FUNC_BODY, src, |caps: &Captures| {
            // Applied probabilistically per function.
            if rng.random_range(0.0..100.0) > threshold {
                return Ok(None);
            }

            let body = &caps[3];
            if body.len() < 50 {
                return Ok(None);
            }

            let statements: Vec<&str> = body
                .split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            if statements.len() < 3 {
                return Ok(None);
            }

            let state_var = state.allocator.allocate(rng)?;
            let count = statements.len();

            let mut cases = String::new();
            for (i, stmt) in statements.iter().enumerate() {
                cases.push_str(&format!(
                    "case {i}:{stmt};{state_var}={next};break;",
                    next = i + 1
                ));
            }

            let flattened = format!(
                "var {state_var}=0;while({state_var}<{count}){{switch({state_var}){{{cases}default:{state_var}={count};}}}}"
            );

            Ok(Some(format!(
                "function {}({}){{{flattened}}}",
                &caps[1], &caps[2]
            )))
        })
    }
}

impl DeadCodeInjection for JavaScript {
    /// Inserts `floor(line_count * amount%)` no-op statements at random line
    /// positions. The snippet set is built once per call; snippets repeat.
    fn inject(
        &self,
        src: &str,
        state: &mut ObfuscatorState,
        options: &ObfuscationOptions,
        rng: &mut StdRng,
    ) -> Result<String> {
        let amount = options.dead_code_amount_pct() / 100.0;
        let opts = NumericOptions::from_options(options);
        let num =
            |n: u64, rng: &mut StdRng| encode_number(n, &opts, &NUMBER_SYNTAX, rng);

        let junk_value = rng.random_range(0..=1000u64);
        let junk_name = state.allocator.allocate(rng)?;
        let snippets = [
            format!(
                "if({}){{console.log({});}}",
                self.boolean_expr(false, options, rng),
                num(junk_value, rng)?
            ),
            format!(
                "var {junk_name}={}?{}:{};",
                self.boolean_expr(false, options, rng),
                num(1, rng)?,
                num(0, rng)?
            ),
            format!(
                "(function(){{return {};}})();",
                self.boolean_expr(false, options, rng)
            ),
            format!("void({});", num(0, rng)?),
            format!(
                "{}||{};",
                self.boolean_expr(true, options, rng),
                num(0, rng)?
            ),
        ];

        let mut lines: Vec<String> = src.split('\n').map(str::to_string).collect();
        let insert_count = (lines.len() as f64 * amount).floor() as usize;

        for _ in 0..insert_count {
            let pos = rng.random_range(0..lines.len());
            let snippet = snippets[rng.random_range(0..snippets.len())].clone();
            lines.insert(pos, snippet);
        }

        Ok(lines.join("\n"))
    }
}

impl ProtectiveGuards for JavaScript {
    fn apply(
        &self,
        src: &str,
        state: &mut ObfuscatorState,
        options: &ObfuscationOptions,
        rng: &mut StdRng,
    ) -> Result<String> {
        let opts = NumericOptions::from_options(options);
        let mut out = src.to_string();

        // Self-defense: the guard inspects its own stringified form for
        // tamper signatures (reformatting, injected increments).
        if options.self_defending {
            let f = state.allocator.allocate(rng)?;
            let probe_fn = state.allocator.allocate(rng)?;
            let probe_cnt = state.allocator.allocate(rng)?;
            let verdict = state.allocator.allocate(rng)?;
            let guard = format!(
                "\n(function(){{\n    var {f}=function(){{\n        var {probe_fn}=new RegExp('function\\\\s*\\\\(\\\\s*\\\\)');\n        var {probe_cnt}=new RegExp('\\\\+\\\\+\\\\s*\\\\w+|\\\\w+\\\\s*\\\\+\\\\+','i');\n        var {verdict}='init';\n        if({probe_fn}.test({f}.toString())||{probe_cnt}.test({f}.toString())){{\n            {verdict}='chain';\n        }}else{{\n            {verdict}='debu';\n        }}\n        return {verdict};\n    }};\n    {f}();\n}})();\n"
            );
            out = format!("{guard}{out}");
        }

        // Anti-debug: periodically attempt a debugger break.
        if options.anti_debug {
            let f = state.allocator.allocate(rng)?;
            let err = state.allocator.allocate(rng)?;
            let interval = rng.random_range(500..=2000u64);
            let interval_expr = encode_number(interval, &opts, &NUMBER_SYNTAX, rng)?;
            let guard = format!(
                "\n(function(){{\n    var {f}=function(){{\n        try{{\n            (function(){{}}['constructor']('debugger')());\n        }}catch({err}){{}}\n    }};\n    setInterval({f},{interval_expr});\n}})();\n"
            );
            out = format!("{guard}{out}");
        }

        // Console disable: replace console methods with no-ops.
        if options.disable_console {
            let methods = state.allocator.allocate(rng)?;
            let idx = state.allocator.allocate(rng)?;
            let zero = encode_number(0, &opts, &NUMBER_SYNTAX, rng)?;
            let guard = format!(
                "\n(function(){{\n    var {methods}=['log','warn','info','error','debug','table','trace'];\n    for(var {idx}={zero};{idx}<{methods}.length;{idx}++){{\n        console[{methods}[{idx}]]=function(){{}};\n    }}\n}})();\n"
            );
            out = format!("{guard}{out}");
        }

        Ok(out)
    }
}

impl PoolRendering for JavaScript {
    fn render(
        &self,
        layout: &PoolLayout,
        state: &mut ObfuscatorState,
        options: &ObfuscationOptions,
        rng: &mut StdRng,
    ) -> Result<(String, String)> {
        let (array, call) = self.ensure_pool_names(state, rng)?;

        let encoded: Vec<String> = layout
            .storage
            .iter()
            .map(|entry| self.encode_pool_entry(entry, options, rng))
            .collect();
        let declaration = format!("var {array}=[{}];", encoded.join(","));

        let param = if options.wrap_string_calls {
            state.allocator.allocate(rng)?
        } else {
            "i".to_string()
        };

        let len = layout.storage.len();
        let accessor = if layout.rotation > 0 {
            // Storage was rotated left; the accessor compensates.
            let offset = len - layout.rotation;
            format!(
                "var {call}=function({param}){{return {array}[({param}+{offset})%{len}]}};"
            )
        } else {
            format!("var {call}=function({param}){{return {array}[{param}]}};")
        };

        Ok((declaration, accessor))
    }
}
