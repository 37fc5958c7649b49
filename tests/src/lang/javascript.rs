use crate::support::{eval_int, init_tracing};
use rand::rngs::StdRng;
use rand::SeedableRng;
use umbra_core::options::ObfuscationOptions;
use umbra_core::pool::StringPool;
use umbra_core::ObfuscatorState;
use umbra_lang::{Grammar, JavaScript};

fn state_for(grammar: &JavaScript, options: &ObfuscationOptions) -> ObfuscatorState {
    ObfuscatorState::new(
        options,
        grammar.effective_style(options.identifier_generator),
        grammar.ident_charset(),
        grammar.reserved_words(),
    )
}

#[test]
fn test_string_pooling_dedupes_repeated_literals() {
    init_tracing();
    let js = JavaScript;
    let options = ObfuscationOptions {
        string_threshold: 100.0,
        ..Default::default()
    };
    let mut state = state_for(&js, &options);
    let mut rng = StdRng::seed_from_u64(1);

    let src = r#"greet("hello"); send("hello"); other("bye!");"#;
    let out = js.process_strings(src, &mut state, &options, &mut rng).unwrap();

    assert_eq!(state.pool.len(), 2, "identical contents intern once");
    assert!(!out.contains("\"hello\""));
    // Both occurrences reference the same logical index.
    assert_eq!(out.matches(&StringPool::placeholder(0)).count(), 2);
    assert_eq!(out.matches(&StringPool::placeholder(1)).count(), 1);
}

#[test]
fn test_template_interpolation_is_skipped() {
    let js = JavaScript;
    let options = ObfuscationOptions {
        string_threshold: 100.0,
        ..Default::default()
    };
    let mut state = state_for(&js, &options);
    let mut rng = StdRng::seed_from_u64(2);

    let src = "var msg = `count: ${n}`; var plain = `static`;";
    let out = js.process_strings(src, &mut state, &options, &mut rng).unwrap();

    assert!(out.contains("`count: ${n}`"), "interpolated template kept");
    assert!(!out.contains("`static`"), "plain template pooled");
}

#[test]
fn test_short_strings_are_never_pooled() {
    let js = JavaScript;
    let options = ObfuscationOptions {
        string_threshold: 100.0,
        ..Default::default()
    };
    let mut state = state_for(&js, &options);
    let mut rng = StdRng::seed_from_u64(3);

    let out = js
        .process_strings(r#"x("a"); y("");"#, &mut state, &options, &mut rng)
        .unwrap();
    assert_eq!(out, r#"x("a"); y("");"#);
    assert!(state.pool.is_empty());
}

#[test]
fn test_escaped_literal_pools_runtime_value() {
    let js = JavaScript;
    let options = ObfuscationOptions {
        string_threshold: 100.0,
        ..Default::default()
    };
    let mut state = state_for(&js, &options);
    let mut rng = StdRng::seed_from_u64(4);

    js.process_strings(r#"log("line\nbreak");"#, &mut state, &options, &mut rng)
        .unwrap();
    // The pooled entry holds the decoded value, not the source spelling.
    assert_eq!(state.pool.len(), 1);
    assert_eq!(state.pool.intern("line\nbreak"), 0);
}

#[test]
fn test_renaming_is_injective() {
    let js = JavaScript;
    let options = ObfuscationOptions::default();
    let mut state = state_for(&js, &options);
    let mut rng = StdRng::seed_from_u64(12);

    let declared = vec!["alpha".to_string(), "beta".to_string(), "gamma".to_string()];
    let out =
        umbra_lang::grammar::apply_renames("alpha + beta + gamma", declared, &mut state, &mut rng)
            .unwrap();

    let distinct: std::collections::HashSet<_> = state.rename_map.values().collect();
    assert_eq!(distinct.len(), 3, "distinct names map to distinct names");
    for original in ["alpha", "beta", "gamma"] {
        assert!(!out.contains(original), "{original} still present: {out}");
    }
}

#[test]
fn test_sentinel_idioms_replace_keywords() {
    let js = JavaScript;
    let options = ObfuscationOptions {
        transform_undefined: true,
        transform_nan: true,
        ..Default::default()
    };
    let mut rng = StdRng::seed_from_u64(5);

    let src = "var a = true; var b = false; var c = undefined;";
    let out = js.transform_sentinels(src, &options, &mut rng);

    assert!(!out.contains("true"));
    assert!(!out.contains("false"));
    assert!(!out.contains("undefined"));
}

#[test]
fn test_number_rewrite_round_trips() {
    let js = JavaScript;
    let options = ObfuscationOptions {
        numbers_to_expressions: true,
        numbers_to_hex: true,
        numbers_to_bitwise: true,
        number_complexity: 2,
        ..Default::default()
    };
    let mut rng = StdRng::seed_from_u64(6);

    let out = js.transform_numbers("42", &options, &mut rng).unwrap();
    assert_ne!(out, "42");
    assert_eq!(eval_int(&out), 42);
}

#[test]
fn test_number_rewrite_skips_floats_and_large_values() {
    let js = JavaScript;
    let options = ObfuscationOptions {
        numbers_to_expressions: true,
        ..Default::default()
    };
    let mut rng = StdRng::seed_from_u64(7);

    assert_eq!(
        js.transform_numbers("var pi = 3.14;", &options, &mut rng).unwrap(),
        "var pi = 3.14;"
    );
    assert_eq!(
        js.transform_numbers("var big = 123456;", &options, &mut rng).unwrap(),
        "var big = 123456;"
    );
}

#[test]
fn test_flattening_produces_dispatch_loop() {
    init_tracing();
    let js = JavaScript;
    let options = ObfuscationOptions {
        control_flow_flattening: true,
        flattening_threshold: 100.0,
        ..Default::default()
    };
    let mut state = state_for(&js, &options);
    let mut rng = StdRng::seed_from_u64(8);

    let src = "function go(a){var one=1;var two=2;var three=3;return one+two+three;}";
    let out = js
        .flattener()
        .unwrap()
        .flatten(src, &mut state, &options, &mut rng)
        .unwrap();

    assert!(out.contains("while("), "missing dispatch loop: {out}");
    assert!(out.contains("switch("), "missing switch: {out}");
    assert!(out.contains("case 0:"), "missing first case: {out}");
    assert!(out.contains("function go(a)"), "signature must survive: {out}");
}

#[test]
fn test_small_functions_are_not_flattened() {
    let js = JavaScript;
    let options = ObfuscationOptions {
        control_flow_flattening: true,
        flattening_threshold: 100.0,
        ..Default::default()
    };
    let mut state = state_for(&js, &options);
    let mut rng = StdRng::seed_from_u64(9);

    let src = "function id(x){return x;}";
    let out = js
        .flattener()
        .unwrap()
        .flatten(src, &mut state, &options, &mut rng)
        .unwrap();
    assert_eq!(out, src);
}

#[test]
fn test_dead_code_amount_controls_inserted_lines() {
    let js = JavaScript;
    let mut rng = StdRng::seed_from_u64(10);
    let src = "a();\nb();\nc();\nd();";

    let none = ObfuscationOptions {
        dead_code_injection: true,
        dead_code_amount: 0.0,
        ..Default::default()
    };
    let mut state = state_for(&js, &none);
    let out = js
        .dead_code()
        .unwrap()
        .inject(src, &mut state, &none, &mut rng)
        .unwrap();
    assert_eq!(out.lines().count(), 4);

    let full = ObfuscationOptions {
        dead_code_injection: true,
        dead_code_amount: 100.0,
        ..Default::default()
    };
    let mut state = state_for(&js, &full);
    let out = js
        .dead_code()
        .unwrap()
        .inject(src, &mut state, &full, &mut rng)
        .unwrap();
    assert_eq!(out.lines().count(), 8, "one insertion per original line");
}

#[test]
fn test_guards_are_prepended() {
    let js = JavaScript;
    let options = ObfuscationOptions {
        self_defending: true,
        anti_debug: true,
        disable_console: true,
        ..Default::default()
    };
    let mut state = state_for(&js, &options);
    let mut rng = StdRng::seed_from_u64(11);

    let src = "run();";
    let out = js
        .guards()
        .unwrap()
        .apply(src, &mut state, &options, &mut rng)
        .unwrap();

    assert!(out.contains("debugger"), "anti-debug guard missing");
    assert!(out.contains("setInterval"), "anti-debug timer missing");
    assert!(out.contains("console["), "console guard missing");
    assert!(out.contains("toString()"), "self-defense probe missing");
    assert!(out.ends_with("run();"), "payload must come last");
}
