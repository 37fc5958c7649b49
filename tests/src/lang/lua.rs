use rand::rngs::StdRng;
use rand::SeedableRng;
use umbra_core::options::ObfuscationOptions;
use umbra_core::ObfuscatorState;
use umbra_lang::{Grammar, Lua};

fn state_for(grammar: &Lua, options: &ObfuscationOptions) -> ObfuscatorState {
    ObfuscatorState::new(
        options,
        grammar.effective_style(options.identifier_generator),
        grammar.ident_charset(),
        grammar.reserved_words(),
    )
}

#[test]
fn test_strings_become_char_calls() {
    let lua = Lua;
    let options = ObfuscationOptions {
        string_threshold: 100.0,
        ..Default::default()
    };
    let mut state = state_for(&lua, &options);
    let mut rng = StdRng::seed_from_u64(1);

    let out = lua
        .process_strings(r#"print("hi")"#, &mut state, &options, &mut rng)
        .unwrap();
    assert_eq!(out, "print(string.char(104,105))");
}

#[test]
fn test_char_calls_use_utf8_bytes() {
    let lua = Lua;
    let options = ObfuscationOptions {
        string_threshold: 100.0,
        ..Default::default()
    };
    let mut state = state_for(&lua, &options);
    let mut rng = StdRng::seed_from_u64(2);

    let out = lua
        .process_strings(r#"print("é!")"#, &mut state, &options, &mut rng)
        .unwrap();
    // Two UTF-8 bytes for the accented character, one for '!'.
    assert_eq!(out, "print(string.char(195,169,33))");
}

#[test]
fn test_nil_sentinel_rewrite() {
    let lua = Lua;
    let options = ObfuscationOptions {
        transform_null: true,
        ..Default::default()
    };
    let mut rng = StdRng::seed_from_u64(3);

    let out = lua.transform_sentinels("local x = nil", &options, &mut rng);
    assert_eq!(out, "local x = (({})[1])");
}

#[test]
fn test_boolean_sentinel_rewrite() {
    let lua = Lua;
    let options = ObfuscationOptions::default();
    let mut rng = StdRng::seed_from_u64(4);

    let out = lua.transform_sentinels("local ok = true or false", &options, &mut rng);
    assert_eq!(out, "local ok = (1==1) or (1==0)");
}

#[test]
fn test_declarations_skip_dotted_functions() {
    let lua = Lua;
    let options = ObfuscationOptions::default();

    let src = "local count = 0\nfunction tick() end\nfunction M.update() end\n";
    let found = lua.declarations(src, &options);
    assert!(found.contains(&"count".to_string()));
    assert!(found.contains(&"tick".to_string()));
    assert!(!found.contains(&"update".to_string()));
    assert!(!found.contains(&"M".to_string()));
}
