use umbra_core::options::{IdentifierStyle, ObfuscationOptions, StringEncoding};

#[test]
fn test_empty_map_is_all_defaults() {
    let opts: ObfuscationOptions = serde_json::from_str("{}").unwrap();
    assert!(opts.rename_variables);
    assert!(opts.rename_functions);
    assert_eq!(opts.identifier_generator, IdentifierStyle::Hexadecimal);
    assert_eq!(opts.name_length, 6);
    assert!(opts.string_array);
    assert_eq!(opts.string_threshold, 75.0);
    assert_eq!(opts.string_encoding, StringEncoding::Base64);
    assert!(opts.transform_booleans);
    assert!(!opts.numbers_to_expressions);
    assert!(!opts.control_flow_flattening);
    assert!(opts.compact);
}

#[test]
fn test_camel_case_keys_map_to_fields() {
    let opts: ObfuscationOptions = serde_json::from_str(
        r#"{
            "identifierGenerator": "randomUnicode",
            "stringEncoding": "rc4",
            "numbersToExpressions": true,
            "deadCodeAmount": 35.0
        }"#,
    )
    .unwrap();
    assert_eq!(opts.identifier_generator, IdentifierStyle::RandomUnicode);
    assert_eq!(opts.string_encoding, StringEncoding::Rc4);
    assert!(opts.numbers_to_expressions);
    assert_eq!(opts.dead_code_amount, 35.0);
}

#[test]
fn test_unknown_keys_are_ignored() {
    let opts: ObfuscationOptions =
        serde_json::from_str(r#"{"futureOption": true, "renameVariables": false}"#).unwrap();
    assert!(!opts.rename_variables);
}

#[test]
fn test_percentages_clamp_where_consumed() {
    let opts = ObfuscationOptions {
        string_threshold: 150.0,
        flattening_threshold: -10.0,
        dead_code_amount: 300.0,
        ..Default::default()
    };
    assert_eq!(opts.string_threshold_pct(), 100.0);
    assert_eq!(opts.flattening_threshold_pct(), 0.0);
    assert_eq!(opts.dead_code_amount_pct(), 100.0);
}

#[test]
fn test_reserved_name_list_parses_comma_separated() {
    let opts = ObfuscationOptions {
        reserved_names: "jQuery, $, , handler".to_string(),
        ..Default::default()
    };
    assert_eq!(opts.reserved_name_list(), vec!["jQuery", "$", "handler"]);
}
