//! Module for the `languages` subcommand.

use clap::Args;
use std::error::Error;
use umbra_core::options::IdentifierStyle;
use umbra_lang::Language;

const ALL_STYLES: &[IdentifierStyle] = &[
    IdentifierStyle::Alphanumeric,
    IdentifierStyle::Hexadecimal,
    IdentifierStyle::Mangled,
    IdentifierStyle::Dictionary,
    IdentifierStyle::RandomUnicode,
    IdentifierStyle::Zalgo,
    IdentifierStyle::Invisible,
    IdentifierStyle::Confusables,
    IdentifierStyle::Greek,
    IdentifierStyle::Emoji,
];

/// Arguments for the `languages` subcommand.
#[derive(Args)]
pub struct LanguagesArgs {}

impl super::Command for LanguagesArgs {
    fn execute(self) -> Result<(), Box<dyn Error>> {
        for language in [Language::JavaScript, Language::Python, Language::Lua] {
            let grammar = language.grammar();
            let supported: Vec<String> = ALL_STYLES
                .iter()
                .filter(|&&style| grammar.effective_style(style) == style)
                .map(|style| format!("{style:?}").to_lowercase())
                .collect();
            println!("{}: styles [{}]", grammar.name(), supported.join(", "));
        }
        Ok(())
    }
}
