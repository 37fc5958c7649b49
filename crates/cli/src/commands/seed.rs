//! Module for the `seed` subcommand.

use clap::Args;
use std::error::Error;
use umbra_core::seed::Seed;

/// Arguments for the `seed` subcommand.
#[derive(Args)]
pub struct SeedArgs {}

impl super::Command for SeedArgs {
    fn execute(self) -> Result<(), Box<dyn Error>> {
        println!("{}", Seed::generate().to_hex());
        Ok(())
    }
}
