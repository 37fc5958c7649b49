//! Library surface of the umbra CLI, exposing the subcommand implementations.

pub mod commands;
