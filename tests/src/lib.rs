//! Integration test suite for the umbra workspace.

pub mod support;
