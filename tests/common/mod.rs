//! Shared helpers for depscan integration tests

pub mod fixtures;
pub mod mocks;
