//! CLI command implementations.

pub mod config;
pub mod exec;
pub mod solve;
