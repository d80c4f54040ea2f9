//! Domain layer for the SwiftSage reasoning loop
//!
//! This module contains the core data model and the ports the loop
//! depends on.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{SolveError, SolveResult};
