//! Adapters for external systems: completion backends and the code sandbox.

pub mod sandbox;
pub mod substrates;
