//! Code sandbox implementations.

pub mod python;

pub use python::PythonSandbox;
