//! Core runtime types
//!
//! This module provides the value type shared by the VM and the
//! optimizer's compile-time evaluation.

pub mod runtime_value;
pub use runtime_value::*;

#[cfg(test)]
mod tests;
