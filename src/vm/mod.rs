//! Virtual Machine
//!
//! This module contains the quadruple interpreter.

pub use errors::{VMError, VMResult};
pub use executor::{execute, ExecutionResult, HaltReason, VMConfig, VMStatus, VM};

mod errors;
mod executor;

#[cfg(test)]
mod tests;
