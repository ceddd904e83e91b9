//! Intermediate Representation (IR), lowering and optimization
//!
//! This module handles the transformation from AST to quadruples.

pub mod ir;
pub mod ir_gen;
pub mod optimizer;

pub use ir::*;
pub use ir_gen::{lower, IrGenerator, LoweringError};
pub use optimizer::{optimize, OptimizedResult, Optimizer, OptimizerConfig};

#[cfg(test)]
mod tests;
