//! Quadruple optimizer
//!
//! Two rewrites, run in this order and once each:
//!
//! - **A. constant folding**: an arithmetic quadruple whose operands are both
//!   numeric literals becomes `(assign, value, -, result)`.
//! - **B. self-assignment removal**: `(assign, X, -, X)` is dropped.
//!
//! Each pass runs once. With only these two rewrites a second run finds
//! nothing new: a fold produces `(assign, literal, -, dst)`, which is neither
//! foldable nor a self-assignment. [`OptimizerConfig::fixed_point`] repeats
//! the passes until the sequence stops changing; under the current pass set
//! it always stops after one round and gives the same result as the default.

use crate::middle::ir::{ConstValue, OpCode, Operand, Quadruple, QuadrupleSequence};
use crate::runtime::value::RuntimeValue;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// 优化器配置
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Re-run the passes until the sequence stops changing
    #[serde(default)]
    pub fixed_point: bool,
}

/// Optimized sequence plus how much shorter it got
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizedResult {
    pub sequence: QuadrupleSequence,
    /// `100 * (original - final) / original`, two decimals, `0` for empty input
    pub reduction_percent: f64,
}

/// Optimize with the default single-pass configuration.
pub fn optimize(quads: &[Quadruple]) -> OptimizedResult {
    Optimizer::default().optimize(quads)
}

#[derive(Debug, Default, Clone)]
pub struct Optimizer {
    config: OptimizerConfig,
}

impl Optimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    pub fn optimize(
        &self,
        quads: &[Quadruple],
    ) -> OptimizedResult {
        let mut sequence = self.run_passes(quads);
        if self.config.fixed_point {
            let mut rounds = 1;
            loop {
                let next = self.run_passes(&sequence);
                if next == sequence {
                    break;
                }
                sequence = next;
                rounds += 1;
            }
            debug!(rounds, "optimizer reached fixed point");
        }

        let reduction_percent = reduction_percent(quads.len(), sequence.len());
        debug!(
            original = quads.len(),
            optimized = sequence.len(),
            reduction_percent,
            "optimization finished"
        );
        OptimizedResult {
            sequence,
            reduction_percent,
        }
    }

    fn run_passes(
        &self,
        quads: &[Quadruple],
    ) -> QuadrupleSequence {
        let folded = fold_constants(quads);
        remove_self_assignments(folded)
    }
}

/// Pass A: constant folding
pub fn fold_constants(quads: &[Quadruple]) -> QuadrupleSequence {
    let mut folded_count = 0usize;
    let out: QuadrupleSequence = quads
        .iter()
        .map(|quad| match fold_quad(quad) {
            Some(folded) => {
                trace!("fold {} => {}", quad, folded);
                folded_count += 1;
                folded
            }
            None => quad.clone(),
        })
        .collect();
    debug!(folded = folded_count, "constant folding pass");
    out
}

fn fold_quad(quad: &Quadruple) -> Option<Quadruple> {
    if !quad.op.is_arithmetic() {
        return None;
    }
    let lhs = numeric_literal(quad.arg1.as_ref())?;
    let rhs = numeric_literal(quad.arg2.as_ref())?;
    let dst = quad.result.clone()?;

    let value = if quad.op == OpCode::Div && rhs.is_zero() {
        // Pass-time safety valve, not a language rule: x / 0 folds to 0.
        RuntimeValue::Int(0)
    } else {
        // Overflow leaves the quadruple for the VM to deal with.
        lhs.arithmetic(quad.op, rhs)?
    };
    Some(Quadruple::assign(
        Operand::Const(ConstValue::from(value)),
        dst,
    ))
}

fn numeric_literal(operand: Option<&Operand>) -> Option<RuntimeValue> {
    match operand?.as_const()? {
        c if c.is_numeric() => Some(c.into()),
        _ => None,
    }
}

/// Pass B: drop `(assign, X, -, X)`, keeping everything else in order
pub fn remove_self_assignments(quads: QuadrupleSequence) -> QuadrupleSequence {
    let before = quads.len();
    let out: QuadrupleSequence = quads
        .into_iter()
        .filter(|quad| !quad.is_self_assignment())
        .collect();
    debug!(removed = before - out.len(), "self-assignment pass");
    out
}

fn reduction_percent(
    original: usize,
    optimized: usize,
) -> f64 {
    if original == 0 {
        return 0.0;
    }
    let raw = 100.0 * (original as f64 - optimized as f64) / original as f64;
    (raw * 100.0).round() / 100.0
}
