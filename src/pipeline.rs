//! 编译流水线
//!
//! Runs lowering, optimization and execution in order and stops at the
//! first phase that fails; later phases are never attempted.

use crate::frontend::ast::Node;
use crate::middle::ir::QuadrupleSequence;
use crate::middle::ir_gen::{lower, LoweringError};
use crate::middle::optimizer::{OptimizedResult, Optimizer};
use crate::util::config::Config;
use crate::vm::{ExecutionResult, VMError, VM};
use serde::Serialize;
use std::fmt;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

/// 流水线阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Reading the AST JSON
    Parse,
    /// AST -> quadruples
    Intermediate,
    /// Quadruple rewriting
    Optimization,
    /// VM run
    Execution,
}

impl fmt::Display for Phase {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Phase::Parse => write!(f, "parse"),
            Phase::Intermediate => write!(f, "intermediate"),
            Phase::Optimization => write!(f, "optimization"),
            Phase::Execution => write!(f, "execution"),
        }
    }
}

/// 管道错误类型
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid AST input: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("intermediate code generation failed: {0}")]
    Lowering(#[from] LoweringError),

    #[error("execution failed: {0}")]
    Execution(#[from] VMError),
}

impl PipelineError {
    /// The phase that failed
    pub fn phase(&self) -> Phase {
        match self {
            PipelineError::Parse(_) => Phase::Parse,
            PipelineError::Lowering(_) => Phase::Intermediate,
            PipelineError::Execution(_) => Phase::Execution,
        }
    }
}

/// Compilation metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub quadruples_original: usize,
    pub quadruples_optimized: usize,
    pub code_reduction: f64,
    pub elapsed_ms: f64,
}

/// Artifacts of every phase of one compilation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompileReport {
    /// Lowered IR, before optimization
    pub quadruples: QuadrupleSequence,
    /// Optimizer output (identity when optimization is disabled)
    pub optimization: OptimizedResult,
    pub execution: ExecutionResult,
    pub metrics: Metrics,
}

/// Lower and optimize, without running.
pub fn build(
    ast: &Node,
    config: &Config,
) -> Result<(QuadrupleSequence, OptimizedResult), PipelineError> {
    let quadruples = lower(ast)?;
    debug!(quadruples = quadruples.len(), "phase {} done", Phase::Intermediate);

    let optimization = if config.pipeline.optimize {
        Optimizer::new(config.optimizer).optimize(&quadruples)
    } else {
        OptimizedResult {
            sequence: quadruples.clone(),
            reduction_percent: 0.0,
        }
    };
    debug!(
        quadruples = optimization.sequence.len(),
        "phase {} done",
        Phase::Optimization
    );
    Ok((quadruples, optimization))
}

/// Run the whole pipeline on an AST.
pub fn compile(
    ast: &Node,
    config: &Config,
) -> Result<CompileReport, PipelineError> {
    let start = Instant::now();

    let (quadruples, optimization) = build(ast, config)?;

    let mut vm = VM::new_with_config(config.vm.clone());
    let execution = vm.execute(&optimization.sequence)?;
    debug!(steps = execution.steps, "phase {} done", Phase::Execution);

    let metrics = Metrics {
        quadruples_original: quadruples.len(),
        quadruples_optimized: optimization.sequence.len(),
        code_reduction: optimization.reduction_percent,
        elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
    };
    info!(
        original = metrics.quadruples_original,
        optimized = metrics.quadruples_optimized,
        "compilation finished"
    );

    Ok(CompileReport {
        quadruples,
        optimization,
        execution,
        metrics,
    })
}

/// Parse the parser's JSON output, then [`compile`].
pub fn compile_json(
    text: &str,
    config: &Config,
) -> Result<CompileReport, PipelineError> {
    let ast = Node::from_json(text)?;
    compile(&ast, config)
}
