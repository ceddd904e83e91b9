//! Virtual Machine executor
//!
//! 两遍执行：第一遍建立标签到位置的索引，第二遍从 pc = 0 顺序执行，
//! 跳转落在标签之后的那一条四元式上。
//!
//! Values are dynamically typed and every temporary or variable that has
//! not been written yet reads as `0`. Arithmetic faults store `0` instead of
//! stopping the program. A jump to a label that was never defined, or
//! running past the optional step ceiling, halts the machine and keeps the
//! output printed so far. Only a quadruple whose fields do not fit its
//! opcode is reported as an error.

use crate::middle::ir::{Label, OpCode, Operand, Quadruple, Temp};
use crate::runtime::value::RuntimeValue;
use crate::vm::errors::{VMError, VMResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

/// VM 配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VMConfig {
    /// Maximum number of quadruples to execute; `None` runs unbounded
    #[serde(default)]
    pub max_steps: Option<u64>,
    /// Log every executed quadruple
    #[serde(default)]
    pub trace_execution: bool,
}

/// Why execution stopped early
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HaltReason {
    /// A `goto` / `jfalse` named a label with no `label` quadruple
    UndefinedLabel(Label),
    /// The configured step ceiling was reached
    StepLimitExceeded(u64),
}

impl fmt::Display for HaltReason {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            HaltReason::UndefinedLabel(label) => write!(f, "undefined label {}", label),
            HaltReason::StepLimitExceeded(limit) => write!(f, "step limit of {} exceeded", limit),
        }
    }
}

/// VM 状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VMStatus {
    #[default]
    Ready,
    Running,
    Finished,
    Halted(HaltReason),
}

/// Outcome of one `execute` call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    /// Everything printed, one line per `print`
    pub output: String,
    /// `Finished`, or `Halted` with the reason
    pub status: VMStatus,
    /// Number of quadruples executed
    pub steps: u64,
    /// Final user variables, in first-write order
    pub variables: IndexMap<String, RuntimeValue>,
}

impl ExecutionResult {
    pub fn is_halted(&self) -> bool {
        matches!(self.status, VMStatus::Halted(_))
    }
}

/// What the current quadruple asks the loop to do next
enum Flow {
    Next,
    Jump(usize),
    Halt(HaltReason),
}

/// 虚拟机
///
/// State lives only for the duration of one [`VM::execute`] call; calling it
/// again starts from an empty variable table.
#[derive(Debug, Default)]
pub struct VM {
    config: VMConfig,
    status: VMStatus,
    labels: HashMap<Label, usize>,
    temps: HashMap<Temp, RuntimeValue>,
    vars: IndexMap<String, RuntimeValue>,
    output: String,
    pc: usize,
    steps: u64,
}

/// Run a sequence on a default-configured VM.
pub fn execute(quads: &[Quadruple]) -> VMResult<ExecutionResult> {
    VM::new().execute(quads)
}

impl VM {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_with_config(config: VMConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &VMConfig {
        &self.config
    }

    pub fn status(&self) -> VMStatus {
        self.status
    }

    fn reset(&mut self) {
        self.status = VMStatus::Ready;
        self.labels.clear();
        self.temps.clear();
        self.vars.clear();
        self.output.clear();
        self.pc = 0;
        self.steps = 0;
    }

    /// Execute a quadruple sequence.
    pub fn execute(
        &mut self,
        quads: &[Quadruple],
    ) -> VMResult<ExecutionResult> {
        self.reset();
        self.index_labels(quads);
        debug!(
            quadruples = quads.len(),
            labels = self.labels.len(),
            "vm start"
        );

        self.status = VMStatus::Running;
        let status = match self.run(quads) {
            Ok(status) => status,
            Err(e) => {
                self.status = VMStatus::Ready;
                return Err(e);
            }
        };
        self.status = status;

        if let VMStatus::Halted(reason) = status {
            warn!(pc = self.pc, "vm halted: {}", reason);
        }
        debug!(steps = self.steps, "vm complete");

        Ok(ExecutionResult {
            output: std::mem::take(&mut self.output),
            status,
            steps: self.steps,
            variables: std::mem::take(&mut self.vars),
        })
    }

    /// Pass 1: label -> position. A repeated label keeps its last position.
    fn index_labels(
        &mut self,
        quads: &[Quadruple],
    ) {
        for (i, quad) in quads.iter().enumerate() {
            if let Some(label) = quad.defined_label() {
                self.labels.insert(label, i);
            }
        }
    }

    /// Pass 2
    fn run(
        &mut self,
        quads: &[Quadruple],
    ) -> VMResult<VMStatus> {
        while let Some(quad) = quads.get(self.pc) {
            if let Some(limit) = self.config.max_steps {
                if self.steps >= limit {
                    return Ok(VMStatus::Halted(HaltReason::StepLimitExceeded(limit)));
                }
            }
            if self.config.trace_execution {
                debug!(pc = self.pc, "exec {}", quad);
            }
            self.steps += 1;

            match self.step(quad)? {
                Flow::Next => self.pc += 1,
                Flow::Jump(target) => self.pc = target,
                Flow::Halt(reason) => return Ok(VMStatus::Halted(reason)),
            }
        }
        Ok(VMStatus::Finished)
    }

    fn step(
        &mut self,
        quad: &Quadruple,
    ) -> VMResult<Flow> {
        match quad.op {
            OpCode::Label => {
                self.expect_shape(quad, quad.defined_label().is_some(), "label operand expected")?;
                self.expect_unused(quad, &quad.arg2)?;
                self.expect_unused(quad, &quad.result)?;
                Ok(Flow::Next)
            }
            OpCode::Assign => {
                let value = self.read(quad, &quad.arg1)?;
                self.expect_unused(quad, &quad.arg2)?;
                self.write(quad, value)?;
                Ok(Flow::Next)
            }
            op @ (OpCode::Add | OpCode::Sub | OpCode::Mul | OpCode::Div) => {
                let lhs = self.read(quad, &quad.arg1)?;
                let rhs = self.read(quad, &quad.arg2)?;
                let value = lhs.arithmetic(op, rhs).unwrap_or_else(|| {
                    debug!(pc = self.pc, "arithmetic fault in {}, storing 0", quad);
                    RuntimeValue::Int(0)
                });
                self.write(quad, value)?;
                Ok(Flow::Next)
            }
            op @ (OpCode::Lt
            | OpCode::Gt
            | OpCode::Le
            | OpCode::Ge
            | OpCode::Eq
            | OpCode::Ne
            | OpCode::And
            | OpCode::Or) => {
                let lhs = self.read(quad, &quad.arg1)?;
                let rhs = self.read(quad, &quad.arg2)?;
                let value = lhs.binary(op, rhs).unwrap_or_default();
                self.write(quad, value)?;
                Ok(Flow::Next)
            }
            OpCode::Not => {
                let value = self.read(quad, &quad.arg1)?;
                self.expect_unused(quad, &quad.arg2)?;
                self.write(quad, RuntimeValue::Bool(!value.is_truthy()))?;
                Ok(Flow::Next)
            }
            OpCode::JFalse => {
                let cond = self.read(quad, &quad.arg1)?;
                self.expect_unused(quad, &quad.arg2)?;
                let target = self.jump_target(quad)?;
                if cond.is_truthy() {
                    Ok(Flow::Next)
                } else {
                    Ok(self.jump(target))
                }
            }
            OpCode::Goto => {
                self.expect_unused(quad, &quad.arg1)?;
                self.expect_unused(quad, &quad.arg2)?;
                let target = self.jump_target(quad)?;
                Ok(self.jump(target))
            }
            OpCode::Print => {
                let value = self.read(quad, &quad.arg1)?;
                self.expect_unused(quad, &quad.arg2)?;
                self.expect_unused(quad, &quad.result)?;
                self.output.push_str(&value.to_string());
                self.output.push('\n');
                Ok(Flow::Next)
            }
        }
    }

    fn jump(
        &self,
        target: Label,
    ) -> Flow {
        match self.labels.get(&target) {
            Some(&pos) => Flow::Jump(pos + 1),
            None => Flow::Halt(HaltReason::UndefinedLabel(target)),
        }
    }

    fn malformed(
        &self,
        quad: &Quadruple,
        reason: &'static str,
    ) -> VMError {
        VMError::MalformedQuadruple {
            pc: self.pc,
            quad: quad.to_string(),
            reason,
        }
    }

    fn expect_shape(
        &self,
        quad: &Quadruple,
        ok: bool,
        reason: &'static str,
    ) -> VMResult<()> {
        if ok {
            Ok(())
        } else {
            Err(self.malformed(quad, reason))
        }
    }

    fn expect_unused(
        &self,
        quad: &Quadruple,
        field: &Option<Operand>,
    ) -> VMResult<()> {
        self.expect_shape(quad, field.is_none(), "unexpected operand")
    }

    fn jump_target(
        &self,
        quad: &Quadruple,
    ) -> VMResult<Label> {
        quad.jump_target()
            .ok_or_else(|| self.malformed(quad, "jump target must be a label"))
    }

    /// Resolve a value operand: literals are themselves, names are looked up.
    fn read(
        &self,
        quad: &Quadruple,
        field: &Option<Operand>,
    ) -> VMResult<RuntimeValue> {
        match field {
            Some(Operand::Const(c)) => Ok((*c).into()),
            Some(Operand::Temp(t)) => Ok(self.temps.get(t).copied().unwrap_or_default()),
            Some(Operand::Var(name)) => Ok(self.vars.get(name).copied().unwrap_or_default()),
            Some(Operand::Label(_)) => Err(self.malformed(quad, "label used as a value")),
            None => Err(self.malformed(quad, "missing operand")),
        }
    }

    /// Store into the quadruple's result field.
    fn write(
        &mut self,
        quad: &Quadruple,
        value: RuntimeValue,
    ) -> VMResult<()> {
        match &quad.result {
            Some(Operand::Temp(t)) => {
                self.temps.insert(*t, value);
                Ok(())
            }
            Some(Operand::Var(name)) => {
                self.vars.insert(name.clone(), value);
                Ok(())
            }
            _ => Err(self.malformed(quad, "result must be a temporary or variable")),
        }
    }
}
