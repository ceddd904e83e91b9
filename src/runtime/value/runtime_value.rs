//! Runtime value type for the quadruple VM
//!
//! Values are dynamically typed: a temporary or variable holds whichever of
//! integer, float or boolean was last stored into it. Arithmetic promotes to
//! float as soon as one side is a float; booleans count as `0`/`1`.
//!
//! The same evaluation rules serve both the VM and the optimizer's constant
//! folding, so a folded quadruple always computes what the VM would have.

use crate::middle::ir::{ConstValue, OpCode};
use serde::{Serialize, Serializer};
use std::fmt;

/// Runtime value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RuntimeValue {
    /// Boolean
    Bool(bool),

    /// Integer
    Int(i64),

    /// Float
    Float(f64),
}

/// Unknown names read as this.
impl Default for RuntimeValue {
    fn default() -> Self {
        RuntimeValue::Int(0)
    }
}

/// Operand pair after numeric promotion
enum Promoted {
    Ints(i64, i64),
    Floats(f64, f64),
}

impl RuntimeValue {
    /// Truthiness: zero, `0.0` and `false` are falsy
    pub fn is_truthy(&self) -> bool {
        match self {
            RuntimeValue::Bool(b) => *b,
            RuntimeValue::Int(i) => *i != 0,
            RuntimeValue::Float(f) => *f != 0.0,
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            RuntimeValue::Bool(b) => Some(i64::from(*b)),
            RuntimeValue::Int(i) => Some(*i),
            RuntimeValue::Float(_) => None,
        }
    }

    fn as_f64(&self) -> f64 {
        match self {
            RuntimeValue::Bool(b) => f64::from(u8::from(*b)),
            RuntimeValue::Int(i) => *i as f64,
            RuntimeValue::Float(f) => *f,
        }
    }

    fn promote(
        self,
        rhs: RuntimeValue,
    ) -> Promoted {
        match (self.as_i64(), rhs.as_i64()) {
            (Some(l), Some(r)) => Promoted::Ints(l, r),
            _ => Promoted::Floats(self.as_f64(), rhs.as_f64()),
        }
    }

    /// Whether this value is a numeric zero, used by the `/ 0` folding policy
    pub fn is_zero(&self) -> bool {
        match self {
            RuntimeValue::Int(i) => *i == 0,
            RuntimeValue::Float(f) => *f == 0.0,
            RuntimeValue::Bool(_) => false,
        }
    }

    /// Apply `+ - * /`.
    ///
    /// Returns `None` on a fault: division by zero or `i64` overflow.
    pub fn arithmetic(
        self,
        op: OpCode,
        rhs: RuntimeValue,
    ) -> Option<RuntimeValue> {
        match self.promote(rhs) {
            Promoted::Ints(l, r) => {
                let v = match op {
                    OpCode::Add => l.checked_add(r)?,
                    OpCode::Sub => l.checked_sub(r)?,
                    OpCode::Mul => l.checked_mul(r)?,
                    OpCode::Div => floor_div(l, r)?,
                    _ => return None,
                };
                Some(RuntimeValue::Int(v))
            }
            Promoted::Floats(l, r) => {
                let v = match op {
                    OpCode::Add => l + r,
                    OpCode::Sub => l - r,
                    OpCode::Mul => l * r,
                    OpCode::Div if r == 0.0 => return None,
                    OpCode::Div => l / r,
                    _ => return None,
                };
                Some(RuntimeValue::Float(v))
            }
        }
    }

    /// Apply `< > <= >= == !=` numerically; `None` for any other opcode
    pub fn compare(
        self,
        op: OpCode,
        rhs: RuntimeValue,
    ) -> Option<RuntimeValue> {
        if !op.is_comparison() {
            return None;
        }
        let ordering = match self.promote(rhs) {
            Promoted::Ints(l, r) => Some(l.cmp(&r)),
            Promoted::Floats(l, r) => l.partial_cmp(&r),
        };
        let result = match (op, ordering) {
            (OpCode::Eq, o) => o.is_some_and(|o| o.is_eq()),
            (OpCode::Ne, o) => !o.is_some_and(|o| o.is_eq()),
            (_, None) => false,
            (OpCode::Lt, Some(o)) => o.is_lt(),
            (OpCode::Gt, Some(o)) => o.is_gt(),
            (OpCode::Le, Some(o)) => o.is_le(),
            (OpCode::Ge, Some(o)) => o.is_ge(),
            _ => false,
        };
        Some(RuntimeValue::Bool(result))
    }

    /// Apply `and` / `or` on truthiness
    pub fn logical(
        self,
        op: OpCode,
        rhs: RuntimeValue,
    ) -> Option<RuntimeValue> {
        match op {
            OpCode::And => Some(RuntimeValue::Bool(self.is_truthy() && rhs.is_truthy())),
            OpCode::Or => Some(RuntimeValue::Bool(self.is_truthy() || rhs.is_truthy())),
            _ => None,
        }
    }

    /// Evaluate any binary opcode
    pub fn binary(
        self,
        op: OpCode,
        rhs: RuntimeValue,
    ) -> Option<RuntimeValue> {
        if op.is_arithmetic() {
            self.arithmetic(op, rhs)
        } else if op.is_comparison() {
            self.compare(op, rhs)
        } else {
            self.logical(op, rhs)
        }
    }
}

/// Integer division rounding toward negative infinity
fn floor_div(
    l: i64,
    r: i64,
) -> Option<i64> {
    let q = l.checked_div(r)?;
    if l % r != 0 && ((l < 0) != (r < 0)) {
        Some(q - 1)
    } else {
        Some(q)
    }
}

impl From<ConstValue> for RuntimeValue {
    fn from(c: ConstValue) -> Self {
        match c {
            ConstValue::Int(i) => RuntimeValue::Int(i),
            ConstValue::Float(f) => RuntimeValue::Float(f),
            ConstValue::Bool(b) => RuntimeValue::Bool(b),
        }
    }
}

impl From<RuntimeValue> for ConstValue {
    fn from(v: RuntimeValue) -> Self {
        match v {
            RuntimeValue::Int(i) => ConstValue::Int(i),
            RuntimeValue::Float(f) => ConstValue::Float(f),
            RuntimeValue::Bool(b) => ConstValue::Bool(b),
        }
    }
}

impl fmt::Display for RuntimeValue {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            RuntimeValue::Bool(b) => write!(f, "{}", b),
            RuntimeValue::Int(i) => write!(f, "{}", i),
            RuntimeValue::Float(fl) => write!(f, "{:?}", fl),
        }
    }
}

impl Serialize for RuntimeValue {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match self {
            RuntimeValue::Bool(b) => serializer.serialize_bool(*b),
            RuntimeValue::Int(i) => serializer.serialize_i64(*i),
            RuntimeValue::Float(f) => serializer.serialize_f64(*f),
        }
    }
}
