//! Intermediate Representation
//!
//! A program is lowered into a flat [`QuadrupleSequence`]. Every instruction
//! is a quadruple `(op, arg1, arg2, result)` whose fields are all optional
//! except the opcode; which fields an opcode uses is checked when the VM
//! runs it, not when the quadruple is built.

use serde::ser::{SerializeTuple, Serializer};
use serde::Serialize;
use std::fmt;

/// Compile-time literal
#[derive(Debug, Clone, Copy)]
pub enum ConstValue {
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl ConstValue {
    /// Numeric literals only; booleans are not folded.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ConstValue::Int(_) | ConstValue::Float(_))
    }
}

impl PartialEq for ConstValue {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        match (self, other) {
            (Self::Int(l0), Self::Int(r0)) => l0 == r0,
            (Self::Float(l0), Self::Float(r0)) => l0.to_bits() == r0.to_bits(),
            (Self::Bool(l0), Self::Bool(r0)) => l0 == r0,
            _ => false,
        }
    }
}

impl Eq for ConstValue {}

impl std::hash::Hash for ConstValue {
    fn hash<H: std::hash::Hasher>(
        &self,
        state: &mut H,
    ) {
        core::mem::discriminant(self).hash(state);
        match self {
            Self::Int(i) => i.hash(state),
            Self::Float(f) => f.to_bits().hash(state),
            Self::Bool(b) => b.hash(state),
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            ConstValue::Int(i) => write!(f, "{}", i),
            ConstValue::Float(x) => write!(f, "{:?}", x),
            ConstValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl Serialize for ConstValue {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match self {
            ConstValue::Int(i) => serializer.serialize_i64(*i),
            ConstValue::Float(x) => serializer.serialize_f64(*x),
            ConstValue::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}

/// Compiler-generated temporary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Temp(pub u32);

impl fmt::Display for Temp {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

impl Serialize for Temp {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Label for jump targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(pub u32);

impl fmt::Display for Label {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

impl Serialize for Label {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Instruction operand
///
/// Temporaries and user variables are separate namespaces: `Var("t0")`
/// never aliases `Temp(0)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    Const(ConstValue),
    Temp(Temp),
    Var(String),
    Label(Label),
}

impl Operand {
    pub fn int(value: i64) -> Self {
        Operand::Const(ConstValue::Int(value))
    }

    pub fn float(value: f64) -> Self {
        Operand::Const(ConstValue::Float(value))
    }

    pub fn boolean(value: bool) -> Self {
        Operand::Const(ConstValue::Bool(value))
    }

    pub fn var(name: &str) -> Self {
        Operand::Var(name.to_string())
    }

    /// The literal, if this operand is one
    pub fn as_const(&self) -> Option<ConstValue> {
        match self {
            Operand::Const(c) => Some(*c),
            _ => None,
        }
    }

    /// True for operands that name a storage location
    pub fn is_place(&self) -> bool {
        matches!(self, Operand::Temp(_) | Operand::Var(_))
    }
}

impl fmt::Display for Operand {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Operand::Const(c) => write!(f, "{}", c),
            Operand::Temp(t) => write!(f, "{}", t),
            Operand::Var(name) => write!(f, "{}", name),
            Operand::Label(l) => write!(f, "{}", l),
        }
    }
}

impl Serialize for Operand {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match self {
            Operand::Const(c) => c.serialize(serializer),
            other => serializer.collect_str(other),
        }
    }
}

impl From<Temp> for Operand {
    fn from(t: Temp) -> Self {
        Operand::Temp(t)
    }
}

impl From<Label> for Operand {
    fn from(l: Label) -> Self {
        Operand::Label(l)
    }
}

/// Quadruple operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Or,
    Not,
    Assign,
    Print,
    Label,
    Goto,
    JFalse,
}

impl OpCode {
    /// Map a source-level binary operator onto its opcode.
    ///
    /// `&&` and `||` normalise to `and` / `or`.
    pub fn from_binary(op: &str) -> Option<OpCode> {
        let code = match op {
            "+" => OpCode::Add,
            "-" => OpCode::Sub,
            "*" => OpCode::Mul,
            "/" => OpCode::Div,
            "<" => OpCode::Lt,
            ">" => OpCode::Gt,
            "<=" => OpCode::Le,
            ">=" => OpCode::Ge,
            "==" => OpCode::Eq,
            "!=" => OpCode::Ne,
            "&&" | "and" => OpCode::And,
            "||" | "or" => OpCode::Or,
            _ => return None,
        };
        Some(code)
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(self, OpCode::Add | OpCode::Sub | OpCode::Mul | OpCode::Div)
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            OpCode::Lt | OpCode::Gt | OpCode::Le | OpCode::Ge | OpCode::Eq | OpCode::Ne
        )
    }

    pub fn is_jump(self) -> bool {
        matches!(self, OpCode::Goto | OpCode::JFalse)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OpCode::Add => "+",
            OpCode::Sub => "-",
            OpCode::Mul => "*",
            OpCode::Div => "/",
            OpCode::Lt => "<",
            OpCode::Gt => ">",
            OpCode::Le => "<=",
            OpCode::Ge => ">=",
            OpCode::Eq => "==",
            OpCode::Ne => "!=",
            OpCode::And => "and",
            OpCode::Or => "or",
            OpCode::Not => "not",
            OpCode::Assign => "assign",
            OpCode::Print => "print",
            OpCode::Label => "label",
            OpCode::Goto => "goto",
            OpCode::JFalse => "jfalse",
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for OpCode {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// `(op, arg1, arg2, result)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Quadruple {
    pub op: OpCode,
    pub arg1: Option<Operand>,
    pub arg2: Option<Operand>,
    pub result: Option<Operand>,
}

impl Quadruple {
    pub fn new(
        op: OpCode,
        arg1: Option<Operand>,
        arg2: Option<Operand>,
        result: Option<Operand>,
    ) -> Self {
        Self {
            op,
            arg1,
            arg2,
            result,
        }
    }

    pub fn assign(
        src: Operand,
        dst: Operand,
    ) -> Self {
        Self::new(OpCode::Assign, Some(src), None, Some(dst))
    }

    pub fn binary(
        op: OpCode,
        lhs: Operand,
        rhs: Operand,
        dst: Operand,
    ) -> Self {
        Self::new(op, Some(lhs), Some(rhs), Some(dst))
    }

    pub fn not(
        src: Operand,
        dst: Operand,
    ) -> Self {
        Self::new(OpCode::Not, Some(src), None, Some(dst))
    }

    pub fn print(value: Operand) -> Self {
        Self::new(OpCode::Print, Some(value), None, None)
    }

    pub fn label(label: Label) -> Self {
        Self::new(OpCode::Label, Some(label.into()), None, None)
    }

    pub fn goto(target: Label) -> Self {
        Self::new(OpCode::Goto, None, None, Some(target.into()))
    }

    pub fn jfalse(
        cond: Operand,
        target: Label,
    ) -> Self {
        Self::new(OpCode::JFalse, Some(cond), None, Some(target.into()))
    }

    /// The label this quadruple defines, if it is a well-formed `label`
    pub fn defined_label(&self) -> Option<Label> {
        match (self.op, &self.arg1) {
            (OpCode::Label, Some(Operand::Label(l))) => Some(*l),
            _ => None,
        }
    }

    /// The label this quadruple jumps to, if it is a well-formed jump
    pub fn jump_target(&self) -> Option<Label> {
        match (self.op.is_jump(), &self.result) {
            (true, Some(Operand::Label(l))) => Some(*l),
            _ => None,
        }
    }

    /// `(assign, X, -, X)`
    pub fn is_self_assignment(&self) -> bool {
        match (self.op, &self.arg1, &self.arg2, &self.result) {
            (OpCode::Assign, Some(src), None, Some(dst)) => src.is_place() && src == dst,
            _ => false,
        }
    }
}

fn fmt_field(
    f: &mut fmt::Formatter<'_>,
    field: &Option<Operand>,
) -> fmt::Result {
    match field {
        Some(operand) => write!(f, "{}", operand),
        None => f.write_str("-"),
    }
}

impl fmt::Display for Quadruple {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "({}, ", self.op)?;
        fmt_field(f, &self.arg1)?;
        f.write_str(", ")?;
        fmt_field(f, &self.arg2)?;
        f.write_str(", ")?;
        fmt_field(f, &self.result)?;
        f.write_str(")")
    }
}

/// Serialised as the 4-tuple `[op, arg1, arg2, result]`, absent fields as `null`.
impl Serialize for Quadruple {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(4)?;
        tuple.serialize_element(&self.op)?;
        tuple.serialize_element(&self.arg1)?;
        tuple.serialize_element(&self.arg2)?;
        tuple.serialize_element(&self.result)?;
        tuple.end()
    }
}

/// Ordered quadruple list produced by one lowering call
pub type QuadrupleSequence = Vec<Quadruple>;

/// Render a sequence one quadruple per line, prefixed by its index.
pub fn dump(quads: &[Quadruple]) -> String {
    let mut out = String::new();
    for (i, quad) in quads.iter().enumerate() {
        out.push_str(&format!("[{:3}] {}\n", i, quad));
    }
    out
}
