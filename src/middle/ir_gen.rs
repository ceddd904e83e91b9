//! AST 到 IR 的代码生成器
//!
//! 将抽象语法树（AST）转换为四元式序列。
//!
//! ## 设计原则
//!
//! 1. 每次 `lower` 调用拥有自己的生成器实例，临时变量与标签计数器从零开始，
//!    并发编译之间互不可见。
//! 2. 字面量总是先物化到临时变量，表达式结果总是一个名字。
//! 3. 遇到无法识别的节点立即中止，不返回部分 IR。

use crate::frontend::ast::Node;
use crate::middle::ir::{ConstValue, Label, OpCode, Operand, Quadruple, QuadrupleSequence, Temp};
use thiserror::Error;
use tracing::{debug, trace};

/// IR 生成错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoweringError {
    #[error("AST root must be a program, found `{found}`")]
    NotAProgram { found: String },

    #[error("unsupported node `{kind}` in expression position")]
    UnsupportedExpression { kind: String },

    #[error("unsupported node `{kind}` in statement position")]
    UnsupportedStatement { kind: String },

    #[error("unsupported binary operator `{op}`")]
    UnsupportedOperator { op: String },
}

impl LoweringError {
    /// Kind of the offending node, or the operator text
    pub fn offending(&self) -> &str {
        match self {
            LoweringError::NotAProgram { found } => found,
            LoweringError::UnsupportedExpression { kind } => kind,
            LoweringError::UnsupportedStatement { kind } => kind,
            LoweringError::UnsupportedOperator { op } => op,
        }
    }
}

/// Lower a whole program with a fresh generator.
pub fn lower(ast: &Node) -> Result<QuadrupleSequence, LoweringError> {
    IrGenerator::new().lower(ast)
}

/// AST 到四元式的生成器
///
/// Single use: [`IrGenerator::lower`] consumes it, so temporaries and labels
/// are numbered from zero for every program.
#[derive(Debug, Default)]
pub struct IrGenerator {
    quads: QuadrupleSequence,
    next_temp: u32,
    next_label: u32,
}

impl IrGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lower(
        mut self,
        ast: &Node,
    ) -> Result<QuadrupleSequence, LoweringError> {
        let statements = match ast {
            Node::Program { statements } => statements,
            other => {
                return Err(LoweringError::NotAProgram {
                    found: other.kind().to_string(),
                })
            }
        };

        debug!(statements = statements.len(), "lowering program");
        self.lower_block(statements)?;
        debug!(
            quadruples = self.quads.len(),
            temps = self.next_temp,
            labels = self.next_label,
            "lowering finished"
        );
        Ok(self.quads)
    }

    fn new_temp(&mut self) -> Temp {
        let t = Temp(self.next_temp);
        self.next_temp += 1;
        t
    }

    fn new_label(&mut self) -> Label {
        let l = Label(self.next_label);
        self.next_label += 1;
        l
    }

    fn emit(
        &mut self,
        quad: Quadruple,
    ) {
        trace!(index = self.quads.len(), "emit {}", quad);
        self.quads.push(quad);
    }

    /// Materialise a literal into a fresh temporary.
    fn lower_literal(
        &mut self,
        value: ConstValue,
    ) -> Operand {
        let t = self.new_temp();
        self.emit(Quadruple::assign(Operand::Const(value), t.into()));
        t.into()
    }

    /// 表达式降级，返回保存结果的操作数
    fn lower_expr(
        &mut self,
        node: &Node,
    ) -> Result<Operand, LoweringError> {
        match node {
            Node::NumberLit { value } => Ok(self.lower_literal(ConstValue::Int(*value))),
            Node::FloatLit { value } => Ok(self.lower_literal(ConstValue::Float(*value))),
            Node::BoolLit { value } => Ok(self.lower_literal(ConstValue::Bool(*value))),
            // Reading a variable emits nothing.
            Node::Identifier { name } => Ok(Operand::Var(name.clone())),
            Node::BinOp { op, left, right } => {
                let code = OpCode::from_binary(op)
                    .ok_or_else(|| LoweringError::UnsupportedOperator { op: op.clone() })?;
                let lhs = self.lower_expr(left)?;
                let rhs = self.lower_expr(right)?;
                let t = self.new_temp();
                self.emit(Quadruple::binary(code, lhs, rhs, t.into()));
                Ok(t.into())
            }
            // Logical negation is the only unary operator; the spelling is ignored.
            Node::UnOp { operand, .. } => {
                let src = self.lower_expr(operand)?;
                let t = self.new_temp();
                self.emit(Quadruple::not(src, t.into()));
                Ok(t.into())
            }
            other => Err(LoweringError::UnsupportedExpression {
                kind: other.kind().to_string(),
            }),
        }
    }

    fn lower_block(
        &mut self,
        statements: &[Node],
    ) -> Result<(), LoweringError> {
        for stmt in statements {
            self.lower_stmt(stmt)?;
        }
        Ok(())
    }

    /// 语句降级
    fn lower_stmt(
        &mut self,
        node: &Node,
    ) -> Result<(), LoweringError> {
        match node {
            Node::Decl { name, init, .. } => {
                let value = self.lower_expr(init)?;
                self.emit(Quadruple::assign(value, Operand::Var(name.clone())));
            }
            Node::Assign { name, expr } => {
                let value = self.lower_expr(expr)?;
                self.emit(Quadruple::assign(value, Operand::Var(name.clone())));
            }
            Node::Print { expr } => {
                let value = self.lower_expr(expr)?;
                self.emit(Quadruple::print(value));
            }
            Node::If {
                cond,
                then_block,
                else_block,
            } => {
                let cond = self.lower_expr(cond)?;
                let else_label = self.new_label();
                let end_label = self.new_label();

                self.emit(Quadruple::jfalse(cond, else_label));
                self.lower_block(then_block)?;
                self.emit(Quadruple::goto(end_label));

                // Both labels are emitted even for an empty else block.
                self.emit(Quadruple::label(else_label));
                self.lower_block(else_block)?;
                self.emit(Quadruple::label(end_label));
            }
            Node::While { cond, body } => {
                let start_label = self.new_label();
                let end_label = self.new_label();

                self.emit(Quadruple::label(start_label));
                let cond = self.lower_expr(cond)?;
                self.emit(Quadruple::jfalse(cond, end_label));
                self.lower_block(body)?;
                self.emit(Quadruple::goto(start_label));
                self.emit(Quadruple::label(end_label));
            }
            other => {
                return Err(LoweringError::UnsupportedStatement {
                    kind: other.kind().to_string(),
                })
            }
        }
        Ok(())
    }
}
