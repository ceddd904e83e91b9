//! Abstract syntax tree handed over by the parser.
//!
//! The parser is an external collaborator; it emits the tree as JSON where
//! every node is an object tagged by its `"node"` field. All node kinds live
//! in a single enum, mirroring that wire shape: a statement may therefore
//! show up where an expression is expected, and it is up to lowering to
//! reject it. A tag this crate does not know becomes [`Node::Unknown`], so
//! lowering also reports those by name.

use serde::de::{Deserializer, Error as _};
use serde::Deserialize;
use serde_json::Value;

/// Tags with a dedicated variant
const KNOWN_KINDS: &[&str] = &[
    "program", "decl", "assign", "print", "if", "while", "binop", "unop", "number", "fnumber",
    "bool", "id",
];

/// AST node
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(remote = "Self", tag = "node", rename_all = "lowercase")]
pub enum Node {
    /// Root of a translation unit
    Program {
        #[serde(rename = "stmts", default)]
        statements: Vec<Node>,
    },
    /// `int x = expr;`
    Decl {
        #[serde(rename = "id")]
        name: String,
        /// Declared type name, informational only
        #[serde(rename = "type", default)]
        ty: Option<String>,
        #[serde(rename = "expr")]
        init: Box<Node>,
    },
    /// `x = expr;`
    Assign {
        #[serde(rename = "id")]
        name: String,
        expr: Box<Node>,
    },
    /// `print(expr);`
    Print { expr: Box<Node> },
    /// `if (cond) { .. } else { .. }`
    If {
        cond: Box<Node>,
        #[serde(rename = "then", default)]
        then_block: Vec<Node>,
        #[serde(rename = "otherwise", default)]
        else_block: Vec<Node>,
    },
    /// `while (cond) { .. }`
    While {
        cond: Box<Node>,
        #[serde(default)]
        body: Vec<Node>,
    },
    #[serde(rename = "binop")]
    BinOp {
        op: String,
        left: Box<Node>,
        right: Box<Node>,
    },
    #[serde(rename = "unop")]
    UnOp {
        op: String,
        #[serde(rename = "expr")]
        operand: Box<Node>,
    },
    #[serde(rename = "number")]
    NumberLit { value: i64 },
    #[serde(rename = "fnumber")]
    FloatLit { value: f64 },
    #[serde(rename = "bool")]
    BoolLit { value: bool },
    #[serde(rename = "id")]
    Identifier { name: String },
    /// Any other tag; its fields are not inspected
    #[serde(skip_deserializing)]
    Unknown { kind: String },
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let kind = value
            .get("node")
            .and_then(Value::as_str)
            .ok_or_else(|| D::Error::missing_field("node"))?;
        if !KNOWN_KINDS.contains(&kind) {
            return Ok(Node::Unknown {
                kind: kind.to_string(),
            });
        }
        // Inherent `deserialize` generated by the derive above.
        Node::deserialize(value).map_err(D::Error::custom)
    }
}

impl Node {
    /// Node kind as spelled on the wire
    pub fn kind(&self) -> &str {
        match self {
            Node::Program { .. } => "program",
            Node::Decl { .. } => "decl",
            Node::Assign { .. } => "assign",
            Node::Print { .. } => "print",
            Node::If { .. } => "if",
            Node::While { .. } => "while",
            Node::BinOp { .. } => "binop",
            Node::UnOp { .. } => "unop",
            Node::NumberLit { .. } => "number",
            Node::FloatLit { .. } => "fnumber",
            Node::BoolLit { .. } => "bool",
            Node::Identifier { .. } => "id",
            Node::Unknown { kind } => kind,
        }
    }

    /// Parse a tree from the parser's JSON output
    pub fn from_json(text: &str) -> Result<Node, serde_json::Error> {
        serde_json::from_str(text)
    }

    // Small constructors, mostly for building trees by hand in tests and benches.

    pub fn program(statements: Vec<Node>) -> Node {
        Node::Program { statements }
    }

    pub fn decl(
        name: &str,
        init: Node,
    ) -> Node {
        Node::Decl {
            name: name.to_string(),
            ty: Some("int".to_string()),
            init: Box::new(init),
        }
    }

    pub fn assign(
        name: &str,
        expr: Node,
    ) -> Node {
        Node::Assign {
            name: name.to_string(),
            expr: Box::new(expr),
        }
    }

    pub fn print(expr: Node) -> Node {
        Node::Print {
            expr: Box::new(expr),
        }
    }

    pub fn if_else(
        cond: Node,
        then_block: Vec<Node>,
        else_block: Vec<Node>,
    ) -> Node {
        Node::If {
            cond: Box::new(cond),
            then_block,
            else_block,
        }
    }

    pub fn while_loop(
        cond: Node,
        body: Vec<Node>,
    ) -> Node {
        Node::While {
            cond: Box::new(cond),
            body,
        }
    }

    pub fn binop(
        op: &str,
        left: Node,
        right: Node,
    ) -> Node {
        Node::BinOp {
            op: op.to_string(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn not(operand: Node) -> Node {
        Node::UnOp {
            op: "!".to_string(),
            operand: Box::new(operand),
        }
    }

    pub fn int(value: i64) -> Node {
        Node::NumberLit { value }
    }

    pub fn float(value: f64) -> Node {
        Node::FloatLit { value }
    }

    pub fn boolean(value: bool) -> Node {
        Node::BoolLit { value }
    }

    pub fn ident(name: &str) -> Node {
        Node::Identifier {
            name: name.to_string(),
        }
    }
}
