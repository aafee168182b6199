// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression AST nodes.

use crate::decl::FunctionDecl;
use crate::node_list::NodeList;
use crate::token::NumSuffix;
use crate::types::Type;
use crate::{ErrorNode, NodeId, SourceLocation};

/// An expression in the AST.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub loc: SourceLocation,
}

/// The kind of expression.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ExprKind {
    Literal(Literal),
    /// Variable reference
    Var(String),
    This,
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// `callee<type_args>(args)`
    Call {
        callee: Box<Expr>,
        type_args: NodeList<Box<Type>>,
        args: NodeList<Box<Expr>>,
    },
    /// `object.member`
    Member {
        object: Box<Expr>,
        member: String,
    },
    /// `array[index]`
    Index {
        array: Box<Expr>,
        index: Box<Expr>,
    },
    /// `new Type(args)`
    New {
        ty: Type,
        args: NodeList<Box<Expr>>,
    },
    /// `(a, b) => a + b`
    Lambda(Box<FunctionDecl>),
    /// Interpolated string: text segments and embedded expressions in order.
    TemplateString(NodeList<TemplatePart>),
    /// `{ .x = 1, y: 2, 3 }` initializing a statically typed declaration.
    StructInit {
        fields: Vec<FieldInit>,
        positional: bool,
    },
    /// Anonymous object `{ key: value }`
    FreeObject(NodeList<Property>),
    Error(ErrorNode),
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Literal {
    Int(i64, NumSuffix),
    Float(f64, NumSuffix),
    String(String),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TemplatePart {
    Text(String),
    Expr(Box<Expr>),
}

/// One entry of a struct initializer. `name` is `None` for positional entries.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FieldInit {
    pub name: Option<String>,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Property {
    pub key: String,
    pub value: Box<Expr>,
}

/// Binary operators, assignments included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::Assign => "=",
            BinOp::AddAssign => "+=",
            BinOp::SubAssign => "-=",
            BinOp::MulAssign => "*=",
            BinOp::DivAssign => "/=",
            BinOp::ModAssign => "%=",
        }
    }

    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            BinOp::Assign
                | BinOp::AddAssign
                | BinOp::SubAssign
                | BinOp::MulAssign
                | BinOp::DivAssign
                | BinOp::ModAssign
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `+x`
    Plus,
    /// `!x`
    Not,
}

impl Expr {
    pub fn is_error(&self) -> bool {
        matches!(self.kind, ExprKind::Error(_))
    }

    /// `new ...` and struct initializers construct class instances.
    pub fn is_constructor_call(&self) -> bool {
        matches!(self.kind, ExprKind::New { .. } | ExprKind::StructInit { .. })
    }
}
