// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Statement AST nodes.

use crate::decl::VarDecl;
use crate::expr::Expr;
use crate::{ErrorNode, NodeId, SourceLocation};

/// A statement in the AST.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Stmt {
    pub id: NodeId,
    pub kind: StmtKind,
    pub loc: SourceLocation,
}

/// The kind of statement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum StmtKind {
    /// `{ ... }`, `scope { ... }` or `unsafe { ... }`
    Block(Block),
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        cond: Expr,
    },
    /// `for (init; cond; update) body`, every clause optional
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
    },
    Return(Option<Expr>),
    Expr(Expr),
    Var(VarDecl),
    /// Bare `;`
    Empty,
    Error(ErrorNode),
}

/// A braced statement list.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Block {
    pub kind: BlockKind,
    pub stmts: Vec<Stmt>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BlockKind {
    #[default]
    Plain,
    /// `scope { }`: explicitly scoped sub-block
    Scope,
    /// `unsafe { }`: contents exempt from later safety checks
    Unsafe,
}

impl Block {
    pub fn is_unsafe(&self) -> bool {
        self.kind == BlockKind::Unsafe
    }
}

impl Stmt {
    pub fn is_error(&self) -> bool {
        matches!(self.kind, StmtKind::Error(_))
    }
}
