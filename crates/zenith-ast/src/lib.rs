// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Abstract Syntax Tree types for the Zenith language.
//!
//! This crate defines the tokens, AST nodes and the diagnostic sink shared
//! between the lexer, the parser and whatever consumes the tree.

pub mod span;
pub mod token;
pub mod node_list;
pub mod types;
pub mod expr;
pub mod stmt;
pub mod decl;
pub mod report;
pub mod walk;

pub use node_list::NodeList;
pub use report::{ErrorReporter, Related, Report, Severity};
pub use span::{LineMap, SourceLocation, Span};

/// Unique identifier for AST nodes, assigned in creation order.
///
/// Used by later passes to attach results to nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NodeId(pub u32);

/// Placeholder for source the parser could not make sense of.
///
/// Always a leaf. `replaced` is the byte range of the skipped tokens and
/// may be empty when nothing could be consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ErrorNode {
    pub loc: SourceLocation,
    pub replaced: Span,
}
