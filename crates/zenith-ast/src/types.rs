// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type expression AST nodes.

use std::fmt;

use crate::node_list::NodeList;
use crate::SourceLocation;

/// A written type, e.g. `int`, `Foo`, `[string]`, `Map<string, int>[]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Type {
    pub kind: TypeKind,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TypeKind {
    Primitive(Primitive),
    /// User-defined class, struct, union or alias name
    Named(String),
    /// `[T]` or `T[]`
    Array(Box<Type>),
    /// `Name<T, U>`
    Template {
        base: String,
        args: NodeList<Box<Type>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Primitive {
    Int,
    Long,
    Short,
    Byte,
    Float,
    Double,
    String,
    Bool,
    Dynamic,
    FreeObj,
    Number,
    BigInt,
    BigNumber,
}

impl Primitive {
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Short => "short",
            Primitive::Byte => "byte",
            Primitive::Float => "float",
            Primitive::Double => "double",
            Primitive::String => "string",
            Primitive::Bool => "bool",
            Primitive::Dynamic => "dynamic",
            Primitive::FreeObj => "freeobj",
            Primitive::Number => "Number",
            Primitive::BigInt => "BigInt",
            Primitive::BigNumber => "BigNumber",
        }
    }
}

impl Type {
    pub fn is_dynamic(&self) -> bool {
        matches!(self.kind, TypeKind::Primitive(Primitive::Dynamic))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeKind::Primitive(p) => f.write_str(p.name()),
            TypeKind::Named(name) => f.write_str(name),
            TypeKind::Array(elem) => write!(f, "{}[]", elem),
            TypeKind::Template { base, args } => {
                write!(f, "{}<", base)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(">")
            }
        }
    }
}
