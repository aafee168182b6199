// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Declaration AST nodes.

use crate::expr::Expr;
use crate::node_list::NodeList;
use crate::stmt::Block;
use crate::types::Type;
use crate::{ErrorNode, NodeId, SourceLocation};

/// Root of a parsed compilation unit.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Program {
    pub decls: Vec<Decl>,
    pub loc: SourceLocation,
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Decl {
    pub id: NodeId,
    pub kind: DeclKind,
    pub loc: SourceLocation,
}

/// The kind of declaration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum DeclKind {
    Function(FunctionDecl),
    /// Class, struct or actor
    Object(ObjectDecl),
    Union(UnionDecl),
    Import(ImportDecl),
    /// `template<...> decl`
    Template(TemplateDecl),
    /// Free-standing `operator` overload
    Operator(OperatorDecl),
    /// Global variable
    Var(VarDecl),
    Error(ErrorNode),
}

impl Decl {
    pub fn is_error(&self) -> bool {
        matches!(self.kind, DeclKind::Error(_))
    }
}

/// A function, method or lambda.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FunctionDecl {
    /// Empty for lambdas
    pub name: String,
    pub params: Vec<Param>,
    pub ret_ty: Option<Type>,
    pub body: Block,
    pub annotations: NodeList<Annotation>,
    /// Parameters were written as `({ ... })`
    pub struct_sugar: bool,
    pub is_lambda: bool,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Param {
    pub name: String,
    pub ty: Option<Type>,
    pub default: Option<Expr>,
    pub loc: SourceLocation,
}

/// A variable declaration, global, local or field.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VarDecl {
    pub kind: VarKind,
    pub name: String,
    pub ty: Option<Type>,
    pub init: Option<Expr>,
    pub hoisted: bool,
    pub is_const: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum VarKind {
    /// Written with a type in front: `int a = 1`
    Static,
    /// `let`, `var` or `dynamic`
    Dynamic,
    /// Statically typed and initialized by a constructor call
    ClassInit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ObjectKind {
    Class,
    Struct,
    /// Concurrency-oriented object; may declare message handlers
    Actor,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ObjectDecl {
    pub kind: ObjectKind,
    pub name: String,
    pub base: Option<String>,
    pub members: Vec<Member>,
}

impl ObjectDecl {
    pub fn is_actor(&self) -> bool {
        self.kind == ObjectKind::Actor
    }
}

/// A member of a class, struct or actor body.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Member {
    pub id: NodeId,
    pub kind: MemberKind,
    pub flags: Flags,
    pub annotations: NodeList<Annotation>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum MemberKind {
    Field(VarDecl),
    Method(FunctionDecl),
    Constructor(ConstructorDecl),
    Operator(OperatorDecl),
    /// `on Message(params) { }` inside an actor
    Handler(HandlerDecl),
    Error(ErrorNode),
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ConstructorDecl {
    pub params: Vec<Param>,
    /// `: member(value), ...`
    pub initializers: NodeList<MemberInit>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MemberInit {
    pub member: String,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HandlerDecl {
    pub message: String,
    pub params: Vec<Param>,
    pub ret_ty: Option<Type>,
    pub body: Block,
}

/// `operator + (Vec other) -> Vec { ... }`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OperatorDecl {
    pub op: OverloadOp,
    pub params: Vec<Param>,
    pub ret_ty: Option<Type>,
    pub body: Block,
    pub annotations: NodeList<Annotation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum OverloadOp {
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
    Not,
    /// `operator []`
    Index,
}

impl OverloadOp {
    pub fn symbol(self) -> &'static str {
        match self {
            OverloadOp::Add => "+",
            OverloadOp::Sub => "-",
            OverloadOp::Mul => "*",
            OverloadOp::Div => "/",
            OverloadOp::Mod => "%",
            OverloadOp::Eq => "==",
            OverloadOp::Ne => "!=",
            OverloadOp::Lt => "<",
            OverloadOp::Le => "<=",
            OverloadOp::Gt => ">",
            OverloadOp::Ge => ">=",
            OverloadOp::Not => "!",
            OverloadOp::Index => "[]",
        }
    }
}

/// `union Name { int, string, Foo }`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct UnionDecl {
    pub name: String,
    pub variants: Vec<Type>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ImportDecl {
    pub target: ImportTarget,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ImportTarget {
    /// `import std.io`
    Module(Vec<String>),
    /// `import java java.util.List`
    Java(Vec<String>),
    /// `import "path/to/file.zn"`
    File(String),
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TemplateDecl {
    pub params: Vec<TemplateParam>,
    pub decl: Box<Decl>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TemplateParam {
    pub name: String,
    pub kind: TemplateParamKind,
    /// `typename... Ts`
    pub variadic: bool,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TemplateParamKind {
    /// `typename T : Constraint = Default`
    Type {
        constraint: Option<Type>,
        default: Option<Type>,
    },
    /// `int N = 4`
    Value {
        ty: Type,
        default: Option<Expr>,
    },
    /// `template<typename> typename C`
    Template { params: Vec<TemplateParam> },
}

/// `@Name(key = value, value)`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Annotation {
    pub name: String,
    pub args: NodeList<AnnotationArg>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AnnotationArg {
    pub name: Option<String>,
    pub value: Expr,
}

// ============================================================================
// Member Flags
// ============================================================================

/// Member access level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Access {
    #[default]
    Public,
    Private,
    Protected,
    /// Readable everywhere, writable only inside the class
    PrivateW,
    /// Readable everywhere, writable inside the class and subclasses
    ProtectedW,
}

impl Access {
    fn bits(self) -> u8 {
        match self {
            Access::Public => 0,
            Access::Private => 1,
            Access::Protected => 2,
            Access::PrivateW => 3,
            Access::ProtectedW => 4,
        }
    }

    fn from_bits(bits: u8) -> Self {
        match bits {
            1 => Access::Private,
            2 => Access::Protected,
            3 => Access::PrivateW,
            4 => Access::ProtectedW,
            _ => Access::Public,
        }
    }
}

/// Modifier bitset on a member: access in the low three bits, then
/// `const`, `static` and `hoist`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Flags(u8);

impl Flags {
    const ACCESS_MASK: u8 = 0b0000_0111;
    pub const CONST: u8 = 0b0000_1000;
    pub const STATIC: u8 = 0b0001_0000;
    pub const HOIST: u8 = 0b0010_0000;

    pub fn access(self) -> Access {
        Access::from_bits(self.0 & Self::ACCESS_MASK)
    }

    pub fn with_access(self, access: Access) -> Self {
        Flags((self.0 & !Self::ACCESS_MASK) | access.bits())
    }

    pub fn with(self, bit: u8) -> Self {
        Flags(self.0 | bit)
    }

    pub fn contains(self, bit: u8) -> bool {
        self.0 & bit != 0
    }

    pub fn is_const(self) -> bool {
        self.contains(Self::CONST)
    }

    pub fn is_static(self) -> bool {
        self.contains(Self::STATIC)
    }

    pub fn is_hoisted(self) -> bool {
        self.contains(Self::HOIST)
    }

    pub fn bits(self) -> u8 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_default_is_public_and_plain() {
        let flags = Flags::default();
        assert_eq!(flags.access(), Access::Public);
        assert!(!flags.is_const());
        assert!(!flags.is_static());
        assert_eq!(flags.bits(), 0);
    }

    #[test]
    fn flags_access_and_modifiers_are_independent() {
        let flags = Flags::default()
            .with(Flags::STATIC)
            .with_access(Access::PrivateW)
            .with(Flags::CONST);
        assert_eq!(flags.access(), Access::PrivateW);
        assert!(flags.is_static());
        assert!(flags.is_const());
        assert!(!flags.is_hoisted());

        let flags = flags.with_access(Access::Protected);
        assert_eq!(flags.access(), Access::Protected);
        assert!(flags.is_static() && flags.is_const());
    }
}
