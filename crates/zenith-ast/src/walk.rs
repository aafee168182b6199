// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Pre-order traversal over a whole program.
//!
//! Every node, ErrorNodes included, is visited through `NodeRef`, so a
//! consumer can handle broken subtrees without special cases.

use crate::decl::{
    Decl, DeclKind, FunctionDecl, Member, MemberKind, OperatorDecl, Param, Program,
    TemplateParam, TemplateParamKind,
};
use crate::expr::{Expr, ExprKind, TemplatePart};
use crate::stmt::{Block, Stmt, StmtKind};
use crate::types::{Type, TypeKind};
use crate::{ErrorNode, SourceLocation};

/// A borrowed view of any node in the tree.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Program(&'a Program),
    Decl(&'a Decl),
    Member(&'a Member),
    Stmt(&'a Stmt),
    Expr(&'a Expr),
    Type(&'a Type),
}

impl<'a> NodeRef<'a> {
    pub fn loc(&self) -> SourceLocation {
        match self {
            NodeRef::Program(p) => p.loc,
            NodeRef::Decl(d) => d.loc,
            NodeRef::Member(m) => m.loc,
            NodeRef::Stmt(s) => s.loc,
            NodeRef::Expr(e) => e.loc,
            NodeRef::Type(t) => t.loc,
        }
    }

    /// The placeholder, if this node is one.
    pub fn as_error(&self) -> Option<&'a ErrorNode> {
        match *self {
            NodeRef::Decl(Decl { kind: DeclKind::Error(e), .. }) => Some(e),
            NodeRef::Member(Member { kind: MemberKind::Error(e), .. }) => Some(e),
            NodeRef::Stmt(Stmt { kind: StmtKind::Error(e), .. }) => Some(e),
            NodeRef::Expr(Expr { kind: ExprKind::Error(e), .. }) => Some(e),
            _ => None,
        }
    }
}

/// Visit `program` and every node below it, parents before children,
/// siblings left to right.
pub fn walk<'a>(program: &'a Program, visit: &mut dyn FnMut(NodeRef<'a>)) {
    visit(NodeRef::Program(program));
    for decl in &program.decls {
        walk_decl(decl, visit);
    }
}

/// Every ErrorNode in the tree, in source order.
pub fn error_nodes(program: &Program) -> Vec<&ErrorNode> {
    let mut found = Vec::new();
    walk(program, &mut |node| {
        if let Some(e) = node.as_error() {
            found.push(e);
        }
    });
    found
}

/// Number of nodes of all kinds in the tree.
pub fn node_count(program: &Program) -> usize {
    let mut count = 0;
    walk(program, &mut |_| count += 1);
    count
}

fn walk_decl<'a>(decl: &'a Decl, visit: &mut dyn FnMut(NodeRef<'a>)) {
    visit(NodeRef::Decl(decl));
    match &decl.kind {
        DeclKind::Function(f) => walk_function(f, visit),
        DeclKind::Object(obj) => {
            for member in &obj.members {
                walk_member(member, visit);
            }
        }
        DeclKind::Union(u) => {
            for ty in &u.variants {
                walk_type(ty, visit);
            }
        }
        DeclKind::Import(_) | DeclKind::Error(_) => {}
        DeclKind::Template(t) => {
            walk_template_params(&t.params, visit);
            walk_decl(&t.decl, visit);
        }
        DeclKind::Operator(op) => walk_operator(op, visit),
        DeclKind::Var(v) => {
            walk_opt_type(&v.ty, visit);
            if let Some(init) = &v.init {
                walk_expr(init, visit);
            }
        }
    }
}

fn walk_member<'a>(member: &'a Member, visit: &mut dyn FnMut(NodeRef<'a>)) {
    visit(NodeRef::Member(member));
    for ann in member.annotations.iter() {
        for arg in ann.args.iter() {
            walk_expr(&arg.value, visit);
        }
    }
    match &member.kind {
        MemberKind::Field(v) => {
            walk_opt_type(&v.ty, visit);
            if let Some(init) = &v.init {
                walk_expr(init, visit);
            }
        }
        MemberKind::Method(f) => walk_function(f, visit),
        MemberKind::Constructor(c) => {
            walk_params(&c.params, visit);
            for init in c.initializers.iter() {
                walk_expr(&init.value, visit);
            }
            walk_block(&c.body, visit);
        }
        MemberKind::Operator(op) => walk_operator(op, visit),
        MemberKind::Handler(h) => {
            walk_params(&h.params, visit);
            walk_opt_type(&h.ret_ty, visit);
            walk_block(&h.body, visit);
        }
        MemberKind::Error(_) => {}
    }
}

fn walk_function<'a>(f: &'a FunctionDecl, visit: &mut dyn FnMut(NodeRef<'a>)) {
    for ann in f.annotations.iter() {
        for arg in ann.args.iter() {
            walk_expr(&arg.value, visit);
        }
    }
    walk_params(&f.params, visit);
    walk_opt_type(&f.ret_ty, visit);
    walk_block(&f.body, visit);
}

fn walk_operator<'a>(op: &'a OperatorDecl, visit: &mut dyn FnMut(NodeRef<'a>)) {
    walk_params(&op.params, visit);
    walk_opt_type(&op.ret_ty, visit);
    walk_block(&op.body, visit);
}

fn walk_params<'a>(params: &'a [Param], visit: &mut dyn FnMut(NodeRef<'a>)) {
    for param in params {
        walk_opt_type(&param.ty, visit);
        if let Some(default) = &param.default {
            walk_expr(default, visit);
        }
    }
}

fn walk_template_params<'a>(params: &'a [TemplateParam], visit: &mut dyn FnMut(NodeRef<'a>)) {
    for param in params {
        match &param.kind {
            TemplateParamKind::Type { constraint, default } => {
                walk_opt_type(constraint, visit);
                walk_opt_type(default, visit);
            }
            TemplateParamKind::Value { ty, default } => {
                walk_type(ty, visit);
                if let Some(default) = default {
                    walk_expr(default, visit);
                }
            }
            TemplateParamKind::Template { params } => walk_template_params(params, visit),
        }
    }
}

fn walk_block<'a>(block: &'a Block, visit: &mut dyn FnMut(NodeRef<'a>)) {
    for stmt in &block.stmts {
        walk_stmt(stmt, visit);
    }
}

fn walk_stmt<'a>(stmt: &'a Stmt, visit: &mut dyn FnMut(NodeRef<'a>)) {
    visit(NodeRef::Stmt(stmt));
    match &stmt.kind {
        StmtKind::Block(b) => walk_block(b, visit),
        StmtKind::If { cond, then_branch, else_branch } => {
            walk_expr(cond, visit);
            walk_stmt(then_branch, visit);
            if let Some(e) = else_branch {
                walk_stmt(e, visit);
            }
        }
        StmtKind::While { cond, body } => {
            walk_expr(cond, visit);
            walk_stmt(body, visit);
        }
        StmtKind::DoWhile { body, cond } => {
            walk_stmt(body, visit);
            walk_expr(cond, visit);
        }
        StmtKind::For { init, cond, update, body } => {
            if let Some(init) = init {
                walk_stmt(init, visit);
            }
            if let Some(cond) = cond {
                walk_expr(cond, visit);
            }
            if let Some(update) = update {
                walk_expr(update, visit);
            }
            walk_stmt(body, visit);
        }
        StmtKind::Return(value) => {
            if let Some(v) = value {
                walk_expr(v, visit);
            }
        }
        StmtKind::Expr(e) => walk_expr(e, visit),
        StmtKind::Var(v) => {
            walk_opt_type(&v.ty, visit);
            if let Some(init) = &v.init {
                walk_expr(init, visit);
            }
        }
        StmtKind::Empty | StmtKind::Error(_) => {}
    }
}

fn walk_expr<'a>(expr: &'a Expr, visit: &mut dyn FnMut(NodeRef<'a>)) {
    visit(NodeRef::Expr(expr));
    match &expr.kind {
        ExprKind::Literal(_) | ExprKind::Var(_) | ExprKind::This | ExprKind::Error(_) => {}
        ExprKind::Binary { left, right, .. } => {
            walk_expr(left, visit);
            walk_expr(right, visit);
        }
        ExprKind::Unary { operand, .. } => walk_expr(operand, visit),
        ExprKind::Call { callee, type_args, args } => {
            walk_expr(callee, visit);
            for ty in type_args.iter() {
                walk_type(ty, visit);
            }
            for arg in args.iter() {
                walk_expr(arg, visit);
            }
        }
        ExprKind::Member { object, .. } => walk_expr(object, visit),
        ExprKind::Index { array, index } => {
            walk_expr(array, visit);
            walk_expr(index, visit);
        }
        ExprKind::New { ty, args } => {
            walk_type(ty, visit);
            for arg in args.iter() {
                walk_expr(arg, visit);
            }
        }
        ExprKind::Lambda(f) => walk_function(f, visit),
        ExprKind::TemplateString(parts) => {
            for part in parts.iter() {
                if let TemplatePart::Expr(e) = part {
                    walk_expr(e, visit);
                }
            }
        }
        ExprKind::StructInit { fields, .. } => {
            for field in fields {
                walk_expr(&field.value, visit);
            }
        }
        ExprKind::FreeObject(props) => {
            for prop in props.iter() {
                walk_expr(&prop.value, visit);
            }
        }
    }
}

fn walk_opt_type<'a>(ty: &'a Option<Type>, visit: &mut dyn FnMut(NodeRef<'a>)) {
    if let Some(ty) = ty {
        walk_type(ty, visit);
    }
}

fn walk_type<'a>(ty: &'a Type, visit: &mut dyn FnMut(NodeRef<'a>)) {
    visit(NodeRef::Type(ty));
    match &ty.kind {
        TypeKind::Primitive(_) | TypeKind::Named(_) => {}
        TypeKind::Array(elem) => walk_type(elem, visit),
        TypeKind::Template { args, .. } => {
            for arg in args.iter() {
                walk_type(arg, visit);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{VarDecl, VarKind};
    use crate::expr::{BinOp, Literal};
    use crate::token::NumSuffix;
    use crate::{NodeId, Span};

    fn loc(offset: usize, length: usize) -> SourceLocation {
        SourceLocation::new(1, offset as u32 + 1, offset, length)
    }

    fn int(value: i64, offset: usize) -> Expr {
        Expr {
            id: NodeId(0),
            kind: ExprKind::Literal(Literal::Int(value, NumSuffix::None)),
            loc: loc(offset, 1),
        }
    }

    fn sample() -> Program {
        // let x = 1 + <broken>;
        let sum = Expr {
            id: NodeId(2),
            kind: ExprKind::Binary {
                op: BinOp::Add,
                left: Box::new(int(1, 8)),
                right: Box::new(Expr {
                    id: NodeId(3),
                    kind: ExprKind::Error(ErrorNode { loc: loc(12, 1), replaced: Span::new(12, 13) }),
                    loc: loc(12, 1),
                }),
            },
            loc: loc(8, 5),
        };
        let var = Decl {
            id: NodeId(4),
            kind: DeclKind::Var(VarDecl {
                kind: VarKind::Dynamic,
                name: "x".into(),
                ty: None,
                init: Some(sum),
                hoisted: false,
                is_const: false,
            }),
            loc: loc(0, 14),
        };
        let broken = Decl {
            id: NodeId(5),
            kind: DeclKind::Error(ErrorNode { loc: loc(15, 3), replaced: Span::new(15, 18) }),
            loc: loc(15, 3),
        };
        Program { decls: vec![var, broken], loc: loc(0, 18) }
    }

    #[test]
    fn walk_visits_parents_first() {
        let program = sample();
        let mut offsets = Vec::new();
        walk(&program, &mut |node| offsets.push(node.loc().offset));
        assert_eq!(offsets, [0, 0, 8, 8, 12, 15]);
        assert_eq!(node_count(&program), 6);
    }

    #[test]
    fn error_nodes_found_in_order() {
        let program = sample();
        let errors = error_nodes(&program);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].replaced, Span::new(12, 13));
        assert_eq!(errors[1].loc.offset, 15);
    }
}
