//! Parser for the Zenith language.
//!
//! Transforms a token stream into an abstract syntax tree. Parsing never
//! stops at the first problem: every syntax error is reported and the
//! broken region is kept in the tree as an ErrorNode.

mod error;
mod hints;
mod parser;

pub use error::{ParseError, ParseErrorKind};
pub use parser::{ParseResult, Parser, MAX_NESTING};

use zenith_ast::ErrorReporter;
use zenith_lexer::Lexer;

/// Lex and parse `source`. `name` labels the diagnostics.
pub fn parse(source: &str, name: &str) -> ParseResult {
    let mut reporter = ErrorReporter::new(name);
    let program = Parser::new(Lexer::new(source), &mut reporter).parse();
    ParseResult { program, reporter }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use zenith_ast::decl::{
        Access, DeclKind, FunctionDecl, ImportTarget, MemberKind, ObjectKind, OverloadOp, Program,
        TemplateParamKind, VarKind,
    };
    use zenith_ast::expr::{BinOp, Expr, ExprKind, Literal, TemplatePart};
    use zenith_ast::stmt::{Block, BlockKind, Stmt, StmtKind};
    use zenith_ast::token::NumSuffix;
    use zenith_ast::types::{Primitive, TypeKind};
    use zenith_ast::walk::{error_nodes, walk, NodeRef};
    use zenith_ast::SourceLocation;

    fn parse_ok(src: &str) -> Program {
        let result = parse(src, "test.zn");
        assert!(result.reporter.is_empty(), "Diagnostics: {:?}", result.reporter.diagnostics());
        assert!(error_nodes(&result.program).is_empty());
        result.program
    }

    fn expr(src: &str) -> Expr {
        let mut reporter = ErrorReporter::new("expr.zn");
        let expr = Parser::new(Lexer::new(src), &mut reporter).parse_expr().expect("expression");
        assert!(reporter.is_empty(), "Diagnostics: {:?}", reporter.diagnostics());
        expr
    }

    fn function(program: &Program, index: usize) -> &FunctionDecl {
        let DeclKind::Function(ref f) = program.decls[index].kind else {
            panic!("Expected function, got {:?}", program.decls[index].kind);
        };
        f
    }

    fn body(program: &Program) -> &[Stmt] {
        &function(program, 0).body.stmts
    }

    /// Deep inputs run on a thread with room for `MAX_NESTING` levels.
    fn parse_on_big_stack(src: String) -> ParseResult {
        std::thread::Builder::new()
            .stack_size(32 * 1024 * 1024)
            .spawn(move || parse(&src, "deep.zn"))
            .expect("spawn parser thread")
            .join()
            .expect("parser thread panicked")
    }

    fn demo_sources() -> Vec<(String, String)> {
        let demos_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .parent().unwrap()
            .parent().unwrap()
            .join("demos");
        let mut sources = Vec::new();
        for entry in std::fs::read_dir(&demos_dir).expect("demos directory not found") {
            let path = entry.unwrap().path();
            if path.extension().map(|e| e == "zn").unwrap_or(false) {
                let src = std::fs::read_to_string(&path)
                    .unwrap_or_else(|_| panic!("Failed to read {}", path.display()));
                sources.push((path.display().to_string(), src));
            }
        }
        sources
    }

    fn assert_in_order(name: &str, what: &str, locs: &[SourceLocation]) {
        for pair in locs.windows(2) {
            assert!(
                pair[0].end() <= pair[1].offset,
                "{}: {} overlap or go backwards: {:?} then {:?}",
                name, what, pair[0], pair[1]
            );
        }
    }

    fn stmt_locs(block: &Block) -> Vec<SourceLocation> {
        block.stmts.iter().map(|s| s.loc).collect()
    }

    /// Siblings in every list of the tree must not overlap and must
    /// follow source order.
    fn check_sibling_order(name: &str, program: &Program) {
        let decls: Vec<_> = program.decls.iter().map(|d| d.loc).collect();
        assert_in_order(name, "declarations", &decls);

        walk(program, &mut |node| match node {
            NodeRef::Decl(d) => match &d.kind {
                DeclKind::Function(f) => assert_in_order(name, "statements", &stmt_locs(&f.body)),
                DeclKind::Operator(op) => assert_in_order(name, "statements", &stmt_locs(&op.body)),
                DeclKind::Object(obj) => {
                    let members: Vec<_> = obj.members.iter().map(|m| m.loc).collect();
                    assert_in_order(name, "members", &members);
                }
                _ => {}
            },
            NodeRef::Member(m) => {
                let body = match &m.kind {
                    MemberKind::Method(f) => Some(&f.body),
                    MemberKind::Constructor(c) => Some(&c.body),
                    MemberKind::Operator(op) => Some(&op.body),
                    MemberKind::Handler(h) => Some(&h.body),
                    MemberKind::Field(_) | MemberKind::Error(_) => None,
                };
                if let Some(body) = body {
                    assert_in_order(name, "statements", &stmt_locs(body));
                }
            }
            NodeRef::Stmt(Stmt { kind: StmtKind::Block(b), .. }) => {
                assert_in_order(name, "statements", &stmt_locs(b));
            }
            NodeRef::Expr(e) => match &e.kind {
                ExprKind::Call { args, .. } | ExprKind::New { args, .. } => {
                    let args: Vec<_> = args.iter().map(|a| a.loc).collect();
                    assert_in_order(name, "arguments", &args);
                }
                ExprKind::Lambda(f) => assert_in_order(name, "statements", &stmt_locs(&f.body)),
                _ => {}
            },
            _ => {}
        });
    }

    #[test]
    fn parse_all_demos() {
        let sources = demo_sources();
        assert!(!sources.is_empty());
        for (name, src) in &sources {
            let result = parse(src, name);
            assert!(result.is_ok(), "Errors in {}: {:?}", name, result.reporter.diagnostics());
            assert!(error_nodes(&result.program).is_empty(), "ErrorNodes in {}", name);
        }
    }

    #[test]
    fn sibling_locations_follow_source_order() {
        for (name, src) in &demo_sources() {
            check_sibling_order(name, &parse(src, name).program);
        }

        let broken = "fun a() { let = 1; foo(1, 2; bar(3) }\n\
                      class B { int ; int x y; fun ok() { g((1), h(2, 3)); } }\n\
                      ) fun c() { new K(1, (2)); }\n\
                      fun d() { if (x) {";
        let result = parse(broken, "broken.zn");
        assert!(error_nodes(&result.program).len() >= 4);
        check_sibling_order("broken.zn", &result.program);
    }

    #[test]
    fn parse_empty_program() {
        let program = parse_ok("");
        assert!(program.decls.is_empty());
        let program = parse_ok("// just a comment\n");
        assert!(program.decls.is_empty());
    }

    #[test]
    fn parse_simple_function() {
        let program = parse_ok("fun main() {\n    let x = 1 + 2\n    print(x)\n}");
        let f = function(&program, 0);
        assert_eq!(f.name, "main");
        assert!(f.ret_ty.is_none());
        assert_eq!(f.body.stmts.len(), 2);
        assert_eq!(program.decls[0].loc.line, 1);
        assert_eq!(program.decls[0].loc.length, program.decls[0].loc.end() - program.decls[0].loc.offset);
    }

    #[test]
    fn parse_function_return_types() {
        let program = parse_ok("fun int add(int a, int b) { return a + b; }\nfun sub(a, b) -> int { return a - b; }\nstring name() { return \"z\"; }");
        for i in 0..3 {
            let f = function(&program, i);
            assert!(f.ret_ty.is_some(), "{} has no return type", f.name);
        }
        let add = function(&program, 0);
        assert_eq!(add.params.len(), 2);
        assert!(matches!(add.params[0].ty.as_ref().map(|t| &t.kind), Some(TypeKind::Primitive(Primitive::Int))));
        let sub = function(&program, 1);
        assert!(sub.params.iter().all(|p| p.ty.is_none()));
    }

    #[test]
    fn parse_struct_sugar_params_and_defaults() {
        let program = parse_ok("fun draw({ x, y = 0, string label = \"p\" }) {}");
        let f = function(&program, 0);
        assert!(f.struct_sugar);
        assert_eq!(f.params.len(), 3);
        assert!(f.params[1].default.is_some());
        assert!(f.params[2].ty.is_some());
    }

    #[test]
    fn parse_actor() {
        let program = parse_ok("actor Foo { }");
        let DeclKind::Object(ref obj) = program.decls[0].kind else {
            panic!("Expected object");
        };
        assert_eq!(obj.kind, ObjectKind::Actor);
        assert!(obj.is_actor());
        assert!(obj.members.is_empty());
    }

    #[test]
    fn parse_actor_handlers() {
        let program = parse_ok("actor Counter {\n    int n = 0;\n    on Increment(int by) { n += by; }\n    on Get() -> int { return n; }\n}");
        let DeclKind::Object(ref obj) = program.decls[0].kind else {
            panic!("Expected object");
        };
        assert_eq!(obj.members.len(), 3);
        let MemberKind::Handler(ref h) = obj.members[1].kind else {
            panic!("Expected handler, got {:?}", obj.members[1].kind);
        };
        assert_eq!(h.message, "Increment");
        assert_eq!(h.params.len(), 1);
        assert!(matches!(obj.members[2].kind, MemberKind::Handler(ref h) if h.ret_ty.is_some()));
    }

    #[test]
    fn handler_outside_actor_is_error() {
        let result = parse("class C { on Ping() {} }", "test.zn");
        let reports = result.reporter.diagnostics();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].kind, "UnexpectedToken");
        assert_eq!(reports[0].hint.as_deref(), Some("message handlers are only allowed in actors"));
    }

    #[test]
    fn parse_class_members() {
        let src = "class Point : Base {\n\
                   public const int x = 1;\n\
                   private static hoist let y = 2;\n\
                   Point(int x, y) : x(x), y(y) { }\n\
                   fun int len() { return x; }\n\
                   operator + (Point other) -> Point { return new Point(x + other.x, 0); }\n\
                   operator [] (int i) -> int { return x; }\n\
                   @Inline int area() -> int { return 0; }\n\
                   }";
        let program = parse_ok(src);
        let DeclKind::Object(ref obj) = program.decls[0].kind else {
            panic!("Expected object");
        };
        assert_eq!(obj.kind, ObjectKind::Class);
        assert_eq!(obj.base.as_deref(), Some("Base"));
        assert_eq!(obj.members.len(), 7);

        let x = &obj.members[0];
        assert_eq!(x.flags.access(), Access::Public);
        assert!(x.flags.is_const());
        assert!(matches!(x.kind, MemberKind::Field(ref v) if v.kind == VarKind::Static && v.is_const));

        let y = &obj.members[1];
        assert_eq!(y.flags.access(), Access::Private);
        assert!(y.flags.is_static() && y.flags.is_hoisted());
        assert!(matches!(y.kind, MemberKind::Field(ref v) if v.hoisted && v.kind == VarKind::Dynamic));

        let MemberKind::Constructor(ref ctor) = obj.members[2].kind else {
            panic!("Expected constructor, got {:?}", obj.members[2].kind);
        };
        assert_eq!(ctor.params.len(), 2);
        assert_eq!(ctor.initializers.len(), 2);
        assert_eq!(ctor.initializers[1].member, "y");

        assert!(matches!(obj.members[3].kind, MemberKind::Method(ref m) if m.name == "len"));
        assert!(matches!(obj.members[4].kind, MemberKind::Operator(ref o) if o.op == OverloadOp::Add));
        assert!(matches!(obj.members[5].kind, MemberKind::Operator(ref o) if o.op == OverloadOp::Index));

        let area = &obj.members[6];
        assert_eq!(area.annotations.len(), 1);
        assert_eq!(area.annotations[0].name, "Inline");
        assert!(matches!(area.kind, MemberKind::Method(ref m) if m.name == "area"));
    }

    #[test]
    fn comparison_chain_is_not_template() {
        let program = parse_ok("fun f() { a < b > c; }");
        let StmtKind::Expr(ref e) = body(&program)[0].kind else {
            panic!("Expected expression statement");
        };
        let ExprKind::Binary { op: BinOp::Gt, ref left, .. } = e.kind else {
            panic!("Expected '>', got {:?}", e.kind);
        };
        assert!(matches!(left.kind, ExprKind::Binary { op: BinOp::Lt, .. }));
    }

    #[test]
    fn template_in_type_position() {
        let program = parse_ok("let v: a<b> = c;");
        let DeclKind::Var(ref v) = program.decls[0].kind else {
            panic!("Expected variable");
        };
        assert_eq!(v.kind, VarKind::Static);
        let Some(TypeKind::Template { ref base, ref args }) = v.ty.as_ref().map(|t| &t.kind) else {
            panic!("Expected template type, got {:?}", v.ty);
        };
        assert_eq!(base, "a");
        assert_eq!(args.len(), 1);

        let mut reporter = ErrorReporter::new("type.zn");
        let ty = Parser::new(Lexer::new("a < b > c"), &mut reporter).parse_type().expect("type");
        assert_eq!(ty.to_string(), "a<b>");
    }

    #[test]
    fn nested_template_types_and_calls() {
        let program = parse_ok("Map<string, List<int>> m = make(f(g(1)), 2);");
        let DeclKind::Var(ref v) = program.decls[0].kind else {
            panic!("Expected variable, got {:?}", program.decls[0].kind);
        };
        let ty = v.ty.as_ref().expect("declared type");
        assert_eq!(ty.to_string(), "Map<string, List<int>>");
        let TypeKind::Template { ref args, .. } = ty.kind else {
            panic!("Expected template type, got {:?}", ty.kind);
        };
        assert!(matches!(args[1].kind, TypeKind::Template { ref base, ref args } if base == "List" && args.len() == 1));

        let init = v.init.as_ref().expect("initializer");
        let ExprKind::Call { ref args, .. } = init.kind else {
            panic!("Expected call, got {:?}", init.kind);
        };
        assert_eq!(args.len(), 2);
        let ExprKind::Call { ref callee, args: ref inner, .. } = args[0].kind else {
            panic!("Expected nested call, got {:?}", args[0].kind);
        };
        assert_eq!(callee.kind, ExprKind::Var("f".into()));
        assert!(matches!(inner[0].kind, ExprKind::Call { ref args, .. } if args.len() == 1));
    }

    #[test]
    fn template_call_with_type_args() {
        let e = expr("make<int, Map<string, Foo>>(1)");
        let ExprKind::Call { ref type_args, ref args, .. } = e.kind else {
            panic!("Expected call, got {:?}", e.kind);
        };
        assert_eq!(type_args.len(), 2);
        assert_eq!(type_args[1].to_string(), "Map<string, Foo>");
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn template_string_interpolation() {
        let e = expr("\"x=${1+2}\"");
        let ExprKind::TemplateString(ref parts) = e.kind else {
            panic!("Expected template string, got {:?}", e.kind);
        };
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], TemplatePart::Text("x=".into()));
        let TemplatePart::Expr(ref inner) = parts[1] else {
            panic!("Expected embedded expression");
        };
        let ExprKind::Binary { op: BinOp::Add, ref left, ref right } = inner.kind else {
            panic!("Expected '+', got {:?}", inner.kind);
        };
        assert_eq!(left.kind, ExprKind::Literal(Literal::Int(1, NumSuffix::None)));
        assert_eq!(right.kind, ExprKind::Literal(Literal::Int(2, NumSuffix::None)));
    }

    #[test]
    fn unsafe_and_scope_blocks() {
        let program = parse_ok("fun f() { unsafe { a; b; } scope { c; } }");
        let stmts = body(&program);
        let StmtKind::Block(ref unsafe_block) = stmts[0].kind else {
            panic!("Expected block");
        };
        assert!(unsafe_block.is_unsafe());
        assert_eq!(unsafe_block.stmts.len(), 2);
        assert!(matches!(stmts[1].kind, StmtKind::Block(ref b) if b.kind == BlockKind::Scope));
    }

    #[test]
    fn operator_precedence() {
        let e = expr("a = b || c && d == e + f * -g.h");
        let ExprKind::Binary { op: BinOp::Assign, ref right, .. } = e.kind else {
            panic!("Expected assignment");
        };
        let ExprKind::Binary { op: BinOp::Or, right: ref and, .. } = right.kind else {
            panic!("Expected '||'");
        };
        let ExprKind::Binary { op: BinOp::And, right: ref eq, .. } = and.kind else {
            panic!("Expected '&&'");
        };
        let ExprKind::Binary { op: BinOp::Eq, right: ref add, .. } = eq.kind else {
            panic!("Expected '=='");
        };
        let ExprKind::Binary { op: BinOp::Add, right: ref mul, .. } = add.kind else {
            panic!("Expected '+'");
        };
        let ExprKind::Binary { op: BinOp::Mul, right: ref neg, .. } = mul.kind else {
            panic!("Expected '*'");
        };
        let ExprKind::Unary { ref operand, .. } = neg.kind else {
            panic!("Expected unary");
        };
        assert!(matches!(operand.kind, ExprKind::Member { .. }));
    }

    #[test]
    fn assignment_is_right_associative() {
        let e = expr("a = b += c");
        let ExprKind::Binary { op: BinOp::Assign, ref right, .. } = e.kind else {
            panic!("Expected assignment");
        };
        assert!(matches!(right.kind, ExprKind::Binary { op: BinOp::AddAssign, .. }));
    }

    #[test]
    fn paren_expr_location_covers_parens() {
        let e = expr("(1 + 2) * 3");
        let ExprKind::Binary { ref left, .. } = e.kind else {
            panic!("Expected binary");
        };
        assert_eq!(left.loc.offset, 0);
        assert_eq!(left.loc.length, 7);
        assert_eq!(e.loc.length, 11);
    }

    #[test]
    fn lambdas() {
        let e = expr("(a, b) => a + b");
        let ExprKind::Lambda(ref f) = e.kind else {
            panic!("Expected lambda, got {:?}", e.kind);
        };
        assert!(f.is_lambda);
        assert_eq!(f.params.len(), 2);
        assert!(matches!(f.body.stmts[0].kind, StmtKind::Return(Some(_))));

        let e = expr("x => { return x * 2; }");
        assert!(matches!(e.kind, ExprKind::Lambda(ref f) if f.params.len() == 1));

        // A parenthesized expression is not mistaken for parameters
        let e = expr("(a) + b");
        assert!(matches!(e.kind, ExprKind::Binary { op: BinOp::Add, .. }));
    }

    #[test]
    fn calls_members_and_indexing() {
        let e = expr("list.get(0)[1].name");
        let ExprKind::Member { ref object, ref member } = e.kind else {
            panic!("Expected member");
        };
        assert_eq!(member, "name");
        let ExprKind::Index { ref array, .. } = object.kind else {
            panic!("Expected index");
        };
        assert!(matches!(array.kind, ExprKind::Call { ref args, .. } if args.len() == 1));
    }

    #[test]
    fn free_objects() {
        let e = expr("{ name: \"z\", \"age\": 3, nested: freeobj { ok: true } }");
        let ExprKind::FreeObject(ref props) = e.kind else {
            panic!("Expected free object, got {:?}", e.kind);
        };
        assert_eq!(props.len(), 3);
        assert_eq!(props[1].key, "age");
        assert!(matches!(props[2].value.kind, ExprKind::FreeObject(ref p) if p.len() == 1));
    }

    #[test]
    fn variable_kinds_and_struct_init() {
        let program = parse_ok(
            "fun f() {\n\
             Point p = {.x = 1, .y = 2};\n\
             Point q = {1, 2};\n\
             Point r = new Point(1, 2);\n\
             int n = 5;\n\
             let d = 3;\n\
             dynamic e = 4;\n\
             int[] xs = arr;\n\
             [string] names = other;\n\
             }",
        );
        let kinds: Vec<(VarKind, bool)> = body(&program)
            .iter()
            .map(|s| match s.kind {
                StmtKind::Var(ref v) => (
                    v.kind,
                    matches!(v.init.as_ref().map(|e| &e.kind), Some(ExprKind::StructInit { positional: true, .. })),
                ),
                ref other => panic!("Expected variable, got {:?}", other),
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                (VarKind::ClassInit, false),
                (VarKind::ClassInit, true),
                (VarKind::ClassInit, false),
                (VarKind::Static, false),
                (VarKind::Dynamic, false),
                (VarKind::Dynamic, false),
                (VarKind::Static, false),
                (VarKind::Static, false),
            ]
        );
    }

    #[test]
    fn control_flow() {
        let program = parse_ok(
            "fun f() {\n\
             if (a) b(); else { c(); }\n\
             while (x < 10) x += 1;\n\
             do { y(); } while (z);\n\
             for (int i = 0; i < n; i += 1) { }\n\
             for (;;) { return; }\n\
             }",
        );
        let stmts = body(&program);
        assert!(matches!(stmts[0].kind, StmtKind::If { else_branch: Some(_), .. }));
        assert!(matches!(stmts[1].kind, StmtKind::While { .. }));
        assert!(matches!(stmts[2].kind, StmtKind::DoWhile { .. }));
        assert!(matches!(
            stmts[3].kind,
            StmtKind::For { init: Some(ref i), cond: Some(_), update: Some(_), .. } if matches!(i.kind, StmtKind::Var(_))
        ));
        assert!(matches!(stmts[4].kind, StmtKind::For { init: None, cond: None, update: None, .. }));
    }

    #[test]
    fn imports() {
        let program = parse_ok("import std.io;\nimport java java.util.List\nimport \"lib/util.zn\";");
        let targets: Vec<&ImportTarget> = program
            .decls
            .iter()
            .map(|d| match d.kind {
                DeclKind::Import(ref i) => &i.target,
                ref other => panic!("Expected import, got {:?}", other),
            })
            .collect();
        assert_eq!(targets[0], &ImportTarget::Module(vec!["std".into(), "io".into()]));
        assert_eq!(targets[1], &ImportTarget::Java(vec!["java".into(), "util".into(), "List".into()]));
        assert_eq!(targets[2], &ImportTarget::File("lib/util.zn".into()));
    }

    #[test]
    fn templates() {
        let program = parse_ok(
            "template<typename T : Comparable = int, int N = 4, typename... Rest>\nclass Box { T value; }",
        );
        let DeclKind::Template(ref t) = program.decls[0].kind else {
            panic!("Expected template");
        };
        assert_eq!(t.params.len(), 3);
        assert!(matches!(
            t.params[0].kind,
            TemplateParamKind::Type { constraint: Some(_), default: Some(_) }
        ));
        assert!(matches!(t.params[1].kind, TemplateParamKind::Value { default: Some(_), .. }));
        assert!(t.params[2].variadic);
        assert!(matches!(t.decl.kind, DeclKind::Object(ref o) if o.name == "Box"));
    }

    #[test]
    fn unions() {
        let program = parse_ok("union Value { int, string, Foo, [int] }");
        let DeclKind::Union(ref u) = program.decls[0].kind else {
            panic!("Expected union");
        };
        assert_eq!(u.variants.len(), 4);
    }

    #[test]
    fn dynamic_union_variant_is_reported() {
        let result = parse("union U { int, dynamic, Foo }", "test.zn");
        let reports = result.reporter.diagnostics();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].kind, "InvalidUnionVariant");
        assert_eq!(reports[0].loc.offset, 15);
        let DeclKind::Union(ref u) = result.program.decls[0].kind else {
            panic!("Expected union");
        };
        assert_eq!(u.variants.len(), 2);
    }

    #[test]
    fn annotations() {
        let program = parse_ok("@Inline @Deprecated(reason = \"old\", 2) fun f() {}\n@Pure operator ! (A a) -> bool { return false; }");
        let f = function(&program, 0);
        assert_eq!(f.annotations.len(), 2);
        assert_eq!(f.annotations[1].args.len(), 2);
        assert_eq!(f.annotations[1].args[0].name.as_deref(), Some("reason"));
        assert!(f.annotations[1].args[1].name.is_none());
        assert!(matches!(program.decls[1].kind, DeclKind::Operator(ref o) if o.annotations.len() == 1));
        // The declaration span includes its annotations
        assert_eq!(program.decls[0].loc.offset, 0);
    }

    #[test]
    fn misplaced_annotation_is_reported() {
        let result = parse("@Inline class A {}\nfun f() { @Pure let x = 1; }", "test.zn");
        let reports = result.reporter.diagnostics();
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.kind == "MisplacedAnnotation"));
        assert!(matches!(result.program.decls[0].kind, DeclKind::Object(_)));
        assert!(error_nodes(&result.program).is_empty());
    }

    #[test]
    fn missing_paren_single_diagnostic() {
        let result = parse("fun main() {\n foo(1, 2;\n bar();\n}", "test.zn");
        let reports = result.reporter.diagnostics();
        assert_eq!(reports.len(), 1, "{:?}", reports);
        assert_eq!(reports[0].kind, "MissingDelimiter");
        assert_eq!(reports[0].message, "expected ')' to close '(', found ';'");
        assert_eq!((reports[0].loc.line, reports[0].loc.column), (2, 10));

        assert_eq!(error_nodes(&result.program).len(), 1);
        let stmts = &function(&result.program, 0).body.stmts;
        assert_eq!(stmts.len(), 2);
        assert!(stmts[0].is_error());
        let StmtKind::Expr(ref call) = stmts[1].kind else {
            panic!("Expected bar() to survive, got {:?}", stmts[1].kind);
        };
        assert!(matches!(call.kind, ExprKind::Call { ref callee, .. } if callee.kind == ExprKind::Var("bar".into())));
    }

    #[test]
    fn every_error_has_a_node() {
        let result = parse("fun a() { let = 1; }\nclass B { int ; fun ok() {} }\n) fun c() {}", "test.zn");
        assert_eq!(result.reporter.error_count(), 3, "{:?}", result.reporter.diagnostics());
        assert_eq!(error_nodes(&result.program).len(), 3);
        // Recovery keeps the good parts
        assert!(matches!(result.program.decls.last().map(|d| &d.kind), Some(DeclKind::Function(f)) if f.name == "c"));
    }

    #[test]
    fn error_nodes_cover_skipped_tokens() {
        let src = "let x = ;\nfun f() {}";
        let result = parse(src, "test.zn");
        let nodes = error_nodes(&result.program);
        assert_eq!(nodes.len(), 1);
        assert_eq!(&src[nodes[0].replaced.start..nodes[0].replaced.end], "let x = ;");
        assert!(matches!(result.program.decls[1].kind, DeclKind::Function(_)));
    }

    #[test]
    fn unterminated_block() {
        let result = parse("fun f() {\n    let x = 1;\n", "test.zn");
        let reports = result.reporter.diagnostics();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].kind, "UnterminatedBlock");
        assert_eq!(reports[0].hint.as_deref(), Some("the block opened on line 1 is never closed"));
        let f = function(&result.program, 0);
        assert!(f.body.stmts.last().map(Stmt::is_error).unwrap_or(false));
    }

    #[test]
    fn lexer_errors_are_not_reported_twice() {
        for src in [
            "fun f() { let x = 12abc; }",
            "fun f() { # }",
            "fun f() { foo(~); }",
            "class A { # }",
            "$ fun f() {}",
        ] {
            let result = parse(src, "test.zn");
            assert_eq!(result.reporter.len(), 1, "{}: {:?}", src, result.reporter.diagnostics());
        }
    }

    #[test]
    fn garbage_terminates() {
        let inputs = [
            "}}}{{(((]]] ;;; fun ( class",
            "((((((((((((((((((((",
            "class class class { { {",
            "fun fun fun",
            "a < < < b > > > (",
            "\"${ \"${ \"${",
            "@ @ @ @",
            "template < template < typename",
            "union { , , }",
            "for (;;",
        ];
        for src in inputs {
            let result = parse(src, "garbage.zn");
            assert!(!result.is_ok(), "{} should not parse", src);
            assert!(!error_nodes(&result.program).is_empty() || result.reporter.error_count() > 0);
        }
    }

    #[test]
    fn every_prefix_terminates() {
        let src = "import std.io;\nclass A : B { public int x = 1; A(int x) : x(x) {} fun get() { return this.x; } }\n\
                   fun main() { let a = new A(1); if (a.get() > 0) { print(\"v=${a.get()}\"); } }\n";
        for end in 0..=src.len() {
            let result = parse(&src[..end], "prefix.zn");
            assert!(result.program.loc.offset == 0);
        }
    }

    #[test]
    fn second_name_on_a_line_asks_for_separator() {
        let result = parse("class A { int x y; }", "test.zn");
        let reports = result.reporter.diagnostics();
        assert_eq!(reports.len(), 1, "{:?}", reports);
        assert_eq!(reports[0].kind, "UnexpectedToken");
        assert_eq!(reports[0].message, "expected ';' or '=', found identifier");
        assert_eq!((reports[0].loc.line, reports[0].loc.column), (1, 17));
        assert_eq!(
            reports[0].hint.as_deref(),
            Some("end the declaration with ';' or give it a value with '='")
        );

        // A line break ends the declaration
        parse_ok("class A {\n    int x\n    y z\n}");
    }

    #[test]
    fn nesting_below_the_limit_parses() {
        let depth = 200;
        let src = format!("fun f() {{ x = {}1{}; }}", "(".repeat(depth), ")".repeat(depth));
        let result = parse_on_big_stack(src);
        assert!(result.is_ok(), "{:?}", result.reporter.diagnostics());
    }

    #[test]
    fn deep_parens_report_one_error() {
        let depth = 10_000;
        let src = format!("fun f() {{ x = {}1{}; }}\nfun g() {{}}", "(".repeat(depth), ")".repeat(depth));
        let result = parse_on_big_stack(src);
        let reports = result.reporter.diagnostics();
        assert_eq!(reports.len(), 1, "{:?}", reports);
        assert_eq!(reports[0].kind, "NestingTooDeep");
        assert_eq!(reports[0].code, Some("E0107"));
        assert_eq!(reports[0].message, format!("nesting is deeper than {} levels", MAX_NESTING));
        assert_eq!(error_nodes(&result.program).len(), 1);
        assert_eq!(result.program.decls.len(), 2);
        assert!(body(&result.program)[0].is_error());
        assert_eq!(function(&result.program, 1).name, "g");
    }

    #[test]
    fn deep_blocks_report_one_error() {
        let depth = 10_000;
        let src = format!("fun f() {}{}\nfun g() {{}}", "{".repeat(depth), "}".repeat(depth));
        let result = parse_on_big_stack(src);
        let reports = result.reporter.diagnostics();
        assert_eq!(reports.len(), 1, "{:?}", reports);
        assert_eq!(reports[0].kind, "NestingTooDeep");
        assert_eq!(error_nodes(&result.program).len(), 1);
        assert_eq!(result.program.decls.len(), 2);
        assert_eq!(function(&result.program, 1).name, "g");
    }

    #[test]
    fn node_ids_are_unique() {
        let program = parse_ok("fun f(a) { let b = a + 1; return g(b, (c) => c); }\nclass K { int z; }");
        let mut ids = HashSet::new();
        walk(&program, &mut |node| {
            let id = match node {
                NodeRef::Decl(d) => Some(d.id),
                NodeRef::Member(m) => Some(m.id),
                NodeRef::Stmt(s) => Some(s.id),
                NodeRef::Expr(e) => Some(e.id),
                _ => None,
            };
            if let Some(id) = id {
                assert!(ids.insert(id), "duplicate {:?}", id);
            }
        });
        assert!(ids.len() > 10);
    }
}
