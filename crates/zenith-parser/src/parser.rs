// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The parser implementation using Pratt parsing for expressions.

use std::collections::VecDeque;

use zenith_ast::decl::{
    Access, Annotation, AnnotationArg, ConstructorDecl, Decl, DeclKind, Flags, FunctionDecl,
    HandlerDecl, ImportDecl, ImportTarget, Member, MemberInit, MemberKind, ObjectDecl, ObjectKind,
    OperatorDecl, OverloadOp, Param, Program, TemplateDecl, TemplateParam, TemplateParamKind,
    UnionDecl, VarDecl, VarKind,
};
use zenith_ast::expr::{BinOp, Expr, ExprKind, FieldInit, Literal, Property, TemplatePart, UnaryOp};
use zenith_ast::stmt::{Block, BlockKind, Stmt, StmtKind};
use zenith_ast::token::{Token, TokenKind};
use zenith_ast::types::{Primitive, Type, TypeKind};
use zenith_ast::{ErrorNode, ErrorReporter, NodeId, NodeList, SourceLocation};
use zenith_lexer::Lexer;

use crate::error::ParseError;

/// Tokens scanned past `<` when deciding whether it opens template arguments.
const TEMPLATE_LOOKAHEAD: usize = 64;

/// Tokens scanned past `(` when deciding whether it opens lambda parameters.
const LAMBDA_LOOKAHEAD: usize = 128;

/// Deepest nesting of declarations, statements, expressions and types.
pub const MAX_NESTING: usize = 256;

static EOF: TokenKind = TokenKind::Eof;

/// The parser for Zenith source code.
///
/// Pulls tokens from the lexer on demand. Lookahead beyond the current
/// token is buffered only while a production needs it to disambiguate.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    reporter: &'a mut ErrorReporter,
    current: Token,
    lookahead: VecDeque<Token>,
    /// End offset of the last consumed token
    prev_end: usize,
    /// Line of the last consumed token
    prev_line: u32,
    /// Number of tokens consumed so far, for forward-progress checks
    consumed: usize,
    /// Counter for generating unique NodeIds
    next_node_id: u32,
    /// Name and kind of the object whose body is being parsed
    object: Option<(String, ObjectKind)>,
    /// Recursion depth, bounded by `MAX_NESTING`
    depth: usize,
}

/// A declaration that starts with a written type: `int f() {}` or `int x = 1`.
enum TypedDecl {
    Function(FunctionDecl),
    Var(VarDecl),
}

impl<'a> Parser<'a> {
    pub fn new(mut lexer: Lexer<'a>, reporter: &'a mut ErrorReporter) -> Self {
        let current = lexer.next_token(reporter);
        Self {
            lexer,
            reporter,
            current,
            lookahead: VecDeque::new(),
            prev_end: 0,
            prev_line: 1,
            consumed: 0,
            next_node_id: 0,
            object: None,
            depth: 0,
        }
    }

    /// Run a recursive production one level deeper. Past `MAX_NESTING`
    /// the production fails and the nearest recovery point takes over.
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T, ParseError>) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::nesting_too_deep(MAX_NESTING, self.current.loc));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    /// Record a syntax error in the shared sink.
    fn record_error(&mut self, error: ParseError) {
        // Lexer error tokens already carry a diagnostic
        if !error.is_at_invalid_token() {
            self.reporter.push(error);
        }
    }

    /// Parse a whole compilation unit. Always returns a program; problems
    /// end up in the reporter and as ErrorNodes in the tree.
    pub fn parse(&mut self) -> Program {
        let mut decls = Vec::new();

        while !self.at_end() {
            let start = self.current.loc;
            let before = self.consumed;
            match self.parse_decl() {
                Ok(decl) => decls.push(decl),
                Err(e) => {
                    self.record_error(e);
                    self.synchronize();
                    self.ensure_progress(before);
                    let node = self.error_node(start);
                    decls.push(Decl { id: self.next_id(), kind: DeclKind::Error(node), loc: node.loc });
                }
            }
        }

        let end = self.current.loc.offset;
        Program { decls, loc: SourceLocation::new(1, 1, 0, end) }
    }

    /// Skip to next declaration after error.
    fn synchronize(&mut self) {
        let mut brace_depth = 0usize;

        while !self.at_end() {
            match self.current_kind() {
                TokenKind::LBrace => {
                    brace_depth += 1;
                    self.advance();
                }
                TokenKind::RBrace => {
                    self.advance();
                    if brace_depth > 0 {
                        brace_depth -= 1;
                        if brace_depth == 0 {
                            return;
                        }
                    }
                }
                TokenKind::Semi if brace_depth == 0 => {
                    self.advance();
                    return;
                }
                k if brace_depth == 0 && (k.starts_declaration() || starts_var_decl(k)) => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Skip to the next member of a class body.
    fn synchronize_member(&mut self) {
        let mut depth = 0usize;

        while !self.at_end() {
            match self.current_kind() {
                TokenKind::LBrace => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::RBrace => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                    self.advance();
                    if depth == 0 {
                        return;
                    }
                }
                TokenKind::Semi if depth == 0 => {
                    self.advance();
                    return;
                }
                k if depth == 0 && starts_member(k) => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Synchronize within a block - skip to the next statement boundary.
    fn synchronize_in_block(&mut self) {
        let mut depth = 0usize;

        while !self.at_end() {
            match self.current_kind() {
                TokenKind::LBrace => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::RBrace => {
                    // Stop at block end
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                    self.advance();
                    if depth == 0 {
                        return;
                    }
                }
                TokenKind::Semi if depth == 0 => {
                    self.advance();
                    return;
                }
                k if depth == 0 && starts_statement(k) => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Recovery must consume at least one token per error.
    fn ensure_progress(&mut self, before: usize) {
        if self.consumed == before {
            self.advance();
        }
    }

    /// Placeholder covering everything from `start` to the last consumed token.
    fn error_node(&self, start: SourceLocation) -> ErrorNode {
        let loc = self.finish(start);
        ErrorNode { loc, replaced: loc.span() }
    }

    /// Report a block or body that runs into end of file.
    fn unterminated(&mut self, open: SourceLocation) -> ErrorNode {
        let loc = self.current.loc;
        self.record_error(ParseError::unterminated_block(open, loc));
        ErrorNode { loc, replaced: loc.span() }
    }

    /// Consume a lexer error token silently; the lexer reported it.
    fn skip_invalid_token(&mut self) -> ErrorNode {
        let token = self.advance();
        ErrorNode { loc: token.loc, replaced: token.span() }
    }

    /// Report annotations that precede something that cannot carry them.
    fn reject_annotations(&mut self, annotations: &NodeList<Annotation>) {
        if let Some(first) = annotations.first() {
            self.reporter.push(ParseError::misplaced_annotation(first.loc));
        }
    }

    // =========================================================================
    // Token Navigation
    // =========================================================================

    fn current_kind(&self) -> &TokenKind {
        &self.current.kind
    }

    /// Look `n` tokens ahead; `peek(0)` is the current token.
    fn peek(&mut self, n: usize) -> &TokenKind {
        if n == 0 {
            return &self.current.kind;
        }
        while self.lookahead.len() < n {
            let last = self.lookahead.back().unwrap_or(&self.current);
            if matches!(last.kind, TokenKind::Eof) {
                break;
            }
            let token = self.lexer.next_token(self.reporter);
            self.lookahead.push_back(token);
        }
        self.lookahead.get(n - 1).map(|t| &t.kind).unwrap_or(&EOF)
    }

    fn at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        if self.at_end() {
            return self.current.clone();
        }
        let next = match self.lookahead.pop_front() {
            Some(token) => token,
            None => self.lexer.next_token(self.reporter),
        };
        self.prev_end = self.current.loc.end();
        self.prev_line = self.current.loc.line;
        self.consumed += 1;
        std::mem::replace(&mut self.current, next)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::expected(kind.display_name(), self.current_kind(), self.current.loc))
        }
    }

    /// Expect the delimiter closing `opener`.
    fn expect_closing(&mut self, kind: &TokenKind, opener: &'static str) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::missing_delimiter(
                kind.display_name(),
                opener,
                self.current_kind(),
                self.current.loc,
            ))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.current_kind() {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            other => Err(ParseError::expected("a name", other, self.current.loc)),
        }
    }

    /// Location from `start` through the last consumed token.
    fn finish(&self, start: SourceLocation) -> SourceLocation {
        start.extend_to(self.prev_end)
    }

    fn in_actor(&self) -> bool {
        matches!(self.object, Some((_, ObjectKind::Actor)))
    }

    /// `Name(` where `Name` is the enclosing class: a constructor.
    fn at_constructor(&mut self) -> bool {
        let named_self = match (&self.current.kind, &self.object) {
            (TokenKind::Ident(name), Some((class, _))) => name == class,
            _ => false,
        };
        named_self && matches!(self.peek(1), TokenKind::LParen)
    }

    /// Statement-level check for a variable declaration.
    ///
    /// `NAME NAME` and `NAME [ ]` start one; `NAME <` never does, so that
    /// `a < b > c` stays a comparison chain.
    fn at_var_decl(&mut self) -> bool {
        match self.current_kind() {
            TokenKind::Let | TokenKind::Var | TokenKind::Dynamic | TokenKind::Hoist | TokenKind::Const => true,
            TokenKind::FreeObj => !matches!(self.peek(1), TokenKind::LBrace),
            k if k.is_primitive_type() => true,
            TokenKind::Ident(_) => match self.peek(1) {
                TokenKind::Ident(_) => true,
                TokenKind::LBracket => matches!(self.peek(2), TokenKind::RBracket),
                _ => false,
            },
            TokenKind::LBracket => self.looks_like_array_type_decl(),
            _ => false,
        }
    }

    /// `[T] name`: a bracketed type followed by a name.
    fn looks_like_array_type_decl(&mut self) -> bool {
        let mut depth = 0usize;
        for i in 0..TEMPLATE_LOOKAHEAD {
            match self.peek(i) {
                TokenKind::LBracket => depth += 1,
                TokenKind::RBracket => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return matches!(self.peek(i + 1), TokenKind::Ident(_));
                    }
                }
                TokenKind::Ident(_) | TokenKind::Lt | TokenKind::Gt | TokenKind::Comma => {}
                k if k.is_primitive_type() => {}
                _ => return false,
            }
        }
        false
    }

    /// At `<` in expression position: template arguments of a call only if
    /// type tokens run to the matching `>` and a `(` follows.
    fn looks_like_template_call(&mut self) -> bool {
        let mut depth = 0usize;
        for i in 0..TEMPLATE_LOOKAHEAD {
            match self.peek(i) {
                TokenKind::Lt => depth += 1,
                TokenKind::Gt => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return matches!(self.peek(i + 1), TokenKind::LParen);
                    }
                }
                TokenKind::Ident(_) | TokenKind::Comma | TokenKind::LBracket | TokenKind::RBracket => {}
                k if k.is_primitive_type() => {}
                _ => return false,
            }
        }
        false
    }

    /// At `(`: lambda parameters if the matching `)` is followed by `=>`.
    fn looks_like_lambda(&mut self) -> bool {
        let mut depth = 0usize;
        for i in 0..LAMBDA_LOOKAHEAD {
            match self.peek(i) {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return matches!(self.peek(i + 1), TokenKind::FatArrow);
                    }
                }
                TokenKind::Semi | TokenKind::Eof => return false,
                _ => {}
            }
        }
        false
    }

    // =========================================================================
    // Declaration Parsing
    // =========================================================================

    fn parse_decl(&mut self) -> Result<Decl, ParseError> {
        self.nested(Self::parse_decl_inner)
    }

    fn parse_decl_inner(&mut self) -> Result<Decl, ParseError> {
        let start = self.current.loc;

        if self.check(&TokenKind::Error) {
            let node = self.skip_invalid_token();
            return Ok(Decl { id: self.next_id(), kind: DeclKind::Error(node), loc: node.loc });
        }

        let annotations = self.parse_annotations()?;

        let kind = match self.current_kind() {
            TokenKind::Fun => DeclKind::Function(self.parse_function(annotations)?),
            TokenKind::Operator => DeclKind::Operator(self.parse_operator(annotations)?),
            TokenKind::Import => {
                self.reject_annotations(&annotations);
                self.parse_import()?
            }
            TokenKind::Class | TokenKind::Struct | TokenKind::Actor => {
                self.reject_annotations(&annotations);
                DeclKind::Object(self.parse_object()?)
            }
            TokenKind::Union => {
                self.reject_annotations(&annotations);
                self.parse_union()?
            }
            TokenKind::Template => {
                self.reject_annotations(&annotations);
                self.parse_template()?
            }
            k if starts_var_decl(k) => {
                self.reject_annotations(&annotations);
                let var = self.parse_var_decl()?;
                self.match_token(&TokenKind::Semi);
                DeclKind::Var(var)
            }
            k if starts_type(k) => match self.parse_typed_decl(false, false)? {
                TypedDecl::Function(mut func) => {
                    func.annotations = annotations;
                    DeclKind::Function(func)
                }
                TypedDecl::Var(var) => {
                    self.reject_annotations(&annotations);
                    DeclKind::Var(var)
                }
            },
            other => return Err(ParseError::expected("declaration", other, self.current.loc)),
        };

        Ok(Decl { id: self.next_id(), kind, loc: self.finish(start) })
    }

    fn parse_annotations(&mut self) -> Result<NodeList<Annotation>, ParseError> {
        let mut annotations = NodeList::new();
        while self.check(&TokenKind::At) {
            annotations.push(self.parse_annotation()?);
        }
        Ok(annotations)
    }

    /// `@Name` or `@Name(key = value, value)`
    fn parse_annotation(&mut self) -> Result<Annotation, ParseError> {
        let start = self.current.loc;
        self.expect(&TokenKind::At)?;
        let name = self.expect_ident()?;

        let mut args = NodeList::new();
        if self.match_token(&TokenKind::LParen) {
            while !self.check(&TokenKind::RParen) {
                let arg_name = if matches!(self.current_kind(), TokenKind::Ident(_))
                    && matches!(self.peek(1), TokenKind::Eq)
                {
                    let name = self.expect_ident()?;
                    self.advance();
                    Some(name)
                } else {
                    None
                };
                let value = self.parse_expr()?;
                args.push(AnnotationArg { name: arg_name, value });
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect_closing(&TokenKind::RParen, "'('")?;
        }

        Ok(Annotation { name, args, loc: self.finish(start) })
    }

    fn parse_import(&mut self) -> Result<DeclKind, ParseError> {
        self.expect(&TokenKind::Import)?;

        let target = if self.match_token(&TokenKind::Java) {
            ImportTarget::Java(self.parse_dotted_path()?)
        } else if let TokenKind::String(path) = self.current_kind() {
            let path = path.clone();
            self.advance();
            ImportTarget::File(path)
        } else {
            ImportTarget::Module(self.parse_dotted_path()?)
        };

        self.match_token(&TokenKind::Semi);
        Ok(DeclKind::Import(ImportDecl { target }))
    }

    /// `a.b.c`; `java` is accepted as a segment for Java package paths.
    fn parse_dotted_path(&mut self) -> Result<Vec<String>, ParseError> {
        let mut path = Vec::new();
        loop {
            if self.match_token(&TokenKind::Java) {
                path.push("java".to_string());
            } else {
                path.push(self.expect_ident()?);
            }
            if !self.match_token(&TokenKind::Dot) {
                break;
            }
        }
        Ok(path)
    }

    /// `class`, `struct` or `actor` declaration.
    fn parse_object(&mut self) -> Result<ObjectDecl, ParseError> {
        let kind = match self.advance().kind {
            TokenKind::Actor => ObjectKind::Actor,
            TokenKind::Struct => ObjectKind::Struct,
            _ => ObjectKind::Class,
        };
        let name = self.expect_ident()?;
        let base = if self.match_token(&TokenKind::Colon) {
            Some(self.expect_ident()?)
        } else {
            None
        };

        let open = self.expect(&TokenKind::LBrace)?;
        let outer = self.object.replace((name.clone(), kind));
        let members = self.parse_members(open.loc);
        self.object = outer;

        Ok(ObjectDecl { kind, name, base, members })
    }

    /// Members up to and including the closing `}`, with error recovery.
    fn parse_members(&mut self, open: SourceLocation) -> Vec<Member> {
        let mut members = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let start = self.current.loc;
            let before = self.consumed;
            match self.parse_member() {
                Ok(member) => members.push(member),
                Err(e) => {
                    self.record_error(e);
                    self.synchronize_member();
                    self.ensure_progress(before);
                    let node = self.error_node(start);
                    members.push(self.error_member(node));
                }
            }
        }

        if self.at_end() {
            let node = self.unterminated(open);
            members.push(self.error_member(node));
        } else {
            self.advance();
        }
        members
    }

    fn error_member(&mut self, node: ErrorNode) -> Member {
        Member {
            id: self.next_id(),
            kind: MemberKind::Error(node),
            flags: Flags::default(),
            annotations: NodeList::new(),
            loc: node.loc,
        }
    }

    fn parse_member(&mut self) -> Result<Member, ParseError> {
        let start = self.current.loc;

        if self.check(&TokenKind::Error) {
            let node = self.skip_invalid_token();
            return Ok(self.error_member(node));
        }

        let annotations = self.parse_annotations()?;
        let flags = self.parse_modifiers();

        let kind = if self.at_constructor() {
            MemberKind::Constructor(self.parse_constructor()?)
        } else {
            match self.current_kind() {
                TokenKind::Fun => MemberKind::Method(self.parse_function(NodeList::new())?),
                TokenKind::Operator => MemberKind::Operator(self.parse_operator(NodeList::new())?),
                TokenKind::On if self.in_actor() => MemberKind::Handler(self.parse_handler()?),
                TokenKind::On => {
                    // Consume the whole handler so one error covers it
                    let err = ParseError::expected("member declaration", self.current_kind(), self.current.loc);
                    self.parse_handler()?;
                    return Err(err);
                }
                TokenKind::Let | TokenKind::Var | TokenKind::Dynamic => {
                    let field = self.parse_var_decl_rest(flags.is_hoisted(), flags.is_const())?;
                    self.match_token(&TokenKind::Semi);
                    MemberKind::Field(field)
                }
                k if starts_type(k) => match self.parse_typed_decl(flags.is_hoisted(), flags.is_const())? {
                    TypedDecl::Function(func) => MemberKind::Method(func),
                    TypedDecl::Var(var) => MemberKind::Field(var),
                },
                other => return Err(ParseError::expected("member declaration", other, self.current.loc)),
            }
        };

        Ok(Member { id: self.next_id(), kind, flags, annotations, loc: self.finish(start) })
    }

    /// Access and storage modifiers in front of a member.
    fn parse_modifiers(&mut self) -> Flags {
        let mut flags = Flags::default();
        loop {
            flags = match self.current_kind() {
                TokenKind::Public => flags.with_access(Access::Public),
                TokenKind::Private => flags.with_access(Access::Private),
                TokenKind::Protected => flags.with_access(Access::Protected),
                TokenKind::PrivateW => flags.with_access(Access::PrivateW),
                TokenKind::ProtectedW => flags.with_access(Access::ProtectedW),
                TokenKind::Const => flags.with(Flags::CONST),
                TokenKind::Static => flags.with(Flags::STATIC),
                TokenKind::Hoist => flags.with(Flags::HOIST),
                _ => return flags,
            };
            self.advance();
        }
    }

    /// `Name(params) [: member(value), ...] { body }`
    fn parse_constructor(&mut self) -> Result<ConstructorDecl, ParseError> {
        self.advance();
        let (params, _) = self.parse_params()?;

        let mut initializers = NodeList::new();
        if self.match_token(&TokenKind::Colon) {
            loop {
                let member = self.expect_ident()?;
                self.expect(&TokenKind::LParen)?;
                let value = self.parse_expr()?;
                self.expect_closing(&TokenKind::RParen, "'('")?;
                initializers.push(MemberInit { member, value });
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }

        let body = self.parse_block(BlockKind::Plain)?;
        Ok(ConstructorDecl { params, initializers, body })
    }

    /// `on Message(params) [-> T] { body }`
    fn parse_handler(&mut self) -> Result<HandlerDecl, ParseError> {
        self.expect(&TokenKind::On)?;
        let message = self.expect_ident()?;
        let (params, _) = self.parse_params()?;
        let ret_ty = self.parse_return_type()?;
        let body = self.parse_block(BlockKind::Plain)?;
        Ok(HandlerDecl { message, params, ret_ty, body })
    }

    /// `fun [type] name(params) [-> type] { body }`
    fn parse_function(&mut self, annotations: NodeList<Annotation>) -> Result<FunctionDecl, ParseError> {
        self.expect(&TokenKind::Fun)?;

        let prefix_ty = if matches!(self.current_kind(), TokenKind::Ident(_))
            && matches!(self.peek(1), TokenKind::LParen)
        {
            None
        } else {
            Some(self.parse_type()?)
        };

        let name = self.expect_ident()?;
        let (params, struct_sugar) = self.parse_params()?;
        let ret_ty = self.parse_return_type()?.or(prefix_ty);
        let body = self.parse_block(BlockKind::Plain)?;

        Ok(FunctionDecl { name, params, ret_ty, body, annotations, struct_sugar, is_lambda: false })
    }

    /// `type name(...) {...}` or `type name [= init]`.
    fn parse_typed_decl(&mut self, hoisted: bool, is_const: bool) -> Result<TypedDecl, ParseError> {
        let ty = self.parse_type()?;
        let name = self.expect_ident()?;

        if self.check(&TokenKind::LParen) {
            let (params, struct_sugar) = self.parse_params()?;
            let ret_ty = self.parse_return_type()?.or(Some(ty));
            let body = self.parse_block(BlockKind::Plain)?;
            return Ok(TypedDecl::Function(FunctionDecl {
                name,
                params,
                ret_ty,
                body,
                annotations: NodeList::new(),
                struct_sugar,
                is_lambda: false,
            }));
        }

        let var = self.parse_typed_var_rest(ty, name, hoisted, is_const)?;
        self.match_token(&TokenKind::Semi);
        Ok(TypedDecl::Var(var))
    }

    /// `operator OP (params) [-> type] { body }`
    fn parse_operator(&mut self, annotations: NodeList<Annotation>) -> Result<OperatorDecl, ParseError> {
        self.expect(&TokenKind::Operator)?;
        let op = self.parse_overload_op()?;
        let (params, _) = self.parse_params()?;
        let ret_ty = self.parse_return_type()?;
        let body = self.parse_block(BlockKind::Plain)?;
        Ok(OperatorDecl { op, params, ret_ty, body, annotations })
    }

    fn parse_overload_op(&mut self) -> Result<OverloadOp, ParseError> {
        let op = match self.current_kind() {
            TokenKind::Plus => OverloadOp::Add,
            TokenKind::Minus => OverloadOp::Sub,
            TokenKind::Star => OverloadOp::Mul,
            TokenKind::Slash => OverloadOp::Div,
            TokenKind::Percent => OverloadOp::Mod,
            TokenKind::EqEq => OverloadOp::Eq,
            TokenKind::BangEq => OverloadOp::Ne,
            TokenKind::Lt => OverloadOp::Lt,
            TokenKind::LtEq => OverloadOp::Le,
            TokenKind::Gt => OverloadOp::Gt,
            TokenKind::GtEq => OverloadOp::Ge,
            TokenKind::Bang => OverloadOp::Not,
            TokenKind::LBracket => {
                self.advance();
                self.expect_closing(&TokenKind::RBracket, "'['")?;
                return Ok(OverloadOp::Index);
            }
            other => return Err(ParseError::expected("overloadable operator", other, self.current.loc)),
        };
        self.advance();
        Ok(op)
    }

    /// `union Name { int, string, Foo }`
    fn parse_union(&mut self) -> Result<DeclKind, ParseError> {
        self.expect(&TokenKind::Union)?;
        let name = self.expect_ident()?;
        self.expect(&TokenKind::LBrace)?;

        let mut variants = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let ty = self.parse_type()?;
            if ty.is_dynamic() {
                self.reporter.push(ParseError::invalid_union_variant(ty.loc));
            } else {
                variants.push(ty);
            }
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect_closing(&TokenKind::RBrace, "'{'")?;

        Ok(DeclKind::Union(UnionDecl { name, variants }))
    }

    /// `template<params> decl`
    fn parse_template(&mut self) -> Result<DeclKind, ParseError> {
        self.expect(&TokenKind::Template)?;
        let params = self.parse_template_params()?;
        let decl = self.parse_decl()?;
        Ok(DeclKind::Template(TemplateDecl { params, decl: Box::new(decl) }))
    }

    fn parse_template_params(&mut self) -> Result<Vec<TemplateParam>, ParseError> {
        self.expect(&TokenKind::Lt)?;
        let mut params = Vec::new();
        while !self.check(&TokenKind::Gt) {
            params.push(self.parse_template_param()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect_closing(&TokenKind::Gt, "'<'")?;
        Ok(params)
    }

    fn parse_template_param(&mut self) -> Result<TemplateParam, ParseError> {
        self.nested(Self::parse_template_param_inner)
    }

    fn parse_template_param_inner(&mut self) -> Result<TemplateParam, ParseError> {
        let start = self.current.loc;

        match self.current_kind() {
            TokenKind::Typename => {
                self.advance();
                let variadic = self.match_token(&TokenKind::Ellipsis);
                let name = self.expect_ident()?;
                let constraint = if self.match_token(&TokenKind::Colon) {
                    Some(self.parse_type()?)
                } else {
                    None
                };
                let default = if self.match_token(&TokenKind::Eq) {
                    Some(self.parse_type()?)
                } else {
                    None
                };
                Ok(TemplateParam {
                    name,
                    kind: TemplateParamKind::Type { constraint, default },
                    variadic,
                    loc: self.finish(start),
                })
            }
            TokenKind::Template => {
                self.advance();
                let params = self.parse_template_params()?;
                self.expect(&TokenKind::Typename)?;
                let name = self.expect_ident()?;
                Ok(TemplateParam {
                    name,
                    kind: TemplateParamKind::Template { params },
                    variadic: false,
                    loc: self.finish(start),
                })
            }
            _ => {
                let ty = self.parse_type()?;
                let variadic = self.match_token(&TokenKind::Ellipsis);
                let name = self.expect_ident()?;
                // Stop below comparisons so the closing '>' is not an operator
                let default = if self.match_token(&TokenKind::Eq) {
                    Some(self.parse_expr_bp(Self::ADDITIVE_BP)?)
                } else {
                    None
                };
                Ok(TemplateParam {
                    name,
                    kind: TemplateParamKind::Value { ty, default },
                    variadic,
                    loc: self.finish(start),
                })
            }
        }
    }

    /// `(a, int b = 1, c: string)` or `({ a, b })`. Returns the params and
    /// whether the braced form was used.
    fn parse_params(&mut self) -> Result<(Vec<Param>, bool), ParseError> {
        self.expect(&TokenKind::LParen)?;
        let struct_sugar = self.match_token(&TokenKind::LBrace);
        let close = if struct_sugar { TokenKind::RBrace } else { TokenKind::RParen };

        let mut params = Vec::new();
        while !self.check(&close) {
            params.push(self.parse_param()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        if struct_sugar {
            self.expect_closing(&TokenKind::RBrace, "'{'")?;
        }
        self.expect_closing(&TokenKind::RParen, "'('")?;
        Ok((params, struct_sugar))
    }

    fn parse_param(&mut self) -> Result<Param, ParseError> {
        let start = self.current.loc;

        let untyped_or_trailing = matches!(self.current_kind(), TokenKind::Ident(_))
            && matches!(
                self.peek(1),
                TokenKind::Colon | TokenKind::Comma | TokenKind::RParen | TokenKind::RBrace | TokenKind::Eq
            );

        let (name, ty) = if untyped_or_trailing {
            let name = self.expect_ident()?;
            let ty = if self.match_token(&TokenKind::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            (name, ty)
        } else {
            let ty = self.parse_type()?;
            (self.expect_ident()?, Some(ty))
        };

        let default = if self.match_token(&TokenKind::Eq) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        Ok(Param { name, ty, default, loc: self.finish(start) })
    }

    fn parse_return_type(&mut self) -> Result<Option<Type>, ParseError> {
        if self.match_token(&TokenKind::Arrow) {
            Ok(Some(self.parse_type()?))
        } else {
            Ok(None)
        }
    }

    /// `[hoist] [const] (let|var|dynamic) name [: type] [= init]` or
    /// `[hoist] [const] type name [= init]`.
    fn parse_var_decl(&mut self) -> Result<VarDecl, ParseError> {
        let hoisted = self.match_token(&TokenKind::Hoist);
        let is_const = self.match_token(&TokenKind::Const);
        self.parse_var_decl_rest(hoisted, is_const)
    }

    fn parse_var_decl_rest(&mut self, hoisted: bool, is_const: bool) -> Result<VarDecl, ParseError> {
        if !matches!(self.current_kind(), TokenKind::Let | TokenKind::Var | TokenKind::Dynamic) {
            let ty = self.parse_type()?;
            let name = self.expect_ident()?;
            return self.parse_typed_var_rest(ty, name, hoisted, is_const);
        }

        let keyword = self.advance();
        let name = self.expect_ident()?;
        let ty = if self.match_token(&TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let init = if self.match_token(&TokenKind::Eq) {
            Some(self.parse_initializer(ty.is_some())?)
        } else {
            self.check_declaration_end()?;
            None
        };

        let kind = match (&ty, &init) {
            _ if matches!(keyword.kind, TokenKind::Dynamic) => VarKind::Dynamic,
            (Some(_), Some(init)) if init.is_constructor_call() => VarKind::ClassInit,
            (Some(_), _) => VarKind::Static,
            (None, _) => VarKind::Dynamic,
        };

        Ok(VarDecl { kind, name, ty, init, hoisted, is_const })
    }

    fn parse_typed_var_rest(
        &mut self,
        ty: Type,
        name: String,
        hoisted: bool,
        is_const: bool,
    ) -> Result<VarDecl, ParseError> {
        let init = if self.match_token(&TokenKind::Eq) {
            Some(self.parse_initializer(true)?)
        } else {
            self.check_declaration_end()?;
            None
        };

        let kind = if init.as_ref().is_some_and(Expr::is_constructor_call) {
            VarKind::ClassInit
        } else if ty.is_dynamic() {
            VarKind::Dynamic
        } else {
            VarKind::Static
        };

        Ok(VarDecl { kind, name, ty: Some(ty), init, hoisted, is_const })
    }

    /// `int x y`: a name on the same line cannot start the next declaration.
    fn check_declaration_end(&self) -> Result<(), ParseError> {
        match self.current_kind() {
            kind @ TokenKind::Ident(_) if self.current.loc.line == self.prev_line => {
                Err(ParseError::expected("';' or '='", kind, self.current.loc))
            }
            _ => Ok(()),
        }
    }

    /// Struct initializers are only allowed where a static type was written.
    fn parse_initializer(&mut self, statically_typed: bool) -> Result<Expr, ParseError> {
        if statically_typed && self.check(&TokenKind::LBrace) {
            self.parse_struct_init()
        } else {
            self.parse_expr()
        }
    }

    // =========================================================================
    // Statement Parsing
    // =========================================================================

    /// Parse `{ ... }`. Recovers inside the block, so only a missing `{`
    /// is an error for the caller.
    fn parse_block(&mut self, kind: BlockKind) -> Result<Block, ParseError> {
        let start = self.current.loc;
        self.expect(&TokenKind::LBrace)?;
        let stmts = self.parse_block_body(start);
        Ok(Block { kind, stmts, loc: self.finish(start) })
    }

    /// Statements up to and including the closing `}`, with error recovery.
    fn parse_block_body(&mut self, open: SourceLocation) -> Vec<Stmt> {
        let mut stmts = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let start = self.current.loc;
            let before = self.consumed;
            match self.parse_stmt() {
                Ok(stmt) => stmts.push(stmt),
                Err(e) => {
                    // Record error but stay within the block
                    self.record_error(e);
                    self.synchronize_in_block();
                    self.ensure_progress(before);
                    let node = self.error_node(start);
                    stmts.push(Stmt { id: self.next_id(), kind: StmtKind::Error(node), loc: node.loc });
                }
            }
        }

        if self.at_end() {
            let node = self.unterminated(open);
            stmts.push(Stmt { id: self.next_id(), kind: StmtKind::Error(node), loc: node.loc });
        } else {
            self.advance();
        }
        stmts
    }

    /// Parse a statement.
    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        self.nested(Self::parse_stmt_inner)
    }

    fn parse_stmt_inner(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current.loc;
        let is_var_decl = self.at_var_decl();

        let kind = match self.current_kind() {
            TokenKind::Error => StmtKind::Error(self.skip_invalid_token()),
            TokenKind::At => {
                let annotations = self.parse_annotations()?;
                self.reject_annotations(&annotations);
                return self.parse_stmt();
            }
            TokenKind::LBrace => StmtKind::Block(self.parse_block(BlockKind::Plain)?),
            TokenKind::Unsafe => {
                self.advance();
                StmtKind::Block(self.parse_block(BlockKind::Unsafe)?)
            }
            TokenKind::Scope => {
                self.advance();
                StmtKind::Block(self.parse_block(BlockKind::Scope)?)
            }
            TokenKind::If => self.parse_if()?,
            TokenKind::While => self.parse_while()?,
            TokenKind::Do => self.parse_do_while()?,
            TokenKind::For => self.parse_for()?,
            TokenKind::Return => self.parse_return()?,
            TokenKind::Semi => {
                self.advance();
                StmtKind::Empty
            }
            _ if is_var_decl => {
                let var = self.parse_var_decl()?;
                self.match_token(&TokenKind::Semi);
                StmtKind::Var(var)
            }
            _ => {
                let expr = self.parse_expr()?;
                self.match_token(&TokenKind::Semi);
                StmtKind::Expr(expr)
            }
        };

        Ok(Stmt { id: self.next_id(), kind, loc: self.finish(start) })
    }

    /// `( expr )` after `if`, `while`.
    fn parse_condition(&mut self) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect_closing(&TokenKind::RParen, "'('")?;
        Ok(cond)
    }

    fn parse_if(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(&TokenKind::If)?;
        let cond = self.parse_condition()?;
        let then_branch = Box::new(self.parse_stmt()?);
        let else_branch = if self.match_token(&TokenKind::Else) {
            Some(Box::new(self.parse_stmt()?))
        } else {
            None
        };
        Ok(StmtKind::If { cond, then_branch, else_branch })
    }

    fn parse_while(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(&TokenKind::While)?;
        let cond = self.parse_condition()?;
        let body = Box::new(self.parse_stmt()?);
        Ok(StmtKind::While { cond, body })
    }

    fn parse_do_while(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(&TokenKind::Do)?;
        let body = Box::new(self.parse_stmt()?);
        self.expect(&TokenKind::While)?;
        let cond = self.parse_condition()?;
        self.match_token(&TokenKind::Semi);
        Ok(StmtKind::DoWhile { body, cond })
    }

    /// `for (init; cond; update) body`, each clause optional.
    fn parse_for(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(&TokenKind::For)?;
        self.expect(&TokenKind::LParen)?;

        let init = if self.check(&TokenKind::Semi) {
            None
        } else {
            let start = self.current.loc;
            let kind = if self.at_var_decl() {
                StmtKind::Var(self.parse_var_decl()?)
            } else {
                StmtKind::Expr(self.parse_expr()?)
            };
            Some(Box::new(Stmt { id: self.next_id(), kind, loc: self.finish(start) }))
        };
        self.expect(&TokenKind::Semi)?;

        let cond = if self.check(&TokenKind::Semi) { None } else { Some(self.parse_expr()?) };
        self.expect(&TokenKind::Semi)?;

        let update = if self.check(&TokenKind::RParen) { None } else { Some(self.parse_expr()?) };
        self.expect_closing(&TokenKind::RParen, "'('")?;

        let body = Box::new(self.parse_stmt()?);
        Ok(StmtKind::For { init, cond, update, body })
    }

    fn parse_return(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(&TokenKind::Return)?;
        let value = if matches!(self.current_kind(), TokenKind::Semi | TokenKind::RBrace | TokenKind::Eof) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.match_token(&TokenKind::Semi);
        Ok(StmtKind::Return(value))
    }

    // =========================================================================
    // Expression Parsing
    // =========================================================================

    /// Parse a full expression, assignment included.
    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_expr_bp(0)
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        self.nested(|p| p.parse_expr_bp_inner(min_bp))
    }

    fn parse_expr_bp_inner(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let start = self.current.loc;
        let mut lhs = self.parse_prefix()?;

        loop {
            if let Some(bp) = self.postfix_bp(&lhs) {
                if bp < min_bp {
                    break;
                }
                lhs = self.parse_postfix(lhs, start)?;
                continue;
            }

            if let Some((l_bp, r_bp)) = self.infix_bp() {
                if l_bp < min_bp {
                    break;
                }
                let op = self.parse_binop()?;
                let rhs = self.parse_expr_bp(r_bp)?;
                lhs = Expr {
                    id: self.next_id(),
                    kind: ExprKind::Binary { op, left: Box::new(lhs), right: Box::new(rhs) },
                    loc: self.finish(start),
                };
                continue;
            }

            break;
        }

        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        let start = self.current.loc;

        let kind = match self.current_kind().clone() {
            TokenKind::Int(n, suffix) => {
                self.advance();
                ExprKind::Literal(Literal::Int(n, suffix))
            }
            TokenKind::Float(n, suffix) => {
                self.advance();
                ExprKind::Literal(Literal::Float(n, suffix))
            }
            TokenKind::String(s) => {
                self.advance();
                ExprKind::Literal(Literal::String(s))
            }
            TokenKind::Bool(b) => {
                self.advance();
                ExprKind::Literal(Literal::Bool(b))
            }
            TokenKind::Null => {
                self.advance();
                ExprKind::Literal(Literal::Null)
            }
            TokenKind::This => {
                self.advance();
                ExprKind::This
            }
            TokenKind::TemplateHead(_) => return self.parse_template_string(),
            TokenKind::Ident(name) => {
                if matches!(self.peek(1), TokenKind::FatArrow) {
                    return self.parse_lambda();
                }
                self.advance();
                ExprKind::Var(name)
            }
            TokenKind::New => {
                self.advance();
                let ty = self.parse_type()?;
                let args = self.parse_args()?;
                ExprKind::New { ty, args }
            }
            TokenKind::LParen => {
                if self.looks_like_lambda() {
                    return self.parse_lambda();
                }
                self.advance();
                let inner = self.parse_expr()?;
                self.expect_closing(&TokenKind::RParen, "'('")?;
                return Ok(Expr { loc: self.finish(start), ..inner });
            }
            TokenKind::LBrace => ExprKind::FreeObject(self.parse_free_object()?),
            TokenKind::FreeObj => {
                self.advance();
                ExprKind::FreeObject(self.parse_free_object()?)
            }
            TokenKind::Minus | TokenKind::Plus | TokenKind::Bang => {
                let op = match self.advance().kind {
                    TokenKind::Minus => UnaryOp::Neg,
                    TokenKind::Plus => UnaryOp::Plus,
                    _ => UnaryOp::Not,
                };
                let operand = self.parse_expr_bp(Self::PREFIX_BP)?;
                ExprKind::Unary { op, operand: Box::new(operand) }
            }
            TokenKind::Error => ExprKind::Error(self.skip_invalid_token()),
            other => return Err(ParseError::expected_expression(&other, start)),
        };

        Ok(Expr { id: self.next_id(), kind, loc: self.finish(start) })
    }

    fn parse_postfix(&mut self, lhs: Expr, start: SourceLocation) -> Result<Expr, ParseError> {
        let kind = match self.current_kind() {
            TokenKind::LParen => {
                let args = self.parse_args()?;
                ExprKind::Call { callee: Box::new(lhs), type_args: NodeList::new(), args }
            }
            TokenKind::Lt => {
                let type_args = self.parse_type_args()?;
                let args = self.parse_args()?;
                ExprKind::Call { callee: Box::new(lhs), type_args, args }
            }
            TokenKind::Dot => {
                self.advance();
                let member = self.expect_ident()?;
                ExprKind::Member { object: Box::new(lhs), member }
            }
            _ => {
                self.expect(&TokenKind::LBracket)?;
                let index = self.parse_expr()?;
                self.expect_closing(&TokenKind::RBracket, "'['")?;
                ExprKind::Index { array: Box::new(lhs), index: Box::new(index) }
            }
        };
        Ok(Expr { id: self.next_id(), kind, loc: self.finish(start) })
    }

    /// `(a, b, c)`
    fn parse_args(&mut self) -> Result<NodeList<Box<Expr>>, ParseError> {
        self.expect(&TokenKind::LParen)?;
        let mut args = NodeList::new();
        while !self.check(&TokenKind::RParen) {
            args.push(Box::new(self.parse_expr()?));
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect_closing(&TokenKind::RParen, "'('")?;
        Ok(args)
    }

    /// `(params) => body` or `name => body`. An expression body becomes a
    /// block holding a single return.
    fn parse_lambda(&mut self) -> Result<Expr, ParseError> {
        let start = self.current.loc;

        let (params, struct_sugar) = if let TokenKind::Ident(name) = self.current_kind() {
            let name = name.clone();
            let token = self.advance();
            (vec![Param { name, ty: None, default: None, loc: token.loc }], false)
        } else {
            self.parse_params()?
        };
        self.expect(&TokenKind::FatArrow)?;

        let body = if self.check(&TokenKind::LBrace) {
            self.parse_block(BlockKind::Plain)?
        } else {
            let value = self.parse_expr()?;
            let loc = value.loc;
            let ret = Stmt { id: self.next_id(), kind: StmtKind::Return(Some(value)), loc };
            Block { kind: BlockKind::Plain, stmts: vec![ret], loc }
        };

        let func = FunctionDecl {
            name: String::new(),
            params,
            ret_ty: None,
            body,
            annotations: NodeList::new(),
            struct_sugar,
            is_lambda: true,
        };
        Ok(Expr { id: self.next_id(), kind: ExprKind::Lambda(Box::new(func)), loc: self.finish(start) })
    }

    /// Head, then expression and middle/tail segments in turn.
    fn parse_template_string(&mut self) -> Result<Expr, ParseError> {
        let start = self.current.loc;
        let mut parts = NodeList::new();

        if let TokenKind::TemplateHead(text) = self.advance().kind {
            push_text(&mut parts, text);
        }

        loop {
            let expr = self.parse_expr()?;
            parts.push(TemplatePart::Expr(Box::new(expr)));
            match self.current_kind().clone() {
                TokenKind::TemplateMiddle(text) => {
                    self.advance();
                    push_text(&mut parts, text);
                }
                TokenKind::TemplateTail(text) => {
                    self.advance();
                    push_text(&mut parts, text);
                    break;
                }
                other => {
                    return Err(ParseError::missing_delimiter("'}'", "'${'", &other, self.current.loc));
                }
            }
        }

        Ok(Expr { id: self.next_id(), kind: ExprKind::TemplateString(parts), loc: self.finish(start) })
    }

    /// `{ key: value, "key": value }`
    fn parse_free_object(&mut self) -> Result<NodeList<Property>, ParseError> {
        self.expect(&TokenKind::LBrace)?;
        let mut props = NodeList::new();
        while !self.check(&TokenKind::RBrace) {
            let key = match self.current_kind().clone() {
                TokenKind::Ident(key) | TokenKind::String(key) => {
                    self.advance();
                    key
                }
                other => return Err(ParseError::expected("property name", &other, self.current.loc)),
            };
            self.expect(&TokenKind::Colon)?;
            let value = self.parse_expr()?;
            props.push(Property { key, value: Box::new(value) });
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect_closing(&TokenKind::RBrace, "'{'")?;
        Ok(props)
    }

    /// `{ .x = 1, y: 2, 3 }`
    fn parse_struct_init(&mut self) -> Result<Expr, ParseError> {
        let start = self.current.loc;
        self.expect(&TokenKind::LBrace)?;

        let mut fields = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let name = if self.match_token(&TokenKind::Dot) {
                let name = self.expect_ident()?;
                self.expect(&TokenKind::Eq)?;
                Some(name)
            } else if matches!(self.current_kind(), TokenKind::Ident(_))
                && matches!(self.peek(1), TokenKind::Colon)
            {
                let name = self.expect_ident()?;
                self.advance();
                Some(name)
            } else {
                None
            };
            let value = self.parse_expr()?;
            fields.push(FieldInit { name, value });
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect_closing(&TokenKind::RBrace, "'{'")?;

        let positional = !fields.is_empty() && fields.iter().all(|f| f.name.is_none());
        Ok(Expr {
            id: self.next_id(),
            kind: ExprKind::StructInit { fields, positional },
            loc: self.finish(start),
        })
    }

    // =========================================================================
    // Type Parsing
    // =========================================================================

    /// Parse a type. In type position `Name<` always opens template arguments.
    pub fn parse_type(&mut self) -> Result<Type, ParseError> {
        self.nested(Self::parse_type_inner)
    }

    fn parse_type_inner(&mut self) -> Result<Type, ParseError> {
        let start = self.current.loc;

        let kind = match self.current_kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                if self.check(&TokenKind::Lt) {
                    TypeKind::Template { base: name, args: self.parse_type_args()? }
                } else {
                    TypeKind::Named(name)
                }
            }
            TokenKind::LBracket => {
                self.advance();
                let elem = self.parse_type()?;
                self.expect_closing(&TokenKind::RBracket, "'['")?;
                TypeKind::Array(Box::new(elem))
            }
            other => match primitive_of(&other) {
                Some(prim) => {
                    self.advance();
                    TypeKind::Primitive(prim)
                }
                None => return Err(ParseError::expected_type(&other, start)),
            },
        };

        let mut ty = Type { kind, loc: self.finish(start) };
        while self.check(&TokenKind::LBracket) && matches!(self.peek(1), TokenKind::RBracket) {
            self.advance();
            self.advance();
            ty = Type { kind: TypeKind::Array(Box::new(ty)), loc: self.finish(start) };
        }
        Ok(ty)
    }

    /// `<T, U>`
    fn parse_type_args(&mut self) -> Result<NodeList<Box<Type>>, ParseError> {
        self.expect(&TokenKind::Lt)?;
        let mut args = NodeList::new();
        while !self.check(&TokenKind::Gt) {
            args.push(Box::new(self.parse_type()?));
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect_closing(&TokenKind::Gt, "'<'")?;
        Ok(args)
    }

    // =========================================================================
    // Operator Precedence
    // =========================================================================

    const PREFIX_BP: u8 = 15;
    const POSTFIX_BP: u8 = 17;
    /// Left binding power of `+`; template value defaults parse at this level.
    const ADDITIVE_BP: u8 = 11;

    fn postfix_bp(&mut self, lhs: &Expr) -> Option<u8> {
        let is_postfix = match self.current_kind() {
            TokenKind::LParen | TokenKind::LBracket | TokenKind::Dot => true,
            TokenKind::Lt => {
                matches!(lhs.kind, ExprKind::Var(_) | ExprKind::Member { .. }) && self.looks_like_template_call()
            }
            _ => false,
        };
        is_postfix.then_some(Self::POSTFIX_BP)
    }

    fn infix_bp(&self) -> Option<(u8, u8)> {
        match self.current_kind() {
            TokenKind::Eq
            | TokenKind::PlusEq
            | TokenKind::MinusEq
            | TokenKind::StarEq
            | TokenKind::SlashEq
            | TokenKind::PercentEq => Some((2, 1)),
            TokenKind::PipePipe => Some((3, 4)),
            TokenKind::AmpAmp => Some((5, 6)),
            TokenKind::EqEq | TokenKind::BangEq => Some((7, 8)),
            TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq => Some((9, 10)),
            TokenKind::Plus | TokenKind::Minus => Some((11, 12)),
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Some((13, 14)),
            _ => None,
        }
    }

    fn parse_binop(&mut self) -> Result<BinOp, ParseError> {
        let op = match self.current_kind() {
            TokenKind::Plus => BinOp::Add,
            TokenKind::Minus => BinOp::Sub,
            TokenKind::Star => BinOp::Mul,
            TokenKind::Slash => BinOp::Div,
            TokenKind::Percent => BinOp::Mod,
            TokenKind::EqEq => BinOp::Eq,
            TokenKind::BangEq => BinOp::Ne,
            TokenKind::Lt => BinOp::Lt,
            TokenKind::Gt => BinOp::Gt,
            TokenKind::LtEq => BinOp::Le,
            TokenKind::GtEq => BinOp::Ge,
            TokenKind::AmpAmp => BinOp::And,
            TokenKind::PipePipe => BinOp::Or,
            TokenKind::Eq => BinOp::Assign,
            TokenKind::PlusEq => BinOp::AddAssign,
            TokenKind::MinusEq => BinOp::SubAssign,
            TokenKind::StarEq => BinOp::MulAssign,
            TokenKind::SlashEq => BinOp::DivAssign,
            TokenKind::PercentEq => BinOp::ModAssign,
            other => return Err(ParseError::expected("operator like '+' or '-'", other, self.current.loc)),
        };
        self.advance();
        Ok(op)
    }
}

fn push_text(parts: &mut NodeList<TemplatePart>, text: String) {
    if !text.is_empty() {
        parts.push(TemplatePart::Text(text));
    }
}

fn primitive_of(kind: &TokenKind) -> Option<Primitive> {
    Some(match kind {
        TokenKind::IntTy => Primitive::Int,
        TokenKind::LongTy => Primitive::Long,
        TokenKind::ShortTy => Primitive::Short,
        TokenKind::ByteTy => Primitive::Byte,
        TokenKind::FloatTy => Primitive::Float,
        TokenKind::DoubleTy => Primitive::Double,
        TokenKind::StringTy => Primitive::String,
        TokenKind::BoolTy => Primitive::Bool,
        TokenKind::Dynamic => Primitive::Dynamic,
        TokenKind::FreeObj => Primitive::FreeObj,
        TokenKind::NumberTy => Primitive::Number,
        TokenKind::BigIntTy => Primitive::BigInt,
        TokenKind::BigNumberTy => Primitive::BigNumber,
        _ => return None,
    })
}

fn starts_var_decl(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Let | TokenKind::Var | TokenKind::Dynamic | TokenKind::Hoist | TokenKind::Const
    )
}

fn starts_type(kind: &TokenKind) -> bool {
    kind.is_primitive_type() || matches!(kind, TokenKind::Ident(_) | TokenKind::LBracket)
}

fn starts_member(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Public
            | TokenKind::Private
            | TokenKind::Protected
            | TokenKind::PrivateW
            | TokenKind::ProtectedW
            | TokenKind::Static
            | TokenKind::Const
            | TokenKind::Hoist
            | TokenKind::Fun
            | TokenKind::Operator
            | TokenKind::On
            | TokenKind::Let
            | TokenKind::Var
            | TokenKind::Dynamic
            | TokenKind::At
    )
}

fn starts_statement(kind: &TokenKind) -> bool {
    kind.starts_declaration()
        || matches!(
            kind,
            TokenKind::Let
                | TokenKind::Var
                | TokenKind::Dynamic
                | TokenKind::Hoist
                | TokenKind::Const
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Do
                | TokenKind::Return
                | TokenKind::Unsafe
                | TokenKind::Scope
        )
}

/// Result of parsing: the program plus every diagnostic of the pass.
#[derive(Debug)]
pub struct ParseResult {
    pub program: Program,
    pub reporter: ErrorReporter,
}

impl ParseResult {
    /// Returns true if lexing and parsing completed without errors.
    pub fn is_ok(&self) -> bool {
        !self.reporter.had_errors()
    }
}
