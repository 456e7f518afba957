//! Grammar rules.
//!
//! `mod.rs` holds items and declarations; statements and expressions live
//! in their own modules.

mod expr;
mod stmt;

use crate::Parser;
use ced_ir::{
    Access, BaseSpecifier, ClassDecl, ClassMember, Decl, Expr, FieldDecl, FunctionDecl, Item,
    MethodDecl, NamespaceDecl, Param, TemplateDecl, TokenKind, TypeRef, VarDecl,
};

impl Parser<'_> {
    pub(crate) fn item(&mut self) -> Option<Item> {
        match self.cursor.peek().kind {
            TokenKind::Class | TokenKind::Struct => {
                self.class_decl().map(|c| Item::Decl(Decl::Class(c)))
            }
            TokenKind::Namespace => self.namespace_decl().map(|n| Item::Decl(Decl::Namespace(n))),
            TokenKind::Template => self.template_decl().map(|t| Item::Decl(Decl::Template(t))),
            _ if self.starts_declaration() => self.var_or_fn_decl().map(Item::Decl),
            _ => self.stmt().map(Item::Stmt),
        }
    }

    /// Whether the cursor sits on a declaration rather than a statement.
    ///
    /// Without a symbol table this is a lookahead heuristic: a type keyword,
    /// `const`, `Name Name`, `Name* name` followed by declarator
    /// punctuation, or `Name<...> name`. The classic `a * b;` ambiguity
    /// resolves in favor of the declaration, as C itself does.
    pub(crate) fn starts_declaration(&self) -> bool {
        let first = self.cursor.peek().kind;
        if first.is_type_keyword() || matches!(first, TokenKind::Const) {
            return true;
        }
        if !matches!(first, TokenKind::Ident(_)) {
            return false;
        }
        match self.cursor.nth(1).kind {
            TokenKind::Ident(_) => true,
            TokenKind::Star | TokenKind::Amp => {
                matches!(self.cursor.nth(2).kind, TokenKind::Ident(_))
                    && matches!(
                        self.cursor.nth(3).kind,
                        TokenKind::Assign
                            | TokenKind::Semicolon
                            | TokenKind::Eof
                            | TokenKind::LParen
                            | TokenKind::LBracket
                    )
            }
            TokenKind::Lt => self.template_type_ahead(),
            _ => false,
        }
    }

    /// Scans `Name < ... >` for a following identifier, bounded so a stray
    /// `<` in an expression cannot send the scan off the rails.
    fn template_type_ahead(&self) -> bool {
        let mut depth = 0usize;
        for i in 1..24 {
            match self.cursor.nth(i).kind {
                TokenKind::Lt => depth += 1,
                TokenKind::Gt => {
                    depth -= 1;
                    if depth == 0 {
                        return matches!(self.cursor.nth(i + 1).kind, TokenKind::Ident(_));
                    }
                }
                TokenKind::Ident(_)
                | TokenKind::Comma
                | TokenKind::KwVoid
                | TokenKind::KwBool
                | TokenKind::KwChar
                | TokenKind::KwInt
                | TokenKind::KwLong
                | TokenKind::KwFloat
                | TokenKind::KwDouble
                | TokenKind::Star => {}
                _ => return false,
            }
        }
        false
    }

    /// A type as written: optional `const`, base type, template arguments,
    /// then pointer/reference suffixes.
    pub(crate) fn parse_type(&mut self) -> Option<TypeRef> {
        self.cursor.eat(TokenKind::Const);
        let mut ty = match self.cursor.peek().kind {
            TokenKind::KwVoid => {
                self.cursor.advance();
                TypeRef::Void
            }
            TokenKind::KwBool => {
                self.cursor.advance();
                TypeRef::Bool
            }
            TokenKind::KwChar => {
                self.cursor.advance();
                TypeRef::Char
            }
            TokenKind::KwInt => {
                self.cursor.advance();
                TypeRef::Int
            }
            // `long` and `long long` both evaluate as 64-bit int.
            TokenKind::KwLong => {
                self.cursor.advance();
                while self.cursor.eat(TokenKind::KwLong).is_some() {}
                self.cursor.eat(TokenKind::KwInt);
                TypeRef::Int
            }
            // All floating point is f64 at runtime.
            TokenKind::KwFloat | TokenKind::KwDouble => {
                self.cursor.advance();
                TypeRef::Double
            }
            TokenKind::Ident(name) => {
                self.cursor.advance();
                if self.cursor.eat(TokenKind::Lt).is_some() {
                    let mut args = Vec::new();
                    loop {
                        args.push(self.parse_type()?);
                        if self.cursor.eat(TokenKind::Comma).is_none() {
                            break;
                        }
                    }
                    self.expect(TokenKind::Gt, "`>` closing template arguments")?;
                    TypeRef::Template(name, args)
                } else {
                    TypeRef::Named(name)
                }
            }
            _ => {
                self.error("a type");
                return None;
            }
        };
        self.cursor.eat(TokenKind::Const);
        loop {
            if self.cursor.eat(TokenKind::Star).is_some() {
                ty = TypeRef::Pointer(Box::new(ty));
            } else if self.cursor.eat(TokenKind::Amp).is_some() {
                ty = TypeRef::Reference(Box::new(ty));
            } else {
                break;
            }
        }
        Some(ty)
    }

    /// A free function or a variable declaration, disambiguated by the
    /// token after the declarator name.
    pub(crate) fn var_or_fn_decl(&mut self) -> Option<Decl> {
        let start = self.cursor.peek().span;
        let ty = self.parse_type()?;
        let (name, name_span) = self.expect_ident("a declarator name")?;

        if self.cursor.at(TokenKind::LParen) {
            let params = self.param_list()?;
            let (body, end) = if self.cursor.at(TokenKind::LBrace) {
                let block = self.block()?;
                let span = block.span;
                (Some(block), span)
            } else {
                self.expect_semicolon();
                (None, name_span)
            };
            return Some(Decl::Function(FunctionDecl {
                name,
                ret: ty,
                params,
                body,
                span: start.merge(end),
            }));
        }

        let ty = self.array_suffix(ty, name)?;
        let init = if self.cursor.eat(TokenKind::Assign).is_some() {
            Some(self.expr()?)
        } else {
            None
        };
        let end = init.as_ref().map_or(name_span, Expr::span);
        self.expect_semicolon();
        Some(Decl::Variable(VarDecl {
            name,
            ty,
            init,
            span: start.merge(end),
        }))
    }

    /// `[N]` suffixes after a declarator name; sizes must be integer
    /// literals once the preprocessor has run.
    fn array_suffix(&mut self, ty: TypeRef, name: ced_ir::Name) -> Option<TypeRef> {
        let mut dims = Vec::new();
        while self.cursor.eat(TokenKind::LBracket).is_some() {
            if self.cursor.eat(TokenKind::RBracket).is_some() {
                dims.push(None);
                continue;
            }
            match self.cursor.peek().kind {
                TokenKind::Int(n) if n >= 0 => {
                    self.cursor.advance();
                    dims.push(Some(n as u64));
                }
                _ => {
                    let rendered = self.interner.lookup(name).to_owned();
                    self.error(format!("a constant array size for `{rendered}`"));
                    return None;
                }
            }
            self.expect(TokenKind::RBracket, "`]`")?;
        }
        Some(dims.into_iter().rev().fold(ty, |inner, dim| {
            TypeRef::Array(Box::new(inner), dim)
        }))
    }

    fn param_list(&mut self) -> Option<Vec<Param>> {
        self.expect(TokenKind::LParen, "`(`")?;
        let mut params = Vec::new();
        if self.cursor.eat(TokenKind::RParen).is_some() {
            return Some(params);
        }
        // `f(void)` means no parameters.
        if self.cursor.at(TokenKind::KwVoid)
            && matches!(self.cursor.nth(1).kind, TokenKind::RParen)
        {
            self.cursor.advance();
            self.cursor.advance();
            return Some(params);
        }
        loop {
            let start = self.cursor.peek().span;
            let ty = self.parse_type()?;
            let (name, span) = match self.cursor.peek().kind {
                TokenKind::Ident(name) => {
                    let tok = self.cursor.advance();
                    (name, start.merge(tok.span))
                }
                // Unnamed parameter, as in a prototype.
                _ => (ced_ir::Name::EMPTY, start),
            };
            params.push(Param { name, ty, span });
            if self.cursor.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::RParen, "`)` closing the parameter list")?;
        Some(params)
    }

    fn class_decl(&mut self) -> Option<ClassDecl> {
        let kw = self.cursor.advance();
        let is_struct = kw.kind == TokenKind::Struct;
        let (name, _) = self.expect_ident("a class name")?;

        let mut bases = Vec::new();
        if self.cursor.eat(TokenKind::Colon).is_some() {
            loop {
                let access = self.eat_access().unwrap_or(if is_struct {
                    Access::Public
                } else {
                    Access::Private
                });
                let (base, base_span) = self.expect_ident("a base class name")?;
                bases.push(BaseSpecifier {
                    name: base,
                    access,
                    span: base_span,
                });
                if self.cursor.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }

        self.expect(TokenKind::LBrace, "`{` opening the class body")?;
        let default_access = if is_struct {
            Access::Public
        } else {
            Access::Private
        };
        let mut access = default_access;
        let mut members = Vec::new();

        while !self.cursor.at(TokenKind::RBrace) && !self.cursor.at_eof() {
            if let Some(label) = self.eat_access() {
                self.expect(TokenKind::Colon, "`:` after access specifier");
                access = label;
                continue;
            }
            match self.class_member(name, access) {
                Some(member) => members.push(member),
                None => self.recover_in_class(),
            }
        }
        let close = self.expect(TokenKind::RBrace, "`}` closing the class body");
        if self.cursor.eat(TokenKind::Semicolon).is_none() {
            self.error("`;` after class definition");
        }

        let end = close.map_or(kw.span, |t| t.span);
        Some(ClassDecl {
            name,
            is_struct,
            bases,
            members,
            span: kw.span.merge(end),
        })
    }

    fn eat_access(&mut self) -> Option<Access> {
        let access = match self.cursor.peek().kind {
            TokenKind::Public => Access::Public,
            TokenKind::Protected => Access::Protected,
            TokenKind::Private => Access::Private,
            _ => return None,
        };
        self.cursor.advance();
        Some(access)
    }

    fn class_member(&mut self, class: ced_ir::Name, access: Access) -> Option<ClassMember> {
        let start = self.cursor.peek().span;
        let mut is_virtual = false;
        let mut is_static = false;
        loop {
            if self.cursor.eat(TokenKind::Virtual).is_some() {
                is_virtual = true;
            } else if self.cursor.eat(TokenKind::Static).is_some() {
                is_static = true;
            } else {
                break;
            }
        }

        // Constructor: the class name followed directly by `(`.
        if self.cursor.ident_name(0) == Some(class)
            && matches!(self.cursor.nth(1).kind, TokenKind::LParen)
        {
            let (name, name_span) = self.expect_ident("a constructor name")?;
            let params = self.param_list()?;
            let (body, end) = self.method_body(name_span)?;
            return Some(ClassMember::Method(MethodDecl {
                name,
                ret: TypeRef::Void,
                params,
                body,
                access,
                is_virtual,
                is_static,
                span: start.merge(end),
            }));
        }

        let ty = self.parse_type()?;
        let (name, name_span) = self.expect_ident("a member name")?;

        if self.cursor.at(TokenKind::LParen) {
            let params = self.param_list()?;
            let (body, end) = self.method_body(name_span)?;
            return Some(ClassMember::Method(MethodDecl {
                name,
                ret: ty,
                params,
                body,
                access,
                is_virtual,
                is_static,
                span: start.merge(end),
            }));
        }

        let ty = self.array_suffix(ty, name)?;
        self.expect_semicolon();
        Some(ClassMember::Field(FieldDecl {
            name,
            ty,
            access,
            is_static,
            span: start.merge(name_span),
        }))
    }

    fn method_body(
        &mut self,
        name_span: ced_ir::Span,
    ) -> Option<(Option<ced_ir::Block>, ced_ir::Span)> {
        if self.cursor.at(TokenKind::LBrace) {
            let block = self.block()?;
            let span = block.span;
            Some((Some(block), span))
        } else {
            self.expect_semicolon();
            Some((None, name_span))
        }
    }

    /// Skips to the next `;` (eaten) or the closing `}` (left in place).
    fn recover_in_class(&mut self) {
        while !self.cursor.at_eof() {
            match self.cursor.peek().kind {
                TokenKind::Semicolon => {
                    self.cursor.advance();
                    return;
                }
                TokenKind::RBrace => return,
                _ => {
                    self.cursor.advance();
                }
            }
        }
    }

    fn namespace_decl(&mut self) -> Option<NamespaceDecl> {
        let kw = self.cursor.advance();
        let (name, _) = self.expect_ident("a namespace name")?;
        self.expect(TokenKind::LBrace, "`{` opening the namespace")?;

        let mut items = Vec::new();
        while !self.cursor.at(TokenKind::RBrace) && !self.cursor.at_eof() {
            match self.item() {
                Some(Item::Decl(decl)) => items.push(decl),
                Some(Item::Stmt(stmt)) => {
                    self.errors.push(crate::ParseError {
                        expected: "a declaration inside the namespace".to_owned(),
                        found: "a statement".to_owned(),
                        span: stmt.span(),
                    });
                }
                None => self.synchronize(),
            }
        }
        let close = self.expect(TokenKind::RBrace, "`}` closing the namespace")?;

        Some(NamespaceDecl {
            name,
            items,
            span: kw.span.merge(close.span),
        })
    }

    /// `template<typename T, ...>` followed by the declaration it
    /// parameterizes. Recorded, never instantiated.
    fn template_decl(&mut self) -> Option<TemplateDecl> {
        let kw = self.cursor.advance();
        self.expect(TokenKind::Lt, "`<` after `template`")?;

        let mut params = Vec::new();
        loop {
            if self
                .cursor
                .eat(TokenKind::Typename)
                .or_else(|| self.cursor.eat(TokenKind::Class))
                .is_none()
            {
                self.error("`typename` or `class`");
                return None;
            }
            let (name, _) = self.expect_ident("a template parameter name")?;
            params.push(name);
            if self.cursor.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::Gt, "`>` closing the template parameters")?;

        let decl = match self.cursor.peek().kind {
            TokenKind::Class | TokenKind::Struct => Decl::Class(self.class_decl()?),
            _ => self.var_or_fn_decl()?,
        };

        Some(TemplateDecl {
            span: kw.span.merge(decl.span()),
            params,
            decl: Box::new(decl),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ced_ir::{StringInterner, TranslationUnit};
    use pretty_assertions::assert_eq;

    fn parse_ok(source: &str) -> (TranslationUnit, StringInterner) {
        let interner = StringInterner::new();
        let (tokens, lex_errors) = ced_lexer::lex(source, &interner);
        assert!(lex_errors.is_empty());
        let (unit, errors) = crate::parse(&tokens, &interner);
        assert_eq!(errors, vec![], "unexpected parse errors");
        (unit, interner)
    }

    fn single_class(unit: &TranslationUnit) -> &ClassDecl {
        match &unit.items[0] {
            Item::Decl(Decl::Class(class)) => class,
            other => panic!("expected class, got {other:?}"),
        }
    }

    #[test]
    fn class_with_base_and_members() {
        let source = "\
class B : public A {
public:
    int x;
    virtual double area(int scale);
    B(int x0) { x = x0; }
private:
    double hidden;
};";
        let (unit, interner) = parse_ok(source);
        let class = single_class(&unit);

        assert!(!class.is_struct);
        assert_eq!(class.bases.len(), 1);
        assert_eq!(class.bases[0].access, Access::Public);
        assert_eq!(class.members.len(), 4);

        let ClassMember::Field(x) = &class.members[0] else {
            panic!("expected field");
        };
        assert_eq!(x.access, Access::Public);

        let ClassMember::Method(area) = &class.members[1] else {
            panic!("expected method");
        };
        assert!(area.is_virtual);
        assert!(area.body.is_none());

        let ClassMember::Method(ctor) = &class.members[2] else {
            panic!("expected constructor");
        };
        assert_eq!(ctor.name, interner.intern("B"));
        assert!(ctor.body.is_some());

        let ClassMember::Field(hidden) = &class.members[3] else {
            panic!("expected field");
        };
        assert_eq!(hidden.access, Access::Private);
    }

    #[test]
    fn struct_members_default_public() {
        let (unit, _) = parse_ok("struct P { int x; int y; };");
        let class = single_class(&unit);
        assert!(class.is_struct);
        for member in &class.members {
            let ClassMember::Field(f) = member else {
                panic!("expected field");
            };
            assert_eq!(f.access, Access::Public);
        }
    }

    #[test]
    fn namespace_holds_declarations() {
        let (unit, interner) = parse_ok("namespace Math { double pi = 3.14; int abs(int v) { return v; } }");
        let Item::Decl(Decl::Namespace(ns)) = &unit.items[0] else {
            panic!("expected namespace");
        };
        assert_eq!(ns.name, interner.intern("Math"));
        assert_eq!(ns.items.len(), 2);
    }

    #[test]
    fn function_with_body_and_prototype() {
        let (unit, _) = parse_ok("int add(int a, int b) { return a + b; }\nint sub(int, int);");
        let Item::Decl(Decl::Function(add)) = &unit.items[0] else {
            panic!("expected function");
        };
        assert_eq!(add.params.len(), 2);
        assert!(add.body.is_some());

        let Item::Decl(Decl::Function(sub)) = &unit.items[1] else {
            panic!("expected function");
        };
        assert!(sub.body.is_none());
    }

    #[test]
    fn template_recorded_not_expanded() {
        let (unit, interner) = parse_ok("template<typename T> class Box { };");
        let Item::Decl(Decl::Template(tmpl)) = &unit.items[0] else {
            panic!("expected template");
        };
        assert_eq!(tmpl.params, vec![interner.intern("T")]);
        assert!(matches!(*tmpl.decl, Decl::Class(_)));
    }

    #[test]
    fn array_declaration_with_literal_size() {
        let (unit, _) = parse_ok("int arr[5];");
        let Item::Decl(Decl::Variable(var)) = &unit.items[0] else {
            panic!("expected variable");
        };
        assert_eq!(var.ty, TypeRef::Array(Box::new(TypeRef::Int), Some(5)));
    }

    #[test]
    fn pointer_declaration_heuristic() {
        let (unit, _) = parse_ok("Base* p = new Derived();");
        let Item::Decl(Decl::Variable(var)) = &unit.items[0] else {
            panic!("expected variable, got {:?}", unit.items[0]);
        };
        assert!(matches!(var.ty, TypeRef::Pointer(_)));
        assert!(matches!(var.init, Some(Expr::New { .. })));
    }

    #[test]
    fn template_type_declaration() {
        let (unit, _) = parse_ok("vector<int> v;");
        let Item::Decl(Decl::Variable(var)) = &unit.items[0] else {
            panic!("expected variable, got {:?}", unit.items[0]);
        };
        assert!(matches!(var.ty, TypeRef::Template(_, _)));
    }

    #[test]
    fn void_parameter_list_is_empty() {
        let (unit, _) = parse_ok("int f(void) { return 1; }");
        let Item::Decl(Decl::Function(f)) = &unit.items[0] else {
            panic!("expected function");
        };
        assert_eq!(f.params.len(), 0);
    }
}
