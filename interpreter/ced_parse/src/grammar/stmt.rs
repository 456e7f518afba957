//! Statement rules.

use crate::Parser;
use ced_ir::{Block, Decl, Stmt, TokenKind};

impl Parser<'_> {
    pub(crate) fn stmt(&mut self) -> Option<Stmt> {
        match self.cursor.peek().kind {
            TokenKind::LBrace => self.block().map(Stmt::Block),
            TokenKind::If => self.if_stmt(),
            TokenKind::While => self.while_stmt(),
            TokenKind::For => self.for_stmt(),
            TokenKind::Return => self.return_stmt(),
            TokenKind::Break => {
                let kw = self.cursor.advance();
                self.expect_semicolon();
                Some(Stmt::Break { span: kw.span })
            }
            TokenKind::Continue => {
                let kw = self.cursor.advance();
                self.expect_semicolon();
                Some(Stmt::Continue { span: kw.span })
            }
            TokenKind::Semicolon => {
                let tok = self.cursor.advance();
                Some(Stmt::Empty { span: tok.span })
            }
            _ if self.starts_declaration() => self.local_decl(),
            _ => {
                let expr = self.expr()?;
                self.expect_semicolon();
                Some(Stmt::Expr(expr))
            }
        }
    }

    pub(crate) fn block(&mut self) -> Option<Block> {
        let open = self.expect(TokenKind::LBrace, "`{`")?;
        let mut stmts = Vec::new();
        while !self.cursor.at(TokenKind::RBrace) && !self.cursor.at_eof() {
            match self.stmt() {
                Some(stmt) => stmts.push(stmt),
                None => self.synchronize(),
            }
        }
        let close = self.expect(TokenKind::RBrace, "`}` closing the block")?;
        Some(Block {
            stmts,
            span: open.span.merge(close.span),
        })
    }

    /// A declaration in statement position. Only variables make sense
    /// here; a nested function is reported and dropped.
    fn local_decl(&mut self) -> Option<Stmt> {
        match self.var_or_fn_decl()? {
            Decl::Variable(var) => Some(Stmt::Decl(var)),
            other => {
                self.errors.push(crate::ParseError {
                    expected: "a variable declaration".to_owned(),
                    found: "a nested function".to_owned(),
                    span: other.span(),
                });
                None
            }
        }
    }

    fn if_stmt(&mut self) -> Option<Stmt> {
        let kw = self.cursor.advance();
        self.expect(TokenKind::LParen, "`(` after `if`")?;
        let cond = self.expr()?;
        self.expect(TokenKind::RParen, "`)` closing the condition")?;
        let then_branch = Box::new(self.stmt()?);
        let else_branch = if self.cursor.eat(TokenKind::Else).is_some() {
            Some(Box::new(self.stmt()?))
        } else {
            None
        };
        let end = else_branch
            .as_deref()
            .map_or_else(|| then_branch.span(), Stmt::span);
        Some(Stmt::If {
            cond,
            then_branch,
            else_branch,
            span: kw.span.merge(end),
        })
    }

    fn while_stmt(&mut self) -> Option<Stmt> {
        let kw = self.cursor.advance();
        self.expect(TokenKind::LParen, "`(` after `while`")?;
        let cond = self.expr()?;
        self.expect(TokenKind::RParen, "`)` closing the condition")?;
        let body = Box::new(self.stmt()?);
        let span = kw.span.merge(body.span());
        Some(Stmt::While { cond, body, span })
    }

    fn for_stmt(&mut self) -> Option<Stmt> {
        let kw = self.cursor.advance();
        self.expect(TokenKind::LParen, "`(` after `for`")?;

        // The init clause eats its own `;`, whichever form it takes.
        let init = if self.cursor.eat(TokenKind::Semicolon).is_some() {
            None
        } else if self.starts_declaration() {
            Some(Box::new(self.local_decl()?))
        } else {
            let expr = self.expr()?;
            self.expect(TokenKind::Semicolon, "`;` after the init clause")?;
            Some(Box::new(Stmt::Expr(expr)))
        };

        let cond = if self.cursor.at(TokenKind::Semicolon) {
            None
        } else {
            Some(self.expr()?)
        };
        self.expect(TokenKind::Semicolon, "`;` after the loop condition")?;

        let step = if self.cursor.at(TokenKind::RParen) {
            None
        } else {
            Some(self.expr()?)
        };
        self.expect(TokenKind::RParen, "`)` closing the `for` header")?;

        let body = Box::new(self.stmt()?);
        let span = kw.span.merge(body.span());
        Some(Stmt::For {
            init,
            cond,
            step,
            body,
            span,
        })
    }

    fn return_stmt(&mut self) -> Option<Stmt> {
        let kw = self.cursor.advance();
        let value = if self.cursor.at(TokenKind::Semicolon) || self.cursor.at_eof() {
            None
        } else {
            Some(self.expr()?)
        };
        let end = value.as_ref().map_or(kw.span, ced_ir::Expr::span);
        self.expect_semicolon();
        Some(Stmt::Return {
            value,
            span: kw.span.merge(end),
        })
    }
}
