//! Parser for the Cedilla C++ subset.
//!
//! Recursive descent over the preprocessed token stream, one
//! `TranslationUnit` per pass. Parse failures recover at statement
//! granularity (skip to the next terminator or statement start), so a
//! single pass reports every error it can find. The parser never consults
//! the symbol table; overloads and member dispatch are resolved later by
//! the evaluator.

mod cursor;
mod error;
mod grammar;

pub use error::ParseError;

use ced_ir::{Name, Span, StringInterner, Token, TokenKind, TokenList, TranslationUnit};
use cursor::{Cursor, STMT_START};

/// Parse one translation unit, collecting every error encountered.
pub fn parse(
    tokens: &TokenList,
    interner: &StringInterner,
) -> (TranslationUnit, Vec<ParseError>) {
    Parser::new(tokens, interner).parse_unit()
}

pub struct Parser<'a> {
    cursor: Cursor,
    interner: &'a StringInterner,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &TokenList, interner: &'a StringInterner) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            interner,
            errors: Vec::new(),
        }
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub fn parse_unit(mut self) -> (TranslationUnit, Vec<ParseError>) {
        let mut unit = TranslationUnit::new();
        while !self.cursor.at_eof() {
            match self.item() {
                Some(item) => unit.items.push(item),
                None => self.synchronize(),
            }
        }
        (unit, self.errors)
    }

    /// Records an error at the current token.
    fn error(&mut self, expected: impl Into<String>) {
        let found = self.cursor.peek();
        self.errors.push(ParseError {
            expected: expected.into(),
            found: found.kind.describe().to_owned(),
            span: found.span,
        });
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Option<Token> {
        let token = self.cursor.eat(kind);
        if token.is_none() {
            self.error(expected);
        }
        token
    }

    fn expect_ident(&mut self, expected: &str) -> Option<(Name, Span)> {
        match self.cursor.peek().kind {
            TokenKind::Ident(name) => {
                let token = self.cursor.advance();
                Some((name, token.span))
            }
            _ => {
                self.error(expected);
                None
            }
        }
    }

    /// A `;`, or end of input for interactive fragments.
    fn expect_semicolon(&mut self) {
        if self.cursor.eat(TokenKind::Semicolon).is_none() && !self.cursor.at_eof() {
            self.error("`;`");
        }
    }

    /// Skips to the next statement boundary after a failed rule.
    fn synchronize(&mut self) {
        if self.cursor.at_eof() {
            return;
        }
        self.cursor.advance();
        while !self.cursor.at_eof() {
            match self.cursor.peek().kind {
                TokenKind::Semicolon | TokenKind::RBrace => {
                    self.cursor.advance();
                    return;
                }
                _ if self.cursor.at_set(STMT_START) => return,
                _ => {
                    self.cursor.advance();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ced_ir::{BinaryOp, Decl, Expr, Item, Stmt, TypeRef};
    use pretty_assertions::assert_eq;

    fn parse_source(source: &str) -> (TranslationUnit, Vec<ParseError>, StringInterner) {
        let interner = StringInterner::new();
        let (tokens, lex_errors) = ced_lexer::lex(source, &interner);
        assert!(lex_errors.is_empty(), "lex errors: {lex_errors:?}");
        let (unit, errors) = parse(&tokens, &interner);
        (unit, errors, interner)
    }

    #[test]
    fn variable_declaration_with_initializer() {
        let (unit, errors, _) = parse_source("int x = 2 + 3;");
        assert_eq!(errors, vec![]);
        assert_eq!(unit.items.len(), 1);

        let Item::Decl(Decl::Variable(var)) = &unit.items[0] else {
            panic!("expected variable declaration, got {:?}", unit.items[0]);
        };
        assert_eq!(var.ty, TypeRef::Int);
        assert!(matches!(
            var.init,
            Some(Expr::Binary {
                op: BinaryOp::Add,
                ..
            })
        ));
    }

    #[test]
    fn bare_expression_fragment_parses() {
        let (unit, errors, _) = parse_source("x * 10");
        assert_eq!(errors, vec![]);
        assert!(matches!(
            unit.items[0],
            Item::Stmt(Stmt::Expr(Expr::Binary {
                op: BinaryOp::Mul,
                ..
            }))
        ));
    }

    #[test]
    fn error_recovery_reports_and_continues() {
        let (unit, errors, _) = parse_source("int x = ;\nint y = 2;");
        assert_eq!(errors.len(), 1);
        // `y` still parses after recovery.
        let decls = unit
            .items
            .iter()
            .filter(|i| matches!(i, Item::Decl(Decl::Variable(_))))
            .count();
        assert_eq!(decls, 1);
    }

    #[test]
    fn multiple_errors_in_one_pass() {
        let (_, errors, _) = parse_source("int = 1;\nint y = ;\nint z = 3;");
        assert!(errors.len() >= 2, "got {errors:?}");
    }
}
