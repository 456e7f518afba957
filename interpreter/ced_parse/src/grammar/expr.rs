//! Expression rules.
//!
//! Precedence climbing with the standard C ladder: assignment lowest and
//! right-associative, then `?:`, then the binary operators, with unary and
//! postfix binding tightest. The comma operator is deliberately excluded.

use crate::Parser;
use ced_ir::{AssignOp, BinaryOp, Expr, TokenKind, UnaryOp};

/// Left binding power per binary operator; higher binds tighter.
fn infix_power(kind: TokenKind) -> Option<(BinaryOp, u8)> {
    let entry = match kind {
        TokenKind::PipePipe => (BinaryOp::Or, 1),
        TokenKind::AmpAmp => (BinaryOp::And, 2),
        TokenKind::Pipe => (BinaryOp::BitOr, 3),
        TokenKind::Caret => (BinaryOp::BitXor, 4),
        TokenKind::Amp => (BinaryOp::BitAnd, 5),
        TokenKind::EqEq => (BinaryOp::Eq, 6),
        TokenKind::NotEq => (BinaryOp::NotEq, 6),
        TokenKind::Lt => (BinaryOp::Lt, 7),
        TokenKind::LtEq => (BinaryOp::LtEq, 7),
        TokenKind::Gt => (BinaryOp::Gt, 7),
        TokenKind::GtEq => (BinaryOp::GtEq, 7),
        TokenKind::Shl => (BinaryOp::Shl, 8),
        TokenKind::Shr => (BinaryOp::Shr, 8),
        TokenKind::Plus => (BinaryOp::Add, 9),
        TokenKind::Minus => (BinaryOp::Sub, 9),
        TokenKind::Star => (BinaryOp::Mul, 10),
        TokenKind::Slash => (BinaryOp::Div, 10),
        TokenKind::Percent => (BinaryOp::Mod, 10),
        _ => return None,
    };
    Some(entry)
}

fn assign_op(kind: TokenKind) -> Option<AssignOp> {
    let op = match kind {
        TokenKind::Assign => AssignOp::Assign,
        TokenKind::PlusEq => AssignOp::Add,
        TokenKind::MinusEq => AssignOp::Sub,
        TokenKind::StarEq => AssignOp::Mul,
        TokenKind::SlashEq => AssignOp::Div,
        TokenKind::PercentEq => AssignOp::Mod,
        TokenKind::ShlEq => AssignOp::Shl,
        TokenKind::ShrEq => AssignOp::Shr,
        TokenKind::AmpEq => AssignOp::BitAnd,
        TokenKind::PipeEq => AssignOp::BitOr,
        TokenKind::CaretEq => AssignOp::BitXor,
        _ => return None,
    };
    Some(op)
}

impl Parser<'_> {
    pub(crate) fn expr(&mut self) -> Option<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> Option<Expr> {
        let target = self.conditional()?;
        let Some(op) = assign_op(self.cursor.peek().kind) else {
            return Some(target);
        };
        self.cursor.advance();
        // Right-associative: `a = b = c` nests to the right.
        let value = self.assignment()?;
        let span = target.span().merge(value.span());
        Some(Expr::Assign {
            op,
            target: Box::new(target),
            value: Box::new(value),
            span,
        })
    }

    fn conditional(&mut self) -> Option<Expr> {
        let cond = self.binary(0)?;
        if self.cursor.eat(TokenKind::Question).is_none() {
            return Some(cond);
        }
        let then_expr = self.expr()?;
        self.expect(TokenKind::Colon, "`:` in the conditional expression")?;
        let else_expr = self.conditional()?;
        let span = cond.span().merge(else_expr.span());
        Some(Expr::Conditional {
            cond: Box::new(cond),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
            span,
        })
    }

    fn binary(&mut self, min_power: u8) -> Option<Expr> {
        let mut lhs = self.unary()?;
        while let Some((op, power)) = infix_power(self.cursor.peek().kind) {
            if power < min_power {
                break;
            }
            self.cursor.advance();
            let rhs = self.binary(power + 1)?;
            let span = lhs.span().merge(rhs.span());
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            };
        }
        Some(lhs)
    }

    fn unary(&mut self) -> Option<Expr> {
        let token = self.cursor.peek();
        let op = match token.kind {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::Star => Some(UnaryOp::Deref),
            TokenKind::Amp => Some(UnaryOp::AddrOf),
            _ => None,
        };
        if let Some(op) = op {
            self.cursor.advance();
            let operand = self.unary()?;
            let span = token.span.merge(operand.span());
            return Some(Expr::Unary {
                op,
                operand: Box::new(operand),
                span,
            });
        }
        match token.kind {
            // Unary plus is a no-op.
            TokenKind::Plus => {
                self.cursor.advance();
                self.unary()
            }
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let increment = token.kind == TokenKind::PlusPlus;
                self.cursor.advance();
                let target = self.unary()?;
                let span = token.span.merge(target.span());
                Some(Expr::IncDec {
                    increment,
                    prefix: true,
                    target: Box::new(target),
                    span,
                })
            }
            TokenKind::New => self.new_expr(),
            _ => self.postfix(),
        }
    }

    fn new_expr(&mut self) -> Option<Expr> {
        let kw = self.cursor.advance();
        let (class, class_span) = self.expect_ident("a class name after `new`")?;
        let (args, end) = if self.cursor.at(TokenKind::LParen) {
            self.call_args()?
        } else {
            (Vec::new(), class_span)
        };
        Some(Expr::New {
            class,
            args,
            span: kw.span.merge(end),
        })
    }

    fn postfix(&mut self) -> Option<Expr> {
        let mut expr = self.primary()?;
        loop {
            match self.cursor.peek().kind {
                TokenKind::LParen => {
                    let (args, end) = self.call_args()?;
                    let span = expr.span().merge(end);
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                        span,
                    };
                }
                TokenKind::LBracket => {
                    self.cursor.advance();
                    let index = self.expr()?;
                    let close = self.expect(TokenKind::RBracket, "`]`")?;
                    let span = expr.span().merge(close.span);
                    expr = Expr::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                        span,
                    };
                }
                TokenKind::Dot | TokenKind::Arrow => {
                    let arrow = self.cursor.advance().kind == TokenKind::Arrow;
                    let (member, member_span) = self.expect_ident("a member name")?;
                    let span = expr.span().merge(member_span);
                    expr = Expr::Member {
                        object: Box::new(expr),
                        member,
                        arrow,
                        span,
                    };
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let token = self.cursor.advance();
                    let span = expr.span().merge(token.span);
                    expr = Expr::IncDec {
                        increment: token.kind == TokenKind::PlusPlus,
                        prefix: false,
                        target: Box::new(expr),
                        span,
                    };
                }
                _ => break,
            }
        }
        Some(expr)
    }

    fn call_args(&mut self) -> Option<(Vec<Expr>, ced_ir::Span)> {
        self.expect(TokenKind::LParen, "`(`")?;
        let mut args = Vec::new();
        if let Some(close) = self.cursor.eat(TokenKind::RParen) {
            return Some((args, close.span));
        }
        loop {
            args.push(self.expr()?);
            if self.cursor.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        let close = self.expect(TokenKind::RParen, "`)` closing the argument list")?;
        Some((args, close.span))
    }

    fn primary(&mut self) -> Option<Expr> {
        let token = self.cursor.peek();
        let expr = match token.kind {
            TokenKind::Int(value) => {
                self.cursor.advance();
                Expr::IntLit {
                    value,
                    span: token.span,
                }
            }
            TokenKind::Float(bits) => {
                self.cursor.advance();
                Expr::FloatLit {
                    bits,
                    span: token.span,
                }
            }
            TokenKind::True | TokenKind::False => {
                self.cursor.advance();
                Expr::BoolLit {
                    value: token.kind == TokenKind::True,
                    span: token.span,
                }
            }
            TokenKind::CharLit(value) => {
                self.cursor.advance();
                Expr::CharLit {
                    value,
                    span: token.span,
                }
            }
            TokenKind::Str(value) => {
                self.cursor.advance();
                Expr::StrLit {
                    value,
                    span: token.span,
                }
            }
            TokenKind::Nullptr => {
                self.cursor.advance();
                Expr::NullLit { span: token.span }
            }
            TokenKind::LParen => {
                self.cursor.advance();
                let inner = self.expr()?;
                self.expect(TokenKind::RParen, "`)`")?;
                inner
            }
            TokenKind::Ident(name) => {
                self.cursor.advance();
                return Some(self.path_tail(name, token.span));
            }
            _ => {
                self.error("an expression");
                return None;
            }
        };
        Some(expr)
    }

    /// `A::b::c` qualified names; a single segment stays a plain `Ident`.
    fn path_tail(&mut self, first: ced_ir::Name, start: ced_ir::Span) -> Expr {
        let mut segments = vec![first];
        let mut end = start;
        while self.cursor.at(TokenKind::ColonColon) {
            let Some(next) = self.cursor.ident_name(1) else {
                break;
            };
            self.cursor.advance();
            end = self.cursor.advance().span;
            segments.push(next);
        }
        if segments.len() == 1 {
            Expr::Ident {
                name: first,
                span: start,
            }
        } else {
            Expr::Path {
                segments,
                span: start.merge(end),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ced_ir::{Item, Stmt, StringInterner};
    use pretty_assertions::assert_eq;

    fn parse_expr(source: &str) -> Expr {
        let interner = StringInterner::new();
        let (tokens, _) = ced_lexer::lex(source, &interner);
        let (unit, errors) = crate::parse(&tokens, &interner);
        assert_eq!(errors, vec![], "unexpected errors for {source:?}");
        match unit.items.into_iter().next() {
            Some(Item::Stmt(Stmt::Expr(expr))) => expr,
            other => panic!("expected expression, got {other:?}"),
        }
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let expr = parse_expr("1 + 2 * 3");
        let Expr::Binary { op, rhs, .. } = expr else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Add);
        assert!(matches!(
            *rhs,
            Expr::Binary {
                op: BinaryOp::Mul,
                ..
            }
        ));
    }

    #[test]
    fn assignment_is_right_associative() {
        let expr = parse_expr("a = b = 1");
        let Expr::Assign { value, .. } = expr else {
            panic!("expected assignment");
        };
        assert!(matches!(*value, Expr::Assign { .. }));
    }

    #[test]
    fn compound_assignment() {
        let expr = parse_expr("a += 2");
        assert!(matches!(
            expr,
            Expr::Assign {
                op: AssignOp::Add,
                ..
            }
        ));
    }

    #[test]
    fn conditional_expression() {
        let expr = parse_expr("a > b ? a : b");
        assert!(matches!(expr, Expr::Conditional { .. }));
    }

    #[test]
    fn postfix_chain() {
        let expr = parse_expr("p->next.items[0](1, 2)");
        let Expr::Call { callee, args, .. } = expr else {
            panic!("expected call");
        };
        assert_eq!(args.len(), 2);
        assert!(matches!(*callee, Expr::Index { .. }));
    }

    #[test]
    fn comparison_chain_groups_left() {
        let expr = parse_expr("1 < 2 == true");
        let Expr::Binary { op, lhs, .. } = expr else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Eq);
        assert!(matches!(
            *lhs,
            Expr::Binary {
                op: BinaryOp::Lt,
                ..
            }
        ));
    }

    #[test]
    fn qualified_path() {
        let interner = StringInterner::new();
        let (tokens, _) = ced_lexer::lex("Math::pi", &interner);
        let (unit, errors) = crate::parse(&tokens, &interner);
        assert_eq!(errors, vec![]);
        let Item::Stmt(Stmt::Expr(Expr::Path { segments, .. })) = &unit.items[0] else {
            panic!("expected path");
        };
        assert_eq!(
            segments,
            &vec![interner.intern("Math"), interner.intern("pi")]
        );
    }

    #[test]
    fn new_with_and_without_arguments() {
        assert!(matches!(parse_expr("new Foo(1)"), Expr::New { .. }));
        let Expr::New { args, .. } = parse_expr("new Foo") else {
            panic!("expected new");
        };
        assert!(args.is_empty());
    }

    #[test]
    fn prefix_and_postfix_incdec() {
        assert!(matches!(
            parse_expr("++i"),
            Expr::IncDec { prefix: true, .. }
        ));
        assert!(matches!(
            parse_expr("i++"),
            Expr::IncDec { prefix: false, .. }
        ));
    }

    #[test]
    fn unary_minus_and_logical_not() {
        let expr = parse_expr("-x + !y");
        let Expr::Binary { lhs, rhs, .. } = expr else {
            panic!("expected binary");
        };
        assert!(matches!(
            *lhs,
            Expr::Unary {
                op: UnaryOp::Neg,
                ..
            }
        ));
        assert!(matches!(
            *rhs,
            Expr::Unary {
                op: UnaryOp::Not,
                ..
            }
        ));
    }
}
