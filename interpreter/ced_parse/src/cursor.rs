//! Token cursor and recovery sets.

use ced_ir::{Name, Span, Token, TokenKind, TokenList};

/// Bitset over token kinds, used for recovery points.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct TokenSet(u128);

impl TokenSet {
    pub(crate) const fn new(kinds: &[TokenKind]) -> Self {
        let mut bits = 0u128;
        let mut i = 0;
        while i < kinds.len() {
            bits |= 1 << kinds[i].discriminant_index();
            i += 1;
        }
        TokenSet(bits)
    }

    pub(crate) const fn contains(self, kind: &TokenKind) -> bool {
        self.0 & (1 << kind.discriminant_index()) != 0
    }

    pub(crate) const fn union(self, other: TokenSet) -> TokenSet {
        TokenSet(self.0 | other.0)
    }
}

/// Kinds that can begin a statement; skipping stops here during recovery.
pub(crate) const STMT_START: TokenSet = TokenSet::new(&[
    TokenKind::If,
    TokenKind::While,
    TokenKind::For,
    TokenKind::Return,
    TokenKind::Break,
    TokenKind::Continue,
    TokenKind::LBrace,
    TokenKind::Class,
    TokenKind::Struct,
    TokenKind::Namespace,
    TokenKind::Template,
    TokenKind::KwVoid,
    TokenKind::KwBool,
    TokenKind::KwChar,
    TokenKind::KwInt,
    TokenKind::KwLong,
    TokenKind::KwFloat,
    TokenKind::KwDouble,
]);

/// Cursor over the preprocessed token stream.
///
/// Newlines, leftover directives, and error tokens are filtered up front;
/// the final `Eof` is kept and `peek` saturates on it.
#[derive(Debug)]
pub(crate) struct Cursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl Cursor {
    pub(crate) fn new(tokens: &TokenList) -> Self {
        let tokens: Vec<Token> = tokens
            .iter()
            .filter(|tok| {
                !matches!(tok.kind, TokenKind::Newline | TokenKind::Error)
                    && !tok.kind.is_directive()
            })
            .copied()
            .collect();
        debug_assert!(matches!(
            tokens.last().map(|t| t.kind),
            Some(TokenKind::Eof) | None
        ));
        Cursor { tokens, pos: 0 }
    }

    pub(crate) fn peek(&self) -> Token {
        self.nth(0)
    }

    /// Token `n` ahead, saturating at `Eof`.
    pub(crate) fn nth(&self, n: usize) -> Token {
        self.tokens
            .get(self.pos + n)
            .or_else(|| self.tokens.last())
            .copied()
            .unwrap_or(Token::new(TokenKind::Eof, Span::DUMMY))
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek();
        if self.pos < self.tokens.len().saturating_sub(1) {
            self.pos += 1;
        } else {
            self.pos = self.tokens.len();
        }
        token
    }

    /// Same kind of token, payloads ignored.
    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.peek().kind.discriminant_index() == kind.discriminant_index()
    }

    pub(crate) fn at_set(&self, set: TokenSet) -> bool {
        set.contains(&self.peek().kind)
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        if self.at(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    pub(crate) fn at_ident(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Ident(_))
    }

    /// The identifier under the cursor, without consuming it.
    pub(crate) fn ident_name(&self, n: usize) -> Option<Name> {
        match self.nth(n).kind {
            TokenKind::Ident(name) => Some(name),
            _ => None,
        }
    }

    pub(crate) fn at_eof(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_membership_ignores_payloads() {
        let set = TokenSet::new(&[TokenKind::Int(0), TokenKind::Semicolon]);
        assert!(set.contains(&TokenKind::Int(42)));
        assert!(set.contains(&TokenKind::Semicolon));
        assert!(!set.contains(&TokenKind::Comma));
    }

    #[test]
    fn cursor_saturates_at_eof() {
        let mut tokens = TokenList::new();
        tokens.push(Token::new(TokenKind::Semicolon, Span::new(0, 1)));
        tokens.push(Token::new(TokenKind::Eof, Span::point(1)));

        let mut cursor = Cursor::new(&tokens);
        cursor.advance();
        cursor.advance();
        cursor.advance();
        assert!(cursor.at_eof());
    }

    #[test]
    fn cursor_filters_newlines_and_directives() {
        let mut tokens = TokenList::new();
        tokens.push(Token::new(TokenKind::Define, Span::DUMMY));
        tokens.push(Token::new(TokenKind::Newline, Span::DUMMY));
        tokens.push(Token::new(TokenKind::Int(1), Span::DUMMY));
        tokens.push(Token::new(TokenKind::Eof, Span::DUMMY));

        let cursor = Cursor::new(&tokens);
        assert!(matches!(cursor.peek().kind, TokenKind::Int(1)));
    }
}
