//! Tokens produced by the lexer and rewritten by the preprocessor.

use crate::{Name, Span};
use std::fmt;
use std::ops::Index;

/// Token kind for the interpreted C++ subset.
///
/// Preprocessor directives survive lexing as tokens (`Include`, `Define`,
/// `Ifdef`, ...) so the preprocessor can run as a pure token-rewriting pass.
/// `Newline` is kept because directives are line-delimited; the parser
/// filters it out.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TokenKind {
    // Literals
    Int(i64),
    /// Float literal stored as bits so `TokenKind` stays `PartialEq`-exact.
    Float(u64),
    Str(Name),
    CharLit(char),
    True,
    False,
    Nullptr,

    Ident(Name),

    // Keywords
    Class,
    Struct,
    Namespace,
    Public,
    Private,
    Protected,
    Virtual,
    Static,
    Template,
    Typename,
    Const,
    If,
    Else,
    While,
    For,
    Return,
    Break,
    Continue,
    New,
    KwVoid,
    KwBool,
    KwChar,
    KwInt,
    KwLong,
    KwFloat,
    KwDouble,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Dot,
    Arrow,
    ColonColon,
    Colon,
    Question,

    // Operators
    Assign,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    ShlEq,
    ShrEq,
    AmpEq,
    PipeEq,
    CaretEq,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Shl,
    Shr,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Tilde,
    Amp,
    AmpAmp,
    Pipe,
    PipePipe,
    Caret,
    PlusPlus,
    MinusMinus,

    // Preprocessor directives
    Include { path: Name, angled: bool },
    Define,
    Undef,
    Ifdef,
    Ifndef,
    ElseDir,
    EndifDir,

    // Structure
    Newline,
    Error,
    Eof,
}

impl TokenKind {
    /// Stable per-variant index for bitset membership tests.
    ///
    /// Must stay below 128 so recovery sets fit in a `u128`.
    pub const fn discriminant_index(&self) -> u8 {
        match self {
            TokenKind::Int(_) => 0,
            TokenKind::Float(_) => 1,
            TokenKind::Str(_) => 2,
            TokenKind::CharLit(_) => 3,
            TokenKind::True => 4,
            TokenKind::False => 5,
            TokenKind::Nullptr => 6,
            TokenKind::Ident(_) => 7,
            TokenKind::Class => 8,
            TokenKind::Struct => 9,
            TokenKind::Namespace => 10,
            TokenKind::Public => 11,
            TokenKind::Private => 12,
            TokenKind::Protected => 13,
            TokenKind::Virtual => 14,
            TokenKind::Static => 15,
            TokenKind::Template => 16,
            TokenKind::Typename => 17,
            TokenKind::Const => 18,
            TokenKind::If => 19,
            TokenKind::Else => 20,
            TokenKind::While => 21,
            TokenKind::For => 22,
            TokenKind::Return => 23,
            TokenKind::Break => 24,
            TokenKind::Continue => 25,
            TokenKind::New => 26,
            TokenKind::KwVoid => 27,
            TokenKind::KwBool => 28,
            TokenKind::KwChar => 29,
            TokenKind::KwInt => 30,
            TokenKind::KwLong => 31,
            TokenKind::KwFloat => 32,
            TokenKind::KwDouble => 33,
            TokenKind::LParen => 34,
            TokenKind::RParen => 35,
            TokenKind::LBrace => 36,
            TokenKind::RBrace => 37,
            TokenKind::LBracket => 38,
            TokenKind::RBracket => 39,
            TokenKind::Semicolon => 40,
            TokenKind::Comma => 41,
            TokenKind::Dot => 42,
            TokenKind::Arrow => 43,
            TokenKind::ColonColon => 44,
            TokenKind::Colon => 45,
            TokenKind::Question => 46,
            TokenKind::Assign => 47,
            TokenKind::PlusEq => 48,
            TokenKind::MinusEq => 49,
            TokenKind::StarEq => 50,
            TokenKind::SlashEq => 51,
            TokenKind::PercentEq => 52,
            TokenKind::ShlEq => 53,
            TokenKind::ShrEq => 54,
            TokenKind::AmpEq => 55,
            TokenKind::PipeEq => 56,
            TokenKind::CaretEq => 57,
            TokenKind::EqEq => 58,
            TokenKind::NotEq => 59,
            TokenKind::Lt => 60,
            TokenKind::LtEq => 61,
            TokenKind::Gt => 62,
            TokenKind::GtEq => 63,
            TokenKind::Shl => 64,
            TokenKind::Shr => 65,
            TokenKind::Plus => 66,
            TokenKind::Minus => 67,
            TokenKind::Star => 68,
            TokenKind::Slash => 69,
            TokenKind::Percent => 70,
            TokenKind::Bang => 71,
            TokenKind::Tilde => 72,
            TokenKind::Amp => 73,
            TokenKind::AmpAmp => 74,
            TokenKind::Pipe => 75,
            TokenKind::PipePipe => 76,
            TokenKind::Caret => 77,
            TokenKind::PlusPlus => 78,
            TokenKind::MinusMinus => 79,
            TokenKind::Include { .. } => 80,
            TokenKind::Define => 81,
            TokenKind::Undef => 82,
            TokenKind::Ifdef => 83,
            TokenKind::Ifndef => 84,
            TokenKind::ElseDir => 85,
            TokenKind::EndifDir => 86,
            TokenKind::Newline => 87,
            TokenKind::Error => 88,
            TokenKind::Eof => 89,
        }
    }

    /// Whether this kind begins a primitive type in a declaration.
    pub const fn is_type_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::KwVoid
                | TokenKind::KwBool
                | TokenKind::KwChar
                | TokenKind::KwInt
                | TokenKind::KwLong
                | TokenKind::KwFloat
                | TokenKind::KwDouble
        )
    }

    /// Whether this kind is a preprocessor directive.
    pub const fn is_directive(&self) -> bool {
        matches!(
            self,
            TokenKind::Include { .. }
                | TokenKind::Define
                | TokenKind::Undef
                | TokenKind::Ifdef
                | TokenKind::Ifndef
                | TokenKind::ElseDir
                | TokenKind::EndifDir
        )
    }

    /// Human-readable description for diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Int(_) => "integer literal",
            TokenKind::Float(_) => "floating-point literal",
            TokenKind::Str(_) => "string literal",
            TokenKind::CharLit(_) => "character literal",
            TokenKind::True => "`true`",
            TokenKind::False => "`false`",
            TokenKind::Nullptr => "`nullptr`",
            TokenKind::Ident(_) => "identifier",
            TokenKind::Class => "`class`",
            TokenKind::Struct => "`struct`",
            TokenKind::Namespace => "`namespace`",
            TokenKind::Public => "`public`",
            TokenKind::Private => "`private`",
            TokenKind::Protected => "`protected`",
            TokenKind::Virtual => "`virtual`",
            TokenKind::Static => "`static`",
            TokenKind::Template => "`template`",
            TokenKind::Typename => "`typename`",
            TokenKind::Const => "`const`",
            TokenKind::If => "`if`",
            TokenKind::Else => "`else`",
            TokenKind::While => "`while`",
            TokenKind::For => "`for`",
            TokenKind::Return => "`return`",
            TokenKind::Break => "`break`",
            TokenKind::Continue => "`continue`",
            TokenKind::New => "`new`",
            TokenKind::KwVoid => "`void`",
            TokenKind::KwBool => "`bool`",
            TokenKind::KwChar => "`char`",
            TokenKind::KwInt => "`int`",
            TokenKind::KwLong => "`long`",
            TokenKind::KwFloat => "`float`",
            TokenKind::KwDouble => "`double`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::Semicolon => "`;`",
            TokenKind::Comma => "`,`",
            TokenKind::Dot => "`.`",
            TokenKind::Arrow => "`->`",
            TokenKind::ColonColon => "`::`",
            TokenKind::Colon => "`:`",
            TokenKind::Question => "`?`",
            TokenKind::Assign => "`=`",
            TokenKind::PlusEq => "`+=`",
            TokenKind::MinusEq => "`-=`",
            TokenKind::StarEq => "`*=`",
            TokenKind::SlashEq => "`/=`",
            TokenKind::PercentEq => "`%=`",
            TokenKind::ShlEq => "`<<=`",
            TokenKind::ShrEq => "`>>=`",
            TokenKind::AmpEq => "`&=`",
            TokenKind::PipeEq => "`|=`",
            TokenKind::CaretEq => "`^=`",
            TokenKind::EqEq => "`==`",
            TokenKind::NotEq => "`!=`",
            TokenKind::Lt => "`<`",
            TokenKind::LtEq => "`<=`",
            TokenKind::Gt => "`>`",
            TokenKind::GtEq => "`>=`",
            TokenKind::Shl => "`<<`",
            TokenKind::Shr => "`>>`",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Star => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::Percent => "`%`",
            TokenKind::Bang => "`!`",
            TokenKind::Tilde => "`~`",
            TokenKind::Amp => "`&`",
            TokenKind::AmpAmp => "`&&`",
            TokenKind::Pipe => "`|`",
            TokenKind::PipePipe => "`||`",
            TokenKind::Caret => "`^`",
            TokenKind::PlusPlus => "`++`",
            TokenKind::MinusMinus => "`--`",
            TokenKind::Include { .. } => "`#include` directive",
            TokenKind::Define => "`#define` directive",
            TokenKind::Undef => "`#undef` directive",
            TokenKind::Ifdef => "`#ifdef` directive",
            TokenKind::Ifndef => "`#ifndef` directive",
            TokenKind::ElseDir => "`#else` directive",
            TokenKind::EndifDir => "`#endif` directive",
            TokenKind::Newline => "end of line",
            TokenKind::Error => "invalid token",
            TokenKind::Eof => "end of input",
        }
    }
}

/// A single token with its source span.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    #[inline]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}

/// Owned token stream for one translation unit.
///
/// Always terminated by an `Eof` token once lexing completes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TokenList {
    tokens: Vec<Token>,
}

impl TokenList {
    pub fn new() -> Self {
        TokenList { tokens: Vec::new() }
    }

    pub fn with_capacity(cap: usize) -> Self {
        TokenList {
            tokens: Vec::with_capacity(cap),
        }
    }

    #[inline]
    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[inline]
    pub fn get(&self, idx: usize) -> Option<&Token> {
        self.tokens.get(idx)
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }
}

impl Index<usize> for TokenList {
    type Output = Token;

    fn index(&self, idx: usize) -> &Token {
        &self.tokens[idx]
    }
}

impl<'a> IntoIterator for &'a TokenList {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

impl IntoIterator for TokenList {
    type Item = Token;
    type IntoIter = std::vec::IntoIter<Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}

impl FromIterator<Token> for TokenList {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        TokenList {
            tokens: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn discriminant_indices_fit_in_u128() {
        // Spot-check the highest variant; the recovery bitset depends on it.
        assert!(TokenKind::Eof.discriminant_index() < 128);
    }

    #[test]
    fn data_variants_share_an_index() {
        assert_eq!(
            TokenKind::Int(1).discriminant_index(),
            TokenKind::Int(99).discriminant_index()
        );
        assert_eq!(
            TokenKind::Ident(Name::EMPTY).discriminant_index(),
            TokenKind::Ident(Name::EMPTY).discriminant_index()
        );
    }

    #[test]
    fn type_keywords_classified() {
        assert!(TokenKind::KwInt.is_type_keyword());
        assert!(TokenKind::KwDouble.is_type_keyword());
        assert!(!TokenKind::Class.is_type_keyword());
    }
}
