//! Lexer for the Cedilla C++ subset, built on logos.
//!
//! Two stages: a logos-derived raw token, then conversion into
//! `ced_ir::TokenKind` with identifier/string interning. Preprocessor
//! directives come out as tokens (`#include` with its path already
//! extracted, `#define`, conditionals) so the preprocessor downstream is a
//! pure token-rewriting pass. Newlines are tokens too, because directives
//! are line-delimited.

mod lex_error;

pub use lex_error::LexError;

use ced_ir::{Span, StringInterner, Token, TokenKind, TokenList};
use logos::Logos;

/// Raw token from logos, before interning.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"\\[ \t]*\n")]
enum RawToken {
    #[token("/*", |lex| {
        let rest = lex.remainder();
        match rest.find("*/") {
            Some(i) => {
                lex.bump(i + 2);
                logos::FilterResult::<(), ()>::Skip
            }
            None => {
                lex.bump(rest.len());
                logos::FilterResult::Error(())
            }
        }
    })]
    BlockComment,

    #[token("\n")]
    Newline,

    // Keywords
    #[token("class")]
    Class,
    #[token("struct")]
    Struct,
    #[token("namespace")]
    Namespace,
    #[token("public")]
    Public,
    #[token("private")]
    Private,
    #[token("protected")]
    Protected,
    #[token("virtual")]
    Virtual,
    #[token("static")]
    Static,
    #[token("template")]
    Template,
    #[token("typename")]
    Typename,
    #[token("const")]
    Const,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("for")]
    For,
    #[token("return")]
    Return,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("new")]
    New,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("nullptr")]
    Nullptr,

    // Type keywords
    #[token("void")]
    KwVoid,
    #[token("bool")]
    KwBool,
    #[token("char")]
    KwChar,
    #[token("int")]
    KwInt,
    #[token("long")]
    KwLong,
    #[token("float")]
    KwFloat,
    #[token("double")]
    KwDouble,

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("->")]
    Arrow,
    #[token("::")]
    ColonColon,
    #[token(":")]
    Colon,
    #[token("?")]
    Question,

    // Operators
    #[token("=")]
    Assign,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("<<=")]
    ShlEq,
    #[token(">>=")]
    ShrEq,
    #[token("&=")]
    AmpEq,
    #[token("|=")]
    PipeEq,
    #[token("^=")]
    CaretEq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,
    #[token("&")]
    Amp,
    #[token("&&")]
    AmpAmp,
    #[token("|")]
    Pipe,
    #[token("||")]
    PipePipe,
    #[token("^")]
    Caret,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,

    // Preprocessor directives. The whole `#include` line form is matched at
    // once so the path never fragments into `<`, idents, and `>`.
    #[regex(r#"#[ \t]*include[ \t]*"[^"\n]*""#)]
    IncludeQuoted,
    #[regex(r"#[ \t]*include[ \t]*<[^>\n]*>")]
    IncludeAngled,
    #[regex(r"#[ \t]*define")]
    Define,
    #[regex(r"#[ \t]*undef")]
    Undef,
    #[regex(r"#[ \t]*ifdef")]
    Ifdef,
    #[regex(r"#[ \t]*ifndef")]
    Ifndef,
    #[regex(r"#[ \t]*else")]
    ElseDir,
    #[regex(r"#[ \t]*endif")]
    EndifDir,

    // Literals
    #[regex(r"0[xX][0-9a-fA-F]+", |lex| {
        let s = lex.slice();
        u64::from_str_radix(&s[2..], 16).ok().and_then(|v| i64::try_from(v).ok())
    })]
    HexInt(i64),

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),

    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Float(f64),

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    Str,

    #[regex(r"'([^'\\\n]|\\.)'")]
    CharLit,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
}

/// Lex one translation unit.
///
/// Invalid input never aborts the pass: each problem becomes a `LexError`
/// (and an `Error` token holding its place in the stream) and lexing
/// continues. The stream is always `Eof`-terminated.
pub fn lex(source: &str, interner: &StringInterner) -> (TokenList, Vec<LexError>) {
    let mut tokens = TokenList::with_capacity(source.len() / 4);
    let mut errors = Vec::new();
    let mut logos = RawToken::lexer(source);

    while let Some(result) = logos.next() {
        let span = Span::from_range(logos.span());
        let slice = logos.slice();
        match result {
            Ok(raw) => {
                let kind = convert_token(raw, slice, interner);
                tokens.push(Token::new(kind, span));
            }
            Err(()) => {
                errors.push(classify_error(source, slice, span));
                tokens.push(Token::new(TokenKind::Error, span));
            }
        }
    }

    tokens.push(Token::new(
        TokenKind::Eof,
        Span::from_range(source.len()..source.len()),
    ));

    (tokens, errors)
}

/// Map a failed match onto a specific lexical error.
fn classify_error(source: &str, slice: &str, span: Span) -> LexError {
    if slice.starts_with("/*") {
        return LexError::UnterminatedComment { span };
    }
    if slice.starts_with('"') {
        return LexError::UnterminatedString { span };
    }
    if slice.starts_with('\'') {
        return LexError::UnterminatedChar { span };
    }
    if slice.starts_with('#') {
        // Read the directive word following the `#` for the message.
        let rest = &source[span.end as usize..];
        let word: String = rest
            .chars()
            .skip_while(|c| *c == ' ' || *c == '\t')
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        return LexError::UnsupportedDirective {
            directive: format!("#{word}"),
            span,
        };
    }
    LexError::InvalidCharacter {
        character: slice.chars().next().unwrap_or('\u{FFFD}'),
        span,
    }
}

fn convert_token(raw: RawToken, slice: &str, interner: &StringInterner) -> TokenKind {
    match raw {
        RawToken::Int(n) | RawToken::HexInt(n) => TokenKind::Int(n),
        RawToken::Float(f) => TokenKind::Float(f.to_bits()),
        RawToken::Str => {
            let content = &slice[1..slice.len() - 1];
            TokenKind::Str(interner.intern(&unescape_string(content)))
        }
        RawToken::CharLit => {
            let content = &slice[1..slice.len() - 1];
            TokenKind::CharLit(unescape_char(content))
        }
        RawToken::Ident => TokenKind::Ident(interner.intern(slice)),

        RawToken::IncludeQuoted => {
            let path = between(slice, '"', '"');
            TokenKind::Include {
                path: interner.intern(path),
                angled: false,
            }
        }
        RawToken::IncludeAngled => {
            let path = between(slice, '<', '>');
            TokenKind::Include {
                path: interner.intern(path),
                angled: true,
            }
        }
        RawToken::Define => TokenKind::Define,
        RawToken::Undef => TokenKind::Undef,
        RawToken::Ifdef => TokenKind::Ifdef,
        RawToken::Ifndef => TokenKind::Ifndef,
        RawToken::ElseDir => TokenKind::ElseDir,
        RawToken::EndifDir => TokenKind::EndifDir,

        RawToken::Newline => TokenKind::Newline,

        RawToken::Class => TokenKind::Class,
        RawToken::Struct => TokenKind::Struct,
        RawToken::Namespace => TokenKind::Namespace,
        RawToken::Public => TokenKind::Public,
        RawToken::Private => TokenKind::Private,
        RawToken::Protected => TokenKind::Protected,
        RawToken::Virtual => TokenKind::Virtual,
        RawToken::Static => TokenKind::Static,
        RawToken::Template => TokenKind::Template,
        RawToken::Typename => TokenKind::Typename,
        RawToken::Const => TokenKind::Const,
        RawToken::If => TokenKind::If,
        RawToken::Else => TokenKind::Else,
        RawToken::While => TokenKind::While,
        RawToken::For => TokenKind::For,
        RawToken::Return => TokenKind::Return,
        RawToken::Break => TokenKind::Break,
        RawToken::Continue => TokenKind::Continue,
        RawToken::New => TokenKind::New,
        RawToken::True => TokenKind::True,
        RawToken::False => TokenKind::False,
        RawToken::Nullptr => TokenKind::Nullptr,

        RawToken::KwVoid => TokenKind::KwVoid,
        RawToken::KwBool => TokenKind::KwBool,
        RawToken::KwChar => TokenKind::KwChar,
        RawToken::KwInt => TokenKind::KwInt,
        RawToken::KwLong => TokenKind::KwLong,
        RawToken::KwFloat => TokenKind::KwFloat,
        RawToken::KwDouble => TokenKind::KwDouble,

        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::Semicolon => TokenKind::Semicolon,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Arrow => TokenKind::Arrow,
        RawToken::ColonColon => TokenKind::ColonColon,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Question => TokenKind::Question,

        RawToken::Assign => TokenKind::Assign,
        RawToken::PlusEq => TokenKind::PlusEq,
        RawToken::MinusEq => TokenKind::MinusEq,
        RawToken::StarEq => TokenKind::StarEq,
        RawToken::SlashEq => TokenKind::SlashEq,
        RawToken::PercentEq => TokenKind::PercentEq,
        RawToken::ShlEq => TokenKind::ShlEq,
        RawToken::ShrEq => TokenKind::ShrEq,
        RawToken::AmpEq => TokenKind::AmpEq,
        RawToken::PipeEq => TokenKind::PipeEq,
        RawToken::CaretEq => TokenKind::CaretEq,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::Gt => TokenKind::Gt,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::Shl => TokenKind::Shl,
        RawToken::Shr => TokenKind::Shr,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::Bang => TokenKind::Bang,
        RawToken::Tilde => TokenKind::Tilde,
        RawToken::Amp => TokenKind::Amp,
        RawToken::AmpAmp => TokenKind::AmpAmp,
        RawToken::Pipe => TokenKind::Pipe,
        RawToken::PipePipe => TokenKind::PipePipe,
        RawToken::Caret => TokenKind::Caret,
        RawToken::PlusPlus => TokenKind::PlusPlus,
        RawToken::MinusMinus => TokenKind::MinusMinus,

        RawToken::BlockComment => {
            unreachable!("block comments are skipped by the callback")
        }
    }
}

/// Content between the first `open` and last `close` in `slice`.
fn between(slice: &str, open: char, close: char) -> &str {
    let start = slice.find(open).map_or(0, |i| i + open.len_utf8());
    let end = slice.rfind(close).unwrap_or(slice.len());
    if start <= end {
        &slice[start..end]
    } else {
        ""
    }
}

fn unescape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('t') => result.push('\t'),
                Some('0') => result.push('\0'),
                Some('"') => result.push('"'),
                Some('\\') | None => result.push('\\'),
                Some(other) => {
                    result.push('\\');
                    result.push(other);
                }
            }
        } else {
            result.push(c);
        }
    }
    result
}

fn unescape_char(s: &str) -> char {
    let mut chars = s.chars();
    match chars.next() {
        Some('\\') => match chars.next() {
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some('0') => '\0',
            Some('\'') => '\'',
            Some('\\') | None => '\\',
            Some(other) => other,
        },
        Some(c) => c,
        None => '\0',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let interner = StringInterner::new();
        let (tokens, errors) = lex(source, &interner);
        assert_eq!(errors, vec![]);
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lex_declaration() {
        let interner = StringInterner::new();
        let (tokens, errors) = lex("int x = 42;", &interner);
        assert!(errors.is_empty());
        assert_eq!(tokens.len(), 6); // int x = 42 ; EOF
        assert_eq!(tokens[0].kind, TokenKind::KwInt);
        assert!(matches!(tokens[1].kind, TokenKind::Ident(_)));
        assert_eq!(tokens[2].kind, TokenKind::Assign);
        assert_eq!(tokens[3].kind, TokenKind::Int(42));
        assert_eq!(tokens[4].kind, TokenKind::Semicolon);
        assert_eq!(tokens[5].kind, TokenKind::Eof);
    }

    #[test]
    fn lex_string_escapes() {
        let interner = StringInterner::new();
        let (tokens, _) = lex(r#""a\tb\n""#, &interner);
        if let TokenKind::Str(name) = tokens[0].kind {
            assert_eq!(interner.lookup(name), "a\tb\n");
        } else {
            panic!("expected string token, got {:?}", tokens[0].kind);
        }
    }

    #[test]
    fn lex_class_header() {
        let ks = kinds("class B : public A {};");
        assert_eq!(ks[0], TokenKind::Class);
        assert!(matches!(ks[1], TokenKind::Ident(_)));
        assert_eq!(ks[2], TokenKind::Colon);
        assert_eq!(ks[3], TokenKind::Public);
    }

    #[test]
    fn lex_member_operators() {
        let ks = kinds("p->x + a.b");
        assert!(ks.contains(&TokenKind::Arrow));
        assert!(ks.contains(&TokenKind::Dot));
    }

    #[test]
    fn lex_include_directive_extracts_path() {
        let interner = StringInterner::new();
        let (tokens, errors) = lex("#include <vector>\n#include \"mine.h\"\n", &interner);
        assert!(errors.is_empty());
        match tokens[0].kind {
            TokenKind::Include { path, angled } => {
                assert!(angled);
                assert_eq!(interner.lookup(path), "vector");
            }
            other => panic!("expected include token, got {other:?}"),
        }
        match tokens[2].kind {
            TokenKind::Include { path, angled } => {
                assert!(!angled);
                assert_eq!(interner.lookup(path), "mine.h");
            }
            other => panic!("expected include token, got {other:?}"),
        }
    }

    #[test]
    fn lex_define_line() {
        let ks = kinds("#define N 5\nint arr[N];");
        assert_eq!(ks[0], TokenKind::Define);
        assert!(matches!(ks[1], TokenKind::Ident(_)));
        assert_eq!(ks[2], TokenKind::Int(5));
        assert_eq!(ks[3], TokenKind::Newline);
    }

    #[test]
    fn comments_are_skipped() {
        let ks = kinds("1 /* two */ 3 // four");
        assert_eq!(ks, vec![TokenKind::Int(1), TokenKind::Int(3), TokenKind::Eof]);
    }

    #[test]
    fn unterminated_comment_is_an_error() {
        let interner = StringInterner::new();
        let (tokens, errors) = lex("int x; /* oops", &interner);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], LexError::UnterminatedComment { .. }));
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Error));
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let interner = StringInterner::new();
        let (_, errors) = lex("\"abc", &interner);
        assert!(errors
            .iter()
            .any(|e| matches!(e, LexError::UnterminatedString { .. })));
    }

    #[test]
    fn invalid_character_reports_offset() {
        let interner = StringInterner::new();
        let (_, errors) = lex("int x = $;", &interner);
        assert_eq!(errors.len(), 1);
        match &errors[0] {
            LexError::InvalidCharacter { character, span } => {
                assert_eq!(*character, '$');
                assert_eq!(span.start, 8);
            }
            other => panic!("expected invalid character, got {other:?}"),
        }
    }

    #[test]
    fn float_and_hex_literals() {
        let ks = kinds("3.5 0x10");
        assert_eq!(ks[0], TokenKind::Float(3.5f64.to_bits()));
        assert_eq!(ks[1], TokenKind::Int(16));
    }

    #[test]
    fn line_continuation_joins_lines() {
        let ks = kinds("#define TWO \\\n 2\n");
        // The continuation disappears; `2` lands before the final newline.
        assert_eq!(ks[0], TokenKind::Define);
        assert_eq!(ks[2], TokenKind::Int(2));
        assert_eq!(ks[3], TokenKind::Newline);
    }
}
