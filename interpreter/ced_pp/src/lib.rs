//! Preprocessor for the Cedilla interpreter.
//!
//! A pure token-rewriting pass: directives arrive from the lexer as tokens
//! and leave the stream here. Object-like macros are expanded by rescanning
//! with a bounded depth, `#include` splices in the lexed contents of the
//! named file, and `#ifdef`/`#ifndef` conditionals drop inactive regions.
//! Macro definitions persist across runs so a REPL session accumulates them.

mod error;
mod include;
mod macro_table;

pub use error::PreprocessError;
pub use include::SearchPaths;
pub use macro_table::{MacroDef, MacroTable};

use ced_ir::{Name, Span, StringInterner, Token, TokenKind, TokenList};
use std::path::{Path, PathBuf};

/// Expansion depth at which a macro is declared self-referential.
pub const MAX_MACRO_DEPTH: u32 = 64;

/// Nesting depth at which includes stop being followed.
pub const MAX_INCLUDE_DEPTH: u32 = 32;

/// One `#ifdef` / `#ifndef` region.
#[derive(Clone, Copy, Debug)]
struct CondFrame {
    parent_active: bool,
    branch_taken: bool,
    seen_else: bool,
    span: Span,
}

impl CondFrame {
    fn live(self) -> bool {
        self.parent_active && (self.branch_taken != self.seen_else)
    }
}

/// The preprocessor state for one session.
pub struct Preprocessor<'a> {
    interner: &'a StringInterner,
    search_paths: SearchPaths,
    macros: MacroTable,
    include_stack: Vec<PathBuf>,
}

impl<'a> Preprocessor<'a> {
    pub fn new(interner: &'a StringInterner) -> Self {
        Preprocessor {
            interner,
            search_paths: SearchPaths::new(),
            macros: MacroTable::new(),
            include_stack: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_search_paths(mut self, paths: SearchPaths) -> Self {
        self.search_paths = paths;
        self
    }

    pub fn add_search_path(&mut self, dir: impl Into<PathBuf>) {
        self.search_paths.push(dir);
    }

    pub fn macros(&self) -> &MacroTable {
        &self.macros
    }

    /// Drops all accumulated macro definitions.
    pub fn reset(&mut self) {
        self.macros.clear();
    }

    /// Rewrites one token stream, following includes relative to
    /// `current_dir`.
    ///
    /// Every error is recoverable: the offending directive or identifier is
    /// dropped and rewriting continues, so the output is always a complete,
    /// `Eof`-terminated stream.
    #[tracing::instrument(level = "debug", skip_all, fields(tokens = tokens.len()))]
    pub fn run(
        &mut self,
        tokens: &TokenList,
        current_dir: Option<&Path>,
    ) -> (TokenList, Vec<PreprocessError>) {
        let mut out = Vec::with_capacity(tokens.len());
        let mut errors = Vec::new();
        self.process(tokens.as_slice(), current_dir, &mut out, &mut errors);

        let eof_span = tokens
            .as_slice()
            .last()
            .map_or(Span::DUMMY, |tok| tok.span);
        out.push(Token::new(TokenKind::Eof, eof_span));

        (out.into_iter().collect(), errors)
    }

    fn process(
        &mut self,
        tokens: &[Token],
        current_dir: Option<&Path>,
        out: &mut Vec<Token>,
        errors: &mut Vec<PreprocessError>,
    ) {
        let mut cond: Vec<CondFrame> = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            let tok = tokens[i];
            let active = cond.last().is_none_or(|frame| frame.live());

            match tok.kind {
                TokenKind::Eof => break,
                TokenKind::Newline => i += 1,

                TokenKind::Ifdef | TokenKind::Ifndef => {
                    let negated = tok.kind == TokenKind::Ifndef;
                    let taken = match directive_name(tokens, i) {
                        Some(name) => self.macros.is_defined(name) != negated,
                        None => {
                            if active {
                                errors.push(PreprocessError::MalformedDirective {
                                    directive: if negated { "#ifndef" } else { "#ifdef" },
                                    span: tok.span,
                                });
                            }
                            false
                        }
                    };
                    cond.push(CondFrame {
                        parent_active: active,
                        branch_taken: taken,
                        seen_else: false,
                        span: tok.span,
                    });
                    i = skip_line(tokens, i);
                }

                TokenKind::ElseDir => {
                    match cond.last_mut() {
                        Some(frame) if !frame.seen_else => frame.seen_else = true,
                        _ => errors.push(PreprocessError::StrayConditional {
                            directive: "#else",
                            span: tok.span,
                        }),
                    }
                    i = skip_line(tokens, i);
                }

                TokenKind::EndifDir => {
                    if cond.pop().is_none() {
                        errors.push(PreprocessError::StrayConditional {
                            directive: "#endif",
                            span: tok.span,
                        });
                    }
                    i = skip_line(tokens, i);
                }

                TokenKind::Define => {
                    if active {
                        match directive_name(tokens, i) {
                            Some(name) => {
                                let body = line_body(tokens, i + 2);
                                tracing::debug!(
                                    name = self.interner.lookup(name),
                                    tokens = body.len(),
                                    "define"
                                );
                                self.macros.define(name, body, tok.span);
                            }
                            None => errors.push(PreprocessError::MalformedDirective {
                                directive: "#define",
                                span: tok.span,
                            }),
                        }
                    }
                    i = skip_line(tokens, i);
                }

                TokenKind::Undef => {
                    if active {
                        match directive_name(tokens, i) {
                            Some(name) => self.macros.undef(name),
                            None => errors.push(PreprocessError::MalformedDirective {
                                directive: "#undef",
                                span: tok.span,
                            }),
                        }
                    }
                    i = skip_line(tokens, i);
                }

                TokenKind::Include { path, angled } => {
                    if active {
                        self.include(path, angled, tok.span, current_dir, out, errors);
                    }
                    i = skip_line(tokens, i);
                }

                TokenKind::Ident(_) if active => {
                    self.expand(tok, out, errors);
                    i += 1;
                }

                _ => {
                    if active {
                        out.push(tok);
                    }
                    i += 1;
                }
            }
        }

        for frame in cond {
            errors.push(PreprocessError::UnterminatedConditional { span: frame.span });
        }
    }

    /// Expands one token by rescanning, bounded by `MAX_MACRO_DEPTH`.
    ///
    /// Replacement tokens take the span of the invocation site so later
    /// diagnostics point at code the user actually wrote.
    fn expand(&mut self, token: Token, out: &mut Vec<Token>, errors: &mut Vec<PreprocessError>) {
        let mut work = vec![(token, 0u32)];
        while let Some((tok, depth)) = work.pop() {
            if let TokenKind::Ident(name) = tok.kind {
                if let Some(def) = self.macros.get(name) {
                    if depth >= MAX_MACRO_DEPTH {
                        errors.push(PreprocessError::MacroRecursion {
                            name: self.interner.lookup(name).to_owned(),
                            limit: MAX_MACRO_DEPTH,
                            span: token.span,
                        });
                        continue;
                    }
                    for body_tok in def.body.iter().rev() {
                        work.push((Token::new(body_tok.kind, token.span), depth + 1));
                    }
                    continue;
                }
            }
            out.push(tok);
        }
    }

    fn include(
        &mut self,
        path: Name,
        angled: bool,
        span: Span,
        current_dir: Option<&Path>,
        out: &mut Vec<Token>,
        errors: &mut Vec<PreprocessError>,
    ) {
        let path_str = self.interner.lookup(path);
        let Some(resolved) = self.search_paths.resolve(path_str, angled, current_dir) else {
            errors.push(PreprocessError::IncludeNotFound {
                path: path_str.to_owned(),
                searched: self.search_paths.searched(angled, current_dir),
                span,
            });
            return;
        };
        let resolved = std::fs::canonicalize(&resolved).unwrap_or(resolved);

        if self.include_stack.contains(&resolved) {
            errors.push(PreprocessError::IncludeCycle {
                path: path_str.to_owned(),
                span,
            });
            return;
        }
        if self.include_stack.len() >= MAX_INCLUDE_DEPTH as usize {
            errors.push(PreprocessError::IncludeDepth {
                limit: MAX_INCLUDE_DEPTH,
                span,
            });
            return;
        }

        let source = match std::fs::read_to_string(&resolved) {
            Ok(source) => source,
            Err(err) => {
                errors.push(PreprocessError::IncludeRead {
                    path: path_str.to_owned(),
                    message: err.to_string(),
                    span,
                });
                return;
            }
        };

        tracing::debug!(path = %resolved.display(), "include");

        let (included, lex_errors) = ced_lexer::lex(&source, self.interner);
        for lex_error in lex_errors {
            errors.push(PreprocessError::IncludeLex {
                path: path_str.to_owned(),
                message: lex_error.to_string(),
                span,
            });
        }

        let included_dir = resolved.parent().map(Path::to_path_buf);
        self.include_stack.push(resolved);
        self.process(included.as_slice(), included_dir.as_deref(), out, errors);
        self.include_stack.pop();
    }
}

/// The macro name argument of the directive at `at`, if present.
fn directive_name(tokens: &[Token], at: usize) -> Option<Name> {
    match tokens.get(at + 1)?.kind {
        TokenKind::Ident(name) => Some(name),
        _ => None,
    }
}

/// Tokens from `from` up to (not including) the end of the line.
fn line_body(tokens: &[Token], from: usize) -> Vec<Token> {
    tokens[from.min(tokens.len())..]
        .iter()
        .take_while(|tok| !matches!(tok.kind, TokenKind::Newline | TokenKind::Eof))
        .copied()
        .collect()
}

/// Index just past the current line's `Newline` (or at `Eof`).
fn skip_line(tokens: &[Token], from: usize) -> usize {
    let mut i = from;
    while i < tokens.len() {
        match tokens[i].kind {
            TokenKind::Newline => return i + 1,
            TokenKind::Eof => return i,
            _ => i += 1,
        }
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn preprocess(source: &str) -> (Vec<TokenKind>, Vec<PreprocessError>) {
        let interner = StringInterner::new();
        let (tokens, lex_errors) = ced_lexer::lex(source, &interner);
        assert_eq!(lex_errors, vec![]);
        let mut pp = Preprocessor::new(&interner);
        let (out, errors) = pp.run(&tokens, None);
        (out.iter().map(|t| t.kind).collect(), errors)
    }

    #[test]
    fn define_substitutes_in_declarations() {
        let (kinds, errors) = preprocess("#define N 5\nint arr[N];");
        assert_eq!(errors, vec![]);
        assert_eq!(kinds[0], TokenKind::KwInt);
        assert_eq!(kinds[2], TokenKind::LBracket);
        assert_eq!(kinds[3], TokenKind::Int(5));
        assert_eq!(kinds[4], TokenKind::RBracket);
    }

    #[test]
    fn macro_bodies_rescan() {
        let (kinds, errors) = preprocess("#define A B\n#define B 7\nA");
        assert_eq!(errors, vec![]);
        assert_eq!(kinds[0], TokenKind::Int(7));
    }

    #[test]
    fn self_referential_macro_hits_depth_limit() {
        let (kinds, errors) = preprocess("#define A A\nA");
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            PreprocessError::MacroRecursion { limit: 64, .. }
        ));
        // The runaway expansion is dropped, not emitted.
        assert_eq!(kinds, vec![TokenKind::Eof]);
    }

    #[test]
    fn mutual_recursion_hits_depth_limit() {
        let (_, errors) = preprocess("#define A B\n#define B A\nA");
        assert!(matches!(
            errors[0],
            PreprocessError::MacroRecursion { .. }
        ));
    }

    #[test]
    fn undef_restores_plain_identifier() {
        let (kinds, errors) = preprocess("#define X 1\n#undef X\nX");
        assert_eq!(errors, vec![]);
        assert!(matches!(kinds[0], TokenKind::Ident(_)));
    }

    #[test]
    fn redefinition_last_write_wins() {
        let (kinds, errors) = preprocess("#define N 1\n#define N 2\nN");
        assert_eq!(errors, vec![]);
        assert_eq!(kinds[0], TokenKind::Int(2));
    }

    #[test]
    fn ifdef_keeps_taken_branch() {
        let (kinds, errors) = preprocess("#define X 0\n#ifdef X\n1\n#else\n2\n#endif\n");
        assert_eq!(errors, vec![]);
        assert_eq!(kinds, vec![TokenKind::Int(1), TokenKind::Eof]);
    }

    #[test]
    fn ifndef_keeps_else_branch() {
        let (kinds, errors) = preprocess("#ifndef X\n1\n#else\n2\n#endif\n");
        assert_eq!(errors, vec![]);
        assert_eq!(kinds, vec![TokenKind::Int(1), TokenKind::Eof]);
    }

    #[test]
    fn inactive_region_defines_nothing() {
        let (kinds, errors) = preprocess("#ifdef X\n#define N 9\n#endif\nN");
        assert_eq!(errors, vec![]);
        assert!(matches!(kinds[0], TokenKind::Ident(_)));
    }

    #[test]
    fn nested_conditionals() {
        let source = "#define A 0\n#ifdef A\n#ifdef B\n1\n#else\n2\n#endif\n#endif\n";
        let (kinds, errors) = preprocess(source);
        assert_eq!(errors, vec![]);
        assert_eq!(kinds, vec![TokenKind::Int(2), TokenKind::Eof]);
    }

    #[test]
    fn stray_endif_reported() {
        let (_, errors) = preprocess("#endif\n");
        assert!(matches!(
            errors[0],
            PreprocessError::StrayConditional {
                directive: "#endif",
                ..
            }
        ));
    }

    #[test]
    fn unterminated_conditional_reported() {
        let (_, errors) = preprocess("#ifdef X\n1\n");
        assert!(matches!(
            errors[0],
            PreprocessError::UnterminatedConditional { .. }
        ));
    }

    #[test]
    fn include_splices_file_tokens() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("vals.h"), "#define K 3\nint k = K;\n").unwrap();

        let interner = StringInterner::new();
        let (tokens, _) = ced_lexer::lex("#include \"vals.h\"\nk", &interner);
        let mut pp = Preprocessor::new(&interner);
        let (out, errors) = pp.run(&tokens, Some(dir.path()));

        assert_eq!(errors, vec![]);
        let kinds: Vec<_> = out.iter().map(|t| t.kind).collect();
        assert_eq!(kinds[0], TokenKind::KwInt);
        assert_eq!(kinds[3], TokenKind::Int(3));
        // Macros from the include stay visible afterwards.
        assert!(pp.macros().is_defined(interner.intern("K")));
    }

    #[test]
    fn include_not_found_reported() {
        let (_, errors) = preprocess("#include \"missing.h\"\n");
        match &errors[0] {
            PreprocessError::IncludeNotFound { path, .. } => assert_eq!(path, "missing.h"),
            other => panic!("expected include not found, got {other:?}"),
        }
    }

    #[test]
    fn include_not_found_names_the_search_list() {
        let inc = tempfile::tempdir().unwrap();
        let cwd = tempfile::tempdir().unwrap();

        let interner = StringInterner::new();
        let (tokens, _) = ced_lexer::lex("#include \"missing.h\"\n", &interner);
        let mut pp = Preprocessor::new(&interner);
        pp.add_search_path(inc.path());
        let (_, errors) = pp.run(&tokens, Some(cwd.path()));

        match &errors[0] {
            err @ PreprocessError::IncludeNotFound { searched, .. } => {
                // Quoted include: the including directory is tried first.
                assert_eq!(searched[0], cwd.path());
                assert_eq!(searched[1], inc.path());
                let message = err.to_string();
                assert!(message.contains(&inc.path().display().to_string()));
            }
            other => panic!("expected include not found, got {other:?}"),
        }
    }

    #[test]
    fn include_cycle_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("loop.h"), "#include \"loop.h\"\n").unwrap();

        let interner = StringInterner::new();
        let (tokens, _) = ced_lexer::lex("#include \"loop.h\"\n", &interner);
        let mut pp = Preprocessor::new(&interner);
        let (_, errors) = pp.run(&tokens, Some(dir.path()));

        assert!(matches!(errors[0], PreprocessError::IncludeCycle { .. }));
    }

    #[test]
    fn macros_persist_across_runs() {
        let interner = StringInterner::new();
        let mut pp = Preprocessor::new(&interner);

        let (first, _) = ced_lexer::lex("#define N 4\n", &interner);
        let (_, errors) = pp.run(&first, None);
        assert_eq!(errors, vec![]);

        let (second, _) = ced_lexer::lex("N", &interner);
        let (out, errors) = pp.run(&second, None);
        assert_eq!(errors, vec![]);
        assert_eq!(out[0].kind, TokenKind::Int(4));
    }
}
