//! Stable error codes.
//!
//! Ranges by stage:
//! - E01xx lexer
//! - E02xx preprocessor
//! - E03xx parser
//! - E04xx symbol table
//! - E05xx dictionary generator
//! - E06xx runtime faults
//! - E07xx dynamic loader

use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Lexer
    E0101, // invalid character
    E0102, // unterminated string literal
    E0103, // unterminated character literal
    E0104, // unterminated block comment

    // Preprocessor
    E0201, // macro recursion limit exceeded
    E0202, // include file not found
    E0203, // unterminated conditional
    E0204, // malformed directive
    E0205, // stray #else / #endif

    // Parser
    E0301, // unexpected token

    // Symbol table
    E0401, // redeclaration
    E0402, // ambiguous call
    E0403, // foreign symbol clash

    // Dictionary
    E0501, // unknown base class
    E0502, // cyclic inheritance

    // Runtime faults
    E0601, // null access
    E0602, // type mismatch
    E0603, // unresolved symbol
    E0604, // arithmetic error
    E0605, // call depth exceeded

    // Loader
    E0701, // module load failure
    E0702, // module in use
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::E0101 => "E0101",
            ErrorCode::E0102 => "E0102",
            ErrorCode::E0103 => "E0103",
            ErrorCode::E0104 => "E0104",
            ErrorCode::E0201 => "E0201",
            ErrorCode::E0202 => "E0202",
            ErrorCode::E0203 => "E0203",
            ErrorCode::E0204 => "E0204",
            ErrorCode::E0205 => "E0205",
            ErrorCode::E0301 => "E0301",
            ErrorCode::E0401 => "E0401",
            ErrorCode::E0402 => "E0402",
            ErrorCode::E0403 => "E0403",
            ErrorCode::E0501 => "E0501",
            ErrorCode::E0502 => "E0502",
            ErrorCode::E0601 => "E0601",
            ErrorCode::E0602 => "E0602",
            ErrorCode::E0603 => "E0603",
            ErrorCode::E0604 => "E0604",
            ErrorCode::E0605 => "E0605",
            ErrorCode::E0701 => "E0701",
            ErrorCode::E0702 => "E0702",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
