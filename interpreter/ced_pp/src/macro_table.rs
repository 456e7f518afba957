//! Object-like macro definitions.

use ced_ir::{Name, Span, Token};
use rustc_hash::FxHashMap;

/// One `#define`: the replacement tokens and where it was defined.
#[derive(Clone, Debug, PartialEq)]
pub struct MacroDef {
    pub body: Vec<Token>,
    pub span: Span,
}

/// All live macro definitions.
///
/// Redefinition replaces the previous body without complaint, matching the
/// last-write-wins rule used everywhere else in the session.
#[derive(Clone, Debug, Default)]
pub struct MacroTable {
    defs: FxHashMap<Name, MacroDef>,
}

impl MacroTable {
    pub fn new() -> Self {
        MacroTable::default()
    }

    pub fn define(&mut self, name: Name, body: Vec<Token>, span: Span) {
        self.defs.insert(name, MacroDef { body, span });
    }

    /// Removes a definition. Undefining an unknown name is a no-op.
    pub fn undef(&mut self, name: Name) {
        self.defs.remove(&name);
    }

    pub fn get(&self, name: Name) -> Option<&MacroDef> {
        self.defs.get(&name)
    }

    pub fn is_defined(&self, name: Name) -> bool {
        self.defs.contains_key(&name)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Definitions in arbitrary order, for session introspection.
    pub fn iter(&self) -> impl Iterator<Item = (Name, &MacroDef)> + '_ {
        self.defs.iter().map(|(name, def)| (*name, def))
    }

    pub fn clear(&mut self) {
        self.defs.clear();
    }
}
