//! Symbols and their payloads.

use ced_ir::{ClassDecl, FunctionDecl, Name, Signature, Span, TypeRef};
use ced_rt::Value;
use std::fmt;
use std::rc::Rc;

/// Where a variable's storage lives.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Storage {
    Global,
    Local,
    Member,
}

/// A function bound in from a loaded module rather than parsed source.
#[derive(Clone)]
pub struct ForeignEntry {
    pub module: Name,
    pub signature: Signature,
    pub func: ForeignFn,
}

/// Callable installed by the loader bridge. Errors come back as plain
/// strings and are wrapped into faults at the call site.
pub type ForeignFn = Rc<dyn Fn(&[Value]) -> Result<Value, String>>;

impl fmt::Debug for ForeignEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignEntry")
            .field("module", &self.module)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// What a name is bound to.
#[derive(Clone, Debug)]
pub enum SymbolKind {
    /// A class or struct definition.
    Class(Rc<ClassDecl>),
    /// An overload set of interpreted functions.
    Function(Vec<Rc<FunctionDecl>>),
    /// A variable together with its current value.
    Variable { ty: TypeRef, value: Value },
    /// A function bound by the loader bridge.
    Foreign(ForeignEntry),
}

impl SymbolKind {
    pub fn describe(&self) -> &'static str {
        match self {
            SymbolKind::Class(_) => "class",
            SymbolKind::Function(_) => "function",
            SymbolKind::Variable { .. } => "variable",
            SymbolKind::Foreign(_) => "foreign function",
        }
    }
}

/// One named entry in a scope.
#[derive(Clone, Debug)]
pub struct Symbol {
    pub name: Name,
    pub kind: SymbolKind,
    pub storage: Storage,
    pub span: Span,
}

impl Symbol {
    pub fn variable(name: Name, ty: TypeRef, value: Value, storage: Storage, span: Span) -> Self {
        Symbol {
            name,
            kind: SymbolKind::Variable { ty, value },
            storage,
            span,
        }
    }

    pub fn class(decl: Rc<ClassDecl>) -> Self {
        Symbol {
            name: decl.name,
            span: decl.span,
            kind: SymbolKind::Class(decl),
            storage: Storage::Global,
        }
    }

    pub fn function(decl: Rc<FunctionDecl>) -> Self {
        Symbol {
            name: decl.name,
            span: decl.span,
            kind: SymbolKind::Function(vec![decl]),
            storage: Storage::Global,
        }
    }
}
