//! The process-wide symbol and type table.
//!
//! Scopes form a tree rooted at the global scope. The evaluator enters a
//! scope per block and call frame, declares into it, and exits it when the
//! construct finishes; exit destroys everything declared within. The global
//! scope lives for the whole session and additionally carries classes,
//! function overload sets, and symbols merged in by the loader bridge.

mod error;
mod overload;
mod symbol;

pub use error::{DeclareError, OverloadError};
pub use overload::{
    rank_argument, select_overload, RankContext, RANK_CONVERSION, RANK_EXACT, RANK_PROMOTION,
};
pub use symbol::{ForeignEntry, ForeignFn, Storage, Symbol, SymbolKind};

use ced_ir::{ClassDecl, FunctionDecl, Name, Param, Signature, Span, StringInterner};
use ced_rt::Value;
use rustc_hash::{FxHashMap, FxHashSet};
use std::rc::Rc;

/// Handle to one scope in the table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    pub const GLOBAL: ScopeId = ScopeId(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// What kind of construct owns a scope.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Namespace,
    Class,
    Function,
    Block,
}

#[derive(Debug)]
struct ScopeData {
    kind: ScopeKind,
    parent: Option<ScopeId>,
    symbols: FxHashMap<Name, Symbol>,
    alive: bool,
}

/// The symbol table for one interpreter session.
#[derive(Debug, Default)]
pub struct SymbolTable {
    scopes: Vec<ScopeData>,
    /// Slots of exited scopes, reused by the next `enter`. Long-running
    /// loops enter and exit a block scope per iteration; without reuse the
    /// scope vector would grow unbounded within one evaluation.
    free: Vec<ScopeId>,
    /// Global names installed per loaded module, for unload.
    modules: FxHashMap<Name, Vec<Name>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            scopes: vec![ScopeData {
                kind: ScopeKind::Global,
                parent: None,
                symbols: FxHashMap::default(),
                alive: true,
            }],
            free: Vec::new(),
            modules: FxHashMap::default(),
        }
    }

    /// Pushes a new scope under `parent`, reusing an exited slot if one is
    /// available.
    pub fn enter(&mut self, kind: ScopeKind, parent: ScopeId) -> ScopeId {
        if let Some(id) = self.free.pop() {
            let data = &mut self.scopes[id.index()];
            data.kind = kind;
            data.parent = Some(parent);
            data.alive = true;
            return id;
        }
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(ScopeData {
            kind,
            parent: Some(parent),
            symbols: FxHashMap::default(),
            alive: true,
        });
        id
    }

    /// Destroys a scope and every symbol declared within it. The slot goes
    /// back on the free list; a stale `ScopeId` must not be used again.
    ///
    /// The global scope cannot be exited; the call is ignored, as is a
    /// second exit of the same scope.
    pub fn exit(&mut self, scope: ScopeId) {
        if scope == ScopeId::GLOBAL {
            return;
        }
        if let Some(data) = self.scopes.get_mut(scope.index()) {
            if data.alive {
                data.symbols.clear();
                data.alive = false;
                self.free.push(scope);
            }
        }
    }

    pub fn scope_kind(&self, scope: ScopeId) -> Option<ScopeKind> {
        self.scopes.get(scope.index()).map(|s| s.kind)
    }

    /// Declares a symbol in `scope`.
    ///
    /// Functions accumulate into an overload set; declaring the same
    /// parameter list again replaces that overload, and redefining a class
    /// replaces the old definition, both matching interactive-session
    /// expectations. Everything else collides.
    pub fn declare(&mut self, scope: ScopeId, symbol: Symbol) -> Result<(), DeclareError> {
        let data = &mut self.scopes[scope.index()];
        let Some(existing) = data.symbols.get_mut(&symbol.name) else {
            data.symbols.insert(symbol.name, symbol);
            return Ok(());
        };

        match (&mut existing.kind, symbol.kind) {
            (SymbolKind::Function(overloads), SymbolKind::Function(new)) => {
                for decl in new {
                    let same_params = overloads
                        .iter()
                        .position(|o| param_types(&o.params) == param_types(&decl.params));
                    match same_params {
                        Some(i) => overloads[i] = decl,
                        None => overloads.push(decl),
                    }
                }
                Ok(())
            }
            (SymbolKind::Class(_), SymbolKind::Class(new)) => {
                existing.kind = SymbolKind::Class(new);
                existing.span = symbol.span;
                Ok(())
            }
            (kind, _) => Err(DeclareError::Redeclaration {
                name: symbol.name,
                existing_kind: kind.describe(),
                previous: existing.span,
                span: symbol.span,
            }),
        }
    }

    /// Innermost-to-outermost search starting at `from`.
    pub fn lookup(&self, from: ScopeId, name: Name) -> Option<&Symbol> {
        let mut current = Some(from);
        while let Some(id) = current {
            let data = self.scopes.get(id.index())?;
            if data.alive {
                if let Some(symbol) = data.symbols.get(&name) {
                    return Some(symbol);
                }
            }
            current = data.parent;
        }
        None
    }

    /// Like [`lookup`](Self::lookup), but stops before the global scope.
    ///
    /// Method bodies resolve names through this first so object fields can
    /// shadow globals while still losing to locals and parameters.
    pub fn lookup_local(&self, from: ScopeId, name: Name) -> Option<&Symbol> {
        let mut current = Some(from);
        while let Some(id) = current {
            if id == ScopeId::GLOBAL {
                return None;
            }
            let data = self.scopes.get(id.index())?;
            if data.alive {
                if let Some(symbol) = data.symbols.get(&name) {
                    return Some(symbol);
                }
            }
            current = data.parent;
        }
        None
    }

    pub fn lookup_local_mut(&mut self, from: ScopeId, name: Name) -> Option<&mut Symbol> {
        let mut current = Some(from);
        let mut found = None;
        while let Some(id) = current {
            if id == ScopeId::GLOBAL {
                break;
            }
            let data = self.scopes.get(id.index())?;
            if data.alive && data.symbols.contains_key(&name) {
                found = Some(id);
                break;
            }
            current = data.parent;
        }
        self.scopes[found?.index()].symbols.get_mut(&name)
    }

    pub fn lookup_mut(&mut self, from: ScopeId, name: Name) -> Option<&mut Symbol> {
        let mut current = Some(from);
        let mut found = None;
        while let Some(id) = current {
            let data = self.scopes.get(id.index())?;
            if data.alive && data.symbols.contains_key(&name) {
                found = Some(id);
                break;
            }
            current = data.parent;
        }
        self.scopes[found?.index()].symbols.get_mut(&name)
    }

    /// The class declaration bound to `name`, searching from `from`.
    pub fn class(&self, from: ScopeId, name: Name) -> Option<Rc<ClassDecl>> {
        match &self.lookup(from, name)?.kind {
            SymbolKind::Class(decl) => Some(Rc::clone(decl)),
            _ => None,
        }
    }

    /// Whether `derived` transitively lists `base` among its bases.
    ///
    /// A class is not its own base. Cyclic base lists terminate via the
    /// visited set and simply report `false`.
    pub fn is_base_of(&self, base: Name, derived: Name) -> bool {
        let mut visited = FxHashSet::default();
        let mut work = vec![derived];
        while let Some(class) = work.pop() {
            if !visited.insert(class) {
                continue;
            }
            let Some(decl) = self.class(ScopeId::GLOBAL, class) else {
                continue;
            };
            for spec in &decl.bases {
                if spec.name == base {
                    return true;
                }
                work.push(spec.name);
            }
        }
        false
    }

    /// Resolves a call against an interpreted overload set.
    pub fn resolve_overload(
        &self,
        overloads: &[Rc<FunctionDecl>],
        args: &[Value],
        interner: &StringInterner,
    ) -> Result<Rc<FunctionDecl>, OverloadError> {
        let param_lists: Vec<&[Param]> =
            overloads.iter().map(|o| o.params.as_slice()).collect();
        let is_base_of = |base: Name, derived: Name| self.is_base_of(base, derived);
        let ctx = RankContext {
            is_base_of: &is_base_of,
            string_type: interner.intern("string"),
        };
        let idx = select_overload(&param_lists, args, &ctx)?;
        Ok(Rc::clone(&overloads[idx]))
    }

    /// Merges a loaded module's exports into the global scope.
    ///
    /// All-or-nothing: every name is checked for clashes before any is
    /// installed, so a failed load leaves the table untouched. Reloading a
    /// module replaces its previous exports.
    pub fn load_foreign(
        &mut self,
        module: Name,
        entries: Vec<(Name, Signature, ForeignFn)>,
        span: Span,
    ) -> Result<(), DeclareError> {
        let previous = self.modules.remove(&module);

        for (name, _, _) in &entries {
            let clash = match self.scopes[0].symbols.get(name) {
                Some(symbol) => match &symbol.kind {
                    SymbolKind::Foreign(entry) => entry.module != module,
                    _ => true,
                },
                None => false,
            };
            if clash {
                if let Some(previous) = previous {
                    self.modules.insert(module, previous);
                }
                return Err(DeclareError::ForeignClash {
                    name: *name,
                    module,
                    span,
                });
            }
        }

        if let Some(previous) = previous {
            for name in previous {
                self.scopes[0].symbols.remove(&name);
            }
        }

        let mut installed = Vec::with_capacity(entries.len());
        for (name, signature, func) in entries {
            self.scopes[0].symbols.insert(
                name,
                Symbol {
                    name,
                    kind: SymbolKind::Foreign(ForeignEntry {
                        module,
                        signature,
                        func,
                    }),
                    storage: Storage::Global,
                    span,
                },
            );
            installed.push(name);
        }
        self.modules.insert(module, installed);
        Ok(())
    }

    /// Removes every symbol a module installed. No-op for unknown modules.
    pub fn remove_module(&mut self, module: Name) {
        if let Some(names) = self.modules.remove(&module) {
            for name in names {
                self.scopes[0].symbols.remove(&name);
            }
        }
    }

    /// Names currently installed by `module`.
    pub fn module_symbols(&self, module: Name) -> &[Name] {
        self.modules.get(&module).map_or(&[], Vec::as_slice)
    }
}

fn param_types(params: &[Param]) -> Vec<&ced_ir::TypeRef> {
    params.iter().map(|p| &p.ty).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ced_ir::TypeRef;
    use pretty_assertions::assert_eq;

    fn var(interner: &StringInterner, name: &str, value: Value) -> Symbol {
        Symbol::variable(
            interner.intern(name),
            TypeRef::Int,
            value,
            Storage::Local,
            Span::DUMMY,
        )
    }

    fn function(interner: &StringInterner, name: &str, params: Vec<TypeRef>) -> Symbol {
        Symbol::function(Rc::new(FunctionDecl {
            name: interner.intern(name),
            ret: TypeRef::Void,
            params: params
                .into_iter()
                .map(|ty| Param {
                    name: Name::EMPTY,
                    ty,
                    span: Span::DUMMY,
                })
                .collect(),
            body: None,
            span: Span::DUMMY,
        }))
    }

    fn class(interner: &StringInterner, name: &str, bases: &[&str]) -> Symbol {
        Symbol::class(Rc::new(ClassDecl {
            name: interner.intern(name),
            is_struct: false,
            bases: bases
                .iter()
                .map(|b| ced_ir::BaseSpecifier {
                    name: interner.intern(b),
                    access: ced_ir::Access::Public,
                    span: Span::DUMMY,
                })
                .collect(),
            members: Vec::new(),
            span: Span::DUMMY,
        }))
    }

    #[test]
    fn scope_exit_destroys_symbols() {
        let interner = StringInterner::new();
        let x = interner.intern("x");
        let mut table = SymbolTable::new();

        let block = table.enter(ScopeKind::Block, ScopeId::GLOBAL);
        table.declare(block, var(&interner, "x", Value::Int(1))).unwrap();
        assert!(table.lookup(block, x).is_some());

        table.exit(block);
        assert!(table.lookup(ScopeId::GLOBAL, x).is_none());
    }

    #[test]
    fn exited_scopes_are_reused() {
        let interner = StringInterner::new();
        let x = interner.intern("x");
        let mut table = SymbolTable::new();

        let first = table.enter(ScopeKind::Block, ScopeId::GLOBAL);
        table.exit(first);

        // A loop body enters and exits one scope per iteration; every
        // iteration must land on the same recycled slot.
        for _ in 0..10_000 {
            let block = table.enter(ScopeKind::Block, ScopeId::GLOBAL);
            assert_eq!(block, first);
            table.declare(block, var(&interner, "x", Value::Int(1))).unwrap();
            table.exit(block);
        }
        assert!(table.lookup(ScopeId::GLOBAL, x).is_none());

        // Exiting twice must not hand the slot out to two callers.
        table.exit(first);
        let a = table.enter(ScopeKind::Block, ScopeId::GLOBAL);
        let b = table.enter(ScopeKind::Block, a);
        assert_ne!(a, b);
    }

    #[test]
    fn lookup_searches_innermost_first() {
        let interner = StringInterner::new();
        let x = interner.intern("x");
        let mut table = SymbolTable::new();

        table
            .declare(ScopeId::GLOBAL, var(&interner, "x", Value::Int(1)))
            .unwrap();
        let block = table.enter(ScopeKind::Block, ScopeId::GLOBAL);
        table.declare(block, var(&interner, "x", Value::Int(2))).unwrap();

        match &table.lookup(block, x).unwrap().kind {
            SymbolKind::Variable { value, .. } => assert_eq!(*value, Value::Int(2)),
            other => panic!("expected variable, got {other:?}"),
        }
        // The global binding is untouched underneath.
        match &table.lookup(ScopeId::GLOBAL, x).unwrap().kind {
            SymbolKind::Variable { value, .. } => assert_eq!(*value, Value::Int(1)),
            other => panic!("expected variable, got {other:?}"),
        }
    }

    #[test]
    fn variable_redeclaration_is_an_error() {
        let interner = StringInterner::new();
        let mut table = SymbolTable::new();

        table
            .declare(ScopeId::GLOBAL, var(&interner, "x", Value::Int(1)))
            .unwrap();
        let err = table
            .declare(ScopeId::GLOBAL, var(&interner, "x", Value::Int(2)))
            .unwrap_err();
        assert!(matches!(err, DeclareError::Redeclaration { .. }));
    }

    #[test]
    fn functions_accumulate_overloads() {
        let interner = StringInterner::new();
        let f = interner.intern("f");
        let mut table = SymbolTable::new();

        table
            .declare(ScopeId::GLOBAL, function(&interner, "f", vec![TypeRef::Int]))
            .unwrap();
        table
            .declare(
                ScopeId::GLOBAL,
                function(&interner, "f", vec![TypeRef::Double]),
            )
            .unwrap();

        match &table.lookup(ScopeId::GLOBAL, f).unwrap().kind {
            SymbolKind::Function(overloads) => assert_eq!(overloads.len(), 2),
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn same_signature_redefinition_replaces() {
        let interner = StringInterner::new();
        let f = interner.intern("f");
        let mut table = SymbolTable::new();

        table
            .declare(ScopeId::GLOBAL, function(&interner, "f", vec![TypeRef::Int]))
            .unwrap();
        table
            .declare(ScopeId::GLOBAL, function(&interner, "f", vec![TypeRef::Int]))
            .unwrap();

        match &table.lookup(ScopeId::GLOBAL, f).unwrap().kind {
            SymbolKind::Function(overloads) => assert_eq!(overloads.len(), 1),
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn base_walk_is_transitive() {
        let interner = StringInterner::new();
        let mut table = SymbolTable::new();

        table.declare(ScopeId::GLOBAL, class(&interner, "A", &[])).unwrap();
        table
            .declare(ScopeId::GLOBAL, class(&interner, "B", &["A"]))
            .unwrap();
        table
            .declare(ScopeId::GLOBAL, class(&interner, "C", &["B"]))
            .unwrap();

        let a = interner.intern("A");
        let c = interner.intern("C");
        assert!(table.is_base_of(a, c));
        assert!(!table.is_base_of(c, a));
        assert!(!table.is_base_of(a, a));
    }

    #[test]
    fn foreign_load_is_atomic() {
        let interner = StringInterner::new();
        let module = interner.intern("libm");
        let mut table = SymbolTable::new();

        // `f` already exists as an interpreted function.
        table
            .declare(ScopeId::GLOBAL, function(&interner, "f", vec![]))
            .unwrap();

        let noop: ForeignFn = Rc::new(|_| Ok(Value::Void));
        let sig = Signature::new(vec![], TypeRef::Void);
        let err = table
            .load_foreign(
                module,
                vec![
                    (interner.intern("g"), sig.clone(), Rc::clone(&noop)),
                    (interner.intern("f"), sig.clone(), Rc::clone(&noop)),
                ],
                Span::DUMMY,
            )
            .unwrap_err();
        assert!(matches!(err, DeclareError::ForeignClash { .. }));
        // Nothing from the failed load leaked in.
        assert!(table.lookup(ScopeId::GLOBAL, interner.intern("g")).is_none());

        // A clash-free load merges and records the module.
        table
            .load_foreign(
                module,
                vec![(interner.intern("g"), sig, noop)],
                Span::DUMMY,
            )
            .unwrap();
        assert!(table.lookup(ScopeId::GLOBAL, interner.intern("g")).is_some());
        assert_eq!(table.module_symbols(module).len(), 1);

        table.remove_module(module);
        assert!(table.lookup(ScopeId::GLOBAL, interner.intern("g")).is_none());
    }
}
