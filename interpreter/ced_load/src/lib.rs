//! Loader bridge between the interpreter and compiled modules.
//!
//! Two backends share one surface: host-registered Rust closures (the
//! builtin library uses this) and shared libraries resolved through
//! `libloading`. Either way a module's exports merge into the global symbol
//! table atomically, and unload removes exactly what the module installed.
//! Unloading refuses while any export is still referenced outside the
//! table, because dropping the library would leave live callers dangling.

mod error;
mod manifest;
mod native;

pub use error::{LoadError, UnloadError};
pub use manifest::{ManifestEntry, MANIFEST_SYMBOL};

use ced_ir::{Name, Signature, Span, StringInterner};
use ced_table::{ForeignFn, SymbolTable};
use libloading::Library;
use rustc_hash::FxHashMap;
use std::path::Path;
use std::rc::Rc;

/// One export a host registers directly, without a shared library.
pub struct HostExport {
    pub name: String,
    pub signature: Signature,
    pub func: ForeignFn,
}

impl HostExport {
    pub fn new(name: impl Into<String>, signature: Signature, func: ForeignFn) -> Self {
        HostExport {
            name: name.into(),
            signature,
            func,
        }
    }
}

enum Backend {
    Registered,
    /// Kept alive until unload so the wrapped entry points stay valid.
    Native(#[allow(dead_code, reason = "held for its drop order")] Library),
}

struct LoadedModule {
    exports: Vec<(Name, ForeignFn)>,
    backend: Backend,
}

/// The loader bridge for one session.
pub struct LoaderBridge {
    interner: Rc<StringInterner>,
    modules: FxHashMap<Name, LoadedModule>,
}

impl LoaderBridge {
    pub fn new(interner: Rc<StringInterner>) -> Self {
        LoaderBridge {
            interner,
            modules: FxHashMap::default(),
        }
    }

    /// Loads a shared library and merges its manifest exports into the
    /// global scope. Reloading a module replaces its previous exports.
    #[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
    pub fn load(
        &mut self,
        path: &Path,
        table: &mut SymbolTable,
        span: Span,
    ) -> Result<Name, LoadError> {
        let library = native::open(path)?;
        let string_type = self.interner.intern("string");
        let entries = native::read_manifest(&library, path, string_type)?;

        let module = self.module_name(path);
        let mut exports = Vec::with_capacity(entries.len());
        let mut merged = Vec::with_capacity(entries.len());
        for entry in &entries {
            let func = native::bind(&library, entry)?;
            let name = self.interner.intern(&entry.name);
            exports.push((name, Rc::clone(&func)));
            merged.push((name, entry.signature.clone(), func));
        }

        table.load_foreign(module, merged, span)?;
        self.modules.insert(
            module,
            LoadedModule {
                exports,
                backend: Backend::Native(library),
            },
        );
        tracing::debug!(exports = entries.len(), "module loaded");
        Ok(module)
    }

    /// Registers host-provided exports under a module name.
    pub fn register(
        &mut self,
        module: &str,
        host_exports: Vec<HostExport>,
        table: &mut SymbolTable,
        span: Span,
    ) -> Result<Name, LoadError> {
        let module = self.interner.intern(module);
        let mut exports = Vec::with_capacity(host_exports.len());
        let mut merged = Vec::with_capacity(host_exports.len());
        for export in host_exports {
            let name = self.interner.intern(&export.name);
            exports.push((name, Rc::clone(&export.func)));
            merged.push((name, export.signature, export.func));
        }

        table.load_foreign(module, merged, span)?;
        self.modules.insert(
            module,
            LoadedModule {
                exports,
                backend: Backend::Registered,
            },
        );
        Ok(module)
    }

    /// Unloads a module, removing every symbol it installed.
    ///
    /// Each export is normally held twice, once by the bridge and once by
    /// the table; any extra strong count means a caller still has the
    /// function and the module must stay resident.
    pub fn unload(&mut self, module: Name, table: &mut SymbolTable) -> Result<(), UnloadError> {
        let Some(loaded) = self.modules.get(&module) else {
            return Err(UnloadError::Unknown { module });
        };
        for (name, func) in &loaded.exports {
            let expected = if table.module_symbols(module).contains(name) {
                2
            } else {
                1
            };
            if Rc::strong_count(func) > expected {
                return Err(UnloadError::InUse { module });
            }
        }
        table.remove_module(module);
        // The Library drops last, after the table released its wrappers.
        self.modules.remove(&module);
        Ok(())
    }

    pub fn is_loaded(&self, module: Name) -> bool {
        self.modules.contains_key(&module)
    }

    /// Names of all loaded modules.
    pub fn modules(&self) -> Vec<Name> {
        let mut names: Vec<Name> = self.modules.keys().copied().collect();
        names.sort_by_key(|name| self.interner.lookup(*name));
        names
    }

    /// `libvec.so` loads as module `vec`.
    fn module_name(&self, path: &Path) -> Name {
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("module");
        self.interner.intern(stem.strip_prefix("lib").unwrap_or(stem))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ced_ir::TypeRef;
    use ced_rt::Value;
    use ced_table::{ScopeId, SymbolKind};
    use pretty_assertions::assert_eq;

    fn session() -> (Rc<StringInterner>, SymbolTable, LoaderBridge) {
        let interner = Rc::new(StringInterner::new());
        let table = SymbolTable::new();
        let bridge = LoaderBridge::new(Rc::clone(&interner));
        (interner, table, bridge)
    }

    fn doubler() -> HostExport {
        let func: ForeignFn = Rc::new(|args| match args.first().and_then(Value::as_int) {
            Some(n) => Ok(Value::Int(n * 2)),
            None => Err("expected an int".to_owned()),
        });
        HostExport::new(
            "dbl",
            Signature::new(vec![TypeRef::Int], TypeRef::Int),
            func,
        )
    }

    #[test]
    fn registered_module_roundtrip() {
        let (interner, mut table, mut bridge) = session();
        let module = bridge
            .register("mathx", vec![doubler()], &mut table, Span::DUMMY)
            .unwrap();
        assert!(bridge.is_loaded(module));

        let dbl = interner.intern("dbl");
        let result = match &table.lookup(ScopeId::GLOBAL, dbl).unwrap().kind {
            SymbolKind::Foreign(entry) => (entry.func)(&[Value::Int(21)]).unwrap(),
            other => panic!("expected foreign symbol, got {other:?}"),
        };
        assert_eq!(result, Value::Int(42));

        bridge.unload(module, &mut table).unwrap();
        assert!(!bridge.is_loaded(module));
        assert!(table.lookup(ScopeId::GLOBAL, dbl).is_none());
    }

    #[test]
    fn unload_refuses_while_referenced() {
        let (interner, mut table, mut bridge) = session();
        let module = bridge
            .register("mathx", vec![doubler()], &mut table, Span::DUMMY)
            .unwrap();

        let dbl = interner.intern("dbl");
        // A caller still holding the function pins the module.
        let held = table.lookup(ScopeId::GLOBAL, dbl).unwrap().kind.clone();
        let err = bridge.unload(module, &mut table).unwrap_err();
        assert_eq!(err, UnloadError::InUse { module });
        assert!(table.lookup(ScopeId::GLOBAL, dbl).is_some());

        drop(held);
        bridge.unload(module, &mut table).unwrap();
    }

    #[test]
    fn unknown_module_unload_errors() {
        let (interner, mut table, mut bridge) = session();
        let ghost = interner.intern("ghost");
        assert_eq!(
            bridge.unload(ghost, &mut table).unwrap_err(),
            UnloadError::Unknown { module: ghost }
        );
    }

    #[test]
    fn clash_leaves_table_and_bridge_untouched() {
        let (interner, mut table, mut bridge) = session();
        // `dbl` already exists as an interpreted variable.
        table
            .declare(
                ScopeId::GLOBAL,
                ced_table::Symbol::variable(
                    interner.intern("dbl"),
                    TypeRef::Int,
                    Value::Int(1),
                    ced_table::Storage::Global,
                    Span::DUMMY,
                ),
            )
            .unwrap();

        let err = bridge
            .register("mathx", vec![doubler()], &mut table, Span::DUMMY)
            .unwrap_err();
        assert!(matches!(err, LoadError::Clash(_)));
        assert!(!bridge.is_loaded(interner.intern("mathx")));
    }
}
