//! Process-wide reflection dictionary.
//!
//! Classes register a `ClassInfo`; the registry derives a flattened
//! `DictionaryEntry` per class (inherited members and methods included,
//! dispatch kinds resolved) and regenerates every entry on each
//! registration so re-registering a base propagates into derived entries.
//! Registration is keyed by class name, last write wins.

mod entry;

pub use entry::{DictionaryEntry, MemberEntry, MethodEntry};

use ced_ir::{ClassInfo, DispatchKind, MethodInfo, Name};
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

/// Registration failure. The registry is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DictError {
    #[error("base class is not registered")]
    UnknownBase { class: Name, base: Name },

    #[error("inheritance cycle")]
    CyclicInheritance { class: Name },
}

/// The dictionary registry for one session.
#[derive(Debug, Default)]
pub struct DictionaryRegistry {
    infos: FxHashMap<Name, ClassInfo>,
    entries: FxHashMap<Name, DictionaryEntry>,
}

impl DictionaryRegistry {
    pub fn new() -> Self {
        DictionaryRegistry::default()
    }

    /// Registers (or replaces) a class and regenerates all entries.
    #[tracing::instrument(level = "debug", skip_all, fields(class = info.name.index()))]
    pub fn register(&mut self, info: ClassInfo) -> Result<(), DictError> {
        let class = info.name;
        for base in &info.bases {
            if *base != class && !self.infos.contains_key(base) {
                return Err(DictError::UnknownBase { class, base: *base });
            }
        }

        let previous = self.infos.insert(class, info);
        if self.has_cycle(class) {
            match previous {
                Some(old) => self.infos.insert(class, old),
                None => self.infos.remove(&class),
            };
            return Err(DictError::CyclicInheritance { class });
        }

        self.regenerate();
        Ok(())
    }

    pub fn find(&self, name: Name) -> Option<&DictionaryEntry> {
        self.entries.get(&name)
    }

    pub fn class_info(&self, name: Name) -> Option<&ClassInfo> {
        self.infos.get(&name)
    }

    pub fn entries(&self) -> impl Iterator<Item = &DictionaryEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.infos.clear();
        self.entries.clear();
    }

    /// The registry was acyclic before, so any new cycle runs through the
    /// freshly registered class.
    fn has_cycle(&self, start: Name) -> bool {
        let mut visited = FxHashSet::default();
        let mut work: Vec<Name> = self
            .infos
            .get(&start)
            .map(|info| info.bases.clone())
            .unwrap_or_default();
        while let Some(class) = work.pop() {
            if class == start {
                return true;
            }
            if !visited.insert(class) {
                continue;
            }
            if let Some(info) = self.infos.get(&class) {
                work.extend(info.bases.iter().copied());
            }
        }
        false
    }

    fn regenerate(&mut self) {
        self.entries = self
            .infos
            .keys()
            .map(|name| (*name, self.generate(*name)))
            .collect();
    }

    /// Full inheritance chain behind `class`, nearest base first.
    fn linearize(&self, class: Name) -> Vec<Name> {
        let mut chain = Vec::new();
        let mut seen = FxHashSet::default();
        seen.insert(class);
        let mut work: Vec<Name> = self
            .infos
            .get(&class)
            .map(|info| info.bases.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(base) = work.pop() {
            if !seen.insert(base) {
                continue;
            }
            chain.push(base);
            if let Some(info) = self.infos.get(&base) {
                work.extend(info.bases.iter().rev().copied());
            }
        }
        chain
    }

    fn generate(&self, class: Name) -> DictionaryEntry {
        let bases = self.linearize(class);
        let mut members = Vec::new();
        let mut methods: Vec<MethodEntry> = Vec::new();
        let mut member_names = FxHashSet::default();

        for owner in std::iter::once(class).chain(bases.iter().copied()) {
            let Some(info) = self.infos.get(&owner) else {
                continue;
            };
            for member in &info.members {
                // Derived fields shadow base fields of the same name.
                if member_names.insert(member.name) {
                    members.push(MemberEntry {
                        name: member.name,
                        ty: member.ty.clone(),
                        access: member.access,
                        declared_in: owner,
                    });
                }
            }
            for method in &info.methods {
                let overridden = methods.iter().any(|m| {
                    m.name == method.name && m.signature.params == method.signature.params
                });
                if overridden {
                    continue;
                }
                methods.push(MethodEntry {
                    name: method.name,
                    signature: method.signature.clone(),
                    dispatch: self.dispatch_kind(owner, method),
                    access: method.access,
                    is_static: method.is_static,
                    declared_in: owner,
                });
            }
        }

        DictionaryEntry {
            class,
            bases,
            members,
            methods,
        }
    }

    /// A method overriding a virtual base method dispatches as `Override`;
    /// a virtual declaration with nothing to override is the root
    /// `Virtual`; the rest are `Static`.
    fn dispatch_kind(&self, owner: Name, method: &MethodInfo) -> DispatchKind {
        let overrides_base = self.linearize(owner).iter().any(|base| {
            self.infos.get(base).is_some_and(|info| {
                info.methods.iter().any(|m| {
                    m.is_virtual
                        && m.name == method.name
                        && m.signature.params == method.signature.params
                })
            })
        });
        if overrides_base {
            DispatchKind::Override
        } else if method.is_virtual {
            DispatchKind::Virtual
        } else {
            DispatchKind::Static
        }
    }
}
