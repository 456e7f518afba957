//! Flattened dictionary entries.

use ced_ir::{Access, DispatchKind, Name, Signature, TypeRef};

/// A field visible on a class, with the class that declared it.
#[derive(Clone, Debug, PartialEq)]
pub struct MemberEntry {
    pub name: Name,
    pub ty: TypeRef,
    pub access: Access,
    pub declared_in: Name,
}

/// A callable method visible on a class.
///
/// `dispatch` is fixed at generation time: `Virtual` for a virtual
/// declaration, `Override` when it replaces a virtual base method, and
/// `Static` otherwise. The evaluator never re-derives this at call time.
#[derive(Clone, Debug, PartialEq)]
pub struct MethodEntry {
    pub name: Name,
    pub signature: Signature,
    pub dispatch: DispatchKind,
    pub access: Access,
    pub is_static: bool,
    pub declared_in: Name,
}

/// The reflection record for one class.
///
/// Derived entirely from registered `ClassInfo`s: base members and methods
/// are flattened in, derived-first, with overridden base methods dropped.
/// `bases` is the full inheritance chain, nearest first.
#[derive(Clone, Debug, PartialEq)]
pub struct DictionaryEntry {
    pub class: Name,
    pub bases: Vec<Name>,
    pub members: Vec<MemberEntry>,
    pub methods: Vec<MethodEntry>,
}

impl DictionaryEntry {
    /// All methods visible under `name`, derived-first.
    pub fn methods_named(&self, name: Name) -> Vec<&MethodEntry> {
        self.methods.iter().filter(|m| m.name == name).collect()
    }

    pub fn member(&self, name: Name) -> Option<&MemberEntry> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Whether `class` is this class or one of its bases.
    pub fn derives_from(&self, class: Name) -> bool {
        self.class == class || self.bases.contains(&class)
    }
}
