//! Class metadata extracted from parsed declarations.
//!
//! `ClassInfo` is the parser-side description of a class: name, ordered base
//! list, members, methods. The dictionary generator projects it into the
//! read-only `DictionaryEntry` form the reflection system consumes.

use crate::{ClassDecl, ClassMember, Name, Signature, TypeRef};

/// Member access control.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Access {
    Public,
    Protected,
    Private,
}

impl Access {
    pub const fn as_str(self) -> &'static str {
        match self {
            Access::Public => "public",
            Access::Protected => "protected",
            Access::Private => "private",
        }
    }
}

/// How a method call is dispatched.
///
/// `Override` marks a virtual method that replaces a base-class virtual of
/// the same name; the distinction is recorded once at dictionary generation
/// rather than re-derived in the evaluator.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DispatchKind {
    Static,
    Virtual,
    Override,
}

impl DispatchKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            DispatchKind::Static => "static",
            DispatchKind::Virtual => "virtual",
            DispatchKind::Override => "override",
        }
    }

    pub const fn is_virtual(self) -> bool {
        matches!(self, DispatchKind::Virtual | DispatchKind::Override)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MemberInfo {
    pub name: Name,
    pub ty: TypeRef,
    pub access: Access,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MethodInfo {
    pub name: Name,
    pub signature: Signature,
    pub is_virtual: bool,
    pub is_static: bool,
    pub access: Access,
}

/// Structural description of one class declaration.
///
/// Bases are an ordered list of class names (multiple inheritance is a list,
/// not host-language inheritance). The base list must stay acyclic; the
/// dictionary registry enforces that on registration.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassInfo {
    pub name: Name,
    pub bases: Vec<Name>,
    pub members: Vec<MemberInfo>,
    pub methods: Vec<MethodInfo>,
}

impl ClassInfo {
    /// Extract metadata from a parsed class declaration.
    pub fn from_decl(decl: &ClassDecl) -> Self {
        let mut members = Vec::new();
        let mut methods = Vec::new();
        for member in &decl.members {
            match member {
                ClassMember::Field(field) => members.push(MemberInfo {
                    name: field.name,
                    ty: field.ty.clone(),
                    access: field.access,
                }),
                ClassMember::Method(method) => methods.push(MethodInfo {
                    name: method.name,
                    signature: method.signature(),
                    is_virtual: method.is_virtual,
                    is_static: method.is_static,
                    access: method.access,
                }),
            }
        }
        ClassInfo {
            name: decl.name,
            bases: decl.bases.iter().map(|b| b.name).collect(),
            members,
            methods,
        }
    }

    pub fn method(&self, name: Name) -> Option<&MethodInfo> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn member(&self, name: Name) -> Option<&MemberInfo> {
        self.members.iter().find(|m| m.name == name)
    }
}
