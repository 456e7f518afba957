//! Export manifests.
//!
//! A native module advertises its exports through `ced_module_exports`,
//! which returns one line per export in the form `name;ret(params)`. Types
//! are one-letter tags: `v` void, `i` int, `d` double, `b` bool, `c` char,
//! `s` string. `add;i(ii)` exports `int add(int, int)`.

use crate::LoadError;
use ced_ir::{Name, Signature, TypeRef};

/// The manifest entry point every native module must export.
pub const MANIFEST_SYMBOL: &str = "ced_module_exports";

/// One parsed manifest line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManifestEntry {
    pub name: String,
    pub signature: Signature,
}

pub fn parse_manifest(text: &str, string_type: Name) -> Result<Vec<ManifestEntry>, LoadError> {
    let mut entries = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let entry = parse_entry(line, string_type).ok_or_else(|| LoadError::BadManifest {
            entry: line.to_owned(),
        })?;
        entries.push(entry);
    }
    Ok(entries)
}

fn parse_entry(line: &str, string_type: Name) -> Option<ManifestEntry> {
    let (name, sig) = line.split_once(';')?;
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    let mut chars = sig.chars();
    let ret = tag_type(chars.next()?, string_type)?;
    let rest: String = chars.collect();
    let inner = rest.strip_prefix('(')?.strip_suffix(')')?;
    let params = inner
        .chars()
        .map(|tag| match tag {
            // void never appears in a parameter list
            'v' => None,
            other => tag_type(other, string_type),
        })
        .collect::<Option<Vec<_>>>()?;
    Some(ManifestEntry {
        name: name.to_owned(),
        signature: Signature::new(params, ret),
    })
}

fn tag_type(tag: char, string_type: Name) -> Option<TypeRef> {
    match tag {
        'v' => Some(TypeRef::Void),
        'i' => Some(TypeRef::Int),
        'd' => Some(TypeRef::Double),
        'b' => Some(TypeRef::Bool),
        'c' => Some(TypeRef::Char),
        's' => Some(TypeRef::Named(string_type)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ced_ir::StringInterner;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_typical_manifest() {
        let interner = StringInterner::new();
        let string_type = interner.intern("string");
        let entries = parse_manifest("add;i(ii)\n\nhypot;d(dd)\ngreet;s(s)\n", string_type)
            .unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].name, "add");
        assert_eq!(
            entries[0].signature,
            Signature::new(vec![TypeRef::Int, TypeRef::Int], TypeRef::Int)
        );
        assert_eq!(
            entries[2].signature,
            Signature::new(vec![TypeRef::Named(string_type)], TypeRef::Named(string_type))
        );
    }

    #[test]
    fn nullary_and_void_returns() {
        let interner = StringInterner::new();
        let string_type = interner.intern("string");
        let entries = parse_manifest("tick;v()", string_type).unwrap();
        assert_eq!(entries[0].signature, Signature::new(vec![], TypeRef::Void));
    }

    #[test]
    fn rejects_malformed_lines() {
        let interner = StringInterner::new();
        let string_type = interner.intern("string");

        for bad in [";i(i)", "f;x(i)", "f;i(iv)", "f;ii", "f i(i)", "sp ace;i()"] {
            let err = parse_manifest(bad, string_type).unwrap_err();
            assert!(matches!(err, LoadError::BadManifest { .. }), "{bad}");
        }
    }
}
