//! String interner for identifiers, macro names, and class names.
//!
//! Interning gives O(1) equality on names throughout the pipeline and keeps
//! tokens and AST nodes `Copy`-friendly. The table is append-only: entries
//! live for the interner's lifetime, which matches the process-wide lifetime
//! of the global symbol table that holds the names.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fmt;

/// Interned string id.
///
/// Only meaningful together with the interner that produced it.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Name(u32);

impl Name {
    /// The empty string, pre-interned at index 0.
    pub const EMPTY: Name = Name(0);

    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

struct InternerState {
    map: FxHashMap<&'static str, u32>,
    strings: Vec<&'static str>,
}

/// Thread-safe string interner.
///
/// A single map behind an `RwLock`; reads (the common case once a session
/// warms up) take the shared lock. Strings are leaked to get `'static`
/// lifetime, which is acceptable for a process-wide table.
pub struct StringInterner {
    state: RwLock<InternerState>,
}

impl StringInterner {
    pub fn new() -> Self {
        let mut map = FxHashMap::default();
        let empty: &'static str = "";
        map.insert(empty, 0);
        StringInterner {
            state: RwLock::new(InternerState {
                map,
                strings: vec![empty],
            }),
        }
    }

    /// Intern a string, returning its stable id.
    pub fn intern(&self, s: &str) -> Name {
        {
            let guard = self.state.read();
            if let Some(&idx) = guard.map.get(s) {
                return Name(idx);
            }
        }

        let mut guard = self.state.write();
        // Re-check: another thread may have interned between the locks.
        if let Some(&idx) = guard.map.get(s) {
            return Name(idx);
        }
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let idx = u32::try_from(guard.strings.len())
            .unwrap_or_else(|_| panic!("interner exceeded {} strings", u32::MAX));
        guard.strings.push(leaked);
        guard.map.insert(leaked, idx);
        Name(idx)
    }

    /// Resolve an id back to its string.
    ///
    /// # Panics
    /// Panics if `name` came from a different interner.
    pub fn lookup(&self, name: Name) -> &'static str {
        let guard = self.state.read();
        guard
            .strings
            .get(name.0 as usize)
            .copied()
            .unwrap_or_else(|| panic!("name {:?} not present in this interner", name))
    }

    /// Number of distinct strings interned (including the empty string).
    pub fn len(&self) -> usize {
        self.state.read().strings.len()
    }

    pub fn is_empty(&self) -> bool {
        // Index 0 is always populated.
        false
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StringInterner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringInterner")
            .field("len", &self.len())
            .finish()
    }
}
