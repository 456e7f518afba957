//! Include path resolution.

use std::path::{Path, PathBuf};

/// Ordered include search directories (`-I` on the command line).
#[derive(Clone, Debug, Default)]
pub struct SearchPaths {
    dirs: Vec<PathBuf>,
}

impl SearchPaths {
    pub fn new() -> Self {
        SearchPaths::default()
    }

    pub fn push(&mut self, dir: impl Into<PathBuf>) {
        self.dirs.push(dir.into());
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Every directory a resolve attempt would try, in order, for error
    /// reporting when none of them has the file.
    pub fn searched(&self, angled: bool, current_dir: Option<&Path>) -> Vec<PathBuf> {
        let mut tried = Vec::with_capacity(self.dirs.len() + 1);
        if !angled {
            if let Some(dir) = current_dir {
                tried.push(dir.to_path_buf());
            }
        }
        tried.extend(self.dirs.iter().cloned());
        tried
    }

    /// Resolves an include to an existing file.
    ///
    /// Quoted includes try the including file's directory before the search
    /// path; angled includes only consult the search path.
    pub fn resolve(
        &self,
        path: &str,
        angled: bool,
        current_dir: Option<&Path>,
    ) -> Option<PathBuf> {
        if !angled {
            if let Some(dir) = current_dir {
                let candidate = dir.join(path);
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }
        self.dirs
            .iter()
            .map(|dir| dir.join(path))
            .find(|candidate| candidate.is_file())
    }
}
