//! Loader errors.

use ced_ir::Name;
use ced_table::DeclareError;
use std::path::PathBuf;
use thiserror::Error;

/// Why a module failed to load. The symbol table is untouched on failure.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open module `{}`: {message}", path.display())]
    Open { path: PathBuf, message: String },

    #[error("module `{}` exports no `ced_module_exports` manifest", path.display())]
    MissingManifest { path: PathBuf },

    #[error("malformed manifest entry `{entry}`")]
    BadManifest { entry: String },

    #[error("manifest names `{symbol}` but the library does not export it")]
    MissingSymbol { symbol: String },

    #[error(transparent)]
    Clash(#[from] DeclareError),
}

/// Why a module cannot be unloaded right now.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnloadError {
    #[error("module is not loaded")]
    Unknown { module: Name },

    #[error("module symbols are still in use")]
    InUse { module: Name },
}
