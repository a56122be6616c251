//! Observable facets of a loaded module.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};

/// Printed in place of a location for modules compiled into the runtime.
pub const BUILTIN_ORIGIN: &str = "(builtin)";

/// A module as seen through the registry. Everything besides these two
/// attributes is opaque to the census.
pub trait ModuleEntity {
    /// Where the module was loaded from. `None` means builtin/compiled-in.
    fn origin(&self) -> Option<&Path>;

    /// Location of a precompiled cache artifact for this module, if the
    /// runtime assigned one.
    fn cached_artifact(&self) -> Option<&Path> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Path(PathBuf),
    Builtin,
}

impl Origin {
    pub fn of<M: ModuleEntity + ?Sized>(module: &M) -> Self {
        match module.origin() {
            Some(path) => Origin::Path(path.to_path_buf()),
            None => Origin::Builtin,
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Origin::Builtin)
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Path(path) => write!(f, "{}", path.display()),
            Origin::Builtin => f.write_str(BUILTIN_ORIGIN),
        }
    }
}

// Builtins serialize as `null`, not as the text sentinel.
impl Serialize for Origin {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Origin::Path(path) => serializer.serialize_str(&path.to_string_lossy()),
            Origin::Builtin => serializer.serialize_none(),
        }
    }
}
