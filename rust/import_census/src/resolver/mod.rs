//! Rebuilds an executable code object for the imported target, preferring
//! the runtime's precompiled cache over recompiling source text.

pub mod artifact;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::entity::ModuleEntity;
use crate::errors::CensusResult;

pub use artifact::{select_artifact, Artifact, ArtifactHeader, CacheMiss, Magic, HEADER_LEN};

/// Runtime facilities needed to turn an [`Artifact`] into code.
pub trait CodeLoader {
    type Code;

    /// Magic number the running runtime writes into its own cache files.
    fn expected_magic(&mut self) -> CensusResult<Magic>;

    /// Full width of the runtime's cache header. Runtimes that extend the
    /// common magic/timestamp/padding words report the wider size here.
    fn header_len(&self) -> usize {
        HEADER_LEN
    }

    /// Deserialize the body of a cache artifact whose magic matched.
    fn load_cached(&mut self, header: &ArtifactHeader, blob: &[u8]) -> CensusResult<Self::Code>;

    fn compile_source(&mut self, text: &str, path: &Path) -> CensusResult<Self::Code>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum Provenance {
    Cache(PathBuf),
    Source(PathBuf),
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Cache(path) => write!(f, "cache {}", path.display()),
            Provenance::Source(path) => write!(f, "source {}", path.display()),
        }
    }
}

#[derive(Debug)]
pub struct ResolvedCode<C> {
    pub code: C,
    pub provenance: Provenance,
}

/// Produce exactly one code object for `module`. Failures on the chosen
/// path are returned as-is; there is no second attempt.
pub fn resolve_code<L, M>(loader: &mut L, module: &M) -> CensusResult<ResolvedCode<L::Code>>
where
    L: CodeLoader + ?Sized,
    M: ModuleEntity + ?Sized,
{
    let expected = loader.expected_magic()?;
    match select_artifact(module, &expected, loader.header_len())? {
        Artifact::Cached { path, header, blob } => {
            tracing::debug!(path = %path.display(), bytes = blob.len(), "Loading cached code object");
            let code = loader.load_cached(&header, &blob)?;
            Ok(ResolvedCode {
                code,
                provenance: Provenance::Cache(path),
            })
        }
        Artifact::Source { path, text } => {
            tracing::debug!(path = %path.display(), bytes = text.len(), "Compiling source text");
            let code = loader.compile_source(&text, &path)?;
            Ok(ResolvedCode {
                code,
                provenance: Provenance::Source(path),
            })
        }
    }
}
