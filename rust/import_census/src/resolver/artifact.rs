//! On-disk representations a code object can be rebuilt from.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::entity::ModuleEntity;
use crate::errors::{CensusError, CensusResult};

pub type Magic = [u8; 4];

/// Magic number, timestamp and padding/hash words in front of a cached
/// code object.
pub const HEADER_LEN: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactHeader {
    pub magic: Magic,
    /// Opaque; read and discarded.
    pub timestamp: [u8; 4],
    /// Opaque; read and discarded.
    pub padding: [u8; 4],
}

impl ArtifactHeader {
    pub fn parse(bytes: &[u8; HEADER_LEN]) -> Self {
        let mut magic = [0u8; 4];
        let mut timestamp = [0u8; 4];
        let mut padding = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);
        timestamp.copy_from_slice(&bytes[4..8]);
        padding.copy_from_slice(&bytes[8..12]);
        Self {
            magic,
            timestamp,
            padding,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    Cached {
        path: PathBuf,
        header: ArtifactHeader,
        blob: Vec<u8>,
    },
    Source {
        path: PathBuf,
        text: String,
    },
}

impl Artifact {
    pub fn path(&self) -> &Path {
        match self {
            Artifact::Cached { path, .. } | Artifact::Source { path, .. } => path,
        }
    }
}

/// Why the cached artifact was passed over. Never surfaced as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheMiss {
    NoArtifact,
    Unreadable(io::ErrorKind),
    TruncatedHeader,
    MagicMismatch { found: Magic, expected: Magic },
}

impl fmt::Display for CacheMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheMiss::NoArtifact => f.write_str("module has no cached artifact"),
            CacheMiss::Unreadable(kind) => write!(f, "cached artifact unreadable ({kind})"),
            CacheMiss::TruncatedHeader => f.write_str("cached artifact header is truncated"),
            CacheMiss::MagicMismatch { found, expected } => write!(
                f,
                "magic number {} does not match runtime {}",
                hex(found),
                hex(expected)
            ),
        }
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

/// Read a cached artifact, accepting it only when its magic number equals
/// `expected`. `header_len` is the runtime's full header width; bytes past the
/// common [`HEADER_LEN`] words are skipped. A file that ends inside the header
/// is a miss. The body is read only after the magic matched.
pub fn read_cached(
    path: &Path,
    expected: &Magic,
    header_len: usize,
) -> Result<Artifact, CacheMiss> {
    let mut file = File::open(path).map_err(|err| CacheMiss::Unreadable(err.kind()))?;
    let mut raw = vec![0u8; header_len.max(HEADER_LEN)];
    file.read_exact(&mut raw).map_err(|err| match err.kind() {
        io::ErrorKind::UnexpectedEof => CacheMiss::TruncatedHeader,
        kind => CacheMiss::Unreadable(kind),
    })?;
    let mut fixed = [0u8; HEADER_LEN];
    fixed.copy_from_slice(&raw[..HEADER_LEN]);
    let header = ArtifactHeader::parse(&fixed);
    if header.magic != *expected {
        return Err(CacheMiss::MagicMismatch {
            found: header.magic,
            expected: *expected,
        });
    }
    let mut blob = Vec::new();
    file.read_to_end(&mut blob)
        .map_err(|err| CacheMiss::Unreadable(err.kind()))?;
    Ok(Artifact::Cached {
        path: path.to_path_buf(),
        header,
        blob,
    })
}

/// Read program source as UTF-8.
pub fn read_source(path: &Path) -> CensusResult<Artifact> {
    let text = std::fs::read_to_string(path).map_err(|source| CensusError::SourceRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Artifact::Source {
        path: path.to_path_buf(),
        text,
    })
}

/// The single decision point between the cached artifact and source text.
pub fn select_artifact<M: ModuleEntity + ?Sized>(
    module: &M,
    expected: &Magic,
    header_len: usize,
) -> CensusResult<Artifact> {
    let miss = match module.cached_artifact() {
        Some(path) => match read_cached(path, expected, header_len) {
            Ok(artifact) => return Ok(artifact),
            Err(miss) => miss,
        },
        None => CacheMiss::NoArtifact,
    };
    tracing::debug!(reason = %miss, "Falling back to source text");
    let source = module.origin().ok_or_else(|| {
        CensusError::Argument("target module has neither a usable cache nor a source file".into())
    })?;
    read_source(source)
}
