use std::error::Error;
use std::fmt;
use std::path::PathBuf;

/// Failure reported by the host runtime (an exception, a loader error).
///
/// `traceback` holds the host's own rendering of the failing frames when it
/// can produce one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostFailure {
    pub message: String,
    pub traceback: Option<String>,
}

impl HostFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            traceback: None,
        }
    }

    pub fn with_traceback(mut self, traceback: Option<String>) -> Self {
        self.traceback = traceback;
        self
    }
}

impl fmt::Display for HostFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug)]
pub enum CensusError {
    Argument(String),
    Registry(HostFailure),
    TargetLoad(HostFailure),
    SourceRead { path: PathBuf, source: std::io::Error },
    CacheLoad(HostFailure),
    Compile(HostFailure),
    Execution(HostFailure),
    Report(serde_json::Error),
}

impl CensusError {
    /// Name of the census phase that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            CensusError::Argument(_) => "argument",
            CensusError::Registry(_) => "registry",
            CensusError::TargetLoad(_) => "import",
            CensusError::SourceRead { .. } | CensusError::CacheLoad(_) | CensusError::Compile(_) => {
                "resolve"
            }
            CensusError::Execution(_) => "execute",
            CensusError::Report(_) => "report",
        }
    }

    pub fn traceback(&self) -> Option<&str> {
        match self {
            CensusError::Registry(failure)
            | CensusError::TargetLoad(failure)
            | CensusError::CacheLoad(failure)
            | CensusError::Compile(failure)
            | CensusError::Execution(failure) => failure.traceback.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for CensusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CensusError::Argument(message) => write!(f, "Invalid argument: {message}"),
            CensusError::Registry(failure) => write!(f, "Module registry error: {failure}"),
            CensusError::TargetLoad(failure) => write!(f, "Failed to import target: {failure}"),
            CensusError::SourceRead { path, source } => {
                write!(f, "Failed to read source {}: {source}", path.display())
            }
            CensusError::CacheLoad(failure) => {
                write!(f, "Failed to load cached code object: {failure}")
            }
            CensusError::Compile(failure) => write!(f, "Failed to compile target: {failure}"),
            CensusError::Execution(failure) => write!(f, "Target raised during execution: {failure}"),
            CensusError::Report(err) => write!(f, "Failed to render report: {err}"),
        }
    }
}

impl Error for CensusError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CensusError::SourceRead { source, .. } => Some(source),
            CensusError::Report(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CensusError {
    fn from(err: serde_json::Error) -> Self {
        CensusError::Report(err)
    }
}

pub type CensusResult<T> = std::result::Result<T, CensusError>;
