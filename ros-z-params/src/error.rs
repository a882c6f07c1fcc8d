use std::collections::TryReserveError;

/// Coarse classification of a [`ParamError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum ErrorKind {
    #[strum(serialize = "invalid argument")]
    InvalidArgument,
    #[strum(serialize = "bad alloc")]
    BadAlloc,
    #[strum(serialize = "error")]
    Parse,
}

/// Errors produced while building or querying a parameter table.
///
/// Every variant carries a human-readable diagnostic. Diagnostics about YAML
/// content include the 1-based source line when it is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    /// An argument violated the caller contract (empty name, zero capacity...)
    InvalidArgument(String),
    /// Storage for the table could not be reserved
    BadAlloc(String),
    /// Malformed YAML content, or input that could not be read
    Parse(String),
}

impl ParamError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::BadAlloc(_) => ErrorKind::BadAlloc,
            Self::Parse(_) => ErrorKind::Parse,
        }
    }

    /// The diagnostic message without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidArgument(msg) | Self::BadAlloc(msg) | Self::Parse(msg) => msg,
        }
    }

    pub(crate) fn parse_at(line: usize, msg: impl std::fmt::Display) -> Self {
        Self::Parse(format!("{} at line {}", msg, line))
    }

    pub(crate) fn alloc(what: &str, err: TryReserveError) -> Self {
        Self::BadAlloc(format!("Error allocating mem for {}: {}", what, err))
    }
}

impl std::fmt::Display for ParamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind(), self.message())
    }
}

impl std::error::Error for ParamError {}

pub type Result<T> = std::result::Result<T, ParamError>;
