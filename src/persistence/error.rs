use core::fmt;
use std::io;

/// Failure reading or writing a save file
#[derive(Debug)]
pub enum SaveError {
    Io(io::Error),
    Parse(serde_json::Error),
}

impl SaveError {
    /// Missing file, as opposed to a damaged one
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io(err) if err.kind() == io::ErrorKind::NotFound)
    }
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "save file I/O failed: {err}"),
            Self::Parse(err) => write!(f, "save file is corrupt: {err}"),
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<io::Error> for SaveError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for SaveError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}
