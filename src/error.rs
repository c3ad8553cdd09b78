use std::fmt;
use std::path::PathBuf;

/// Which fixed-capacity arena ran out of slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArenaKind {
    Walls,
    Sectors,
}

impl fmt::Display for ArenaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArenaKind::Walls => write!(f, "wall"),
            ArenaKind::Sectors => write!(f, "sector"),
        }
    }
}

/// Every failure the editor can absorb. None of them end the session.
#[derive(Debug)]
pub enum EditorError {
    FileOpen {
        path: PathBuf,
        source: std::io::Error,
    },
    Io(std::io::Error),
    Parse {
        line: usize,
        message: String,
    },
    InvalidLevel(String),
    WindingViolation,
    CapacityExceeded {
        kind: ArenaKind,
        capacity: usize,
    },
    NothingSelected,
    ConstructionInProgress,
}

impl From<std::io::Error> for EditorError {
    fn from(e: std::io::Error) -> Self {
        EditorError::Io(e)
    }
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorError::FileOpen { path, source } => {
                write!(f, "error opening file {}: {}", path.display(), source)
            }
            EditorError::Io(e) => write!(f, "IO error: {}", e),
            EditorError::Parse { line, message } => {
                write!(f, "parse error on line {}: {}", line, message)
            }
            EditorError::InvalidLevel(e) => write!(f, "invalid level: {}", e),
            EditorError::WindingViolation => write!(f, "walls must be counter clockwise"),
            EditorError::CapacityExceeded { kind, capacity } => {
                write!(f, "{} capacity of {} exceeded", kind, capacity)
            }
            EditorError::NothingSelected => write!(f, "no sector selected"),
            EditorError::ConstructionInProgress => {
                write!(f, "a sector is still being placed")
            }
        }
    }
}

impl std::error::Error for EditorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EditorError::FileOpen { source, .. } => Some(source),
            EditorError::Io(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, EditorError>;
