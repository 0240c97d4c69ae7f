use std::path::PathBuf;

use thiserror::Error;

/// Boxed error coming from a collaborator (decoder, window system) the library
/// does not know the concrete type of.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum ShapeVisionError {
    /// The named image or video could not be opened. Callers treat this as an
    /// early, non-fatal abort of the invocation.
    #[error("unable to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: BoxedError,
    },

    #[error("failed to read frame: {0}")]
    Frame(#[source] BoxedError),

    #[error("display error: {0}")]
    Display(#[source] BoxedError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ShapeVisionError {
    pub fn open(path: impl Into<PathBuf>, source: impl Into<BoxedError>) -> Self {
        ShapeVisionError::Open {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn is_open_failure(&self) -> bool {
        matches!(self, ShapeVisionError::Open { .. })
    }
}

pub type Result<T> = std::result::Result<T, ShapeVisionError>;
