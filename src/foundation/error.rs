use std::path::PathBuf;

/// Result alias used throughout the crate.
pub type SlideResult<T> = Result<T, SlideError>;

/// Error taxonomy for a slideshow run.
///
/// Only [`SlideError::MediaDecode`] is recoverable: the assembler substitutes a placeholder
/// frame and keeps going. Every other variant terminates the run.
#[derive(thiserror::Error, Debug)]
pub enum SlideError {
    /// No image or video files were found under the media directory.
    #[error("no supported media files found in '{}'", dir.display())]
    EmptyCatalog {
        /// Directory that was scanned.
        dir: PathBuf,
    },

    /// The run configuration was rejected before any frame work started.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// A single media item could not be decoded.
    #[error("decode error for '{}': {message}", path.display())]
    MediaDecode {
        /// File that failed to decode.
        path: PathBuf,
        /// Underlying decoder message.
        message: String,
    },

    /// Encoding, muxing or writing the output file failed.
    #[error("render error: {0}")]
    Render(String),

    /// The run was cancelled between items.
    #[error("render cancelled")]
    Cancelled,

    /// Anything else, with its source chain preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SlideError {
    /// Build a [`SlideError::InvalidSettings`] value.
    pub fn invalid_settings(msg: impl Into<String>) -> Self {
        Self::InvalidSettings(msg.into())
    }

    /// Build a [`SlideError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`SlideError::MediaDecode`] value.
    pub fn decode(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::MediaDecode {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Return `true` for errors that end the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::MediaDecode { .. })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
