use std::{io, path::PathBuf};

/// Errors produced while splitting a corpus or extracting a trainer log.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading or writing a file failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading or writing an unnamed stream (stdin, stdout, an in-memory buffer) failed.
    #[error(transparent)]
    Stream(#[from] io::Error),

    /// Test ratio is NaN or outside `[0, 1]`.
    #[error("test ratio must be within [0, 1], got {0}")]
    InvalidRatio(f64),

    /// A line carries a marker but not the numeric token the marker promises.
    #[error("line {line_no}: `{marker}` line has {reason}: {line:?}")]
    MalformedLine {
        line_no: usize,
        marker: &'static str,
        line: String,
        reason: String,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
