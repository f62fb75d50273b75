use std::{fmt, path::PathBuf};

use thiserror::Error;

/// Which of the two pending uploads was not chosen at submit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingFile {
    Video,
    Schema,
    Both,
}

impl fmt::Display for MissingFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingFile::Video => write!(f, "video file"),
            MissingFile::Schema => write!(f, "schema file"),
            MissingFile::Both => write!(f, "video and schema files"),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Please upload both video and schema files (missing {missing})")]
    MissingInput { missing: MissingFile },

    #[error("An analysis is already in progress")]
    SubmissionInFlight,

    #[error("Analysis service returned {status}: {message}")]
    Service { status: u16, message: String },

    #[error("Analysis request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed analysis result: {reason}")]
    MalformedResult { reason: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Content block {index} is out of range (result has {len} blocks)")]
    SelectionOutOfRange { index: usize, len: usize },

    #[error("No analysis result is available yet")]
    NoResult,

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl Error {
    /// True for the failures that come back from (or on the way to) the
    /// analysis service, as opposed to local precondition errors.
    pub fn is_service_failure(&self) -> bool {
        matches!(
            self,
            Error::Service { .. }
                | Error::Http(_)
                | Error::MalformedResult { .. }
                | Error::Io { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
