use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Couldn't reach {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} responded with {status}")]
    HttpStatus { url: String, status: StatusCode },

    #[error("Couldn't parse HTML: {0}")]
    Parse(String),

    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("No file name can be derived from {0}")]
    NoFileName(String),

    #[error("Tokio Join Error, couldn't await a task! {0}")]
    RuntimeJoin(#[from] tokio::task::JoinError),

    #[error("Couldn't set up logging: {0}")]
    Logging(String),
}

impl Error {
    pub(crate) fn transport(url: &str, source: reqwest::Error) -> Self {
        Error::Transport {
            url: url.into(),
            source,
        }
    }

    pub(crate) fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Short name of the error kind, used in log records.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Transport { .. } => "TransportError",
            Error::HttpStatus { .. } => "HTTPStatusError",
            Error::Parse(_) | Error::RuntimeJoin(_) => "ParseError",
            Error::Filesystem { .. } | Error::NoFileName(_) => "FilesystemError",
            Error::Logging(_) => "LoggingError",
        }
    }

    /// The remote resource the error is about, if any.
    pub fn url(&self) -> Option<&str> {
        match self {
            Error::Transport { url, .. }
            | Error::HttpStatus { url, .. }
            | Error::NoFileName(url) => Some(url),
            _ => None,
        }
    }
}
