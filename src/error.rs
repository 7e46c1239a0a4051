use std::path::PathBuf;

use thiserror::Error;

/// Precondition violations when starting a session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session duration must be greater than zero")]
    InvalidDuration,

    #[error("word list must not be empty")]
    EmptyWordList,

    #[error("a session is already running")]
    AlreadyRunning,
}

/// Ambient audio failures. None of these stop the timer.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio track not found: {0}")]
    MissingResource(PathBuf),

    #[error("no audio output available: {0}")]
    Init(String),

    #[error("could not open audio track {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not decode audio track: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum WordListError {
    #[error("bundled word list not found: {0}")]
    Missing(String),

    #[error("could not read word list: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse word list: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("word list '{0}' has no words")]
    Empty(String),
}
