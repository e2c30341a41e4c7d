use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("pattern id {0:?} appears in more than one group")]
    DuplicatePattern(String),

    #[error("pattern {0:?} has both include_segments and exclude_segments")]
    ConflictingFilter(String),

    #[error("no rotation or manual pattern configured, nothing to render")]
    NoBasePattern,

    #[error("invalid led layout: {0}")]
    Layout(String),
}

impl ConfigError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io { path: path.to_owned(), source }
    }

    pub fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json { path: path.to_owned(), source }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("segment {uid} has {len} leds, at most 255 fit in one frame")]
    TooManyLeds { uid: u8, len: usize },

    #[error("frame truncated")]
    Truncated,

    #[error("malformed frame: {0}")]
    Malformed(&'static str),

    #[error("crc mismatch: expected {expected:#04x}, got {actual:#04x}")]
    BadCrc { expected: u16, actual: u16 },
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cache index {path} is corrupt: {source}")]
    Index {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cache index {0} records no steps")]
    Empty(PathBuf),

    #[error("snapshot {path} has {actual} bytes, expected {expected}")]
    SnapshotSize {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },
}

impl CacheError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io { path: path.to_owned(), source }
    }
}
