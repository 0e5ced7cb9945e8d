use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayerError {
    #[error("failed to load track {index}: {detail}")]
    MediaLoad { index: usize, detail: String },

    #[error("track duration is not known yet")]
    MetadataUnavailable,

    #[error("track index {index} is out of range for a catalog of {len}")]
    InvalidIndex { index: usize, len: usize },

    #[error("catalog has no tracks")]
    EmptyCatalog,

    #[error("seek failed: {0}")]
    Seek(String),
}
