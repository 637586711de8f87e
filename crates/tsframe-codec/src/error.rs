use thiserror::Error;

use tsframe_types::InvalidFrame;

/// Errors produced while decoding or reading frames
#[derive(Debug, Error)]
pub enum FrameError {
    /// Fewer bytes are available than the declared variant requires
    #[error("truncated frame: need {needed} bytes, have {available}")]
    Truncated { needed: u64, available: usize },

    /// The primary word carries the reserved kind code
    #[error("unknown frame variant code {0}")]
    UnknownVariant(u8),

    /// Decoded fields cannot form a frame
    #[error(transparent)]
    Invalid(#[from] InvalidFrame),

    /// The reader refuses to buffer a frame this large
    #[error("frame of {len} bytes exceeds the {limit} byte limit")]
    FrameTooLarge { len: u64, limit: usize },

    /// The byte source failed
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, FrameError>;
