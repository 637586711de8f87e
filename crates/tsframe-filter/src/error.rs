//! Filter-specific error types.

use thiserror::Error;

use tsframe_codec::FrameError;

/// Errors that can occur while building the engine or filtering a stream.
#[derive(Debug, Error)]
pub enum FilterError {
    /// The engine was built with an empty pattern list.
    #[error("no patterns given: specify at least one pattern to filter with")]
    NoPatterns,

    /// A pattern failed to compile.
    #[error("invalid pattern #{index} `{pattern}`")]
    Pattern {
        index: usize,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A frame could not be decoded. `index` is 1-based.
    #[error("frame {index}: decode failed")]
    Decode {
        index: u64,
        #[source]
        source: FrameError,
    },

    /// Output for a frame could not be written. `index` is 1-based.
    #[error("frame {index}: write failed")]
    Write {
        index: u64,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, FilterError>;
