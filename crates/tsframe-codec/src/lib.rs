//! Binary frame codec for tsframe
//!
//! This crate provides byte-exact encoding and decoding of frames, a buffered
//! stream reader that slices a byte source into frames, a frame writer, and
//! the canonical text rendering used for filtering.

mod codec;
mod error;
mod reader;
mod render;
mod writer;

pub use codec::{decode, encode, encode_into, peek_len};
pub use error::{FrameError, Result};
pub use reader::{DEFAULT_BUFFER_SIZE, DEFAULT_MAX_FRAME_LEN, FrameReader, RawFrame};
pub use render::{RenderOptions, render};
pub use writer::FrameWriter;

// Re-export types used in our public API
pub use tsframe_types::{Frame, FrameKind, InvalidFrame, TypeTag};
