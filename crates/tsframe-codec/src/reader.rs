use std::io::{ErrorKind, Read};

use tracing::{debug, trace};

use tsframe_types::{Frame, WORD_LEN};

use crate::codec;
use crate::error::{FrameError, Result};

/// Default read-ahead buffer size (1 MiB)
pub const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

/// Default ceiling on the size of a single frame (1 GiB)
pub const DEFAULT_MAX_FRAME_LEN: usize = 1024 * 1024 * 1024;

/// A decoded frame together with the exact bytes it was decoded from
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawFrame {
    pub frame: Frame,

    /// Owned copy of the frame's wire bytes, valid across refills
    pub raw: Vec<u8>,
}

/// Slices a byte source into frames through a read-ahead buffer
///
/// A stream must end exactly on a frame boundary: a trailing partial frame is
/// reported as [`FrameError::Truncated`], never as end of stream.
pub struct FrameReader<R> {
    inner: R,

    /// Read-ahead storage; `buf[start..end]` holds unconsumed bytes
    buf: Vec<u8>,
    start: usize,
    end: usize,

    /// Source returned 0 bytes
    eof: bool,

    /// Set after an error so iteration stops
    failed: bool,

    max_frame_len: usize,
    frames_read: u64,
}

impl<R: Read> FrameReader<R> {
    /// Create a reader with the default buffer size
    pub fn new(inner: R) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE, inner)
    }

    /// Create a reader with the given read-ahead capacity
    ///
    /// The buffer grows past `capacity` when a single frame needs more room.
    pub fn with_capacity(capacity: usize, inner: R) -> Self {
        Self {
            inner,
            buf: vec![0; capacity.max(WORD_LEN)],
            start: 0,
            end: 0,
            eof: false,
            failed: false,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
            frames_read: 0,
        }
    }

    /// Refuse frames longer than `limit` bytes
    ///
    /// The limit never drops below one word, the size of the smallest frame.
    pub fn with_max_frame_len(mut self, limit: usize) -> Self {
        self.max_frame_len = limit.max(WORD_LEN);
        self
    }

    pub fn max_frame_len(&self) -> usize {
        self.max_frame_len
    }

    /// Number of frames returned so far
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Bytes read from the source but not yet returned as frames
    pub fn buffered(&self) -> usize {
        self.end - self.start
    }

    /// Read the next frame.
    ///
    /// Returns `Ok(None)` only when the source is exhausted with no leftover
    /// bytes. On error the buffered bytes are left in place.
    pub fn next_frame(&mut self) -> Result<Option<RawFrame>> {
        loop {
            let window = &self.buf[self.start..self.end];
            if window.is_empty() && self.eof {
                return Ok(None);
            }

            // The declared length is checked whether or not the frame is
            // already buffered.
            if let Ok(len) = codec::peek_len(window) {
                if len > self.max_frame_len as u64 {
                    return Err(FrameError::FrameTooLarge {
                        len,
                        limit: self.max_frame_len,
                    });
                }
            }

            let err = match codec::decode(window) {
                Ok((frame, rest)) => {
                    let used = window.len() - rest.len();
                    let raw = window[..used].to_vec();
                    self.start += used;
                    self.frames_read += 1;
                    return Ok(Some(RawFrame { frame, raw }));
                }
                Err(e) => e,
            };

            match err {
                FrameError::Truncated { needed, .. } if !self.eof => self.fill(needed)?,
                e => return Err(e),
            }
        }
    }

    /// Iterate over the remaining frames, stopping after the first error
    pub fn frames(&mut self) -> Frames<'_, R> {
        Frames { reader: self }
    }

    /// Compact the buffer, grow it to hold `needed` bytes, and read once
    fn fill(&mut self, needed: u64) -> Result<()> {
        if needed > self.max_frame_len as u64 {
            return Err(FrameError::FrameTooLarge {
                len: needed,
                limit: self.max_frame_len,
            });
        }
        let needed = needed as usize;

        if self.start > 0 {
            self.buf.copy_within(self.start..self.end, 0);
            self.end -= self.start;
            self.start = 0;
        }

        if self.buf.len() < needed {
            debug!(from = self.buf.len(), to = needed, "growing read-ahead buffer");
            self.buf.resize(needed, 0);
        }

        loop {
            match self.inner.read(&mut self.buf[self.end..]) {
                Ok(0) => {
                    self.eof = true;
                    break;
                }
                Ok(n) => {
                    self.end += n;
                    break;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        trace!(buffered = self.end, eof = self.eof, "refilled read-ahead buffer");
        Ok(())
    }
}

/// Iterator over a [`FrameReader`]
pub struct Frames<'a, R> {
    reader: &'a mut FrameReader<R>,
}

impl<R: Read> Iterator for Frames<'_, R> {
    type Item = Result<RawFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.reader.failed {
            return None;
        }
        let item = self.reader.next_frame().transpose();
        if matches!(item, Some(Err(_))) {
            self.reader.failed = true;
        }
        item
    }
}
