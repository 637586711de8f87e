use std::io::{self, Write};

use tsframe_types::Frame;

use crate::codec;

/// Writes frames to a byte sink
pub struct FrameWriter<W> {
    inner: W,

    /// Reused encode buffer
    scratch: Vec<u8>,

    frames_written: u64,
    bytes_written: u64,
}

impl<W: Write> FrameWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            scratch: Vec::new(),
            frames_written: 0,
            bytes_written: 0,
        }
    }

    /// Encode and write one frame
    pub fn write_frame(&mut self, frame: &Frame) -> io::Result<()> {
        self.scratch.clear();
        codec::encode_into(frame, &mut self.scratch);
        self.inner.write_all(&self.scratch)?;
        self.frames_written += 1;
        self.bytes_written += self.scratch.len() as u64;
        Ok(())
    }

    /// Write the wire bytes of an already-encoded frame unchanged
    pub fn write_raw(&mut self, raw: &[u8]) -> io::Result<()> {
        self.inner.write_all(raw)?;
        self.frames_written += 1;
        self.bytes_written += raw.len() as u64;
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
