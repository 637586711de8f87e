use std::io::{Read, Write};

use tracing::{debug, trace, warn};

use tsframe_codec::{FrameReader, RenderOptions, render};

use crate::engine::{MatchEngine, Verdict};
use crate::error::{FilterError, Result};

/// Counters for one filter run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub frames_read: u64,
    pub frames_selected: u64,

    /// Frame bytes passed through unchanged
    pub bytes_written: u64,

    /// Capture lines written in sub-mode
    pub lines_written: u64,
}

/// Pulls frames from a reader, evaluates them, and writes the selected ones
pub struct FilterDriver<'a> {
    engine: &'a MatchEngine,
    render: RenderOptions,
}

impl<'a> FilterDriver<'a> {
    pub fn new(engine: &'a MatchEngine) -> Self {
        Self {
            engine,
            render: RenderOptions::default(),
        }
    }

    /// Options for the text each frame is matched against
    pub fn with_render_options(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }

    /// Filter every frame from `reader` into `out`.
    ///
    /// Runs until clean end of stream or the first decode or write error. A
    /// frame that fails contributes nothing to the output.
    pub fn run<R: Read, W: Write>(
        &self,
        reader: &mut FrameReader<R>,
        out: &mut W,
    ) -> Result<FilterStats> {
        let mut stats = FilterStats::default();

        loop {
            let index = stats.frames_read + 1;
            let raw = match reader.next_frame() {
                Ok(Some(raw)) => raw,
                Ok(None) => break,
                Err(source) => {
                    warn!(index, error = %source, "stopping at undecodable frame");
                    return Err(FilterError::Decode { index, source });
                }
            };
            stats.frames_read = index;

            let text = render(&raw.frame, &self.render);
            let verdict = self.engine.evaluate(&text);
            trace!(index, selected = verdict.is_selected(), text = %text, "evaluated frame");

            match verdict {
                Verdict::Reject => continue,
                Verdict::Keep => {
                    out.write_all(&raw.raw)
                        .map_err(|source| FilterError::Write { index, source })?;
                    stats.bytes_written += raw.raw.len() as u64;
                }
                Verdict::Captures(groups) => {
                    if !groups.is_empty() {
                        let mut line = groups.join(" ");
                        line.push('\n');
                        out.write_all(line.as_bytes())
                            .map_err(|source| FilterError::Write { index, source })?;
                        stats.lines_written += 1;
                    }
                }
            }
            stats.frames_selected += 1;
        }

        out.flush().map_err(|source| FilterError::Write {
            index: stats.frames_read,
            source,
        })?;

        debug!(
            frames_read = stats.frames_read,
            frames_selected = stats.frames_selected,
            bytes_written = stats.bytes_written,
            lines_written = stats.lines_written,
            "filter finished"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FilterOptions;
    use std::io::{self, Cursor};
    use tsframe_codec::{Frame, FrameError, FrameWriter, TypeTag, encode};

    fn stream(frames: &[Frame]) -> Vec<u8> {
        let mut writer = FrameWriter::new(Vec::new());
        for frame in frames {
            writer.write_frame(frame).unwrap();
        }
        writer.into_inner()
    }

    fn run(
        patterns: &[&str],
        options: FilterOptions,
        input: Vec<u8>,
    ) -> (Result<FilterStats>, Vec<u8>) {
        let engine = MatchEngine::new(patterns, options).unwrap();
        let mut reader = FrameReader::with_capacity(16, Cursor::new(input));
        let mut out = Vec::new();
        let result = FilterDriver::new(&engine).run(&mut reader, &mut out);
        (result, out)
    }

    fn utf8(ts: i64, text: &str) -> Frame {
        Frame::extended(ts, TypeTag::Utf8, text.as_bytes()).unwrap()
    }

    #[test]
    fn test_pass_through_is_byte_identical() {
        let frames = [
            Frame::one_float(8, 1.5),
            utf8(16, "keep me"),
            Frame::null(24),
            utf8(32, "keep me too"),
        ];
        let (result, out) = run(&["keep"], FilterOptions::default(), stream(&frames));

        let stats = result.unwrap();
        assert_eq!(stats.frames_read, 4);
        assert_eq!(stats.frames_selected, 2);
        assert_eq!(out, [encode(&frames[1]), encode(&frames[3])].concat());
        assert_eq!(stats.bytes_written, out.len() as u64);
    }

    #[test]
    fn test_sub_mode_writes_capture_lines() {
        let frames = [utf8(8, "12-34"), Frame::zero(16), utf8(24, "5-6")];
        let options = FilterOptions {
            sub: true,
            ..Default::default()
        };
        let (result, out) = run(&[r#"DATA:"(\d+)-(\d+)""#], options, stream(&frames));

        let stats = result.unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "12 34\n5 6\n");
        assert_eq!(stats.lines_written, 2);
    }

    #[test]
    fn test_sub_mode_without_groups_writes_nothing() {
        let options = FilterOptions {
            sub: true,
            ..Default::default()
        };
        let (result, out) = run(&["NULL"], options, stream(&[Frame::null(8)]));
        assert_eq!(result.unwrap().frames_selected, 1);
        assert!(out.is_empty());
    }

    #[test]
    fn test_exclude_any() {
        let frames = [Frame::null(8), Frame::one_float(16, 2.0), Frame::not_available(24)];
        let options = FilterOptions {
            any: true,
            exclude: true,
            ..Default::default()
        };
        let (result, out) = run(&[" NULL", " NA$"], options, stream(&frames));
        assert_eq!(result.unwrap().frames_selected, 1);
        assert_eq!(out, encode(&frames[1]));
    }

    #[test]
    fn test_empty_input() {
        let (result, out) = run(&["x"], FilterOptions::default(), Vec::new());
        assert_eq!(result.unwrap(), FilterStats::default());
        assert!(out.is_empty());
    }

    #[test]
    fn test_decode_error_reports_frame_index() {
        let mut input = stream(&[Frame::zero(8), Frame::zero(16)]);
        input.extend_from_slice(&(24_i64 | 7).to_le_bytes());
        input.extend_from_slice(&stream(&[Frame::zero(32)]));

        let (result, out) = run(&["ZERO"], FilterOptions::default(), input);
        match result {
            Err(FilterError::Decode { index, source }) => {
                assert_eq!(index, 3);
                assert!(matches!(source, FrameError::UnknownVariant(7)));
            }
            other => panic!("expected decode error, got {other:?}"),
        }
        // Frames before the failure were written; nothing after it.
        assert_eq!(out, stream(&[Frame::zero(8), Frame::zero(16)]));
    }

    #[test]
    fn test_trailing_fragment_is_fatal() {
        let mut input = stream(&[Frame::zero(8)]);
        input.extend_from_slice(&[1, 2, 3]);
        let (result, _) = run(&["ZERO"], FilterOptions::default(), input);
        assert!(matches!(
            result,
            Err(FilterError::Decode {
                index: 2,
                source: FrameError::Truncated { .. }
            })
        ));
    }

    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_is_fatal() {
        let engine = MatchEngine::new(&["ONE"], FilterOptions::default()).unwrap();
        let input = stream(&[Frame::zero(8), Frame::one_float(16, 1.0), Frame::one_float(24, 2.0)]);
        let mut reader = FrameReader::new(Cursor::new(input));

        let result = FilterDriver::new(&engine).run(&mut reader, &mut BrokenSink);
        assert!(matches!(result, Err(FilterError::Write { index: 2, .. })));
        assert_eq!(reader.frames_read(), 2);
    }
}
