use chrono::SecondsFormat;

use tsframe_types::{Frame, FrameKind, TypeTag};

/// Options for the text rendering of a frame
#[derive(Clone, Copy, Debug, Default)]
pub struct RenderOptions {
    /// Indent JSON carried in UTF-8 payloads across several lines
    pub pretty: bool,
}

impl RenderOptions {
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

/// Render a frame as one line of text for pattern matching.
///
/// Format: `<RFC 3339 UTC, nanoseconds> <KIND> [fields]`, for example
///
/// ```text
/// 2023-11-14T22:13:20.000000000Z TWO V0:1.5 V1:-2
/// 2023-11-14T22:13:20.000000000Z EXT TYPE:UTF8 USER:false LEN:5 DATA:"hello"
/// ```
pub fn render(frame: &Frame, options: &RenderOptions) -> String {
    let mut out = frame.datetime().to_rfc3339_opts(SecondsFormat::Nanos, true);
    out.push(' ');
    out.push_str(frame.kind().as_str());

    match frame.kind() {
        FrameKind::OneFloat => {
            out.push_str(&format!(" V0:{}", frame.v0()));
        }
        FrameKind::TwoFloat => {
            out.push_str(&format!(" V0:{} V1:{}", frame.v0(), frame.v1()));
        }
        FrameKind::Extended => {
            let tag = frame.type_tag().unwrap_or_default();
            out.push_str(&format!(
                " TYPE:{} USER:{} LEN:{} DATA:",
                tag,
                frame.is_user_defined(),
                frame.payload_len()
            ));
            out.push_str(&render_payload(tag, frame.payload(), options));
        }
        FrameKind::Zero | FrameKind::TimeOnly | FrameKind::Null | FrameKind::NotAvailable => {}
    }

    out
}

fn render_payload(tag: TypeTag, payload: &[u8], options: &RenderOptions) -> String {
    if tag == TypeTag::Utf8 {
        if let Ok(text) = std::str::from_utf8(payload) {
            if options.pretty {
                if let Some(pretty) = pretty_json(text) {
                    return pretty;
                }
            }
            return format!("{:?}", text);
        }
    }
    format!("0x{}", hex::encode(payload))
}

/// Pretty-print `text` if it holds a JSON object or array
fn pretty_json(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        return None;
    }
    let value: serde_json::Value = serde_json::from_str(trimmed).ok()?;
    serde_json::to_string_pretty(&value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2023-11-14T22:13:20Z
    const TS: i64 = 1_700_000_000_000_000_000;

    #[test]
    fn test_render_word_only_kinds() {
        let opts = RenderOptions::default();
        assert_eq!(render(&Frame::zero(TS), &opts), "2023-11-14T22:13:20.000000000Z ZERO");
        assert_eq!(render(&Frame::time_only(TS), &opts), "2023-11-14T22:13:20.000000000Z TM");
        assert_eq!(render(&Frame::null(TS), &opts), "2023-11-14T22:13:20.000000000Z NULL");
        assert_eq!(render(&Frame::not_available(TS), &opts), "2023-11-14T22:13:20.000000000Z NA");
    }

    #[test]
    fn test_render_floats() {
        let opts = RenderOptions::default();
        assert_eq!(
            render(&Frame::one_float(TS + 8, 1.5), &opts),
            "2023-11-14T22:13:20.000000008Z ONE V0:1.5"
        );
        assert_eq!(
            render(&Frame::two_float(TS, 12.0, -34.25), &opts),
            "2023-11-14T22:13:20.000000000Z TWO V0:12 V1:-34.25"
        );
        assert!(render(&Frame::one_float(TS, f64::NAN), &opts).ends_with("V0:NaN"));
    }

    #[test]
    fn test_render_utf8_payload() {
        let frame = Frame::extended(TS, TypeTag::Utf8, "hello \"x\"".as_bytes()).unwrap();
        assert_eq!(
            render(&frame, &RenderOptions::default()),
            r#"2023-11-14T22:13:20.000000000Z EXT TYPE:UTF8 USER:false LEN:9 DATA:"hello \"x\"""#
        );
    }

    #[test]
    fn test_render_binary_payload_as_hex() {
        let frame = Frame::extended(TS, TypeTag::Custom(-2), vec![0xde, 0xad]).unwrap();
        let text = render(&frame, &RenderOptions::default());
        assert!(text.ends_with("TYPE:-2 USER:true LEN:2 DATA:0xdead"));

        let frame = Frame::extended(TS, TypeTag::Utf8, vec![0xff, 0xfe]).unwrap();
        assert!(render(&frame, &RenderOptions::default()).ends_with("DATA:0xfffe"));
    }

    #[test]
    fn test_pretty_json_payload() {
        let frame = Frame::extended(TS, TypeTag::Utf8, r#"{"a":1}"#.as_bytes()).unwrap();

        let plain = render(&frame, &RenderOptions::default());
        assert!(plain.ends_with(r#"DATA:"{\"a\":1}""#));

        let pretty = render(&frame, &RenderOptions::pretty());
        assert!(pretty.ends_with("DATA:{\n  \"a\": 1\n}"));
    }
}
