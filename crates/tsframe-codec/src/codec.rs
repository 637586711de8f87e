use byteorder::{ByteOrder, LittleEndian};

use tsframe_types::{
    Frame, FrameKind, KIND_MASK, PAYLOAD_LEN_BITS, PAYLOAD_LEN_MASK, TypeTag, WORD_LEN,
};

use crate::error::{FrameError, Result};

/// Encode a frame into its wire format.
///
/// Layout (all words little-endian):
///
/// ```text
/// [ primary word (8) ]           timestamp | kind
/// [ v0 (8) ]                     OneFloat, TwoFloat
/// [ v1 (8) ]                     TwoFloat
/// [ extension word (8) ]         Extended: Q-bit | tag (21) | length (43)
/// [ payload (length) ]           Extended
/// ```
pub fn encode(frame: &Frame) -> Vec<u8> {
    let mut out = Vec::with_capacity(frame.encoded_len());
    encode_into(frame, &mut out);
    out
}

/// Append the wire format of `frame` to `out`
pub fn encode_into(frame: &Frame, out: &mut Vec<u8>) {
    put_word(out, frame.primary_word() as u64);

    match frame.kind() {
        FrameKind::OneFloat => put_word(out, frame.v0().to_bits()),
        FrameKind::TwoFloat => {
            put_word(out, frame.v0().to_bits());
            put_word(out, frame.v1().to_bits());
        }
        FrameKind::Extended => {
            put_word(out, frame.extension_word() as u64);
            out.extend_from_slice(frame.payload());
        }
        FrameKind::Zero | FrameKind::TimeOnly | FrameKind::Null | FrameKind::NotAvailable => {}
    }
}

/// Total length of the frame starting at `bytes`.
///
/// Only the fixed header must be present; the payload may still be missing.
pub fn peek_len(bytes: &[u8]) -> Result<u64> {
    parse_header(bytes).map(|header| header.total_len)
}

/// Decode one frame from the front of `bytes`.
///
/// Returns the frame and the bytes following it. On error nothing is
/// consumed; the caller still owns the whole input.
pub fn decode(bytes: &[u8]) -> Result<(Frame, &[u8])> {
    let header = parse_header(bytes)?;
    if (bytes.len() as u64) < header.total_len {
        return Err(FrameError::Truncated {
            needed: header.total_len,
            available: bytes.len(),
        });
    }
    // Fits: bounded by bytes.len() above.
    let total = header.total_len as usize;
    let timestamp = header.primary & !KIND_MASK;

    let frame = match header.kind {
        FrameKind::Zero => Frame::zero(timestamp),
        FrameKind::OneFloat => Frame::one_float(timestamp, read_f64(bytes, 1)),
        FrameKind::TwoFloat => {
            Frame::two_float(timestamp, read_f64(bytes, 1), read_f64(bytes, 2))
        }
        FrameKind::TimeOnly => Frame::time_only(timestamp),
        FrameKind::Extended => {
            let ext = LittleEndian::read_u64(&bytes[WORD_LEN..2 * WORD_LEN]);
            let tag = TypeTag::from_field(ext >> PAYLOAD_LEN_BITS);
            Frame::extended(timestamp, tag, &bytes[2 * WORD_LEN..total])?
        }
        FrameKind::Null => Frame::null(timestamp),
        FrameKind::NotAvailable => Frame::not_available(timestamp),
    };

    Ok((frame, &bytes[total..]))
}

struct Header {
    primary: i64,
    kind: FrameKind,
    total_len: u64,
}

fn parse_header(bytes: &[u8]) -> Result<Header> {
    if bytes.len() < WORD_LEN {
        return Err(FrameError::Truncated {
            needed: WORD_LEN as u64,
            available: bytes.len(),
        });
    }

    let primary = LittleEndian::read_i64(&bytes[..WORD_LEN]);
    let code = (primary & KIND_MASK) as u8;
    let kind = FrameKind::from_code(code).ok_or(FrameError::UnknownVariant(code))?;

    let header_len = kind.header_len();
    if bytes.len() < header_len {
        return Err(FrameError::Truncated {
            needed: header_len as u64,
            available: bytes.len(),
        });
    }

    let payload_len = if kind == FrameKind::Extended {
        LittleEndian::read_u64(&bytes[WORD_LEN..2 * WORD_LEN]) & PAYLOAD_LEN_MASK
    } else {
        0
    };

    Ok(Header {
        primary,
        kind,
        total_len: header_len as u64 + payload_len,
    })
}

fn read_f64(bytes: &[u8], word: usize) -> f64 {
    let at = word * WORD_LEN;
    f64::from_bits(LittleEndian::read_u64(&bytes[at..at + WORD_LEN]))
}

fn put_word(out: &mut Vec<u8>, value: u64) {
    let mut word = [0u8; WORD_LEN];
    LittleEndian::write_u64(&mut word, value);
    out.extend_from_slice(&word);
}
