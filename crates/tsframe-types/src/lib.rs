//! Shared types for tsframe
//!
//! This crate contains the in-memory frame model used by the codec and the
//! filter: the frame itself, its variant kind, and the type tag carried by
//! extended frames.

use chrono::{DateTime, TimeZone, Utc};
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

// ============================================================================
// Bit Layout
// ============================================================================

/// Size of one wire word in bytes
pub const WORD_LEN: usize = 8;

/// Low bits of the primary word holding the frame kind
pub const KIND_MASK: i64 = 0b111;

/// Number of low bits in the extension word holding the payload length
pub const PAYLOAD_LEN_BITS: u32 = 43;

/// Mask selecting the payload length from the extension word
pub const PAYLOAD_LEN_MASK: u64 = (1 << PAYLOAD_LEN_BITS) - 1;

/// Width of the type tag field (the top bit doubles as the Q-bit)
pub const TYPE_TAG_BITS: u32 = 21;

/// Smallest encodable type tag
pub const TYPE_TAG_MIN: i32 = -(1 << (TYPE_TAG_BITS - 1));

/// Largest encodable type tag
pub const TYPE_TAG_MAX: i32 = (1 << (TYPE_TAG_BITS - 1)) - 1;

const TYPE_TAG_FIELD_MASK: u64 = (1 << TYPE_TAG_BITS) - 1;
const Q_BIT: u64 = 1 << (TYPE_TAG_BITS - 1);

// ============================================================================
// Errors
// ============================================================================

/// Reasons a frame cannot be constructed
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidFrame {
    /// The type tag does not fit the 21-bit field
    #[error("type tag {0} does not fit the 21-bit tag field")]
    TypeTagOutOfRange(i32),

    /// The payload length does not fit the 43-bit field
    #[error("payload of {0} bytes exceeds the 43-bit length field")]
    PayloadTooLong(usize),
}

// ============================================================================
// Frame Kind
// ============================================================================

/// The 3-bit variant tag selecting a frame's physical layout
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FrameKind {
    Zero = 0,
    OneFloat = 1,
    TwoFloat = 2,
    TimeOnly = 3,
    Extended = 4,
    Null = 5,
    NotAvailable = 6,
}

impl FrameKind {
    /// The kind code no variant is assigned to
    pub const RESERVED_CODE: u8 = 7;

    /// Every constructible kind, in code order
    pub const ALL: [FrameKind; 7] = [
        Self::Zero,
        Self::OneFloat,
        Self::TwoFloat,
        Self::TimeOnly,
        Self::Extended,
        Self::Null,
        Self::NotAvailable,
    ];

    /// Look up a kind by its wire code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Zero),
            1 => Some(Self::OneFloat),
            2 => Some(Self::TwoFloat),
            3 => Some(Self::TimeOnly),
            4 => Some(Self::Extended),
            5 => Some(Self::Null),
            6 => Some(Self::NotAvailable),
            _ => None,
        }
    }

    /// Wire code of this kind
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Fixed part of the encoding: every byte before the payload
    pub fn header_len(self) -> usize {
        match self {
            Self::OneFloat | Self::Extended => 2 * WORD_LEN,
            Self::TwoFloat => 3 * WORD_LEN,
            Self::Zero | Self::TimeOnly | Self::Null | Self::NotAvailable => WORD_LEN,
        }
    }

    /// Short display label
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Zero => "ZERO",
            Self::OneFloat => "ONE",
            Self::TwoFloat => "TWO",
            Self::TimeOnly => "TM",
            Self::Extended => "EXT",
            Self::Null => "NULL",
            Self::NotAvailable => "NA",
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Type Tag
// ============================================================================

/// Encoding of an extended frame's payload
///
/// Non-negative tags are built-in; negative tags are user-defined and set the
/// Q-bit on the wire. Equality and hashing follow the wire value, so
/// `Custom(3) == MsgPack`.
#[derive(Clone, Copy, Debug, Default)]
pub enum TypeTag {
    #[default]
    Zero,
    Error,
    Header,
    MsgPack,
    Binc,
    CapnProto,
    Zygo,
    Utf8,
    /// Any other tag, built-in range or user-defined
    ///
    /// [`TypeTag::from_i32`] never produces this for a built-in value.
    Custom(i32),
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.as_i32() == other.as_i32()
    }
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_i32().hash(state);
    }
}

impl TypeTag {
    /// Canonical tag for a raw value; built-in values never become `Custom`
    pub fn from_i32(value: i32) -> Self {
        match value {
            0 => Self::Zero,
            1 => Self::Error,
            2 => Self::Header,
            3 => Self::MsgPack,
            4 => Self::Binc,
            5 => Self::CapnProto,
            6 => Self::Zygo,
            7 => Self::Utf8,
            other => Self::Custom(other),
        }
    }

    pub fn as_i32(self) -> i32 {
        match self {
            Self::Zero => 0,
            Self::Error => 1,
            Self::Header => 2,
            Self::MsgPack => 3,
            Self::Binc => 4,
            Self::CapnProto => 5,
            Self::Zygo => 6,
            Self::Utf8 => 7,
            Self::Custom(v) => v,
        }
    }

    /// Whether the tag lies in the user-extensible (negative) range
    pub fn is_user_defined(self) -> bool {
        self.as_i32() < 0
    }

    /// Bias the tag into its unsigned 21-bit field
    ///
    /// Negative tags map to `tag + 2^21`, so the field's top bit is the Q-bit.
    pub fn to_field(self) -> Result<u64, InvalidFrame> {
        let value = self.as_i32();
        if !(TYPE_TAG_MIN..=TYPE_TAG_MAX).contains(&value) {
            return Err(InvalidFrame::TypeTagOutOfRange(value));
        }
        Ok(self.field_bits())
    }

    /// Low 21 bits of the two's complement value, without a range check
    fn field_bits(self) -> u64 {
        (i64::from(self.as_i32()) as u64) & TYPE_TAG_FIELD_MASK
    }

    /// Recover a tag from its 21-bit field; bits above the field are ignored
    pub fn from_field(field: u64) -> Self {
        let field = field & TYPE_TAG_FIELD_MASK;
        let value = if field & Q_BIT != 0 {
            field as i64 - (1 << TYPE_TAG_BITS)
        } else {
            field as i64
        };
        Self::from_i32(value as i32)
    }

    /// Short display label for built-ins
    pub fn label(self) -> Option<&'static str> {
        match self {
            Self::Zero => Some("ZERO"),
            Self::Error => Some("ERROR"),
            Self::Header => Some("HEADER"),
            Self::MsgPack => Some("MSGPACK"),
            Self::Binc => Some("BINC"),
            Self::CapnProto => Some("CAPNP"),
            Self::Zygo => Some("ZYGO"),
            Self::Utf8 => Some("UTF8"),
            Self::Custom(_) => None,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label() {
            Some(label) => f.write_str(label),
            None => write!(f, "{}", self.as_i32()),
        }
    }
}

// ============================================================================
// Frame
// ============================================================================

/// One self-delimiting record: timestamp, variant, and variant data
///
/// Fields that the kind does not carry are always zero or empty, so two
/// frames that encode identically compare equal. Floats compare bit-for-bit.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Nanoseconds since the Unix epoch, low 3 bits clear
    timestamp: i64,

    kind: FrameKind,

    v0: f64,
    v1: f64,

    /// Meaningful for `Extended` only
    type_tag: TypeTag,

    /// Meaningful for `Extended` only
    payload: Vec<u8>,
}

impl Frame {
    /// Build a frame from all of its parts
    ///
    /// The timestamp's low 3 bits are dropped. Values the kind does not
    /// carry are discarded.
    pub fn new(
        timestamp: i64,
        kind: FrameKind,
        type_tag: TypeTag,
        v0: f64,
        v1: f64,
        payload: Vec<u8>,
    ) -> Result<Self, InvalidFrame> {
        let (v0, v1) = match kind {
            FrameKind::OneFloat => (v0, 0.0),
            FrameKind::TwoFloat => (v0, v1),
            _ => (0.0, 0.0),
        };

        let (type_tag, payload) = if kind == FrameKind::Extended {
            type_tag.to_field()?;
            if payload.len() as u64 > PAYLOAD_LEN_MASK {
                return Err(InvalidFrame::PayloadTooLong(payload.len()));
            }
            (TypeTag::from_i32(type_tag.as_i32()), payload)
        } else {
            (TypeTag::Zero, Vec::new())
        };

        Ok(Self {
            timestamp: quantize(timestamp),
            kind,
            v0,
            v1,
            type_tag,
            payload,
        })
    }

    fn bare(timestamp: i64, kind: FrameKind, v0: f64, v1: f64) -> Self {
        Self {
            timestamp: quantize(timestamp),
            kind,
            v0,
            v1,
            type_tag: TypeTag::Zero,
            payload: Vec::new(),
        }
    }

    pub fn zero(timestamp: i64) -> Self {
        Self::bare(timestamp, FrameKind::Zero, 0.0, 0.0)
    }

    pub fn one_float(timestamp: i64, v0: f64) -> Self {
        Self::bare(timestamp, FrameKind::OneFloat, v0, 0.0)
    }

    pub fn two_float(timestamp: i64, v0: f64, v1: f64) -> Self {
        Self::bare(timestamp, FrameKind::TwoFloat, v0, v1)
    }

    pub fn time_only(timestamp: i64) -> Self {
        Self::bare(timestamp, FrameKind::TimeOnly, 0.0, 0.0)
    }

    pub fn null(timestamp: i64) -> Self {
        Self::bare(timestamp, FrameKind::Null, 0.0, 0.0)
    }

    pub fn not_available(timestamp: i64) -> Self {
        Self::bare(timestamp, FrameKind::NotAvailable, 0.0, 0.0)
    }

    /// Extended frame carrying a tagged payload
    pub fn extended(
        timestamp: i64,
        type_tag: TypeTag,
        payload: impl Into<Vec<u8>>,
    ) -> Result<Self, InvalidFrame> {
        Self::new(
            timestamp,
            FrameKind::Extended,
            type_tag,
            0.0,
            0.0,
            payload.into(),
        )
    }

    /// Nanoseconds since the Unix epoch (always a multiple of 8)
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Timestamp as a UTC date-time
    pub fn datetime(&self) -> DateTime<Utc> {
        Utc.timestamp_nanos(self.timestamp)
    }

    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    pub fn v0(&self) -> f64 {
        self.v0
    }

    pub fn v1(&self) -> f64 {
        self.v1
    }

    /// Payload encoding, present for extended frames only
    pub fn type_tag(&self) -> Option<TypeTag> {
        (self.kind == FrameKind::Extended).then_some(self.type_tag)
    }

    /// Q-bit of the extension word
    pub fn is_user_defined(&self) -> bool {
        self.kind == FrameKind::Extended && self.type_tag.is_user_defined()
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn payload_len(&self) -> u64 {
        self.payload.len() as u64
    }

    /// First wire word: timestamp with the kind code in its low 3 bits
    pub fn primary_word(&self) -> i64 {
        self.timestamp | i64::from(self.kind.code())
    }

    /// Second wire word of an extended frame: Q-bit, type tag, payload length
    pub fn ext_word(&self) -> Option<i64> {
        (self.kind == FrameKind::Extended).then(|| self.extension_word())
    }

    /// Extension word built from the stored tag and payload length
    ///
    /// Zero for every kind other than `Extended`, whose tag and payload are
    /// normalized away. The tag range was checked at construction.
    pub fn extension_word(&self) -> i64 {
        ((self.type_tag.field_bits() << PAYLOAD_LEN_BITS) | self.payload_len()) as i64
    }

    /// Total encoded size in bytes
    pub fn encoded_len(&self) -> usize {
        self.kind.header_len() + self.payload.len()
    }
}

impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp == other.timestamp
            && self.kind == other.kind
            && self.v0.to_bits() == other.v0.to_bits()
            && self.v1.to_bits() == other.v1.to_bits()
            && self.type_tag == other.type_tag
            && self.payload == other.payload
    }
}

impl Eq for Frame {}

/// Clear the low 3 bits so the kind code can share the word
fn quantize(timestamp: i64) -> i64 {
    timestamp & !KIND_MASK
}
