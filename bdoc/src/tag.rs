use core::fmt;

/// Element type byte written ahead of every key on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ElementTag {
    /// IEEE-754 binary64.
    Double = 0x01,
    /// Length-prefixed UTF-8 string.
    String = 0x02,
    /// Embedded document.
    Document = 0x03,
    /// Embedded document with decimal index keys.
    Array = 0x04,
    /// Subtyped opaque payload.
    Binary = 0x05,
    /// 12-byte identifier.
    ObjectId = 0x07,
    /// Single byte, zero or one.
    Boolean = 0x08,
    /// Milliseconds since the epoch, signed 64-bit.
    Datetime = 0x09,
    /// Empty payload.
    Null = 0x0a,
    /// Two consecutive C-strings: pattern and options.
    Regex = 0x0b,
    /// Source string paired with a scope document.
    CodeWithScope = 0x0f,
    /// Signed 32-bit integer.
    Int32 = 0x10,
    /// Opaque 64-bit pair.
    Timestamp = 0x11,
    /// Signed 64-bit integer.
    Int64 = 0x12,
}

impl ElementTag {
    /// All tags, in ascending wire order.
    pub const ALL: [ElementTag; 14] = [
        ElementTag::Double,
        ElementTag::String,
        ElementTag::Document,
        ElementTag::Array,
        ElementTag::Binary,
        ElementTag::ObjectId,
        ElementTag::Boolean,
        ElementTag::Datetime,
        ElementTag::Null,
        ElementTag::Regex,
        ElementTag::CodeWithScope,
        ElementTag::Int32,
        ElementTag::Timestamp,
        ElementTag::Int64,
    ];

    /// Maps a wire byte back to a tag.
    pub const fn from_u8(byte: u8) -> Option<Self> {
        use ElementTag::*;
        match byte {
            0x01 => Some(Double),
            0x02 => Some(String),
            0x03 => Some(Document),
            0x04 => Some(Array),
            0x05 => Some(Binary),
            0x07 => Some(ObjectId),
            0x08 => Some(Boolean),
            0x09 => Some(Datetime),
            0x0a => Some(Null),
            0x0b => Some(Regex),
            0x0f => Some(CodeWithScope),
            0x10 => Some(Int32),
            0x11 => Some(Timestamp),
            0x12 => Some(Int64),
            _ => None,
        }
    }
}

impl TryFrom<u8> for ElementTag {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, u8> {
        Self::from_u8(byte).ok_or(byte)
    }
}

impl From<ElementTag> for u8 {
    fn from(tag: ElementTag) -> u8 {
        tag as u8
    }
}

impl fmt::Display for ElementTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Subtype byte carried by binary payloads.
///
/// Unknown values round-trip unchanged through [`BinarySubtype::Other`];
/// [`From<u8>`] never maps a known value into that arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BinarySubtype {
    /// Compiled function.
    Function,
    /// Plain byte array.
    ByteArray,
    /// UUID.
    Uuid,
    /// MD5 digest.
    Md5,
    /// Application-defined payload.
    UserDefined,
    /// Any subtype this library does not name.
    Other(u8),
}

impl From<u8> for BinarySubtype {
    fn from(byte: u8) -> Self {
        match byte {
            0x01 => BinarySubtype::Function,
            0x02 => BinarySubtype::ByteArray,
            0x03 => BinarySubtype::Uuid,
            0x04 => BinarySubtype::Md5,
            0x80 => BinarySubtype::UserDefined,
            other => BinarySubtype::Other(other),
        }
    }
}

impl From<BinarySubtype> for u8 {
    fn from(subtype: BinarySubtype) -> u8 {
        match subtype {
            BinarySubtype::Function => 0x01,
            BinarySubtype::ByteArray => 0x02,
            BinarySubtype::Uuid => 0x03,
            BinarySubtype::Md5 => 0x04,
            BinarySubtype::UserDefined => 0x80,
            BinarySubtype::Other(other) => other,
        }
    }
}
