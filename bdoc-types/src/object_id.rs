use core::sync::atomic::{AtomicU32, Ordering};
use core::{fmt, str};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use thiserror::Error;

#[cfg(feature = "random")]
use rand::distributions::{Distribution, Standard};

use crate::hex_val;

/// Errors raised when constructing an [`ObjectId`] from external input.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectIdError {
    /// The input was neither 12 raw bytes nor a 24-character hex string.
    #[error("invalid object id length: {0}")]
    InvalidLength(usize),
    /// The hex form contained a non-hex character.
    #[error("invalid hex digit in object id")]
    InvalidDigit,
}

/// Identifiers generated in this process share one monotonic counter so
/// concurrent generation within the same second stays unique.
static COUNTER: AtomicU32 = AtomicU32::new(0);

/// Per-process random fuzz, drawn once on first use.
static FUZZ: OnceLock<u32> = OnceLock::new();

/// A 12-byte document identifier.
///
/// The wire layout is `be32(seconds) ‖ le32(fuzz) ‖ le32(counter)`; the
/// textual form is the lowercase hex of the 12 bytes.
#[derive(Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    /// Memory length of the type.
    pub const LEN: usize = 12;

    /// Bytes constructor.
    pub const fn new(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    /// Zeroes bytes constructor.
    pub const fn zeroed() -> Self {
        Self([0; 12])
    }

    /// Generates a fresh identifier from the wall clock, the per-process
    /// fuzz and the shared counter.
    pub fn generate() -> Self {
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs() as u32)
            .unwrap_or_default();
        let fuzz = *FUZZ.get_or_init(|| rand::thread_rng().gen());
        let counter = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self::from_parts(seconds, fuzz, counter)
    }

    /// Composes an identifier from its three fields. Useful for
    /// deterministic construction when the clock and randomness are
    /// supplied by the caller.
    pub fn from_parts(seconds: u32, fuzz: u32, counter: u32) -> Self {
        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..8].copy_from_slice(&fuzz.to_le_bytes());
        bytes[8..].copy_from_slice(&counter.to_le_bytes());
        Self(bytes)
    }

    /// The seconds field, i.e. the big-endian first four bytes.
    pub fn seconds(&self) -> u32 {
        let mut field = [0u8; 4];
        field.copy_from_slice(&self.0[..4]);
        u32::from_be_bytes(field)
    }

    /// Parses the 24-character lowercase or uppercase hex form.
    pub fn from_hex(hex: &str) -> Result<Self, ObjectIdError> {
        if hex.len() != 2 * Self::LEN {
            return Err(ObjectIdError::InvalidLength(hex.len()));
        }

        let mut b = hex.bytes();
        let mut ret = Self::zeroed();
        for r in ret.0.iter_mut() {
            let h = b.next().and_then(hex_val).ok_or(ObjectIdError::InvalidDigit)?;
            let l = b.next().and_then(hex_val).ok_or(ObjectIdError::InvalidDigit)?;
            *r = h << 4 | l;
        }

        Ok(ret)
    }

    /// The 24-character lowercase hex form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The raw 12 bytes.
    pub const fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }
}

impl AsRef<[u8]> for ObjectId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 12]> for ObjectId {
    fn from(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }
}

impl From<ObjectId> for [u8; 12] {
    fn from(id: ObjectId) -> [u8; 12] {
        id.0
    }
}

impl TryFrom<&[u8]> for ObjectId {
    type Error = ObjectIdError;

    fn try_from(bytes: &[u8]) -> Result<ObjectId, ObjectIdError> {
        <[u8; 12]>::try_from(bytes)
            .map(ObjectId)
            .map_err(|_| ObjectIdError::InvalidLength(bytes.len()))
    }
}

impl fmt::LowerHex for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "0x")?
        }

        self.0.iter().try_for_each(|b| write!(f, "{:02x}", &b))
    }
}

impl fmt::UpperHex for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "0x")?
        }

        self.0.iter().try_for_each(|b| write!(f, "{:02X}", &b))
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        <Self as fmt::LowerHex>::fmt(self, f)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        <Self as fmt::LowerHex>::fmt(self, f)
    }
}

impl str::FromStr for ObjectId {
    type Err = ObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

#[cfg(feature = "random")]
impl Distribution<ObjectId> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ObjectId {
        ObjectId(rng.gen())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ObjectId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ObjectId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;
        if deserializer.is_human_readable() {
            let s: &str = serde::Deserialize::deserialize(deserializer)?;
            s.parse().map_err(D::Error::custom)
        } else {
            deserializer.deserialize_bytes(BytesVisitor)
        }
    }
}

/// A visitor for deserializing the fixed-size byte form.
#[cfg(feature = "serde")]
struct BytesVisitor;

#[cfg(feature = "serde")]
impl<'de> serde::de::Visitor<'de> for BytesVisitor {
    type Value = ObjectId;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "an array of {} bytes", ObjectId::LEN)
    }

    fn visit_bytes<E: serde::de::Error>(self, items: &[u8]) -> Result<Self::Value, E> {
        ObjectId::try_from(items).map_err(E::custom)
    }
}
