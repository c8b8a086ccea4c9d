//! Atomic value types of the BDoc interchange format.
//!
//! The codec crate (`bdoc`) builds its value model on top of these types;
//! nothing in here knows about wire framing beyond the fixed layouts the
//! types themselves own (the 12-byte identifier composition and the
//! two-halves view of 64-bit integers).

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(unused_must_use)]

mod int64;
mod object_id;

pub use int64::{Int64, Int64Error, Timestamp};
pub use object_id::{ObjectId, ObjectIdError};

pub(crate) const fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'A'..=b'F' => Some(c - b'A' + 10),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'0'..=b'9' => Some(c - b'0'),
        _ => None,
    }
}
