//! Bidirectional codec for the BDoc binary document interchange format.
//!
//! The format frames a document as a little-endian `int32` byte count,
//! a sequence of tagged elements (`tag ‖ key ‖ NUL ‖ payload`) and a
//! trailing `0x00`. [`encode`] turns a [`Document`] into that byte form,
//! allocating the output buffer exactly once from a precomputed size;
//! [`decode`] walks the byte form back into a [`Value`] graph without ever
//! reading past the declared bounds.
//!
//! ```
//! use bdoc::{decode, encode, Document, Value};
//!
//! let mut doc = Document::new();
//! doc.push("hello", "world");
//!
//! let bytes = encode(&doc)?;
//! assert_eq!(decode(&bytes)?, Value::Document(doc));
//! # Ok::<(), bdoc::Error>(())
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(unused_must_use)]

mod decode;
mod encode;
mod error;
mod io;
mod key;
mod size;
mod tag;
mod value;


pub use decode::decode;
pub use encode::{encode, encode_with, EncodeOptions};
pub use error::{Error, Result};
pub use key::validate_key;
pub use size::{array_size, document_size, value_size};
pub use tag::{BinarySubtype, ElementTag};
pub use value::{Binary, CodeWithScope, DbRef, Document, Regex, Value};

pub use bdoc_types::{Int64, Int64Error, ObjectId, ObjectIdError, Timestamp};
