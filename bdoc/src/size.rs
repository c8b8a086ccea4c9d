//! Exact encoded-size calculation.
//!
//! [`crate::encode`] allocates its output buffer once from these numbers
//! and writes every container length prefix from them, so the calculator
//! and the encoder must agree to the byte.

use bdoc_types::ObjectId;

use crate::value::{Document, Value};

/// Encoded size of a document, including its length prefix and trailing
/// NUL.
pub fn document_size(document: &Document) -> usize {
    4 + document
        .iter()
        .map(|(key, value)| element_size(key.len(), value))
        .sum::<usize>()
        + 1
}

/// Encoded size of an array, including its length prefix and trailing
/// NUL. Keys are the decimal indices `"0"`, `"1"`, …
pub fn array_size(items: &[Value]) -> usize {
    4 + items
        .iter()
        .enumerate()
        .map(|(index, value)| element_size(decimal_len(index), value))
        .sum::<usize>()
        + 1
}

/// Encoded size of one element: tag byte, key, key terminator, payload.
fn element_size(key_len: usize, value: &Value) -> usize {
    1 + key_len + 1 + value_size(value)
}

/// Encoded payload size of a value, not counting the element header a
/// containing document adds.
pub fn value_size(value: &Value) -> usize {
    match value {
        Value::Null => 0,
        Value::Boolean(_) => 1,
        Value::Int32(_) => 4,
        Value::Double(_) | Value::Datetime(_) | Value::Int64(_) | Value::Timestamp(_) => 8,
        Value::ObjectId(_) => ObjectId::LEN,
        Value::String(s) => 4 + s.len() + 1,
        // Total length, subtype, payload length, payload; the length
        // appears twice on the wire.
        Value::Binary(b) => 4 + 1 + 4 + b.payload.len(),
        Value::Regex(r) => r.pattern.len() + 1 + r.options.len() + 1,
        Value::CodeWithScope(c) => 4 + 4 + c.code.len() + 1 + document_size(&c.scope),
        Value::Document(d) => document_size(d),
        Value::Array(a) => array_size(a),
        Value::DbRef(d) => document_size(&d.to_document()),
    }
}

/// Number of decimal digits in an array index.
fn decimal_len(mut index: usize) -> usize {
    let mut digits = 1;
    while index >= 10 {
        index /= 10;
        digits += 1;
    }
    digits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_lengths() {
        assert_eq!(decimal_len(0), 1);
        assert_eq!(decimal_len(9), 1);
        assert_eq!(decimal_len(10), 2);
        assert_eq!(decimal_len(99), 2);
        assert_eq!(decimal_len(100), 3);
    }

    #[test]
    fn known_document_size() {
        // {"hello": "world"} is 22 bytes on the wire.
        let mut doc = Document::new();
        doc.push("hello", "world");
        assert_eq!(document_size(&doc), 22);
    }

    #[test]
    fn empty_containers() {
        assert_eq!(document_size(&Document::new()), 5);
        assert_eq!(array_size(&[]), 5);
    }
}
