use core::str;

use bdoc_types::{Int64, ObjectId, Timestamp};

use crate::error::{Error, Result};
use crate::io::Reader;
use crate::tag::{BinarySubtype, ElementTag};
use crate::value::{Binary, CodeWithScope, DbRef, Document, Regex, Value};

/// Decodes a framed document into a value graph.
///
/// The outer `int32` byte count must fit inside the input; bytes past the
/// declared count are ignored. A document whose first element is `"$ref"`
/// (with a string namespace and an identifier `"$id"`) is returned as
/// [`Value::DbRef`]; everything else comes back as [`Value::Document`].
pub fn decode(bytes: &[u8]) -> Result<Value> {
    tracing::trace!(bytes = bytes.len(), "decoding document");
    let mut reader = Reader::new(bytes);
    let document = read_document(&mut reader)?;
    Ok(apply_dbref_sugar(document))
}

/// Validates a container's length prefix and splits off its element
/// region, leaving the terminator byte for [`close_container`].
fn open_container<'a>(reader: &mut Reader<'a>) -> Result<Reader<'a>> {
    let declared = reader.read_i32_le()?;
    let available = reader.remaining() + 4;
    // A container is at least prefix + terminator.
    let declared = usize::try_from(declared)
        .ok()
        .filter(|&candidate| candidate >= 5)
        .ok_or(Error::Truncated {
            expected: 5,
            remaining: available,
        })?;
    if declared > available {
        return Err(Error::Truncated {
            expected: declared,
            remaining: available,
        });
    }
    reader.sub(declared - 5)
}

fn close_container(reader: &mut Reader<'_>) -> Result<()> {
    if reader.read_u8()? != 0 {
        return Err(Error::MissingTerminator);
    }
    Ok(())
}

fn read_document(reader: &mut Reader<'_>) -> Result<Document> {
    let mut body = open_container(reader)?;
    let mut entries = Vec::new();
    while body.remaining() > 0 {
        let element = read_element(&mut body)?;
        let key = str::from_utf8(element.key)
            .map_err(|err| Error::InvalidUtf8 {
                offset: element.key_offset + err.valid_up_to(),
            })?
            .to_owned();
        entries.push((key, element.value));
    }
    close_container(reader)?;
    Ok(Document::from(entries))
}

fn read_array(reader: &mut Reader<'_>) -> Result<Vec<Value>> {
    let mut body = open_container(reader)?;
    // No index that survives framing can exceed the region's byte length;
    // the cap keeps a hostile key from forcing a huge allocation.
    let index_cap = body.remaining();
    let mut items = Vec::new();
    while body.remaining() > 0 {
        let element = read_element(&mut body)?;
        place_array_item(&mut items, element.key, element.value, index_cap);
    }
    close_container(reader)?;
    Ok(items)
}

struct Element<'a> {
    key_offset: usize,
    key: &'a [u8],
    value: Value,
}

fn read_element<'a>(body: &mut Reader<'a>) -> Result<Element<'a>> {
    let tag_offset = body.offset();
    let tag_byte = body.read_u8()?;
    let tag = ElementTag::from_u8(tag_byte).ok_or(Error::UnknownTag {
        tag: tag_byte,
        offset: tag_offset,
    })?;
    let key_offset = body.offset();
    let key = body.read_cstr()?;
    let value = read_payload(body, tag)?;
    Ok(Element {
        key_offset,
        key,
        value,
    })
}

fn read_payload(reader: &mut Reader<'_>, tag: ElementTag) -> Result<Value> {
    match tag {
        ElementTag::Double => Ok(Value::Double(reader.read_f64_le()?)),
        ElementTag::String => Ok(Value::String(read_string(reader)?)),
        ElementTag::Document => Ok(apply_dbref_sugar(read_document(reader)?)),
        ElementTag::Array => Ok(Value::Array(read_array(reader)?)),
        ElementTag::Binary => {
            // The leading total is redundant with the payload length and
            // is not cross-checked, matching lenient readers.
            let _total = reader.read_i32_le()?;
            let subtype = BinarySubtype::from(reader.read_u8()?);
            let len = read_len(reader)?;
            let payload = reader.take(len)?.to_vec();
            Ok(Value::Binary(Binary { subtype, payload }))
        }
        ElementTag::ObjectId => {
            let mut bytes = [0u8; ObjectId::LEN];
            bytes.copy_from_slice(reader.take(ObjectId::LEN)?);
            Ok(Value::ObjectId(ObjectId::new(bytes)))
        }
        ElementTag::Boolean => Ok(Value::Boolean(reader.read_u8()? == 1)),
        ElementTag::Datetime => Ok(Value::Datetime(reader.read_i64_le()?)),
        ElementTag::Null => Ok(Value::Null),
        ElementTag::Regex => {
            let pattern = reader.read_cstr()?.to_vec();
            let options = reader.read_cstr()?.to_vec();
            Ok(Value::Regex(Regex { pattern, options }))
        }
        ElementTag::CodeWithScope => read_code_with_scope(reader),
        ElementTag::Int32 => Ok(Value::Int32(reader.read_i32_le()?)),
        ElementTag::Timestamp => Ok(Value::Timestamp(Timestamp::from(reader.read_i64_le()?))),
        ElementTag::Int64 => Ok(Value::Int64(Int64::from(reader.read_i64_le()?))),
    }
}

/// Reads a length-prefixed, NUL-terminated UTF-8 string.
fn read_string(reader: &mut Reader<'_>) -> Result<String> {
    let len = read_len(reader)?;
    if len == 0 {
        return Err(Error::MissingTerminator);
    }
    let offset = reader.offset();
    let bytes = reader.take(len)?;
    let (body, terminator) = bytes.split_at(len - 1);
    if terminator != [0] {
        return Err(Error::MissingTerminator);
    }
    str::from_utf8(body)
        .map(str::to_owned)
        .map_err(|err| Error::InvalidUtf8 {
            offset: offset + err.valid_up_to(),
        })
}

fn read_code_with_scope(reader: &mut Reader<'_>) -> Result<Value> {
    let total = read_len(reader)?;
    let code_len = read_len(reader)?;
    if code_len == 0 {
        return Err(Error::MissingTerminator);
    }
    let code_offset = reader.offset();
    let bytes = reader.take(code_len)?;
    let (body, terminator) = bytes.split_at(code_len - 1);
    if terminator != [0] {
        return Err(Error::MissingTerminator);
    }
    let code = str::from_utf8(body)
        .map_err(|err| Error::InvalidUtf8 {
            offset: code_offset + err.valid_up_to(),
        })?
        .to_owned();

    // The scope spans the rest of the block: the total covers both length
    // prefixes, the code and the scope document.
    let scope_len = total.checked_sub(4 + 4 + code_len).ok_or(Error::Truncated {
        expected: 4 + 4 + code_len,
        remaining: total,
    })?;
    let mut scope_reader = reader.sub(scope_len)?;
    let scope = read_document(&mut scope_reader)?;
    Ok(Value::CodeWithScope(CodeWithScope { code, scope }))
}

/// Reads a little-endian `int32` length field, rejecting negatives.
fn read_len(reader: &mut Reader<'_>) -> Result<usize> {
    let value = reader.read_i32_le()?;
    usize::try_from(value).map_err(|_| Error::Truncated {
        expected: value.unsigned_abs() as usize,
        remaining: reader.remaining(),
    })
}

/// Stores a decoded array element at its parsed index, filling gaps with
/// nulls. Keys that do not parse (or claim an absurd index) append in file
/// order instead.
fn place_array_item(items: &mut Vec<Value>, key: &[u8], value: Value, index_cap: usize) {
    let parsed = str::from_utf8(key)
        .ok()
        .and_then(|key| key.parse::<usize>().ok())
        .filter(|&index| index <= index_cap);
    let index = parsed.unwrap_or(items.len());
    if index < items.len() {
        items[index] = value;
    } else {
        items.resize(index, Value::Null);
        items.push(value);
    }
}

/// Recovers the database-reference sugar from a decoded document.
fn apply_dbref_sugar(document: Document) -> Value {
    if document.first_key() == Some("$ref") {
        if let (Some(Value::String(namespace)), Some(Value::ObjectId(id))) =
            (document.get("$ref"), document.get("$id"))
        {
            let db = match document.get("$db") {
                Some(Value::String(db)) => Some(db.clone()),
                _ => None,
            };
            return Value::DbRef(DbRef::new(namespace.clone(), *id, db));
        }
    }
    Value::Document(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_bytes(elements: &[u8]) -> Vec<u8> {
        let total = 4 + elements.len() + 1;
        let mut bytes = (total as i32).to_le_bytes().to_vec();
        bytes.extend_from_slice(elements);
        bytes.push(0);
        bytes
    }

    #[test]
    fn declared_size_must_fit() {
        // Claims 100 bytes but only 5 exist.
        let bytes = [100, 0, 0, 0, 0];
        assert_eq!(
            decode(&bytes),
            Err(Error::Truncated {
                expected: 100,
                remaining: 5
            })
        );
    }

    #[test]
    fn negative_and_tiny_sizes_are_rejected() {
        let mut bytes = (-1i32).to_le_bytes().to_vec();
        bytes.push(0);
        assert!(matches!(decode(&bytes), Err(Error::Truncated { .. })));

        let bytes = 4i32.to_le_bytes();
        assert!(matches!(decode(&bytes), Err(Error::Truncated { .. })));
    }

    #[test]
    fn unknown_tag_reports_offset() {
        let bytes = doc_bytes(&[0x7f, b'k', 0, 0]);
        assert_eq!(
            decode(&bytes),
            Err(Error::UnknownTag {
                tag: 0x7f,
                offset: 4
            })
        );
    }

    #[test]
    fn terminator_is_required() {
        // {"": null} with the trailing NUL corrupted.
        let mut bytes = doc_bytes(&[0x0a, b'k', 0]);
        let last = bytes.len() - 1;
        bytes[last] = 1;
        assert_eq!(decode(&bytes), Err(Error::MissingTerminator));
    }

    #[test]
    fn string_payload_must_be_utf8() {
        // "k" -> string of two bytes: 0xff + NUL.
        let mut elements = vec![0x02, b'k', 0];
        elements.extend_from_slice(&2i32.to_le_bytes());
        elements.extend_from_slice(&[0xff, 0]);
        let bytes = doc_bytes(&elements);
        assert_eq!(decode(&bytes), Err(Error::InvalidUtf8 { offset: 11 }));
    }

    #[test]
    fn string_payload_must_be_nul_terminated() {
        let mut elements = vec![0x02, b'k', 0];
        elements.extend_from_slice(&2i32.to_le_bytes());
        elements.extend_from_slice(&[b'a', b'b']);
        let bytes = doc_bytes(&elements);
        assert_eq!(decode(&bytes), Err(Error::MissingTerminator));
    }

    #[test]
    fn element_cannot_reach_past_its_container() {
        // A nested empty document that claims more bytes than the outer
        // frame holds.
        let mut elements = vec![0x03, b'd', 0];
        elements.extend_from_slice(&64i32.to_le_bytes());
        let bytes = doc_bytes(&elements);
        assert!(matches!(decode(&bytes), Err(Error::Truncated { .. })));
    }

    #[test]
    fn array_gaps_fill_with_null() {
        // Array with keys "2" and "0": index 1 never appears.
        let mut inner = Vec::new();
        inner.extend_from_slice(&[0x10, b'2', 0]);
        inner.extend_from_slice(&7i32.to_le_bytes());
        inner.extend_from_slice(&[0x10, b'0', 0]);
        inner.extend_from_slice(&5i32.to_le_bytes());
        let inner_doc = doc_bytes(&inner);

        let mut elements = vec![0x04, b'a', 0];
        elements.extend_from_slice(&inner_doc);
        let bytes = doc_bytes(&elements);

        let decoded = decode(&bytes).unwrap();
        let doc = decoded.as_document().unwrap();
        assert_eq!(
            doc.get("a"),
            Some(&Value::Array(vec![
                Value::Int32(5),
                Value::Null,
                Value::Int32(7),
            ]))
        );
    }

    #[test]
    fn non_numeric_array_keys_append_in_file_order() {
        let mut inner = Vec::new();
        inner.extend_from_slice(&[0x10, b'x', 0]);
        inner.extend_from_slice(&1i32.to_le_bytes());
        inner.extend_from_slice(&[0x10, b'y', 0]);
        inner.extend_from_slice(&2i32.to_le_bytes());
        let inner_doc = doc_bytes(&inner);

        let mut elements = vec![0x04, b'a', 0];
        elements.extend_from_slice(&inner_doc);
        let bytes = doc_bytes(&elements);

        let decoded = decode(&bytes).unwrap();
        let doc = decoded.as_document().unwrap();
        assert_eq!(
            doc.get("a"),
            Some(&Value::Array(vec![Value::Int32(1), Value::Int32(2)]))
        );
    }

    #[test]
    fn dbref_requires_leading_ref_key() {
        // {"x": 1, "$ref": "col"}: $ref is not first, stays a document.
        let mut elements = Vec::new();
        elements.extend_from_slice(&[0x10, b'x', 0]);
        elements.extend_from_slice(&1i32.to_le_bytes());
        elements.extend_from_slice(&[0x02, b'$', b'r', b'e', b'f', 0]);
        elements.extend_from_slice(&4i32.to_le_bytes());
        elements.extend_from_slice(b"col\0");
        let bytes = doc_bytes(&elements);

        assert!(matches!(decode(&bytes), Ok(Value::Document(_))));
    }
}
