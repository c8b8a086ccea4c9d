use crate::error::{Error, Result};
use crate::io::Output;
use crate::key::validate_key;
use crate::size;
use crate::value::{Document, Value};

/// Encoding configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Reject element keys that start with `$` or contain `.`.
    ///
    /// Applies to every document layer except the elements synthesized
    /// when lowering a [`crate::DbRef`].
    pub strict_keys: bool,
}

/// Encodes a document with default options.
pub fn encode(document: &Document) -> Result<Vec<u8>> {
    encode_with(document, EncodeOptions::default())
}

/// Encodes a document into its framed byte form.
///
/// The output length is computed up front, the buffer is allocated once
/// and every container length prefix is written from the precomputed
/// sizes, so no back-patching pass is needed. On error the partial buffer
/// is discarded; no output is observable.
pub fn encode_with(document: &Document, options: EncodeOptions) -> Result<Vec<u8>> {
    let total = size::document_size(document);
    if i32::try_from(total).is_err() {
        return Err(Error::UnsupportedValue("document exceeds the 2 GiB frame limit"));
    }
    tracing::trace!(bytes = total, elements = document.len(), "encoding document");

    let mut out = Vec::with_capacity(total);
    write_document(&mut out, document, options.strict_keys)?;
    debug_assert_eq!(out.len(), total);
    Ok(out)
}

fn write_document<O: Output + ?Sized>(
    out: &mut O,
    document: &Document,
    strict: bool,
) -> Result<()> {
    out.write_i32_le(size::document_size(document) as i32)?;
    for (key, value) in document.iter() {
        write_element(out, key, value, strict)?;
    }
    out.push_byte(0)
}

fn write_array<O: Output + ?Sized>(out: &mut O, items: &[Value], strict: bool) -> Result<()> {
    out.write_i32_le(size::array_size(items) as i32)?;
    for (index, value) in items.iter().enumerate() {
        let key = index.to_string();
        write_element(out, &key, value, strict)?;
    }
    out.push_byte(0)
}

fn write_element<O: Output + ?Sized>(
    out: &mut O,
    key: &str,
    value: &Value,
    strict: bool,
) -> Result<()> {
    let key = key.as_bytes();
    if key.contains(&0) {
        return Err(Error::UnsupportedValue("document key contains NUL"));
    }
    if strict {
        validate_key(key)?;
    }

    out.push_byte(value.kind() as u8)?;
    out.write_cstr(key)?;
    write_payload(out, value, strict)
}

fn write_payload<O: Output + ?Sized>(out: &mut O, value: &Value, strict: bool) -> Result<()> {
    match value {
        Value::Double(d) => out.write_f64_le(*d),
        Value::String(s) => {
            out.write_i32_le(s.len() as i32 + 1)?;
            out.write_cstr(s.as_bytes())
        }
        Value::Document(d) => write_document(out, d, strict),
        Value::Array(a) => write_array(out, a, strict),
        Value::Binary(b) => {
            out.write_i32_le(b.payload.len() as i32 + 4)?;
            out.push_byte(b.subtype.into())?;
            out.write_i32_le(b.payload.len() as i32)?;
            out.write(&b.payload)
        }
        Value::ObjectId(id) => out.write(id.as_ref()),
        Value::Boolean(b) => out.push_byte(*b as u8),
        Value::Datetime(ms) => out.write_i64_le(*ms),
        Value::Null => Ok(()),
        Value::Regex(r) => {
            if r.pattern.contains(&0) {
                return Err(Error::UnsupportedValue("regex pattern contains NUL"));
            }
            if r.options.contains(&0) {
                return Err(Error::UnsupportedValue("regex options contain NUL"));
            }
            out.write_cstr(&r.pattern)?;
            out.write_cstr(&r.options)
        }
        Value::CodeWithScope(c) => {
            // The prefix spans from its own first byte through the end of
            // the scope document.
            let total = 4 + 4 + c.code.len() + 1 + size::document_size(&c.scope);
            out.write_i32_le(total as i32)?;
            out.write_i32_le(c.code.len() as i32 + 1)?;
            out.write_cstr(c.code.as_bytes())?;
            write_document(out, &c.scope, strict)
        }
        Value::Int32(i) => out.write_i32_le(*i),
        Value::Timestamp(ts) => out.write(&ts.to_le_bytes()),
        Value::Int64(i) => out.write(&i.to_le_bytes()),
        // Sugar: lowered to a plain document whose synthesized keys are
        // exempt from strict checking.
        Value::DbRef(d) => write_document(out, &d.to_document(), false),
    }
}
