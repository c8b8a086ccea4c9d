use bdoc_types::{Int64, ObjectId, Timestamp};

use crate::tag::{BinarySubtype, ElementTag};

/// An ordered sequence of `(key, value)` pairs.
///
/// Element order is the order the caller supplied; encoding preserves it
/// and decoding preserves the wire order. Keys may repeat — the format does
/// not forbid it — and lookups return the first match.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Document {
    entries: Vec<(String, Value)>,
}

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an element, preserving insertion order.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    /// The first value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// The key of the first element, if any.
    pub fn first_key(&self) -> Option<&str> {
        self.entries.first().map(|(k, _)| k.as_str())
    }

    /// Iterates elements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the document has no elements.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<(String, Value)>> for Document {
    fn from(entries: Vec<(String, Value)>) -> Self {
        Self { entries }
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// A subtyped opaque payload.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Binary {
    /// Subtype byte, passed through unchanged for unknown values.
    pub subtype: BinarySubtype,
    /// The raw payload.
    pub payload: Vec<u8>,
}

impl Binary {
    /// Creates a binary value.
    pub fn new(subtype: BinarySubtype, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            subtype,
            payload: payload.into(),
        }
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// A regular expression as two raw byte strings.
///
/// The codec carries pattern and options verbatim and never compiles
/// either; options are not normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Regex {
    /// The pattern, NUL-free.
    pub pattern: Vec<u8>,
    /// The option flags, NUL-free.
    pub options: Vec<u8>,
}

impl Regex {
    /// Creates a regex value.
    pub fn new(pattern: impl Into<Vec<u8>>, options: impl Into<Vec<u8>>) -> Self {
        Self {
            pattern: pattern.into(),
            options: options.into(),
        }
    }
}

/// A program-source string together with its lexical scope.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodeWithScope {
    /// The source text.
    pub code: String,
    /// The scope document, owned by the value.
    pub scope: Document,
}

impl CodeWithScope {
    /// Creates a code-with-scope value.
    pub fn new(code: impl Into<String>, scope: Document) -> Self {
        Self {
            code: code.into(),
            scope,
        }
    }
}

/// A database reference.
///
/// Pure sugar on the wire: it encodes as the document
/// `{ "$ref": namespace, "$id": id, "$db": db }` (the `$db` element only
/// when present) and any decoded document of that shape comes back as this
/// variant.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DbRef {
    /// The referenced namespace (collection).
    pub namespace: String,
    /// The referenced identifier.
    pub id: ObjectId,
    /// The referenced database, when it differs from the current one.
    pub db: Option<String>,
}

impl DbRef {
    /// Creates a reference.
    pub fn new(namespace: impl Into<String>, id: ObjectId, db: Option<String>) -> Self {
        Self {
            namespace: namespace.into(),
            id,
            db,
        }
    }

    /// Lowers the reference to its wire document form.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.push("$ref", self.namespace.clone());
        doc.push("$id", self.id);
        if let Some(db) = &self.db {
            doc.push("$db", db.clone());
        }
        doc
    }
}

/// Any value the format can carry.
///
/// The set is closed: each variant maps to one wire tag, except [`DbRef`]
/// which lowers to a [`Document`]. There is no variant for a missing
/// value; hosts that distinguish `undefined` from `null` collapse both to
/// [`Value::Null`] before encoding.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// IEEE-754 binary64.
    Double(f64),
    /// UTF-8 string.
    String(String),
    /// Nested document.
    Document(Document),
    /// Ordered sequence.
    Array(Vec<Value>),
    /// Subtyped opaque payload.
    Binary(Binary),
    /// 12-byte identifier.
    ObjectId(ObjectId),
    /// Boolean.
    Boolean(bool),
    /// Signed milliseconds since the epoch.
    Datetime(i64),
    /// Null. Also the encoding of absent host values.
    Null,
    /// Uncompiled regular expression.
    Regex(Regex),
    /// Source string with scope document.
    CodeWithScope(CodeWithScope),
    /// Signed 32-bit integer.
    Int32(i32),
    /// Opaque 64-bit pair.
    Timestamp(Timestamp),
    /// Signed 64-bit integer.
    Int64(Int64),
    /// Database reference sugar.
    DbRef(DbRef),
}

impl Value {
    /// Builds a numeric value from a generic host number.
    ///
    /// A non-zero fractional part yields [`Value::Double`]; an integral
    /// value in the signed 32-bit range yields [`Value::Int32`]; anything
    /// else yields [`Value::Int64`], saturating at the representable
    /// bounds.
    pub fn number(value: f64) -> Self {
        if value.fract() != 0.0 {
            Value::Double(value)
        } else if (i32::MIN as f64..=i32::MAX as f64).contains(&value) {
            Value::Int32(value as i32)
        } else {
            Value::Int64(Int64::from_number(value))
        }
    }

    /// The wire tag this value encodes under.
    pub fn kind(&self) -> ElementTag {
        match self {
            Value::Double(_) => ElementTag::Double,
            Value::String(_) => ElementTag::String,
            Value::Document(_) | Value::DbRef(_) => ElementTag::Document,
            Value::Array(_) => ElementTag::Array,
            Value::Binary(_) => ElementTag::Binary,
            Value::ObjectId(_) => ElementTag::ObjectId,
            Value::Boolean(_) => ElementTag::Boolean,
            Value::Datetime(_) => ElementTag::Datetime,
            Value::Null => ElementTag::Null,
            Value::Regex(_) => ElementTag::Regex,
            Value::CodeWithScope(_) => ElementTag::CodeWithScope,
            Value::Int32(_) => ElementTag::Int32,
            Value::Timestamp(_) => ElementTag::Timestamp,
            Value::Int64(_) => ElementTag::Int64,
        }
    }

    /// Whether the value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The float payload, if this is a double.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// The integer payload, if this is an `Int32`.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int32(i) => Some(*i),
            _ => None,
        }
    }

    /// The integer payload, if this is an `Int64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(i) => Some(i.as_i64()),
            _ => None,
        }
    }

    /// The boolean payload, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// The document payload, if this is a document.
    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(d) => Some(d),
            _ => None,
        }
    }

    /// The element sequence, if this is an array.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// The identifier, if this is an object id.
    pub fn as_object_id(&self) -> Option<&ObjectId> {
        match self {
            Value::ObjectId(id) => Some(id),
            _ => None,
        }
    }

    /// The epoch milliseconds, if this is a datetime.
    pub fn as_datetime(&self) -> Option<i64> {
        match self {
            Value::Datetime(ms) => Some(*ms),
            _ => None,
        }
    }

    /// The timestamp, if this is a timestamp.
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// The binary payload, if this is a binary.
    pub fn as_binary(&self) -> Option<&Binary> {
        match self {
            Value::Binary(b) => Some(b),
            _ => None,
        }
    }

    /// The regular expression, if this is a regex.
    pub fn as_regex(&self) -> Option<&Regex> {
        match self {
            Value::Regex(r) => Some(r),
            _ => None,
        }
    }

    /// The code and scope, if this is a code-with-scope.
    pub fn as_code_with_scope(&self) -> Option<&CodeWithScope> {
        match self {
            Value::CodeWithScope(c) => Some(c),
            _ => None,
        }
    }

    /// The reference, if this is a database reference.
    pub fn as_dbref(&self) -> Option<&DbRef> {
        match self {
            Value::DbRef(d) => Some(d),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    /// Promotes like a generic host number; use [`Value::Double`] to force
    /// the double tag for integral values.
    fn from(value: f64) -> Self {
        Value::number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int32(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int64(Int64::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<ObjectId> for Value {
    fn from(value: ObjectId) -> Self {
        Value::ObjectId(value)
    }
}

impl From<Int64> for Value {
    fn from(value: Int64) -> Self {
        Value::Int64(value)
    }
}

impl From<Timestamp> for Value {
    fn from(value: Timestamp) -> Self {
        Value::Timestamp(value)
    }
}

impl From<Document> for Value {
    fn from(value: Document) -> Self {
        Value::Document(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<Binary> for Value {
    fn from(value: Binary) -> Self {
        Value::Binary(value)
    }
}

impl From<Regex> for Value {
    fn from(value: Regex) -> Self {
        Value::Regex(value)
    }
}

impl From<CodeWithScope> for Value {
    fn from(value: CodeWithScope) -> Self {
        Value::CodeWithScope(value)
    }
}

impl From<DbRef> for Value {
    fn from(value: DbRef) -> Self {
        Value::DbRef(value)
    }
}
