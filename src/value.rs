use crate::{BinarySubtype, BsonType, Oid};

/// One decoded BSON value, borrowing from the document it came from.
///
/// This is the closed sum the visitor dispatches over. Variable-length
/// payloads are zero-copy slices into the source buffer; text is left as
/// raw bytes because the wire permits non-UTF-8 content there (policy
/// checks belong to the validator).
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum BsonValue<'doc> {
    Double(f64),
    /// UTF-8 string bytes, without the trailing NUL.
    Utf8(&'doc [u8]),
    /// A full embedded document, header and trailing NUL included.
    Document(&'doc [u8]),
    /// A full embedded array document, header and trailing NUL included.
    Array(&'doc [u8]),
    Binary {
        subtype: BinarySubtype,
        bytes: &'doc [u8],
    },
    Undefined,
    ObjectId(Oid),
    Bool(bool),
    /// Milliseconds since the UNIX epoch.
    DateTime(i64),
    Null,
    Regex {
        pattern: &'doc [u8],
        options: &'doc [u8],
    },
    DbPointer {
        collection: &'doc [u8],
        oid: Oid,
    },
    Code(&'doc [u8]),
    Symbol(&'doc [u8]),
    CodeWithScope {
        code: &'doc [u8],
        /// The scope document, header and trailing NUL included.
        scope: &'doc [u8],
    },
    Int32(i32),
    /// Internal MongoDB timestamp: seconds and ordinal increment.
    Timestamp {
        time: u32,
        increment: u32,
    },
    Int64(i64),
    MaxKey,
    MinKey,
}

impl BsonValue<'_> {
    #[inline]
    pub fn bson_type(&self) -> BsonType {
        match self {
            BsonValue::Double(_) => BsonType::Double,
            BsonValue::Utf8(_) => BsonType::Utf8,
            BsonValue::Document(_) => BsonType::Document,
            BsonValue::Array(_) => BsonType::Array,
            BsonValue::Binary { .. } => BsonType::Binary,
            BsonValue::Undefined => BsonType::Undefined,
            BsonValue::ObjectId(_) => BsonType::ObjectId,
            BsonValue::Bool(_) => BsonType::Bool,
            BsonValue::DateTime(_) => BsonType::DateTime,
            BsonValue::Null => BsonType::Null,
            BsonValue::Regex { .. } => BsonType::Regex,
            BsonValue::DbPointer { .. } => BsonType::DbPointer,
            BsonValue::Code(_) => BsonType::Code,
            BsonValue::Symbol(_) => BsonType::Symbol,
            BsonValue::CodeWithScope { .. } => BsonType::CodeWithScope,
            BsonValue::Int32(_) => BsonType::Int32,
            BsonValue::Timestamp { .. } => BsonType::Timestamp,
            BsonValue::Int64(_) => BsonType::Int64,
            BsonValue::MaxKey => BsonType::MaxKey,
            BsonValue::MinKey => BsonType::MinKey,
        }
    }
}
