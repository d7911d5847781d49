/// The BSON element type table, as it appears on the wire.
///
/// The discriminants are the exact type bytes; note the gaps before
/// [`MaxKey`](BsonType::MaxKey) (0x7F) and [`MinKey`](BsonType::MinKey)
/// (0xFF), which is why conversion from a raw byte goes through
/// [`BsonType::from_u8`] instead of a transmute.
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum BsonType {
    /// End of document marker (never yielded as a field type).
    EndOfDocument = 0x00,
    Double = 0x01,
    Utf8 = 0x02,
    Document = 0x03,
    Array = 0x04,
    Binary = 0x05,
    Undefined = 0x06,
    ObjectId = 0x07,
    Bool = 0x08,
    DateTime = 0x09,
    Null = 0x0A,
    Regex = 0x0B,
    DbPointer = 0x0C,
    Code = 0x0D,
    Symbol = 0x0E,
    CodeWithScope = 0x0F,
    Int32 = 0x10,
    Timestamp = 0x11,
    Int64 = 0x12,
    MaxKey = 0x7F,
    MinKey = 0xFF,
}

impl BsonType {
    /// Maps a raw type byte to its `BsonType`, or `None` for bytes outside
    /// the table.
    pub const fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0x00 => Self::EndOfDocument,
            0x01 => Self::Double,
            0x02 => Self::Utf8,
            0x03 => Self::Document,
            0x04 => Self::Array,
            0x05 => Self::Binary,
            0x06 => Self::Undefined,
            0x07 => Self::ObjectId,
            0x08 => Self::Bool,
            0x09 => Self::DateTime,
            0x0A => Self::Null,
            0x0B => Self::Regex,
            0x0C => Self::DbPointer,
            0x0D => Self::Code,
            0x0E => Self::Symbol,
            0x0F => Self::CodeWithScope,
            0x10 => Self::Int32,
            0x11 => Self::Timestamp,
            0x12 => Self::Int64,
            0x7F => Self::MaxKey,
            0xFF => Self::MinKey,
            _ => return None,
        })
    }

    /// Returns `true` for Document and Array, the two types whose payload
    /// is itself a full embedded document.
    pub const fn is_container(self) -> bool {
        matches!(self, Self::Document | Self::Array)
    }

    /// Returns `true` for types whose payload carries a length-prefixed
    /// UTF-8 text: Utf8, Code, Symbol.
    pub const fn is_string(self) -> bool {
        matches!(self, Self::Utf8 | Self::Code | Self::Symbol)
    }

    /// Returns `true` for types with no payload bytes at all.
    pub const fn is_empty_payload(self) -> bool {
        matches!(
            self,
            Self::Undefined | Self::Null | Self::MaxKey | Self::MinKey
        )
    }
}

/// The subtype byte carried by a [`BsonType::Binary`] payload.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BinarySubtype {
    Generic,
    Function,
    /// Deprecated pre-1.0 form; its payload carries an extra inner int32
    /// length prefix, which append and decode both honor.
    BinaryOld,
    UuidOld,
    Uuid,
    Md5,
    UserDefined(u8),
}

impl From<u8> for BinarySubtype {
    fn from(value: u8) -> Self {
        match value {
            0x00 => Self::Generic,
            0x01 => Self::Function,
            0x02 => Self::BinaryOld,
            0x03 => Self::UuidOld,
            0x04 => Self::Uuid,
            0x05 => Self::Md5,
            other => Self::UserDefined(other),
        }
    }
}

impl From<BinarySubtype> for u8 {
    fn from(value: BinarySubtype) -> Self {
        match value {
            BinarySubtype::Generic => 0x00,
            BinarySubtype::Function => 0x01,
            BinarySubtype::BinaryOld => 0x02,
            BinarySubtype::UuidOld => 0x03,
            BinarySubtype::Uuid => 0x04,
            BinarySubtype::Md5 => 0x05,
            BinarySubtype::UserDefined(other) => other,
        }
    }
}
