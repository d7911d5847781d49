use std::hint::unreachable_unchecked;

use crate::{
    BinarySubtype, BsonType, BsonValue, Error, MAX_DOCUMENT_SIZE, Oid, Result, cold_path,
    util::{read_f64_le, read_i32_le, read_i64_le, read_u64_le},
};

/// Byte offsets locating the sub-parts of one field's payload.
///
/// Which parts exist depends on the type, so this is a tagged enum rather
/// than a flat scalar struct; every offset is validated against the buffer
/// length before the variant is built, which is what the unchecked
/// accessors rely on.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Offsets {
    /// No payload bytes: Undefined, Null, MaxKey, MinKey.
    Empty,
    /// A single fixed-width scalar starting at `d1`.
    Fixed { d1: u32 },
    /// Length-prefixed text (Utf8, Code, Symbol): int32 at `len`,
    /// character bytes at `data`, trailing NUL included in the prefix.
    Str { len: u32, data: u32 },
    /// An embedded document or array starting (with its header) at `start`.
    Doc { start: u32 },
    /// Binary: int32 at `len`, subtype byte at `subtype`, payload at
    /// `data` (already past the legacy 0x02 inner prefix when present).
    Binary { len: u32, subtype: u32, data: u32 },
    /// Two cstrings: pattern at `pattern`, options at `options`.
    Regex { pattern: u32, options: u32 },
    /// Length-prefixed collection name at `len`/`collection`, 12-byte oid
    /// at `oid`.
    DbPointer { len: u32, collection: u32, oid: u32 },
    /// Code-with-scope: total int32 at `total`, code length int32 at
    /// `code_len`, code bytes at `code`, scope document at `scope`.
    CodeScope {
        total: u32,
        code_len: u32,
        code: u32,
        scope: u32,
    },
}

/// One field produced by an [`Iter`]: type tag, key slice and the
/// validated offsets of the value's sub-parts.
///
/// Checked accessors (`as_*`) verify the field's type and return `None`
/// on mismatch. Each is a thin layer over an `unsafe` unchecked twin that
/// trusts the offsets computed during iteration; the unchecked forms also
/// feed [`Field::value`] and the visitor.
#[derive(Clone, Copy)]
pub struct Field<'doc> {
    data: &'doc [u8],
    kind: BsonType,
    type_off: u32,
    key_off: u32,
    key_len: u32,
    offsets: Offsets,
}

impl<'doc> Field<'doc> {
    /// The field's BSON type.
    #[inline]
    pub fn bson_type(&self) -> BsonType {
        self.kind
    }

    /// Byte offset of this field's type byte within the document.
    #[inline]
    pub fn offset(&self) -> u32 {
        self.type_off
    }

    /// The raw key bytes, without the terminating NUL.
    #[inline]
    pub fn key_bytes(&self) -> &'doc [u8] {
        &self.data[self.key_off as usize..(self.key_off + self.key_len) as usize]
    }

    /// The key as UTF-8, or `""` if the key bytes are not valid UTF-8.
    ///
    /// The empty-string sentinel lets callers that do not care about
    /// malformed keys keep going; [`Iter::visit_all`] checks the bytes
    /// itself and cancels the walk instead.
    #[inline]
    pub fn key(&self) -> &'doc str {
        std::str::from_utf8(self.key_bytes()).unwrap_or("")
    }

    /// Reads the field as a double.
    ///
    /// # Safety
    ///
    /// The field's type must be [`BsonType::Double`].
    #[inline]
    pub unsafe fn double_unchecked(&self) -> f64 {
        let Offsets::Fixed { d1 } = self.offsets else {
            unsafe { unreachable_unchecked() }
        };
        unsafe { read_f64_le(self.data, d1 as usize) }
    }

    #[inline]
    pub fn as_double(&self) -> Option<f64> {
        (self.kind == BsonType::Double).then(|| unsafe { self.double_unchecked() })
    }

    /// Reads the field as an int32.
    ///
    /// # Safety
    ///
    /// The field's type must be [`BsonType::Int32`].
    #[inline]
    pub unsafe fn int32_unchecked(&self) -> i32 {
        let Offsets::Fixed { d1 } = self.offsets else {
            unsafe { unreachable_unchecked() }
        };
        unsafe { read_i32_le(self.data, d1 as usize) }
    }

    #[inline]
    pub fn as_int32(&self) -> Option<i32> {
        (self.kind == BsonType::Int32).then(|| unsafe { self.int32_unchecked() })
    }

    /// Reads the field as an int64.
    ///
    /// # Safety
    ///
    /// The field's type must be [`BsonType::Int64`].
    #[inline]
    pub unsafe fn int64_unchecked(&self) -> i64 {
        let Offsets::Fixed { d1 } = self.offsets else {
            unsafe { unreachable_unchecked() }
        };
        unsafe { read_i64_le(self.data, d1 as usize) }
    }

    #[inline]
    pub fn as_int64(&self) -> Option<i64> {
        (self.kind == BsonType::Int64).then(|| unsafe { self.int64_unchecked() })
    }

    /// Reads the field as a UTC datetime (milliseconds since the epoch).
    ///
    /// # Safety
    ///
    /// The field's type must be [`BsonType::DateTime`].
    #[inline]
    pub unsafe fn date_time_unchecked(&self) -> i64 {
        let Offsets::Fixed { d1 } = self.offsets else {
            unsafe { unreachable_unchecked() }
        };
        unsafe { read_i64_le(self.data, d1 as usize) }
    }

    #[inline]
    pub fn as_date_time(&self) -> Option<i64> {
        (self.kind == BsonType::DateTime).then(|| unsafe { self.date_time_unchecked() })
    }

    /// Reads the field as a timestamp `(time, increment)` pair.
    ///
    /// # Safety
    ///
    /// The field's type must be [`BsonType::Timestamp`].
    #[inline]
    pub unsafe fn timestamp_unchecked(&self) -> (u32, u32) {
        let Offsets::Fixed { d1 } = self.offsets else {
            unsafe { unreachable_unchecked() }
        };
        // Wire order is increment then time in the low/high halves.
        let raw = unsafe { read_u64_le(self.data, d1 as usize) };
        ((raw >> 32) as u32, raw as u32)
    }

    #[inline]
    pub fn as_timestamp(&self) -> Option<(u32, u32)> {
        (self.kind == BsonType::Timestamp).then(|| unsafe { self.timestamp_unchecked() })
    }

    /// Reads the field as a bool. Any non-zero byte reads as `true`.
    ///
    /// # Safety
    ///
    /// The field's type must be [`BsonType::Bool`].
    #[inline]
    pub unsafe fn bool_unchecked(&self) -> bool {
        let Offsets::Fixed { d1 } = self.offsets else {
            unsafe { unreachable_unchecked() }
        };
        unsafe { *self.data.get_unchecked(d1 as usize) != 0 }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        (self.kind == BsonType::Bool).then(|| unsafe { self.bool_unchecked() })
    }

    /// Reads the field as an ObjectId.
    ///
    /// # Safety
    ///
    /// The field's type must be [`BsonType::ObjectId`].
    #[inline]
    pub unsafe fn oid_unchecked(&self) -> Oid {
        let Offsets::Fixed { d1 } = self.offsets else {
            unsafe { unreachable_unchecked() }
        };
        let mut bytes = [0u8; 12];
        bytes.copy_from_slice(&self.data[d1 as usize..d1 as usize + 12]);
        Oid::from_bytes(bytes)
    }

    #[inline]
    pub fn as_oid(&self) -> Option<Oid> {
        (self.kind == BsonType::ObjectId).then(|| unsafe { self.oid_unchecked() })
    }

    /// Reads the text bytes of a Utf8, Code or Symbol field, without the
    /// trailing NUL.
    ///
    /// # Safety
    ///
    /// The field's type must be one of [`BsonType::Utf8`],
    /// [`BsonType::Code`], [`BsonType::Symbol`].
    #[inline]
    pub unsafe fn text_unchecked(&self) -> &'doc [u8] {
        let Offsets::Str { len, data } = self.offsets else {
            unsafe { unreachable_unchecked() }
        };
        let byte_len = unsafe { read_i32_le(self.data, len as usize) } as usize;
        &self.data[data as usize..data as usize + byte_len - 1]
    }

    /// The string bytes of a Utf8 field, UTF-8 not yet verified.
    #[inline]
    pub fn as_utf8_bytes(&self) -> Option<&'doc [u8]> {
        (self.kind == BsonType::Utf8).then(|| unsafe { self.text_unchecked() })
    }

    /// The string value of a Utf8 field; `None` on a type mismatch or
    /// invalid UTF-8.
    #[inline]
    pub fn as_utf8(&self) -> Option<&'doc str> {
        std::str::from_utf8(self.as_utf8_bytes()?).ok()
    }

    #[inline]
    pub fn as_code(&self) -> Option<&'doc [u8]> {
        (self.kind == BsonType::Code).then(|| unsafe { self.text_unchecked() })
    }

    #[inline]
    pub fn as_symbol(&self) -> Option<&'doc [u8]> {
        (self.kind == BsonType::Symbol).then(|| unsafe { self.text_unchecked() })
    }

    /// The full bytes of an embedded document or array, header and
    /// trailing NUL included.
    ///
    /// # Safety
    ///
    /// The field's type must be [`BsonType::Document`] or
    /// [`BsonType::Array`].
    #[inline]
    pub unsafe fn document_bytes_unchecked(&self) -> &'doc [u8] {
        let Offsets::Doc { start } = self.offsets else {
            unsafe { unreachable_unchecked() }
        };
        let len = unsafe { read_i32_le(self.data, start as usize) } as usize;
        &self.data[start as usize..start as usize + len]
    }

    #[inline]
    pub fn as_document(&self) -> Option<&'doc [u8]> {
        (self.kind == BsonType::Document).then(|| unsafe { self.document_bytes_unchecked() })
    }

    #[inline]
    pub fn as_array(&self) -> Option<&'doc [u8]> {
        (self.kind == BsonType::Array).then(|| unsafe { self.document_bytes_unchecked() })
    }

    /// Reads a Binary field's subtype and payload.
    ///
    /// # Safety
    ///
    /// The field's type must be [`BsonType::Binary`].
    #[inline]
    pub unsafe fn binary_unchecked(&self) -> (BinarySubtype, &'doc [u8]) {
        let Offsets::Binary { len, subtype, data } = self.offsets else {
            unsafe { unreachable_unchecked() }
        };
        let subtype = BinarySubtype::from(unsafe { *self.data.get_unchecked(subtype as usize) });
        let mut byte_len = unsafe { read_i32_le(self.data, len as usize) } as usize;
        if subtype == BinarySubtype::BinaryOld {
            byte_len -= 4;
        }
        (
            subtype,
            &self.data[data as usize..data as usize + byte_len],
        )
    }

    #[inline]
    pub fn as_binary(&self) -> Option<(BinarySubtype, &'doc [u8])> {
        (self.kind == BsonType::Binary).then(|| unsafe { self.binary_unchecked() })
    }

    /// Reads a Regex field's pattern and options cstrings.
    ///
    /// # Safety
    ///
    /// The field's type must be [`BsonType::Regex`].
    #[inline]
    pub unsafe fn regex_unchecked(&self) -> (&'doc [u8], &'doc [u8]) {
        let Offsets::Regex { pattern, options } = self.offsets else {
            unsafe { unreachable_unchecked() }
        };
        // options starts one past the pattern's NUL.
        let pattern = &self.data[pattern as usize..options as usize - 1];
        let rest = &self.data[options as usize..];
        let end = rest.iter().position(|&b| b == 0).unwrap_or(rest.len());
        (pattern, &rest[..end])
    }

    #[inline]
    pub fn as_regex(&self) -> Option<(&'doc [u8], &'doc [u8])> {
        (self.kind == BsonType::Regex).then(|| unsafe { self.regex_unchecked() })
    }

    /// Reads a DbPointer field's collection name and oid.
    ///
    /// # Safety
    ///
    /// The field's type must be [`BsonType::DbPointer`].
    #[inline]
    pub unsafe fn dbpointer_unchecked(&self) -> (&'doc [u8], Oid) {
        let Offsets::DbPointer {
            len,
            collection,
            oid,
        } = self.offsets
        else {
            unsafe { unreachable_unchecked() }
        };
        let byte_len = unsafe { read_i32_le(self.data, len as usize) } as usize;
        let name = &self.data[collection as usize..collection as usize + byte_len - 1];
        let mut bytes = [0u8; 12];
        bytes.copy_from_slice(&self.data[oid as usize..oid as usize + 12]);
        (name, Oid::from_bytes(bytes))
    }

    #[inline]
    pub fn as_dbpointer(&self) -> Option<(&'doc [u8], Oid)> {
        (self.kind == BsonType::DbPointer).then(|| unsafe { self.dbpointer_unchecked() })
    }

    /// Reads a CodeWithScope field's code bytes and scope document bytes.
    ///
    /// # Safety
    ///
    /// The field's type must be [`BsonType::CodeWithScope`].
    #[inline]
    pub unsafe fn code_with_scope_unchecked(&self) -> (&'doc [u8], &'doc [u8]) {
        let Offsets::CodeScope {
            code_len,
            code,
            scope,
            ..
        } = self.offsets
        else {
            unsafe { unreachable_unchecked() }
        };
        let code_bytes = unsafe { read_i32_le(self.data, code_len as usize) } as usize;
        let scope_len = unsafe { read_i32_le(self.data, scope as usize) } as usize;
        (
            &self.data[code as usize..code as usize + code_bytes - 1],
            &self.data[scope as usize..scope as usize + scope_len],
        )
    }

    #[inline]
    pub fn as_code_with_scope(&self) -> Option<(&'doc [u8], &'doc [u8])> {
        (self.kind == BsonType::CodeWithScope).then(|| unsafe { self.code_with_scope_unchecked() })
    }

    /// Start offset of this field's embedded document (the scope, for
    /// code-with-scope); used to report root-relative offsets.
    #[inline]
    pub(crate) fn container_start(&self) -> u32 {
        match self.offsets {
            Offsets::Doc { start } => start,
            Offsets::CodeScope { scope, .. } => scope,
            _ => 0,
        }
    }

    /// A fresh zero-copy iterator over an embedded document or array.
    pub fn recurse(&self) -> Result<Iter<'doc>> {
        if !self.kind.is_container() {
            return Err(Error::UnexpectedType(BsonType::Document, self.kind));
        }
        Iter::new(unsafe { self.document_bytes_unchecked() })
    }

    /// Materializes the field's value as the closed [`BsonValue`] sum.
    pub fn value(&self) -> BsonValue<'doc> {
        unsafe {
            match self.kind {
                BsonType::EndOfDocument => unreachable_unchecked(),
                BsonType::Double => BsonValue::Double(self.double_unchecked()),
                BsonType::Utf8 => BsonValue::Utf8(self.text_unchecked()),
                BsonType::Document => BsonValue::Document(self.document_bytes_unchecked()),
                BsonType::Array => BsonValue::Array(self.document_bytes_unchecked()),
                BsonType::Binary => {
                    let (subtype, bytes) = self.binary_unchecked();
                    BsonValue::Binary { subtype, bytes }
                }
                BsonType::Undefined => BsonValue::Undefined,
                BsonType::ObjectId => BsonValue::ObjectId(self.oid_unchecked()),
                BsonType::Bool => BsonValue::Bool(self.bool_unchecked()),
                BsonType::DateTime => BsonValue::DateTime(self.date_time_unchecked()),
                BsonType::Null => BsonValue::Null,
                BsonType::Regex => {
                    let (pattern, options) = self.regex_unchecked();
                    BsonValue::Regex { pattern, options }
                }
                BsonType::DbPointer => {
                    let (collection, oid) = self.dbpointer_unchecked();
                    BsonValue::DbPointer { collection, oid }
                }
                BsonType::Code => BsonValue::Code(self.text_unchecked()),
                BsonType::Symbol => BsonValue::Symbol(self.text_unchecked()),
                BsonType::CodeWithScope => {
                    let (code, scope) = self.code_with_scope_unchecked();
                    BsonValue::CodeWithScope { code, scope }
                }
                BsonType::Int32 => BsonValue::Int32(self.int32_unchecked()),
                BsonType::Timestamp => {
                    let (time, increment) = self.timestamp_unchecked();
                    BsonValue::Timestamp { time, increment }
                }
                BsonType::Int64 => BsonValue::Int64(self.int64_unchecked()),
                BsonType::MaxKey => BsonValue::MaxKey,
                BsonType::MinKey => BsonValue::MinKey,
            }
        }
    }
}

/// A forward-only cursor over one document's fields.
///
/// The iterator is non-restartable: re-walking a document means building a
/// new `Iter`. Any structural inconsistency invalidates this instance
/// permanently: the offending byte offset is kept for diagnostics
/// ([`Iter::error_offset`]), the error is yielded once, and every later
/// call reports exhaustion. The underlying buffer is never read past its
/// bounds and never mutated.
#[derive(Clone)]
pub struct Iter<'doc> {
    data: &'doc [u8],
    off: u32,
    err_off: Option<u32>,
    done: bool,
}

impl<'doc> Iter<'doc> {
    /// Builds an iterator over a full document byte buffer (header and
    /// trailing NUL included). The header is verified up front.
    pub fn new(data: &'doc [u8]) -> Result<Iter<'doc>> {
        if data.len() < 5 || data.len() > MAX_DOCUMENT_SIZE {
            cold_path();
            return Err(Error::Corrupt(0));
        }
        let header = unsafe { read_i32_le(data, 0) };
        if header as usize != data.len() {
            cold_path();
            return Err(Error::Corrupt(0));
        }
        if data[data.len() - 1] != 0 {
            cold_path();
            return Err(Error::Corrupt(data.len() as u32 - 1));
        }
        Ok(Iter {
            data,
            off: 4,
            err_off: None,
            done: false,
        })
    }

    /// Builds an iterator over bytes whose framing was already verified
    /// (documents keep the header invariant across every mutation).
    #[inline]
    pub(crate) fn trusted(data: &'doc [u8]) -> Iter<'doc> {
        Iter {
            data,
            off: 4,
            err_off: None,
            done: false,
        }
    }

    /// The byte offset of the first structural inconsistency, if the walk
    /// hit one.
    #[inline]
    pub fn error_offset(&self) -> Option<u32> {
        self.err_off
    }

    fn step(&mut self) -> Option<Result<Field<'doc>>> {
        macro_rules! corrupt {
            ($off:expr) => {{
                cold_path();
                let off = $off as u32;
                self.err_off = Some(off);
                self.done = true;
                return Some(Err(Error::Corrupt(off)));
            }};
        }

        if self.done {
            return None;
        }

        let data = self.data;
        // Last byte is the document's trailing NUL; payloads end at most here.
        let limit = data.len() - 1;
        let type_off = self.off as usize;

        let type_byte = data[type_off];
        if type_byte == 0 {
            if type_off == limit {
                cold_path();
                self.done = true;
                return None;
            }
            corrupt!(type_off);
        }
        let Some(kind) = BsonType::from_u8(type_byte) else {
            corrupt!(type_off);
        };

        let key_off = type_off + 1;
        let Some(key_len) = data[key_off..limit].iter().position(|&b| b == 0) else {
            corrupt!(key_off);
        };
        let value_off = key_off + key_len + 1;

        let (offsets, payload_len) = match kind {
            BsonType::Undefined | BsonType::Null | BsonType::MaxKey | BsonType::MinKey => {
                (Offsets::Empty, 0)
            }
            BsonType::Double | BsonType::DateTime | BsonType::Int64 | BsonType::Timestamp => {
                if value_off + 8 > limit {
                    corrupt!(value_off);
                }
                (Offsets::Fixed { d1: value_off as u32 }, 8)
            }
            BsonType::Int32 => {
                if value_off + 4 > limit {
                    corrupt!(value_off);
                }
                (Offsets::Fixed { d1: value_off as u32 }, 4)
            }
            BsonType::Bool => {
                if value_off + 1 > limit {
                    corrupt!(value_off);
                }
                (Offsets::Fixed { d1: value_off as u32 }, 1)
            }
            BsonType::ObjectId => {
                if value_off + 12 > limit {
                    corrupt!(value_off);
                }
                (Offsets::Fixed { d1: value_off as u32 }, 12)
            }
            BsonType::Utf8 | BsonType::Code | BsonType::Symbol => {
                if value_off + 4 > limit {
                    corrupt!(value_off);
                }
                let len = unsafe { read_i32_le(data, value_off) };
                if len < 1 || (value_off + 4).checked_add(len as usize).is_none_or(|e| e > limit) {
                    corrupt!(value_off);
                }
                // The wire requires the string's own NUL terminator.
                if data[value_off + 4 + len as usize - 1] != 0 {
                    corrupt!(value_off + 4 + len as usize - 1);
                }
                (
                    Offsets::Str {
                        len: value_off as u32,
                        data: (value_off + 4) as u32,
                    },
                    4 + len as usize,
                )
            }
            BsonType::Document | BsonType::Array => {
                if value_off + 4 > limit {
                    corrupt!(value_off);
                }
                let len = unsafe { read_i32_le(data, value_off) };
                if len < 5 || value_off.checked_add(len as usize).is_none_or(|e| e > limit) {
                    corrupt!(value_off);
                }
                if data[value_off + len as usize - 1] != 0 {
                    corrupt!(value_off + len as usize - 1);
                }
                (
                    Offsets::Doc {
                        start: value_off as u32,
                    },
                    len as usize,
                )
            }
            BsonType::Binary => {
                if value_off + 5 > limit {
                    corrupt!(value_off);
                }
                let len = unsafe { read_i32_le(data, value_off) };
                if len < 0 || (value_off + 5).checked_add(len as usize).is_none_or(|e| e > limit) {
                    corrupt!(value_off);
                }
                let subtype_off = value_off + 4;
                let mut data_off = value_off + 5;
                if data[subtype_off] == 0x02 {
                    // Legacy subtype: extra inner int32 length prefix.
                    if len < 4 {
                        corrupt!(value_off);
                    }
                    let inner = unsafe { read_i32_le(data, data_off) };
                    if inner != len - 4 {
                        corrupt!(data_off);
                    }
                    data_off += 4;
                }
                (
                    Offsets::Binary {
                        len: value_off as u32,
                        subtype: subtype_off as u32,
                        data: data_off as u32,
                    },
                    5 + len as usize,
                )
            }
            BsonType::Regex => {
                let Some(pattern_len) = data[value_off..limit].iter().position(|&b| b == 0)
                else {
                    corrupt!(value_off);
                };
                let options_off = value_off + pattern_len + 1;
                let Some(options_len) = data[options_off..limit].iter().position(|&b| b == 0)
                else {
                    corrupt!(options_off);
                };
                (
                    Offsets::Regex {
                        pattern: value_off as u32,
                        options: options_off as u32,
                    },
                    pattern_len + 1 + options_len + 1,
                )
            }
            BsonType::DbPointer => {
                if value_off + 4 > limit {
                    corrupt!(value_off);
                }
                let len = unsafe { read_i32_le(data, value_off) };
                if len < 1
                    || (value_off + 4)
                        .checked_add(len as usize + 12)
                        .is_none_or(|e| e > limit)
                {
                    corrupt!(value_off);
                }
                if data[value_off + 4 + len as usize - 1] != 0 {
                    corrupt!(value_off + 4 + len as usize - 1);
                }
                (
                    Offsets::DbPointer {
                        len: value_off as u32,
                        collection: (value_off + 4) as u32,
                        oid: (value_off + 4 + len as usize) as u32,
                    },
                    4 + len as usize + 12,
                )
            }
            BsonType::CodeWithScope => {
                if value_off + 4 > limit {
                    corrupt!(value_off);
                }
                let total = unsafe { read_i32_le(data, value_off) };
                // Smallest possible: two int32s, a one-byte code string, an
                // empty scope document.
                if total < 14 || value_off.checked_add(total as usize).is_none_or(|e| e > limit) {
                    corrupt!(value_off);
                }
                let code_len_off = value_off + 4;
                let code_len = unsafe { read_i32_le(data, code_len_off) };
                let code_off = value_off + 8;
                if code_len < 1 || code_len as usize > total as usize - 13 {
                    corrupt!(code_len_off);
                }
                if data[code_off + code_len as usize - 1] != 0 {
                    corrupt!(code_off + code_len as usize - 1);
                }
                let scope_off = code_off + code_len as usize;
                let scope_len = unsafe { read_i32_le(data, scope_off) };
                if scope_len < 5 || 8 + code_len as i64 + scope_len as i64 != total as i64 {
                    corrupt!(scope_off);
                }
                if data[scope_off + scope_len as usize - 1] != 0 {
                    corrupt!(scope_off + scope_len as usize - 1);
                }
                (
                    Offsets::CodeScope {
                        total: value_off as u32,
                        code_len: code_len_off as u32,
                        code: code_off as u32,
                        scope: scope_off as u32,
                    },
                    total as usize,
                )
            }
            BsonType::EndOfDocument => corrupt!(type_off),
        };

        let next_off = value_off + payload_len;
        if next_off > limit {
            corrupt!(value_off);
        }
        self.off = next_off as u32;

        Some(Ok(Field {
            data,
            kind,
            type_off: type_off as u32,
            key_off: key_off as u32,
            key_len: key_len as u32,
            offsets,
        }))
    }
}

impl<'doc> Iterator for Iter<'doc> {
    type Item = Result<Field<'doc>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.step()
    }
}
