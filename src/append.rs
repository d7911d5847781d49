//! The typed append surface shared by [`Document`] and [`Child`].
//!
//! Every element is written as `[type][key][NUL][payload]` at the end of
//! the active document, after which the active length header is repatched;
//! the buffer's final byte stays 0x00 throughout. Payloads are fully
//! encoded and capacity reserved before any byte lands, so a failed append
//! leaves the document byte-for-byte unchanged.

use crate::{
    BinarySubtype, Child, Document, Error, GrowFn, MAX_DOCUMENT_SIZE, Oid, Result,
    buffer::Store,
    util::{EMPTY_DOCUMENT, f64_le, i32_le, i64_le, read_u32_le, u32_le, u64_le},
};

#[inline]
fn check_key(key: &str) -> Result<()> {
    if key.bytes().any(|b| b == 0) {
        return Err(Error::EmbeddedNul);
    }
    Ok(())
}

#[inline]
fn check_cstring(value: &str) -> Result<()> {
    if value.bytes().any(|b| b == 0) {
        return Err(Error::EmbeddedNul);
    }
    Ok(())
}

/// Guards int32 length prefixes before any encoding happens.
#[inline]
fn check_value_len(len: usize) -> Result<()> {
    if len >= MAX_DOCUMENT_SIZE {
        return Err(Error::TooLarge(len));
    }
    Ok(())
}

/// Writes one element's parts at the end of the active document and bumps
/// its length header.
///
/// The active document's elements end `depth + 1` bytes before the end of
/// the physical buffer: its own trailing NUL plus one reserved NUL per
/// ancestor. All of those are zero, so insertion is a plain extend plus a
/// copy, no shifting.
pub(crate) fn raw_append(
    store: &mut Store,
    grow: GrowFn,
    base: usize,
    depth: usize,
    parts: &[&[u8]],
) -> Result<()> {
    if store.is_read_only() {
        return Err(Error::ReadOnly);
    }
    let total: usize = parts.iter().map(|part| part.len()).sum();
    store.ensure_capacity(total, grow)?;

    // Nothing past this point can fail.
    let insert = store.len() - (depth + 1);
    store.extend_zeroed(total);
    let buf = store.as_mut_slice();
    let mut at = insert;
    for part in parts {
        buf[at..at + part.len()].copy_from_slice(part);
        at += part.len();
    }

    let len = unsafe { read_u32_le(buf, base) } + total as u32;
    buf[base..base + 4].copy_from_slice(&u32_le(len));
    Ok(())
}

/// Reserves a `[type][key][NUL][empty document]` element and returns the
/// offsets a [`Child`] needs: its length header and its type byte.
pub(crate) fn raw_begin(
    store: &mut Store,
    grow: GrowFn,
    base: usize,
    depth: usize,
    key: &str,
    type_byte: u8,
) -> Result<(usize, usize)> {
    check_key(key)?;
    let elem_off = store.len() - (depth + 1);
    raw_append(
        store,
        grow,
        base,
        depth,
        &[&[type_byte], key.as_bytes(), &[0], &EMPTY_DOCUMENT],
    )?;
    Ok((elem_off + 1 + key.len() + 1, elem_off))
}

macro_rules! append_methods {
    () => {
        /// Appends an IEEE-754 double, stored little-endian.
        pub fn append_double(&mut self, key: &str, value: f64) -> Result<()> {
            check_key(key)?;
            let payload = f64_le(value);
            let (store, grow, base, depth) = self.frame();
            raw_append(store, grow, base, depth, &[&[0x01], key.as_bytes(), &[0], &payload])
        }

        /// Appends a UTF-8 string. Embedded NUL bytes are allowed here:
        /// the value is length-prefixed, not NUL-delimited.
        pub fn append_utf8(&mut self, key: &str, value: &str) -> Result<()> {
            check_key(key)?;
            check_value_len(value.len())?;
            let prefix = i32_le(value.len() as i32 + 1);
            let (store, grow, base, depth) = self.frame();
            raw_append(
                store,
                grow,
                base,
                depth,
                &[&[0x02], key.as_bytes(), &[0], &prefix, value.as_bytes(), &[0]],
            )
        }

        /// Appends a complete document as an embedded sub-document.
        pub fn append_document(&mut self, key: &str, value: &Document) -> Result<()> {
            check_key(key)?;
            let (store, grow, base, depth) = self.frame();
            raw_append(store, grow, base, depth, &[&[0x03], key.as_bytes(), &[0], value.as_bytes()])
        }

        /// Appends a complete document as an embedded array. The caller is
        /// responsible for the "0", "1", ... key convention inside it.
        pub fn append_array(&mut self, key: &str, value: &Document) -> Result<()> {
            check_key(key)?;
            let (store, grow, base, depth) = self.frame();
            raw_append(store, grow, base, depth, &[&[0x04], key.as_bytes(), &[0], value.as_bytes()])
        }

        /// Appends a binary payload. The legacy
        /// [`BinarySubtype::BinaryOld`] form gets its extra inner length
        /// prefix, as the wire demands.
        pub fn append_binary(
            &mut self,
            key: &str,
            subtype: BinarySubtype,
            value: &[u8],
        ) -> Result<()> {
            check_key(key)?;
            check_value_len(value.len())?;
            let sub = [u8::from(subtype)];
            let (store, grow, base, depth) = self.frame();
            if sub[0] == 0x02 {
                let outer = i32_le(value.len() as i32 + 4);
                let inner = i32_le(value.len() as i32);
                raw_append(
                    store,
                    grow,
                    base,
                    depth,
                    &[&[0x05], key.as_bytes(), &[0], &outer, &sub, &inner, value],
                )
            } else {
                let prefix = i32_le(value.len() as i32);
                raw_append(
                    store,
                    grow,
                    base,
                    depth,
                    &[&[0x05], key.as_bytes(), &[0], &prefix, &sub, value],
                )
            }
        }

        pub fn append_undefined(&mut self, key: &str) -> Result<()> {
            check_key(key)?;
            let (store, grow, base, depth) = self.frame();
            raw_append(store, grow, base, depth, &[&[0x06], key.as_bytes(), &[0]])
        }

        /// Appends a 12-byte ObjectId, copied verbatim.
        pub fn append_oid(&mut self, key: &str, value: &Oid) -> Result<()> {
            check_key(key)?;
            let (store, grow, base, depth) = self.frame();
            raw_append(store, grow, base, depth, &[&[0x07], key.as_bytes(), &[0], value.bytes()])
        }

        pub fn append_bool(&mut self, key: &str, value: bool) -> Result<()> {
            check_key(key)?;
            let (store, grow, base, depth) = self.frame();
            raw_append(store, grow, base, depth, &[&[0x08], key.as_bytes(), &[0], &[value as u8]])
        }

        /// Appends a UTC datetime in milliseconds since the UNIX epoch.
        pub fn append_date_time(&mut self, key: &str, millis: i64) -> Result<()> {
            check_key(key)?;
            let payload = i64_le(millis);
            let (store, grow, base, depth) = self.frame();
            raw_append(store, grow, base, depth, &[&[0x09], key.as_bytes(), &[0], &payload])
        }

        pub fn append_null(&mut self, key: &str) -> Result<()> {
            check_key(key)?;
            let (store, grow, base, depth) = self.frame();
            raw_append(store, grow, base, depth, &[&[0x0A], key.as_bytes(), &[0]])
        }

        /// Appends a regular expression. Pattern and options are cstrings
        /// on the wire, so embedded NUL bytes are rejected.
        pub fn append_regex(&mut self, key: &str, pattern: &str, options: &str) -> Result<()> {
            check_key(key)?;
            check_cstring(pattern)?;
            check_cstring(options)?;
            let (store, grow, base, depth) = self.frame();
            raw_append(
                store,
                grow,
                base,
                depth,
                &[
                    &[0x0B],
                    key.as_bytes(),
                    &[0],
                    pattern.as_bytes(),
                    &[0],
                    options.as_bytes(),
                    &[0],
                ],
            )
        }

        pub fn append_dbpointer(&mut self, key: &str, collection: &str, oid: &Oid) -> Result<()> {
            check_key(key)?;
            check_cstring(collection)?;
            check_value_len(collection.len())?;
            let prefix = i32_le(collection.len() as i32 + 1);
            let (store, grow, base, depth) = self.frame();
            raw_append(
                store,
                grow,
                base,
                depth,
                &[
                    &[0x0C],
                    key.as_bytes(),
                    &[0],
                    &prefix,
                    collection.as_bytes(),
                    &[0],
                    oid.bytes(),
                ],
            )
        }

        pub fn append_code(&mut self, key: &str, code: &str) -> Result<()> {
            check_key(key)?;
            check_value_len(code.len())?;
            let prefix = i32_le(code.len() as i32 + 1);
            let (store, grow, base, depth) = self.frame();
            raw_append(
                store,
                grow,
                base,
                depth,
                &[&[0x0D], key.as_bytes(), &[0], &prefix, code.as_bytes(), &[0]],
            )
        }

        pub fn append_symbol(&mut self, key: &str, symbol: &str) -> Result<()> {
            check_key(key)?;
            check_value_len(symbol.len())?;
            let prefix = i32_le(symbol.len() as i32 + 1);
            let (store, grow, base, depth) = self.frame();
            raw_append(
                store,
                grow,
                base,
                depth,
                &[&[0x0E], key.as_bytes(), &[0], &prefix, symbol.as_bytes(), &[0]],
            )
        }

        /// Appends JavaScript code with its scope document. The payload's
        /// four chained length fields are computed here and verified again
        /// on decode.
        pub fn append_code_with_scope(
            &mut self,
            key: &str,
            code: &str,
            scope: &Document,
        ) -> Result<()> {
            check_key(key)?;
            check_value_len(code.len())?;
            let total = 4 + 4 + code.len() + 1 + scope.len();
            check_value_len(total)?;
            let total_prefix = i32_le(total as i32);
            let code_prefix = i32_le(code.len() as i32 + 1);
            let (store, grow, base, depth) = self.frame();
            raw_append(
                store,
                grow,
                base,
                depth,
                &[
                    &[0x0F],
                    key.as_bytes(),
                    &[0],
                    &total_prefix,
                    &code_prefix,
                    code.as_bytes(),
                    &[0],
                    scope.as_bytes(),
                ],
            )
        }

        pub fn append_int32(&mut self, key: &str, value: i32) -> Result<()> {
            check_key(key)?;
            let payload = i32_le(value);
            let (store, grow, base, depth) = self.frame();
            raw_append(store, grow, base, depth, &[&[0x10], key.as_bytes(), &[0], &payload])
        }

        /// Appends an internal timestamp: increment in the low 4 bytes,
        /// time in the high 4.
        pub fn append_timestamp(&mut self, key: &str, time: u32, increment: u32) -> Result<()> {
            check_key(key)?;
            let payload = u64_le(((time as u64) << 32) | increment as u64);
            let (store, grow, base, depth) = self.frame();
            raw_append(store, grow, base, depth, &[&[0x11], key.as_bytes(), &[0], &payload])
        }

        pub fn append_int64(&mut self, key: &str, value: i64) -> Result<()> {
            check_key(key)?;
            let payload = i64_le(value);
            let (store, grow, base, depth) = self.frame();
            raw_append(store, grow, base, depth, &[&[0x12], key.as_bytes(), &[0], &payload])
        }

        pub fn append_maxkey(&mut self, key: &str) -> Result<()> {
            check_key(key)?;
            let (store, grow, base, depth) = self.frame();
            raw_append(store, grow, base, depth, &[&[0x7F], key.as_bytes(), &[0]])
        }

        pub fn append_minkey(&mut self, key: &str) -> Result<()> {
            check_key(key)?;
            let (store, grow, base, depth) = self.frame();
            raw_append(store, grow, base, depth, &[&[0xFF], key.as_bytes(), &[0]])
        }

        /// Opens a sub-document element. Writes go into the same backing
        /// storage; the returned [`Child`] mutably borrows this document
        /// until [`Child::end`] (or a rollback drop).
        pub fn begin_document(&mut self, key: &str) -> Result<Child<'_>> {
            let (store, grow, base, depth) = self.frame();
            let (child_base, elem_off) = raw_begin(store, grow, base, depth, key, 0x03)?;
            Ok(Child {
                store,
                grow,
                base: child_base,
                elem_off,
                parent_base: base,
                depth: depth + 1,
            })
        }

        /// Opens an array element. Identical to [`begin_document`] on the
        /// wire except for the type byte; the caller supplies the "0",
        /// "1", ... index keys.
        ///
        /// [`begin_document`]: Self::begin_document
        pub fn begin_array(&mut self, key: &str) -> Result<Child<'_>> {
            let (store, grow, base, depth) = self.frame();
            let (child_base, elem_off) = raw_begin(store, grow, base, depth, key, 0x04)?;
            Ok(Child {
                store,
                grow,
                base: child_base,
                elem_off,
                parent_base: base,
                depth: depth + 1,
            })
        }
    };
}

impl Document {
    #[inline]
    fn frame(&mut self) -> (&mut Store, GrowFn, usize, usize) {
        (&mut self.store, self.grow, 0, 0)
    }

    append_methods!();
}

impl Child<'_> {
    #[inline]
    fn frame(&mut self) -> (&mut Store, GrowFn, usize, usize) {
        (&mut *self.store, self.grow, self.base, self.depth)
    }

    append_methods!();
}
