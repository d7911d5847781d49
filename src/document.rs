use crate::{
    BsonType, Error, Field, GrowFn, Iter, MAX_DOCUMENT_SIZE, Result,
    buffer::{Store, default_grow},
    cold_path,
    util::read_u32_le,
};

#[cfg(feature = "shared")]
use bytes::Bytes;

/// Reads the 4-byte little-endian length prefix of a document buffer.
///
/// This is the whole contract stream readers need: peek four bytes, learn
/// how many more form one document. Returns `None` if fewer than four
/// bytes are present.
#[inline]
pub fn peek_length(data: &[u8]) -> Option<u32> {
    if data.len() < 4 {
        return None;
    }
    Some(unsafe { read_u32_le(data, 0) })
}

/// An owned BSON document.
///
/// Starts as a 5-byte empty skeleton in inline storage and moves to the
/// heap the first time it outgrows 120 bytes. All mutation goes through
/// the typed `append_*` methods and the `begin_*`/`end` nesting protocol;
/// every successful mutation leaves the buffer a complete, well-formed
/// document (length header exact, trailing NUL in place), and every failed
/// one leaves it byte-for-byte untouched.
pub struct Document {
    pub(crate) store: Store,
    pub(crate) grow: GrowFn,
}

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Document {
            store: Store::new_empty(),
            grow: default_grow,
        }
    }

    /// Creates an empty document with an injected grow function, called
    /// whenever the heap buffer needs more capacity.
    pub fn with_grow(grow: GrowFn) -> Self {
        Document {
            store: Store::new_empty(),
            grow,
        }
    }

    /// Takes ownership of an existing document buffer after verifying its
    /// framing (length header, size ceiling, trailing NUL). The document
    /// is mutable; element payloads are checked lazily during iteration.
    pub fn from_vec(data: Vec<u8>) -> Result<Self> {
        check_frame(&data)?;
        Ok(Document {
            store: Store::Heap(data),
            grow: default_grow,
        })
    }

    /// Wraps shared bytes as a read-only document. Every mutating call on
    /// the result fails with [`Error::ReadOnly`].
    #[cfg(feature = "shared")]
    pub fn from_shared(data: Bytes) -> Result<Self> {
        check_frame(&data)?;
        Ok(Document {
            store: Store::Shared(data),
            grow: default_grow,
        })
    }

    /// The document's bytes, header and trailing NUL included.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.store.as_slice()
    }

    /// Total byte length, always equal to the length header.
    #[inline]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// `true` if the document holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.store.len() == crate::EMPTY_DOCUMENT_LEN
    }

    /// Current storage capacity in bytes (120 while inline).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    /// `true` for shared/static documents, which reject all mutation.
    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.store.is_read_only()
    }

    /// Resets to the empty document. Fails on a read-only document.
    pub fn clear(&mut self) -> Result<()> {
        if self.store.is_read_only() {
            return Err(Error::ReadOnly);
        }
        self.store = Store::new_empty();
        Ok(())
    }

    /// An iterator over the document's fields.
    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        Iter::trusted(self.as_bytes())
    }

    /// Finds the first field with the given key, walking from the start.
    /// Returns `None` if the key is absent or the document is corrupt.
    pub fn get(&self, key: &str) -> Option<Field<'_>> {
        self.iter()
            .filter_map(|field| field.ok())
            .find(|field| field.key_bytes() == key.as_bytes())
    }

    /// Consumes the document, returning the underlying buffer.
    pub fn into_vec(self) -> Vec<u8> {
        self.store.into_vec()
    }
}

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}

impl Clone for Document {
    fn clone(&self) -> Self {
        match &self.store {
            Store::Inline { len, buf } => Document {
                store: Store::Inline {
                    len: *len,
                    buf: *buf,
                },
                grow: self.grow,
            },
            Store::Heap(vec) => Document {
                store: Store::Heap(vec.clone()),
                grow: self.grow,
            },
            #[cfg(feature = "shared")]
            Store::Shared(bytes) => Document {
                store: Store::Shared(bytes.clone()),
                grow: self.grow,
            },
        }
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for Document {}

impl std::fmt::Debug for Document {
    fn fmt(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter
            .debug_struct("Document")
            .field("len", &self.len())
            .finish()
    }
}

/// A borrowed, read-only view over a document byte buffer.
#[derive(Clone, Copy)]
pub struct DocRef<'a> {
    data: &'a [u8],
}

impl<'a> DocRef<'a> {
    /// Verifies the buffer's framing and wraps it.
    pub fn from_slice(data: &'a [u8]) -> Result<Self> {
        check_frame(data)?;
        Ok(DocRef { data })
    }

    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.len() == crate::EMPTY_DOCUMENT_LEN
    }

    #[inline]
    pub fn iter(&self) -> Iter<'a> {
        Iter::trusted(self.data)
    }

    pub fn get(&self, key: &str) -> Option<Field<'a>> {
        self.iter()
            .filter_map(|field| field.ok())
            .find(|field| field.key_bytes() == key.as_bytes())
    }
}

fn check_frame(data: &[u8]) -> Result<()> {
    if data.len() < crate::EMPTY_DOCUMENT_LEN || data.len() > MAX_DOCUMENT_SIZE {
        cold_path();
        return Err(Error::Corrupt(0));
    }
    let header = unsafe { read_u32_le(data, 0) };
    if header as usize != data.len() {
        cold_path();
        return Err(Error::Corrupt(0));
    }
    if data[data.len() - 1] != 0 {
        cold_path();
        return Err(Error::Corrupt(data.len() as u32 - 1));
    }
    Ok(())
}

/// A document or array under construction inside its parent's buffer.
///
/// Returned by `begin_document`/`begin_array`; writes land in the root
/// document's storage at an offset, so there is no copy at `end`. The
/// mutable borrow it holds is what enforces "at most one open child" and
/// "no parent mutation while a child is open": both are compile errors
/// rather than runtime corruption.
///
/// [`Child::end`] completes the element and repatches the parent's length
/// header. Dropping a `Child` without calling `end` rolls the whole
/// element back instead, leaving the parent as if `begin` was never
/// called.
pub struct Child<'a> {
    pub(crate) store: &'a mut Store,
    pub(crate) grow: GrowFn,
    /// Offset of this child's 4-byte length header.
    pub(crate) base: usize,
    /// Offset of the element's type byte (rollback needs it).
    pub(crate) elem_off: usize,
    /// Offset of the parent's length header.
    pub(crate) parent_base: usize,
    /// Nesting depth; children of the root are at depth 1.
    pub(crate) depth: usize,
}

impl Child<'_> {
    /// This child's current byte length, header and trailing NUL included.
    #[inline]
    pub fn len(&self) -> usize {
        unsafe { read_u32_le(self.store.as_slice(), self.base) as usize }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == crate::EMPTY_DOCUMENT_LEN
    }

    /// The element type this child closes as: Array if opened by
    /// `begin_array`, Document otherwise.
    #[inline]
    pub fn bson_type(&self) -> BsonType {
        match self.store.as_slice()[self.elem_off] {
            0x04 => BsonType::Array,
            _ => BsonType::Document,
        }
    }

    /// Completes the element: adds this child's length (minus the 5-byte
    /// placeholder the parent already counted at `begin`) to the parent's
    /// length header.
    pub fn end(self) {
        let child_len = self.len();
        let parent_len =
            unsafe { read_u32_le(self.store.as_slice(), self.parent_base) as usize };
        let patched = parent_len + child_len - crate::EMPTY_DOCUMENT_LEN;
        write_len(self.store, self.parent_base, patched);
        std::mem::forget(self);
    }
}

impl Drop for Child<'_> {
    fn drop(&mut self) {
        // Abandoned child: remove the element entirely and undo the
        // length the parent gained at begin.
        let parent_len =
            unsafe { read_u32_le(self.store.as_slice(), self.parent_base) as usize };
        let undone = parent_len - (self.base - self.elem_off) - crate::EMPTY_DOCUMENT_LEN;
        write_len(self.store, self.parent_base, undone);

        // The element sits last, followed by one trailing NUL per
        // ancestor level; truncate it away and restore those NULs.
        let ancestors = self.depth;
        self.store.truncate(self.elem_off + ancestors);
        let slice = self.store.as_mut_slice();
        let len = slice.len();
        slice[len - ancestors..].fill(0);
    }
}

pub(crate) fn write_len(store: &mut Store, base: usize, len: usize) {
    let bytes = crate::util::u32_le(len as u32);
    store.as_mut_slice()[base..base + 4].copy_from_slice(&bytes);
}
