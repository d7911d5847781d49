use std::collections::TryReserveError;

#[cfg(feature = "shared")]
use bytes::Bytes;

use crate::{Error, MAX_DOCUMENT_SIZE, Result, cold_path, util::EMPTY_DOCUMENT};

/// Inline storage payload, matching the 120 bytes a stack document can
/// hold before its first heap allocation.
pub(crate) const INLINE_CAP: usize = 120;

/// Grow hook threaded through document construction.
///
/// Called with the heap buffer and the additional capacity needed; the
/// default is [`default_grow`]. A failure surfaces as [`Error::Alloc`]
/// and leaves the document unmodified.
pub type GrowFn = fn(&mut Vec<u8>, usize) -> std::result::Result<(), TryReserveError>;

/// The default [`GrowFn`]: `Vec::try_reserve_exact`.
pub fn default_grow(
    buf: &mut Vec<u8>,
    additional: usize,
) -> std::result::Result<(), TryReserveError> {
    buf.try_reserve_exact(additional)
}

/// Backing storage for one document tree.
///
/// A document starts `Inline` and is promoted to `Heap` exactly once, the
/// first time 120 bytes would be exceeded. Children of a document write
/// into the same store through their root. `Shared` is the read-only
/// borrowed/static form; every mutation path checks for it up front.
pub(crate) enum Store {
    Inline { len: u8, buf: [u8; INLINE_CAP] },
    Heap(Vec<u8>),
    #[cfg(feature = "shared")]
    Shared(Bytes),
}

impl Store {
    pub(crate) fn new_empty() -> Self {
        let mut buf = [0u8; INLINE_CAP];
        buf[..EMPTY_DOCUMENT.len()].copy_from_slice(&EMPTY_DOCUMENT);
        Store::Inline {
            len: EMPTY_DOCUMENT.len() as u8,
            buf,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        match self {
            Store::Inline { len, .. } => *len as usize,
            Store::Heap(vec) => vec.len(),
            #[cfg(feature = "shared")]
            Store::Shared(bytes) => bytes.len(),
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        match self {
            Store::Inline { .. } => INLINE_CAP,
            Store::Heap(vec) => vec.capacity(),
            #[cfg(feature = "shared")]
            Store::Shared(bytes) => bytes.len(),
        }
    }

    #[inline]
    pub(crate) fn is_read_only(&self) -> bool {
        match self {
            #[cfg(feature = "shared")]
            Store::Shared(_) => true,
            _ => false,
        }
    }

    #[inline]
    pub(crate) fn as_slice(&self) -> &[u8] {
        match self {
            Store::Inline { len, buf } => &buf[..*len as usize],
            Store::Heap(vec) => vec,
            #[cfg(feature = "shared")]
            Store::Shared(bytes) => bytes,
        }
    }

    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        match self {
            Store::Inline { len, buf } => &mut buf[..*len as usize],
            Store::Heap(vec) => vec,
            #[cfg(feature = "shared")]
            // Callers check is_read_only before taking any mutable path.
            Store::Shared(_) => unreachable!("mutable access to a shared store"),
        }
    }

    /// Makes room for `additional` more bytes, growing by doubling to the
    /// next power of two. Fails without touching the buffer if the new
    /// total would cross 2^31 - 1 or the grow hook reports failure.
    pub(crate) fn ensure_capacity(&mut self, additional: usize, grow: GrowFn) -> Result<()> {
        let needed = self.len() + additional;
        if needed > MAX_DOCUMENT_SIZE {
            cold_path();
            return Err(Error::TooLarge(needed));
        }
        match self {
            Store::Inline { len, buf } => {
                if needed <= INLINE_CAP {
                    return Ok(());
                }
                // One-time promotion to the heap.
                let target = needed.next_power_of_two();
                let mut vec = Vec::new();
                grow(&mut vec, target)?;
                vec.extend_from_slice(&buf[..*len as usize]);
                *self = Store::Heap(vec);
                Ok(())
            }
            Store::Heap(vec) => {
                if needed <= vec.capacity() {
                    return Ok(());
                }
                let target = needed.next_power_of_two();
                grow(vec, target - vec.len())?;
                Ok(())
            }
            #[cfg(feature = "shared")]
            Store::Shared(_) => Err(Error::ReadOnly),
        }
    }

    /// Appends `n` zero bytes. Capacity must already be ensured.
    #[inline]
    pub(crate) fn extend_zeroed(&mut self, n: usize) {
        match self {
            Store::Inline { len, buf } => {
                buf[*len as usize..*len as usize + n].fill(0);
                *len += n as u8;
            }
            Store::Heap(vec) => vec.resize(vec.len() + n, 0),
            #[cfg(feature = "shared")]
            Store::Shared(_) => unreachable!("mutable access to a shared store"),
        }
    }

    #[inline]
    pub(crate) fn truncate(&mut self, new_len: usize) {
        match self {
            Store::Inline { len, .. } => *len = new_len as u8,
            Store::Heap(vec) => vec.truncate(new_len),
            #[cfg(feature = "shared")]
            Store::Shared(_) => unreachable!("mutable access to a shared store"),
        }
    }

    pub(crate) fn into_vec(self) -> Vec<u8> {
        match self {
            Store::Inline { len, buf } => buf[..len as usize].to_vec(),
            Store::Heap(vec) => vec,
            #[cfg(feature = "shared")]
            Store::Shared(bytes) => bytes.to_vec(),
        }
    }
}
