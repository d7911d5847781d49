use zerocopy::byteorder::{F64, I32, I64, LittleEndian, U32, U64};

#[inline(always)]
#[cold]
pub(crate) fn cold_path() {}

/// Largest byte length a BSON document may have.
pub const MAX_DOCUMENT_SIZE: usize = i32::MAX as usize;

/// Byte length of an empty document: a 4-byte length header plus the
/// trailing NUL.
pub const EMPTY_DOCUMENT_LEN: usize = 5;

pub(crate) static EMPTY_DOCUMENT: [u8; 5] = [5, 0, 0, 0, 0];

#[inline]
pub(crate) fn u32_le(value: u32) -> [u8; 4] {
    U32::<LittleEndian>::new(value).to_bytes()
}

#[inline]
pub(crate) fn i32_le(value: i32) -> [u8; 4] {
    I32::<LittleEndian>::new(value).to_bytes()
}

#[inline]
pub(crate) fn i64_le(value: i64) -> [u8; 8] {
    I64::<LittleEndian>::new(value).to_bytes()
}

#[inline]
pub(crate) fn u64_le(value: u64) -> [u8; 8] {
    U64::<LittleEndian>::new(value).to_bytes()
}

#[inline]
pub(crate) fn f64_le(value: f64) -> [u8; 8] {
    F64::<LittleEndian>::new(value).to_bytes()
}

/// Reads a little-endian u32 at `off`.
///
/// # Safety
///
/// `off + 4 <= data.len()` must hold.
#[inline]
pub(crate) unsafe fn read_u32_le(data: &[u8], off: usize) -> u32 {
    unsafe { U32::<LittleEndian>::from_bytes(*data.as_ptr().add(off).cast()).get() }
}

/// Reads a little-endian i32 at `off`.
///
/// # Safety
///
/// `off + 4 <= data.len()` must hold.
#[inline]
pub(crate) unsafe fn read_i32_le(data: &[u8], off: usize) -> i32 {
    unsafe { I32::<LittleEndian>::from_bytes(*data.as_ptr().add(off).cast()).get() }
}

/// Reads a little-endian i64 at `off`.
///
/// # Safety
///
/// `off + 8 <= data.len()` must hold.
#[inline]
pub(crate) unsafe fn read_i64_le(data: &[u8], off: usize) -> i64 {
    unsafe { I64::<LittleEndian>::from_bytes(*data.as_ptr().add(off).cast()).get() }
}

/// Reads a little-endian u64 at `off`.
///
/// # Safety
///
/// `off + 8 <= data.len()` must hold.
#[inline]
pub(crate) unsafe fn read_u64_le(data: &[u8], off: usize) -> u64 {
    unsafe { U64::<LittleEndian>::from_bytes(*data.as_ptr().add(off).cast()).get() }
}

/// Reads a little-endian IEEE-754 double at `off`.
///
/// # Safety
///
/// `off + 8 <= data.len()` must hold.
#[inline]
pub(crate) unsafe fn read_f64_le(data: &[u8], off: usize) -> f64 {
    unsafe { F64::<LittleEndian>::from_bytes(*data.as_ptr().add(off).cast()).get() }
}
