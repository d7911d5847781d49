use std::fmt;

/// A 12-byte BSON ObjectId, treated as opaque bytes.
///
/// Generation, machine ids and counters live outside this crate; the
/// document engine only moves the 12 bytes in and out of the wire format.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Oid([u8; 12]);

impl Oid {
    #[inline]
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Oid(bytes)
    }

    #[inline]
    pub const fn bytes(&self) -> &[u8; 12] {
        &self.0
    }
}

impl From<[u8; 12]> for Oid {
    #[inline]
    fn from(bytes: [u8; 12]) -> Self {
        Oid(bytes)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        for byte in self.0 {
            write!(formatter, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "Oid({self})")
    }
}
