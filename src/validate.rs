//! Whole-document policy validation.
//!
//! Structural soundness comes from the iterator; this module layers the
//! selectable policies of `ValidateOptions` on top: UTF-8 of keys and
//! string values, `$`-key and `.`-key rejection, and recursion into
//! embedded documents, arrays and code-with-scope scopes. The first
//! violation wins and is reported with its byte offset; the input is
//! never mutated.

use std::fmt::{self, Display};

use crate::{BsonType, DocRef, Document, Error, Iter, cold_path};

/// Hard bound on validation recursion.
///
/// Matches the nesting cap used for text parsing elsewhere in the stack;
/// documents nested deeper than this fail with
/// [`ValidateFault::TooDeep`] instead of exhausting the call stack.
pub const MAX_VALIDATE_DEPTH: usize = 200;

/// Selectable validation policies, all off by default.
#[derive(Clone, Copy, Default, Debug)]
pub struct ValidateOptions {
    pub(crate) utf8: bool,
    pub(crate) utf8_allow_nul: bool,
    pub(crate) dollar_keys: bool,
    pub(crate) dot_keys: bool,
}

impl ValidateOptions {
    pub const fn new() -> Self {
        ValidateOptions {
            utf8: false,
            utf8_allow_nul: false,
            dollar_keys: false,
            dot_keys: false,
        }
    }

    /// Require keys and string-valued fields (Utf8, Code, Symbol) to be
    /// valid UTF-8.
    pub const fn utf8(mut self, on: bool) -> Self {
        self.utf8 = on;
        self
    }

    /// Tolerate embedded NUL bytes inside Utf8 values. Only meaningful
    /// together with [`utf8`](Self::utf8); keys and cstring payloads can
    /// never carry NUL.
    pub const fn utf8_allow_nul(mut self, on: bool) -> Self {
        self.utf8_allow_nul = on;
        self
    }

    /// Reject keys starting with `$`, except the DBRef shape
    /// `{$ref, $id[, $db]}` appearing in that order as the only keys of
    /// an object.
    pub const fn dollar_keys(mut self, on: bool) -> Self {
        self.dollar_keys = on;
        self
    }

    /// Reject keys containing `.`.
    pub const fn dot_keys(mut self, on: bool) -> Self {
        self.dot_keys = on;
        self
    }
}

/// What a validation run tripped over.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ValidateFault {
    /// Structural corruption reported by the iterator.
    Corrupt,
    InvalidUtf8,
    DollarKey,
    DotKey,
    /// Nesting deeper than [`MAX_VALIDATE_DEPTH`].
    TooDeep,
}

/// A failed validation: the fault and the byte offset of the violating
/// element (or of the first corrupt byte).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ValidateError {
    pub kind: ValidateFault,
    pub offset: u32,
}

impl Display for ValidateError {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        let what = match self.kind {
            ValidateFault::Corrupt => "corrupt BSON",
            ValidateFault::InvalidUtf8 => "invalid UTF-8",
            ValidateFault::DollarKey => "disallowed $-prefixed key",
            ValidateFault::DotKey => "disallowed . in key",
            ValidateFault::TooDeep => "nesting too deep",
        };
        write!(formatter, "{what} at byte offset {}", self.offset)
    }
}

impl std::error::Error for ValidateError {}

#[inline]
fn fault(kind: ValidateFault, offset: u32) -> ValidateError {
    cold_path();
    ValidateError { kind, offset }
}

fn corrupt_at(error: Error, fallback: u32) -> ValidateError {
    let offset = match error {
        Error::Corrupt(offset) => offset,
        _ => fallback,
    };
    fault(ValidateFault::Corrupt, offset)
}

impl ValidateError {
    fn offset_by(mut self, base: u32) -> Self {
        self.offset += base;
        self
    }
}

/// Validates a complete document buffer against the given policies.
pub fn validate_document(data: &[u8], options: ValidateOptions) -> Result<(), ValidateError> {
    let iter = Iter::new(data).map_err(|error| corrupt_at(error, 0))?;
    walk(iter, options, 0, 0)
}

impl Document {
    /// Validates this document against the given policies.
    pub fn validate(&self, options: ValidateOptions) -> Result<(), ValidateError> {
        walk(self.iter(), options, 0, 0)
    }
}

impl DocRef<'_> {
    /// Validates this document against the given policies.
    pub fn validate(&self, options: ValidateOptions) -> Result<(), ValidateError> {
        walk(self.iter(), options, 0, 0)
    }
}

/// Progress through the one tolerated `$`-key shape.
#[derive(Clone, Copy, PartialEq, Eq)]
enum DbRefPhase {
    /// Not a DBRef object (or nothing seen yet).
    None,
    /// `$ref` seen as the first key.
    Ref,
    /// `$id` seen right after `$ref`.
    Id,
    /// `$db` seen right after `$id`; nothing may follow.
    Db,
}

/// `base` is the byte offset of this (sub-)document within the root
/// buffer, so every reported offset is root-relative.
fn walk(
    mut iter: Iter<'_>,
    options: ValidateOptions,
    depth: usize,
    base: u32,
) -> Result<(), ValidateError> {
    let mut phase = DbRefPhase::None;
    let mut index = 0usize;

    while let Some(item) = iter.next() {
        let field = item.map_err(|error| corrupt_at(error, 0).offset_by(base))?;
        let offset = base + field.offset();
        let key = field.key_bytes();

        if options.utf8 && std::str::from_utf8(key).is_err() {
            return Err(fault(ValidateFault::InvalidUtf8, offset));
        }

        if options.dollar_keys {
            if key.first() == Some(&b'$') {
                let accepted = match (index, key) {
                    (0, b"$ref") => {
                        phase = DbRefPhase::Ref;
                        true
                    }
                    (1, b"$id") if phase == DbRefPhase::Ref => {
                        phase = DbRefPhase::Id;
                        true
                    }
                    (2, b"$db") if phase == DbRefPhase::Id => {
                        phase = DbRefPhase::Db;
                        true
                    }
                    _ => false,
                };
                if !accepted {
                    return Err(fault(ValidateFault::DollarKey, offset));
                }
            } else if phase != DbRefPhase::None {
                // A DBRef object may contain nothing but its $-keys.
                return Err(fault(ValidateFault::DollarKey, offset));
            }
        }

        if options.dot_keys && key.contains(&b'.') {
            return Err(fault(ValidateFault::DotKey, offset));
        }

        match field.bson_type() {
            kind if kind.is_string() => {
                if options.utf8 {
                    // Validated offsets make the unchecked read safe here.
                    let bytes = unsafe { field.text_unchecked() };
                    if std::str::from_utf8(bytes).is_err() {
                        return Err(fault(ValidateFault::InvalidUtf8, offset));
                    }
                    // The allow-nul escape hatch covers Utf8 values only.
                    if kind == BsonType::Utf8
                        && !options.utf8_allow_nul
                        && bytes.contains(&0)
                    {
                        return Err(fault(ValidateFault::InvalidUtf8, offset));
                    }
                }
            }
            BsonType::Document | BsonType::Array => {
                if depth + 1 > MAX_VALIDATE_DEPTH {
                    return Err(fault(ValidateFault::TooDeep, offset));
                }
                let sub = field
                    .recurse()
                    .map_err(|error| corrupt_at(error, offset))?;
                walk(sub, options, depth + 1, base + field.container_start())?;
            }
            BsonType::CodeWithScope => {
                if depth + 1 > MAX_VALIDATE_DEPTH {
                    return Err(fault(ValidateFault::TooDeep, offset));
                }
                let (_, scope) = unsafe { field.code_with_scope_unchecked() };
                let sub = Iter::new(scope).map_err(|error| corrupt_at(error, offset))?;
                walk(sub, options, depth + 1, base + field.container_start())?;
            }
            _ => {}
        }

        index += 1;
    }

    Ok(())
}
