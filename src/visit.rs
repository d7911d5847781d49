use std::ops::ControlFlow;

use crate::{BinarySubtype, BsonValue, Iter, Oid, cold_path};

/// Per-type callbacks for [`Iter::visit_all`].
///
/// Every method defaults to `Continue`, so a visitor implements only the
/// types it cares about. Returning `Break` from any callback cancels the
/// walk; that is a caller decision, not an error. `visit_corrupt` fires
/// once if the walk ends in an invalid state.
#[allow(unused_variables)]
pub trait Visit {
    fn visit_double(&mut self, key: &str, value: f64) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
    fn visit_utf8(&mut self, key: &str, value: &[u8]) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
    fn visit_document(&mut self, key: &str, value: &[u8]) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
    fn visit_array(&mut self, key: &str, value: &[u8]) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
    fn visit_binary(&mut self, key: &str, subtype: BinarySubtype, value: &[u8]) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
    fn visit_undefined(&mut self, key: &str) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
    fn visit_oid(&mut self, key: &str, value: Oid) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
    fn visit_bool(&mut self, key: &str, value: bool) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
    fn visit_date_time(&mut self, key: &str, value: i64) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
    fn visit_null(&mut self, key: &str) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
    fn visit_regex(&mut self, key: &str, pattern: &[u8], options: &[u8]) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
    fn visit_dbpointer(&mut self, key: &str, collection: &[u8], oid: Oid) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
    fn visit_code(&mut self, key: &str, value: &[u8]) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
    fn visit_symbol(&mut self, key: &str, value: &[u8]) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
    fn visit_code_with_scope(&mut self, key: &str, code: &[u8], scope: &[u8]) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
    fn visit_int32(&mut self, key: &str, value: i32) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
    fn visit_timestamp(&mut self, key: &str, time: u32, increment: u32) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
    fn visit_int64(&mut self, key: &str, value: i64) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
    fn visit_maxkey(&mut self, key: &str) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
    fn visit_minkey(&mut self, key: &str) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    /// Called once when the walk ends on structural corruption, with the
    /// byte offset of the first bad byte.
    fn visit_corrupt(&mut self, offset: u32) {}
}

impl<'doc> Iter<'doc> {
    /// Drives this iterator to exhaustion, dispatching each field to the
    /// matching [`Visit`] callback.
    ///
    /// Returns `Continue(())` when every field was visited. Returns
    /// `Break(())` when a callback cancelled the walk, a key failed UTF-8
    /// validation, or the document turned out corrupt (in which case
    /// [`Visit::visit_corrupt`] has fired).
    pub fn visit_all<V: Visit>(&mut self, visitor: &mut V) -> ControlFlow<()> {
        while let Some(item) = self.next() {
            let field = match item {
                Ok(field) => field,
                Err(_) => {
                    cold_path();
                    // error_offset is always set when iteration fails.
                    visitor.visit_corrupt(self.error_offset().unwrap_or(0));
                    return ControlFlow::Break(());
                }
            };

            let Ok(key) = std::str::from_utf8(field.key_bytes()) else {
                cold_path();
                return ControlFlow::Break(());
            };

            match field.value() {
                BsonValue::Double(value) => visitor.visit_double(key, value)?,
                BsonValue::Utf8(value) => visitor.visit_utf8(key, value)?,
                BsonValue::Document(value) => visitor.visit_document(key, value)?,
                BsonValue::Array(value) => visitor.visit_array(key, value)?,
                BsonValue::Binary { subtype, bytes } => {
                    visitor.visit_binary(key, subtype, bytes)?
                }
                BsonValue::Undefined => visitor.visit_undefined(key)?,
                BsonValue::ObjectId(value) => visitor.visit_oid(key, value)?,
                BsonValue::Bool(value) => visitor.visit_bool(key, value)?,
                BsonValue::DateTime(value) => visitor.visit_date_time(key, value)?,
                BsonValue::Null => visitor.visit_null(key)?,
                BsonValue::Regex { pattern, options } => {
                    visitor.visit_regex(key, pattern, options)?
                }
                BsonValue::DbPointer { collection, oid } => {
                    visitor.visit_dbpointer(key, collection, oid)?
                }
                BsonValue::Code(value) => visitor.visit_code(key, value)?,
                BsonValue::Symbol(value) => visitor.visit_symbol(key, value)?,
                BsonValue::CodeWithScope { code, scope } => {
                    visitor.visit_code_with_scope(key, code, scope)?
                }
                BsonValue::Int32(value) => visitor.visit_int32(key, value)?,
                BsonValue::Timestamp { time, increment } => {
                    visitor.visit_timestamp(key, time, increment)?
                }
                BsonValue::Int64(value) => visitor.visit_int64(key, value)?,
                BsonValue::MaxKey => visitor.visit_maxkey(key)?,
                BsonValue::MinKey => visitor.visit_minkey(key)?,
            }
        }
        ControlFlow::Continue(())
    }
}
