mod append;
mod buffer;
mod document;
mod error;
mod iter;
mod oid;
mod types;
mod util;
mod validate;
mod value;
mod visit;

pub use buffer::{GrowFn, default_grow};
pub use document::{Child, DocRef, Document, peek_length};
pub use error::{Error, Result};
pub use iter::{Field, Iter};
pub use oid::Oid;
pub use types::{BinarySubtype, BsonType};
pub use util::{EMPTY_DOCUMENT_LEN, MAX_DOCUMENT_SIZE};
pub use validate::{
    MAX_VALIDATE_DEPTH, ValidateError, ValidateFault, ValidateOptions, validate_document,
};
pub use value::BsonValue;
pub use visit::Visit;

pub(crate) use util::cold_path;
