//! Reading and writing ASN.1 values under the X.690 Basic, Canonical and
//! Distinguished Encoding Rules.
//!
//! [`decoder`] holds stateless functions that decode one value from the front
//! of a byte slice and return the number of bytes consumed. [`Reader`] wraps
//! them in a cursor. [`Writer`] builds encodings, deferring the length of
//! constructed values until their scope is closed.

pub mod charset;
pub mod compare;
pub mod decoder;
pub mod error;
pub mod length;
mod reader;
mod rules;
pub mod tag;
mod writer;

pub use charset::{Charset, encoding_for_tag};
pub use decoder::{EncodedValue, Header};
pub use error::{Error, Result};
pub use reader::{DEFAULT_UTC_TIME_TWO_DIGIT_YEAR_MAX, Reader, ReaderOptions};
pub use rules::EncodingRules;
pub use tag::{Tag, TagClass, UniversalTagNumber};
pub use writer::{ScopeKind, Writer};
