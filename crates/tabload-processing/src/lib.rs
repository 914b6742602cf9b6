//! Tabload Processing Library
//!
//! Turns uploaded bytes into [`ParsedTable`](tabload_core::ParsedTable)s. Parsing is a pure
//! transform over the provided bytes: nothing here touches storage or the table store.

pub mod error;
pub mod tabular;
pub mod validator;

pub use error::{ParseError, ParseResult};
pub use tabular::{detect_kind, parse_table, parse_upload};
pub use validator::{UploadValidator, ValidationError};
