//! zconv - Convert between XML, JSON and CSV
//!
//! Every format is decoded into a generic [`Node`] tree and encoded from it.
//!
//! # Quick Start
//!
//! ```
//! use zconv::{convert, Format};
//! # fn main() -> Result<(), zconv::Error> {
//! let json = convert(
//!     r#"<book id="7"><title>Dune</title><tag>a</tag><tag>b</tag></book>"#,
//!     Format::Xml,
//!     Format::Json,
//! )?;
//! assert_eq!(
//!     json,
//!     r#"{"@attributes":{"id":"7"},"title":"Dune","tag":["a","b"]}"#
//! );
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Error, ErrorKind, Pos, Result, Span};

pub mod node;
pub use node::{Array, Node, Object, ATTRIBUTES_KEY, VALUE_KEY, XML_ERROR_KEY};

pub mod lexer;

pub mod csv;
pub mod json;
pub mod xml;
pub use csv::CsvConfig;
pub use json::JsonConfig;
pub use xml::{Decoded, XmlConfig};

pub mod convert;
pub use convert::{convert, convert_with_options, detect_format_from_path, ConvertOptions, Format};

pub mod store;
pub use store::{FileStore, FsStore};

pub mod facade;
pub use facade::Converter;
