//! Error types for zconv

use std::fmt;
use thiserror::Error;

/// Position in source text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pos {
    pub offset: usize,
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl Pos {
    pub const fn new(offset: usize, line: u32, col: u32) -> Self {
        Self { offset, line, col }
    }
}

/// Span representing a range in source text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub const fn new(start: Pos, end: Pos) -> Self {
        Self { start, end }
    }

    pub const fn at(pos: Pos) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub const fn empty() -> Self {
        Self::at(Pos::new(0, 0, 0))
    }
}

/// Error kind for detailed categorization
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed XML markup
    XmlParse,
    /// Malformed JSON text
    JsonParse,
    /// A node the JSON serializer rejected
    Serialize,
    /// Rows that do not fit a table, or input that is not tabular
    Shape,
    /// Failure reported by the file collaborator
    Io,
    /// A key that cannot be used as an XML tag or attribute name
    InvalidName { name: String },
    /// `@attributes` holding something other than a flat mapping
    InvalidAttributes,
    /// A reserved key holding a value of the wrong shape
    InvalidValue { key: String },
    MaxDepthExceeded { max: u16 },
    /// The facade was asked to convert a representation it does not hold
    MissingData { slot: &'static str },
    UnknownFormat,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::XmlParse => write!(f, "malformed xml"),
            Self::JsonParse => write!(f, "malformed json"),
            Self::Serialize => write!(f, "serialization failed"),
            Self::Shape => write!(f, "invalid table shape"),
            Self::Io => write!(f, "i/o failure"),
            Self::InvalidName { name } => write!(f, "invalid xml name: {name:?}"),
            Self::InvalidAttributes => write!(f, "@attributes must map names to scalars"),
            Self::InvalidValue { key } => write!(f, "invalid value for reserved key {key}"),
            Self::MaxDepthExceeded { max } => write!(f, "max depth exceeded: {max}"),
            Self::MissingData { slot } => write!(f, "no {slot} data loaded"),
            Self::UnknownFormat => write!(f, "unknown format"),
        }
    }
}

/// Main error type for zconv
#[derive(Error, Clone, Debug, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    span: Span,
    message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            span,
            message,
        }
    }

    pub fn with_message(kind: ErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    /// Error without a source location
    pub fn bare(kind: ErrorKind) -> Self {
        Self::new(kind, Span::empty())
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Create error at specific position
    pub fn at(kind: ErrorKind, message: impl Into<String>, pos: Pos) -> Self {
        Self::with_message(kind, Span::at(pos), message)
    }

    pub(crate) fn shape(message: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::Shape, Span::empty(), message)
    }

    pub(crate) fn io(message: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::Io, Span::empty(), message)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.span.start.line == 0 {
            write!(f, "{}", self.message)
        } else {
            write!(f, "error at {}: {}", self.span.start, self.message)
        }
    }
}

/// Result type alias for zconv
pub type Result<T> = std::result::Result<T, Error>;
