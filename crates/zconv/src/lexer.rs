//! Low-level input navigation shared by the hand-written parsers

pub mod cursor;

pub use cursor::Cursor;
