//! Statute corpus ingestion for lexrag.

pub mod parser;

pub use parser::{StatuteParser, parse_statute};
