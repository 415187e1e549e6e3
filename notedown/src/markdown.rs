//! Markdown conversion
//!
//! Turns markdown source into the document tree and back. Parsing runs in
//! three stages: math segments are lifted out behind placeholder tokens,
//! the remaining source is folded into blocks, and the placeholders are
//! restored as math nodes wherever they survived. Serialization walks the
//! tree and emits canonical markdown that parses back to an equal tree.

// Submodules
mod error;
mod math;
mod parser;
mod slug;
mod writer;

// Re-export public types
pub use error::ParseError;
pub use math::{protect, restore, MathSpan, Protected};
pub use parser::{parse, try_parse};
pub use slug::{slugify, SlugTable};
pub use writer::serialize;
