//! notedown - Markdown document processing core
//!
//! The conversion and search engine of a markdown note editor: parses
//! markdown into a structural document tree, serializes the tree back to
//! canonical markdown, and builds heading outlines and flat-text search
//! results addressed by structural position.
//!
//! Math segments delimited by `$` pass through the round trip verbatim,
//! and headings receive stable, document-unique anchor ids.

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::pedantic))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(missing_docs))]
// Allow some pedantic lints that are too strict for this project
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod document;
pub mod markdown;
pub mod outline;
pub mod search;

// Re-export the types most callers need
pub use document::{Alignment, Block, Document, ListItem, Marks, Span, TableCell, TableRow};
pub use markdown::{parse, serialize, try_parse, ParseError};
pub use outline::{document_outline, outline, OutlineNode};
pub use search::{extract_text, find_matches, Match, Position};
