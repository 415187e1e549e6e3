//! Structural document tree
//!
//! The tree a markdown source converts into: a flat sequence of block
//! nodes, each holding nested blocks or inline spans. Two documents are
//! structurally equal exactly when they compare equal, so conversion laws
//! are stated directly over `==`.

// Submodules
mod blocks;
mod spans;
mod types;
mod walk;

// Re-export public types
pub use blocks::{Block, ListItem, TableCell, TableRow};
pub use spans::{plain_text, MarkState, Marks, Span};
pub use types::Alignment;
pub use walk::{collect_text_units, TextUnit};

/// A parsed document: an ordered sequence of block nodes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Top-level blocks in source order
    pub blocks: Vec<Block>,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    /// Visit every heading in document order
    ///
    /// Headings nested inside block quotes and list items are visited at
    /// the point they occur; table cells cannot hold headings.
    ///
    /// # Parameters
    /// * `visit` - called with the heading's level, id, and spans
    pub fn for_each_heading<F>(&self, visit: &mut F)
    where
        F: FnMut(u8, &str, &[Span]),
    {
        visit_headings(&self.blocks, visit);
    }
}

fn visit_headings<F>(blocks: &[Block], visit: &mut F)
where
    F: FnMut(u8, &str, &[Span]),
{
    for block in blocks {
        match block {
            Block::Heading {
                level, id, spans, ..
            } => visit(*level, id, spans),
            Block::BlockQuote { children } => visit_headings(children, visit),
            Block::BulletList { items } | Block::OrderedList { items, .. } => {
                for item in items {
                    visit_headings(&item.children, visit);
                }
            }
            _ => {}
        }
    }
}
