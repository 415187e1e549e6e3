//! Block-level document elements

use super::spans::Span;
use super::types::Alignment;

/// A block-level node of the document tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A paragraph of inline spans
    Paragraph {
        /// Inline content
        spans: Vec<Span>,
        /// Horizontal alignment of the whole paragraph
        align: Alignment,
    },
    /// A heading
    Heading {
        /// Heading level, 1 through 6
        level: u8,
        /// Document-unique slug id, assigned in traversal order
        id: String,
        /// Inline content
        spans: Vec<Span>,
        /// Horizontal alignment of the whole heading
        align: Alignment,
    },
    /// A block quote containing nested blocks
    BlockQuote {
        /// Quoted blocks
        children: Vec<Block>,
    },
    /// An unordered list
    BulletList {
        /// The list entries
        items: Vec<ListItem>,
    },
    /// An ordered list
    OrderedList {
        /// Number of the first entry
        start: u64,
        /// The list entries
        items: Vec<ListItem>,
    },
    /// A code block
    CodeBlock {
        /// Language hint from the fence info string, if any
        language: Option<String>,
        /// Verbatim code content
        code: String,
    },
    /// A pipe table; the first row is the header row
    Table {
        /// All rows, header first
        rows: Vec<TableRow>,
    },
    /// A horizontal rule
    Rule,
    /// A display formula, stored as raw LaTeX without delimiters
    MathBlock {
        /// The LaTeX payload
        latex: String,
    },
}

/// A list entry holding one or more blocks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListItem {
    /// The entry's content blocks
    pub children: Vec<Block>,
}

impl ListItem {
    /// Create an empty list item
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a list item holding a single paragraph
    pub fn with_paragraph(spans: Vec<Span>) -> Self {
        Self {
            children: vec![Block::Paragraph {
                spans,
                align: Alignment::Left,
            }],
        }
    }
}

/// A table row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRow {
    /// The row's cells, left to right
    pub cells: Vec<TableCell>,
}

/// A table cell with its own text alignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCell {
    /// Inline content
    pub spans: Vec<Span>,
    /// Text alignment, copied from the cell's column
    pub align: Alignment,
}

impl TableCell {
    /// Create a cell with content and alignment
    pub fn new(spans: Vec<Span>, align: Alignment) -> Self {
        Self { spans, align }
    }

    /// Create an empty cell, used when padding ragged rows
    pub fn empty(align: Alignment) -> Self {
        Self {
            spans: Vec::new(),
            align,
        }
    }
}
