//! Depth-first text traversal
//!
//! Produces the flat text view of a document used by search: every
//! text-bearing span in left-to-right depth-first order, addressed by the
//! child-index path of its block. Inline math is opaque and contributes no
//! text; math blocks and rules are skipped entirely.

use super::blocks::Block;
use super::spans::Span;
use super::Document;

/// One text-bearing leaf visited by the flattening walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextUnit<'a> {
    /// Child-index path from the document root to the containing block;
    /// table paths include the row and cell index
    pub path: Vec<usize>,
    /// Span index within the containing block
    pub span: usize,
    /// Text contributed by this span
    pub text: &'a str,
}

/// Collect every text-bearing span in depth-first document order
pub fn collect_text_units(document: &Document) -> Vec<TextUnit<'_>> {
    let mut units = Vec::new();
    let mut path = Vec::new();
    collect_blocks(&document.blocks, &mut path, &mut units);
    units
}

fn collect_blocks<'a>(blocks: &'a [Block], path: &mut Vec<usize>, units: &mut Vec<TextUnit<'a>>) {
    for (index, block) in blocks.iter().enumerate() {
        path.push(index);
        collect_block(block, path, units);
        path.pop();
    }
}

fn collect_block<'a>(block: &'a Block, path: &mut Vec<usize>, units: &mut Vec<TextUnit<'a>>) {
    match block {
        Block::Paragraph { spans, .. } | Block::Heading { spans, .. } => {
            collect_spans(spans, path, units);
        }
        Block::BlockQuote { children } => collect_blocks(children, path, units),
        Block::BulletList { items } | Block::OrderedList { items, .. } => {
            for (index, item) in items.iter().enumerate() {
                path.push(index);
                collect_blocks(&item.children, path, units);
                path.pop();
            }
        }
        Block::CodeBlock { code, .. } => {
            units.push(TextUnit {
                path: path.clone(),
                span: 0,
                text: code,
            });
        }
        Block::Table { rows } => {
            for (row_index, row) in rows.iter().enumerate() {
                for (cell_index, cell) in row.cells.iter().enumerate() {
                    path.push(row_index);
                    path.push(cell_index);
                    collect_spans(&cell.spans, path, units);
                    path.pop();
                    path.pop();
                }
            }
        }
        Block::Rule | Block::MathBlock { .. } => {}
    }
}

fn collect_spans<'a>(spans: &'a [Span], path: &[usize], units: &mut Vec<TextUnit<'a>>) {
    for (index, span) in spans.iter().enumerate() {
        match span {
            Span::Text { text, .. } | Span::Link { text, .. } => {
                units.push(TextUnit {
                    path: path.to_vec(),
                    span: index,
                    text,
                });
            }
            Span::Math { .. } => {}
        }
    }
}
