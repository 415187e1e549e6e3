//! Heading outline
//!
//! Collects the headings of a document and nests them by level: each
//! heading becomes a child of the nearest preceding heading with a
//! smaller level, and everything else becomes a root. Levels may skip
//! (an h3 directly under an h1 is fine) and never produce phantom nodes.

use crate::document::{plain_text, Document};
use crate::markdown;
use serde::Serialize;

/// One heading in the outline tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineNode {
    /// Heading level, 1 through 6
    pub depth: u8,
    /// Heading text with all formatting stripped
    pub text: String,
    /// Anchor id assigned during parsing, unique within the document
    pub id: String,
    /// Headings ruled by this one, in source order
    pub children: Vec<OutlineNode>,
}

/// Build the outline of a markdown source
pub fn outline(source: &str) -> Vec<OutlineNode> {
    document_outline(&markdown::parse(source))
}

/// Build the outline of an already parsed document
pub fn document_outline(document: &Document) -> Vec<OutlineNode> {
    let mut flat = Vec::new();
    document.for_each_heading(&mut |depth, id, spans| {
        flat.push(OutlineNode {
            depth,
            text: plain_text(spans),
            id: id.to_string(),
            children: Vec::new(),
        });
    });
    nest(flat)
}

fn nest(flat: Vec<OutlineNode>) -> Vec<OutlineNode> {
    let mut roots = Vec::new();
    let mut stack: Vec<OutlineNode> = Vec::new();
    for node in flat {
        // A heading closes every open heading at its level or deeper.
        while stack.last().is_some_and(|top| top.depth >= node.depth) {
            let Some(finished) = stack.pop() else {
                break;
            };
            attach(&mut roots, &mut stack, finished);
        }
        stack.push(node);
    }
    while let Some(finished) = stack.pop() {
        attach(&mut roots, &mut stack, finished);
    }
    roots
}

fn attach(roots: &mut Vec<OutlineNode>, stack: &mut [OutlineNode], finished: OutlineNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(finished),
        None => roots.push(finished),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(nodes: &[OutlineNode]) -> Vec<&str> {
        nodes.iter().map(|node| node.text.as_str()).collect()
    }

    #[test]
    fn test_outline_nests_by_level() {
        // Arrange: levels 1, 2, 3, 2, 1
        let source = "# A\n\n## B\n\n### C\n\n## D\n\n# E\n";

        // Act
        let roots = outline(source);

        // Assert: A rules B and D, B rules C, E stands alone
        assert_eq!(titles(&roots), vec!["A", "E"]);
        assert_eq!(titles(&roots[0].children), vec!["B", "D"]);
        assert_eq!(titles(&roots[0].children[0].children), vec!["C"]);
        assert!(roots[0].children[1].children.is_empty());
        assert!(roots[1].children.is_empty());
    }

    #[test]
    fn test_outline_handles_skipped_levels() {
        let roots = outline("# Top\n\n### Deep\n\n## Shallow\n");

        assert_eq!(titles(&roots), vec!["Top"]);
        assert_eq!(titles(&roots[0].children), vec!["Deep", "Shallow"]);
    }

    #[test]
    fn test_outline_starts_below_level_one() {
        // A document may open with any level; nothing is invented above it.
        let roots = outline("## First\n\n# Second\n");

        assert_eq!(titles(&roots), vec!["First", "Second"]);
        assert_eq!(roots[0].depth, 2);
        assert_eq!(roots[1].depth, 1);
    }

    #[test]
    fn test_outline_strips_formatting_and_carries_ids() {
        let roots = outline("# The **Bold** Title\n");

        assert_eq!(roots[0].text, "The Bold Title");
        assert_eq!(roots[0].id, "the-bold-title");
    }

    #[test]
    fn test_outline_of_empty_source_is_empty() {
        assert!(outline("").is_empty());
        assert!(outline("just a paragraph\n").is_empty());
    }
}
