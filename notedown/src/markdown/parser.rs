//! Markdown to document tree conversion
//!
//! Folds the pulldown-cmark event stream into a [`Document`]. Math regions
//! are lifted out before the generic parse and restored into the finished
//! tree afterwards; heading ids are assigned last, in traversal order, so
//! the same source always yields the same ids.

use super::error::ParseError;
use super::math;
use super::slug::SlugTable;
use crate::document::{
    plain_text, Alignment, Block, Document, ListItem, MarkState, Marks, Span, TableCell, TableRow,
};
use itertools::Itertools;
use pulldown_cmark::{CodeBlockKind, Event, Options, Tag, TagEnd};

/// Parse markdown into a document tree
///
/// This never fails: an event stream the fold cannot make sense of
/// produces a document holding the raw source as one plain paragraph, so
/// caller content is never lost.
pub fn parse(markdown: &str) -> Document {
    match try_parse(markdown) {
        Ok(document) => document,
        Err(error) => {
            log::warn!("structural parse failed ({}), keeping raw text", error);
            fallback_document(markdown)
        }
    }
}

/// Parse markdown, surfacing structural errors instead of recovering
pub fn try_parse(markdown: &str) -> Result<Document, ParseError> {
    let protected = math::protect(markdown);
    let mut builder = DocumentBuilder::new();
    let md_parser = pulldown_cmark::Parser::new_ext(&protected.text, parser_options());
    for event in md_parser {
        builder.process_event(event)?;
    }
    let mut document = builder.finish()?;
    math::restore(&mut document, &protected.extracted);
    assign_heading_ids(&mut document);
    Ok(document)
}

fn parser_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH
}

fn fallback_document(markdown: &str) -> Document {
    let text = markdown.trim();
    if text.is_empty() {
        return Document::new();
    }
    Document {
        blocks: vec![Block::Paragraph {
            spans: vec![Span::text(text.to_string())],
            align: Alignment::Left,
        }],
    }
}

fn assign_heading_ids(document: &mut Document) {
    let mut slugs = SlugTable::new();
    assign_ids(&mut document.blocks, &mut slugs);
}

fn assign_ids(blocks: &mut [Block], slugs: &mut SlugTable) {
    for block in blocks {
        match block {
            Block::Heading { id, spans, .. } => *id = slugs.assign(&plain_text(spans)),
            Block::BlockQuote { children } => assign_ids(children, slugs),
            Block::BulletList { items } | Block::OrderedList { items, .. } => {
                for item in items {
                    assign_ids(&mut item.children, slugs);
                }
            }
            _ => {}
        }
    }
}

/// An open block container on the builder's stack
enum Container {
    Quote { children: Vec<Block> },
    List { start: Option<u64>, items: Vec<ListItem> },
    Item { children: Vec<Block> },
}

struct TableContext {
    alignments: Vec<Alignment>,
    rows: Vec<TableRow>,
    current_row: Vec<TableCell>,
}

struct CodeContext {
    language: Option<String>,
    code: String,
}

struct ImageContext {
    checkpoint: usize,
    url: String,
    title: String,
}

/// Folds markdown events into a document tree
///
/// Inline content accumulates in `current_spans` until the surrounding
/// block closes; open quotes, lists, and list items nest on a single
/// container stack so a finished block always attaches to the innermost
/// open container.
struct DocumentBuilder {
    formatting: MarkState,
    current_spans: Vec<Span>,
    blocks: Vec<Block>,
    containers: Vec<Container>,
    table: Option<TableContext>,
    code: Option<CodeContext>,
    heading: Option<u8>,
    html_block: Option<String>,
    images: Vec<ImageContext>,
    pending_align: Option<Alignment>,
}

impl DocumentBuilder {
    fn new() -> Self {
        Self {
            formatting: MarkState::new(),
            current_spans: Vec::new(),
            blocks: Vec::new(),
            containers: Vec::new(),
            table: None,
            code: None,
            heading: None,
            html_block: None,
            images: Vec::new(),
            pending_align: None,
        }
    }

    fn process_event(&mut self, event: Event<'_>) -> Result<(), ParseError> {
        match event {
            Event::Start(tag) => self.handle_start_tag(tag),
            Event::End(tag_end) => self.handle_end_tag(tag_end),
            Event::Text(text) => {
                self.handle_text(&text);
                Ok(())
            }
            Event::Code(code) => {
                self.handle_inline_code(&code);
                Ok(())
            }
            Event::Html(html) => {
                self.handle_block_html(&html);
                Ok(())
            }
            Event::InlineHtml(html) => {
                self.handle_inline_html(&html);
                Ok(())
            }
            // Both break kinds collapse to a single space: the tree keeps
            // paragraphs on one logical line.
            Event::SoftBreak | Event::HardBreak => {
                self.push_text(" ".to_string());
                Ok(())
            }
            Event::Rule => {
                self.flush_implicit_paragraph()?;
                self.add_block(Block::Rule)
            }
            // Emitted only with math options enabled; kept as literal text
            // for robustness since our own math pass runs instead.
            Event::InlineMath(latex) | Event::DisplayMath(latex) => {
                self.push_text(latex.to_string());
                Ok(())
            }
            Event::FootnoteReference(name) => {
                self.push_text(format!("[^{}]", name));
                Ok(())
            }
            Event::TaskListMarker(_) => Ok(()),
        }
    }

    fn handle_start_tag(&mut self, tag: Tag<'_>) -> Result<(), ParseError> {
        match tag {
            Tag::Paragraph => self.flush_implicit_paragraph(),
            Tag::Heading { level, .. } => {
                self.flush_implicit_paragraph()?;
                self.heading = Some(level as u8);
                Ok(())
            }
            Tag::BlockQuote(_) => {
                self.flush_implicit_paragraph()?;
                self.containers.push(Container::Quote {
                    children: Vec::new(),
                });
                Ok(())
            }
            Tag::CodeBlock(kind) => {
                self.flush_implicit_paragraph()?;
                let language = match kind {
                    CodeBlockKind::Fenced(info) => {
                        let info = info.trim().to_string();
                        if info.is_empty() {
                            None
                        } else {
                            Some(info)
                        }
                    }
                    CodeBlockKind::Indented => None,
                };
                self.code = Some(CodeContext {
                    language,
                    code: String::new(),
                });
                Ok(())
            }
            Tag::HtmlBlock => {
                self.flush_implicit_paragraph()?;
                self.html_block = Some(String::new());
                Ok(())
            }
            Tag::List(start) => {
                self.flush_implicit_paragraph()?;
                self.containers.push(Container::List {
                    start,
                    items: Vec::new(),
                });
                Ok(())
            }
            Tag::Item => {
                self.flush_implicit_paragraph()?;
                self.containers.push(Container::Item {
                    children: Vec::new(),
                });
                Ok(())
            }
            Tag::Table(alignments) => {
                self.flush_implicit_paragraph()?;
                self.table = Some(TableContext {
                    alignments: alignments.iter().map(|align| (*align).into()).collect(),
                    rows: Vec::new(),
                    current_row: Vec::new(),
                });
                Ok(())
            }
            Tag::TableHead | Tag::TableRow | Tag::TableCell => Ok(()),
            Tag::Emphasis => {
                self.formatting.italic = true;
                Ok(())
            }
            Tag::Strong => {
                self.formatting.bold = true;
                Ok(())
            }
            Tag::Strikethrough => {
                self.formatting.strike = true;
                Ok(())
            }
            Tag::Link { dest_url, .. } => {
                self.formatting.link = Some(dest_url.to_string());
                self.current_spans.push(Span::Link {
                    text: String::new(),
                    href: dest_url.to_string(),
                });
                Ok(())
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                self.images.push(ImageContext {
                    checkpoint: self.current_spans.len(),
                    url: dest_url.to_string(),
                    title: title.to_string(),
                });
                Ok(())
            }
            Tag::FootnoteDefinition(_)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition
            | Tag::Superscript
            | Tag::Subscript
            | Tag::MetadataBlock(_) => Ok(()),
        }
    }

    fn handle_end_tag(&mut self, tag_end: TagEnd) -> Result<(), ParseError> {
        match tag_end {
            TagEnd::Paragraph => self.finish_paragraph(),
            TagEnd::Heading(_) => self.finish_heading(),
            TagEnd::BlockQuote(_) => self.finish_blockquote(),
            TagEnd::CodeBlock => self.finish_code_block(),
            TagEnd::HtmlBlock => self.finish_html_block(),
            TagEnd::List(_) => self.finish_list(),
            TagEnd::Item => self.finish_list_item(),
            TagEnd::Table => self.finish_table(),
            // The header row ends with TableHead; body rows with TableRow.
            TagEnd::TableHead | TagEnd::TableRow => self.finish_table_row(),
            TagEnd::TableCell => self.finish_table_cell(),
            TagEnd::Emphasis => {
                self.formatting.italic = false;
                Ok(())
            }
            TagEnd::Strong => {
                self.formatting.bold = false;
                Ok(())
            }
            TagEnd::Strikethrough => {
                self.formatting.strike = false;
                Ok(())
            }
            TagEnd::Link => {
                self.formatting.link = None;
                Ok(())
            }
            TagEnd::Image => self.finish_image(),
            TagEnd::FootnoteDefinition
            | TagEnd::DefinitionList
            | TagEnd::DefinitionListTitle
            | TagEnd::DefinitionListDefinition
            | TagEnd::Superscript
            | TagEnd::Subscript
            | TagEnd::MetadataBlock(_) => Ok(()),
        }
    }

    fn handle_text(&mut self, text: &str) {
        if let Some(code) = self.code.as_mut() {
            code.code.push_str(text);
            return;
        }
        if let Some(html) = self.html_block.as_mut() {
            html.push_str(text);
            return;
        }
        self.push_text(text.to_string());
    }

    fn handle_inline_code(&mut self, code: &str) {
        if self.formatting.link.is_some() {
            // Links carry plain text; code inside link text loses its mark.
            self.push_text(code.to_string());
            return;
        }
        let mut marks = self.formatting.marks();
        marks.code = true;
        self.push_marked_text(code.to_string(), marks);
    }

    fn handle_block_html(&mut self, html: &str) {
        if let Some(buffer) = self.html_block.as_mut() {
            buffer.push_str(html);
        } else {
            self.push_text(html.to_string());
        }
    }

    fn handle_inline_html(&mut self, html: &str) {
        match html {
            "<u>" => self.formatting.underline = true,
            "</u>" => self.formatting.underline = false,
            other => self.push_text(other.to_string()),
        }
    }

    /// Append text with the current formatting, merging into the previous
    /// span when the marks match
    fn push_text(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        if self.formatting.link.is_some() && self.images.is_empty() {
            if let Some(Span::Link {
                text: link_text, ..
            }) = self.current_spans.last_mut()
            {
                link_text.push_str(&text);
                return;
            }
        }
        let marks = self.formatting.marks();
        self.push_marked_text(text, marks);
    }

    fn push_marked_text(&mut self, text: String, marks: Marks) {
        // While an image is open, merging stops: its alt text must stay
        // separable from the spans recorded before the image started.
        if self.images.is_empty() {
            if let Some(Span::Text {
                text: last_text,
                marks: last_marks,
            }) = self.current_spans.last_mut()
            {
                if *last_marks == marks {
                    last_text.push_str(&text);
                    return;
                }
            }
        }
        self.current_spans.push(Span::Text { text, marks });
    }

    /// Turn accumulated spans into a paragraph where no explicit paragraph
    /// was opened, as happens with tight list items
    fn flush_implicit_paragraph(&mut self) -> Result<(), ParseError> {
        if self.current_spans.is_empty() {
            return Ok(());
        }
        self.finish_paragraph()
    }

    fn finish_paragraph(&mut self) -> Result<(), ParseError> {
        let spans = std::mem::take(&mut self.current_spans);
        if spans.is_empty() {
            return Ok(());
        }
        let align = self.pending_align.take().unwrap_or_default();
        self.add_block(Block::Paragraph { spans, align })
    }

    fn finish_heading(&mut self) -> Result<(), ParseError> {
        let Some(level) = self.heading.take() else {
            return Err(ParseError::UnexpectedEnd { element: "heading" });
        };
        let spans = std::mem::take(&mut self.current_spans);
        let align = self.pending_align.take().unwrap_or_default();
        self.add_block(Block::Heading {
            level,
            id: String::new(),
            spans,
            align,
        })
    }

    fn finish_blockquote(&mut self) -> Result<(), ParseError> {
        self.flush_implicit_paragraph()?;
        let Some(Container::Quote { children }) = self.containers.pop() else {
            return Err(ParseError::UnexpectedEnd {
                element: "block quote",
            });
        };
        self.add_block(Block::BlockQuote { children })
    }

    fn finish_list(&mut self) -> Result<(), ParseError> {
        let Some(Container::List { start, items }) = self.containers.pop() else {
            return Err(ParseError::UnexpectedEnd { element: "list" });
        };
        let block = match start {
            Some(start) => Block::OrderedList { start, items },
            None => Block::BulletList { items },
        };
        self.add_block(block)
    }

    fn finish_list_item(&mut self) -> Result<(), ParseError> {
        self.flush_implicit_paragraph()?;
        let Some(Container::Item { children }) = self.containers.pop() else {
            return Err(ParseError::UnexpectedEnd {
                element: "list item",
            });
        };
        let Some(Container::List { items, .. }) = self.containers.last_mut() else {
            return Err(ParseError::MisplacedBlock {
                context: "a list item outside a list",
            });
        };
        items.push(ListItem { children });
        Ok(())
    }

    fn finish_code_block(&mut self) -> Result<(), ParseError> {
        let Some(context) = self.code.take() else {
            return Err(ParseError::UnexpectedEnd {
                element: "code block",
            });
        };
        self.add_block(Block::CodeBlock {
            language: context.language,
            code: context.code,
        })
    }

    fn finish_html_block(&mut self) -> Result<(), ParseError> {
        let Some(html) = self.html_block.take() else {
            return Err(ParseError::UnexpectedEnd {
                element: "HTML block",
            });
        };
        if let Some(align) = wrapper_alignment(&html) {
            self.pending_align = Some(align);
            return Ok(());
        }
        if html.trim() == "</div>" {
            self.pending_align = None;
            return Ok(());
        }
        // Unrecognized block HTML is kept as visible text, one line.
        let text = html.replace('\n', " ");
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }
        self.add_block(Block::Paragraph {
            spans: vec![Span::text(text.to_string())],
            align: Alignment::Left,
        })
    }

    fn finish_table_row(&mut self) -> Result<(), ParseError> {
        let Some(table) = self.table.as_mut() else {
            return Err(ParseError::UnexpectedEnd {
                element: "table row",
            });
        };
        let cells = std::mem::take(&mut table.current_row);
        table.rows.push(TableRow { cells });
        Ok(())
    }

    fn finish_table_cell(&mut self) -> Result<(), ParseError> {
        let spans = std::mem::take(&mut self.current_spans);
        let Some(table) = self.table.as_mut() else {
            return Err(ParseError::UnexpectedEnd {
                element: "table cell",
            });
        };
        let align = table
            .alignments
            .get(table.current_row.len())
            .copied()
            .unwrap_or_default();
        table.current_row.push(TableCell::new(spans, align));
        Ok(())
    }

    fn finish_table(&mut self) -> Result<(), ParseError> {
        let Some(table) = self.table.take() else {
            return Err(ParseError::UnexpectedEnd { element: "table" });
        };
        let Some(width) = table.rows.iter().map(|row| row.cells.len()).max() else {
            return Ok(());
        };
        if width == 0 {
            return Ok(());
        }
        let alignments = table.alignments;
        let rows = table
            .rows
            .into_iter()
            .map(|row| TableRow {
                cells: row
                    .cells
                    .into_iter()
                    .pad_using(width, |index| {
                        TableCell::empty(alignments.get(index).copied().unwrap_or_default())
                    })
                    .collect(),
            })
            .collect();
        self.add_block(Block::Table { rows })
    }

    fn finish_image(&mut self) -> Result<(), ParseError> {
        let Some(image) = self.images.pop() else {
            return Err(ParseError::UnexpectedEnd { element: "image" });
        };
        // The tree has no image node; the source form is kept as text.
        let checkpoint = image.checkpoint.min(self.current_spans.len());
        let alt_spans = self.current_spans.split_off(checkpoint);
        let alt = plain_text(&alt_spans);
        let source = if image.title.is_empty() {
            format!("![{}]({})", alt, image.url)
        } else {
            format!("![{}]({} \"{}\")", alt, image.url, image.title)
        };
        self.push_text(source);
        Ok(())
    }

    fn add_block(&mut self, block: Block) -> Result<(), ParseError> {
        match self.containers.last_mut() {
            Some(Container::Quote { children }) | Some(Container::Item { children }) => {
                children.push(block);
                Ok(())
            }
            Some(Container::List { .. }) => Err(ParseError::MisplacedBlock { context: "a list" }),
            None => {
                self.blocks.push(block);
                Ok(())
            }
        }
    }

    fn finish(mut self) -> Result<Document, ParseError> {
        self.flush_implicit_paragraph()?;
        if let Some(container) = self.containers.last() {
            let element = match container {
                Container::Quote { .. } => "block quote",
                Container::List { .. } => "list",
                Container::Item { .. } => "list item",
            };
            return Err(ParseError::UnclosedElement { element });
        }
        if self.table.is_some() {
            return Err(ParseError::UnclosedElement { element: "table" });
        }
        if self.code.is_some() {
            return Err(ParseError::UnclosedElement {
                element: "code block",
            });
        }
        if self.heading.is_some() {
            return Err(ParseError::UnclosedElement { element: "heading" });
        }
        Ok(Document {
            blocks: self.blocks,
        })
    }
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Recognize an alignment wrapper opener on its own line
fn wrapper_alignment(html: &str) -> Option<Alignment> {
    let rest = html.trim().strip_prefix("<div align=\"")?;
    let (name, rest) = rest.split_once('"')?;
    if rest != ">" {
        return None;
    }
    match name {
        "left" => Some(Alignment::Left),
        "center" => Some(Alignment::Center),
        "right" => Some(Alignment::Right),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulldown_cmark::Parser;

    // Tests documenting pulldown_cmark behavior the fold depends on

    #[test]
    fn test_pulldown_omits_paragraph_events_in_tight_lists() {
        // Arrange
        let tight = "- one\n- two";
        let loose = "- one\n\n- two";

        // Act
        let tight_events: Vec<Event> = Parser::new_ext(tight, parser_options()).collect();
        let loose_events: Vec<Event> = Parser::new_ext(loose, parser_options()).collect();

        // Assert: tight items hold bare text, loose items wrap paragraphs
        assert!(!tight_events
            .iter()
            .any(|event| matches!(event, Event::Start(Tag::Paragraph))));
        assert!(loose_events
            .iter()
            .any(|event| matches!(event, Event::Start(Tag::Paragraph))));
    }

    #[test]
    fn test_pulldown_ends_header_row_with_table_head() {
        // Arrange
        let markdown = "| a | b |\n| --- | --- |\n| c | d |";

        // Act
        let events: Vec<Event> = Parser::new_ext(markdown, parser_options()).collect();

        // Assert: header cells close before any TableRow opens
        let head_end = events
            .iter()
            .position(|event| matches!(event, Event::End(TagEnd::TableHead)));
        let first_row = events
            .iter()
            .position(|event| matches!(event, Event::Start(Tag::TableRow)));
        assert!(head_end.is_some());
        assert!(first_row.is_some());
        assert!(head_end < first_row);
    }

    #[test]
    fn test_pulldown_decodes_backslash_escapes_to_text() {
        // Arrange
        let markdown = "not \\*emphasis\\*";

        // Act
        let events: Vec<Event> = Parser::new_ext(markdown, parser_options()).collect();

        // Assert: escapes arrive as plain text, with no emphasis events
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::Start(Tag::Emphasis))));
    }

    // Unit tests for parse

    #[test]
    fn test_parse_splits_spans_at_mark_boundaries() {
        let document = parse("one **two** three");

        let Block::Paragraph { spans, .. } = &document.blocks[0] else {
            panic!("Expected paragraph block");
        };
        assert_eq!(spans.len(), 3);
        assert_eq!(
            spans[0],
            Span::text("one ".to_string()),
            "leading run stays plain"
        );
        let Span::Text { text, marks } = &spans[1] else {
            panic!("Expected text span");
        };
        assert_eq!(text, "two");
        assert!(marks.bold);
        assert_eq!(spans[2], Span::text(" three".to_string()));
    }

    #[test]
    fn test_parse_assigns_deduplicated_heading_ids_in_order() {
        let document = parse("# Notes\n\n## Notes\n\n## Detail");

        let ids: Vec<String> = {
            let mut ids = Vec::new();
            document.for_each_heading(&mut |_, id, _| ids.push(id.to_string()));
            ids
        };
        assert_eq!(ids, vec!["notes", "notes-1", "detail"]);
    }

    #[test]
    fn test_parse_keeps_nested_list_structure() {
        let document = parse("- outer\n  - inner\n- second");

        let Block::BulletList { items } = &document.blocks[0] else {
            panic!("Expected bullet list");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].children.len(), 2, "paragraph plus nested list");
        assert!(matches!(items[0].children[0], Block::Paragraph { .. }));
        let Block::BulletList { items: inner } = &items[0].children[1] else {
            panic!("Expected nested bullet list");
        };
        assert_eq!(inner.len(), 1);
    }

    #[test]
    fn test_parse_keeps_ordered_list_start() {
        let document = parse("3. three\n4. four");

        let Block::OrderedList { start, items } = &document.blocks[0] else {
            panic!("Expected ordered list");
        };
        assert_eq!(*start, 3);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_parse_attaches_list_inside_quote_to_the_quote() {
        let document = parse("> - a\n> - b");

        let Block::BlockQuote { children } = &document.blocks[0] else {
            panic!("Expected block quote");
        };
        assert!(matches!(children[0], Block::BulletList { .. }));
        assert_eq!(document.blocks.len(), 1);
    }

    #[test]
    fn test_parse_copies_column_alignment_onto_cells() {
        let document = parse("| a | b |\n| :---: | ---: |\n| c | d |");

        let Block::Table { rows } = &document.blocks[0] else {
            panic!("Expected table");
        };
        assert_eq!(rows.len(), 2);
        for row in rows {
            assert_eq!(row.cells.len(), 2);
            assert_eq!(row.cells[0].align, Alignment::Center);
            assert_eq!(row.cells[1].align, Alignment::Right);
        }
    }

    #[test]
    fn test_parse_pads_short_table_rows_with_empty_cells() {
        let document = parse("| a | b | c |\n| --- | --- | --- |\n| 1 |");

        let Block::Table { rows } = &document.blocks[0] else {
            panic!("Expected table");
        };
        assert_eq!(rows.len(), 2);
        for row in rows {
            assert_eq!(row.cells.len(), 3);
        }
        assert_eq!(rows[1].cells[0].spans, vec![Span::text("1".to_string())]);
        assert!(rows[1].cells[1].spans.is_empty());
        assert!(rows[1].cells[2].spans.is_empty());
    }

    #[test]
    fn test_parse_code_block_keeps_language_and_content() {
        let document = parse("```rust\nfn main() {}\n```");

        assert_eq!(
            document.blocks[0],
            Block::CodeBlock {
                language: Some("rust".to_string()),
                code: "fn main() {}\n".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_places_math_by_position() {
        let document = parse("$$x^2$$\n\nwith $y$ inline");

        assert_eq!(
            document.blocks[0],
            Block::MathBlock {
                latex: "x^2".to_string()
            }
        );
        let Block::Paragraph { spans, .. } = &document.blocks[1] else {
            panic!("Expected paragraph block");
        };
        assert_eq!(
            spans[1],
            Span::Math {
                latex: "y".to_string()
            }
        );
    }

    #[test]
    fn test_parse_strips_alignment_wrapper_and_aligns_block() {
        let document = parse("<div align=\"center\">\n\nCentered text.\n\n</div>");

        assert_eq!(document.blocks.len(), 1);
        let Block::Paragraph { spans, align } = &document.blocks[0] else {
            panic!("Expected paragraph block");
        };
        assert_eq!(*align, Alignment::Center);
        assert_eq!(spans[0], Span::text("Centered text.".to_string()));
    }

    #[test]
    fn test_parse_underline_tags_toggle_the_mark() {
        let document = parse("a <u>under</u> b");

        let Block::Paragraph { spans, .. } = &document.blocks[0] else {
            panic!("Expected paragraph block");
        };
        let Span::Text { text, marks } = &spans[1] else {
            panic!("Expected text span");
        };
        assert_eq!(text, "under");
        assert!(marks.underline);
        let Span::Text { marks: after, .. } = &spans[2] else {
            panic!("Expected text span");
        };
        assert!(!after.underline);
    }

    #[test]
    fn test_parse_keeps_unrecognized_block_html_as_text() {
        let document = parse("<table>\n<tr><td>x</td></tr>\n</table>");

        let Block::Paragraph { spans, .. } = &document.blocks[0] else {
            panic!("Expected paragraph block");
        };
        let Span::Text { text, .. } = &spans[0] else {
            panic!("Expected text span");
        };
        assert!(text.contains("<table>"));
        assert!(!text.contains('\n'));
    }

    #[test]
    fn test_parse_strikethrough_mark() {
        let document = parse("~~gone~~");

        let Block::Paragraph { spans, .. } = &document.blocks[0] else {
            panic!("Expected paragraph block");
        };
        let Span::Text { marks, .. } = &spans[0] else {
            panic!("Expected text span");
        };
        assert!(marks.strike);
    }

    #[test]
    fn test_parse_collapses_line_breaks_to_spaces() {
        let document = parse("line one\nline two  \nline three");

        let Block::Paragraph { spans, .. } = &document.blocks[0] else {
            panic!("Expected paragraph block");
        };
        assert_eq!(
            spans,
            &vec![Span::text("line one line two line three".to_string())]
        );
    }

    #[test]
    fn test_parse_empty_input_yields_empty_document() {
        assert_eq!(parse(""), Document::new());
        assert_eq!(parse("   \n  "), Document::new());
    }

    #[test]
    fn test_parse_keeps_images_as_literal_source_text() {
        let document = parse("![logo](assets/logo.png)");

        let Block::Paragraph { spans, .. } = &document.blocks[0] else {
            panic!("Expected paragraph block");
        };
        assert_eq!(spans[0], Span::text("![logo](assets/logo.png)".to_string()));
    }

    #[test]
    fn test_parse_keeps_mid_paragraph_image_alt_in_its_brackets() {
        let document = parse("Some text ![alt](a.png)");

        let Block::Paragraph { spans, .. } = &document.blocks[0] else {
            panic!("Expected paragraph block");
        };
        assert_eq!(
            spans,
            &vec![Span::text("Some text ![alt](a.png)".to_string())]
        );
    }

    #[test]
    fn test_parse_image_inside_link_becomes_the_link_text() {
        let document = parse("[![badge](b.svg)](https://ci.example.com)");

        let Block::Paragraph { spans, .. } = &document.blocks[0] else {
            panic!("Expected paragraph block");
        };
        assert_eq!(
            spans,
            &vec![Span::Link {
                text: "![badge](b.svg)".to_string(),
                href: "https://ci.example.com".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_link_collects_plain_text() {
        let document = parse("see [the **docs**](https://example.com) here");

        let Block::Paragraph { spans, .. } = &document.blocks[0] else {
            panic!("Expected paragraph block");
        };
        assert_eq!(
            spans[1],
            Span::Link {
                text: "the docs".to_string(),
                href: "https://example.com".to_string(),
            }
        );
    }

    #[test]
    fn test_try_parse_succeeds_on_ordinary_input() {
        assert!(try_parse("# Title\n\nBody with `code`.\n").is_ok());
    }
}
