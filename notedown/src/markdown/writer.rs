//! Document tree to markdown serialization
//!
//! Walks a document and emits its canonical markdown form. The guarantee
//! is structural: parsing the output yields a tree equal to the input, so
//! everything the parser would treat as syntax is escaped on the way out.
//! Serialization is pure and touches nothing but its arguments.

use super::math;
use crate::document::{Alignment, Block, Document, ListItem, Marks, Span, TableRow};
use itertools::Itertools;

/// Serialize a document to canonical markdown
pub fn serialize(document: &Document) -> String {
    let mut output = String::new();
    for block in &document.blocks {
        write_block(&mut output, block, "");
    }
    let content_len = output.trim_end_matches('\n').len();
    output.truncate(content_len);
    if !output.is_empty() {
        output.push('\n');
    }
    output
}

/// Write one block, prefixing every line it emits with `prefix`
fn write_block(output: &mut String, block: &Block, prefix: &str) {
    match block {
        Block::Paragraph { spans, align } => {
            let text = escape_line_start(spans_to_markdown(spans));
            write_aligned(output, &text, *align, prefix);
        }
        Block::Heading {
            level, spans, align, ..
        } => {
            let marker = "#".repeat(usize::from(*level).clamp(1, 6));
            let text = escape_heading_tail(spans_to_markdown(spans));
            let line = if text.is_empty() {
                marker
            } else {
                format!("{} {}", marker, text)
            };
            write_aligned(output, &line, *align, prefix);
        }
        Block::BlockQuote { children } => write_blockquote(output, children, prefix),
        Block::BulletList { items } => {
            write_list(output, None, items, prefix);
            end_block(output);
        }
        Block::OrderedList { start, items } => {
            write_list(output, Some(*start), items, prefix);
            end_block(output);
        }
        Block::CodeBlock { language, code } => write_code_block(output, language, code, prefix),
        Block::Table { rows } => write_table(output, rows, prefix),
        Block::Rule => {
            output.push_str(prefix);
            output.push_str("---\n\n");
        }
        Block::MathBlock { latex } => write_math_block(output, latex, prefix),
    }
}

/// Write a single-line block, wrapping it when it carries an alignment
fn write_aligned(output: &mut String, line: &str, align: Alignment, prefix: &str) {
    let name = match align {
        Alignment::Left => {
            output.push_str(prefix);
            output.push_str(line);
            output.push_str("\n\n");
            return;
        }
        Alignment::Center => "center",
        Alignment::Right => "right",
    };
    output.push_str(prefix);
    output.push_str(&format!("<div align=\"{}\">\n\n", name));
    output.push_str(prefix);
    output.push_str(line);
    output.push_str("\n\n");
    output.push_str(prefix);
    output.push_str("</div>\n\n");
}

fn write_blockquote(output: &mut String, children: &[Block], prefix: &str) {
    let mut inner = String::new();
    for child in children {
        write_block(&mut inner, child, "");
    }
    let inner = inner.trim_end_matches('\n');
    if inner.is_empty() {
        output.push_str(prefix);
        output.push_str(">\n\n");
        return;
    }
    for line in inner.lines() {
        output.push_str(prefix);
        if line.is_empty() {
            output.push('>');
        } else {
            output.push_str("> ");
            output.push_str(line);
        }
        output.push('\n');
    }
    output.push('\n');
}

fn write_list(output: &mut String, start: Option<u64>, items: &[ListItem], prefix: &str) {
    // A list is written tight only when every item is a single paragraph;
    // one blank line anywhere makes the whole list loose on re-parse.
    let tight = items
        .iter()
        .all(|item| matches!(item.children.as_slice(), [Block::Paragraph { .. }]));
    for (index, item) in items.iter().enumerate() {
        let marker = match start {
            Some(start) => format!("{}. ", start + index as u64),
            None => "- ".to_string(),
        };
        let continuation = format!("{}{}", prefix, " ".repeat(marker.len()));
        write_list_item(output, item, &marker, prefix, &continuation, tight);
    }
}

fn write_list_item(
    output: &mut String,
    item: &ListItem,
    marker: &str,
    prefix: &str,
    continuation: &str,
    tight: bool,
) {
    let mut children = item.children.iter();
    match children.next() {
        Some(Block::Paragraph { spans, align }) if *align == Alignment::Left => {
            output.push_str(prefix);
            output.push_str(marker);
            output.push_str(&escape_line_start(spans_to_markdown(spans)));
            output.push('\n');
            if !tight {
                output.push('\n');
            }
        }
        Some(first) => {
            output.push_str(prefix);
            output.push_str(marker.trim_end());
            output.push('\n');
            write_block(output, first, continuation);
        }
        None => {
            output.push_str(prefix);
            output.push_str(marker.trim_end());
            output.push('\n');
            if !tight {
                output.push('\n');
            }
        }
    }
    for block in children {
        write_block(output, block, continuation);
    }
}

fn write_code_block(output: &mut String, language: &Option<String>, code: &str, prefix: &str) {
    let fence = "`".repeat((longest_backtick_run(code) + 1).max(3));
    output.push_str(prefix);
    output.push_str(&fence);
    if let Some(language) = language {
        output.push_str(language);
    }
    output.push('\n');
    for line in code.lines() {
        output.push_str(prefix);
        output.push_str(line);
        output.push('\n');
    }
    output.push_str(prefix);
    output.push_str(&fence);
    output.push_str("\n\n");
}

fn write_table(output: &mut String, rows: &[TableRow], prefix: &str) {
    let Some(width) = rows.iter().map(|row| row.cells.len()).max() else {
        return;
    };
    if width == 0 {
        return;
    }
    // The topmost cell with a non-default alignment decides its column.
    let columns: Vec<Alignment> = (0..width)
        .map(|index| {
            rows.iter()
                .filter_map(|row| row.cells.get(index))
                .map(|cell| cell.align)
                .find(|align| *align != Alignment::Left)
                .unwrap_or_default()
        })
        .collect();
    write_table_row(output, &rows[0], width, prefix);
    let separator = columns
        .iter()
        .map(|align| match align {
            Alignment::Left => "---",
            Alignment::Center => ":---:",
            Alignment::Right => "---:",
        })
        .join(" | ");
    output.push_str(prefix);
    output.push_str(&format!("| {} |\n", separator));
    for row in &rows[1..] {
        write_table_row(output, row, width, prefix);
    }
    output.push('\n');
}

fn write_table_row(output: &mut String, row: &TableRow, width: usize, prefix: &str) {
    let line = (0..width)
        .map(|index| {
            row.cells
                .get(index)
                .map_or_else(String::new, |cell| cell_markdown(&cell.spans))
        })
        .join(" | ");
    output.push_str(prefix);
    output.push_str(&format!("| {} |\n", line));
}

/// Render cell content, escaping pipes so they cannot split the row
fn cell_markdown(spans: &[Span]) -> String {
    spans_to_markdown(spans).replace('|', "\\|")
}

fn write_math_block(output: &mut String, latex: &str, prefix: &str) {
    let payload = math_payload(latex, true);
    if payload.contains('\n') {
        output.push_str(prefix);
        output.push_str("$$\n");
        for line in payload.lines() {
            output.push_str(prefix);
            output.push_str(line);
            output.push('\n');
        }
        output.push_str(prefix);
        output.push_str("$$\n\n");
    } else {
        output.push_str(prefix);
        output.push_str(&format!("$${}$$\n\n", payload));
    }
}

/// Escape a math payload and guard its edges
///
/// An empty payload gets one space so the delimiters cannot collide, and
/// a payload ending in a backslash gets a trailing space so the closing
/// delimiter cannot read as escaped; trimming on re-parse removes both.
fn math_payload(latex: &str, multiline: bool) -> String {
    let mut payload = math::escape_payload(latex);
    if !multiline {
        payload = payload.replace('\n', " ");
    }
    if payload.is_empty() || payload.ends_with('\\') {
        payload.push(' ');
    }
    payload
}

/// Collapse trailing newlines to exactly one blank line
fn end_block(output: &mut String) {
    let content_len = output.trim_end_matches('\n').len();
    output.truncate(content_len);
    output.push_str("\n\n");
}

fn spans_to_markdown(spans: &[Span]) -> String {
    let mut result = String::new();
    for span in spans {
        match span {
            Span::Text { text, marks } => {
                if text.is_empty() {
                    continue;
                }
                result.push_str(&render_text(text, *marks));
            }
            Span::Math { latex } => {
                result.push_str(&format!("${}$", math_payload(latex, false)));
            }
            Span::Link { text, href } => result.push_str(&render_link(text, href)),
        }
    }
    result
}

fn render_text(text: &str, marks: Marks) -> String {
    let mut rendered = if marks.code {
        render_code_span(text)
    } else {
        escape_text(text)
    };
    if marks.bold {
        rendered = format!("**{}**", rendered);
    }
    if marks.italic {
        rendered = format!("*{}*", rendered);
    }
    if marks.strike {
        rendered = format!("~~{}~~", rendered);
    }
    if marks.underline {
        rendered = format!("<u>{}</u>", rendered);
    }
    rendered
}

fn render_code_span(text: &str) -> String {
    let text = text.replace('\n', " ");
    let fence = "`".repeat(longest_backtick_run(&text) + 1);
    let pad = text.starts_with('`')
        || text.ends_with('`')
        || (text.starts_with(' ') && text.ends_with(' ') && !text.chars().all(|ch| ch == ' '));
    if pad {
        format!("{} {} {}", fence, text, fence)
    } else {
        format!("{}{}{}", fence, text, fence)
    }
}

fn render_link(text: &str, href: &str) -> String {
    let text = escape_text(text);
    if href.chars().any(|ch| ch == ' ' || ch == '(' || ch == ')') {
        format!("[{}](<{}>)", text, href)
    } else {
        format!("[{}]({})", text, href)
    }
}

/// Escape every character the inline parser could read as syntax
fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(
            ch,
            '\\' | '`' | '*' | '_' | '[' | ']' | '<' | '>' | '$' | '~' | '&'
        ) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Escape characters that only act as syntax at the start of a line
fn escape_line_start(text: String) -> String {
    let Some(first) = text.chars().next() else {
        return text;
    };
    if matches!(first, '#' | '-' | '+') {
        return format!("\\{}", text);
    }
    let digits = text.chars().take_while(|ch| ch.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &text[digits..];
        if rest.starts_with('.') || rest.starts_with(')') {
            return format!("{}\\{}", &text[..digits], rest);
        }
    }
    text
}

/// Keep a trailing hash run from reading as an ATX closing sequence
fn escape_heading_tail(text: String) -> String {
    if !text.ends_with('#') {
        return text;
    }
    let content = text.trim_end_matches('#');
    if content.is_empty() || content.ends_with(' ') {
        let hashes = text.len() - content.len();
        return format!("{}\\{}", content, "#".repeat(hashes));
    }
    text
}

fn longest_backtick_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for ch in text.chars() {
        if ch == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TableCell;

    fn bold() -> Marks {
        Marks {
            bold: true,
            ..Marks::none()
        }
    }

    #[test]
    fn test_spans_to_markdown_plain_text() {
        let spans = vec![Span::text("Hello world".to_string())];
        assert_eq!(spans_to_markdown(&spans), "Hello world");
    }

    #[test]
    fn test_spans_to_markdown_wraps_marks() {
        assert_eq!(
            spans_to_markdown(&[Span::styled("bold".to_string(), bold())]),
            "**bold**"
        );
        assert_eq!(
            spans_to_markdown(&[Span::styled(
                "both".to_string(),
                Marks {
                    bold: true,
                    italic: true,
                    ..Marks::none()
                }
            )]),
            "***both***"
        );
        assert_eq!(
            spans_to_markdown(&[Span::styled(
                "under".to_string(),
                Marks {
                    underline: true,
                    ..Marks::none()
                }
            )]),
            "<u>under</u>"
        );
    }

    #[test]
    fn test_spans_to_markdown_escapes_syntax_characters() {
        let spans = vec![Span::text("a *b* [c] $d$ <e>".to_string())];
        assert_eq!(
            spans_to_markdown(&spans),
            "a \\*b\\* \\[c\\] \\$d\\$ \\<e\\>"
        );
    }

    #[test]
    fn test_code_span_fence_widens_around_backticks() {
        let spans = vec![Span::styled(
            "a ` b".to_string(),
            Marks {
                code: true,
                ..Marks::none()
            },
        )];
        assert_eq!(spans_to_markdown(&spans), "``a ` b``");
    }

    #[test]
    fn test_code_span_pads_edge_backticks() {
        let spans = vec![Span::styled(
            "`edge".to_string(),
            Marks {
                code: true,
                ..Marks::none()
            },
        )];
        assert_eq!(spans_to_markdown(&spans), "`` `edge ``");
    }

    #[test]
    fn test_link_href_with_spaces_is_angle_wrapped() {
        assert_eq!(
            render_link("docs", "my file.md"),
            "[docs](<my file.md>)"
        );
        assert_eq!(render_link("docs", "file.md"), "[docs](file.md)");
    }

    #[test]
    fn test_inline_math_escapes_dollars_and_guards_backslash_tail() {
        assert_eq!(
            spans_to_markdown(&[Span::Math {
                latex: "a$b".to_string()
            }]),
            "$a\\$b$"
        );
        assert_eq!(
            spans_to_markdown(&[Span::Math {
                latex: "x\\".to_string()
            }]),
            "$x\\ $"
        );
    }

    #[test]
    fn test_escape_line_start_covers_list_and_heading_openers() {
        assert_eq!(escape_line_start("- not a list".to_string()), "\\- not a list");
        assert_eq!(escape_line_start("# not a heading".to_string()), "\\# not a heading");
        assert_eq!(escape_line_start("1. not ordered".to_string()), "1\\. not ordered");
        assert_eq!(escape_line_start("10) neither".to_string()), "10\\) neither");
        assert_eq!(escape_line_start("2024 was fine".to_string()), "2024 was fine");
    }

    #[test]
    fn test_escape_heading_tail_breaks_closing_sequences() {
        assert_eq!(escape_heading_tail("x #".to_string()), "x \\#");
        assert_eq!(escape_heading_tail("x##".to_string()), "x##");
        assert_eq!(escape_heading_tail("###".to_string()), "\\###");
    }

    #[test]
    fn test_table_separator_tokens_follow_column_alignment() {
        let rows = vec![
            TableRow {
                cells: vec![
                    TableCell::new(vec![Span::text("a".to_string())], Alignment::Left),
                    TableCell::new(vec![Span::text("b".to_string())], Alignment::Center),
                    TableCell::new(vec![Span::text("c".to_string())], Alignment::Right),
                ],
            },
            TableRow {
                cells: vec![
                    TableCell::new(vec![Span::text("1".to_string())], Alignment::Left),
                    TableCell::new(vec![Span::text("2".to_string())], Alignment::Center),
                    TableCell::new(vec![Span::text("3".to_string())], Alignment::Right),
                ],
            },
        ];

        let mut output = String::new();
        write_table(&mut output, &rows, "");

        assert_eq!(
            output,
            "| a | b | c |\n| --- | :---: | ---: |\n| 1 | 2 | 3 |\n\n"
        );
    }

    #[test]
    fn test_table_cells_escape_pipes_and_short_rows_pad() {
        let rows = vec![
            TableRow {
                cells: vec![
                    TableCell::new(vec![Span::text("a|b".to_string())], Alignment::Left),
                    TableCell::new(vec![Span::text("h".to_string())], Alignment::Left),
                ],
            },
            TableRow {
                cells: vec![TableCell::new(
                    vec![Span::text("only".to_string())],
                    Alignment::Left,
                )],
            },
        ];

        let mut output = String::new();
        write_table(&mut output, &rows, "");

        assert_eq!(
            output,
            "| a\\|b | h |\n| --- | --- |\n| only |  |\n\n"
        );
    }

    #[test]
    fn test_ordered_list_numbers_from_start() {
        let items = vec![
            ListItem::with_paragraph(vec![Span::text("three".to_string())]),
            ListItem::with_paragraph(vec![Span::text("four".to_string())]),
        ];

        let mut output = String::new();
        write_list(&mut output, Some(3), &items, "");

        assert_eq!(output, "3. three\n4. four\n");
    }

    #[test]
    fn test_blockquote_prefixes_every_inner_line() {
        let children = vec![
            Block::Paragraph {
                spans: vec![Span::text("first".to_string())],
                align: Alignment::Left,
            },
            Block::Paragraph {
                spans: vec![Span::text("second".to_string())],
                align: Alignment::Left,
            },
        ];

        let mut output = String::new();
        write_blockquote(&mut output, &children, "");

        assert_eq!(output, "> first\n>\n> second\n\n");
    }

    #[test]
    fn test_serialize_ends_with_single_newline() {
        let document = Document {
            blocks: vec![Block::Paragraph {
                spans: vec![Span::text("end".to_string())],
                align: Alignment::Left,
            }],
        };

        assert_eq!(serialize(&document), "end\n");
    }

    #[test]
    fn test_serialize_wraps_aligned_paragraphs() {
        let document = Document {
            blocks: vec![Block::Paragraph {
                spans: vec![Span::text("centered".to_string())],
                align: Alignment::Center,
            }],
        };

        assert_eq!(
            serialize(&document),
            "<div align=\"center\">\n\ncentered\n\n</div>\n"
        );
    }
}
