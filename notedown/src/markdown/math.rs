//! Math region protection
//!
//! LaTeX math is not part of the generic markdown grammar, so `$...$` and
//! `$$...$$` regions are lifted out of the source before block parsing and
//! swapped back into the finished tree afterwards. Each region is replaced
//! by a placeholder token that is inert under markdown parsing and
//! content-addressed by index and payload hash, so a token mangled by the
//! generic parse (or paired with the wrong extraction table) is detected
//! instead of silently producing wrong math.

use crate::document::{Block, Document, Marks, Span};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// A math region lifted out of the source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathSpan {
    /// Token standing in for the region during the generic parse
    pub placeholder: String,
    /// Trimmed, unescaped LaTeX payload
    pub latex: String,
    /// Whether the region used display (`$$`) delimiters
    pub block: bool,
}

/// Source text with math regions replaced by placeholders
#[derive(Debug, Clone)]
pub struct Protected {
    /// Markdown text safe to hand to the generic parser
    pub text: String,
    /// Extracted regions in extraction order
    pub extracted: Vec<MathSpan>,
}

/// Replace every math region in `markdown` with an inert placeholder
///
/// Display regions are scanned first so a `$$` pair is never split into
/// two inline delimiters. A backslash escapes the character after it, and
/// unterminated delimiters are left in place as literal text.
pub fn protect(markdown: &str) -> Protected {
    let mut extracted = Vec::new();
    let text = extract_display(markdown, &mut extracted);
    let text = extract_inline(&text, &mut extracted);
    Protected { text, extracted }
}

fn extract_display(text: &str, extracted: &mut Vec<MathSpan>) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut plain_from = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'$' if bytes.get(i + 1) == Some(&b'$') => {
                if let Some(close) = find_display_close(bytes, i + 2) {
                    out.push_str(&text[plain_from..i]);
                    let line_start = text[..i].rfind('\n').map_or(0, |at| at + 1);
                    let payload = strip_container_lead(&text[i + 2..close], &text[line_start..i]);
                    out.push_str(&placeholder_for(&payload, true, extracted));
                    i = close + 2;
                    plain_from = i;
                } else {
                    // Unterminated display delimiter stays literal.
                    i += 2;
                }
            }
            _ => i += 1,
        }
    }
    if plain_from < text.len() {
        out.push_str(&text[plain_from..]);
    }
    out
}

fn find_display_close(bytes: &[u8], mut i: usize) -> Option<usize> {
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'$' if bytes.get(i + 1) == Some(&b'$') => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// Drop the opening line's container lead from later payload lines
///
/// A display region opened inside a blockquote or an indented list item
/// carries its container's quote markers or indentation on every line.
/// The lead is whatever precedes the opening `$$` on its line; when that
/// is only whitespace and quote markers, continuation lines shed it so
/// the payload holds the math alone.
fn strip_container_lead(payload: &str, lead: &str) -> String {
    let container =
        !lead.is_empty() && lead.chars().all(|ch| ch == ' ' || ch == '\t' || ch == '>');
    if !container {
        return payload.to_string();
    }
    let mut lines = payload.split('\n');
    let mut out = String::with_capacity(payload.len());
    if let Some(first) = lines.next() {
        out.push_str(first);
    }
    for line in lines {
        out.push('\n');
        let stripped = line
            .strip_prefix(lead)
            .or_else(|| line.strip_prefix(lead.trim_end()))
            .unwrap_or(line);
        out.push_str(stripped);
    }
    out
}

fn extract_inline(text: &str, extracted: &mut Vec<MathSpan>) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut plain_from = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'$' => {
                let run = dollar_run(bytes, i);
                if run > 1 {
                    // Dollars adjacent to other dollars never open inline math.
                    i += run;
                } else if let Some(close) = find_inline_close(bytes, i + 1) {
                    out.push_str(&text[plain_from..i]);
                    out.push_str(&placeholder_for(&text[i + 1..close], false, extracted));
                    i = close + 1;
                    plain_from = i;
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }
    if plain_from < text.len() {
        out.push_str(&text[plain_from..]);
    }
    out
}

fn dollar_run(bytes: &[u8], from: usize) -> usize {
    bytes[from..].iter().take_while(|byte| **byte == b'$').count()
}

/// Find the single closing dollar of an inline region
///
/// Inline regions stay on one line and hold no unescaped dollar; hitting a
/// newline or a `$$` pair means the opener was not a delimiter at all.
fn find_inline_close(bytes: &[u8], mut i: usize) -> Option<usize> {
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => return None,
            b'$' => {
                if bytes.get(i + 1) == Some(&b'$') {
                    return None;
                }
                return Some(i);
            }
            _ => i += 1,
        }
    }
    None
}

fn placeholder_for(payload: &str, block: bool, extracted: &mut Vec<MathSpan>) -> String {
    let latex = unescape_payload(payload.trim());
    let index = extracted.len();
    let placeholder = format!("@@math-{}-{:016x}@@", index, payload_hash(index, &latex));
    log::debug!(
        "protected {} math region as {}",
        if block { "display" } else { "inline" },
        placeholder
    );
    extracted.push(MathSpan {
        placeholder: placeholder.clone(),
        latex,
        block,
    });
    placeholder
}

fn payload_hash(index: usize, latex: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    index.hash(&mut hasher);
    latex.hash(&mut hasher);
    hasher.finish()
}

/// Escape a LaTeX payload for embedding between dollar delimiters
///
/// Only the dollar sign is escaped. Backslashes already in the payload,
/// like LaTeX commands and `\\` row breaks, pass through untouched, which
/// keeps escaping idempotent: unescaping the result yields the payload.
pub fn escape_payload(latex: &str) -> String {
    latex.replace('$', "\\$")
}

/// Reverse of [`escape_payload`]
///
/// Scans left to right; a backslash consumes the character after it, and
/// only the `\$` pair collapses. Everything else is kept verbatim.
pub fn unescape_payload(payload: &str) -> String {
    let mut out = String::with_capacity(payload.len());
    let mut chars = payload.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('$') => out.push('$'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Swap placeholder tokens in a parsed document back into math nodes
///
/// Placement decides the node kind: a paragraph holding exactly one
/// placeholder becomes a math block, a placeholder inside mixed inline
/// content becomes an inline math span, and a placeholder that surfaced
/// inside code or link text keeps its literal source form. Tokens that
/// match the placeholder format but not the extraction table are left as
/// literal text and reported, as are regions whose token never resurfaced.
pub fn restore(document: &mut Document, extracted: &[MathSpan]) {
    if extracted.is_empty() {
        return;
    }
    let mut seen = vec![false; extracted.len()];
    restore_blocks(&mut document.blocks, extracted, &mut seen);
    for (region, found) in extracted.iter().zip(&seen) {
        if !found {
            log::warn!(
                "math region {} was lost during the generic parse",
                region.placeholder
            );
        }
    }
}

fn restore_blocks(blocks: &mut [Block], extracted: &[MathSpan], seen: &mut [bool]) {
    for block in blocks.iter_mut() {
        match block {
            Block::Paragraph { spans, .. } => {
                if let Some(index) = lone_placeholder(spans, extracted) {
                    seen[index] = true;
                    log::debug!("restored {} as a math block", extracted[index].placeholder);
                    *block = Block::MathBlock {
                        latex: extracted[index].latex.clone(),
                    };
                } else {
                    restore_spans(spans, extracted, seen);
                }
            }
            Block::Heading { spans, .. } => restore_spans(spans, extracted, seen),
            Block::BlockQuote { children } => restore_blocks(children, extracted, seen),
            Block::BulletList { items } | Block::OrderedList { items, .. } => {
                for item in items {
                    restore_blocks(&mut item.children, extracted, seen);
                }
            }
            Block::CodeBlock { code, .. } => {
                *code = restore_literal(code, true, extracted, seen);
            }
            Block::Table { rows } => {
                for row in rows {
                    for cell in &mut row.cells {
                        restore_spans(&mut cell.spans, extracted, seen);
                    }
                }
            }
            Block::Rule | Block::MathBlock { .. } => {}
        }
    }
}

/// A paragraph whose entire content is one placeholder token
fn lone_placeholder(spans: &[Span], extracted: &[MathSpan]) -> Option<usize> {
    let [Span::Text { text, marks }] = spans else {
        return None;
    };
    if marks.code {
        return None;
    }
    lookup(text.trim(), extracted)
}

fn restore_spans(spans: &mut Vec<Span>, extracted: &[MathSpan], seen: &mut [bool]) {
    let mut rebuilt = Vec::with_capacity(spans.len());
    for span in spans.drain(..) {
        match span {
            Span::Text { text, marks } if marks.code => rebuilt.push(Span::Text {
                text: restore_literal(&text, false, extracted, seen),
                marks,
            }),
            Span::Text { text, marks } => split_math(&text, marks, extracted, seen, &mut rebuilt),
            Span::Link { text, href } => rebuilt.push(Span::Link {
                text: restore_literal(&text, false, extracted, seen),
                href,
            }),
            other => rebuilt.push(other),
        }
    }
    *spans = rebuilt;
}

fn split_math(
    text: &str,
    marks: Marks,
    extracted: &[MathSpan],
    seen: &mut [bool],
    out: &mut Vec<Span>,
) {
    let mut rest = text;
    let mut plain = String::new();
    while let Some((before, token, after)) = next_token(rest) {
        match lookup(token, extracted) {
            Some(index) => {
                seen[index] = true;
                plain.push_str(before);
                if !plain.is_empty() {
                    out.push(Span::Text {
                        text: std::mem::take(&mut plain),
                        marks,
                    });
                }
                log::debug!("restored {} as inline math", token);
                out.push(Span::Math {
                    latex: extracted[index].latex.clone(),
                });
            }
            None => {
                // Not one of ours: keep the lookalike and scan on.
                plain.push_str(before);
                plain.push_str(token);
            }
        }
        rest = after;
    }
    plain.push_str(rest);
    if !plain.is_empty() {
        out.push(Span::Text { text: plain, marks });
    }
}

/// Replace placeholder tokens with their literal math source
///
/// Used where the tree cannot hold a math node, inside code and link
/// text. Newlines in the payload are flattened to spaces in inline
/// positions so the reconstructed source stays on one line.
fn restore_literal(
    text: &str,
    allow_newlines: bool,
    extracted: &[MathSpan],
    seen: &mut [bool],
) -> String {
    let mut rest = text;
    let mut out = String::with_capacity(text.len());
    while let Some((before, token, after)) = next_token(rest) {
        out.push_str(before);
        match lookup(token, extracted) {
            Some(index) => {
                seen[index] = true;
                log::debug!("kept {} as literal math source", token);
                out.push_str(&source_form(&extracted[index], allow_newlines));
            }
            None => out.push_str(token),
        }
        rest = after;
    }
    out.push_str(rest);
    out
}

fn source_form(region: &MathSpan, allow_newlines: bool) -> String {
    let mut payload = escape_payload(&region.latex);
    if !allow_newlines {
        payload = payload.replace('\n', " ");
    }
    if payload.ends_with('\\') {
        // Keep the closing delimiter from reading as escaped.
        payload.push(' ');
    }
    if region.block {
        format!("$${}$$", payload)
    } else {
        format!("${}$", payload)
    }
}

/// Split off the next placeholder-shaped token
///
/// Returns the text before the token, the token itself, and the remains.
/// Candidates whose interior holds anything but digits, hex, and hyphens
/// are skipped so user text cannot hide a genuine token behind a decoy.
fn next_token(text: &str) -> Option<(&str, &str, &str)> {
    let mut searched = 0;
    loop {
        let start = searched + text[searched..].find("@@math-")?;
        let interior_from = start + "@@math-".len();
        let Some(end) = text[interior_from..].find("@@") else {
            return None;
        };
        let interior = &text[interior_from..interior_from + end];
        if !interior.is_empty()
            && interior
                .chars()
                .all(|ch| ch.is_ascii_hexdigit() || ch == '-')
        {
            let token_end = interior_from + end + "@@".len();
            return Some((&text[..start], &text[start..token_end], &text[token_end..]));
        }
        searched = start + "@@math-".len();
    }
}

fn lookup(token: &str, extracted: &[MathSpan]) -> Option<usize> {
    let body = token.strip_prefix("@@math-")?.strip_suffix("@@")?;
    let (index_text, _hash) = body.split_once('-')?;
    let index: usize = index_text.parse().ok()?;
    match extracted.get(index) {
        Some(region) if region.placeholder == token => Some(index),
        _ => {
            log::warn!("placeholder {} does not match any protected region", token);
            None
        }
    }
}
