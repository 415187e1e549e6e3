//! Flat-text search with structural positions
//!
//! Search runs over a flat view of the document: every text-bearing span
//! concatenated in depth-first order, with a newline between spans from
//! different blocks so a query cannot falsely bridge two blocks. Each hit
//! is mapped back to structural positions and validated by re-extracting
//! the text between them; a hit that cannot be made to agree with the
//! document is dropped rather than reported at a wrong position.

use crate::document::{collect_text_units, Document, TextUnit};
use log::warn;
use regex::RegexBuilder;
use serde::Serialize;

/// Structural address of one character boundary inside a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Position {
    /// Child-index path from the document root; table paths include the
    /// row and cell index
    pub path: Vec<usize>,
    /// Span index within the addressed block
    pub span: usize,
    /// Byte offset into the span's text
    pub offset: usize,
}

/// One search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    /// Start of the hit in the flat text view, in bytes
    pub flat_from: usize,
    /// End of the hit in the flat text view, exclusive
    pub flat_to: usize,
    /// Structural start, inclusive
    pub from: Position,
    /// Structural end, exclusive
    pub to: Position,
    /// The matched text, as extraction between the two positions yields it
    pub text: String,
}

/// One span's slice of the flat text view
struct SpanRun<'a> {
    flat_from: usize,
    flat_to: usize,
    unit: TextUnit<'a>,
}

/// Find every case-insensitive occurrence of `query` in the document
///
/// The query is matched literally, not as a pattern. A blank query finds
/// nothing.
pub fn find_matches(document: &Document, query: &str) -> Vec<Match> {
    if query.trim().is_empty() {
        return Vec::new();
    }
    let (corpus, runs) = flatten(collect_text_units(document));
    let Ok(pattern) = RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    else {
        warn!("Search query {:?} produced an uncompilable pattern", query);
        return Vec::new();
    };
    let mut matches = Vec::new();
    for found in pattern.find_iter(&corpus) {
        match resolve_match(document, &corpus, &runs, found.start(), found.end()) {
            Some(resolved) => matches.push(resolved),
            None => warn!(
                "Dropped a hit at bytes {}..{} with no structural position",
                found.start(),
                found.end()
            ),
        }
    }
    matches
}

/// Extract the document text between two structural positions
///
/// Spans from different blocks are joined with a newline, mirroring the
/// flat view search runs over. Returns `None` when either position does
/// not address real text.
pub fn extract_text(document: &Document, from: &Position, to: &Position) -> Option<String> {
    let units = collect_text_units(document);
    let mut result = String::new();
    let mut previous_path: Option<Vec<usize>> = None;
    for unit in &units {
        let starts_here = unit.path == from.path && unit.span == from.span;
        let ends_here = unit.path == to.path && unit.span == to.span;
        match previous_path {
            None => {
                if !starts_here {
                    continue;
                }
                if ends_here {
                    if from.offset > to.offset {
                        return None;
                    }
                    result.push_str(unit.text.get(from.offset..to.offset)?);
                    return Some(result);
                }
                result.push_str(unit.text.get(from.offset..)?);
            }
            Some(ref path) => {
                if *path != unit.path {
                    result.push('\n');
                }
                if ends_here {
                    result.push_str(unit.text.get(..to.offset)?);
                    return Some(result);
                }
                result.push_str(unit.text);
            }
        }
        previous_path = Some(unit.path.clone());
    }
    None
}

/// Concatenate the text units, separating units from different blocks
fn flatten(units: Vec<TextUnit<'_>>) -> (String, Vec<SpanRun<'_>>) {
    let mut corpus = String::new();
    let mut runs: Vec<SpanRun<'_>> = Vec::new();
    for unit in units {
        if let Some(previous) = runs.last() {
            if previous.unit.path != unit.path {
                corpus.push('\n');
            }
        }
        let flat_from = corpus.len();
        corpus.push_str(unit.text);
        runs.push(SpanRun {
            flat_from,
            flat_to: corpus.len(),
            unit,
        });
    }
    (corpus, runs)
}

/// Structural positions probed around a flat range, nearest first. A hit
/// whose edge lands on a block separator has no position of its own; a
/// one-byte nudge finds the adjacent document text when any exists.
const SHIFTS: [(isize, isize); 9] = [
    (0, 0),
    (0, -1),
    (0, 1),
    (-1, 0),
    (1, 0),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

fn resolve_match(
    document: &Document,
    corpus: &str,
    runs: &[SpanRun<'_>],
    start: usize,
    end: usize,
) -> Option<Match> {
    for (attempt, (start_shift, end_shift)) in SHIFTS.iter().enumerate() {
        let Some(start) = start.checked_add_signed(*start_shift) else {
            continue;
        };
        let Some(end) = end.checked_add_signed(*end_shift) else {
            continue;
        };
        if start >= end || end > corpus.len() {
            continue;
        }
        if !corpus.is_char_boundary(start) || !corpus.is_char_boundary(end) {
            continue;
        }
        let Some(from) = resolve_start(runs, start) else {
            continue;
        };
        let Some(to) = resolve_end(runs, end) else {
            continue;
        };
        let Some(text) = extract_text(document, &from, &to) else {
            continue;
        };
        // Positions count only when extraction reproduces the flat slice.
        if text == corpus[start..end] {
            if attempt > 0 {
                warn!("Nudged a hit to bytes {}..{} to land on document text", start, end);
            }
            return Some(Match {
                flat_from: start,
                flat_to: end,
                from,
                to,
                text,
            });
        }
    }
    None
}

/// Map a flat start offset to the span that contains it
fn resolve_start(runs: &[SpanRun<'_>], offset: usize) -> Option<Position> {
    let index = runs.partition_point(|run| run.flat_to <= offset);
    let run = runs.get(index)?;
    if offset < run.flat_from {
        return None;
    }
    Some(position_in(run, offset))
}

/// Map a flat end offset to the span whose text it closes
fn resolve_end(runs: &[SpanRun<'_>], offset: usize) -> Option<Position> {
    let index = runs.partition_point(|run| run.flat_to < offset);
    let run = runs.get(index)?;
    if offset <= run.flat_from {
        return None;
    }
    Some(position_in(run, offset))
}

fn position_in(run: &SpanRun<'_>, offset: usize) -> Position {
    Position {
        path: run.unit.path.clone(),
        span: run.unit.span,
        offset: offset - run.flat_from,
    }
}
