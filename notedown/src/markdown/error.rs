//! Error types for markdown parsing

use thiserror::Error;

/// Errors from folding the markdown event stream into a tree
///
/// Each variant marks a structurally inconsistent event sequence.
/// [`try_parse`](super::try_parse) surfaces them; [`parse`](super::parse)
/// recovers by keeping the raw text as a plain paragraph instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A closing event arrived with no matching element open
    #[error("closing event for {element} without a matching opening event")]
    UnexpectedEnd {
        /// The element the event tried to close
        element: &'static str,
    },

    /// The event stream ended while an element was still open
    #[error("input ended while a {element} was still open")]
    UnclosedElement {
        /// The element left open
        element: &'static str,
    },

    /// A finished block had no container to attach to
    #[error("a finished block could not be attached inside {context}")]
    MisplacedBlock {
        /// The container the block could not join
        context: &'static str,
    },
}
