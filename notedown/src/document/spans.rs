//! Inline span representation
//!
//! Spans are the leaf content of paragraphs, headings, and table cells.
//! Text spans carry a set of marks, inline math is atomic and opaque, and
//! links carry their target alongside plain visible text.

/// Formatting marks applied to a text span
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Marks {
    /// Bold (strong emphasis)
    pub bold: bool,
    /// Italic (emphasis)
    pub italic: bool,
    /// Underline
    pub underline: bool,
    /// Strikethrough
    pub strike: bool,
    /// Inline code
    pub code: bool,
}

impl Marks {
    /// Create an empty mark set
    pub fn none() -> Self {
        Self::default()
    }

    /// Check whether no mark is set
    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }
}

/// Inline content of a leaf block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    /// A run of text sharing one set of marks
    Text {
        /// The text content
        text: String,
        /// Marks applied to the whole run
        marks: Marks,
    },
    /// An atomic inline formula, stored as raw LaTeX without delimiters
    Math {
        /// The LaTeX payload
        latex: String,
    },
    /// A hyperlink with plain visible text
    Link {
        /// The visible link text
        text: String,
        /// The link target
        href: String,
    },
}

impl Span {
    /// Create a plain text span with no marks
    pub fn text(text: String) -> Self {
        Span::Text {
            text,
            marks: Marks::none(),
        }
    }

    /// Create a text span with the given marks
    pub fn styled(text: String, marks: Marks) -> Self {
        Span::Text { text, marks }
    }
}

/// Plain-text rendering of a span sequence
///
/// Marks are stripped, link text stands in for the link, and inline math
/// contributes its LaTeX source.
pub fn plain_text(spans: &[Span]) -> String {
    let mut text = String::new();
    for span in spans {
        match span {
            Span::Text { text: content, .. } | Span::Link { text: content, .. } => {
                text.push_str(content);
            }
            Span::Math { latex } => text.push_str(latex),
        }
    }
    text
}

/// Active mark state while folding the markdown event stream
#[derive(Debug, Clone, Default)]
pub struct MarkState {
    /// Inside strong emphasis
    pub bold: bool,
    /// Inside emphasis
    pub italic: bool,
    /// Inside an underline element
    pub underline: bool,
    /// Inside strikethrough
    pub strike: bool,
    /// Target of the link currently open, if any
    pub link: Option<String>,
}

impl MarkState {
    /// Create a state with nothing active
    pub fn new() -> Self {
        Self::default()
    }

    /// The marks a text span started now would carry
    ///
    /// Inline code never comes from the state: code arrives as its own
    /// event and is marked at the point it is pushed.
    pub fn marks(&self) -> Marks {
        Marks {
            bold: self.bold,
            italic: self.italic,
            underline: self.underline,
            strike: self.strike,
            code: false,
        }
    }
}
