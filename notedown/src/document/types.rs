//! Shared type definitions

/// Horizontal alignment of a block or table cell
///
/// Left is the default everywhere: left-aligned content is written without
/// any alignment syntax and parses back as `Left`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    /// Left-aligned, the default
    #[default]
    Left,
    /// Centered
    Center,
    /// Right-aligned
    Right,
}

impl From<pulldown_cmark::Alignment> for Alignment {
    fn from(align: pulldown_cmark::Alignment) -> Self {
        match align {
            pulldown_cmark::Alignment::None | pulldown_cmark::Alignment::Left => Alignment::Left,
            pulldown_cmark::Alignment::Center => Alignment::Center,
            pulldown_cmark::Alignment::Right => Alignment::Right,
        }
    }
}
