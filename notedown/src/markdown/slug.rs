//! Heading slug generation
//!
//! Every heading gets a stable, document-unique id derived from its text.
//! Ids are assigned in traversal order during each parse and never
//! serialized, so re-parsing the same source yields the same ids.

use std::collections::HashSet;

/// Reduce heading text to its slug form
///
/// Lowercases, keeps letters, digits, whitespace, and hyphens, turns
/// whitespace runs into single hyphens, collapses repeated hyphens, and
/// trims hyphens from both ends. Text with nothing to keep yields an
/// empty slug; [`SlugTable::assign`] substitutes a positional fallback.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for ch in text.to_lowercase().chars() {
        if ch.is_whitespace() || ch == '-' {
            pending_hyphen = !slug.is_empty();
            continue;
        }
        if !ch.is_ascii_alphanumeric() {
            continue;
        }
        if pending_hyphen {
            slug.push('-');
            pending_hyphen = false;
        }
        slug.push(ch);
    }
    slug
}

/// Tracks assigned slugs and disambiguates duplicates
#[derive(Debug, Default)]
pub struct SlugTable {
    used: HashSet<String>,
    headings_seen: usize,
}

impl SlugTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a unique id for a heading with the given display text
    ///
    /// The first occurrence of a slug is used as-is; later occurrences get
    /// `-1`, `-2`, and so on. Headings with no sluggable characters get a
    /// positional `heading-{n}` id, disambiguated through the same table.
    pub fn assign(&mut self, text: &str) -> String {
        self.headings_seen += 1;
        let base = match slugify(text) {
            slug if slug.is_empty() => format!("heading-{}", self.headings_seen),
            slug => slug,
        };
        if self.used.insert(base.clone()) {
            return base;
        }
        let mut suffix = 1;
        loop {
            let candidate = format!("{}-{}", base, suffix);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_lowercases_and_hyphenates() {
        assert_eq!(slugify("Getting Started"), "getting-started");
        assert_eq!(slugify("  Extra   Spaces  "), "extra-spaces");
        assert_eq!(slugify("Already-Hyphenated --- Twice"), "already-hyphenated-twice");
    }

    #[test]
    fn test_slugify_strips_punctuation_and_non_ascii() {
        assert_eq!(slugify("What's New? (2024)"), "whats-new-2024");
        assert_eq!(slugify("Café désérté"), "caf-dsrt");
        assert_eq!(slugify("§§ ¶¶"), "");
    }

    #[test]
    fn test_assign_disambiguates_duplicates_in_order() {
        let mut table = SlugTable::new();

        assert_eq!(table.assign("Notes"), "notes");
        assert_eq!(table.assign("Notes"), "notes-1");
        assert_eq!(table.assign("Notes"), "notes-2");
    }

    #[test]
    fn test_assign_survives_natural_suffix_collisions() {
        let mut table = SlugTable::new();

        // The third heading's natural slug collides with the suffixed
        // second one and must be pushed further.
        assert_eq!(table.assign("A"), "a");
        assert_eq!(table.assign("A"), "a-1");
        assert_eq!(table.assign("A 1"), "a-1-1");
    }

    #[test]
    fn test_assign_falls_back_to_position_for_empty_slugs() {
        let mut table = SlugTable::new();

        assert_eq!(table.assign("First"), "first");
        assert_eq!(table.assign("!!!"), "heading-2");
        assert_eq!(table.assign("???"), "heading-3");
    }
}
