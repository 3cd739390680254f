//! Name allocation for wires.

use crate::{WireError, WireResult};
use lazy_static::lazy_static;
use regex::Regex;
use std::panic::Location;

lazy_static! {
    static ref NON_WORD_RE: Regex = Regex::new(r"[\W_]+").unwrap();
}

/// Names that belong to the implicit clock.
pub const RESERVED_NAMES: [&str; 2] = ["clk", "clock"];

/// Monotonic `<prefix><n>` name source.
///
/// Each block owns its own indexers, so independent blocks never share a
/// sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameIndexer {
    prefix: String,
    index: u64,
}

impl NameIndexer {
    /// Create an indexer that has not handed out any name yet.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            index: 0,
        }
    }

    /// Advance the counter and return the next name.
    pub fn next_name(&mut self) -> String {
        self.index += 1;
        format!("{}{}", self.prefix, self.index)
    }

    /// Number of names handed out so far.
    #[must_use]
    pub const fn count(&self) -> u64 {
        self.index
    }

    /// The prefix every name starts with.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

/// Check a user supplied wire name.
///
/// # Errors
/// [`WireError::EmptyName`] for `""`, [`WireError::ReservedName`] for
/// `clk`/`clock` in any case.
pub fn validate_wire_name(name: &str) -> WireResult<()> {
    if name.is_empty() {
        return Err(WireError::EmptyName);
    }
    let lowered = name.to_lowercase();
    if RESERVED_NAMES.contains(&lowered.as_str()) {
        return Err(WireError::ReservedName(name.to_string()));
    }
    Ok(())
}

/// `_<file>_line<N>` suffix for debug names; the file name keeps only its
/// alphanumeric characters.
#[must_use]
pub fn callsite_suffix(location: &Location<'_>) -> String {
    let safe = NON_WORD_RE.replace_all(location.file(), "");
    format!("_{}_line{}", safe, location.line())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexer_counts_from_one() {
        let mut names = NameIndexer::new("tmp");
        assert_eq!(names.next_name(), "tmp1");
        assert_eq!(names.next_name(), "tmp2");
        assert_eq!(names.count(), 2);
        assert_eq!(names.prefix(), "tmp");
    }

    #[test]
    fn clock_names_are_reserved() {
        assert_eq!(
            validate_wire_name("CLK"),
            Err(WireError::ReservedName("CLK".into()))
        );
        assert!(validate_wire_name("Clock").is_err());
        assert!(validate_wire_name("clk_en").is_ok());
        assert_eq!(validate_wire_name(""), Err(WireError::EmptyName));
    }

    #[test]
    fn suffix_strips_punctuation() {
        let suffix = callsite_suffix(Location::caller());
        assert!(suffix.contains("namingrs_line"));
        assert!(suffix.chars().skip(1).all(|c| c.is_alphanumeric() || c == '_'));
    }
}
