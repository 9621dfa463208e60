//! Text normalization.
//!
//! Turns raw pasted text into the exact character stream that gets typed:
//! blank lines disappear, every surviving line loses its edge whitespace,
//! and tabs are expanded or removed according to a [`TabPolicy`].

use crate::error::{Result, TyperError};

/// Tab width used when none is configured or the configured one is invalid.
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Widest tab expansion accepted from configuration.
pub const MAX_TAB_WIDTH: usize = 64;

/// What to do with literal tab characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabPolicy {
    /// Replace every tab with this many spaces.
    ReplaceWithSpaces(usize),
    /// Delete every tab.
    RemoveTabs,
}

impl Default for TabPolicy {
    fn default() -> Self {
        Self::ReplaceWithSpaces(DEFAULT_TAB_WIDTH)
    }
}

impl TabPolicy {
    fn apply(self, text: &str) -> String {
        if !text.contains('\t') {
            return text.to_string();
        }
        match self {
            Self::ReplaceWithSpaces(count) => text.replace('\t', &" ".repeat(count)),
            Self::RemoveTabs => text.replace('\t', ""),
        }
    }
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{1c}'..='\u{1e}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Normalize `raw` into the text that will be typed.
///
/// Lines that are empty after trimming are dropped entirely, so runs of blank
/// lines collapse to nothing rather than to a single newline. Surviving lines
/// are trimmed and joined with `\n`, then `policy` is applied to any tabs left
/// inside them.
///
/// # Example
///
/// ```
/// use code_auto_typer::{normalize, TabPolicy};
///
/// let typed = normalize("a\tb\n\n  c  ", TabPolicy::ReplaceWithSpaces(2));
/// assert_eq!(typed, "a  b\nc");
/// ```
pub fn normalize(raw: &str, policy: TabPolicy) -> String {
    let joined = raw
        .split(is_line_break)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    policy.apply(&joined)
}

/// Normalize `raw` and split it into the character queue for a typing job.
///
/// Fails with [`TyperError::EmptyInput`] when there is nothing but
/// whitespace to type.
pub fn prepare(raw: &str, policy: TabPolicy) -> Result<Vec<char>> {
    if raw.trim().is_empty() {
        return Err(TyperError::EmptyInput);
    }

    Ok(normalize(raw, policy).chars().collect())
}
