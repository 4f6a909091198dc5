//! Dialog text parsers
//!
//! Pure text → structured data, one parser per dialog variant. Parsers never
//! fail: text that does not fit the expected shape is skipped, and an empty
//! block produces an empty result.

mod detail;
mod list;
mod slash;

pub use detail::{parse_server_detail, ServerDetailParser};
pub use list::{parse_server_list, ServerListParser};
pub use slash::{parse_slash_menu, SlashMenuParser};

/// Leading glyphs marking the highlighted row
pub const SELECTION_MARKERS: &[char] = &['❯', '›'];

pub const CONNECTED_GLYPHS: &[char] = &['✔', '✓'];

pub const DISABLED_GLYPHS: &[char] = &['◯', '○'];

/// Frame glyphs around the detail view
pub const BOX_DRAWING: &[char] = &['│', '╭', '╮', '╯', '╰', '─'];

/// A text-block parser for one dialog variant
pub trait DialogParser {
    type Output;

    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    fn parse(&self, text: &str) -> Self::Output;
}

/// Split a leading selection marker off a trimmed line.
///
/// Returns the remainder (trimmed) and whether a marker was present.
pub(crate) fn strip_selection_marker(line: &str) -> (&str, bool) {
    let trimmed = line.trim();
    match trimmed.strip_prefix(SELECTION_MARKERS) {
        Some(rest) => (rest.trim(), true),
        None => (trimmed, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_selection_marker() {
        assert_eq!(strip_selection_marker("❯ foo"), ("foo", true));
        assert_eq!(strip_selection_marker("  › bar  "), ("bar", true));
        assert_eq!(strip_selection_marker("›baz"), ("baz", true));
        assert_eq!(strip_selection_marker("  plain"), ("plain", false));
        assert_eq!(strip_selection_marker(""), ("", false));
    }
}
