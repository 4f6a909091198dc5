//! Dialog scanner
//!
//! Classifies which dialog (if any) is on screen from a bounded window of
//! buffer lines.
//!
//! ## Detection Strategy
//!
//! - **Dismissal** short-circuits everything, even markers seen above it.
//! - **List and detail headers**: the last occurrence of each wins, since the
//!   most recent redraw is lowest on screen. When both are visible and the
//!   list header is below the detail header, the user pressed Esc to go back:
//!   report the list. Otherwise the detail view wins.
//! - **Slash menu** (only when no header is present): the longest run of at
//!   least `min_slash_run` consecutive `/command description` lines. The menu
//!   has no textual cursor, so the selected row is found by color.

mod block;

pub use block::extract_block;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::buffer::{BufferLine, BufferSnapshot};
use crate::config::ScanConfig;

/// "[marker] /command description"
static SLASH_LINE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[❯›]?\s*/[a-zA-Z-]+\s+").unwrap());

/// One buffer line inside the scan window
#[derive(Debug, Clone)]
pub struct WindowLine {
    /// Absolute buffer index
    pub index: usize,
    pub text: String,
    pub cells: BufferLine,
}

/// Lines `[start, end)` read from a buffer for one scan.
///
/// Missing buffer lines are left out, so indices may have gaps.
#[derive(Debug, Clone, Default)]
pub struct ScanWindow {
    pub start: usize,
    pub end: usize,
    lines: Vec<WindowLine>,
}

impl ScanWindow {
    /// Read `lookback` rows above the viewport through the last visible row
    pub fn from_buffer<S: BufferSnapshot + ?Sized>(buffer: &S, lookback: usize) -> Self {
        let viewport = buffer.viewport_offset();
        let start = viewport.saturating_sub(lookback);
        let end = buffer
            .total_lines()
            .min(viewport.saturating_add(buffer.visible_rows()));

        let lines = (start..end)
            .filter_map(|index| {
                let cells = buffer.line(index)?;
                Some(WindowLine {
                    index,
                    text: cells.text(),
                    cells,
                })
            })
            .collect();

        Self { start, end, lines }
    }

    pub fn lines(&self) -> &[WindowLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Scanner verdict for one window
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Dismissal marker visible
    Dismissed,
    /// Server list header at this absolute line
    ListAt(usize),
    /// Server detail header at this absolute line
    DetailAt(usize),
    /// Slash menu lines (text) and the color-highlighted row
    SlashBlock {
        lines: Vec<String>,
        selected_index: usize,
    },
    None,
}

/// Classifies a scan window
#[derive(Debug, Clone, Copy)]
pub struct DialogScanner<'a> {
    config: &'a ScanConfig,
}

impl<'a> DialogScanner<'a> {
    pub fn new(config: &'a ScanConfig) -> Self {
        Self { config }
    }

    pub fn classify(&self, window: &ScanWindow) -> ScanOutcome {
        let config = self.config;
        let mut list_at: Option<usize> = None;
        let mut detail_at: Option<usize> = None;

        for line in window.lines() {
            let text = line.text.as_str();

            if text.contains(config.dismissal_marker.as_str()) {
                debug!(line = line.index, "Dialog dismissal marker found");
                return ScanOutcome::Dismissed;
            }

            let is_list = text.contains(config.list_marker.as_str());
            if is_list {
                list_at = Some(line.index);
            }
            if !is_list && text.contains(config.detail_marker.as_str()) {
                detail_at = Some(line.index);
            }
        }

        match (list_at, detail_at) {
            (Some(list), Some(detail)) if list > detail => {
                debug!(list, detail, "List redrawn below detail (back navigation)");
                ScanOutcome::ListAt(list)
            }
            (_, Some(detail)) => {
                debug!(line = detail, "Server detail header found");
                ScanOutcome::DetailAt(detail)
            }
            (Some(list), None) => {
                debug!(line = list, "Server list header found");
                ScanOutcome::ListAt(list)
            }
            (None, None) => self.find_slash_block(window),
        }
    }

    /// Longest qualifying run of slash-command lines; ties keep the first
    fn find_slash_block(&self, window: &ScanWindow) -> ScanOutcome {
        let min_run = self.config.min_slash_run.max(1);
        let mut best: Vec<&WindowLine> = Vec::new();
        let mut run: Vec<&WindowLine> = Vec::new();

        for line in window.lines() {
            if SLASH_LINE_PATTERN.is_match(&line.text) {
                run.push(line);
                continue;
            }
            if run.len() >= min_run && run.len() > best.len() {
                best = std::mem::take(&mut run);
            } else {
                run.clear();
            }
        }
        if run.len() >= min_run && run.len() > best.len() {
            best = run;
        }

        if best.len() < min_run {
            return ScanOutcome::None;
        }

        let palette = &self.config.palette;
        let columns = self.config.highlight_columns;
        let selected_index = best
            .iter()
            .position(|line| palette.is_line_highlighted(&line.cells, columns))
            .unwrap_or(0);

        debug!(
            lines = best.len(),
            first = best[0].index,
            selected_index,
            "Slash menu block found"
        );

        ScanOutcome::SlashBlock {
            lines: best.iter().map(|l| l.text.clone()).collect(),
            selected_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{CellColor, GridSnapshot};

    fn classify(text: &str) -> ScanOutcome {
        let config = ScanConfig::default();
        let grid = GridSnapshot::from_text(text);
        let window = ScanWindow::from_buffer(&grid, config.lookback_lines);
        DialogScanner::new(&config).classify(&window)
    }

    #[test]
    fn test_window_bounds() {
        let text = (0..50).map(|i| format!("row {}", i)).collect::<Vec<_>>().join("\n");
        let grid = GridSnapshot::from_text(&text).with_viewport(30, 15);
        let window = ScanWindow::from_buffer(&grid, 10);
        assert_eq!(window.start, 20);
        assert_eq!(window.end, 45);
        assert_eq!(window.lines().first().map(|l| l.index), Some(20));
        assert_eq!(window.lines().last().map(|l| l.text.as_str()), Some("row 44"));

        // Near the top the lookback is clamped, near the bottom the buffer ends
        let grid = GridSnapshot::from_text(&text).with_viewport(3, 100);
        let window = ScanWindow::from_buffer(&grid, 10);
        assert_eq!((window.start, window.end), (0, 50));
    }

    #[test]
    fn test_list_detected() {
        let outcome = classify("$ claude\n> /mcp\nManage MCP servers\n1 server\n  a · ✓ connected");
        assert_eq!(outcome, ScanOutcome::ListAt(2));
    }

    #[test]
    fn test_detail_detected() {
        let outcome = classify("Manage-ish text\nChrome-devtools MCP Server v2.1.17\nStatus: ✓ connected");
        assert_eq!(outcome, ScanOutcome::DetailAt(1));
    }

    #[test]
    fn test_list_header_is_not_detail() {
        // "Manage MCP servers" never counts as a detail header
        let outcome = classify("Manage MCP servers\nLocal MCPs (/a)\n› x · ○ disabled");
        assert_eq!(outcome, ScanOutcome::ListAt(0));
    }

    #[test]
    fn test_dismissal_wins_over_earlier_markers() {
        let outcome = classify("Manage MCP servers\nFoo MCP Server\nMCP dialog dismissed\nManage MCP servers");
        assert_eq!(outcome, ScanOutcome::Dismissed);
    }

    #[test]
    fn test_back_navigation_prefers_list_below_detail() {
        let outcome = classify("Foo MCP Server\nStatus: ✓ connected\n\nManage MCP servers\n  foo · ✓ connected");
        assert_eq!(outcome, ScanOutcome::ListAt(3));
    }

    #[test]
    fn test_detail_below_list_wins() {
        let outcome = classify("Manage MCP servers\n› foo · ✓ connected\n\nFoo MCP Server\nStatus: ✓ connected");
        assert_eq!(outcome, ScanOutcome::DetailAt(3));
    }

    #[test]
    fn test_last_marker_occurrence_wins() {
        let outcome = classify("Manage MCP servers\nold\nManage MCP servers\nnew");
        assert_eq!(outcome, ScanOutcome::ListAt(2));
    }

    #[test]
    fn test_markers_above_window_ignored() {
        let mut rows = vec!["Manage MCP servers".to_string()];
        rows.extend((0..40).map(|i| format!("output {}", i)));
        let grid = GridSnapshot::from_text(&rows.join("\n")).with_viewport(21, 20);
        let config = ScanConfig::default();
        let window = ScanWindow::from_buffer(&grid, config.lookback_lines);
        assert_eq!(DialogScanner::new(&config).classify(&window), ScanOutcome::None);
    }

    #[test]
    fn test_two_slash_lines_not_a_menu() {
        let outcome = classify("❯ /\n  /help   Show help\n  /mcp    Manage MCP connections\n");
        assert_eq!(outcome, ScanOutcome::None);
    }

    #[test]
    fn test_three_slash_lines_is_a_menu() {
        let outcome = classify("❯ /\n  /help   Show help\n  /mcp    Manage MCP connections\n  /model  Set the AI model\nfooter");
        match outcome {
            ScanOutcome::SlashBlock {
                lines,
                selected_index,
            } => {
                assert_eq!(lines.len(), 3);
                assert_eq!(lines[0], "  /help   Show help");
                assert_eq!(selected_index, 0);
            }
            other => panic!("expected slash block, got {:?}", other),
        }
    }

    #[test]
    fn test_longest_run_wins_ties_keep_first() {
        let text = "  /a  one\n  /b  two\n  /c  three\nbreak\n  /d  four\n  /e  five\n  /f  six\n  /g  seven\nbreak\n  /h  x\n  /i  y\n  /j  z\n  /k  w";
        match classify(text) {
            ScanOutcome::SlashBlock { lines, .. } => {
                assert_eq!(lines.len(), 4);
                assert!(lines[0].contains("/d"));
            }
            other => panic!("expected slash block, got {:?}", other),
        }
    }

    #[test]
    fn test_slash_selection_by_color() {
        let config = ScanConfig::default();
        let mut grid = GridSnapshot::from_text(
            "  /help   Show help\n  /mcp    Manage MCP connections\n  /model  Set the AI model",
        );
        if let Some(line) = grid.line_mut(1) {
            line.paint(2, 6, CellColor::rgb(0x57, 0x69, 0xea));
        }
        let window = ScanWindow::from_buffer(&grid, config.lookback_lines);
        match DialogScanner::new(&config).classify(&window) {
            ScanOutcome::SlashBlock { selected_index, .. } => assert_eq!(selected_index, 1),
            other => panic!("expected slash block, got {:?}", other),
        }
    }

    #[test]
    fn test_slash_color_beyond_leading_columns_ignored() {
        let config = ScanConfig::default();
        let mut grid = GridSnapshot::from_text(
            "  /help   Show help and more text\n  /mcp    Manage MCP connections\n  /model  Set the AI model",
        );
        if let Some(line) = grid.line_mut(0) {
            line.paint(22, 30, CellColor::Indexed(4));
        }
        let window = ScanWindow::from_buffer(&grid, config.lookback_lines);
        match DialogScanner::new(&config).classify(&window) {
            ScanOutcome::SlashBlock { selected_index, .. } => assert_eq!(selected_index, 0),
            other => panic!("expected slash block, got {:?}", other),
        }
    }

    #[test]
    fn test_headers_suppress_slash_scan() {
        let outcome = classify("Manage MCP servers\n  /a  one\n  /b  two\n  /c  three");
        assert_eq!(outcome, ScanOutcome::ListAt(0));
    }

    #[test]
    fn test_empty_window() {
        assert_eq!(classify(""), ScanOutcome::None);
        let config = ScanConfig::default();
        let window = ScanWindow::default();
        assert!(window.is_empty());
        assert_eq!(DialogScanner::new(&config).classify(&window), ScanOutcome::None);
    }
}
