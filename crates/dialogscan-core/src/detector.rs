//! Dialog detector - one full scan cycle
//!
//! buffer → scan window → classify → extract block → variant parser.
//!
//! A cycle never fails: anything unparseable yields `DialogState::None`, and
//! a panic inside the cycle is caught and reported the same way, so the next
//! trigger starts clean.

use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::{debug, error, warn};

use crate::buffer::BufferSnapshot;
use crate::config::ScanConfig;
use crate::parser::{DialogParser, ServerDetailParser, ServerListParser, SlashMenuParser};
use crate::scanner::{extract_block, DialogScanner, ScanOutcome, ScanWindow};
use crate::types::{DialogState, ScanReport, SlashMenuSnapshot};

#[derive(Debug, Clone, Default)]
pub struct DialogDetector {
    config: ScanConfig,
    list_parser: ServerListParser,
    detail_parser: ServerDetailParser,
    slash_parser: SlashMenuParser,
}

impl DialogDetector {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Run one scan cycle over the buffer
    pub fn scan<S: BufferSnapshot + ?Sized>(&self, buffer: &S) -> DialogState {
        self.scan_report(buffer).state
    }

    /// Run one scan cycle and stamp the result with the scanned window
    pub fn scan_report<S: BufferSnapshot + ?Sized>(&self, buffer: &S) -> ScanReport {
        let result = catch_unwind(AssertUnwindSafe(|| {
            let window = ScanWindow::from_buffer(buffer, self.config.lookback_lines);
            let state = self.scan_window(&window);
            (state, (window.start, window.end))
        }));

        match result {
            Ok((state, bounds)) => ScanReport::new(state, bounds),
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!(error = %message, "Dialog scan panicked, treating as no dialog");
                ScanReport::new(DialogState::None, (0, 0))
            }
        }
    }

    /// Classify and parse an already-read window
    pub fn scan_window(&self, window: &ScanWindow) -> DialogState {
        let scanner = DialogScanner::new(&self.config);

        match scanner.classify(window) {
            ScanOutcome::Dismissed => DialogState::Cleared,
            ScanOutcome::ListAt(start) => {
                let block = extract_block(window, start, &self.config.list_footers);
                let snapshot = self.list_parser.parse(&block);
                if snapshot.is_empty() {
                    warn!(
                        parser = self.list_parser.name(),
                        line = start,
                        content = %truncate(&block, 200),
                        "Server list header found but no servers parsed"
                    );
                    return DialogState::None;
                }
                debug!(
                    servers = snapshot.entries.len(),
                    selected_index = snapshot.selected_index,
                    "Parsed server list"
                );
                DialogState::ServerList(snapshot)
            }
            ScanOutcome::DetailAt(start) => {
                let block = extract_block(window, start, &self.config.detail_footers);
                let snapshot = self.detail_parser.parse(&block);
                match &snapshot.entry {
                    Some(entry) => {
                        debug!(server = %entry.name, "Parsed server detail");
                        DialogState::ServerDetail(snapshot)
                    }
                    None => {
                        warn!(
                            parser = self.detail_parser.name(),
                            line = start,
                            "Server detail header found but parsing failed"
                        );
                        DialogState::None
                    }
                }
            }
            ScanOutcome::SlashBlock {
                lines,
                selected_index,
            } => {
                let parsed = self.slash_parser.parse(&lines.join("\n"));
                if parsed.commands.len() < self.config.min_slash_run {
                    debug!(
                        commands = parsed.commands.len(),
                        "Slash block too short after parsing"
                    );
                    return DialogState::None;
                }
                // Selection comes from the highlight color, not the parser
                let selected_index = selected_index.min(parsed.commands.len() - 1);
                DialogState::SlashMenu(SlashMenuSnapshot {
                    commands: parsed.commands,
                    selected_index,
                })
            }
            ScanOutcome::None => DialogState::None,
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{BufferLine, CellColor, GridSnapshot};
    use crate::types::{ServerKind, ServerStatus};

    fn scan(text: &str) -> DialogState {
        DialogDetector::default().scan(&GridSnapshot::from_text(text))
    }

    const LIST_SCREEN: &str = r#"╭───────────────────────────────────────────╮
│ > /mcp                                    │
╰───────────────────────────────────────────╯
Manage MCP servers
2 servers

Local MCPs (/Users/shane/.claude.json [project: /Users/shane/work])
› browsermcp · ○ disabled

User MCPs (/Users/shane/.claude.json)
  chrome-devtools · ✓ connected

https://code.claude.com/docs/en/mcp for help

↑↓ to navigate · Enter to confirm · Esc to cancel"#;

    #[test]
    fn test_scan_server_list() {
        match scan(LIST_SCREEN) {
            DialogState::ServerList(list) => {
                assert_eq!(list.entries.len(), 2);
                assert_eq!(list.selected_index, 0);
                assert_eq!(list.entries[0].name, "browsermcp");
                assert_eq!(list.entries[0].kind, ServerKind::Local);
                assert_eq!(list.entries[1].status, ServerStatus::Connected);
                assert_eq!(list.entries[1].kind, ServerKind::User);
            }
            other => panic!("expected server list, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_server_detail() {
        let screen = "Manage MCP servers\n› chrome-devtools · ✓ connected\n\nChrome-devtools MCP Server v2.1.17\nStatus: ✓ connected\nCommand: npx\n\n  1. View tools\n❯ 2. Reconnect\n  3. Disable\n\n↑↓ to navigate · Enter to select · Esc to cancel\n  4. Not an action";
        match scan(screen) {
            DialogState::ServerDetail(detail) => {
                let entry = detail.entry.expect("entry");
                assert_eq!(entry.name, "chrome-devtools");
                assert_eq!(entry.actions.map(|a| a.len()), Some(3));
                assert_eq!(entry.selected_action_index, Some(1));
                assert!(detail.tools.is_empty());
            }
            other => panic!("expected server detail, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_back_to_list() {
        let screen = "Chrome-devtools MCP Server v2.1.17\nStatus: ✓ connected\n\nManage MCP servers\n1 server\n\nUser MCPs (/u.json)\n› chrome-devtools · ✓ connected";
        match scan(screen) {
            DialogState::ServerList(list) => assert_eq!(list.entries.len(), 1),
            other => panic!("expected server list, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_dismissed() {
        let screen = format!("{}\n\n> /mcp\n  ⎿  MCP dialog dismissed", LIST_SCREEN);
        assert_eq!(scan(&screen), DialogState::Cleared);
    }

    #[test]
    fn test_list_header_without_servers_is_none() {
        assert_eq!(scan("Manage MCP servers\nNo MCP servers configured"), DialogState::None);
    }

    #[test]
    fn test_detail_header_without_name_is_none() {
        // Contains the marker but no "<name> MCP Server" title shape
        assert_eq!(scan("  MCP Server"), DialogState::None);
    }

    #[test]
    fn test_scan_slash_menu_with_color_selection() {
        let mut grid = GridSnapshot::from_text(
            "❯ /m\n────────\n  /mcp      Manage MCP connections\n  /memory   Edit Claude memory files\n  /model    Set the AI model",
        );
        if let Some(line) = grid.line_mut(4) {
            line.paint(0, 12, CellColor::Indexed(12));
        }
        match DialogDetector::default().scan(&grid) {
            DialogState::SlashMenu(menu) => {
                assert_eq!(menu.commands.len(), 3);
                assert_eq!(menu.commands[1].command, "/memory");
                assert_eq!(menu.selected_index, 2);
            }
            other => panic!("expected slash menu, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_output_is_none() {
        assert_eq!(scan("$ ls\nCargo.toml  src\n$"), DialogState::None);
        assert_eq!(scan(""), DialogState::None);
    }

    struct PanickingBuffer;

    impl BufferSnapshot for PanickingBuffer {
        fn line(&self, _index: usize) -> Option<BufferLine> {
            panic!("renderer went away");
        }

        fn viewport_offset(&self) -> usize {
            0
        }

        fn total_lines(&self) -> usize {
            5
        }

        fn visible_rows(&self) -> usize {
            5
        }
    }

    #[test]
    fn test_panic_is_contained() {
        let detector = DialogDetector::default();
        let report = detector.scan_report(&PanickingBuffer);
        assert_eq!(report.state, DialogState::None);
        assert_eq!(report.window, (0, 0));

        // The next cycle is unaffected
        assert_eq!(detector.scan(&GridSnapshot::from_text("nothing")), DialogState::None);
    }

    #[test]
    fn test_report_window() {
        let text = (0..40).map(|i| format!("row {}", i)).collect::<Vec<_>>().join("\n");
        let grid = GridSnapshot::from_text(&text).with_viewport(25, 15);
        let report = DialogDetector::default().scan_report(&grid);
        assert_eq!(report.window, (15, 40));
        assert!(report.scanned_at_ms > 0);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abc", 2), "ab");
        assert_eq!(truncate("描述文本", 2), "描述");
        assert_eq!(truncate("ab", 5), "ab");
    }
}
