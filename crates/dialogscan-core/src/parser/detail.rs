//! Server detail parser
//!
//! Parses the single-server view reached from the list:
//!
//! ```text
//! Browsermcp MCP Server v2.1.17
//! Status: ◯ disabled
//! Command: npx
//! Args: @browsermcp/mcp@latest
//! Config location: /home/me/.claude.json [project: /home/me/work/app]
//!
//! ❯ 1. Enable
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use super::{DialogParser, BOX_DRAWING, CONNECTED_GLYPHS, DISABLED_GLYPHS, SELECTION_MARKERS};
use crate::types::{ServerAction, ServerDetailSnapshot, ServerEntry, ServerKind, ServerStatus};

/// Title line: "Chrome-devtools MCP Server v2.1.17"
static TITLE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\S+)\s+MCP Server").unwrap());

/// "Config location: <path> [project: ...]"
static CONFIG_LOCATION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Config location:\s*(.+?)(?:\s*\[|$)").unwrap());

/// Numbered action: "❯ 1. View tools", "  2. Reconnect"
static ACTION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([❯›]?)\s*\d+\.\s*(.+)$").unwrap());

#[derive(Debug, Default, Clone, Copy)]
pub struct ServerDetailParser;

impl ServerDetailParser {
    pub fn new() -> Self {
        Self
    }

    /// Status line, checked in order: disabled, connected, error
    fn parse_status(line: &str) -> Option<ServerStatus> {
        if line.contains("disabled") || line.contains(DISABLED_GLYPHS) {
            Some(ServerStatus::Disabled)
        } else if line.contains("connected") || line.contains(CONNECTED_GLYPHS) {
            Some(ServerStatus::Connected)
        } else if line.contains("error") {
            Some(ServerStatus::Error)
        } else {
            None
        }
    }

    fn capitalize(name: &str) -> String {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl DialogParser for ServerDetailParser {
    type Output = ServerDetailSnapshot;

    fn name(&self) -> &'static str {
        "server-detail"
    }

    fn parse(&self, text: &str) -> ServerDetailSnapshot {
        let mut name: Option<String> = None;
        let mut status = ServerStatus::Disabled;
        let mut command: Option<String> = None;
        let mut args: Vec<String> = Vec::new();
        let mut config_path = String::new();
        let mut actions: Vec<ServerAction> = Vec::new();
        let mut selected_action = 0;

        for raw in text.lines() {
            let cleaned: String = raw.chars().filter(|c| !BOX_DRAWING.contains(c)).collect();
            let line = cleaned.trim();

            if line.contains(" MCP Server") {
                if let Some(caps) = TITLE_PATTERN.captures(line) {
                    name = caps.get(1).map(|m| m.as_str().to_lowercase());
                }
            }

            if line.starts_with("Status:") {
                if let Some(parsed) = Self::parse_status(line) {
                    status = parsed;
                }
            }

            if let Some(rest) = line.strip_prefix("Command:") {
                let rest = rest.trim();
                command = (!rest.is_empty()).then(|| rest.to_string());
            }

            // Kept as one raw string; splitting would need shell quoting rules
            if let Some(rest) = line.strip_prefix("Args:") {
                let rest = rest.trim();
                args = if rest.is_empty() {
                    Vec::new()
                } else {
                    vec![rest.to_string()]
                };
            }

            if line.starts_with("Config location:") {
                if let Some(path) = CONFIG_LOCATION_PATTERN.captures(line).and_then(|c| c.get(1)) {
                    config_path = path.as_str().trim().to_string();
                }
            }

            if let Some(caps) = ACTION_PATTERN.captures(line) {
                let marked = caps
                    .get(1)
                    .and_then(|m| m.as_str().chars().next())
                    .is_some_and(|c| SELECTION_MARKERS.contains(&c));
                let label = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
                if marked {
                    selected_action = actions.len();
                }
                actions.push(ServerAction::new(label));
            }
        }

        let entry = name.map(|name| {
            let has_actions = !actions.is_empty();
            ServerEntry {
                display_name: Some(Self::capitalize(&name)),
                name,
                status,
                // The detail view shows no section, so the kind is unknown
                kind: ServerKind::Local,
                config_path,
                command,
                args,
                selected_action_index: has_actions.then_some(selected_action),
                actions: has_actions.then_some(actions),
                ..Default::default()
            }
        });

        ServerDetailSnapshot {
            entry,
            tools: Vec::new(),
        }
    }
}

/// Parse a server detail block
pub fn parse_server_detail(text: &str) -> ServerDetailSnapshot {
    ServerDetailParser::new().parse(text)
}
