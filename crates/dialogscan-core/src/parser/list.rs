//! Server list parser
//!
//! Parses the "Manage MCP servers" dialog:
//!
//! ```text
//! Manage MCP servers
//! 2 servers
//!
//! Local MCPs (/home/me/.claude.json [project: /home/me/work/app])
//! › browsermcp · ○ disabled
//!
//! User MCPs (/home/me/.claude.json)
//!   chrome-devtools · ✓ connected
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use super::{strip_selection_marker, DialogParser, CONNECTED_GLYPHS, DISABLED_GLYPHS};
use crate::types::{ServerEntry, ServerKind, ServerListSnapshot, ServerStatus};

/// `name · [glyph] [status]`
static SERVER_LINE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-zA-Z0-9_-]+)\s*[·・]\s*([◯○✔✓]?)\s*(connected|disabled|error)?").unwrap()
});

/// Lines that are chrome, never servers
const SKIP_PREFIXES: &[&str] = &["Manage MCP", "https://", "↑↓"];

#[derive(Debug, Default, Clone, Copy)]
pub struct ServerListParser;

impl ServerListParser {
    pub fn new() -> Self {
        Self
    }

    /// Config path from a section header.
    ///
    /// The header may wrap, losing its closing paren; take what is there.
    fn section_path(line: &str) -> Option<&str> {
        let open = line.find('(')?;
        let rest = &line[open + '('.len_utf8()..];
        let inner = match rest.find(')') {
            Some(close) => &rest[..close],
            None => rest,
        };
        if inner.is_empty() {
            None
        } else {
            Some(inner)
        }
    }

    /// Resolve status: explicit word, then check glyph, then circle glyph, else disabled
    fn resolve_status(glyph: Option<&str>, word: Option<&str>) -> ServerStatus {
        if let Some(status) = word.and_then(ServerStatus::from_word) {
            return status;
        }
        match glyph.and_then(|g| g.chars().next()) {
            Some(c) if CONNECTED_GLYPHS.contains(&c) => ServerStatus::Connected,
            Some(c) if DISABLED_GLYPHS.contains(&c) => ServerStatus::Disabled,
            _ => ServerStatus::Disabled,
        }
    }
}

impl DialogParser for ServerListParser {
    type Output = ServerListSnapshot;

    fn name(&self) -> &'static str {
        "server-list"
    }

    fn parse(&self, text: &str) -> ServerListSnapshot {
        let mut entries = Vec::new();
        let mut selected_index = 0;
        let mut kind = ServerKind::Local;
        let mut config_path = String::new();

        for raw in text.lines() {
            let line = raw.trim();
            if line.is_empty() || SKIP_PREFIXES.iter().any(|p| line.starts_with(p)) {
                continue;
            }

            if line.starts_with("Local MCPs") {
                kind = ServerKind::Local;
                if let Some(path) = Self::section_path(line) {
                    // Drop the "[project: ...]" suffix
                    config_path = path.split('[').next().unwrap_or(path).trim().to_string();
                }
                continue;
            }
            if line.starts_with("User MCPs") {
                kind = ServerKind::User;
                if let Some(path) = Self::section_path(line) {
                    config_path = path.to_string();
                }
                continue;
            }

            let (clean, is_selected) = strip_selection_marker(line);
            // Wrapped header continuations and stray glyphs
            if clean.chars().count() < 3 {
                continue;
            }

            let Some(caps) = SERVER_LINE_PATTERN.captures(clean) else {
                continue;
            };
            let Some(name) = caps.get(1) else {
                continue;
            };
            let glyph = caps.get(2).map(|m| m.as_str()).filter(|g| !g.is_empty());
            let word = caps.get(3).map(|m| m.as_str());

            if is_selected {
                selected_index = entries.len();
            }

            entries.push(ServerEntry {
                name: name.as_str().to_string(),
                display_name: Some(name.as_str().to_string()),
                status: Self::resolve_status(glyph, word),
                kind,
                config_path: config_path.clone(),
                ..Default::default()
            });
        }

        ServerListSnapshot {
            entries,
            selected_index,
        }
    }
}

/// Parse a server list block
pub fn parse_server_list(text: &str) -> ServerListSnapshot {
    ServerListParser::new().parse(text)
}
