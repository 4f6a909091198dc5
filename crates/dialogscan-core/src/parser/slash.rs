//! Slash-command menu parser
//!
//! Screen format:
//! ```text
//! ❯ /
//! ────────────────────
//!   /mcp                         Manage MCP servers
//!   /memory                      Edit memory files
//!   /model                       Set the AI model
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use super::{strip_selection_marker, DialogParser};
use crate::types::{SlashCommand, SlashMenuSnapshot};

/// "/command description" (the leading slash may already be stripped)
static COMMAND_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(/?[a-zA-Z-]+)\s+(.+)$").unwrap());

#[derive(Debug, Default, Clone, Copy)]
pub struct SlashMenuParser;

impl SlashMenuParser {
    pub fn new() -> Self {
        Self
    }
}

impl DialogParser for SlashMenuParser {
    type Output = SlashMenuSnapshot;

    fn name(&self) -> &'static str {
        "slash-menu"
    }

    fn parse(&self, text: &str) -> SlashMenuSnapshot {
        let mut commands = Vec::new();
        let mut selected_index = 0;

        for raw in text.lines() {
            let (clean, is_selected) = strip_selection_marker(raw);
            let Some(caps) = COMMAND_PATTERN.captures(clean) else {
                continue;
            };
            let (Some(token), Some(description)) = (caps.get(1), caps.get(2)) else {
                continue;
            };

            let token = token.as_str();
            let command = if token.starts_with('/') {
                token.to_string()
            } else {
                format!("/{}", token)
            };

            if is_selected {
                selected_index = commands.len();
            }

            commands.push(SlashCommand {
                command,
                description: description.as_str().trim().to_string(),
            });
        }

        SlashMenuSnapshot {
            commands,
            selected_index,
        }
    }
}

/// Parse a block of slash-menu lines
pub fn parse_slash_menu(text: &str) -> SlashMenuSnapshot {
    SlashMenuParser::new().parse(text)
}
