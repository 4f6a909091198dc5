//! Core types for dialogscan
//!
//! Every value here is built fresh by one scan cycle and handed to the
//! caller; nothing is cached between scans.

use serde::{Deserialize, Serialize};

// ============ Server Entries ============

/// Connection status shown next to a server name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerStatus {
    Connected,
    #[default]
    Disabled,
    Error,
}

impl ServerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerStatus::Connected => "connected",
            ServerStatus::Disabled => "disabled",
            ServerStatus::Error => "error",
        }
    }

    /// Parse the literal status word rendered by the dialog
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "connected" => Some(ServerStatus::Connected),
            "disabled" => Some(ServerStatus::Disabled),
            "error" => Some(ServerStatus::Error),
            _ => None,
        }
    }
}

/// Which config section a server was listed under
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerKind {
    #[default]
    Local,
    User,
}

/// Operation offered by the server detail view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    #[default]
    ViewTools,
    Reconnect,
    Disable,
    Enable,
}

impl ActionKind {
    /// Classify an action label by case-insensitive substring.
    ///
    /// Checked in order: "view tools", "reconnect", "disable", "enable".
    /// Unrecognized labels fall back to `ViewTools`.
    pub fn from_label(label: &str) -> Self {
        let lower = label.to_lowercase();
        if lower.contains("view tools") {
            ActionKind::ViewTools
        } else if lower.contains("reconnect") {
            ActionKind::Reconnect
        } else if lower.contains("disable") {
            ActionKind::Disable
        } else if lower.contains("enable") {
            ActionKind::Enable
        } else {
            ActionKind::ViewTools
        }
    }
}

/// One selectable action on a server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerAction {
    pub label: String,
    pub kind: ActionKind,
}

impl ServerAction {
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        let kind = ActionKind::from_label(&label);
        Self { label, kind }
    }
}

/// One row of the server list, or the subject of the detail view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub status: ServerStatus,
    pub kind: ServerKind,
    pub config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<ServerAction>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_action_index: Option<usize>,
}

impl ServerEntry {
    /// The action currently highlighted in the detail view, if any
    pub fn selected_action(&self) -> Option<&ServerAction> {
        let actions = self.actions.as_ref()?;
        actions.get(self.selected_action_index?)
    }
}

// ============ Dialog Snapshots ============

/// Parsed "Manage MCP servers" list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerListSnapshot {
    /// Visual top-to-bottom order
    pub entries: Vec<ServerEntry>,
    /// Meaningless (0) when `entries` is empty
    pub selected_index: usize,
}

impl ServerListSnapshot {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn selected(&self) -> Option<&ServerEntry> {
        self.entries.get(self.selected_index)
    }
}

/// Tool listed by a server (not recoverable from the detail view yet)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
}

/// Parsed single-server detail view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerDetailSnapshot {
    /// `None` means the block was not a detail dialog
    pub entry: Option<ServerEntry>,
    pub tools: Vec<ToolInfo>,
}

/// One row of the slash-command menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlashCommand {
    /// Always starts with `/`
    pub command: String,
    pub description: String,
}

/// Parsed slash-command autocomplete menu
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlashMenuSnapshot {
    pub commands: Vec<SlashCommand>,
    pub selected_index: usize,
}

// ============ Scan Results ============

/// What one scan cycle found on screen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DialogState {
    /// The dialog was explicitly dismissed; overlays should be removed
    Cleared,
    ServerList(ServerListSnapshot),
    ServerDetail(ServerDetailSnapshot),
    SlashMenu(SlashMenuSnapshot),
    /// No recognizable dialog
    #[default]
    None,
}

impl DialogState {
    pub fn kind(&self) -> &'static str {
        match self {
            DialogState::Cleared => "cleared",
            DialogState::ServerList(_) => "server_list",
            DialogState::ServerDetail(_) => "server_detail",
            DialogState::SlashMenu(_) => "slash_menu",
            DialogState::None => "none",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, DialogState::None)
    }
}

/// A scan result stamped with the window it covered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub state: DialogState,
    /// Absolute buffer lines `[start, end)` that were scanned
    pub window: (usize, usize),
    pub scanned_at_ms: i64,
}

impl ScanReport {
    pub fn new(state: DialogState, window: (usize, usize)) -> Self {
        Self {
            state,
            window,
            scanned_at_ms: chrono::Utc::now().timestamp_millis(),
        }
    }
}
