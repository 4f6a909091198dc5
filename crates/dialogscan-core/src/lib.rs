//! Dialog detection for terminal-hosted CLI agents
//!
//! Reads the emulated screen of an interactive CLI session and recognizes
//! the dialogs it draws:
//!
//! - the MCP server list ("Manage MCP servers")
//! - a single MCP server's detail view
//! - the slash-command autocomplete menu
//! - the dismissal notice left behind when a dialog closes
//!
//! Each scan produces a [`DialogState`]; parsing never fails, anything
//! unrecognized is simply [`DialogState::None`].
//!
//! # Example
//!
//! ```no_run
//! use alacritty_terminal::event::VoidListener;
//! use alacritty_terminal::term::{Config, Term};
//! use alacritty_terminal::vte::ansi::Processor;
//! use dialogscan_core::{DialogDetector, DialogState, TermSize};
//!
//! let mut term = Term::new(Config::default(), &TermSize::new(120, 40), VoidListener);
//! let mut parser: Processor = Processor::new();
//! parser.advance(&mut term, b"Manage MCP servers\r\n  github \xc2\xb7 \xe2\x9c\x93 connected\r\n");
//!
//! let detector = DialogDetector::default();
//! if let DialogState::ServerList(list) = detector.scan(&term) {
//!     println!("{} servers", list.entries.len());
//! }
//! ```

pub mod buffer;
pub mod config;
pub mod detector;
pub mod parser;
pub mod scanner;
pub mod trigger;
pub mod types;

// Re-exports for convenience
pub use buffer::{BufferLine, BufferSnapshot, CellColor, CellView, GridSnapshot, SelectionPalette, TermSize};
pub use config::{ConfigError, ScanConfig};
pub use detector::DialogDetector;
pub use parser::{parse_server_detail, parse_server_list, parse_slash_menu, DialogParser};
pub use scanner::{extract_block, DialogScanner, ScanOutcome, ScanWindow};
pub use trigger::ScanTrigger;
pub use types::{
    ActionKind, DialogState, ScanReport, ServerAction, ServerDetailSnapshot, ServerEntry, ServerKind,
    ServerListSnapshot, ServerStatus, SlashCommand, SlashMenuSnapshot, ToolInfo,
};
