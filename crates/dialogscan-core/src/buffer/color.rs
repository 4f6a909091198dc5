//! Selection color classification
//!
//! The slash-command menu has no textual selection marker; the highlighted
//! row is drawn in blue. These thresholds follow the renderer's observed
//! palette and are configuration, not protocol.

use serde::{Deserialize, Serialize};

use super::{BufferLine, CellColor};

/// Palette that counts as "selected"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SelectionPalette {
    /// Palette indices treated as blue (4 = blue, 12 = bright blue)
    pub indexed: Vec<u8>,
    /// Exact true-color values treated as blue (packed 0xRRGGBB)
    pub rgb: Vec<u32>,
    /// Minimum blue component for the proximity heuristic
    pub min_blue: u8,
    /// Blue must exceed both red and green by more than this
    pub blue_margin: u8,
    /// Also resolve 256-color cube indices (16..=231) to RGB and apply the heuristic
    pub resolve_cube: bool,
}

impl Default for SelectionPalette {
    fn default() -> Self {
        Self {
            indexed: vec![4, 12],
            rgb: vec![0x5555ff, 0x0000ff],
            min_blue: 100,
            blue_margin: 50,
            resolve_cube: false,
        }
    }
}

impl SelectionPalette {
    /// Is this single foreground color a selection color?
    pub fn is_selected_color(&self, color: CellColor) -> bool {
        match color {
            CellColor::Default => false,
            CellColor::Indexed(idx) => {
                if self.indexed.contains(&idx) {
                    return true;
                }
                if self.resolve_cube && (16..=231).contains(&idx) {
                    return self.is_bluish(cube_to_rgb(idx));
                }
                false
            }
            CellColor::Rgb(packed) => self.rgb.contains(&packed) || self.is_bluish(packed),
        }
    }

    fn is_bluish(&self, packed: u32) -> bool {
        let r = (packed >> 16) & 0xff;
        let g = (packed >> 8) & 0xff;
        let b = packed & 0xff;
        let margin = u32::from(self.blue_margin);
        b > u32::from(self.min_blue) && b > r + margin && b > g + margin
    }

    /// Does any of the first `columns` cells of the line use a selection color?
    pub fn is_line_highlighted(&self, line: &BufferLine, columns: usize) -> bool {
        (0..columns.min(line.len()))
            .filter_map(|x| line.cell(x))
            .any(|cell| self.is_selected_color(cell.fg))
    }
}

/// xterm 6x6x6 color cube entry to packed RGB
fn cube_to_rgb(idx: u8) -> u32 {
    let idx = idx - 16;
    let to_val = |v: u8| -> u32 {
        if v == 0 {
            0
        } else {
            55 + u32::from(v) * 40
        }
    };
    let r = to_val(idx / 36);
    let g = to_val((idx % 36) / 6);
    let b = to_val(idx % 6);
    (r << 16) | (g << 8) | b
}
