//! alacritty_terminal adapter
//!
//! Exposes a `Term` as a `BufferSnapshot`. Absolute line 0 is the topmost
//! scrollback row, which alacritty addresses as `Line(-history_size)`.

use alacritty_terminal::grid::Dimensions;
use alacritty_terminal::index::Line;
use alacritty_terminal::term::cell::{Cell, Flags};
use alacritty_terminal::term::Term;
use alacritty_terminal::vte::ansi::{Color, NamedColor};

use super::{BufferLine, BufferSnapshot, CellColor, CellView};

/// Terminal size for creating a `Term`
#[derive(Debug, Clone, Copy)]
pub struct TermSize {
    pub cols: usize,
    pub rows: usize,
}

impl TermSize {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self { cols, rows }
    }
}

impl Dimensions for TermSize {
    fn total_lines(&self) -> usize {
        self.rows
    }

    fn screen_lines(&self) -> usize {
        self.rows
    }

    fn columns(&self) -> usize {
        self.cols
    }
}

/// Map alacritty's color model onto palette indices / packed RGB
fn convert_color(color: Color) -> CellColor {
    match color {
        Color::Spec(rgb) => CellColor::rgb(rgb.r, rgb.g, rgb.b),
        Color::Indexed(idx) => CellColor::Indexed(idx),
        Color::Named(name) => named_index(name).map_or(CellColor::Default, CellColor::Indexed),
    }
}

/// ANSI 16 palette position of a named color
fn named_index(name: NamedColor) -> Option<u8> {
    let idx = match name {
        NamedColor::Black => 0,
        NamedColor::Red => 1,
        NamedColor::Green => 2,
        NamedColor::Yellow => 3,
        NamedColor::Blue => 4,
        NamedColor::Magenta => 5,
        NamedColor::Cyan => 6,
        NamedColor::White => 7,
        NamedColor::BrightBlack => 8,
        NamedColor::BrightRed => 9,
        NamedColor::BrightGreen => 10,
        NamedColor::BrightYellow => 11,
        NamedColor::BrightBlue => 12,
        NamedColor::BrightMagenta => 13,
        NamedColor::BrightCyan => 14,
        NamedColor::BrightWhite => 15,
        _ => return None,
    };
    Some(idx)
}

fn convert_cell(cell: &Cell) -> CellView {
    let flags = cell.flags;
    // Inverse video draws the text in the background color
    let fg = if flags.contains(Flags::INVERSE) {
        cell.bg
    } else {
        cell.fg
    };
    CellView {
        ch: Some(cell.c),
        fg: convert_color(fg),
        spacer: flags.intersects(Flags::WIDE_CHAR_SPACER | Flags::LEADING_WIDE_CHAR_SPACER),
    }
}

impl<T> BufferSnapshot for Term<T> {
    fn line(&self, index: usize) -> Option<BufferLine> {
        let grid = self.grid();
        let history = grid.history_size();
        if index >= history + grid.screen_lines() {
            return None;
        }
        let line = i32::try_from(index).ok()? - i32::try_from(history).ok()?;
        let row = &grid[Line(line)];
        let cells = row
            .into_iter()
            .take(grid.columns())
            .map(convert_cell)
            .collect();
        Some(BufferLine::new(cells))
    }

    fn viewport_offset(&self) -> usize {
        let grid = self.grid();
        grid.history_size().saturating_sub(grid.display_offset())
    }

    fn total_lines(&self) -> usize {
        let grid = self.grid();
        grid.history_size() + grid.screen_lines()
    }

    fn visible_rows(&self) -> usize {
        self.grid().screen_lines()
    }
}
