//! Buffer Module - read-only view over the emulated terminal screen
//!
//! # Components
//! - `BufferSnapshot`: the capability a terminal emulator exposes to the scanner
//! - `BufferLine`: owned cells of one row, plus plain-text extraction
//! - `GridSnapshot`: captured grid, scanned without holding the terminal lock
//! - `SelectionPalette`: "is this row highlighted" color heuristic

mod color;
mod term;

pub use color::SelectionPalette;
pub use term::TermSize;

/// Foreground color of a cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CellColor {
    /// Terminal default foreground
    #[default]
    Default,
    /// 0-15 ANSI, 16-255 xterm palette
    Indexed(u8),
    /// True color, packed 0xRRGGBB
    Rgb(u32),
}

impl CellColor {
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        CellColor::Rgb((u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b))
    }
}

/// One cell as the scanner sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellView {
    /// `None` for a never-written cell
    pub ch: Option<char>,
    pub fg: CellColor,
    /// Trailing half of a wide character
    pub spacer: bool,
}

impl CellView {
    pub fn plain(c: char) -> Self {
        Self {
            ch: Some(c),
            fg: CellColor::Default,
            spacer: false,
        }
    }

    pub fn colored(c: char, fg: CellColor) -> Self {
        Self {
            ch: Some(c),
            fg,
            spacer: false,
        }
    }
}

/// Cells of a single buffer row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferLine {
    cells: Vec<CellView>,
}

impl BufferLine {
    pub fn new(cells: Vec<CellView>) -> Self {
        Self { cells }
    }

    /// Build an uncolored line from text
    pub fn from_text(text: &str) -> Self {
        Self::new(text.chars().map(CellView::plain).collect())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, x: usize) -> Option<&CellView> {
        self.cells.get(x)
    }

    /// Paint columns `[from, to)` with a foreground color
    pub fn paint(&mut self, from: usize, to: usize, fg: CellColor) {
        let to = to.min(self.cells.len());
        for cell in self.cells.iter_mut().take(to).skip(from) {
            cell.fg = fg;
        }
    }

    /// Plain text of the row.
    ///
    /// Unwritten cells become spaces, wide-char spacer cells are skipped,
    /// trailing whitespace is trimmed.
    pub fn text(&self) -> String {
        let text: String = self
            .cells
            .iter()
            .filter(|cell| !cell.spacer)
            .map(|cell| cell.ch.unwrap_or(' '))
            .collect();
        text.trim_end().to_string()
    }
}

/// Read-only capability over an emulated screen.
///
/// Line indices are absolute: 0 is the oldest retained scrollback row and
/// `total_lines() - 1` the bottom of the screen.
pub trait BufferSnapshot {
    fn line(&self, index: usize) -> Option<BufferLine>;

    /// Absolute index of the top visible row
    fn viewport_offset(&self) -> usize;

    fn total_lines(&self) -> usize;

    fn visible_rows(&self) -> usize;
}

/// Owned capture of a terminal grid.
///
/// May hold only a tail of the buffer: rows before `first_line` were not
/// captured and read as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridSnapshot {
    lines: Vec<BufferLine>,
    first_line: usize,
    viewport_offset: usize,
    visible_rows: usize,
}

impl GridSnapshot {
    pub fn new(lines: Vec<BufferLine>, viewport_offset: usize, visible_rows: usize) -> Self {
        Self {
            lines,
            first_line: 0,
            viewport_offset,
            visible_rows,
        }
    }

    /// Copy the rows a scan will look at: `lookback` rows above the viewport
    /// through the bottom of the visible area.
    ///
    /// Cheap enough to run while holding the terminal lock; scanning then
    /// happens on the copy.
    pub fn capture<S: BufferSnapshot + ?Sized>(buffer: &S, lookback: usize) -> Self {
        let viewport_offset = buffer.viewport_offset();
        let visible_rows = buffer.visible_rows();
        let start = viewport_offset.saturating_sub(lookback);
        let end = buffer
            .total_lines()
            .min(viewport_offset.saturating_add(visible_rows));

        let lines = (start..end)
            .map(|y| buffer.line(y).unwrap_or_default())
            .collect();

        Self {
            lines,
            first_line: start,
            viewport_offset,
            visible_rows,
        }
    }

    /// Whole text visible, viewport at the top
    pub fn from_text(text: &str) -> Self {
        let lines: Vec<BufferLine> = text.split('\n').map(BufferLine::from_text).collect();
        let rows = lines.len();
        Self::new(lines, 0, rows)
    }

    pub fn with_viewport(mut self, viewport_offset: usize, visible_rows: usize) -> Self {
        self.viewport_offset = viewport_offset;
        self.visible_rows = visible_rows;
        self
    }

    pub fn line_mut(&mut self, index: usize) -> Option<&mut BufferLine> {
        self.lines.get_mut(index)
    }

    /// Plain text of every row, joined with newlines
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(BufferLine::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl BufferSnapshot for GridSnapshot {
    fn line(&self, index: usize) -> Option<BufferLine> {
        let local = index.checked_sub(self.first_line)?;
        self.lines.get(local).cloned()
    }

    fn viewport_offset(&self) -> usize {
        self.viewport_offset
    }

    fn total_lines(&self) -> usize {
        self.first_line + self.lines.len()
    }

    fn visible_rows(&self) -> usize {
        self.visible_rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_text_trims_and_fills_blanks() {
        let mut cells = vec![CellView::plain('a')];
        cells.push(CellView {
            ch: None,
            fg: CellColor::Default,
            spacer: false,
        });
        cells.push(CellView::plain('b'));
        cells.push(CellView::plain(' '));
        cells.push(CellView {
            ch: None,
            fg: CellColor::Default,
            spacer: false,
        });
        assert_eq!(BufferLine::new(cells).text(), "a b");
    }

    #[test]
    fn test_line_text_skips_wide_spacers() {
        let cells = vec![
            CellView::plain('描'),
            CellView {
                ch: Some(' '),
                fg: CellColor::Default,
                spacer: true,
            },
            CellView::plain('述'),
        ];
        assert_eq!(BufferLine::new(cells).text(), "描述");
    }

    #[test]
    fn test_paint_clamps() {
        let mut line = BufferLine::from_text("abc");
        line.paint(1, 10, CellColor::Indexed(4));
        assert_eq!(line.cell(0).map(|c| c.fg), Some(CellColor::Default));
        assert_eq!(line.cell(2).map(|c| c.fg), Some(CellColor::Indexed(4)));
    }

    #[test]
    fn test_grid_snapshot_from_text() {
        let grid = GridSnapshot::from_text("one\ntwo  \n");
        assert_eq!(grid.total_lines(), 3);
        assert_eq!(grid.visible_rows(), 3);
        assert_eq!(grid.viewport_offset(), 0);
        assert_eq!(grid.line(1).map(|l| l.text()), Some("two".to_string()));
        assert!(grid.line(3).is_none());
        assert_eq!(grid.text(), "one\ntwo\n");
    }

    #[test]
    fn test_capture_keeps_absolute_indices() {
        let text = (0..30).map(|i| format!("row {}", i)).collect::<Vec<_>>().join("\n");
        let full = GridSnapshot::from_text(&text).with_viewport(20, 10);

        let captured = GridSnapshot::capture(&full, 5);
        assert_eq!(captured.total_lines(), 30);
        assert_eq!(captured.viewport_offset(), 20);
        assert_eq!(captured.visible_rows(), 10);
        assert!(captured.line(14).is_none());
        assert_eq!(captured.line(15).map(|l| l.text()), Some("row 15".to_string()));
        assert_eq!(captured.line(29).map(|l| l.text()), Some("row 29".to_string()));
        assert!(captured.line(30).is_none());
    }

    #[test]
    fn test_cell_color_rgb() {
        assert_eq!(CellColor::rgb(0x12, 0x34, 0x56), CellColor::Rgb(0x123456));
    }
}
