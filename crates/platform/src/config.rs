//! Compiled-in configuration and constants.
//!
//! The device has no CLI, no environment, no config files: every tunable
//! is a constant here, and the hardware variants override only what their
//! panel geometry demands. `PageGrid` is the one value shared between the
//! indexer and whatever wraps text at render time — the two must agree or
//! page boundaries drift away from what the panel shows.

/// Pages indexed eagerly per file at startup, before a book is opened.
///
/// Keeps the startup scan bounded on large files; opening such a book
/// finishes the index from where the pre-pass stopped.
pub const PREINDEX_PAGES: u32 = 100;

/// Character grid a page of text is laid out on.
///
/// Width and height in *characters*, not pixels; the presentation
/// adapter owns the font metrics that make this fit the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PageGrid {
    /// Printable characters per rendered line.
    pub chars_per_line: u16,
    /// Text lines per rendered page.
    pub lines_per_page: u16,
}

impl PageGrid {
    /// Grid for the 240×320 reference panel with the stock 6×12 font.
    pub const fn reference_panel() -> Self {
        Self {
            chars_per_line: 38,
            lines_per_page: 25,
        }
    }

    /// Upper bound on the byte length of one page, used to size read
    /// buffers. Lines may carry non-printable bytes beyond the printable
    /// budget, so this doubles the character grid area.
    pub const fn page_byte_budget(&self) -> usize {
        (self.chars_per_line as usize) * (self.lines_per_page as usize) * 2
    }
}

impl Default for PageGrid {
    fn default() -> Self {
        Self::reference_panel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_panel_matches_stock_font() {
        let grid = PageGrid::reference_panel();
        assert_eq!(grid.chars_per_line, 38);
        assert_eq!(grid.lines_per_page, 25);
    }

    #[test]
    fn page_byte_budget_covers_grid_twice() {
        let grid = PageGrid::reference_panel();
        assert_eq!(grid.page_byte_budget(), 38 * 25 * 2);
    }
}
