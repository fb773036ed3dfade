//! File-list selection model.
//!
//! A cursor over a fixed list of rows. Moves clamp at both ends; an
//! empty list pins the cursor at 0 and rejects every move.

/// Selection cursor for the file list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Browse {
    selected: usize,
    count: usize,
}

impl Browse {
    /// Cursor over `count` rows, starting at the top.
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self { selected: 0, count }
    }

    /// Currently selected row.
    #[must_use]
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Move the selection up. Returns false when already at the top.
    pub fn move_up(&mut self) -> bool {
        if self.selected > 0 {
            self.selected = self.selected.saturating_sub(1);
            true
        } else {
            false
        }
    }

    /// Move the selection down. Returns false when already at the
    /// bottom (or the list is empty).
    pub fn move_down(&mut self) -> bool {
        let next = self.selected.saturating_add(1);
        if next < self.count {
            self.selected = next;
            true
        } else {
            false
        }
    }
}
