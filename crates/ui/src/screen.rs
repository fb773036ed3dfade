//! Screen state.

/// Which screen the reader is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Screen {
    /// The file-list screen.
    FileList,
    /// A book is open.
    Reading,
}
