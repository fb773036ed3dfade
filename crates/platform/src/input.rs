//! Input device abstraction.
//!
//! Raw key matrices and touch controllers are decoded by the hardware
//! variant; the core only ever sees the closed [`ReaderAction`] set.
//! Debouncing and key-repeat timing are the variant's responsibility.

/// Input device trait for keyboards and touch panels.
pub trait InputDevice {
    /// Wait for the next logical action (async, power-efficient).
    fn wait_for_action(&mut self) -> impl core::future::Future<Output = ReaderAction>;

    /// Poll for an action (non-blocking).
    fn poll_action(&mut self) -> Option<ReaderAction>;
}

/// Logical actions produced by the input adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReaderAction {
    /// Move the file-list selection up.
    NavigateUp,
    /// Move the file-list selection down.
    NavigateDown,
    /// Open the selected item.
    Activate,
    /// Turn to the next page.
    PageForward,
    /// Turn to the previous page.
    PageBackward,
    /// Leave the current book, back to the file list.
    Exit,
}
