//! Hardware boundary for the Inkleaf text reader.
//!
//! The reader core never touches a bus or a framebuffer; it talks to the
//! device through the traits in this crate. Each of the four hardware
//! variants supplies its own implementations and an executor; host tests
//! and the xtask tooling use the `std::fs`-backed implementations behind
//! the `std` feature.
//!
//! # Architecture Layers
//!
//! ```text
//! Cooperative main loop (ui crate)
//!         ↓
//! Reader core (book crate)
//!         ↓
//! Platform boundary (this crate - trait abstractions)
//!         ↓
//! Hardware variant (panel driver, keyboard/touch decoder, SD stack)
//! ```
//!
//! # Abstractions
//!
//! - [`Storage`] / [`File`] — volume access for text files and index records
//! - [`InputDevice`] / [`ReaderAction`] — decoded logical input
//! - [`Presenter`] — text-level render boundary (fonts and pixels stay
//!   on the adapter side)
//! - [`config`] — compiled-in layout constants, the single coupling
//!   point between pagination and what the panel can fit
//!
//! # Features
//!
//! - `std`: host-side `LocalFileStorage` (tests, xtask)
//! - `defmt`: enable defmt::Format derives for hardware logging

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(async_fn_in_trait)] // single-threaded cooperative model, no Send bounds

pub mod config;
pub mod input;
pub mod present;
pub mod storage;

#[cfg(any(feature = "std", test))]
pub mod storage_local;

pub use config::{PageGrid, PREINDEX_PAGES};
pub use input::{InputDevice, ReaderAction};
pub use present::{ListRow, PageView, Presenter};
pub use storage::{DirEntry, File, Storage};

#[cfg(any(feature = "std", test))]
pub use storage_local::{LocalFile, LocalFileStorage};
