//! Reader core: pagination, index caching, and session state.
//!
//! Everything here is hardware-agnostic and bounded: no allocation, no
//! panics, storage reached only through the `platform` traits. The
//! pipeline from bytes on the volume to a page on the panel:
//!
//! ```text
//! wrap      — where does this line end?
//! paginate  — where does each page start? (streaming scan)
//! index     — in-memory offset table, bounded capacity
//! binary    — on-disk record layout, versioned
//! store     — record cache under /.index, validate-or-rebuild
//! catalog   — one entry per text file at the volume root
//! session   — one open book: finish index, turn pages, save position
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod binary;
pub mod catalog;
pub mod index;
pub mod paginate;
pub mod session;
pub mod store;
pub mod wrap;

pub use catalog::{BookCatalog, BookEntry, Catalog, CatalogError, MAX_BOOKS};
pub use index::{BookIndex, IndexError, PageIndex, MAX_PAGES};
pub use paginate::PaginateError;
pub use session::{PageTurn, ReaderSession, SessionError};
pub use wrap::{find_line_break, LineBreak};
