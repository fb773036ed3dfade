//! Reader front end: screen state, list selection, and the
//! cooperative main loop gluing input, the reader core, and the
//! presenter together.

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod browse;
pub mod controller;
pub mod screen;

pub use browse::Browse;
pub use controller::{ControlError, Controller};
pub use screen::Screen;
