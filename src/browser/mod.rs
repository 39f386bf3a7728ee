//! Browser automation module
//!
//! Handles resolving, launching and controlling the one Chromium-family
//! browser instance a test suite runs against.

mod errors;
mod factory;
mod session;

pub use errors::BrowserError;
pub use factory::{BrowserKind, LaunchOptions};
pub use session::{BrowserSession, DialogWatcher, ElementState};
