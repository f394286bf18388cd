//! Open a URL in the user's default (or a specifically named) web
//! browser, papering over the per-operating-system differences in how
//! that launch actually happens.
//!
//! Most callers want [`BrowserLauncher`], which picks a launch
//! strategy for the host at construction and dispatches every open on
//! a background task. Callers who need synchronous error visibility
//! can select and drive a strategy from [`launching`] directly.

pub mod config;
mod error;
mod events;
mod launcher;
pub mod launching;

pub use error::LaunchError;
pub use events::{EventSender, LaunchEvent};
pub use launcher::{open_url, BrowserLauncher, BrowserLauncherBuilder, ErrorHandler};
pub use launching::{
    select_strategy, BrowserLaunching, PlatformKey, DEFAULT_BROWSER,
};
