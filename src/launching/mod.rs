//! Platform launch strategies and the selector that picks one.
//!
//! Each supported platform family gets one implementation of
//! [`BrowserLaunching`]; [`select_strategy`] maps an OS name (and, for
//! legacy Mac OS, a runtime version string) onto the right one, and
//! [`host_strategy`] does that for the machine we are running on.

use crate::error::LaunchError;
use crate::events::EventSender;
use log::info;

pub mod browser;
pub mod execute;
pub mod macos;
pub mod unix;
pub mod windows;

use macos::{MacEra, MacLaunching};
use unix::UnixLaunching;
use windows::{WindowsLaunching, WindowsVersionKey};

/// Reserved browser identifier meaning "let the OS choose".
pub const DEFAULT_BROWSER: &str = "default";

pub const PROTOCOL_HTTP: &str = "http";
pub const PROTOCOL_FILE: &str = "file";
pub const PROTOCOL_MAILTO: &str = "mailto";

/// The platform family a strategy drives. Selection happens once per
/// process; exactly one key is ever active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum PlatformKey {
    Unix,
    Windows9x,
    Windows2000,
    WindowsNt,
    MacOs2_0,
    MacOs2_1,
    MacOs3_0,
    MacOs3_1,
}

/// The launch contract every platform strategy implements.
///
/// `initialize` must be called exactly once before any `open_url`
/// variant; calling an open method on an uninitialized strategy is a
/// contract violation and panics. The open methods block until the
/// native launch command exits, so callers that must not block wrap
/// them in a background task (the façade in [`crate::BrowserLauncher`]
/// does exactly that).
pub trait BrowserLaunching: Send + Sync {
    /// Resolves the set of available browsers on this host. May take
    /// hundreds of milliseconds; probing shells out.
    fn initialize(&mut self) -> Result<(), LaunchError>;

    /// Opens the url in the OS default browser. A non-zero exit
    /// status is not an error for this call; failing to start or wait
    /// for the process is.
    fn open_url(&self, url: &str) -> Result<(), LaunchError>;

    /// Opens the url in the named browser. An unknown name or the
    /// default sentinel falls through to [`open_url`]; a launch that
    /// fails falls back to the default browser exactly once.
    ///
    /// [`open_url`]: BrowserLaunching::open_url
    fn open_url_in(&self, browser: &str, url: &str) -> Result<(), LaunchError>;

    /// Tries each named browser in list order, stopping at the first
    /// success. Unknown names are skipped; if nothing on the list
    /// succeeds the default browser is tried.
    fn open_url_any(&self, browsers: &[String], url: &str) -> Result<(), LaunchError>;

    /// Identifiers usable with [`open_url_in`]. The default sentinel
    /// is always the first element, whatever the catalog holds.
    ///
    /// [`open_url_in`]: BrowserLaunching::open_url_in
    fn browser_list(&self) -> Vec<String>;

    fn platform(&self) -> PlatformKey;

    /// Installs a channel that receives one event per native launch.
    /// Strategies that never launch anything may ignore it.
    fn set_event_sender(&mut self, _sender: EventSender) {}
}

impl std::fmt::Debug for dyn BrowserLaunching {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserLaunching")
            .field("platform", &self.platform())
            .finish()
    }
}

/// Extracts the protocol portion of a url string (`http`, `file`,
/// `mailto`, ...). No validation beyond that; a malformed url is the
/// caller's concern.
pub fn url_protocol(url: &str) -> &str {
    match url.find(':') {
        Some(idx) => &url[..idx],
        None => "",
    }
}

/// Maps an OS name (and a runtime version string, on Mac) onto a
/// launch strategy. Pure and deterministic: the same inputs always
/// pick the same variant. The returned strategy is uninitialized.
pub fn select_strategy(
    os_name: &str,
    runtime_version: Option<&str>,
) -> Result<Box<dyn BrowserLaunching>, LaunchError> {
    if os_name.starts_with("Mac OS") {
        let version = runtime_version.ok_or_else(|| {
            LaunchError::UnsupportedPlatform(format!(
                "no runtime version reported for {}",
                os_name
            ))
        })?;
        Ok(Box::new(MacLaunching::new(mac_era(version)?)))
    } else if os_name.starts_with("Windows") {
        // Order matters: "Windows 98" has no "2000" but "Windows
        // 2000" has no "9" either, and everything else is NT-family.
        let key = if os_name.contains('9') {
            WindowsVersionKey::Win9x
        } else if os_name.contains("2000") {
            WindowsVersionKey::Win2000
        } else {
            WindowsVersionKey::WinNt
        };
        Ok(Box::new(WindowsLaunching::new(key)))
    } else {
        Ok(Box::new(UnixLaunching::new()))
    }
}

/// Maps a Mac runtime version string onto a strategy era by its major
/// numeric component: `2.0` exactly, `[2.1, 3.0)`, `3.0` exactly, or
/// `>= 3.1`. Anything else is unsupported.
fn mac_era(version: &str) -> Result<MacEra, LaunchError> {
    // The major component is everything up to the second dot:
    // "2.2.5" -> "2.2".
    let major = match version.match_indices('.').nth(1) {
        Some((idx, _)) => &version[..idx],
        None => version,
    };
    let major: f64 = major.trim().parse().map_err(|_| {
        LaunchError::UnsupportedPlatform(format!(
            "invalid Mac runtime version: {}",
            version
        ))
    })?;

    if major == 2.0 {
        Ok(MacEra::V2_0)
    } else if major >= 2.1 && major < 3.0 {
        Ok(MacEra::V2_1)
    } else if major == 3.0 {
        Ok(MacEra::V3_0)
    } else if major >= 3.1 {
        Ok(MacEra::V3_1)
    } else {
        Err(LaunchError::UnsupportedPlatform(format!(
            "unsupported Mac runtime version: {}",
            version
        )))
    }
}

/// Selects and initializes the strategy for the host we are running
/// on.
pub fn host_strategy() -> Result<Box<dyn BrowserLaunching>, LaunchError> {
    let (os_name, runtime_version) = host_identity();
    let mut strategy = select_strategy(&os_name, runtime_version.as_deref())?;
    strategy.initialize()?;
    info!("selected {:?} launch strategy", strategy.platform());
    Ok(strategy)
}

/// Maps the compile-time target onto the (os name, runtime version)
/// pair the selector branches on. Modern macOS is presented as the
/// newest Mac family so it takes the `/usr/bin/open` path.
fn host_identity() -> (String, Option<String>) {
    match std::env::consts::OS {
        "macos" => ("Mac OS X".to_string(), Some("3.1".to_string())),
        "windows" => ("Windows NT".to_string(), None),
        other => (other.to_string(), None),
    }
}
