//! The legacy Mac OS launch strategies. No probing and no browser
//! targeting here: the OS owns the notion of a default browser, and
//! every open goes through its url-open event. Named and list opens
//! silently degrade to the default path.

use crate::error::LaunchError;
use crate::events::{self, EventSender};
use crate::launching::execute::{self, ProcessRunner};
use crate::launching::{BrowserLaunching, PlatformKey, DEFAULT_BROWSER};
use log::{debug, info};

/// Which runtime generation we are launching under. The 3.x line has
/// the `open` utility; the 2.x line only understands the AppleScript
/// `open location` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum MacEra {
    V2_0,
    V2_1,
    V3_0,
    V3_1,
}

pub struct MacLaunching {
    era: MacEra,
    initialized: bool,
    runner: ProcessRunner,
    events: Option<EventSender>,
}

impl MacLaunching {
    pub fn new(era: MacEra) -> MacLaunching {
        MacLaunching::with_runner(era, execute::native_runner())
    }

    pub fn with_runner(era: MacEra, runner: ProcessRunner) -> MacLaunching {
        MacLaunching { era, initialized: false, runner, events: None }
    }

    fn open_args(era: MacEra, url: &str) -> Vec<String> {
        match era {
            MacEra::V3_0 | MacEra::V3_1 => {
                vec!["/usr/bin/open".to_string(), url.to_string()]
            }
            MacEra::V2_0 | MacEra::V2_1 => vec![
                "osascript".to_string(),
                "-e".to_string(),
                format!("open location \"{}\"", url),
            ],
        }
    }
}

impl BrowserLaunching for MacLaunching {
    /// Nothing to probe: the OS url-open event is assumed present.
    fn initialize(&mut self) -> Result<(), LaunchError> {
        self.initialized = true;
        Ok(())
    }

    fn open_url(&self, url: &str) -> Result<(), LaunchError> {
        assert!(
            self.initialized,
            "initialize() must be called before opening a url"
        );
        info!("opening {}", url);
        let args = MacLaunching::open_args(self.era, url);
        debug!("launch args: {:?}", args);
        let outcome = (self.runner)(&args)?;
        events::emit(self.events.as_ref(), DEFAULT_BROWSER, url, &outcome);
        Ok(())
    }

    fn open_url_in(&self, browser: &str, url: &str) -> Result<(), LaunchError> {
        debug!(
            "browser targeting is not supported on Mac OS; ignoring {}",
            browser
        );
        self.open_url(url)
    }

    fn open_url_any(&self, _browsers: &[String], url: &str) -> Result<(), LaunchError> {
        debug!("browser targeting is not supported on Mac OS");
        self.open_url(url)
    }

    fn browser_list(&self) -> Vec<String> {
        vec![DEFAULT_BROWSER.to_string()]
    }

    fn platform(&self) -> PlatformKey {
        match self.era {
            MacEra::V2_0 => PlatformKey::MacOs2_0,
            MacEra::V2_1 => PlatformKey::MacOs2_1,
            MacEra::V3_0 => PlatformKey::MacOs3_0,
            MacEra::V3_1 => PlatformKey::MacOs3_1,
        }
    }

    fn set_event_sender(&mut self, sender: EventSender) {
        self.events = Some(sender);
    }
}
