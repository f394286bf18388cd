//! The stable public entry point: owns one platform strategy and
//! dispatches every open request on a background task so callers never
//! block on a browser starting up.

use crate::error::LaunchError;
use crate::events::EventSender;
use crate::launching::{self, BrowserLaunching};
use std::sync::Arc;

/// Callback for failures raised inside asynchronous dispatch. They
/// never propagate back to the caller; this is the only place they
/// surface.
pub type ErrorHandler = Arc<dyn Fn(LaunchError) + Send + Sync>;

fn default_error_handler() -> ErrorHandler {
    Arc::new(|e| eprintln!("Unable to open browser: {}", e))
}

pub struct BrowserLauncher {
    strategy: Arc<dyn BrowserLaunching>,
    on_error: ErrorHandler,
}

impl BrowserLauncher {
    /// Selects and initializes the strategy for the host platform,
    /// with the default error handler. Probing browser availability
    /// may take a while; construct once and keep the launcher around.
    pub fn new() -> Result<BrowserLauncher, LaunchError> {
        BrowserLauncher::builder().build()
    }

    pub fn builder() -> BrowserLauncherBuilder {
        BrowserLauncherBuilder {
            on_error: default_error_handler(),
            events: None,
        }
    }

    /// Requests an asynchronous open of the url in the OS default
    /// browser. Returns immediately; failures go to the error
    /// handler. Must be called within a tokio runtime.
    pub fn open_url(&self, url: &str) {
        let strategy = self.strategy.clone();
        let url = url.to_string();
        self.dispatch(move || strategy.open_url(&url));
    }

    /// As [`open_url`], targeting a named browser first. Unknown
    /// names and failed launches fall back to the default browser.
    ///
    /// [`open_url`]: BrowserLauncher::open_url
    pub fn open_url_in(&self, browser: &str, url: &str) {
        let strategy = self.strategy.clone();
        let browser = browser.to_string();
        let url = url.to_string();
        self.dispatch(move || strategy.open_url_in(&browser, &url));
    }

    /// As [`open_url`], trying each listed browser in order.
    ///
    /// [`open_url`]: BrowserLauncher::open_url
    pub fn open_url_any(&self, browsers: Vec<String>, url: &str) {
        let strategy = self.strategy.clone();
        let url = url.to_string();
        self.dispatch(move || strategy.open_url_any(&browsers, &url));
    }

    fn dispatch<F>(&self, launch: F)
    where
        F: FnOnce() -> Result<(), LaunchError> + Send + 'static,
    {
        let on_error = self.on_error.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = launch() {
                on_error(e);
            }
        });
    }

    /// Identifiers usable as open targets; the default sentinel comes
    /// first.
    pub fn browser_list(&self) -> Vec<String> {
        self.strategy.browser_list()
    }

    /// The underlying strategy, for callers who want synchronous
    /// error visibility instead of fire-and-forget dispatch.
    pub fn strategy(&self) -> &dyn BrowserLaunching {
        self.strategy.as_ref()
    }
}

pub struct BrowserLauncherBuilder {
    on_error: ErrorHandler,
    events: Option<EventSender>,
}

impl BrowserLauncherBuilder {
    pub fn error_handler(mut self, on_error: ErrorHandler) -> BrowserLauncherBuilder {
        self.on_error = on_error;
        self
    }

    /// Installs a channel that receives one event per native launch.
    pub fn events(mut self, events: EventSender) -> BrowserLauncherBuilder {
        self.events = Some(events);
        self
    }

    /// Builds a launcher around the host platform's strategy.
    pub fn build(self) -> Result<BrowserLauncher, LaunchError> {
        self.wrap(launching::host_strategy()?)
    }

    /// Builds a launcher around an already-initialized strategy the
    /// caller selected or configured themselves.
    pub fn build_with(
        self,
        strategy: Box<dyn BrowserLaunching>,
    ) -> Result<BrowserLauncher, LaunchError> {
        self.wrap(strategy)
    }

    fn wrap(
        self,
        mut strategy: Box<dyn BrowserLaunching>,
    ) -> Result<BrowserLauncher, LaunchError> {
        if let Some(events) = self.events {
            strategy.set_event_sender(events);
        }
        Ok(BrowserLauncher {
            strategy: Arc::from(strategy),
            on_error: self.on_error,
        })
    }
}

/// One-shot convenience: builds a default launcher and requests an
/// asynchronous open of the url. Construction errors are returned;
/// launch failures go to the default error handler. Library consumers
/// with more than one url to open should build a [`BrowserLauncher`]
/// themselves and reuse it.
pub fn open_url(url: &str) -> Result<(), LaunchError> {
    let launcher = BrowserLauncher::new()?;
    launcher.open_url(url);
    Ok(())
}
