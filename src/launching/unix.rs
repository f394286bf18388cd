//! The Unix-like launch strategy: probe for installed browsers with
//! `which`, then launch by first asking an already-running instance to
//! open the url (`-remote "openURL(...)"`) and starting a fresh
//! instance only when that is refused.

use crate::config;
use crate::error::LaunchError;
use crate::events::{self, EventSender};
use crate::launching::browser::{BrowserCatalog, BrowserDescriptor};
use crate::launching::execute::{self, LaunchOutcome, ProcessRunner};
use crate::launching::{BrowserLaunching, PlatformKey, DEFAULT_BROWSER};
use log::{debug, info, warn};

const UNIX_CONFIG: &str = include_str!("unix_config.toml");

pub struct UnixLaunching {
    catalog: BrowserCatalog,
    initialized: bool,
    runner: ProcessRunner,
    events: Option<EventSender>,
}

impl UnixLaunching {
    pub fn new() -> UnixLaunching {
        UnixLaunching::with_runner(execute::native_runner())
    }

    /// Builds a strategy around a substitute process-exec collaborator.
    pub fn with_runner(runner: ProcessRunner) -> UnixLaunching {
        UnixLaunching {
            catalog: BrowserCatalog::new(),
            initialized: false,
            runner,
            events: None,
        }
    }

    /// Probes a specific candidate list instead of the configured one.
    /// At least one candidate must be installed; a Unix host has no
    /// OS-level default-browser command to fall back on.
    pub fn initialize_with_candidates(
        &mut self,
        candidates: &[BrowserDescriptor],
    ) -> Result<(), LaunchError> {
        let catalog = self.probe(candidates);
        if catalog.is_empty() {
            let names: Vec<&str> =
                candidates.iter().map(|c| c.command_name()).collect();
            return Err(LaunchError::Initialization(format!(
                "one of the supported browsers must be installed: {}",
                names.join(", ")
            )));
        }
        info!("available browsers: {:?}", catalog.display_names());
        self.catalog = catalog;
        self.initialized = true;
        Ok(())
    }

    /// Checks each candidate with a `which` lookup; exit status zero
    /// means installed. Browsers that cannot be confirmed are simply
    /// left out.
    fn probe(&self, candidates: &[BrowserDescriptor]) -> BrowserCatalog {
        let mut catalog = BrowserCatalog::new();
        for candidate in candidates {
            let lookup =
                vec!["which".to_string(), candidate.command_name().to_string()];
            match (self.runner)(&lookup) {
                Ok(outcome) if outcome.success => {
                    debug!("found {} on the path", candidate.command_name());
                    catalog.insert(candidate.clone());
                }
                Ok(_) => {
                    debug!("{} is not on the path", candidate.command_name())
                }
                Err(e) => {
                    warn!("error probing for {}: {}", candidate.command_name(), e)
                }
            }
        }
        catalog
    }

    /// The "open in an already-running instance" form.
    fn remote_args(browser: &BrowserDescriptor, url: &str) -> Vec<String> {
        vec![
            browser.command_name().to_string(),
            "-remote".to_string(),
            format!("openURL({})", url),
        ]
    }

    /// The "start a fresh instance" form, optionally forcing a new
    /// window for explicitly targeted browsers.
    fn fresh_args(
        browser: &BrowserDescriptor,
        url: &str,
        new_window: bool,
    ) -> Vec<String> {
        let mut args = vec![browser.command_name().to_string()];
        if new_window {
            args.extend(browser.new_window_args().iter().cloned());
        }
        args.push(url.to_string());
        args
    }

    /// Tries the remote-open form and, when its exit status is
    /// non-zero, the fresh-instance form. Returns the final outcome;
    /// whether a non-zero final exit matters is the caller's call.
    fn launch_with(
        &self,
        browser: &BrowserDescriptor,
        url: &str,
        new_window: bool,
    ) -> Result<LaunchOutcome, LaunchError> {
        debug!("trying {}", browser.display_name());
        let mut outcome = (self.runner)(&Self::remote_args(browser, url))?;
        if !outcome.success {
            debug!(
                "no running {} instance; starting a fresh one",
                browser.display_name()
            );
            outcome = (self.runner)(&Self::fresh_args(browser, url, new_window))?;
        }
        events::emit(self.events.as_ref(), browser.display_name(), url, &outcome);
        Ok(outcome)
    }

    fn require_initialized(&self) {
        assert!(
            self.initialized,
            "initialize() must be called before opening a url"
        );
    }
}

impl Default for UnixLaunching {
    fn default() -> UnixLaunching {
        UnixLaunching::new()
    }
}

impl BrowserLaunching for UnixLaunching {
    fn initialize(&mut self) -> Result<(), LaunchError> {
        let config = config::load_with_override(UNIX_CONFIG)?;
        self.initialize_with_candidates(&config.browsers)
    }

    /// Walks the catalog in priority order until a browser accepts the
    /// url. Every browser exiting non-zero is not an error here; this
    /// call is best-effort.
    fn open_url(&self, url: &str) -> Result<(), LaunchError> {
        self.require_initialized();
        info!("opening {}", url);
        for browser in self.catalog.iter() {
            if self.launch_with(browser, url, false)?.success {
                return Ok(());
            }
        }
        Ok(())
    }

    fn open_url_in(&self, browser: &str, url: &str) -> Result<(), LaunchError> {
        self.require_initialized();
        if browser == DEFAULT_BROWSER {
            debug!("default browser target; falling through");
            return self.open_url(url);
        }
        let Some(descriptor) = self.catalog.find(browser) else {
            info!("no browser named {} is available; using the default", browser);
            return self.open_url(url);
        };
        match self.launch_with(descriptor, url, true) {
            Ok(outcome) if outcome.success => Ok(()),
            Ok(_) => {
                debug!("{} failed; falling back to the default", browser);
                self.open_url(url)
            }
            Err(e) => {
                warn!("error launching {}: {}; falling back to the default", browser, e);
                self.open_url(url)
            }
        }
    }

    fn open_url_any(&self, browsers: &[String], url: &str) -> Result<(), LaunchError> {
        self.require_initialized();
        for name in browsers {
            let Some(descriptor) = self.catalog.find(name) else {
                debug!("skipping unknown browser {}", name);
                continue;
            };
            match self.launch_with(descriptor, url, true) {
                Ok(outcome) if outcome.success => return Ok(()),
                Ok(_) => debug!("{} failed; trying the next browser", name),
                Err(e) => warn!("error launching {}: {}", name, e),
            }
        }
        debug!("no listed browser succeeded; using the default");
        self.open_url(url)
    }

    fn browser_list(&self) -> Vec<String> {
        let mut browsers = vec![DEFAULT_BROWSER.to_string()];
        browsers.extend(self.catalog.display_names());
        browsers
    }

    fn platform(&self) -> PlatformKey {
        PlatformKey::Unix
    }

    fn set_event_sender(&mut self, sender: EventSender) {
        self.events = Some(sender);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    type Recorded = Arc<Mutex<Vec<Vec<String>>>>;

    fn exit(code: i32) -> LaunchOutcome {
        LaunchOutcome { success: code == 0, exit_status: Some(code), pid: 100 }
    }

    /// A runner that records every argument vector and scripts the
    /// outcome from the command name and form.
    fn scripted<F>(recorded: &Recorded, script: F) -> ProcessRunner
    where
        F: Fn(&[String]) -> Result<LaunchOutcome, LaunchError>
            + Send
            + Sync
            + 'static,
    {
        let recorded = recorded.clone();
        Box::new(move |args| {
            recorded.lock().unwrap().push(args.to_vec());
            script(args)
        })
    }

    fn candidates() -> Vec<BrowserDescriptor> {
        vec![
            BrowserDescriptor::parse(';', "FireFox;firefox;-new-window").unwrap(),
            BrowserDescriptor::parse(';', "Mozilla;mozilla").unwrap(),
            BrowserDescriptor::parse(';', "Netscape;netscape").unwrap(),
        ]
    }

    /// Everything installed, and every remote-open succeeds.
    fn launcher_where_everything_works(recorded: &Recorded) -> UnixLaunching {
        let mut launching =
            UnixLaunching::with_runner(scripted(recorded, |_| Ok(exit(0))));
        launching.initialize_with_candidates(&candidates()).unwrap();
        launching
    }

    #[test]
    fn probe_keeps_priority_order_and_omits_missing() {
        let recorded = Recorded::default();
        let mut launching = UnixLaunching::with_runner(scripted(
            &recorded,
            |args| Ok(exit(if args[1] == "mozilla" { 1 } else { 0 })),
        ));
        launching.initialize_with_candidates(&candidates()).unwrap();

        assert_eq!(
            vec![
                "default".to_string(),
                "FireFox".to_string(),
                "Netscape".to_string()
            ],
            launching.browser_list()
        );
    }

    #[test]
    fn no_browsers_at_all_is_fatal() {
        let recorded = Recorded::default();
        let mut launching =
            UnixLaunching::with_runner(scripted(&recorded, |_| Ok(exit(1))));
        let result = launching.initialize_with_candidates(&candidates());
        assert_matches::assert_matches!(
            result,
            Err(LaunchError::Initialization(_))
        );
    }

    #[test]
    fn browser_list_has_default_first_even_before_probing() {
        let launching = UnixLaunching::with_runner(Box::new(|_| Ok(exit(0))));
        assert_eq!(vec!["default".to_string()], launching.browser_list());
    }

    #[test]
    fn default_open_stops_at_first_remote_success() {
        let recorded = Recorded::default();
        let launching = launcher_where_everything_works(&recorded);
        recorded.lock().unwrap().clear();

        launching.open_url("http://example.com/").unwrap();
        assert_eq!(
            vec![vec![
                "firefox".to_string(),
                "-remote".to_string(),
                "openURL(http://example.com/)".to_string(),
            ]],
            *recorded.lock().unwrap()
        );
    }

    #[test]
    fn default_open_starts_fresh_instance_on_nonzero_remote_exit() {
        let recorded = Recorded::default();
        let mut launching = UnixLaunching::with_runner(scripted(
            &recorded,
            |args| {
                if args[0] == "which" {
                    return Ok(exit(0));
                }
                // Remote form refused, fresh form accepted.
                Ok(exit(if args.contains(&"-remote".to_string()) { 1 } else { 0 }))
            },
        ));
        launching.initialize_with_candidates(&candidates()).unwrap();
        recorded.lock().unwrap().clear();

        launching.open_url("http://x").unwrap();
        assert_eq!(
            vec![
                vec![
                    "firefox".to_string(),
                    "-remote".to_string(),
                    "openURL(http://x)".to_string(),
                ],
                // Default opens never force a new window.
                vec!["firefox".to_string(), "http://x".to_string()],
            ],
            *recorded.lock().unwrap()
        );
    }

    #[test]
    fn all_browsers_exiting_nonzero_is_still_ok_for_default_open() {
        let recorded = Recorded::default();
        let mut launching = UnixLaunching::with_runner(scripted(
            &recorded,
            |args| Ok(exit(if args[0] == "which" { 0 } else { 1 })),
        ));
        launching.initialize_with_candidates(&candidates()).unwrap();

        assert!(launching.open_url("http://x").is_ok());
    }

    #[test]
    fn named_open_forces_a_new_window_on_the_fresh_form() {
        let recorded = Recorded::default();
        let mut launching = UnixLaunching::with_runner(scripted(
            &recorded,
            |args| {
                if args[0] == "which" {
                    return Ok(exit(0));
                }
                Ok(exit(if args.contains(&"-remote".to_string()) { 1 } else { 0 }))
            },
        ));
        launching.initialize_with_candidates(&candidates()).unwrap();
        recorded.lock().unwrap().clear();

        launching.open_url_in("FireFox", "http://x").unwrap();
        assert_eq!(
            vec![
                vec![
                    "firefox".to_string(),
                    "-remote".to_string(),
                    "openURL(http://x)".to_string(),
                ],
                vec![
                    "firefox".to_string(),
                    "-new-window".to_string(),
                    "http://x".to_string(),
                ],
            ],
            *recorded.lock().unwrap()
        );
    }

    #[test]
    fn named_open_matches_names_case_insensitively() {
        let recorded = Recorded::default();
        let launching = launcher_where_everything_works(&recorded);
        recorded.lock().unwrap().clear();

        launching.open_url_in("firefox", "http://x").unwrap();
        assert_eq!("firefox", recorded.lock().unwrap()[0][0]);
    }

    #[test]
    fn unknown_browser_falls_through_to_default() {
        let recorded = Recorded::default();
        let launching = launcher_where_everything_works(&recorded);
        recorded.lock().unwrap().clear();

        launching.open_url_in("Lynx", "http://x").unwrap();
        // Straight to the default path; no attempt at the unknown name.
        assert_eq!("firefox", recorded.lock().unwrap()[0][0]);
    }

    #[test]
    fn default_sentinel_falls_through_to_default() {
        let recorded = Recorded::default();
        let launching = launcher_where_everything_works(&recorded);
        recorded.lock().unwrap().clear();

        launching.open_url_in(DEFAULT_BROWSER, "http://x").unwrap();
        assert_eq!("firefox", recorded.lock().unwrap()[0][0]);
    }

    #[test]
    fn failed_named_launch_falls_back_to_default_exactly_once() {
        let recorded = Recorded::default();
        let mut launching = UnixLaunching::with_runner(scripted(
            &recorded,
            |args| {
                if args[0] == "which" {
                    return Ok(exit(0));
                }
                // Mozilla always fails; FireFox accepts the remote form.
                Ok(exit(if args[0] == "mozilla" { 1 } else { 0 }))
            },
        ));
        launching.initialize_with_candidates(&candidates()).unwrap();
        recorded.lock().unwrap().clear();

        launching.open_url_in("Mozilla", "http://x").unwrap();
        let recorded = recorded.lock().unwrap();
        assert_eq!(
            vec![
                // The requested browser, remote then fresh.
                vec![
                    "mozilla".to_string(),
                    "-remote".to_string(),
                    "openURL(http://x)".to_string(),
                ],
                vec!["mozilla".to_string(), "http://x".to_string()],
                // One fallback pass over the default path.
                vec![
                    "firefox".to_string(),
                    "-remote".to_string(),
                    "openURL(http://x)".to_string(),
                ],
            ],
            *recorded
        );
    }

    #[test]
    fn exec_error_on_named_launch_falls_back_to_default() {
        let recorded = Recorded::default();
        let mut launching = UnixLaunching::with_runner(scripted(
            &recorded,
            |args| {
                if args[0] == "which" {
                    return Ok(exit(0));
                }
                if args[0] == "mozilla" {
                    return Err(LaunchError::Execution(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "gone",
                    )));
                }
                Ok(exit(0))
            },
        ));
        launching.initialize_with_candidates(&candidates()).unwrap();
        recorded.lock().unwrap().clear();

        assert!(launching.open_url_in("Mozilla", "http://x").is_ok());
        assert_eq!("firefox", recorded.lock().unwrap().last().unwrap()[0]);
    }

    #[test]
    fn list_open_skips_unknown_names_and_stops_at_first_success() {
        let recorded = Recorded::default();
        let mut launching = UnixLaunching::with_runner(scripted(
            &recorded,
            |args| {
                if args[0] == "which" {
                    return Ok(exit(0));
                }
                Ok(exit(if args[0] == "netscape" { 0 } else { 1 }))
            },
        ));
        launching.initialize_with_candidates(&candidates()).unwrap();
        recorded.lock().unwrap().clear();

        let targets = vec![
            "Lynx".to_string(),
            "Netscape".to_string(),
            "FireFox".to_string(),
        ];
        launching.open_url_any(&targets, "http://x").unwrap();

        let recorded = recorded.lock().unwrap();
        // Lynx skipped; Netscape's remote form succeeded; FireFox
        // never tried.
        assert_eq!(2, recorded.len());
        assert!(recorded.iter().all(|args| args[0] == "netscape"));
    }

    #[test]
    fn empty_list_open_uses_the_default() {
        let recorded = Recorded::default();
        let launching = launcher_where_everything_works(&recorded);
        recorded.lock().unwrap().clear();

        launching.open_url_any(&[], "http://x").unwrap();
        assert_eq!("firefox", recorded.lock().unwrap()[0][0]);
    }

    #[test]
    fn launches_are_reported_on_the_event_channel() {
        let recorded = Recorded::default();
        let mut launching = launcher_where_everything_works(&recorded);
        let (sender, mut receiver) = tokio::sync::mpsc::unbounded_channel();
        launching.set_event_sender(sender);

        launching.open_url_in("FireFox", "http://example.com/").unwrap();
        let event = receiver.try_recv().unwrap();
        assert_eq!("FireFox", event.browser);
        assert_eq!("http://example.com/", event.url);
        assert_eq!(Some(0), event.exit_status);
    }

    #[test]
    #[should_panic(expected = "initialize() must be called")]
    fn opening_before_initialization_is_a_contract_violation() {
        let launching = UnixLaunching::with_runner(Box::new(|_| Ok(exit(0))));
        let _ = launching.open_url("http://x");
    }
}
