//! The Windows launch strategies. One struct covers the 9x, 2000, and
//! NT generations; the configuration resource gives each its own pair
//! of launch command templates.
//!
//! Availability probing asks `regedit.exe /E` to export the App Paths
//! registry key to a text file and scans it for the configured browser
//! executables. That export is expensive, so the catalog is built
//! lazily, once, the first time anything needs it.

use crate::config::{self, LaunchTemplates};
use crate::error::LaunchError;
use crate::events::{self, EventSender};
use crate::launching::browser::{BrowserCatalog, BrowserDescriptor};
use crate::launching::execute::{self, LaunchOutcome, ProcessRunner};
use crate::launching::{
    url_protocol, BrowserLaunching, PlatformKey, DEFAULT_BROWSER, PROTOCOL_FILE,
};
use log::{debug, error, info, warn};
use std::io;
use std::sync::OnceLock;

const WINDOWS_CONFIG: &str = include_str!("windows_config.toml");

const APP_PATHS_KEY: &str =
    "HKEY_LOCAL_MACHINE\\Software\\Microsoft\\Windows\\CurrentVersion\\App Paths";

/// Which generation of Windows we are launching on. Picks the
/// template pair out of the configuration resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowsVersionKey {
    Win9x,
    Win2000,
    WinNt,
}

impl WindowsVersionKey {
    fn config_key(&self) -> &'static str {
        match self {
            WindowsVersionKey::Win9x => "win9x",
            WindowsVersionKey::Win2000 => "win2000",
            WindowsVersionKey::WinNt => "winNT",
        }
    }
}

pub struct WindowsLaunching {
    version: WindowsVersionKey,
    templates: Option<LaunchTemplates>,
    candidates: Vec<BrowserDescriptor>,
    catalog: OnceLock<BrowserCatalog>,
    runner: ProcessRunner,
    events: Option<EventSender>,
}

impl WindowsLaunching {
    pub fn new(version: WindowsVersionKey) -> WindowsLaunching {
        WindowsLaunching::with_runner(version, execute::native_runner())
    }

    /// Builds a strategy around a substitute process-exec collaborator.
    pub fn with_runner(
        version: WindowsVersionKey,
        runner: ProcessRunner,
    ) -> WindowsLaunching {
        WindowsLaunching {
            version,
            templates: None,
            candidates: Vec::new(),
            catalog: OnceLock::new(),
            runner,
            events: None,
        }
    }

    /// The confirmed-available catalog, probing on first use. Probe
    /// failures leave the catalog empty rather than failing the call;
    /// Windows always has the shell `start` fallback.
    fn catalog(&self) -> &BrowserCatalog {
        self.catalog.get_or_init(|| match self.probe() {
            Ok(catalog) => {
                info!("available browsers: {:?}", catalog.display_names());
                catalog
            }
            Err(e) => {
                error!("unable to probe installed browsers: {}", e);
                BrowserCatalog::new()
            }
        })
    }

    /// Exports the App Paths registry key to a temp file and scans it
    /// for the candidate executables.
    fn probe(&self) -> Result<BrowserCatalog, LaunchError> {
        let path = std::env::temp_dir().join(format!(
            "weblaunch-app-paths-{:08x}.reg",
            rand::random::<u32>()
        ));
        let args = vec![
            "regedit.exe".to_string(),
            "/E".to_string(),
            path.to_string_lossy().into_owned(),
            APP_PATHS_KEY.to_string(),
        ];
        debug!("exporting app paths: {:?}", args);
        let outcome = (self.runner)(&args)?;
        if !outcome.success {
            return Err(LaunchError::Execution(io::Error::new(
                io::ErrorKind::Other,
                format!("regedit.exe exited with {:?}", outcome.exit_status),
            )));
        }

        let bytes = std::fs::read(&path)?;
        let _ = std::fs::remove_file(&path);
        Ok(scan_export(&bytes, &self.candidates))
    }

    fn launch_templates(&self) -> &LaunchTemplates {
        self.templates
            .as_ref()
            .expect("initialize() must be called before opening a url")
    }

    fn launch_targeted(
        &self,
        browser: &BrowserDescriptor,
        url: &str,
    ) -> Result<LaunchOutcome, LaunchError> {
        let args = build_targeted_args(
            &self.launch_templates().targeted_launch,
            url_protocol(url),
            browser.command_name(),
            url,
        );
        debug!("launch args: {:?}", args);
        let outcome = (self.runner)(&args)?;
        events::emit(self.events.as_ref(), browser.display_name(), url, &outcome);
        Ok(outcome)
    }

    #[cfg(test)]
    fn seed_catalog(&self, catalog: BrowserCatalog) {
        self.catalog.set(catalog).expect("catalog already built");
    }
}

impl BrowserLaunching for WindowsLaunching {
    fn initialize(&mut self) -> Result<(), LaunchError> {
        let config = config::parse_config(WINDOWS_CONFIG)?;
        let templates = config.templates(self.version.config_key())?.clone();
        self.candidates = config.browsers;
        self.templates = Some(templates);
        Ok(())
    }

    fn open_url(&self, url: &str) -> Result<(), LaunchError> {
        let template = &self.launch_templates().default_launch;
        info!("opening {}", url);
        let args = build_default_args(template, url_protocol(url), url);
        debug!("launch args: {:?}", args);
        let outcome = (self.runner)(&args)?;
        events::emit(self.events.as_ref(), DEFAULT_BROWSER, url, &outcome);
        if !outcome.success {
            // Informational only; the default open is best-effort.
            debug!("default launch exited with {:?}", outcome.exit_status);
        }
        Ok(())
    }

    fn open_url_in(&self, browser: &str, url: &str) -> Result<(), LaunchError> {
        if browser == DEFAULT_BROWSER {
            debug!("default browser target; falling through");
            return self.open_url(url);
        }
        let Some(descriptor) = self.catalog().find(browser) else {
            info!("no browser named {} is available; using the default", browser);
            return self.open_url(url);
        };
        match self.launch_targeted(descriptor, url) {
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
        for name in browsers {
            let Some(descriptor) = self.catalog().find(name) else {
                debug!("skipping unknown browser {}", name);
                continue;
            };
            match self.launch_targeted(descriptor, url) {
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
        browsers.extend(self.catalog().display_names());
        browsers
    }

    fn platform(&self) -> PlatformKey {
        match self.version {
            WindowsVersionKey::Win9x => PlatformKey::Windows9x,
            WindowsVersionKey::Win2000 => PlatformKey::Windows2000,
            WindowsVersionKey::WinNt => PlatformKey::WindowsNt,
        }
    }

    fn set_event_sender(&mut self, sender: EventSender) {
        self.events = Some(sender);
    }
}

/// Decodes a registry export. regedit writes UTF-16LE with a byte
/// order mark on NT-family systems and single-byte ANSI text on 9x;
/// sniff the two-byte marker to tell them apart.
pub fn decode_export(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFF && bytes[1] == 0xFE {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        // Treat as latin-1 so no byte sequence can fail to decode.
        bytes.iter().map(|&b| b as char).collect()
    }
}

/// Scans export text for the candidate executables. A hit is a
/// case-insensitive substring match on `<command>.exe`; the first
/// matching line wins per candidate, and a matched candidate is not
/// scanned for again.
pub fn scan_export(bytes: &[u8], candidates: &[BrowserDescriptor]) -> BrowserCatalog {
    let text = decode_export(bytes);
    let mut remaining: Vec<&BrowserDescriptor> = candidates.iter().collect();
    let mut catalog = BrowserCatalog::new();

    for line in text.lines() {
        if remaining.is_empty() {
            break;
        }
        let line = line.to_lowercase();
        let hit = remaining.iter().position(|candidate| {
            line.contains(&format!("{}.exe", candidate.command_name().to_lowercase()))
        });
        if let Some(idx) = hit {
            let found = remaining.remove(idx);
            debug!("adding browser {} to the available list", found.display_name());
            catalog.insert(found.clone());
        }
    }
    catalog
}

/// Substitutes the `<url>` placeholder into a default-launch template
/// and whitespace-splits the result into an argument vector. Pure.
pub fn build_default_args(template: &str, protocol: &str, url: &str) -> Vec<String> {
    template
        .replace("<url>", &shell_url(protocol, url))
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// As [`build_default_args`], but also substitutes `<browser>`.
pub fn build_targeted_args(
    template: &str,
    protocol: &str,
    browser: &str,
    url: &str,
) -> Vec<String> {
    template
        .replace("<url>", &shell_url(protocol, url))
        .replace("<browser>", browser)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Quotes the url so ampersands survive the shell, except for local
/// files, where the bare path lets `start` resolve it.
fn shell_url(protocol: &str, url: &str) -> String {
    if protocol == PROTOCOL_FILE {
        url.to_string()
    } else {
        format!("\"{}\"", url)
    }
}
