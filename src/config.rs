//! The per-platform configuration resource: which browsers to look
//! for and, on Windows, how to build the launch command lines.
//!
//! The resource is a TOML table whose interesting values are joined
//! with a configurable delimiter character, e.g.:
//!
//! ```toml
//! delimiter = ";"
//!
//! [browser]
//! 1 = "FireFox;firefox;-new-window"
//! 2 = "Mozilla;mozilla"
//!
//! [windows]
//! winNT = "cmd.exe /c start \"\" <url>;cmd.exe /c start \"\" <browser> <url>"
//! ```
//!
//! Browser entries are ordered by their numeric key; that order is the
//! probe priority order. The `windows` table maps a Windows generation
//! to a `defaultTemplate<delim>targetedTemplate` pair, with `<url>` and
//! `<browser>` placeholders.

use crate::error::LaunchError;
use crate::launching::browser::BrowserDescriptor;
use std::collections::HashMap;
use toml::Value;

/// The launch command templates for one Windows generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchTemplates {
    /// Template for launching the OS default browser.
    pub default_launch: String,
    /// Template for launching a specific browser; contains a
    /// `<browser>` placeholder in addition to `<url>`.
    pub targeted_launch: String,
}

#[derive(Debug)]
pub struct LaunchConfig {
    pub delimiter: char,
    /// Candidate browsers in probe priority order.
    pub browsers: Vec<BrowserDescriptor>,
    templates: HashMap<String, LaunchTemplates>,
}

impl LaunchConfig {
    /// Looks up the launch templates for a Windows generation key
    /// (`win9x`, `win2000`, `winNT`). A missing key is fatal for the
    /// strategy that needs it.
    pub fn templates(&self, key: &str) -> Result<&LaunchTemplates, LaunchError> {
        self.templates.get(key).ok_or_else(|| {
            LaunchError::Initialization(format!(
                "{} is not configured in the launch resource",
                key
            ))
        })
    }
}

pub fn parse_config(text: &str) -> Result<LaunchConfig, LaunchError> {
    let value = text.parse::<Value>().map_err(|e| {
        LaunchError::Initialization(format!("invalid configuration resource: {}", e))
    })?;
    let table = match &value {
        Value::Table(table) => table,
        _ => {
            return Err(LaunchError::Initialization(
                "configuration resource must be a table".to_string(),
            ))
        }
    };

    let delimiter = get_delimiter(table)?;
    Ok(LaunchConfig {
        delimiter,
        browsers: get_browsers(table, delimiter)?,
        templates: get_templates(table, delimiter)?,
    })
}

fn get_delimiter(table: &toml::value::Table) -> Result<char, LaunchError> {
    match table.get("delimiter") {
        Some(Value::String(s)) if s.chars().count() == 1 => {
            Ok(s.chars().next().unwrap())
        }
        Some(v) => Err(LaunchError::Initialization(format!(
            "delimiter must be a single character, got {:?}",
            v
        ))),
        None => Err(LaunchError::Initialization(
            "configuration resource has no delimiter key".to_string(),
        )),
    }
}

fn get_browsers(
    table: &toml::value::Table,
    delimiter: char,
) -> Result<Vec<BrowserDescriptor>, LaunchError> {
    let browsers = match table.get("browser") {
        None => return Ok(Vec::new()),
        Some(Value::Table(table)) => table,
        Some(v) => {
            return Err(LaunchError::Initialization(format!(
                "expected a table of browser entries, got {:?}",
                v
            )))
        }
    };

    let mut ordered: Vec<(u32, &str)> = Vec::new();
    for (key, value) in browsers {
        let n: u32 = key.parse().map_err(|_| {
            LaunchError::Initialization(format!(
                "browser entries must have numeric keys, got {:?}",
                key
            ))
        })?;
        match value {
            Value::String(s) => ordered.push((n, s)),
            v => {
                return Err(LaunchError::Initialization(format!(
                    "expected a string browser entry, got {:?}",
                    v
                )))
            }
        }
    }
    ordered.sort_by_key(|(n, _)| *n);

    ordered
        .into_iter()
        .map(|(_, entry)| BrowserDescriptor::parse(delimiter, entry))
        .collect()
}

fn get_templates(
    table: &toml::value::Table,
    delimiter: char,
) -> Result<HashMap<String, LaunchTemplates>, LaunchError> {
    let windows = match table.get("windows") {
        None => return Ok(HashMap::new()),
        Some(Value::Table(table)) => table,
        Some(v) => {
            return Err(LaunchError::Initialization(format!(
                "expected a table of windows launch templates, got {:?}",
                v
            )))
        }
    };

    let mut templates = HashMap::new();
    for (key, value) in windows {
        let entry = match value {
            Value::String(s) => s,
            v => {
                return Err(LaunchError::Initialization(format!(
                    "expected a string template pair, got {:?}",
                    v
                )))
            }
        };
        let mut parts = entry.splitn(2, delimiter);
        let default_launch = parts.next().unwrap_or("").trim().to_string();
        let targeted_launch = match parts.next() {
            Some(t) if !t.trim().is_empty() && !default_launch.is_empty() => {
                t.trim().to_string()
            }
            _ => {
                return Err(LaunchError::Initialization(format!(
                    "{} must hold a default and a targeted launch template",
                    key
                )))
            }
        };
        templates.insert(
            key.clone(),
            LaunchTemplates { default_launch, targeted_launch },
        );
    }
    Ok(templates)
}

/// Parses an embedded configuration resource, letting a
/// `~/.weblaunch.toml` browser table replace the built-in candidate
/// list. A missing override file is fine; a malformed one is an
/// initialization error, since silently ignoring it would be
/// mystifying.
pub fn load_with_override(embedded: &str) -> Result<LaunchConfig, LaunchError> {
    let mut config = parse_config(embedded)?;

    let Some(mut path) = home::home_dir() else {
        return Ok(config);
    };
    path.push(".weblaunch.toml");

    match std::fs::read_to_string(&path) {
        Ok(contents) => {
            let user = parse_config(&contents)?;
            if !user.browsers.is_empty() {
                log::info!("using browser list from {}", path.display());
                config.browsers = user.browsers;
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(LaunchError::Initialization(format!(
                "error reading {}: {}",
                path.display(),
                e
            )))
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_browsers_in_numeric_key_order() {
        let config = parse_config(indoc! {r#"
            delimiter = ";"

            [browser]
            2 = "Mozilla;mozilla"
            10 = "Opera;opera"
            1 = "FireFox;firefox;-new-window"
        "#})
        .unwrap();

        assert_eq!(';', config.delimiter);
        let names: Vec<&str> =
            config.browsers.iter().map(|b| b.display_name()).collect();
        assert_eq!(vec!["FireFox", "Mozilla", "Opera"], names);
        assert_eq!(
            &["-new-window".to_string()],
            config.browsers[0].new_window_args()
        );
    }

    #[test]
    fn parse_windows_templates() {
        let config = parse_config(indoc! {r#"
            delimiter = ";"

            [windows]
            winNT = "cmd.exe /c start \"\" <url>;cmd.exe /c start \"\" <browser> <url>"
        "#})
        .unwrap();

        let templates = config.templates("winNT").unwrap();
        assert_eq!("cmd.exe /c start \"\" <url>", templates.default_launch);
        assert_eq!(
            "cmd.exe /c start \"\" <browser> <url>",
            templates.targeted_launch
        );
        assert_matches!(
            config.templates("win9x"),
            Err(LaunchError::Initialization(_))
        );
    }

    #[test]
    fn missing_delimiter_is_fatal() {
        assert_matches!(
            parse_config("[browser]\n1 = \"FireFox;firefox\"\n"),
            Err(LaunchError::Initialization(_))
        );
    }

    #[test]
    fn multi_character_delimiter_is_fatal() {
        assert_matches!(
            parse_config("delimiter = \";;\"\n"),
            Err(LaunchError::Initialization(_))
        );
    }

    #[test]
    fn template_without_targeted_half_is_fatal() {
        let text = indoc! {r#"
            delimiter = ";"

            [windows]
            winNT = "cmd.exe /c start <url>"
        "#};
        assert_matches!(parse_config(text), Err(LaunchError::Initialization(_)));
    }

    #[test]
    fn unparsable_toml_is_fatal() {
        assert_matches!(
            parse_config("delimiter = [[["),
            Err(LaunchError::Initialization(_))
        );
    }

    #[test]
    fn malformed_browser_entry_is_fatal() {
        let text = indoc! {r#"
            delimiter = ";"

            [browser]
            1 = "FireFoxWithoutACommand"
        "#};
        assert_matches!(parse_config(text), Err(LaunchError::Initialization(_)));
    }
}
