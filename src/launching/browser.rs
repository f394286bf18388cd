use crate::error::LaunchError;

/// Static metadata for one known browser, parsed from a configuration
/// resource entry. Never mutated after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserDescriptor {
    display_name: String,
    command_name: String,
    new_window_args: Vec<String>,
}

impl BrowserDescriptor {
    /// Splits a configuration value into its fields. The value is
    /// `displayName<delim>commandName[<delim>forceWindowArgs]`, e.g.
    /// `FireFox;firefox;-new-window` with `;` as the delimiter.
    pub fn parse(delimiter: char, value: &str) -> Result<BrowserDescriptor, LaunchError> {
        let mut fields = value.split(delimiter);
        let display_name = fields.next().unwrap_or("").trim();
        let command_name = fields.next().unwrap_or("").trim();
        if display_name.is_empty() || command_name.is_empty() {
            return Err(LaunchError::Initialization(format!(
                "browser entry needs a display name and a command name: {:?}",
                value
            )));
        }
        let new_window_args = fields
            .next()
            .map(|args| args.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        Ok(BrowserDescriptor {
            display_name: display_name.to_string(),
            command_name: command_name.to_string(),
            new_window_args,
        })
    }

    /// The user-facing name, as shown in browser target lists.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// The executable or command used to invoke the browser.
    pub fn command_name(&self) -> &str {
        &self.command_name
    }

    /// Extra arguments that force the browser to surface a new window,
    /// when the configuration provides them.
    pub fn new_window_args(&self) -> &[String] {
        &self.new_window_args
    }
}

/// The browsers confirmed present on this host, in candidate priority
/// order. Lookup is case-insensitive and matches either the display
/// name or the command name, so callers can pass whichever they have.
#[derive(Debug, Default)]
pub struct BrowserCatalog {
    entries: Vec<BrowserDescriptor>,
}

impl BrowserCatalog {
    pub fn new() -> BrowserCatalog {
        BrowserCatalog { entries: Vec::new() }
    }

    /// Adds a confirmed browser. A descriptor whose names are already
    /// present is ignored; the first probe hit wins.
    pub fn insert(&mut self, descriptor: BrowserDescriptor) {
        if self.find(descriptor.display_name()).is_none()
            && self.find(descriptor.command_name()).is_none()
        {
            self.entries.push(descriptor);
        }
    }

    pub fn find(&self, key: &str) -> Option<&BrowserDescriptor> {
        self.entries.iter().find(|entry| {
            entry.display_name.eq_ignore_ascii_case(key)
                || entry.command_name.eq_ignore_ascii_case(key)
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &BrowserDescriptor> {
        self.entries.iter()
    }

    pub fn display_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| entry.display_name.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_two_fields() {
        let browser = BrowserDescriptor::parse(';', "Mozilla;mozilla").unwrap();
        assert_eq!("Mozilla", browser.display_name());
        assert_eq!("mozilla", browser.command_name());
        assert!(browser.new_window_args().is_empty());
    }

    #[test]
    fn parse_with_window_args() {
        let browser =
            BrowserDescriptor::parse(';', "FireFox;firefox;-new-window").unwrap();
        assert_eq!("FireFox", browser.display_name());
        assert_eq!("firefox", browser.command_name());
        assert_eq!(&["-new-window".to_string()], browser.new_window_args());
    }

    #[test]
    fn parse_display_name_with_spaces() {
        let browser =
            BrowserDescriptor::parse(';', "Internet Explorer;iexplore").unwrap();
        assert_eq!("Internet Explorer", browser.display_name());
        assert_eq!("iexplore", browser.command_name());
    }

    #[test]
    fn parse_rejects_missing_command() {
        assert_matches!(
            BrowserDescriptor::parse(';', "FireFox"),
            Err(LaunchError::Initialization(_))
        );
        assert_matches!(
            BrowserDescriptor::parse(';', ""),
            Err(LaunchError::Initialization(_))
        );
    }

    #[test]
    fn catalog_preserves_insertion_order() {
        let mut catalog = BrowserCatalog::new();
        catalog.insert(BrowserDescriptor::parse(';', "FireFox;firefox").unwrap());
        catalog.insert(BrowserDescriptor::parse(';', "Mozilla;mozilla").unwrap());
        catalog.insert(BrowserDescriptor::parse(';', "Opera;opera").unwrap());
        assert_eq!(
            vec!["FireFox".to_string(), "Mozilla".to_string(), "Opera".to_string()],
            catalog.display_names()
        );
    }

    #[test]
    fn catalog_lookup_is_case_insensitive_on_both_names() {
        let mut catalog = BrowserCatalog::new();
        catalog.insert(BrowserDescriptor::parse(';', "FireFox;firefox").unwrap());
        assert!(catalog.find("firefox").is_some());
        assert!(catalog.find("FIREFOX").is_some());
        assert!(catalog.find("firefox.exe").is_none());
        assert!(catalog.find("netscape").is_none());
    }

    #[test]
    fn catalog_first_insert_wins() {
        let mut catalog = BrowserCatalog::new();
        catalog.insert(
            BrowserDescriptor::parse(';', "FireFox;firefox;-new-window").unwrap(),
        );
        catalog.insert(BrowserDescriptor::parse(';', "FireFox;firefox").unwrap());
        assert_eq!(1, catalog.len());
        assert_eq!(
            &["-new-window".to_string()],
            catalog.find("firefox").unwrap().new_window_args()
        );
    }
}
