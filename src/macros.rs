//! Global Macros
//!
//! Flat name -> text snippets substituted into quest files before parsing.
//! Placeholders look like `<$m NAME $>`; unknown names are left verbatim.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;
use toml::Table;

use crate::document::scalar_to_string;

static MACRO_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\$m\s*(\S+?)\s*\$>").expect("valid regex"));

/// Immutable snapshot of the macros for one load cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroMap {
    macros: HashMap<String, String>,
}

impl MacroMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from the macro section of the settings.
    /// An absent section yields an empty map; non-scalar entries are ignored.
    pub fn from_section(section: Option<&Table>) -> Self {
        let mut macros = HashMap::new();
        if let Some(section) = section {
            for (name, value) in section {
                if let Some(text) = scalar_to_string(value) {
                    macros.insert(name.clone(), text);
                }
            }
        }
        Self { macros }
    }

    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.macros.insert(name.into(), text.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.macros.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    /// Replace every known placeholder in a single left-to-right pass.
    /// Replacement text is never rescanned.
    pub fn substitute<'a>(&self, source: &'a str) -> Cow<'a, str> {
        if self.macros.is_empty() {
            return Cow::Borrowed(source);
        }

        MACRO_PATTERN.replace_all(source, |caps: &Captures| match self.get(&caps[1]) {
            Some(text) => text.to_string(),
            None => caps[0].to_string(),
        })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MacroMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            macros: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
