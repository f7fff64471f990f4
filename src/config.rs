//! Settings store and theme resolution.
//!
//! Configuration reaches the toolkit through one narrow interface: read a
//! string value by section and key. The store is backed by a TOML file
//! (`[section]` tables of string values); a missing or malformed file is
//! indistinguishable from an empty one, so every consumer carries its own
//! default.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::gfx::Color;

/// Default hex strings for the theme colors.
pub const DEFAULT_HIGHLIGHT_COLOR_1: &str = "#2288CC";
pub const DEFAULT_HIGHLIGHT_COLOR_2: &str = "#88FFFF";
pub const DEFAULT_TEXT_COLOR: &str = "#FFFFFF";

/// Well-known settings file location.
pub fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("veil")
        .join("settings.toml")
}

/// Section/key/value string store.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl Settings {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Reads a settings file. Absence or unreadability yields an empty
    /// store; defaults apply downstream.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(err) => {
                tracing::debug!(path = %path.display(), %err, "settings file not read, using defaults");
                Self::empty()
            }
        }
    }

    /// Parses settings text. Only string values inside `[section]` tables
    /// are kept; everything else is ignored.
    pub fn parse(text: &str) -> Self {
        let table: toml::Table = match text.parse() {
            Ok(table) => table,
            Err(err) => {
                tracing::warn!(%err, "malformed settings, using defaults");
                return Self::empty();
            }
        };

        let mut sections: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        for (section, value) in table {
            if let toml::Value::Table(entries) = value {
                let dest = sections.entry(section).or_default();
                for (key, value) in entries {
                    if let toml::Value::String(s) = value {
                        dest.insert(key, s);
                    }
                }
            }
        }
        Self { sections }
    }

    /// Looks up the value for `(section, key)`.
    pub fn value(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|entries| entries.get(key))
            .map(String::as_str)
    }
}

/// Colors resolved once at startup and handed to the widget tree.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub highlight_color_1: Color,
    pub highlight_color_2: Color,
    pub text_color: Color,
}

impl Theme {
    /// Resolves theme colors from the `[theme]` section; missing or
    /// malformed entries fall back to the documented defaults.
    pub fn from_settings(settings: &Settings) -> Self {
        let pick = |key: &str, default: &str| {
            Color::from_hex(settings.value("theme", key).unwrap_or(default), default)
        };
        Self {
            highlight_color_1: pick("highlight_color_1", DEFAULT_HIGHLIGHT_COLOR_1),
            highlight_color_2: pick("highlight_color_2", DEFAULT_HIGHLIGHT_COLOR_2),
            text_color: pick("text_color", DEFAULT_TEXT_COLOR),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_settings(&Settings::empty())
    }
}
