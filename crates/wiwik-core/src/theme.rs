//! Dark/light theme selection and persistence.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::storage::KeyValueStore;

/// Storage key holding the chosen theme.
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(Error::Config(format!("unknown theme '{other}'"))),
        }
    }
}

/// What the environment says about the preferred color scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemePreference {
    /// The environment cannot tell.
    Unsupported,
    Light,
    Dark,
}

impl SchemePreference {
    /// Interpret a `COLORFGBG` value (`"fg;bg"` or `"fg;default;bg"`).
    ///
    /// Backgrounds 0-6 and 8 are the dark ANSI colors.
    pub fn from_colorfgbg(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return Self::Unsupported;
        };
        match value.rsplit(';').next().map(str::trim).map(str::parse::<u8>) {
            Some(Ok(0..=6 | 8)) => Self::Dark,
            Some(Ok(_)) => Self::Light,
            _ => Self::Unsupported,
        }
    }

    /// Read the preference from the process environment.
    pub fn from_env() -> Self {
        Self::from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref())
    }
}

/// Resolve the active theme and write it back to `store`.
///
/// A stored `dark`/`light` wins; otherwise the environment preference
/// decides, defaulting to light.
pub fn detect_color_scheme(store: &mut impl KeyValueStore, preference: SchemePreference) -> Theme {
    let stored = store.get(THEME_KEY).and_then(|v| v.parse::<Theme>().ok());
    let theme = stored.unwrap_or(match preference {
        SchemePreference::Dark => Theme::Dark,
        SchemePreference::Light | SchemePreference::Unsupported => Theme::Light,
    });
    debug!(%theme, ?preference, from_store = stored.is_some(), "Detected color scheme");
    if let Err(e) = store.set(THEME_KEY, theme.as_str()) {
        warn!(error = %e, "Failed to persist theme");
    }
    theme
}

/// Flip `current` and persist the result.
pub fn toggle(store: &mut impl KeyValueStore, current: Theme) -> Result<Theme> {
    set(store, current.toggled())
}

/// Persist an explicit choice.
pub fn set(store: &mut impl KeyValueStore, theme: Theme) -> Result<Theme> {
    store.set(THEME_KEY, theme.as_str())?;
    Ok(theme)
}

/// Icon name of the theme toggle button.
pub const fn indicator(theme: Theme) -> &'static str {
    match theme {
        Theme::Dark => "mode_night",
        Theme::Light => "light_mode",
    }
}
