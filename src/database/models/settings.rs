use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    System,
}

impl Default for Theme {
    fn default() -> Self {
        Theme::System
    }
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            "system" => Some(Self::System),
            _ => None,
        }
    }
}

/// Singleton row, id fixed to 1.
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    pub base_currency: String,
    pub theme: Theme,
    /// UTC hour at which the daily jobs run.
    pub rate_refresh_hour: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSettings {
    pub base_currency: Option<String>,
    pub theme: Option<Theme>,
    pub rate_refresh_hour: Option<u8>,
}
