use rusqlite::Connection;
use serde::Serialize;

use crate::db;

pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Never fails: anything unreadable means light.
pub fn load(conn: &Connection) -> Theme {
    let stored = match db::settings_get_json(conn, THEME_KEY) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "unreadable theme setting, using light");
            return Theme::Light;
        }
    };
    match stored {
        None => Theme::Light,
        Some(v) => match v.as_str().and_then(Theme::parse) {
            Some(t) => t,
            None => {
                tracing::warn!(value = %v, "unknown theme value, using light");
                Theme::Light
            }
        },
    }
}

pub fn save(conn: &Connection, theme: Theme) -> anyhow::Result<()> {
    db::settings_set_json(conn, THEME_KEY, &serde_json::Value::from(theme.as_str()))
}
