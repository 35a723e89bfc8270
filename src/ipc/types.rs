use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

use crate::session::{Session, SessionConfig};
use crate::theme::Theme;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    pub session: Session,
    /// In-memory until a workspace is selected.
    pub theme: Theme,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            workspace: None,
            db: None,
            session: Session::new(SessionConfig::default()),
            theme: Theme::default(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
