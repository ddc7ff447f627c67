//! Planner settings loading from planner.toml
//!
//! Every key is optional. Missing keys take their defaults, and a missing file is the
//! same as an empty one. The signed-in identity comes from the environment instead.

use crate::core::session::Identity;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

/// Default settings file, relative to the working directory.
pub const DEFAULT_SETTINGS_PATH: &str = "planner.toml";

/// Entire planner.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Chat assistant
    pub assistant: AssistantSettings,
    /// Dashboard
    pub dashboard: DashboardSettings,
}

/// `[assistant]` table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AssistantSettings {
    /// First message of every chat
    pub greeting: String,
    /// Suggestions the canned assistant cycles through
    pub replies: Vec<String>,
    /// Simulated thinking time before each reply
    pub reply_delay_ms: u64,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            greeting: "Hi! I'm your wedding planning assistant. How can I help you today?"
                .to_string(),
            replies: [
                "Based on your information, I suggest focusing on the tasks with the nearest due dates.",
                "For your budget, I recommend setting aside 10% for the unexpected.",
                "How about sending the invitations 2 months before the wedding date?",
                "I can help you put together a detailed schedule for the coming months.",
                "Remember to confirm every vendor 1 week before the wedding.",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            reply_delay_ms: 1_000,
        }
    }
}

/// `[dashboard]` table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    /// How many open tasks the dashboard lists
    pub upcoming_tasks: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self { upcoming_tasks: 5 }
    }
}

/// Loads settings from a TOML file.
///
/// # Errors
/// Returns [`Error::Config`] if the file cannot be read or is not valid TOML for
/// [`Settings`].
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read settings file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path.as_ref().display()),
    })
}

/// Loads `planner.toml` from the working directory, falling back to defaults when absent.
pub fn load_default_settings() -> Result<Settings> {
    if !Path::new(DEFAULT_SETTINGS_PATH).exists() {
        info!("No {} found, using default settings", DEFAULT_SETTINGS_PATH);
        return Ok(Settings::default());
    }
    load_settings(DEFAULT_SETTINGS_PATH)
}

/// Identity to sign in with, from `PLANNER_USER_ID`.
///
/// Unset or blank means nobody is signed in.
#[must_use]
pub fn get_user_id() -> Option<Identity> {
    match std::env::var("PLANNER_USER_ID") {
        Ok(id) if !id.trim().is_empty() => Some(Identity::new(id.trim())),
        Ok(_) => {
            warn!("PLANNER_USER_ID is blank, staying signed out");
            None
        }
        Err(_) => None,
    }
}
