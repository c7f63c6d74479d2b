use std::{collections::HashMap, fs, path::Path, time::Duration};

use shared::protocol::PayloadShape;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "preferences.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub auth_token: Option<String>,
    pub payload_shape: PayloadShape,
    pub request_timeout_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000/api".into(),
            auth_token: None,
            payload_shape: PayloadShape::Wrapped,
            request_timeout_seconds: 30,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

pub fn load_settings(config_path: &Path) -> Settings {
    load_settings_with(config_path, |key| std::env::var(key).ok())
}

/// Defaults, then the config file, then environment variables.
pub fn load_settings_with(config_path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(config_path) {
        match toml::from_str::<HashMap<String, String>>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("api_base_url") {
                    settings.api_base_url = v.clone();
                }
                if let Some(v) = file_cfg.get("auth_token") {
                    settings.auth_token = Some(v.clone());
                }
                if let Some(v) = file_cfg.get("payload_shape") {
                    apply_payload_shape(&mut settings, v);
                }
                if let Some(v) = file_cfg.get("request_timeout_seconds") {
                    apply_timeout(&mut settings, v);
                }
            }
            Err(e) => warn!(path = %config_path.display(), "ignoring unreadable config file: {e}"),
        }
    }

    if let Some(v) = env("PREFS_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = env("PREFS_AUTH_TOKEN") {
        settings.auth_token = Some(v);
    }
    if let Some(v) = env("APP__AUTH_TOKEN") {
        settings.auth_token = Some(v);
    }

    if let Some(v) = env("APP__PAYLOAD_SHAPE") {
        apply_payload_shape(&mut settings, &v);
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECONDS") {
        apply_timeout(&mut settings, &v);
    }

    settings
}

fn apply_payload_shape(settings: &mut Settings, raw: &str) {
    match raw.parse::<PayloadShape>() {
        Ok(shape) => settings.payload_shape = shape,
        Err(e) => warn!("ignoring payload shape: {e}"),
    }
}

fn apply_timeout(settings: &mut Settings, raw: &str) {
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => warn!(value = raw, "ignoring invalid request timeout"),
        Ok(parsed) => settings.request_timeout_seconds = parsed,
    }
}
