#[cfg(not(target_arch = "wasm32"))]
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::fs;
use std::time::Duration;

use crate::errors::TvError;
use crate::player::PlayerTiming;
use crate::render::DEFAULT_PLACEHOLDER_BASE;

/// Local storage key of the "floating contact button hidden" flag
pub const CONTACT_HIDDEN_KEY: &str = "telegramHidden";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AdBannerConfig {
    pub container_id: String,
    pub key: String,
    pub width: u32,
    pub height: u32,
    pub script_host: String,
}

impl Default for AdBannerConfig {
    fn default() -> Self {
        Self {
            container_id: "adsterra-banner-728x90".to_string(),
            key: "6cbe6f51f75544035b319bfb444712e9".to_string(),
            width: 728,
            height: 90,
            script_host: "//www.highperformanceformat.com".to_string(),
        }
    }
}

impl AdBannerConfig {
    pub fn script_src(&self) -> String {
        format!("{}/{}/invoke.js", self.script_host, self.key)
    }

    /// Inline options script the ad loader reads before `invoke.js` runs.
    pub fn options_script(&self) -> String {
        format!(
            "atOptions = {{ 'key' : '{}', 'format' : 'iframe', 'height' : {}, 'width' : {}, 'params' : {{}} }};",
            self.key, self.height, self.width
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub data_url: String,
    pub search_debounce_ms: u64,
    pub frame_load_timeout_ms: u64,
    pub refresh_cooldown_ms: u64,
    pub ad_delay_ms: u64,
    pub placeholder_base_url: String,
    pub ad_banner: AdBannerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_url: "data/events.json".to_string(),
            search_debounce_ms: 250,
            frame_load_timeout_ms: 5_000,
            refresh_cooldown_ms: 2_000,
            ad_delay_ms: 100,
            placeholder_base_url: DEFAULT_PLACEHOLDER_BASE.to_string(),
            ad_banner: AdBannerConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn player_timing(&self) -> PlayerTiming {
        PlayerTiming {
            frame_load_timeout: Duration::from_millis(self.frame_load_timeout_ms),
            refresh_cooldown: Duration::from_millis(self.refresh_cooldown_ms),
            ad_delay: Duration::from_millis(self.ad_delay_ms),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn config_path() -> Option<std::path::PathBuf> {
        ProjectDirs::from("my", "tvmalaysia", "tv-malaysia")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Result<Self, TvError> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(AppConfig::default()),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> Result<Self, TvError> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| TvError::Config(e.to_string()))
    }

    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Result<Self, TvError> {
        if let Some(window) = web_sys::window() {
            if let Ok(Some(storage)) = window.local_storage() {
                if let Ok(Some(json)) = storage.get_item("app_config") {
                    return serde_json::from_str(&json).map_err(|e| TvError::Config(e.to_string()));
                }
            }
        }
        Ok(AppConfig::default())
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) -> Result<(), TvError> {
        let path = Self::config_path()
            .ok_or_else(|| TvError::Config("cannot determine config directory".to_string()))?;
        self.save_to(&path)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), TvError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content =
            serde_json::to_string_pretty(self).map_err(|e| TvError::Config(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Read-only view of browser-style key/value storage.
pub trait PreferenceStorage {
    fn get_item(&self, key: &str) -> Option<String>;
}

impl PreferenceStorage for HashMap<String, String> {
    fn get_item(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Preferences {
    pub contact_button_hidden: bool,
}

impl Preferences {
    pub fn read(storage: &impl PreferenceStorage) -> Self {
        Self {
            contact_button_hidden: storage.get_item(CONTACT_HIDDEN_KEY).as_deref() == Some("true"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_uses_defaults() {
        let cfg: AppConfig =
            serde_json::from_str(r#"{"data_url":"https://cdn.example/events.json"}"#).unwrap();
        assert_eq!(cfg.data_url, "https://cdn.example/events.json");
        assert_eq!(cfg.search_debounce(), Duration::from_millis(250));
        assert_eq!(cfg.player_timing(), PlayerTiming::default());
    }

    #[test]
    fn contact_flag_only_true_for_literal_true() {
        let mut storage = HashMap::new();
        assert!(!Preferences::read(&storage).contact_button_hidden);

        storage.insert(CONTACT_HIDDEN_KEY.to_string(), "1".to_string());
        assert!(!Preferences::read(&storage).contact_button_hidden);

        storage.insert(CONTACT_HIDDEN_KEY.to_string(), "true".to_string());
        assert!(Preferences::read(&storage).contact_button_hidden);
    }

    #[test]
    fn ad_script_src() {
        let ad = AdBannerConfig::default();
        assert_eq!(
            ad.script_src(),
            "//www.highperformanceformat.com/6cbe6f51f75544035b319bfb444712e9/invoke.js"
        );
        assert!(ad.options_script().contains("'height' : 90"));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn save_and_load_file() {
        let path = std::env::temp_dir().join(format!("tv-malaysia-cfg-{}.json", std::process::id()));
        let cfg = AppConfig {
            search_debounce_ms: 100,
            ..AppConfig::default()
        };
        cfg.save_to(&path).unwrap();
        assert_eq!(AppConfig::load_from(&path).unwrap(), cfg);
        let _ = fs::remove_file(&path);
    }
}
