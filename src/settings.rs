//! Application settings storage
//!
//! Stores configuration like the Gemini API key in a JSON file in the app
//! config directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

/// Global settings instance
static SETTINGS: RwLock<Option<Settings>> = RwLock::new(None);

/// Path to config file (set during init)
static CONFIG_PATH: RwLock<Option<PathBuf>> = RwLock::new(None);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    /// Gemini model used for categorization
    #[serde(default = "default_classifier_model")]
    pub classifier_model: String,
    /// Max bookmarks sent to the classifier in one call
    #[serde(default = "default_classifier_batch_size")]
    pub classifier_batch_size: usize,
    /// Category assigned to bookmarks without meaningful folder ancestry
    #[serde(default = "default_category_label")]
    pub default_category: String,
}

fn default_classifier_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_classifier_batch_size() -> usize {
    50
}

fn default_category_label() -> String {
    crate::model::DEFAULT_CATEGORY.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            classifier_model: default_classifier_model(),
            classifier_batch_size: default_classifier_batch_size(),
            default_category: default_category_label(),
        }
    }
}

impl Settings {
    /// Load settings from disk or create default
    fn load(path: &PathBuf) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
                Err(_) => Settings::default(),
            }
        } else {
            Settings::default()
        }
    }

    /// Save settings to disk
    fn save(&self, path: &PathBuf) -> Result<(), String> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(path, content).map_err(|e| format!("Failed to write settings: {}", e))?;

        Ok(())
    }
}

/// Initialize settings with the app config directory
pub fn init(config_dir: PathBuf) {
    let config_path = config_dir.join("settings.json");
    let settings = Settings::load(&config_path);

    *CONFIG_PATH.write().unwrap() = Some(config_path);
    *SETTINGS.write().unwrap() = Some(settings);
}

/// Default config directory: the platform config dir, or the working
/// directory as a last resort.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|p| p.join("com.cosmos.bookmarks"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the current API key (checks env var first, then stored setting)
pub fn get_api_key() -> Option<String> {
    // Environment variable takes precedence
    if let Ok(key) = std::env::var("GEMINI_API_KEY") {
        if !key.is_empty() {
            return Some(key);
        }
    }

    let guard = SETTINGS.read().ok()?;
    let settings = guard.as_ref()?;
    settings.gemini_api_key.clone().filter(|k| !k.is_empty())
}

/// Check if an API key is available
pub fn has_api_key() -> bool {
    get_api_key().is_some()
}

/// Set and save the API key
pub fn set_api_key(key: String) -> Result<(), String> {
    update(|s| s.gemini_api_key = Some(key))
}

/// Clear the stored API key
pub fn clear_api_key() -> Result<(), String> {
    update(|s| s.gemini_api_key = None)
}

/// Classifier model name (falls back to the default when uninitialized)
pub fn get_classifier_model() -> String {
    SETTINGS
        .read()
        .ok()
        .and_then(|g| g.as_ref().map(|s| s.classifier_model.clone()))
        .unwrap_or_else(default_classifier_model)
}

/// Classifier sample bound (falls back to the default when uninitialized)
pub fn get_classifier_batch_size() -> usize {
    SETTINGS
        .read()
        .ok()
        .and_then(|g| g.as_ref().map(|s| s.classifier_batch_size))
        .unwrap_or_else(default_classifier_batch_size)
}

/// Default category label for flattening
pub fn get_default_category() -> String {
    SETTINGS
        .read()
        .ok()
        .and_then(|g| g.as_ref().map(|s| s.default_category.clone()))
        .unwrap_or_else(default_category_label)
}

/// Apply a mutation to the settings and persist the result
fn update(f: impl FnOnce(&mut Settings)) -> Result<(), String> {
    let mut guard = SETTINGS.write().map_err(|_| "Settings lock poisoned".to_string())?;
    let settings = guard.get_or_insert_with(Settings::default);
    f(settings);

    let path_guard = CONFIG_PATH.read().map_err(|_| "Config path lock poisoned".to_string())?;
    if let Some(path) = path_guard.as_ref() {
        settings.save(path)?;
    }

    Ok(())
}
