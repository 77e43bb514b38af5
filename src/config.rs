use crate::error::{SayError, SayResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Persisted user preferences
///
/// Missing fields in a stored blob fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    /// Voice name, empty means the engine's default voice
    pub voice_name: String,
    pub pitch: f32,
    pub rate: f32,
    /// Most recently chosen voices, newest first
    pub recent_voices: Vec<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            voice_name: "".to_string(),
            pitch: 1.0,
            rate: 1.0,
            recent_voices: Vec::new(),
        }
    }
}

/// Storage for the opaque preferences blob, supplied by the host
pub trait SettingsStore: Send + Sync + std::fmt::Debug {
    /// Load the stored blob, `None` if nothing was saved yet
    fn load(&self) -> SayResult<Option<serde_json::Value>>;

    /// Replace the stored blob
    fn save(&self, blob: &serde_json::Value) -> SayResult<()>;
}

/// Settings kept as pretty-printed JSON in a single file
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl Default for JsonSettingsStore {
    fn default() -> Self {
        Self::new(settings_path())
    }
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&self) -> SayResult<Option<serde_json::Value>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)?;
        match serde_json::from_str(&content) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) => {
                // Graceful degradation: keep the broken file around and start fresh
                tracing::warn!("⚠️ Settings file corrupted or invalid, using defaults: {}", e);
                let backup_path = self.path.with_extension("json.corrupt");
                let _ = std::fs::rename(&self.path, &backup_path);
                Ok(None)
            }
        }
    }

    fn save(&self, blob: &serde_json::Value) -> SayResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SayError::Settings(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }

        let content = serde_json::to_string_pretty(blob)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

pub fn settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sayit")
        .join("data.json")
}
