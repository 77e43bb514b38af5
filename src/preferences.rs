//! Preference Store
//!
//! Single owner of the user's voice, pitch, rate and recent-voice history.
//! Every mutation is persisted through the host's [`SettingsStore`].

use crate::config::{Preferences, SettingsStore};
use crate::error::SayResult;
use crate::voices::VoiceGroups;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

/// Maximum number of entries kept in the recent-voices list
pub const MAX_RECENT_VOICES: usize = 10;

/// Group key under which recent voices are offered in the picker
pub const RECENT_GROUP: &str = "recent";

/// Pitch and rate multipliers offered by the pickers
pub const SPEECH_MULTIPLIERS: [f32; 5] = [0.5, 0.75, 1.0, 1.25, 1.5];

#[derive(Debug)]
pub struct PreferenceStore {
    prefs: Preferences,
    store: Box<dyn SettingsStore>,
}

impl PreferenceStore {
    /// Create a store holding the defaults; call [`PreferenceStore::load`] to read persisted data
    pub fn new(store: Box<dyn SettingsStore>) -> Self {
        Self {
            prefs: Preferences::default(),
            store,
        }
    }

    /// Merge a persisted blob over the defaults, field by field
    ///
    /// A field that does not fit is skipped with a warning; the others still apply.
    pub fn load(&mut self, persisted: Option<Value>) {
        self.prefs = match persisted {
            Some(Value::Object(stored)) => merge_over_defaults(stored),
            Some(other) => {
                warn!("⚠️ Stored preferences are not an object, using defaults: {}", other);
                Preferences::default()
            }
            None => Preferences::default(),
        };
        debug!("Preferences loaded: {:?}", self.prefs);
    }

    /// Load from the attached settings store
    pub fn load_from_store(&mut self) -> SayResult<()> {
        let persisted = self.store.load()?;
        self.load(persisted);
        Ok(())
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    /// Choose a voice; an empty name means the picker was dismissed and changes nothing
    pub fn set_voice(&mut self, name: &str) -> SayResult<()> {
        if name.is_empty() {
            return Ok(());
        }

        let recent = &mut self.prefs.recent_voices;
        if recent.first().map(String::as_str) != Some(name) {
            recent.insert(0, name.to_string());
            recent.retain(|v| !v.trim().is_empty());
            recent.truncate(MAX_RECENT_VOICES);
        }
        self.prefs.voice_name = name.to_string();

        info!("🗣️ Voice set to '{}'", name);
        self.save()
    }

    pub fn set_pitch(&mut self, value: f32) -> SayResult<()> {
        self.prefs.pitch = value;
        info!("🎚️ Pitch set to {}", value);
        self.save()
    }

    pub fn set_rate(&mut self, value: f32) -> SayResult<()> {
        self.prefs.rate = value;
        info!("⏩ Rate set to {}", value);
        self.save()
    }

    /// Groups for the two-step picker: recent voices first, then each locale
    pub fn recent_and_grouped(&self, by_locale: &VoiceGroups) -> VoiceGroups {
        let mut groups = VoiceGroups::new();
        groups.insert(RECENT_GROUP, self.prefs.recent_voices.clone());
        for (locale, names) in by_locale.iter() {
            groups.insert(locale, names.to_vec());
        }
        groups
    }

    fn save(&self) -> SayResult<()> {
        let blob = serde_json::to_value(&self.prefs)?;
        self.store.save(&blob)
    }
}

fn merge_over_defaults(stored: Map<String, Value>) -> Preferences {
    let Ok(Value::Object(mut merged)) = serde_json::to_value(Preferences::default()) else {
        return Preferences::default();
    };

    for (key, value) in stored {
        let mut candidate = merged.clone();
        candidate.insert(key.clone(), value.clone());
        match serde_json::from_value::<Preferences>(Value::Object(candidate)) {
            Ok(_) => {
                merged.insert(key, value);
            }
            Err(e) => warn!("⚠️ Ignoring stored preference '{}': {}", key, e),
        }
    }

    serde_json::from_value(Value::Object(merged)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default, Clone)]
    struct RecordingStore {
        saved: Arc<Mutex<Vec<serde_json::Value>>>,
    }

    impl SettingsStore for RecordingStore {
        fn load(&self) -> SayResult<Option<serde_json::Value>> {
            Ok(self.saved.lock().unwrap().last().cloned())
        }

        fn save(&self, blob: &serde_json::Value) -> SayResult<()> {
            self.saved.lock().unwrap().push(blob.clone());
            Ok(())
        }
    }

    fn store() -> (PreferenceStore, RecordingStore) {
        let recorder = RecordingStore::default();
        (PreferenceStore::new(Box::new(recorder.clone())), recorder)
    }

    #[test]
    fn test_load_merges_over_defaults() {
        let (mut prefs, _) = store();
        prefs.load(Some(serde_json::json!({"voiceName": "Alex", "rate": 1.5})));

        let p = prefs.preferences();
        assert_eq!(p.voice_name, "Alex");
        assert_eq!(p.rate, 1.5);
        assert_eq!(p.pitch, 1.0);
        assert!(p.recent_voices.is_empty());
    }

    #[test]
    fn test_load_bad_blob_uses_defaults() {
        let (mut prefs, _) = store();
        prefs.load(Some(serde_json::json!({"pitch": "high"})));
        assert_eq!(prefs.preferences(), &Preferences::default());

        prefs.load(Some(serde_json::json!(["Alex"])));
        assert_eq!(prefs.preferences(), &Preferences::default());

        prefs.load(None);
        assert_eq!(prefs.preferences(), &Preferences::default());
    }

    #[test]
    fn test_load_keeps_valid_fields_beside_bad_one() {
        let (mut prefs, _) = store();
        prefs.load(Some(serde_json::json!({
            "voiceName": "C",
            "recentVoices": ["A", null],
            "pitch": "high",
            "rate": 0.75,
            "theme": "dark"
        })));

        let p = prefs.preferences();
        assert_eq!(p.voice_name, "C");
        assert_eq!(p.rate, 0.75);
        assert_eq!(p.pitch, 1.0);
        assert!(p.recent_voices.is_empty());
    }

    #[test]
    fn test_set_voice_history() {
        let (mut prefs, recorder) = store();
        prefs.set_voice("A").unwrap();
        prefs.set_voice("B").unwrap();
        prefs.set_voice("A").unwrap();

        assert_eq!(prefs.preferences().recent_voices, vec!["A", "B", "A"]);
        assert_eq!(prefs.preferences().voice_name, "A");
        assert_eq!(recorder.saved.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_set_voice_same_head_still_saves() {
        let (mut prefs, recorder) = store();
        prefs.set_voice("A").unwrap();
        prefs.set_voice("A").unwrap();

        assert_eq!(prefs.preferences().recent_voices, vec!["A"]);
        assert_eq!(recorder.saved.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_set_voice_empty_is_noop() {
        let (mut prefs, recorder) = store();
        prefs.set_voice("A").unwrap();
        prefs.set_voice("").unwrap();

        assert_eq!(prefs.preferences().voice_name, "A");
        assert_eq!(prefs.preferences().recent_voices, vec!["A"]);
        assert_eq!(recorder.saved.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_recent_voices_invariants() {
        let (mut prefs, _) = store();
        prefs.load(Some(serde_json::json!({"recentVoices": ["", "  ", "Old"]})));

        let names = ["A", "B", "B", "C", " ", "D", "E", "F", "G", "H", "I", "J", "K", "A"];
        for name in names {
            let before = prefs.preferences().recent_voices.first().cloned();
            prefs.set_voice(name).unwrap();

            let recent = &prefs.preferences().recent_voices;
            assert!(recent.len() <= MAX_RECENT_VOICES);
            assert!(recent.iter().all(|v| !v.trim().is_empty()));
            if before.as_deref() == Some(name) {
                assert_eq!(recent.first().map(String::as_str), Some(name));
                assert_ne!(recent.get(1).map(String::as_str), Some(name));
            }
        }

        let recent = &prefs.preferences().recent_voices;
        assert_eq!(recent.len(), MAX_RECENT_VOICES);
        assert_eq!(recent[0], "A");
        assert_eq!(recent[1], "K");
    }

    #[test]
    fn test_set_pitch_twice_saves_twice() {
        let (mut prefs, recorder) = store();
        prefs.set_pitch(1.25).unwrap();
        prefs.set_pitch(1.25).unwrap();

        assert_eq!(prefs.preferences().pitch, 1.25);
        let saved = recorder.saved.lock().unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[1]["pitch"].as_f64(), Some(1.25));
    }

    #[test]
    fn test_set_rate_accepts_out_of_domain() {
        let (mut prefs, _) = store();
        prefs.set_rate(7.0).unwrap();
        assert_eq!(prefs.preferences().rate, 7.0);
    }

    #[test]
    fn test_recent_and_grouped() {
        let (mut prefs, _) = store();
        prefs.set_voice("C").unwrap();

        let mut by_locale = VoiceGroups::new();
        by_locale.push("en-US", "A".to_string());
        by_locale.push("en-US", "B".to_string());
        by_locale.push("fr-FR", "C".to_string());

        let groups = prefs.recent_and_grouped(&by_locale);
        assert_eq!(groups.keys(), vec![RECENT_GROUP, "en-US", "fr-FR"]);
        assert_eq!(groups.get(RECENT_GROUP).unwrap(), ["C"]);
        assert_eq!(groups.get("en-US").unwrap(), ["A", "B"]);
    }

    #[test]
    fn test_load_from_store() {
        let (mut prefs, recorder) = store();
        recorder
            .saved
            .lock()
            .unwrap()
            .push(serde_json::json!({"voiceName": "Zoe"}));

        prefs.load_from_store().unwrap();
        assert_eq!(prefs.preferences().voice_name, "Zoe");
    }
}
