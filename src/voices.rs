//! Voice Catalog
//!
//! Keeps the set of voices offered by the speech engine, deduplicated and
//! ordered by locale, and groups them for the locale/voice picker.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::debug;

/// A named, locale-tagged synthesis voice
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    pub locale: String,
}

impl Voice {
    pub fn new(name: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locale: locale.into(),
        }
    }
}

/// Ordered groups of item names, keyed by group label
///
/// Keys keep their insertion order so the picker shows them as built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoiceGroups {
    groups: Vec<(String, Vec<String>)>,
}

impl VoiceGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `name` to the group `key`, creating the group at the end if needed
    pub fn push(&mut self, key: &str, name: String) {
        match self.groups.iter_mut().find(|(k, _)| k == key) {
            Some((_, names)) => names.push(name),
            None => self.groups.push((key.to_string(), vec![name])),
        }
    }

    /// Insert a whole group, replacing an existing group with the same key
    pub fn insert(&mut self, key: &str, names: Vec<String>) {
        match self.groups.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = names,
            None => self.groups.push((key.to_string(), names)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.groups
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, names)| names.as_slice())
    }

    pub fn keys(&self) -> Vec<String> {
        self.groups.iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups
            .iter()
            .map(|(k, names)| (k.as_str(), names.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Compare locale tags the way a user expects to read them.
///
/// Case and the `-`/`_` separator are ignored first; lowercase sorts before
/// uppercase only to break exact ties.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let fold = |s: &str| -> String {
        s.chars()
            .map(|c| if c == '_' { '-' } else { c })
            .flat_map(char::to_lowercase)
            .collect()
    };

    fold(a).cmp(&fold(b)).then_with(|| b.cmp(a))
}

/// Voices currently offered by the engine
#[derive(Debug, Clone, Default)]
pub struct VoiceCatalog {
    voices: Vec<Voice>,
}

impl VoiceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the catalog with a deduplicated, locale-sorted copy of `raw`
    pub fn refresh(&mut self, raw: Vec<Voice>) {
        let total = raw.len();
        let mut seen = HashSet::new();
        let mut voices: Vec<Voice> = raw
            .into_iter()
            .filter(|voice| seen.insert(voice.clone()))
            .collect();

        // sort_by is stable: equal locales keep their input order
        voices.sort_by(|a, b| locale_cmp(&a.locale, &b.locale));

        debug!(
            "Voice catalog refreshed: {} voices ({} duplicates dropped)",
            voices.len(),
            total - voices.len()
        );
        self.voices = voices;
    }

    /// First voice whose name matches exactly
    pub fn find_by_name(&self, name: &str) -> Option<&Voice> {
        self.voices.iter().find(|voice| voice.name == name)
    }

    /// Voice names grouped by locale, both in catalog order
    pub fn grouped_by_locale(&self) -> VoiceGroups {
        let mut groups = VoiceGroups::new();
        for voice in &self.voices {
            groups.push(&voice.locale, voice.name.clone());
        }
        groups
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }
}
