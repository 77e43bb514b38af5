#![allow(dead_code)]

pub mod mock_engine;

use async_trait::async_trait;
use sayit::commands::SayPlugin;
use sayit::config::SettingsStore;
use sayit::error::SayResult;
use sayit::host::HostShell;
use sayit::selection::{Selection, SelectionPrompt};
use sayit::voices::Voice;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub use mock_engine::MockEngine;

/// Prompt answering from a script; an exhausted script dismisses
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<Selection>>,
    /// Every prompt shown: (message, items)
    pub asked: Mutex<Vec<(String, Vec<String>)>>,
}

impl ScriptedPrompt {
    pub fn answering(answers: &[&str]) -> Self {
        let prompt = Self::default();
        for answer in answers {
            prompt.push(Selection::Chosen(answer.to_string()));
        }
        prompt
    }

    pub fn push(&self, answer: Selection) {
        self.answers.lock().unwrap().push_back(answer);
    }

    pub fn asked(&self) -> Vec<(String, Vec<String>)> {
        self.asked.lock().unwrap().clone()
    }
}

#[async_trait]
impl SelectionPrompt for ScriptedPrompt {
    async fn select(&self, message: &str, items: &[String]) -> Selection {
        self.asked
            .lock()
            .unwrap()
            .push((message.to_string(), items.to_vec()));
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Selection::Dismissed)
    }
}

#[derive(Debug, Default)]
pub struct MockHost {
    pub selection: Mutex<String>,
    pub notices: Mutex<Vec<String>>,
}

impl MockHost {
    pub fn select(&self, text: &str) {
        *self.selection.lock().unwrap() = text.to_string();
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().unwrap().clone()
    }
}

impl HostShell for MockHost {
    fn notify_user(&self, message: &str) {
        self.notices.lock().unwrap().push(message.to_string());
    }

    fn selected_text(&self) -> String {
        self.selection.lock().unwrap().clone()
    }
}

/// In-memory settings blob that counts saves
#[derive(Debug, Default, Clone)]
pub struct MemorySettings {
    pub blob: Arc<Mutex<Option<serde_json::Value>>>,
    pub saves: Arc<Mutex<usize>>,
}

impl MemorySettings {
    pub fn with_blob(blob: serde_json::Value) -> Self {
        let settings = Self::default();
        *settings.blob.lock().unwrap() = Some(blob);
        settings
    }

    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap()
    }

    pub fn stored(&self) -> Option<serde_json::Value> {
        self.blob.lock().unwrap().clone()
    }
}

impl SettingsStore for MemorySettings {
    fn load(&self) -> SayResult<Option<serde_json::Value>> {
        Ok(self.blob.lock().unwrap().clone())
    }

    fn save(&self, blob: &serde_json::Value) -> SayResult<()> {
        *self.blob.lock().unwrap() = Some(blob.clone());
        *self.saves.lock().unwrap() += 1;
        Ok(())
    }
}

pub fn sample_voices() -> Vec<Voice> {
    vec![
        Voice::new("C", "fr-FR"),
        Voice::new("A", "en-US"),
        Voice::new("B", "en-US"),
        Voice::new("A", "en-US"),
    ]
}

/// Plugin wired to mocks, with the handles a test needs to inspect them
pub struct TestContext {
    pub plugin: SayPlugin,
    pub engine: Arc<MockEngine>,
    pub prompt: Arc<ScriptedPrompt>,
    pub host: Arc<MockHost>,
    pub settings: MemorySettings,
}

impl TestContext {
    pub fn new(engine: MockEngine, settings: MemorySettings) -> Self {
        let engine = Arc::new(engine);
        let prompt = Arc::new(ScriptedPrompt::default());
        let host = Arc::new(MockHost::default());
        let plugin = SayPlugin::new(
            engine.clone(),
            prompt.clone(),
            host.clone(),
            Box::new(settings.clone()),
        )
        .with_voice_poll(Duration::from_millis(10));

        Self {
            plugin,
            engine,
            prompt,
            host,
            settings,
        }
    }

    pub async fn loaded() -> Self {
        let mut ctx = Self::new(MockEngine::new(sample_voices()), MemorySettings::default());
        ctx.plugin.load().await;
        ctx
    }

    pub fn answer(&self, answers: &[&str]) {
        for answer in answers {
            self.prompt.push(Selection::Chosen(answer.to_string()));
        }
    }
}
