//! Mock TTS Engine for Testing
//!
//! Records every engine call and submitted utterance for verification.

use anyhow::Result;
use async_trait::async_trait;
use sayit::tts::{SpeechEngine, Utterance};
use sayit::voices::Voice;
use std::sync::Mutex;

#[derive(Debug)]
pub struct MockEngine {
    pub supported: bool,
    pub voices: Mutex<Vec<Voice>>,
    /// Reported by `is_speaking`; cleared by `cancel`
    pub speaking: Mutex<bool>,
    /// Engine calls in order: "cancel" or "submit"
    pub calls: Mutex<Vec<String>>,
    pub submitted: Mutex<Vec<Utterance>>,
}

impl MockEngine {
    pub fn new(voices: Vec<Voice>) -> Self {
        Self {
            supported: true,
            voices: Mutex::new(voices),
            speaking: Mutex::new(false),
            calls: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new(Vec::new())
        }
    }

    pub fn set_speaking(&self, speaking: bool) {
        *self.speaking.lock().unwrap() = speaking;
    }

    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn get_submitted(&self) -> Vec<Utterance> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechEngine for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    async fn is_supported(&self) -> bool {
        self.supported
    }

    async fn list_voices(&self) -> Result<Vec<Voice>> {
        Ok(self.voices.lock().unwrap().clone())
    }

    fn is_speaking(&self) -> bool {
        *self.speaking.lock().unwrap()
    }

    async fn cancel(&self) -> Result<()> {
        self.calls.lock().unwrap().push("cancel".to_string());
        *self.speaking.lock().unwrap() = false;
        Ok(())
    }

    async fn submit(&self, utterance: Utterance) -> Result<()> {
        self.calls.lock().unwrap().push("submit".to_string());
        self.submitted.lock().unwrap().push(utterance);
        *self.speaking.lock().unwrap() = true;
        Ok(())
    }
}
