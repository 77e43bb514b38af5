//! Speech Dispatcher
//!
//! Turns text plus the current preferences into an utterance and hands it to
//! the engine. At most one utterance is in flight: a new `speak` cancels the
//! previous one.

use crate::config::Preferences;
use crate::error::{SayError, SayResult};
use crate::tts::{SpeechEngine, Utterance};
use crate::voices::VoiceCatalog;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct SpeechDispatcher {
    engine: Arc<dyn SpeechEngine>,
    last_spoken: Option<String>,
}

impl SpeechDispatcher {
    pub fn new(engine: Arc<dyn SpeechEngine>) -> Self {
        Self {
            engine,
            last_spoken: None,
        }
    }

    /// Text of the most recent `speak` call
    pub fn last_spoken(&self) -> Option<&str> {
        self.last_spoken.as_deref()
    }

    pub async fn speak(
        &mut self,
        text: &str,
        prefs: &Preferences,
        catalog: &VoiceCatalog,
    ) -> SayResult<()> {
        self.last_spoken = Some(text.to_string());

        if self.engine.is_speaking() {
            debug!("Cancelling utterance in flight");
            if let Err(e) = self.engine.cancel().await {
                warn!("⚠️ Could not cancel current speech: {}", e);
            }
        }

        if text.trim().is_empty() {
            debug!("Nothing to speak");
            return Ok(());
        }

        let voice = catalog.find_by_name(&prefs.voice_name);
        if voice.is_none() && !prefs.voice_name.is_empty() {
            debug!("Voice '{}' not available, using default", prefs.voice_name);
        }

        let utterance = Utterance::new(text, voice, prefs);
        info!(
            "📢 Speaking {} chars (voice: {}, pitch {}, rate {})",
            text.chars().count(),
            utterance.voice.as_deref().unwrap_or("default"),
            utterance.pitch,
            utterance.rate
        );

        self.engine
            .submit(utterance)
            .await
            .map_err(|e| SayError::Tts(e.to_string()))
    }

    /// Speak the last text again with the current preferences
    pub async fn repeat(&mut self, prefs: &Preferences, catalog: &VoiceCatalog) -> SayResult<()> {
        match self.last_spoken.clone() {
            Some(text) => self.speak(&text, prefs, catalog).await,
            None => {
                debug!("Nothing spoken yet, nothing to repeat");
                Ok(())
            }
        }
    }

    /// Stop speaking if an utterance is in flight
    pub async fn stop(&self) -> SayResult<()> {
        if self.engine.is_speaking() {
            self.engine
                .cancel()
                .await
                .map_err(|e| SayError::Tts(e.to_string()))?;
        }
        Ok(())
    }
}
