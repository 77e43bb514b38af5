//! System TTS engine: speech-dispatcher through the `tts` crate
//!
//! Holds one client connection, so cancelling stops only this client's
//! messages and leaves other speech-dispatcher users (screen readers) alone.

use super::{multiplier_to_range, SpeechEngine, Utterance};
use crate::voices::Voice;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::fmt;
use std::sync::Mutex;
use tracing::{debug, warn};
use tts::Tts;

pub struct SystemEngine {
    /// `None` when no speech service could be reached
    tts: Option<Mutex<Tts>>,
}

#[cfg(target_os = "linux")]
fn open_backend() -> Result<Tts, tts::Error> {
    Tts::new(tts::Backends::SpeechDispatcher)
}

#[cfg(not(target_os = "linux"))]
fn open_backend() -> Result<Tts, tts::Error> {
    Tts::default()
}

impl SystemEngine {
    pub fn new() -> Self {
        let tts = match open_backend() {
            Ok(tts) => Some(Mutex::new(tts)),
            Err(e) => {
                warn!("⚠️ System speech unavailable: {}", e);
                None
            }
        };
        Self { tts }
    }

    fn with_tts<T>(&self, f: impl FnOnce(&mut Tts) -> Result<T, tts::Error>) -> Result<T> {
        let tts = self
            .tts
            .as_ref()
            .ok_or_else(|| anyhow!("System speech is not available"))?;
        let mut tts = tts.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        f(&mut tts).map_err(|e| anyhow!("System speech error: {}", e))
    }
}

impl Default for SystemEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SystemEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemEngine")
            .field("connected", &self.tts.is_some())
            .finish()
    }
}

#[async_trait]
impl SpeechEngine for SystemEngine {
    fn name(&self) -> &str {
        "system"
    }

    async fn is_supported(&self) -> bool {
        // Cancel-before-speak needs both stop and is-speaking
        self.with_tts(|tts| Ok(tts.supported_features()))
            .map(|features| features.stop && features.is_speaking)
            .unwrap_or(false)
    }

    async fn list_voices(&self) -> Result<Vec<Voice>> {
        let voices = self.with_tts(|tts| tts.voices())?;
        Ok(voices
            .iter()
            .map(|v| Voice::new(v.name(), v.language().to_string()))
            .collect())
    }

    fn is_speaking(&self) -> bool {
        self.with_tts(|tts| tts.is_speaking()).unwrap_or(false)
    }

    async fn cancel(&self) -> Result<()> {
        self.with_tts(|tts| tts.stop().map(|_| ()))
    }

    async fn submit(&self, utterance: Utterance) -> Result<()> {
        debug!("System speaking: {}", utterance.text);

        self.with_tts(|tts| {
            if let Some(name) = &utterance.voice {
                match tts.voices()?.into_iter().find(|v| v.name() == *name) {
                    Some(voice) => tts.set_voice(&voice)?,
                    None => debug!("Voice '{}' not offered, keeping the current one", name),
                }
            }

            let pitch = multiplier_to_range(
                utterance.pitch,
                tts.min_pitch(),
                tts.normal_pitch(),
                tts.max_pitch(),
            );
            tts.set_pitch(pitch)?;
            let rate = multiplier_to_range(
                utterance.rate,
                tts.min_rate(),
                tts.normal_rate(),
                tts.max_rate(),
            );
            tts.set_rate(rate)?;

            tts.speak(utterance.text.clone(), false)?;
            Ok(())
        })
    }
}
