//! TTS (Text-to-Speech) Module
//!
//! Provides a unified interface over the local speech backends, plus the
//! "voices changed" watch that keeps the catalog current.

use crate::config::Preferences;
use crate::voices::Voice;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub mod espeak;
pub mod system;

/// A single speech request
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    /// Voice name, `None` for the engine default
    pub voice: Option<String>,
    /// Language tag, `None` for the engine default
    pub lang: Option<String>,
    pub pitch: f32,
    pub rate: f32,
}

impl Utterance {
    /// Build an utterance from the current preferences and the resolved voice
    pub fn new(text: &str, voice: Option<&Voice>, prefs: &Preferences) -> Self {
        Self {
            text: text.to_string(),
            voice: voice.map(|v| v.name.clone()),
            lang: voice.map(|v| v.locale.clone()),
            pitch: prefs.pitch,
            rate: prefs.rate,
        }
    }
}

/// Trait for TTS engines
#[async_trait]
pub trait SpeechEngine: Send + Sync + std::fmt::Debug {
    /// Get the engine name
    fn name(&self) -> &str;

    /// Whether speech synthesis is available on this machine
    async fn is_supported(&self) -> bool;

    /// Voices the engine currently offers
    async fn list_voices(&self) -> Result<Vec<Voice>>;

    /// Whether an utterance is still being spoken
    fn is_speaking(&self) -> bool;

    /// Stop the utterance in flight, if any
    async fn cancel(&self) -> Result<()>;

    /// Start speaking; returns once the utterance is handed to the engine
    async fn submit(&self, utterance: Utterance) -> Result<()>;
}

/// Map a 0.5..1.5 multiplier onto an engine's `min..=max` range, 1.0 landing on `normal`
pub fn multiplier_to_range(value: f32, min: f32, normal: f32, max: f32) -> f32 {
    let offset = (value - 1.0) * 2.0;
    let scaled = if offset >= 0.0 {
        normal + offset * (max - normal)
    } else {
        normal + offset * (normal - min)
    };
    scaled.clamp(min, max)
}

/// Factory to create the configured TTS engine
pub async fn create_engine(kind: &str) -> Result<Arc<dyn SpeechEngine>> {
    info!("🛠️ Creating TTS engine: {}", kind);
    let engine: Arc<dyn SpeechEngine> = match kind {
        "system" | "speech-dispatcher" => {
            info!("  - Using speech-dispatcher");
            Arc::new(system::SystemEngine::new())
        }
        "espeak" | "espeak-ng" => {
            info!("  - Using eSpeak NG");
            Arc::new(espeak::EspeakEngine::new())
        }
        _ => {
            warn!("  - Unknown engine '{}', falling back to System", kind);
            Arc::new(system::SystemEngine::new())
        }
    };
    info!("✅ TTS engine '{}' initialized", engine.name());
    Ok(engine)
}

/// Subscription to "voices changed" notifications
///
/// Holds the polling task; dropping the watch stops it.
#[derive(Debug)]
pub struct VoiceWatch {
    rx: mpsc::UnboundedReceiver<Vec<Voice>>,
    task: JoinHandle<()>,
}

impl VoiceWatch {
    /// Wait for the next change; `None` once the watch has stopped
    pub async fn changed(&mut self) -> Option<Vec<Voice>> {
        self.rx.recv().await
    }
}

impl Drop for VoiceWatch {
    fn drop(&mut self) {
        debug!("Voice watch released");
        self.task.abort();
    }
}

/// Poll the engine's voice list and report every change against `initial`
pub fn watch_voices(
    engine: Arc<dyn SpeechEngine>,
    initial: Vec<Voice>,
    interval: Duration,
) -> VoiceWatch {
    let (tx, rx) = mpsc::unbounded_channel();

    let task = tokio::spawn(async move {
        let mut last = initial;
        loop {
            tokio::time::sleep(interval).await;
            match engine.list_voices().await {
                Ok(voices) if voices != last => {
                    info!("🔄 Voices changed: {} available", voices.len());
                    last = voices.clone();
                    if tx.send(voices).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => debug!("Voice poll failed on {}: {}", engine.name(), e),
            }
        }
    });

    VoiceWatch { rx, task }
}
