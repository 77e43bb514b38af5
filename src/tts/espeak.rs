//! eSpeak NG engine calling the local binary
//!
//! The `tts` crate only reaches eSpeak through speech-dispatcher, so this
//! backend talks to `espeak-ng` directly for machines without the daemon.

use super::{SpeechEngine, Utterance};
use crate::voices::Voice;
use anyhow::Result;
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Mutex;
use tokio::process::{Child, Command};
use tracing::debug;

const ESPEAK: &str = "espeak-ng";

/// eSpeak's own defaults, scaled by the pitch/rate multipliers
const BASE_PITCH: f32 = 50.0;
const BASE_WPM: f32 = 175.0;

#[derive(Debug, Default)]
pub struct EspeakEngine {
    current: Mutex<Option<Child>>,
}

impl EspeakEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn build_args(utterance: &Utterance) -> Vec<String> {
        let mut args = Vec::new();
        // espeak-ng selects voices by language tag
        if let Some(voice) = utterance.lang.as_ref().or(utterance.voice.as_ref()) {
            args.push("-v".to_string());
            args.push(voice.clone());
        }
        let pitch = (BASE_PITCH * utterance.pitch).round().clamp(0.0, 99.0) as u32;
        let wpm = (BASE_WPM * utterance.rate).round().clamp(80.0, 450.0) as u32;
        args.push("-p".to_string());
        args.push(pitch.to_string());
        args.push("-s".to_string());
        args.push(wpm.to_string());
        args.push("--".to_string());
        args.push(utterance.text.clone());
        args
    }
}

/// Parse the `espeak-ng --voices` table.
///
/// Columns: `Pty Language Age/Gender VoiceName File Other Languages`.
pub fn parse_voice_table(output: &str) -> Vec<Voice> {
    output
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 4 || fields[0] == "Pty" {
                return None;
            }
            Some(Voice::new(fields[3].replace('_', " "), fields[1]))
        })
        .collect()
}

#[async_trait]
impl SpeechEngine for EspeakEngine {
    fn name(&self) -> &str {
        "espeak"
    }

    async fn is_supported(&self) -> bool {
        Command::new(ESPEAK)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }

    async fn list_voices(&self) -> Result<Vec<Voice>> {
        let output = Command::new(ESPEAK).arg("--voices").output().await?;
        if !output.status.success() {
            return Err(anyhow::anyhow!("espeak-ng --voices failed"));
        }
        Ok(parse_voice_table(&String::from_utf8_lossy(&output.stdout)))
    }

    fn is_speaking(&self) -> bool {
        let Ok(mut current) = self.current.lock() else {
            return false;
        };
        match current.as_mut().map(|child| child.try_wait()) {
            Some(Ok(None)) => true,
            Some(_) => {
                *current = None;
                false
            }
            None => false,
        }
    }

    async fn cancel(&self) -> Result<()> {
        let running = self
            .current
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {}", e))?
            .take();
        if let Some(mut child) = running {
            debug!("Stopping espeak-ng (pid {:?})", child.id());
            // Kills and reaps the child
            child.kill().await?;
        }
        Ok(())
    }

    async fn submit(&self, utterance: Utterance) -> Result<()> {
        debug!("eSpeak speaking: {}", utterance.text);

        let child = Command::new(ESPEAK)
            .args(Self::build_args(&utterance))
            .stdout(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| anyhow::anyhow!("Failed to spawn espeak-ng: {}", e))?;

        *self
            .current
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {}", e))? = Some(child);
        Ok(())
    }
}
