//! Command shell
//!
//! Owns the catalog, preferences and dispatcher, ties them to the host's
//! lifecycle and runs the six user commands.

use crate::config::SettingsStore;
use crate::dispatcher::SpeechDispatcher;
use crate::error::{SayError, SayResult};
use crate::host::HostShell;
use crate::preferences::{PreferenceStore, SPEECH_MULTIPLIERS};
use crate::selection::SelectionPrompt;
use crate::tts::{watch_voices, SpeechEngine, VoiceWatch};
use crate::voices::{Voice, VoiceCatalog};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Notice shown once when no speech engine is available
pub const UNSUPPORTED_NOTICE: &str = "Text-to-speech is not supported on your device.";

/// How often the engine's voice list is checked for changes
pub const DEFAULT_VOICE_POLL: Duration = Duration::from_secs(5);

/// Commands registered with the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandId {
    SelectLanguageAndVoice,
    SelectPitch,
    SelectRate,
    SayItAgain,
    SayItAgainInAnotherVoice,
    Say,
}

impl CommandId {
    pub const ALL: [CommandId; 6] = [
        CommandId::SelectLanguageAndVoice,
        CommandId::SelectPitch,
        CommandId::SelectRate,
        CommandId::SayItAgain,
        CommandId::SayItAgainInAnotherVoice,
        CommandId::Say,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            CommandId::SelectLanguageAndVoice => "select-language-and-voice",
            CommandId::SelectPitch => "select-pitch",
            CommandId::SelectRate => "select-rate",
            CommandId::SayItAgain => "say-it-again",
            CommandId::SayItAgainInAnotherVoice => "say-it-again-in-another-voice",
            CommandId::Say => "say",
        }
    }

    /// Human readable name shown in the host's command list
    pub fn name(&self) -> &'static str {
        match self {
            CommandId::SelectLanguageAndVoice => "Select language and voice",
            CommandId::SelectPitch => "Select pitch",
            CommandId::SelectRate => "Select rate",
            CommandId::SayItAgain => "Repeat the last spoken",
            CommandId::SayItAgainInAnotherVoice => "Repeat the last spoken in another voice",
            CommandId::Say => "Say",
        }
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for CommandId {
    type Err = SayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommandId::ALL
            .into_iter()
            .find(|command| command.id() == s)
            .ok_or_else(|| SayError::UnknownCommand(s.to_string()))
    }
}

pub struct SayPlugin {
    engine: Arc<dyn SpeechEngine>,
    prompt: Arc<dyn SelectionPrompt>,
    host: Arc<dyn HostShell>,
    catalog: VoiceCatalog,
    preferences: PreferenceStore,
    /// Only present while loaded on a supported engine
    dispatcher: Option<SpeechDispatcher>,
    voice_watch: Option<VoiceWatch>,
    voice_poll: Duration,
    commands: Vec<CommandId>,
    loaded: bool,
}

impl fmt::Debug for SayPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SayPlugin")
            .field("engine", &self.engine.name())
            .field("voices", &self.catalog.len())
            .field("commands", &self.commands)
            .field("loaded", &self.loaded)
            .finish()
    }
}

impl SayPlugin {
    pub fn new(
        engine: Arc<dyn SpeechEngine>,
        prompt: Arc<dyn SelectionPrompt>,
        host: Arc<dyn HostShell>,
        settings: Box<dyn SettingsStore>,
    ) -> Self {
        Self {
            engine,
            prompt,
            host,
            catalog: VoiceCatalog::new(),
            preferences: PreferenceStore::new(settings),
            dispatcher: None,
            voice_watch: None,
            voice_poll: DEFAULT_VOICE_POLL,
            commands: Vec::new(),
            loaded: false,
        }
    }

    pub fn with_voice_poll(mut self, interval: Duration) -> Self {
        self.voice_poll = interval;
        self
    }

    /// Startup hook: read preferences, check engine support, subscribe to voice changes
    pub async fn load(&mut self) {
        if self.loaded {
            return;
        }
        self.loaded = true;

        if let Err(e) = self.preferences.load_from_store() {
            warn!("⚠️ Could not read preferences, using defaults: {}", e);
        }

        if !self.engine.is_supported().await {
            warn!("⚠️ TTS engine '{}' is not available", self.engine.name());
            self.host.notify_user(UNSUPPORTED_NOTICE);
            return;
        }

        let voices = match self.engine.list_voices().await {
            Ok(voices) => voices,
            Err(e) => {
                warn!("⚠️ Could not list voices: {}", e);
                Vec::new()
            }
        };
        self.catalog.refresh(voices.clone());
        self.voice_watch = Some(watch_voices(self.engine.clone(), voices, self.voice_poll));
        self.dispatcher = Some(SpeechDispatcher::new(self.engine.clone()));
        self.commands = CommandId::ALL.to_vec();

        info!(
            "✅ Loaded with engine '{}' ({} voices, {} commands)",
            self.engine.name(),
            self.catalog.len(),
            self.commands.len()
        );
    }

    /// Shutdown hook: drop the voice subscription and silence any speech
    pub async fn unload(&mut self) {
        self.voice_watch = None;
        if let Some(dispatcher) = self.dispatcher.take() {
            if let Err(e) = dispatcher.stop().await {
                warn!("⚠️ Could not stop speech on unload: {}", e);
            }
        }
        self.commands.clear();
        self.loaded = false;
        info!("👋 Unloaded");
    }

    /// Commands currently registered with the host
    pub fn commands(&self) -> &[CommandId] {
        &self.commands
    }

    pub fn catalog(&self) -> &VoiceCatalog {
        &self.catalog
    }

    pub fn preferences(&self) -> &PreferenceStore {
        &self.preferences
    }

    pub fn last_spoken(&self) -> Option<&str> {
        self.dispatcher.as_ref().and_then(|d| d.last_spoken())
    }

    pub fn on_voices_changed(&mut self, voices: Vec<Voice>) {
        self.catalog.refresh(voices);
    }

    /// Wait for the next voice list change; never resolves without a subscription
    pub async fn next_voices_change(&mut self) -> Option<Vec<Voice>> {
        let changed = match self.voice_watch.as_mut() {
            Some(watch) => watch.changed().await,
            None => None,
        };
        if changed.is_none() {
            self.voice_watch = None;
            std::future::pending::<()>().await;
        }
        changed
    }

    /// Run a registered command; unregistered commands do nothing
    pub async fn run(&mut self, command: CommandId) -> SayResult<()> {
        if !self.commands.contains(&command) {
            info!("Command '{}' is not available", command);
            return Ok(());
        }
        debug!("Running command '{}'", command);

        match command {
            CommandId::SelectLanguageAndVoice => self.select_voice(false).await,
            CommandId::SelectPitch => {
                if let Some(pitch) = self
                    .select_multiplier("Select pitch of the voice (Higher is high)")
                    .await
                {
                    self.persist(|prefs| prefs.set_pitch(pitch));
                }
                Ok(())
            }
            CommandId::SelectRate => {
                if let Some(rate) = self
                    .select_multiplier("Select rate of the voice (Higher is faster)")
                    .await
                {
                    self.persist(|prefs| prefs.set_rate(rate));
                }
                Ok(())
            }
            CommandId::SayItAgain => self.repeat().await,
            CommandId::SayItAgainInAnotherVoice => self.select_voice(true).await,
            CommandId::Say => {
                let text = self.host.selected_text();
                match self.dispatcher.as_mut() {
                    Some(dispatcher) => {
                        dispatcher
                            .speak(&text, self.preferences.preferences(), &self.catalog)
                            .await
                    }
                    None => Ok(()),
                }
            }
        }
    }

    /// Two-step picker: locale group first, then a voice from that group
    async fn select_voice(&mut self, say_again: bool) -> SayResult<()> {
        let groups = self
            .preferences
            .recent_and_grouped(&self.catalog.grouped_by_locale());

        let Some(group) = self
            .prompt
            .select("Select locale of the voice", &groups.keys())
            .await
            .chosen()
        else {
            debug!("Locale picker dismissed");
            return Ok(());
        };

        let names = groups.get(&group).map(<[String]>::to_vec).unwrap_or_default();
        let Some(voice) = self.prompt.select("Select voice", &names).await.chosen() else {
            debug!("Voice picker dismissed");
            return Ok(());
        };

        self.persist(|prefs| prefs.set_voice(&voice));

        if say_again {
            self.repeat().await?;
        }
        Ok(())
    }

    async fn select_multiplier(&self, message: &str) -> Option<f32> {
        let items: Vec<String> = SPEECH_MULTIPLIERS.iter().map(|v| v.to_string()).collect();
        let chosen = self.prompt.select(message, &items).await.chosen()?;
        match chosen.parse::<f32>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("⚠️ Ignoring unreadable value '{}': {}", chosen, e);
                None
            }
        }
    }

    async fn repeat(&mut self) -> SayResult<()> {
        match self.dispatcher.as_mut() {
            Some(dispatcher) => {
                dispatcher
                    .repeat(self.preferences.preferences(), &self.catalog)
                    .await
            }
            None => Ok(()),
        }
    }

    /// Apply a preference update; a failed save is logged, the new value stays in effect
    fn persist(&mut self, update: impl FnOnce(&mut PreferenceStore) -> SayResult<()>) {
        if let Err(e) = update(&mut self.preferences) {
            warn!("⚠️ Could not save preferences: {}", e);
        }
    }
}
