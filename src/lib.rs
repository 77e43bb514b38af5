//! Sayit Library
//!
//! Reads selected text aloud through local speech synthesis: voice catalog,
//! preferences with a recent-voices shortlist, speech dispatch and the
//! command shell that wires them to a host.

pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod host;
pub mod preferences;
pub mod selection;
pub mod tts;
pub mod utils;
pub mod voices;
