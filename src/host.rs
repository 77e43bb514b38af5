//! Host shell capabilities the add-on relies on

use std::sync::Mutex;

/// Services supplied by the host application
pub trait HostShell: Send + Sync {
    /// Show a short, fire-and-forget notice to the user
    fn notify_user(&self, message: &str);

    /// Text currently selected in the active document, empty when nothing is selected
    fn selected_text(&self) -> String;
}

/// Host for the terminal shell: notices go to stdout, the selection is set by input lines
#[derive(Debug, Default)]
pub struct TerminalHost {
    selection: Mutex<String>,
}

impl TerminalHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_selection(&self, text: &str) {
        if let Ok(mut selection) = self.selection.lock() {
            *selection = text.to_string();
        }
    }
}

impl HostShell for TerminalHost {
    fn notify_user(&self, message: &str) {
        println!("🔔 {}", message);
    }

    fn selected_text(&self) -> String {
        self.selection
            .lock()
            .map(|selection| selection.clone())
            .unwrap_or_default()
    }
}
