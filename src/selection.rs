//! Selection Prompt
//!
//! The pickers ask the host to choose one item from a list. A prompt resolves
//! exactly once, either with the chosen item or as dismissed.
//!
//! [`TerminalPrompt`] is the stdin implementation used by the shell: a
//! numbered, paginated list that also accepts a typed fragment of an item.

use crate::utils::find_best_match;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info};

/// Number of items shown per page
const ITEMS_PER_PAGE: usize = 10;

/// Minimum fuzzy score for a typed fragment to pick an item
const FUZZY_CUTOFF: f64 = 0.6;

/// Outcome of a selection prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Chosen(String),
    /// Closed without picking anything
    Dismissed,
}

impl Selection {
    pub fn chosen(self) -> Option<String> {
        match self {
            Selection::Chosen(item) => Some(item),
            Selection::Dismissed => None,
        }
    }
}

/// Asks the user to pick one of `items`
#[async_trait]
pub trait SelectionPrompt: Send + Sync {
    async fn select(&self, message: &str, items: &[String]) -> Selection;
}

/// Result of a selection command
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionResult {
    /// User selected an item
    Selected(String, usize),
    /// User wants next page
    NextPage,
    /// User wants previous page
    PreviousPage,
    /// User cancelled selection
    Cancelled,
    /// Show the options again (no action yet)
    ShowOptions,
    /// Input not recognized
    NotRecognized,
}

/// State of the selection handler
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionState {
    /// No active selection
    Inactive,
    /// Waiting for user to select
    Active,
}

/// Handles selection lists, pagination, and user selection commands.
#[derive(Debug)]
pub struct SelectionHandler {
    items: Vec<String>,
    /// Current page (0-indexed)
    page: usize,
    title: String,
    state: SelectionState,
}

impl Default for SelectionHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionHandler {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            page: 0,
            title: "Select an item".to_string(),
            state: SelectionState::Inactive,
        }
    }

    /// Set items for selection and activate
    pub fn set_items(&mut self, items: Vec<String>, title: &str) {
        debug!("📋 Selection started: {} items for '{}'", items.len(), title);
        self.items = items;
        self.page = 0;
        self.title = title.to_string();
        self.state = SelectionState::Active;
    }

    pub fn is_active(&self) -> bool {
        self.state == SelectionState::Active
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn total_pages(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            (self.items.len() - 1) / ITEMS_PER_PAGE + 1
        }
    }

    pub fn current_page_items(&self) -> &[String] {
        let start = self.page * ITEMS_PER_PAGE;
        let end = std::cmp::min(start + ITEMS_PER_PAGE, self.items.len());
        &self.items[start..end]
    }

    /// Render the title and the current page of numbered items
    pub fn options_text(&self) -> String {
        if self.items.is_empty() {
            return format!("{}\n  (nothing to select)", self.title);
        }

        let start_idx = self.page * ITEMS_PER_PAGE;
        let mut msg = self.title.clone();
        for (i, item) in self.current_page_items().iter().enumerate() {
            msg += &format!("\n  {:>2}. {}", start_idx + i + 1, item);
        }

        if self.total_pages() > 1 {
            msg += &format!("\n  Page {}/{}.", self.page + 1, self.total_pages());
            if self.page + 1 < self.total_pages() {
                msg += " Type 'next' for more.";
            }
        }
        msg
    }

    /// Handle a line of user input
    pub fn handle_command(&mut self, text: &str) -> SelectionResult {
        if !self.is_active() {
            return SelectionResult::NotRecognized;
        }

        let text = text.trim().to_lowercase();

        match text.as_str() {
            "" | "cancel" | "quit" | "exit" | "q" => {
                debug!("Selection: cancelled");
                self.clear();
                return SelectionResult::Cancelled;
            }
            "next" | "more" | "n" => {
                let max_page = self.total_pages().saturating_sub(1);
                if self.page < max_page {
                    self.page += 1;
                    debug!("Selection: next page -> {}", self.page + 1);
                    return SelectionResult::NextPage;
                }
                return SelectionResult::ShowOptions; // Already on last page
            }
            "previous" | "prev" | "back" | "p" => {
                if self.page > 0 {
                    self.page -= 1;
                    debug!("Selection: previous page -> {}", self.page + 1);
                    return SelectionResult::PreviousPage;
                }
                return SelectionResult::ShowOptions; // Already on first page
            }
            _ => {}
        }

        let mut clean_text = text.as_str();
        for prefix in ["number ", "option ", "choice "] {
            if let Some(rest) = clean_text.strip_prefix(prefix) {
                clean_text = rest;
                break;
            }
        }

        if let Some(number) = parse_number(clean_text) {
            // Numbers run across pages, so any listed item can be picked
            if number <= self.items.len() {
                return self.select_index(number - 1);
            }
        }

        if let Some(found) = find_best_match(&text, &self.items, FUZZY_CUTOFF) {
            if let Some(idx) = self.items.iter().position(|item| *item == found.value) {
                return self.select_index(idx);
            }
        }

        SelectionResult::NotRecognized
    }

    fn select_index(&mut self, idx: usize) -> SelectionResult {
        let selected = self.items[idx].clone();
        info!("📌 Selected: {} (index {})", selected, idx);
        self.clear();
        SelectionResult::Selected(selected, idx)
    }

    /// Clear selection state
    pub fn clear(&mut self) {
        self.items.clear();
        self.page = 0;
        self.title = "Select an item".to_string();
        self.state = SelectionState::Inactive;
    }
}

/// Parse a 1-based item number from digits or a number word
fn parse_number(text: &str) -> Option<usize> {
    let text = text.trim().to_lowercase();

    if let Ok(n) = text.parse::<usize>() {
        return (n >= 1).then_some(n);
    }

    let word_map = [
        ("one", 1),
        ("two", 2),
        ("three", 3),
        ("four", 4),
        ("five", 5),
        ("six", 6),
        ("seven", 7),
        ("eight", 8),
        ("nine", 9),
        ("ten", 10),
        ("first", 1),
        ("second", 2),
        ("third", 3),
        ("fourth", 4),
        ("fifth", 5),
    ];

    word_map
        .iter()
        .find(|(word, _)| text == *word)
        .map(|(_, num)| *num)
}

/// Selection prompt reading answers from the shell's input lines
#[derive(Debug, Clone)]
pub struct TerminalPrompt {
    lines: Arc<Mutex<mpsc::Receiver<String>>>,
}

impl TerminalPrompt {
    /// `lines` is shared with the shell loop, which never reads while a prompt is open
    pub fn new(lines: Arc<Mutex<mpsc::Receiver<String>>>) -> Self {
        Self { lines }
    }
}

#[async_trait]
impl SelectionPrompt for TerminalPrompt {
    async fn select(&self, message: &str, items: &[String]) -> Selection {
        if items.is_empty() {
            info!("Nothing to choose for '{}'", message);
            return Selection::Dismissed;
        }

        let mut handler = SelectionHandler::new();
        handler.set_items(items.to_vec(), message);
        println!("{}", handler.options_text());

        let mut lines = self.lines.lock().await;
        loop {
            let Some(line) = lines.recv().await else {
                return Selection::Dismissed;
            };

            match handler.handle_command(&line) {
                SelectionResult::Selected(item, _) => return Selection::Chosen(item),
                SelectionResult::Cancelled => return Selection::Dismissed,
                SelectionResult::NextPage
                | SelectionResult::PreviousPage
                | SelectionResult::ShowOptions => println!("{}", handler.options_text()),
                SelectionResult::NotRecognized => {
                    println!("'{}' matches nothing, pick a number or type 'cancel'", line.trim())
                }
            }
        }
    }
}
