//! The page elements the flows read from and write to.
//!
//! Flows receive these at construction time instead of looking elements up by
//! id. The in-memory implementations here back the headless client and tests;
//! `terminal` has the interactive ones.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::models::MessageBubble;

/// Transcript container holding ordered message bubbles.
pub trait MessageView: Send + Sync {
    fn append(&self, bubble: MessageBubble);
    fn scroll_to_bottom(&self);
}

/// Single-line text input.
pub trait InputField: Send + Sync {
    fn value(&self) -> String;
    fn clear(&self);
}

/// Username and password fields of a login or registration form.
pub trait CredentialForm: Send + Sync {
    fn username(&self) -> String;
    fn password(&self) -> String;
}

/// Blocking, user-facing notice.
pub trait Alerter: Send + Sync {
    fn alert(&self, message: &str);
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
struct ListState {
    bubbles: Vec<MessageBubble>,
    scroll_top: usize,
}

/// In-memory transcript. `scroll_top` is the index of the first visible bubble
/// given `viewport` rows.
#[derive(Debug)]
pub struct MessageList {
    state: Mutex<ListState>,
    viewport: usize,
}

impl MessageList {
    pub fn new(viewport: usize) -> Self {
        Self {
            state: Mutex::new(ListState::default()),
            viewport: viewport.max(1),
        }
    }

    pub fn bubbles(&self) -> Vec<MessageBubble> {
        lock(&self.state).bubbles.clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.state).bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn scroll_top(&self) -> usize {
        lock(&self.state).scroll_top
    }

    /// Bubbles currently inside the viewport.
    pub fn visible(&self) -> Vec<MessageBubble> {
        let state = lock(&self.state);
        state
            .bubbles
            .iter()
            .skip(state.scroll_top)
            .take(self.viewport)
            .cloned()
            .collect()
    }
}

impl Default for MessageList {
    fn default() -> Self {
        Self::new(20)
    }
}

impl MessageView for MessageList {
    fn append(&self, bubble: MessageBubble) {
        lock(&self.state).bubbles.push(bubble);
    }

    fn scroll_to_bottom(&self) {
        let mut state = lock(&self.state);
        state.scroll_top = state.bubbles.len().saturating_sub(self.viewport);
    }
}

#[derive(Debug, Default)]
pub struct TextInput {
    value: Mutex<String>,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, value: impl Into<String>) {
        *lock(&self.value) = value.into();
    }
}

impl InputField for TextInput {
    fn value(&self) -> String {
        lock(&self.value).clone()
    }

    fn clear(&self) {
        lock(&self.value).clear();
    }
}

#[derive(Debug, Default)]
pub struct FormFields {
    username: TextInput,
    password: TextInput,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fill(&self, username: impl Into<String>, password: impl Into<String>) {
        self.username.set(username);
        self.password.set(password);
    }
}

impl CredentialForm for FormFields {
    fn username(&self) -> String {
        self.username.value()
    }

    fn password(&self) -> String {
        self.password.value()
    }
}

/// Records alerts instead of showing them.
#[derive(Debug, Default)]
pub struct AlertLog {
    shown: Mutex<Vec<String>>,
}

impl AlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown(&self) -> Vec<String> {
        lock(&self.shown).clone()
    }

    pub fn last(&self) -> Option<String> {
        lock(&self.shown).last().cloned()
    }
}

impl Alerter for AlertLog {
    fn alert(&self, message: &str) {
        lock(&self.shown).push(message.to_string());
    }
}

/// Current route plus everything navigated to.
#[derive(Debug, Default)]
pub struct Location {
    history: Mutex<Vec<String>>,
}

impl Location {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<String> {
        lock(&self.history).last().cloned()
    }

    pub fn history(&self) -> Vec<String> {
        lock(&self.history).clone()
    }
}

impl Navigator for Location {
    fn navigate(&self, route: &str) {
        lock(&self.history).push(route.to_string());
    }
}
