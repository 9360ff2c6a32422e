// src/chat.rs

use std::sync::Arc;

use crate::{
    api::Backend,
    config::{ChatFailurePolicy, Config, OverlapPolicy},
    constants::{CHAT_CATCH_ALL, CHAT_ENDPOINT},
    errors::{ClientError, ClientResult},
    models::{ChatRequest, Message, MessageBubble, Sender},
    single_flight::SingleFlight,
    view::{Alerter, InputField, MessageView},
};

/// Renders `text` as a bubble tagged with `sender` and scrolls it into view.
pub fn display_message(view: &dyn MessageView, text: &str, sender: Sender) {
    view.append(MessageBubble::from(&Message::new(text, sender)));
    view.scroll_to_bottom();
}

#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub endpoint: String,
    pub failure_policy: ChatFailurePolicy,
    pub overlap_policy: OverlapPolicy,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            endpoint: CHAT_ENDPOINT.to_string(),
            failure_policy: ChatFailurePolicy::default(),
            overlap_policy: OverlapPolicy::default(),
        }
    }
}

impl ChatSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            endpoint: config.endpoints.chat.clone(),
            failure_policy: config.chat_failure_policy,
            overlap_policy: config.overlap_policy,
        }
    }
}

pub struct ChatFlow<B> {
    backend: B,
    input: Arc<dyn InputField>,
    transcript: Arc<dyn MessageView>,
    alerter: Option<Arc<dyn Alerter>>,
    settings: ChatSettings,
    guard: SingleFlight,
}

impl<B: Backend> ChatFlow<B> {
    pub fn new(
        backend: B,
        input: Arc<dyn InputField>,
        transcript: Arc<dyn MessageView>,
        settings: ChatSettings,
    ) -> Self {
        Self {
            backend,
            input,
            transcript,
            alerter: None,
            settings,
            guard: SingleFlight::new(),
        }
    }

    /// Where failures go under `ChatFailurePolicy::Alert`.
    pub fn with_alerter(mut self, alerter: Arc<dyn Alerter>) -> Self {
        self.alerter = Some(alerter);
        self
    }

    pub fn is_sending(&self) -> bool {
        self.guard.is_in_flight()
    }

    /// Sends the current input and renders both sides of the exchange.
    ///
    /// Returns `Ok(None)` without touching anything when the input is empty.
    /// On failure the user bubble stays and the input keeps its text.
    pub async fn send_message(&self) -> ClientResult<Option<Message>> {
        let text = self.input.value();
        if text.is_empty() {
            return Ok(None);
        }

        let _permit = match self.settings.overlap_policy {
            OverlapPolicy::Reject => Some(self.guard.try_begin().ok_or(ClientError::Busy("chat"))?),
            OverlapPolicy::Allow => None,
        };

        match self.exchange(text).await {
            Ok(reply) => Ok(Some(reply)),
            Err(err) => {
                log::error!("Chat error: {}", err);
                if self.settings.failure_policy == ChatFailurePolicy::Alert {
                    match &self.alerter {
                        Some(alerter) => alerter.alert(CHAT_CATCH_ALL),
                        None => log::warn!("chat failure alert requested but no alerter is attached"),
                    }
                }
                Err(err)
            }
        }
    }

    async fn exchange(&self, text: String) -> ClientResult<Message> {
        display_message(self.transcript.as_ref(), &text, Sender::User);

        let body = serde_json::to_value(ChatRequest { message: text })?;
        let reply = self.backend.post_json(&self.settings.endpoint, &body).await?;
        log::debug!("Chat response status: {}", reply.status);

        // The status is not checked: an error body that still carries a
        // `message` is shown like any other reply.
        let reply_text = reply
            .json()?
            .message
            .ok_or_else(|| ClientError::decode_error("chat reply has no message"))?;

        let message = Message::new(reply_text, Sender::Ai);
        display_message(self.transcript.as_ref(), &message.text, message.sender);
        self.input.clear();

        Ok(message)
    }
}
