// src/terminal.rs

use colored::Colorize;
use std::io::{self, Write};

use crate::models::{MessageBubble, Sender};
use crate::view::{Alerter, MessageView};

pub fn bubble_prefix(bubble: &MessageBubble) -> &'static str {
    if bubble.class == Sender::User.css_class() {
        "💬 You: "
    } else {
        "🤖 AI: "
    }
}

/// Prints bubbles to stdout as they are appended. Text is written as-is.
#[derive(Debug, Default)]
pub struct TerminalTranscript;

impl MessageView for TerminalTranscript {
    fn append(&self, bubble: MessageBubble) {
        let prefix = bubble_prefix(&bubble);
        let line = if bubble.class == Sender::User.css_class() {
            format!("{}{}", prefix, bubble.text).bright_green()
        } else {
            format!("{}{}", prefix, bubble.text).bright_blue()
        };
        println!("{}", line);
    }

    fn scroll_to_bottom(&self) {
        let _ = io::stdout().flush();
    }
}

#[derive(Debug, Default)]
pub struct TerminalAlerter;

impl Alerter for TerminalAlerter {
    fn alert(&self, message: &str) {
        println!("{} {}", "!".red().bold(), message.yellow());
    }
}
