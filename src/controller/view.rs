//! Text rendering of the sidebar and the message view.
//!
//! Rendering is a pure function of controller state; nothing here keeps
//! state of its own.

use std::fmt::Write as _;

use crate::client::ChatSummary;
use crate::domain::{Message, Role};

/// Marker printed in front of the open chat.
const ACTIVE_MARKER: &str = ">";

/// Render the chat list, numbered from 1, with the open chat marked.
#[must_use]
pub fn render_sidebar(chats: &[ChatSummary], current: Option<&str>) -> String {
    if chats.is_empty() {
        return "(no chats yet, use /new)\n".to_string();
    }

    let width = chats.len().to_string().len();
    let mut out = String::new();
    for (i, chat) in chats.iter().enumerate() {
        let marker = if current == Some(chat.chat_id.as_str()) {
            ACTIVE_MARKER
        } else {
            " "
        };
        let _ = writeln!(out, "{marker} {:>width$}. {}", i + 1, chat.title);
    }
    out
}

/// Render the open chat's title and messages.
#[must_use]
pub fn render_conversation(title: &str, messages: &[Message]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {title} ==");
    for message in messages {
        out.push_str(&render_message(message));
    }
    out
}

/// Render a single message block.
#[must_use]
pub fn render_message(message: &Message) -> String {
    let label = match message.role {
        Role::User => "you",
        Role::Assistant => "assistant",
    };
    let mut out = String::new();
    let mut lines = message.text.lines();
    let first = lines.next().unwrap_or_default();
    let _ = writeln!(out, "[{label}] {first}");
    let indent = " ".repeat(label.len() + 3);
    for line in lines {
        let _ = writeln!(out, "{indent}{line}");
    }
    out
}
