//! Chat view controller.
//!
//! [`ChatController`] owns everything the chat screen shows: the last
//! fetched chat list, which chat is open, its title and its messages. Every
//! user action maps to one request against a [`ChatBackend`], and the view
//! is rebuilt from the server's answer rather than patched locally.
//!
//! # Example
//!
//! ```rust,no_run
//! use rag_chat::client::Client;
//! use rag_chat::controller::ChatController;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut controller = ChatController::new(Client::new("http://localhost:8000")?);
//! controller.load().await?;
//! controller.create_chat().await?;
//! controller.send_message("What should I eat in the first trimester?").await;
//! print!("{}", controller.render_conversation());
//! # Ok(())
//! # }
//! ```

mod prompt;
pub mod view;

pub use prompt::Prompter;

use tracing::{debug, info, warn};

use crate::client::{ChatBackend, ChatSummary, Result, SendResponse};
use crate::domain::Message;

/// Provisional assistant text shown while the answer is generated.
pub const PLACEHOLDER_TEXT: &str = "Thinking...";
/// Assistant text when the server answered without a `bot` field.
pub const NO_RESPONSE_TEXT: &str = "No response.";
/// Assistant text when the send request failed.
pub const SERVER_ERROR_TEXT: &str = "Server error.";

/// How a send attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// No chat open or blank query; nothing was sent.
    Skipped,
    /// The server returned an answer.
    Answered,
    /// The server replied without an answer.
    NoResponse,
    /// The request failed.
    Failed,
}

/// A send whose placeholder is on screen and whose request is pending.
#[derive(Debug)]
pub struct PendingSend {
    chat_id: String,
    query: String,
    placeholder: usize,
}

impl PendingSend {
    /// Chat the query is sent to.
    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    /// Trimmed query text.
    pub fn query(&self) -> &str {
        &self.query
    }
}

/// State and actions of the chat screen.
#[derive(Debug)]
pub struct ChatController<B> {
    backend: B,
    chats: Vec<ChatSummary>,
    current: Option<String>,
    title: String,
    messages: Vec<Message>,
}

impl<B: ChatBackend> ChatController<B> {
    /// Create a controller with an empty view.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            chats: Vec::new(),
            current: None,
            title: String::new(),
            messages: Vec::new(),
        }
    }

    /// Backend used for requests.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Chat list as of the last fetch.
    pub fn chats(&self) -> &[ChatSummary] {
        &self.chats
    }

    /// Identifier of the open chat.
    pub fn current_chat(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Title field of the open chat.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Message view of the open chat.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Render the sidebar.
    pub fn render_sidebar(&self) -> String {
        view::render_sidebar(&self.chats, self.current_chat())
    }

    /// Render the title and message view.
    pub fn render_conversation(&self) -> String {
        view::render_conversation(&self.title, &self.messages)
    }

    /// Resolve a sidebar number (1-based) or a literal chat id.
    pub fn resolve_chat(&self, selector: &str) -> Option<&str> {
        let selector = selector.trim();
        if let Ok(n) = selector.parse::<usize>() {
            if let Some(chat) = n.checked_sub(1).and_then(|i| self.chats.get(i)) {
                return Some(&chat.chat_id);
            }
        }
        self.chats
            .iter()
            .find(|c| c.chat_id == selector)
            .map(|c| c.chat_id.as_str())
    }

    /// Fetch the chat list and open the first chat, if any.
    pub async fn load(&mut self) -> Result<()> {
        self.list_chats().await?;
        if let Some(first) = self.chats.first().map(|c| c.chat_id.clone()) {
            self.open_chat(&first).await?;
        }
        Ok(())
    }

    /// Replace the sidebar with the server's chat list.
    pub async fn list_chats(&mut self) -> Result<&[ChatSummary]> {
        let chats = self.backend.list_chats().await?;
        debug!(count = chats.len(), "chat list loaded");
        self.chats = chats;
        Ok(&self.chats)
    }

    /// Load a chat and make it the open one.
    pub async fn open_chat(&mut self, chat_id: &str) -> Result<()> {
        let detail = self.backend.get_chat(chat_id).await?;
        debug!(chat_id, messages = detail.messages.len(), "chat opened");
        self.current = Some(chat_id.to_string());
        self.title = detail.title;
        self.messages = detail.messages;
        Ok(())
    }

    /// Ask for a new title and rename the chat.
    ///
    /// Returns `false` without sending anything if the prompt was cancelled
    /// or left empty.
    pub async fn rename_chat(
        &mut self,
        chat_id: &str,
        prompter: &mut impl Prompter,
    ) -> Result<bool> {
        let old_title = self
            .chats
            .iter()
            .find(|c| c.chat_id == chat_id)
            .map(|c| c.title.clone())
            .unwrap_or_default();

        let Some(input) = prompter.prompt("New title", &old_title) else {
            return Ok(false);
        };
        let new_title = input.trim();
        if new_title.is_empty() {
            return Ok(false);
        }

        self.backend.rename_chat(chat_id, new_title).await?;
        info!(name: "chat.renamed", chat_id, title = %new_title, "Chat renamed");
        self.list_chats().await?;

        if self.current.as_deref() == Some(chat_id) {
            if let Some(chat) = self.chats.iter().find(|c| c.chat_id == chat_id) {
                self.title = chat.title.clone();
            }
        }
        Ok(true)
    }

    /// Confirm, delete the chat, and reload the list.
    ///
    /// Deleting the open chat clears the view; no other chat is opened.
    pub async fn delete_chat(
        &mut self,
        chat_id: &str,
        prompter: &mut impl Prompter,
    ) -> Result<bool> {
        if !prompter.confirm("Delete this chat?") {
            return Ok(false);
        }

        self.backend.delete_chat(chat_id).await?;
        info!(name: "chat.deleted", chat_id, "Chat deleted");

        if self.current.as_deref() == Some(chat_id) {
            self.current = None;
            self.title.clear();
            self.messages.clear();
        }
        self.list_chats().await?;
        Ok(true)
    }

    /// Create a chat, reload the list and open the new chat.
    pub async fn create_chat(&mut self) -> Result<String> {
        let created = self.backend.create_chat().await?;
        info!(name: "chat.created", chat_id = %created.chat_id, "Chat created");
        self.list_chats().await?;
        self.open_chat(&created.chat_id).await?;
        Ok(created.chat_id)
    }

    /// Send a query to the open chat and show the answer.
    pub async fn send_message(&mut self, query: &str) -> SendOutcome {
        let Some(pending) = self.begin_send(query) else {
            return SendOutcome::Skipped;
        };
        let result = self
            .backend
            .send_message(&pending.chat_id, &pending.query)
            .await;
        self.finish_send(pending, result)
    }

    /// Show the user's message and the placeholder reply.
    ///
    /// Returns `None` when no chat is open or the trimmed query is empty;
    /// the view is left untouched in that case.
    pub fn begin_send(&mut self, query: &str) -> Option<PendingSend> {
        let chat_id = self.current.clone()?;
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        self.messages.push(Message::user(query));
        self.messages.push(Message::assistant(PLACEHOLDER_TEXT));
        Some(PendingSend {
            chat_id,
            query: query.to_string(),
            placeholder: self.messages.len() - 1,
        })
    }

    /// Overwrite the placeholder with the outcome of the send request.
    pub fn finish_send(
        &mut self,
        pending: PendingSend,
        result: Result<SendResponse>,
    ) -> SendOutcome {
        let (text, outcome) = match result {
            Ok(resp) => match resp.bot {
                Some(bot) => (bot, SendOutcome::Answered),
                None => (NO_RESPONSE_TEXT.to_string(), SendOutcome::NoResponse),
            },
            Err(e) => {
                warn!(chat_id = %pending.chat_id, error = %e, "send failed");
                (SERVER_ERROR_TEXT.to_string(), SendOutcome::Failed)
            }
        };

        if let Some(slot) = self.messages.get_mut(pending.placeholder) {
            slot.text = text;
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::client::{ChatDetail, CreatedChat, Error};
    use crate::domain::Role;

    /// In-memory backend that records every call.
    #[derive(Default)]
    struct FakeBackend {
        state: Mutex<FakeState>,
    }

    #[derive(Default)]
    struct FakeState {
        chats: Vec<(String, ChatDetail)>,
        next_id: usize,
        calls: Vec<String>,
        replies: VecDeque<Result<SendResponse>>,
    }

    impl FakeBackend {
        fn with_chats(titles: &[&str]) -> Self {
            let backend = Self::default();
            {
                let mut state = backend.state.lock().unwrap();
                for title in titles {
                    state.next_id += 1;
                    let id = format!("c{}", state.next_id);
                    state.chats.push((
                        id,
                        ChatDetail {
                            chat_id: None,
                            title: (*title).to_string(),
                            created_at: None,
                            messages: vec![],
                        },
                    ));
                }
            }
            backend
        }

        fn push_reply(&self, reply: Result<SendResponse>) {
            self.state.lock().unwrap().replies.push_back(reply);
        }

        fn calls(&self) -> Vec<String> {
            self.state.lock().unwrap().calls.clone()
        }
    }

    fn not_found() -> Error {
        Error::Api {
            status: 404,
            message: "missing".into(),
        }
    }

    #[async_trait]
    impl ChatBackend for FakeBackend {
        async fn list_chats(&self) -> Result<Vec<ChatSummary>> {
            let mut state = self.state.lock().unwrap();
            state.calls.push("list".into());
            Ok(state
                .chats
                .iter()
                .rev()
                .map(|(id, d)| ChatSummary {
                    chat_id: id.clone(),
                    title: d.title.clone(),
                })
                .collect())
        }

        async fn get_chat(&self, chat_id: &str) -> Result<ChatDetail> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(format!("get {chat_id}"));
            state
                .chats
                .iter()
                .find(|(id, _)| id == chat_id)
                .map(|(_, d)| d.clone())
                .ok_or_else(not_found)
        }

        async fn create_chat(&self) -> Result<CreatedChat> {
            let mut state = self.state.lock().unwrap();
            state.calls.push("create".into());
            state.next_id += 1;
            let id = format!("c{}", state.next_id);
            state.chats.push((
                id.clone(),
                ChatDetail {
                    chat_id: None,
                    title: "New Chat".into(),
                    created_at: None,
                    messages: vec![],
                },
            ));
            Ok(CreatedChat { chat_id: id })
        }

        async fn rename_chat(&self, chat_id: &str, title: &str) -> Result<()> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(format!("rename {chat_id} {title}"));
            if let Some((_, d)) = state.chats.iter_mut().find(|(id, _)| id == chat_id) {
                d.title = title.to_string();
            }
            Ok(())
        }

        async fn delete_chat(&self, chat_id: &str) -> Result<()> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(format!("delete {chat_id}"));
            state.chats.retain(|(id, _)| id != chat_id);
            Ok(())
        }

        async fn send_message(&self, chat_id: &str, query: &str) -> Result<SendResponse> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(format!("send {chat_id} {query}"));
            state
                .replies
                .pop_front()
                .unwrap_or_else(|| Ok(SendResponse::default()))
        }
    }

    /// Prompter with canned answers.
    struct Scripted {
        answer: Option<String>,
        confirm: bool,
        asked: Vec<(String, String)>,
    }

    impl Scripted {
        fn answer(text: Option<&str>) -> Self {
            Self {
                answer: text.map(String::from),
                confirm: false,
                asked: vec![],
            }
        }

        fn confirming(confirm: bool) -> Self {
            Self {
                answer: None,
                confirm,
                asked: vec![],
            }
        }
    }

    impl Prompter for Scripted {
        fn prompt(&mut self, message: &str, default: &str) -> Option<String> {
            self.asked.push((message.to_string(), default.to_string()));
            self.answer.clone()
        }

        fn confirm(&mut self, _message: &str) -> bool {
            self.confirm
        }
    }

    #[tokio::test]
    async fn test_load_opens_first_chat() {
        let mut controller = ChatController::new(FakeBackend::with_chats(&["Old", "Newer"]));
        controller.load().await.unwrap();

        // Fake lists newest first.
        assert_eq!(controller.chats().len(), 2);
        assert_eq!(controller.current_chat(), Some("c2"));
        assert_eq!(controller.title(), "Newer");
        assert_eq!(controller.backend().calls(), vec!["list", "get c2"]);
    }

    #[tokio::test]
    async fn test_load_with_no_chats() {
        let mut controller = ChatController::new(FakeBackend::default());
        controller.load().await.unwrap();
        assert_eq!(controller.current_chat(), None);
        assert_eq!(controller.backend().calls(), vec!["list"]);
    }

    #[tokio::test]
    async fn test_open_failure_keeps_view() {
        let mut controller = ChatController::new(FakeBackend::with_chats(&["Only"]));
        controller.load().await.unwrap();

        assert!(controller.open_chat("nope").await.is_err());
        assert_eq!(controller.current_chat(), Some("c1"));
        assert_eq!(controller.title(), "Only");
    }

    #[tokio::test]
    async fn test_create_lists_and_opens() {
        let mut controller = ChatController::new(FakeBackend::with_chats(&["First"]));
        controller.load().await.unwrap();

        let id = controller.create_chat().await.unwrap();
        assert_eq!(id, "c2");
        assert_eq!(controller.current_chat(), Some("c2"));
        assert_eq!(controller.title(), "New Chat");
        assert!(controller.chats().iter().any(|c| c.chat_id == "c2"));
        assert!(controller.render_sidebar().contains("> 1. New Chat"));
    }

    #[tokio::test]
    async fn test_rename_updates_open_title() {
        let mut controller = ChatController::new(FakeBackend::with_chats(&["Draft"]));
        controller.load().await.unwrap();

        let mut prompter = Scripted::answer(Some("  Prenatal vitamins "));
        assert!(controller.rename_chat("c1", &mut prompter).await.unwrap());

        assert_eq!(prompter.asked, vec![("New title".into(), "Draft".into())]);
        assert_eq!(controller.title(), "Prenatal vitamins");
        assert_eq!(controller.chats()[0].title, "Prenatal vitamins");
        assert!(controller
            .backend()
            .calls()
            .contains(&"rename c1 Prenatal vitamins".to_string()));
    }

    #[tokio::test]
    async fn test_rename_empty_or_cancelled_is_noop() {
        let mut controller = ChatController::new(FakeBackend::with_chats(&["Draft"]));
        controller.load().await.unwrap();
        let before = controller.backend().calls().len();

        let mut blank = Scripted::answer(Some("   "));
        assert!(!controller.rename_chat("c1", &mut blank).await.unwrap());
        let mut cancelled = Scripted::answer(None);
        assert!(!controller.rename_chat("c1", &mut cancelled).await.unwrap());

        assert_eq!(controller.backend().calls().len(), before);
        assert_eq!(controller.title(), "Draft");
    }

    #[tokio::test]
    async fn test_rename_other_chat_keeps_open_title() {
        let mut controller = ChatController::new(FakeBackend::with_chats(&["A", "B"]));
        controller.load().await.unwrap();
        assert_eq!(controller.current_chat(), Some("c2"));

        controller
            .rename_chat("c1", &mut Scripted::answer(Some("Renamed")))
            .await
            .unwrap();
        assert_eq!(controller.title(), "B");
    }

    #[tokio::test]
    async fn test_delete_open_chat_clears_selection() {
        let mut controller = ChatController::new(FakeBackend::with_chats(&["A", "B"]));
        controller.load().await.unwrap();

        assert!(controller
            .delete_chat("c2", &mut Scripted::confirming(true))
            .await
            .unwrap());

        assert_eq!(controller.current_chat(), None);
        assert!(controller.messages().is_empty());
        assert_eq!(controller.chats().len(), 1);
        assert_eq!(
            controller.backend().calls(),
            vec!["list", "get c2", "delete c2", "list"]
        );
    }

    #[tokio::test]
    async fn test_delete_declined_sends_nothing() {
        let mut controller = ChatController::new(FakeBackend::with_chats(&["A"]));
        controller.load().await.unwrap();

        assert!(!controller
            .delete_chat("c1", &mut Scripted::confirming(false))
            .await
            .unwrap());
        assert_eq!(controller.chats().len(), 1);
        assert_eq!(controller.current_chat(), Some("c1"));
    }

    #[tokio::test]
    async fn test_send_appends_user_and_placeholder() {
        let mut controller = ChatController::new(FakeBackend::with_chats(&["A"]));
        controller.load().await.unwrap();

        let pending = controller.begin_send("  Is fish safe?  ").unwrap();
        assert_eq!(pending.query(), "Is fish safe?");
        assert_eq!(controller.messages().len(), 2);
        assert_eq!(controller.messages()[0], Message::user("Is fish safe?"));
        assert_eq!(controller.messages()[1].role, Role::Assistant);
        assert_eq!(controller.messages()[1].text, PLACEHOLDER_TEXT);

        let outcome = controller.finish_send(
            pending,
            Ok(SendResponse {
                bot: Some("Low-mercury fish, yes.".into()),
            }),
        );
        assert_eq!(outcome, SendOutcome::Answered);
        assert_eq!(controller.messages()[1].text, "Low-mercury fish, yes.");
    }

    #[tokio::test]
    async fn test_send_fallback_texts() {
        let backend = FakeBackend::with_chats(&["A"]);
        backend.push_reply(Ok(SendResponse { bot: None }));
        backend.push_reply(Err(Error::Api {
            status: 500,
            message: "boom".into(),
        }));
        let mut controller = ChatController::new(backend);
        controller.load().await.unwrap();

        assert_eq!(controller.send_message("one").await, SendOutcome::NoResponse);
        assert_eq!(controller.send_message("two").await, SendOutcome::Failed);

        let texts: Vec<_> = controller.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["one", NO_RESPONSE_TEXT, "two", SERVER_ERROR_TEXT]);
    }

    #[tokio::test]
    async fn test_send_blank_or_without_chat_is_skipped() {
        let mut controller = ChatController::new(FakeBackend::with_chats(&["A"]));
        assert_eq!(controller.send_message("hello").await, SendOutcome::Skipped);

        controller.load().await.unwrap();
        assert_eq!(controller.send_message(" \t\n").await, SendOutcome::Skipped);

        assert!(controller.messages().is_empty());
        assert!(!controller
            .backend()
            .calls()
            .iter()
            .any(|c| c.starts_with("send")));
    }

    #[tokio::test]
    async fn test_resolve_chat_by_number_or_id() {
        let mut controller = ChatController::new(FakeBackend::with_chats(&["A", "B"]));
        controller.list_chats().await.unwrap();

        assert_eq!(controller.resolve_chat("1"), Some("c2"));
        assert_eq!(controller.resolve_chat("c1"), Some("c1"));
        assert_eq!(controller.resolve_chat("0"), None);
        assert_eq!(controller.resolve_chat("3"), None);
        assert_eq!(controller.resolve_chat("zzz"), None);
    }
}
