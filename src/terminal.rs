//! Interactive terminal front-end for the chat controller.
//!
//! Plain lines are sent as questions; lines starting with `/` are commands.
//! Prompt and confirmation dialogs read from the same input, so a whole
//! session can be scripted by feeding lines in.

use std::io::{self, BufRead, Write};

use tracing::error;

use crate::client::ChatBackend;
use crate::controller::{ChatController, Prompter, view};

const HELP: &str = "\
Commands:
  /list             reload the chat list
  /open <n|id>      open a chat
  /new              start a new chat
  /rename [n|id]    rename a chat (default: the open one)
  /delete [n|id]    delete a chat (default: the open one)
  /help             show this help
  /quit             exit
Anything else is sent as a question to the open chat.";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Open(String),
    New,
    Rename(Option<String>),
    Delete(Option<String>),
    Help,
    Quit,
    Send(String),
    Empty,
    Unknown(String),
}

/// Parse one input line.
pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Send(line.to_string());
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, Some(arg.trim().to_string()).filter(|a| !a.is_empty())),
        None => (rest, None),
    };

    match (name, arg) {
        ("list" | "ls", _) => Command::List,
        ("open", Some(arg)) => Command::Open(arg),
        ("new", _) => Command::New,
        ("rename", arg) => Command::Rename(arg),
        ("delete" | "rm", arg) => Command::Delete(arg),
        ("help" | "?", _) => Command::Help,
        ("quit" | "exit" | "q", _) => Command::Quit,
        _ => Command::Unknown(line.to_string()),
    }
}

/// Line-based terminal over any reader and writer.
#[derive(Debug)]
pub struct Terminal<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Give back the writer, e.g. to inspect scripted output.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Next line without its line ending, or `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        let trimmed = buf.trim_end_matches(['\r', '\n']).len();
        buf.truncate(trimmed);
        Ok(Some(buf))
    }

    fn show_all<B: ChatBackend>(&mut self, controller: &ChatController<B>) -> io::Result<()> {
        write!(self.output, "{}", controller.render_sidebar())?;
        if controller.current_chat().is_some() {
            write!(self.output, "{}", controller.render_conversation())?;
        }
        Ok(())
    }

    /// Pick the chat named by `selector`, or the open chat.
    fn target<B: ChatBackend>(
        &mut self,
        controller: &ChatController<B>,
        selector: Option<&str>,
    ) -> io::Result<Option<String>> {
        let target = match selector {
            Some(sel) => controller.resolve_chat(sel),
            None => controller.current_chat(),
        };
        if target.is_none() {
            writeln!(self.output, "No such chat.")?;
        }
        Ok(target.map(str::to_string))
    }

    /// Run the read-eval-print loop until `/quit` or end of input.
    pub async fn run<B: ChatBackend>(
        &mut self,
        controller: &mut ChatController<B>,
    ) -> anyhow::Result<()> {
        if let Err(e) = controller.load().await {
            error!(error = %e, "failed to load chats");
        }
        self.show_all(controller)?;

        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;
            let Some(line) = self.read_line()? else {
                break;
            };

            match parse_command(&line) {
                Command::Empty => {}
                Command::Quit => break,
                Command::Help => writeln!(self.output, "{HELP}")?,
                Command::Unknown(cmd) => {
                    writeln!(self.output, "Unknown command: {cmd} (try /help)")?;
                }
                Command::List => {
                    if let Err(e) = controller.list_chats().await {
                        error!(error = %e, "failed to list chats");
                    }
                    write!(self.output, "{}", controller.render_sidebar())?;
                }
                Command::Open(sel) => {
                    let Some(id) = self.target(controller, Some(sel.as_str()))? else {
                        continue;
                    };
                    if let Err(e) = controller.open_chat(&id).await {
                        error!(chat_id = %id, error = %e, "failed to open chat");
                    }
                    self.show_all(controller)?;
                }
                Command::New => {
                    if let Err(e) = controller.create_chat().await {
                        error!(error = %e, "failed to create chat");
                    }
                    self.show_all(controller)?;
                }
                Command::Rename(sel) => {
                    let Some(id) = self.target(controller, sel.as_deref())? else {
                        continue;
                    };
                    match controller.rename_chat(&id, &mut *self).await {
                        Ok(true) => self.show_all(controller)?,
                        Ok(false) => {}
                        Err(e) => error!(chat_id = %id, error = %e, "failed to rename chat"),
                    }
                }
                Command::Delete(sel) => {
                    let Some(id) = self.target(controller, sel.as_deref())? else {
                        continue;
                    };
                    match controller.delete_chat(&id, &mut *self).await {
                        Ok(true) => self.show_all(controller)?,
                        Ok(false) => {}
                        Err(e) => error!(chat_id = %id, error = %e, "failed to delete chat"),
                    }
                }
                Command::Send(text) => self.send(controller, &text).await?,
            }
        }
        Ok(())
    }

    async fn send<B: ChatBackend>(
        &mut self,
        controller: &mut ChatController<B>,
        text: &str,
    ) -> io::Result<()> {
        let Some(pending) = controller.begin_send(text) else {
            if controller.current_chat().is_none() {
                writeln!(self.output, "No chat open. Use /new or /open first.")?;
            }
            return Ok(());
        };

        // User message and placeholder go out before the request.
        for message in &controller.messages()[controller.messages().len() - 2..] {
            write!(self.output, "{}", view::render_message(message))?;
        }
        self.output.flush()?;

        let result = controller
            .backend()
            .send_message(pending.chat_id(), pending.query())
            .await;
        controller.finish_send(pending, result);

        if let Some(reply) = controller.messages().last() {
            write!(self.output, "{}", view::render_message(reply))?;
        }
        Ok(())
    }
}

impl<R: BufRead, W: Write> Prompter for Terminal<R, W> {
    fn prompt(&mut self, message: &str, default: &str) -> Option<String> {
        if default.is_empty() {
            write!(self.output, "{message}: ").ok()?;
        } else {
            write!(self.output, "{message} (was \"{default}\"): ").ok()?;
        }
        self.output.flush().ok()?;
        self.read_line().ok().flatten()
    }

    fn confirm(&mut self, message: &str) -> bool {
        if write!(self.output, "{message} [y/N]: ").is_err() || self.output.flush().is_err() {
            return false;
        }
        matches!(
            self.read_line().ok().flatten().as_deref().map(str::trim),
            Some("y" | "Y" | "yes" | "Yes" | "YES")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("  "), Command::Empty);
        assert_eq!(parse_command("/list"), Command::List);
        assert_eq!(parse_command("/open 2"), Command::Open("2".into()));
        assert_eq!(parse_command("/new"), Command::New);
        assert_eq!(parse_command("/rename"), Command::Rename(None));
        assert_eq!(parse_command("/rename  3 "), Command::Rename(Some("3".into())));
        assert_eq!(parse_command("/rm abc"), Command::Delete(Some("abc".into())));
        assert_eq!(parse_command("/quit"), Command::Quit);
        assert_eq!(parse_command("/frobnicate"), Command::Unknown("/frobnicate".into()));
        assert_eq!(parse_command("/open"), Command::Unknown("/open".into()));
        assert_eq!(
            parse_command("  is tea ok? "),
            Command::Send("is tea ok?".into())
        );
    }

    #[test]
    fn test_prompt_reads_line() {
        let mut term = Terminal::new(Cursor::new("Morning sickness\r\n"), Vec::new());
        assert_eq!(
            term.prompt("New title", "Draft").as_deref(),
            Some("Morning sickness")
        );
        let out = String::from_utf8(term.into_output()).unwrap();
        assert_eq!(out, "New title (was \"Draft\"): ");
    }

    #[test]
    fn test_prompt_at_eof_is_cancel() {
        let mut term = Terminal::new(Cursor::new(""), Vec::new());
        assert_eq!(term.prompt("New title", ""), None);
    }

    #[test]
    fn test_confirm_answers() {
        let mut term = Terminal::new(Cursor::new("y\nno\n\nYES\n"), Vec::new());
        assert!(term.confirm("Delete?"));
        assert!(!term.confirm("Delete?"));
        assert!(!term.confirm("Delete?"));
        assert!(term.confirm("Delete?"));
        assert!(!term.confirm("Delete?"));
    }
}
