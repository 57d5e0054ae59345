//! Blocking dialogs the controller asks the user through.

/// Modal prompt and confirmation dialogs.
///
/// Both calls block until the user answers.
pub trait Prompter {
    /// Ask for a line of text, pre-filled with `default`.
    ///
    /// Returns `None` if the user cancelled.
    fn prompt(&mut self, message: &str, default: &str) -> Option<String>;

    /// Ask a yes/no question.
    fn confirm(&mut self, message: &str) -> bool;
}
