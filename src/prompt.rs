//! Interactive yes/no and free-text prompts behind the [`Prompter`] trait.
use anyhow::{Context as _, Result};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};

/// Source of answers to interactive questions.
///
/// Production code uses [`TerminalPrompter`]; tests drive scripts with a
/// scripted implementation.
pub trait Prompter: Send + Sync + std::fmt::Debug {
    /// Ask a yes/no question.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read.
    fn confirm(&self, question: &str) -> Result<bool>;

    /// Ask for free text. An empty answer is allowed.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read.
    fn input(&self, question: &str) -> Result<String>;

    /// Ask for free text, substituting `default` for an empty answer.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read.
    fn input_with_default(&self, question: &str, default: &str) -> Result<String> {
        let answer = self.input(&format!("{question} (default {default})"))?;
        let answer = answer.trim();
        Ok(if answer.is_empty() {
            default.to_string()
        } else {
            answer.to_string()
        })
    }

    /// Pick one of `items`; `None` means the user backed out.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read.
    fn select(&self, question: &str, items: &[String]) -> Result<Option<usize>>;
}

/// [`Prompter`] backed by `dialoguer` on the controlling terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&self, question: &str) -> Result<bool> {
        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(question)
            .wait_for_newline(true)
            .interact()
            .context("reading confirmation")
    }

    fn input(&self, question: &str) -> Result<String> {
        Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt(question)
            .allow_empty(true)
            .interact_text()
            .context("reading input")
    }

    fn select(&self, question: &str, items: &[String]) -> Result<Option<usize>> {
        Select::with_theme(&ColorfulTheme::default())
            .with_prompt(question)
            .items(items)
            .default(0)
            .interact_opt()
            .context("reading selection")
    }
}
