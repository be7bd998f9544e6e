// UI layer: everything that talks to the person at the terminal.
//
// Prompts go to stderr (dialoguer's default target here) so that stdout
// only carries command results and can be piped.

use crate::authz::Credential;
use crate::commands::Outcome;
use crate::error::AuthError;
use crossterm::style::Stylize;
use dialoguer::console::Term;
use dialoguer::{Input, Password};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;

/// Minimal capability the credential prompt needs from a terminal.
///
/// `line` echoes what is typed, `secret` does not. Implementations return
/// whatever was entered, including an empty string; the retry policy lives
/// in [`CredentialPrompt`].
pub trait Terminal {
    fn line(&mut self, label: &str) -> io::Result<String>;
    fn secret(&mut self, label: &str) -> io::Result<String>;
}

/// `Terminal` backed by `dialoguer`, rendering on stderr.
pub struct DialoguerTerminal {
    term: Term,
}

impl DialoguerTerminal {
    pub fn new() -> Self {
        DialoguerTerminal { term: Term::stderr() }
    }
}

impl Default for DialoguerTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal for DialoguerTerminal {
    fn line(&mut self, label: &str) -> io::Result<String> {
        Input::<String>::new()
            .with_prompt(label)
            .allow_empty(true)
            .interact_text_on(&self.term)
    }

    fn secret(&mut self, label: &str) -> io::Result<String> {
        // `Password` hides input in terminal for passwords.
        Password::new()
            .with_prompt(label)
            .allow_empty_password(true)
            .interact_on(&self.term)
    }
}

/// Reads an OreCast login and password, asking again until each one is
/// non-empty. There is no attempt limit.
pub struct CredentialPrompt<'a> {
    term: &'a mut dyn Terminal,
}

impl<'a> CredentialPrompt<'a> {
    pub fn new(term: &'a mut dyn Terminal) -> Self {
        CredentialPrompt { term }
    }

    pub fn read_login(&mut self) -> io::Result<String> {
        loop {
            let login = self.term.line("OreCast username")?;
            let login = login.trim();
            if !login.is_empty() {
                return Ok(login.to_string());
            }
        }
    }

    pub fn read_secret(&mut self) -> io::Result<String> {
        loop {
            let password = self.term.secret("OreCast password")?;
            if !password.is_empty() {
                return Ok(password);
            }
        }
    }

    pub fn read_credential(&mut self) -> Result<Credential, AuthError> {
        let login = self.read_login()?;
        let password = self.read_secret()?;
        Ok(Credential { login, password })
    }
}

/// Print the result of a mutating call: success on "ok", a warning otherwise.
pub fn report(outcome: &Outcome) {
    println!("{}", outcome_line(outcome, Term::stdout().is_term()));
}

/// Text of a reported outcome; the warning label is colored only when
/// stdout is a terminal.
pub fn outcome_line(outcome: &Outcome, color: bool) -> String {
    match outcome {
        Outcome::Success(msg) => format!("INFO: {}", msg),
        Outcome::Warning(msg) if color => format!("{} {}", "WARNING:".yellow(), msg),
        Outcome::Warning(msg) => format!("WARNING: {}", msg),
    }
}

/// Print a fatal error in the `ERROR <message>` form every command uses.
pub fn report_error(err: &anyhow::Error) {
    println!("{}", error_line(err));
}

pub fn error_line(err: &anyhow::Error) -> String {
    format!("ERROR {:#}", err)
}

/// Progress bar over a number of files being uploaded. Drawn on stderr.
pub fn upload_progress(files: u64) -> ProgressBar {
    let pb = ProgressBar::new(files);
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}") {
        pb.set_style(style.progress_chars("=> "));
    }
    pb
}
