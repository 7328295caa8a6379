// src/prompt.rs

use crate::credentials::{CredentialSource, Secret};
use crate::error::{Error, Result};
use crate::remote::RepoUrl;
use console::Term;
use std::io::{self, BufRead};

/// Line-oriented interaction with whoever runs the tool.
pub trait Prompt {
    fn say(&mut self, line: &str) -> Result<()>;
    /// `None` once input is exhausted.
    fn ask(&mut self, question: &str) -> Result<Option<String>>;
    /// Like [`Prompt::ask`] but without echoing what is typed.
    fn ask_secret(&mut self, question: &str) -> Result<Option<String>>;
}

pub struct TermPrompt {
    term: Term,
}

impl TermPrompt {
    pub fn new() -> Self {
        Self { term: Term::stdout() }
    }
}

impl Default for TermPrompt {
    fn default() -> Self {
        Self::new()
    }
}

fn read_stdin_line() -> io::Result<Option<String>> {
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

impl Prompt for TermPrompt {
    fn say(&mut self, line: &str) -> Result<()> {
        Ok(self.term.write_line(line)?)
    }

    fn ask(&mut self, question: &str) -> Result<Option<String>> {
        self.term.write_str(question)?;
        self.term.flush()?;
        Ok(read_stdin_line()?)
    }

    fn ask_secret(&mut self, question: &str) -> Result<Option<String>> {
        self.term.write_str(question)?;
        self.term.flush()?;
        if self.term.is_term() {
            Ok(Some(self.term.read_secure_line()?))
        } else {
            Ok(read_stdin_line()?)
        }
    }
}

/// Asks for a repository URL until a valid one arrives. There is no attempt
/// limit; only the end of input stops the loop.
pub fn collect_url(prompt: &mut dyn Prompt, host: &str) -> Result<RepoUrl> {
    loop {
        let answer = prompt
            .ask(&format!("Repository URL (https://{host}/owner/name): "))?
            .ok_or(Error::InputClosed)?;
        match RepoUrl::parse(answer.trim(), host) {
            Ok(url) => return Ok(url),
            Err(e) => prompt.say(&format!("{e}. Example: https://{host}/owner/repository"))?,
        }
    }
}

pub fn collect_token(prompt: &mut dyn Prompt) -> Result<CredentialSource> {
    let token = prompt
        .ask_secret("Personal access token: ")?
        .ok_or(Error::InputClosed)?;
    Ok(CredentialSource::Token(Secret::new(token.trim())))
}

pub fn collect_user_password(
    prompt: &mut dyn Prompt,
    username: Option<&str>,
) -> Result<CredentialSource> {
    let username = match username {
        Some(name) => name.to_string(),
        None => prompt
            .ask("Username: ")?
            .ok_or(Error::InputClosed)?
            .trim()
            .to_string(),
    };
    let password = prompt.ask_secret("Password: ")?.ok_or(Error::InputClosed)?;
    Ok(CredentialSource::UserPassword {
        username,
        password: Secret::new(password),
    })
}

/// Authentication menu; invalid choices are asked again.
pub fn collect_credentials(prompt: &mut dyn Prompt) -> Result<CredentialSource> {
    prompt.say("")?;
    prompt.say("Choose an authentication method:")?;
    prompt.say("1. Personal access token (recommended)")?;
    prompt.say("2. Username and password")?;
    prompt.say("3. None (public repository)")?;

    loop {
        let choice = prompt.ask("Choice (1, 2 or 3): ")?.ok_or(Error::InputClosed)?;
        match choice.trim() {
            "1" => return collect_token(prompt),
            "2" => return collect_user_password(prompt, None),
            "3" => return Ok(CredentialSource::Anonymous),
            _ => prompt.say("Invalid choice, please enter 1, 2 or 3.")?,
        }
    }
}
