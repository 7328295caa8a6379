// src/credentials.rs

use git2::{Cred, CredentialType, RemoteCallbacks};
use indicatif::ProgressBar;
use std::cell::Cell;
use std::fmt;
use tracing::{debug, warn};

/// Username GitHub expects alongside a personal access token.
const TOKEN_USER: &str = "x-access-token";

/// A secret string whose `Debug` output never shows the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Supplies credentials to git on demand.
pub trait CredentialProvider {
    fn credentials(
        &self,
        url: &str,
        username_from_url: Option<&str>,
        allowed: CredentialType,
    ) -> Result<Cred, git2::Error>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Anonymous,
    Token(Secret),
    UserPassword { username: String, password: Secret },
}

impl CredentialProvider for CredentialSource {
    fn credentials(
        &self,
        url: &str,
        _username_from_url: Option<&str>,
        allowed: CredentialType,
    ) -> Result<Cred, git2::Error> {
        if !allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
            return Err(git2::Error::from_str(&format!(
                "{url} asked for an unsupported credential type ({allowed:?})"
            )));
        }
        match self {
            CredentialSource::Anonymous => Err(git2::Error::from_str(&format!(
                "{url} requires authentication but none was configured"
            ))),
            CredentialSource::Token(token) => Cred::userpass_plaintext(TOKEN_USER, token.expose()),
            CredentialSource::UserPassword { username, password } => {
                Cred::userpass_plaintext(username, password.expose())
            }
        }
    }
}

/// Answers only the first credential request and refuses the rest.
///
/// libgit2 keeps calling the credential callback while the server rejects
/// what it gets, so a wrong token would otherwise loop.
pub struct SingleAttempt<'a, P: ?Sized> {
    inner: &'a P,
    attempts: Cell<u32>,
}

impl<'a, P: CredentialProvider + ?Sized> SingleAttempt<'a, P> {
    pub fn new(inner: &'a P) -> Self {
        Self {
            inner,
            attempts: Cell::new(0),
        }
    }
}

impl<P: CredentialProvider + ?Sized> CredentialProvider for SingleAttempt<'_, P> {
    fn credentials(
        &self,
        url: &str,
        username_from_url: Option<&str>,
        allowed: CredentialType,
    ) -> Result<Cred, git2::Error> {
        let attempt = self.attempts.get() + 1;
        self.attempts.set(attempt);
        if attempt > 1 {
            warn!("credentials for {url} were rejected");
            return Err(git2::Error::from_str("authentication failed"));
        }
        debug!("supplying credentials for {url}");
        self.inner.credentials(url, username_from_url, allowed)
    }
}

/// Callbacks wiring a provider and a transfer progress bar into libgit2.
pub fn remote_callbacks<'a>(
    provider: &'a dyn CredentialProvider,
    bar: &'a ProgressBar,
) -> RemoteCallbacks<'a> {
    let mut callbacks = RemoteCallbacks::new();
    let guard = SingleAttempt::new(provider);

    callbacks.credentials(move |url, username_from_url, allowed| {
        guard.credentials(url, username_from_url, allowed)
    });

    callbacks.transfer_progress(move |stats| {
        bar.set_length(stats.total_objects() as u64);
        bar.set_position(stats.received_objects() as u64);
        true
    });

    callbacks
}
