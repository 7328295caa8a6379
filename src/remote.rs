// src/remote.rs

use crate::error::{Error, Result};
use std::fmt;
use url::Url;

pub const DEFAULT_HOST: &str = "github.com";

/// A validated hosting-service repository URL.
///
/// The URL never carries credentials; those are handed to git through a
/// [`CredentialProvider`](crate::credentials::CredentialProvider).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoUrl {
    url: Url,
    name: String,
}

impl RepoUrl {
    pub fn parse(input: &str, host: &str) -> Result<Self> {
        let invalid = |reason| Error::InvalidUrl {
            url: input.to_string(),
            reason,
        };

        let url = Url::parse(input.trim()).map_err(|_| invalid("not a URL"))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if !url.host_str().is_some_and(|h| h.contains(host)) {
            return Err(invalid("host is not the expected hosting service"));
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(invalid("credentials must not be embedded in the URL"));
        }
        if url.path().trim_matches('/').split('/').count() < 2 {
            return Err(invalid("path must name an owner and a repository"));
        }

        let name = repo_name(url.path()).ok_or_else(|| invalid("missing repository name"))?;
        Ok(Self { url, name })
    }

    pub fn is_valid(input: &str, host: &str) -> bool {
        Self::parse(input, host).is_ok()
    }

    /// Directory-friendly repository name, e.g. `widgets`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl fmt::Display for RepoUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// Final path segment with any trailing `/` and `.git` removed.
pub fn repo_name(url_or_path: &str) -> Option<String> {
    let path = match Url::parse(url_or_path) {
        Ok(url) => url.path().to_string(),
        Err(_) => url_or_path.to_string(),
    };
    let trimmed = path.trim_end_matches('/');
    let last = trimmed.rsplit('/').next()?;
    let name = last.strip_suffix(".git").unwrap_or(last);
    (!name.is_empty()).then(|| name.to_string())
}
