// src/config.rs

use crate::cli::{AuthMethod, SourceArgs};
use crate::credentials::{CredentialSource, Secret};
use crate::error::Result;
use crate::model::TimestampSource;
use crate::prompt::{self, Prompt};
use crate::remote::RepoUrl;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Everything a run needs, gathered up front so the pipeline never prompts.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub url: RepoUrl,
    pub credentials: CredentialSource,
    pub branch: Option<String>,
    pub workdir: PathBuf,
    pub offline: bool,
    pub date: TimestampSource,
}

impl RunConfig {
    /// Fills gaps in `source` by asking through `prompt`. A URL given on the
    /// command line is validated once; a prompted one is asked for until valid.
    pub fn from_args(source: &SourceArgs, workdir: &Path, prompt: &mut dyn Prompt) -> Result<Self> {
        let token = std::env::var(&source.token_env).ok().filter(|t| !t.trim().is_empty());
        Self::resolve(source, workdir, token, prompt)
    }

    fn resolve(
        source: &SourceArgs,
        workdir: &Path,
        env_token: Option<String>,
        prompt: &mut dyn Prompt,
    ) -> Result<Self> {
        let url = match &source.url {
            Some(url) => RepoUrl::parse(url, &source.host)?,
            None => prompt::collect_url(prompt, &source.host)?,
        };

        let credentials = if source.offline {
            CredentialSource::Anonymous
        } else {
            resolve_credentials(source, env_token, prompt)?
        };
        debug!("run configured for {url} with {credentials:?}");

        Ok(Self {
            url,
            credentials,
            branch: source.branch.clone(),
            workdir: workdir.to_path_buf(),
            offline: source.offline,
            date: source.date,
        })
    }

    /// `<workdir>/repositories/<name>`
    pub fn checkout_path(&self) -> PathBuf {
        self.workdir.join("repositories").join(self.url.name())
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.workdir.join("reports")
    }
}

fn resolve_credentials(
    source: &SourceArgs,
    env_token: Option<String>,
    prompt: &mut dyn Prompt,
) -> Result<CredentialSource> {
    match (source.auth, env_token) {
        (Some(AuthMethod::Anonymous), _) => Ok(CredentialSource::Anonymous),
        (Some(AuthMethod::Token) | None, Some(token)) => {
            Ok(CredentialSource::Token(Secret::new(token.trim())))
        }
        (Some(AuthMethod::Token), None) => prompt::collect_token(prompt),
        (Some(AuthMethod::Password), _) => {
            prompt::collect_user_password(prompt, source.username.as_deref())
        }
        (None, None) => prompt::collect_credentials(prompt),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use crate::error::Error;
    use crate::prompt::tests::ScriptedPrompt;
    use clap::Parser;

    const URL: &str = "https://github.com/acme/widgets";

    fn source(flags: &[&str]) -> SourceArgs {
        let argv = ["commit-report", "sync"].iter().chain(flags.iter()).copied();
        match Args::parse_from(argv).command {
            crate::cli::Command::Sync { source } => source,
            _ => unreachable!(),
        }
    }

    #[test]
    fn flags_alone_need_no_prompt() {
        let args = source(&["--url", URL, "--auth", "none", "-b", "dev"]);
        let mut prompt = ScriptedPrompt::new(&[]);
        let config = RunConfig::resolve(&args, Path::new("/w"), None, &mut prompt).unwrap();

        assert_eq!(config.credentials, CredentialSource::Anonymous);
        assert_eq!(config.branch.as_deref(), Some("dev"));
        assert_eq!(config.checkout_path(), Path::new("/w/repositories/widgets"));
        assert_eq!(config.reports_dir(), Path::new("/w/reports"));
        assert!(prompt.shown.is_empty());
    }

    #[test]
    fn invalid_flag_url_is_not_reprompted() {
        let args = source(&["--url", "https://example.com/acme/widgets"]);
        let mut prompt = ScriptedPrompt::new(&["https://github.com/acme/widgets"]);
        let result = RunConfig::resolve(&args, Path::new("."), None, &mut prompt);
        assert!(matches!(result, Err(Error::InvalidUrl { .. })));
    }

    #[test]
    fn environment_token_skips_the_menu() {
        let args = source(&["--url", URL]);
        let mut prompt = ScriptedPrompt::new(&[]);
        let token = Some("ghp_env".to_string());
        let config = RunConfig::resolve(&args, Path::new("."), token, &mut prompt).unwrap();
        assert_eq!(config.credentials, CredentialSource::Token(Secret::new("ghp_env")));
    }

    #[test]
    fn password_auth_uses_the_username_flag() {
        let args = source(&["--url", URL, "--auth", "password", "--username", "ada"]);
        let mut prompt = ScriptedPrompt::new(&["hunter2"]);
        let token = Some("ignored".to_string());
        let config = RunConfig::resolve(&args, Path::new("."), token, &mut prompt).unwrap();
        assert_eq!(
            config.credentials,
            CredentialSource::UserPassword {
                username: "ada".into(),
                password: Secret::new("hunter2"),
            }
        );
        assert_eq!(prompt.secret_questions, 1);
    }

    #[test]
    fn prompts_for_everything_that_is_missing() {
        let args = source(&[]);
        let mut prompt = ScriptedPrompt::new(&["https://github.com/acme", URL, "1", "ghp_typed"]);
        let config = RunConfig::resolve(&args, Path::new("."), None, &mut prompt).unwrap();
        assert_eq!(config.url.name(), "widgets");
        assert_eq!(config.credentials, CredentialSource::Token(Secret::new("ghp_typed")));
    }

    #[test]
    fn offline_runs_collect_no_credentials() {
        let args = source(&["--url", URL, "--offline"]);
        let mut prompt = ScriptedPrompt::new(&[]);
        let config = RunConfig::resolve(&args, Path::new("."), None, &mut prompt).unwrap();
        assert!(config.offline);
        assert_eq!(config.credentials, CredentialSource::Anonymous);
    }
}
