// src/error.rs

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Variants wrapping another error name the failing layer only; the wrapped
/// message is the `source` and shows up when the chain is printed.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid repository URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: &'static str },
    #[error("git error")]
    Git(#[from] git2::Error),
    #[error("branch or revision `{0}` not found")]
    BranchNotFound(String),
    #[error("branch `{0}` has diverged from origin; a merge is required")]
    Diverged(String),
    #[error("HEAD is detached; there is no branch to update")]
    DetachedHead,
    #[error("input closed before a value was provided")]
    InputClosed,
    #[error("I/O error")]
    Io(#[from] std::io::Error),
    #[error("image error")]
    Image(#[from] image::ImageError),
    #[error("formatting error")]
    Fmt(#[from] std::fmt::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_messages_appear_once_in_the_chain() {
        let err: anyhow::Error = Error::from(git2::Error::from_str("reference not found")).into();
        let shown = format!("{err:#}");
        assert_eq!(shown, "git error: reference not found");
        assert_eq!(shown.matches("reference not found").count(), 1);
    }
}
