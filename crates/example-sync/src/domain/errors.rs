//! Domain-specific errors.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Resolver rule that produced more than one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmbiguousRule {
    Slice,
    Substring,
}

/// File operation that failed, used to label I/O errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoAction {
    Read,
    Write,
    List,
}

impl fmt::Display for IoAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IoAction::Read => "read",
            IoAction::Write => "write",
            IoAction::List => "list",
        })
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("no example found for '{token}'")]
    NotFound { token: String },

    #[error("{}", ambiguous_message(.token, .rule, .matches))]
    Ambiguous {
        token: String,
        rule: AmbiguousRule,
        matches: Vec<String>,
    },

    #[error("invalid document extension '{extension}'")]
    InvalidExtension {
        extension: String,
        #[source]
        source: globset::Error,
    },

    #[error("no {language} code block found in {}", .path.display())]
    MissingCodeBlock { language: String, path: PathBuf },

    #[error("failed to {action} {}", .path.display())]
    Io {
        action: IoAction,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SyncError {
    pub(crate) fn io(action: IoAction, path: impl Into<PathBuf>, source: io::Error) -> Self {
        SyncError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

fn ambiguous_message(token: &str, rule: &AmbiguousRule, matches: &[String]) -> String {
    let names = matches.join(", ");
    match rule {
        AmbiguousRule::Slice => format!("multiple examples match slice {token}: {names}"),
        AmbiguousRule::Substring => format!("multiple examples match '{token}': {names}"),
    }
}
