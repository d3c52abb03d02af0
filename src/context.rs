//! Execution context shared by the git and gh command wrappers

use std::path::PathBuf;

/// Context for spawning git and gh commands.
///
/// Carries the working directory every command runs in, plus an optional
/// token override applied to gh invocations. Deriving a new context with
/// [`RepoContext::with_token`] scopes a credential substitution to the
/// lifetime of the derived value.
#[derive(Debug, Clone)]
pub struct RepoContext {
    /// Working directory for spawned commands
    pub cwd: PathBuf,

    /// If set, exported as `GH_TOKEN` to gh invocations
    pub token: Option<String>,
}

impl RepoContext {
    /// Create a context rooted at the given working directory.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        RepoContext {
            cwd: cwd.into(),
            token: None,
        }
    }

    /// Derive a context whose gh invocations authenticate with `token`.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        RepoContext {
            cwd: self.cwd.clone(),
            token: Some(token.into()),
        }
    }
}
