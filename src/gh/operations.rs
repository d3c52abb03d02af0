//! GitHub CLI operations
//!
//! Wrappers for gh commands with proper error handling, JSON output
//! parsing, and a bounded retry for endpoints that lag behind writes.

use std::process::Stdio;
use std::time::Duration;

use serde::Deserialize;
use tokio::process::Command;

use crate::context::RepoContext;
use crate::errors::{AutoprError, Result};

/// Attempts made by [`retry_command`] before giving up
const RETRY_ATTEMPTS: u32 = 5;

/// Delay before the first retry; doubles on each subsequent one
const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

/// Execute a gh command and return trimmed stdout.
///
/// The context's token override, if any, is exported as `GH_TOKEN` for
/// this invocation only. Fails with [`AutoprError::Gh`] on a non-zero
/// exit, carrying stderr.
pub async fn run_gh_command(ctx: &RepoContext, args: &[&str]) -> Result<String> {
    let mut cmd = Command::new("gh");
    cmd.args(args)
        .current_dir(&ctx.cwd)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(token) = &ctx.token {
        cmd.env("GH_TOKEN", token);
    }

    let output = cmd
        .output()
        .await
        .map_err(|e| AutoprError::Gh(format!("Failed to execute gh: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AutoprError::Gh(format!(
            "gh {} failed: {}",
            args.join(" "),
            stderr
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Check that the gh binary is installed and runnable.
pub async fn verify_binary() -> Result<()> {
    let status = Command::new("gh")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    match status {
        Ok(status) if status.success() => Ok(()),
        _ => Err(AutoprError::MissingBinary("gh".to_string())),
    }
}

/// Execute a gh command, retrying with exponential backoff.
///
/// New pull requests take a moment to propagate to gh's read endpoints;
/// this keeps asking until the command succeeds or attempts run out.
pub async fn retry_command(ctx: &RepoContext, args: &[&str]) -> Result<String> {
    let mut last = String::new();
    for attempt in 1..=RETRY_ATTEMPTS {
        match run_gh_command(ctx, args).await {
            Ok(output) => return Ok(output),
            Err(err) => {
                last = err.to_string();
                if attempt < RETRY_ATTEMPTS {
                    let delay = backoff_delay(attempt);
                    tracing::debug!(
                        "gh {} failed on attempt {}, retrying in {:?}",
                        args.join(" "),
                        attempt,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
    Err(AutoprError::RetriesExhausted {
        attempts: RETRY_ATTEMPTS,
        last,
    })
}

/// Delay before the retry following failed attempt `attempt` (1-based):
/// `base * 2^(attempt - 1)`.
fn backoff_delay(attempt: u32) -> Duration {
    RETRY_BASE_DELAY * 2u32.pow(attempt.saturating_sub(1))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepoView {
    name_with_owner: String,
}

/// Get the `owner/name` identifier of the repository in the context's
/// working directory.
pub async fn repo_full_name(ctx: &RepoContext) -> Result<String> {
    let output = run_gh_command(ctx, &["repo", "view", "--json", "nameWithOwner"]).await?;
    let view: RepoView = serde_json::from_str(&output)
        .map_err(|e| AutoprError::Gh(format!("Unexpected repo view output: {}", e)))?;
    Ok(view.name_with_owner)
}

/// Get the token gh is currently authenticated with
pub async fn current_token(ctx: &RepoContext) -> Result<String> {
    run_gh_command(ctx, &["auth", "token"]).await
}

/// Open a pull request and return gh's raw creation output.
///
/// The last non-empty line of the output ends with the new PR's URL.
pub async fn create_pr(ctx: &RepoContext, repo: &str, title: &str, body: &str) -> Result<String> {
    run_gh_command(
        ctx,
        &["pr", "create", "--repo", repo, "--title", title, "--body", body],
    )
    .await
}

/// Wait until a newly created PR is visible to gh's read endpoints.
pub async fn confirm_pr_visible(ctx: &RepoContext, repo: &str, number: u64) -> Result<()> {
    retry_command(
        ctx,
        &["pr", "view", &number.to_string(), "--repo", repo, "--json", "number"],
    )
    .await?;
    Ok(())
}

/// Add labels to a pull request
pub async fn add_labels(ctx: &RepoContext, repo: &str, number: u64, labels: &[String]) -> Result<()> {
    run_gh_command(
        ctx,
        &[
            "issue",
            "edit",
            &number.to_string(),
            "--repo",
            repo,
            "--add-label",
            &labels.join(","),
        ],
    )
    .await?;
    Ok(())
}

/// Submit an approving review on a pull request
pub async fn approve_pr(ctx: &RepoContext, repo: &str, number: u64, body: &str) -> Result<()> {
    run_gh_command(
        ctx,
        &[
            "pr",
            "review",
            &number.to_string(),
            "--repo",
            repo,
            "--approve",
            "--body",
            body,
        ],
    )
    .await?;
    Ok(())
}
