//! The capture state machine
//!
//! One `capture` call wraps a unit of work with branch lifecycle
//! management: preflight validation, branch creation, work execution with
//! abort signaling, outcome classification, commit/push/PR creation when
//! changes exist, post-creation labeling and approval, and restoration of
//! the branch the repository started on.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{Local, Utc};
use rand::Rng;

use crate::context::RepoContext;
use crate::errors::{AutoprError, Result};
use crate::{gh, git};

use super::options::CaptureOptions;
use super::outcome::Outcome;

/// Signal a work block returns to abandon the capture.
///
/// An abort is an expected control outcome, not a failure: it is consumed
/// by the `capture` frame that invoked the work and never escapes it.
/// Helpers nested inside the work propagate it with `?` without inspecting
/// it, and its type keeps it distinct from [`AutoprError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Abort;

/// What a work block hands back to `capture`. `Err(Abort)` abandons the
/// capture; `Ok(())` lets classification proceed.
pub type WorkResult = std::result::Result<(), Abort>;

/// A single-use guard around one automation run's pull-request capture.
///
/// Holds the execution context and the in-flight flag that rejects
/// re-entrant captures. Construct one per logical automation run.
pub struct CaptureSession {
    ctx: RepoContext,
    capturing: AtomicBool,
}

impl CaptureSession {
    /// Create a session operating on the repository in `ctx.cwd`.
    pub fn new(ctx: RepoContext) -> Self {
        CaptureSession {
            ctx,
            capturing: AtomicBool::new(false),
        }
    }

    /// Run `work` under branch isolation and propose whatever it changed
    /// as a pull request.
    ///
    /// The work runs on a freshly created branch. Afterwards the outcome
    /// is classified: an abort request wins, an untouched tree means
    /// nothing to propose, and any remaining diff is committed, pushed,
    /// and opened as a PR whose number is returned in
    /// [`Outcome::Created`]. The original branch is restored and the
    /// temporary branch deleted before this returns, including on the
    /// fatal-error paths after branch creation.
    ///
    /// Re-entering while a capture is in flight is a usage error, not an
    /// outcome.
    pub async fn capture<W, F>(&self, options: CaptureOptions, work: W) -> Result<Outcome>
    where
        W: FnOnce() -> F,
        F: Future<Output = WorkResult>,
    {
        if !options.enabled {
            tracing::info!("Pull request generation disabled");
            if work().await.is_err() {
                tracing::debug!("Abort requested while generation was disabled");
            }
            return Ok(Outcome::Disabled);
        }
        if self.capturing.load(Ordering::SeqCst) {
            return Err(AutoprError::CaptureInProgress);
        }

        let branch_name = options
            .branch_name
            .clone()
            .unwrap_or_else(default_branch_name);
        let saved_branch = self.start_capture(&branch_name).await?;

        self.capturing.store(true, Ordering::SeqCst);
        let aborted = work().await.is_err();
        self.capturing.store(false, Ordering::SeqCst);

        match self.resolve_outcome(aborted, &branch_name, &options).await {
            Ok(outcome) => {
                self.finish_capture(outcome, &branch_name, &saved_branch).await?;
                Ok(outcome)
            }
            Err(err) => {
                self.restore_best_effort(&branch_name, &saved_branch).await;
                Err(err)
            }
        }
    }

    /// Validate the starting state and move onto the capture branch.
    /// Returns the branch the repository was on.
    async fn start_capture(&self, branch_name: &str) -> Result<String> {
        tracing::info!("Capturing changes for pull request");
        git::verify_binary().await?;
        if !git::is_clean(&self.ctx).await? {
            return Err(AutoprError::DirtyWorktree);
        }
        let saved_branch = git::current_branch(&self.ctx).await?;
        git::create_branch(&self.ctx, branch_name).await?;
        Ok(saved_branch)
    }

    /// Classify what the work left behind, creating and updating the pull
    /// request when there are changes to propose.
    async fn resolve_outcome(
        &self,
        aborted: bool,
        branch_name: &str,
        options: &CaptureOptions,
    ) -> Result<Outcome> {
        if aborted {
            return Ok(Outcome::Aborted);
        }
        if git::is_clean(&self.ctx).await? {
            return Ok(Outcome::Unchanged);
        }
        let number = self.create_pr(branch_name, options).await?;
        self.update_pr(number, options).await?;
        Ok(Outcome::Created(number))
    }

    /// Commit the work's changes, push the branch, and open the pull
    /// request. Returns the new PR's number.
    async fn create_pr(&self, branch_name: &str, options: &CaptureOptions) -> Result<u64> {
        // Probe gh before the first mutation so a missing binary fails
        // the capture with history untouched.
        gh::verify_binary().await?;

        let commit_message = options
            .commit_message
            .clone()
            .unwrap_or_else(default_commit_message);
        let pr_body = options.pr_body.clone().unwrap_or_else(default_pr_body);

        git::add_all(&self.ctx).await?;
        git::commit(&self.ctx, &commit_message).await?;
        git::push(&self.ctx, &options.remote, branch_name).await?;

        let repo = gh::repo_full_name(&self.ctx).await?;
        let output = gh::create_pr(&self.ctx, &repo, &commit_message, &pr_body).await?;
        tracing::info!("{}", output);
        let number = parse_pr_number(&output)?;

        // New PRs take a while to propagate to the read endpoints.
        gh::confirm_pr_visible(&self.ctx, &repo, number).await?;
        tokio::time::sleep(options.extra_propagation_wait).await;
        Ok(number)
    }

    /// Apply labels and auto-approval to a created pull request, under
    /// the approval token when one was supplied.
    async fn update_pr(&self, number: u64, options: &CaptureOptions) -> Result<()> {
        let approval_body = options.auto_approve.body();
        if options.labels.is_empty() && approval_body.is_none() {
            return Ok(());
        }

        let repo = gh::repo_full_name(&self.ctx).await?;
        let token = match &options.approval_token {
            Some(token) => token.clone(),
            None => gh::current_token(&self.ctx).await?,
        };
        let ctx = self.ctx.with_token(token);

        if !options.labels.is_empty() {
            gh::add_labels(&ctx, &repo, number, &options.labels).await?;
        }
        if let Some(body) = approval_body {
            gh::approve_pr(&ctx, &repo, number, body).await?;
        }
        Ok(())
    }

    /// Restore the saved branch, drop the temporary one, and log the
    /// outcome.
    async fn finish_capture(
        &self,
        outcome: Outcome,
        branch_name: &str,
        saved_branch: &str,
    ) -> Result<()> {
        git::switch_branch(&self.ctx, saved_branch).await?;
        git::delete_branch(&self.ctx, branch_name).await?;
        if outcome != Outcome::Unchanged {
            git::clean_untracked(&self.ctx).await?;
        }
        match outcome {
            Outcome::Aborted => tracing::info!("Pull request aborted"),
            Outcome::Unchanged => tracing::info!("No files changed; no pull request created"),
            Outcome::Created(number) => {
                tracing::info!("Finished capture and opened pull request {}", number)
            }
            // The disabled path returns before a branch exists.
            Outcome::Disabled => {}
        }
        Ok(())
    }

    /// Put the repository back after a fatal mid-capture failure. Each
    /// step is independent; failures are logged and skipped so the
    /// original error stays the one the caller sees.
    async fn restore_best_effort(&self, branch_name: &str, saved_branch: &str) {
        if let Err(err) = git::switch_branch(&self.ctx, saved_branch).await {
            tracing::warn!("Could not switch back to {}: {}", saved_branch, err);
        }
        if let Err(err) = git::delete_branch(&self.ctx, branch_name).await {
            tracing::warn!("Could not delete {}: {}", branch_name, err);
        }
        if let Err(err) = git::clean_untracked(&self.ctx).await {
            tracing::warn!("Could not clean untracked files: {}", err);
        }
    }
}

/// Generate a branch name unlikely to collide without coordination:
/// `autopr/<UTC timestamp>-<random 0..9999>`.
fn default_branch_name() -> String {
    let now = Utc::now().format("%Y%m%d-%H%M%S");
    let ran: u32 = rand::thread_rng().gen_range(0..10_000);
    format!("autopr/{}-{}", now, ran)
}

fn default_commit_message() -> String {
    "[CHANGE ME] Automated pull request".to_string()
}

fn default_pr_body() -> String {
    format!(
        "Auto-created at {} using the autopr pull request generator.",
        Local::now().format("%Y-%m-%d %H:%M:%S %z")
    )
}

/// The PR number is the last `/`-delimited segment of the last non-empty
/// line of gh's creation output (the PR URL).
fn parse_pr_number(output: &str) -> Result<u64> {
    output
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .and_then(|line| line.trim().rsplit('/').next())
        .and_then(|segment| segment.parse::<u64>().ok())
        .ok_or_else(|| AutoprError::PrNumber(output.to_string()))
}
