//! End-to-end capture scenarios.
//!
//! Runs the full Created path against a real throwaway git repository, a
//! local bare repository standing in for the push remote, and a stub gh
//! executable placed first on PATH. The stub answers the handful of gh
//! commands the workflow issues and records every invocation (with the
//! token it was handed) so the hosting side effects can be asserted.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::time::Duration;

use tempfile::TempDir;

use autopr::git::run_git_command;
use autopr::{AutoApprove, CaptureOptions, CaptureSession, Outcome, RepoContext};

const GH_STUB: &str = r#"#!/bin/sh
echo "$GH_TOKEN|$*" >> "$AUTOPR_STUB_LOG"
case "$1" in
  --version) echo "gh version 2.62.0"; exit 0 ;;
esac
case "$1 $2" in
  "repo view") echo '{"nameWithOwner":"acme/widgets"}' ;;
  "auth token") echo "gho_stubtoken" ;;
  "pr create")
    echo "Creating pull request in acme/widgets"
    echo "https://github.com/acme/widgets/pull/1347"
    ;;
  "pr view") echo '{"number":1347}' ;;
  "issue edit") : ;;
  "pr review") : ;;
  *) echo "unexpected gh invocation: $*" >&2; exit 1 ;;
esac
"#;

async fn setup_git_repo() -> TempDir {
    let temp = TempDir::new().unwrap();
    let ctx = RepoContext::new(temp.path());

    run_git_command(&ctx, &["init", "--initial-branch=main"])
        .await
        .unwrap();
    run_git_command(&ctx, &["config", "user.email", "test@test.com"])
        .await
        .unwrap();
    run_git_command(&ctx, &["config", "user.name", "Test"])
        .await
        .unwrap();

    std::fs::write(temp.path().join("README.md"), "# Test").unwrap();
    run_git_command(&ctx, &["add", "."]).await.unwrap();
    run_git_command(&ctx, &["commit", "-m", "Initial commit"])
        .await
        .unwrap();

    temp
}

fn install_gh_stub(dir: &TempDir, log_path: &std::path::Path) {
    let stub_path = dir.path().join("gh");
    std::fs::write(&stub_path, GH_STUB).unwrap();
    std::fs::set_permissions(&stub_path, std::fs::Permissions::from_mode(0o755)).unwrap();

    let old_path = std::env::var("PATH").unwrap_or_default();
    std::env::set_var("PATH", format!("{}:{}", dir.path().display(), old_path));
    std::env::set_var("AUTOPR_STUB_LOG", log_path);
}

#[tokio::test]
async fn test_capture_opens_labels_and_approves_pr() {
    let stub_dir = TempDir::new().unwrap();
    let log_path = stub_dir.path().join("gh-calls.log");
    install_gh_stub(&stub_dir, &log_path);

    let temp = setup_git_repo().await;
    let ctx = RepoContext::new(temp.path());

    let remote_dir = TempDir::new().unwrap();
    let remote_ctx = RepoContext::new(remote_dir.path());
    run_git_command(&remote_ctx, &["init", "--bare"]).await.unwrap();
    run_git_command(
        &ctx,
        &["remote", "add", "origin", remote_dir.path().to_str().unwrap()],
    )
    .await
    .unwrap();

    let session = CaptureSession::new(ctx.clone());
    let options = CaptureOptions {
        branch_name: Some("fix-1".to_string()),
        commit_message: Some("fix".to_string()),
        labels: vec!["automated".to_string()],
        auto_approve: AutoApprove::Approve,
        extra_propagation_wait: Duration::ZERO,
        ..CaptureOptions::default()
    };

    let work_dir = temp.path().to_path_buf();
    let outcome = session
        .capture(options, move || async move {
            std::fs::write(work_dir.join("generated.txt"), "fresh output").unwrap();
            Ok(())
        })
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Created(1347));
    assert_eq!(outcome.pr_number(), Some(1347));

    // Local state is restored: original branch active, capture branch
    // gone, nothing left in the tree.
    let branch = run_git_command(&ctx, &["rev-parse", "--abbrev-ref", "HEAD"])
        .await
        .unwrap();
    assert_eq!(branch, "main");
    assert!(
        run_git_command(&ctx, &["rev-parse", "--verify", "refs/heads/fix-1"])
            .await
            .is_err()
    );
    assert!(run_git_command(&ctx, &["status", "--porcelain"])
        .await
        .unwrap()
        .is_empty());

    // The commit made it to the remote under the capture branch.
    let pushed_subject = run_git_command(&remote_ctx, &["log", "-1", "--format=%s", "fix-1"])
        .await
        .unwrap();
    assert_eq!(pushed_subject, "fix");

    let log = std::fs::read_to_string(&log_path).unwrap();
    assert!(log.contains("|repo view --json nameWithOwner"));
    assert!(log.contains("|pr create --repo acme/widgets --title fix --body "));
    assert!(log.contains("|pr view 1347 --repo acme/widgets --json number"));
    // Labeling and approval run under the current token fetched from gh.
    assert!(log.contains("gho_stubtoken|issue edit 1347 --repo acme/widgets --add-label automated"));
    assert!(log.contains(
        "gho_stubtoken|pr review 1347 --repo acme/widgets --approve --body \
         Auto-approved by the autopr pull request generator"
    ));

    // Second capture on the same session: defaults only, no labels, no
    // approval. Only creation-side hosting calls may happen.
    std::fs::write(&log_path, "").unwrap();
    let options = CaptureOptions {
        extra_propagation_wait: Duration::ZERO,
        ..CaptureOptions::default()
    };
    let work_dir = temp.path().to_path_buf();
    let outcome = session
        .capture(options, move || async move {
            std::fs::write(work_dir.join("generated-2.txt"), "more output").unwrap();
            Ok(())
        })
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Created(1347));
    let log = std::fs::read_to_string(&log_path).unwrap();
    assert!(log.contains("|pr create --repo acme/widgets --title [CHANGE ME] Automated pull request --body "));
    assert!(!log.contains("issue edit"));
    assert!(!log.contains("pr review"));
    assert!(!log.contains("auth token"));

    let branch = run_git_command(&ctx, &["rev-parse", "--abbrev-ref", "HEAD"])
        .await
        .unwrap();
    assert_eq!(branch, "main");
}
