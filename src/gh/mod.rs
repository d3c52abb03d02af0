//! GitHub CLI operations module
//!
//! Wrappers for the gh commands the capture workflow drives: repository
//! identity, auth tokens, PR creation and post-creation updates.

mod operations;

pub use operations::{
    add_labels, approve_pr, confirm_pr_visible, create_pr, current_token, repo_full_name,
    retry_command, run_gh_command, verify_binary,
};
