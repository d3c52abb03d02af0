//! Git operations module
//!
//! Wrappers for the git CLI commands the capture workflow drives.

mod operations;

pub use operations::{
    add_all, clean_untracked, commit, create_branch, current_branch, delete_branch, is_clean,
    push, run_git_command, switch_branch, verify_binary,
};
