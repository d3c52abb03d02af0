//! Per-capture configuration

use std::time::Duration;

/// Review body submitted when auto-approval is requested without a custom one
pub const DEFAULT_APPROVAL_BODY: &str = "Auto-approved by the autopr pull request generator";

/// Whether, and with what body, to auto-approve the created pull request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AutoApprove {
    /// Do not submit a review
    #[default]
    Off,
    /// Approve with [`DEFAULT_APPROVAL_BODY`]
    Approve,
    /// Approve with a caller-supplied review body
    Custom(String),
}

impl AutoApprove {
    /// The review body to submit, or `None` when approval is off.
    pub fn body(&self) -> Option<&str> {
        match self {
            AutoApprove::Off => None,
            AutoApprove::Approve => Some(DEFAULT_APPROVAL_BODY),
            AutoApprove::Custom(body) => Some(body),
        }
    }
}

/// Configuration for one capture call
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    /// When false, the work still runs but no branches are touched and no
    /// pull request is created
    pub enabled: bool,

    /// Remote the temporary branch is pushed to
    pub remote: String,

    /// Branch to create for the capture; generated when absent
    pub branch_name: Option<String>,

    /// Commit message, doubling as the PR title; a placeholder prompting
    /// manual edit is used when absent
    pub commit_message: Option<String>,

    /// PR body; a timestamped placeholder is used when absent
    pub pr_body: Option<String>,

    /// Labels to add to the created pull request
    pub labels: Vec<String>,

    /// Auto-approval of the created pull request
    pub auto_approve: AutoApprove,

    /// Token used for labeling/approval; defaults to gh's current token
    pub approval_token: Option<String>,

    /// Fixed delay after the PR becomes visible, covering eventual
    /// consistency beyond what the visibility retry already absorbs
    pub extra_propagation_wait: Duration,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        CaptureOptions {
            enabled: true,
            remote: "origin".to_string(),
            branch_name: None,
            commit_message: None,
            pr_body: None,
            labels: Vec::new(),
            auto_approve: AutoApprove::Off,
            approval_token: None,
            extra_propagation_wait: Duration::from_secs(5),
        }
    }
}
