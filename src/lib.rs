//! autopr - Turn script-driven working-tree changes into pull requests
//!
//! This library is for build/release automation that regenerates files and
//! wants the result proposed as a reviewable change instead of committed
//! directly. It provides:
//! - The capture workflow: run caller work on a fresh branch, commit and
//!   push whatever changed, open a pull request, and restore the original
//!   branch
//! - Git operations for branch lifecycle, staging, and pushing
//! - GitHub CLI operations for PR creation, labeling, and approval
//!
//! ```no_run
//! use autopr::{CaptureOptions, CaptureSession, RepoContext};
//!
//! # async fn example() -> autopr::Result<()> {
//! let session = CaptureSession::new(RepoContext::new("."));
//! let outcome = session
//!     .capture(CaptureOptions::default(), || async {
//!         std::fs::write("generated.txt", "fresh output").unwrap();
//!         Ok(())
//!     })
//!     .await?;
//! println!("capture finished: {:?}", outcome);
//! # Ok(())
//! # }
//! ```

pub mod capture;
pub mod context;
pub mod errors;
pub mod gh;
pub mod git;
pub mod logging;

// Re-export commonly used types
pub use capture::{Abort, AutoApprove, CaptureOptions, CaptureSession, Outcome, WorkResult};
pub use context::RepoContext;
pub use errors::{AutoprError, Result};
