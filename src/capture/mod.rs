//! The pull-request capture workflow
//!
//! A capture runs a caller-supplied block of work on a freshly created
//! branch, turns any resulting diff into a pull request, and restores the
//! branch the repository started on.

mod options;
mod outcome;
mod session;

pub use options::{AutoApprove, CaptureOptions, DEFAULT_APPROVAL_BODY};
pub use outcome::Outcome;
pub use session::{Abort, CaptureSession, WorkResult};
