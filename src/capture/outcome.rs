//! Result classification for a capture call

/// The result of one capture call.
///
/// All four variants are successful results; failures surface as errors
/// from `capture`, never as an `Outcome`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Generation was disabled; the work ran but no branches were touched
    Disabled,
    /// The work asked for the capture to be abandoned
    Aborted,
    /// The work left the tree unchanged; there was nothing to propose
    Unchanged,
    /// A pull request was opened
    Created(u64),
}

impl Outcome {
    /// The created pull request's number, when there is one.
    pub fn pr_number(&self) -> Option<u64> {
        match self {
            Outcome::Created(number) => Some(*number),
            _ => None,
        }
    }
}
