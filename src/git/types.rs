//! Git error type
//!
//! Failures surface as `VcsError` carrying libgit2's diagnostic message.
//! `NothingToCommit` is split out because callers treat it as a condition,
//! not a fault: the pipeline surfaces it, the bootstrap sequence treats it
//! as an invariant violation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VcsError {
    /// The working tree is clean relative to the last commit.
    #[error("nothing to commit, working tree clean")]
    NothingToCommit,

    /// Any underlying libgit2 failure, with its diagnostic text.
    #[error("git error: {0}")]
    Git(#[from] git2::Error),
}
