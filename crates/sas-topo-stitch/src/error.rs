//! Errors raised while linking discovered fabric elements into one graph.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StitchError {
    /// More than one candidate matched a linkage search that expects at
    /// most one (e.g. two expander ports both claiming the same HBA port's
    /// attached address). SMP gives no way to disambiguate further, so this
    /// is surfaced rather than guessed at.
    #[error("ambiguous topology: {0}")]
    AmbiguousTopology(String),
}
