//! FMRI error taxonomy.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FmriError {
    /// The FMRI scheme version is not the one this codec implements.
    #[error("unsupported FMRI scheme version {0}")]
    VersionUnsupported(u8),
    /// The textual FMRI did not match the `sas://` grammar.
    #[error("malformed FMRI string: {0}")]
    MalformedFmri(String),
    /// An in-memory FMRI representation violated a structural invariant
    /// (e.g. only one of start-phy/end-phy present, or an empty path).
    #[error("malformed FMRI structure: {0}")]
    MalformedNvl(String),
}
