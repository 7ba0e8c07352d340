//! FMRI codec: `sas://` resource identifiers for fabric vertices.
//!
//! The textual grammar is
//!
//! ```text
//! sas://type=<path|pathnode>[:start-phy=<n>:end-phy=<n>]/name=<hex64>(/name=<hex64>)*
//! ```
//!
//! [`decode`] and [`encode`] are bit-exact inverses of each other for any
//! value `encode` can produce (codec law L1). [`encoded_len`] computes the
//! exact output length of `encode` in a first pass so callers needing an
//! externally-allocated buffer (e.g. an FFI `topo_mod_fmristr` out-parameter)
//! never over- or under-allocate.

#![deny(unsafe_code)]

mod codec;
mod error;
mod nvl;

pub use codec::{SUPPORTED_VERSION, check_version, construct, decode, encode, encoded_len};
pub use error::FmriError;
pub use nvl::{Authority, AuthorityKind, PathComponent, SasFmri};
