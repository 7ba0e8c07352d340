//! The `topo_method` table (§6.2): the five named entry points a host
//! fault-management framework would bind to this scheme, modeled as plain
//! functions plus a small enum for table-driven dispatch.

use sas_topo_fmri::{check_version, decode, encode, Authority, SasFmri};

use crate::error::TopoError;

/// One entry in the scheme's method table, named after its `TOPO_METH_*`
/// counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopoMethod {
    Nvl2Str,
    Str2Nvl,
    Fmri,
    Sas2Dev,
    Sas2Hc,
}

impl TopoMethod {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            TopoMethod::Nvl2Str => "nvl2str",
            TopoMethod::Str2Nvl => "str2nvl",
            TopoMethod::Fmri => "fmri",
            TopoMethod::Sas2Dev => "sas2dev",
            TopoMethod::Sas2Hc => "sas2hc",
        }
    }
}

/// Encodes a structured FMRI back to its canonical text (`NVL2STR`).
pub fn nvl2str(version: u8, fmri: &SasFmri) -> Result<String, TopoError> {
    check_version(version)?;
    Ok(encode(fmri)?)
}

/// Parses a textual FMRI into its structured form (`STR2NVL`).
pub fn str2nvl(version: u8, text: &str) -> Result<SasFmri, TopoError> {
    check_version(version)?;
    Ok(decode(text)?)
}

/// Constructs a single-component pathnode FMRI for a freshly discovered
/// vertex (`FMRI`) — the same helper `Graph::new_vertex` uses internally.
pub fn fmri(version: u8, name: &str, inst: u64, authority: Authority) -> Result<SasFmri, TopoError> {
    check_version(version)?;
    Ok(sas_topo_fmri::construct(name, inst, authority))
}

/// Device-scheme cross-resolution (`SAS2DEV`). Declared, unimplemented —
/// out of scope per §1.
pub fn sas2dev(_version: u8, _fmri: &SasFmri) -> Result<String, TopoError> {
    Err(TopoError::Unsupported(TopoMethod::Sas2Dev.name()))
}

/// Hardware-composition cross-resolution (`SAS2HC`). Declared,
/// unimplemented — out of scope per §1.
pub fn sas2hc(_version: u8, _fmri: &SasFmri) -> Result<String, TopoError> {
    Err(TopoError::Unsupported(TopoMethod::Sas2Hc.name()))
}
