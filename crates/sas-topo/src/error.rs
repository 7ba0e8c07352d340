//! The aggregated error type `enumerate()` and the `topo_method` table
//! surface to callers.

use thiserror::Error;

use sas_topo_discover::DiscoverError;
use sas_topo_fmri::FmriError;
use sas_topo_graph::GraphError;
use sas_topo_stitch::StitchError;

#[derive(Debug, Error)]
pub enum TopoError {
    #[error(transparent)]
    Fmri(#[from] FmriError),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Discover(#[from] DiscoverError),
    #[error(transparent)]
    Stitch(#[from] StitchError),
    /// `SAS2DEV`/`SAS2HC` are declared `topo_method` entries with no
    /// implementation in this core.
    #[error("method '{0}' is not implemented by this scheme")]
    Unsupported(&'static str),
}
