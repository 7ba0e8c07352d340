//! HBA and SMP expander discovery: the two collaborator-facing walkers
//! (C3, C4) that feed raw fabric observations into `sas-topo-graph`.
//!
//! Neither walker draws an edge between an expander and a wide port it
//! finds — that orientation is ambiguous from a single expander's point of
//! view and is resolved later by `sas-topo-stitch`.

#![deny(unsafe_code)]

pub mod devtree;
pub mod error;
pub mod expander;
pub mod fixture;
pub mod hba;

pub use devtree::DeviceTree;
pub use error::DiscoverError;
pub use expander::{
    discover_expander, DiscoverResp, PhyDiscovery, ReportGeneralResp, SmpTargetHandle,
    SmpTransport,
};
pub use hba::{
    discover_hbas, AdapterAttrs, AdapterHandle, HbaLibrary, PhyRecord, PortType, SasPortRecord,
};
