//! Links the vertices `sas-topo-discover` found in isolation into one
//! connected SAS fabric graph (C5).

#![deny(unsafe_code)]

pub mod error;
pub mod stitch;

pub use error::StitchError;
pub use stitch::{link_expander_to_expander, link_hba_to_expander, orient_expander_ports, stitch};
