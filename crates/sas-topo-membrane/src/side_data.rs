//! Per-vertex side data, keyed by [`VertexHandle`] rather than by raw
//! pointer (the redesign the original's pointer-keyed side list needed:
//! handles stay valid across graph growth, pointers into a `Vec` do not).

use std::collections::HashMap;

use sas_topo_graph::{SasAddress, VertexHandle};
#[cfg(test)]
use sas_topo_graph::{Graph, VertexIdentity, VertexKind};

/// Which discovery source attached this side data to a port vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    Hba,
    Expander,
}

/// Discovery-time metadata for a port vertex that does not belong in the
/// graph's write-once attribute bag because the stitcher mutates it as it
/// learns more about the port (e.g. `has_hba_edge` flips once an HBA-side
/// edge is linked in).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortSide {
    pub attached_wwn: Option<SasAddress>,
    pub origin: Origin,
    pub has_hba_edge: bool,
}

impl PortSide {
    #[must_use]
    pub fn new(origin: Origin, attached_wwn: Option<SasAddress>) -> Self {
        Self {
            attached_wwn,
            origin,
            has_hba_edge: false,
        }
    }
}

/// A handle-keyed map from port vertices to their [`PortSide`] data.
#[derive(Debug, Default)]
pub struct SideDataStore {
    entries: HashMap<VertexHandle, PortSide>,
}

impl SideDataStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, handle: VertexHandle, side: PortSide) {
        self.entries.insert(handle, side);
    }

    #[must_use]
    pub fn get(&self, handle: VertexHandle) -> Option<&PortSide> {
        self.entries.get(&handle)
    }

    pub fn get_mut(&mut self, handle: VertexHandle) -> Option<&mut PortSide> {
        self.entries.get_mut(&handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (VertexHandle, &PortSide)> {
        self.entries.iter().map(|(&h, s)| (h, s))
    }
}
