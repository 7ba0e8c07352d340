//! Vertex kinds, handles, and identity.

use crate::address::{PhyRange, SasAddress};
use crate::attr::AttrBag;

/// The four vertex kinds a SAS fabric graph can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexKind {
    Initiator,
    Port,
    Expander,
    Target,
}

/// A stable handle into a [`crate::Graph`]'s vertex arena.
///
/// Side-data (see `sas-topo-membrane::side_data`) is keyed by this handle,
/// never by a raw pointer, so it survives the graph being queried or cloned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexHandle(pub(crate) usize);

impl VertexHandle {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Identity key distinguishing vertices of the same kind.
///
/// Initiator, expander, and target vertices are unique by `(kind,
/// sas_address)`; port vertices are additionally keyed by their PHY range,
/// since one SAS address can expose several distinct ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexIdentity {
    Address(VertexKind, SasAddress),
    Port(SasAddress, PhyRange),
}

/// A graph vertex: a kind, an identity, and a write-once attribute bag.
#[derive(Debug, Clone)]
pub struct Vertex {
    pub(crate) kind: VertexKind,
    pub(crate) identity: VertexIdentity,
    pub(crate) attrs: AttrBag,
}

impl Vertex {
    #[must_use]
    pub fn kind(&self) -> VertexKind {
        self.kind
    }

    #[must_use]
    pub fn identity(&self) -> VertexIdentity {
        self.identity
    }

    #[must_use]
    pub fn attrs(&self) -> &AttrBag {
        &self.attrs
    }

    #[must_use]
    pub fn attrs_mut(&mut self) -> &mut AttrBag {
        &mut self.attrs
    }

    /// The SAS address this vertex is keyed on, regardless of kind.
    #[must_use]
    pub fn sas_address(&self) -> SasAddress {
        match self.identity {
            VertexIdentity::Address(_, addr) | VertexIdentity::Port(addr, _) => addr,
        }
    }
}
