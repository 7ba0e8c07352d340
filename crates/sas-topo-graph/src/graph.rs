//! The fabric graph: a vertex arena plus directed adjacency lists.

use std::collections::HashMap;

use thiserror::Error;
use tracing::trace;

use crate::address::{PhyRange, SasAddress};
use crate::attr::{AttrBag, AttrValue};
use crate::vertex::{Vertex, VertexHandle, VertexIdentity, VertexKind};
use sas_topo_fmri::{Authority, AuthorityKind, SasFmri};

/// Errors raised while building or mutating a [`Graph`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    /// A vertex with this identity already exists under a different kind.
    #[error("vertex identity {0:?} already registered under a conflicting kind")]
    Duplicate(VertexIdentity),
    /// A port vertex was requested without a PHY range.
    #[error("port vertices require a phy range")]
    MissingPhyRange,
    /// A non-port vertex was requested with a PHY range.
    #[error("{0:?} vertices do not carry a phy range")]
    UnexpectedPhyRange(VertexKind),
    /// The arena could not grow to hold a new vertex or edge.
    ///
    /// Rust's allocator makes this practically unreachable outside
    /// `try_reserve` paths; the variant is kept so callers can match the
    /// same error taxonomy the fabric's other fallible layers expose.
    #[error("out of memory while growing the fabric graph")]
    OutOfMemory,
}

fn vertex_kind_name(kind: VertexKind) -> &'static str {
    match kind {
        VertexKind::Initiator => "initiator",
        VertexKind::Port => "port",
        VertexKind::Expander => "expander",
        VertexKind::Target => "target",
    }
}

fn resource_fmri(kind: VertexKind, sas_address: SasAddress, phy_range: Option<PhyRange>) -> SasFmri {
    let authority = match phy_range {
        Some(range) => Authority::with_phy_range(
            AuthorityKind::Pathnode,
            range.start().0,
            range.end().0,
        ),
        None => Authority::new(AuthorityKind::Pathnode),
    };
    sas_topo_fmri::construct(vertex_kind_name(kind), sas_address.raw(), authority)
}

/// A directed edge, `from -> to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: VertexHandle,
    pub to: VertexHandle,
}

/// The SAS fabric graph: vertices plus directed edges between them.
#[derive(Debug, Default)]
pub struct Graph {
    vertices: Vec<Vertex>,
    by_identity: HashMap<VertexIdentity, VertexHandle>,
    out_edges: Vec<Vec<VertexHandle>>,
    in_edges: Vec<Vec<VertexHandle>>,
}

impl Graph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the existing vertex for `identity` if one is registered,
    /// otherwise creates and registers a new vertex of `kind` with an empty
    /// attribute bag.
    ///
    /// This is the single vertex-creation entry point every discovery source
    /// uses, so that two sources observing the same fabric element (e.g. an
    /// HBA port and an expander PHY attached to it) converge on one vertex
    /// rather than creating duplicates.
    pub fn get_or_create(
        &mut self,
        kind: VertexKind,
        identity: VertexIdentity,
    ) -> Result<VertexHandle, GraphError> {
        if let Some(&handle) = self.by_identity.get(&identity) {
            let existing = &self.vertices[handle.0];
            if existing.kind != kind {
                return Err(GraphError::Duplicate(identity));
            }
            return Ok(handle);
        }

        let handle = VertexHandle(self.vertices.len());
        self.vertices.push(Vertex {
            kind,
            identity,
            attrs: AttrBag::new(),
        });
        self.out_edges.push(Vec::new());
        self.in_edges.push(Vec::new());
        self.by_identity.insert(identity, handle);
        trace!(?kind, ?identity, ?handle, "vertex created");
        Ok(handle)
    }

    /// The single vertex-creation entry point every discovery source uses
    /// (§4.1): resolves `kind`/`sas_address`/`phy_range` to an identity,
    /// delegates to [`Graph::get_or_create`], and — only on first creation —
    /// attaches the `resource` attribute with the FMRI this vertex's C2
    /// encoding produces. A port requires a PHY range; every other kind must
    /// not carry one.
    pub fn new_vertex(
        &mut self,
        kind: VertexKind,
        sas_address: SasAddress,
        phy_range: Option<PhyRange>,
    ) -> Result<VertexHandle, GraphError> {
        let identity = match (kind, phy_range) {
            (VertexKind::Port, Some(range)) => VertexIdentity::Port(sas_address, range),
            (VertexKind::Port, None) => return Err(GraphError::MissingPhyRange),
            (_, None) => VertexIdentity::Address(kind, sas_address),
            (_, Some(_)) => return Err(GraphError::UnexpectedPhyRange(kind)),
        };
        let handle = self.get_or_create(kind, identity)?;
        if self.vertex(handle).attrs().get("resource").is_none() {
            let fmri = resource_fmri(kind, sas_address, phy_range);
            let text = sas_topo_fmri::encode(&fmri)
                .expect("a freshly constructed pathnode FMRI always encodes");
            self.vertex_mut(handle)
                .attrs_mut()
                .set("resource", AttrValue::Str(text))
                .expect("resource is set at most once, immediately after creation");
        }
        Ok(handle)
    }

    #[must_use]
    pub fn lookup(&self, identity: VertexIdentity) -> Option<VertexHandle> {
        self.by_identity.get(&identity).copied()
    }

    #[must_use]
    pub fn vertex(&self, handle: VertexHandle) -> &Vertex {
        &self.vertices[handle.0]
    }

    #[must_use]
    pub fn vertex_mut(&mut self, handle: VertexHandle) -> &mut Vertex {
        &mut self.vertices[handle.0]
    }

    pub fn vertices(&self) -> impl Iterator<Item = (VertexHandle, &Vertex)> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (VertexHandle(i), v))
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Adds a directed edge `from -> to`. Idempotent: re-adding an existing
    /// edge is a no-op rather than an error, since both stitcher passes may
    /// independently discover the same link.
    pub fn add_edge(&mut self, from: VertexHandle, to: VertexHandle) {
        if !self.out_edges[from.0].contains(&to) {
            self.out_edges[from.0].push(to);
            self.in_edges[to.0].push(from);
            trace!(?from, ?to, "edge added");
        }
    }

    #[must_use]
    pub fn out_neighbors(&self, handle: VertexHandle) -> &[VertexHandle] {
        &self.out_edges[handle.0]
    }

    #[must_use]
    pub fn in_neighbors(&self, handle: VertexHandle) -> &[VertexHandle] {
        &self.in_edges[handle.0]
    }

    /// All vertices reachable from `start` by following out-edges, including
    /// `start` itself. Used to compute invariant I-like path-count checks
    /// (e.g. the fixture's "3 reachable paths from the initiator").
    #[must_use]
    pub fn reachable_from(&self, start: VertexHandle) -> Vec<VertexHandle> {
        let mut seen = vec![false; self.vertices.len()];
        let mut stack = vec![start];
        let mut out = Vec::new();
        seen[start.0] = true;
        while let Some(h) = stack.pop() {
            out.push(h);
            for &next in self.out_neighbors(h) {
                if !seen[next.0] {
                    seen[next.0] = true;
                    stack.push(next);
                }
            }
        }
        out
    }
}
