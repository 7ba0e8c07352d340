//! Typed directed graph model for a SAS fabric.
//!
//! The graph holds four vertex kinds (initiator, port, expander, target)
//! connected by directed edges. Vertices carry a write-once attribute bag;
//! identity is defined per kind, not by insertion order. See [`Graph`] for
//! the construction API and [`Vertex`] / [`VertexKind`] for the data model.

#![deny(unsafe_code)]

mod address;
mod attr;
mod graph;
mod vertex;

pub use address::{PhyId, PhyRange, SasAddress};
pub use attr::{AttrBag, AttrError, AttrValue};
pub use graph::{Edge, Graph, GraphError};
pub use vertex::{Vertex, VertexHandle, VertexIdentity, VertexKind};
