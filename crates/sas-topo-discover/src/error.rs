//! Errors surfaced by the HBA and SMP discovery collaborators.

use thiserror::Error;

use sas_topo_graph::GraphError;

#[derive(Debug, Error)]
pub enum DiscoverError {
    /// The HBA library or an SMP target returned a non-accepted result.
    #[error("{0}")]
    Io(String),
    /// Vertex or attribute construction failed while recording a discovered
    /// fabric element.
    #[error(transparent)]
    Graph(#[from] GraphError),
}
