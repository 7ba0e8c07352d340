//! Fixture execution adapter shared by the harness binary and the
//! integration test suite, so neither depends directly on the S1 fixture's
//! internal module layout inside `sas-topo-discover`.

#![deny(unsafe_code)]

use sas_topo::{Graph, SideDataStore, TopoError, VertexIdentity, VertexKind};
use sas_topo_discover::fixture;

pub use sas_topo_discover::fixture::{
    EXPANDER1_ADDR, EXPANDER1_DEVFS, EXPANDER2_ADDR, EXPANDER2_DEVFS, INITIATOR_ADDR,
    TARGET1_ADDR, TARGET2_ADDR, TARGET3_ADDR,
};

/// Builds and stitches the S1 fixture topology in one call, handing back
/// both the graph and its side data so a caller can run invariant checks
/// without reaching into `sas-topo-discover` directly.
pub fn build_fixture() -> Result<(Graph, SideDataStore), TopoError> {
    let mut graph = Graph::new();
    let mut side = SideDataStore::new();
    sas_topo::enumerate_fixture(&mut graph, &mut side)?;
    Ok((graph, side))
}

/// The expected number of paths from the initiator in the S1 fixture (§8).
pub const EXPECTED_PATH_COUNT: usize = 3;

/// Counts target vertices reachable from the fixture's initiator, the
/// metric the harness and the acceptance test both report.
#[must_use]
pub fn reachable_target_count(graph: &Graph) -> usize {
    let Some(initiator) = graph.lookup(VertexIdentity::Address(
        VertexKind::Initiator,
        sas_topo::SasAddress::new(fixture::INITIATOR_ADDR),
    )) else {
        return 0;
    };
    graph
        .reachable_from(initiator)
        .iter()
        .filter(|&&h| graph.vertex(h).kind() == VertexKind::Target)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_reaches_the_expected_number_of_targets() {
        let (graph, _side) = build_fixture().unwrap();
        assert_eq!(reachable_target_count(&graph), EXPECTED_PATH_COUNT);
    }
}
