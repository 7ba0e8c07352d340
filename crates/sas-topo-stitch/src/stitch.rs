//! C5 — graph stitching: three ordered passes that link the vertices C3
//! and C4 discovered in isolation into one connected fabric.
//!
//! SMP never tells an expander which direction a link should be drawn in,
//! so the three passes run in a fixed order and rely on each earlier pass's
//! edges (and the `has_hba_edge` flag recorded on every expander) to decide
//! the next one:
//!
//! 1. [`link_hba_to_expander`] walks every HBA-origin port and, for the
//!    expander it names as attached, finds the matching not-yet-connected
//!    expander port and wires `hba_port -> expander_port -> expander`.
//!    Marks that expander `has_hba_edge`.
//! 2. [`orient_expander_ports`] visits every remaining expander-origin
//!    port with no incoming edge and connects it to its owning expander —
//!    `port -> expander` if the expander has no HBA edge yet, `expander ->
//!    port` if it does, so edges always point away from the initiator.
//! 3. [`link_expander_to_expander`] pairs up the two sides of an
//!    inter-expander wide port (the one with no outgoing edge after pass 2
//!    is the initiator-side half) by matching attached/local addresses.

use std::collections::HashMap;

use sas_topo_graph::{Graph, SasAddress, VertexHandle, VertexIdentity, VertexKind};
use sas_topo_membrane::SideDataStore;

use crate::error::StitchError;

fn expander_vertex_for(graph: &Graph, addr: SasAddress) -> Option<VertexHandle> {
    graph.lookup(VertexIdentity::Address(VertexKind::Expander, addr))
}

/// All expander-origin port vertices, keyed by `(vertex's own sas address,
/// side data attached address)` for O(1) sibling lookups.
fn expander_ports_by_address(
    graph: &Graph,
    side: &SideDataStore,
) -> HashMap<(SasAddress, SasAddress), Vec<VertexHandle>> {
    let mut map: HashMap<(SasAddress, SasAddress), Vec<VertexHandle>> = HashMap::new();
    for (handle, vertex) in graph.vertices() {
        if vertex.kind() != VertexKind::Port {
            continue;
        }
        let Some(port_side) = side.get(handle) else {
            continue;
        };
        if port_side.origin != sas_topo_membrane::Origin::Expander {
            continue;
        }
        let Some(attached) = port_side.attached_wwn else {
            continue;
        };
        map.entry((vertex.sas_address(), attached))
            .or_default()
            .push(handle);
    }
    map
}

/// Pass 1 (§4.5 step 1): connects every HBA-origin port to the expander it
/// names as attached, via that expander's matching inbound port.
pub fn link_hba_to_expander(
    graph: &mut Graph,
    side: &mut SideDataStore,
) -> Result<(), StitchError> {
    let hba_ports: Vec<(VertexHandle, SasAddress, SasAddress)> = graph
        .vertices()
        .filter(|(_, v)| v.kind() == VertexKind::Port)
        .filter_map(|(h, v)| {
            let s = side.get(h)?;
            if s.origin != sas_topo_membrane::Origin::Hba {
                return None;
            }
            let attached = s.attached_wwn?;
            Some((h, v.sas_address(), attached))
        })
        .collect();

    let by_addr = expander_ports_by_address(graph, side);

    for (hba_port, hba_local, expander_addr) in hba_ports {
        let Some(candidates) = by_addr.get(&(expander_addr, hba_local)) else {
            continue;
        };
        let unconnected: Vec<VertexHandle> = candidates
            .iter()
            .copied()
            .filter(|&h| graph.in_neighbors(h).is_empty())
            .collect();
        if unconnected.len() > 1 {
            return Err(StitchError::AmbiguousTopology(format!(
                "HBA port {hba_local} matches {} unconnected ports on expander {expander_addr}",
                unconnected.len()
            )));
        }
        let Some(&expander_port) = unconnected.first() else {
            continue;
        };

        graph.add_edge(hba_port, expander_port);

        let Some(expander_vtx) = expander_vertex_for(graph, expander_addr) else {
            continue;
        };
        graph.add_edge(expander_port, expander_vtx);
        if let Some(s) = side.get_mut(expander_vtx) {
            s.has_hba_edge = true;
        }
    }
    Ok(())
}

/// Pass 2 (§4.5 step 2): connects every still-unlinked expander-origin port
/// to the expander vertex it belongs to, oriented by whether that expander
/// already carries an HBA edge.
pub fn orient_expander_ports(graph: &mut Graph, side: &mut SideDataStore) {
    let candidates: Vec<(VertexHandle, SasAddress)> = graph
        .vertices()
        .filter(|(h, v)| {
            v.kind() == VertexKind::Port
                && side
                    .get(*h)
                    .is_some_and(|s| s.origin == sas_topo_membrane::Origin::Expander)
                && graph.in_neighbors(*h).is_empty()
        })
        .map(|(h, v)| (h, v.sas_address()))
        .collect();

    for (port, owner_addr) in candidates {
        let Some(expander_vtx) = expander_vertex_for(graph, owner_addr) else {
            continue;
        };
        if port == expander_vtx {
            continue;
        }
        let has_hba_edge = side.get(expander_vtx).is_some_and(|s| s.has_hba_edge);
        if has_hba_edge {
            graph.add_edge(expander_vtx, port);
        } else {
            graph.add_edge(port, expander_vtx);
        }
    }
}

/// Pass 3 (§4.5 step 3): pairs the initiator-side half of an inter-expander
/// wide port (no outgoing edge yet after pass 2) with its sibling on the
/// far expander, matching mutual local/attached addresses.
///
/// Assumes at most one expander in any linked pair is HBA-reachable (§9
/// open question 2): if orientation left both sides of a pair without an
/// outgoing edge, both are HBA-reachable and wiring either direction would
/// create a two-cycle the path walker could recurse into forever. That
/// case is rejected rather than silently picking a direction.
pub fn link_expander_to_expander(graph: &mut Graph, side: &mut SideDataStore) -> Result<(), StitchError> {
    let by_addr = expander_ports_by_address(graph, side);

    let pending: Vec<(VertexHandle, SasAddress, SasAddress)> = graph
        .vertices()
        .filter(|(h, v)| {
            v.kind() == VertexKind::Port
                && side
                    .get(*h)
                    .is_some_and(|s| s.origin == sas_topo_membrane::Origin::Expander)
                && graph.out_neighbors(*h).is_empty()
        })
        .filter_map(|(h, v)| {
            let attached = side.get(h)?.attached_wwn?;
            Some((h, v.sas_address(), attached))
        })
        .collect();

    for (port, own_addr, peer_addr) in pending {
        let Some(siblings) = by_addr.get(&(peer_addr, own_addr)) else {
            continue;
        };
        // §4.5 Pass B states no incoming-edge precondition on the peer —
        // only the mutual address match and that it isn't this port itself.
        let Some(&sibling) = siblings.iter().find(|&&s| s != port) else {
            continue;
        };
        if graph.out_neighbors(sibling).contains(&port) {
            return Err(StitchError::AmbiguousTopology(format!(
                "expanders {own_addr} and {peer_addr} are both HBA-reachable; bidirectional expander linkage is not supported"
            )));
        }
        graph.add_edge(port, sibling);
    }
    Ok(())
}

/// Runs all three passes in the fixed order §4.5 requires.
pub fn stitch(graph: &mut Graph, side: &mut SideDataStore) -> Result<(), StitchError> {
    link_hba_to_expander(graph, side)?;
    orient_expander_ports(graph, side);
    link_expander_to_expander(graph, side)?;
    Ok(())
}
