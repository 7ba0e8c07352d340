//! End-to-end checks of the invariants, codec laws, boundary behaviors, and
//! concrete scenarios the fabric model is expected to satisfy, run against
//! the public `sas-topo` API rather than any one crate's internals.

use sas_topo::{
    enumerate_fixture, fmri, nvl2str, sas2dev, sas2hc, str2nvl, Authority, AuthorityKind, Graph,
    PathComponent, SasAddress, SasFmri, SideDataStore, TopoError, VertexHandle, VertexIdentity,
    VertexKind,
};

fn fixture_graph() -> (Graph, SideDataStore) {
    let mut graph = Graph::new();
    let mut side = SideDataStore::new();
    enumerate_fixture(&mut graph, &mut side).unwrap();
    (graph, side)
}

fn initiator_handle(graph: &Graph) -> VertexHandle {
    graph
        .lookup(VertexIdentity::Address(
            VertexKind::Initiator,
            SasAddress::new(sas_topo_fixture_addrs::INITIATOR),
        ))
        .expect("fixture always creates the initiator vertex")
}

mod sas_topo_fixture_addrs {
    pub use sas_topo_discover::fixture::{
        EXPANDER1_ADDR as EXPANDER1, EXPANDER2_ADDR as EXPANDER2, INITIATOR_ADDR as INITIATOR,
        TARGET1_ADDR as TARGET1, TARGET2_ADDR as TARGET2, TARGET3_ADDR as TARGET3,
    };
}

// I1 — every target vertex has exactly one incoming edge, and its source is
// a port whose sas_address equals the target's.
#[test]
fn i1_every_target_has_one_incoming_port_edge_matching_its_address() {
    let (graph, _side) = fixture_graph();
    for (handle, vertex) in graph.vertices() {
        if vertex.kind() != VertexKind::Target {
            continue;
        }
        let incoming = graph.in_neighbors(handle);
        assert_eq!(incoming.len(), 1, "target {:?} must have exactly one incoming edge", handle);
        let source = graph.vertex(incoming[0]);
        assert_eq!(source.kind(), VertexKind::Port);
        assert_eq!(source.sas_address(), vertex.sas_address());
    }
}

// I2 — every port vertex has <= 1 incoming and <= 1 outgoing edge.
#[test]
fn i2_every_port_has_at_most_one_incoming_and_outgoing_edge() {
    let (graph, _side) = fixture_graph();
    for (handle, vertex) in graph.vertices() {
        if vertex.kind() != VertexKind::Port {
            continue;
        }
        assert!(graph.in_neighbors(handle).len() <= 1);
        assert!(graph.out_neighbors(handle).len() <= 1);
    }
}

// I3 — along any initiator -> target path, consecutive port vertices
// satisfy left.attached_wwn == right.sas and right.attached_wwn == left.sas.
#[test]
fn i3_consecutive_ports_on_a_path_mirror_each_others_address() {
    let (graph, side) = fixture_graph();
    let initiator = initiator_handle(&graph);

    fn walk(
        graph: &Graph,
        side: &SideDataStore,
        current: VertexHandle,
        last_port: Option<VertexHandle>,
    ) {
        if graph.vertex(current).kind() == VertexKind::Port {
            if let Some(prev) = last_port {
                let left = side.get(prev).expect("port must carry side data");
                let right = side.get(current).expect("port must carry side data");
                assert_eq!(left.attached_wwn, Some(graph.vertex(current).sas_address()));
                assert_eq!(right.attached_wwn, Some(graph.vertex(prev).sas_address()));
            }
            for &next in graph.out_neighbors(current) {
                walk(graph, side, next, Some(current));
            }
        } else {
            for &next in graph.out_neighbors(current) {
                walk(graph, side, next, last_port);
            }
        }
    }

    walk(&graph, &side, initiator, None);
}

// I4 — no path contains more than two expander vertices.
#[test]
fn i4_no_path_visits_more_than_two_expanders() {
    let (graph, _side) = fixture_graph();
    let initiator = initiator_handle(&graph);

    fn max_expanders(graph: &Graph, current: VertexHandle, count: usize) -> usize {
        let count = if graph.vertex(current).kind() == VertexKind::Expander {
            count + 1
        } else {
            count
        };
        graph
            .out_neighbors(current)
            .iter()
            .map(|&next| max_expanders(graph, next, count))
            .max()
            .unwrap_or(count)
    }

    assert!(max_expanders(&graph, initiator, 0) <= 2);
}

// I5 — the subgraph reachable from the initiator is a tree (no cycles):
// every reachable vertex but the initiator has exactly one incoming edge
// whose source is itself reachable.
#[test]
fn i5_reachable_subgraph_is_a_tree() {
    let (graph, _side) = fixture_graph();
    let initiator = initiator_handle(&graph);
    let reachable: std::collections::HashSet<_> = graph.reachable_from(initiator).into_iter().collect();

    for &handle in &reachable {
        if handle == initiator {
            continue;
        }
        let incoming_within: Vec<_> = graph
            .in_neighbors(handle)
            .iter()
            .filter(|h| reachable.contains(h))
            .collect();
        assert_eq!(
            incoming_within.len(),
            1,
            "non-root reachable vertex {:?} must have exactly one reachable predecessor",
            handle
        );
    }
}

// L1 — decode(encode(n)) == n for every well-formed n.
#[test]
fn l1_decode_of_encode_is_identity() {
    let built = fmri(0, "expander", 0xDEADBEEF, Authority::with_phy_range(AuthorityKind::Path, 10, 17)).unwrap();
    let text = nvl2str(0, &built).unwrap();
    assert_eq!(str2nvl(0, &text).unwrap(), built);
}

// L2 — encode(decode(s)) == s for every s matching the grammar with
// lowercase hex IDs.
#[test]
fn l2_encode_of_decode_is_identity_on_canonical_text() {
    let text = "sas://type=pathnode:start-phy=0:end-phy=7/port=500304801861347f";
    let decoded = str2nvl(0, text).unwrap();
    assert_eq!(nvl2str(0, &decoded).unwrap(), text);
}

// L3 — the :start-phy=:end-phy= fragment appears in the text form iff both
// fields are present in the structured form.
#[test]
fn l3_phy_authority_fragment_presence_matches_structured_form() {
    let without = fmri(0, "port", 1, Authority::new(AuthorityKind::Pathnode)).unwrap();
    assert!(!nvl2str(0, &without).unwrap().contains("start-phy"));

    let with = fmri(0, "port", 1, Authority::with_phy_range(AuthorityKind::Pathnode, 0, 3)).unwrap();
    let text = nvl2str(0, &with).unwrap();
    assert!(text.contains("start-phy=0") && text.contains("end-phy=3"));
}

// L4 — every string violating any clause of the grammar is rejected with
// MalformedFmri.
#[test]
fn l4_grammar_violations_are_rejected() {
    for bad in [
        "sas:/type=path/port=1",
        "sas://type=pathnode/port=ZZZZ",
        "sas://type=pathnode/port=0x500",
        "sas://type=pathnode:start-phy=0/port=5",
    ] {
        assert!(matches!(str2nvl(0, bad), Err(TopoError::Fmri(_))), "expected rejection for {bad:?}");
    }
}

// Boundary behavior: narrow vs. wide classification by start_phy/end_phy.
#[test]
fn boundary_narrow_and_wide_ports_are_classified_by_phy_equality() {
    let (graph, _side) = fixture_graph();
    let mut saw_narrow = false;
    let mut saw_wide = false;
    for (_, vertex) in graph.vertices() {
        if vertex.kind() != VertexKind::Port {
            continue;
        }
        if let VertexIdentity::Port(_, range) = vertex.identity() {
            if range.is_narrow() {
                saw_narrow = true;
            } else {
                saw_wide = true;
            }
        }
    }
    assert!(saw_narrow && saw_wide, "the fixture must exercise both port shapes");
}

// S1 — the hard-coded fixture topology: 6 named vertices, expected path
// count 3 from the initiator (see DESIGN.md for the WWN corrections applied
// to the underlying fixture data).
#[test]
fn s1_fixture_topology_matches_expected_shape() {
    let (graph, _side) = fixture_graph();

    for addr in [
        sas_topo_fixture_addrs::INITIATOR,
        sas_topo_fixture_addrs::EXPANDER1,
        sas_topo_fixture_addrs::EXPANDER2,
        sas_topo_fixture_addrs::TARGET1,
        sas_topo_fixture_addrs::TARGET2,
        sas_topo_fixture_addrs::TARGET3,
    ] {
        assert!(
            graph
                .vertices()
                .any(|(_, v)| v.sas_address() == SasAddress::new(addr)),
            "missing expected vertex {addr:x}"
        );
    }

    let initiator = initiator_handle(&graph);
    let reachable = graph.reachable_from(initiator);
    let target_count = reachable
        .iter()
        .filter(|&&h| graph.vertex(h).kind() == VertexKind::Target)
        .count();
    assert_eq!(target_count, 3, "expected exactly 3 reachable targets per S1");
}

// S2 — FMRI path round-trip.
#[test]
fn s2_fmri_path_round_trips() {
    let text = "sas://type=path/initiator=5003048023567a00/port=5003048023567a00\
/port=500304801861347f/expander=500304801861347f/port=500304801861347f\
/port=5000cca2531a41b9/target=5000cca2531a41b9";
    let decoded = str2nvl(0, text).unwrap();
    assert_eq!(nvl2str(0, &decoded).unwrap(), text);
}

// S3 — pathnode with PHY authority decodes to the expected structured form.
#[test]
fn s3_pathnode_with_phy_authority_decodes_correctly() {
    let decoded = str2nvl(0, "sas://type=pathnode:start-phy=0:end-phy=7/port=500304801861347f").unwrap();
    assert_eq!(decoded.authority.kind, AuthorityKind::Pathnode);
    assert_eq!(decoded.authority.phy_range, Some((0, 7)));
    assert_eq!(decoded.path, vec![PathComponent::new("port", 0x500304801861347f)]);
}

// S4 — malformed strings are uniformly rejected.
#[test]
fn s4_malformed_fmris_are_rejected() {
    for bad in [
        "sas:/type=path/port=1",
        "sas://type=pathnode/port=ZZZZ",
        "sas://type=pathnode/port=0x500",
        "sas://type=pathnode:start-phy=0/port=5",
    ] {
        assert!(str2nvl(0, bad).is_err());
    }
}

// S5 — wide-port coalescing over a synthetic Discover trace.
#[test]
fn s5_wide_port_coalescing_over_a_synthetic_trace() {
    use sas_topo::{DiscoverResp, PhyDiscovery, PhyId, ReportGeneralResp, SmpTargetHandle, SmpTransport};
    use sas_topo_discover::DiscoverError;

    struct Trace;
    impl SmpTransport for Trace {
        fn open(&self, _p: &str) -> Result<SmpTargetHandle, DiscoverError> {
            Ok(SmpTargetHandle(0))
        }
        fn report_general(&self, _t: SmpTargetHandle) -> Result<ReportGeneralResp, DiscoverError> {
            Ok(ReportGeneralResp {
                num_phys: 7,
                sas_address: SasAddress::new(0x1),
            })
        }
        fn discover(&self, _t: SmpTargetHandle, phy: PhyId) -> Result<DiscoverResp, DiscoverError> {
            let addr = match phy.0 {
                0..=3 => 0xA,
                4 | 5 => 0xB,
                6 => 0xC,
                _ => unreachable!(),
            };
            Ok(DiscoverResp {
                phy: PhyDiscovery::ExpanderOrInitiator {
                    attached_sas: SasAddress::new(addr),
                },
            })
        }
        fn close(&self, _t: SmpTargetHandle) {}
    }

    let mut graph = Graph::new();
    let mut side = SideDataStore::new();
    sas_topo_discover::discover_expander(&mut graph, &mut side, &Trace, "/dev/smp/trace0").unwrap();

    let mut ranges: Vec<_> = graph
        .vertices()
        .filter(|(_, v)| v.kind() == VertexKind::Port)
        .filter_map(|(_, v)| match v.identity() {
            VertexIdentity::Port(_, range) => Some((range.start().0, range.end().0)),
            _ => None,
        })
        .collect();
    ranges.sort_unstable();
    assert_eq!(ranges, vec![(0, 3), (4, 5), (6, 6)]);
}

// S6 — orientation: when only E1 is reachable from an HBA, the stitcher
// draws E1 -> P1 (outbound) and P2 -> E2 (inbound) across the inter-
// expander link, keeping every target reachable from the initiator.
#[test]
fn s6_orientation_keeps_every_target_forward_reachable() {
    let (graph, _side) = fixture_graph();
    let initiator = initiator_handle(&graph);
    let reachable: std::collections::HashSet<_> = graph.reachable_from(initiator).into_iter().collect();

    let expander2 = graph
        .lookup(VertexIdentity::Address(
            VertexKind::Expander,
            SasAddress::new(sas_topo_fixture_addrs::EXPANDER2),
        ))
        .unwrap();
    assert!(reachable.contains(&expander2), "expander2 must be forward-reachable from the initiator");

    let target3 = graph
        .lookup(VertexIdentity::Address(
            VertexKind::Target,
            SasAddress::new(sas_topo_fixture_addrs::TARGET3),
        ))
        .unwrap();
    assert!(reachable.contains(&target3), "target behind expander2 must be forward-reachable");
}

#[test]
fn sas2dev_and_sas2hc_remain_unimplemented_through_the_public_api() {
    let built = fmri(0, "target", 1, Authority::new(AuthorityKind::Pathnode)).unwrap();
    assert!(matches!(sas2dev(0, &built), Err(TopoError::Unsupported("sas2dev"))));
    assert!(matches!(sas2hc(0, &built), Err(TopoError::Unsupported("sas2hc"))));
}
