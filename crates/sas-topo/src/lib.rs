//! SAS fabric topology enumerator: discovers a SAS fabric via HBA/SMP
//! collaborators, links the discovered elements into one graph (C5), and
//! exposes the `sas://` FMRI codec as the scheme's `topo_method` table.
//!
//! `enumerate()` is the single public entry point that drives C3 through
//! C5; everything it can fail on is aggregated into [`TopoError`].

#![deny(unsafe_code)]

pub mod error;
pub mod method;

pub use error::TopoError;
pub use method::{fmri, nvl2str, sas2dev, sas2hc, str2nvl, TopoMethod};

pub use sas_topo_discover::{
    AdapterAttrs, AdapterHandle, DeviceTree, DiscoverResp, HbaLibrary, PhyDiscovery,
    PhyRecord, PortType, ReportGeneralResp, SasPortRecord, SmpTargetHandle, SmpTransport,
};
pub use sas_topo_fmri::{Authority, AuthorityKind, PathComponent, SasFmri};
pub use sas_topo_graph::{Graph, PhyId, PhyRange, SasAddress, VertexHandle, VertexIdentity, VertexKind};
pub use sas_topo_membrane::{EnumConfig, SideDataStore};

use tracing::debug;

/// Runs C3 (HBA discovery), C4 (expander discovery), and C5 (stitching)
/// against `graph`, using `hba`/`smp`/`tree` as the external collaborators.
///
/// Honors the same three environment controls the original scheme did:
/// `TOPO_SASNOENUM` skips enumeration entirely (an empty graph is returned
/// successfully); `SAS_FAKE_ENUM` builds the S1 fixture instead of calling
/// out to `hba`/`smp`/`tree` at all.
pub fn enumerate(
    graph: &mut Graph,
    side: &mut SideDataStore,
    hba: &dyn HbaLibrary,
    smp: &dyn SmpTransport,
    tree: &dyn DeviceTree,
) -> Result<(), TopoError> {
    let config = EnumConfig::current();

    if config.skip_enum {
        debug!("TOPO_SASNOENUM set, skipping enumeration");
        return Ok(());
    }

    if config.use_fake {
        debug!("SAS_FAKE_ENUM set, building the hard-coded fixture topology");
        return enumerate_fixture(graph, side);
    }

    sas_topo_discover::discover_hbas(graph, side, hba)?;
    for path in sas_topo_discover::devtree::expander_devfs_paths(tree)? {
        sas_topo_discover::discover_expander(graph, side, smp, &path)?;
    }
    sas_topo_stitch::stitch(graph, side)?;
    Ok(())
}

/// Builds and stitches the hard-coded S1 fixture topology directly,
/// bypassing the `hba`/`smp`/`tree` collaborators entirely — the Rust
/// analogue of the original's `SAS_FAKE_ENUM` shortcut.
pub fn enumerate_fixture(graph: &mut Graph, side: &mut SideDataStore) -> Result<(), TopoError> {
    use sas_topo_discover::fixture::{self, FixtureHba, FixtureSmp};

    let hba = FixtureHba;
    let smp = FixtureSmp::new();
    sas_topo_discover::discover_hbas(graph, side, &hba)?;
    for path in fixture::expander_devfs_paths() {
        sas_topo_discover::discover_expander(graph, side, &smp, path)?;
    }
    sas_topo_stitch::stitch(graph, side)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumerate_honors_topo_sasnoenum() {
        let _lock = sas_topo_membrane::test_support::env_lock();
        // SAFETY: serialized by the env lock above; no other thread in this
        // process reads or writes TOPO_SASNOENUM concurrently.
        unsafe {
            std::env::set_var("TOPO_SASNOENUM", "1");
        }
        sas_topo_membrane::EnumConfig::reset_for_test();

        let mut graph = Graph::new();
        let mut side = SideDataStore::new();
        struct NoCalls;
        impl HbaLibrary for NoCalls {
            fn num_adapters(&self) -> usize {
                panic!("must not be called when enumeration is disabled");
            }
            fn adapter_name(&self, _i: usize) -> Result<String, sas_topo_discover::DiscoverError> {
                unreachable!()
            }
            fn open(&self, _name: &str) -> Result<AdapterHandle, sas_topo_discover::DiscoverError> {
                unreachable!()
            }
            fn adapter_attrs(
                &self,
                _h: AdapterHandle,
            ) -> Result<AdapterAttrs, sas_topo_discover::DiscoverError> {
                unreachable!()
            }
            fn num_ports(&self, _h: AdapterHandle) -> Result<usize, sas_topo_discover::DiscoverError> {
                unreachable!()
            }
            fn port_attrs(
                &self,
                _h: AdapterHandle,
                _j: usize,
            ) -> Result<SasPortRecord, sas_topo_discover::DiscoverError> {
                unreachable!()
            }
            fn phy_attrs(
                &self,
                _h: AdapterHandle,
                _j: usize,
                _k: usize,
            ) -> Result<PhyRecord, sas_topo_discover::DiscoverError> {
                unreachable!()
            }
        }
        struct NoSmp;
        impl SmpTransport for NoSmp {
            fn open(&self, _p: &str) -> Result<SmpTargetHandle, sas_topo_discover::DiscoverError> {
                unreachable!()
            }
            fn report_general(
                &self,
                _t: SmpTargetHandle,
            ) -> Result<ReportGeneralResp, sas_topo_discover::DiscoverError> {
                unreachable!()
            }
            fn discover(
                &self,
                _t: SmpTargetHandle,
                _phy: PhyId,
            ) -> Result<DiscoverResp, sas_topo_discover::DiscoverError> {
                unreachable!()
            }
            fn close(&self, _t: SmpTargetHandle) {
                unreachable!()
            }
        }
        struct NoTree;
        impl DeviceTree for NoTree {
            fn smp_children(&self) -> Result<Vec<String>, sas_topo_discover::DiscoverError> {
                unreachable!()
            }
        }

        enumerate(&mut graph, &mut side, &NoCalls, &NoSmp, &NoTree).unwrap();
        assert_eq!(graph.vertex_count(), 0);

        // SAFETY: still serialized by the env lock.
        unsafe {
            std::env::remove_var("TOPO_SASNOENUM");
        }
        sas_topo_membrane::EnumConfig::reset_for_test();
    }

    #[test]
    fn enumerate_fixture_matches_s1() {
        let mut graph = Graph::new();
        let mut side = SideDataStore::new();
        enumerate_fixture(&mut graph, &mut side).unwrap();

        let initiator = graph
            .lookup(sas_topo_graph::VertexIdentity::Address(
                VertexKind::Initiator,
                SasAddress::new(sas_topo_discover::fixture::INITIATOR_ADDR),
            ))
            .unwrap();
        let reachable = graph.reachable_from(initiator);
        let targets = reachable
            .iter()
            .filter(|&&h| graph.vertex(h).kind() == VertexKind::Target)
            .count();
        assert_eq!(targets, 3);
    }
}
