#![no_main]
use libfuzzer_sys::fuzz_target;

use sas_topo_discover::{
    discover_expander, DiscoverError, DiscoverResp, PhyDiscovery, ReportGeneralResp,
    SmpTargetHandle, SmpTransport,
};
use sas_topo_graph::{Graph, PhyId, SasAddress, VertexIdentity, VertexKind};
use sas_topo_membrane::SideDataStore;

const EXPANDER_ADDR: u64 = 0xE000_0000_0000_0001;

struct ScriptedSmp {
    script: Vec<PhyDiscovery>,
}

impl SmpTransport for ScriptedSmp {
    fn open(&self, _devfs_path: &str) -> Result<SmpTargetHandle, DiscoverError> {
        Ok(SmpTargetHandle(0))
    }
    fn report_general(&self, _t: SmpTargetHandle) -> Result<ReportGeneralResp, DiscoverError> {
        Ok(ReportGeneralResp {
            num_phys: self.script.len() as u32,
            sas_address: SasAddress::new(EXPANDER_ADDR),
        })
    }
    fn discover(&self, _t: SmpTargetHandle, phy: PhyId) -> Result<DiscoverResp, DiscoverError> {
        Ok(DiscoverResp {
            phy: self.script[phy.0 as usize].clone(),
        })
    }
    fn close(&self, _t: SmpTargetHandle) {}
}

// Feeds an arbitrary attached-WWN/PHY-kind sequence through expander
// discovery and checks the wide-port coalescing boundary behaviors: no
// vertex for a vacant PHY, and every resulting port's PHY range disjoint
// from every other.
fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let script: Vec<PhyDiscovery> = data
        .chunks(2)
        .take(64)
        .map(|chunk| {
            let op = chunk[0] % 3;
            let addr = u64::from(chunk.get(1).copied().unwrap_or(0));
            match op {
                0 => PhyDiscovery::Vacant,
                1 => PhyDiscovery::EndDevice {
                    attached_sas: SasAddress::new(0xD000_0000_0000_0000 + addr),
                    attached_phy: 0,
                    target_manufacturer: None,
                    target_model: None,
                },
                _ => PhyDiscovery::ExpanderOrInitiator {
                    attached_sas: SasAddress::new(0xC000_0000_0000_0000 + addr),
                },
            }
        })
        .collect();
    if script.is_empty() {
        return;
    }

    let mut graph = Graph::new();
    let mut side = SideDataStore::new();
    let smp = ScriptedSmp { script };
    if discover_expander(&mut graph, &mut side, &smp, "/dev/smp/fuzz0").is_err() {
        return;
    }

    // Only the expander's own ports are bound by contiguous-disjoint PHY
    // ranges; synthesized end-device ports share address-local range [0,0]
    // across unrelated targets and must not be mixed into this check.
    let mut ranges: Vec<(u32, u32)> = graph
        .vertices()
        .filter(|(_, v)| v.kind() == VertexKind::Port && v.sas_address() == SasAddress::new(EXPANDER_ADDR))
        .filter_map(|(_, v)| match v.identity() {
            VertexIdentity::Port(_, range) => Some((range.start().0, range.end().0)),
            _ => None,
        })
        .collect();
    ranges.sort_unstable();

    for window in ranges.windows(2) {
        let (_, prev_end) = window[0];
        let (next_start, _) = window[1];
        assert!(
            next_start > prev_end,
            "overlapping or touching port ranges from distinct groups: {window:?}"
        );
    }
});
