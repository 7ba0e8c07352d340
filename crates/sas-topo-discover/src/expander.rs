//! C4 — Expander discovery: per-expander PHY scan via SMP, emitting
//! expander and port vertices and detecting wide ports.

use sas_topo_graph::{AttrValue, Graph, PhyId, PhyRange, SasAddress, VertexHandle, VertexKind};
use sas_topo_membrane::{Origin, PortSide, ScopedResource, SideDataStore};

use crate::error::DiscoverError;

/// An opaque handle to an open SMP target, scoped to one [`SmpTransport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmpTargetHandle(pub usize);

/// Response to the SMP **Report General** function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportGeneralResp {
    pub num_phys: u32,
    pub sas_address: SasAddress,
}

/// What the SMP **Discover** function reported about one PHY.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhyDiscovery {
    /// No device attached; never produces a vertex (§8 boundary behavior).
    Vacant,
    /// A SAS/STP end device on an expander backplane receptacle.
    EndDevice {
        attached_sas: SasAddress,
        attached_phy: u32,
        /// Inquiry-style identification data, when the SMP collaborator
        /// can supply it. Neither the real nor the fixture transport is
        /// required to know this for every device.
        target_manufacturer: Option<String>,
        target_model: Option<String>,
    },
    /// Another expander, or an initiator, possibly part of a wide port.
    ExpanderOrInitiator { attached_sas: SasAddress },
}

/// Response to the SMP **Discover** function for a single PHY.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverResp {
    pub phy: PhyDiscovery,
}

/// The SMP transport, modeled as the opaque collaborator §6.1 describes.
pub trait SmpTransport {
    fn open(&self, devfs_path: &str) -> Result<SmpTargetHandle, DiscoverError>;
    fn report_general(&self, target: SmpTargetHandle) -> Result<ReportGeneralResp, DiscoverError>;
    fn discover(&self, target: SmpTargetHandle, phy: PhyId) -> Result<DiscoverResp, DiscoverError>;
    fn close(&self, target: SmpTargetHandle);
}

/// Tracks an in-progress run of PHYs attached to the same peer SAS address
/// (§4.4 "Wide-port scanner"). A single `commit` reused both at a
/// boundary (end device / differing attached WWN) and once after the PHY
/// scan loop ends — the original's source drops the latter call; we do not
/// reproduce that bug (§9).
struct WidePortScan {
    active: Option<(SasAddress, PhyRange)>,
}

impl WidePortScan {
    fn new() -> Self {
        Self { active: None }
    }

    /// Feeds one PHY's attached address into the scan, committing the
    /// in-progress group first if `attached` differs from it.
    fn feed(&mut self, attached: SasAddress, phy: PhyId, commits: &mut Vec<(SasAddress, PhyRange)>) {
        match self.active {
            Some((wwn, range)) if wwn == attached => {
                self.active = Some((wwn, PhyRange::new(range.start(), phy)));
            }
            Some(_) => {
                self.commit(commits);
                self.active = Some((attached, PhyRange::narrow(phy)));
            }
            None => {
                self.active = Some((attached, PhyRange::narrow(phy)));
            }
        }
    }

    fn commit(&mut self, commits: &mut Vec<(SasAddress, PhyRange)>) {
        if let Some(group) = self.active.take() {
            commits.push(group);
        }
    }
}

/// Runs C4 against a single expander reached at `devfs_path`, populating
/// `graph` with the expander vertex, its narrow end-device ports, and its
/// wide-port groups (inter-expander/initiator links, left unoriented for
/// C5 to resolve).
pub fn discover_expander(
    graph: &mut Graph,
    side: &mut SideDataStore,
    smp: &dyn SmpTransport,
    devfs_path: &str,
) -> Result<(), DiscoverError> {
    let target = smp.open(devfs_path)?;
    let mut guard = ScopedResource::new(target, |t| smp.close(t));

    let report = smp.report_general(*guard.get())?;
    let expander_addr = report.sas_address;
    let expander_vtx = graph.new_vertex(VertexKind::Expander, expander_addr, None)?;
    graph
        .vertex_mut(expander_vtx)
        .attrs_mut()
        .set("devfs_name", AttrValue::Str(devfs_path.to_string()))
        .ok();
    side.insert(expander_vtx, PortSide::new(Origin::Expander, None));

    let mut scan = WidePortScan::new();
    let mut wide_groups: Vec<(SasAddress, PhyRange)> = Vec::new();

    for i in 0..report.num_phys {
        let resp = smp.discover(*guard.get(), PhyId(i))?;
        match resp.phy {
            PhyDiscovery::Vacant => continue,
            PhyDiscovery::EndDevice {
                attached_sas,
                attached_phy,
                target_manufacturer,
                target_model,
            } => {
                scan.commit(&mut wide_groups);
                emit_end_device(
                    graph,
                    side,
                    expander_vtx,
                    expander_addr,
                    PhyId(i),
                    attached_sas,
                    attached_phy,
                    target_manufacturer,
                    target_model,
                )?;
            }
            PhyDiscovery::ExpanderOrInitiator { attached_sas } => {
                scan.feed(attached_sas, PhyId(i), &mut wide_groups);
            }
        }
    }
    scan.commit(&mut wide_groups);

    for (attached_wwn, phy_range) in wide_groups {
        let port_vtx = graph.new_vertex(VertexKind::Port, expander_addr, Some(phy_range))?;
        let bag = graph.vertex_mut(port_vtx).attrs_mut();
        bag.set("local_addr", AttrValue::U64(expander_addr.raw())).ok();
        bag.set("attach_addr", AttrValue::U64(attached_wwn.raw())).ok();
        side.insert(port_vtx, PortSide::new(Origin::Expander, Some(attached_wwn)));
    }

    guard.release_now();
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn emit_end_device(
    graph: &mut Graph,
    side: &mut SideDataStore,
    expander_vtx: VertexHandle,
    expander_addr: SasAddress,
    expander_phy: PhyId,
    attached_sas: SasAddress,
    attached_phy: u32,
    target_manufacturer: Option<String>,
    target_model: Option<String>,
) -> Result<(), DiscoverError> {
    let expander_port = graph.new_vertex(
        VertexKind::Port,
        expander_addr,
        Some(PhyRange::narrow(expander_phy)),
    )?;
    {
        let bag = graph.vertex_mut(expander_port).attrs_mut();
        bag.set("local_addr", AttrValue::U64(expander_addr.raw())).ok();
        bag.set("attach_addr", AttrValue::U64(attached_sas.raw())).ok();
    }
    side.insert(
        expander_port,
        PortSide::new(Origin::Expander, Some(attached_sas)),
    );
    graph.add_edge(expander_vtx, expander_port);

    let device_port = graph.new_vertex(
        VertexKind::Port,
        attached_sas,
        Some(PhyRange::narrow(PhyId(attached_phy))),
    )?;
    {
        let bag = graph.vertex_mut(device_port).attrs_mut();
        bag.set("local_addr", AttrValue::U64(attached_sas.raw())).ok();
        bag.set("attach_addr", AttrValue::U64(expander_addr.raw())).ok();
    }
    side.insert(
        device_port,
        PortSide::new(Origin::Expander, Some(expander_addr)),
    );
    graph.add_edge(expander_port, device_port);

    let target_vtx = graph.new_vertex(VertexKind::Target, attached_sas, None)?;
    {
        let bag = graph.vertex_mut(target_vtx).attrs_mut();
        if let Some(manufacturer) = target_manufacturer {
            bag.set("manufacturer", AttrValue::Str(manufacturer)).ok();
        }
        if let Some(model) = target_model {
            bag.set("model", AttrValue::Str(model)).ok();
        }
    }
    graph.add_edge(device_port, target_vtx);
    Ok(())
}
