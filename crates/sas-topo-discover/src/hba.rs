//! C3 — HBA discovery: initiators and their outgoing ports.
//!
//! `HbaLibrary` is the opaque collaborator from §6.1; production callers
//! would back it with the real SMHBA FFI, out of scope for this core. The
//! fixture module supplies an in-memory implementation for tests.

use tracing::debug;

use sas_topo_graph::{AttrValue, Graph, PhyId, PhyRange, SasAddress, VertexKind};
use sas_topo_membrane::{Origin, PortSide, SideDataStore};

use crate::error::DiscoverError;

/// An opaque handle to an adapter, scoped to one [`HbaLibrary`] instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterHandle(pub usize);

/// Adapter-level attributes (§4.3: "Initiator attribute group").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterAttrs {
    pub manufacturer: String,
    pub model: String,
    pub serial: String,
}

/// Whether an HBA port connects directly to a single SAS/STP device or to
/// something else (typically an expander, discovered separately via SMP).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortType {
    SasDevice,
    Other,
}

/// One SAS port reported by an adapter (SMHBA's `SMHBA_SAS_PORT`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SasPortRecord {
    pub local_sas: SasAddress,
    pub attached_sas: Option<SasAddress>,
    pub num_phys: usize,
    pub port_type: PortType,
    pub num_discovered_ports: usize,
    /// Inquiry-style identification for the attached device, when the
    /// HBA library can supply it alongside the `SAS_DEVICE` attachment.
    pub target_manufacturer: Option<String>,
    pub target_model: Option<String>,
}

/// A single PHY's identifier, as read off an adapter port (SMHBA's
/// `SMHBA_SAS_PHY`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhyRecord {
    pub phy_identifier: u32,
}

/// The HBA management library, modeled as the opaque collaborator §6.1
/// describes: load/unload, enumerate adapters, enumerate each adapter's
/// ports and PHYs.
pub trait HbaLibrary {
    fn num_adapters(&self) -> usize;
    fn adapter_name(&self, i: usize) -> Result<String, DiscoverError>;
    fn open(&self, name: &str) -> Result<AdapterHandle, DiscoverError>;
    fn adapter_attrs(&self, handle: AdapterHandle) -> Result<AdapterAttrs, DiscoverError>;
    fn num_ports(&self, handle: AdapterHandle) -> Result<usize, DiscoverError>;
    fn port_attrs(&self, handle: AdapterHandle, port: usize) -> Result<SasPortRecord, DiscoverError>;
    fn phy_attrs(
        &self,
        handle: AdapterHandle,
        port: usize,
        phy: usize,
    ) -> Result<PhyRecord, DiscoverError>;
}

/// Computes a port's PHY range by reading its PHYs in discovery order: the
/// first PHY read is `start_phy`, the last is `end_phy` (§4.3 step 2).
fn port_phy_range(
    hba: &dyn HbaLibrary,
    handle: AdapterHandle,
    port: usize,
    num_phys: usize,
) -> Result<PhyRange, DiscoverError> {
    let first = hba.phy_attrs(handle, port, 0)?;
    let last = hba.phy_attrs(handle, port, num_phys - 1)?;
    Ok(PhyRange::new(
        PhyId(first.phy_identifier),
        PhyId(last.phy_identifier),
    ))
}

/// Runs C3 against every adapter `hba` reports, populating `graph` with one
/// initiator vertex per adapter, one port vertex per adapter port, and (when
/// a port is a lone SAS device attachment) the attached target's vertices.
pub fn discover_hbas(
    graph: &mut Graph,
    side: &mut SideDataStore,
    hba: &dyn HbaLibrary,
) -> Result<(), DiscoverError> {
    for i in 0..hba.num_adapters() {
        let name = hba.adapter_name(i)?;
        let handle = hba.open(&name)?;
        let attrs = hba.adapter_attrs(handle)?;
        let num_ports = hba.num_ports(handle)?;

        let mut initiator: Option<sas_topo_graph::VertexHandle> = None;

        for j in 0..num_ports {
            let port_rec = hba.port_attrs(handle, j)?;
            let phy_range = port_phy_range(hba, handle, j, port_rec.num_phys)?;

            let port_vtx = graph.new_vertex(VertexKind::Port, port_rec.local_sas, Some(phy_range))?;
            graph
                .vertex_mut(port_vtx)
                .attrs_mut()
                .set("local_addr", AttrValue::U64(port_rec.local_sas.raw()))
                .ok();
            if let Some(attached) = port_rec.attached_sas {
                graph
                    .vertex_mut(port_vtx)
                    .attrs_mut()
                    .set("attach_addr", AttrValue::U64(attached.raw()))
                    .ok();
            }
            side.insert(port_vtx, PortSide::new(Origin::Hba, port_rec.attached_sas));

            let initiator_vtx = match initiator {
                Some(h) => h,
                None => {
                    let h = graph.new_vertex(VertexKind::Initiator, port_rec.local_sas, None)?;
                    let bag = graph.vertex_mut(h).attrs_mut();
                    bag.set("manufacturer", AttrValue::Str(attrs.manufacturer.clone()))
                        .ok();
                    bag.set("model", AttrValue::Str(attrs.model.clone())).ok();
                    bag.set("serial", AttrValue::Str(attrs.serial.clone())).ok();
                    initiator = Some(h);
                    h
                }
            };
            graph.add_edge(initiator_vtx, port_vtx);

            if matches!(port_rec.port_type, PortType::SasDevice) && port_rec.num_discovered_ports == 1
            {
                if let Some(attached) = port_rec.attached_sas {
                    let narrow = PhyRange::narrow(PhyId(0));
                    let dev_port = graph.new_vertex(VertexKind::Port, attached, Some(narrow))?;
                    let dp_bag = graph.vertex_mut(dev_port).attrs_mut();
                    dp_bag.set("local_addr", AttrValue::U64(attached.raw())).ok();
                    dp_bag
                        .set("attach_addr", AttrValue::U64(port_rec.local_sas.raw()))
                        .ok();

                    let target = graph.new_vertex(VertexKind::Target, attached, None)?;
                    let tgt_bag = graph.vertex_mut(target).attrs_mut();
                    if let Some(manufacturer) = port_rec.target_manufacturer.clone() {
                        tgt_bag.set("manufacturer", AttrValue::Str(manufacturer)).ok();
                    }
                    if let Some(model) = port_rec.target_model.clone() {
                        tgt_bag.set("model", AttrValue::Str(model)).ok();
                    }

                    graph.add_edge(port_vtx, dev_port);
                    graph.add_edge(dev_port, target);
                } else {
                    debug!(port = j, "SAS_DEVICE port with no attached address, skipping");
                }
            }
        }
    }
    Ok(())
}
