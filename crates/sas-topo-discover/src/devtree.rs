//! Device-tree walk (§6.1): lists the `smp` driver node's children so the
//! caller can open each expander in turn.

use crate::error::DiscoverError;

/// The device-tree collaborator, modeled as the opaque walker §6.1
/// describes: enumerate the children of the `smp` driver node.
pub trait DeviceTree {
    fn smp_children(&self) -> Result<Vec<String>, DiscoverError>;
}

/// Builds the fully qualified SMP open paths for every child the device
/// tree reports (`"/devices" + devfs_path + ":smp"`, per §6.1).
pub fn expander_devfs_paths(tree: &dyn DeviceTree) -> Result<Vec<String>, DiscoverError> {
    Ok(tree
        .smp_children()?
        .into_iter()
        .map(|child| format!("/devices{child}:smp"))
        .collect())
}
