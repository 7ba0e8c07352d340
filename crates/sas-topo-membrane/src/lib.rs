//! Non-graph support for fabric enumeration: the environment-driven
//! [`EnumConfig`], per-vertex [`side_data`] storage, and [`guard`]'s
//! scoped-release wrapper around opaque HBA/SMP handles.

#![deny(unsafe_code)]

pub mod config;
pub mod guard;
pub mod side_data;
pub mod test_support;

pub use config::EnumConfig;
pub use guard::ScopedResource;
pub use side_data::{Origin, PortSide, SideDataStore};
