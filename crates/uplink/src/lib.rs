//! Thin typed client for the NIBE Uplink v1 REST API.

pub mod client;
pub mod types;

pub use {
    client::UplinkClient,
    types::{
        Category, CategoryTree, Parameter, System, SystemTree, SystemUnit, SystemsPage, UnitTree,
    },
};
