#![forbid(unsafe_code)]

//! Document model: nodes, styles, map settings, and the storage seam.
//!
//! The engine never talks to a database directly. It goes through the
//! [`NodeStore`] trait, which any backend can implement; [`MemoryStore`] is
//! the reference implementation and what the tests use.

pub mod memory;
pub mod node;
pub mod settings;
pub mod store;

pub use memory::MemoryStore;
pub use node::{MapId, Node, NodeId, NodeStyle, Priority, Status};
pub use settings::{LayoutMode, MapSettings, MindMap};
pub use store::{NodeStore, StoreError};
