#![forbid(unsafe_code)]

//! The storage seam between the engine and whatever persists the document.
//!
//! Backends own id allocation and sibling ordering so that concurrent
//! writers (or a SQL backend using autoincrement) stay consistent; the
//! engine treats returned records as authoritative.

use crate::node::{MapId, Node, NodeId};
use crate::settings::{MapSettings, MindMap};
use std::collections::HashSet;
use std::fmt;

/// Errors surfaced by a [`NodeStore`] backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The referenced node does not exist.
    NodeNotFound(NodeId),
    /// The referenced map does not exist.
    MapNotFound(MapId),
    /// A restore tried to reuse an id that is still live.
    IdInUse(NodeId),
    /// Backend-specific failure (I/O, database, ...).
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NodeNotFound(id) => write!(f, "node {id} not found"),
            StoreError::MapNotFound(id) => write!(f, "map {id} not found"),
            StoreError::IdInUse(id) => write!(f, "node id {id} already in use"),
            StoreError::Backend(msg) => write!(f, "storage backend error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Storage collaborator for the canvas engine.
///
/// Implementations must uphold two invariants the engine relies on:
///
/// - [`delete_node`](NodeStore::delete_node) cascades to all descendants
///   (and their notes).
/// - [`restore_node`](NodeStore::restore_node) is id-preserving, so undo can
///   bring a deleted subtree back under its original ids.
pub trait NodeStore {
    /// Fetch a map header, or `None` if it does not exist.
    fn map(&self, map: MapId) -> Result<Option<MindMap>, StoreError>;

    /// All nodes of a map, ordered by `sort_order`.
    fn nodes_for_map(&self, map: MapId) -> Result<Vec<Node>, StoreError>;

    /// Fetch a single node, or `None` if it does not exist.
    fn node(&self, id: NodeId) -> Result<Option<Node>, StoreError>;

    /// Create a node and return the stored record (with its allocated id).
    ///
    /// When `after` names an existing sibling the new node is ordered
    /// directly after it and later siblings shift down; otherwise it goes
    /// last among its siblings.
    fn create_node(
        &mut self,
        map: MapId,
        parent: Option<NodeId>,
        text: &str,
        after: Option<NodeId>,
    ) -> Result<Node, StoreError>;

    /// Overwrite a node record in place.
    fn update_node(&mut self, node: &Node) -> Result<(), StoreError>;

    /// Delete a node and every descendant, cascading to notes.
    fn delete_node(&mut self, id: NodeId) -> Result<(), StoreError>;

    /// Re-insert a previously deleted node under its original id.
    fn restore_node(&mut self, node: &Node) -> Result<(), StoreError>;

    /// Persist a map's settings.
    fn set_map_settings(&mut self, map: MapId, settings: &MapSettings) -> Result<(), StoreError>;

    /// Fetch the note attached to a node, if any.
    fn note(&self, node: NodeId) -> Result<Option<String>, StoreError>;

    /// Attach or replace the note on a node.
    fn set_note(&mut self, node: NodeId, content: &str) -> Result<(), StoreError>;

    /// Remove the note from a node. Removing a missing note is not an error.
    fn delete_note(&mut self, node: NodeId) -> Result<(), StoreError>;

    /// Ids of every node in the map carrying a non-empty note.
    fn node_ids_with_notes(&self, map: MapId) -> Result<HashSet<NodeId>, StoreError>;
}
