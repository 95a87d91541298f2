#![forbid(unsafe_code)]

//! In-memory [`NodeStore`] backend.
//!
//! Reference implementation of the storage contract; also what the engine
//! tests run against. Ids are allocated monotonically and never reused
//! except through [`NodeStore::restore_node`].

use crate::node::{MapId, Node, NodeId, NodeStyle};
use crate::settings::{MapSettings, MindMap};
use crate::store::{NodeStore, StoreError};
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Clone)]
struct MapRecord {
    name: String,
    settings: MapSettings,
}

/// An in-memory document store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    maps: BTreeMap<MapId, MapRecord>,
    nodes: BTreeMap<NodeId, Node>,
    notes: HashMap<NodeId, String>,
    next_map_id: i64,
    next_node_id: i64,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new map with a root node.
    pub fn create_map(&mut self, name: &str) -> MindMap {
        self.next_map_id += 1;
        let id = MapId(self.next_map_id);
        let settings = MapSettings::default();
        self.maps.insert(
            id,
            MapRecord {
                name: name.to_string(),
                settings: settings.clone(),
            },
        );
        self.insert_node(id, None, "Central Topic", 0);
        MindMap {
            id,
            name: name.to_string(),
            settings,
        }
    }

    fn alloc_node_id(&mut self) -> NodeId {
        self.next_node_id += 1;
        NodeId(self.next_node_id)
    }

    fn insert_node(
        &mut self,
        map: MapId,
        parent: Option<NodeId>,
        text: &str,
        sort_order: i64,
    ) -> Node {
        let id = self.alloc_node_id();
        let node = Node {
            id,
            map_id: map,
            parent_id: parent,
            text: text.to_string(),
            position: None,
            is_collapsed: false,
            sort_order,
            style: NodeStyle::default(),
        };
        self.nodes.insert(id, node.clone());
        node
    }

    fn children_of(&self, map: MapId, parent: Option<NodeId>) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|n| n.map_id == map && n.parent_id == parent)
            .map(|n| n.id)
            .collect()
    }

    /// Ids of `id` and every descendant, parents before children.
    fn subtree_ids(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = vec![id];
        let mut i = 0;
        while i < out.len() {
            let cur = out[i];
            let mut kids: Vec<&Node> = self
                .nodes
                .values()
                .filter(|n| n.parent_id == Some(cur))
                .collect();
            kids.sort_by_key(|n| (n.sort_order, n.id));
            out.extend(kids.iter().map(|n| n.id));
            i += 1;
        }
        out
    }
}

impl NodeStore for MemoryStore {
    fn map(&self, map: MapId) -> Result<Option<MindMap>, StoreError> {
        Ok(self.maps.get(&map).map(|rec| MindMap {
            id: map,
            name: rec.name.clone(),
            settings: rec.settings.clone(),
        }))
    }

    fn nodes_for_map(&self, map: MapId) -> Result<Vec<Node>, StoreError> {
        if !self.maps.contains_key(&map) {
            return Err(StoreError::MapNotFound(map));
        }
        let mut nodes: Vec<Node> = self
            .nodes
            .values()
            .filter(|n| n.map_id == map)
            .cloned()
            .collect();
        nodes.sort_by_key(|n| (n.sort_order, n.id));
        Ok(nodes)
    }

    fn node(&self, id: NodeId) -> Result<Option<Node>, StoreError> {
        Ok(self.nodes.get(&id).cloned())
    }

    fn create_node(
        &mut self,
        map: MapId,
        parent: Option<NodeId>,
        text: &str,
        after: Option<NodeId>,
    ) -> Result<Node, StoreError> {
        if !self.maps.contains_key(&map) {
            return Err(StoreError::MapNotFound(map));
        }
        if let Some(p) = parent
            && !self.nodes.contains_key(&p)
        {
            return Err(StoreError::NodeNotFound(p));
        }

        let sort_order = match after.and_then(|id| self.nodes.get(&id)) {
            Some(anchor) => {
                let order = anchor.sort_order + 1;
                // Shift later siblings down to open a slot.
                for sibling in self.children_of(map, parent) {
                    let n = self.nodes.get_mut(&sibling).expect("sibling exists");
                    if n.sort_order >= order {
                        n.sort_order += 1;
                    }
                }
                order
            }
            None => self
                .children_of(map, parent)
                .iter()
                .filter_map(|id| self.nodes.get(id))
                .map(|n| n.sort_order)
                .max()
                .map_or(0, |max| max + 1),
        };

        Ok(self.insert_node(map, parent, text, sort_order))
    }

    fn update_node(&mut self, node: &Node) -> Result<(), StoreError> {
        match self.nodes.get_mut(&node.id) {
            Some(slot) => {
                *slot = node.clone();
                Ok(())
            }
            None => Err(StoreError::NodeNotFound(node.id)),
        }
    }

    fn delete_node(&mut self, id: NodeId) -> Result<(), StoreError> {
        if !self.nodes.contains_key(&id) {
            return Err(StoreError::NodeNotFound(id));
        }
        for victim in self.subtree_ids(id) {
            self.nodes.remove(&victim);
            self.notes.remove(&victim);
        }
        Ok(())
    }

    fn restore_node(&mut self, node: &Node) -> Result<(), StoreError> {
        if self.nodes.contains_key(&node.id) {
            return Err(StoreError::IdInUse(node.id));
        }
        self.nodes.insert(node.id, node.clone());
        // Keep the allocator ahead of restored ids.
        self.next_node_id = self.next_node_id.max(node.id.0);
        Ok(())
    }

    fn set_map_settings(&mut self, map: MapId, settings: &MapSettings) -> Result<(), StoreError> {
        match self.maps.get_mut(&map) {
            Some(rec) => {
                rec.settings = settings.clone();
                Ok(())
            }
            None => Err(StoreError::MapNotFound(map)),
        }
    }

    fn note(&self, node: NodeId) -> Result<Option<String>, StoreError> {
        Ok(self.notes.get(&node).cloned())
    }

    fn set_note(&mut self, node: NodeId, content: &str) -> Result<(), StoreError> {
        if !self.nodes.contains_key(&node) {
            return Err(StoreError::NodeNotFound(node));
        }
        self.notes.insert(node, content.to_string());
        Ok(())
    }

    fn delete_note(&mut self, node: NodeId) -> Result<(), StoreError> {
        self.notes.remove(&node);
        Ok(())
    }

    fn node_ids_with_notes(&self, map: MapId) -> Result<HashSet<NodeId>, StoreError> {
        Ok(self
            .notes
            .iter()
            .filter(|(id, content)| {
                !content.is_empty()
                    && self.nodes.get(id).is_some_and(|n| n.map_id == map)
            })
            .map(|(id, _)| *id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_map() -> (MemoryStore, MindMap, Node) {
        let mut store = MemoryStore::new();
        let map = store.create_map("Test");
        let root = store.nodes_for_map(map.id).unwrap()[0].clone();
        (store, map, root)
    }

    #[test]
    fn new_map_has_root() {
        let (store, map, root) = store_with_map();
        assert!(root.is_root());
        assert_eq!(root.text, "Central Topic");
        assert_eq!(store.nodes_for_map(map.id).unwrap().len(), 1);
    }

    #[test]
    fn create_appends_after_siblings() {
        let (mut store, map, root) = store_with_map();
        let a = store.create_node(map.id, Some(root.id), "a", None).unwrap();
        let b = store.create_node(map.id, Some(root.id), "b", None).unwrap();
        assert!(a.sort_order < b.sort_order);
    }

    #[test]
    fn create_after_shifts_following_siblings() {
        let (mut store, map, root) = store_with_map();
        let a = store.create_node(map.id, Some(root.id), "a", None).unwrap();
        let b = store.create_node(map.id, Some(root.id), "b", None).unwrap();
        let mid = store
            .create_node(map.id, Some(root.id), "mid", Some(a.id))
            .unwrap();
        assert_eq!(mid.sort_order, a.sort_order + 1);
        let b_now = store.node(b.id).unwrap().unwrap();
        assert!(b_now.sort_order > mid.sort_order);
    }

    #[test]
    fn delete_cascades_to_descendants_and_notes() {
        let (mut store, map, root) = store_with_map();
        let child = store
            .create_node(map.id, Some(root.id), "child", None)
            .unwrap();
        let grandchild = store
            .create_node(map.id, Some(child.id), "grandchild", None)
            .unwrap();
        store.set_note(grandchild.id, "remember").unwrap();

        store.delete_node(child.id).unwrap();
        assert!(store.node(child.id).unwrap().is_none());
        assert!(store.node(grandchild.id).unwrap().is_none());
        assert!(store.note(grandchild.id).unwrap().is_none());
        assert!(store.node(root.id).unwrap().is_some());
    }

    #[test]
    fn restore_preserves_id_and_rejects_live_id() {
        let (mut store, map, root) = store_with_map();
        let child = store
            .create_node(map.id, Some(root.id), "child", None)
            .unwrap();
        store.delete_node(child.id).unwrap();

        store.restore_node(&child).unwrap();
        assert_eq!(store.node(child.id).unwrap().unwrap().text, "child");
        assert_eq!(store.restore_node(&child), Err(StoreError::IdInUse(child.id)));

        // The allocator must not hand the restored id out again.
        let fresh = store.create_node(map.id, Some(root.id), "x", None).unwrap();
        assert_ne!(fresh.id, child.id);
    }

    #[test]
    fn settings_persist_per_map() {
        let (mut store, map, _) = store_with_map();
        let mut settings = MapSettings::default();
        settings.auto_layout = false;
        settings.zoom_level = 2.0;
        store.set_map_settings(map.id, &settings).unwrap();
        let loaded = store.map(map.id).unwrap().unwrap();
        assert_eq!(loaded.settings, settings);
    }

    #[test]
    fn notes_index_skips_empty() {
        let (mut store, map, root) = store_with_map();
        let child = store
            .create_node(map.id, Some(root.id), "child", None)
            .unwrap();
        store.set_note(root.id, "has content").unwrap();
        store.set_note(child.id, "").unwrap();
        let ids = store.node_ids_with_notes(map.id).unwrap();
        assert!(ids.contains(&root.id));
        assert!(!ids.contains(&child.id));
    }

    #[test]
    fn missing_map_and_node_errors() {
        let mut store = MemoryStore::new();
        assert_eq!(
            store.nodes_for_map(MapId(99)),
            Err(StoreError::MapNotFound(MapId(99)))
        );
        assert_eq!(
            store.create_node(MapId(99), None, "x", None),
            Err(StoreError::MapNotFound(MapId(99)))
        );
        assert_eq!(
            store.delete_node(NodeId(7)),
            Err(StoreError::NodeNotFound(NodeId(7)))
        );
    }
}
