#![forbid(unsafe_code)]

//! Parent/child index over a flat node list.
//!
//! Built once per layout pass (and reused by the engine for navigation), so
//! child lookups are O(1) instead of scanning the whole list per node.

use mindcanvas_model::{Node, NodeId};
use std::collections::HashMap;

/// Read-only tree view over a borrowed node slice.
#[derive(Debug)]
pub struct TreeIndex<'a> {
    nodes: &'a [Node],
    by_id: HashMap<NodeId, usize>,
    children: HashMap<NodeId, Vec<usize>>,
    roots: Vec<usize>,
}

impl<'a> TreeIndex<'a> {
    /// Build the index. Children and roots are ordered by `sort_order`
    /// (ties broken by id, so the order is total).
    #[must_use]
    pub fn new(nodes: &'a [Node]) -> Self {
        let by_id: HashMap<NodeId, usize> =
            nodes.iter().enumerate().map(|(i, n)| (n.id, i)).collect();

        let mut children: HashMap<NodeId, Vec<usize>> = HashMap::new();
        let mut roots: Vec<usize> = Vec::new();
        for (i, node) in nodes.iter().enumerate() {
            match node.parent_id {
                Some(parent) => children.entry(parent).or_default().push(i),
                None => roots.push(i),
            }
        }

        let order = |&i: &usize| (nodes[i].sort_order, nodes[i].id);
        for kids in children.values_mut() {
            kids.sort_by_key(order);
        }
        roots.sort_by_key(order);

        Self {
            nodes,
            by_id,
            children,
            roots,
        }
    }

    /// Look up a node by id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&'a Node> {
        self.by_id.get(&id).map(|&i| &self.nodes[i])
    }

    /// The tree's anchor: the first root in sibling order.
    #[must_use]
    pub fn root(&self) -> Option<&'a Node> {
        self.roots.first().map(|&i| &self.nodes[i])
    }

    /// Children of a node in sibling order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &'a Node> + '_ {
        self.children
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(|&i| &self.nodes[i])
    }

    /// Children visible under layout: none if the parent is collapsed.
    pub fn visible_children(&self, parent: &Node) -> impl Iterator<Item = &'a Node> + '_ {
        let kids = if parent.is_collapsed {
            &[]
        } else {
            self.children
                .get(&parent.id)
                .map(Vec::as_slice)
                .unwrap_or_default()
        };
        kids.iter().map(|&i| &self.nodes[i])
    }

    /// Whether `ancestor` lies on the parent chain of `id`.
    ///
    /// Walks upward with a step bound so a corrupted parent cycle cannot
    /// hang the caller.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.node(id).and_then(|n| n.parent_id);
        let mut steps = 0;
        while let Some(cur) = current {
            if cur == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.nodes.len() {
                return false;
            }
            current = self.node(cur).and_then(|n| n.parent_id);
        }
        false
    }

    /// Ids of `id` and all its descendants, parents before children.
    /// Collapsed flags are ignored; this is the structural subtree.
    #[must_use]
    pub fn subtree_ids(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = vec![id];
        let mut i = 0;
        while i < out.len() {
            let cur = out[i];
            if let Some(kids) = self.children.get(&cur) {
                out.extend(kids.iter().map(|&k| self.nodes[k].id));
            }
            i += 1;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::node;

    #[test]
    fn children_sorted_by_sort_order() {
        let nodes = vec![
            node(1, None, "root", 0),
            node(3, Some(1), "b", 2),
            node(2, Some(1), "a", 1),
        ];
        let tree = TreeIndex::new(&nodes);
        let kids: Vec<NodeId> = tree.children(NodeId(1)).map(|n| n.id).collect();
        assert_eq!(kids, vec![NodeId(2), NodeId(3)]);
    }

    #[test]
    fn root_is_first_by_sort_order() {
        let nodes = vec![node(5, None, "late", 3), node(1, None, "first", 0)];
        let tree = TreeIndex::new(&nodes);
        assert_eq!(tree.root().unwrap().id, NodeId(1));
    }

    #[test]
    fn collapsed_parent_hides_children() {
        let mut nodes = vec![node(1, None, "root", 0), node(2, Some(1), "a", 0)];
        nodes[0].is_collapsed = true;
        let tree = TreeIndex::new(&nodes);
        let root = tree.node(NodeId(1)).unwrap();
        assert_eq!(tree.visible_children(root).count(), 0);
        // The structural view still sees them.
        assert_eq!(tree.children(NodeId(1)).count(), 1);
    }

    #[test]
    fn ancestor_walk() {
        let nodes = vec![
            node(1, None, "root", 0),
            node(2, Some(1), "a", 0),
            node(3, Some(2), "b", 0),
        ];
        let tree = TreeIndex::new(&nodes);
        assert!(tree.is_ancestor(NodeId(1), NodeId(3)));
        assert!(tree.is_ancestor(NodeId(2), NodeId(3)));
        assert!(!tree.is_ancestor(NodeId(3), NodeId(1)));
        assert!(!tree.is_ancestor(NodeId(3), NodeId(3)));
    }

    #[test]
    fn subtree_is_preorder() {
        let nodes = vec![
            node(1, None, "root", 0),
            node(2, Some(1), "a", 0),
            node(3, Some(1), "b", 1),
            node(4, Some(2), "c", 0),
        ];
        let tree = TreeIndex::new(&nodes);
        assert_eq!(
            tree.subtree_ids(NodeId(1)),
            vec![NodeId(1), NodeId(2), NodeId(3), NodeId(4)]
        );
        assert_eq!(tree.subtree_ids(NodeId(2)), vec![NodeId(2), NodeId(4)]);
    }
}
