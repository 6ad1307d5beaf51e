use std::cmp::Ordering;
use std::mem;

use generational_arena::Arena;
use tracing::{debug, instrument};

use crate::node::{Node, NodeId, Record};

/// Order in which [`Tree::traversal`] visits nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TraversalOrder {
    /// Node before its children
    #[default]
    PreOrder,
    /// Node after all of its descendants
    PostOrder,
}

/// Arena-based N-ary tree of records.
///
/// Every node lives in a generational arena and refers to its parent and
/// children by [`NodeId`]. The parent owns its children: detaching a node
/// frees its whole subtree.
///
/// All predicate-based operations search depth-first in pre-order from the
/// root and act on the first match. An empty tree never matches.
#[derive(Debug, Clone)]
pub struct Tree {
    /// Arena storage for all tree nodes
    arena: Arena<Node>,
    /// Handle of the root node, None for empty trees
    root: Option<NodeId>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Record> for Tree {
    fn from(record: Record) -> Self {
        Self::with_root(record)
    }
}

impl Tree {
    /// Creates an empty tree. The first [`Tree::add`] installs the root.
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    pub fn with_root(record: Record) -> Self {
        let mut tree = Self::new();
        tree.install_root(record);
        tree
    }

    fn install_root(&mut self, record: Record) -> NodeId {
        let idx = self
            .arena
            .insert_with(|idx| Node::new(NodeId(idx), record, None));
        let id = NodeId(idx);
        self.root = Some(id);
        id
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn root_node(&self) -> Option<&Node> {
        self.root.and_then(|id| self.node(id))
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id.0)
    }

    /// Mutable access to a node. Only the record can be changed through it.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.arena.get_mut(id.0)
    }

    pub fn parent_of(&self, id: NodeId) -> Option<&Node> {
        self.node(id)
            .and_then(|node| node.parent)
            .and_then(|parent| self.node(parent))
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Drops every node, leaving an empty tree.
    #[instrument(level = "debug", skip(self))]
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
    }

    /// Adds `record` as the last child of the first node matching `parent`.
    ///
    /// On an empty tree the predicate is ignored and `record` becomes the
    /// root. When nothing matches the tree is left unchanged.
    #[instrument(level = "trace", skip(self, parent))]
    pub fn add<P>(&mut self, parent: P, record: Record) -> &mut Self
    where
        P: FnMut(&Node) -> bool,
    {
        if self.root.is_none() {
            self.install_root(record);
            return self;
        }
        match self.find(parent) {
            Some(parent_id) => {
                self.insert(parent_id, record);
            }
            None => debug!("no parent matched, record not inserted"),
        }
        self
    }

    /// Appends `record` as the last child of `parent`.
    ///
    /// Returns the new node's handle, or None if `parent` does not resolve.
    #[instrument(level = "trace", skip(self))]
    pub fn insert(&mut self, parent: NodeId, record: Record) -> Option<NodeId> {
        if !self.arena.contains(parent.0) {
            return None;
        }
        let idx = self
            .arena
            .insert_with(|idx| Node::new(NodeId(idx), record, Some(parent)));
        let id = NodeId(idx);
        if let Some(parent) = self.arena.get_mut(parent.0) {
            parent.children.push(id);
        }
        Some(id)
    }

    /// Handle of the first node, in pre-order, for which `predicate` holds.
    #[instrument(level = "trace", skip(self, predicate))]
    pub fn find<P>(&self, mut predicate: P) -> Option<NodeId>
    where
        P: FnMut(&Node) -> bool,
    {
        self.iter()
            .find(|(_, node)| predicate(node))
            .map(|(id, _)| id)
    }

    /// First node, in pre-order, for which `predicate` holds.
    pub fn contains<P>(&self, predicate: P) -> Option<&Node>
    where
        P: FnMut(&Node) -> bool,
    {
        self.find(predicate).and_then(|id| self.node(id))
    }

    /// Detaches the first matching node together with its subtree.
    ///
    /// The root is never removed: a matching root yields `false` and the tree
    /// is left unchanged. Use [`Tree::clear`] to empty the tree.
    #[instrument(level = "trace", skip(self, predicate))]
    pub fn remove<P>(&mut self, predicate: P) -> bool
    where
        P: FnMut(&Node) -> bool,
    {
        match self.find(predicate) {
            Some(id) => self.remove_node(id),
            None => false,
        }
    }

    /// Detaches `id` and frees it and all its descendants.
    #[instrument(level = "trace", skip(self))]
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let Some(node) = self.arena.get(id.0) else {
            return false;
        };
        let Some(parent) = node.parent else {
            debug!("refusing to remove root node {}", id);
            return false;
        };
        if let Some(parent) = self.arena.get_mut(parent.0) {
            parent.children.retain(|&child| child != id);
        }

        let mut stack = vec![id];
        let mut freed = 0usize;
        while let Some(current) = stack.pop() {
            if let Some(node) = self.arena.remove(current.0) {
                stack.extend(node.children);
                freed += 1;
            }
        }
        debug!("removed subtree at {} ({} nodes)", id, freed);
        true
    }

    /// Moves the node matching `search`, with its subtree, to the end of the
    /// children of the node matching `destination`.
    ///
    /// Returns `false` if either side is not found, or if the destination is
    /// the source itself or one of its descendants.
    #[instrument(level = "trace", skip(self, search, destination))]
    pub fn move_node<S, D>(&mut self, search: S, destination: D) -> bool
    where
        S: FnMut(&Node) -> bool,
        D: FnMut(&Node) -> bool,
    {
        let (Some(source), Some(target)) = (self.find(search), self.find(destination)) else {
            return false;
        };
        self.relocate(source, target)
    }

    /// Re-parents `source` under `target`, appending it as the last child.
    #[instrument(level = "trace", skip(self))]
    pub fn relocate(&mut self, source: NodeId, target: NodeId) -> bool {
        if !self.arena.contains(target.0) {
            return false;
        }
        if source == target || self.is_ancestor(source, target) {
            debug!("rejecting move of {} into its own subtree at {}", source, target);
            return false;
        }
        let Some(old_parent) = self.node(source).and_then(|node| node.parent) else {
            return false;
        };

        if let Some(old_parent) = self.arena.get_mut(old_parent.0) {
            old_parent.children.retain(|&child| child != source);
        }
        if let Some(target_node) = self.arena.get_mut(target.0) {
            target_node.children.push(source);
        }
        if let Some(node) = self.arena.get_mut(source.0) {
            node.parent = Some(target);
        }
        true
    }

    /// Walks every node once, calling `callback` on each.
    ///
    /// `None` selects pre-order. The visit order is fixed before the first
    /// callback runs; callbacks may edit records but not structure.
    #[instrument(level = "trace", skip(self, callback))]
    pub fn traversal<F>(&mut self, order: Option<TraversalOrder>, mut callback: F)
    where
        F: FnMut(&mut Node),
    {
        let visit: Vec<NodeId> = match order.unwrap_or_default() {
            TraversalOrder::PreOrder => self.iter().map(|(id, _)| id).collect(),
            TraversalOrder::PostOrder => self.iter_postorder().map(|(id, _)| id).collect(),
        };
        for id in visit {
            if let Some(node) = self.arena.get_mut(id.0) {
                callback(node);
            }
        }
    }

    /// Stable-sorts the children of every node with `compare`.
    #[instrument(level = "trace", skip(self, compare))]
    pub fn sort<F>(&mut self, mut compare: F) -> &mut Self
    where
        F: FnMut(&Node, &Node) -> Ordering,
    {
        let parents: Vec<NodeId> = self
            .iter()
            .filter(|(_, node)| node.children.len() > 1)
            .map(|(id, _)| id)
            .collect();

        for id in parents {
            let Some(node) = self.arena.get_mut(id.0) else {
                continue;
            };
            let mut children = mem::take(&mut node.children);
            let arena = &self.arena;
            children.sort_by(|a, b| match (arena.get(a.0), arena.get(b.0)) {
                (Some(a), Some(b)) => compare(a, b),
                _ => Ordering::Equal,
            });
            if let Some(node) = self.arena.get_mut(id.0) {
                node.children = children;
            }
        }
        self
    }

    /// Walks upward from `id`, nearest ancestor first. `id` itself is excluded.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.node(id).and_then(|node| node.parent),
        }
    }

    /// True if `ancestor` lies on the path from the root to `descendant`.
    pub fn is_ancestor(&self, ancestor: NodeId, descendant: NodeId) -> bool {
        self.ancestors(descendant).any(|(id, _)| id == ancestor)
    }

    /// Handles from the root down to `id`, inclusive. Empty if `id` is stale.
    pub fn path_to(&self, id: NodeId) -> Vec<NodeId> {
        if self.node(id).is_none() {
            return Vec::new();
        }
        let mut path: Vec<NodeId> = self.ancestors(id).map(|(id, _)| id).collect();
        path.reverse();
        path.push(id);
        path
    }

    #[instrument(level = "trace", skip(self))]
    pub fn iter(&self) -> PreOrderIterator<'_> {
        PreOrderIterator::new(self)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }

    /// Number of levels in the tree; 0 when empty.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(NodeId, usize)> = self.root.map(|root| (root, 1)).into_iter().collect();
        while let Some((id, level)) = stack.pop() {
            deepest = deepest.max(level);
            if let Some(node) = self.node(id) {
                stack.extend(node.children.iter().map(|&child| (child, level + 1)));
            }
        }
        deepest
    }

    /// Handles of all leaf nodes, in pre-order.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_nodes(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, node)| node.is_leaf())
            .map(|(id, _)| id)
            .collect()
    }
}

pub struct Ancestors<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let node = self.tree.node(id)?;
        self.next = node.parent;
        Some((id, node))
    }
}

pub struct PreOrderIterator<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl<'a> PreOrderIterator<'a> {
    fn new(tree: &'a Tree) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = tree.root() {
            stack.push(root);
        }
        Self { tree, stack }
    }
}

impl<'a> Iterator for PreOrderIterator<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(node) = self.tree.node(current) {
                // Push children in reverse order for left-to-right traversal
                self.stack.extend(node.children.iter().rev());
                return Some((current, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    tree: &'a Tree,
    stack: Vec<(NodeId, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(tree: &'a Tree) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = tree.root() {
            stack.push((root, false));
        }
        Self { tree, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, visited)) = self.stack.pop() {
            if let Some(node) = self.tree.node(current) {
                if visited {
                    return Some((current, node));
                }
                self.stack.push((current, true));
                for &child in node.children.iter().rev() {
                    self.stack.push((child, false));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test records are objects"),
        }
    }

    fn id_is(id: i64) -> impl Fn(&Node) -> bool {
        move |node| node.get("id") == Some(&json!(id))
    }

    fn ids(tree: &Tree, of: &[NodeId]) -> Vec<i64> {
        of.iter()
            .filter_map(|&id| tree.node(id))
            .filter_map(|node| node.get("id").and_then(Value::as_i64))
            .collect()
    }

    //      1
    //     / \
    //    2   3
    //    |
    //    4
    fn small_tree() -> Tree {
        let mut tree = Tree::with_root(record(json!({"id": 1})));
        tree.add(id_is(1), record(json!({"id": 2})))
            .add(id_is(1), record(json!({"id": 3})))
            .add(id_is(2), record(json!({"id": 4})));
        tree
    }

    #[test]
    fn given_empty_tree_when_add_then_installs_root_ignoring_predicate() {
        let mut tree = Tree::new();
        assert!(tree.is_empty());

        tree.add(|_| false, record(json!({"id": 1})));

        let root = tree.root_node().expect("root installed");
        assert_eq!(root.get("id"), Some(&json!(1)));
        assert!(root.is_root());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn given_unmatched_parent_when_add_then_tree_unchanged() {
        let mut tree = small_tree();
        tree.add(id_is(100), record(json!({"id": 5})));
        assert_eq!(tree.len(), 4);
        assert!(tree.contains(id_is(5)).is_none());
    }

    #[test]
    fn given_stale_parent_when_insert_then_returns_none() {
        let mut tree = small_tree();
        let four = tree.find(id_is(4)).unwrap();
        assert!(tree.remove_node(four));
        assert!(tree.insert(four, record(json!({"id": 9}))).is_none());
    }

    #[test]
    fn given_tree_when_iterating_then_preorder_is_left_to_right() {
        let tree = small_tree();
        let order: Vec<NodeId> = tree.iter().map(|(id, _)| id).collect();
        assert_eq!(ids(&tree, &order), vec![1, 2, 4, 3]);
    }

    #[test]
    fn given_tree_when_postorder_iterating_then_children_come_first() {
        let tree = small_tree();
        let order: Vec<NodeId> = tree.iter_postorder().map(|(id, _)| id).collect();
        assert_eq!(ids(&tree, &order), vec![4, 2, 3, 1]);
    }

    #[test]
    fn given_root_match_when_remove_then_refuses() {
        let mut tree = small_tree();
        assert!(!tree.remove(id_is(1)));
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn given_subtree_when_removed_then_frees_descendants() {
        let mut tree = small_tree();
        let four = tree.find(id_is(4)).unwrap();

        assert!(tree.remove(id_is(2)));

        assert_eq!(tree.len(), 2);
        assert!(tree.node(four).is_none());
        assert!(tree.contains(id_is(4)).is_none());
    }

    #[test]
    fn given_descendant_destination_when_move_then_rejects() {
        let mut tree = small_tree();
        assert!(!tree.move_node(id_is(2), id_is(4)));
        assert!(!tree.move_node(id_is(2), id_is(2)));
        assert!(!tree.move_node(id_is(1), id_is(3)));

        let two = tree.find(id_is(2)).unwrap();
        assert_eq!(tree.parent_of(two).unwrap().get("id"), Some(&json!(1)));
    }

    #[test]
    fn given_sibling_destination_when_move_then_reparents_with_subtree() {
        let mut tree = small_tree();
        assert!(tree.move_node(id_is(2), id_is(3)));

        let two = tree.find(id_is(2)).unwrap();
        let three = tree.find(id_is(3)).unwrap();
        assert_eq!(tree.node(two).unwrap().parent(), Some(three));
        assert_eq!(ids(&tree, tree.node(two).unwrap().children()), vec![4]);
        assert_eq!(ids(&tree, tree.root_node().unwrap().children()), vec![3]);
    }

    #[test]
    fn given_node_when_path_to_then_lists_root_first() {
        let tree = small_tree();
        let four = tree.find(id_is(4)).unwrap();
        assert_eq!(ids(&tree, &tree.path_to(four)), vec![1, 2, 4]);
        assert!(tree.is_ancestor(tree.root().unwrap(), four));
        assert!(!tree.is_ancestor(four, tree.root().unwrap()));
    }

    #[test]
    fn given_tree_when_depth_and_leaves_then_reports_shape() {
        let tree = small_tree();
        assert_eq!(tree.depth(), 3);
        assert_eq!(ids(&tree, &tree.leaf_nodes()), vec![4, 3]);
        assert_eq!(Tree::new().depth(), 0);
    }

    #[test]
    fn given_tree_when_clear_then_empty() {
        let mut tree = small_tree();
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert!(tree.contains(|_| true).is_none());
    }

    #[test]
    fn given_equal_keys_when_sort_then_keeps_insertion_order() {
        let mut tree = Tree::with_root(record(json!({"id": 1})));
        tree.add(id_is(1), record(json!({"id": 2, "k": 0})))
            .add(id_is(1), record(json!({"id": 3, "k": 0})))
            .add(id_is(1), record(json!({"id": 4, "k": -1})));

        tree.sort(|a, b| {
            let key = |n: &Node| n.get("k").and_then(Value::as_i64).unwrap_or(0);
            key(a).cmp(&key(b))
        });

        assert_eq!(ids(&tree, tree.root_node().unwrap().children()), vec![4, 2, 3]);
    }
}
