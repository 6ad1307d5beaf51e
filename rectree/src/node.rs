use std::fmt;

use generational_arena::Index;
use serde_json::{Map, Value};

/// Key/value payload wrapped by every node.
pub type Record = Map<String, Value>;

/// Stable handle to a node stored in a [`crate::tree::Tree`].
///
/// Handles are generational: once a node is removed, its handle no longer
/// resolves, even if the slot is reused by a later insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) Index);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "{}v{}", slot, generation)
    }
}

/// Tree node in the arena-backed hierarchy.
///
/// The record is freely readable and writable. Parent and children are
/// maintained by the owning tree only.
#[derive(Debug, Clone)]
pub struct Node {
    /// Handle of this node in its arena
    pub(crate) id: NodeId,
    /// Record payload for this node
    pub(crate) record: Record,
    /// Handle of the parent node, None for the root
    pub(crate) parent: Option<NodeId>,
    /// Handles of child nodes, in sibling order
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(id: NodeId, record: Record, parent: Option<NodeId>) -> Self {
        Self {
            id,
            record,
            parent,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Value stored under `field`, or `None` if the record has no such field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.record.get(field)
    }

    /// Writes `value` under `field`, replacing any previous value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.record.insert(field.into(), value.into());
        self
    }

    /// Removes `field` from the record, returning its previous value.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.record.shift_remove(field)
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }

    pub fn into_record(self) -> Record {
        self.record
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}
