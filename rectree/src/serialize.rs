//! Snapshot of a tree as nested plain JSON objects.
//!
//! Each node becomes its record's fields plus a children array under a
//! configurable key. The snapshot shares nothing with the live tree.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use tracing::instrument;

use crate::tree::Tree;

/// Shape of the [`Tree::to_json`] output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SerializeOptions {
    /// Field that holds nested children (default: "children")
    pub key_children: String,
    /// Emit an empty array for leaves; when false leaves omit the key
    pub empty_children: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            key_children: "children".into(),
            empty_children: true,
        }
    }
}

impl SerializeOptions {
    pub fn key_children(mut self, key: impl Into<String>) -> Self {
        self.key_children = key.into();
        self
    }

    pub fn empty_children(mut self, emit: bool) -> Self {
        self.empty_children = emit;
        self
    }
}

impl Tree {
    /// Nested snapshot of the whole tree; `Value::Null` when empty.
    ///
    /// A record field that collides with `key_children` is overwritten in
    /// the snapshot by the generated children array.
    ///
    /// Built without recursion, but dropping a very deep `Value` still
    /// recurses once per level.
    #[instrument(level = "debug", skip(self))]
    pub fn to_json(&self, options: &SerializeOptions) -> Value {
        // post-order leaves a node's finished children on top of `built`
        let mut built: Vec<Value> = Vec::new();
        for (_, node) in self.iter_postorder() {
            let children = built.split_off(built.len().saturating_sub(node.children().len()));
            let mut object = node.record().clone();
            if !node.is_leaf() || options.empty_children {
                object.insert(options.key_children.clone(), Value::Array(children));
            }
            built.push(Value::Object(object));
        }
        built.pop().unwrap_or(Value::Null)
    }
}

impl Serialize for Tree {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json(&SerializeOptions::default())
            .serialize(serializer)
    }
}
