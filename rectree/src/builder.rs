use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::errors::{TreeError, TreeResult};
use crate::node::{NodeId, Record};
use crate::tree::Tree;

/// Field names linking a flat record list into a hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LinkOptions {
    /// Field holding a record's own id (default: "id")
    pub key_id: String,
    /// Field holding the parent's id; absent or null marks the root (default: "parent")
    pub key_parent: String,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            key_id: "id".into(),
            key_parent: "parent".into(),
        }
    }
}

impl LinkOptions {
    pub fn new(key_id: impl Into<String>, key_parent: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            key_parent: key_parent.into(),
        }
    }
}

fn parent_value<'a>(record: &'a Record, options: &LinkOptions) -> Option<&'a Value> {
    record
        .get(&options.key_parent)
        .filter(|value| !value.is_null())
}

impl Tree {
    /// Adds `record` under the first node whose id equals the record's
    /// parent field. On an empty tree the record becomes the root.
    pub fn add_linked(&mut self, record: Record, options: &LinkOptions) -> &mut Self {
        let parent = parent_value(&record, options).cloned();
        self.add(
            |node| parent.is_some() && node.get(&options.key_id) == parent.as_ref(),
            record,
        )
    }
}

/// Builds a [`Tree`] from flat records linked by id/parent fields.
///
/// Records may come in any order; siblings keep their input order.
pub struct TreeBuilder {
    options: LinkOptions,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new(LinkOptions::default())
    }
}

impl TreeBuilder {
    pub fn new(options: LinkOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LinkOptions {
        &self.options
    }

    #[instrument(level = "debug", skip(self, records))]
    pub fn build<I>(&self, records: I) -> TreeResult<Tree>
    where
        I: IntoIterator<Item = Record>,
    {
        let records: Vec<Record> = records.into_iter().collect();
        if records.is_empty() {
            return Ok(Tree::new());
        }

        let (keys, root, mut children_of) = self.index_records(&records)?;
        let mut slots: Vec<Option<Record>> = records.into_iter().map(Some).collect();
        let mut placed = 0usize;

        let mut tree = Tree::new();
        let mut stack: Vec<(usize, NodeId)> = Vec::new();
        if let Some(record) = slots[root].take() {
            tree.add(|_| true, record);
            placed += 1;
        }
        if let Some(root_id) = tree.root() {
            stack.push((root, root_id));
        }

        while let Some((current, current_id)) = stack.pop() {
            let Some(children) = children_of.remove(&keys[current]) else {
                continue;
            };
            for child in children {
                let Some(record) = slots[child].take() else {
                    continue;
                };
                if let Some(child_id) = tree.insert(current_id, record) {
                    placed += 1;
                    stack.push((child, child_id));
                }
            }
        }

        if let Some((idx, record)) = slots
            .iter()
            .enumerate()
            .find_map(|(idx, slot)| slot.as_ref().map(|record| (idx, record)))
        {
            let parent = parent_value(record, &self.options)
                .map(Value::to_string)
                .unwrap_or_default();
            return Err(TreeError::Orphan {
                id: keys[idx].clone(),
                parent,
            });
        }

        debug!("linked {} records into tree of depth {}", placed, tree.depth());
        Ok(tree)
    }

    /// Id keys per record, the root index, and record indices grouped by parent key.
    #[allow(clippy::type_complexity)]
    fn index_records(
        &self,
        records: &[Record],
    ) -> TreeResult<(Vec<String>, usize, HashMap<String, Vec<usize>>)> {
        let mut keys: Vec<String> = Vec::with_capacity(records.len());
        let mut seen = HashSet::new();
        let mut root: Option<usize> = None;
        let mut children_of: HashMap<String, Vec<usize>> = HashMap::new();

        for (idx, record) in records.iter().enumerate() {
            let id = record
                .get(&self.options.key_id)
                .ok_or_else(|| TreeError::MissingField {
                    field: self.options.key_id.clone(),
                    record: Value::Object(record.clone()).to_string(),
                })?;
            let key = id.to_string();
            if !seen.insert(key.clone()) {
                return Err(TreeError::DuplicateId(key));
            }

            match parent_value(record, &self.options) {
                Some(parent) => children_of.entry(parent.to_string()).or_default().push(idx),
                None => match root {
                    Some(previous) => {
                        return Err(TreeError::MultipleRoots(keys[previous].clone(), key));
                    }
                    None => root = Some(idx),
                },
            }
            keys.push(key);
        }

        let root = root.ok_or(TreeError::NoRoot)?;
        Ok((keys, root, children_of))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(value: Value) -> Vec<Record> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    #[test]
    fn given_no_records_when_building_then_empty_tree() {
        let tree = TreeBuilder::default().build(Vec::new()).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn given_null_parent_when_building_then_treated_as_root() {
        let tree = TreeBuilder::default()
            .build(records(json!([{"id": 1, "parent": null}, {"id": 2, "parent": 1}])))
            .unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.root_node().unwrap().get("id"), Some(&json!(1)));
    }

    #[test]
    fn given_string_and_number_ids_when_building_then_not_conflated() {
        let result = TreeBuilder::default()
            .build(records(json!([{"id": 1}, {"id": 2, "parent": "1"}])));
        assert!(matches!(result, Err(TreeError::Orphan { .. })));
    }

    #[test]
    fn given_add_linked_on_empty_tree_then_installs_root() {
        let options = LinkOptions::default();
        let mut tree = Tree::new();
        for record in records(json!([{"id": 1}, {"id": 2, "parent": 1}, {"id": 3, "parent": 9}])) {
            tree.add_linked(record, &options);
        }
        assert_eq!(tree.len(), 2);
    }
}
