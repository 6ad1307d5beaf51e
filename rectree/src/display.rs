use serde_json::Value;
use termtree::Tree as TermTree;
use tracing::instrument;

use crate::node::Node;
use crate::tree::Tree;

/// What each line of a rendered tree shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Label {
    /// Value of one record field
    Field(String),
    /// The whole record as compact JSON
    Record,
}

impl Label {
    pub fn render(&self, node: &Node) -> String {
        match self {
            Label::Field(field) => match node.get(field) {
                Some(Value::String(s)) => s.clone(),
                Some(value) => value.to_string(),
                None => "<missing>".to_string(),
            },
            Label::Record => Value::Object(node.record().clone()).to_string(),
        }
    }
}

pub trait TreeDisplay {
    fn to_tree_string(&self, label: &Label) -> TermTree<String>;
}

impl TreeDisplay for Tree {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self, label: &Label) -> TermTree<String> {
        let mut built: Vec<TermTree<String>> = Vec::new();
        for (_, node) in self.iter_postorder() {
            let leaves = built.split_off(built.len().saturating_sub(node.children().len()));
            built.push(TermTree::new(label.render(node)).with_leaves(leaves));
        }
        built
            .pop()
            .unwrap_or_else(|| TermTree::new("Empty tree".to_string()))
    }
}
