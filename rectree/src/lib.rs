//! In-memory N-ary tree of key/value records.
//!
//! A [`Tree`] owns its nodes in a generational arena. Callers locate nodes with
//! predicates (first match in depth-first pre-order), and can add, remove,
//! relocate, traverse, sort and snapshot them as nested JSON.
//!
//! ```
//! use rectree::{Tree, SerializeOptions};
//! use serde_json::json;
//!
//! let root = json!({"id": 1}).as_object().cloned().unwrap_or_default();
//! let child = json!({"id": 2}).as_object().cloned().unwrap_or_default();
//!
//! let mut tree = Tree::with_root(root);
//! tree.add(|node| node.get("id") == Some(&json!(1)), child);
//!
//! let found = tree.contains(|node| node.get("id") == Some(&json!(2))).unwrap();
//! assert_eq!(tree.node(found.parent().unwrap()).unwrap().get("id"), Some(&json!(1)));
//! assert_eq!(
//!     tree.to_json(&SerializeOptions::default()),
//!     json!({"id": 1, "children": [{"id": 2, "children": []}]})
//! );
//! ```

pub mod builder;
pub mod cli;
pub mod compare;
pub mod config;
pub mod display;
pub mod errors;
pub mod exitcode;
pub mod node;
pub mod serialize;
pub mod tree;
pub mod util;

pub use builder::{LinkOptions, TreeBuilder};
pub use compare::{compare_by, compare_values, SortDirection};
pub use display::{Label, TreeDisplay};
pub use errors::{TreeError, TreeResult};
pub use node::{Node, NodeId, Record};
pub use serialize::SerializeOptions;
pub use tree::{TraversalOrder, Tree};
