use std::env;
use std::sync::Once;

use serde_json::{json, Value};
use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::node::Record;
use crate::tree::Tree;

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "trace");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    // Create a filter for noisy modules
    let noisy_modules = ["config", "toml"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_test_writer()
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Converts a JSON object literal into a record. Non-objects yield an empty record.
pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}

/// Flat record list of the default fixture, linked by `id`/`parent`.
pub fn default_records() -> Vec<Record> {
    [
        json!({"id": 1, "title": "Root"}),
        json!({"id": 2, "parent": 1}),
        json!({"id": 3, "parent": 1}),
        json!({"id": 4, "parent": 3}),
        json!({"id": 5, "parent": 4}),
        json!({"id": 6, "parent": 5}),
        json!({"id": 7, "parent": 2}),
        json!({"id": 8, "parent": 7}),
    ]
    .into_iter()
    .map(|value| {
        let mut item = record(value);
        if let Some(id) = item.get("id").cloned() {
            item.entry("title")
                .or_insert_with(|| Value::String(format!("Node {}", id)));
        }
        item
    })
    .collect()
}

// 1
// ├── 2
// │   └── 7
// │       └── 8
// └── 3
//     └── 4
//         └── 5
//             └── 6
/// Builds the default multi-level fixture by repeated `add` calls.
pub fn generate_default_tree() -> Tree {
    let mut tree = Tree::new();
    for item in default_records() {
        let parent = item.get("parent").cloned();
        tree.add(|node| node.get("id") == parent.as_ref(), item);
    }
    tree
}
