use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::builder::TreeBuilder;
use crate::cli::args::{Cli, Commands, ConfigCommands, SortArgs};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::compare::{compare_by, SortDirection};
use crate::config::{global_config_path, Settings};
use crate::display::TreeDisplay;
use crate::errors::TreeError;
use crate::node::Record;
use crate::tree::Tree;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(key_id) = &cli.key_id {
        settings.link.key_id = key_id.clone();
    }
    if let Some(key_parent) = &cli.key_parent {
        settings.link.key_parent = key_parent.clone();
    }

    match &cli.command {
        Some(Commands::Show { file, label, sort }) => _show(&settings, file, label.as_deref(), sort),
        Some(Commands::Json {
            file,
            key_children,
            no_empty_children,
            compact,
            sort,
        }) => {
            if let Some(key) = key_children {
                settings.serialize.key_children = key.clone();
            }
            if *no_empty_children {
                settings.serialize.empty_children = false;
            }
            _json(&settings, file, *compact, sort)
        }
        Some(Commands::Find { file, field, value }) => _find(&settings, file, field, value),
        Some(Commands::Config { command }) => _config(&settings, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::InvalidArgs(
            "no command given, see --help".to_string(),
        )),
    }
}

/// Reads a JSON array of record objects.
#[instrument(level = "debug")]
pub fn load_records(path: &Path) -> Result<Vec<Record>, TreeError> {
    let content = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)?;
    let Value::Array(items) = value else {
        return Err(TreeError::InvalidInput {
            path: path.to_path_buf(),
            reason: "expected a JSON array of records".to_string(),
        });
    };
    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::Object(record) => Ok(record),
            other => Err(TreeError::InvalidInput {
                path: path.to_path_buf(),
                reason: format!("element {} is not an object: {}", idx, other),
            }),
        })
        .collect()
}

fn load_tree(settings: &Settings, file: &Path, sort: &SortArgs) -> CliResult<Tree> {
    let records = load_records(file)?;
    let mut tree = TreeBuilder::new(settings.link.clone()).build(records)?;
    debug!("loaded {} nodes from {}", tree.len(), file.display());

    if let Some(field) = &sort.sort_by {
        let direction = if sort.desc {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        tree.sort(compare_by(field.as_str(), direction));
    }
    Ok(tree)
}

#[instrument(skip(settings))]
fn _show(settings: &Settings, file: &Path, label: Option<&str>, sort: &SortArgs) -> CliResult<()> {
    // termtree's Display already ends with a newline
    print!("{}", render_show(settings, file, label, sort)?);
    Ok(())
}

fn render_show(
    settings: &Settings,
    file: &Path,
    label: Option<&str>,
    sort: &SortArgs,
) -> CliResult<String> {
    let tree = load_tree(settings, file, sort)?;
    let label = match label {
        Some(field) => {
            let mut display = settings.display.clone();
            display.label_field = field.to_string();
            display.label()
        }
        None => settings.display.label(),
    };
    Ok(tree.to_tree_string(&label).to_string())
}

#[instrument(skip(settings))]
fn _json(settings: &Settings, file: &Path, compact: bool, sort: &SortArgs) -> CliResult<()> {
    output::info(&render_json(settings, file, compact, sort)?);
    Ok(())
}

fn render_json(settings: &Settings, file: &Path, compact: bool, sort: &SortArgs) -> CliResult<String> {
    let tree = load_tree(settings, file, sort)?;
    let json = tree.to_json(&settings.serialize);
    let text = if compact {
        serde_json::to_string(&json)
    } else {
        serde_json::to_string_pretty(&json)
    }
    .map_err(TreeError::from)?;
    Ok(text)
}

#[instrument(skip(settings))]
fn _find(settings: &Settings, file: &Path, field: &str, value: &str) -> CliResult<()> {
    output::info(&find_path(settings, file, field, value)?);
    Ok(())
}

/// Labels from the root down to the first node whose `field` equals `value`,
/// joined by " / ". `value` is parsed as JSON and falls back to a string.
fn find_path(settings: &Settings, file: &Path, field: &str, value: &str) -> CliResult<String> {
    let tree = load_tree(settings, file, &SortArgs::default())?;
    let wanted: Value =
        serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));

    let Some(found) = tree.find(|node| node.get(field) == Some(&wanted)) else {
        return Err(CliError::NotFound {
            field: field.to_string(),
            value: value.to_string(),
        });
    };

    let label = settings.display.label();
    let path: Vec<String> = tree
        .path_to(found)
        .into_iter()
        .filter_map(|id| tree.node(id))
        .map(|node| label.render(node))
        .collect();
    Ok(path.join(" / "))
}

#[instrument(skip(settings))]
fn _config(settings: &Settings, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::header("# effective settings");
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::info(&path.display()),
            None => output::warning("no config directory available on this platform"),
        },
    }
    Ok(())
}
