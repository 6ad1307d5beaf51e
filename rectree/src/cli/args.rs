//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

/// Build, search, sort and serialize trees of JSON records
#[derive(Parser, Debug)]
#[command(name = "rectree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Local config file (overrides the global config)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Record field holding the node id
    #[arg(long, global = true)]
    pub key_id: Option<String>,

    /// Record field holding the parent id
    #[arg(long, global = true)]
    pub key_parent: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Sibling ordering applied before output
#[derive(Args, Debug, Clone, Default)]
pub struct SortArgs {
    /// Sort siblings by this record field
    #[arg(long)]
    pub sort_by: Option<String>,

    /// Sort descending
    #[arg(long, requires = "sort_by")]
    pub desc: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the record tree
    Show {
        /// JSON file holding an array of records
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Record field shown per node (`*` for the whole record)
        #[arg(short, long)]
        label: Option<String>,

        #[command(flatten)]
        sort: SortArgs,
    },

    /// Print the tree as nested JSON
    Json {
        /// JSON file holding an array of records
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Field name for nested children
        #[arg(long)]
        key_children: Option<String>,

        /// Omit the children field on leaves
        #[arg(long)]
        no_empty_children: bool,

        /// Single-line output
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        sort: SortArgs,
    },

    /// Print the path from the root to the first node with field = value
    Find {
        /// JSON file holding an array of records
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Record field to match
        #[arg(short, long)]
        field: String,

        /// Value to match (parsed as JSON, falls back to a string)
        #[arg(short, long)]
        value: String,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,
    /// Show global config file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_desc_without_sort_by_when_parsing_then_errors() {
        let result = Cli::try_parse_from(["rectree", "show", "records.json", "--desc"]);
        assert!(result.is_err());
    }

    #[test]
    fn given_json_flags_when_parsing_then_populates_command() {
        let cli = Cli::try_parse_from([
            "rectree",
            "-dd",
            "json",
            "records.json",
            "--key-children",
            "child",
            "--no-empty-children",
            "--sort-by",
            "id",
            "--desc",
        ])
        .unwrap();

        assert_eq!(cli.debug, 2);
        match cli.command {
            Some(Commands::Json {
                key_children,
                no_empty_children,
                sort,
                ..
            }) => {
                assert_eq!(key_children.as_deref(), Some("child"));
                assert!(no_empty_children);
                assert_eq!(sort.sort_by.as_deref(), Some("id"));
                assert!(sort.desc);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
