//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Topology tree matching: node correspondence between tree snapshots
#[derive(Parser, Debug)]
#[command(name = "treematch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Directory holding a local .treematch.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Match the nodes of two tree files, frame by frame
    Match {
        /// Trees to match from
        #[arg(value_hint = ValueHint::FilePath)]
        left: PathBuf,
        /// Trees to match against
        #[arg(value_hint = ValueHint::FilePath)]
        right: PathBuf,
        /// Similarity metric: cosine or euclidean
        #[arg(short, long)]
        similarity: Option<String>,
        /// Match in the given node order
        #[arg(long)]
        no_sort: bool,
        /// Positions are in the vehicle frame (x forward, y left)
        #[arg(long)]
        vehicle_frame: bool,
        /// Match frames one after another
        #[arg(long)]
        sequential: bool,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Reorder children by edge angle and renumber breadth-first
    Sort {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Write the sorted frames here instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Print the topology-preserving embedding of every node
    Embed {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show tree structure
    Show {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
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
    /// Show merged config
    Show,

    /// Print a config template
    Template,

    /// Show config paths
    Path,
}
