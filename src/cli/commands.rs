use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::application::exchange::render_frames;
use crate::application::services::FrameMatch;
use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::CliResult;
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{embed, SimilarityKind, Tree, TreeDisplay};
use crate::infrastructure::di::ServiceContainer;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Match {
            left,
            right,
            similarity,
            no_sort,
            vehicle_frame,
            sequential,
            json,
        }) => {
            let mut settings = load_settings(cli)?;
            if let Some(name) = similarity {
                settings.similarity = name.parse::<SimilarityKind>()?;
            }
            if *no_sort {
                settings.sort_before_match = false;
            }
            if *vehicle_frame {
                settings.vehicle_frame = true;
            }
            if *sequential {
                settings.parallel = false;
            }
            _match(settings, left, right, *json)
        }
        Some(Commands::Sort { file, output: target }) => {
            _sort(load_settings(cli)?, file, target.as_deref())
        }
        Some(Commands::Embed { file, json }) => _embed(load_settings(cli)?, file, *json),
        Some(Commands::Show { file }) => _show(load_settings(cli)?, file),
        Some(Commands::Config { command }) => _config(cli, command),
        Some(Commands::Completion { shell }) => {
            _completion(*shell);
            Ok(())
        }
        None => Ok(()),
    }
}

fn settings_dir(cli: &Cli) -> Option<PathBuf> {
    cli.config_dir
        .clone()
        .or_else(|| std::env::current_dir().ok())
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let dir = settings_dir(cli);
    let settings = Settings::load(dir.as_deref())?;
    debug!("settings: {:?}", settings);
    Ok(settings)
}

fn to_json<T: Serialize>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| {
        ApplicationError::OperationFailed {
            context: "serialize output".to_string(),
            source: Box::new(e),
        }
        .into()
    })
}

/// Serializable form of a frame result, indices of the input files.
#[derive(Debug, Serialize)]
struct MatchReport {
    frame: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp_a: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp_b: Option<u64>,
    /// -1 marks a node without partner
    assignment: Vec<i64>,
    cost: f64,
    elapsed_us: u128,
}

impl From<&FrameMatch> for MatchReport {
    fn from(m: &FrameMatch) -> Self {
        Self {
            frame: m.frame,
            timestamp_a: m.timestamp_a,
            timestamp_b: m.timestamp_b,
            assignment: m
                .original_assignment
                .iter()
                .map(|c| c.map_or(-1, |c| c as i64))
                .collect(),
            cost: m.cost,
            elapsed_us: m.elapsed.as_micros(),
        }
    }
}

#[instrument(skip(settings))]
fn _match(settings: Settings, left: &Path, right: &Path, json: bool) -> CliResult<()> {
    let container = ServiceContainer::new(settings);
    container.init_thread_pool()?;

    let frames_a = container.trees.load_frames(left)?;
    let frames_b = container.trees.load_frames(right)?;
    let results = container.matching.match_sequences(&frames_a, &frames_b)?;

    if json {
        let reports: Vec<MatchReport> = results.iter().map(MatchReport::from).collect();
        output::info(&to_json(&reports)?);
        return Ok(());
    }

    for m in &results {
        let stamps = match (m.timestamp_a, m.timestamp_b) {
            (Some(a), Some(b)) => format!(" ({a} -> {b})"),
            _ => String::new(),
        };
        output::header(&format!(
            "frame {}{}: {} matched, cost {:.4}, {} us",
            m.frame,
            stamps,
            m.matched_count(),
            m.cost,
            m.elapsed.as_micros()
        ));
        for (from, to) in m.original_assignment.iter().enumerate() {
            match to {
                Some(to) => output::matched(from, *to),
                None => output::unmatched(from),
            }
        }
    }
    Ok(())
}

#[instrument(skip(settings))]
fn _sort(settings: Settings, file: &Path, target: Option<&Path>) -> CliResult<()> {
    let container = ServiceContainer::new(settings);
    let sorted: Vec<Tree> = container
        .trees
        .load_frames(file)?
        .iter()
        .map(|t| container.matching.sort(t).tree)
        .collect();

    match target {
        Some(path) => {
            container.trees.save_frames(path, &sorted)?;
            output::action("Sorted", &format!("{} frames -> {}", sorted.len(), path.display()));
        }
        None => output::info(&render_frames(&sorted)?),
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct EmbeddingReport {
    node: usize,
    x: f64,
    y: f64,
    radius: f64,
    angle: f64,
    angle_min: f64,
    angle_max: f64,
}

#[instrument(skip(settings))]
fn _embed(settings: Settings, file: &Path, json: bool) -> CliResult<()> {
    let container = ServiceContainer::new(settings);
    let mut frames = Vec::new();
    for tree in container.trees.load_frames(file)? {
        let mut tree = container.matching.prepare(&tree).tree;
        embed(&mut tree);
        let reports: Vec<EmbeddingReport> = tree
            .nodes
            .iter()
            .enumerate()
            .map(|(node, n)| EmbeddingReport {
                node,
                x: n.embedding.position.x,
                y: n.embedding.position.y,
                radius: n.embedding.radius,
                angle: n.embedding.angle,
                angle_min: n.embedding.angle_min,
                angle_max: n.embedding.angle_max,
            })
            .collect();
        frames.push(reports);
    }

    if json {
        output::info(&to_json(&frames)?);
        return Ok(());
    }
    for (k, reports) in frames.iter().enumerate() {
        output::header(&format!("frame {k}"));
        for r in reports {
            output::detail(&format!(
                "#{:<3} r={:<3} angle={:>8.3} sector=[{:.3}, {:.3}] pos=({:.3}, {:.3})",
                r.node, r.radius, r.angle, r.angle_min, r.angle_max, r.x, r.y
            ));
        }
    }
    Ok(())
}

#[instrument(skip(settings))]
fn _show(settings: Settings, file: &Path) -> CliResult<()> {
    let container = ServiceContainer::new(settings);
    let frames = container.trees.load_frames(file)?;
    if frames.is_empty() {
        output::warning(&format!("no frames in {}", file.display()));
    }
    for (k, tree) in frames.iter().enumerate() {
        let stamp = tree
            .timestamp
            .map_or_else(String::new, |t| format!(" @ {t}"));
        output::header(&format!(
            "frame {k}{stamp}: {} nodes, depth {}, {} leaves",
            tree.len(),
            tree.depth(),
            tree.leaf_nodes().len()
        ));
        output::info(&tree.to_tree_string());
    }
    Ok(())
}

fn _config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&load_settings(cli)?.to_toml()?),
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(p) => output::action("global", &p.display()),
                None => output::warning("no config directory on this platform"),
            }
            if let Some(dir) = settings_dir(cli) {
                output::action("local", &local_config_path(&dir).display());
            }
        }
    }
    Ok(())
}

fn _completion(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
