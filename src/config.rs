//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/treematch/treematch.toml`
//! 3. Local config: `<dir>/.treematch.toml`
//! 4. Environment variables: `TREEMATCH_*` prefix
//!
//! Command line flags are applied on top by the CLI.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{
    AngleEncoding, CostPolicy, FeatureConfig, MatchOptions, SimilarityKind, TypeEncoding,
};

const ENV_PREFIX: &str = "TREEMATCH";

/// Unified configuration for treematch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Similarity metric between feature vectors
    pub similarity: SimilarityKind,
    /// How similarities become costs
    pub cost_policy: CostPolicy,
    pub angle_encoding: AngleEncoding,
    pub type_encoding: TypeEncoding,
    /// Sort both trees canonically before matching
    pub sort_before_match: bool,
    /// Rotate vehicle-frame positions into the display frame first
    pub vehicle_frame: bool,
    /// Match frame sequences on the rayon pool
    pub parallel: bool,
    /// Worker threads for `parallel` (0: one per core)
    pub threads: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            similarity: SimilarityKind::Cosine,
            cost_policy: CostPolicy::Negate,
            angle_encoding: AngleEncoding::Fraction,
            type_encoding: TypeEncoding::Scalar,
            sort_before_match: true,
            vehicle_frame: false,
            parallel: true,
            threads: 0,
        }
    }
}

/// Raw settings for intermediate parsing.
///
/// `None` means "not specified in this layer, inherit".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub similarity: Option<SimilarityKind>,
    pub cost_policy: Option<CostPolicy>,
    pub angle_encoding: Option<AngleEncoding>,
    pub type_encoding: Option<TypeEncoding>,
    pub sort_before_match: Option<bool>,
    pub vehicle_frame: Option<bool>,
    pub parallel: Option<bool>,
    pub threads: Option<usize>,
}

/// Get the XDG config directory for treematch.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "treematch").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("treematch.toml"))
}

/// Get the path to the local config file in `dir`.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".treematch.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Matching options derived from these settings.
    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            similarity: self.similarity,
            cost_policy: self.cost_policy,
            features: FeatureConfig {
                angle: self.angle_encoding,
                node_type: self.type_encoding,
            },
        }
    }

    /// Overlay wins where it specifies a value.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            similarity: overlay.similarity.unwrap_or(self.similarity),
            cost_policy: overlay.cost_policy.unwrap_or(self.cost_policy),
            angle_encoding: overlay.angle_encoding.unwrap_or(self.angle_encoding),
            type_encoding: overlay.type_encoding.unwrap_or(self.type_encoding),
            sort_before_match: overlay.sort_before_match.unwrap_or(self.sort_before_match),
            vehicle_frame: overlay.vehicle_frame.unwrap_or(self.vehicle_frame),
            parallel: overlay.parallel.unwrap_or(self.parallel),
            threads: overlay.threads.unwrap_or(self.threads),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.treematch.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        Self::apply_env_overrides(current, None)
    }

    /// Apply `TREEMATCH_*` variables as explicit overrides.
    ///
    /// `vars` replaces the process environment when given.
    pub fn apply_env_overrides(
        mut settings: Self,
        vars: Option<HashMap<String, String>>,
    ) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .source(vars),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("similarity") {
            // An unknown metric is fatal in every layer.
            settings.similarity = SimilarityKind::from_str(&val)?;
        }
        if let Ok(val) = config.get_string("cost_policy") {
            settings.cost_policy = parse_setting("cost_policy", &val)?;
        }
        if let Ok(val) = config.get_string("angle_encoding") {
            settings.angle_encoding = parse_setting("angle_encoding", &val)?;
        }
        if let Ok(val) = config.get_string("type_encoding") {
            settings.type_encoding = parse_setting("type_encoding", &val)?;
        }
        if let Some(val) = get_bool(&config, "sort_before_match")? {
            settings.sort_before_match = val;
        }
        if let Some(val) = get_bool(&config, "vehicle_frame")? {
            settings.vehicle_frame = val;
        }
        if let Some(val) = get_bool(&config, "parallel")? {
            settings.parallel = val;
        }
        if config.get_string("threads").is_ok() {
            settings.threads = config.get_int("threads").map_err(config_err).and_then(|n| {
                usize::try_from(n).map_err(|_| ApplicationError::Config {
                    message: format!("threads: {n} is not a thread count"),
                })
            })?;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# treematch configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/treematch/treematch.toml
#   Local:  <dir>/.treematch.toml  (directory given with -C)
#   Env:    TREEMATCH_* environment variables
#   CLI flags override all of the above.

# Similarity between feature vectors: "cosine" or "euclidean"
# similarity = "cosine"

# Similarity to cost: "negate" (cost = -s) or "max_shift" (cost = max(s) - s)
# cost_policy = "negate"

# Angle feature: "fraction" (angle / 2pi) or "sin_cos"
# angle_encoding = "fraction"

# Node type feature: "scalar" or "one_hot"
# type_encoding = "scalar"

# Sort trees by edge angle before matching
# sort_before_match = true

# Input positions are in the vehicle frame (x forward, y left)
# vehicle_frame = false

# Match frame sequences in parallel; threads = 0 uses one worker per core
# parallel = true
# threads = 0
"#
        .to_string()
    }
}

fn parse_setting<T>(key: &str, value: &str) -> Result<T, ApplicationError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e| ApplicationError::Config {
        message: format!("{key}: {e}"),
    })
}

fn get_bool(config: &Config, key: &str) -> Result<Option<bool>, ApplicationError> {
    if config.get_string(key).is_err() {
        return Ok(None);
    }
    config.get_bool(key).map(Some).map_err(config_err)
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
