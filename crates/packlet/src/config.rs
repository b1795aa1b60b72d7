//! Build configuration
//!
//! A build is configured in up to three layers, later layers overriding
//! earlier ones:
//!
//! 1. user defaults in `<config dir>/packlet/packlet.toml`
//! 2. the project file, `packlet.toml` or the legacy `bundle.config.json`
//! 3. command-line flags
//!
//! Relative paths in a file are resolved against that file's directory;
//! relative paths given on the command line against the working directory.

use std::{
    fs,
    path::{Path, PathBuf},
};

use etcetera::BaseStrategy;
use log::debug;
use serde::Deserialize;

use crate::{
    error::{BuildError, Result},
    resolver::absolutize,
};

/// Project configuration files, in lookup order
pub const PROJECT_CONFIG_FILES: [&str; 2] = ["packlet.toml", "bundle.config.json"];

/// Artifact location used when no layer names one
pub const DEFAULT_OUTPUT: &str = "dist/bundle.js";

/// Fully resolved settings for one build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Absolute path of the entry module
    pub entry: PathBuf,
    /// Absolute path the artifact is written to
    pub output: PathBuf,
    /// Reuse one module per resolved path instead of one per import
    pub dedupe: bool,
}

impl Config {
    /// Settings for `entry` with every other value at its default
    pub fn for_entry(entry: &Path, base_dir: &Path) -> Self {
        Self {
            entry: absolutize(entry, base_dir),
            output: absolutize(Path::new(DEFAULT_OUTPUT), base_dir),
            dedupe: false,
        }
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Explicit project config file; skips discovery
    pub config: Option<PathBuf>,
    pub entry: Option<PathBuf>,
    pub output: Option<PathBuf>,
    /// Only ever switches deduplication on
    pub dedupe: bool,
}

/// One configuration file, with paths already made absolute
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigLayer {
    entry: Option<PathBuf>,
    output: Option<PathBuf>,
    dedupe: Option<bool>,
}

impl ConfigLayer {
    fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|error| BuildError::config(path, format!("cannot read file: {error}")))?;

        let layer: Self = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&content)
                .map_err(|error| BuildError::config(path, error.message().to_owned()))?,
            Some("json") => serde_json::from_str(&content)
                .map_err(|error| BuildError::config(path, error.to_string()))?,
            _ => {
                return Err(BuildError::config(
                    path,
                    "unsupported format, expected a .toml or .json file",
                ));
            }
        };

        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(layer.relative_to(base_dir))
    }

    fn relative_to(self, base_dir: &Path) -> Self {
        Self {
            entry: self.entry.map(|entry| absolutize(&entry, base_dir)),
            output: self.output.map(|output| absolutize(&output, base_dir)),
            dedupe: self.dedupe,
        }
    }

    /// `self` with every value set in `other` replaced
    fn merge(self, other: Self) -> Self {
        Self {
            entry: other.entry.or(self.entry),
            output: other.output.or(self.output),
            dedupe: other.dedupe.or(self.dedupe),
        }
    }
}

/// Assembles a [`Config`] from the user, project and command-line layers
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    working_dir: PathBuf,
    user_config: Option<PathBuf>,
}

impl ConfigLoader {
    /// Loader for a build started in `working_dir`, reading user defaults
    /// from the platform config directory
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            user_config: user_config_path(),
        }
    }

    /// Read user defaults from `path` instead; `None` disables them
    #[must_use]
    pub fn with_user_config(mut self, path: Option<PathBuf>) -> Self {
        self.user_config = path;
        self
    }

    pub fn load(&self, overrides: &ConfigOverrides) -> Result<Config> {
        let mut layer = ConfigLayer::default();

        if let Some(user_config) = self.user_config.as_deref().filter(|path| path.is_file()) {
            debug!("Loading user defaults from {}", user_config.display());
            layer = layer.merge(ConfigLayer::load(user_config)?);
        }

        let project_config = match &overrides.config {
            Some(path) => Some(absolutize(path, &self.working_dir)),
            None => find_project_config(&self.working_dir),
        };
        // Defaults are relative to the project, not wherever the user config lives
        let project_dir = project_config
            .as_deref()
            .and_then(Path::parent)
            .unwrap_or(self.working_dir.as_path())
            .to_path_buf();
        if let Some(project_config) = &project_config {
            debug!("Loading project config from {}", project_config.display());
            layer = layer.merge(ConfigLayer::load(project_config)?);
        }

        let cli = ConfigLayer {
            entry: overrides.entry.clone(),
            output: overrides.output.clone(),
            dedupe: overrides.dedupe.then_some(true),
        };
        layer = layer.merge(cli.relative_to(&self.working_dir));

        let Some(entry) = layer.entry else {
            let origin = project_config.unwrap_or_else(|| self.working_dir.clone());
            return Err(BuildError::config(
                origin,
                "no entry module configured; set `entry` or pass --entry",
            ));
        };

        Ok(Config {
            entry,
            output: layer
                .output
                .unwrap_or_else(|| absolutize(Path::new(DEFAULT_OUTPUT), &project_dir)),
            dedupe: layer.dedupe.unwrap_or(false),
        })
    }
}

/// First project config file present in `dir`
pub fn find_project_config(dir: &Path) -> Option<PathBuf> {
    PROJECT_CONFIG_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Location of the user defaults file for this platform
pub fn user_config_path() -> Option<PathBuf> {
    let strategy = etcetera::choose_base_strategy().ok()?;
    Some(strategy.config_dir().join("packlet").join("packlet.toml"))
}
