// Configuration loading and validation (config/bestball.toml).

use std::path::{Path, PathBuf};

use bestball_core::filter::MAX_BOUND;
use bestball_core::source::DataPaths;
use bestball_core::stacks::MIN_STACK_SIZE;
use serde::Deserialize;
use thiserror::Error;

/// File name shared by `defaults/` and `config/`.
pub const CONFIG_FILE: &str = "bestball.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub contest: ContestConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContestConfig {
    /// Contest draft group to keep; `None` keeps every roster.
    pub draft_group_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Files,
    Http,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataConfig {
    #[serde(default)]
    pub source: SourceKind,
    pub base_url: Option<String>,
    #[serde(default)]
    pub paths: DataPaths,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_min_stack_size")]
    pub min_stack_size: usize,
    #[serde(default = "default_max_stack_size")]
    pub max_stack_size: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            min_stack_size: default_min_stack_size(),
            max_stack_size: default_max_stack_size(),
        }
    }
}

fn default_min_stack_size() -> usize {
    MIN_STACK_SIZE
}

fn default_max_stack_size() -> usize {
    4
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/bestball.toml` under `base_dir`, without
/// touching `defaults/`.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Create `config/bestball.toml` from `defaults/bestball.toml` on first run.
///
/// An existing config file is left alone; returns the path written, if any.
/// Fails only when neither file exists or the copy itself fails.
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let target = base_dir.join("config").join(CONFIG_FILE);
    if target.exists() {
        return Ok(None);
    }

    let default = base_dir.join("defaults").join(CONFIG_FILE);
    let copy_error = |what: &str, path: &Path, e: std::io::Error| ConfigError::DefaultsCopyError {
        message: format!("failed to {what} {}: {e}", path.display()),
    };

    let content = std::fs::read(&default).map_err(|e| copy_error("read", &default, e))?;
    if let Some(dir) = target.parent() {
        std::fs::create_dir_all(dir).map_err(|e| copy_error("create", dir, e))?;
    }
    // `create_new`: fails rather than overwrite.
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
        .map_err(|e| copy_error("create", &target, e))?;
    std::io::Write::write_all(&mut file, &content).map_err(|e| copy_error("write", &target, e))?;
    Ok(Some(target))
}

/// Populate the config file from defaults when missing, then load.
pub fn load_config(base_dir: &Path) -> Result<Config, ConfigError> {
    ensure_config_file(base_dir)?;
    load_config_from(base_dir)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let analysis = &config.analysis;
    if analysis.min_stack_size < MIN_STACK_SIZE {
        return Err(ConfigError::ValidationError {
            field: "analysis.min_stack_size".into(),
            message: format!("must be at least {MIN_STACK_SIZE}, got {}", analysis.min_stack_size),
        });
    }

    if analysis.max_stack_size < analysis.min_stack_size || analysis.max_stack_size as i64 > MAX_BOUND {
        return Err(ConfigError::ValidationError {
            field: "analysis.max_stack_size".into(),
            message: format!(
                "must be between min_stack_size ({}) and {MAX_BOUND}, got {}",
                analysis.min_stack_size, analysis.max_stack_size
            ),
        });
    }

    if config.data.source == SourceKind::Http
        && config.data.base_url.as_deref().map_or(true, |url| url.trim().is_empty())
    {
        return Err(ConfigError::ValidationError {
            field: "data.base_url".into(),
            message: "required when data.source is \"http\"".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
