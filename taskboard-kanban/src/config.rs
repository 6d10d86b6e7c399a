//! Engine configuration loaded with figment.
//!
//! Sources, later ones overriding earlier ones:
//! 1. [`EngineConfig::default`]
//! 2. `taskboard.toml`, `taskboard.yaml`, `taskboard.json` in the working
//!    directory, or one explicit file
//! 3. `TASKBOARD_*` environment variables

use crate::defaults::{
    COLUMN_DROP_PREFIX, DEFAULT_ACTIVITY_LIMIT, DEFAULT_BOARD_COLOR, DEFAULT_COLUMNS,
};
use crate::error::{BoardError, Result};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "TASKBOARD_";

/// What happens to the optimistic tree when a drag does not end in a
/// successful write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveFailurePolicy {
    /// Move the task back to where the drag started
    #[default]
    Restore,
    /// Keep the optimistic arrangement until the next full reload
    Retain,
}

/// Engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Root directory of the file-backed store
    pub data_dir: PathBuf,
    /// Actor recorded on log entries
    pub actor: Option<String>,
    pub on_move_failure: MoveFailurePolicy,
    /// Prefix of hover ids that name a column drop zone
    pub column_drop_prefix: String,
    /// Columns seeded into a new board
    pub default_columns: Vec<String>,
    pub default_color: String,
    /// Max entries kept in the in-memory activity log
    pub activity_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".taskboard"),
            actor: None,
            on_move_failure: MoveFailurePolicy::default(),
            column_drop_prefix: COLUMN_DROP_PREFIX.to_string(),
            default_columns: DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            default_color: DEFAULT_BOARD_COLOR.to_string(),
            activity_limit: DEFAULT_ACTIVITY_LIMIT,
        }
    }
}

impl EngineConfig {
    /// Load from the default sources
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load with an explicit config file in place of discovery
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        Self::figment(path)
            .extract::<EngineConfig>()
            .map_err(|e| BoardError::Config {
                message: e.to_string(),
            })?
            .validated()
    }

    /// Build the figment with all sources in precedence order
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(EngineConfig::default()));

        match path {
            Some(path) => {
                debug!(path = %path.display(), "loading explicit config file");
                figment = match path.extension().and_then(|e| e.to_str()) {
                    Some("yaml") | Some("yml") => figment.merge(Yaml::file(path)),
                    Some("json") => figment.merge(Json::file(path)),
                    _ => figment.merge(Toml::file(path)),
                };
            }
            None => {
                figment = figment
                    .merge(Toml::file("taskboard.toml"))
                    .merge(Yaml::file("taskboard.yaml"))
                    .merge(Json::file("taskboard.json"));
            }
        }

        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    fn validated(self) -> Result<Self> {
        if self.column_drop_prefix.is_empty() {
            return Err(BoardError::Config {
                message: "column_drop_prefix must not be empty".into(),
            });
        }
        if self.default_columns.iter().any(|c| c.trim().is_empty()) {
            return Err(BoardError::Config {
                message: "default_columns must not contain blank titles".into(),
            });
        }
        if !crate::defaults::is_board_color(&self.default_color) {
            return Err(BoardError::Config {
                message: format!("unknown default_color '{}'", self.default_color),
            });
        }
        Ok(self)
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn with_move_failure(mut self, policy: MoveFailurePolicy) -> Self {
        self.on_move_failure = policy;
        self
    }
}
