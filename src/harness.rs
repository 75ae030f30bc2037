//! Scripted battles: an ordered list of `(player, action)` pairs replayed
//! against a fresh [`Battle`], yielding one outcome per action.

use core::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::battle::{ActionOutcome, Battle, PlayerAction};
use crate::core::common::{PlayerId, ValidationResult};
use crate::core::config::{BattleConfig, ConfigError};
use crate::core::ship::ShipPlacement;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub player: PlayerId,
    pub ships: Vec<ShipPlacement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptStep {
    pub player: PlayerId,
    #[serde(flatten)]
    pub action: PlayerAction,
}

/// Ship ids are handed out in deployment order, starting at 0, so a script
/// can name the ships its own deployments create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub players: [PlayerId; 2],
    #[serde(default)]
    pub config: Option<BattleConfig>,
    pub placements: Vec<Deployment>,
    pub actions: Vec<ScriptStep>,
}

#[derive(Debug)]
pub enum ScriptError {
    Parse(String),
    Io(String),
    Config(ConfigError),
    /// Deployment or start was rejected before any action ran.
    Setup(ValidationResult),
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::Parse(e) => write!(f, "Failed to parse script: {}", e),
            ScriptError::Io(e) => write!(f, "Failed to read script: {}", e),
            ScriptError::Config(e) => write!(f, "{}", e),
            ScriptError::Setup(v) => {
                let codes: Vec<&str> = v.errors.iter().map(|e| e.code.as_str()).collect();
                write!(f, "Script setup rejected: {}", codes.join(", "))
            }
        }
    }
}

impl std::error::Error for ScriptError {}

impl From<ConfigError> for ScriptError {
    fn from(err: ConfigError) -> Self {
        ScriptError::Config(err)
    }
}

impl Script {
    pub fn from_json_str(json: &str) -> Result<Self, ScriptError> {
        serde_json::from_str(json).map_err(|e| ScriptError::Parse(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let text = std::fs::read_to_string(path).map_err(|e| ScriptError::Io(e.to_string()))?;
        Self::from_json_str(&text)
    }

    /// Deploy, start and replay every step. `config` overrides the script's
    /// own configuration.
    pub fn run(&self, config: Option<BattleConfig>) -> Result<(Battle, Vec<ActionOutcome>), ScriptError> {
        let config = config.or_else(|| self.config.clone()).unwrap_or_default();
        let mut battle = Battle::new(config, self.players)?;
        for deployment in &self.placements {
            let verdict = battle.deploy(deployment.player, &deployment.ships);
            if !verdict.is_valid() {
                return Err(ScriptError::Setup(verdict));
            }
        }
        let verdict = battle.start();
        if !verdict.is_valid() {
            return Err(ScriptError::Setup(verdict));
        }
        let outcomes = self
            .actions
            .iter()
            .map(|step| battle.submit(step.player, step.action.clone()))
            .collect();
        Ok((battle, outcomes))
    }
}
