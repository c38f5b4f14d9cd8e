use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::game::resources::ResourceBundle;

pub const PLAYER_COLORS: [&str; 8] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEAA7", "#DDA0DD", "#98D8C8", "#F7DC6F",
];

/// Every tunable rule constant. `Default` is the standard rule set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    pub min_players: usize,
    pub max_players: usize,
    pub starting_resources: ResourceBundle,
    pub starting_garrison: u32,
    pub claim_cost: ResourceBundle,
    pub claim_garrison: u32,
    pub recruit_cost_per_troop: ResourceBundle,
    pub attacker_advantage: f64,
    pub terrain_bonus: f64,
    pub terrain_bonus_chance: f64,
    pub bless_multiplier: f64,
    pub papal_actions_per_day: u32,
    pub colors: Vec<String>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            min_players: 2,
            max_players: 8,
            starting_resources: ResourceBundle::new(100, 50, 10),
            starting_garrison: 10,
            claim_cost: ResourceBundle::gold(20),
            claim_garrison: 5,
            recruit_cost_per_troop: ResourceBundle::new(10, 2, 0),
            attacker_advantage: 1.2,
            terrain_bonus: 1.2,
            terrain_bonus_chance: 0.3,
            bless_multiplier: 1.5,
            papal_actions_per_day: 1,
            colors: PLAYER_COLORS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl RuleSet {
    pub fn color_for(&self, index: usize) -> String {
        if self.colors.is_empty() {
            return String::new();
        }
        self.colors[index % self.colors.len()].clone()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub seed: u64,
    pub rules: RuleSet,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            rules: RuleSet::default(),
        }
    }
}

impl GameConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}
