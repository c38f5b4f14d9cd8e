pub mod action;
pub mod config;
pub mod entities;
pub mod game;
pub mod ids;
pub mod invariants;
pub mod legal;
pub mod resources;
pub mod state;
pub mod store;

pub use action::GameAction;
pub use config::{ConfigError, GameConfig, PLAYER_COLORS, RuleSet};
pub use entities::{Alliance, PapalAction, Player, Position, Province, TradeDeal, War};
pub use game::Game;
pub use ids::{AllianceId, IdAllocator, PlayerId, ProvinceId, TradeDealId, WarId};
pub use invariants::InvariantViolation;
pub use resources::{ResourceBundle, ResourceError};
pub use state::{Clock, EntityRef, GameError, GameEvent, GameState, StepOutcome, reduce};
pub use store::{Entity, EntityStore};
