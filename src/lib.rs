#![warn(clippy::all)]
#![deny(rust_2018_idioms)]

pub mod cli;
pub mod game;
pub mod map;
pub mod players;
pub mod testing;
pub mod types;

pub use game::{Game, GameAction, GameConfig, GameError, GameState, StepOutcome};
pub use map::{MapError, MapTemplate};
pub use types::{PapalActionKind, ResourceKind, WarResult, WarStatus};
