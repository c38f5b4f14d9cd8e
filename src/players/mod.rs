pub mod base;
pub mod random;
pub mod value;

pub use base::BasePlayer;
pub use random::RandomPlayer;
pub use value::{GreedyParams, GreedyPlayer};
