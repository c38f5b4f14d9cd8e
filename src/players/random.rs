use std::cell::RefCell;

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::game::action::GameAction;
use crate::game::game::Game;
use crate::game::ids::PlayerId;
use crate::players::BasePlayer;

/// Uniform choice over the candidate actions.
pub struct RandomPlayer {
    rng: RefCell<StdRng>,
}

impl RandomPlayer {
    pub fn new() -> Self {
        Self {
            rng: RefCell::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: RefCell::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl BasePlayer for RandomPlayer {
    fn decide(&self, _game: &Game, _player: PlayerId, actions: &[GameAction]) -> Option<GameAction> {
        let mut rng = self.rng.borrow_mut();
        actions.choose(&mut *rng).cloned()
    }
}
