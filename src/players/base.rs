use crate::game::{action::GameAction, game::Game, ids::PlayerId};

pub trait BasePlayer {
    /// Picks one of `actions` for `player`, or `None` to pass.
    fn decide(&self, game: &Game, player: PlayerId, actions: &[GameAction]) -> Option<GameAction>;
}
