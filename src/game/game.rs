use tracing::debug;
use uuid::Uuid;

use crate::game::action::GameAction;
use crate::game::ids::PlayerId;
use crate::game::state::{GameError, StepOutcome};
use crate::game::{GameConfig, GameState};
use crate::players::BasePlayer;

/// One play session: the state plus the identity and seed it was created with.
pub struct Game {
    pub seed: u64,
    pub id: Uuid,
    pub state: GameState,
}

impl Game {
    pub fn new(config: GameConfig) -> Self {
        Self {
            seed: config.seed,
            id: Uuid::new_v4(),
            state: GameState::new(config),
        }
    }

    /// Creates the session and runs `InitializeGame` with `names`.
    pub fn start<S: Into<String>>(
        config: GameConfig,
        names: impl IntoIterator<Item = S>,
    ) -> Result<Self, GameError> {
        let mut game = Self::new(config);
        game.execute(GameAction::initialize(names))?;
        Ok(game)
    }

    pub fn execute(&mut self, action: GameAction) -> Result<StepOutcome, GameError> {
        self.state.step(action)
    }

    /// Lets every player act up to `actions_per_day` times, in creation
    /// order, then advances the day. `players[i]` drives the i-th player.
    pub fn play_day<P: BasePlayer + ?Sized>(
        &mut self,
        players: &[&P],
        actions_per_day: usize,
    ) -> Result<Vec<GameAction>, GameError> {
        let seats: Vec<PlayerId> = self.state.players.ids().collect();
        let mut taken = Vec::new();
        for _ in 0..actions_per_day {
            for (&seat, bot) in seats.iter().zip(players) {
                let actions = self.state.legal_actions(seat);
                if actions.is_empty() {
                    continue;
                }
                let Some(action) = bot.decide(self, seat, &actions) else {
                    continue;
                };
                match self.execute(action.clone()) {
                    Ok(_) => taken.push(action),
                    Err(err) => debug!(%seat, %err, "bot action rejected"),
                }
            }
        }
        self.execute(GameAction::AdvanceDay)?;
        Ok(taken)
    }

    /// Plays `days` full days and returns the leader afterwards.
    pub fn play<P: BasePlayer + ?Sized>(
        &mut self,
        players: &[&P],
        days: u32,
        actions_per_day: usize,
    ) -> Result<Option<PlayerId>, GameError> {
        for _ in 0..days {
            self.play_day(players, actions_per_day)?;
        }
        Ok(self.leader())
    }

    /// Most provinces, then most troops; earlier players win ties.
    pub fn leader(&self) -> Option<PlayerId> {
        let mut best: Option<(PlayerId, usize, u32)> = None;
        for player in &self.state.players {
            let score = (player.provinces.len(), player.total_troops);
            match best {
                Some((_, provinces, troops)) if score <= (provinces, troops) => {}
                _ => best = Some((player.id, score.0, score.1)),
            }
        }
        best.map(|(id, _, _)| id)
    }

    pub fn copy(&self) -> Self {
        Self {
            seed: self.seed,
            id: self.id,
            state: self.state.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::players::RandomPlayer;

    #[test]
    fn start_initializes_the_state() {
        let game = Game::start(GameConfig::with_seed(3), ["Alice", "Bob"]).unwrap();
        assert_eq!(game.seed, 3);
        assert!(game.state.game_started);
        assert_eq!(game.state.players.len(), 2);
    }

    #[test]
    fn random_bots_play_without_breaking_invariants() {
        let mut game = Game::start(GameConfig::with_seed(11), ["Alice", "Bob", "Cleo"]).unwrap();
        let bot = RandomPlayer::seeded(5);
        let seats: Vec<&RandomPlayer> = vec![&bot; 3];
        for _ in 0..10 {
            game.play_day(&seats, 2).unwrap();
            assert_eq!(game.state.check_invariants(), Ok(()));
        }
        assert_eq!(game.state.game_day, 11);
        assert!(game.leader().is_some());
    }

    #[test]
    fn play_runs_the_requested_days() {
        let mut game = Game::start(GameConfig::with_seed(4), ["Alice", "Bob"]).unwrap();
        let bots = [RandomPlayer::seeded(1), RandomPlayer::seeded(2)];
        let seats: Vec<&dyn BasePlayer> = bots.iter().map(|bot| bot as &dyn BasePlayer).collect();
        let leader = game.play(&seats, 5, 1).unwrap();
        assert_eq!(game.state.game_day, 6);
        assert_eq!(leader, game.leader());
    }

    #[test]
    fn copy_is_independent() {
        let game = Game::start(GameConfig::default(), ["Alice", "Bob"]).unwrap();
        let mut copy = game.copy();
        copy.execute(GameAction::AdvanceDay).unwrap();
        assert_eq!(game.state.game_day, 1);
        assert_eq!(copy.id, game.id);
    }
}
