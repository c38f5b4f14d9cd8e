use std::collections::HashMap;
use std::time::Duration;

use crate::game::game::Game;

/// Per-seat totals across games. Seats are creation indices, so they line up
/// with the `--players` list.
#[derive(Debug, Default, Clone)]
pub struct SeatStats {
    pub wins: u32,
    pub provinces: u64,
    pub troops: u64,
    pub gold: u64,
    pub pope_days: u64,
}

#[derive(Debug, Default, Clone)]
pub struct GameStats {
    pub seats: HashMap<usize, SeatStats>,
    pub games: u32,
    pub total_days: u64,
    pub total_actions: u64,
    pub total_duration: Duration,
}

impl GameStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_game(&mut self, game: &Game, actions: u64, duration: Duration) {
        self.games += 1;
        self.total_duration += duration;
        self.total_days += u64::from(game.state.game_day.saturating_sub(1));
        self.total_actions += actions;

        let leader = game.leader();
        for (seat, player) in game.state.players.iter().enumerate() {
            let entry = self.seats.entry(seat).or_default();
            entry.provinces += player.provinces.len() as u64;
            entry.troops += u64::from(player.total_troops);
            entry.gold += u64::from(player.resources.get(crate::types::ResourceKind::Gold));
            if leader == Some(player.id) {
                entry.wins += 1;
            }
        }
    }

    /// Credits one day of papacy to whoever holds it at `seat`.
    pub fn record_pope_day(&mut self, seat: usize) {
        self.seats.entry(seat).or_default().pope_days += 1;
    }

    pub fn merge(&mut self, other: GameStats) {
        self.games += other.games;
        self.total_days += other.total_days;
        self.total_actions += other.total_actions;
        self.total_duration += other.total_duration;
        for (seat, stats) in other.seats {
            let entry = self.seats.entry(seat).or_default();
            entry.wins += stats.wins;
            entry.provinces += stats.provinces;
            entry.troops += stats.troops;
            entry.gold += stats.gold;
            entry.pope_days += stats.pope_days;
        }
    }

    pub fn average(&self, total: u64) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        total as f64 / f64::from(self.games)
    }

    pub fn get_avg_duration(&self) -> Duration {
        if self.games == 0 {
            return Duration::ZERO;
        }
        self.total_duration / self.games
    }
}

pub struct StatisticsAccumulator {
    pub stats: GameStats,
}

impl StatisticsAccumulator {
    pub fn new() -> Self {
        Self {
            stats: GameStats::new(),
        }
    }

    /// Call once per day, before it advances.
    pub fn step(&mut self, game: &Game) {
        if let Some(seat) = game.state.players.iter().position(|p| p.is_pope) {
            self.stats.record_pope_day(seat);
        }
    }

    pub fn after(&mut self, game: &Game, actions: u64, duration: Duration) {
        self.stats.record_game(game, actions, duration);
    }
}

impl Default for StatisticsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameConfig;
    use crate::game::action::GameAction;

    #[test]
    fn records_one_winner_per_game() {
        let mut game = Game::start(GameConfig::default(), ["Alice", "Bob"]).unwrap();
        let mut acc = StatisticsAccumulator::new();
        for _ in 0..3 {
            acc.step(&game);
            game.execute(GameAction::AdvanceDay).unwrap();
        }
        acc.after(&game, 0, Duration::from_millis(4));

        let stats = &acc.stats;
        assert_eq!(stats.games, 1);
        assert_eq!(stats.total_days, 3);
        assert_eq!(stats.seats.values().map(|s| s.wins).sum::<u32>(), 1);
        assert_eq!(stats.seats.values().map(|s| s.pope_days).sum::<u64>(), 3);
        assert_eq!(stats.average(stats.seats[&0].provinces), 14.0);
    }

    #[test]
    fn merge_adds_up() {
        let mut a = GameStats::new();
        a.games = 1;
        a.record_pope_day(0);
        let mut b = GameStats::new();
        b.games = 2;
        b.record_pope_day(0);
        b.record_pope_day(1);
        a.merge(b);
        assert_eq!(a.games, 3);
        assert_eq!(a.seats[&0].pope_days, 2);
        assert_eq!(a.seats[&1].pope_days, 1);
    }
}
