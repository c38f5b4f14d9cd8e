use crate::game::action::GameAction;
use crate::game::game::Game;
use crate::game::ids::PlayerId;
use crate::players::{BasePlayer, GreedyParams, GreedyPlayer, RandomPlayer};

pub struct CliPlayer {
    pub code: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub const CLI_PLAYERS: &[CliPlayer] = &[
    CliPlayer {
        code: "R",
        name: "RandomPlayer",
        description: "Chooses actions at random.",
    },
    CliPlayer {
        code: "G",
        name: "GreedyPlayer",
        description: "Takes the action whose resulting state scores best. First param is EPSILON.",
    },
];

pub enum PlayerInstance {
    Random(RandomPlayer),
    Greedy(GreedyPlayer),
}

impl PlayerInstance {
    pub fn label(&self) -> &'static str {
        match self {
            PlayerInstance::Random(_) => "Random",
            PlayerInstance::Greedy(_) => "Greedy",
        }
    }
}

impl BasePlayer for PlayerInstance {
    fn decide(&self, game: &Game, player: PlayerId, actions: &[GameAction]) -> Option<GameAction> {
        match self {
            PlayerInstance::Random(p) => p.decide(game, player, actions),
            PlayerInstance::Greedy(p) => p.decide(game, player, actions),
        }
    }
}

/// Builds a bot from its legend code. `seed` makes its choices repeatable.
pub fn create_player(code: &str, seed: u64, params: &[&str]) -> Option<PlayerInstance> {
    match code.to_uppercase().as_str() {
        "R" => Some(PlayerInstance::Random(RandomPlayer::seeded(seed))),
        "G" => {
            let epsilon = params.first().and_then(|s| s.parse::<f64>().ok());
            Some(PlayerInstance::Greedy(GreedyPlayer::new(
                Some(GreedyParams::default()),
                epsilon,
                seed,
            )))
        }
        _ => None,
    }
}

pub fn print_player_help() {
    println!("Player Legend:");
    println!("{:<5} {:<25} {}", "CODE", "PLAYER", "DESCRIPTION");
    println!("{}", "-".repeat(80));
    for player in CLI_PLAYERS {
        println!("{:<5} {:<25} {}", player.code, player.name, player.description);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_legend_code_builds_a_player() {
        for player in CLI_PLAYERS {
            assert!(create_player(player.code, 0, &[]).is_some(), "{}", player.code);
        }
        assert!(create_player("X", 0, &[]).is_none());
    }

    #[test]
    fn greedy_reads_epsilon_param() {
        match create_player("g", 0, &["0.25"]) {
            Some(PlayerInstance::Greedy(bot)) => assert_eq!(bot.epsilon, Some(0.25)),
            _ => panic!("expected a greedy player"),
        }
    }
}
