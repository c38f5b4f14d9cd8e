use std::cell::RefCell;

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::game::action::GameAction;
use crate::game::game::Game;
use crate::game::ids::PlayerId;
use crate::players::BasePlayer;
use crate::types::ResourceKind;

/// Scores every candidate by the state it leads to and takes the best.
pub struct GreedyPlayer {
    pub params: GreedyParams,
    pub epsilon: Option<f64>,
    rng: RefCell<StdRng>,
}

#[derive(Debug, Clone)]
pub struct GreedyParams {
    pub provinces: f64,
    pub troops: f64,
    pub gold: f64,
    pub food: f64,
    pub faith: f64,
    pub pope: f64,
    pub enemy_provinces: f64,
    pub allies: f64,
    pub open_wars: f64,
}

impl Default for GreedyParams {
    fn default() -> Self {
        Self {
            provinces: 1e3,
            troops: 10.0,
            gold: 1.0,
            food: 0.5,
            faith: 2.0,
            pope: 50.0,
            enemy_provinces: -100.0,
            allies: 20.0,
            open_wars: -5.0,
        }
    }
}

impl GreedyPlayer {
    pub fn new(params: Option<GreedyParams>, epsilon: Option<f64>, seed: u64) -> Self {
        Self {
            params: params.unwrap_or_default(),
            epsilon,
            rng: RefCell::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl BasePlayer for GreedyPlayer {
    fn decide(&self, game: &Game, player: PlayerId, actions: &[GameAction]) -> Option<GameAction> {
        if actions.len() == 1 {
            return actions.first().cloned();
        }

        if let Some(epsilon) = self.epsilon {
            let mut rng = self.rng.borrow_mut();
            if rng.gen_bool(epsilon.clamp(0.0, 1.0)) {
                return actions.choose(&mut *rng).cloned();
            }
        }

        let baseline = evaluate_state(game, player, &self.params);
        let mut best_value = baseline;
        let mut best_action = None;

        for action in actions {
            let mut game_copy = game.copy();
            if game_copy.execute(action.clone()).is_err() {
                continue;
            }
            let value = evaluate_state(&game_copy, player, &self.params);
            if value > best_value {
                best_value = value;
                best_action = Some(action.clone());
            }
        }

        best_action
    }
}

/// Wars are scored after a speculative resolution so the bot sees their outcome.
fn evaluate_state(game: &Game, player_id: PlayerId, params: &GreedyParams) -> f64 {
    let mut settled = game.copy();
    let pending: Vec<_> = settled.state.ongoing_wars().map(|war| war.id).collect();
    for war in pending {
        let _ = settled.execute(GameAction::ResolveWar { war });
    }

    let state = &settled.state;
    let Ok(player) = state.player(player_id) else {
        return f64::NEG_INFINITY;
    };
    let enemy_provinces: usize = state
        .players
        .iter()
        .filter(|other| other.id != player_id)
        .map(|other| other.provinces.len())
        .max()
        .unwrap_or(0);
    let allies = state.alliances_of(player_id).count();
    let open_wars = game
        .state
        .ongoing_wars()
        .filter(|war| war.involves(player_id))
        .count();

    player.provinces.len() as f64 * params.provinces
        + f64::from(player.total_troops) * params.troops
        + f64::from(player.resources.get(ResourceKind::Gold)) * params.gold
        + f64::from(player.resources.get(ResourceKind::Food)) * params.food
        + f64::from(player.resources.get(ResourceKind::Faith)) * params.faith
        + if player.is_pope { params.pope } else { 0.0 }
        + enemy_provinces as f64 * params.enemy_provinces
        + allies as f64 * params.allies
        + open_wars as f64 * params.open_wars
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameConfig;
    use crate::game::config::RuleSet;

    #[test]
    fn greedy_prefers_claiming_over_passing() {
        let rules = RuleSet {
            terrain_bonus_chance: 0.0,
            ..RuleSet::default()
        };
        let config = GameConfig {
            seed: 1,
            rules,
        };
        let game = Game::start(config, ["Alice", "Bob"]).unwrap();
        let alice = game.state.players.ids().next().unwrap();
        let athens = game.state.province_by_name("Athens").unwrap().id;
        let claim = GameAction::ClaimProvince {
            player: alice,
            province: athens,
        };
        let actions = vec![
            GameAction::CreateTradeDeal {
                from: alice,
                to: game.state.players.ids().nth(1).unwrap(),
                resources: crate::game::ResourceBundle::gold(10),
                duration: 1,
            },
            claim.clone(),
        ];
        let bot = GreedyPlayer::new(None, None, 0);
        assert_eq!(bot.decide(&game, alice, &actions), Some(claim));
    }

    #[test]
    fn greedy_passes_when_every_option_hurts() {
        let game = Game::start(GameConfig::default(), ["Alice", "Bob"]).unwrap();
        let ids: Vec<PlayerId> = game.state.players.ids().collect();
        let gift = |gold| GameAction::CreateTradeDeal {
            from: ids[0],
            to: ids[1],
            resources: crate::game::ResourceBundle::gold(gold),
            duration: 1,
        };
        let bot = GreedyPlayer::new(None, None, 0);
        assert_eq!(bot.decide(&game, ids[0], &[gift(10), gift(20)]), None);
    }
}
