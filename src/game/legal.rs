use itertools::Itertools;

use crate::types::ResourceKind;

use super::action::GameAction;
use super::entities::PapalAction;
use super::ids::PlayerId;
use super::resources::ResourceBundle;
use super::state::GameState;

const RECRUIT_BATCHES: [u32; 2] = [1, 5];
const TRADE_GOLD: u32 = 10;

impl GameState {
    /// Candidate actions for `player` that pass every precondition right now.
    ///
    /// This is a representative set, not every parameterization: recruitment
    /// comes in fixed batches, wars commit enough troops to have a chance,
    /// and trades move a small amount of gold. Global actions (`AdvanceDay`,
    /// `ElectPope`) are left to whoever drives the game loop.
    pub fn legal_actions(&self, player_id: PlayerId) -> Vec<GameAction> {
        let Ok(player) = self.player(player_id) else {
            return Vec::new();
        };
        if !self.game_started {
            return Vec::new();
        }
        let rules = &self.config.rules;
        let mut actions = Vec::new();

        if player.resources.can_afford(&rules.claim_cost) {
            actions.extend(self.unowned_provinces().map(|province| GameAction::ClaimProvince {
                player: player_id,
                province: province.id,
            }));
        }

        for &province in &player.provinces {
            for amount in RECRUIT_BATCHES {
                let affordable = rules
                    .recruit_cost_per_troop
                    .checked_scale(amount)
                    .is_some_and(|cost| player.resources.can_afford(&cost));
                if affordable {
                    actions.push(GameAction::RecruitTroops {
                        player: player_id,
                        province,
                        amount,
                    });
                }
            }
        }

        let war_targets = player
            .provinces
            .iter()
            .flat_map(|&province| self.neighbors(province))
            .filter(|neighbor| {
                neighbor.owner.is_some_and(|owner| {
                    owner != player_id && !self.are_allied(player_id, owner)
                })
            })
            .unique_by(|neighbor| neighbor.id);
        for neighbor in war_targets {
            let Some(defender) = neighbor.owner else {
                continue;
            };
            let troops = neighbor.troops.saturating_mul(2).max(1).min(player.total_troops);
            if troops > 0 {
                actions.push(GameAction::DeclareWar {
                    attacker: player_id,
                    defender,
                    target_province: neighbor.id,
                    troops,
                });
            }
        }

        let others: Vec<PlayerId> = self
            .players
            .iter()
            .map(|other| other.id)
            .filter(|other| *other != player_id)
            .collect();
        for &other in &others {
            if !self.are_allied(player_id, other) {
                actions.push(GameAction::FormAlliance {
                    player: player_id,
                    target_player: other,
                    name: format!("Pact of {}", player.name),
                });
            }
            if player.resources.get(ResourceKind::Gold) >= TRADE_GOLD {
                actions.push(GameAction::CreateTradeDeal {
                    from: player_id,
                    to: other,
                    resources: ResourceBundle::gold(TRADE_GOLD),
                    duration: 1,
                });
            }
        }
        for &alliance in &player.alliances {
            actions.push(GameAction::BreakAlliance {
                player: player_id,
                alliance,
            });
        }

        if player.is_pope && self.can_use_papal_action() {
            actions.extend(self.papal_candidates(player_id, &others));
        }
        actions
    }

    fn papal_candidates(&self, pope: PlayerId, others: &[PlayerId]) -> Vec<GameAction> {
        let Ok(player) = self.player(pope) else {
            return Vec::new();
        };
        let mut candidates: Vec<PapalAction> = Vec::new();
        for &province in &player.provinces {
            candidates.push(PapalAction::double_resources(province));
            candidates.push(PapalAction::bless_army(province));
        }
        for &other in others {
            if self.alliances_of(other).next().is_some() {
                candidates.push(PapalAction::excommunicate([other]));
            }
        }
        if self.ongoing_wars().any(|war| war.defender == pope) {
            candidates.push(PapalAction::ceasefire([pope]));
        }
        candidates
            .into_iter()
            .map(|action| GameAction::UsePapalAction { action })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{GameStateBuilder, player_id, province_id};

    use super::*;

    #[test]
    fn every_candidate_is_accepted() {
        let state = GameStateBuilder::new().players(&["Alice", "Bob", "Cleo"]).build();
        for player in state.players.ids() {
            let actions = state.legal_actions(player);
            assert!(!actions.is_empty());
            for action in actions {
                let mut scratch = state.clone();
                assert!(scratch.step(action.clone()).is_ok(), "{action:?} was rejected");
            }
        }
    }

    #[test]
    fn broke_player_cannot_claim_or_recruit() {
        let state = GameStateBuilder::new()
            .resources("Bob", ResourceBundle::zero())
            .resources("Alice", ResourceBundle::new(0, 0, 1))
            .build();
        let bob = player_id(&state, "Bob");
        assert!(state.legal_actions(bob).iter().all(|action| !matches!(
            action,
            GameAction::ClaimProvince { .. }
                | GameAction::RecruitTroops { .. }
                | GameAction::CreateTradeDeal { .. }
        )));
    }

    #[test]
    fn wars_only_target_adjacent_enemy_provinces() {
        let state = GameStateBuilder::new().build();
        let alice = player_id(&state, "Alice");
        for action in state.legal_actions(alice) {
            if let GameAction::DeclareWar {
                target_province, ..
            } = action
            {
                let target = state.province(target_province).unwrap();
                assert_ne!(target.owner, Some(alice));
                assert!(
                    state
                        .neighbors(target_province)
                        .any(|neighbor| neighbor.is_owned_by(alice))
                );
            }
        }
        // Rome (Alice) borders Naples (Bob).
        let naples = province_id(&state, "Naples");
        assert!(state.legal_actions(alice).iter().any(|action| matches!(
            action,
            GameAction::DeclareWar { target_province, .. } if *target_province == naples
        )));
    }

    #[test]
    fn only_the_pope_gets_papal_candidates() {
        let state = GameStateBuilder::new().build();
        let pope = state.pope().unwrap().id;
        let other = state.players.ids().find(|id| *id != pope).unwrap();
        let papal = |id| {
            state
                .legal_actions(id)
                .into_iter()
                .filter(|action| matches!(action, GameAction::UsePapalAction { .. }))
                .count()
        };
        assert!(papal(pope) > 0);
        assert_eq!(papal(other), 0);
    }
}
