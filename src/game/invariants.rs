use std::collections::HashSet;

use crate::types::WarStatus;

use super::ids::{AllianceId, PlayerId, ProvinceId, WarId};
use super::state::GameState;

/// A denormalized field that disagrees with its source of truth.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("province {province} is owned by missing player {owner}")]
    DanglingOwner {
        province: ProvinceId,
        owner: PlayerId,
    },
    #[error("player {player} province list does not match ownership")]
    ProvinceListMismatch { player: PlayerId },
    #[error("player {player} reports {reported} troops but garrisons hold {actual}")]
    TroopDrift {
        player: PlayerId,
        reported: u32,
        actual: u64,
    },
    #[error("adjacency {from} -> {to} is not mirrored")]
    AsymmetricAdjacency { from: ProvinceId, to: ProvinceId },
    #[error("{count} players flagged as pope")]
    PopeCount { count: usize },
    #[error("cached pope {cached:?} differs from flagged pope {flagged:?}")]
    StalePope {
        cached: Option<PlayerId>,
        flagged: Option<PlayerId>,
    },
    #[error("alliance {alliance} has fewer than two members")]
    UndersizedAlliance { alliance: AllianceId },
    #[error("alliance {alliance} and player {player} disagree on membership")]
    MembershipMismatch {
        alliance: AllianceId,
        player: PlayerId,
    },
    #[error("war {war} is missing from a combatant's war list or lists a stranger")]
    WarListMismatch { war: WarId },
    #[error("war {war} status and result disagree")]
    WarResultMismatch { war: WarId },
}

impl GameState {
    /// Recomputes every derived field from its source and reports the first disagreement.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        self.check_ownership()?;
        self.check_adjacency()?;
        self.check_pope()?;
        self.check_alliances()?;
        self.check_wars()
    }

    fn check_ownership(&self) -> Result<(), InvariantViolation> {
        for province in &self.provinces {
            if let Some(owner) = province.owner {
                if !self.players.contains(owner) {
                    return Err(InvariantViolation::DanglingOwner {
                        province: province.id,
                        owner,
                    });
                }
            }
        }

        for player in &self.players {
            let listed: HashSet<ProvinceId> = player.provinces.iter().copied().collect();
            let owned: HashSet<ProvinceId> = self
                .provinces
                .iter()
                .filter(|province| province.is_owned_by(player.id))
                .map(|province| province.id)
                .collect();
            if listed.len() != player.provinces.len() || listed != owned {
                return Err(InvariantViolation::ProvinceListMismatch { player: player.id });
            }

            let actual: u64 = self
                .provinces
                .iter()
                .filter(|province| province.is_owned_by(player.id))
                .map(|province| u64::from(province.troops))
                .sum();
            if u64::from(player.total_troops) != actual {
                return Err(InvariantViolation::TroopDrift {
                    player: player.id,
                    reported: player.total_troops,
                    actual,
                });
            }
        }
        Ok(())
    }

    fn check_adjacency(&self) -> Result<(), InvariantViolation> {
        for province in &self.provinces {
            for &neighbor in &province.adjacent {
                let mirrored = self
                    .provinces
                    .get(neighbor)
                    .is_some_and(|other| other.is_adjacent_to(province.id));
                if !mirrored {
                    return Err(InvariantViolation::AsymmetricAdjacency {
                        from: province.id,
                        to: neighbor,
                    });
                }
            }
        }
        Ok(())
    }

    fn check_pope(&self) -> Result<(), InvariantViolation> {
        let flagged: Vec<PlayerId> = self
            .players
            .iter()
            .filter(|player| player.is_pope)
            .map(|player| player.id)
            .collect();
        let expected = usize::from(self.game_started && !self.players.is_empty());
        if flagged.len() != expected {
            return Err(InvariantViolation::PopeCount {
                count: flagged.len(),
            });
        }
        let flagged = flagged.first().copied();
        if self.game_started && self.current_pope != flagged {
            return Err(InvariantViolation::StalePope {
                cached: self.current_pope,
                flagged,
            });
        }
        Ok(())
    }

    fn check_alliances(&self) -> Result<(), InvariantViolation> {
        for alliance in &self.alliances {
            if alliance.members.len() < 2 {
                return Err(InvariantViolation::UndersizedAlliance {
                    alliance: alliance.id,
                });
            }
            for &member in &alliance.members {
                let registered = self
                    .players
                    .get(member)
                    .is_some_and(|player| player.alliances.contains(&alliance.id));
                if !registered {
                    return Err(InvariantViolation::MembershipMismatch {
                        alliance: alliance.id,
                        player: member,
                    });
                }
            }
        }
        for player in &self.players {
            for &alliance_id in &player.alliances {
                let member = self
                    .alliances
                    .get(alliance_id)
                    .is_some_and(|alliance| alliance.includes(player.id));
                if !member {
                    return Err(InvariantViolation::MembershipMismatch {
                        alliance: alliance_id,
                        player: player.id,
                    });
                }
            }
        }
        Ok(())
    }

    fn check_wars(&self) -> Result<(), InvariantViolation> {
        for war in &self.wars {
            let resolved = war.status == WarStatus::Resolved;
            if resolved != war.result.is_some() {
                return Err(InvariantViolation::WarResultMismatch { war: war.id });
            }
            let listed_by = |player: PlayerId| {
                self.players
                    .get(player)
                    .is_some_and(|p| p.wars.contains(&war.id))
            };
            if !listed_by(war.attacker) || !listed_by(war.defender) {
                return Err(InvariantViolation::WarListMismatch { war: war.id });
            }
        }
        for player in &self.players {
            for &war_id in &player.wars {
                let involved = self
                    .wars
                    .get(war_id)
                    .is_some_and(|war| war.involves(player.id));
                if !involved {
                    return Err(InvariantViolation::WarListMismatch { war: war_id });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::GameStateBuilder;

    use super::*;

    #[test]
    fn fresh_game_satisfies_invariants() {
        let state = GameStateBuilder::new().players(&["Alice", "Bob", "Cleo"]).build();
        assert_eq!(state.check_invariants(), Ok(()));
    }

    #[test]
    fn troop_drift_is_reported() {
        let mut state = GameStateBuilder::new().build();
        let alice = state.players.ids().next().unwrap();
        state.players.get_mut(alice).unwrap().total_troops += 1;
        assert!(matches!(
            state.check_invariants(),
            Err(InvariantViolation::TroopDrift { player, .. }) if player == alice
        ));
    }

    #[test]
    fn stale_pope_cache_is_reported() {
        let mut state = GameStateBuilder::new().build();
        let ids: Vec<PlayerId> = state.players.ids().collect();
        state.current_pope = Some(ids[1]);
        assert!(matches!(
            state.check_invariants(),
            Err(InvariantViolation::StalePope { .. })
        ));
    }

    #[test]
    fn one_way_adjacency_is_reported() {
        let mut state = GameStateBuilder::new().build();
        let first = state.provinces.ids().next().unwrap();
        let neighbor = state.provinces.get(first).unwrap().adjacent[0];
        state
            .provinces
            .get_mut(neighbor)
            .unwrap()
            .adjacent
            .retain(|id| *id != first);
        assert_eq!(
            state.check_invariants(),
            Err(InvariantViolation::AsymmetricAdjacency {
                from: first,
                to: neighbor
            })
        );
    }
}
