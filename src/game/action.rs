use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::game::entities::PapalAction;
use crate::game::ids::{AllianceId, PlayerId, ProvinceId, WarId};
use crate::game::resources::ResourceBundle;

/// Every state transition the engine accepts. [`GameState::step`] matches on
/// this exhaustively.
///
/// [`GameState::step`]: crate::game::GameState::step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, IntoStaticStr)]
#[serde(tag = "type", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GameAction {
    InitializeGame {
        player_names: Vec<String>,
    },
    ElectPope,
    AdvanceDay,
    ClaimProvince {
        player: PlayerId,
        province: ProvinceId,
    },
    DeclareWar {
        attacker: PlayerId,
        defender: PlayerId,
        target_province: ProvinceId,
        troops: u32,
    },
    ResolveWar {
        war: WarId,
    },
    FormAlliance {
        player: PlayerId,
        target_player: PlayerId,
        name: String,
    },
    BreakAlliance {
        player: PlayerId,
        alliance: AllianceId,
    },
    CreateTradeDeal {
        from: PlayerId,
        to: PlayerId,
        resources: ResourceBundle,
        duration: u32,
    },
    UsePapalAction {
        action: PapalAction,
    },
    RecruitTroops {
        player: PlayerId,
        province: ProvinceId,
        amount: u32,
    },
}

impl GameAction {
    pub fn initialize<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        GameAction::InitializeGame {
            player_names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn label(&self) -> &'static str {
        self.into()
    }

    /// The player acting, when the action has one.
    pub fn actor(&self) -> Option<PlayerId> {
        match self {
            GameAction::ClaimProvince { player, .. }
            | GameAction::FormAlliance { player, .. }
            | GameAction::BreakAlliance { player, .. }
            | GameAction::RecruitTroops { player, .. } => Some(*player),
            GameAction::DeclareWar { attacker, .. } => Some(*attacker),
            GameAction::CreateTradeDeal { from, .. } => Some(*from),
            GameAction::InitializeGame { .. }
            | GameAction::ElectPope
            | GameAction::AdvanceDay
            | GameAction::ResolveWar { .. }
            | GameAction::UsePapalAction { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn actions_serialize_with_type_tag() {
        let action = GameAction::RecruitTroops {
            player: PlayerId(Uuid::nil()),
            province: ProvinceId(Uuid::nil()),
            amount: 3,
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "recruit_troops");
        assert_eq!(json["amount"], 3);
        let back: GameAction = serde_json::from_value(json).unwrap();
        assert_eq!(back, action);
    }

    #[test]
    fn label_matches_serde_tag() {
        assert_eq!(GameAction::AdvanceDay.label(), "advance_day");
        assert_eq!(GameAction::initialize(["a", "b"]).label(), "initialize_game");
    }
}
