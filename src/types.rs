use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Gold,
    Food,
    Faith,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [ResourceKind::Gold, ResourceKind::Food, ResourceKind::Faith];
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WarStatus {
    Ongoing,
    Resolved,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WarResult {
    AttackerWins,
    DefenderWins,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PapalActionKind {
    Ceasefire,
    DoubleResources,
    Excommunicate,
    BlessArmy,
}

impl PapalActionKind {
    pub const ALL: [PapalActionKind; 4] = [
        PapalActionKind::Ceasefire,
        PapalActionKind::DoubleResources,
        PapalActionKind::Excommunicate,
        PapalActionKind::BlessArmy,
    ];

    pub fn default_description(self) -> &'static str {
        match self {
            PapalActionKind::Ceasefire => "Force two players into a ceasefire for one day",
            PapalActionKind::DoubleResources => "Double a province's resource output for one day",
            PapalActionKind::Excommunicate => "Remove a player from all alliances for one turn",
            PapalActionKind::BlessArmy => "Give an army combat advantage in next battle",
        }
    }

    /// Whether the action reads `target_province` rather than `target_players`.
    pub fn targets_province(self) -> bool {
        matches!(
            self,
            PapalActionKind::DoubleResources | PapalActionKind::BlessArmy
        )
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn kinds_parse_from_snake_case() {
        assert_eq!(
            PapalActionKind::from_str("double_resources").unwrap(),
            PapalActionKind::DoubleResources
        );
        assert_eq!(ResourceKind::Faith.to_string(), "faith");
        assert_eq!(WarResult::AttackerWins.to_string(), "attacker_wins");
    }
}
