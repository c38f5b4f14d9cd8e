use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::game::ids::{AllianceId, PlayerId, ProvinceId, TradeDealId, WarId};
use crate::game::resources::ResourceBundle;
use crate::game::store::Entity;
use crate::types::{PapalActionKind, WarResult, WarStatus};

pub type Members = SmallVec<[PlayerId; 4]>;
pub type Neighbors = SmallVec<[ProvinceId; 6]>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Province {
    pub id: ProvinceId,
    pub name: String,
    pub owner: Option<PlayerId>,
    /// Yield credited to the owner every day.
    pub resources: ResourceBundle,
    pub troops: u32,
    pub position: Position,
    pub adjacent: Neighbors,
    pub terrain_bonus: f64,
}

impl Province {
    pub fn is_owned_by(&self, player: PlayerId) -> bool {
        self.owner == Some(player)
    }

    pub fn is_adjacent_to(&self, other: ProvinceId) -> bool {
        self.adjacent.contains(&other)
    }
}

impl Entity for Province {
    type Id = ProvinceId;

    fn id(&self) -> ProvinceId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub color: String,
    pub resources: ResourceBundle,
    pub provinces: Vec<ProvinceId>,
    /// Sum of garrisons over `provinces`, maintained incrementally.
    pub total_troops: u32,
    pub is_pope: bool,
    pub alliances: Vec<AllianceId>,
    pub wars: Vec<WarId>,
    pub trade_deals: Vec<TradeDealId>,
}

impl Player {
    pub fn new(id: PlayerId, name: String, color: String, resources: ResourceBundle) -> Self {
        Self {
            id,
            name,
            color,
            resources,
            provinces: Vec::new(),
            total_troops: 0,
            is_pope: false,
            alliances: Vec::new(),
            wars: Vec::new(),
            trade_deals: Vec::new(),
        }
    }

    pub fn owns(&self, province: ProvinceId) -> bool {
        self.provinces.contains(&province)
    }

    pub(crate) fn drop_province(&mut self, province: ProvinceId) {
        self.provinces.retain(|id| *id != province);
    }

    pub(crate) fn drop_alliance(&mut self, alliance: AllianceId) {
        self.alliances.retain(|id| *id != alliance);
    }
}

impl Entity for Player {
    type Id = PlayerId;

    fn id(&self) -> PlayerId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alliance {
    pub id: AllianceId,
    pub members: Members,
    pub name: String,
    /// Milliseconds since the Unix epoch.
    pub created_at: u64,
}

impl Alliance {
    pub fn includes(&self, player: PlayerId) -> bool {
        self.members.contains(&player)
    }
}

impl Entity for Alliance {
    type Id = AllianceId;

    fn id(&self) -> AllianceId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct War {
    pub id: WarId,
    pub attacker: PlayerId,
    pub defender: PlayerId,
    pub target_province: ProvinceId,
    /// Troops committed by the attacker at declaration.
    pub troops: u32,
    pub status: WarStatus,
    pub result: Option<WarResult>,
}

impl War {
    pub fn is_ongoing(&self) -> bool {
        self.status == WarStatus::Ongoing
    }

    pub fn involves(&self, player: PlayerId) -> bool {
        self.attacker == player || self.defender == player
    }

    pub(crate) fn conclude(&mut self, result: WarResult) {
        self.status = WarStatus::Resolved;
        self.result = Some(result);
    }
}

impl Entity for War {
    type Id = WarId;

    fn id(&self) -> WarId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeDeal {
    pub id: TradeDealId,
    pub from: PlayerId,
    pub to: PlayerId,
    pub resources: ResourceBundle,
    /// Recorded only; trades settle immediately.
    pub duration: u32,
    pub is_active: bool,
}

impl Entity for TradeDeal {
    type Id = TradeDealId;

    fn id(&self) -> TradeDealId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PapalAction {
    pub kind: PapalActionKind,
    pub target_players: Vec<PlayerId>,
    pub target_province: Option<ProvinceId>,
    pub description: String,
}

impl PapalAction {
    pub fn new(kind: PapalActionKind) -> Self {
        Self {
            kind,
            target_players: Vec::new(),
            target_province: None,
            description: kind.default_description().to_string(),
        }
    }

    pub fn ceasefire(players: impl IntoIterator<Item = PlayerId>) -> Self {
        Self::new(PapalActionKind::Ceasefire).with_players(players)
    }

    pub fn excommunicate(players: impl IntoIterator<Item = PlayerId>) -> Self {
        Self::new(PapalActionKind::Excommunicate).with_players(players)
    }

    pub fn double_resources(province: ProvinceId) -> Self {
        Self::new(PapalActionKind::DoubleResources).with_province(province)
    }

    pub fn bless_army(province: ProvinceId) -> Self {
        Self::new(PapalActionKind::BlessArmy).with_province(province)
    }

    pub fn with_players(mut self, players: impl IntoIterator<Item = PlayerId>) -> Self {
        self.target_players = players.into_iter().collect();
        self
    }

    pub fn with_province(mut self, province: ProvinceId) -> Self {
        self.target_province = Some(province);
        self
    }
}
