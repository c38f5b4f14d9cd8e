use std::collections::HashSet;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use smallvec::smallvec;
use tracing::{debug, info};

use crate::map::{self, MapError, MapTemplate};
use crate::types::{PapalActionKind, ResourceKind, WarResult, WarStatus};

use super::{
    action::GameAction,
    config::GameConfig,
    entities::{Alliance, Members, PapalAction, Player, Province, TradeDeal, War},
    ids::{AllianceId, IdAllocator, PlayerId, ProvinceId, TradeDealId, WarId},
    resources::{ResourceBundle, ResourceError},
    store::EntityStore,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub config: GameConfig,
    pub players: EntityStore<Player>,
    pub provinces: EntityStore<Province>,
    pub alliances: EntityStore<Alliance>,
    pub wars: EntityStore<War>,
    pub trade_deals: EntityStore<TradeDeal>,
    /// Cached copy of whichever player carries `is_pope`.
    pub current_pope: Option<PlayerId>,
    pub papal_actions_used: u32,
    pub game_day: u32,
    /// Milliseconds since the Unix epoch.
    pub last_update: u64,
    pub game_started: bool,
    #[serde(default)]
    pub clock: Clock,
    ids: IdAllocator,
}

/// Where the state's epoch-millisecond timestamps come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Clock {
    #[default]
    System,
    /// Always reads the given instant, so replays stamp identical times.
    Fixed(u64),
}

impl Clock {
    pub fn now(self) -> u64 {
        match self {
            Clock::System => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_millis() as u64)
                .unwrap_or(0),
            Clock::Fixed(millis) => millis,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub events: Vec<GameEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    GameInitialized {
        players: usize,
        provinces: usize,
    },
    PopeElected {
        pope: PlayerId,
        faith: u32,
    },
    ResourcesCollected {
        player: PlayerId,
        bundle: ResourceBundle,
    },
    DayAdvanced {
        day: u32,
    },
    ProvinceClaimed {
        player: PlayerId,
        province: ProvinceId,
    },
    WarDeclared {
        war: WarId,
        attacker: PlayerId,
        defender: PlayerId,
        province: ProvinceId,
        troops: u32,
    },
    WarResolved {
        war: WarId,
        result: WarResult,
        province: ProvinceId,
        garrison: u32,
    },
    CeasefireEnforced {
        war: WarId,
    },
    AllianceFormed {
        alliance: AllianceId,
        members: Members,
    },
    AllianceLeft {
        alliance: AllianceId,
        player: PlayerId,
    },
    AllianceDissolved {
        alliance: AllianceId,
    },
    TradeExecuted {
        deal: TradeDealId,
        from: PlayerId,
        to: PlayerId,
        resources: ResourceBundle,
    },
    PapalActionUsed {
        pope: PlayerId,
        kind: PapalActionKind,
    },
    ArmyBlessed {
        province: ProvinceId,
        terrain_bonus: f64,
    },
    TroopsRecruited {
        player: PlayerId,
        province: ProvinceId,
        amount: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    Player(PlayerId),
    Province(ProvinceId),
    War(WarId),
    Alliance(AllianceId),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Player(id) => write!(f, "player {id}"),
            EntityRef::Province(id) => write!(f, "province {id}"),
            EntityRef::War(id) => write!(f, "war {id}"),
            EntityRef::Alliance(id) => write!(f, "alliance {id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GameError {
    #[error("{0} not found")]
    NotFound(EntityRef),
    #[error("game already started")]
    GameAlreadyStarted,
    #[error("need at least {min} players, got {actual}")]
    NotEnoughPlayers { min: usize, actual: usize },
    #[error("at most {max} players allowed, got {actual}")]
    TooManyPlayers { max: usize, actual: usize },
    #[error("player names must not be empty")]
    EmptyPlayerName,
    #[error("player name {0:?} is already taken")]
    DuplicatePlayerName(String),
    #[error("province already owned")]
    ProvinceAlreadyOwned,
    #[error(transparent)]
    InsufficientResources(#[from] ResourceError),
    #[error("amount must be positive")]
    NonPositiveAmount,
    #[error("trade offers no resources")]
    EmptyTrade,
    #[error("insufficient troops: have {available}, need {requested}")]
    InsufficientTroops { available: u32, requested: u32 },
    #[error("province is not owned by the acting player")]
    NotProvinceOwner,
    #[error("target province is not owned by the named defender")]
    DefenderMismatch,
    #[error("a player cannot ally with themselves")]
    SelfAlliance,
    #[error("war already resolved")]
    WarNotOngoing,
    #[error("there is no pope")]
    NoPope,
    #[error("papal actions for today are used up")]
    PapalActionsExhausted,
    #[error("map generation failed: {0}")]
    Map(#[from] MapError),
}

impl GameError {
    /// Precondition rejections, as opposed to references to missing entities.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, GameError::NotFound(_))
    }
}

impl GameState {
    pub fn new(config: GameConfig) -> Self {
        Self::with_clock(config, Clock::System)
    }

    pub fn with_clock(config: GameConfig, clock: Clock) -> Self {
        let ids = IdAllocator::new(config.seed);
        Self {
            config,
            players: EntityStore::new(),
            provinces: EntityStore::new(),
            alliances: EntityStore::new(),
            wars: EntityStore::new(),
            trade_deals: EntityStore::new(),
            current_pope: None,
            papal_actions_used: 0,
            game_day: 1,
            last_update: clock.now(),
            game_started: false,
            clock,
            ids,
        }
    }

    /// Applies one action. On `Err` the state is left exactly as it was.
    pub fn step(&mut self, action: GameAction) -> Result<StepOutcome, GameError> {
        let label = action.label();
        let mut outcome = StepOutcome::default();
        let result = match action {
            GameAction::InitializeGame { player_names } => {
                self.initialize_game(&player_names, &mut outcome)
            }
            GameAction::ElectPope => {
                self.elect_pope(&mut outcome);
                Ok(())
            }
            GameAction::AdvanceDay => self.advance_day(&mut outcome),
            GameAction::ClaimProvince { player, province } => {
                self.claim_province(player, province, &mut outcome)
            }
            GameAction::DeclareWar {
                attacker,
                defender,
                target_province,
                troops,
            } => self.declare_war(attacker, defender, target_province, troops, &mut outcome),
            GameAction::ResolveWar { war } => self.resolve_war(war, &mut outcome),
            GameAction::FormAlliance {
                player,
                target_player,
                name,
            } => self.form_alliance(player, target_player, name, &mut outcome),
            GameAction::BreakAlliance { player, alliance } => {
                self.break_alliance(player, alliance, &mut outcome)
            }
            GameAction::CreateTradeDeal {
                from,
                to,
                resources,
                duration,
            } => self.create_trade_deal(from, to, resources, duration, &mut outcome),
            GameAction::UsePapalAction { action } => self.use_papal_action(&action, &mut outcome),
            GameAction::RecruitTroops {
                player,
                province,
                amount,
            } => self.recruit_troops(player, province, amount, &mut outcome),
        };

        match result {
            Ok(()) => {
                debug!(action = label, events = outcome.events.len(), "action applied");
                Ok(outcome)
            }
            Err(err) => {
                debug!(action = label, %err, "action rejected");
                Err(err)
            }
        }
    }

    fn initialize_game(
        &mut self,
        names: &[String],
        outcome: &mut StepOutcome,
    ) -> Result<(), GameError> {
        if self.game_started {
            return Err(GameError::GameAlreadyStarted);
        }
        let names = validate_player_names(names, &self.config)?;

        let mut ids = self.ids.clone();
        let mut provinces = map::generate(
            MapTemplate::europe(),
            &self.config.rules,
            self.config.seed,
            &mut ids,
        )?;

        let rules = &self.config.rules;
        let mut players = EntityStore::new();
        for (index, name) in names.into_iter().enumerate() {
            let id: PlayerId = ids.next();
            players.insert(Player::new(
                id,
                name,
                rules.color_for(index),
                rules.starting_resources,
            ));
        }

        // Even split in creation order; the remainder stays neutral.
        let per_player = provinces.len() / players.len();
        let province_ids: Vec<ProvinceId> = provinces.ids().collect();
        for (player, granted) in players.iter_mut().zip(province_ids.chunks(per_player.max(1))) {
            if per_player == 0 {
                break;
            }
            for &province_id in granted {
                if let Some(province) = provinces.get_mut(province_id) {
                    province.owner = Some(player.id);
                    province.troops = rules.starting_garrison;
                    player.provinces.push(province_id);
                    player.total_troops += rules.starting_garrison;
                }
            }
        }

        outcome.events.push(GameEvent::GameInitialized {
            players: players.len(),
            provinces: provinces.len(),
        });
        info!(
            players = players.len(),
            provinces = provinces.len(),
            seed = self.config.seed,
            "game initialized"
        );

        self.ids = ids;
        self.players = players;
        self.provinces = provinces;
        self.game_started = true;
        self.last_update = self.clock.now();
        self.elect_pope(outcome);
        Ok(())
    }

    /// Crowns the first player with strictly the most faith. No-op without players.
    fn elect_pope(&mut self, outcome: &mut StepOutcome) {
        let mut best: Option<(PlayerId, u32)> = None;
        for player in self.players.iter_mut() {
            player.is_pope = false;
            let faith = player.resources.get(ResourceKind::Faith);
            match best {
                Some((_, top)) if faith <= top => {}
                _ => best = Some((player.id, faith)),
            }
        }

        let Some((pope, faith)) = best else {
            return;
        };
        if let Some(player) = self.players.get_mut(pope) {
            player.is_pope = true;
        }
        self.current_pope = Some(pope);
        self.papal_actions_used = 0;
        outcome.events.push(GameEvent::PopeElected { pope, faith });
        info!(%pope, faith, day = self.game_day, "pope elected");
    }

    fn advance_day(&mut self, outcome: &mut StepOutcome) -> Result<(), GameError> {
        for province in &self.provinces {
            if let Some(owner) = province.owner {
                self.player(owner)?;
            }
        }
        let pending: Vec<WarId> = self
            .wars
            .iter()
            .filter(|war| war.is_ongoing())
            .map(|war| war.id)
            .collect();
        for &war in &pending {
            self.validate_war(war)?;
        }

        let mut collected: Vec<(PlayerId, ResourceBundle)> = Vec::new();
        for province in &self.provinces {
            let Some(owner) = province.owner else {
                continue;
            };
            if let Some(player) = self.players.get_mut(owner) {
                player.resources.add_bundle(&province.resources);
            }
            match collected.iter_mut().find(|(id, _)| *id == owner) {
                Some((_, bundle)) => bundle.add_bundle(&province.resources),
                None => collected.push((owner, province.resources)),
            }
        }
        outcome.events.extend(
            collected
                .into_iter()
                .map(|(player, bundle)| GameEvent::ResourcesCollected { player, bundle }),
        );

        for war in pending {
            self.apply_war_resolution(war, outcome);
        }

        self.game_day += 1;
        self.last_update = self.clock.now();
        outcome.events.push(GameEvent::DayAdvanced {
            day: self.game_day,
        });
        info!(day = self.game_day, "day advanced");
        self.elect_pope(outcome);
        Ok(())
    }

    fn claim_province(
        &mut self,
        player_id: PlayerId,
        province_id: ProvinceId,
        outcome: &mut StepOutcome,
    ) -> Result<(), GameError> {
        let rules = &self.config.rules;
        let player = self
            .players
            .get_mut(player_id)
            .ok_or(GameError::NotFound(EntityRef::Player(player_id)))?;
        let province = self
            .provinces
            .get_mut(province_id)
            .ok_or(GameError::NotFound(EntityRef::Province(province_id)))?;
        if province.owner.is_some() {
            return Err(GameError::ProvinceAlreadyOwned);
        }
        player.resources.subtract_bundle(&rules.claim_cost)?;

        province.owner = Some(player_id);
        province.troops = rules.claim_garrison;
        player.provinces.push(province_id);
        player.total_troops += rules.claim_garrison;
        outcome.events.push(GameEvent::ProvinceClaimed {
            player: player_id,
            province: province_id,
        });
        Ok(())
    }

    fn declare_war(
        &mut self,
        attacker_id: PlayerId,
        defender_id: PlayerId,
        target_id: ProvinceId,
        troops: u32,
        outcome: &mut StepOutcome,
    ) -> Result<(), GameError> {
        let attacker = self.player(attacker_id)?;
        self.player(defender_id)?;
        let target = self.province(target_id)?;
        if troops == 0 {
            return Err(GameError::NonPositiveAmount);
        }
        if target.owner != Some(defender_id) {
            return Err(GameError::DefenderMismatch);
        }
        if attacker.total_troops < troops {
            return Err(GameError::InsufficientTroops {
                available: attacker.total_troops,
                requested: troops,
            });
        }

        self.draw_from_garrisons(attacker_id, troops);
        let war_id: WarId = self.ids.next();
        self.wars.insert(War {
            id: war_id,
            attacker: attacker_id,
            defender: defender_id,
            target_province: target_id,
            troops,
            status: WarStatus::Ongoing,
            result: None,
        });
        if let Some(attacker) = self.players.get_mut(attacker_id) {
            attacker.total_troops = attacker.total_troops.saturating_sub(troops);
            attacker.wars.push(war_id);
        }
        if defender_id != attacker_id {
            if let Some(defender) = self.players.get_mut(defender_id) {
                defender.wars.push(war_id);
            }
        }
        outcome.events.push(GameEvent::WarDeclared {
            war: war_id,
            attacker: attacker_id,
            defender: defender_id,
            province: target_id,
            troops,
        });
        Ok(())
    }

    /// Pulls committed troops out of the attacker's garrisons, in province-list order.
    fn draw_from_garrisons(&mut self, player_id: PlayerId, troops: u32) {
        let Some(player) = self.players.get(player_id) else {
            return;
        };
        let mut remaining = troops;
        for &province_id in &player.provinces {
            if remaining == 0 {
                break;
            }
            if let Some(province) = self.provinces.get_mut(province_id) {
                let taken = remaining.min(province.troops);
                province.troops -= taken;
                remaining -= taken;
            }
        }
    }

    fn resolve_war(&mut self, war_id: WarId, outcome: &mut StepOutcome) -> Result<(), GameError> {
        self.validate_war(war_id)?;
        self.apply_war_resolution(war_id, outcome);
        Ok(())
    }

    fn validate_war(&self, war_id: WarId) -> Result<(), GameError> {
        let war = self
            .wars
            .get(war_id)
            .ok_or(GameError::NotFound(EntityRef::War(war_id)))?;
        if !war.is_ongoing() {
            return Err(GameError::WarNotOngoing);
        }
        self.player(war.attacker)?;
        self.province(war.target_province)?;
        Ok(())
    }

    fn apply_war_resolution(&mut self, war_id: WarId, outcome: &mut StepOutcome) {
        let Some(war) = self.wars.get(war_id) else {
            return;
        };
        if !war.is_ongoing() {
            return;
        }
        let (attacker_id, target_id, attacking) = (war.attacker, war.target_province, war.troops);
        let rules = &self.config.rules;
        let Some(province) = self.provinces.get_mut(target_id) else {
            return;
        };

        let defending = province.troops;
        let attacker_advantage = if attacking > defending {
            rules.attacker_advantage
        } else {
            1.0
        };
        let attacker_strength = f64::from(attacking) * attacker_advantage;
        let defender_strength = f64::from(defending) * province.terrain_bonus;
        let previous_owner = province.owner;

        let result = if attacker_strength > defender_strength {
            let garrison = attacking.saturating_sub(defending).max(1);
            province.owner = Some(attacker_id);
            province.troops = garrison;
            if let Some(old) = previous_owner.and_then(|id| self.players.get_mut(id)) {
                old.drop_province(target_id);
                old.total_troops = old.total_troops.saturating_sub(defending);
            }
            if let Some(winner) = self.players.get_mut(attacker_id) {
                winner.provinces.push(target_id);
                winner.total_troops += garrison;
            }
            WarResult::AttackerWins
        } else {
            let garrison = defending.saturating_sub(attacking / 2).max(1);
            province.troops = garrison;
            if let Some(owner) = previous_owner.and_then(|id| self.players.get_mut(id)) {
                owner.total_troops = owner
                    .total_troops
                    .saturating_add(garrison)
                    .saturating_sub(defending);
            }
            WarResult::DefenderWins
        };

        let garrison = province.troops;
        if let Some(war) = self.wars.get_mut(war_id) {
            war.conclude(result);
        }
        debug!(%war_id, %result, attacking, defending, garrison, "war resolved");
        outcome.events.push(GameEvent::WarResolved {
            war: war_id,
            result,
            province: target_id,
            garrison,
        });
    }

    fn form_alliance(
        &mut self,
        player_id: PlayerId,
        target_id: PlayerId,
        name: String,
        outcome: &mut StepOutcome,
    ) -> Result<(), GameError> {
        self.player(player_id)?;
        self.player(target_id)?;
        if player_id == target_id {
            return Err(GameError::SelfAlliance);
        }

        let alliance_id: AllianceId = self.ids.next();
        let members: Members = smallvec![player_id, target_id];
        self.alliances.insert(Alliance {
            id: alliance_id,
            members: members.clone(),
            name,
            created_at: self.clock.now(),
        });
        for member in &members {
            if let Some(player) = self.players.get_mut(*member) {
                player.alliances.push(alliance_id);
            }
        }
        outcome.events.push(GameEvent::AllianceFormed {
            alliance: alliance_id,
            members,
        });
        Ok(())
    }

    fn break_alliance(
        &mut self,
        player_id: PlayerId,
        alliance_id: AllianceId,
        outcome: &mut StepOutcome,
    ) -> Result<(), GameError> {
        self.player(player_id)?;
        let alliance = self
            .alliances
            .remove(alliance_id)
            .ok_or(GameError::NotFound(EntityRef::Alliance(alliance_id)))?;
        for member in &alliance.members {
            if let Some(player) = self.players.get_mut(*member) {
                player.drop_alliance(alliance_id);
            }
        }
        outcome.events.push(GameEvent::AllianceDissolved {
            alliance: alliance_id,
        });
        Ok(())
    }

    fn create_trade_deal(
        &mut self,
        from_id: PlayerId,
        to_id: PlayerId,
        resources: ResourceBundle,
        duration: u32,
        outcome: &mut StepOutcome,
    ) -> Result<(), GameError> {
        self.player(to_id)?;
        let sender = self
            .players
            .get_mut(from_id)
            .ok_or(GameError::NotFound(EntityRef::Player(from_id)))?;
        if resources == ResourceBundle::zero() {
            return Err(GameError::EmptyTrade);
        }
        sender.resources.subtract_bundle(&resources)?;

        let deal_id: TradeDealId = self.ids.next();
        if let Some(sender) = self.players.get_mut(from_id) {
            sender.trade_deals.push(deal_id);
        }
        if let Some(receiver) = self.players.get_mut(to_id) {
            receiver.resources.add_bundle(&resources);
            if to_id != from_id {
                receiver.trade_deals.push(deal_id);
            }
        }
        self.trade_deals.insert(TradeDeal {
            id: deal_id,
            from: from_id,
            to: to_id,
            resources,
            duration,
            is_active: true,
        });
        outcome.events.push(GameEvent::TradeExecuted {
            deal: deal_id,
            from: from_id,
            to: to_id,
            resources,
        });
        Ok(())
    }

    fn use_papal_action(
        &mut self,
        action: &PapalAction,
        outcome: &mut StepOutcome,
    ) -> Result<(), GameError> {
        let pope = self.pope().map(|p| p.id).ok_or(GameError::NoPope)?;
        if self.papal_actions_used >= self.config.rules.papal_actions_per_day {
            return Err(GameError::PapalActionsExhausted);
        }
        for &target in &action.target_players {
            self.player(target)?;
        }
        let target_province = action
            .target_province
            .filter(|_| action.kind.targets_province());
        if let Some(province) = target_province {
            self.province(province)?;
        }

        match action.kind {
            PapalActionKind::Ceasefire => self.enforce_ceasefire(&action.target_players, outcome),
            PapalActionKind::DoubleResources => {
                if let Some(province) = action.target_province {
                    self.double_resources(province, outcome);
                }
            }
            PapalActionKind::Excommunicate => {
                for &target in &action.target_players {
                    self.excommunicate(target, outcome);
                }
            }
            PapalActionKind::BlessArmy => {
                if let Some(province_id) = action.target_province {
                    let multiplier = self.config.rules.bless_multiplier;
                    if let Some(province) = self.provinces.get_mut(province_id) {
                        province.terrain_bonus *= multiplier;
                        outcome.events.push(GameEvent::ArmyBlessed {
                            province: province_id,
                            terrain_bonus: province.terrain_bonus,
                        });
                    }
                }
            }
        }

        self.papal_actions_used += 1;
        outcome.events.push(GameEvent::PapalActionUsed {
            pope,
            kind: action.kind,
        });
        info!(%pope, kind = %action.kind, "papal action used");
        Ok(())
    }

    /// Ceasefires always go the defender's way.
    fn enforce_ceasefire(&mut self, targets: &[PlayerId], outcome: &mut StepOutcome) {
        let target_set: HashSet<PlayerId> = targets.iter().copied().collect();
        for target in targets {
            let Some(player) = self.players.get(*target) else {
                continue;
            };
            for &war_id in &player.wars {
                let Some(war) = self.wars.get_mut(war_id) else {
                    continue;
                };
                if war.is_ongoing()
                    && (target_set.contains(&war.attacker) || target_set.contains(&war.defender))
                {
                    war.conclude(WarResult::DefenderWins);
                    outcome.events.push(GameEvent::CeasefireEnforced { war: war_id });
                }
            }
        }
    }

    fn double_resources(&mut self, province_id: ProvinceId, outcome: &mut StepOutcome) {
        let Some(province) = self.provinces.get(province_id) else {
            return;
        };
        let Some(owner) = province.owner else {
            return;
        };
        let bundle = province.resources;
        if let Some(player) = self.players.get_mut(owner) {
            player.resources.add_bundle(&bundle);
            outcome.events.push(GameEvent::ResourcesCollected {
                player: owner,
                bundle,
            });
        }
    }

    /// Drops `player_id` from every alliance; alliances left with one member dissolve.
    fn excommunicate(&mut self, player_id: PlayerId, outcome: &mut StepOutcome) {
        let Some(player) = self.players.get_mut(player_id) else {
            return;
        };
        let memberships = std::mem::take(&mut player.alliances);
        for alliance_id in memberships {
            let Some(alliance) = self.alliances.get_mut(alliance_id) else {
                continue;
            };
            alliance.members.retain(|member| *member != player_id);
            outcome.events.push(GameEvent::AllianceLeft {
                alliance: alliance_id,
                player: player_id,
            });
            if alliance.members.len() >= 2 {
                continue;
            }
            let Some(dissolved) = self.alliances.remove(alliance_id) else {
                continue;
            };
            for member in &dissolved.members {
                if let Some(remaining) = self.players.get_mut(*member) {
                    remaining.drop_alliance(alliance_id);
                }
            }
            outcome.events.push(GameEvent::AllianceDissolved {
                alliance: alliance_id,
            });
        }
    }

    fn recruit_troops(
        &mut self,
        player_id: PlayerId,
        province_id: ProvinceId,
        amount: u32,
        outcome: &mut StepOutcome,
    ) -> Result<(), GameError> {
        let per_troop = self.config.rules.recruit_cost_per_troop;
        let player = self
            .players
            .get_mut(player_id)
            .ok_or(GameError::NotFound(EntityRef::Player(player_id)))?;
        let province = self
            .provinces
            .get_mut(province_id)
            .ok_or(GameError::NotFound(EntityRef::Province(province_id)))?;
        if amount == 0 {
            return Err(GameError::NonPositiveAmount);
        }
        if !province.is_owned_by(player_id) {
            return Err(GameError::NotProvinceOwner);
        }
        let cost = per_troop
            .checked_scale(amount)
            .ok_or(ResourceError::CostOverflow)?;
        player.resources.subtract_bundle(&cost)?;

        province.troops = province.troops.saturating_add(amount);
        player.total_troops = player.total_troops.saturating_add(amount);
        outcome.events.push(GameEvent::TroopsRecruited {
            player: player_id,
            province: province_id,
            amount,
        });
        Ok(())
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player, GameError> {
        self.players
            .get(id)
            .ok_or(GameError::NotFound(EntityRef::Player(id)))
    }

    pub fn province(&self, id: ProvinceId) -> Result<&Province, GameError> {
        self.provinces
            .get(id)
            .ok_or(GameError::NotFound(EntityRef::Province(id)))
    }

    /// The player flagged as pope. The flag is authoritative, not `current_pope`.
    pub fn pope(&self) -> Option<&Player> {
        self.players.iter().find(|player| player.is_pope)
    }

    pub fn can_use_papal_action(&self) -> bool {
        self.pope().is_some() && self.papal_actions_used < self.config.rules.papal_actions_per_day
    }

    pub fn player_by_name(&self, name: &str) -> Option<&Player> {
        let wanted = name.trim().to_lowercase();
        self.players
            .iter()
            .find(|player| player.name.to_lowercase() == wanted)
    }

    pub fn province_by_name(&self, name: &str) -> Option<&Province> {
        self.provinces
            .iter()
            .find(|province| province.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn alliances_of(&self, player: PlayerId) -> impl Iterator<Item = &Alliance> + '_ {
        self.alliances
            .iter()
            .filter(move |alliance| alliance.includes(player))
    }

    pub fn are_allied(&self, a: PlayerId, b: PlayerId) -> bool {
        self.alliances_of(a).any(|alliance| alliance.includes(b))
    }

    pub fn ongoing_wars(&self) -> impl Iterator<Item = &War> + '_ {
        self.wars.iter().filter(|war| war.is_ongoing())
    }

    pub fn unowned_provinces(&self) -> impl Iterator<Item = &Province> + '_ {
        self.provinces
            .iter()
            .filter(|province| province.owner.is_none())
    }

    pub fn neighbors(&self, id: ProvinceId) -> impl Iterator<Item = &Province> + '_ {
        self.provinces
            .get(id)
            .into_iter()
            .flat_map(|province| province.adjacent.iter())
            .filter_map(move |neighbor| self.provinces.get(*neighbor))
    }

    /// Next id from the game's allocator, for fixtures that add entities directly.
    pub fn allocate_id<I: From<uuid::Uuid>>(&mut self) -> I {
        self.ids.next()
    }
}

/// Trims names and checks count and case-insensitive uniqueness.
fn validate_player_names(names: &[String], config: &GameConfig) -> Result<Vec<String>, GameError> {
    let rules = &config.rules;
    let trimmed: Vec<String> = names.iter().map(|name| name.trim().to_string()).collect();
    if trimmed.iter().any(String::is_empty) {
        return Err(GameError::EmptyPlayerName);
    }
    if trimmed.len() < rules.min_players.max(1) {
        return Err(GameError::NotEnoughPlayers {
            min: rules.min_players.max(1),
            actual: trimmed.len(),
        });
    }
    if trimmed.len() > rules.max_players {
        return Err(GameError::TooManyPlayers {
            max: rules.max_players,
            actual: trimmed.len(),
        });
    }
    let mut seen = HashSet::new();
    for name in &trimmed {
        if !seen.insert(name.to_lowercase()) {
            return Err(GameError::DuplicatePlayerName(name.clone()));
        }
    }
    Ok(trimmed)
}

/// Pure form of [`GameState::step`]: returns the next state and the verdict.
/// A rejected action yields an unchanged copy of `state`.
pub fn reduce(state: &GameState, action: GameAction) -> (GameState, Result<StepOutcome, GameError>) {
    let mut next = state.clone();
    match next.step(action) {
        Ok(outcome) => (next, Ok(outcome)),
        Err(err) => (state.clone(), Err(err)),
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
