//! Fixtures for building initialized games in tests.

use crate::game::{
    Clock, GameAction, GameConfig, GameError, GameState, PlayerId, ProvinceId, ResourceBundle,
    RuleSet,
};

/// Builds a started game, then applies overrides that keep the denormalized
/// fields in step (garrison edits also adjust the owner's troop total).
pub struct GameStateBuilder {
    config: GameConfig,
    clock: Clock,
    names: Vec<String>,
    resources: Vec<(String, ResourceBundle)>,
    garrisons: Vec<(String, u32)>,
    transfers: Vec<(String, String)>,
}

impl GameStateBuilder {
    pub fn new() -> Self {
        Self {
            config: GameConfig::default(),
            clock: Clock::System,
            names: vec!["Alice".to_string(), "Bob".to_string()],
            resources: Vec::new(),
            garrisons: Vec::new(),
            transfers: Vec::new(),
        }
    }

    pub fn players(mut self, names: &[&str]) -> Self {
        self.names = names.iter().map(|name| name.to_string()).collect();
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn rules(mut self, rules: RuleSet) -> Self {
        self.config.rules = rules;
        self
    }

    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the named player's stockpile.
    pub fn resources(mut self, player: &str, bundle: ResourceBundle) -> Self {
        self.resources.push((player.to_string(), bundle));
        self
    }

    /// Sets the named province's garrison.
    pub fn garrison(mut self, province: &str, troops: u32) -> Self {
        self.garrisons.push((province.to_string(), troops));
        self
    }

    /// Hands the named province (garrison included) to the named player.
    pub fn owner(mut self, province: &str, player: &str) -> Self {
        self.transfers.push((province.to_string(), player.to_string()));
        self
    }

    pub fn try_build(self) -> Result<GameState, GameError> {
        let mut state = GameState::with_clock(self.config, self.clock);
        state.step(GameAction::initialize(self.names))?;

        for (province, player) in &self.transfers {
            let province = province_id(&state, province);
            let player = player_id(&state, player);
            transfer(&mut state, province, player);
        }
        for (province, troops) in &self.garrisons {
            let province = province_id(&state, province);
            set_garrison(&mut state, province, *troops);
        }
        for (player, bundle) in &self.resources {
            let id = player_id(&state, player);
            if let Some(player) = state.players.get_mut(id) {
                player.resources = *bundle;
            }
        }
        if !self.resources.is_empty() {
            state.step(GameAction::ElectPope)?;
        }
        Ok(state)
    }

    /// # Panics
    ///
    /// Panics if the game cannot be initialized from the configured names.
    pub fn build(self) -> GameState {
        match self.try_build() {
            Ok(state) => state,
            Err(err) => panic!("invalid fixture: {err}"),
        }
    }
}

impl Default for GameStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// # Panics
///
/// Panics if no player has that name.
pub fn player_id(state: &GameState, name: &str) -> PlayerId {
    match state.player_by_name(name) {
        Some(player) => player.id,
        None => panic!("no player named {name}"),
    }
}

/// # Panics
///
/// Panics if no province has that name.
pub fn province_id(state: &GameState, name: &str) -> ProvinceId {
    match state.province_by_name(name) {
        Some(province) => province.id,
        None => panic!("no province named {name}"),
    }
}

fn set_garrison(state: &mut GameState, province: ProvinceId, troops: u32) {
    let Some(province) = state.provinces.get_mut(province) else {
        return;
    };
    let previous = std::mem::replace(&mut province.troops, troops);
    if let Some(owner) = province.owner.and_then(|id| state.players.get_mut(id)) {
        owner.total_troops = owner.total_troops - previous + troops;
    }
}

fn transfer(state: &mut GameState, province: ProvinceId, to: PlayerId) {
    let Some(entry) = state.provinces.get_mut(province) else {
        return;
    };
    let troops = entry.troops;
    let previous = entry.owner.replace(to);
    if let Some(old) = previous.and_then(|id| state.players.get_mut(id)) {
        old.provinces.retain(|id| *id != province);
        old.total_troops -= troops;
    }
    if let Some(new) = state.players.get_mut(to) {
        new.provinces.push(province);
        new.total_troops += troops;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_keep_invariants() {
        let state = GameStateBuilder::new()
            .players(&["Alice", "Bob", "Cleo"])
            .owner("London", "Cleo")
            .garrison("London", 40)
            .resources("Bob", ResourceBundle::new(0, 0, 99))
            .build();

        let london = state.province(province_id(&state, "London")).unwrap();
        assert_eq!(london.owner, Some(player_id(&state, "Cleo")));
        assert_eq!(london.troops, 40);
        assert_eq!(state.pope().unwrap().name, "Bob");
        assert_eq!(state.check_invariants(), Ok(()));
    }
}
