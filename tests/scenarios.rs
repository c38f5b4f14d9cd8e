//! End-to-end walkthroughs of the core rules through the public API.

use papal_conquest::game::{
    GameAction, GameConfig, GameError, GameState, PapalAction, ResourceBundle, RuleSet,
};
use papal_conquest::testing::{GameStateBuilder, player_id, province_id};
use papal_conquest::{ResourceKind, WarResult};

#[test]
fn two_player_setup_crowns_the_first_player() {
    let mut state = GameState::new(GameConfig::default());
    state
        .step(GameAction::initialize(["Alice", "Bob"]))
        .unwrap();

    assert_eq!(state.players.len(), 2);
    for player in &state.players {
        assert_eq!(player.resources, ResourceBundle::new(100, 50, 10));
    }
    assert_eq!(state.provinces.len(), 29);
    let owned = state.provinces.iter().filter(|p| p.owner.is_some()).count();
    assert_eq!(owned, 28);

    let popes: Vec<&str> = state
        .players
        .iter()
        .filter(|p| p.is_pope)
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(popes, ["Alice"]);
    state.check_invariants().unwrap();
}

#[test]
fn claiming_a_neutral_province() {
    let mut state = GameStateBuilder::new().build();
    let alice = player_id(&state, "Alice");
    let athens = province_id(&state, "Athens");
    let troops = state.player(alice).unwrap().total_troops;

    state
        .step(GameAction::ClaimProvince {
            player: alice,
            province: athens,
        })
        .unwrap();

    let player = state.player(alice).unwrap();
    assert_eq!(player.resources.get(ResourceKind::Gold), 80);
    assert_eq!(player.total_troops, troops + 5);
    let province = state.province(athens).unwrap();
    assert_eq!(province.owner, Some(alice));
    assert_eq!(province.troops, 5);
    state.check_invariants().unwrap();
}

#[test]
fn outnumbering_attack_takes_the_province() {
    let rules = RuleSet {
        terrain_bonus_chance: 0.0,
        ..RuleSet::default()
    };
    let mut state = GameStateBuilder::new().rules(rules).build();
    let alice = player_id(&state, "Alice");
    let bob = player_id(&state, "Bob");
    let naples = province_id(&state, "Naples");
    assert_eq!(state.province(naples).unwrap().troops, 10);

    state
        .step(GameAction::DeclareWar {
            attacker: alice,
            defender: bob,
            target_province: naples,
            troops: 20,
        })
        .unwrap();
    let war = state.ongoing_wars().next().unwrap().id;
    state.step(GameAction::ResolveWar { war }).unwrap();

    let province = state.province(naples).unwrap();
    assert_eq!(province.owner, Some(alice));
    assert_eq!(province.troops, 10);
    assert!(!state.player(bob).unwrap().owns(naples));
    assert!(state.player(alice).unwrap().owns(naples));
    assert_eq!(
        state.wars.get(war).unwrap().result,
        Some(WarResult::AttackerWins)
    );
    state.check_invariants().unwrap();
}

#[test]
fn excommunication_breaks_a_pair_alliance() {
    let mut state = GameStateBuilder::new()
        .players(&["Alice", "Bob", "Cleo"])
        .build();
    let alice = player_id(&state, "Alice");
    let bob = player_id(&state, "Bob");
    let cleo = player_id(&state, "Cleo");
    state
        .step(GameAction::FormAlliance {
            player: bob,
            target_player: cleo,
            name: "Eastern Pact".to_string(),
        })
        .unwrap();
    assert_eq!(state.pope().unwrap().id, alice);

    state
        .step(GameAction::UsePapalAction {
            action: PapalAction::excommunicate([bob]),
        })
        .unwrap();

    assert!(state.alliances.is_empty());
    assert!(state.player(bob).unwrap().alliances.is_empty());
    assert!(state.player(cleo).unwrap().alliances.is_empty());
    state.check_invariants().unwrap();
}

#[test]
fn trade_succeeds_only_when_affordable() {
    let mut state = GameStateBuilder::new()
        .resources("Alice", ResourceBundle::new(50, 50, 10))
        .build();
    let alice = player_id(&state, "Alice");
    let bob = player_id(&state, "Bob");
    let trade = GameAction::CreateTradeDeal {
        from: alice,
        to: bob,
        resources: ResourceBundle::gold(30),
        duration: 5,
    };

    state.step(trade.clone()).unwrap();
    assert_eq!(state.player(alice).unwrap().resources.get(ResourceKind::Gold), 20);
    assert_eq!(state.player(bob).unwrap().resources.get(ResourceKind::Gold), 130);

    let mut poor = GameStateBuilder::new()
        .resources("Alice", ResourceBundle::new(10, 50, 10))
        .build();
    let before = poor.clone();
    let trade = GameAction::CreateTradeDeal {
        from: player_id(&poor, "Alice"),
        to: player_id(&poor, "Bob"),
        resources: ResourceBundle::gold(30),
        duration: 5,
    };
    assert!(matches!(
        poor.step(trade),
        Err(GameError::InsufficientResources(_))
    ));
    assert_eq!(poor, before);
}
