use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use papal_conquest::cli::{PlayerInstance, StatisticsAccumulator, create_player, print_player_help};
use papal_conquest::game::{Game, GameConfig};
use tracing::{error, info};

#[derive(Debug, Parser, Clone)]
#[command(name = "papal-sim")]
#[command(about = "Papal Conquest Bot Simulator - Simulate games between different player strategies")]
struct Args {
    /// Number of games to play
    #[arg(short = 'n', long, default_value_t = 5)]
    num: u32,

    /// Comma-separated player codes (e.g., R,R,G)
    /// Use ':' to set player-specific params (e.g., G:0.1 for epsilon)
    #[arg(long, default_value = "R,G")]
    players: String,

    /// Random seed for reproducibility; overrides the config file
    #[arg(long)]
    seed: Option<u64>,

    /// Days to play per game
    #[arg(long, default_value_t = 30)]
    days: u32,

    /// Rounds of bot actions before each day advances
    #[arg(long, default_value_t = 2)]
    actions_per_day: usize,

    /// JSON rule set and seed
    #[arg(long)]
    config: Option<PathBuf>,

    /// Show player codes and exit
    #[arg(long)]
    help_players: bool,

    /// Silence console output
    #[arg(long)]
    quiet: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if args.help_players {
        print_player_help();
        return ExitCode::SUCCESS;
    }

    let mut config = match &args.config {
        Some(path) => match GameConfig::load(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("Error: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => GameConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let player_keys: Vec<&str> = args.players.split(',').map(str::trim).collect();
    let rules = &config.rules;
    if player_keys.len() < rules.min_players || player_keys.len() > rules.max_players {
        eprintln!(
            "Error: Must specify {}-{} players",
            rules.min_players, rules.max_players
        );
        return ExitCode::FAILURE;
    }

    let mut players: Vec<PlayerInstance> = Vec::new();
    for (i, key) in player_keys.iter().enumerate() {
        let parts: Vec<&str> = key.split(':').collect();
        let code = parts[0];
        match create_player(code, config.seed.wrapping_add(i as u64), &parts[1..]) {
            Some(player) => players.push(player),
            None => {
                eprintln!("Error: Unknown player code '{code}'");
                eprintln!("Use --help-players to see available codes");
                return ExitCode::FAILURE;
            }
        }
    }

    let mut stats = StatisticsAccumulator::new();
    for game_idx in 0..args.num {
        let game_config = GameConfig {
            seed: config.seed.wrapping_add(u64::from(game_idx)),
            rules: config.rules.clone(),
        };
        if let Err(err) = run_game(&args, game_idx, game_config, &players, &mut stats) {
            error!(game = game_idx + 1, %err, "simulation aborted");
            return ExitCode::FAILURE;
        }
    }

    if !args.quiet {
        print_summary(&stats, &players);
    }
    ExitCode::SUCCESS
}

fn seat_names(count: usize) -> Vec<String> {
    (1..=count).map(|seat| format!("Seat{seat}")).collect()
}

/// Plays one game, checking invariants at the end of every day.
fn run_game(
    args: &Args,
    game_idx: u32,
    config: GameConfig,
    players: &[PlayerInstance],
    stats: &mut StatisticsAccumulator,
) -> Result<(), String> {
    let start = Instant::now();
    let mut game = Game::start(config, seat_names(players.len())).map_err(|e| e.to_string())?;
    let bots: Vec<&PlayerInstance> = players.iter().collect();
    let mut actions_taken = 0u64;

    for _ in 0..args.days {
        stats.step(&game);
        let taken = game
            .play_day(&bots, args.actions_per_day)
            .map_err(|e| e.to_string())?;
        actions_taken += taken.len() as u64;
        game.state.check_invariants().map_err(|e| e.to_string())?;
    }

    let duration = start.elapsed();
    stats.after(&game, actions_taken, duration);

    let leader = game
        .leader()
        .and_then(|id| game.state.player(id).ok())
        .map(|p| p.name.clone())
        .unwrap_or_else(|| "None".to_string());
    info!(
        game = game_idx + 1,
        leader = %leader,
        days = args.days,
        actions = actions_taken,
        ?duration,
        "game finished"
    );
    if !args.quiet {
        println!(
            "Game {:>4}: Leader={:>6}, Days={:>4}, Actions={:>5}, Duration={:?}",
            game_idx + 1,
            leader,
            args.days,
            actions_taken,
            duration
        );
    }
    Ok(())
}

fn print_summary(stats: &StatisticsAccumulator, players: &[PlayerInstance]) {
    let stats = &stats.stats;
    println!("\n{}", "=".repeat(80));
    println!("SIMULATION SUMMARY");
    println!("{}", "=".repeat(80));

    println!("\nPlayer Summary:");
    println!(
        "{:<18} {:<8} {:<10} {:<12} {:<10} {:<10} {:<10}",
        "Player", "Wins", "Win Rate", "Provinces", "Troops", "Gold", "Pope Days"
    );
    println!("{}", "-".repeat(80));

    for (seat, player) in players.iter().enumerate() {
        let seat_stats = stats.seats.get(&seat).cloned().unwrap_or_default();
        let win_rate = if stats.games > 0 {
            f64::from(seat_stats.wins) / f64::from(stats.games) * 100.0
        } else {
            0.0
        };
        println!(
            "{:<18} {:<8} {:<9.1}% {:<12.2} {:<10.1} {:<10.1} {:<10.1}",
            format!("{} (Seat{})", player.label(), seat + 1),
            seat_stats.wins,
            win_rate,
            stats.average(seat_stats.provinces),
            stats.average(seat_stats.troops),
            stats.average(seat_stats.gold),
            stats.average(seat_stats.pope_days),
        );
    }

    println!("\nGame Summary:");
    println!("  Total Games: {}", stats.games);
    println!("  Avg Days: {:.2}", stats.average(stats.total_days));
    println!("  Avg Actions: {:.2}", stats.average(stats.total_actions));
    println!("  Avg Duration: {:.2?}", stats.get_avg_duration());
}
