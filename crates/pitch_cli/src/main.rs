//! Pitch CLI
//!
//! 라이브 매치 / 토너먼트 / 대량 시뮬레이션 드라이버

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use pitch_core::engine::physics_constants::{elo, timing};
use pitch_core::tournament::elo::strength_multiplier;
use pitch_core::{
    simulate_tournaments, AutoSimulator, LiveMatch, NotificationEvent, PlayMode, SchedulerTick,
    SimConfig, Tournament,
};

#[derive(Parser)]
#[command(name = "pitch")]
#[command(about = "2D football simulator: live matches and ELO tournaments", long_about = None)]
struct Cli {
    /// YAML or JSON run configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// RNG seed (overrides config and PITCH_SEED)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Debug logging
    #[arg(short, long, global = true, default_value = "false")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one live match between two ELO ratings
    Match {
        #[arg(long, default_value = "1800")]
        red_elo: f64,

        #[arg(long, default_value = "1800")]
        blue_elo: f64,

        /// Print every notification event
        #[arg(long, default_value = "false")]
        events: bool,
    },

    /// Run a 128-team bracket
    Tournament {
        /// Drive the auto-simulation scheduler on a simulated clock
        #[arg(long, default_value = "false")]
        scheduled: bool,

        /// Play every match with the full physics simulation
        #[arg(long, default_value = "false")]
        interactive: bool,

        /// Print the final bracket as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Fast-simulate many tournaments in parallel
    Bulk {
        #[arg(long, default_value = "1000")]
        runs: u32,

        /// Champions to list
        #[arg(long, default_value = "10")]
        top: usize,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config(cli: &Cli) -> Result<SimConfig> {
    let mut config = match &cli.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SimConfig::default(),
    };
    config.apply_env_overrides()?;
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    tracing::debug!(?config, "run configuration");
    Ok(config)
}

fn print_event(event: &NotificationEvent) {
    match event {
        NotificationEvent::GoalScored {
            team,
            score,
            time_ms,
            golden_goal,
            ..
        } => println!(
            "  {:>6.1}s  GOAL {}{}  ({}-{})",
            *time_ms as f64 / 1000.0,
            team,
            if *golden_goal { " (golden goal)" } else { "" },
            score.red,
            score.blue
        ),
        NotificationEvent::OffsideCalled {
            offending_team,
            player_id,
            time_ms,
            ..
        } => println!(
            "  {:>6.1}s  offside: {} player {}",
            *time_ms as f64 / 1000.0,
            offending_team,
            player_id
        ),
        NotificationEvent::FreeKickTaken { team, auto, time_ms } => println!(
            "  {:>6.1}s  free kick {}{}",
            *time_ms as f64 / 1000.0,
            team,
            if *auto { " (auto)" } else { "" }
        ),
        NotificationEvent::MatchEnded { winner, score, .. } => {
            println!("  full time: {} wins {}-{}", winner, score.red, score.blue)
        }
        NotificationEvent::RoundAdvanced { completed_round, next_round } => {
            println!("round {} complete, round {} next", completed_round, next_round)
        }
        NotificationEvent::TournamentComplete { champion_name, .. } => {
            println!("champion: {}", champion_name)
        }
    }
}

fn run_match(config: &SimConfig, red_elo: f64, blue_elo: f64, show_events: bool) -> Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let red = strength_multiplier(red_elo, elo::MIN_ELO, elo::MAX_ELO);
    let blue = strength_multiplier(blue_elo, elo::MIN_ELO, elo::MAX_ELO);
    let mut live = LiveMatch::new(config.match_config(), red, blue, &mut rng);
    let outcome = live.run_to_completion(&mut rng);

    println!(
        "Red ({:.0}) {} - {} Blue ({:.0})",
        red_elo, outcome.score.red, outcome.score.blue, blue_elo
    );
    println!(
        "winner: {}{}{}",
        outcome.winner,
        if outcome.was_golden_goal { ", golden goal" } else { "" },
        if outcome.decided_by_coin_toss { ", coin toss" } else { "" }
    );
    println!(
        "possession: red {:.0}% / blue {:.0}%  touches: {} / {}  offsides: {}",
        outcome.stats.possession_pct(pitch_core::Team::Red),
        outcome.stats.possession_pct(pitch_core::Team::Blue),
        outcome.stats.red_touches,
        outcome.stats.blue_touches,
        outcome.stats.offsides
    );
    if show_events {
        outcome.events.iter().for_each(print_event);
    }
    Ok(())
}

fn run_tournament(
    config: &SimConfig,
    scheduled: bool,
    interactive: bool,
    json: Option<PathBuf>,
) -> Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let pool = config.team_pool()?;
    let mut tournament = Tournament::initialize(&pool, config.seeding, &mut rng)?;

    if scheduled || interactive {
        let mode = if interactive {
            PlayMode::Interactive(config.match_config())
        } else {
            PlayMode::Fast
        };
        let mut scheduler = AutoSimulator::new(mode, config.pacing);
        let mut now = 0;
        scheduler.start(now);
        while scheduler.is_enabled() {
            if let SchedulerTick::Played { events, .. } =
                scheduler.tick(&mut tournament, now, &mut rng)?
            {
                events
                    .iter()
                    .filter(|e| !e.is_goal())
                    .filter(|e| !matches!(e, NotificationEvent::MatchEnded { .. }))
                    .for_each(print_event);
            }
            now += timing::TICK_MS;
        }
        println!("simulated scheduler time: {:.1}s", now as f64 / 1000.0);
    } else {
        tournament
            .play_all_fast(&mut rng)?
            .iter()
            .for_each(print_event);
    }

    let final_match = tournament.round_matches(7).first().cloned();
    if let (Some(m), Some(champ)) = (final_match, tournament.champion()) {
        if let (Some(score), Some((a, b))) = (m.score, m.teams()) {
            let name = |id| tournament.team(id).map_or("?", |t| t.name.as_str());
            println!(
                "final: {} {} - {} {}{}",
                name(a),
                score.team_a,
                score.team_b,
                name(b),
                if m.golden_goal == Some(true) { " (golden goal)" } else { "" }
            );
        }
        println!("champion: {} (seed {}, ELO {:.0})", champ.name, champ.seed, champ.elo_rating);
    }

    if let Some(path) = json {
        let text = serde_json::to_string_pretty(&tournament)?;
        std::fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))?;
        println!("bracket written to {}", path.display());
    }
    Ok(())
}

fn run_bulk(config: &SimConfig, runs: u32, top: usize) -> Result<()> {
    let pool = config.team_pool()?;
    let summary = simulate_tournaments(&pool, runs, config.seed, config.seeding)?;
    println!("{} tournaments, {} distinct champions", summary.runs, summary.champions.len());
    for c in summary.champions.iter().take(top) {
        println!(
            "  {:<24} ELO {:>5.0}  {:>5} titles ({:.1}%)",
            c.name,
            c.elo_rating,
            c.titles,
            summary.title_share(c.team_id) * 100.0
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Match {
            red_elo,
            blue_elo,
            events,
        } => run_match(&config, red_elo, blue_elo, events),
        Commands::Tournament {
            scheduled,
            interactive,
            json,
        } => run_tournament(&config, scheduled, interactive, json),
        Commands::Bulk { runs, top } => run_bulk(&config, runs, top),
    }
}
