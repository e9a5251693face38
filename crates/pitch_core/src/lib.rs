//! # pitch_core - 2D Football Match Simulator Core
//!
//! Real-time 2D football physics & rules engine with an ELO-driven
//! single-elimination tournament layer.
//!
//! ## Features
//! - Ball ↔ player collision with strength-aware reach and an own-goal guard
//! - Boundary, goal-post and stuck-corner handling
//! - Simplified offside with free kicks
//! - Goal detection with grace / cooldown / goalkeeper-save windows
//! - ELO outcome model for fast simulation
//! - 128-team bracket with a paced auto-simulation scheduler
//! - Deterministic: same seed = same match, same tournament
//!
//! All time is simulated milliseconds supplied by the caller; all randomness
//! comes from a caller-supplied `rand::Rng`.

pub mod config;
pub mod engine;
pub mod error;
pub mod tournament;

pub use config::SimConfig;
pub use engine::{
    step_ball, Ball, HeuristicPolicy, LiveMatch, MatchConfig, MatchOutcome, MatchSimulationState,
    NotificationEvent, Player, PlayerAction, PlayerPolicy, Role, Score, StepResult, Team, Vec2,
};
pub use error::{ConfigError, Result, TournamentError};
pub use tournament::{
    simulate_tournaments, AutoSimulator, BracketMatch, Pacing, PlayMode, SchedulerTick,
    SeedingStrategy, TeamPool, Tournament, TournamentTeam,
};
