//! Tournament layer: ELO outcome model, bracket, scheduler

pub mod bracket;
pub mod bulk;
pub mod elo;
pub mod scheduler;
pub mod teams;

pub use bracket::{BracketMatch, MatchResult, MatchScore, SeedingStrategy, Tournament};
pub use bulk::{simulate_tournaments, BulkSummary, ChampionCount};
pub use elo::{simulate_fast, win_probability, FastResult};
pub use scheduler::{AutoSimulator, Pacing, PlayMode, SchedulerTick, SingleFlight};
pub use teams::{KitColors, TeamPool, TournamentTeam};
