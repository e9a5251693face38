pub mod ball_step; // per-tick ball orchestration
pub mod boundary;
pub mod collision;
pub mod events;
pub mod formation;
pub mod goal; // 골 판정 (grace / cooldown / keeper-save windows)
pub mod live_match;
pub mod match_state; // per-match timers & counters
pub mod offside;
pub mod physics_constants;
pub mod policy;
pub mod stats;
pub mod types;
pub mod vector;

pub use ball_step::{step_ball, BallEvent, StepOutcome};
pub use events::NotificationEvent;
pub use live_match::{
    LiveMatch, MatchConfig, MatchOutcome, MatchPhase, StepResult, TickData, TickSnapshot,
};
pub use match_state::MatchSimulationState;
pub use policy::{HeuristicPolicy, PlayerPolicy, PolicyInput, PolicyOutput, TeamContext};
pub use types::{Ball, Player, PlayerAction, Role, Score, Team, TouchEvent, TouchKind};
pub use vector::Vec2;
