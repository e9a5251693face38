//! Physics constants for the match simulation
//!
//! One canonical constant set. Units are pitch units (the pitch is 800×600)
//! and milliseconds; velocities are pitch units per tick.

/// Pitch dimensions
pub mod pitch {
    /// Pitch width (x axis, goal to goal)
    pub const WIDTH: f32 = 800.0;
    /// Pitch height (y axis, touchline to touchline)
    pub const HEIGHT: f32 = 600.0;
    /// Center X coordinate
    pub const CENTER_X: f32 = WIDTH * 0.5;
    /// Center Y coordinate
    pub const CENTER_Y: f32 = HEIGHT * 0.5;
}

/// Goal mouth and frame
pub mod goal {
    use super::{ball, pitch};

    /// Goal mouth extent along the y axis
    pub const MOUTH_WIDTH: f32 = 120.0;
    /// Goal mouth y minimum
    pub const Y_MIN: f32 = pitch::CENTER_Y - MOUTH_WIDTH * 0.5;
    /// Goal mouth y maximum
    pub const Y_MAX: f32 = pitch::CENTER_Y + MOUTH_WIDTH * 0.5;
    /// Left goal line (Red defends). Ball center past this line = beyond the line.
    pub const LEFT_LINE_X: f32 = ball::RADIUS + 2.0;
    /// Right goal line (Blue defends)
    pub const RIGHT_LINE_X: f32 = pitch::WIDTH - ball::RADIUS - 2.0;
    /// Depth of the area treated as "inside the goal" for resting-ball checks
    pub const AREA_DEPTH: f32 = 14.0;
    /// Goal post radius
    pub const POST_RADIUS: f32 = 4.0;
    /// 골포스트 반발 계수 (edges are springier than the frame)
    pub const POST_RESTITUTION: f32 = 0.6;
}

/// Ball physics
pub mod ball {
    /// Ball radius
    pub const RADIUS: f32 = 8.0;
    /// Speed floor outside frozen states
    pub const MIN_SPEED: f32 = 2.0;
    /// Speed ceiling
    pub const MAX_SPEED: f32 = 15.0;
    /// Universal per-tick deceleration
    pub const DECAY: f32 = 0.998;
    /// Kickoff speed after a goal or at match start
    pub const KICKOFF_SPEED: f32 = 4.0;
    /// Displacement under which a tick counts as stationary
    pub const STATIONARY_EPSILON: f32 = 0.05;
    /// Consecutive stationary ticks before the unstick kick
    pub const STALL_TICKS: u32 = 20;
    /// Unstick kick magnitude range
    pub const UNSTICK_MIN_SPEED: f32 = 3.0;
    pub const UNSTICK_MAX_SPEED: f32 = 6.0;
    /// Attempts at a random unstick vector before forcing it toward the center
    pub const UNSTICK_RETRIES: u32 = 5;
}

/// Edge bounces
pub mod bounce {
    /// Energy kept after an edge reflection
    pub const EDGE_DAMPING: f32 = 0.88;
    /// Minimum speed after any edge bounce
    pub const MIN_POST_BOUNCE_SPEED: f32 = 2.5;
    /// Window in which repeated same-side bounces count as stuck (ms)
    pub const STUCK_WINDOW_MS: u64 = 500;
    /// Same-side bounces inside the window that trigger the escape
    pub const STUCK_BOUNCES: u32 = 2;
    /// Escape speed toward the pitch center
    pub const ESCAPE_SPEED: f32 = 6.0;
    /// Max random lateral perturbation added to the escape vector
    pub const ESCAPE_LATERAL: f32 = 1.5;
}

/// Ball ↔ player collision
pub mod collision {
    /// Field player reach (body radius + ball radius + extension)
    pub const FIELD_REACH: f32 = 22.0;
    /// Goalkeeper reach for angled shots
    pub const GOALKEEPER_REACH: f32 = 30.0;
    /// Shots within this angle of the goal axis count as straight-on (degrees)
    pub const STRAIGHT_SHOT_ANGLE_DEG: f32 = 22.5;

    /// Field player radius multiplier range (weakest, strongest)
    pub const FIELD_RADIUS_RANGE: (f32, f32) = (0.7, 1.4);
    /// Goalkeeper radius multiplier range (weakest, strongest)
    pub const GOALKEEPER_RADIUS_RANGE: (f32, f32) = (0.8, 1.5);

    /// Outgoing speed multiplier
    pub const FIELD_SPEED_MULTIPLIER: f32 = 1.2;
    pub const GOALKEEPER_SPEED_MULTIPLIER: f32 = 1.4;
    /// Base outgoing speed so slow balls still leave the body
    pub const BASE_KICK_SPEED: f32 = 5.0;

    /// Shot/pass/intercept power
    pub const SHOT_POWER_MULTIPLIER: f32 = 1.3;
    pub const PASS_SPEED: f32 = 7.0;
    pub const INTERCEPT_DAMPING: f32 = 0.8;

    /// Angular bias toward the opponent goal (fraction of the angle gap)
    pub const BASE_DIRECTIONAL_BIAS: f32 = 0.15;
    pub const MAX_DIRECTIONAL_BIAS: f32 = 0.6;
    /// Advantage above which the 2-3× bias band applies
    pub const HIGH_ADVANTAGE: f32 = 0.75;
    /// Advantage above which a perfect shot can happen
    pub const PERFECT_SHOT_ADVANTAGE: f32 = 0.85;
    /// Skill check probability scale for a perfect shot
    pub const PERFECT_SHOT_CHANCE: f32 = 0.25;

    /// |vx| toward the own goal above which the guard engages
    pub const OWN_GOAL_VX_THRESHOLD: f32 = 2.0;
    /// Lateral deflection added by the own-goal guard
    pub const OWN_GOAL_LATERAL: f32 = 1.5;

    /// Re-trigger cooldowns (ms)
    pub const GOALKEEPER_COOLDOWN_MS: u64 = 100;
    pub const FIELD_COOLDOWN_MS: u64 = 150;
}

/// Offside and free kicks
pub mod offside {
    /// Teammates this close to the ball are checked on a touch
    pub const CAPTURE_RADIUS: f32 = 40.0;
    /// Unclaimed free kick auto-executes after this (ms)
    pub const AUTO_EXECUTE_MS: u64 = 3000;
    /// Offside flag cleared this long after the free kick is taken (ms)
    pub const FLAG_CLEAR_DELAY_MS: u64 = 500;
    /// Auto-kick power
    pub const AUTO_KICK_POWER: f32 = 8.0;
    /// Max |vy| of the auto-kick
    pub const AUTO_KICK_MAX_VY: f32 = 1.0;
}

/// Goal detection windows (ms)
pub mod goal_detection {
    pub const GRACE_MS: u64 = 1500;
    pub const COOLDOWN_MS: u64 = 3000;
    pub const GOALKEEPER_SAVE_MS: u64 = 1000;
}

/// Player movement
pub mod player {
    /// Max displacement per tick at strength 1.0
    pub const MAX_SPEED: f32 = 3.0;
    /// Body radius (for pitch clamping)
    pub const RADIUS: f32 = 12.0;
}

/// Match clock
pub mod timing {
    /// Nominal tick length (~60Hz)
    pub const TICK_MS: u64 = 16;
    /// Regulation length of a live match (in-game ms)
    pub const MATCH_DURATION_MS: u64 = 90_000;
    /// Golden goal gives up after this and tosses a coin
    pub const GOLDEN_GOAL_CAP_MS: u64 = 60_000;
    /// Possession sampling period
    pub const POSSESSION_SAMPLE_MS: u64 = 1000;
    /// Stats snapshot period
    pub const SNAPSHOT_MS: u64 = 5000;
}

/// ELO model
pub mod elo {
    /// Default pool bounds
    pub const MIN_ELO: f64 = 1560.0;
    pub const MAX_ELO: f64 = 2010.0;
    /// Weakest team's strength multiplier
    pub const MIN_STRENGTH: f32 = 0.8;
    /// Strongest team's strength multiplier
    pub const MAX_STRENGTH: f32 = 1.0;
    /// Logistic scale
    pub const SCALE: f64 = 400.0;
    /// Golden goal base probability and decay
    pub const GOLDEN_GOAL_BASE: f64 = 0.3;
    pub const GOLDEN_GOAL_DECAY: f64 = 500.0;
}

/// Tournament bracket
pub mod bracket {
    pub const TEAMS: usize = 128;
    pub const ROUNDS: u8 = 7;
    /// Scheduler pacing (ms)
    pub const BETWEEN_MATCHES_MS: u64 = 200;
    pub const BETWEEN_ROUNDS_MS: u64 = 800;
    pub const LOCK_SETTLE_MS: u64 = 50;
}
