//! ELO outcome model
//!
//! Fast-path match resolution: logistic win probability, a plausible
//! scoreline with the winner always ahead, a golden-goal chance that shrinks
//! with the rating gap, and the ELO → strength multiplier mapping used by
//! the live match.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::engine::physics_constants::elo;

/// Expected score of `a` against `b`
pub fn win_probability(a: f64, b: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf(-(a - b) / elo::SCALE))
}

/// True if `a` wins a single draw
pub fn pick_winner<R: Rng + ?Sized>(a: f64, b: f64, rng: &mut R) -> bool {
    rng.gen::<f64>() < win_probability(a, b)
}

/// Chance that a fast-simulated match goes to golden goal
pub fn golden_goal_probability(a: f64, b: f64) -> f64 {
    (elo::GOLDEN_GOAL_BASE - (a - b).abs() / elo::GOLDEN_GOAL_DECAY).max(0.0)
}

/// (winner goals, loser goals). Winner is always strictly ahead.
pub fn generate_score<R: Rng + ?Sized>(
    winner_elo: f64,
    loser_elo: f64,
    golden_goal: bool,
    rng: &mut R,
) -> (u32, u32) {
    if golden_goal {
        return (1, 0);
    }
    let base = ((winner_elo - loser_elo).abs() / 100.0).floor().min(4.0) as u32;
    let mut winner = 1 + (rng.gen::<f64>() * 3.0).floor() as u32;
    if rng.gen::<f64>() < 0.6 {
        winner += base / 2;
    }
    let margin = base + (rng.gen::<f64>() * 2.0).floor() as u32;
    let loser = winner.saturating_sub(margin);
    if loser >= winner {
        (loser + 1, loser)
    } else {
        (winner, loser)
    }
}

/// Map a rating onto `[MIN_STRENGTH, MAX_STRENGTH]` over the pool's range
pub fn strength_multiplier(rating: f64, min_elo: f64, max_elo: f64) -> f32 {
    let span = (elo::MAX_STRENGTH - elo::MIN_STRENGTH) as f64;
    if max_elo <= min_elo {
        return elo::MAX_STRENGTH;
    }
    let m = 1.0 - span * (max_elo - rating) / (max_elo - min_elo);
    (m as f32).clamp(elo::MIN_STRENGTH, elo::MAX_STRENGTH)
}

/// Result of a fast simulation, from team A's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FastResult {
    pub a_wins: bool,
    pub score_a: u32,
    pub score_b: u32,
    pub golden_goal: bool,
}

/// Resolve a match between ratings `a` and `b` without running physics
pub fn simulate_fast<R: Rng + ?Sized>(a: f64, b: f64, rng: &mut R) -> FastResult {
    let a_wins = pick_winner(a, b, rng);
    let golden_goal = rng.gen::<f64>() < golden_goal_probability(a, b);
    let (w, l) = if a_wins {
        generate_score(a, b, golden_goal, rng)
    } else {
        generate_score(b, a, golden_goal, rng)
    };
    let (score_a, score_b) = if a_wins { (w, l) } else { (l, w) };
    FastResult {
        a_wins,
        score_a,
        score_b,
        golden_goal,
    }
}
