//! Goal detector
//!
//! 골 판정. Red defends the left goal (x≈0), Blue the right goal (x≈800):
//! a ball beyond the left line is a Blue goal and vice versa.
//!
//! Detection is blocked during three windows:
//! - grace after kickoff/restart
//! - cooldown after a goal (ball resting in the mouth is held still)
//! - goalkeeper-save suppression after any keeper touch
//!
//! When not blocked, a goal is recognised by a line crossing this tick, a
//! retrospective crossing (fast ball tunnelling past the mouth), or a ball
//! already resting inside the goal.

use serde::{Deserialize, Serialize};

use super::boundary::in_goal_mouth;
use super::physics_constants::{goal, goal_detection};
use super::types::{Ball, Team};
use super::vector::Vec2;

/// Last goalkeeper touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalkeeperTouch {
    pub time: u64,
    pub team: Team,
}

/// Ball-inside-goal tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BallInGoal {
    pub in_goal: bool,
    /// Team that would be credited
    pub team: Option<Team>,
    pub entry_time: u64,
}

/// Why detection is currently suppressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalBlock {
    Grace,
    Cooldown,
    GoalkeeperSave,
}

/// How a goal was recognised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalKind {
    LineCrossed,
    Retrospective,
    Resting,
}

/// Goal detection state, reset at kickoff and after each goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalDetectionState {
    pub game_start_time: u64,
    pub last_goal_time: Option<u64>,
    pub last_goalkeeper_touch: Option<GoalkeeperTouch>,
    pub ball_in_goal: BallInGoal,
}

impl GoalDetectionState {
    pub fn new(now_ms: u64) -> Self {
        Self {
            game_start_time: now_ms,
            last_goal_time: None,
            last_goalkeeper_touch: None,
            ball_in_goal: BallInGoal::default(),
        }
    }

    /// Fresh kickoff: grace restarts, keeper touch and in-goal tracking cleared
    pub fn reset_for_kickoff(&mut self, now_ms: u64) {
        self.game_start_time = now_ms;
        self.last_goalkeeper_touch = None;
        self.ball_in_goal = BallInGoal::default();
    }

    pub fn record_goalkeeper_touch(&mut self, team: Team, now_ms: u64) {
        self.last_goalkeeper_touch = Some(GoalkeeperTouch { time: now_ms, team });
    }

    /// First window currently blocking detection, if any
    pub fn blocked(&self, now_ms: u64) -> Option<GoalBlock> {
        if let Some(last) = self.last_goal_time {
            if now_ms.saturating_sub(last) < goal_detection::COOLDOWN_MS {
                return Some(GoalBlock::Cooldown);
            }
        }
        if now_ms.saturating_sub(self.game_start_time) < goal_detection::GRACE_MS {
            return Some(GoalBlock::Grace);
        }
        if let Some(touch) = self.last_goalkeeper_touch {
            if now_ms.saturating_sub(touch.time) < goal_detection::GOALKEEPER_SAVE_MS {
                return Some(GoalBlock::GoalkeeperSave);
            }
        }
        None
    }
}

/// Result of a goal check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalCheck {
    pub scored: Option<Team>,
    pub kind: Option<GoalKind>,
    pub ball: Ball,
}

/// Scoring team if `position` lies beyond a goal line inside the mouth
pub fn goal_area_team(position: Vec2) -> Option<Team> {
    if !in_goal_mouth(position.y) {
        return None;
    }
    if position.x < goal::LEFT_LINE_X {
        Some(Team::Blue)
    } else if position.x > goal::RIGHT_LINE_X {
        Some(Team::Red)
    } else {
        None
    }
}

/// Scoring team if the segment `from → to` crossed a goal line, plus
/// whether the crossing point was inside the mouth
fn line_crossing(from: Vec2, to: Vec2) -> Option<(Team, bool)> {
    let crossing = |line_x: f32, team: Team| {
        let t = (from.x - line_x) / (from.x - to.x);
        let y = from.y + (to.y - from.y) * t;
        Some((team, in_goal_mouth(y)))
    };
    if from.x >= goal::LEFT_LINE_X && to.x < goal::LEFT_LINE_X {
        crossing(goal::LEFT_LINE_X, Team::Blue)
    } else if from.x <= goal::RIGHT_LINE_X && to.x > goal::RIGHT_LINE_X {
        crossing(goal::RIGHT_LINE_X, Team::Red)
    } else {
        None
    }
}

/// Classify the ball's movement this tick without touching any state
fn classify(previous: Option<Vec2>, new_position: Vec2) -> Option<(Team, GoalKind)> {
    let crossing = previous.and_then(|prev| line_crossing(prev, new_position));
    match (crossing, goal_area_team(new_position)) {
        (Some((team, _)), Some(_)) => Some((team, GoalKind::LineCrossed)),
        (Some((team, true)), None) => Some((team, GoalKind::Retrospective)),
        (Some((_, false)), None) => None,
        (None, Some(team)) => {
            if previous.is_none() {
                Some((team, GoalKind::LineCrossed))
            } else {
                Some((team, GoalKind::Resting))
            }
        }
        (None, None) => None,
    }
}

/// Check `ball` moving to `new_position` for a goal.
///
/// `ball.previous_position` is the position before this tick's integration.
pub fn check_goal(
    ball: &Ball,
    new_position: Vec2,
    state: &mut GoalDetectionState,
    now_ms: u64,
) -> GoalCheck {
    let mut updated = *ball;
    updated.position = new_position;

    let candidate = classify(ball.previous_position, new_position);

    if let Some(block) = state.blocked(now_ms) {
        if let Some((team, _)) = candidate {
            if !state.ball_in_goal.in_goal {
                state.ball_in_goal = BallInGoal {
                    in_goal: true,
                    team: Some(team),
                    entry_time: now_ms,
                };
            }
            if block == GoalBlock::Cooldown {
                updated.freeze();
            }
        }
        log::trace!("goal detection blocked ({:?})", block);
        return GoalCheck {
            scored: None,
            kind: None,
            ball: updated,
        };
    }

    match candidate {
        Some((team, kind)) => {
            log::debug!("goal for {} ({:?}) at t={}ms", team, kind, now_ms);
            updated.freeze();
            state.last_goal_time = Some(now_ms);
            state.game_start_time = now_ms;
            state.last_goalkeeper_touch = None;
            state.ball_in_goal = BallInGoal::default();
            GoalCheck {
                scored: Some(team),
                kind: Some(kind),
                ball: updated,
            }
        }
        None => {
            state.ball_in_goal = BallInGoal::default();
            GoalCheck {
                scored: None,
                kind: None,
                ball: updated,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::physics_constants::pitch;

    const AFTER_GRACE: u64 = goal_detection::GRACE_MS + 10;

    fn moving_ball(from: Vec2, velocity: Vec2) -> Ball {
        let mut ball = Ball::new(from, velocity);
        ball.previous_position = Some(from);
        ball
    }

    #[test]
    fn test_primary_detection_left_goal_is_blue() {
        let mut state = GoalDetectionState::new(0);
        let ball = moving_ball(Vec2::new(14.0, pitch::CENTER_Y), Vec2::new(-8.0, 0.0));
        let check = check_goal(&ball, Vec2::new(6.0, pitch::CENTER_Y), &mut state, AFTER_GRACE);
        assert_eq!(check.scored, Some(Team::Blue));
        assert_eq!(check.kind, Some(GoalKind::LineCrossed));
        assert!(check.ball.velocity.is_zero());
        assert_eq!(state.last_goal_time, Some(AFTER_GRACE));
    }

    #[test]
    fn test_grace_period_blocks_goal() {
        let mut state = GoalDetectionState::new(1_000);
        let ball = moving_ball(Vec2::new(786.0, 300.0), Vec2::new(8.0, 0.0));
        let check = check_goal(&ball, Vec2::new(794.0, 300.0), &mut state, 1_500);
        assert_eq!(check.scored, None);
        assert!(state.ball_in_goal.in_goal);
        assert_eq!(state.ball_in_goal.team, Some(Team::Red));
    }

    #[test]
    fn test_cooldown_holds_ball_in_goal() {
        let mut state = GoalDetectionState::new(0);
        state.last_goal_time = Some(10_000);
        state.game_start_time = 0;
        let ball = moving_ball(Vec2::new(12.0, 300.0), Vec2::new(-3.0, 0.0));
        let check = check_goal(&ball, Vec2::new(9.0, 300.0), &mut state, 11_000);
        assert_eq!(check.scored, None);
        assert!(check.ball.velocity.is_zero());
    }

    #[test]
    fn test_goalkeeper_save_suppression() {
        let mut state = GoalDetectionState::new(0);
        state.record_goalkeeper_touch(Team::Red, 5_000);
        let ball = moving_ball(Vec2::new(12.0, 300.0), Vec2::new(-5.0, 0.0));
        let blocked = check_goal(&ball, Vec2::new(7.0, 300.0), &mut state, 5_500);
        assert_eq!(blocked.scored, None);

        // Once the window passes the ball still resting in the goal counts
        let mut resting = blocked.ball;
        resting.previous_position = Some(Vec2::new(8.0, 300.0));
        let later = check_goal(&resting, Vec2::new(8.0, 300.0), &mut state, 6_100);
        assert_eq!(later.scored, Some(Team::Blue));
        assert_eq!(later.kind, Some(GoalKind::Resting));
    }

    #[test]
    fn test_retrospective_detection_catches_tunnelling() {
        let mut state = GoalDetectionState::new(0);
        // Diagonal shot: ends below the mouth but crossed the line inside it
        let from = Vec2::new(800.0 - 20.0, 340.0);
        let to = Vec2::new(800.0 + 10.0, 380.0);
        let ball = moving_ball(from, to - from);
        let check = check_goal(&ball, to, &mut state, AFTER_GRACE);
        assert_eq!(check.scored, Some(Team::Red));
        assert_eq!(check.kind, Some(GoalKind::Retrospective));
    }

    #[test]
    fn test_crossing_outside_mouth_is_not_goal() {
        let mut state = GoalDetectionState::new(0);
        let from = Vec2::new(20.0, 100.0);
        let to = Vec2::new(5.0, 100.0);
        let ball = moving_ball(from, to - from);
        let check = check_goal(&ball, to, &mut state, AFTER_GRACE);
        assert_eq!(check.scored, None);
    }

    #[test]
    fn test_goal_resets_windows() {
        let mut state = GoalDetectionState::new(0);
        state.record_goalkeeper_touch(Team::Blue, 100);
        let ball = moving_ball(Vec2::new(788.0, 300.0), Vec2::new(6.0, 0.0));
        let check = check_goal(&ball, Vec2::new(794.0, 300.0), &mut state, 5_000);
        assert_eq!(check.scored, Some(Team::Red));
        assert_eq!(state.last_goalkeeper_touch, None);
        assert_eq!(state.game_start_time, 5_000);
        assert_eq!(state.blocked(5_100), Some(GoalBlock::Cooldown));
        assert_eq!(state.blocked(8_100), None);
    }
}
