//! Per-match simulation state
//!
//! Every timer, counter and tracker the per-tick physics needs lives here,
//! owned by one match and passed by `&mut` into each subsystem.

use serde::{Deserialize, Serialize};

use super::goal::GoalDetectionState;
use super::offside::OffsideState;
use super::physics_constants::collision;
use super::types::Team;

/// Mutable per-match state threaded through the ball motion step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchSimulationState {
    /// Current match time (ms)
    pub now_ms: u64,
    pub goal: GoalDetectionState,
    pub offside: OffsideState,
    pub last_goalkeeper_collision: Option<u64>,
    pub last_field_collision: Option<u64>,
    /// Consecutive ticks the ball barely moved
    pub stationary_ticks: u32,
    pub last_touch_team: Option<Team>,
    pub last_touch_player: Option<u32>,
}

impl MatchSimulationState {
    pub fn new(now_ms: u64) -> Self {
        Self {
            now_ms,
            goal: GoalDetectionState::new(now_ms),
            offside: OffsideState::new(),
            last_goalkeeper_collision: None,
            last_field_collision: None,
            stationary_ticks: 0,
            last_touch_team: None,
            last_touch_player: None,
        }
    }

    pub fn goalkeeper_on_cooldown(&self) -> bool {
        matches!(self.last_goalkeeper_collision,
            Some(t) if self.now_ms.saturating_sub(t) < collision::GOALKEEPER_COOLDOWN_MS)
    }

    pub fn field_on_cooldown(&self) -> bool {
        matches!(self.last_field_collision,
            Some(t) if self.now_ms.saturating_sub(t) < collision::FIELD_COOLDOWN_MS)
    }

    /// Kickoff after a goal: new phase of play.
    ///
    /// Goal cooldown (`last_goal_time`) is kept; everything else restarts.
    pub fn reset_for_kickoff(&mut self) {
        self.goal.reset_for_kickoff(self.now_ms);
        self.offside.reset();
        self.last_goalkeeper_collision = None;
        self.last_field_collision = None;
        self.stationary_ticks = 0;
        self.last_touch_team = None;
        self.last_touch_player = None;
    }
}

impl Default for MatchSimulationState {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::offside::FreeKickState;
    use crate::engine::vector::Vec2;

    #[test]
    fn test_cooldowns() {
        let mut state = MatchSimulationState::new(1_000);
        state.last_goalkeeper_collision = Some(950);
        state.last_field_collision = Some(900);
        assert!(state.goalkeeper_on_cooldown());
        assert!(state.field_on_cooldown());
        state.now_ms = 1_050;
        assert!(!state.goalkeeper_on_cooldown());
        assert!(!state.field_on_cooldown());
    }

    #[test]
    fn test_kickoff_reset_cancels_free_kick() {
        let mut state = MatchSimulationState::new(0);
        state.offside.free_kick = Some(FreeKickState {
            in_progress: true,
            team: Team::Red,
            position: Vec2::new(100.0, 100.0),
            auto_execute_deadline: 3_000,
        });
        state.goal.last_goal_time = Some(500);
        state.now_ms = 500;
        state.reset_for_kickoff();
        assert!(state.offside.free_kick.is_none());
        assert_eq!(state.goal.last_goal_time, Some(500));
        assert_eq!(state.goal.game_start_time, 500);
    }
}
