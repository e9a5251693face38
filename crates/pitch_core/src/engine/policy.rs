//! Player decision policies
//!
//! The live match owns one policy per player and queries it every tick.
//! A policy sees the ball, its own position, every teammate and opponent,
//! its role and a small team context, and answers with a movement vector
//! plus the action to apply if it touches the ball this tick.

use serde::{Deserialize, Serialize};

use super::physics_constants::{goal, pitch, player};
use super::types::{PlayerAction, Role, Team};
use super::vector::Vec2;

/// Team-level facts shared by all of a team's policies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamContext {
    pub team: Team,
    pub player_id: u32,
    /// Formation anchor
    pub anchor: Vec2,
    /// This player is the team's closest outfielder to the ball
    pub nearest_to_ball: bool,
    /// Own goals minus opponent goals
    pub goal_difference: i32,
}

/// What a policy observes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyInput {
    pub ball_position: Vec2,
    pub ball_velocity: Vec2,
    pub player_position: Vec2,
    /// (player id, position), self excluded
    pub teammate_positions: Vec<(u32, Vec2)>,
    pub opponent_positions: Vec<Vec2>,
    pub role: Role,
    pub team_context: TeamContext,
}

/// What a policy decides
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PolicyOutput {
    /// Desired displacement this tick; the match limits its length
    pub move_vector: Vec2,
    pub action: PlayerAction,
}

/// Per-player decision maker
pub trait PlayerPolicy: Send {
    fn decide(&mut self, input: &PolicyInput) -> PolicyOutput;

    fn name(&self) -> &'static str {
        "policy"
    }
}

/// Rule-based default policy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeuristicPolicy {
    /// Shoot when the ball is this close to the opponent goal center
    pub shooting_range: f32,
    /// A pass target must be this much further forward than the ball
    pub pass_gain: f32,
    /// How far outfielders shift their anchor with the ball (0..1)
    pub ball_follow: f32,
}

impl Default for HeuristicPolicy {
    fn default() -> Self {
        Self {
            shooting_range: 220.0,
            pass_gain: 60.0,
            ball_follow: 0.35,
        }
    }
}

impl HeuristicPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    fn steer(from: Vec2, to: Vec2) -> Vec2 {
        (to - from).clamp_length(0.0, player::MAX_SPEED)
    }

    fn goalkeeper(&self, input: &PolicyInput) -> PolicyOutput {
        let team = input.team_context.team;
        // Stay on the line, track the ball's y inside the mouth
        let guard_x = team.own_goal_line_x() + team.attack_sign() * 20.0;
        let guard_y = input.ball_position.y.clamp(goal::Y_MIN, goal::Y_MAX);
        PolicyOutput {
            move_vector: Self::steer(input.player_position, Vec2::new(guard_x, guard_y)),
            action: PlayerAction::Move,
        }
    }

    fn choose_action(&self, input: &PolicyInput) -> PlayerAction {
        let team = input.team_context.team;
        let ball = input.ball_position;

        if ball.distance(&team.attacking_goal_center()) <= self.shooting_range {
            return PlayerAction::Shoot;
        }
        if input.role == Role::Defender && team.in_own_half(ball.x) {
            return PlayerAction::Intercept;
        }

        let ball_progress = team.attacking_progress(ball.x);
        input
            .teammate_positions
            .iter()
            .filter(|(_, pos)| team.attacking_progress(pos.x) - ball_progress >= self.pass_gain)
            .max_by(|(_, a), (_, b)| {
                team.attacking_progress(a.x)
                    .total_cmp(&team.attacking_progress(b.x))
            })
            .map(|&(id, _)| PlayerAction::Pass { target: id })
            .unwrap_or(PlayerAction::Move)
    }
}

impl PlayerPolicy for HeuristicPolicy {
    fn decide(&mut self, input: &PolicyInput) -> PolicyOutput {
        if input.role.is_goalkeeper() {
            return self.goalkeeper(input);
        }

        let ctx = input.team_context;
        let target = if ctx.nearest_to_ball {
            // Approach from behind so the touch carries the ball forward
            input.ball_position - Vec2::new(ctx.team.attack_sign() * 6.0, 0.0)
        } else {
            let shift = (input.ball_position.x - pitch::CENTER_X) * self.ball_follow;
            Vec2::new(ctx.anchor.x + shift, ctx.anchor.y)
        };

        PolicyOutput {
            move_vector: Self::steer(input.player_position, target),
            action: self.choose_action(input),
        }
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}
