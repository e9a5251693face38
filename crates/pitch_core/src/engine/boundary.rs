//! Boundary & goal-post bouncer
//!
//! Touchlines always reflect. Goal lines reflect only outside the goal
//! mouth; inside it the ball is left for the goal detector. Repeated bounces
//! on the same side inside a short window trigger an escape toward the
//! pitch center so corner trajectories cannot loop forever.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::physics_constants::{ball, bounce, goal, pitch};
use super::types::{BounceDetection, BounceSide};
use super::vector::Vec2;

/// Outcome of a boundary pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryResult {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Edge reflected this tick, if any
    pub bounced: Option<BounceSide>,
    /// Goal frame contact this tick
    pub post_hit: bool,
    /// Stuck-corner escape fired this tick
    pub escaped: bool,
}

/// True if `y` is inside the goal mouth
pub fn in_goal_mouth(y: f32) -> bool {
    (goal::Y_MIN..=goal::Y_MAX).contains(&y)
}

/// Clamp a ball position into the playable rectangle
pub fn clamp_to_pitch(position: Vec2) -> Vec2 {
    Vec2::new(
        position.x.clamp(ball::RADIUS, pitch::WIDTH - ball::RADIUS),
        position.y.clamp(ball::RADIUS, pitch::HEIGHT - ball::RADIUS),
    )
}

fn goal_posts() -> [Vec2; 4] {
    [
        Vec2::new(goal::LEFT_LINE_X, goal::Y_MIN),
        Vec2::new(goal::LEFT_LINE_X, goal::Y_MAX),
        Vec2::new(goal::RIGHT_LINE_X, goal::Y_MIN),
        Vec2::new(goal::RIGHT_LINE_X, goal::Y_MAX),
    ]
}

/// Reflect off a goal post with the frame's restitution. Returns true on contact.
fn resolve_posts(position: &mut Vec2, velocity: &mut Vec2) -> bool {
    let contact = goal::POST_RADIUS + ball::RADIUS;
    for post in goal_posts() {
        let offset = *position - post;
        let distance = offset.length();
        if distance >= contact {
            continue;
        }
        let normal = if distance > f32::EPSILON {
            offset.normalize()
        } else {
            // Dead center on the post: push back into the field
            Vec2::new(if post.x < pitch::CENTER_X { 1.0 } else { -1.0 }, 0.0)
        };
        if velocity.dot(&normal) < 0.0 {
            *velocity = velocity.reflect(&normal) * goal::POST_RESTITUTION;
        }
        *position = post + normal * contact;
        return true;
    }
    false
}

fn register_bounce(state: &mut BounceDetection, side: BounceSide, now_ms: u64) {
    let same_side = state.last_bounce_side == Some(side);
    let in_window = now_ms.saturating_sub(state.last_bounce_time) <= bounce::STUCK_WINDOW_MS;
    if same_side && in_window {
        state.consecutive_bounces += 1;
    } else {
        state.consecutive_bounces = 1;
    }
    state.last_bounce_side = Some(side);
    state.last_bounce_time = now_ms;
}

/// Escape velocity toward the pitch center with a random lateral kick
fn escape_velocity<R: Rng + ?Sized>(position: Vec2, rng: &mut R) -> (Vec2, f32) {
    let center = Vec2::new(pitch::CENTER_X, pitch::CENTER_Y);
    let dir = (center - position).normalize();
    let lateral = rng.gen_range(-bounce::ESCAPE_LATERAL..=bounce::ESCAPE_LATERAL);
    (dir * bounce::ESCAPE_SPEED + dir.perpendicular() * lateral, lateral)
}

/// Resolve the ball against pitch edges and the goal frame.
pub fn resolve_boundary<R: Rng + ?Sized>(
    position: Vec2,
    velocity: Vec2,
    state: &mut BounceDetection,
    now_ms: u64,
    rng: &mut R,
) -> BoundaryResult {
    let r = ball::RADIUS;
    let mut pos = position;
    let mut vel = velocity;
    let mut side = None;

    if pos.y < r {
        pos.y = r;
        vel.y = vel.y.abs() * bounce::EDGE_DAMPING;
        side = Some(BounceSide::Top);
    } else if pos.y > pitch::HEIGHT - r {
        pos.y = pitch::HEIGHT - r;
        vel.y = -vel.y.abs() * bounce::EDGE_DAMPING;
        side = Some(BounceSide::Bottom);
    }

    if !in_goal_mouth(pos.y) {
        if pos.x < r {
            pos.x = r;
            vel.x = vel.x.abs() * bounce::EDGE_DAMPING;
            side = Some(BounceSide::Left);
        } else if pos.x > pitch::WIDTH - r {
            pos.x = pitch::WIDTH - r;
            vel.x = -vel.x.abs() * bounce::EDGE_DAMPING;
            side = Some(BounceSide::Right);
        }
    }

    let post_hit = resolve_posts(&mut pos, &mut vel);

    let mut escaped = false;
    if let Some(s) = side {
        if vel.length() < bounce::MIN_POST_BOUNCE_SPEED {
            vel = if vel.is_zero() {
                let center = Vec2::new(pitch::CENTER_X, pitch::CENTER_Y);
                (center - pos).with_length(bounce::MIN_POST_BOUNCE_SPEED)
            } else {
                vel.with_length(bounce::MIN_POST_BOUNCE_SPEED)
            };
        }

        register_bounce(state, s, now_ms);
        if state.consecutive_bounces >= bounce::STUCK_BOUNCES {
            let (escape, lateral) = escape_velocity(pos, rng);
            log::debug!(
                "stuck ball on {:?} edge ({} bounces), escaping toward center",
                s,
                state.consecutive_bounces
            );
            vel = escape;
            state.side_effect = lateral;
            state.consecutive_bounces = 0;
            escaped = true;
        }
    }

    BoundaryResult {
        position: clamp_to_pitch(pos),
        velocity: vel,
        bounced: side,
        post_hit,
        escaped,
    }
}
