//! Ball ↔ player collision resolver
//!
//! Detection uses a role- and strength-aware reach. The response reflects
//! the incoming velocity about the contact normal, applies the player's
//! intended action, nudges the ball toward the opponent goal and finally
//! runs the own-goal guard.

use rand::Rng;

use super::physics_constants::{ball, collision, elo};
use super::types::{Player, PlayerAction, Role, Team, TouchEvent, TouchKind};
use super::vector::{lerp, wrap_angle, Vec2};

/// Base reach of a goalkeeper facing a straight-on shot (body only, no dive)
pub const GOALKEEPER_BODY_REACH: f32 = 20.0;

/// Strength advantage in `[0, 1]`: 0 = weakest team in the pool, 1 = strongest
pub fn strength_advantage(strength_multiplier: f32) -> f32 {
    ((strength_multiplier - elo::MIN_STRENGTH) / (elo::MAX_STRENGTH - elo::MIN_STRENGTH))
        .clamp(0.0, 1.0)
}

/// Reach scale derived from team strength
pub fn radius_multiplier(role: Role, strength_multiplier: f32) -> f32 {
    let (lo, hi) = if role.is_goalkeeper() {
        collision::GOALKEEPER_RADIUS_RANGE
    } else {
        collision::FIELD_RADIUS_RANGE
    };
    lerp(lo, hi, strength_advantage(strength_multiplier))
}

/// True if the ball is heading at `team`'s goal within the straight-shot cone
pub fn is_straight_on_shot(velocity: Vec2, team: Team) -> bool {
    let toward_own_goal = velocity.x * team.attack_sign() < 0.0;
    if !toward_own_goal {
        return false;
    }
    let off_axis_deg = velocity.y.abs().atan2(velocity.x.abs()).to_degrees();
    off_axis_deg <= collision::STRAIGHT_SHOT_ANGLE_DEG
}

/// Effective contact radius between ball and player centers
pub fn effective_radius(player: &Player, ball_velocity: Vec2) -> f32 {
    let base = match player.role {
        Role::Goalkeeper => {
            if is_straight_on_shot(ball_velocity, player.team) {
                GOALKEEPER_BODY_REACH
            } else {
                collision::GOALKEEPER_REACH
            }
        }
        _ => collision::FIELD_REACH,
    };
    base * radius_multiplier(player.role, player.strength_multiplier)
}

/// Angular pull toward the opponent goal, as a fraction of the angle gap
pub fn directional_bias(strength_multiplier: f32) -> f32 {
    let adv = strength_advantage(strength_multiplier);
    // 1-2× below the high-advantage band, 2-3× inside it
    let factor = if adv >= collision::HIGH_ADVANTAGE {
        2.0 + (adv - collision::HIGH_ADVANTAGE) / (1.0 - collision::HIGH_ADVANTAGE)
    } else {
        1.0 + adv / collision::HIGH_ADVANTAGE
    };
    (collision::BASE_DIRECTIONAL_BIAS * factor).min(collision::MAX_DIRECTIONAL_BIAS)
}

/// Never let a touch send the ball hard at the toucher's own goal.
///
/// If `velocity` points at `team`'s own goal with `|vx|` above the
/// threshold, the x sign is flipped and a lateral deflection is added.
pub fn apply_own_goal_guard<R: Rng + ?Sized>(velocity: Vec2, team: Team, rng: &mut R) -> Vec2 {
    let toward_own = -velocity.x * team.attack_sign();
    if toward_own <= collision::OWN_GOAL_VX_THRESHOLD {
        return velocity;
    }
    let lateral_sign = if velocity.y > 0.0 {
        1.0
    } else if velocity.y < 0.0 {
        -1.0
    } else if rng.gen_bool(0.5) {
        1.0
    } else {
        -1.0
    };
    log::trace!("own-goal guard engaged for {} (vx={:.2})", team, velocity.x);
    Vec2::new(-velocity.x, velocity.y + lateral_sign * collision::OWN_GOAL_LATERAL)
}

/// Post-collision velocity, or `None` if the ball is out of reach.
///
/// `pass_target` is the receiver's position when `action` is a pass.
pub fn resolve_collision<R: Rng + ?Sized>(
    ball_pos: Vec2,
    ball_velocity: Vec2,
    player: &Player,
    action: PlayerAction,
    pass_target: Option<Vec2>,
    rng: &mut R,
) -> Option<Vec2> {
    let distance = ball_pos.distance(&player.position);
    if distance > effective_radius(player, ball_velocity) {
        return None;
    }

    let normal = {
        let n = (ball_pos - player.position).normalize();
        if n.is_zero() {
            // Ball exactly on the player: push it toward the opponent goal
            Vec2::new(player.team.attack_sign(), 0.0)
        } else {
            n
        }
    };

    let outgoing = if ball_velocity.dot(&normal) < 0.0 {
        ball_velocity.reflect(&normal)
    } else {
        ball_velocity
    };
    let mut angle = if outgoing.is_zero() {
        normal.angle()
    } else {
        outgoing.angle()
    };

    let speed_multiplier = if player.role.is_goalkeeper() {
        collision::GOALKEEPER_SPEED_MULTIPLIER
    } else {
        collision::FIELD_SPEED_MULTIPLIER
    };
    let mut speed = ball_velocity.length().max(collision::BASE_KICK_SPEED) * speed_multiplier;

    let goal_angle = (player.team.attacking_goal_center() - ball_pos).angle();
    let mut bias = if player.role.is_goalkeeper() {
        0.0
    } else {
        directional_bias(player.strength_multiplier)
    };

    match action {
        PlayerAction::Move => {}
        PlayerAction::Shoot => {
            speed *= collision::SHOT_POWER_MULTIPLIER * player.strength_multiplier;
            bias = (bias * 2.0).min(collision::MAX_DIRECTIONAL_BIAS);
        }
        PlayerAction::Pass { .. } => {
            if let Some(target) = pass_target {
                let to_target = target - ball_pos;
                if !to_target.is_zero() {
                    angle = to_target.angle();
                    speed = collision::PASS_SPEED * player.strength_multiplier;
                    bias = 0.0;
                }
            }
        }
        PlayerAction::Intercept => {
            speed *= collision::INTERCEPT_DAMPING;
        }
    }

    angle += wrap_angle(goal_angle - angle) * bias;

    if !player.role.is_goalkeeper() && !matches!(action, PlayerAction::Pass { .. }) {
        let adv = strength_advantage(player.strength_multiplier);
        if adv > collision::PERFECT_SHOT_ADVANTAGE
            && rng.gen::<f32>() < collision::PERFECT_SHOT_CHANCE * adv
        {
            log::trace!("perfect shot by player {}", player.id);
            angle = goal_angle;
        }
    }

    let velocity = apply_own_goal_guard(Vec2::from_angle(angle, speed), player.team, rng);
    Some(velocity.clamp_length(ball::MIN_SPEED, ball::MAX_SPEED))
}

/// Collision plus the touch event that goes with it
pub fn collide<R: Rng + ?Sized>(
    ball_pos: Vec2,
    ball_velocity: Vec2,
    player: &Player,
    action: PlayerAction,
    pass_target: Option<Vec2>,
    rng: &mut R,
) -> Option<(Vec2, TouchEvent)> {
    resolve_collision(ball_pos, ball_velocity, player, action, pass_target, rng).map(|velocity| {
        let kind = if player.role.is_goalkeeper() {
            TouchKind::Save
        } else {
            TouchKind::Kick
        };
        (
            velocity,
            TouchEvent {
                player_id: player.id,
                team: player.team,
                role: player.role,
                kind,
            },
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(0)
    }

    fn player(team: Team, role: Role, x: f32, y: f32, strength: f32) -> Player {
        Player::new(1, team, role, Vec2::new(x, y), strength)
    }

    #[test]
    fn test_radius_multiplier_bounds() {
        assert!((radius_multiplier(Role::Forward, 0.8) - 0.7).abs() < 1e-6);
        assert!((radius_multiplier(Role::Forward, 1.0) - 1.4).abs() < 1e-6);
        assert!((radius_multiplier(Role::Goalkeeper, 0.8) - 0.8).abs() < 1e-6);
        assert!((radius_multiplier(Role::Goalkeeper, 1.0) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_out_of_reach_is_none() {
        let p = player(Team::Red, Role::Midfielder, 200.0, 300.0, 1.0);
        let mut rng = test_rng();
        let v = resolve_collision(
            Vec2::new(300.0, 300.0),
            Vec2::new(-5.0, 0.0),
            &p,
            PlayerAction::Move,
            None,
            &mut rng,
        );
        assert!(v.is_none());
    }

    #[test]
    fn test_goalkeeper_reach_depends_on_shot_angle() {
        let gk = player(Team::Red, Role::Goalkeeper, 30.0, 300.0, 0.9);
        let straight = effective_radius(&gk, Vec2::new(-10.0, 0.5));
        let angled = effective_radius(&gk, Vec2::new(-5.0, 5.0));
        assert!(angled > straight);
        // Moving away from the goal is never a straight-on shot
        assert!(!is_straight_on_shot(Vec2::new(10.0, 0.0), Team::Red));
    }

    #[test]
    fn test_own_goal_guard_flips_x() {
        // Red player, ball between player and own goal, moving into the player.
        // Naive reflection sends it straight back at the red goal.
        let p = player(Team::Red, Role::Defender, 200.0, 300.0, 0.8);
        let mut rng = test_rng();
        let v = resolve_collision(
            Vec2::new(190.0, 300.0),
            Vec2::new(5.0, 0.0),
            &p,
            PlayerAction::Move,
            None,
            &mut rng,
        )
        .unwrap();
        assert!(v.x > 0.0, "ball must leave away from own goal, got {:?}", v);
    }

    #[test]
    fn test_own_goal_guard_blue_mirror() {
        let mut rng = test_rng();
        let guarded = apply_own_goal_guard(Vec2::new(6.0, 0.0), Team::Blue, &mut rng);
        assert!(guarded.x < 0.0);
        assert!(guarded.y.abs() > 0.0);
        // Below the threshold nothing changes
        let gentle = apply_own_goal_guard(Vec2::new(1.0, 0.5), Team::Blue, &mut rng);
        assert_eq!(gentle, Vec2::new(1.0, 0.5));
    }

    #[test]
    fn test_directional_bias_scales_with_strength() {
        let weak = directional_bias(0.8);
        let strong = directional_bias(1.0);
        assert!((weak - collision::BASE_DIRECTIONAL_BIAS).abs() < 1e-6);
        assert!((strong / weak - 3.0).abs() < 1e-4);
        assert!(directional_bias(0.96) / weak >= 2.0);
    }

    #[test]
    fn test_pass_goes_to_target() {
        let p = player(Team::Blue, Role::Midfielder, 400.0, 300.0, 0.9);
        let mut rng = test_rng();
        let target = Vec2::new(395.0, 100.0);
        let v = resolve_collision(
            Vec2::new(395.0, 300.0),
            Vec2::new(3.0, 0.0),
            &p,
            PlayerAction::Pass { target: 7 },
            Some(target),
            &mut rng,
        )
        .unwrap();
        assert!(v.y < 0.0 && v.x.abs() < 0.01);
    }

    #[test]
    fn test_collide_reports_save_for_goalkeeper() {
        let gk = player(Team::Blue, Role::Goalkeeper, 770.0, 300.0, 1.0);
        let mut rng = test_rng();
        let (_, touch) = collide(
            Vec2::new(760.0, 310.0),
            Vec2::new(6.0, 4.0),
            &gk,
            PlayerAction::Move,
            None,
            &mut rng,
        )
        .unwrap();
        assert_eq!(touch.kind, TouchKind::Save);
        assert_eq!(touch.team, Team::Blue);
    }

    #[test]
    fn test_response_speed_clamped() {
        let p = player(Team::Red, Role::Forward, 500.0, 300.0, 1.0);
        let mut rng = test_rng();
        for _ in 0..50 {
            let v = resolve_collision(
                Vec2::new(510.0, 305.0),
                Vec2::new(-14.0, 3.0),
                &p,
                PlayerAction::Shoot,
                None,
                &mut rng,
            )
            .unwrap();
            let s = v.length();
            assert!(s >= ball::MIN_SPEED - 1e-3 && s <= ball::MAX_SPEED + 1e-3);
        }
    }
}
