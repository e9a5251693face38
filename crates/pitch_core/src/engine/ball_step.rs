//! Ball motion step - once per tick
//!
//! Order within a tick (fixed):
//! 1. pending free kick holds the ball (only auto-kick / awarded team can release)
//! 2. ball resting in a goal mouth during the post-goal cooldown stays put,
//!    otherwise unstick kick for a dead or stalled ball
//! 3. integrate position
//! 4. goal detection (a goal preempts the rest of the tick)
//! 5. boundary & goal posts
//! 6. collisions: goalkeepers first, then field players, at most one
//! 7. decay and speed floor/ceiling

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use super::boundary::{clamp_to_pitch, in_goal_mouth, resolve_boundary};
use super::collision::collide;
use super::goal::{check_goal, goal_area_team, GoalBlock, GoalKind};
use super::match_state::MatchSimulationState;
use super::offside::{auto_kick_velocity, OffsideCall};
use super::physics_constants::{ball, goal, pitch};
use super::types::{Ball, BounceSide, Player, PlayerAction, Team, TouchEvent, TouchKind};
use super::vector::Vec2;

/// Something that happened to the ball this tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BallEvent {
    Goal { team: Team, kind: GoalKind },
    Touch(TouchEvent),
    Offside(OffsideCall),
    FreeKickTaken { team: Team, auto: bool },
    Bounce(BounceSide),
    PostHit,
    CornerEscape,
    Unstuck,
}

/// Result of one ball motion step
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub ball: Ball,
    pub events: Vec<BallEvent>,
    /// Ball deliberately held still this tick
    pub frozen: bool,
}

impl StepOutcome {
    pub fn goal(&self) -> Option<Team> {
        self.events.iter().find_map(|e| match e {
            BallEvent::Goal { team, .. } => Some(*team),
            _ => None,
        })
    }
}

/// Ball at the center spot moving into `kicking_team`'s attacking direction
///
/// After a goal the restart moves away from the scorer's own half, so
/// `kicking_team` is the scorer: Red scores, the ball heads right into
/// Blue's half.
pub fn kickoff_ball<R: Rng + ?Sized>(kicking_team: Team, rng: &mut R) -> Ball {
    let vy = rng.gen_range(-1.0..=1.0);
    let velocity = Vec2::new(kicking_team.attack_sign() * ball::KICKOFF_SPEED, vy);
    Ball::new(Vec2::new(pitch::CENTER_X, pitch::CENTER_Y), velocity)
}

/// True if a ray from `position` along `velocity` hits either goal mouth
pub fn aims_at_goal_mouth(position: Vec2, velocity: Vec2) -> bool {
    if velocity.x == 0.0 {
        return false;
    }
    let line_x = if velocity.x < 0.0 {
        goal::LEFT_LINE_X
    } else {
        goal::RIGHT_LINE_X
    };
    let t = (line_x - position.x) / velocity.x;
    if t < 0.0 {
        return false;
    }
    in_goal_mouth(position.y + velocity.y * t)
}

/// Random kick for a dead ball that never points straight at a goal
pub fn unstick_velocity<R: Rng + ?Sized>(position: Vec2, rng: &mut R) -> Vec2 {
    for _ in 0..ball::UNSTICK_RETRIES {
        let angle = rng.gen_range(0.0..TAU);
        let speed = rng.gen_range(ball::UNSTICK_MIN_SPEED..=ball::UNSTICK_MAX_SPEED);
        let v = Vec2::from_angle(angle, speed);
        if !aims_at_goal_mouth(position, v) {
            return v;
        }
    }
    let to_center = Vec2::new(pitch::CENTER_X, pitch::CENTER_Y) - position;
    if to_center.length() < 1.0 {
        Vec2::new(0.0, ball::UNSTICK_MIN_SPEED)
    } else {
        to_center.with_length(ball::UNSTICK_MIN_SPEED)
    }
}

fn action_for(players: &[Player], actions: &[PlayerAction], idx: usize) -> (PlayerAction, Option<Vec2>) {
    let action = actions.get(idx).copied().unwrap_or_default();
    let target = match action {
        PlayerAction::Pass { target } => players.iter().find(|p| p.id == target).map(|p| p.position),
        _ => None,
    };
    (action, target)
}

/// Step 1: hold a pending free kick or release it
fn step_free_kick<R: Rng + ?Sized>(
    current: &Ball,
    players: &[Player],
    actions: &[PlayerAction],
    state: &mut MatchSimulationState,
    rng: &mut R,
) -> Option<StepOutcome> {
    let fk = state.offside.free_kick?;
    let now = state.now_ms;
    let mut held = *current;
    held.position = fk.position;
    held.previous_position = Some(fk.position);
    held.velocity = Vec2::ZERO;

    if state.offside.auto_execute_due(now) {
        held.velocity = auto_kick_velocity(fk.team, rng);
        state.offside.release(now);
        state.last_touch_team = Some(fk.team);
        state.last_touch_player = None;
        log::debug!("free kick for {} auto-executed at t={}ms", fk.team, now);
        return Some(StepOutcome {
            ball: held,
            events: vec![BallEvent::FreeKickTaken {
                team: fk.team,
                auto: true,
            }],
            frozen: false,
        });
    }

    // Offending team touches are ignored while the kick is pending
    let taker = players
        .iter()
        .enumerate()
        .filter(|(_, p)| p.team == fk.team && state.offside.touch_allowed(p.team))
        .find_map(|(idx, p)| {
            let (action, target) = action_for(players, actions, idx);
            collide(held.position, held.velocity, p, action, target, rng).map(|hit| (p, hit))
        });

    if let Some((player, (velocity, touch))) = taker {
        held.velocity = velocity;
        if player.role.is_goalkeeper() {
            state.last_goalkeeper_collision = Some(now);
        } else {
            state.last_field_collision = Some(now);
        }
        state.offside.release(now);
        state.last_touch_team = Some(player.team);
        state.last_touch_player = Some(player.id);
        return Some(StepOutcome {
            ball: held,
            events: vec![
                BallEvent::Touch(TouchEvent {
                    kind: TouchKind::FreeKick,
                    ..touch
                }),
                BallEvent::FreeKickTaken {
                    team: fk.team,
                    auto: false,
                },
            ],
            frozen: false,
        });
    }

    Some(StepOutcome {
        ball: held,
        events: Vec::new(),
        frozen: true,
    })
}

/// Advance the ball by one tick.
///
/// `actions[i]` is the intent of `players[i]`; missing entries mean `Move`.
/// `state.now_ms` must already hold this tick's match time.
pub fn step_ball<R: Rng + ?Sized>(
    current: &Ball,
    players: &[Player],
    actions: &[PlayerAction],
    state: &mut MatchSimulationState,
    rng: &mut R,
) -> StepOutcome {
    let now = state.now_ms;
    state.offside.expire_flag(now);

    // 1. free kick
    if let Some(outcome) = step_free_kick(current, players, actions, state, rng) {
        return outcome;
    }

    let mut events = Vec::new();
    let mut ball_state = *current;

    // 2. hold in goal, else unstick
    if state.goal.blocked(now) == Some(GoalBlock::Cooldown)
        && goal_area_team(ball_state.position).is_some()
    {
        ball_state.freeze();
        ball_state.position = clamp_to_pitch(ball_state.position);
        ball_state.previous_position = Some(ball_state.position);
        state.stationary_ticks = 0;
        return StepOutcome {
            ball: ball_state,
            events,
            frozen: true,
        };
    }
    if ball_state.velocity.is_zero() || state.stationary_ticks >= ball::STALL_TICKS {
        ball_state.velocity = unstick_velocity(ball_state.position, rng);
        state.stationary_ticks = 0;
        log::trace!("unstick kick at ({:.0}, {:.0})", ball_state.position.x, ball_state.position.y);
        events.push(BallEvent::Unstuck);
    }

    // 3. integrate
    let start = ball_state.position;
    ball_state.previous_position = Some(start);
    let new_position = start + ball_state.velocity;

    // 4. goal
    let check = check_goal(&ball_state, new_position, &mut state.goal, now);
    if let (Some(team), Some(kind)) = (check.scored, check.kind) {
        let mut restart = kickoff_ball(team, rng);
        restart.previous_position = None;
        state.reset_for_kickoff();
        events.push(BallEvent::Goal { team, kind });
        return StepOutcome {
            ball: restart,
            events,
            frozen: false,
        };
    }
    ball_state = check.ball;

    if ball_state.velocity.is_zero() && state.goal.blocked(now) == Some(GoalBlock::Cooldown) {
        ball_state.position = clamp_to_pitch(ball_state.position);
        return StepOutcome {
            ball: ball_state,
            events,
            frozen: true,
        };
    }

    // 5. boundary
    let bounce = resolve_boundary(
        ball_state.position,
        ball_state.velocity,
        &mut ball_state.bounce_detection,
        now,
        rng,
    );
    ball_state.position = bounce.position;
    ball_state.velocity = bounce.velocity;
    if let Some(side) = bounce.bounced {
        events.push(BallEvent::Bounce(side));
    }
    if bounce.post_hit {
        events.push(BallEvent::PostHit);
    }
    if bounce.escaped {
        events.push(BallEvent::CornerEscape);
    }

    // 6. collisions
    let mut touch: Option<(usize, TouchEvent)> = None;
    if !state.goalkeeper_on_cooldown() {
        for (idx, p) in players.iter().enumerate().filter(|(_, p)| p.role.is_goalkeeper()) {
            let (action, target) = action_for(players, actions, idx);
            if let Some((velocity, t)) =
                collide(ball_state.position, ball_state.velocity, p, action, target, rng)
            {
                ball_state.velocity = velocity;
                state.last_goalkeeper_collision = Some(now);
                state.goal.record_goalkeeper_touch(p.team, now);
                touch = Some((idx, t));
                break;
            }
        }
    }
    if touch.is_none() && !state.field_on_cooldown() {
        for (idx, p) in players.iter().enumerate().filter(|(_, p)| !p.role.is_goalkeeper()) {
            let (action, target) = action_for(players, actions, idx);
            if let Some((velocity, t)) =
                collide(ball_state.position, ball_state.velocity, p, action, target, rng)
            {
                ball_state.velocity = velocity;
                state.last_field_collision = Some(now);
                touch = Some((idx, t));
                break;
            }
        }
    }

    if let Some((idx, t)) = touch {
        let toucher = &players[idx];
        let call = state.offside.check_touch(
            toucher,
            players,
            ball_state.position,
            state.last_touch_team,
            now,
        );
        state.last_touch_team = Some(t.team);
        state.last_touch_player = Some(t.player_id);
        events.push(BallEvent::Touch(t));
        if let Some(call) = call {
            ball_state.position = call.position;
            ball_state.freeze();
            events.push(BallEvent::Offside(call));
            return StepOutcome {
                ball: ball_state,
                events,
                frozen: true,
            };
        }
    }

    // 7. decay + floor
    ball_state.velocity =
        (ball_state.velocity * ball::DECAY).clamp_length(ball::MIN_SPEED, ball::MAX_SPEED);

    if ball_state.position.distance(&start) < ball::STATIONARY_EPSILON {
        state.stationary_ticks += 1;
    } else {
        state.stationary_ticks = 0;
    }

    StepOutcome {
        ball: ball_state,
        events,
        frozen: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::formation::kickoff_lineup;
    use crate::engine::offside::FreeKickState;
    use crate::engine::physics_constants::{goal_detection, offside};
    use crate::engine::types::Role;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    fn state_at(now_ms: u64) -> MatchSimulationState {
        let mut state = MatchSimulationState::new(0);
        state.now_ms = now_ms;
        state
    }

    #[test]
    fn test_zero_velocity_gets_unstick_kick() {
        let mut state = state_at(5_000);
        let ball_state = Ball::new(Vec2::new(300.0, 200.0), Vec2::ZERO);
        let out = step_ball(&ball_state, &[], &[], &mut state, &mut test_rng());
        assert!(out.events.contains(&BallEvent::Unstuck));
        assert!(out.ball.speed() >= ball::MIN_SPEED);
    }

    #[test]
    fn test_unstick_never_aims_at_goal() {
        let mut rng = test_rng();
        for _ in 0..200 {
            let pos = Vec2::new(pitch::CENTER_X, pitch::CENTER_Y);
            let v = unstick_velocity(pos, &mut rng);
            assert!(!aims_at_goal_mouth(pos, v));
        }
    }

    #[test]
    fn test_aims_at_goal_mouth() {
        let center = Vec2::new(pitch::CENTER_X, pitch::CENTER_Y);
        assert!(aims_at_goal_mouth(center, Vec2::new(5.0, 0.0)));
        assert!(aims_at_goal_mouth(center, Vec2::new(-5.0, 0.1)));
        assert!(!aims_at_goal_mouth(center, Vec2::new(0.0, 5.0)));
        assert!(!aims_at_goal_mouth(center, Vec2::new(3.0, 4.0)));
    }

    #[test]
    fn test_goal_recenters_with_kickoff_away_from_scorer_half() {
        let mut state = state_at(goal_detection::GRACE_MS + 100);
        let ball_state = Ball::new(Vec2::new(786.0, 300.0), Vec2::new(8.0, 0.0));
        let out = step_ball(&ball_state, &[], &[], &mut state, &mut test_rng());
        assert_eq!(out.goal(), Some(Team::Red));
        assert_eq!(out.ball.position, Vec2::new(pitch::CENTER_X, pitch::CENTER_Y));
        // Red's own half is on the left
        assert!(out.ball.velocity.x > 0.0);

        let mut state = state_at(goal_detection::GRACE_MS + 100);
        let ball_state = Ball::new(Vec2::new(14.0, 300.0), Vec2::new(-8.0, 0.0));
        let out = step_ball(&ball_state, &[], &[], &mut state, &mut test_rng());
        assert_eq!(out.goal(), Some(Team::Blue));
        assert!(out.ball.velocity.x < 0.0);
    }

    #[test]
    fn test_ball_held_in_goal_through_cooldown() {
        let mut rng = test_rng();
        let mut state = state_at(10_000);
        state.goal.last_goal_time = Some(9_500);
        let mut b = Ball::new(Vec2::new(12.0, 300.0), Vec2::new(-3.0, 0.0));

        let first = step_ball(&b, &[], &[], &mut state, &mut rng);
        assert!(first.frozen);
        assert!(first.ball.velocity.is_zero());
        let rest = first.ball.position;
        assert!(goal_area_team(rest).is_some());
        b = first.ball;

        for _ in 0..10 {
            state.now_ms += 16;
            let out = step_ball(&b, &[], &[], &mut state, &mut rng);
            assert!(out.frozen);
            assert!(!out.events.contains(&BallEvent::Unstuck));
            assert!(out.ball.velocity.is_zero());
            assert_eq!(out.ball.position, rest);
            assert_eq!(out.goal(), None);
            b = out.ball;
        }
    }

    #[test]
    fn test_goalkeeper_has_priority() {
        let mut state = state_at(5_000);
        let players = vec![
            Player::new(2, Team::Blue, Role::Defender, Vec2::new(752.0, 300.0), 0.9),
            Player::new(1, Team::Blue, Role::Goalkeeper, Vec2::new(760.0, 300.0), 0.9),
        ];
        let ball_state = Ball::new(Vec2::new(745.0, 310.0), Vec2::new(4.0, 2.0));
        let out = step_ball(&ball_state, &players, &[], &mut state, &mut test_rng());
        let touches: Vec<_> = out
            .events
            .iter()
            .filter_map(|e| match e {
                BallEvent::Touch(t) => Some(*t),
                _ => None,
            })
            .collect();
        assert_eq!(touches.len(), 1);
        assert_eq!(touches[0].player_id, 1);
        assert_eq!(state.last_goalkeeper_collision, Some(5_000));
        assert!(state.goal.last_goalkeeper_touch.is_some());
    }

    #[test]
    fn test_collision_cooldown_suppresses_retrigger() {
        let mut state = state_at(5_000);
        state.last_field_collision = Some(4_950);
        let players = vec![Player::new(3, Team::Red, Role::Midfielder, Vec2::new(400.0, 300.0), 0.9)];
        let ball_state = Ball::new(Vec2::new(395.0, 300.0), Vec2::new(2.0, 0.0));
        let out = step_ball(&ball_state, &players, &[], &mut state, &mut test_rng());
        assert!(!out.events.iter().any(|e| matches!(e, BallEvent::Touch(_))));
    }

    #[test]
    fn test_pending_free_kick_holds_ball() {
        let mut state = state_at(10_000);
        let spot = Vec2::new(600.0, 200.0);
        state.offside.offside_flag = Some(Team::Red);
        state.offside.free_kick = Some(FreeKickState {
            in_progress: true,
            team: Team::Blue,
            position: spot,
            auto_execute_deadline: 12_000,
        });
        // Offending red player right on the ball: ignored
        let players = vec![Player::new(9, Team::Red, Role::Forward, spot, 1.0)];
        let ball_state = Ball::new(spot, Vec2::ZERO);
        let out = step_ball(&ball_state, &players, &[], &mut state, &mut test_rng());
        assert!(out.frozen);
        assert!(out.ball.velocity.is_zero());
        assert_eq!(out.ball.position, spot);
        assert!(state.offside.free_kick_pending());
    }

    #[test]
    fn test_free_kick_auto_executes() {
        let mut state = state_at(0);
        let spot = Vec2::new(600.0, 200.0);
        state.offside.free_kick = Some(FreeKickState {
            in_progress: true,
            team: Team::Blue,
            position: spot,
            auto_execute_deadline: offside::AUTO_EXECUTE_MS,
        });
        state.now_ms = offside::AUTO_EXECUTE_MS;
        let out = step_ball(&Ball::new(spot, Vec2::ZERO), &[], &[], &mut state, &mut test_rng());
        assert!(out.events.contains(&BallEvent::FreeKickTaken {
            team: Team::Blue,
            auto: true
        }));
        assert_eq!(out.ball.velocity.x, -offside::AUTO_KICK_POWER);
        assert!(!state.offside.free_kick_pending());
    }

    #[test]
    fn test_awarded_team_releases_free_kick() {
        let mut state = state_at(1_000);
        let spot = Vec2::new(600.0, 200.0);
        state.offside.free_kick = Some(FreeKickState {
            in_progress: true,
            team: Team::Blue,
            position: spot,
            auto_execute_deadline: 4_000,
        });
        let players = vec![Player::new(14, Team::Blue, Role::Midfielder, spot + Vec2::new(8.0, 0.0), 1.0)];
        let out = step_ball(&Ball::new(spot, Vec2::ZERO), &players, &[], &mut state, &mut test_rng());
        assert!(!out.frozen);
        assert!(!state.offside.free_kick_pending());
        assert_eq!(state.last_touch_team, Some(Team::Blue));
        assert!(out.ball.speed() > 0.0);
        assert_eq!(state.last_field_collision, Some(1_000));

        // Taker still next to the ball: no second touch inside the cooldown
        state.now_ms += 16;
        let next = step_ball(&out.ball, &players, &[], &mut state, &mut test_rng());
        assert!(!next.events.iter().any(|e| matches!(e, BallEvent::Touch(_))));
    }

    #[test]
    fn test_goal_cancels_pending_free_kick_timer() {
        let mut state = state_at(goal_detection::GRACE_MS + 100);
        state.offside.offside_flag = Some(Team::Blue);
        state.offside.flag_clear_at = Some(state.now_ms + 400);
        let ball_state = Ball::new(Vec2::new(14.0, 300.0), Vec2::new(-8.0, 0.0));
        let out = step_ball(&ball_state, &[], &[], &mut state, &mut test_rng());
        assert_eq!(out.goal(), Some(Team::Blue));
        assert!(state.offside.free_kick.is_none());
        assert!(state.offside.flag_clear_at.is_none());
        assert!(state.offside.offside_flag.is_none());
    }

    fn action_from(code: (u8, u32)) -> PlayerAction {
        match code.0 {
            0 => PlayerAction::Move,
            1 => PlayerAction::Shoot,
            2 => PlayerAction::Pass { target: code.1 },
            _ => PlayerAction::Intercept,
        }
    }

    proptest! {
        #[test]
        fn prop_invariants_with_full_lineup(
            x in 10.0f32..790.0,
            y in 10.0f32..590.0,
            vx in -15.0f32..15.0,
            vy in -15.0f32..15.0,
            red in 0.8f32..1.0,
            blue in 0.8f32..1.0,
            codes in prop::collection::vec((0u8..4, 1u32..=22), 22),
            seed in 0u64..1000,
        ) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let players = kickoff_lineup(red, blue);
            let actions: Vec<PlayerAction> = codes.into_iter().map(action_from).collect();
            let mut state = state_at(20_000);
            let mut b = Ball::new(Vec2::new(x, y), Vec2::new(vx, vy));
            for _ in 0..60 {
                let out = step_ball(&b, &players, &actions, &mut state, &mut rng);
                b = out.ball;
                state.now_ms += 16;
                prop_assert!(b.position.x >= ball::RADIUS && b.position.x <= pitch::WIDTH - ball::RADIUS);
                prop_assert!(b.position.y >= ball::RADIUS && b.position.y <= pitch::HEIGHT - ball::RADIUS);
                if out.frozen {
                    prop_assert!(b.velocity.is_zero());
                } else {
                    let s = b.speed();
                    prop_assert!(s >= ball::MIN_SPEED - 1e-3 && s <= ball::MAX_SPEED + 1e-3);
                }
            }
        }

        #[test]
        fn prop_speed_and_position_invariants(
            x in 10.0f32..790.0,
            y in 10.0f32..590.0,
            vx in -15.0f32..15.0,
            vy in -15.0f32..15.0,
            seed in 0u64..1000,
        ) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut state = state_at(20_000);
            let mut b = Ball::new(Vec2::new(x, y), Vec2::new(vx, vy));
            for _ in 0..30 {
                let out = step_ball(&b, &[], &[], &mut state, &mut rng);
                b = out.ball;
                state.now_ms += 16;
                prop_assert!(b.position.x >= ball::RADIUS && b.position.x <= pitch::WIDTH - ball::RADIUS);
                prop_assert!(b.position.y >= ball::RADIUS && b.position.y <= pitch::HEIGHT - ball::RADIUS);
                if !out.frozen {
                    let s = b.speed();
                    prop_assert!(s >= ball::MIN_SPEED - 1e-3 && s <= ball::MAX_SPEED + 1e-3);
                }
            }
        }
    }
}
