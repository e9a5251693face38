//! Ball motion step scenarios through the public API

use pitch_core::engine::ball_step::BallEvent;
use pitch_core::engine::offside::FreeKickState;
use pitch_core::engine::physics_constants::{ball, goal_detection, pitch};
use pitch_core::{step_ball, Ball, MatchSimulationState, Player, PlayerAction, Role, Team, Vec2};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[test]
fn test_goal_clears_stale_free_kick_and_flag_timers() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut state = MatchSimulationState::new(0);
    state.now_ms = goal_detection::GRACE_MS + 500;
    state.offside.offside_flag = Some(Team::Red);
    state.offside.flag_clear_at = Some(state.now_ms + 300);

    let shot = Ball::new(Vec2::new(786.0, 300.0), Vec2::new(9.0, 0.5));
    let out = step_ball(&shot, &[], &[], &mut state, &mut rng);

    assert_eq!(out.goal(), Some(Team::Red));
    assert!(state.offside.free_kick.is_none());
    assert!(state.offside.flag_clear_at.is_none());
    assert!(state.offside.offside_flag.is_none());
    assert_eq!(state.goal.last_goal_time, Some(goal_detection::GRACE_MS + 500));
}

#[test]
fn test_offside_touch_holds_ball_until_auto_kick() {
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let players = vec![
        Player::new(12, Team::Blue, Role::Goalkeeper, Vec2::new(770.0, 300.0), 0.9),
        Player::new(13, Team::Blue, Role::Defender, Vec2::new(560.0, 120.0), 0.9),
        Player::new(14, Team::Blue, Role::Defender, Vec2::new(570.0, 480.0), 0.9),
        // Red passer in the opponent half, teammate beyond the line next to him
        Player::new(8, Team::Red, Role::Midfielder, Vec2::new(600.0, 300.0), 0.9),
        Player::new(9, Team::Red, Role::Forward, Vec2::new(630.0, 310.0), 0.9),
    ];
    let actions = vec![PlayerAction::Move; players.len()];
    let mut state = MatchSimulationState::new(0);
    state.now_ms = 10_000;
    state.last_touch_team = Some(Team::Blue);

    let incoming = Ball::new(Vec2::new(590.0, 300.0), Vec2::new(3.0, 0.0));
    let out = step_ball(&incoming, &players, &actions, &mut state, &mut rng);
    let call = out
        .events
        .iter()
        .find_map(|e| match e {
            BallEvent::Offside(call) => Some(*call),
            _ => None,
        })
        .expect("offside call");
    assert_eq!(call.offending_team, Team::Red);
    assert!(out.frozen);
    let fk: FreeKickState = state.offside.free_kick.expect("free kick pending");
    assert_eq!(fk.team, Team::Blue);

    // Held while pending: red players on the ball are ignored
    let mut b = out.ball;
    for _ in 0..10 {
        state.now_ms += 16;
        let held = step_ball(&b, &players, &actions, &mut state, &mut rng);
        assert!(held.frozen);
        assert_eq!(held.ball.position, fk.position);
        b = held.ball;
    }

    state.now_ms = fk.auto_execute_deadline;
    let kicked = step_ball(&b, &players, &actions, &mut state, &mut rng);
    assert!(kicked.events.contains(&BallEvent::FreeKickTaken {
        team: Team::Blue,
        auto: true
    }));
    assert!(kicked.ball.velocity.x < 0.0);
    assert!(!state.offside.free_kick_pending());
}

#[test]
fn test_stalled_ball_gets_unstuck() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut state = MatchSimulationState::new(0);
    state.now_ms = 20_000;
    state.stationary_ticks = ball::STALL_TICKS;
    let b = Ball::new(Vec2::new(pitch::CENTER_X, 200.0), Vec2::new(2.0, 0.0));
    let out = step_ball(&b, &[], &[], &mut state, &mut rng);
    assert!(out.events.contains(&BallEvent::Unstuck));
    assert_eq!(state.stationary_ticks, 0);
}
