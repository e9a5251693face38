//! Bracket advancement and scheduler flow through the public API

use std::collections::HashSet;

use pitch_core::{
    AutoSimulator, NotificationEvent, Pacing, PlayMode, SchedulerTick, SeedingStrategy, TeamPool,
    Tournament,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn new_tournament(seed: u64, seeding: SeedingStrategy) -> (Tournament, ChaCha8Rng) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let t = Tournament::initialize(&TeamPool::default_pool(), seeding, &mut rng).unwrap();
    (t, rng)
}

#[test]
fn test_round_one_fills_round_two() {
    for seeding in [SeedingStrategy::Shuffled, SeedingStrategy::Strength] {
        let (mut t, mut rng) = new_tournament(3, seeding);
        let round1: Vec<u32> = t.round_matches(1).iter().map(|m| m.id).collect();
        let mut events = Vec::new();
        for id in round1 {
            events.extend(t.play_fast(id, &mut rng).unwrap());
        }

        assert_eq!(t.current_round(), 2);
        assert!(events.contains(&NotificationEvent::RoundAdvanced {
            completed_round: 1,
            next_round: 2
        }));

        let round2 = t.round_matches(2);
        assert_eq!(round2.len(), 32);
        let mut seen = HashSet::new();
        for m in round2 {
            let (a, b) = m.teams().expect("both slots filled");
            assert!(seen.insert(a));
            assert!(seen.insert(b));
        }
        assert_eq!(seen.len(), 64);

        let winners: HashSet<u32> = t.round_matches(1).iter().filter_map(|m| m.winner).collect();
        assert_eq!(winners, seen);
        assert!(t.round_matches(3).iter().all(|m| m.teams().is_none()));
    }
}

#[test]
fn test_scheduler_reset_stops_a_running_bracket() {
    let (mut t, mut rng) = new_tournament(10, SeedingStrategy::Shuffled);
    let mut sim = AutoSimulator::new(PlayMode::Fast, Pacing::default());
    sim.start(0);

    let mut now = 0;
    let mut played = 0;
    while played < 10 {
        if let SchedulerTick::Played { .. } = sim.tick(&mut t, now, &mut rng).unwrap() {
            played += 1;
        }
        now += 16;
    }
    sim.reset();
    assert!(sim.pending_timer().is_none());

    for step in 0..500 {
        let tick = sim.tick(&mut t, now + step * 16, &mut rng).unwrap();
        assert_eq!(tick, SchedulerTick::Idle);
    }
    assert_eq!(t.matches().iter().filter(|m| m.played).count(), 10);

    // Restarting resumes from the next unplayed match
    sim.start(now);
    assert!(matches!(
        sim.tick(&mut t, now, &mut rng).unwrap(),
        SchedulerTick::Played { match_id: 11, .. }
    ));
}

#[test]
fn test_stronger_seed_usually_wins_the_opener() {
    let mut top_wins = 0;
    for seed in 0..200 {
        let (mut t, mut rng) = new_tournament(seed, SeedingStrategy::Strength);
        t.play_fast(1, &mut rng).unwrap();
        let m = t.get_match(1).unwrap();
        if m.winner == m.team_a {
            top_wins += 1;
        }
    }
    // Seed 1 (2010) against seed 65 (~1785): p ≈ 0.78
    assert!(top_wins > 130, "top seed won only {top_wins}/200");
}
