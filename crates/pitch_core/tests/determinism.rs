//! Same seed → byte-identical results

use pitch_core::engine::physics_constants::timing;
use pitch_core::{LiveMatch, MatchConfig, SeedingStrategy, TeamPool, Tournament};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

fn tournament_hash(seed: u64) -> String {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut t =
        Tournament::initialize(&TeamPool::default_pool(), SeedingStrategy::Shuffled, &mut rng)
            .unwrap();
    t.play_all_fast(&mut rng).unwrap();
    sha256_hex(&serde_json::to_vec(&t).unwrap())
}

fn match_hash(seed: u64) -> String {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let config = MatchConfig {
        tick_ms: timing::TICK_MS,
        match_duration_ms: 10_000,
        golden_goal_cap_ms: 5_000,
    };
    let mut live = LiveMatch::new(config, 0.93, 0.87, &mut rng);
    let outcome = live.run_to_completion(&mut rng);
    sha256_hex(&serde_json::to_vec(&outcome).unwrap())
}

#[test]
fn test_tournament_is_deterministic() {
    assert_eq!(tournament_hash(12345), tournament_hash(12345));
    assert_ne!(tournament_hash(12345), tournament_hash(54321));
}

#[test]
fn test_live_match_is_deterministic() {
    assert_eq!(match_hash(7), match_hash(7));
}
