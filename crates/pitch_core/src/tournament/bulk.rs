//! Many independent fast tournaments in parallel

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::bracket::{SeedingStrategy, Tournament};
use super::teams::TeamPool;
use crate::error::Result;

/// How often a team won the title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChampionCount {
    pub team_id: u32,
    pub name: String,
    pub elo_rating: f64,
    pub titles: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkSummary {
    pub runs: u32,
    /// Most titles first
    pub champions: Vec<ChampionCount>,
}

impl BulkSummary {
    pub fn title_share(&self, team_id: u32) -> f64 {
        if self.runs == 0 {
            return 0.0;
        }
        self.champions
            .iter()
            .find(|c| c.team_id == team_id)
            .map_or(0.0, |c| c.titles as f64 / self.runs as f64)
    }
}

/// Run one fast tournament seeded with `seed` and return its champion id
pub fn run_fast_tournament(pool: &TeamPool, seeding: SeedingStrategy, seed: u64) -> Result<u32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut tournament = Tournament::initialize(pool, seeding, &mut rng)?;
    tournament.play_all_fast(&mut rng)?;
    let champion = tournament.champion().map(|t| t.id);
    // play_all_fast only returns once the final is recorded
    Ok(champion.unwrap_or_default())
}

/// Fast-simulate `count` tournaments in parallel. Run `i` uses seed `base_seed + i`.
pub fn simulate_tournaments(
    pool: &TeamPool,
    count: u32,
    base_seed: u64,
    seeding: SeedingStrategy,
) -> Result<BulkSummary> {
    let champions: Vec<u32> = (0..count)
        .into_par_iter()
        .map(|i| run_fast_tournament(pool, seeding, base_seed.wrapping_add(i as u64)))
        .collect::<Result<_>>()?;

    let mut titles: BTreeMap<u32, u32> = BTreeMap::new();
    for id in champions {
        *titles.entry(id).or_default() += 1;
    }

    let mut champions: Vec<ChampionCount> = titles
        .into_iter()
        .filter_map(|(team_id, titles)| {
            pool.teams.iter().find(|t| t.id == team_id).map(|t| ChampionCount {
                team_id,
                name: t.name.clone(),
                elo_rating: t.elo_rating,
                titles,
            })
        })
        .collect();
    champions.sort_by(|a, b| b.titles.cmp(&a.titles).then(a.team_id.cmp(&b.team_id)));

    tracing::info!(runs = count, distinct_champions = champions.len(), "bulk simulation done");
    Ok(BulkSummary {
        runs: count,
        champions,
    })
}
