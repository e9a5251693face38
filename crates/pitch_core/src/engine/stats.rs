//! Match statistics: touches, possession sampling, periodic snapshots

use serde::{Deserialize, Serialize};

use super::physics_constants::timing;
use super::types::{Score, Team};

/// Periodic summary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub time_ms: u64,
    pub score: Score,
    /// Red's share of sampled possession, 0..=100
    pub red_possession_pct: f32,
    pub red_touches: u32,
    pub blue_touches: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MatchStats {
    pub red_touches: u32,
    pub blue_touches: u32,
    /// Possession credited by last touch, in ms
    pub red_possession_ms: u64,
    pub blue_possession_ms: u64,
    pub offsides: u32,
    pub snapshots: Vec<StatsSnapshot>,
    next_possession_sample: u64,
    next_snapshot: u64,
}

impl MatchStats {
    pub fn new() -> Self {
        Self {
            next_possession_sample: timing::POSSESSION_SAMPLE_MS,
            next_snapshot: timing::SNAPSHOT_MS,
            ..Self::default()
        }
    }

    pub fn record_touch(&mut self, team: Team) {
        match team {
            Team::Red => self.red_touches += 1,
            Team::Blue => self.blue_touches += 1,
        }
    }

    pub fn record_offside(&mut self) {
        self.offsides += 1;
    }

    pub fn touches(&self, team: Team) -> u32 {
        match team {
            Team::Red => self.red_touches,
            Team::Blue => self.blue_touches,
        }
    }

    /// Share of sampled possession for `team`, 0..=100. 50 before any sample.
    pub fn possession_pct(&self, team: Team) -> f32 {
        let total = self.red_possession_ms + self.blue_possession_ms;
        if total == 0 {
            return 50.0;
        }
        let own = match team {
            Team::Red => self.red_possession_ms,
            Team::Blue => self.blue_possession_ms,
        };
        own as f32 * 100.0 / total as f32
    }

    /// Run every sample and snapshot due up to `now_ms`
    pub fn sample(&mut self, now_ms: u64, last_touch_team: Option<Team>, score: Score) {
        while now_ms >= self.next_possession_sample {
            match last_touch_team {
                Some(Team::Red) => self.red_possession_ms += timing::POSSESSION_SAMPLE_MS,
                Some(Team::Blue) => self.blue_possession_ms += timing::POSSESSION_SAMPLE_MS,
                None => {}
            }
            self.next_possession_sample += timing::POSSESSION_SAMPLE_MS;
        }
        while now_ms >= self.next_snapshot {
            self.snapshots.push(StatsSnapshot {
                time_ms: self.next_snapshot,
                score,
                red_possession_pct: self.possession_pct(Team::Red),
                red_touches: self.red_touches,
                blue_touches: self.blue_touches,
            });
            self.next_snapshot += timing::SNAPSHOT_MS;
        }
    }
}
