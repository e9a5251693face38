//! Auto-simulation scheduler
//!
//! Plays the bracket one match at a time on a simulated clock. The caller
//! drives it with `tick(now_ms)`; a single pending timer (`next_fire_at`)
//! decides when the next match starts. A single-flight lock keeps two
//! triggers (timer and manual override) from starting overlapping matches;
//! it is released a short settle delay after each match.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::bracket::Tournament;
use crate::engine::events::NotificationEvent;
use crate::engine::live_match::MatchConfig;
use crate::engine::physics_constants::bracket;
use crate::error::TournamentError;

/// At most one match in flight. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct SingleFlight {
    busy: Arc<AtomicBool>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lock. False if someone already holds it.
    pub fn try_acquire(&self) -> bool {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn release(&self) {
        self.busy.store(false, Ordering::Release);
    }

    pub fn is_held(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Delays between scheduled matches (ms)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pacing {
    pub between_matches_ms: u64,
    pub between_rounds_ms: u64,
    pub lock_settle_ms: u64,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            between_matches_ms: bracket::BETWEEN_MATCHES_MS,
            between_rounds_ms: bracket::BETWEEN_ROUNDS_MS,
            lock_settle_ms: bracket::LOCK_SETTLE_MS,
        }
    }
}

/// How the scheduler resolves each match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayMode {
    /// ELO outcome model
    #[default]
    Fast,
    /// Full physics simulation
    Interactive(MatchConfig),
}

/// What one scheduler tick did
#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerTick {
    /// Auto-simulation is off
    Idle,
    /// Timer not due yet
    Waiting,
    /// Lock held elsewhere; retried next tick
    Busy,
    /// A match was played
    Played {
        match_id: u32,
        events: Vec<NotificationEvent>,
    },
    /// Bracket finished; the scheduler disabled itself
    Completed,
}

#[derive(Debug, Clone, Default)]
pub struct AutoSimulator {
    enabled: bool,
    mode: PlayMode,
    pacing: Pacing,
    lock: SingleFlight,
    /// Pending timer
    next_fire_at: Option<u64>,
    lock_release_at: Option<u64>,
}

impl AutoSimulator {
    pub fn new(mode: PlayMode, pacing: Pacing) -> Self {
        Self {
            mode,
            pacing,
            ..Self::default()
        }
    }

    /// Handle to the shared single-flight lock
    pub fn lock(&self) -> SingleFlight {
        self.lock.clone()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn pending_timer(&self) -> Option<u64> {
        self.next_fire_at
    }

    /// Enable and fire on the next tick at or after `now_ms`
    pub fn start(&mut self, now_ms: u64) {
        self.enabled = true;
        self.next_fire_at = Some(now_ms);
        tracing::info!(now_ms, "auto-simulation started");
    }

    /// Disable; the pending timer is cancelled
    pub fn stop(&mut self) {
        self.enabled = false;
        self.next_fire_at = None;
        tracing::info!("auto-simulation stopped");
    }

    /// Stop and drop every timer, including the lock settle
    pub fn reset(&mut self) {
        self.stop();
        if self.lock_release_at.take().is_some() {
            self.lock.release();
        }
    }

    fn settle_lock(&mut self, now_ms: u64) {
        if let Some(at) = self.lock_release_at {
            if now_ms >= at {
                self.lock.release();
                self.lock_release_at = None;
            }
        }
    }

    fn play<R: Rng + ?Sized>(
        &self,
        tournament: &mut Tournament,
        match_id: u32,
        rng: &mut R,
    ) -> Result<Vec<NotificationEvent>, TournamentError> {
        match self.mode {
            PlayMode::Fast => tournament.play_fast(match_id, rng),
            PlayMode::Interactive(config) => tournament
                .play_interactive(match_id, config, rng)
                .map(|(_, events)| events),
        }
    }

    /// Failed play: free the lock and keep the timer armed.
    ///
    /// Skippable errors leave the bracket untouched and are only logged.
    fn recover_from(
        &mut self,
        err: TournamentError,
        match_id: u32,
        now_ms: u64,
    ) -> Result<SchedulerTick, TournamentError> {
        self.lock.release();
        self.lock_release_at = None;
        self.next_fire_at = Some(now_ms + self.pacing.between_matches_ms);
        if err.is_skippable() {
            tracing::warn!(match_id, %err, "scheduled match skipped");
            Ok(SchedulerTick::Waiting)
        } else {
            tracing::error!(match_id, %err, "scheduled match failed");
            Err(err)
        }
    }

    /// Advance the scheduler to `now_ms`
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        tournament: &mut Tournament,
        now_ms: u64,
        rng: &mut R,
    ) -> Result<SchedulerTick, TournamentError> {
        self.settle_lock(now_ms);

        if !self.enabled {
            return Ok(SchedulerTick::Idle);
        }
        if tournament.is_complete() {
            self.stop();
            return Ok(SchedulerTick::Completed);
        }
        match self.next_fire_at {
            Some(at) if now_ms >= at => {}
            _ => return Ok(SchedulerTick::Waiting),
        }
        if !self.lock.try_acquire() {
            tracing::debug!(now_ms, "match already in flight, skipping tick");
            return Ok(SchedulerTick::Busy);
        }
        self.next_fire_at = None;

        let Some(match_id) = tournament.next_unplayed_match() else {
            self.lock.release();
            self.next_fire_at = Some(now_ms + self.pacing.between_matches_ms);
            return Ok(SchedulerTick::Waiting);
        };

        let round_before = tournament.current_round();
        let result = self.play(tournament, match_id, rng);
        self.lock_release_at = Some(now_ms + self.pacing.lock_settle_ms);
        let events = match result {
            Ok(events) => events,
            Err(err) => return self.recover_from(err, match_id, now_ms),
        };

        if tournament.is_complete() {
            self.stop();
        } else {
            let delay = if tournament.current_round() != round_before {
                self.pacing.between_rounds_ms
            } else {
                self.pacing.between_matches_ms
            };
            self.next_fire_at = Some(now_ms + delay);
        }
        Ok(SchedulerTick::Played { match_id, events })
    }

    /// Manual override: fast-simulate one pending match of the current round.
    ///
    /// `None` if the lock is held or nothing is pending.
    pub fn randomize_current_round<R: Rng + ?Sized>(
        &mut self,
        tournament: &mut Tournament,
        now_ms: u64,
        rng: &mut R,
    ) -> Option<(u32, Vec<NotificationEvent>)> {
        self.settle_lock(now_ms);
        if !self.lock.try_acquire() {
            tracing::debug!("randomize skipped: match in flight");
            return None;
        }
        let played = tournament
            .next_unplayed_match()
            .and_then(|id| match tournament.play_fast(id, rng) {
                Ok(events) => Some((id, events)),
                Err(err) => {
                    tracing::warn!(match_id = id, %err, "randomize failed");
                    None
                }
            });
        if played.is_some() {
            self.lock_release_at = Some(now_ms + self.pacing.lock_settle_ms);
        } else {
            self.lock.release();
        }
        played
    }
}
