//! Single-elimination bracket (128 teams, 7 rounds, 127 matches)
//!
//! Match ids run 1..=127, round by round. The winner of round `r`,
//! position `p` moves to round `r + 1`, position `ceil(p / 2)`, taking
//! `team_a` if it is still empty and `team_b` otherwise.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::elo::{simulate_fast, strength_multiplier};
use super::teams::{TeamPool, TournamentTeam};
use crate::engine::events::NotificationEvent;
use crate::engine::live_match::{LiveMatch, MatchConfig, MatchOutcome};
use crate::engine::physics_constants::bracket;
use crate::engine::types::Team;
use crate::error::{Result, TournamentError};

/// Round-1 pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedingStrategy {
    /// Shuffled top half against shuffled bottom half
    #[default]
    Shuffled,
    /// Seed k against seed k + 64, in order
    Strength,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchScore {
    pub team_a: u32,
    pub team_b: u32,
}

/// One slot in the bracket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketMatch {
    pub id: u32,
    /// 1..=7
    pub round: u8,
    /// 1-based position within the round
    pub position: u32,
    pub team_a: Option<u32>,
    pub team_b: Option<u32>,
    pub winner: Option<u32>,
    pub played: bool,
    /// Currently being played interactively
    pub active: bool,
    pub golden_goal: Option<bool>,
    pub score: Option<MatchScore>,
}

impl BracketMatch {
    fn empty(id: u32, round: u8, position: u32) -> Self {
        Self {
            id,
            round,
            position,
            team_a: None,
            team_b: None,
            winner: None,
            played: false,
            active: false,
            golden_goal: None,
            score: None,
        }
    }

    pub fn teams(&self) -> Option<(u32, u32)> {
        Some((self.team_a?, self.team_b?))
    }

    pub fn is_ready(&self) -> bool {
        self.teams().is_some() && !self.played
    }
}

/// Result to record against a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub winner: u32,
    pub score: MatchScore,
    pub golden_goal: bool,
}

/// Number of matches in `round`
pub fn matches_in_round(round: u8) -> usize {
    bracket::TEAMS >> round
}

/// Index of the first match of `round` in the match list
fn round_offset(round: u8) -> usize {
    bracket::TEAMS - (bracket::TEAMS >> (round - 1))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    /// Seeded order, strongest first
    teams: Vec<TournamentTeam>,
    matches: Vec<BracketMatch>,
    current_round: u8,
    champion: Option<u32>,
    seeding: SeedingStrategy,
    min_elo: f64,
    max_elo: f64,
}

impl Tournament {
    /// Build the bracket from the best 128 teams of `pool`.
    pub fn initialize<R: Rng + ?Sized>(
        pool: &TeamPool,
        seeding: SeedingStrategy,
        rng: &mut R,
    ) -> Result<Self> {
        pool.validate()?;
        if pool.len() < bracket::TEAMS {
            return Err(TournamentError::InvalidTeamCount {
                expected: bracket::TEAMS,
                found: pool.len(),
            });
        }

        let mut teams = pool.teams.clone();
        teams.sort_by(|a, b| b.elo_rating.total_cmp(&a.elo_rating).then(a.id.cmp(&b.id)));
        if teams.len() > bracket::TEAMS {
            tracing::info!(
                dropped = teams.len() - bracket::TEAMS,
                "more teams than bracket slots, keeping the top {} by rating",
                bracket::TEAMS
            );
            teams.truncate(bracket::TEAMS);
        }
        for (i, team) in teams.iter_mut().enumerate() {
            team.seed = i as u32 + 1;
        }
        let min_elo = teams.last().map_or(0.0, |t| t.elo_rating);
        let max_elo = teams.first().map_or(0.0, |t| t.elo_rating);

        let half = bracket::TEAMS / 2;
        let mut top: Vec<u32> = teams[..half].iter().map(|t| t.id).collect();
        let mut bottom: Vec<u32> = teams[half..].iter().map(|t| t.id).collect();
        if seeding == SeedingStrategy::Shuffled {
            top.shuffle(rng);
            bottom.shuffle(rng);
        }

        let mut matches = Vec::with_capacity(bracket::TEAMS - 1);
        let mut id = 1;
        for round in 1..=bracket::ROUNDS {
            for position in 1..=matches_in_round(round) as u32 {
                matches.push(BracketMatch::empty(id, round, position));
                id += 1;
            }
        }
        for (m, (a, b)) in matches.iter_mut().zip(top.into_iter().zip(bottom)) {
            m.team_a = Some(a);
            m.team_b = Some(b);
        }

        tracing::info!(
            teams = teams.len(),
            matches = matches.len(),
            ?seeding,
            min_elo,
            max_elo,
            "bracket initialized"
        );

        Ok(Self {
            teams,
            matches,
            current_round: 1,
            champion: None,
            seeding,
            min_elo,
            max_elo,
        })
    }

    pub fn teams(&self) -> &[TournamentTeam] {
        &self.teams
    }

    pub fn matches(&self) -> &[BracketMatch] {
        &self.matches
    }

    pub fn current_round(&self) -> u8 {
        self.current_round
    }

    pub fn seeding(&self) -> SeedingStrategy {
        self.seeding
    }

    pub fn is_complete(&self) -> bool {
        self.champion.is_some()
    }

    pub fn champion(&self) -> Option<&TournamentTeam> {
        self.champion.and_then(|id| self.team(id))
    }

    pub fn team(&self, id: u32) -> Option<&TournamentTeam> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn get_match(&self, match_id: u32) -> Option<&BracketMatch> {
        match_id
            .checked_sub(1)
            .and_then(|idx| self.matches.get(idx as usize))
    }

    pub fn round_matches(&self, round: u8) -> &[BracketMatch] {
        if round == 0 || round > bracket::ROUNDS {
            return &[];
        }
        let start = round_offset(round);
        &self.matches[start..start + matches_in_round(round)]
    }

    /// Strength multiplier of a team over this bracket's rating range
    pub fn strength_of(&self, team_id: u32) -> Option<f32> {
        self.team(team_id)
            .map(|t| strength_multiplier(t.elo_rating, self.min_elo, self.max_elo))
    }

    /// First ready, inactive match of the current round
    pub fn next_unplayed_match(&self) -> Option<u32> {
        self.round_matches(self.current_round)
            .iter()
            .find(|m| m.is_ready() && !m.active)
            .map(|m| m.id)
    }

    fn match_mut(&mut self, match_id: u32) -> Result<&mut BracketMatch> {
        match_id
            .checked_sub(1)
            .and_then(|idx| self.matches.get_mut(idx as usize))
            .ok_or(TournamentError::MatchNotFound { match_id })
    }

    fn ready_teams(&self, match_id: u32) -> Result<(u32, u32)> {
        let m = self
            .get_match(match_id)
            .ok_or(TournamentError::MatchNotFound { match_id })?;
        if m.played {
            return Err(TournamentError::MatchAlreadyPlayed { match_id });
        }
        m.teams().ok_or(TournamentError::MatchNotReady { match_id })
    }

    /// Record a finished match and advance the bracket
    pub fn record_result(
        &mut self,
        match_id: u32,
        result: MatchResult,
    ) -> Result<Vec<NotificationEvent>> {
        let (a, b) = self.ready_teams(match_id)?;
        if result.winner != a && result.winner != b {
            return Err(TournamentError::InvalidWinner {
                match_id,
                team_id: result.winner,
            });
        }

        let m = self.match_mut(match_id)?;
        m.winner = Some(result.winner);
        m.score = Some(result.score);
        m.golden_goal = Some(result.golden_goal);
        m.played = true;
        m.active = false;
        let (round, position) = (m.round, m.position);

        tracing::debug!(
            match_id,
            round,
            winner = result.winner,
            score_a = result.score.team_a,
            score_b = result.score.team_b,
            golden_goal = result.golden_goal,
            "match recorded"
        );

        if round < bracket::ROUNDS {
            let next_position = position.div_ceil(2);
            let next_idx = round_offset(round + 1) + next_position as usize - 1;
            let next = &mut self.matches[next_idx];
            if next.team_a.is_none() {
                next.team_a = Some(result.winner);
            } else {
                next.team_b = Some(result.winner);
            }
        }

        Ok(self.advance_rounds())
    }

    fn advance_rounds(&mut self) -> Vec<NotificationEvent> {
        let mut events = Vec::new();
        while self.champion.is_none()
            && self
                .round_matches(self.current_round)
                .iter()
                .all(|m| m.played)
        {
            if self.current_round == bracket::ROUNDS {
                let final_match = &self.matches[self.matches.len() - 1];
                self.champion = final_match.winner;
                if let Some(champ) = self.champion() {
                    tracing::info!(champion = %champ.name, elo = champ.elo_rating, "tournament complete");
                    events.push(NotificationEvent::TournamentComplete {
                        champion_id: champ.id,
                        champion_name: champ.name.clone(),
                    });
                }
            } else {
                let completed = self.current_round;
                self.current_round += 1;
                tracing::info!(completed, next = self.current_round, "round advanced");
                events.push(NotificationEvent::RoundAdvanced {
                    completed_round: completed,
                    next_round: self.current_round,
                });
            }
        }
        events
    }

    /// Resolve a match with the ELO outcome model
    pub fn play_fast<R: Rng + ?Sized>(
        &mut self,
        match_id: u32,
        rng: &mut R,
    ) -> Result<Vec<NotificationEvent>> {
        let (a, b) = self.ready_teams(match_id)?;
        let elo_a = self.team(a).map_or(0.0, |t| t.elo_rating);
        let elo_b = self.team(b).map_or(0.0, |t| t.elo_rating);
        let fast = simulate_fast(elo_a, elo_b, rng);
        self.record_result(
            match_id,
            MatchResult {
                winner: if fast.a_wins { a } else { b },
                score: MatchScore {
                    team_a: fast.score_a,
                    team_b: fast.score_b,
                },
                golden_goal: fast.golden_goal,
            },
        )
    }

    /// Mark a match active and build its live match (`team_a` plays Red).
    ///
    /// `None` if the match is unknown, already played or missing a team.
    pub fn start_interactive<R: Rng + ?Sized>(
        &mut self,
        match_id: u32,
        config: MatchConfig,
        rng: &mut R,
    ) -> Option<LiveMatch> {
        let (a, b) = match self.ready_teams(match_id) {
            Ok(teams) => teams,
            Err(err) => {
                tracing::debug!(match_id, %err, "interactive match not started");
                return None;
            }
        };
        let red = self.strength_of(a)?;
        let blue = self.strength_of(b)?;
        if let Ok(m) = self.match_mut(match_id) {
            m.active = true;
        }
        Some(LiveMatch::new(config, red, blue, rng))
    }

    /// Record the outcome of an interactive match started with `start_interactive`
    pub fn finish_interactive(
        &mut self,
        match_id: u32,
        outcome: &MatchOutcome,
    ) -> Result<Vec<NotificationEvent>> {
        let (a, b) = self.ready_teams(match_id)?;
        let winner = match outcome.winner {
            Team::Red => a,
            Team::Blue => b,
        };
        self.record_result(
            match_id,
            MatchResult {
                winner,
                score: MatchScore {
                    team_a: outcome.score.red,
                    team_b: outcome.score.blue,
                },
                golden_goal: outcome.was_golden_goal,
            },
        )
    }

    /// Play a match with the full physics simulation and record it
    pub fn play_interactive<R: Rng + ?Sized>(
        &mut self,
        match_id: u32,
        config: MatchConfig,
        rng: &mut R,
    ) -> Result<(MatchOutcome, Vec<NotificationEvent>)> {
        let mut live = self
            .start_interactive(match_id, config, rng)
            .ok_or_else(|| match self.ready_teams(match_id) {
                Err(err) => err,
                Ok(_) => TournamentError::MatchNotReady { match_id },
            })?;
        let outcome = live.run_to_completion(rng);
        let mut events = outcome.events.clone();
        events.extend(self.finish_interactive(match_id, &outcome)?);
        Ok((outcome, events))
    }

    /// Fast-simulate every remaining match
    pub fn play_all_fast<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Vec<NotificationEvent>> {
        let mut events = Vec::new();
        while let Some(match_id) = self.next_unplayed_match() {
            events.extend(self.play_fast(match_id, rng)?);
        }
        Ok(events)
    }
}
