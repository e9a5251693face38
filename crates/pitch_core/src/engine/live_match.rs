//! Live match
//!
//! Tick-by-tick simulation of one 11-a-side match: policies decide, players
//! move, the ball motion step runs, goals are applied to the score.
//!
//! Regulation ends after `match_duration_ms`. A tied score starts golden
//! goal: the first goal ends the match. If golden goal runs past its cap
//! the winner is decided by a coin toss and credited with one goal, so a
//! finished match never ends level.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ball_step::{kickoff_ball, step_ball, BallEvent};
use super::events::NotificationEvent;
use super::formation::kickoff_lineup;
use super::match_state::MatchSimulationState;
use super::physics_constants::{pitch, player, timing};
use super::policy::{HeuristicPolicy, PlayerPolicy, PolicyInput, PolicyOutput, TeamContext};
use super::stats::MatchStats;
use super::types::{Ball, Player, PlayerAction, Score, Team};
use super::vector::Vec2;

/// Timing knobs for one match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub tick_ms: u64,
    pub match_duration_ms: u64,
    pub golden_goal_cap_ms: u64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            tick_ms: timing::TICK_MS,
            match_duration_ms: timing::MATCH_DURATION_MS,
            golden_goal_cap_ms: timing::GOLDEN_GOAL_CAP_MS,
        }
    }
}

/// Current state of the match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    Regulation,
    GoldenGoal,
    Finished,
}

/// Rendering snapshot, one per tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickSnapshot {
    pub players: Vec<Player>,
    pub ball: Ball,
    pub score: Score,
    pub time_ms: u64,
}

/// Data returned for each tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickData {
    pub snapshot: TickSnapshot,
    pub events: Vec<NotificationEvent>,
}

/// Final match result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub winner: Team,
    pub score: Score,
    pub was_golden_goal: bool,
    /// Golden goal hit its cap and a coin decided
    pub decided_by_coin_toss: bool,
    pub duration_ms: u64,
    pub stats: MatchStats,
    /// All notifications from the match
    pub events: Vec<NotificationEvent>,
}

/// Result of a single `step`
#[derive(Debug, Clone, PartialEq)]
pub enum StepResult {
    /// Normal tick
    Tick(TickData),
    /// Regulation ended level, sudden death begins
    GoldenGoalStarted(TickData),
    /// Match finished (returned again on every later call)
    FullTime(MatchOutcome),
}

/// One match in progress
pub struct LiveMatch {
    config: MatchConfig,
    players: Vec<Player>,
    policies: Vec<Box<dyn PlayerPolicy>>,
    ball: Ball,
    score: Score,
    state: MatchSimulationState,
    phase: MatchPhase,
    golden_goal_started_at: Option<u64>,
    stats: MatchStats,
    events: Vec<NotificationEvent>,
    outcome: Option<MatchOutcome>,
}

impl LiveMatch {
    /// Kickoff with heuristic policies for all 22 players.
    pub fn new<R: Rng + ?Sized>(
        config: MatchConfig,
        red_strength: f32,
        blue_strength: f32,
        rng: &mut R,
    ) -> Self {
        Self::with_policies(config, red_strength, blue_strength, rng, |_| {
            Box::new(HeuristicPolicy::new())
        })
    }

    /// Kickoff with a policy per player built by `make_policy`
    pub fn with_policies<R, F>(
        config: MatchConfig,
        red_strength: f32,
        blue_strength: f32,
        rng: &mut R,
        mut make_policy: F,
    ) -> Self
    where
        R: Rng + ?Sized,
        F: FnMut(&Player) -> Box<dyn PlayerPolicy>,
    {
        let players = kickoff_lineup(red_strength, blue_strength);
        let policies = players.iter().map(&mut make_policy).collect();
        let kicking_team = if rng.gen_bool(0.5) { Team::Red } else { Team::Blue };
        log::info!(
            "kickoff: red strength {:.3}, blue strength {:.3}, {} kicks off",
            red_strength,
            blue_strength,
            kicking_team
        );
        Self {
            config,
            players,
            policies,
            ball: kickoff_ball(kicking_team, rng),
            score: Score::default(),
            state: MatchSimulationState::new(0),
            phase: MatchPhase::Regulation,
            golden_goal_started_at: None,
            stats: MatchStats::new(),
            events: Vec::new(),
            outcome: None,
        }
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn time_ms(&self) -> u64 {
        self.state.now_ms
    }

    pub fn stats(&self) -> &MatchStats {
        &self.stats
    }

    pub fn simulation_state(&self) -> &MatchSimulationState {
        &self.state
    }

    pub fn outcome(&self) -> Option<&MatchOutcome> {
        self.outcome.as_ref()
    }

    pub fn snapshot(&self) -> TickSnapshot {
        TickSnapshot {
            players: self.players.clone(),
            ball: self.ball,
            score: self.score,
            time_ms: self.state.now_ms,
        }
    }

    /// Index of each team's outfielder closest to the ball
    fn nearest_outfielders(&self) -> [Option<usize>; 2] {
        let mut nearest: [Option<(usize, f32)>; 2] = [None, None];
        for (idx, p) in self.players.iter().enumerate() {
            if p.role.is_goalkeeper() {
                continue;
            }
            let slot = match p.team {
                Team::Red => 0,
                Team::Blue => 1,
            };
            let d = p.position.distance(&self.ball.position);
            if nearest[slot].map_or(true, |(_, best)| d < best) {
                nearest[slot] = Some((idx, d));
            }
        }
        nearest.map(|n| n.map(|(idx, _)| idx))
    }

    fn policy_input(&self, idx: usize, nearest: &[Option<usize>; 2]) -> PolicyInput {
        let me = &self.players[idx];
        let goal_difference =
            self.score.goals(me.team) as i32 - self.score.goals(me.team.opponent()) as i32;
        let team_slot = match me.team {
            Team::Red => 0,
            Team::Blue => 1,
        };
        PolicyInput {
            ball_position: self.ball.position,
            ball_velocity: self.ball.velocity,
            player_position: me.position,
            teammate_positions: self
                .players
                .iter()
                .filter(|p| p.team == me.team && p.id != me.id)
                .map(|p| (p.id, p.position))
                .collect(),
            opponent_positions: self
                .players
                .iter()
                .filter(|p| p.team != me.team)
                .map(|p| p.position)
                .collect(),
            role: me.role,
            team_context: TeamContext {
                team: me.team,
                player_id: me.id,
                anchor: me.target_position,
                nearest_to_ball: nearest[team_slot] == Some(idx),
                goal_difference,
            },
        }
    }

    /// Query every policy and move the players. Returns each player's action.
    fn move_players(&mut self) -> Vec<PlayerAction> {
        let nearest = self.nearest_outfielders();
        let decisions: Vec<PolicyOutput> = (0..self.players.len())
            .map(|idx| {
                let input = self.policy_input(idx, &nearest);
                self.policies[idx].decide(&input)
            })
            .collect();

        for (p, decision) in self.players.iter_mut().zip(&decisions) {
            let max_step = player::MAX_SPEED * p.strength_multiplier;
            let step = decision.move_vector.clamp_length(0.0, max_step);
            let next = p.position + step;
            p.position = Vec2::new(
                next.x.clamp(player::RADIUS, pitch::WIDTH - player::RADIUS),
                next.y.clamp(player::RADIUS, pitch::HEIGHT - player::RADIUS),
            );
        }
        decisions.into_iter().map(|d| d.action).collect()
    }

    fn reset_positions(&mut self) {
        for p in &mut self.players {
            p.position = p.target_position;
        }
    }

    fn finish(&mut self, winner: Team, coin_toss: bool) -> MatchOutcome {
        let was_golden_goal = self.phase == MatchPhase::GoldenGoal;
        self.phase = MatchPhase::Finished;
        let ended = NotificationEvent::MatchEnded {
            winner,
            score: self.score,
            golden_goal: was_golden_goal,
            time_ms: self.state.now_ms,
        };
        self.events.push(ended);
        log::info!(
            "full time: {} wins {}-{}{}",
            winner,
            self.score.red,
            self.score.blue,
            if was_golden_goal { " (golden goal)" } else { "" }
        );
        let outcome = MatchOutcome {
            winner,
            score: self.score,
            was_golden_goal,
            decided_by_coin_toss: coin_toss,
            duration_ms: self.state.now_ms,
            stats: self.stats.clone(),
            events: self.events.clone(),
        };
        self.outcome = Some(outcome.clone());
        outcome
    }

    /// Advance the match by one tick
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> StepResult {
        if let Some(outcome) = &self.outcome {
            return StepResult::FullTime(outcome.clone());
        }

        self.state.now_ms += self.config.tick_ms;
        let now = self.state.now_ms;

        let actions = self.move_players();
        let step = step_ball(&self.ball, &self.players, &actions, &mut self.state, rng);
        self.ball = step.ball;

        let golden = self.phase == MatchPhase::GoldenGoal;
        let mut tick_events = Vec::new();
        let mut scorer = None;
        for event in &step.events {
            match *event {
                BallEvent::Touch(touch) => self.stats.record_touch(touch.team),
                BallEvent::Goal { team, kind } => {
                    self.score.add_goal(team);
                    scorer = Some(team);
                    tick_events.push(NotificationEvent::GoalScored {
                        team,
                        kind,
                        score: self.score,
                        time_ms: now,
                        golden_goal: golden,
                    });
                }
                BallEvent::Offside(call) => {
                    self.stats.record_offside();
                    tick_events.push(NotificationEvent::OffsideCalled {
                        offending_team: call.offending_team,
                        player_id: call.player_id,
                        position: call.position,
                        time_ms: now,
                    });
                }
                BallEvent::FreeKickTaken { team, auto } => {
                    tick_events.push(NotificationEvent::FreeKickTaken {
                        team,
                        auto,
                        time_ms: now,
                    });
                }
                _ => {}
            }
        }
        if scorer.is_some() {
            self.reset_positions();
        }
        self.stats.sample(now, self.state.last_touch_team, self.score);
        self.events.extend(tick_events.iter().cloned());

        match self.phase {
            MatchPhase::Regulation if now >= self.config.match_duration_ms => {
                if let Some(winner) = self.score.leader() {
                    return StepResult::FullTime(self.finish(winner, false));
                }
                self.phase = MatchPhase::GoldenGoal;
                self.golden_goal_started_at = Some(now);
                log::info!(
                    "regulation ends level {}-{}, golden goal",
                    self.score.red,
                    self.score.blue
                );
                StepResult::GoldenGoalStarted(TickData {
                    snapshot: self.snapshot(),
                    events: tick_events,
                })
            }
            MatchPhase::GoldenGoal => {
                if let Some(winner) = scorer {
                    return StepResult::FullTime(self.finish(winner, false));
                }
                let started = self.golden_goal_started_at.unwrap_or(now);
                if now.saturating_sub(started) >= self.config.golden_goal_cap_ms {
                    let winner = if rng.gen_bool(0.5) { Team::Red } else { Team::Blue };
                    log::info!(
                        "golden goal cap reached after {}ms, coin toss to {}",
                        self.config.golden_goal_cap_ms,
                        winner
                    );
                    self.score.add_goal(winner);
                    return StepResult::FullTime(self.finish(winner, true));
                }
                StepResult::Tick(TickData {
                    snapshot: self.snapshot(),
                    events: tick_events,
                })
            }
            _ => StepResult::Tick(TickData {
                snapshot: self.snapshot(),
                events: tick_events,
            }),
        }
    }

    /// Step until full time
    pub fn run_to_completion<R: Rng + ?Sized>(&mut self, rng: &mut R) -> MatchOutcome {
        loop {
            if let StepResult::FullTime(outcome) = self.step(rng) {
                return outcome;
            }
        }
    }
}

impl std::fmt::Debug for LiveMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveMatch")
            .field("phase", &self.phase)
            .field("time_ms", &self.state.now_ms)
            .field("score", &self.score)
            .field("ball", &self.ball)
            .finish()
    }
}
