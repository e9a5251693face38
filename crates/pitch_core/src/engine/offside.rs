//! Offside & free-kick state machine
//!
//! `Normal → OffsideDetected → FreeKickPending → Normal`
//!
//! - 오프사이드 라인 = second-to-last defender of the opposing team,
//!   measured along the attacking axis (mirrored per team)
//! - no offside in a player's own half
//! - no offside for the team that already had the last touch
//! - a pending free kick auto-executes if nobody from the awarded team
//!   claims it in time

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::physics_constants::{offside, pitch};
use super::types::{Player, Team};
use super::vector::Vec2;

/// Pending free kick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FreeKickState {
    pub in_progress: bool,
    /// Team awarded the kick
    pub team: Team,
    /// Infraction spot; the ball is held here
    pub position: Vec2,
    pub auto_execute_deadline: u64,
}

/// State machine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OffsidePhase {
    Normal,
    /// Flag still up after the free kick was taken
    OffsideDetected,
    FreeKickPending,
}

/// Offside call raised on a touch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OffsideCall {
    pub offending_team: Team,
    /// Teammate caught beyond the line
    pub player_id: u32,
    pub position: Vec2,
}

/// Per-match offside state. All timers are deadlines in match time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OffsideState {
    pub free_kick: Option<FreeKickState>,
    /// Offending team while the flag is up
    pub offside_flag: Option<Team>,
    pub flag_clear_at: Option<u64>,
}

/// Attacking progress of the opposing second-to-last defender, seen from `attacker`.
///
/// Goalkeepers count as defenders. `None` if fewer than two defenders.
pub fn offside_line(attacker: Team, players: &[Player]) -> Option<f32> {
    let mut progress: Vec<f32> = players
        .iter()
        .filter(|p| p.team != attacker)
        .map(|p| attacker.attacking_progress(p.position.x))
        .collect();
    if progress.len() < 2 {
        return None;
    }
    // Deepest defender first (closest to their own goal)
    progress.sort_by(|a, b| b.total_cmp(a));
    Some(progress[1])
}

/// True if `player` stands in an offside position
pub fn is_offside_position(player: &Player, players: &[Player]) -> bool {
    if player.team.in_own_half(player.position.x) {
        return false;
    }
    let Some(line) = offside_line(player.team, players) else {
        return false;
    };
    player.team.attacking_progress(player.position.x) > line
}

/// First teammate of `toucher` near the ball and beyond the offside line
pub fn find_offside_teammate<'a>(
    toucher: &Player,
    players: &'a [Player],
    ball_pos: Vec2,
) -> Option<&'a Player> {
    players.iter().find(|p| {
        p.team == toucher.team
            && p.id != toucher.id
            && p.position.distance(&ball_pos) <= offside::CAPTURE_RADIUS
            && is_offside_position(p, players)
    })
}

/// Velocity of an auto-executed free kick for `team`
pub fn auto_kick_velocity<R: Rng + ?Sized>(team: Team, rng: &mut R) -> Vec2 {
    let vy = rng.gen_range(-offside::AUTO_KICK_MAX_VY..=offside::AUTO_KICK_MAX_VY);
    Vec2::new(team.attack_sign() * offside::AUTO_KICK_POWER, vy)
}

impl OffsideState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> OffsidePhase {
        if self.free_kick.is_some() {
            OffsidePhase::FreeKickPending
        } else if self.offside_flag.is_some() {
            OffsidePhase::OffsideDetected
        } else {
            OffsidePhase::Normal
        }
    }

    pub fn free_kick_pending(&self) -> bool {
        self.free_kick.is_some()
    }

    /// While a free kick is pending only the awarded team may touch the ball
    pub fn touch_allowed(&self, team: Team) -> bool {
        match self.free_kick {
            Some(fk) => fk.team == team,
            None => true,
        }
    }

    /// Run the offside check for a touch by `toucher`.
    ///
    /// Raises a call (and a pending free kick for the other team) if a
    /// teammate near the ball is offside and `toucher`'s team was not
    /// already in possession.
    pub fn check_touch(
        &mut self,
        toucher: &Player,
        players: &[Player],
        ball_pos: Vec2,
        last_touch_team: Option<Team>,
        now_ms: u64,
    ) -> Option<OffsideCall> {
        if self.phase() != OffsidePhase::Normal {
            return None;
        }
        if last_touch_team == Some(toucher.team) {
            return None;
        }
        let caught = find_offside_teammate(toucher, players, ball_pos)?;
        let awarded = toucher.team.opponent();
        let spot = Vec2::new(
            ball_pos.x.clamp(pitch::WIDTH * 0.05, pitch::WIDTH * 0.95),
            ball_pos.y,
        );
        self.offside_flag = Some(toucher.team);
        self.flag_clear_at = None;
        self.free_kick = Some(FreeKickState {
            in_progress: true,
            team: awarded,
            position: spot,
            auto_execute_deadline: now_ms + offside::AUTO_EXECUTE_MS,
        });
        log::debug!(
            "offside: {} player {} beyond the line, free kick to {} at ({:.0}, {:.0})",
            toucher.team,
            caught.id,
            awarded,
            spot.x,
            spot.y
        );
        Some(OffsideCall {
            offending_team: toucher.team,
            player_id: caught.id,
            position: spot,
        })
    }

    /// Free kick taken (legal touch or auto-kick). Flag drops after a grace delay.
    pub fn release(&mut self, now_ms: u64) {
        if self.free_kick.take().is_some() {
            self.flag_clear_at = Some(now_ms + offside::FLAG_CLEAR_DELAY_MS);
        }
    }

    /// True if the pending free kick is due for auto-execution
    pub fn auto_execute_due(&self, now_ms: u64) -> bool {
        matches!(self.free_kick, Some(fk) if now_ms >= fk.auto_execute_deadline)
    }

    /// Drop the flag once its clear deadline passes
    pub fn expire_flag(&mut self, now_ms: u64) {
        if let Some(at) = self.flag_clear_at {
            if now_ms >= at {
                self.offside_flag = None;
                self.flag_clear_at = None;
            }
        }
    }

    /// New phase of play (goal scored): cancel everything, including timers
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
