//! Kickoff formation (4-4-2)
//!
//! Template is written for Red (defending the left goal) and mirrored for Blue.
//! Player ids: Red 1..=11, Blue 12..=22, goalkeeper first.

use super::physics_constants::pitch;
use super::types::{Player, Role, Team};
use super::vector::Vec2;

pub const PLAYERS_PER_TEAM: usize = 11;

/// (role, x, y) for Red
const TEMPLATE_442: [(Role, f32, f32); PLAYERS_PER_TEAM] = [
    (Role::Goalkeeper, 30.0, 300.0),
    (Role::Defender, 150.0, 90.0),
    (Role::Defender, 140.0, 230.0),
    (Role::Defender, 140.0, 370.0),
    (Role::Defender, 150.0, 510.0),
    (Role::Midfielder, 270.0, 100.0),
    (Role::Midfielder, 260.0, 240.0),
    (Role::Midfielder, 260.0, 360.0),
    (Role::Midfielder, 270.0, 500.0),
    (Role::Forward, 360.0, 250.0),
    (Role::Forward, 360.0, 350.0),
];

fn mirror(team: Team, x: f32) -> f32 {
    match team {
        Team::Red => x,
        Team::Blue => pitch::WIDTH - x,
    }
}

/// One team's eleven at its kickoff anchors
pub fn team_lineup(team: Team, strength_multiplier: f32) -> Vec<Player> {
    let id_base = match team {
        Team::Red => 1,
        Team::Blue => 1 + PLAYERS_PER_TEAM as u32,
    };
    TEMPLATE_442
        .iter()
        .enumerate()
        .map(|(i, &(role, x, y))| {
            Player::new(
                id_base + i as u32,
                team,
                role,
                Vec2::new(mirror(team, x), y),
                strength_multiplier,
            )
        })
        .collect()
}

/// All 22 players, Red first
pub fn kickoff_lineup(red_strength: f32, blue_strength: f32) -> Vec<Player> {
    let mut players = team_lineup(Team::Red, red_strength);
    players.extend(team_lineup(Team::Blue, blue_strength));
    players
}
