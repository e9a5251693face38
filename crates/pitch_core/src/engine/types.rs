//! Core match types: teams, roles, players, ball, score, actions

use serde::{Deserialize, Serialize};

use super::physics_constants::{goal, pitch};
use super::vector::Vec2;

/// Exactly two teams per match. Red defends the left goal and attacks right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Red,
    Blue,
}

impl Team {
    pub fn opponent(self) -> Team {
        match self {
            Team::Red => Team::Blue,
            Team::Blue => Team::Red,
        }
    }

    /// Red attacks toward +x, Blue toward -x
    pub fn attacks_right(self) -> bool {
        matches!(self, Team::Red)
    }

    /// +1.0 for Red, -1.0 for Blue
    pub fn attack_sign(self) -> f32 {
        if self.attacks_right() {
            1.0
        } else {
            -1.0
        }
    }

    /// Goal line x this team defends
    pub fn own_goal_line_x(self) -> f32 {
        match self {
            Team::Red => goal::LEFT_LINE_X,
            Team::Blue => goal::RIGHT_LINE_X,
        }
    }

    /// Center of the goal this team defends
    pub fn own_goal_center(self) -> Vec2 {
        Vec2::new(self.own_goal_line_x(), pitch::CENTER_Y)
    }

    /// Center of the goal this team attacks
    pub fn attacking_goal_center(self) -> Vec2 {
        self.opponent().own_goal_center()
    }

    /// Projects x onto this team's attacking axis (larger = further forward)
    pub fn attacking_progress(self, x: f32) -> f32 {
        if self.attacks_right() {
            x
        } else {
            pitch::WIDTH - x
        }
    }

    /// True if `x` lies in this team's defensive half
    pub fn in_own_half(self, x: f32) -> bool {
        self.attacking_progress(x) < pitch::CENTER_X
    }
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Team::Red => write!(f, "red"),
            Team::Blue => write!(f, "blue"),
        }
    }
}

/// Player role, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Role {
    pub fn is_goalkeeper(self) -> bool {
        matches!(self, Role::Goalkeeper)
    }
}

/// A player on the pitch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: u32,
    pub team: Team,
    pub role: Role,
    pub position: Vec2,
    /// Formation anchor
    pub target_position: Vec2,
    /// 0.8 (weakest team in the pool) ..= 1.0 (strongest)
    pub strength_multiplier: f32,
}

impl Player {
    pub fn new(id: u32, team: Team, role: Role, position: Vec2, strength_multiplier: f32) -> Self {
        Self {
            id,
            team,
            role,
            position,
            target_position: position,
            strength_multiplier,
        }
    }
}

/// Edge of the pitch a bounce happened on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BounceSide {
    Top,
    Bottom,
    Left,
    Right,
}

/// Repeated same-side bounce tracking
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BounceDetection {
    pub consecutive_bounces: u32,
    pub last_bounce_time: u64,
    pub last_bounce_side: Option<BounceSide>,
    /// Lateral nudge applied by the last stuck-corner escape
    pub side_effect: f32,
}

/// The match ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Position before the last integration (retrospective goal checks)
    pub previous_position: Option<Vec2>,
    pub bounce_detection: BounceDetection,
}

impl Ball {
    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        Self {
            position,
            velocity,
            previous_position: None,
            bounce_detection: BounceDetection::default(),
        }
    }

    /// Ball at the center spot, at rest
    pub fn at_center() -> Self {
        Self::new(Vec2::new(pitch::CENTER_X, pitch::CENTER_Y), Vec2::ZERO)
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    pub fn freeze(&mut self) {
        self.velocity = Vec2::ZERO;
    }
}

/// Match score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Score {
    pub red: u32,
    pub blue: u32,
}

impl Score {
    pub fn add_goal(&mut self, team: Team) {
        match team {
            Team::Red => self.red += 1,
            Team::Blue => self.blue += 1,
        }
    }

    pub fn goals(&self, team: Team) -> u32 {
        match team {
            Team::Red => self.red,
            Team::Blue => self.blue,
        }
    }

    pub fn is_tied(&self) -> bool {
        self.red == self.blue
    }

    pub fn leader(&self) -> Option<Team> {
        match self.red.cmp(&self.blue) {
            std::cmp::Ordering::Greater => Some(Team::Red),
            std::cmp::Ordering::Less => Some(Team::Blue),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Intended action from a player's policy
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum PlayerAction {
    #[default]
    Move,
    Shoot,
    Pass { target: u32 },
    Intercept,
}

/// How a touch was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchKind {
    /// Goalkeeper save or parry
    Save,
    /// Field player deflection or kick
    Kick,
    /// Free kick taken by the awarded team
    FreeKick,
}

/// Ball touch reported by the collision resolver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    pub player_id: u32,
    pub team: Team,
    pub role: Role,
    pub kind: TouchKind,
}
