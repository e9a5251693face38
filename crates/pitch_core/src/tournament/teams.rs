//! Tournament teams and the team pool

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::engine::physics_constants::{bracket, elo};
use crate::error::{ConfigError, TournamentError};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KitColors {
    pub primary: String,
    pub secondary: String,
}

/// A team entered in the tournament. Immutable once the bracket exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentTeam {
    pub id: u32,
    pub name: String,
    /// 1 = strongest; assigned when the bracket is built
    #[serde(default)]
    pub seed: u32,
    pub elo_rating: f64,
    pub kit_colors: KitColors,
}

impl TournamentTeam {
    pub fn new(id: u32, name: impl Into<String>, elo_rating: f64, kit_colors: KitColors) -> Self {
        Self {
            id,
            name: name.into(),
            seed: 0,
            elo_rating,
            kit_colors,
        }
    }
}

const CITIES: [&str; 32] = [
    "Aldmoor", "Brackwater", "Calder", "Dunmere", "Eastwick", "Fallowby", "Glenholt", "Harrowgate",
    "Ironbridge", "Juniper", "Kestrel", "Larkfield", "Marlow", "Northam", "Oakhurst", "Pendle",
    "Queensport", "Redcliff", "Stonebury", "Thornton", "Upton", "Valemouth", "Westerly", "Yarrow",
    "Ashford", "Bramley", "Coldwell", "Drayton", "Elmstead", "Fernhill", "Greywater", "Hollins",
];

const SUFFIXES: [&str; 4] = ["United", "City", "Athletic", "Rovers"];

const PALETTE: [&str; 8] = [
    "#d62828", "#003049", "#f77f00", "#2a9d8f", "#6a4c93", "#e9c46a", "#264653", "#ffffff",
];

/// Ordered set of candidate teams
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TeamPool {
    pub teams: Vec<TournamentTeam>,
}

impl TeamPool {
    pub fn new(teams: Vec<TournamentTeam>) -> Self {
        Self { teams }
    }

    /// 128 generated teams, ratings spread evenly over 1560..=2010
    pub fn default_pool() -> Self {
        let n = bracket::TEAMS;
        let teams = (0..n)
            .map(|i| {
                let rating = elo::MIN_ELO + (elo::MAX_ELO - elo::MIN_ELO) * i as f64 / (n - 1) as f64;
                let name = format!(
                    "{} {}",
                    CITIES[i % CITIES.len()],
                    SUFFIXES[(i / CITIES.len()) % SUFFIXES.len()]
                );
                let kit = KitColors {
                    primary: PALETTE[i % PALETTE.len()].to_string(),
                    secondary: PALETTE[(i / PALETTE.len() + 1) % PALETTE.len()].to_string(),
                };
                TournamentTeam::new(i as u32 + 1, name, rating.round(), kit)
            })
            .collect();
        Self { teams }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let teams: Vec<TournamentTeam> = serde_json::from_str(json)?;
        Ok(Self { teams })
    }

    /// Load a JSON array of teams
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// (min, max) rating in the pool
    pub fn elo_range(&self) -> Option<(f64, f64)> {
        let mut iter = self.teams.iter().map(|t| t.elo_rating);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), r| (lo.min(r), hi.max(r))))
    }

    /// Reject duplicate ids
    pub fn validate(&self) -> Result<(), TournamentError> {
        let mut seen = HashSet::new();
        for team in &self.teams {
            if !seen.insert(team.id) {
                return Err(TournamentError::DuplicateTeamId { id: team.id });
            }
        }
        Ok(())
    }
}
