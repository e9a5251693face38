use thiserror::Error;

/// Bracket setup and result-recording failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TournamentError {
    #[error("Invalid team count: need at least {expected}, found {found}")]
    InvalidTeamCount { expected: usize, found: usize },

    #[error("Duplicate team id: {id}")]
    DuplicateTeamId { id: u32 },

    #[error("Match not found: {match_id}")]
    MatchNotFound { match_id: u32 },

    #[error("Match {match_id} is missing a team")]
    MatchNotReady { match_id: u32 },

    #[error("Match {match_id} already played")]
    MatchAlreadyPlayed { match_id: u32 },

    #[error("Team {team_id} is not playing in match {match_id}")]
    InvalidWinner { match_id: u32, team_id: u32 },
}

impl TournamentError {
    /// True if the bracket is untouched and the caller can simply skip
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            TournamentError::MatchNotReady { .. } | TournamentError::MatchAlreadyPlayed { .. }
        )
    }
}

/// Run configuration loading failures
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, TournamentError>;
