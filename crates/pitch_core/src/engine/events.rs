//! Notification events
//!
//! Fire-and-forget notifications for the presentation layer. The core only
//! returns them; nothing in the engine waits on a consumer.

use serde::{Deserialize, Serialize};

use super::goal::GoalKind;
use super::types::{Score, Team};
use super::vector::Vec2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationEvent {
    GoalScored {
        team: Team,
        kind: GoalKind,
        score: Score,
        time_ms: u64,
        golden_goal: bool,
    },
    OffsideCalled {
        offending_team: Team,
        player_id: u32,
        position: Vec2,
        time_ms: u64,
    },
    FreeKickTaken {
        team: Team,
        auto: bool,
        time_ms: u64,
    },
    MatchEnded {
        winner: Team,
        score: Score,
        golden_goal: bool,
        time_ms: u64,
    },
    RoundAdvanced {
        completed_round: u8,
        next_round: u8,
    },
    TournamentComplete {
        champion_id: u32,
        champion_name: String,
    },
}

impl NotificationEvent {
    pub fn is_goal(&self) -> bool {
        matches!(self, NotificationEvent::GoalScored { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_type_tag() {
        let event = NotificationEvent::RoundAdvanced {
            completed_round: 1,
            next_round: 2,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"round_advanced\""));
        let back: NotificationEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
