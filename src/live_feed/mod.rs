pub mod cricapi;

pub use cricapi::CricApiClient;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::predictor::MatchState;
use crate::teams::Team;

/// A live match as listed by the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiveMatch {
    pub id: String,
    pub title: String,
}

/// Current score/target for one match. Every field may be absent: the feed
/// lags behind just-started matches and mid-innings transitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreSnapshot {
    pub runs: Option<i32>,
    pub wickets: Option<i32>,
    pub overs: Option<f64>,
    pub target: Option<i32>,
    pub inning_team: Option<String>,
}

/// Typed feed failures. Callers decide the fallback (usually: log and treat
/// live mode as unavailable) instead of a blanket catch-all swallow.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("live feed request timed out")]
    Timeout,
    #[error("live feed transport error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("live feed returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("failed to parse live feed response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for FeedError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FeedError::Timeout
        } else if e.is_decode() {
            FeedError::Parse(e.to_string())
        } else {
            FeedError::Transport(e)
        }
    }
}

/// Trait every live-score feed must implement.
#[async_trait]
pub trait LiveFeed: Send + Sync {
    /// Matches currently marked live by the feed.
    async fn list_live_matches(&self) -> Result<Vec<LiveMatch>, FeedError>;

    /// Current score/target for one match.
    async fn fetch_score(&self, match_id: &str) -> Result<ScoreSnapshot, FeedError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

/// Assemble a `MatchState` from a feed snapshot, filling gaps with defaults:
/// unrecognized or missing innings team → default identity, missing target →
/// `default_target`, missing score/overs/wickets → 0. The host city comes
/// from the user (the feed does not report venues).
pub fn state_from_snapshot(snapshot: &ScoreSnapshot, city: &str, default_target: i32) -> MatchState {
    let batting_team = snapshot
        .inning_team
        .as_deref()
        .map(Team::resolve_feed_name)
        .unwrap_or_else(Team::default_identity);
    MatchState {
        batting_team,
        bowling_team: Team::any_other(batting_team),
        city: city.to_string(),
        target: snapshot.target.unwrap_or(default_target),
        score: snapshot.runs.unwrap_or(0),
        overs_completed: snapshot.overs.unwrap_or(0.0),
        wickets_lost: snapshot.wickets.unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_defaults_fill_missing_fields() {
        let state = state_from_snapshot(&ScoreSnapshot::default(), "Mumbai", 150);
        assert_eq!(state.batting_team, Team::default_identity());
        assert_ne!(state.bowling_team, state.batting_team);
        assert_eq!(state.target, 150);
        assert_eq!(state.score, 0);
        assert_eq!(state.overs_completed, 0.0);
        assert_eq!(state.wickets_lost, 0);
        assert_eq!(state.city, "Mumbai");
    }

    #[test]
    fn snapshot_values_override_defaults() {
        let snapshot = ScoreSnapshot {
            runs: Some(98),
            wickets: Some(4),
            overs: Some(12.3),
            target: Some(181),
            inning_team: Some("Kolkata Knight Riders Inning 2".into()),
        };
        let state = state_from_snapshot(&snapshot, "Kolkata", 150);
        assert_eq!(state.batting_team, Team::KolkataKnightRiders);
        assert_eq!(state.target, 181);
        assert_eq!(state.score, 98);
        assert_eq!(state.overs_completed, 12.3);
        assert_eq!(state.wickets_lost, 4);
    }

    #[test]
    fn unknown_feed_team_maps_to_default_identity() {
        let snapshot = ScoreSnapshot {
            inning_team: Some("Gujarat Titans Inning 1".into()),
            ..Default::default()
        };
        let state = state_from_snapshot(&snapshot, "Ahmedabad", 150);
        assert_eq!(state.batting_team, Team::default_identity());
    }
}
