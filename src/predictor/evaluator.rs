use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::teams::is_known_city;

use super::commentary::{tags_for, CommentaryTag};
use super::features::{derive, round1, MatchState};
use super::model::{ModelError, ModelInput, WinModel};
use super::timeline::Timeline;

/// Expected, user-correctable states in which no prediction is attempted.
/// These are advisories, not failures; the timeline is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("overs must be > 0 to predict")]
    OversZero,
    #[error("score exceeds target")]
    ScoreExceedsTarget,
    #[error("side is all out")]
    AllOut,
}

#[derive(Debug, Error)]
pub enum EvaluateError {
    #[error(transparent)]
    Rejected(#[from] Rejection),
    #[error("prediction failed: {0}")]
    Model(#[from] ModelError),
}

/// Manual-entry field errors, caught before a `MatchState` reaches the
/// evaluator. Feed-derived states never produce these: unknown feed teams
/// are replaced by the default identity upstream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("batting and bowling team must differ")]
    SameTeams,
    #[error("unknown host city: {0}")]
    UnknownCity(String),
    #[error("target must be at least 1")]
    NonPositiveTarget,
    #[error("score must not be negative")]
    NegativeScore,
    #[error("overs must be between 0 and 20")]
    OversOutOfRange,
    #[error("wickets must be between 0 and 10")]
    WicketsOutOfRange,
}

/// Validate manually entered fields against the enumerated sets and ranges.
pub fn validate_entry(state: &MatchState) -> Result<(), EntryError> {
    if state.batting_team == state.bowling_team {
        return Err(EntryError::SameTeams);
    }
    if !is_known_city(&state.city) {
        return Err(EntryError::UnknownCity(state.city.clone()));
    }
    if state.target < 1 {
        return Err(EntryError::NonPositiveTarget);
    }
    if state.score < 0 {
        return Err(EntryError::NegativeScore);
    }
    if !(0.0..=20.0).contains(&state.overs_completed) {
        return Err(EntryError::OversOutOfRange);
    }
    if !(0..=10).contains(&state.wickets_lost) {
        return Err(EntryError::WicketsOutOfRange);
    }
    Ok(())
}

/// Everything the presentation layer needs to render one evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResult {
    pub state: MatchState,
    pub win_prob: f64,
    pub loss_prob: f64,
    pub runs_left: i32,
    pub balls_left: i32,
    pub wickets_in_hand: i32,
    pub crr: f64,
    pub rrr: f64,
    pub commentary: Vec<CommentaryTag>,
}

/// Orchestrates one evaluation cycle: gate invalid states, derive features,
/// score them, append to the session timeline.
pub struct Evaluator {
    model: Arc<dyn WinModel>,
}

impl Evaluator {
    pub fn new(model: Arc<dyn WinModel>) -> Self {
        Evaluator { model }
    }

    pub fn evaluate(
        &self,
        state: &MatchState,
        timeline: &mut Timeline,
    ) -> Result<PredictionResult, EvaluateError> {
        // First failing check wins; no prediction is attempted.
        if state.overs_completed == 0.0 {
            return Err(Rejection::OversZero.into());
        }
        if state.score > state.target {
            return Err(Rejection::ScoreExceedsTarget.into());
        }
        if state.wickets_lost >= 10 {
            return Err(Rejection::AllOut.into());
        }

        let features = derive(state);
        let input = ModelInput {
            batting_team: state.batting_team,
            bowling_team: state.bowling_team,
            city: state.city.clone(),
            runs_left: features.runs_left,
            balls_left: features.balls_left,
            wickets: features.wickets_in_hand,
            total_runs_x: state.target,
            crr: features.crr,
            rrr: features.rrr,
        };
        let prob = self.model.predict(&input)?;
        debug!(
            model = self.model.name(),
            win = prob.win,
            overs = state.overs_completed,
            "evaluated chase state"
        );

        timeline.append(round1(state.overs_completed), round1(prob.win * 100.0));

        Ok(PredictionResult {
            state: state.clone(),
            win_prob: prob.win,
            loss_prob: prob.loss,
            runs_left: features.runs_left,
            balls_left: features.balls_left,
            wickets_in_hand: features.wickets_in_hand,
            crr: features.crr,
            rrr: features.rrr,
            commentary: tags_for(&features),
        })
    }
}
