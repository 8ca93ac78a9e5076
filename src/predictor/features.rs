use serde::{Deserialize, Serialize};

use crate::teams::Team;

/// Total legal deliveries in a T20 innings.
pub const BALLS_PER_INNINGS: i32 = 120;

/// Complete input to one prediction: identity/context plus the raw scalars
/// the chasing side has put on the board so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    pub batting_team: Team,
    pub bowling_team: Team,
    pub city: String,
    /// Runs the batting side must reach.
    pub target: i32,
    /// Runs scored so far.
    pub score: i32,
    /// Whole overs plus balls as one decimal (e.g. 12.3 = 12 overs 3 balls).
    pub overs_completed: f64,
    pub wickets_lost: i32,
}

/// Situational features computed from a `MatchState`. Never stored; rebuilt
/// for every prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedFeatures {
    pub runs_left: i32,
    pub balls_left: i32,
    pub wickets_in_hand: i32,
    /// Current run rate, 0 when no overs have been bowled.
    pub crr: f64,
    /// Required run rate, 0 when no balls remain.
    pub rrr: f64,
}

/// Derive the model features from raw match state.
///
/// Pure and deterministic. Preconditions (overs > 0, score <= target,
/// wickets < 10) are enforced by the evaluator, not here; the zero
/// conventions below only exist so the function is total.
pub fn derive(state: &MatchState) -> DerivedFeatures {
    let runs_left = state.target - state.score;
    let balls_left = BALLS_PER_INNINGS - (state.overs_completed * 6.0).floor() as i32;
    let wickets_in_hand = 10 - state.wickets_lost;
    let crr = if state.overs_completed > 0.0 {
        state.score as f64 / state.overs_completed
    } else {
        0.0
    };
    let rrr = if balls_left > 0 {
        (runs_left as f64 * 6.0) / balls_left as f64
    } else {
        0.0
    };
    DerivedFeatures {
        runs_left,
        balls_left,
        wickets_in_hand,
        crr,
        rrr,
    }
}

/// Round to one decimal place (timeline granularity).
pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn state(target: i32, score: i32, overs: f64, wickets: i32) -> MatchState {
        MatchState {
            batting_team: Team::ChennaiSuperKings,
            bowling_team: Team::MumbaiIndians,
            city: "Chennai".into(),
            target,
            score,
            overs_completed: overs,
            wickets_lost: wickets,
        }
    }

    #[test]
    fn midchase_scenario() {
        let f = derive(&state(150, 75, 10.0, 2));
        assert_eq!(f.runs_left, 75);
        assert_eq!(f.balls_left, 60);
        assert_eq!(f.wickets_in_hand, 8);
        assert_relative_eq!(f.crr, 7.5, epsilon = 1e-9);
        assert_relative_eq!(f.rrr, 7.5, epsilon = 1e-9);
    }

    #[test]
    fn endgame_scenario() {
        let f = derive(&state(150, 140, 19.0, 8));
        assert_eq!(f.runs_left, 10);
        assert_eq!(f.balls_left, 6);
        assert_eq!(f.wickets_in_hand, 2);
    }

    #[test]
    fn zero_overs_yields_zero_crr() {
        let f = derive(&state(150, 0, 0.0, 0));
        assert_eq!(f.crr, 0.0);
        assert_eq!(f.balls_left, 120);
    }

    #[test]
    fn no_balls_left_yields_zero_rrr() {
        let f = derive(&state(150, 149, 20.0, 4));
        assert_eq!(f.balls_left, 0);
        assert_eq!(f.rrr, 0.0);
    }

    #[test]
    fn balls_left_floors_partial_overs() {
        // floor(10.3 * 6) = 61 deliveries bowled, so 59 remain
        let f = derive(&state(150, 80, 10.3, 3));
        assert_eq!(f.balls_left, BALLS_PER_INNINGS - 61);
    }

    #[test]
    fn ranges_hold_for_all_valid_states() {
        for wickets in 0..10 {
            for overs_tenths in 1..=200 {
                let overs = overs_tenths as f64 / 10.0;
                let f = derive(&state(200, 100, overs, wickets));
                assert!((0..=BALLS_PER_INNINGS).contains(&f.balls_left));
                assert!((0..=10).contains(&f.wickets_in_hand));
            }
        }
    }

    #[test]
    fn round1_rounds_half_up() {
        assert_relative_eq!(round1(64.25), 64.3, epsilon = 1e-9);
        assert_relative_eq!(round1(10.0), 10.0, epsilon = 1e-9);
    }
}
