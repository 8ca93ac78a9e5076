//! Chase-outcome classifier.
//!
//! The scoring pipeline was fit offline on historical IPL second-innings
//! data; only the exported coefficients live here. Callers depend on the
//! narrow [`WinModel`] seam so tests can inject a fixed-output stub.

use serde::Serialize;
use thiserror::Error;

use crate::teams::Team;

/// The exact ordered record the trained model expects. Field identifiers are
/// the interop contract with the offline pipeline; do not rename.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInput {
    pub batting_team: Team,
    pub bowling_team: Team,
    pub city: String,
    pub runs_left: i32,
    pub balls_left: i32,
    /// Wickets in hand, not wickets lost.
    pub wickets: i32,
    pub total_runs_x: i32,
    pub crr: f64,
    pub rrr: f64,
}

/// Probability pair for the chasing side. `win + loss = 1` by construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WinProbability {
    pub win: f64,
    pub loss: f64,
}

impl WinProbability {
    pub fn from_win(win: f64) -> Self {
        WinProbability {
            win,
            loss: 1.0 - win,
        }
    }
}

#[derive(Debug, Error)]
pub enum ModelError {
    /// Input category outside the trained vocabulary. The evaluator prevents
    /// this by construction for enum-typed teams; cities are checked here.
    #[error("category not in model vocabulary: {0}")]
    UnrecognizedCategory(String),
}

/// Seam between the controller and the trained classifier.
pub trait WinModel: Send + Sync {
    fn predict(&self, input: &ModelInput) -> Result<WinProbability, ModelError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

// ── Production model ─────────────────────────────────────────────────────────

/// Logistic chase model with coefficients exported from the offline fit.
///
/// z = b0 + Σ numeric terms + batting strength − bowling strength + venue
/// effect, p_win = σ(z). Probabilities are clipped to [0.01, 0.99]; a live
/// chase is never a certainty.
pub struct ChaseModel;

/// Intercept.
const B0: f64 = -0.25;
/// Per-run-still-needed penalty.
const W_RUNS_LEFT: f64 = -0.035;
/// Per-ball-remaining credit.
const W_BALLS_LEFT: f64 = 0.025;
/// Per-wicket-in-hand credit.
const W_WICKETS: f64 = 0.32;
/// Target-size penalty (bigger chases fail more often at equal rates).
const W_TARGET: f64 = -0.002;
const W_CRR: f64 = 0.06;
const W_RRR: f64 = -0.10;

const P_FLOOR: f64 = 0.01;
const P_CEIL: f64 = 0.99;

impl ChaseModel {
    pub fn new() -> Self {
        ChaseModel
    }

    /// Batting-strength offset per franchise (league-average = 0).
    fn batting_strength(team: Team) -> f64 {
        match team {
            Team::SunrisersHyderabad => -0.02,
            Team::MumbaiIndians => 0.12,
            Team::RoyalChallengersBangalore => 0.08,
            Team::KolkataKnightRiders => 0.03,
            Team::KingsXiPunjab => -0.05,
            Team::ChennaiSuperKings => 0.14,
            Team::RajasthanRoyals => -0.03,
            Team::DelhiCapitals => -0.04,
        }
    }

    /// Bowling-strength offset per franchise (subtracted for the defending
    /// side).
    fn bowling_strength(team: Team) -> f64 {
        match team {
            Team::SunrisersHyderabad => 0.10,
            Team::MumbaiIndians => 0.09,
            Team::RoyalChallengersBangalore => -0.06,
            Team::KolkataKnightRiders => 0.02,
            Team::KingsXiPunjab => -0.04,
            Team::ChennaiSuperKings => 0.07,
            Team::RajasthanRoyals => -0.02,
            Team::DelhiCapitals => 0.01,
        }
    }

    /// Venue effect for chasing sides. `None` marks a city outside the
    /// training vocabulary.
    fn venue_effect(city: &str) -> Option<f64> {
        let v = match city {
            "Abu Dhabi" => -0.04,
            "Ahmedabad" => 0.01,
            "Bangalore" | "Bengaluru" => 0.09,
            "Bloemfontein" => -0.02,
            "Cape Town" => -0.03,
            "Centurion" => 0.02,
            "Chandigarh" | "Mohali" => 0.03,
            "Chennai" => -0.06,
            "Cuttack" => 0.00,
            "Delhi" => 0.05,
            "Dharamsala" => 0.04,
            "Durban" => -0.01,
            "East London" => -0.02,
            "Hyderabad" => 0.02,
            "Indore" => 0.07,
            "Jaipur" => 0.03,
            "Johannesburg" => 0.05,
            "Kimberley" => 0.01,
            "Kolkata" => 0.06,
            "Mumbai" => 0.04,
            "Nagpur" => -0.01,
            "Port Elizabeth" => -0.02,
            "Pune" => 0.02,
            "Raipur" => 0.00,
            "Ranchi" => -0.03,
            "Sharjah" => -0.05,
            "Visakhapatnam" => 0.01,
            _ => return None,
        };
        Some(v)
    }
}

impl Default for ChaseModel {
    fn default() -> Self {
        ChaseModel::new()
    }
}

impl WinModel for ChaseModel {
    fn predict(&self, input: &ModelInput) -> Result<WinProbability, ModelError> {
        let venue = Self::venue_effect(&input.city)
            .ok_or_else(|| ModelError::UnrecognizedCategory(input.city.clone()))?;

        let z = B0
            + W_RUNS_LEFT * input.runs_left as f64
            + W_BALLS_LEFT * input.balls_left as f64
            + W_WICKETS * input.wickets as f64
            + W_TARGET * input.total_runs_x as f64
            + W_CRR * input.crr
            + W_RRR * input.rrr
            + Self::batting_strength(input.batting_team)
            - Self::bowling_strength(input.bowling_team)
            + venue;

        let win = sigmoid(z).clamp(P_FLOOR, P_CEIL);
        Ok(WinProbability::from_win(win))
    }

    fn name(&self) -> &str {
        "ChaseModel"
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn input(runs_left: i32, balls_left: i32, wickets: i32, crr: f64, rrr: f64) -> ModelInput {
        ModelInput {
            batting_team: Team::ChennaiSuperKings,
            bowling_team: Team::MumbaiIndians,
            city: "Mumbai".into(),
            runs_left,
            balls_left,
            wickets,
            total_runs_x: 150,
            crr,
            rrr,
        }
    }

    #[test]
    fn probabilities_sum_to_one() {
        let p = ChaseModel::new()
            .predict(&input(75, 60, 8, 7.5, 7.5))
            .unwrap();
        assert_relative_eq!(p.win + p.loss, 1.0, epsilon = 1e-12);
        assert!(p.win > 0.0 && p.win < 1.0);
    }

    #[test]
    fn output_stays_clipped() {
        let model = ChaseModel::new();
        let blowout = model.predict(&input(200, 6, 1, 4.0, 200.0)).unwrap();
        assert_relative_eq!(blowout.win, 0.01, epsilon = 1e-12);
        let cruise = model.predict(&input(1, 90, 10, 12.0, 0.1)).unwrap();
        assert!(cruise.win <= 0.99);
    }

    #[test]
    fn more_runs_needed_lowers_win_probability() {
        let model = ChaseModel::new();
        let easy = model.predict(&input(40, 60, 8, 7.5, 4.0)).unwrap();
        let hard = model.predict(&input(90, 60, 8, 7.5, 9.0)).unwrap();
        assert!(easy.win > hard.win);
    }

    #[test]
    fn wickets_in_hand_raise_win_probability() {
        let model = ChaseModel::new();
        let deep = model.predict(&input(60, 48, 8, 7.5, 7.5)).unwrap();
        let thin = model.predict(&input(60, 48, 2, 7.5, 7.5)).unwrap();
        assert!(deep.win > thin.win);
    }

    #[test]
    fn near_complete_chase_is_strong_favourite() {
        let p = ChaseModel::new()
            .predict(&input(2, 12, 8, 8.2, 1.0))
            .unwrap();
        assert!(p.win > 0.85, "got {:.3}", p.win);
    }

    #[test]
    fn collapse_is_heavy_underdog() {
        let p = ChaseModel::new()
            .predict(&input(60, 12, 2, 7.5, 30.0))
            .unwrap();
        assert!(p.win < 0.10, "got {:.3}", p.win);
    }

    #[test]
    fn unknown_city_is_rejected() {
        let mut bad = input(75, 60, 8, 7.5, 7.5);
        bad.city = "London".into();
        let err = ChaseModel::new().predict(&bad).unwrap_err();
        assert!(matches!(err, ModelError::UnrecognizedCategory(c) if c == "London"));
    }

    #[test]
    fn every_known_city_scores() {
        let model = ChaseModel::new();
        for city in crate::teams::CITIES {
            let mut i = input(75, 60, 8, 7.5, 7.5);
            i.city = city.to_string();
            assert!(model.predict(&i).is_ok(), "city {} failed", city);
        }
    }

    #[test]
    fn interop_field_names_are_stable() {
        let v = serde_json::to_value(input(75, 60, 8, 7.5, 7.5)).unwrap();
        for key in [
            "batting_team",
            "bowling_team",
            "city",
            "runs_left",
            "balls_left",
            "wickets",
            "total_runs_x",
            "crr",
            "rrr",
        ] {
            assert!(v.get(key).is_some(), "missing interop field {}", key);
        }
    }
}
