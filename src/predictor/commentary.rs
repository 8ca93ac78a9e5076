use serde::Serialize;

use super::features::DerivedFeatures;

/// Advisory presentation hints derived from the current chase state.
/// Non-authoritative; the probability pair is the actual output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentaryTag {
    RrrUnderControl,
    RrrAboveCrr,
    WicketsInHandComfortable,
    WicketsLow,
    Endgame,
}

impl CommentaryTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentaryTag::RrrUnderControl => "rrr_under_control",
            CommentaryTag::RrrAboveCrr => "rrr_above_crr",
            CommentaryTag::WicketsInHandComfortable => "wickets_in_hand_comfortable",
            CommentaryTag::WicketsLow => "wickets_low",
            CommentaryTag::Endgame => "endgame",
        }
    }
}

/// Derive commentary tags from the feature set.
///
/// The rrr <= crr comparison is deliberately inclusive: a tie counts as
/// "under control" (documented policy carried over from the trained system,
/// not re-derived).
pub fn tags_for(features: &DerivedFeatures) -> Vec<CommentaryTag> {
    let mut tags = Vec::with_capacity(3);
    if features.rrr <= features.crr {
        tags.push(CommentaryTag::RrrUnderControl);
    } else {
        tags.push(CommentaryTag::RrrAboveCrr);
    }
    if features.wickets_in_hand > 3 {
        tags.push(CommentaryTag::WicketsInHandComfortable);
    } else {
        tags.push(CommentaryTag::WicketsLow);
    }
    if features.runs_left <= 12 && features.balls_left <= 12 {
        tags.push(CommentaryTag::Endgame);
    }
    tags
}
