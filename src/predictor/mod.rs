pub mod commentary;
pub mod evaluator;
pub mod features;
pub mod model;
pub mod timeline;

pub use commentary::CommentaryTag;
pub use evaluator::{validate_entry, EvaluateError, Evaluator, PredictionResult, Rejection};
pub use features::{derive, MatchState};
pub use model::{ChaseModel, ModelInput, WinModel, WinProbability};
pub use timeline::Timeline;
