/// Prediction functions over fitted problem models.
///
/// Callers obtain a typed view through [`ProblemSolveModel::capability`] and
/// only then predict, so the functions below never see a missing parameter.
use crate::constants::{RATING_CLIP_THRESHOLD, TOP_PLAYER_RATING, TOO_EASY_RAW_DIFFICULTY};
use crate::types::{DifficultyModel, ModelCapability, ProblemSolveModel, TimeModel};

impl ProblemSolveModel {
    /// Difficulty view, present when `difficulty` and `discrimination` are.
    pub fn difficulty_model(&self) -> Option<DifficultyModel> {
        Some(DifficultyModel {
            difficulty: self.difficulty?,
            discrimination: self.discrimination?,
            raw_difficulty: self.raw_difficulty,
        })
    }

    /// Time view, present when `slope`, `intercept` and `variance` are.
    pub fn time_model(&self) -> Option<TimeModel> {
        Some(TimeModel {
            slope: self.slope?,
            intercept: self.intercept?,
            variance: self.variance?,
        })
    }

    pub fn capability(&self) -> ModelCapability {
        match (self.difficulty_model(), self.time_model()) {
            (Some(d), Some(t)) => ModelCapability::FullyFittable(d, t),
            (Some(d), None) => ModelCapability::DifficultyOnly(d),
            (None, Some(t)) => ModelCapability::TimeOnly(t),
            (None, None) => ModelCapability::NotFittable,
        }
    }

    /// True when every present parameter is finite.
    pub fn is_finite(&self) -> bool {
        [
            self.slope,
            self.intercept,
            self.difficulty,
            self.raw_difficulty,
            self.discrimination,
            self.variance,
        ]
        .iter()
        .flatten()
        .all(|v| v.is_finite())
    }
}

impl DifficultyModel {
    /// Whether a bot solves this problem on the first attempt regardless of rating.
    pub fn is_too_easy(&self) -> bool {
        matches!(self.raw_difficulty, Some(raw) if raw <= TOO_EASY_RAW_DIFFICULTY)
    }
}

impl TimeModel {
    /// Mean of ln(solve seconds) at `rating`.
    pub fn log_time_mean(&self, rating: f64) -> f64 {
        self.slope * rating + self.intercept
    }
}

/// Logistic probability that a participant at `rating` solves the problem.
pub fn predict_solve_probability(model: &DifficultyModel, rating: f64) -> f64 {
    1.0 / (1.0 + (-model.discrimination * (rating - model.difficulty)).exp())
}

/// Median solve time in seconds at `rating`.
pub fn predict_solve_time(model: &TimeModel, rating: f64) -> f64 {
    model.log_time_mean(rating).exp()
}

/// Median solve time of a top-rated participant.
pub fn calculate_top_player_equivalent_effort(model: &TimeModel) -> f64 {
    predict_solve_time(model, TOP_PLAYER_RATING)
}

/// Map a raw rating to the displayed rating.
///
/// Ratings below 400 are compressed so the displayed value stays positive.
pub fn clip_rating(rating: f64) -> f64 {
    if rating >= RATING_CLIP_THRESHOLD {
        rating.round()
    } else {
        (RATING_CLIP_THRESHOLD / ((RATING_CLIP_THRESHOLD - rating) / RATING_CLIP_THRESHOLD).exp())
            .round()
    }
}
