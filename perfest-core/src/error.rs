/// Input validation errors.
///
/// The core assumes typed, pre-filtered data; these variants cover the
/// contradictions a collaborator can still hand over.
use thiserror::Error;

use crate::types::{ParticipantId, ProblemId};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimationError {
    #[error("contest ends before it starts (start = {start}, end = {end})")]
    InvalidWindow { start: i64, end: i64 },

    #[error("penalty seconds must be non-negative, got {0}")]
    NegativePenalty(i64),

    #[error("duplicate participant: {0}")]
    DuplicateParticipant(ParticipantId),

    #[error("duplicate problem: {0}")]
    DuplicateProblem(ProblemId),

    #[error("submission {submission_id} targets problem {problem_id}, which is not part of the contest")]
    UnknownProblem { submission_id: i64, problem_id: ProblemId },

    #[error("submission {submission_id} was made by {user_id}, who is not a participant")]
    UnknownParticipant { submission_id: i64, user_id: ParticipantId },

    #[error("model for problem {0} has a non-finite parameter")]
    NonFiniteModel(ProblemId),
}
