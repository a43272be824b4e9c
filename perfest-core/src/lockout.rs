/// Lockout scoring: each problem belongs to whoever gets it accepted first.
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::reducer::{is_accepted, resolve_point};
use crate::types::{ParticipantId, ProblemResults, ReducedProblemResult, Submission};

/// Reduce a whole contest under lockout rules.
///
/// Submissions are walked in id order. The first accepted submission on a
/// problem locks it to its author, who scores the problem's point with the
/// trials made before it as penalties. Later submissions on a locked
/// problem are ignored, and nobody else gets an entry for it.
pub fn lockout_results<F>(submissions: &[Submission], point_override: F) -> BTreeMap<ParticipantId, ProblemResults>
where
    F: Fn(&str) -> Option<f64>,
{
    let mut ordered: Vec<&Submission> = submissions.iter().collect();
    ordered.sort_by_key(|s| s.id);

    let mut locked: HashSet<&str> = HashSet::new();
    let mut trials: HashMap<(&str, &str), u32> = HashMap::new();
    let mut results: BTreeMap<ParticipantId, ProblemResults> = BTreeMap::new();

    for submission in ordered {
        let problem_id = submission.problem_id.as_str();
        if locked.contains(problem_id) {
            continue;
        }
        let count = trials.entry((submission.user_id.as_str(), problem_id)).or_insert(0);
        *count += 1;
        if !is_accepted(&submission.result) {
            continue;
        }

        locked.insert(problem_id);
        results.entry(submission.user_id.clone()).or_default().insert(
            submission.problem_id.clone(),
            ReducedProblemResult {
                trials: *count,
                penalties: *count - 1,
                accepted: true,
                point: resolve_point(submission, point_override(problem_id)),
                last_updated_epoch_second: submission.epoch_second,
            },
        );
    }
    results
}
