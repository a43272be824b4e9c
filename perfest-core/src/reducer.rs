/// Folds a participant's submissions into one best result per problem.
use crate::constants::ACCEPTED_VERDICT;
use crate::types::{ProblemResults, ReducedProblemResult, Submission};

pub fn is_accepted(verdict: &str) -> bool {
    verdict == ACCEPTED_VERDICT
}

/// Point a submission scores.
///
/// With an override for its problem, an accepted submission scores the
/// override and anything else scores 0. Without one the judge point stands.
pub fn resolve_point(submission: &Submission, override_point: Option<f64>) -> f64 {
    match override_point {
        Some(point) if is_accepted(&submission.result) => point,
        Some(_) => 0.0,
        None => submission.point,
    }
}

/// Reduce one participant's submissions.
///
/// Submissions may arrive in any order; they are folded in id order.
/// `point_override` maps a problem id to its contest-specific point.
pub fn reduce_user_contest_result<F>(submissions: &[Submission], point_override: F) -> ProblemResults
where
    F: Fn(&str) -> Option<f64>,
{
    let mut ordered: Vec<&Submission> = submissions.iter().collect();
    ordered.sort_by_key(|s| s.id);

    let mut results = ProblemResults::new();
    for submission in ordered {
        let accepted = is_accepted(&submission.result);
        let point = resolve_point(submission, point_override(&submission.problem_id));

        match results.get_mut(&submission.problem_id) {
            Some(best) => {
                let trials_before = best.trials;
                best.trials += 1;
                if point > best.point {
                    best.point = point;
                    best.accepted |= accepted;
                    best.penalties = trials_before;
                    best.last_updated_epoch_second = submission.epoch_second;
                }
            }
            None => {
                results.insert(
                    submission.problem_id.clone(),
                    ReducedProblemResult {
                        trials: 1,
                        penalties: 0,
                        accepted,
                        point,
                        last_updated_epoch_second: submission.epoch_second,
                    },
                );
            }
        }
    }
    results
}

/// Reduce without point overrides.
pub fn reduce_submissions(submissions: &[Submission]) -> ProblemResults {
    reduce_user_contest_result(submissions, |_| None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const PROBLEM_ID: &str = "abc999_z";

    fn make_submission(id: i64, point: f64, result: &str, epoch_second: i64) -> Submission {
        Submission {
            id,
            problem_id: PROBLEM_ID.to_string(),
            user_id: "tourism".to_string(),
            epoch_second,
            result: result.to_string(),
            point,
        }
    }

    fn expect(trials: u32, penalties: u32, accepted: bool, point: f64, last: i64) -> ReducedProblemResult {
        ReducedProblemResult {
            trials,
            penalties,
            accepted,
            point,
            last_updated_epoch_second: last,
        }
    }

    #[test]
    fn test_reduce_user_submissions_step_by_step() {
        let mut submissions = vec![make_submission(0, 0.0, "WA", 100)];
        assert_eq!(reduce_submissions(&submissions)[PROBLEM_ID], expect(1, 0, false, 0.0, 100));

        submissions.push(make_submission(1, 0.0, "WA", 200));
        assert_eq!(reduce_submissions(&submissions)[PROBLEM_ID], expect(2, 0, false, 0.0, 100));

        submissions.push(make_submission(2, 30.0, "WA", 300));
        assert_eq!(reduce_submissions(&submissions)[PROBLEM_ID], expect(3, 2, false, 30.0, 300));

        submissions.push(make_submission(3, 30.0, "WA", 400));
        assert_eq!(reduce_submissions(&submissions)[PROBLEM_ID], expect(4, 2, false, 30.0, 300));

        submissions.push(make_submission(4, 100.0, "AC", 500));
        assert_eq!(reduce_submissions(&submissions)[PROBLEM_ID], expect(5, 4, true, 100.0, 500));

        submissions.push(make_submission(5, 100.0, "AC", 600));
        assert_eq!(reduce_submissions(&submissions)[PROBLEM_ID], expect(6, 4, true, 100.0, 500));

        submissions.push(make_submission(6, 120.0, "AC", 700));
        assert_eq!(reduce_submissions(&submissions)[PROBLEM_ID], expect(7, 6, true, 120.0, 700));
    }

    #[test]
    fn test_reduce_sorts_by_id() {
        let submissions = vec![
            make_submission(3, 100.0, "AC", 500),
            make_submission(1, 0.0, "WA", 100),
            make_submission(2, 0.0, "WA", 200),
        ];
        assert_eq!(reduce_submissions(&submissions)[PROBLEM_ID], expect(3, 2, true, 100.0, 500));
    }

    #[test]
    fn test_point_override_applies_to_accepted_only() {
        let submissions = vec![
            make_submission(0, 50.0, "WA", 100),
            make_submission(1, 100.0, "AC", 200),
        ];
        let reduced = reduce_user_contest_result(&submissions, |problem_id| {
            (problem_id == PROBLEM_ID).then_some(7.0)
        });
        // The WA scores 0 under the override, so the AC at id 1 improves it.
        assert_eq!(reduced[PROBLEM_ID], expect(2, 1, true, 7.0, 200));
    }

    #[test]
    fn test_no_submissions_no_entry() {
        let reduced = reduce_submissions(&[]);
        assert!(reduced.is_empty());
    }

    #[test]
    fn test_problems_are_independent() {
        let mut other = make_submission(1, 100.0, "AC", 150);
        other.problem_id = "abc999_a".to_string();
        let submissions = vec![make_submission(0, 0.0, "WA", 100), other];
        let reduced = reduce_submissions(&submissions);
        assert_eq!(reduced.len(), 2);
        assert_eq!(reduced["abc999_a"], expect(1, 0, true, 100.0, 150));
        assert_eq!(reduced[PROBLEM_ID], expect(1, 0, false, 0.0, 100));
    }

    proptest! {
        #[test]
        fn prop_point_never_decreases(steps in prop::collection::vec((0u8..5, any::<bool>()), 1..40)) {
            let submissions: Vec<Submission> = steps.iter().enumerate().map(|(i, &(p, ac))| {
                make_submission(i as i64, p as f64 * 25.0, if ac { "AC" } else { "WA" }, 100 * i as i64)
            }).collect();

            let mut previous: Option<ReducedProblemResult> = None;
            for n in 1..=submissions.len() {
                let current = reduce_submissions(&submissions[..n])[PROBLEM_ID];
                prop_assert_eq!(current.trials as usize, n);
                if let Some(prev) = previous {
                    prop_assert!(current.point >= prev.point);
                    if current.point == prev.point {
                        prop_assert_eq!(current.penalties, prev.penalties);
                        prop_assert_eq!(current.last_updated_epoch_second, prev.last_updated_epoch_second);
                    } else {
                        // Penalties are the trials strictly before the improving submission.
                        prop_assert_eq!(current.penalties as usize, n - 1);
                    }
                }
                previous = Some(current);
            }
        }
    }
}
