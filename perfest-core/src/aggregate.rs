/// Per-participant totals and the standings order.
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::types::{FirstAcceptance, ProblemId, ProblemResults, StandingsRow, UserTotalResult};

/// Sum a participant's reduced results into one total.
///
/// Problems with zero point are skipped entirely, so their trial and
/// penalty counters never leak into the tie-break.
pub fn calc_user_total_result(results: &ProblemResults) -> UserTotalResult {
    results
        .values()
        .filter(|r| r.point != 0.0)
        .fold(UserTotalResult::default(), |total, r| UserTotalResult {
            point: total.point + r.point,
            penalties: total.penalties + r.penalties,
            last_updated_epoch_second: total
                .last_updated_epoch_second
                .max(r.last_updated_epoch_second),
        })
}

/// Finishing time with penalties folded in. Saturates instead of
/// overflowing for huge penalties.
pub fn effective_time(total: &UserTotalResult, penalty_second: i64) -> i64 {
    total
        .last_updated_epoch_second
        .saturating_add(penalty_second.saturating_mul(i64::from(total.penalties)))
}

/// Standings order of two totals; `Less` means `a` ranks higher.
///
/// Point descending, then effective finishing time ascending, then fewer
/// penalties. Callers break remaining ties by participant id.
pub fn compare_total_result(a: &UserTotalResult, b: &UserTotalResult, penalty_second: i64) -> Ordering {
    b.point
        .total_cmp(&a.point)
        .then_with(|| effective_time(a, penalty_second).cmp(&effective_time(b, penalty_second)))
        .then_with(|| a.penalties.cmp(&b.penalties))
}

/// Standings order of two rows: totals first, then real participants
/// before bots, then participant id.
pub fn compare_standings_rows(a: &StandingsRow, b: &StandingsRow, penalty_second: i64) -> Ordering {
    compare_total_result(&a.total, &b.total, penalty_second)
        .then_with(|| a.is_bot.cmp(&b.is_bot))
        .then_with(|| a.participant.cmp(&b.participant))
}

pub fn sort_standings(rows: &mut [StandingsRow], penalty_second: i64) {
    rows.sort_by(|a, b| compare_standings_rows(a, b, penalty_second));
}

/// Competition ranks (1, 2, 2, 4, ...) for totals already in standings order.
pub fn assign_ranks(sorted_totals: &[UserTotalResult], penalty_second: i64) -> Vec<usize> {
    let mut ranks = Vec::with_capacity(sorted_totals.len());
    for (i, total) in sorted_totals.iter().enumerate() {
        let rank = match i {
            0 => 1,
            _ if compare_total_result(&sorted_totals[i - 1], total, penalty_second) == Ordering::Equal => {
                ranks[i - 1]
            }
            _ => i + 1,
        };
        ranks.push(rank);
    }
    ranks
}

/// Fastest accepted result per problem.
///
/// `participants` must be in standings order; on equal times the earlier
/// participant keeps the first acceptance.
pub fn first_acceptances<'a, I>(participants: I, start: i64) -> BTreeMap<ProblemId, FirstAcceptance>
where
    I: IntoIterator<Item = (&'a str, &'a ProblemResults)>,
{
    let mut fastest: BTreeMap<ProblemId, FirstAcceptance> = BTreeMap::new();
    for (participant, results) in participants {
        for (problem_id, result) in results.iter().filter(|(_, r)| r.accepted) {
            let elapsed_seconds = result.last_updated_epoch_second - start;
            let faster = fastest
                .get(problem_id)
                .map_or(true, |current| elapsed_seconds < current.elapsed_seconds);
            if faster {
                fastest.insert(
                    problem_id.clone(),
                    FirstAcceptance {
                        participant: participant.to_string(),
                        elapsed_seconds,
                    },
                );
            }
        }
    }
    fastest
}
