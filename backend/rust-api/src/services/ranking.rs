//! Pure ranking primitives shared by the global and per-quiz aggregators:
//! arrival-order grouping, best-attempt selection, dense rank assignment and
//! badge derivation. Everything here is deterministic over its input, which
//! is what makes whole-pipeline reruns byte-identical.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::AttemptRecord;

/// Partition attempts by owning user. Arrival order is preserved twice over:
/// within each user's list and across users (first-seen order), because the
/// stable rank sort later breaks residual ties by this order.
pub fn group_attempts_by_user(attempts: Vec<AttemptRecord>) -> Vec<(String, Vec<AttemptRecord>)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<AttemptRecord>)> = Vec::new();

    for attempt in attempts {
        match index.get(&attempt.user_id) {
            Some(&slot) => groups[slot].1.push(attempt),
            None => {
                index.insert(attempt.user_id.clone(), groups.len());
                let user_id = attempt.user_id.clone();
                groups.push((user_id, vec![attempt]));
            }
        }
    }

    groups
}

/// Index of the best attempt in a user's list: highest percentage score
/// (missing counts as 0), ties broken by lowest time taken (missing counts
/// as 0), remaining ties keep the earliest attempt. `None` only for an
/// empty list.
pub fn best_attempt_index(attempts: &[AttemptRecord]) -> Option<usize> {
    let mut best: Option<usize> = None;

    for (idx, attempt) in attempts.iter().enumerate() {
        let Some(current) = best else {
            best = Some(idx);
            continue;
        };
        match compare_attempts(attempt, &attempts[current]) {
            Ordering::Less => best = Some(idx),
            Ordering::Equal | Ordering::Greater => {}
        }
    }

    best
}

/// Score-then-speed ordering: percentage descending, time ascending.
/// `Ordering::Less` means "ranks ahead of".
pub fn compare_attempts(a: &AttemptRecord, b: &AttemptRecord) -> Ordering {
    b.percentage_or_zero()
        .total_cmp(&a.percentage_or_zero())
        .then_with(|| a.time_or_zero().total_cmp(&b.time_or_zero()))
}

/// Stable-sort `entries` by `compare` and assign dense 1-based ranks in
/// sorted order. Entries the comparator cannot separate keep their relative
/// input order.
pub fn rank_entries<T>(
    entries: &mut [T],
    compare: impl FnMut(&T, &T) -> Ordering,
    mut assign: impl FnMut(&mut T, u32),
) {
    entries.sort_by(compare);
    for (idx, entry) in entries.iter_mut().enumerate() {
        assign(entry, (idx + 1) as u32);
    }
}

/// Achievement badges derived from a user's attempt history inside the
/// active time window. Evaluated on the global view only.
pub fn derive_badges(attempts: &[AttemptRecord]) -> Vec<String> {
    if attempts.is_empty() {
        return Vec::new();
    }

    let mut badges: Vec<&str> = Vec::new();
    let total = attempts.len();

    // Volume badges are additive: every threshold met adds its own badge.
    const VOLUME_BADGES: [(usize, &str); 5] = [
        (1, "First Quiz"),
        (5, "Quiz Explorer"),
        (10, "Quiz Enthusiast"),
        (25, "Quiz Master"),
        (50, "Quiz Legend"),
    ];
    for (threshold, badge) in VOLUME_BADGES {
        if total >= threshold {
            badges.push(badge);
        }
    }

    // Performance tier: only the highest reached tier is awarded.
    let average: f64 =
        attempts.iter().map(AttemptRecord::percentage_or_zero).sum::<f64>() / total as f64;
    if average >= 95.0 {
        badges.push("Perfectionist");
    } else if average >= 85.0 {
        badges.push("High Achiever");
    } else if average >= 75.0 {
        badges.push("Good Student");
    }

    let perfect = attempts
        .iter()
        .filter(|a| a.percentage_or_zero() == 100.0)
        .count();
    if perfect >= 1 {
        badges.push("Perfect Score");
    }
    if perfect >= 5 {
        badges.push("Consistency King");
    }
    if perfect >= 10 {
        badges.push("Flawless Performer");
    }

    let high = attempts
        .iter()
        .filter(|a| a.percentage_or_zero() >= 90.0)
        .count();
    if high >= 10 {
        badges.push("Top Performer");
    }
    if high >= 20 {
        badges.push("Elite Scorer");
    }

    // Mean over attempts that actually carry a time; untimed records do not
    // drag the average toward zero.
    let timed: Vec<f64> = attempts
        .iter()
        .map(AttemptRecord::time_or_zero)
        .filter(|t| *t > 0.0)
        .collect();
    if !timed.is_empty() && timed.iter().sum::<f64>() / (timed.len() as f64) < 120.0 {
        badges.push("Speed Demon");
    }

    // Threshold proxy, not an actual day-consecutive streak. Kept as-is:
    // changing it would change observable badge awards.
    if total >= 7 {
        badges.push("Weekly Warrior");
    }

    badges.into_iter().map(String::from).collect()
}
