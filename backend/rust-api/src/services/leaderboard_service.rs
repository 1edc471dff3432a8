use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::{
    middlewares::identity::CallerIdentity,
    models::{
        AttemptRecord, GlobalLeaderboardView, LeaderboardEntry, LeaderboardStats, TimeFilter,
        UserProfile,
    },
    services::{
        ranking::{best_attempt_index, derive_badges, group_attempts_by_user, rank_entries},
        store::{AttemptQuery, AttemptStore, ProfileStore, StoreError},
    },
    utils::time::round2,
};

/// Fetch scope for one request. The only transition is Full -> SelfOnly,
/// taken exactly once when the broad fetch is denied; a failure in self-only
/// scope is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FetchScope {
    Full,
    SelfOnly,
}

/// Global cross-quiz leaderboard aggregator. Holds no state beyond its
/// injected store capabilities, so it can be built per request or shared.
pub struct LeaderboardService {
    profiles: Arc<dyn ProfileStore>,
    attempts: Arc<dyn AttemptStore>,
    fetch_limit: i64,
}

impl LeaderboardService {
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        attempts: Arc<dyn AttemptStore>,
        fetch_limit: i64,
    ) -> Self {
        Self {
            profiles,
            attempts,
            fetch_limit,
        }
    }

    /// One ranked row per eligible user with at least one attempt inside the
    /// time window, plus summary statistics. On an access-denied broad fetch
    /// the result degrades to the caller's own attempts with the `degraded`
    /// flag set.
    pub async fn global_leaderboard(
        &self,
        caller: &CallerIdentity,
        filter: TimeFilter,
    ) -> Result<GlobalLeaderboardView, StoreError> {
        let since = filter.cutoff(Utc::now());

        match self.fetch_full_snapshot(since).await {
            Ok((profiles, attempts)) => {
                info!(
                    time_filter = filter.as_str(),
                    attempts = attempts.len(),
                    "Computing global leaderboard"
                );
                Ok(build_global_view(
                    &profiles,
                    attempts,
                    since,
                    FetchScope::Full,
                ))
            }
            Err(err) if err.is_access_denied() => {
                warn!(
                    user_id = %caller.user_id,
                    error = %err,
                    "Broad leaderboard fetch denied, recomputing from caller's own attempts"
                );
                self.self_only_view(caller, since).await
            }
            Err(err) => Err(err),
        }
    }

    /// Caller's dense rank on the all-time global leaderboard, if they are
    /// on it at all.
    pub async fn user_rank(
        &self,
        caller: &CallerIdentity,
        user_id: &str,
    ) -> Result<Option<u32>, StoreError> {
        let view = self.global_leaderboard(caller, TimeFilter::AllTime).await?;
        Ok(view
            .leaderboard
            .iter()
            .find(|entry| entry.user_id == user_id)
            .map(|entry| entry.rank))
    }

    async fn fetch_full_snapshot(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<(Vec<UserProfile>, Vec<AttemptRecord>), StoreError> {
        let attempts = self
            .attempts
            .list_attempts(AttemptQuery::default().since(since).limit(self.fetch_limit))
            .await?;
        let profiles = self.profiles.list_profiles(self.fetch_limit).await?;
        Ok((profiles, attempts))
    }

    async fn self_only_view(
        &self,
        caller: &CallerIdentity,
        since: Option<DateTime<Utc>>,
    ) -> Result<GlobalLeaderboardView, StoreError> {
        let Some(profile) = self.profiles.get_profile(&caller.user_id).await? else {
            return Ok(GlobalLeaderboardView::empty(true));
        };
        let attempts = self
            .attempts
            .list_attempts(
                AttemptQuery::for_user(&caller.user_id)
                    .since(since)
                    .limit(self.fetch_limit),
            )
            .await?;

        Ok(build_global_view(
            std::slice::from_ref(&profile),
            attempts,
            since,
            FetchScope::SelfOnly,
        ))
    }
}

fn build_global_view(
    profiles: &[UserProfile],
    attempts: Vec<AttemptRecord>,
    since: Option<DateTime<Utc>>,
    scope: FetchScope,
) -> GlobalLeaderboardView {
    let profile_by_id: HashMap<&str, &UserProfile> =
        profiles.iter().map(|p| (p.id.as_str(), p)).collect();

    // The store already scopes by the window, but the window is the engine's
    // invariant, not the store's.
    let attempts: Vec<AttemptRecord> = attempts
        .into_iter()
        .filter(|a| since.is_none_or(|cutoff| a.date_taken >= cutoff))
        .collect();

    let mut entries: Vec<LeaderboardEntry> = Vec::new();
    let mut percentage_sum = 0.0;
    let mut attempt_total: u32 = 0;

    for (user_id, user_attempts) in group_attempts_by_user(attempts) {
        let Some(&profile) = profile_by_id.get(user_id.as_str()) else {
            continue;
        };
        if !profile.is_leaderboard_eligible() {
            continue;
        }

        percentage_sum += user_attempts
            .iter()
            .map(AttemptRecord::percentage_or_zero)
            .sum::<f64>();
        attempt_total += user_attempts.len() as u32;

        entries.push(build_entry(profile, &user_attempts));
    }

    rank_entries(
        &mut entries,
        |a, b| {
            b.average_score
                .total_cmp(&a.average_score)
                .then_with(|| b.total_quizzes.cmp(&a.total_quizzes))
        },
        |entry, rank| entry.rank = rank,
    );

    let stats = LeaderboardStats {
        total_users: entries.len() as u32,
        total_quizzes: entries.iter().map(|e| e.total_quizzes).sum(),
        // Attempt-weighted, unlike the per-entry user averages.
        average_score: if attempt_total > 0 {
            round2(percentage_sum / f64::from(attempt_total))
        } else {
            0.0
        },
        top_score: round2(
            entries
                .iter()
                .map(|e| e.best_score)
                .fold(0.0, f64::max),
        ),
    };

    GlobalLeaderboardView {
        leaderboard: entries,
        stats,
        degraded: scope == FetchScope::SelfOnly,
    }
}

fn build_entry(profile: &UserProfile, attempts: &[AttemptRecord]) -> LeaderboardEntry {
    let total = attempts.len() as u32;
    let percentage_sum: f64 = attempts.iter().map(AttemptRecord::percentage_or_zero).sum();
    let total_time: f64 = attempts.iter().map(AttemptRecord::time_or_zero).sum();

    let best_score = best_attempt_index(attempts)
        .map(|idx| attempts[idx].percentage_or_zero())
        .unwrap_or(0.0);

    let last_quiz_date = attempts
        .iter()
        .map(|a| a.date_taken)
        .max()
        .unwrap_or_else(Utc::now);

    LeaderboardEntry {
        user_id: profile.id.clone(),
        display_name: profile.leaderboard_name().to_string(),
        photo_url: profile.photo_url.clone(),
        total_quizzes: total,
        average_score: round2(percentage_sum / f64::from(total)),
        total_score: attempts.iter().map(|a| a.score).sum(),
        max_score: attempts.iter().map(|a| a.max_score).sum(),
        best_score: round2(best_score),
        total_completion_time: total_time,
        average_completion_time: round2(total_time / f64::from(total)),
        rank: 0,
        badges: derive_badges(attempts),
        last_quiz_date,
    }
}
