use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future;
use tracing::{info, warn};

use crate::{
    middlewares::identity::CallerIdentity,
    models::{
        AttemptRecord, QuizLeaderboardEntry, QuizLeaderboardStats, QuizLeaderboardView, TimeFilter,
        UserProfile,
    },
    services::{
        leaderboard_service::FetchScope,
        ranking::{best_attempt_index, group_attempts_by_user, rank_entries},
        store::{AttemptQuery, AttemptStore, ProfileStore, StoreError},
    },
    utils::time::round2,
};

/// Per-quiz leaderboard aggregator. Unlike the global view this one works at
/// attempt granularity: eligibility excludes a user's every attempt, and only
/// the best attempt per user enters the ranked list.
pub struct QuizLeaderboardService {
    profiles: Arc<dyn ProfileStore>,
    attempts: Arc<dyn AttemptStore>,
    fetch_limit: i64,
}

impl QuizLeaderboardService {
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

    /// Ranked best attempts for one quiz, truncated to `limit`, plus stats
    /// over every attempt of every eligible user. A denied broad fetch is
    /// retried once scoped to the caller; zero attempts there is an empty
    /// view, not an error.
    pub async fn quiz_leaderboard(
        &self,
        caller: &CallerIdentity,
        quiz_id: &str,
        limit: usize,
        filter: TimeFilter,
    ) -> Result<QuizLeaderboardView, StoreError> {
        let since = filter.cutoff(Utc::now());

        let broad = AttemptQuery::for_quiz(quiz_id)
            .since(since)
            .limit(self.fetch_limit);
        let (records, scope) = match self.attempts.list_attempts(broad).await {
            Ok(records) => (records, FetchScope::Full),
            Err(err) if err.is_access_denied() => {
                warn!(
                    quiz_id,
                    user_id = %caller.user_id,
                    error = %err,
                    "Broad quiz leaderboard fetch denied, retrying scoped to caller"
                );
                let own = self
                    .attempts
                    .list_attempts(
                        AttemptQuery::for_quiz(quiz_id)
                            .user(&caller.user_id)
                            .since(since)
                            .limit(self.fetch_limit),
                    )
                    .await?;
                if own.is_empty() {
                    return Ok(QuizLeaderboardView::empty(true));
                }
                (own, FetchScope::SelfOnly)
            }
            Err(err) => return Err(err),
        };

        info!(
            quiz_id,
            time_filter = filter.as_str(),
            attempts = records.len(),
            "Computing quiz leaderboard"
        );

        let records = apply_window(records, since);
        let groups = group_attempts_by_user(records);
        let profile_by_id = self.join_profiles(&groups).await?;

        let mut candidates: Vec<QuizLeaderboardEntry> = Vec::new();
        let mut total_attempts: u32 = 0;
        let mut fastest: Option<f64> = None;

        for (user_id, user_attempts) in &groups {
            let Some(profile) = profile_by_id.get(user_id) else {
                continue;
            };
            if !profile.is_leaderboard_eligible() {
                continue;
            }

            total_attempts += user_attempts.len() as u32;

            let entries = attempt_entries(profile, user_attempts);
            if let Some(best) = entries.into_iter().find(|e| e.is_best_attempt) {
                fastest = Some(match fastest {
                    Some(current) => current.min(best.time_taken),
                    None => best.time_taken,
                });
                candidates.push(best);
            }
        }

        let stats = QuizLeaderboardStats {
            total_attempts,
            total_users: candidates.len() as u32,
            average_score: if candidates.is_empty() {
                0.0
            } else {
                round2(
                    candidates.iter().map(|e| e.percentage_score).sum::<f64>()
                        / candidates.len() as f64,
                )
            },
            best_score: round2(
                candidates
                    .iter()
                    .map(|e| e.percentage_score)
                    .fold(0.0, f64::max),
            ),
            // "No attempts yet" is normalized to 0 here, at the stats
            // boundary only.
            fastest_time: fastest.unwrap_or(0.0),
        };

        rank_entries(
            &mut candidates,
            |a, b| {
                b.percentage_score
                    .total_cmp(&a.percentage_score)
                    .then_with(|| a.time_taken.total_cmp(&b.time_taken))
            },
            |entry, rank| entry.rank = Some(rank),
        );
        candidates.truncate(limit);

        Ok(QuizLeaderboardView {
            leaderboard: candidates,
            stats,
            degraded: scope == FetchScope::SelfOnly,
        })
    }

    /// Every attempt of one user on one quiz, numbered in arrival order with
    /// the best attempt flagged. Unknown or ineligible users get an empty
    /// list, not an error.
    pub async fn user_attempts(
        &self,
        quiz_id: &str,
        user_id: &str,
        filter: TimeFilter,
    ) -> Result<Vec<QuizLeaderboardEntry>, StoreError> {
        let since = filter.cutoff(Utc::now());

        let Some(profile) = self.profiles.get_profile(user_id).await? else {
            return Ok(Vec::new());
        };
        if !profile.is_leaderboard_eligible() {
            return Ok(Vec::new());
        }

        let records = match self
            .attempts
            .list_attempts(
                AttemptQuery::for_quiz(quiz_id)
                    .user(user_id)
                    .since(since)
                    .limit(self.fetch_limit),
            )
            .await
        {
            Ok(records) => records,
            Err(StoreError::NotFound(_)) => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };

        Ok(attempt_entries(&profile, &apply_window(records, since)))
    }

    /// The user's dense rank among best attempts on one quiz, all-time.
    pub async fn user_quiz_rank(
        &self,
        caller: &CallerIdentity,
        quiz_id: &str,
        user_id: &str,
    ) -> Result<Option<u32>, StoreError> {
        let view = self
            .quiz_leaderboard(caller, quiz_id, usize::MAX, TimeFilter::AllTime)
            .await?;
        Ok(view
            .leaderboard
            .iter()
            .find(|entry| entry.user_id == user_id)
            .and_then(|entry| entry.rank))
    }

    /// Fetch the profiles behind a set of attempt groups concurrently and
    /// join them back by user id. Aggregation only proceeds once every
    /// lookup has completed; a missing profile simply drops that user.
    async fn join_profiles(
        &self,
        groups: &[(String, Vec<AttemptRecord>)],
    ) -> Result<HashMap<String, UserProfile>, StoreError> {
        let lookups = groups
            .iter()
            .map(|(user_id, _)| self.profiles.get_profile(user_id));
        let fetched = future::try_join_all(lookups).await?;

        Ok(groups
            .iter()
            .zip(fetched)
            .filter_map(|((user_id, _), profile)| profile.map(|p| (user_id.clone(), p)))
            .collect())
    }
}

fn apply_window(records: Vec<AttemptRecord>, since: Option<DateTime<Utc>>) -> Vec<AttemptRecord> {
    records
        .into_iter()
        .filter(|a| since.is_none_or(|cutoff| a.date_taken >= cutoff))
        .collect()
}

/// Build one entry per attempt: attempt numbers follow arrival order and
/// exactly one entry carries the best-attempt flag. Ranks stay unset here.
fn attempt_entries(profile: &UserProfile, attempts: &[AttemptRecord]) -> Vec<QuizLeaderboardEntry> {
    let best = best_attempt_index(attempts);

    attempts
        .iter()
        .enumerate()
        .map(|(idx, attempt)| QuizLeaderboardEntry {
            user_id: profile.id.clone(),
            display_name: profile.leaderboard_name().to_string(),
            photo_url: profile.photo_url.clone(),
            score: attempt.score,
            percentage_score: attempt.percentage_or_zero(),
            time_taken: attempt.time_or_zero(),
            rank: None,
            attempt_number: (idx + 1) as u32,
            is_best_attempt: best == Some(idx),
            date_taken: attempt.date_taken,
        })
        .collect()
}
