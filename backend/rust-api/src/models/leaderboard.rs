use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Time window applied to `dateTaken` before any aggregation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeFilter {
    #[default]
    AllTime,
    Weekly,
    Monthly,
    Yearly,
}

impl TimeFilter {
    /// Lower bound on `dateTaken` for this filter, or `None` for all-time.
    /// Calendar-naive: a month is 30 days and a year 365, counted back from
    /// `now`.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            TimeFilter::AllTime => None,
            TimeFilter::Weekly => Some(now - Duration::days(7)),
            TimeFilter::Monthly => Some(now - Duration::days(30)),
            TimeFilter::Yearly => Some(now - Duration::days(365)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFilter::AllTime => "all_time",
            TimeFilter::Weekly => "weekly",
            TimeFilter::Monthly => "monthly",
            TimeFilter::Yearly => "yearly",
        }
    }
}

/// One row of the global cross-quiz leaderboard: a single eligible user,
/// aggregated over every attempt inside the time window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardEntry {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Attempt count, not distinct quiz ids: every attempt counts.
    #[serde(rename = "totalQuizzes")]
    pub total_quizzes: u32,
    /// Mean of this user's per-attempt percentage scores.
    #[serde(rename = "averageScore")]
    pub average_score: f64,
    #[serde(rename = "totalScore")]
    pub total_score: f64,
    #[serde(rename = "maxScore")]
    pub max_score: f64,
    #[serde(rename = "bestScore")]
    pub best_score: f64,
    #[serde(rename = "totalCompletionTime")]
    pub total_completion_time: f64,
    #[serde(rename = "averageCompletionTime")]
    pub average_completion_time: f64,
    pub rank: u32,
    pub badges: Vec<String>,
    #[serde(rename = "lastQuizDate")]
    pub last_quiz_date: DateTime<Utc>,
}

/// One row of a per-quiz leaderboard: a single attempt. `rank` is assigned
/// only to best attempts that made the ranked list; everywhere else it stays
/// `None` rather than a zero sentinel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuizLeaderboardEntry {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub score: f64,
    #[serde(rename = "percentageScore")]
    pub percentage_score: f64,
    #[serde(rename = "timeTaken")]
    pub time_taken: f64,
    pub rank: Option<u32>,
    /// 1-based, in arrival order of the user's attempts.
    #[serde(rename = "attemptNumber")]
    pub attempt_number: u32,
    #[serde(rename = "isBestAttempt")]
    pub is_best_attempt: bool,
    #[serde(rename = "dateTaken")]
    pub date_taken: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LeaderboardStats {
    #[serde(rename = "totalUsers")]
    pub total_users: u32,
    #[serde(rename = "totalQuizzes")]
    pub total_quizzes: u32,
    /// Attempt-weighted mean over all emitted entries; deliberately a
    /// different statistic than the per-entry `averageScore`.
    #[serde(rename = "averageScore")]
    pub average_score: f64,
    #[serde(rename = "topScore")]
    pub top_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct QuizLeaderboardStats {
    #[serde(rename = "totalAttempts")]
    pub total_attempts: u32,
    #[serde(rename = "totalUsers")]
    pub total_users: u32,
    /// Mean of best-attempt percentage scores across users.
    #[serde(rename = "averageScore")]
    pub average_score: f64,
    #[serde(rename = "bestScore")]
    pub best_score: f64,
    /// Min `timeTaken` among best attempts; 0 when there are no attempts.
    #[serde(rename = "fastestTime")]
    pub fastest_time: f64,
}

/// Global leaderboard plus its summary. `degraded` is set when the result
/// was recomputed from the caller's own attempts after an access denial, so
/// "rank 1 of 1 known" is distinguishable from "rank 1 of everyone".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlobalLeaderboardView {
    pub leaderboard: Vec<LeaderboardEntry>,
    pub stats: LeaderboardStats,
    pub degraded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuizLeaderboardView {
    pub leaderboard: Vec<QuizLeaderboardEntry>,
    pub stats: QuizLeaderboardStats,
    pub degraded: bool,
}

impl GlobalLeaderboardView {
    pub fn empty(degraded: bool) -> Self {
        Self {
            leaderboard: Vec::new(),
            stats: LeaderboardStats::default(),
            degraded,
        }
    }
}

impl QuizLeaderboardView {
    pub fn empty(degraded: bool) -> Self {
        Self {
            leaderboard: Vec::new(),
            stats: QuizLeaderboardStats::default(),
            degraded,
        }
    }
}
