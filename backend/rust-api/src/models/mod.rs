pub mod attempt;
pub mod leaderboard;
pub mod user;

pub use attempt::AttemptRecord;
pub use leaderboard::{
    GlobalLeaderboardView, LeaderboardEntry, LeaderboardStats, QuizLeaderboardEntry,
    QuizLeaderboardStats, QuizLeaderboardView, TimeFilter,
};
pub use user::{AccountStatus, UserProfile, UserRole};
