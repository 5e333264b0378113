pub mod defense;
pub mod gamelog;
pub mod history;
pub mod predictor;
pub mod schedule;

pub use defense::DefenseFetcher;
pub use gamelog::GamelogFetcher;
pub use schedule::ScheduleFetcher;

use std::time::Duration;

/// Shared HTTP client for the stat sites. stats.nba.com rejects requests
/// without a browser-ish user agent.
pub(crate) fn stats_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
        .timeout(Duration::from_secs(30))
        .build()
        .expect("failed to build HTTP client")
}
