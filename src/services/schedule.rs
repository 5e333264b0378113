use anyhow::{anyhow, Result};
use chrono::{Duration, NaiveDate};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::config;
use crate::models::{parse_game_date, ScheduledGame};

const SCOREBOARD_URL: &str = "https://stats.nba.com/stats/scoreboardv2";

/// stats.nba.com wraps every endpoint in the same envelope: a list of named
/// result sets, each a header row plus untyped value rows.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub result_sets: Vec<ResultSet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSet {
    pub name: String,
    pub headers: Vec<String>,
    pub row_set: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn column(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| anyhow!("result set '{}' missing column {}", self.name, name))
    }
}

impl StatsResponse {
    pub fn result_set(&self, name: &str) -> Result<&ResultSet> {
        self.result_sets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| anyhow!("response has no '{}' result set", name))
    }
}

pub struct ScheduleFetcher {
    client: Client,
}

impl Default for ScheduleFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleFetcher {
    pub fn new() -> Self {
        ScheduleFetcher {
            client: super::stats_client(),
        }
    }

    /// Fetch the slate for `from` and the day after, concatenated in day
    /// order. A day whose fetch fails is logged and omitted; an empty slate
    /// is not an error.
    pub async fn fetch_upcoming(&self, from: NaiveDate) -> Vec<ScheduledGame> {
        let mut schedule = Vec::new();

        for day_offset in 0..=1 {
            let date = from + Duration::days(day_offset);
            match self.fetch_day(date).await {
                Ok(mut games) => schedule.append(&mut games),
                Err(e) => {
                    tracing::warn!(
                        "scoreboard fetch failed for {}: {e:#}",
                        date.format("%m/%d/%Y")
                    );
                }
            }
        }

        schedule
    }

    async fn fetch_day(&self, date: NaiveDate) -> Result<Vec<ScheduledGame>> {
        let response = self
            .client
            .get(SCOREBOARD_URL)
            .query(&[
                ("GameDate", date.format("%m/%d/%Y").to_string()),
                ("LeagueID", "00".to_string()),
                ("DayOffset", "0".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("scoreboard API error {}: {}", status, body));
        }

        let data: StatsResponse = response.json().await?;
        games_from_scoreboard(&data)
    }
}

/// Flatten the scoreboard's GameHeader result set into scheduled games,
/// translating numeric team ids through the team directory. Ids the
/// directory does not know become "Unknown" rather than dropping the game.
pub fn games_from_scoreboard(data: &StatsResponse) -> Result<Vec<ScheduledGame>> {
    let set = data.result_set("GameHeader")?;
    let date_col = set.column("GAME_DATE_EST")?;
    let home_col = set.column("HOME_TEAM_ID")?;
    let away_col = set.column("VISITOR_TEAM_ID")?;

    let mut games = Vec::new();
    for row in &set.row_set {
        let Some(game_date) = row
            .get(date_col)
            .and_then(Value::as_str)
            .and_then(|s| parse_game_date(s).ok())
        else {
            tracing::warn!("scoreboard row with unparseable game date, skipping");
            continue;
        };

        let team_name = |col: usize| -> String {
            row.get(col)
                .and_then(Value::as_u64)
                .and_then(config::team_name_for_id)
                .unwrap_or("Unknown")
                .to_string()
        };

        games.push(ScheduledGame {
            game_date,
            home_team: team_name(home_col),
            away_team: team_name(away_col),
        });
    }

    Ok(games)
}
