use std::collections::HashMap;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use reqwest::Client;
use scraper::{Html, Selector};
use serde_json::Value;

use crate::models::DatasetRow;
use crate::services::schedule::StatsResponse;

const PLAYER_INDEX_URL: &str = "https://stats.nba.com/stats/commonallplayers";
const GAME_LOG_URL: &str = "https://stats.nba.com/stats/playergamelog";
const INJURY_URL: &str = "https://www.espn.com/nba/injuries";

/// Trailing window for the precomputed rolling averages.
pub const ROLLING_WINDOW: usize = 5;

/// One game from a player's log, before feature engineering.
#[derive(Debug, Clone)]
pub struct GameLogEntry {
    pub game_date: NaiveDate,
    pub matchup: String, // "GSW vs. LAL" (home) or "GSW @ LAL" (away)
    pub pts: f64,
    pub reb: f64,
    pub ast: f64,
}

/// Current injury report, keyed by lowercased player name. An empty report
/// means the scrape failed or found nothing; callers get "Unknown" for
/// everyone rather than a spurious "Active".
#[derive(Debug, Default)]
pub struct InjuryReport {
    statuses: HashMap<String, String>,
}

impl InjuryReport {
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    pub fn status_for(&self, player: &str) -> String {
        if self.statuses.is_empty() {
            return "Unknown".to_string();
        }
        self.statuses
            .get(&player.to_lowercase())
            .cloned()
            .unwrap_or_else(|| "Active".to_string())
    }
}

pub struct GamelogFetcher {
    client: Client,
}

impl Default for GamelogFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl GamelogFetcher {
    pub fn new() -> Self {
        GamelogFetcher {
            client: super::stats_client(),
        }
    }

    /// Fetch the league player index once: lowercased full name → player id.
    pub async fn player_directory(&self, season: &str) -> Result<HashMap<String, u64>> {
        tracing::info!("fetching player index for {}", season);

        let response = self
            .client
            .get(PLAYER_INDEX_URL)
            .query(&[
                ("LeagueID", "00"),
                ("Season", season),
                ("IsOnlyCurrentSeason", "0"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("player index API error {}: {}", status, body));
        }

        let data: StatsResponse = response.json().await?;
        let set = data.result_set("CommonAllPlayers")?;
        let id_col = set.column("PERSON_ID")?;
        let name_col = set.column("DISPLAY_FIRST_LAST")?;

        let mut directory = HashMap::new();
        for row in &set.row_set {
            let (Some(id), Some(name)) = (
                row.get(id_col).and_then(Value::as_u64),
                row.get(name_col).and_then(Value::as_str),
            ) else {
                continue;
            };
            directory.insert(name.to_lowercase(), id);
        }

        Ok(directory)
    }

    /// Fetch a player's regular-season game log.
    pub async fn game_log(&self, player_id: u64, season: &str) -> Result<Vec<GameLogEntry>> {
        let response = self
            .client
            .get(GAME_LOG_URL)
            .query(&[
                ("PlayerID", player_id.to_string()),
                ("Season", season.to_string()),
                ("SeasonType", "Regular Season".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("game log API error {}: {}", status, body));
        }

        let data: StatsResponse = response.json().await?;
        entries_from_game_log(&data)
    }

    /// Scrape the current injury report. Any failure yields an empty report,
    /// logged but never fatal: the dataset just carries "Unknown" statuses.
    pub async fn injury_report(&self) -> InjuryReport {
        let html = match self.client.get(INJURY_URL).send().await {
            Ok(response) if response.status().is_success() => {
                match response.text().await {
                    Ok(html) => html,
                    Err(e) => {
                        tracing::warn!("injury page body unreadable: {e:#}");
                        return InjuryReport::default();
                    }
                }
            }
            Ok(response) => {
                tracing::warn!("injury page returned {}", response.status());
                return InjuryReport::default();
            }
            Err(e) => {
                tracing::warn!("injury page fetch failed: {e:#}");
                return InjuryReport::default();
            }
        };

        let report = parse_injury_tables(&html);
        if report.is_empty() {
            tracing::warn!("no usable injury tables found");
        }
        report
    }
}

/// Decode the PlayerGameLog result set. Log dates come back as
/// "APR 09, 2024"; rows with unparseable dates are skipped with a warning.
pub fn entries_from_game_log(data: &StatsResponse) -> Result<Vec<GameLogEntry>> {
    let set = data.result_set("PlayerGameLog")?;
    let date_col = set.column("GAME_DATE")?;
    let matchup_col = set.column("MATCHUP")?;
    let pts_col = set.column("PTS")?;
    let reb_col = set.column("REB")?;
    let ast_col = set.column("AST")?;

    let mut entries = Vec::new();
    for row in &set.row_set {
        let Some(game_date) = row
            .get(date_col)
            .and_then(Value::as_str)
            .and_then(|s| NaiveDate::parse_from_str(s, "%b %d, %Y").ok())
        else {
            tracing::warn!("game log row with unparseable date, skipping");
            continue;
        };

        let stat = |col: usize| row.get(col).and_then(Value::as_f64).unwrap_or(0.0);

        entries.push(GameLogEntry {
            game_date,
            matchup: row
                .get(matchup_col)
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string(),
            pts: stat(pts_col),
            reb: stat(reb_col),
            ast: stat(ast_col),
        });
    }

    Ok(entries)
}

/// Pull (player, status) pairs out of every page table that carries NAME and
/// STATUS columns; team tables are concatenated.
pub fn parse_injury_tables(html: &str) -> InjuryReport {
    let document = Html::parse_document(html);
    let table_sel = Selector::parse("table").expect("static selector");
    let header_sel = Selector::parse("thead th").expect("static selector");
    let row_sel = Selector::parse("tbody tr").expect("static selector");
    let cell_sel = Selector::parse("th, td").expect("static selector");

    let mut statuses = HashMap::new();
    for table in document.select(&table_sel) {
        let headers: Vec<String> = table
            .select(&header_sel)
            .map(|h| h.text().collect::<String>().trim().to_string())
            .collect();

        let name_col = headers.iter().position(|h| h.eq_ignore_ascii_case("name"));
        let status_col = headers.iter().position(|h| h.eq_ignore_ascii_case("status"));
        let (Some(name_col), Some(status_col)) = (name_col, status_col) else {
            continue;
        };

        for row in table.select(&row_sel) {
            let cells: Vec<String> = row
                .select(&cell_sel)
                .map(|c| c.text().collect::<String>().trim().to_string())
                .collect();
            let (Some(name), Some(status)) = (cells.get(name_col), cells.get(status_col)) else {
                continue;
            };
            if name.is_empty() {
                continue;
            }
            statuses.insert(name.to_lowercase(), status.clone());
        }
    }

    InjuryReport { statuses }
}

/// Split "GSW vs. LAL" / "GSW @ LAL" into (team, opponent, home).
pub fn parse_matchup(matchup: &str) -> Option<(String, String, bool)> {
    let tokens: Vec<&str> = matchup.split_whitespace().collect();
    if tokens.len() < 3 {
        return None;
    }
    let home = matchup.contains("vs.");
    Some((
        tokens[0].to_string(),
        tokens[tokens.len() - 1].to_string(),
        home,
    ))
}

/// Trailing mean over the *previous* `window` values: the value at position
/// `i` never includes game `i`, and stays undefined until `window` priors
/// exist.
pub fn rolling_average(values: &[f64], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if i < window {
                None
            } else {
                Some(values[i - window..i].iter().sum::<f64>() / window as f64)
            }
        })
        .collect()
}

/// Turn one player's raw log into dataset rows, sorted by date, with matchup
/// features, rest days and trailing averages attached.
pub fn build_dataset_rows(
    player_name: &str,
    mut entries: Vec<GameLogEntry>,
    injuries: &InjuryReport,
) -> Vec<DatasetRow> {
    entries.sort_by_key(|e| e.game_date);

    let pts: Vec<f64> = entries.iter().map(|e| e.pts).collect();
    let reb: Vec<f64> = entries.iter().map(|e| e.reb).collect();
    let ast: Vec<f64> = entries.iter().map(|e| e.ast).collect();
    let pts_avg = rolling_average(&pts, ROLLING_WINDOW);
    let reb_avg = rolling_average(&reb, ROLLING_WINDOW);
    let ast_avg = rolling_average(&ast, ROLLING_WINDOW);

    let injury_status = injuries.status_for(player_name);

    let mut rows = Vec::with_capacity(entries.len());
    let mut prev_date: Option<NaiveDate> = None;
    for (i, entry) in entries.iter().enumerate() {
        let (team, opponent, home) = parse_matchup(&entry.matchup)
            .unwrap_or_else(|| ("Unknown".to_string(), "Unknown".to_string(), false));

        rows.push(DatasetRow {
            player_name: player_name.to_string(),
            game_date: entry.game_date,
            team,
            opponent,
            home: home as u8,
            days_rest: prev_date.map(|p| (entry.game_date - p).num_days()),
            pts: entry.pts,
            reb: entry.reb,
            ast: entry.ast,
            pts_avg_last_5: pts_avg[i],
            reb_avg_last_5: reb_avg[i],
            ast_avg_last_5: ast_avg[i],
            injury_status: injury_status.clone(),
        });
        prev_date = Some(entry.game_date);
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(date: (i32, u32, u32), matchup: &str, pts: f64) -> GameLogEntry {
        GameLogEntry {
            game_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            matchup: matchup.to_string(),
            pts,
            reb: 5.0,
            ast: 6.0,
        }
    }

    #[test]
    fn test_rolling_average_excludes_current_game() {
        let values = [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0];
        let avg = rolling_average(&values, 5);
        assert_eq!(avg[..5], [None, None, None, None, None]);
        // Mean of games 0..5, game 5 itself excluded.
        assert_eq!(avg[5], Some(30.0));
        assert_eq!(avg[6], Some(40.0));
    }

    #[test]
    fn test_parse_matchup() {
        assert_eq!(
            parse_matchup("GSW vs. LAL"),
            Some(("GSW".to_string(), "LAL".to_string(), true))
        );
        assert_eq!(
            parse_matchup("GSW @ LAL"),
            Some(("GSW".to_string(), "LAL".to_string(), false))
        );
        assert_eq!(parse_matchup("GSW"), None);
    }

    #[test]
    fn test_build_dataset_rows_sorted_with_rest_days() {
        let entries = vec![
            entry((2024, 3, 4), "GSW @ LAL", 30.0),
            entry((2024, 3, 1), "GSW vs. BOS", 25.0),
        ];
        let rows = build_dataset_rows("Stephen Curry", entries, &InjuryReport::default());

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].game_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(rows[0].days_rest, None);
        assert_eq!(rows[0].home, 1);
        assert_eq!(rows[0].opponent, "BOS");
        assert_eq!(rows[1].days_rest, Some(3));
        assert_eq!(rows[1].home, 0);
        // Fewer than five priors: averages undefined.
        assert_eq!(rows[1].pts_avg_last_5, None);
        // Empty report means status is unknown across the board.
        assert_eq!(rows[0].injury_status, "Unknown");
    }

    #[test]
    fn test_injury_status_defaults_to_active_when_report_present() {
        let html = r#"
            <table>
              <thead><tr><th>NAME</th><th>POS</th><th>STATUS</th></tr></thead>
              <tbody>
                <tr><td>Stephen Curry</td><td>PG</td><td>Day-To-Day</td></tr>
              </tbody>
            </table>
        "#;
        let report = parse_injury_tables(html);
        assert_eq!(report.len(), 1);
        assert_eq!(report.status_for("stephen curry"), "Day-To-Day");
        assert_eq!(report.status_for("LeBron James"), "Active");
    }

    #[test]
    fn test_tables_without_name_and_status_ignored() {
        let html = r#"
            <table>
              <thead><tr><th>TEAM</th><th>W</th></tr></thead>
              <tbody><tr><td>Warriors</td><td>40</td></tr></tbody>
            </table>
        "#;
        let report = parse_injury_tables(html);
        assert!(report.is_empty());
        assert_eq!(report.status_for("Stephen Curry"), "Unknown");
    }

    #[test]
    fn test_entries_from_game_log() {
        let raw = r#"{
            "resultSets": [
                {
                    "name": "PlayerGameLog",
                    "headers": ["GAME_DATE", "MATCHUP", "PTS", "REB", "AST"],
                    "rowSet": [
                        ["APR 09, 2024", "GSW vs. LAL", 33, 4, 8],
                        ["APR 07, 2024", "GSW @ UTA", 25, 6, 5]
                    ]
                }
            ]
        }"#;
        let data: StatsResponse = serde_json::from_str(raw).unwrap();
        let entries = entries_from_game_log(&data).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].game_date, NaiveDate::from_ymd_opt(2024, 4, 9).unwrap());
        assert_eq!(entries[0].pts, 33.0);
        assert_eq!(entries[1].matchup, "GSW @ UTA");
    }
}
