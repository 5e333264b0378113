use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// One row of the historical game-log CSV. Extra columns in the file are
/// ignored; absent optional columns surface as `None` downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerGameRecord {
    pub player_name: String,
    #[serde(deserialize_with = "de_game_date")]
    pub game_date: NaiveDate,
    pub team: String, // abbreviation, e.g. "GSW"
    #[serde(default)]
    pub pts_avg_last_5: Option<f64>,
    #[serde(default)]
    pub reb_avg_last_5: Option<f64>,
    #[serde(default)]
    pub ast_avg_last_5: Option<f64>,
    #[serde(default)]
    pub injury_status: Option<String>,
}

/// A game on the fetched slate. Team names are full names from the directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledGame {
    pub game_date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
}

/// Per-team defensive profile scraped from the season stats page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamDefense {
    pub team: String,
    pub def_rtg: f64,
    pub opp_3p_pct: Option<f64>,
    pub opp_fg_pct: Option<f64>,
}

/// One output row of the prediction CSV. `None` serializes as an empty field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRow {
    pub player_name: String,
    pub game_date: NaiveDate,
    pub team: String,
    pub opponent: String,
    pub home: u8, // 1 = home, 0 = away
    pub injury_status: String,
    pub opp_def_rating: Option<f64>,
    pub opp_3p_pct: Option<f64>,
    pub opp_fg_pct: Option<f64>,
    pub predicted_pts: Option<f64>,
    pub predicted_reb: Option<f64>,
    pub predicted_ast: Option<f64>,
}

/// One row of the dataset built by the `fetch` subcommand. The column set is
/// a superset of what `PlayerGameRecord` reads back in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetRow {
    pub player_name: String,
    pub game_date: NaiveDate,
    pub team: String,
    pub opponent: String,
    pub home: u8,
    pub days_rest: Option<i64>,
    pub pts: f64,
    pub reb: f64,
    pub ast: f64,
    pub pts_avg_last_5: Option<f64>,
    pub reb_avg_last_5: Option<f64>,
    pub ast_avg_last_5: Option<f64>,
    pub injury_status: String,
}

/// Parse a calendar date as it appears in the game-log CSV or in scoreboard
/// timestamps ("2024-03-01", "2024-03-01T00:00:00", "2024-03-01 19:30:00").
pub fn parse_game_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date()))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
}

fn de_game_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_game_date(raw.trim()).map_err(serde::de::Error::custom)
}
