use std::collections::HashMap;

use anyhow::{anyhow, Result};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

use crate::error::PipelineError;
use crate::models::TeamDefense;

const DEFENSE_URL: &str = "https://www.basketball-reference.com/leagues/NBA_2024.html";

/// Markers the column map requires. Kept as a slice so the schema error can
/// name exactly what it scanned for.
const REQUIRED_COLUMNS: &[&str] = &["Team", "DRtg"];

fn sel(selector: &str) -> Selector {
    Selector::parse(selector).expect("static selector")
}

/// Column positions resolved against a table's flattened header row.
/// Team and defensive rating are required; the opponent shooting columns are
/// best-effort and stay `None` when the page omits them.
struct ColumnMap {
    team: usize,
    def_rtg: usize,
    opp_3p: Option<usize>,
    opp_fg: Option<usize>,
}

impl ColumnMap {
    fn resolve(headers: &[String]) -> Option<ColumnMap> {
        let team = headers.iter().position(|h| h.contains("Team"))?;
        let def_rtg = headers.iter().position(|h| h.contains("DRtg"))?;
        let opp_3p = headers
            .iter()
            .position(|h| h.contains("Defense") && h.contains("3P%"));
        let opp_fg = headers
            .iter()
            .position(|h| h.contains("Defense") && h.contains("eFG%"));
        Some(ColumnMap {
            team,
            def_rtg,
            opp_3p,
            opp_fg,
        })
    }
}

pub struct DefenseFetcher {
    client: Client,
}

impl Default for DefenseFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl DefenseFetcher {
    pub fn new() -> Self {
        DefenseFetcher {
            client: super::stats_client(),
        }
    }

    /// Fetch the season stats page and extract per-team defense profiles,
    /// keyed by cleaned team name. Failing to locate a table with the
    /// required columns is fatal: no defense data can be emitted without it.
    pub async fn fetch(&self) -> Result<HashMap<String, TeamDefense>> {
        tracing::info!("fetching team defense ratings from {}", DEFENSE_URL);

        let response = self.client.get(DEFENSE_URL).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("defense page error {}: {}", status, body));
        }

        let html = response.text().await?;
        Ok(parse_defense_tables(&html)?)
    }
}

/// Scan every parsed table for one whose flattened header row satisfies the
/// column map; the first match wins.
pub fn parse_defense_tables(html: &str) -> Result<HashMap<String, TeamDefense>, PipelineError> {
    let document = Html::parse_document(html);
    let mut tables_seen = 0;

    for table in document.select(&sel("table")) {
        tables_seen += 1;
        let headers = flatten_headers(table);
        if let Some(columns) = ColumnMap::resolve(&headers) {
            return Ok(extract_profiles(table, &columns));
        }
    }

    Err(PipelineError::DefenseSchema {
        required: REQUIRED_COLUMNS,
        tables_seen,
    })
}

/// Flatten a table's header into one row of column names. Two-row headers
/// (stat-group over-headers above column names) are joined with `_`, with
/// colspans expanded so positions line up with body cells.
fn flatten_headers(table: ElementRef) -> Vec<String> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    for tr in table.select(&sel("thead tr")) {
        let mut cols = Vec::new();
        for cell in tr.select(&sel("th, td")) {
            let span = cell
                .value()
                .attr("colspan")
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(1);
            let text = cell_text(cell);
            for _ in 0..span {
                cols.push(text.clone());
            }
        }
        rows.push(cols);
    }

    match rows.len() {
        0 => Vec::new(),
        1 => rows.swap_remove(0),
        _ => {
            let (over, sub) = (&rows[0], &rows[1]);
            sub.iter()
                .enumerate()
                .map(|(i, s)| {
                    match over.get(i).map(String::as_str).filter(|o| !o.is_empty()) {
                        Some(o) if s.is_empty() => o.to_string(),
                        Some(o) => format!("{o}_{s}"),
                        None => s.clone(),
                    }
                })
                .collect()
        }
    }
}

fn extract_profiles(table: ElementRef, columns: &ColumnMap) -> HashMap<String, TeamDefense> {
    let mut profiles = HashMap::new();

    for row in table.select(&sel("tbody tr")) {
        let cells: Vec<String> = row.select(&sel("th, td")).map(cell_text).collect();

        let Some(raw_team) = cells.get(columns.team) else {
            continue;
        };
        let team = clean_team_name(raw_team);
        if team.is_empty() {
            continue;
        }

        let Some(def_rtg) = cells.get(columns.def_rtg).and_then(|v| v.parse::<f64>().ok()) else {
            tracing::warn!("unparseable defensive rating for '{}', skipping row", team);
            continue;
        };

        let pct = |idx: Option<usize>| {
            idx.and_then(|i| cells.get(i)).and_then(|v| v.parse::<f64>().ok())
        };

        profiles.insert(
            team.clone(),
            TeamDefense {
                team,
                def_rtg,
                opp_3p_pct: pct(columns.opp_3p),
                opp_fg_pct: pct(columns.opp_fg),
            },
        );
    }

    profiles
}

fn cell_text(cell: ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Strip trailing annotation from a team cell: playoff asterisks and anything
/// after a non-breaking space ("Boston Celtics\u{a0}(1)").
fn clean_team_name(raw: &str) -> String {
    let base = raw.split('\u{a0}').next().unwrap_or(raw);
    base.trim_end_matches('*').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATINGS_PAGE: &str = r#"
        <html><body>
        <table>
          <thead><tr><th>Team</th><th>W</th><th>L</th></tr></thead>
          <tbody><tr><td>Boston Celtics</td><td>64</td><td>18</td></tr></tbody>
        </table>
        <table>
          <thead>
            <tr>
              <th colspan="3"></th>
              <th colspan="2">Offense Four Factors</th>
              <th colspan="2">Defense Four Factors</th>
            </tr>
            <tr>
              <th>Rk</th><th>Team</th><th>DRtg</th>
              <th>eFG%</th><th>3P%</th>
              <th>eFG%</th><th>3P%</th>
            </tr>
          </thead>
          <tbody>
            <tr>
              <td>1</td><td>Los Angeles Lakers&#160;*</td><td>112.3</td>
              <td>.556</td><td>.375</td><td>.541</td><td>.362</td>
            </tr>
            <tr>
              <td>2</td><td>Boston Celtics*</td><td>110.6</td>
              <td>.580</td><td>.388</td><td>.522</td><td>.351</td>
            </tr>
          </tbody>
        </table>
        </body></html>
    "#;

    #[test]
    fn test_first_matching_table_selected() {
        let profiles = parse_defense_tables(RATINGS_PAGE).unwrap();
        assert_eq!(profiles.len(), 2);

        let lakers = &profiles["Los Angeles Lakers"];
        assert_eq!(lakers.def_rtg, 112.3);
        // Opponent columns come from the Defense group, not the Offense one.
        assert_eq!(lakers.opp_fg_pct, Some(0.541));
        assert_eq!(lakers.opp_3p_pct, Some(0.362));
    }

    #[test]
    fn test_annotations_stripped_from_team_names() {
        let profiles = parse_defense_tables(RATINGS_PAGE).unwrap();
        assert!(profiles.contains_key("Los Angeles Lakers"));
        assert!(profiles.contains_key("Boston Celtics"));
    }

    #[test]
    fn test_optional_columns_absent() {
        let html = r#"
            <table>
              <thead><tr><th>Team</th><th>DRtg</th></tr></thead>
              <tbody><tr><td>Phoenix Suns</td><td>115.1</td></tr></tbody>
            </table>
        "#;
        let profiles = parse_defense_tables(html).unwrap();
        let suns = &profiles["Phoenix Suns"];
        assert_eq!(suns.def_rtg, 115.1);
        assert_eq!(suns.opp_3p_pct, None);
        assert_eq!(suns.opp_fg_pct, None);
    }

    #[test]
    fn test_no_matching_table_is_fatal() {
        let html = r#"
            <table><thead><tr><th>Team</th><th>W</th></tr></thead></table>
            <table><thead><tr><th>Player</th><th>DRtg</th></tr></thead></table>
        "#;
        let err = parse_defense_tables(html).unwrap_err();
        match err {
            PipelineError::DefenseSchema {
                required,
                tables_seen,
            } => {
                assert_eq!(required, REQUIRED_COLUMNS);
                assert_eq!(tables_seen, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unparseable_rating_row_skipped() {
        let html = r#"
            <table>
              <thead><tr><th>Team</th><th>DRtg</th></tr></thead>
              <tbody>
                <tr><td>League Average</td><td></td></tr>
                <tr><td>Denver Nuggets</td><td>113.0</td></tr>
              </tbody>
            </table>
        "#;
        let profiles = parse_defense_tables(html).unwrap();
        assert_eq!(profiles.len(), 1);
        assert!(profiles.contains_key("Denver Nuggets"));
    }
}
