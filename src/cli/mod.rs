use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use serde::Serialize;

use crate::config::TeamNameMap;
use crate::services::{gamelog, history, predictor, DefenseFetcher, GamelogFetcher, ScheduleFetcher};

/// The prediction pipeline: history → schedule → defense → join → CSV.
/// Only a missing/malformed history file or an unmatched defense table
/// aborts; an empty slate still writes (an empty) output and exits cleanly.
pub async fn run_predict(input: &Path, output: &Path) -> Result<()> {
    let latest_stats = history::load_latest_stats(input)?;
    println!("📊 Latest stats loaded for {} players", latest_stats.len());

    println!("📥 Loading upcoming schedule...");
    let schedule = ScheduleFetcher::new()
        .fetch_upcoming(Local::now().date_naive())
        .await;

    println!("🗓  Schedule preview ({} games):", schedule.len());
    for game in schedule.iter().take(5) {
        println!("   {} {} at {}", game.game_date, game.away_team, game.home_team);
    }

    println!("📥 Loading team defense ratings...");
    let defense = DefenseFetcher::new().fetch().await?;
    println!("   {} defense profiles", defense.len());

    println!("🔮 Generating predictions...");
    let team_map = TeamNameMap::default();
    let predictions = predictor::build_predictions(&latest_stats, &schedule, &defense, &team_map);

    write_csv(output, &predictions)?;
    println!(
        "✅ Saved {} predictions to {}",
        predictions.len(),
        output.display()
    );

    Ok(())
}

/// Build the historical game-log dataset the predict pipeline consumes.
pub async fn run_fetch(players: &[String], season: &str, output: &Path) -> Result<()> {
    let fetcher = GamelogFetcher::new();

    println!("📥 Scraping current injury report...");
    let injuries = fetcher.injury_report().await;
    println!("   {} players listed", injuries.len());

    println!("📥 Fetching player index...");
    let directory = fetcher.player_directory(season).await?;

    let mut all_rows = Vec::new();
    for name in players {
        println!("⛹  Processing {name}...");
        let Some(&player_id) = directory.get(&name.to_lowercase()) else {
            tracing::warn!("player '{}' not found in index, skipping", name);
            continue;
        };

        let entries = fetcher.game_log(player_id, season).await?;
        if entries.is_empty() {
            tracing::warn!("no game log rows for '{}', skipping", name);
        } else {
            all_rows.extend(gamelog::build_dataset_rows(name, entries, &injuries));
        }

        // stats.nba.com rate-limits aggressively; pace the per-player calls.
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    if all_rows.is_empty() {
        println!("📭 No player data was collected.");
        return Ok(());
    }

    write_csv(output, &all_rows)?;
    println!("✅ Saved {} game rows to {}", all_rows.len(), output.display());

    Ok(())
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
