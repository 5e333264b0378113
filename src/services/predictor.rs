use std::collections::HashMap;

use crate::config::TeamNameMap;
use crate::models::{PredictionRow, ScheduledGame, TeamDefense};
use crate::services::history::LatestStats;

/// Build one prediction row per player whose team appears on the fetched
/// slate, in snapshot (alphabetical) order. Players with no scheduled game
/// are logged and skipped; opponents missing from the defense table get
/// empty defense fields rather than failing.
pub fn build_predictions(
    latest_stats: &LatestStats,
    schedule: &[ScheduledGame],
    defense: &HashMap<String, TeamDefense>,
    team_map: &TeamNameMap,
) -> Vec<PredictionRow> {
    let mut predictions = Vec::new();

    for (player, record) in latest_stats {
        let player_team = team_map.resolve(&record.team);

        // Earliest game wins when both fetched days have one; first slate
        // entry wins on equal dates.
        let game = schedule
            .iter()
            .filter(|g| plays_in(g, &player_team))
            .min_by_key(|g| g.game_date);

        let Some(game) = game else {
            tracing::info!("no upcoming game found for {} ({})", player, player_team);
            continue;
        };

        let home = game.home_team.eq_ignore_ascii_case(&player_team);
        let opponent = if home {
            game.away_team.clone()
        } else {
            game.home_team.clone()
        };

        let opp_def = defense.get(&opponent);
        if opp_def.is_none() {
            tracing::warn!("no defense profile for opponent '{}'", opponent);
        }

        predictions.push(PredictionRow {
            player_name: player.clone(),
            game_date: game.game_date,
            team: player_team.clone(),
            opponent,
            home: home as u8,
            injury_status: record
                .injury_status
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            opp_def_rating: opp_def.map(|d| d.def_rtg),
            opp_3p_pct: opp_def.and_then(|d| d.opp_3p_pct),
            opp_fg_pct: opp_def.and_then(|d| d.opp_fg_pct),
            // TODO: fold opp_def_rating into the projection once an
            // opponent-adjustment factor has been fitted on past seasons.
            predicted_pts: record.pts_avg_last_5,
            predicted_reb: record.reb_avg_last_5,
            predicted_ast: record.ast_avg_last_5,
        });
    }

    predictions
}

fn plays_in(game: &ScheduledGame, team: &str) -> bool {
    game.home_team.eq_ignore_ascii_case(team) || game.away_team.eq_ignore_ascii_case(team)
}
