use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use crate::error::PipelineError;
use crate::models::PlayerGameRecord;

/// Latest known game record per player, keyed (and therefore ordered)
/// alphabetically by player name.
pub type LatestStats = BTreeMap<String, PlayerGameRecord>;

/// Load the game-log CSV and reduce it to each player's most recent row.
/// Missing or malformed input is fatal: nothing downstream can run without
/// the rolling averages.
pub fn load_latest_stats(path: &Path) -> Result<LatestStats, PipelineError> {
    let wrap = |source: csv::Error| PipelineError::History {
        path: path.to_path_buf(),
        source,
    };
    let reader = csv::Reader::from_path(path).map_err(wrap)?;
    latest_from_reader(reader).map_err(wrap)
}

fn latest_from_reader<R: Read>(mut reader: csv::Reader<R>) -> Result<LatestStats, csv::Error> {
    let mut latest = LatestStats::new();
    for result in reader.deserialize::<PlayerGameRecord>() {
        let record = result?;
        match latest.entry(record.player_name.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
            // On equal dates the later row wins, matching file order.
            Entry::Occupied(mut slot) => {
                if record.game_date >= slot.get().game_date {
                    slot.insert(record);
                }
            }
        }
    }
    Ok(latest)
}
