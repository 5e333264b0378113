use std::collections::HashMap;

/// The league's 30 franchises: (scoreboard team id, abbreviation, full name).
/// Ids are the stats.nba.com numeric identifiers; abbreviations match what the
/// game-log dataset carries in its `team` column.
const TEAMS: &[(u64, &str, &str)] = &[
    (1610612737, "ATL", "Atlanta Hawks"),
    (1610612738, "BOS", "Boston Celtics"),
    (1610612739, "CLE", "Cleveland Cavaliers"),
    (1610612740, "NOP", "New Orleans Pelicans"),
    (1610612741, "CHI", "Chicago Bulls"),
    (1610612742, "DAL", "Dallas Mavericks"),
    (1610612743, "DEN", "Denver Nuggets"),
    (1610612744, "GSW", "Golden State Warriors"),
    (1610612745, "HOU", "Houston Rockets"),
    (1610612746, "LAC", "Los Angeles Clippers"),
    (1610612747, "LAL", "Los Angeles Lakers"),
    (1610612748, "MIA", "Miami Heat"),
    (1610612749, "MIL", "Milwaukee Bucks"),
    (1610612750, "MIN", "Minnesota Timberwolves"),
    (1610612751, "BKN", "Brooklyn Nets"),
    (1610612752, "NYK", "New York Knicks"),
    (1610612753, "ORL", "Orlando Magic"),
    (1610612754, "IND", "Indiana Pacers"),
    (1610612755, "PHI", "Philadelphia 76ers"),
    (1610612756, "PHX", "Phoenix Suns"),
    (1610612757, "POR", "Portland Trail Blazers"),
    (1610612758, "SAC", "Sacramento Kings"),
    (1610612759, "SAS", "San Antonio Spurs"),
    (1610612760, "OKC", "Oklahoma City Thunder"),
    (1610612761, "TOR", "Toronto Raptors"),
    (1610612762, "UTA", "Utah Jazz"),
    (1610612763, "MEM", "Memphis Grizzlies"),
    (1610612764, "WAS", "Washington Wizards"),
    (1610612765, "DET", "Detroit Pistons"),
    (1610612766, "CHA", "Charlotte Hornets"),
];

/// Full team name for a scoreboard team id, if the id is known.
pub fn team_name_for_id(id: u64) -> Option<&'static str> {
    TEAMS.iter().find(|(tid, _, _)| *tid == id).map(|(_, _, name)| *name)
}

/// Abbreviation → full-name mapping, passed explicitly into the prediction
/// builder so alternate tables (historical franchises, test fixtures) can be
/// injected without touching the builder.
#[derive(Debug, Clone)]
pub struct TeamNameMap {
    map: HashMap<String, String>,
}

impl Default for TeamNameMap {
    fn default() -> Self {
        let map = TEAMS
            .iter()
            .map(|(_, abbr, name)| (abbr.to_string(), name.to_string()))
            .collect();
        TeamNameMap { map }
    }
}

impl TeamNameMap {
    pub fn new(map: HashMap<String, String>) -> Self {
        TeamNameMap { map }
    }

    /// Resolve an abbreviation to a full name. Unknown abbreviations fall back
    /// to the abbreviation verbatim; such teams will generally fail schedule
    /// matching since the slate carries full names.
    pub fn resolve(&self, abbr: &str) -> String {
        match self.map.get(abbr) {
            Some(name) => name.clone(),
            None => {
                tracing::warn!("no full-name mapping for team '{}', using it verbatim", abbr);
                abbr.to_string()
            }
        }
    }
}
