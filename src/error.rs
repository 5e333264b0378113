use std::path::PathBuf;
use thiserror::Error;

/// Fatal pipeline conditions. Everything else is a per-item diagnostic and is
/// logged and skipped rather than raised.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The historical game-log file is missing or a row failed to parse.
    #[error("history file {}: {source}", path.display())]
    History {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// No scraped table carried the columns the defense schema requires.
    #[error(
        "no defense-rating table found: required columns {required:?} \
         not present in any of the {tables_seen} parsed tables"
    )]
    DefenseSchema {
        required: &'static [&'static str],
        tables_seen: usize,
    },
}
