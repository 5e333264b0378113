mod cli;
mod config;
mod error;
mod models;
mod services;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

const DEFAULT_HISTORY: &str = "player_24-25_stats.csv";
const DEFAULT_OUTPUT: &str = "next_game_predictions.csv";

#[derive(Parser)]
#[command(name = "hoopcast")]
#[command(about = "NBA next-game stat projections from rolling averages and opponent defense")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the historical game-log dataset
    Fetch {
        /// Player full names, comma separated
        #[arg(
            short,
            long,
            value_delimiter = ',',
            default_value = "LeBron James,Stephen Curry,Kevin Durant,Jayson Tatum,Luka Dončić,Miles Bridges,Karl-Anthony Towns,Victor Wembanyama"
        )]
        players: Vec<String>,
        /// Season in stats.nba.com form, e.g. 2024-25
        #[arg(short, long, default_value = "2024-25")]
        season: String,
        #[arg(short, long, default_value = DEFAULT_HISTORY)]
        out: PathBuf,
    },
    /// Generate next-game predictions from the dataset
    Predict {
        #[arg(short, long, default_value = DEFAULT_HISTORY)]
        input: PathBuf,
        #[arg(short, long, default_value = DEFAULT_OUTPUT)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Fetch {
            players,
            season,
            out,
        }) => {
            tracing::info!("Building game-log dataset for {} players", players.len());
            cli::run_fetch(&players, &season, &out).await?;
        }
        Some(Commands::Predict { input, output }) => {
            tracing::info!("Generating next-game predictions...");
            cli::run_predict(&input, &output).await?;
        }
        None => {
            // Default to the prediction pipeline
            tracing::info!("Generating next-game predictions...");
            cli::run_predict(DEFAULT_HISTORY.as_ref(), DEFAULT_OUTPUT.as_ref()).await?;
        }
    }

    Ok(())
}
