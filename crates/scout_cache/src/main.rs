//! Scout Cache CLI
//!
//! Scouting CSV → snapshot builder, plus rankings, team profiles and
//! alliance suggestions over a CSV or snapshot input.

#[cfg(feature = "cli")]
use alliance_core::{
    optimize, AllianceError, OptimizerConfig, SeedMode, Standings, TeamProfile,
};
#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use scout_cache::{load_standings, report, SnapshotMetadata};
#[cfg(feature = "cli")]
use serde::Serialize;
#[cfg(feature = "cli")]
use std::io;
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};
#[cfg(feature = "cli")]
use tracing_subscriber::EnvFilter;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "scout_cache")]
#[command(about = "Team rankings and alliance suggestions from scouting data", long_about = None)]
struct Cli {
    /// Optimizer config (.json/.yaml); falls back to ALLIANCE_CONFIG_PATH
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG otherwise
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Build a record snapshot from a scouting CSV
    Snapshot {
        /// Input CSV file path
        #[arg(long)]
        csv: PathBuf,

        /// Output MsgPack+LZ4 file path
        #[arg(long)]
        out: PathBuf,

        #[arg(long, default_value = "v1")]
        schema_version: String,

        /// Verify snapshot after building
        #[arg(long, default_value = "false")]
        verify: bool,

        /// Output metadata JSON file
        #[arg(long)]
        metadata: Option<PathBuf>,
    },

    /// Overall team ranking
    Rank {
        /// Scouting CSV or snapshot
        #[arg(long)]
        input: PathBuf,

        /// Show only the first N teams
        #[arg(long)]
        top: Option<usize>,
    },

    /// Ranking within one challenge (lists challenges when no name is given)
    Challenge {
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        name: Option<String>,
    },

    /// Strengths and weaknesses of one team
    Profile {
        #[arg(long)]
        input: PathBuf,

        /// Team number or name fragment
        #[arg(long)]
        team: String,
    },

    /// Ranked alliance suggestions
    Alliances {
        #[arg(long)]
        input: PathBuf,

        /// Build one alliance around this team
        #[arg(long)]
        team: Option<String>,

        /// Seed every top team independently instead of batch drafting
        #[arg(long, default_value = "false")]
        independent: bool,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Snapshot {
            csv,
            out,
            schema_version,
            verify,
            metadata,
        } => {
            println!("Building snapshot from CSV...");
            println!("   CSV Input: {}", csv.display());
            println!("   Output:    {}", out.display());
            println!("   Schema:    {}", schema_version);

            let meta = scout_cache::build_snapshot(&csv, &out, &schema_version)?;
            print_metadata(&meta);

            if verify {
                verify_snapshot_integrity(&out, &meta.checksum)?;
            }
            if let Some(metadata_path) = metadata {
                save_metadata(&metadata_path, &meta)?;
            }
        }

        Commands::Rank { input, top } => {
            let standings = load_standings(&input, &config)?;
            let rows = match top {
                Some(n) => standings.top_teams(n),
                None => &standings.team_rankings[..],
            };
            if cli.json {
                print_json(&rows)?;
            } else {
                report::write_ranking(&mut io::stdout().lock(), "Overall ranking", rows)?;
            }
        }

        Commands::Challenge { input, name } => {
            let standings = load_standings(&input, &config)?;
            match name {
                Some(challenge) => {
                    let rows = standings.rank_challenge(&challenge);
                    if cli.json {
                        print_json(&rows)?;
                    } else {
                        report::write_ranking(
                            &mut io::stdout().lock(),
                            &format!("Ranking in {challenge}"),
                            &rows,
                        )?;
                    }
                }
                None => {
                    let challenges = standings.challenges();
                    if cli.json {
                        print_json(&challenges)?;
                    } else {
                        for challenge in challenges {
                            println!("{challenge}");
                        }
                    }
                }
            }
        }

        Commands::Profile { input, team } => {
            let standings = load_standings(&input, &config)?;
            let team = resolve_team(&standings, &team)?;
            let profile = TeamProfile::build(&standings, &team)
                .ok_or_else(|| AllianceError::UnknownTeam(team.clone()))?;
            if cli.json {
                print_json(&profile)?;
            } else {
                report::write_profile(&mut io::stdout().lock(), &profile)?;
            }
        }

        Commands::Alliances {
            input,
            team,
            independent,
        } => {
            let standings = load_standings(&input, &config)?;
            let mode = match team {
                Some(query) => SeedMode::Targeted(resolve_team(&standings, &query)?),
                None if independent => SeedMode::Independent,
                None => SeedMode::Batch,
            };
            let alliances = optimize(&standings, &config, &mode)?;
            if cli.json {
                print_json(&alliances)?;
            } else if alliances.is_empty() {
                println!("No alliances could be formed.");
            } else {
                let mut out = io::stdout().lock();
                for (i, alliance) in alliances.iter().enumerate() {
                    report::write_alliance(&mut out, i + 1, alliance, &standings)?;
                }
            }
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn load_config(path: Option<&Path>) -> Result<OptimizerConfig> {
    let config = match path {
        Some(path) => OptimizerConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => OptimizerConfig::load_from_env()
            .context("Failed to load config from ALLIANCE_CONFIG_PATH")?
            .unwrap_or_default(),
    };
    Ok(config)
}

/// Canonical team name for a number or name fragment.
#[cfg(feature = "cli")]
fn resolve_team(standings: &Standings, query: &str) -> Result<String> {
    let found = standings
        .find_team(query)
        .ok_or_else(|| AllianceError::UnknownTeam(query.to_string()))?;
    Ok(found.team.clone())
}

#[cfg(feature = "cli")]
fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(feature = "cli")]
fn print_metadata(meta: &SnapshotMetadata) {
    println!("\nSnapshot built successfully!");
    println!("   Records:         {} ({} skipped)", meta.record_count, meta.skipped_rows);
    println!(
        "   Original size:   {}",
        scout_cache::snapshot::human_bytes(meta.original_size)
    );
    println!(
        "   Compressed size: {}",
        scout_cache::snapshot::human_bytes(meta.compressed_size)
    );
    println!("   Compression:     {:.1}%", meta.compression_ratio * 100.0);
    println!("   Checksum:        {}", meta.checksum);
    println!("   Created:         {}", meta.created_at);
}

#[cfg(feature = "cli")]
fn verify_snapshot_integrity(path: &Path, checksum: &str) -> Result<()> {
    println!("\nVerifying snapshot integrity...");
    if scout_cache::verify_snapshot(path, checksum)? {
        println!("Snapshot verification passed");
        Ok(())
    } else {
        anyhow::bail!("Snapshot verification failed - checksum mismatch!")
    }
}

#[cfg(feature = "cli")]
fn save_metadata(path: &Path, meta: &SnapshotMetadata) -> Result<()> {
    let metadata_json = serde_json::to_string_pretty(meta)?;
    std::fs::write(path, metadata_json)
        .with_context(|| format!("Failed to write metadata: {}", path.display()))?;
    println!("\nMetadata saved to: {}", path.display());
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("scout_cache CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
