#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a headless Blast Arena match between agents.

mod session;
mod settings;

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use crate::{session::Session, settings::Settings};

/// Plays a headless match between computer-controlled actors.
#[derive(Debug, Parser)]
#[command(name = "blast-arena", version, about)]
struct Cli {
    /// Seed for terrain generation, collectible drops and agent decisions.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Upper bound on simulated ticks.
    #[arg(long, default_value_t = 36_000)]
    ticks: u64,
    /// Persisted level file; malformed files fall back to a generated arena.
    #[arg(long)]
    level: Option<PathBuf>,
    /// TOML file with `[arena]`, `[safety]` and `[agent]` tables.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of actors, overriding the settings file.
    #[arg(long)]
    actors: Option<u32>,
}

/// Entry point for the Blast Arena command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(actors) = cli.actors {
        settings.arena.actor_count = actors;
    }

    let level = cli
        .level
        .as_ref()
        .map(|path| {
            fs::read_to_string(path)
                .with_context(|| format!("failed to read level at {}", path.display()))
        })
        .transpose()?;

    let mut session = Session::new(&settings, level.as_deref(), cli.seed)?;
    let summary = session.run(cli.ticks);
    print!("{summary}");
    Ok(())
}
