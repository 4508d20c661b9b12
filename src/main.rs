//! # Curate - Feature-Driven Playlists
//!
//! Filters a precomputed audio feature table by genre activation, tempo,
//! voice/instrumental presence, danceability, arousal and valence, optionally
//! ranks by a product of genre activations, and writes the result as a
//! playlist file.
//!
//! ## Usage
//!
//! ```bash
//! # See which genre tags the table carries
//! curate tags
//!
//! # One-off selection
//! curate run --genre "Jazz---Bebop" --rank "Jazz---Bebop" --tempo 100:140 -n 30
//!
//! # Interactive session with the table loaded once
//! curate shell
//! ```

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use curate::cli::{self, Command, RunArgs};
use curate::params::{AROUSAL_BOUNDS, DANCEABILITY_BOUNDS, DEFAULT_ACTIVATION, VALENCE_BOUNDS};
use curate::session::{render_report, Session};
use curate::{completion, shell, FeatureTable, RuntimeConfig};
use log::info;
use std::io;

/// Load the feature table once and bind it to a session.
fn open_session(config: &RuntimeConfig) -> Result<Session> {
    let table = FeatureTable::load(&config.table_path).with_context(|| {
        format!(
            "Failed to load feature table {}. Pass --table or set table_path in the config file.",
            config.table_path.display()
        )
    })?;
    Ok(Session::new(table, config))
}

/// Handle a single `run` event: snapshot, select, export, render.
fn run_once(session: &Session, run: &RunArgs, config: &RuntimeConfig) -> Result<()> {
    let params = run.to_parameters()?;
    let report = session.on_run(&params)?;

    let mut stdout = io::stdout().lock();
    render_report(&report, config.preview_count, run.verbose, &mut stdout)?;

    // Selection succeeded; surface the export failure with a non-zero exit.
    report.export.map_err(|err| {
        anyhow::Error::new(err).context("Selection succeeded but the playlist was not written")
    })
}

fn list_tags(session: &Session) -> Result<()> {
    let table = session.table();
    let stats = table.tag_statistics();
    if stats.is_empty() {
        println!("No genre tags in {} feature columns.", table.columns().len());
    } else {
        println!("{:<40} {:>8} {:>8} {:>8}", "tag", "min", "mean", "max");
        for tag in &stats {
            println!(
                "{:<40} {:>8.3} {:>8.3} {:>8.3}",
                tag.tag, tag.min, tag.mean, tag.max
            );
        }
    }

    println!();
    println!("{} tracks", table.len());
    if let Some((lo, hi)) = table.tempo_bounds()? {
        println!("Tempo (BPM):   {lo} to {hi}");
    }
    println!("Activation:    {DEFAULT_ACTIVATION}");
    println!("Danceability:  {DANCEABILITY_BOUNDS}");
    println!("Arousal:       {AROUSAL_BOUNDS}");
    println!("Valence:       {VALENCE_BOUNDS}");
    Ok(())
}

/// Main entry point for the Curate application.
///
/// Initializes logging, parses command-line arguments, resolves the runtime
/// configuration and routes the command.
///
/// # Logging
///
/// Initializes environment logger which can be controlled via `RUST_LOG`:
/// - `RUST_LOG=debug curate run ...` - Enable debug logging
/// - `RUST_LOG=curate::pipeline=debug curate run ...` - Per-stage track counts
fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();
    let config = RuntimeConfig::load()?.with_overrides(args.table, args.playlist);

    match args.command {
        Command::Run(run) => {
            let session = open_session(&config)?;
            run_once(&session, &run, &config)?;
        }
        Command::Tags => {
            let session = open_session(&config)?;
            list_tags(&session)?;
        }
        Command::Shell => {
            let session = open_session(&config)?;
            info!("Playlist will be written to {}", session.playlist_path().display());
            let stdin = io::stdin().lock();
            let mut stdout = io::stdout();
            shell::run_shell(&session, config.preview_count, stdin, &mut stdout)?;
        }
        Command::Completion { shell } => {
            let mut cmd = cli::Args::command();
            completion::generate_completions(
                completion::shell_to_completion_shell(shell),
                &mut cmd,
                &mut io::stdout(),
            );
        }
    }

    Ok(())
}
