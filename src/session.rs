//! # Session Module
//!
//! A session owns the feature table for its whole lifetime and handles one
//! "run" event at a time: take a parameter snapshot, select, export, report.
//! The table is built exactly once (by the caller) and moved in, so every run
//! within the session sees the same immutable data.
//!
//! ```no_run
//! use curate::{FeatureTable, FilterParameters, RuntimeConfig, Session};
//!
//! let config = RuntimeConfig::load()?;
//! let table = FeatureTable::load(&config.table_path)?;
//! let session = Session::new(table, &config);
//!
//! let report = session.on_run(&FilterParameters::default())?;
//! curate::session::render_report(&report, 10, false, &mut std::io::stdout())?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::config::RuntimeConfig;
use crate::error::{CurateError, Result};
use crate::params::FilterParameters;
use crate::table::FeatureTable;
use crate::{pipeline, playlist};
use log::{info, warn};
use rand::Rng;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Shown when no track survives the filters.
pub const EMPTY_NOTICE: &str =
    "Oops! Looks like there are no songs for your filters! Try again with different options may be?";

/// Whether a run produced tracks. An empty selection is a normal outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Tracks(usize),
    Empty,
}

/// Everything one run produced.
#[derive(Debug)]
pub struct RunReport<'s> {
    /// Final ordered selection
    pub tracks: Vec<&'s str>,
    /// Truncation requested by the snapshot (0 = none)
    pub max_tracks: usize,
    /// Composite rank score per selected track, when ranking was requested
    pub rank_scores: Option<Vec<f64>>,
    /// Playlist destination
    pub playlist: PathBuf,
    /// Export result; a failure here leaves `tracks` valid for a retry
    pub export: Result<()>,
}

impl RunReport<'_> {
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        match self.tracks.len() {
            0 => Outcome::Empty,
            n => Outcome::Tracks(n),
        }
    }
}

/// Run handler bound to one loaded feature table.
#[derive(Debug)]
pub struct Session {
    table: FeatureTable,
    playlist_path: PathBuf,
}

impl Session {
    #[must_use]
    pub fn new(table: FeatureTable, config: &RuntimeConfig) -> Self {
        Self {
            table,
            playlist_path: config.playlist_path.clone(),
        }
    }

    #[must_use]
    pub fn table(&self) -> &FeatureTable {
        &self.table
    }

    #[must_use]
    pub fn playlist_path(&self) -> &Path {
        &self.playlist_path
    }

    /// Handle a run event with the thread-local RNG.
    ///
    /// # Errors
    ///
    /// Only selection errors ([`CurateError::MissingAttribute`]) are returned
    /// here. Export failures are carried in [`RunReport::export`].
    pub fn on_run(&self, params: &FilterParameters) -> Result<RunReport<'_>> {
        self.on_run_with_rng(params, &mut rand::thread_rng())
    }

    pub fn on_run_with_rng<R: Rng + ?Sized>(
        &self,
        params: &FilterParameters,
        rng: &mut R,
    ) -> Result<RunReport<'_>> {
        info!(
            "Run: {} genres, {} rank tags, presence {:?}, max {} tracks, shuffle {}",
            params.genres.len(),
            params.rank_by.len(),
            params.presence,
            params.max_tracks,
            params.shuffle
        );
        let tracks = pipeline::select_with_rng(&self.table, params, rng)?;
        let rank_scores = if params.rank_by.is_empty() {
            None
        } else {
            Some(pipeline::rank_scores(&self.table, &tracks, &params.rank_by)?)
        };

        let export = self.export(&tracks);
        if let Err(err) = &export {
            warn!("{err}");
        }

        Ok(RunReport {
            tracks,
            max_tracks: params.max_tracks,
            rank_scores,
            playlist: self.playlist_path.clone(),
            export,
        })
    }

    /// Write `tracks` to the session's playlist file.
    pub fn export(&self, tracks: &[&str]) -> Result<()> {
        playlist::export(tracks, &self.playlist_path)
    }
}

/// Write a human-readable summary of a run.
///
/// Export failures are not printed here; the caller decides how to surface them.
pub fn render_report<W: Write>(
    report: &RunReport<'_>,
    preview_count: usize,
    verbose: bool,
    out: &mut W,
) -> io::Result<()> {
    writeln!(out, "## Results")?;
    if report.max_tracks > 0 {
        writeln!(out, "Using top {} tracks from the results.", report.tracks.len())?;
    }

    match report.outcome() {
        Outcome::Empty => writeln!(out, "{EMPTY_NOTICE}")?,
        Outcome::Tracks(count) => {
            if report.export.is_ok() {
                writeln!(out, "Playlist: {} ({count} tracks)", report.playlist.display())?;
            }
            let shown = preview_count.min(count);
            writeln!(out, "Previews for the first {shown} results:")?;
            for (position, track) in report.tracks.iter().take(shown).enumerate() {
                match (&report.rank_scores, verbose) {
                    (Some(scores), true) => {
                        writeln!(out, "{:>3}. [{:.4}] {track}", position + 1, scores[position])?;
                    }
                    _ => writeln!(out, "{:>3}. {track}", position + 1)?,
                }
            }
        }
    }
    Ok(())
}

/// Errors an interactive session reports and then survives.
#[must_use]
pub fn is_recoverable(err: &CurateError) -> bool {
    matches!(
        err,
        CurateError::MissingAttribute { .. } | CurateError::Export { .. }
    )
}
