//! Playlist curation from precomputed audio features.
//!
//! Core modules:
//! - [`table`] - Feature table loading and column lookup
//! - [`params`] - Filter parameter snapshot
//! - [`pipeline`] - Filter, rank, truncate and shuffle
//! - [`playlist`] - Path rewriting and playlist export
//! - [`session`] - Run handler tying the above together
//!
//! ### Supporting Modules
//!
//! - [`config`] - Table/playlist locations and the optional config file
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`shell`] - Interactive session loop
//! - [`completion`] - Shell completion generation
//! - [`error`] - Library error type
//!
//! ## Quick Start Example
//!
//! ```no_run
//! use curate::{pipeline, playlist, FeatureTable, FilterParameters, Presence, Range};
//! use std::path::Path;
//!
//! // Load once, reuse for every selection
//! let table = FeatureTable::load(Path::new("data/audio_essentia_features_5.csv"))?;
//!
//! let params = FilterParameters {
//!     genres: vec!["Jazz---Bebop".to_string()],
//!     activation: Some(Range::new(0.3, 1.0)),
//!     rank_by: vec!["Jazz---Bebop".to_string()],
//!     tempo: Some(Range::new(100.0, 140.0)),
//!     presence: Presence::Instrumental,
//!     max_tracks: 25,
//!     ..Default::default()
//! };
//!
//! let tracks = pipeline::select(&table, &params)?;
//! if tracks.is_empty() {
//!     println!("No tracks matched");
//! }
//! playlist::export(&tracks, Path::new("playlists/streamlit.m3u8"))?;
//! # Ok::<(), curate::CurateError>(())
//! ```
//!
//! ## Error Handling
//!
//! Library functions return [`CurateError`]:
//!
//! - `MissingAttribute` - a selected tag or required column is not in the table
//! - `TableFormat` - the feature table file is malformed
//! - `Export` - the playlist could not be written
//!
//! An empty selection is not an error.
//!
//! ## Logging
//!
//! All modules log through the `log` facade. The binary initializes
//! `env_logger`, so `RUST_LOG=curate=debug curate run ...` prints the number
//! of tracks surviving each pipeline stage.

pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
pub mod params;
pub mod pipeline;
pub mod playlist;
pub mod session;
pub mod shell;
pub mod table;

pub use config::RuntimeConfig;
pub use error::{CurateError, Result};
pub use params::{FilterParameters, Presence, Range};
pub use session::{Outcome, RunReport, Session};
pub use table::FeatureTable;
