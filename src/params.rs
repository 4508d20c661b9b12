//! Filter parameters: one snapshot of the user's criteria per run.
//!
//! Every optional range is `None` when the user never engaged the matching
//! control; the pipeline skips the stage entirely in that case. A snapshot can
//! be built from command-line flags or loaded from a JSON file:
//!
//! ```json
//! {
//!   "genres": ["Electronic---House"],
//!   "activation": { "lo": 0.3, "hi": 1.0 },
//!   "rank_by": ["Electronic---House"],
//!   "tempo": { "lo": 118.0, "hi": 130.0 },
//!   "presence": "instrumental",
//!   "max_tracks": 50,
//!   "shuffle": true
//! }
//! ```

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Default activation range offered once genres are selected.
pub const DEFAULT_ACTIVATION: Range = Range { lo: 0.0, hi: 1.0 };
/// Conventional danceability control bounds.
pub const DANCEABILITY_BOUNDS: Range = Range { lo: 0.0, hi: 3.0 };
/// Conventional arousal control bounds.
pub const AROUSAL_BOUNDS: Range = Range { lo: 1.0, hi: 9.0 };
/// Conventional valence control bounds.
pub const VALENCE_BOUNDS: Range = Range { lo: 1.0, hi: 9.0 };

/// A track must have this much presence confidence to pass the voice/instrumental filter.
pub const PRESENCE_THRESHOLD: f64 = 0.5;

/// Closed interval `[lo, hi]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub lo: f64,
    pub hi: f64,
}

impl Range {
    #[must_use]
    pub const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    /// Inclusive on both ends. NaN is never contained.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lo && value <= self.hi
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lo, self.hi)
    }
}

/// Parses `lo:hi` or `lo,hi`.
impl FromStr for Range {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (lo, hi) = s
            .split_once(':')
            .or_else(|| s.split_once(','))
            .ok_or_else(|| anyhow!("Expected a range as LO:HI, got '{s}'"))?;
        let lo: f64 = lo
            .trim()
            .parse()
            .with_context(|| format!("Invalid lower bound '{lo}'"))?;
        let hi: f64 = hi
            .trim()
            .parse()
            .with_context(|| format!("Invalid upper bound '{hi}'"))?;
        if lo.is_nan() || hi.is_nan() {
            return Err(anyhow!("Range bounds must be numbers, got '{s}'"));
        }
        if lo > hi {
            return Err(anyhow!("Lower bound {lo} is greater than upper bound {hi}"));
        }
        Ok(Self { lo, hi })
    }
}

/// Which presence attribute a track must carry. Exactly one is always active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    #[default]
    Voice,
    Instrumental,
}

impl Presence {
    /// Feature column holding this attribute's confidence.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Voice => "voice",
            Self::Instrumental => "instrumental",
        }
    }
}

/// Snapshot of all filter and rank criteria for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParameters {
    /// Genre tags every returned track must be activated for.
    pub genres: Vec<String>,
    /// Activation range shared by all selected genres. Only the lower bound filters.
    pub activation: Option<Range>,
    /// Tags whose activations are multiplied into the rank score, in order.
    pub rank_by: Vec<String>,
    pub tempo: Option<Range>,
    pub presence: Presence,
    pub danceability: Option<Range>,
    pub arousal: Option<Range>,
    pub valence: Option<Range>,
    /// 0 keeps every track.
    pub max_tracks: usize,
    pub shuffle: bool,
}

impl FilterParameters {
    /// Load a snapshot from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read parameter file {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Invalid parameter file {}", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(content)?;
        for (name, range) in [
            ("activation", params.activation),
            ("tempo", params.tempo),
            ("danceability", params.danceability),
            ("arousal", params.arousal),
            ("valence", params.valence),
        ] {
            if let Some(range) = range {
                if range.lo > range.hi {
                    return Err(anyhow!("{name} range {range} has lower bound above upper bound"));
                }
            }
        }
        Ok(params)
    }

    /// The activation range in effect: the chosen one, or the full `[0, 1]`.
    #[must_use]
    pub fn activation_range(&self) -> Range {
        self.activation.unwrap_or(DEFAULT_ACTIVATION)
    }
}
