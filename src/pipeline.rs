//! # Selection Pipeline
//!
//! Reduces the feature table to an ordered list of track identifiers. Stages
//! run in a fixed order and each one narrows or reorders the working set:
//!
//! 1. genre activation (every selected tag at or above the activation floor)
//! 2. rank (stable sort by the product of the rank tags, descending)
//! 3. tempo range
//! 4. voice / instrumental presence
//! 5. danceability range
//! 6. arousal range
//! 7. valence range
//! 8. truncation to `max_tracks`
//! 9. shuffle
//!
//! Genre and rank tags are looked up by column name, so any feature column
//! works in either stage; only columns missing from the table are rejected.
//!
//! A stage whose parameter was never set is skipped. Only the upper bound of
//! the activation range is ignored: the genre stage filters on the lower bound
//! alone and that asymmetry is deliberate.
//!
//! Apart from the shuffle, `select` is a pure function of its inputs. The
//! shuffle draws from whatever [`Rng`] is passed to [`select_with_rng`].

use crate::error::Result;
use crate::params::{FilterParameters, Range, PRESENCE_THRESHOLD};
use crate::table::FeatureTable;
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Ordering;

/// Run the pipeline, shuffling (if requested) with the thread-local RNG.
///
/// # Errors
///
/// [`crate::CurateError::MissingAttribute`] when a selected tag or a required
/// feature column is absent from the table.
pub fn select<'t>(table: &'t FeatureTable, params: &FilterParameters) -> Result<Vec<&'t str>> {
    select_with_rng(table, params, &mut rand::thread_rng())
}

/// Run the pipeline with an explicit randomness source.
///
/// # Examples
///
/// ```
/// use curate::{pipeline, FeatureTable, FilterParameters, Range};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let csv = "path,tempo,voice,instrumental,danceability,arousal,valence\n\
///            t1.mp3,120,0.8,0.1,1.5,5,5\n\
///            t2.mp3,90,0.2,0.9,1.0,3,7\n";
/// let table = FeatureTable::from_reader(csv.as_bytes())?;
/// let params = FilterParameters {
///     tempo: Some(Range::new(100.0, 130.0)),
///     ..Default::default()
/// };
/// let mut rng = StdRng::seed_from_u64(7);
/// let tracks = pipeline::select_with_rng(&table, &params, &mut rng)?;
/// assert_eq!(tracks, vec!["t1.mp3"]);
/// # Ok::<(), curate::CurateError>(())
/// ```
pub fn select_with_rng<'t, R: Rng + ?Sized>(
    table: &'t FeatureTable,
    params: &FilterParameters,
    rng: &mut R,
) -> Result<Vec<&'t str>> {
    let rows = select_rows(table, params, rng)?;
    Ok(rows.into_iter().map(|row| table.track(row)).collect())
}

fn select_rows<R: Rng + ?Sized>(
    table: &FeatureTable,
    params: &FilterParameters,
    rng: &mut R,
) -> Result<Vec<usize>> {
    let mut rows: Vec<usize> = (0..table.len()).collect();
    debug!("Starting selection with {} tracks", rows.len());

    if !params.genres.is_empty() {
        let floor = params.activation_range().lo;
        rows = filter_genres(table, rows, &params.genres, floor)?;
        log_stage("genre", &rows);
    }

    if !params.rank_by.is_empty() {
        rows = rank(table, rows, &params.rank_by)?;
        log_stage("rank", &rows);
    }

    if let Some(range) = params.tempo {
        rows = filter_range(table, rows, "tempo", range)?;
        log_stage("tempo", &rows);
    }

    let presence = table.column_index(params.presence.column())?;
    rows.retain(|&row| table.value(row, presence) >= PRESENCE_THRESHOLD);
    log_stage(params.presence.column(), &rows);

    for (column, range) in [
        ("danceability", params.danceability),
        ("arousal", params.arousal),
        ("valence", params.valence),
    ] {
        if let Some(range) = range {
            rows = filter_range(table, rows, column, range)?;
            log_stage(column, &rows);
        }
    }

    if params.max_tracks > 0 {
        rows.truncate(params.max_tracks);
        log_stage("truncate", &rows);
    }

    if params.shuffle {
        rows.shuffle(rng);
        debug!("shuffle: reordered {} tracks", rows.len());
    }

    Ok(rows)
}

fn log_stage(stage: &str, rows: &[usize]) {
    debug!("{stage}: {} tracks remain", rows.len());
}

/// Keep rows where every tag's activation is at least `floor`.
fn filter_genres(
    table: &FeatureTable,
    mut rows: Vec<usize>,
    genres: &[String],
    floor: f64,
) -> Result<Vec<usize>> {
    let columns = genres
        .iter()
        .map(|tag| table.column_index(tag))
        .collect::<Result<Vec<_>>>()?;
    rows.retain(|&row| columns.iter().all(|&col| table.value(row, col) >= floor));
    Ok(rows)
}

/// Keep rows whose `column` value lies in the closed `range`.
fn filter_range(
    table: &FeatureTable,
    mut rows: Vec<usize>,
    column: &str,
    range: Range,
) -> Result<Vec<usize>> {
    let col = table.column_index(column)?;
    rows.retain(|&row| range.contains(table.value(row, col)));
    Ok(rows)
}

/// Stable sort by composite score, highest first. NaN scores sink to the end.
fn rank(table: &FeatureTable, rows: Vec<usize>, tags: &[String]) -> Result<Vec<usize>> {
    let columns = tags
        .iter()
        .map(|tag| table.column_index(tag))
        .collect::<Result<Vec<_>>>()?;

    let mut scored: Vec<(usize, f64)> = rows
        .into_iter()
        .map(|row| (row, composite_score(table, row, &columns)))
        .collect();
    scored.sort_by(|(_, a), (_, b)| descending(*a, *b));
    Ok(scored.into_iter().map(|(row, _)| row).collect())
}

fn composite_score(table: &FeatureTable, row: usize, columns: &[usize]) -> f64 {
    let mut columns = columns.iter();
    let Some(&first) = columns.next() else {
        return 1.0;
    };
    columns.fold(table.value(row, first), |score, &col| {
        score * table.value(row, col)
    })
}

fn descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Composite rank score for each of `tracks`, in the same order.
///
/// Tracks not present in the table score NaN.
pub fn rank_scores(table: &FeatureTable, tracks: &[&str], tags: &[String]) -> Result<Vec<f64>> {
    let columns = tags
        .iter()
        .map(|tag| table.column_index(tag))
        .collect::<Result<Vec<_>>>()?;
    Ok(tracks
        .iter()
        .map(|track| {
            table
                .row_of(track)
                .map_or(f64::NAN, |row| composite_score(table, row, &columns))
        })
        .collect())
}
