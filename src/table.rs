//! # Feature Table Module
//!
//! The feature table holds one row of precomputed audio features per track,
//! keyed by the track's path relative to the collection root. It is loaded
//! once per session from a comma-separated file and then only ever read.
//!
//! ## File Layout
//!
//! ```text
//! path,tempo,voice,instrumental,danceability,arousal,valence,key,Jazz---Bebop,Rock---Punk,loudness
//! a/b.mp3,120.0,0.8,0.2,1.5,5.0,5.0,3,0.71,0.02,-9.1
//! ```
//!
//! The first cell of each row is the track identifier. Of the remaining
//! (feature) columns, the first seven and the last one carry scalar features;
//! every column in between is a genre activation. The data producer is
//! responsible for honouring that positional layout.

use crate::error::{CurateError, Result};
use log::{debug, info};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Number of leading feature columns that are not genre activations.
pub const GENRE_COLUMN_OFFSET: usize = 7;

/// Immutable in-memory feature table.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    id_column: String,
    columns: Vec<String>,
    index: HashMap<String, usize>,
    positions: HashMap<String, usize>,
    tracks: Vec<String>,
    rows: Vec<Vec<f64>>,
}

/// Activation summary for one genre tag, shown by `curate tags`.
#[derive(Debug, Clone, PartialEq)]
pub struct TagStatistics {
    pub tag: String,
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}

impl FeatureTable {
    /// Load the table from a CSV file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`CurateError::Io`] if the file cannot be opened and
    /// [`CurateError::TableFormat`] if its contents are malformed.
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading feature table from {}", path.display());
        let file = std::fs::File::open(path)?;
        let table = Self::from_reader(file)?;
        info!(
            "Loaded {} tracks with {} feature columns ({} genre tags)",
            table.len(),
            table.columns.len(),
            table.genre_tags().len()
        );
        Ok(table)
    }

    /// Parse a table from any CSV source.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers().map_err(|e| format_error(&e))?.clone();
        let mut header_iter = headers.iter();
        let id_column = header_iter
            .next()
            .ok_or_else(|| CurateError::TableFormat {
                line: 1,
                message: "missing header row".to_string(),
            })?
            .to_string();
        let columns: Vec<String> = header_iter.map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record.map_err(|e| format_error(&e))?;
            let line = record.position().map_or(0, csv::Position::line);
            let mut cells = record.iter();
            let track = cells.next().unwrap_or_default().to_string();
            let values = cells
                .map(|cell| parse_cell(cell, line))
                .collect::<Result<Vec<f64>>>()?;
            rows.push((line, track, values));
        }

        Self::build(id_column, columns, rows)
    }

    /// Build a table from already-parsed rows.
    ///
    /// Errors number the rows as if they came from a file with one header
    /// line and no blank lines.
    ///
    /// # Errors
    ///
    /// Fails on duplicate column names, duplicate track identifiers and rows
    /// whose length does not match the column count.
    pub fn from_rows(
        id_column: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<(String, Vec<f64>)>,
    ) -> Result<Self> {
        let numbered = rows
            .into_iter()
            .zip(2u64..)
            .map(|((track, cells), line)| (line, track, cells))
            .collect();
        Self::build(id_column.into(), columns, numbered)
    }

    /// Rows carry the source line they were read from, for error messages.
    fn build(
        id_column: String,
        columns: Vec<String>,
        rows: Vec<(u64, String, Vec<f64>)>,
    ) -> Result<Self> {
        let mut index = HashMap::with_capacity(columns.len());
        for (position, name) in columns.iter().enumerate() {
            if index.insert(name.clone(), position).is_some() {
                return Err(CurateError::TableFormat {
                    line: 1,
                    message: format!("duplicate column '{name}'"),
                });
            }
        }

        let mut positions = HashMap::with_capacity(rows.len());
        let mut lines = Vec::with_capacity(rows.len());
        let mut tracks = Vec::with_capacity(rows.len());
        let mut values = Vec::with_capacity(rows.len());
        for (row, (line, track, cells)) in rows.into_iter().enumerate() {
            if cells.len() != columns.len() {
                return Err(CurateError::TableFormat {
                    line,
                    message: format!(
                        "expected {} feature values for '{track}', found {}",
                        columns.len(),
                        cells.len()
                    ),
                });
            }
            if let Some(first) = positions.insert(track.clone(), row) {
                return Err(CurateError::TableFormat {
                    line,
                    message: format!(
                        "duplicate track '{track}' (first seen on line {})",
                        lines[first]
                    ),
                });
            }
            lines.push(line);
            tracks.push(track);
            values.push(cells);
        }

        debug!("Indexed {} tracks", tracks.len());
        Ok(Self {
            id_column,
            columns,
            index,
            positions,
            tracks,
            rows: values,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Name of the identifier column from the header row.
    #[must_use]
    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    /// Feature column names, identifier column excluded.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Track identifiers in load order.
    #[must_use]
    pub fn tracks(&self) -> &[String] {
        &self.tracks
    }

    #[must_use]
    pub fn track(&self, row: usize) -> &str {
        &self.tracks[row]
    }

    /// Genre activation columns: everything between the seven leading
    /// scalar features and the trailing one.
    #[must_use]
    pub fn genre_tags(&self) -> &[String] {
        let end = self.columns.len().saturating_sub(1);
        if end <= GENRE_COLUMN_OFFSET {
            return &[];
        }
        &self.columns[GENRE_COLUMN_OFFSET..end]
    }

    /// Position of a feature column.
    ///
    /// # Errors
    ///
    /// [`CurateError::MissingAttribute`] if no such column exists.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| CurateError::missing(name))
    }

    /// Raw cell access by row and column position.
    #[must_use]
    pub fn value(&self, row: usize, column: usize) -> f64 {
        self.rows[row][column]
    }

    /// Row position of a track identifier.
    #[must_use]
    pub fn row_of(&self, track: &str) -> Option<usize> {
        self.positions.get(track).copied()
    }

    /// Cell access by track identifier and column name.
    ///
    /// `Ok(None)` means the column exists but the track does not.
    pub fn value_of(&self, track: &str, column: &str) -> Result<Option<f64>> {
        let column = self.column_index(column)?;
        Ok(self.row_of(track).map(|row| self.value(row, column)))
    }

    /// Tempo range of the whole collection, rounded to two decimals.
    ///
    /// Returns `None` for an empty table.
    pub fn tempo_bounds(&self) -> Result<Option<(f64, f64)>> {
        let tempo = self.column_index("tempo")?;
        let bounds = self
            .rows
            .iter()
            .map(|row| row[tempo])
            .filter(|v| !v.is_nan())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            });
        Ok(bounds.map(|(lo, hi)| (round2(lo), round2(hi))))
    }

    /// Min/mean/max activation for every genre tag. NaN cells are skipped.
    #[must_use]
    pub fn tag_statistics(&self) -> Vec<TagStatistics> {
        self.genre_tags()
            .iter()
            .map(|tag| {
                let column = self.index[tag];
                let values: Vec<f64> = self
                    .rows
                    .iter()
                    .map(|row| row[column])
                    .filter(|v| !v.is_nan())
                    .collect();
                #[allow(clippy::cast_precision_loss)]
                let mean = if values.is_empty() {
                    f64::NAN
                } else {
                    values.iter().sum::<f64>() / values.len() as f64
                };
                TagStatistics {
                    tag: tag.clone(),
                    min: values.iter().copied().fold(f64::NAN, f64::min),
                    mean,
                    max: values.iter().copied().fold(f64::NAN, f64::max),
                }
            })
            .collect()
    }
}

fn parse_cell(cell: &str, line: u64) -> Result<f64> {
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return Ok(f64::NAN);
    }
    cell.parse::<f64>().map_err(|_| CurateError::TableFormat {
        line,
        message: format!("'{cell}' is not a number"),
    })
}

fn format_error(err: &csv::Error) -> CurateError {
    CurateError::TableFormat {
        line: err.position().map_or(0, csv::Position::line),
        message: err.to_string(),
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
path,tempo,voice,instrumental,danceability,arousal,valence,key,Jazz---Bebop,Rock---Punk,loudness
a/one.mp3,120.123,0.8,0.2,1.5,5,5,3,0.7,0.1,-9
a/two.mp3,90.456,0.2,0.9,1.0,3,7,5,0.2,0.6,-7
b/three.mp3,101,,0.5,2.0,4,4,1,nan,0.3,-8
";

    fn sample() -> FeatureTable {
        FeatureTable::from_reader(SAMPLE.as_bytes()).expect("sample table should load")
    }

    #[test]
    fn test_load_preserves_row_order() {
        let table = sample();
        assert_eq!(table.len(), 3);
        assert_eq!(table.id_column(), "path");
        assert_eq!(table.tracks(), &["a/one.mp3", "a/two.mp3", "b/three.mp3"]);
    }

    #[test]
    fn test_genre_tags_use_positional_layout() {
        let table = sample();
        assert_eq!(table.genre_tags(), &["Jazz---Bebop", "Rock---Punk"]);
    }

    #[test]
    fn test_narrow_table_has_no_genre_tags() {
        let table = FeatureTable::from_reader("path,tempo,voice\nx.mp3,100,0.5\n".as_bytes())
            .expect("narrow table should load");
        assert!(table.genre_tags().is_empty());
    }

    #[test]
    fn test_empty_and_nan_cells_load_as_nan() {
        let table = sample();
        let voice = table.value_of("b/three.mp3", "voice").unwrap().unwrap();
        let bebop = table.value_of("b/three.mp3", "Jazz---Bebop").unwrap().unwrap();
        assert!(voice.is_nan());
        assert!(bebop.is_nan());
    }

    #[test]
    fn test_unknown_column_is_missing_attribute() {
        let table = sample();
        let err = table.column_index("Polka").unwrap_err();
        assert!(matches!(err, CurateError::MissingAttribute { ref column } if column == "Polka"));
    }

    #[test]
    fn test_duplicate_track_is_rejected() {
        let data = "path,tempo\nx.mp3,100\nx.mp3,110\n";
        let err = FeatureTable::from_reader(data.as_bytes()).unwrap_err();
        match err {
            CurateError::TableFormat { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("duplicate track"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_track_reports_reader_line_after_multiline_field() {
        let data = "path,tempo\n\"Artist\nLive.mp3\",100\nz.mp3,105\nz.mp3,110\n";
        let err = FeatureTable::from_reader(data.as_bytes()).unwrap_err();
        match err {
            CurateError::TableFormat { line, message } => {
                assert_eq!(line, 5);
                assert!(message.contains("first seen on line 4"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_rows_numbers_rows_after_header() {
        let rows = vec![
            ("x.mp3".to_string(), vec![100.0]),
            ("x.mp3".to_string(), vec![110.0]),
        ];
        let err = FeatureTable::from_rows("path", vec!["tempo".to_string()], rows).unwrap_err();
        assert!(matches!(err, CurateError::TableFormat { line: 3, .. }));
    }

    #[test]
    fn test_unparsable_number_is_rejected() {
        let data = "path,tempo\nx.mp3,fast\n";
        let err = FeatureTable::from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, CurateError::TableFormat { line: 2, .. }));
    }

    #[test]
    fn test_short_row_is_rejected() {
        let data = "path,tempo,voice\nx.mp3,100\n";
        assert!(FeatureTable::from_reader(data.as_bytes()).is_err());
    }

    #[test]
    fn test_tempo_bounds_are_rounded() {
        let table = sample();
        assert_eq!(table.tempo_bounds().unwrap(), Some((90.46, 120.12)));
    }

    #[test]
    fn test_tag_statistics_skip_nan() {
        let table = sample();
        let stats = table.tag_statistics();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].tag, "Jazz---Bebop");
        assert!((stats[0].min - 0.2).abs() < 1e-9);
        assert!((stats[0].max - 0.7).abs() < 1e-9);
        assert!((stats[0].mean - 0.45).abs() < 1e-9);
    }
}
