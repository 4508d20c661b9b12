//! # Command-Line Interface Module
//!
//! Clap definitions for the `curate` binary. The `run` flags stand in for the
//! interactive controls: each flag maps onto one field of
//! [`FilterParameters`], and a flag that is not given leaves its filter stage
//! disengaged.
//!
//! ## Examples
//!
//! ```bash
//! curate tags
//! curate run --genre "Jazz---Bebop" --activation 0.3:1 --rank "Jazz---Bebop" --tempo 100:140
//! curate run --params party.json --shuffle --max-tracks 40
//! curate shell
//! ```

use crate::params::{FilterParameters, Presence, Range};
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

/// Main application arguments structure.
#[derive(Parser)]
#[command(name = "curate")]
#[command(about = "Curate: filter, rank and export playlists from precomputed audio features")]
#[command(version)]
pub struct Args {
    /// Feature table CSV (overrides the config file)
    #[arg(long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub table: Option<PathBuf>,

    /// Playlist file to write (overrides the config file)
    #[arg(long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub playlist: Option<PathBuf>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Select tracks, write the playlist and preview the result
    Run(RunArgs),

    /// List genre tags with activation statistics
    Tags,

    /// Interactive session: the table is loaded once, every line is a `run`
    ///
    /// Type `run` flags on each line, with or without the leading word `run`
    /// (e.g. `--genre Jazz --tempo 90:120`),
    /// `retry` to re-export the last selection, `tags` to list tags, and
    /// `quit` to leave.
    Shell,

    /// Generate shell completions
    ///
    /// Usage: curate completion bash > ~/.local/share/bash-completion/completions/curate
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Filter and rank criteria for one run.
#[derive(clap::Args, Debug, Clone, Default, PartialEq)]
pub struct RunArgs {
    /// Genre tag every track must be activated for (repeatable)
    ///
    /// Normally one of the tags listed by `curate tags`, but any feature
    /// column is accepted: `--genre key` keeps tracks whose `key` is at least
    /// the activation floor. Unknown columns are an error.
    #[arg(short = 'g', long = "genre", value_name = "TAG")]
    pub genres: Vec<String>,

    /// Activation range for the selected genres; only LO is enforced [default: 0:1]
    #[arg(long, value_name = "LO:HI")]
    pub activation: Option<Range>,

    /// Rank by the product of these tags, in the given order (repeatable)
    ///
    /// Any feature column may be used, not only genre tags.
    #[arg(short = 'r', long = "rank", value_name = "TAG")]
    pub rank_by: Vec<String>,

    /// Tempo range in BPM
    #[arg(long, value_name = "LO:HI")]
    pub tempo: Option<Range>,

    /// Keep vocal tracks (the default)
    #[arg(long, conflicts_with = "instrumental")]
    pub voice: bool,

    /// Keep instrumental tracks instead of vocal ones
    #[arg(long)]
    pub instrumental: bool,

    /// Danceability range (control scale 0 to 3)
    #[arg(long, value_name = "LO:HI")]
    pub danceability: Option<Range>,

    /// Arousal range (control scale 1 to 9)
    #[arg(long, value_name = "LO:HI")]
    pub arousal: Option<Range>,

    /// Valence range (control scale 1 to 9)
    #[arg(long, value_name = "LO:HI")]
    pub valence: Option<Range>,

    /// Maximum number of tracks (0 for all)
    #[arg(short = 'n', long, value_name = "N")]
    pub max_tracks: Option<usize>,

    /// Randomly shuffle the final selection
    #[arg(short, long)]
    pub shuffle: bool,

    /// Start from a JSON parameter snapshot; other flags override it
    #[arg(long, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub params: Option<PathBuf>,

    /// Show rank scores next to previewed tracks
    #[arg(short, long)]
    pub verbose: bool,
}

impl RunArgs {
    /// Build the parameter snapshot for this run.
    pub fn to_parameters(&self) -> Result<FilterParameters> {
        let mut params = match &self.params {
            Some(path) => FilterParameters::from_json_file(path)?,
            None => FilterParameters::default(),
        };

        if !self.genres.is_empty() {
            params.genres.clone_from(&self.genres);
        }
        if !self.rank_by.is_empty() {
            params.rank_by.clone_from(&self.rank_by);
        }
        if self.instrumental {
            params.presence = Presence::Instrumental;
        } else if self.voice {
            params.presence = Presence::Voice;
        }
        if let Some(max) = self.max_tracks {
            params.max_tracks = max;
        }
        params.shuffle |= self.shuffle;

        for (slot, flag) in [
            (&mut params.activation, self.activation),
            (&mut params.tempo, self.tempo),
            (&mut params.danceability, self.danceability),
            (&mut params.arousal, self.arousal),
            (&mut params.valence, self.valence),
        ] {
            if flag.is_some() {
                *slot = flag;
            }
        }

        Ok(params)
    }
}

/// One line of input in the interactive session.
#[derive(Parser, Debug)]
#[command(name = "run", no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(flatten)]
    pub run: RunArgs,
}

/// Split a shell line into arguments, honouring single and double quotes.
///
/// Genre tags may contain spaces (`"Electronic---Drum n Bass"`).
pub fn split_line(line: &str) -> Result<Vec<String>> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_word = false;

    for c in line.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    args.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(anyhow!("Unterminated {q} quote"));
    }
    if in_word {
        args.push(current);
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_run_flags_map_to_parameters() {
        let args = Args::try_parse_from([
            "curate",
            "run",
            "--genre",
            "Jazz",
            "-g",
            "Rock",
            "--activation",
            "0.3:0.9",
            "--rank",
            "Rock",
            "--tempo",
            "100:130",
            "--instrumental",
            "-n",
            "20",
            "--shuffle",
        ])
        .unwrap();
        let Command::Run(run) = args.command else {
            panic!("expected run command");
        };
        let params = run.to_parameters().unwrap();

        assert_eq!(params.genres, vec!["Jazz", "Rock"]);
        assert_eq!(params.activation, Some(Range::new(0.3, 0.9)));
        assert_eq!(params.rank_by, vec!["Rock"]);
        assert_eq!(params.tempo, Some(Range::new(100.0, 130.0)));
        assert_eq!(params.presence, Presence::Instrumental);
        assert_eq!(params.max_tracks, 20);
        assert!(params.shuffle);
        assert!(params.valence.is_none());
    }

    #[test]
    fn test_voice_and_instrumental_conflict() {
        assert!(Args::try_parse_from(["curate", "run", "--voice", "--instrumental"]).is_err());
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        assert!(Args::try_parse_from(["curate", "run", "--tempo", "130:100"]).is_err());
    }

    #[test]
    fn test_flags_override_params_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("params.json");
        std::fs::write(
            &path,
            r#"{"genres": ["Jazz"], "tempo": {"lo": 60, "hi": 90}, "max_tracks": 5, "presence": "instrumental"}"#,
        )
        .unwrap();

        let run = RunArgs {
            params: Some(path),
            tempo: Some(Range::new(100.0, 120.0)),
            voice: true,
            ..RunArgs::default()
        };
        let params = run.to_parameters().unwrap();
        assert_eq!(params.genres, vec!["Jazz"]);
        assert_eq!(params.tempo, Some(Range::new(100.0, 120.0)));
        assert_eq!(params.max_tracks, 5);
        assert_eq!(params.presence, Presence::Voice);
    }

    #[test]
    fn test_shell_line_parses_without_binary_name() {
        let line = ShellLine::try_parse_from(["--genre", "Jazz", "--shuffle"]).unwrap();
        assert_eq!(line.run.genres, vec!["Jazz"]);
        assert!(line.run.shuffle);
    }

    #[test]
    fn test_split_line_handles_quotes() {
        let args = split_line(r#"--genre "Electronic---Drum n Bass"  -g 'Jazz---Bebop' -n 5"#).unwrap();
        assert_eq!(
            args,
            vec!["--genre", "Electronic---Drum n Bass", "-g", "Jazz---Bebop", "-n", "5"]
        );
        assert_eq!(split_line(r#"--genre """#).unwrap(), vec!["--genre", ""]);
        assert!(split_line(r#"--genre "Jazz"#).is_err());
    }
}
