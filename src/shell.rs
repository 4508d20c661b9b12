//! Interactive session loop.
//!
//! Reads one command per line and dispatches it to the [`Session`]. Selection
//! and export failures are printed and the loop carries on; only I/O errors on
//! the session's own input/output end it.

use crate::cli::{split_line, ShellLine};
use crate::session::{self, render_report, Session};
use anyhow::Result;
use clap::Parser;
use log::{debug, info};
use std::io::{BufRead, Write};

const PROMPT: &str = "curate> ";

const HELP: &str = "\
Commands:
  [run] <flags> select and export, e.g. run --genre Jazz---Bebop --tempo 90:120 -n 20
  retry         write the last selection to the playlist again
  tags          list genre tags
  help          show this message
  quit          leave the session";

/// Run the interactive loop until `quit`, `exit` or end of input.
pub fn run_shell<R: BufRead, W: Write>(
    session: &Session,
    preview_count: usize,
    input: R,
    out: &mut W,
) -> Result<()> {
    info!("Interactive session started ({} tracks)", session.table().len());
    writeln!(out, "{HELP}")?;

    let mut last_selection: Option<Vec<&str>> = None;
    write!(out, "{PROMPT}")?;
    out.flush()?;

    for line in input.lines() {
        let line = line?;
        let trimmed = line.trim();
        debug!("Session input: {trimmed}");

        match trimmed {
            "" => {}
            "quit" | "exit" => break,
            "help" => writeln!(out, "{HELP}")?,
            "tags" => {
                for tag in session.table().genre_tags() {
                    writeln!(out, "{tag}")?;
                }
            }
            "retry" => match &last_selection {
                None => writeln!(out, "Nothing to retry yet.")?,
                Some(tracks) => match session.export(tracks) {
                    Ok(()) => writeln!(
                        out,
                        "Playlist: {} ({} tracks)",
                        session.playlist_path().display(),
                        tracks.len()
                    )?,
                    Err(err) => writeln!(out, "Error: {err}")?,
                },
            },
            _ => {
                let parsed = split_line(trimmed)
                    .and_then(|mut args| {
                        if args.first().is_some_and(|arg| arg == "run") {
                            args.remove(0);
                        }
                        ShellLine::try_parse_from(args).map_err(anyhow::Error::from)
                    })
                    .and_then(|line| {
                        let params = line.run.to_parameters()?;
                        Ok((params, line.run.verbose))
                    });
                match parsed {
                    Err(err) => writeln!(out, "{err:#}")?,
                    Ok((params, verbose)) => match session.on_run(&params) {
                        Ok(report) => {
                            render_report(&report, preview_count, verbose, out)?;
                            if let Err(err) = &report.export {
                                writeln!(out, "Error: {err}")?;
                                writeln!(out, "Selection kept; type `retry` to write it again.")?;
                            }
                            last_selection = Some(report.tracks);
                        }
                        Err(err) if session::is_recoverable(&err) => {
                            writeln!(out, "Error: {err}")?;
                        }
                        Err(err) => return Err(err.into()),
                    },
                }
            }
        }

        write!(out, "{PROMPT}")?;
        out.flush()?;
    }

    writeln!(out)?;
    info!("Interactive session ended");
    Ok(())
}
