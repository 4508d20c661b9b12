//! # Playlist Export
//!
//! Writes the selected tracks as a plain playlist file (one path per line).
//! Track identifiers are relative to the collection root while the playlist
//! lives one directory below it, so every entry gets a leading `..`:
//!
//! ```text
//! collection/
//! ├── a/b.mp3
//! └── playlists/streamlit.m3u8   ->   ../a/b.mp3
//! ```
//!
//! The whole file is rendered in memory, written to a temporary file next to
//! the destination and then renamed over it, so a failed export never leaves a
//! half-written playlist behind. The replacement keeps the permissions of
//! the file it overwrites; a new playlist gets the usual umask-derived mode.

use crate::error::{CurateError, Result};
use log::{debug, info};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};

/// Rewrite a collection-relative track path so it resolves from the playlist directory.
///
/// Absolute identifiers are returned unchanged.
#[must_use]
pub fn rewrite_path(track: &str) -> String {
    Path::new("..").join(track).to_string_lossy().into_owned()
}

/// Playlist file contents: rewritten paths joined by `\n`, without a trailing newline.
#[must_use]
pub fn render<S: AsRef<str>>(tracks: &[S]) -> String {
    tracks
        .iter()
        .map(|track| rewrite_path(track.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Overwrite `destination` with the playlist for `tracks`.
///
/// # Errors
///
/// [`CurateError::Export`] if the destination directory is missing or not
/// writable, or the rename fails. The previous file (if any) is left intact.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
///
/// curate::playlist::export(&["a/b.mp3", "c/d.mp3"], Path::new("playlists/streamlit.m3u8"))?;
/// # Ok::<(), curate::CurateError>(())
/// ```
pub fn export<S: AsRef<str>>(tracks: &[S], destination: &Path) -> Result<()> {
    let contents = render(tracks);
    let directory = destination
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    debug!(
        "Writing {} playlist entries via temporary file in {}",
        tracks.len(),
        directory.display()
    );

    let mut file = create_temp(directory).map_err(|source| export_error(destination, source))?;
    if let Ok(existing) = fs::metadata(destination) {
        file.as_file()
            .set_permissions(existing.permissions())
            .map_err(|source| export_error(destination, source))?;
    }
    file.write_all(contents.as_bytes())
        .map_err(|source| export_error(destination, source))?;
    file.as_file()
        .sync_all()
        .map_err(|source| export_error(destination, source))?;
    file.persist(destination)
        .map_err(|err| export_error(destination, err.error))?;

    info!(
        "Wrote playlist with {} tracks to {}",
        tracks.len(),
        destination.display()
    );
    Ok(())
}

/// Temporary files default to owner-only access. Ask for 0666 instead and
/// let the process umask trim it, as a plain create would.
#[cfg(unix)]
fn create_temp(directory: &Path) -> std::io::Result<NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;

    Builder::new()
        .permissions(fs::Permissions::from_mode(0o666))
        .tempfile_in(directory)
}

#[cfg(not(unix))]
fn create_temp(directory: &Path) -> std::io::Result<NamedTempFile> {
    Builder::new().tempfile_in(directory)
}

fn export_error(destination: &Path, source: std::io::Error) -> CurateError {
    CurateError::Export {
        path: PathBuf::from(destination),
        source,
    }
}
