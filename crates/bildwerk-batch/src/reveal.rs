// SPDX-License-Identifier: MIT
//
// Best-effort opening of a folder in the platform file manager.

use std::path::Path;
use std::process::Command;

use tracing::{debug, warn};

#[cfg(target_os = "linux")]
const OPENERS: &[&[&str]] = &[&["xdg-open"], &["gio", "open"], &["nautilus"]];

#[cfg(target_os = "macos")]
const OPENERS: &[&[&str]] = &[&["open"]];

#[cfg(target_os = "windows")]
const OPENERS: &[&[&str]] = &[&["explorer"]];

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
const OPENERS: &[&[&str]] = &[];

/// Opens `path` in the platform file manager.
///
/// Tries each known opener in order and returns whether one was spawned.
/// Failure is never fatal; the caller only loses the convenience.
pub fn reveal_dir(path: &Path) -> bool {
    if !path.is_dir() {
        warn!(path = %path.display(), "not a directory, nothing to reveal");
        return false;
    }
    for opener in OPENERS {
        let (program, args) = (opener[0], &opener[1..]);
        match Command::new(program).args(args).arg(path).spawn() {
            Ok(_) => {
                debug!(program, path = %path.display(), "folder opened");
                return true;
            }
            Err(err) => {
                debug!(program, %err, "opener unavailable");
            }
        }
    }
    warn!(path = %path.display(), "no file manager opener available");
    false
}
