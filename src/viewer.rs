//! Opening rendered plots in the desktop viewer.

use std::path::Path;
use std::process::Command;

use crate::error::{Error, Result};

/// Open `path` with the platform's default application and wait for the
/// launcher to return.
pub fn open_in_viewer(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::Viewer(format!("{} does not exist", path.display())));
    }

    let mut command = viewer_command(path);
    tracing::debug!(?command, "launching viewer");

    let status = command
        .status()
        .map_err(|e| Error::Viewer(format!("Failed to run {:?}: {e}", command.get_program())))?;

    if !status.success() {
        return Err(Error::Viewer(format!(
            "{:?} exited with {status}",
            command.get_program()
        )));
    }
    Ok(())
}

#[cfg(target_os = "macos")]
fn viewer_command(path: &Path) -> Command {
    let mut command = Command::new("open");
    command.arg(path);
    command
}

#[cfg(target_os = "windows")]
fn viewer_command(path: &Path) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", ""]).arg(path);
    command
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn viewer_command(path: &Path) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(path);
    command
}
