use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Organise captured photos into folders.
#[derive(Debug, Parser)]
#[command(name = "photo-shelf", version, about)]
pub struct Cli {
    /// Catalog root directory (defaults to $PHOTO_SHELF_ROOT or the pictures directory).
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Preferences file remembering the selected folder.
    #[arg(long, global = true, value_name = "FILE")]
    pub prefs: Option<PathBuf>,

    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List folders, marking the selected one.
    Folders,
    /// Create a new folder.
    CreateFolder {
        name: String,
        /// Make the new folder the selected one.
        #[arg(long)]
        select: bool,
    },
    /// List photos of one folder, or of every folder when none is given.
    Photos {
        #[arg(long)]
        folder: Option<String>,
    },
    /// Show a single photo.
    Show { path: PathBuf },
    /// Delete a photo.
    Delete { path: PathBuf },
    /// Move a photo into another folder.
    Move { path: PathBuf, folder: String },
    /// Remember a folder as the capture destination.
    Select { folder: String },
    /// Store an image file as a new capture.
    Capture {
        /// Image file standing in for the camera frame.
        #[arg(long, value_name = "IMAGE")]
        from: PathBuf,
        /// Destination folder; defaults to the selected one.
        #[arg(long)]
        folder: Option<String>,
    },
    /// Print the path the next capture would be written to.
    Target {
        #[arg(long)]
        folder: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_follow_subcommands() {
        let cli =
            Cli::try_parse_from(["photo-shelf", "photos", "--folder", "Trips", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Command::Photos { folder: Some(ref name) } if name == "Trips"));
    }
}
