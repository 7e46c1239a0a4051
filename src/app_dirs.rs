use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(PathBuf::from(home).join(".local").join("state").join("calmie"))
        } else {
            ProjectDirs::from("", "", "calmie").map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }

    /// Where the ambient track is looked up when none is configured
    pub fn default_track() -> Option<PathBuf> {
        ProjectDirs::from("", "", "calmie").map(|proj_dirs| proj_dirs.data_dir().join("ambient.mp3"))
    }
}
