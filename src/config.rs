use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Name of the AreTomo executable looked up on `PATH` by default.
pub const DEFAULT_EXECUTABLE: &str = "AreTomo";

/// File naming conventions and the executable used for an alignment run.
///
/// Every field has a default matching what AreTomo produces out of the box,
/// so a configuration file only needs to list the values it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AreTomoConfig {
    /// Executable name or path handed to the process launcher.
    pub executable: PathBuf,
    /// File name of the volume AreTomo writes into the output directory.
    pub output_volume_name: String,
    /// Extension given to the symlinked tilt series.
    pub volume_extension: String,
    /// Extension of the tilt angle file written during staging.
    pub tilt_angle_extension: String,
    /// Suffix AreTomo appends to the stem of its aligned tilt angle file.
    pub aligned_suffix: String,
    /// Extension of the aligned tilt angle file.
    pub aligned_tilt_extension: String,
}

impl Default for AreTomoConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from(DEFAULT_EXECUTABLE),
            output_volume_name: "reconstruction.mrc".to_owned(),
            volume_extension: "mrc".to_owned(),
            tilt_angle_extension: "rawtlt".to_owned(),
            aligned_suffix: "_aln".to_owned(),
            aligned_tilt_extension: "tlt".to_owned(),
        }
    }
}

impl AreTomoConfig {
    /// Loads a configuration from a JSON file, filling unspecified fields with defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Returns a copy of the configuration that launches `executable` instead.
    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = executable.into();
        self
    }

    /// Name of the tilt series link inside the output directory.
    pub fn linked_volume_name(&self, stem: &str) -> String {
        format!("{stem}.{}", self.volume_extension)
    }

    /// Name of the tilt angle file written during staging.
    pub fn tilt_angle_file_name(&self, stem: &str) -> String {
        format!("{stem}.{}", self.tilt_angle_extension)
    }

    /// Name AreTomo gives its aligned tilt angle file before renaming.
    pub fn aligned_tilt_file_name(&self, stem: &str) -> String {
        format!(
            "{stem}{}.{}",
            self.aligned_suffix, self.aligned_tilt_extension
        )
    }
}
