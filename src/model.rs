use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Parameters forwarded to AreTomo for a single alignment run.
///
/// Values are passed through untouched; AreTomo is responsible for rejecting
/// anything it cannot work with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentParameters {
    /// Binning applied to the output volume (`-OutBin`).
    pub output_binning: u32,
    /// Nominal tilt axis angle in degrees (`-TiltAxis`), omitted when unknown.
    pub nominal_rotation_angle: Option<f64>,
    /// Whether patch-based local alignment is enabled (`-Patch`).
    pub local_alignments: bool,
    /// Patch grid dimensions in x and y used for local alignment.
    pub n_patches_xy: (u32, u32),
    /// Thickness of the volume used during alignment (`-AlignZ`).
    pub thickness_for_alignment: u32,
}

impl Default for AlignmentParameters {
    fn default() -> Self {
        Self {
            output_binning: 1,
            nominal_rotation_angle: None,
            local_alignments: false,
            n_patches_xy: (5, 4),
            thickness_for_alignment: 800,
        }
    }
}

/// Everything needed to stage and align one tilt series.
#[derive(Debug, Clone)]
pub struct AlignmentJob {
    /// Tilt series volume; linked, never modified.
    pub tilt_series: PathBuf,
    /// One angle per tilt, in tilt series order.
    pub tilt_angles: Vec<f64>,
    /// Directory receiving the staged files and AreTomo outputs.
    pub output_directory: PathBuf,
    /// Parameters forwarded to AreTomo.
    pub parameters: AlignmentParameters,
}

/// Files left in the output directory after a successful alignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentOutputs {
    /// Volume written by AreTomo.
    pub reconstruction: PathBuf,
    /// Aligned tilt angles, renamed to the staged tilt series stem.
    pub tilt_angles: PathBuf,
}
