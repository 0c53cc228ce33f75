//! Core library for the lil-aretomo command line application.
//!
//! The library wraps the external AreTomo tilt-series aligner. Staging of the
//! working directory lives in [`staging`], argument assembly in [`command`],
//! the subprocess run and output renaming in [`align`], and the small helpers
//! for binning selection and installation probing in [`binning`] and
//! [`probe`]. Naming conventions are collected in [`config`] so tests can swap
//! in a stand-in executable.

pub mod align;
pub mod binning;
pub mod command;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod probe;
pub mod staging;

pub use align::{align_tilt_series, rename_aligned_tilt_file, run_alignment_job};
pub use binning::find_binning_factor;
pub use command::build_command;
pub use config::AreTomoConfig;
pub use error::{Result, ToolError};
pub use model::{AlignmentJob, AlignmentOutputs, AlignmentParameters};
pub use probe::check_aretomo_availability;
pub use staging::prepare_alignment_directory;
