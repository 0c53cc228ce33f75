use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info, instrument, warn};

use crate::command::{build_command, display_command};
use crate::config::AreTomoConfig;
use crate::error::{Result, ToolError};
use crate::model::{AlignmentJob, AlignmentOutputs, AlignmentParameters};
use crate::staging::{prepare_alignment_directory, tilt_series_stem};

/// Stages a tilt series and aligns it, leaving the renamed outputs in the job's directory.
#[instrument(
    level = "info",
    skip_all,
    fields(tilt_series = %job.tilt_series.display(), output = %job.output_directory.display())
)]
pub fn run_alignment_job(job: &AlignmentJob, config: &AreTomoConfig) -> Result<AlignmentOutputs> {
    let linked_tilt_series = prepare_alignment_directory(
        &job.tilt_series,
        &job.tilt_angles,
        &job.output_directory,
        config,
    )?;
    align_tilt_series(
        &linked_tilt_series,
        &job.output_directory,
        &job.parameters,
        config,
    )
}

/// Runs AreTomo on a staged tilt series and renames its aligned tilt angle file.
///
/// The tilt angle file is expected at `{output_directory}/{stem}.rawtlt`, as
/// written by [`prepare_alignment_directory`]. AreTomo's exit status is checked
/// before any output is touched.
#[instrument(
    level = "info",
    skip_all,
    fields(tilt_series = %tilt_series.display(), output = %output_directory.display())
)]
pub fn align_tilt_series(
    tilt_series: &Path,
    output_directory: &Path,
    parameters: &AlignmentParameters,
    config: &AreTomoConfig,
) -> Result<AlignmentOutputs> {
    let stem = tilt_series_stem(tilt_series)?;
    let tilt_angle_file = output_directory.join(config.tilt_angle_file_name(stem));
    let reconstruction = output_directory.join(&config.output_volume_name);

    let command = build_command(
        Some(config.executable.as_path()),
        tilt_series,
        &tilt_angle_file,
        &reconstruction,
        parameters,
    );
    run_external(&config.executable, &command[1..])?;

    let aligned = output_directory.join(config.aligned_tilt_file_name(stem));
    let tilt_angles = rename_aligned_tilt_file(&aligned, &config.aligned_suffix)?;
    info!(tilt_angles = %tilt_angles.display(), "alignment finished");
    Ok(AlignmentOutputs {
        reconstruction,
        tilt_angles,
    })
}

/// Renames `{stem}{suffix}.{ext}` to `{stem}.{ext}` in place and returns the new path.
///
/// A stem without the suffix is left as is.
pub fn rename_aligned_tilt_file(aligned: &Path, suffix: &str) -> Result<PathBuf> {
    if !aligned.is_file() {
        return Err(ToolError::MissingOutput(aligned.to_path_buf()));
    }
    let stem = aligned
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| ToolError::MissingOutput(aligned.to_path_buf()))?;
    let stripped = stem.strip_suffix(suffix).unwrap_or_else(|| {
        warn!(stem, suffix, "aligned file does not carry the expected suffix");
        stem
    });

    let mut file_name = OsString::from(stripped);
    if let Some(extension) = aligned.extension() {
        file_name.push(".");
        file_name.push(extension);
    }
    let renamed = aligned.with_file_name(file_name);
    fs::rename(aligned, &renamed)?;
    debug!(from = %aligned.display(), to = %renamed.display(), "renamed aligned tilt angles");
    Ok(renamed)
}

fn run_external(program: &Path, arguments: &[OsString]) -> Result<()> {
    let program_name = program.display().to_string();
    debug!(
        command = %format!("{program_name} {}", display_command(arguments)),
        "launching external aligner"
    );
    let status = Command::new(program)
        .args(arguments)
        .status()
        .map_err(|source| ToolError::Launch {
            program: program_name.clone(),
            source,
        })?;
    if !status.success() {
        return Err(ToolError::ExternalToolFailed {
            program: program_name,
            status,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn rename_strips_aligned_suffix() {
        let temp_dir = tempdir().expect("temporary directory");
        let aligned = temp_dir.path().join("foo_aln.tlt");
        fs::write(&aligned, "-60.01\n0.02\n").expect("aligned file written");

        let renamed = rename_aligned_tilt_file(&aligned, "_aln").expect("file renamed");

        assert_eq!(renamed, temp_dir.path().join("foo.tlt"));
        assert!(!aligned.exists());
        assert_eq!(
            fs::read_to_string(&renamed).expect("renamed file read"),
            "-60.01\n0.02\n"
        );
    }

    #[test]
    fn rename_reports_missing_output() {
        let temp_dir = tempdir().expect("temporary directory");
        let aligned = temp_dir.path().join("foo_aln.tlt");

        let error = rename_aligned_tilt_file(&aligned, "_aln").expect_err("rename should fail");

        assert!(matches!(error, ToolError::MissingOutput(path) if path == aligned));
    }

    #[test]
    fn missing_executable_is_a_launch_error() {
        let temp_dir = tempdir().expect("temporary directory");
        let config = AreTomoConfig::default()
            .with_executable(temp_dir.path().join("no-such-aretomo"));

        let error = align_tilt_series(
            &temp_dir.path().join("TS_01.mrc"),
            temp_dir.path(),
            &AlignmentParameters::default(),
            &config,
        )
        .expect_err("launch should fail");

        assert!(matches!(error, ToolError::Launch { .. }));
    }
}
