use std::ffi::OsString;
use std::path::Path;

use crate::config::DEFAULT_EXECUTABLE;
use crate::model::AlignmentParameters;

/// Builds the AreTomo argument list, executable first.
///
/// Optional flags are left out entirely when their parameter is absent or
/// disabled. Nothing is range checked here.
pub fn build_command(
    executable: Option<&Path>,
    tilt_series: &Path,
    tilt_angle_file: &Path,
    output_file: &Path,
    parameters: &AlignmentParameters,
) -> Vec<OsString> {
    let executable = executable.unwrap_or(Path::new(DEFAULT_EXECUTABLE));
    let mut command: Vec<OsString> = vec![
        executable.into(),
        "-InMrc".into(),
        tilt_series.into(),
        "-OutMrc".into(),
        output_file.into(),
        "-OutBin".into(),
        parameters.output_binning.to_string().into(),
        "-AngFile".into(),
        tilt_angle_file.into(),
        "-AlignZ".into(),
        parameters.thickness_for_alignment.to_string().into(),
        "-VolZ".into(),
        "0".into(),
        "-OutXF".into(),
        "1".into(),
    ];
    if let Some(angle) = parameters.nominal_rotation_angle {
        command.push("-TiltAxis".into());
        command.push(format_float(angle).into());
    }
    if parameters.local_alignments {
        let (patches_x, patches_y) = parameters.n_patches_xy;
        command.push("-Patch".into());
        command.push(patches_x.to_string().into());
        command.push(patches_y.to_string().into());
    }
    command
}

/// Formats a float for the command line, keeping one decimal on integral values.
///
/// Values are never written in exponent form: `1e16` becomes
/// `10000000000000000.0` and `1e-5` becomes `0.00001`. NaN prints as `NaN` and
/// infinities as `inf`/`-inf`. AreTomo parses either notation.
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Renders an argument list as a single line for logs and dry runs.
pub fn display_command(command: &[OsString]) -> String {
    command
        .iter()
        .map(|argument| argument.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}
