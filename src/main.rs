use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use lil_aretomo::command::{build_command, display_command};
use lil_aretomo::staging::{self, read_tilt_angles, tilt_series_stem};
use lil_aretomo::{
    AlignmentJob, AlignmentParameters, AreTomoConfig, Result, ToolError, find_binning_factor,
    logging, probe, run_alignment_job,
};
use tracing::info;

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(error) = logging::init_logging(cli.verbose) {
        eprintln!("error: {error}");
        return ExitCode::FAILURE;
    }
    match run(cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Command::Prepare(args) => execute_prepare(args),
        Command::Align(args) => execute_align(args),
        Command::Command(args) => execute_command(args),
        Command::Binning(args) => {
            println!(
                "{}",
                find_binning_factor(args.pixel_size, args.target_pixel_size)
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::Check(args) => Ok(execute_check(&args)),
    }
}

fn execute_check(args: &CheckArgs) -> ExitCode {
    if probe::is_available(&args.executable) {
        println!("{} is available", args.executable);
        ExitCode::SUCCESS
    } else {
        println!("{} was not found on PATH", args.executable);
        ExitCode::FAILURE
    }
}

fn execute_prepare(args: StageArgs) -> Result<ExitCode> {
    let config = load_config(None)?;
    let tilt_angles = load_tilt_angles(&args.angles)?;
    let link = staging::prepare_alignment_directory(
        &args.tilt_series,
        &tilt_angles,
        &args.output_dir,
        &config,
    )?;
    println!("{}", link.display());
    Ok(ExitCode::SUCCESS)
}

fn execute_align(args: AlignArgs) -> Result<ExitCode> {
    let config = args.options.resolve_config()?;
    let job = AlignmentJob {
        tilt_series: args.stage.tilt_series.clone(),
        tilt_angles: load_tilt_angles(&args.stage.angles)?,
        output_directory: args.stage.output_dir.clone(),
        parameters: args.options.resolve_parameters()?,
    };
    let outputs = run_alignment_job(&job, &config)?;
    info!(
        reconstruction = %outputs.reconstruction.display(),
        tilt_angles = %outputs.tilt_angles.display(),
        "outputs written"
    );
    Ok(ExitCode::SUCCESS)
}

fn execute_command(args: CommandArgs) -> Result<ExitCode> {
    let config = args.options.resolve_config()?;
    let parameters = args.options.resolve_parameters()?;
    let stem = tilt_series_stem(&args.tilt_series)?;
    let command = build_command(
        Some(config.executable.as_path()),
        &args.output_dir.join(config.linked_volume_name(stem)),
        &args.output_dir.join(config.tilt_angle_file_name(stem)),
        &args.output_dir.join(&config.output_volume_name),
        &parameters,
    );
    println!("{}", display_command(&command));
    Ok(ExitCode::SUCCESS)
}

fn load_tilt_angles(path: &Path) -> Result<Vec<f64>> {
    if !path.exists() {
        return Err(ToolError::MissingInput(path.to_path_buf()));
    }
    read_tilt_angles(path)
}

fn load_config(path: Option<&Path>) -> Result<AreTomoConfig> {
    match path {
        Some(path) if !path.exists() => Err(ToolError::MissingInput(path.to_path_buf())),
        Some(path) => AreTomoConfig::load(path),
        None => Ok(AreTomoConfig::default()),
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Stage, run, and tidy up AreTomo tilt-series alignments."
)]
struct Cli {
    /// Log debug output, including the assembled AreTomo command line.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Link a tilt series into a working directory and write its tilt angles.
    Prepare(StageArgs),
    /// Stage a tilt series, run AreTomo on it, and rename its outputs.
    Align(AlignArgs),
    /// Print the AreTomo command line for a staged tilt series without running it.
    Command(CommandArgs),
    /// Pick the power-of-two binning closest to a target pixel size.
    Binning(BinningArgs),
    /// Check whether AreTomo is installed on PATH.
    Check(CheckArgs),
}

#[derive(clap::Args)]
struct StageArgs {
    /// Tilt series volume to align.
    #[arg(long)]
    tilt_series: PathBuf,

    /// Text file with one tilt angle per tilt, in tilt series order.
    #[arg(long)]
    angles: PathBuf,

    /// Working directory receiving the staged files and AreTomo outputs.
    #[arg(long)]
    output_dir: PathBuf,
}

#[derive(clap::Args)]
struct AlignArgs {
    #[command(flatten)]
    stage: StageArgs,

    #[command(flatten)]
    options: AlignmentOptions,
}

#[derive(clap::Args)]
struct CommandArgs {
    /// Tilt series the command is built for.
    #[arg(long)]
    tilt_series: PathBuf,

    /// Working directory the tilt series was staged into.
    #[arg(long)]
    output_dir: PathBuf,

    #[command(flatten)]
    options: AlignmentOptions,
}

#[derive(clap::Args)]
struct AlignmentOptions {
    /// JSON file with alignment parameters; flags below override its values.
    #[arg(long)]
    params: Option<PathBuf>,

    /// JSON file overriding the executable and output file naming.
    #[arg(long)]
    config: Option<PathBuf>,

    /// AreTomo executable to run instead of the configured one.
    #[arg(long)]
    executable: Option<PathBuf>,

    /// Binning of the output volume.
    #[arg(long, conflicts_with_all = ["pixel_size", "target_pixel_size"])]
    output_binning: Option<u32>,

    /// Pixel size of the tilt series, used with --target-pixel-size to pick a binning.
    #[arg(long, requires = "target_pixel_size")]
    pixel_size: Option<f64>,

    /// Desired pixel size of the output volume.
    #[arg(long, requires = "pixel_size")]
    target_pixel_size: Option<f64>,

    /// Nominal tilt axis angle in degrees.
    #[arg(long, allow_negative_numbers = true)]
    tilt_axis: Option<f64>,

    /// Enable or disable patch-based local alignment; the bare flag enables it.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    local_alignments: Option<bool>,

    /// Patch grid used for local alignment.
    #[arg(long, num_args = 2, value_names = ["NX", "NY"])]
    patches: Option<Vec<u32>>,

    /// Thickness used during alignment, in pixels.
    #[arg(long)]
    alignment_thickness: Option<u32>,
}

impl AlignmentOptions {
    fn resolve_config(&self) -> Result<AreTomoConfig> {
        let config = load_config(self.config.as_deref())?;
        Ok(match &self.executable {
            Some(executable) => config.with_executable(executable),
            None => config,
        })
    }

    fn resolve_parameters(&self) -> Result<AlignmentParameters> {
        let mut parameters: AlignmentParameters = match &self.params {
            Some(path) if !path.exists() => return Err(ToolError::MissingInput(path.clone())),
            Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
            None => AlignmentParameters::default(),
        };

        if let Some(binning) = self.output_binning {
            parameters.output_binning = binning;
        }
        if let (Some(pixel_size), Some(target)) = (self.pixel_size, self.target_pixel_size) {
            parameters.output_binning = find_binning_factor(pixel_size, target);
        }
        if let Some(angle) = self.tilt_axis {
            parameters.nominal_rotation_angle = Some(angle);
        }
        if let Some(enabled) = self.local_alignments {
            parameters.local_alignments = enabled;
        }
        if let Some([patches_x, patches_y]) = self.patches.as_deref() {
            parameters.n_patches_xy = (*patches_x, *patches_y);
        }
        if let Some(thickness) = self.alignment_thickness {
            parameters.thickness_for_alignment = thickness;
        }
        Ok(parameters)
    }
}

#[derive(clap::Args)]
struct BinningArgs {
    /// Pixel size of the unbinned data.
    #[arg(long)]
    pixel_size: f64,

    /// Pixel size to approach.
    #[arg(long)]
    target_pixel_size: f64,
}

#[derive(clap::Args)]
struct CheckArgs {
    /// Executable name or path to look for.
    #[arg(long, default_value = lil_aretomo::config::DEFAULT_EXECUTABLE)]
    executable: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn parse_options(extra: &[&str]) -> std::result::Result<AlignmentOptions, clap::Error> {
        let base = [
            "lil-aretomo",
            "command",
            "--tilt-series",
            "TS_01.mrc",
            "--output-dir",
            "out",
        ];
        let cli = Cli::try_parse_from(base.iter().chain(extra))?;
        match cli.command {
            Command::Command(args) => Ok(args.options),
            _ => panic!("expected the command subcommand"),
        }
    }

    fn write_params(directory: &Path) -> PathBuf {
        let path = directory.join("params.json");
        fs::write(
            &path,
            r#"{
                "output_binning": 4,
                "nominal_rotation_angle": 85.0,
                "local_alignments": true,
                "n_patches_xy": [6, 3],
                "thickness_for_alignment": 1000
            }"#,
        )
        .expect("params written");
        path
    }

    #[test]
    fn flags_override_params_file() {
        let temp_dir = tempdir().expect("temporary directory");
        let params = write_params(temp_dir.path());
        let options = parse_options(&[
            "--params",
            params.to_str().expect("utf-8 path"),
            "--output-binning",
            "2",
            "--tilt-axis",
            "-84.5",
            "--alignment-thickness",
            "1200",
        ])
        .expect("arguments parsed");

        let parameters = options.resolve_parameters().expect("parameters resolved");

        assert_eq!(
            parameters,
            AlignmentParameters {
                output_binning: 2,
                nominal_rotation_angle: Some(-84.5),
                local_alignments: true,
                n_patches_xy: (6, 3),
                thickness_for_alignment: 1200,
            }
        );
    }

    #[test]
    fn pixel_sizes_replace_params_binning() {
        let temp_dir = tempdir().expect("temporary directory");
        let params = write_params(temp_dir.path());
        let options = parse_options(&[
            "--params",
            params.to_str().expect("utf-8 path"),
            "--pixel-size",
            "1.35",
            "--target-pixel-size",
            "10.8",
        ])
        .expect("arguments parsed");

        let parameters = options.resolve_parameters().expect("parameters resolved");

        assert_eq!(parameters.output_binning, 8);
        assert_eq!(parameters.thickness_for_alignment, 1000);
    }

    #[test]
    fn explicit_binning_conflicts_with_pixel_sizes() {
        let result = parse_options(&[
            "--output-binning",
            "2",
            "--pixel-size",
            "1.0",
            "--target-pixel-size",
            "4.0",
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn local_alignments_can_be_switched_either_way() {
        let temp_dir = tempdir().expect("temporary directory");
        let params = write_params(temp_dir.path());
        let disabled = parse_options(&[
            "--params",
            params.to_str().expect("utf-8 path"),
            "--local-alignments",
            "false",
        ])
        .expect("arguments parsed")
        .resolve_parameters()
        .expect("parameters resolved");
        assert!(!disabled.local_alignments);

        let enabled = parse_options(&["--local-alignments", "--patches", "5", "4"])
            .expect("arguments parsed")
            .resolve_parameters()
            .expect("parameters resolved");
        assert!(enabled.local_alignments);
        assert_eq!(enabled.n_patches_xy, (5, 4));

        let untouched = parse_options(&[])
            .expect("arguments parsed")
            .resolve_parameters()
            .expect("parameters resolved");
        assert!(!untouched.local_alignments);
    }

    #[test]
    fn missing_params_file_is_reported() {
        let temp_dir = tempdir().expect("temporary directory");
        let missing = temp_dir.path().join("missing.json");
        let options = parse_options(&["--params", missing.to_str().expect("utf-8 path")])
            .expect("arguments parsed");

        let error = options.resolve_parameters().expect_err("resolution should fail");

        assert!(matches!(error, ToolError::MissingInput(path) if path == missing));
    }

    #[cfg(unix)]
    #[test]
    fn check_exit_code_follows_availability() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempdir().expect("temporary directory");
        let executable = temp_dir.path().join("AreTomo");
        fs::write(&executable, "#!/bin/sh\nexit 0\n").expect("stub written");
        fs::set_permissions(&executable, fs::Permissions::from_mode(0o755))
            .expect("stub made executable");

        let found = CheckArgs {
            executable: executable.display().to_string(),
        };
        let missing = CheckArgs {
            executable: temp_dir.path().join("AreTomo2").display().to_string(),
        };

        assert_eq!(execute_check(&found), ExitCode::SUCCESS);
        assert_eq!(execute_check(&missing), ExitCode::FAILURE);
    }
}
