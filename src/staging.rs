use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::config::AreTomoConfig;
use crate::error::{Result, ToolError};

/// Links a tilt series into `output_directory` and writes its tilt angles next to it.
///
/// The directory is created if needed. The link is named after the tilt series
/// stem with the configured volume extension and replaces whatever was there
/// before, so preparing the same directory twice is harmless. When the tilt
/// series already sits at the link path it is left untouched. Returns the path
/// of the link.
#[instrument(
    level = "info",
    skip_all,
    fields(tilt_series = %tilt_series.display(), output = %output_directory.display())
)]
pub fn prepare_alignment_directory(
    tilt_series: &Path,
    tilt_angles: &[f64],
    output_directory: &Path,
    config: &AreTomoConfig,
) -> Result<PathBuf> {
    if !tilt_series.exists() {
        return Err(ToolError::MissingInput(tilt_series.to_path_buf()));
    }
    let stem = tilt_series_stem(tilt_series)?;
    fs::create_dir_all(output_directory)?;

    let linked_tilt_series = output_directory.join(config.linked_volume_name(stem));
    let tilt_angle_file = output_directory.join(config.tilt_angle_file_name(stem));

    let source = std::path::absolute(tilt_series)?;
    if is_same_entry(&source, &linked_tilt_series)? {
        info!(tilt_series = %source.display(), "tilt series already in place, not relinking");
    } else {
        force_symlink(&source, &linked_tilt_series)?;
    }
    write_tilt_angles(&tilt_angle_file, tilt_angles)?;
    info!(
        tilt_count = tilt_angles.len(),
        link = %linked_tilt_series.display(),
        "staged tilt series"
    );
    Ok(linked_tilt_series)
}

/// Returns the file stem every derived file name is built from.
pub fn tilt_series_stem(tilt_series: &Path) -> Result<&str> {
    tilt_series
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| ToolError::InvalidTiltSeries(tilt_series.to_path_buf()))
}

/// Reports whether `link` names the tilt series itself rather than a separate entry.
///
/// An existing link pointing at the source is not the same entry; relinking it is harmless.
fn is_same_entry(source: &Path, link: &Path) -> Result<bool> {
    let metadata = match fs::symlink_metadata(link) {
        Ok(metadata) => metadata,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(error) => return Err(error.into()),
    };
    if source == std::path::absolute(link)? {
        return Ok(true);
    }
    Ok(!metadata.file_type().is_symlink() && fs::canonicalize(source)? == fs::canonicalize(link)?)
}

/// Creates a symbolic link at `link` pointing to `source`, removing any existing entry first.
///
/// Dangling links are removed too, since `Path::exists` would not see them.
pub fn force_symlink(source: &Path, link: &Path) -> Result<()> {
    match fs::symlink_metadata(link) {
        Ok(_) => {
            debug!(link = %link.display(), "replacing existing entry");
            fs::remove_file(link)?;
        }
        Err(error) if error.kind() == io::ErrorKind::NotFound => {}
        Err(error) => return Err(error.into()),
    }
    create_symlink(source, link)?;
    Ok(())
}

#[cfg(unix)]
fn create_symlink(source: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(source, link)
}

#[cfg(windows)]
fn create_symlink(source: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(source, link)
}

/// Writes one angle per line, each with exactly two decimals.
pub fn write_tilt_angles(path: &Path, tilt_angles: &[f64]) -> Result<()> {
    let contents: String = tilt_angles
        .iter()
        .map(|angle| format!("{angle:.2}\n"))
        .collect();
    fs::write(path, contents)?;
    Ok(())
}

/// Reads whitespace separated tilt angles in file order.
pub fn read_tilt_angles(path: &Path) -> Result<Vec<f64>> {
    let contents = fs::read_to_string(path)?;
    let mut angles = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        for token in line.split_whitespace() {
            let angle = token
                .parse::<f64>()
                .map_err(|_| ToolError::InvalidTiltAngle {
                    line: index + 1,
                    value: token.to_owned(),
                })?;
            angles.push(angle);
        }
    }
    Ok(angles)
}
