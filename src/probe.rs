use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::DEFAULT_EXECUTABLE;

/// Checks for an installation of AreTomo on `PATH`.
pub fn check_aretomo_availability() -> bool {
    is_available(DEFAULT_EXECUTABLE)
}

/// Reports whether `name` resolves to an executable on `PATH`.
pub fn is_available(name: impl AsRef<OsStr>) -> bool {
    let Some(search_path) = env::var_os("PATH") else {
        return false;
    };
    find_executable_in(name, &search_path).is_some()
}

/// Resolves `name` against an explicit search path.
///
/// Names containing a path separator are checked directly instead of being
/// searched for.
pub fn find_executable_in(name: impl AsRef<OsStr>, search_path: &OsStr) -> Option<PathBuf> {
    let name = Path::new(name.as_ref());
    if name.components().count() > 1 {
        return is_executable(name).then(|| name.to_path_buf());
    }
    let found = env::split_paths(search_path)
        .filter(|directory| !directory.as_os_str().is_empty())
        .flat_map(|directory| candidates(&directory, name))
        .find(|candidate| is_executable(candidate));
    debug!(name = %name.display(), found = ?found, "probed search path");
    found
}

#[cfg(unix)]
fn candidates(directory: &Path, name: &Path) -> Vec<PathBuf> {
    vec![directory.join(name)]
}

#[cfg(windows)]
fn candidates(directory: &Path, name: &Path) -> Vec<PathBuf> {
    let extensions = env::var("PATHEXT").unwrap_or_else(|_| ".EXE;.BAT;.CMD".to_owned());
    std::iter::once(directory.join(name))
        .chain(
            extensions
                .split(';')
                .filter(|extension| !extension.is_empty())
                .map(|extension| {
                    let mut file_name = name.as_os_str().to_owned();
                    file_name.push(extension);
                    directory.join(file_name)
                }),
        )
        .collect()
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|metadata| metadata.is_file() && metadata.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(windows)]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
