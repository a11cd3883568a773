//! Output path construction.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use crate::foundation::error::{ReelError, ReelResult};

/// Container extension used for encoded videos when the caller does not pick a path.
pub const DEFAULT_VIDEO_EXTENSION: &str = "mkv";

/// Text after the last `.` of the file name, or `""` when there is none.
///
/// `archive.tar.gz` gives `gz`; `.bashrc` gives `bashrc`.
pub fn file_extension(path: &Path) -> String {
    let Some(name) = path.file_name() else {
        return String::new();
    };
    let name = name.to_string_lossy();
    match name.rsplit_once('.') {
        Some((_, ext)) => ext.to_string(),
        None => String::new(),
    }
}

/// `<dir>/<name>.mkv`.
pub fn encoded_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.{DEFAULT_VIDEO_EXTENSION}"))
}

/// `<dir>/<stem>.<extension>`, or `<dir>/<stem>` when the extension is empty.
///
/// The extension comes from a decoded video and is untrusted: anything that would escape `dir`
/// is rejected.
pub fn decoded_path(dir: &Path, stem: &str, extension: &str) -> ReelResult<PathBuf> {
    let name = if extension.is_empty() {
        stem.to_string()
    } else {
        format!("{stem}.{extension}")
    };
    let rel = Path::new(&name);
    let mut components = rel.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(dir.join(rel)),
        _ => Err(ReelError::corrupt_metadata(format!(
            "decoded file name '{name}' is not a plain file name"
        ))),
    }
}

/// Sibling path a decode writes to before the final rename: `<path>.partial`.
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("output"));
    name.push(".partial");
    path.with_file_name(name)
}

/// File stem used to name outputs; falls back to `"output"`.
pub fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "output".to_string())
}

#[cfg(test)]
#[path = "../tests/unit/output.rs"]
mod tests;
