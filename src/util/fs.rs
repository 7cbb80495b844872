//! Filesystem utilities.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use glob::glob;

use crate::core::error::BuildError;

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| BuildError::io("create directory", path, e))?;
    }
    Ok(())
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| BuildError::io("read", path, e).into())
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }
    fs::write(path, contents).map_err(|e| BuildError::io("write", path, e).into())
}

/// Copy a file, creating the destination's parent directory.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        ensure_dir(parent)?;
    }
    fs::copy(src, dst).map_err(|e| BuildError::io("copy", src, e))?;
    Ok(())
}

/// Whether the file at `path` begins with `prefix`.
pub fn starts_with(path: &Path, prefix: &[u8]) -> Result<bool> {
    let mut file = fs::File::open(path).map_err(|e| BuildError::io("open", path, e))?;
    let mut head = vec![0u8; prefix.len()];
    match file.read_exact(&mut head) {
        Ok(()) => Ok(head == prefix),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(BuildError::io("read", path, e).into()),
    }
}

/// Add read and execute permission for everyone: `(mode | 0o555) & 0o7777`.
#[cfg(unix)]
pub fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let meta = fs::metadata(path).map_err(|e| BuildError::io("stat", path, e))?;
    let mode = (meta.permissions().mode() | 0o555) & 0o7777;
    tracing::info!("changing mode of {} to {:o}", path.display(), mode);
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .map_err(|e| BuildError::io("change mode of", path, e))?;
    Ok(())
}

#[cfg(not(unix))]
pub fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Last-modified time of a path, or `None` if it does not exist.
pub fn modified(path: &Path) -> Result<Option<SystemTime>> {
    match fs::metadata(path) {
        Ok(meta) => {
            let mtime = meta
                .modified()
                .map_err(|e| BuildError::io("read modification time of", path, e))?;
            Ok(Some(mtime))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(BuildError::io("stat", path, e).into()),
    }
}

/// Whether `target` must be regenerated from `sources`.
///
/// A target is stale if it does not exist or is older than any source.
/// Equal timestamps count as up to date.
pub fn is_stale<P: AsRef<Path>>(target: &Path, sources: &[P]) -> Result<bool> {
    let target_mtime = match modified(target)? {
        Some(t) => t,
        None => return Ok(true),
    };

    for source in sources {
        let source = source.as_ref();
        let source_mtime = modified(source)?
            .with_context(|| format!("source file does not exist: {}", source.display()))?;
        if target_mtime < source_mtime {
            return Ok(true);
        }
    }

    Ok(false)
}

/// Find files matching glob patterns relative to a base directory.
///
/// Results are sorted and deduplicated.
pub fn glob_files(base: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut results = Vec::new();

    for pattern in patterns {
        let full_pattern = base.join(pattern);
        let pattern_str = full_pattern.to_string_lossy();

        for entry in glob(&pattern_str)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
        {
            match entry {
                Ok(path) => {
                    if path.is_file() {
                        results.push(path);
                    }
                }
                Err(e) => {
                    tracing::warn!("glob error: {}", e);
                }
            }
        }
    }

    results.sort();
    results.dedup();
    Ok(results)
}

/// List the regular files directly inside a directory, sorted by name.
///
/// A missing directory yields an empty list.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .into_iter()
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect();

    files.sort();
    Ok(files)
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Make `path` absolute against `base` without touching the filesystem.
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
