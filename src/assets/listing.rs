use std::path::{Path, PathBuf};

use crate::foundation::error::{PinmarkError, PinmarkResult};

/// List image files below `dir`, recursively.
///
/// Entries are relative to `dir`, use `/` separators and are sorted. Files whose extension is
/// not a known image format are skipped. A missing directory yields an empty list.
pub fn list_input_images(dir: &Path) -> Vec<String> {
    let mut out = Vec::new();
    collect_images(dir, dir, &mut out);
    out.sort();
    out
}

fn collect_images(root: &Path, dir: &Path, out: &mut Vec<String>) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_images(root, &path, out);
            continue;
        }
        if !path.is_file() || image::ImageFormat::from_path(&path).is_err() {
            continue;
        }
        let Ok(rel) = path.strip_prefix(root) else {
            continue;
        };
        out.push(rel.to_string_lossy().replace('\\', "/"));
    }
}

/// Normalize and validate an input-relative image name.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> PinmarkResult<String> {
    let s = source.trim().replace('\\', "/");
    if s.starts_with('/') || s.get(1..2) == Some(":") {
        return Err(PinmarkError::validation("image names must be relative"));
    }
    if s.is_empty() {
        return Err(PinmarkError::validation("image name must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(PinmarkError::validation("image names must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(PinmarkError::validation(
            "image name must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

/// Resolve an input-relative image name against `root`.
pub fn resolve_input(root: &Path, name: &str) -> PinmarkResult<PathBuf> {
    let norm = normalize_rel_path(name)?;
    Ok(root.join(Path::new(&norm)))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/listing.rs"]
mod tests;
