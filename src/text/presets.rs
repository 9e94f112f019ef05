use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{PinmarkError, PinmarkResult};

/// Named prompt presets stored as `<name>.txt` files in one directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PresetStore {
    dir: PathBuf,
}

impl PresetStore {
    /// Store rooted at `dir`. Nothing is touched until the first call.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Preset directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Sorted preset names. Creates the directory when it does not exist yet.
    pub fn names(&self) -> PinmarkResult<Vec<String>> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create preset dir '{}'", self.dir.display()))?;
        let rd = std::fs::read_dir(&self.dir)
            .with_context(|| format!("read preset dir '{}'", self.dir.display()))?;

        let mut names: Vec<String> = rd
            .flatten()
            .filter(|e| e.path().is_file())
            .filter_map(|e| {
                let file_name = e.file_name().into_string().ok()?;
                let stem_len = file_name.len().checked_sub(4)?;
                let ext = file_name.get(stem_len..)?;
                ext.eq_ignore_ascii_case(".txt")
                    .then(|| file_name[..stem_len].to_string())
            })
            .filter(|name| !name.is_empty())
            .collect();
        names.sort();
        Ok(names)
    }

    /// Contents of preset `name`, or `None` when it does not exist.
    pub fn read(&self, name: &str) -> PinmarkResult<Option<String>> {
        let path = self.path_of(name)?;
        if !path.is_file() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("read preset '{}'", path.display()))?;
        Ok(Some(text))
    }

    fn path_of(&self, name: &str) -> PinmarkResult<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(PinmarkError::validation(format!(
                "invalid preset name '{name}'"
            )));
        }
        Ok(self.dir.join(format!("{name}.txt")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/presets.rs"]
mod tests;
