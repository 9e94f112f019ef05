//! Caption (`.txt` tag file) writing next to training images.
//!
//! Images in a directory are matched to captions by sorted file name: caption `i` is written to
//! `<stem of image i>.txt`.

use std::path::{Path, PathBuf};

use crate::foundation::error::{PinmarkError, PinmarkResult};

const TAG_IMAGE_EXTS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "webp"];

/// Text added around every caption.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TagOpts {
    /// Prepended as `"<trigger>, "` when non-empty.
    pub trigger_word: String,
    /// Appended as `", <suffix>"` when non-empty.
    pub suffix_tags: String,
}

impl TagOpts {
    /// Final caption text for `raw`.
    pub fn compose(&self, raw: &str) -> String {
        let mut content = raw.trim().to_string();
        let trigger = self.trigger_word.trim();
        if !trigger.is_empty() {
            content = format!("{trigger}, {content}");
        }
        let suffix = self.suffix_tags.trim();
        if !suffix.is_empty() {
            content = format!("{content}, {suffix}");
        }
        content
    }
}

/// Result of writing one tag file.
#[derive(Debug)]
pub struct TagOutcome {
    /// Target `.txt` path.
    pub path: PathBuf,
    /// Write error, if any.
    pub error: Option<String>,
}

impl TagOutcome {
    /// Return `true` when the file was written.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Writes caption files for the images of a directory.
///
/// [`TagFileSaver::save_next`] walks the images round-robin across calls; the position is held
/// by the saver itself, so a fresh saver always starts at the first image.
#[derive(Clone, Debug, Default)]
pub struct TagFileSaver {
    opts: TagOpts,
    counter: usize,
}

impl TagFileSaver {
    /// Saver starting at the first image.
    pub fn new(opts: TagOpts) -> Self {
        Self { opts, counter: 0 }
    }

    /// Index of the image the next [`TagFileSaver::save_next`] call writes.
    pub fn position(&self) -> usize {
        self.counter
    }

    /// Write `captions[i]` for image `i`, stopping at whichever runs out first.
    ///
    /// Resets the round-robin position. Individual write failures are reported in the outcomes
    /// and do not stop the batch.
    pub fn save_list<S: AsRef<str>>(
        &mut self,
        dir: &Path,
        captions: &[S],
    ) -> PinmarkResult<Vec<TagOutcome>> {
        let images = list_tag_images(dir)?;
        let outcomes = images
            .iter()
            .zip(captions)
            .map(|(img, caption)| self.write_one(img, caption.as_ref()))
            .collect();
        self.counter = 0;
        Ok(outcomes)
    }

    /// Write `caption` for the image at the current position, then advance (wrapping).
    ///
    /// Returns `Ok(None)` when the directory holds no images.
    pub fn save_next(&mut self, dir: &Path, caption: &str) -> PinmarkResult<Option<TagOutcome>> {
        let images = list_tag_images(dir)?;
        if images.is_empty() {
            return Ok(None);
        }
        // The directory may have shrunk since the last call.
        let idx = self.counter % images.len();
        let outcome = self.write_one(&images[idx], caption);
        self.counter = (idx + 1) % images.len();
        Ok(Some(outcome))
    }

    fn write_one(&self, image: &Path, caption: &str) -> TagOutcome {
        let path = image.with_extension("txt");
        let error = std::fs::write(&path, self.opts.compose(caption))
            .err()
            .map(|e| e.to_string());
        match &error {
            None => tracing::debug!(path = %path.display(), "tag file written"),
            Some(e) => tracing::warn!(path = %path.display(), error = %e, "tag file not written"),
        }
        TagOutcome { path, error }
    }
}

/// Images directly inside `dir` with a caption-able extension, sorted by file name.
pub fn list_tag_images(dir: &Path) -> PinmarkResult<Vec<PathBuf>> {
    let rd = std::fs::read_dir(dir).map_err(|e| {
        PinmarkError::validation(format!("tag directory '{}': {e}", dir.display()))
    })?;

    let mut images: Vec<PathBuf> = rd
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| TAG_IMAGE_EXTS.contains(&e.to_ascii_lowercase().as_str()))
        })
        .collect();
    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    if images.is_empty() {
        tracing::warn!(dir = %dir.display(), "no images to tag");
    }
    Ok(images)
}

#[cfg(test)]
#[path = "../../tests/unit/text/tags.rs"]
mod tests;
