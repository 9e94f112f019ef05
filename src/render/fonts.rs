use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use usvg::fontdb;

/// Font used for marker labels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LabelFont {
    /// A family present in the font database, referenced by name from the marker SVG.
    Family(String),
    /// Built-in 5x7 bitmap digits, used when no font face is available at all.
    Bitmap,
}

/// Build the font database used for marker labels.
pub fn build_fontdb(font_dirs: &[PathBuf], system_fonts: bool) -> Arc<fontdb::Database> {
    let mut db = fontdb::Database::new();
    if system_fonts {
        db.load_system_fonts();
    }
    for dir in font_dirs {
        load_fonts_from_dir(&mut db, dir);
    }
    tracing::debug!(faces = db.len(), "font database ready");
    Arc::new(db)
}

fn load_fonts_from_dir(db: &mut fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::debug!(dir = %dir.display(), "font dir not readable");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::debug!(path = %path.display(), error = %e, "skipping font file");
        }
    }
}

/// Pick the label font: the first configured family with a face, else any face, else bitmap.
pub fn resolve_label_font(db: &fontdb::Database, families: &[String]) -> LabelFont {
    for name in families {
        let query = fontdb::Query {
            families: &[fontdb::Family::Name(name)],
            weight: fontdb::Weight::BOLD,
            stretch: fontdb::Stretch::Normal,
            style: fontdb::Style::Normal,
        };
        if db.query(&query).is_some() {
            return LabelFont::Family(svg_safe_family(name));
        }
    }

    let any = db
        .faces()
        .find_map(|face| face.families.first().map(|(name, _)| name.clone()));
    match any {
        Some(name) => {
            tracing::debug!(family = %name, "no configured font family found, using first face");
            LabelFont::Family(svg_safe_family(&name))
        }
        None => {
            tracing::warn!("no fonts available, marker labels use the built-in bitmap font");
            LabelFont::Bitmap
        }
    }
}

// Family names end up inside a quoted XML attribute.
fn svg_safe_family(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '\'' | '"' | '<' | '>' | '&'))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/render/fonts.rs"]
mod tests;
