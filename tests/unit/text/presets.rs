use super::*;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "pinmark_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn names_creates_missing_dir() {
    let dir = temp_dir("presets_new");
    let store = PresetStore::new(&dir);
    assert!(store.names().unwrap().is_empty());
    assert!(dir.is_dir());
}

#[test]
fn names_are_sorted_txt_stems() {
    let dir = temp_dir("presets_names");
    std::fs::create_dir_all(dir.join("folder.txt")).unwrap();
    for (name, body) in [
        ("portrait.txt", "p"),
        ("Anime.TXT", "a"),
        ("landscape.txt", "l"),
        ("readme.md", "x"),
    ] {
        std::fs::write(dir.join(name), body).unwrap();
    }

    let store = PresetStore::new(&dir);
    assert_eq!(store.names().unwrap(), ["Anime", "landscape", "portrait"]);
}

#[test]
fn read_returns_contents_or_none() {
    let dir = temp_dir("presets_read");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("portrait.txt"), "soft light, 85mm\n").unwrap();

    let store = PresetStore::new(&dir);
    assert_eq!(
        store.read("portrait").unwrap().as_deref(),
        Some("soft light, 85mm\n")
    );
    assert_eq!(store.read("missing").unwrap(), None);
}

#[test]
fn names_with_path_components_rejected() {
    let store = PresetStore::new(temp_dir("presets_bad"));
    for bad in ["", "..", "../secret", "a/b", "a\\b"] {
        assert!(
            matches!(store.read(bad), Err(PinmarkError::Validation(_))),
            "{bad:?} accepted"
        );
    }
}
