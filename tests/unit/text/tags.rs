use super::*;

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "pinmark_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn touch(dir: &Path, names: &[&str]) {
    for n in names {
        std::fs::write(dir.join(n), b"x").unwrap();
    }
}

fn caption(dir: &Path, stem: &str) -> String {
    std::fs::read_to_string(dir.join(format!("{stem}.txt"))).unwrap()
}

#[test]
fn compose_adds_trigger_and_suffix() {
    let opts = TagOpts {
        trigger_word: " ohwx ".into(),
        suffix_tags: "best quality".into(),
    };
    assert_eq!(opts.compose("  a red car \n"), "ohwx, a red car, best quality");
    assert_eq!(TagOpts::default().compose(" plain "), "plain");
}

#[test]
fn images_sorted_by_name_and_filtered_by_extension() {
    let dir = temp_dir("tags_list");
    touch(&dir, &["b.PNG", "a.jpg", "c.webp", "notes.txt", "d.gif"]);
    std::fs::create_dir_all(dir.join("sub.png")).unwrap();

    let names: Vec<String> = list_tag_images(&dir)
        .unwrap()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["a.jpg", "b.PNG", "c.webp"]);
}

#[test]
fn missing_dir_is_validation_error() {
    let dir = temp_dir("tags_missing").join("nope");
    let mut saver = TagFileSaver::default();
    assert!(matches!(
        saver.save_list(&dir, &["a"]),
        Err(PinmarkError::Validation(_))
    ));
    assert!(saver.save_next(&dir, "a").is_err());
}

#[test]
fn list_mode_pairs_captions_with_images_in_order() {
    let dir = temp_dir("tags_pairs");
    touch(&dir, &["img_2.png", "img_1.png"]);

    let mut saver = TagFileSaver::new(TagOpts {
        trigger_word: "tw".into(),
        ..TagOpts::default()
    });
    let out = saver.save_list(&dir, &["first", "second", "extra"]).unwrap();
    assert_eq!(out.len(), 2);
    assert!(out.iter().all(TagOutcome::is_ok));
    assert_eq!(caption(&dir, "img_1"), "tw, first");
    assert_eq!(caption(&dir, "img_2"), "tw, second");
}

#[test]
fn next_mode_walks_images_round_robin() {
    let dir = temp_dir("tags_rr");
    touch(&dir, &["a.png", "b.png", "c.png"]);

    let mut saver = TagFileSaver::default();
    for (i, text) in ["one", "two", "three", "four"].iter().enumerate() {
        assert_eq!(saver.position(), i % 3);
        let out = saver.save_next(&dir, text).unwrap().unwrap();
        assert!(out.is_ok());
    }
    assert_eq!(saver.position(), 1);
    assert_eq!(caption(&dir, "a"), "four");
    assert_eq!(caption(&dir, "b"), "two");
    assert_eq!(caption(&dir, "c"), "three");

    // A list write restarts the rotation.
    saver.save_list(&dir, &["x"]).unwrap();
    assert_eq!(saver.position(), 0);
}

#[test]
fn savers_do_not_share_position() {
    let dir = temp_dir("tags_indep");
    touch(&dir, &["a.png", "b.png"]);

    let mut first = TagFileSaver::default();
    first.save_next(&dir, "from first").unwrap();
    let mut second = TagFileSaver::default();
    second.save_next(&dir, "from second").unwrap();

    assert_eq!(first.position(), 1);
    assert_eq!(caption(&dir, "a"), "from second");
    assert!(!dir.join("b.txt").exists());
}

#[test]
fn position_wraps_when_directory_shrinks() {
    let dir = temp_dir("tags_shrink");
    touch(&dir, &["a.png", "b.png", "c.png"]);

    let mut saver = TagFileSaver::default();
    saver.save_next(&dir, "1").unwrap();
    saver.save_next(&dir, "2").unwrap();
    assert_eq!(saver.position(), 2);

    std::fs::remove_file(dir.join("c.png")).unwrap();
    let out = saver.save_next(&dir, "3").unwrap().unwrap();
    assert_eq!(out.path, dir.join("a.txt"));
    assert_eq!(saver.position(), 1);
}

#[test]
fn empty_dir_writes_nothing() {
    let dir = temp_dir("tags_empty");
    let mut saver = TagFileSaver::default();
    assert!(saver.save_next(&dir, "a").unwrap().is_none());
    assert!(saver.save_list(&dir, &["a"]).unwrap().is_empty());
}
