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

fn write_png(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(w, h, image::Rgb([1, 2, 3]))
        .save_with_format(&path, image::ImageFormat::Png)
        .unwrap();
    path
}

#[test]
fn same_path_decodes_once() {
    let tmp = temp_dir("store_decode_once");
    std::fs::create_dir_all(&tmp).unwrap();
    let path = write_png(&tmp, "a.png", 4, 4);

    let cache = ImageCache::new(1 << 20);
    let a = cache.load(&path).unwrap();
    let b = cache.load(&path).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(cache.decode_count(), 1);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.resident_bytes(), 4 * 4 * 3);

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn evicts_least_recently_used_over_budget() {
    let tmp = temp_dir("store_evict");
    std::fs::create_dir_all(&tmp).unwrap();
    let a = write_png(&tmp, "a.png", 10, 10);
    let b = write_png(&tmp, "b.png", 10, 10);
    let c = write_png(&tmp, "c.png", 10, 10);

    // Room for two 300-byte images.
    let cache = ImageCache::new(600);
    cache.load(&a).unwrap();
    cache.load(&b).unwrap();
    cache.load(&a).unwrap();
    cache.load(&c).unwrap();

    assert!(cache.contains(&a));
    assert!(!cache.contains(&b));
    assert!(cache.contains(&c));
    assert_eq!(cache.resident_bytes(), 600);

    // b was evicted, so it is decoded again: a, b, c, b.
    cache.load(&b).unwrap();
    assert_eq!(cache.decode_count(), 4);

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn zero_budget_never_stores() {
    let tmp = temp_dir("store_zero_budget");
    std::fs::create_dir_all(&tmp).unwrap();
    let path = write_png(&tmp, "a.png", 2, 2);

    let cache = ImageCache::new(0);
    cache.load(&path).unwrap();
    cache.load(&path).unwrap();
    assert!(cache.is_empty());
    assert_eq!(cache.decode_count(), 2);

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn clear_drops_resident_images() {
    let tmp = temp_dir("store_clear");
    std::fs::create_dir_all(&tmp).unwrap();
    let path = write_png(&tmp, "a.png", 3, 3);

    let cache = ImageCache::new(1 << 20);
    cache.load(&path).unwrap();
    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.resident_bytes(), 0);

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn bookkeeping_stays_bounded_across_many_paths() {
    let tmp = temp_dir("store_many_paths");
    std::fs::create_dir_all(&tmp).unwrap();

    // Room for a single 300-byte image.
    let cache = ImageCache::new(300);
    for i in 0..50 {
        let path = write_png(&tmp, &format!("img_{i}.png"), 10, 10);
        cache.load(&path).unwrap();
        assert_eq!(cache.len(), 1);
        assert!(cache.resident_bytes() <= 300);
    }
    assert_eq!(cache.decode_count(), 50);
    let dbg = format!("{cache:?}");
    assert!(dbg.contains("entries: 1"), "{dbg}");

    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.resident_bytes(), 0);

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn missing_file_is_an_error_and_not_cached() {
    let cache = ImageCache::new(1 << 20);
    let missing = Path::new("/nonexistent/pinmark/missing.png");
    assert!(cache.load(missing).is_err());
    assert!(cache.is_empty());
    assert!(UncachedSource.load(missing).is_err());
}
