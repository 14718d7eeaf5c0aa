use std::collections::BTreeSet;

use rand::{SeedableRng, rngs::StdRng};
use tempfile::TempDir;

use super::*;

fn touch(root: &Path, rel: &str) {
    let p = root.join(rel);
    std::fs::create_dir_all(p.parent().unwrap()).unwrap();
    std::fs::write(p, b"x").unwrap();
}

fn fixture() -> TempDir {
    let tmp = TempDir::new().unwrap();
    touch(tmp.path(), "b.png");
    touch(tmp.path(), "a.JPG");
    touch(tmp.path(), "nested/deeper/c.mov");
    touch(tmp.path(), "nested/d.Mp4");
    touch(tmp.path(), "notes.txt");
    touch(tmp.path(), "noext");
    touch(tmp.path(), "nested/e.gif");
    tmp
}

#[test]
fn classifies_by_extension_case_insensitively() {
    assert_eq!(
        MediaKind::from_path(Path::new("x.JPEG")),
        Some(MediaKind::Image)
    );
    assert_eq!(
        MediaKind::from_path(Path::new("x.bmp")),
        Some(MediaKind::Image)
    );
    assert_eq!(
        MediaKind::from_path(Path::new("dir/x.MKV")),
        Some(MediaKind::Video)
    );
    assert_eq!(
        MediaKind::from_path(Path::new("x.avi")),
        Some(MediaKind::Video)
    );
    assert_eq!(MediaKind::from_path(Path::new("x.webp")), None);
    assert_eq!(MediaKind::from_path(Path::new("png")), None);
}

#[test]
fn scan_recurses_and_drops_unmatched() {
    let tmp = fixture();
    let mut rng = StdRng::seed_from_u64(1);
    let cat = scan(tmp.path(), false, CatalogOrder::Traversal, &mut rng).unwrap();
    assert_eq!(cat.len(), 5);

    let names: BTreeSet<String> = cat
        .items()
        .iter()
        .map(|i| i.path.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    let expected: BTreeSet<String> = ["a.JPG", "b.png", "c.mov", "d.Mp4", "e.gif"]
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(names, expected);

    let videos = cat
        .items()
        .iter()
        .filter(|i| i.kind == MediaKind::Video)
        .count();
    assert_eq!(videos, 2);
}

#[test]
fn sorted_order_is_lexicographic() {
    let tmp = fixture();
    let mut rng = StdRng::seed_from_u64(1);
    let cat = scan(tmp.path(), false, CatalogOrder::Sorted, &mut rng).unwrap();
    let paths: Vec<&PathBuf> = cat.items().iter().map(|i| &i.path).collect();
    let mut sorted = paths.clone();
    sorted.sort();
    assert_eq!(paths, sorted);
}

#[test]
fn shuffle_is_a_permutation_and_seed_reproducible() {
    let tmp = TempDir::new().unwrap();
    for i in 0..12 {
        touch(tmp.path(), &format!("img{i:02}.png"));
    }

    let sorted = scan(
        tmp.path(),
        false,
        CatalogOrder::Sorted,
        &mut StdRng::seed_from_u64(0),
    )
    .unwrap();
    let a = scan(
        tmp.path(),
        true,
        CatalogOrder::Sorted,
        &mut StdRng::seed_from_u64(42),
    )
    .unwrap();
    let b = scan(
        tmp.path(),
        true,
        CatalogOrder::Sorted,
        &mut StdRng::seed_from_u64(42),
    )
    .unwrap();

    assert_eq!(a, b);
    let mut permuted: Vec<_> = a.items().to_vec();
    permuted.sort_by(|x, y| x.path.cmp(&y.path));
    assert_eq!(permuted, sorted.items());
}

#[test]
fn empty_directory_is_empty_catalog() {
    let tmp = TempDir::new().unwrap();
    touch(tmp.path(), "readme.md");
    let err = scan(
        tmp.path(),
        false,
        CatalogOrder::Traversal,
        &mut StdRng::seed_from_u64(0),
    )
    .unwrap_err();
    assert!(matches!(err, SlideError::EmptyCatalog { .. }));
}

#[test]
fn missing_directory_is_invalid_settings() {
    let tmp = TempDir::new().unwrap();
    let err = scan(
        &tmp.path().join("gone"),
        false,
        CatalogOrder::Traversal,
        &mut StdRng::seed_from_u64(0),
    )
    .unwrap_err();
    assert!(matches!(err, SlideError::InvalidSettings(_)));
}
