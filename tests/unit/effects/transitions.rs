use rand::{SeedableRng, rngs::StdRng};

use super::*;
use crate::foundation::core::Resolution;

fn res(w: u32, h: u32) -> Resolution {
    Resolution::new(w, h).unwrap()
}

/// Frame whose red channel encodes the column and green channel the row.
fn gradient(w: u32, h: u32) -> Frame {
    let mut data = Vec::new();
    for y in 0..h {
        for x in 0..w {
            data.extend_from_slice(&[x as u8, y as u8, 7]);
        }
    }
    Frame::from_rgb(w, h, data).unwrap()
}

#[test]
fn lookup_accepts_display_and_snake_names() {
    assert_eq!(
        TransitionName::lookup("Slide Left"),
        Some(TransitionName::SlideLeft)
    );
    assert_eq!(
        TransitionName::lookup("wipe_down"),
        Some(TransitionName::WipeDown)
    );
    assert_eq!(
        TransitionName::lookup("ZOOM-IN"),
        Some(TransitionName::ZoomIn)
    );
    assert_eq!(TransitionName::lookup("spin"), None);
    for name in TransitionName::ALL {
        assert_eq!(TransitionName::lookup(name.as_str()), Some(name));
    }
}

#[test]
fn resolve_falls_back_to_fade() {
    let a = Frame::solid(res(4, 4), [0, 0, 0]);
    let b = Frame::solid(res(4, 4), [200, 100, 50]);
    let unknown = resolve("does-not-exist");
    assert_eq!(unknown(&a, &b, 0.5), fade(&a, &b, 0.5));
}

#[test]
fn serde_uses_display_names() {
    let json = serde_json::to_string(&TransitionName::SlideLeft).unwrap();
    assert_eq!(json, "\"Slide Left\"");
    let back: TransitionName = serde_json::from_str("\"Zoom In\"").unwrap();
    assert_eq!(back, TransitionName::ZoomIn);
}

#[test]
fn empty_set_defaults_to_fade() {
    let set = TransitionSet::new([]);
    assert_eq!(set.names(), &[TransitionName::Fade]);
    let set = TransitionSet::from_names::<&str>(&[]);
    assert_eq!(set.names(), &[TransitionName::Fade]);
}

#[test]
fn set_deduplicates_and_maps_unknown_to_fade() {
    let set = TransitionSet::from_names(&["Zoom In", "zoom_in", "bogus", "Wipe Down"]);
    assert_eq!(
        set.names(),
        &[
            TransitionName::Fade,
            TransitionName::WipeDown,
            TransitionName::ZoomIn
        ]
    );
}

#[test]
fn choose_only_draws_enabled_names_and_covers_them() {
    let set = TransitionSet::new([TransitionName::SlideLeft, TransitionName::ZoomIn]);
    let mut rng = StdRng::seed_from_u64(7);
    let mut seen = BTreeSet::new();
    for _ in 0..200 {
        let t = set.choose(&mut rng);
        assert!(set.contains(t));
        seen.insert(t);
    }
    assert_eq!(seen.len(), 2);
}

#[test]
fn fade_endpoints_are_exact() {
    let a = gradient(6, 4);
    let b = Frame::solid(res(6, 4), [250, 10, 128]);
    assert_eq!(fade(&a, &b, 0.0), a);
    assert_eq!(fade(&a, &b, 1.0), b);
}

#[test]
fn fade_midpoint_is_linear() {
    let a = Frame::solid(res(2, 2), [0, 100, 255]);
    let b = Frame::solid(res(2, 2), [200, 0, 55]);
    let mid = fade(&a, &b, 0.5);
    assert_eq!(mid.pixel(1, 1), [100, 50, 155]);
    let quarter = fade(&a, &b, 0.25);
    assert_eq!(quarter.pixel(0, 0), [50, 75, 205]);
}

#[test]
fn slide_left_shifts_a_and_reveals_b_leading_columns() {
    let a = gradient(8, 2);
    let b = Frame::solid(res(8, 2), [255, 255, 255]);
    // offset = round(8 * 0.25) = 2
    let out = slide_left(&a, &b, 0.25);
    for y in 0..2 {
        for x in 0..6 {
            assert_eq!(out.pixel(x, y), a.pixel(x + 2, y));
        }
        for x in 6..8 {
            assert_eq!(out.pixel(x, y), [255, 255, 255]);
        }
    }

    let b = gradient(8, 2);
    let a = Frame::black(res(8, 2));
    let out = slide_left(&a, &b, 0.5);
    // Right half shows b's first four columns.
    assert_eq!(out.pixel(4, 0), b.pixel(0, 0));
    assert_eq!(out.pixel(7, 1), b.pixel(3, 1));
}

#[test]
fn slide_left_endpoints() {
    let a = gradient(6, 2);
    let b = Frame::solid(res(6, 2), [1, 2, 3]);
    assert_eq!(slide_left(&a, &b, 0.0), a);
    assert_eq!(slide_left(&a, &b, 1.0), b);
}

#[test]
fn wipe_down_fills_rows_from_top() {
    let a = Frame::solid(res(4, 8), [10, 10, 10]);
    let b = Frame::solid(res(4, 8), [90, 90, 90]);
    // row = round(8 * 0.4) = 3
    let out = wipe_down(&a, &b, 0.4);
    for x in 0..4 {
        for y in 0..3 {
            assert_eq!(out.pixel(x, y), [90, 90, 90]);
        }
        for y in 3..8 {
            assert_eq!(out.pixel(x, y), [10, 10, 10]);
        }
    }
    assert_eq!(wipe_down(&a, &b, 0.0), a);
    assert_eq!(wipe_down(&a, &b, 1.0), b);
}

#[test]
fn zoom_in_endpoints() {
    let a = gradient(10, 6);
    let b = Frame::solid(res(10, 6), [3, 200, 40]);
    assert_eq!(zoom_in(&a, &b, 0.0), a);
    assert_eq!(zoom_in(&a, &b, 1.0), b);
}

#[test]
fn zoom_in_magnifies_around_center() {
    let a = gradient(20, 20);
    let b = a.clone();
    // Blending a frame with itself isolates the zoom.
    let out = zoom_in(&a, &b, 0.5);
    // Corners move toward the center under magnification.
    let corner = out.pixel(0, 0);
    assert!(corner[0] > 0 && corner[1] > 0, "{corner:?}");
    let far = out.pixel(19, 19);
    assert!(far[0] < 19 && far[1] < 19, "{far:?}");
}

#[test]
fn every_transition_preserves_resolution() {
    for (w, h) in [(2, 2), (16, 10), (64, 36)] {
        let a = gradient(w, h);
        let b = Frame::solid(res(w, h), [5, 6, 7]);
        for name in TransitionName::ALL {
            for p in [0.0, 0.1, 0.5, 0.99, 1.0] {
                let out = name.function()(&a, &b, p);
                assert_eq!(out.resolution(), a.resolution(), "{name} @ {p}");
                assert_eq!(out.as_bytes().len(), a.as_bytes().len());
            }
        }
    }
}
