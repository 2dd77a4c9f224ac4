//! Integration tests for content-rectangle detection on synthetic pages.

use sheetscan_detect::{DetectOptions, detect_content_rect};
use sheetscan_test::{INK, blank_page, framed_page, paint_pct};

#[test]
fn test_framed_page_edges_land_in_margin_band() {
    // 10% pure white margin around a uniformly dark interior.
    let page = framed_page(1200, 900, 0.10, 60);
    let rect = detect_content_rect(&page, &DetectOptions::default()).unwrap();

    // Every detected edge must fall inside the white band around the
    // content, i.e. close to the 10% boundary and never inside the
    // interior by more than a refinement window.
    assert!(rect.x > 0.0 && rect.x <= 11.0, "left edge at {}", rect.x);
    assert!(rect.y > 0.0 && rect.y <= 11.0, "top edge at {}", rect.y);
    assert!(
        rect.right() >= 89.0 && rect.right() < 100.0,
        "right edge at {}",
        rect.right()
    );
    assert!(
        rect.bottom() >= 89.0 && rect.bottom() < 100.0,
        "bottom edge at {}",
        rect.bottom()
    );
}

#[test]
fn test_wide_margin_page() {
    let page = framed_page(1000, 1000, 0.25, 40);
    let rect = detect_content_rect(&page, &DetectOptions::default()).unwrap();
    assert!((rect.x - 25.0).abs() < 3.0);
    assert!((rect.y - 25.0).abs() < 3.0);
    assert!((rect.right() - 75.0).abs() < 3.0);
    assert!((rect.bottom() - 75.0).abs() < 3.0);
}

#[test]
fn test_detection_is_deterministic() {
    let page = framed_page(800, 600, 0.08, 70);
    let opts = DetectOptions::default();
    let a = detect_content_rect(&page, &opts).unwrap();
    let b = detect_content_rect(&page, &opts).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_sparse_content_still_bounded() {
    // Content made of separate marks instead of a solid block: the
    // detected rectangle must cover all of them.
    let mut page = blank_page(1000, 800);
    for (x, y) in [(15.0, 12.0), (70.0, 12.0), (15.0, 80.0), (70.0, 80.0)] {
        paint_pct(
            &mut page,
            &sheetscan_core::RectPct::new(x, y, 12.0, 6.0).unwrap(),
            INK,
        );
    }
    let rect = detect_content_rect(&page, &DetectOptions::default()).unwrap();
    assert!(rect.x <= 16.0);
    assert!(rect.y <= 13.0);
    assert!(rect.right() >= 81.0);
    assert!(rect.bottom() >= 85.0);
}

#[test]
fn test_large_scan_uses_fine_pass() {
    // A scan bigger than the fine render still detects correctly.
    let page = framed_page(2400, 1800, 0.10, 50);
    let rect = detect_content_rect(&page, &DetectOptions::default()).unwrap();
    assert!((rect.x - 10.0).abs() < 2.0);
    assert!((rect.right() - 90.0).abs() < 2.0);
}
