//! Integration tests for both scoring strategies on synthetic zones.

use sheetscan_core::{GrayRaster, PixelRect, RectPct};
use sheetscan_score::{
    DensityOptions, ScoreOptions, ScoreStrategy, SubtractOptions, score_density, score_subtraction,
    score_zone,
};
use sheetscan_test::{INK, PAPER, blank_page, paint_pct_center};

/// Zone edge lengths that land one zone in each area bucket of the
/// density table (400, 1600, 3600, 6400 px) plus one above the table.
const TIER_SIZES: [u32; 5] = [20, 40, 60, 80, 100];

fn zone_at(size: u32) -> PixelRect {
    PixelRect::new(50, 50, size, size).unwrap()
}

fn zone_pct(page: &GrayRaster, zone: &PixelRect) -> RectPct {
    RectPct::new(
        zone.x as f64 / page.width() as f64 * 100.0,
        zone.y as f64 / page.height() as f64 * 100.0,
        zone.w as f64 / page.width() as f64 * 100.0,
        zone.h as f64 / page.height() as f64 * 100.0,
    )
    .unwrap()
}

/// Page with a centered mark covering roughly 39% of the zone interior.
fn marked_page(zone: &PixelRect) -> GrayRaster {
    let mut page = blank_page(400, 400);
    let pct = zone_pct(&page, zone);
    paint_pct_center(&mut page, &pct, 0.4, INK);
    page
}

#[test]
fn test_background_zone_unchecked_under_both_strategies() {
    let page = blank_page(400, 400);
    let zone = zone_at(60);

    let density = score_density(&page, &zone, &DensityOptions::default()).unwrap();
    assert!(!density.checked);

    let subtract =
        score_subtraction(&page, &zone, &page, &zone, &SubtractOptions::default()).unwrap();
    assert!(!subtract.checked);
    assert_eq!(subtract.ink_ratio, 0.0);
}

#[test]
fn test_solid_mark_checked_in_every_density_tier() {
    for size in TIER_SIZES {
        let zone = zone_at(size);
        let page = marked_page(&zone);
        let score = score_density(&page, &zone, &DensityOptions::default()).unwrap();
        assert!(
            score.checked,
            "zone {size}x{size}: ratio {} vs threshold {}",
            score.ink_ratio, score.threshold
        );
    }
}

#[test]
fn test_solid_mark_checked_under_subtraction_for_every_tier() {
    for size in TIER_SIZES {
        let zone = zone_at(size);
        let scan = marked_page(&zone);
        let template = blank_page(400, 400);
        let score =
            score_subtraction(&scan, &zone, &template, &zone, &SubtractOptions::default()).unwrap();
        assert!(
            score.checked,
            "zone {size}x{size}: ratio {}",
            score.ink_ratio
        );
    }
}

#[test]
fn test_subtraction_invariant_to_uniform_offset() {
    let zone = zone_at(80);
    let mut scan = GrayRaster::from_fn(400, 400, |_, _| 200).unwrap();
    let pct = zone_pct(&scan, &zone);
    paint_pct_center(&mut scan, &pct, 0.4, INK);
    let template = GrayRaster::from_fn(400, 400, |_, _| 200).unwrap();

    let offset = 30u8;
    let lift = |r: &GrayRaster| {
        GrayRaster::from_raw(
            r.width(),
            r.height(),
            r.data().iter().map(|&v| v + offset).collect(),
        )
        .unwrap()
    };
    let scan_lifted = lift(&scan);
    let template_lifted = lift(&template);

    let opts = SubtractOptions::default();
    let base = score_subtraction(&scan, &zone, &template, &zone, &opts).unwrap();
    let lifted =
        score_subtraction(&scan_lifted, &zone, &template_lifted, &zone, &opts).unwrap();

    assert!(base.checked);
    assert_eq!(base.checked, lifted.checked);
    assert_eq!(base.ink_ratio, lifted.ink_ratio);
}

#[test]
fn test_score_zone_dispatches_by_strategy() {
    let zone = zone_at(60);
    let scan = marked_page(&zone);
    let template = blank_page(400, 400);
    let opts = ScoreOptions::default();

    let via_density =
        score_zone(ScoreStrategy::Density, &scan, &zone, None, &opts).unwrap();
    let via_subtract = score_zone(
        ScoreStrategy::ModelSubtraction,
        &scan,
        &zone,
        Some((&template, &zone)),
        &opts,
    )
    .unwrap();

    assert!(via_density.checked);
    assert!(via_subtract.checked);
}

#[test]
fn test_subtraction_not_fooled_by_printed_structure() {
    // Both scan and template carry the same printed grid; no extra ink.
    let grid = GrayRaster::from_fn(400, 400, |x, y| {
        if x % 25 == 0 || y % 25 == 0 { INK } else { PAPER }
    })
    .unwrap();
    let zone = zone_at(80);
    let score =
        score_subtraction(&grid, &zone, &grid, &zone, &SubtractOptions::default()).unwrap();
    assert!(!score.checked);
}
