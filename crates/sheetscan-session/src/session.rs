//! The encoding session
//!
//! [`EncodingSession`] owns all per-page mutable state: rotation,
//! auto-detected and operator-adjusted overlay rectangles, checked-state
//! maps, the decoded stay number. Geometry, scoring and barcode reading
//! run as pure passes over immutable snapshots; their results are
//! committed back only when the detection version captured at the start
//! of the pass is still current, so loading a new document silently
//! cancels everything in flight without cooperative cancellation tokens.
//!
//! Rotation is display-only: rasters are stored unrotated, the overlay
//! rectangle lives in model (unrotated) space, and scoring crops the
//! unrotated raster. Only barcode reading works on a rotation-corrected
//! render, since the symbology needs horizontal stripes.

use crate::drag::{DragMode, DragState};
use crate::entry::{EntrySink, PatientEntry, commit_entry};
use crate::error::{SessionError, SessionResult};
use sheetscan_barcode::{BarcodeError, BarcodeOptions, decode_in_zones};
use sheetscan_core::{
    GrayRaster, OverlayZone, PixelRect, RectPct, Rotation, SheetTemplate, compute_tight_rect,
    normalize_zones_against_rect,
};
use sheetscan_detect::{DetectError, DetectOptions, detect_content_rect};
use sheetscan_score::{ScoreOptions, ScoreStrategy, score_zone};
use std::collections::BTreeMap;

/// Transient per-page state, created lazily on first touch.
#[derive(Debug, Clone)]
struct PageState {
    rotation: Rotation,
    auto_rect: Option<RectPct>,
    overlay_rect: Option<RectPct>,
    checked: BTreeMap<String, bool>,
    barcode_attempted: bool,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            rotation: Rotation::Deg0,
            auto_rect: None,
            overlay_rect: None,
            checked: BTreeMap::new(),
            barcode_attempted: false,
        }
    }
}

/// One operator's pass over a scanned batch against a single template.
#[derive(Debug)]
pub struct EncodingSession {
    template: SheetTemplate,
    template_raster: Option<GrayRaster>,
    strategy: ScoreStrategy,
    pages: Vec<GrayRaster>,
    page_states: BTreeMap<usize, PageState>,
    stay_number: Option<String>,
    auto_barcode_enabled: bool,
    overlay_locked: bool,
    detection_version: u64,
    patient_index: u32,
    detect_options: DetectOptions,
    score_options: ScoreOptions,
    barcode_options: BarcodeOptions,
}

impl EncodingSession {
    /// Start a session against `template`. A template raster enables
    /// model-subtraction scoring; without one the session scores by
    /// adaptive density.
    pub fn new(template: SheetTemplate, template_raster: Option<GrayRaster>) -> Self {
        let strategy = ScoreStrategy::for_document(template_raster.is_some());
        Self {
            template,
            template_raster,
            strategy,
            pages: Vec::new(),
            page_states: BTreeMap::new(),
            stay_number: None,
            auto_barcode_enabled: true,
            overlay_locked: false,
            detection_version: 0,
            patient_index: 0,
            detect_options: DetectOptions::default(),
            score_options: ScoreOptions::default(),
            barcode_options: BarcodeOptions::default(),
        }
    }

    /// Override detection tunables.
    pub fn with_detect_options(mut self, options: DetectOptions) -> Self {
        self.detect_options = options;
        self
    }

    /// Override scoring tunables.
    pub fn with_score_options(mut self, options: ScoreOptions) -> Self {
        self.score_options = options;
        self
    }

    /// Override barcode tunables.
    pub fn with_barcode_options(mut self, options: BarcodeOptions) -> Self {
        self.barcode_options = options;
        self
    }

    /// Replace the loaded document. Bumps the detection version, which
    /// cancels every pass begun before this call, and drops all per-page
    /// state.
    pub fn load_document(&mut self, pages: Vec<GrayRaster>) -> u64 {
        self.pages = pages;
        self.page_states.clear();
        self.stay_number = None;
        self.patient_index = 0;
        self.detection_version += 1;
        tracing::debug!(
            version = self.detection_version,
            pages = self.pages.len(),
            "document loaded"
        );
        self.detection_version
    }

    /// Current detection version.
    pub fn version(&self) -> u64 {
        self.detection_version
    }

    /// Capture the version at the start of a detection/scoring pass.
    pub fn begin_pass(&self) -> u64 {
        self.detection_version
    }

    /// Number of loaded pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// The scoring strategy chosen at construction.
    pub fn strategy(&self) -> ScoreStrategy {
        self.strategy
    }

    /// The template this session encodes against.
    pub fn template(&self) -> &SheetTemplate {
        &self.template
    }

    fn check_page(&self, page: usize) -> SessionResult<()> {
        if page < self.pages.len() {
            Ok(())
        } else {
            Err(SessionError::PageOutOfRange(page))
        }
    }

    fn state(&self, page: usize) -> Option<&PageState> {
        self.page_states.get(&page)
    }

    fn state_mut(&mut self, page: usize) -> &mut PageState {
        self.page_states.entry(page).or_default()
    }

    /// Relative page index within one patient's template.
    fn relative_page(&self, page: usize) -> u32 {
        (page as u32) % self.template.pages_per_patient.max(1)
    }

    // ---- rotation ----------------------------------------------------

    /// Current rotation of a page.
    pub fn rotation(&self, page: usize) -> Rotation {
        self.state(page).map_or(Rotation::Deg0, |s| s.rotation)
    }

    /// Rotate a page a quarter turn clockwise. Resets the page's
    /// auto-barcode latch: a new orientation deserves a new attempt.
    pub fn rotate_page(&mut self, page: usize) -> SessionResult<Rotation> {
        self.check_page(page)?;
        let state = self.state_mut(page);
        state.rotation = state.rotation.plus_quarter();
        state.barcode_attempted = false;
        Ok(state.rotation)
    }

    /// The page raster as displayed, rotation applied.
    pub fn rotated_page(&self, page: usize) -> SessionResult<GrayRaster> {
        self.check_page(page)?;
        Ok(self.pages[page].rotate_orth(self.rotation(page)))
    }

    // ---- overlay geometry --------------------------------------------

    /// The page's overlay rectangle, model space.
    pub fn overlay_rect(&self, page: usize) -> Option<RectPct> {
        self.state(page).and_then(|s| s.overlay_rect)
    }

    /// The last auto-detected content rectangle, model space.
    pub fn auto_rect(&self, page: usize) -> Option<RectPct> {
        self.state(page).and_then(|s| s.auto_rect)
    }

    /// Manually place the overlay rectangle. Like rotation, a moved
    /// overlay re-arms the page's auto-barcode latch: the barcode zones
    /// now cover different pixels.
    pub fn set_overlay_rect(&mut self, page: usize, rect: RectPct) -> SessionResult<()> {
        self.check_page(page)?;
        let state = self.state_mut(page);
        state.overlay_rect = Some(rect);
        state.barcode_attempted = false;
        Ok(())
    }

    /// Toggle the overlay lock. While locked, pointer-downs are ignored.
    pub fn set_overlay_locked(&mut self, locked: bool) {
        self.overlay_locked = locked;
    }

    /// Whether the overlay is locked against drags.
    pub fn overlay_locked(&self) -> bool {
        self.overlay_locked
    }

    /// Begin a drag on the page's overlay. Returns `None` while the
    /// overlay is locked; a missing overlay rectangle is an error, the
    /// UI offers no handles to grab without one.
    pub fn begin_drag(&self, page: usize, mode: DragMode) -> SessionResult<Option<DragState>> {
        self.check_page(page)?;
        if self.overlay_locked {
            return Ok(None);
        }
        let rect = self
            .overlay_rect(page)
            .ok_or(SessionError::GeometryUnavailable(page))?;
        Ok(Some(DragState::begin(mode, rect, self.rotation(page))))
    }

    /// Apply the cumulative display delta of an active drag and store
    /// the resulting rectangle.
    pub fn apply_drag(
        &mut self,
        page: usize,
        drag: &DragState,
        display_dx: f64,
        display_dy: f64,
    ) -> SessionResult<RectPct> {
        self.check_page(page)?;
        let rect = drag.resolve(display_dx, display_dy)?;
        let state = self.state_mut(page);
        state.overlay_rect = Some(rect);
        state.barcode_attempted = false;
        Ok(rect)
    }

    // ---- content-rect detection --------------------------------------

    /// Pure detection pass over one page's unrotated raster.
    pub fn compute_content_rect(&self, page: usize) -> SessionResult<RectPct> {
        self.check_page(page)?;
        Ok(detect_content_rect(&self.pages[page], &self.detect_options)?)
    }

    /// Commit a detected rectangle if the pass is still current. Sets
    /// both the auto rect and the live overlay rect.
    pub fn commit_content_rect(&mut self, page: usize, pass: u64, rect: RectPct) -> bool {
        if pass != self.detection_version {
            tracing::debug!(page, pass, current = self.detection_version, "stale detection discarded");
            return false;
        }
        let state = self.state_mut(page);
        state.auto_rect = Some(rect);
        state.overlay_rect = Some(rect);
        state.barcode_attempted = false;
        true
    }

    /// Detect and commit in one step.
    pub fn detect_page(&mut self, page: usize) -> SessionResult<Option<RectPct>> {
        let pass = self.begin_pass();
        let rect = self.compute_content_rect(page)?;
        Ok(self.commit_content_rect(page, pass, rect).then_some(rect))
    }

    /// Detect every loaded page, one at a time, checking the version
    /// between pages so a new import cancels the remainder. Blank pages
    /// are skipped. Returns how many pages got a committed rectangle.
    pub fn preanalyze_pages(&mut self) -> SessionResult<usize> {
        let pass = self.begin_pass();
        let mut committed = 0usize;
        for page in 0..self.pages.len() {
            if pass != self.detection_version {
                tracing::debug!(pass, "pre-analysis canceled by new import");
                break;
            }
            match self.compute_content_rect(page) {
                Ok(rect) => {
                    if self.commit_content_rect(page, pass, rect) {
                        committed += 1;
                    }
                }
                Err(SessionError::Detect(DetectError::NoContent)) => {
                    tracing::debug!(page, "blank page skipped in pre-analysis");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(committed)
    }

    // ---- zones and scoring -------------------------------------------

    /// The page's reference rectangle on the template: the stored one,
    /// else the tight bound of the page's zones, else the full page.
    fn template_reference_rect(&self, rel_page: u32) -> SessionResult<RectPct> {
        if let Some(rect) = self.template.reference_rect {
            return Ok(rect);
        }
        let tight = compute_tight_rect(&self.template.zones, rel_page, 0.0)?;
        Ok(tight.unwrap_or_else(RectPct::full_page))
    }

    /// The page's zones re-expressed relative to the reference
    /// rectangle, i.e. in overlay coordinates. This is what the overlay
    /// UI renders inside the drag rectangle.
    pub fn normalized_zones(&self, page: usize) -> SessionResult<Vec<OverlayZone>> {
        self.check_page(page)?;
        let rel = self.relative_page(page);
        let reference = self.template_reference_rect(rel)?;
        let zones: Vec<OverlayZone> = self.template.zones_on_page(rel).cloned().collect();
        Ok(normalize_zones_against_rect(&zones, rel, &reference)?)
    }

    /// Each zone on the page paired with its model-space page rectangle,
    /// resolved through the overlay rectangle.
    fn zone_page_rects(&self, page: usize) -> SessionResult<Vec<(OverlayZone, RectPct)>> {
        let overlay = self
            .overlay_rect(page)
            .ok_or(SessionError::GeometryUnavailable(page))?;
        let normalized = self.normalized_zones(page)?;
        Ok(normalized
            .into_iter()
            .map(|z| {
                let rect = z.resolve_against(&overlay);
                (z, rect)
            })
            .collect())
    }

    /// Pure scoring pass: every non-barcode zone on the page against the
    /// unrotated raster snapshot.
    pub fn compute_scores(&self, page: usize) -> SessionResult<BTreeMap<String, bool>> {
        self.check_page(page)?;
        let scan = &self.pages[page];
        let rel = self.relative_page(page);
        let template_side: Vec<&OverlayZone> = self.template.zones_on_page(rel).collect();

        let mut scores = BTreeMap::new();
        for ((zone, page_rect), template_zone) in
            self.zone_page_rects(page)?.iter().zip(template_side)
        {
            if zone.is_barcode {
                continue;
            }
            let scan_px = PixelRect::from_pct(page_rect, scan.width(), scan.height())?;

            let template_pair = match (&self.template_raster, self.strategy) {
                (Some(raster), ScoreStrategy::ModelSubtraction) => {
                    let template_px = PixelRect::from_pct(
                        &template_zone.rect(),
                        raster.width(),
                        raster.height(),
                    )?;
                    Some((raster, template_px))
                }
                _ => None,
            };
            let template_ref = template_pair.as_ref().map(|(r, px)| (*r, px));

            let score = score_zone(self.strategy, scan, &scan_px, template_ref, &self.score_options)?;
            scores.insert(zone.id.clone(), score.checked);
        }
        tracing::debug!(page, zones = scores.len(), "page scored");
        Ok(scores)
    }

    /// Commit a full page of scores atomically if the pass is still
    /// current: the page's checked map is replaced wholesale, never
    /// partially updated.
    pub fn commit_scores(&mut self, page: usize, pass: u64, scores: BTreeMap<String, bool>) -> bool {
        if pass != self.detection_version {
            tracing::debug!(page, pass, current = self.detection_version, "stale scores discarded");
            return false;
        }
        self.state_mut(page).checked = scores;
        true
    }

    /// Score and commit in one step.
    pub fn score_page(&mut self, page: usize) -> SessionResult<Option<BTreeMap<String, bool>>> {
        let pass = self.begin_pass();
        let scores = self.compute_scores(page)?;
        Ok(self
            .commit_scores(page, pass, scores.clone())
            .then_some(scores))
    }

    /// The page's committed checked state.
    pub fn checked_state(&self, page: usize) -> BTreeMap<String, bool> {
        self.state(page).map(|s| s.checked.clone()).unwrap_or_default()
    }

    /// Operator override for a single zone.
    pub fn set_zone_checked(&mut self, page: usize, zone_id: &str, checked: bool) -> SessionResult<()> {
        self.check_page(page)?;
        self.state_mut(page).checked.insert(zone_id.to_string(), checked);
        Ok(())
    }

    // ---- barcode -----------------------------------------------------

    /// The decoded stay number, if any.
    pub fn stay_number(&self) -> Option<&str> {
        self.stay_number.as_deref()
    }

    /// Globally enable or disable the auto-barcode trigger.
    pub fn set_auto_barcode(&mut self, enabled: bool) {
        self.auto_barcode_enabled = enabled;
    }

    /// Barcode-flagged zones as pixel rects on the rotated page render.
    fn barcode_zone_rects(&self, page: usize, rotated: &GrayRaster) -> SessionResult<Vec<PixelRect>> {
        let rotation = self.rotation(page);
        let mut rects = Vec::new();
        for (zone, page_rect) in self.zone_page_rects(page)? {
            if !zone.is_barcode {
                continue;
            }
            let display_rect = page_rect.rotate(rotation);
            rects.push(PixelRect::from_pct(
                &display_rect,
                rotated.width(),
                rotated.height(),
            )?);
        }
        Ok(rects)
    }

    /// Explicit barcode read over the page's barcode zones. Updates the
    /// stay number on success; all-zones failure surfaces as
    /// [`BarcodeError::NoBarcode`].
    pub fn decode_barcode(&mut self, page: usize) -> SessionResult<String> {
        let rotated = self.rotated_page(page)?;
        let zones = self.barcode_zone_rects(page, &rotated)?;
        let found = decode_in_zones(&rotated, &zones, &self.barcode_options)?;
        tracing::debug!(page, zone = found.zone_index, "barcode decoded");
        self.stay_number = Some(found.digits.clone());
        Ok(found.digits)
    }

    /// Auto-barcode trigger, fired after a change event on the page.
    ///
    /// Attempts at most once per page per change event (rotation and
    /// overlay placement both reset the latch), never when a stay
    /// number is already present, and only
    /// while the global toggle is on. A failed read is a non-fatal
    /// `None`, reported here once rather than raised.
    pub fn try_auto_barcode(&mut self, page: usize) -> SessionResult<Option<String>> {
        self.check_page(page)?;
        if !self.auto_barcode_enabled || self.stay_number.is_some() {
            return Ok(None);
        }
        if self.state(page).is_some_and(|s| s.barcode_attempted) {
            return Ok(None);
        }
        self.state_mut(page).barcode_attempted = true;

        match self.decode_barcode(page) {
            Ok(digits) => Ok(Some(digits)),
            Err(SessionError::Barcode(BarcodeError::NoBarcode)) => {
                tracing::debug!(page, "auto barcode attempt found nothing");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    // ---- patient lifecycle -------------------------------------------

    /// Zero-based index of the patient currently being encoded.
    pub fn patient_index(&self) -> u32 {
        self.patient_index
    }

    /// Absolute page range of the current patient.
    fn patient_pages(&self) -> std::ops::Range<usize> {
        let ppp = self.template.pages_per_patient.max(1) as usize;
        let first = self.patient_index as usize * ppp;
        first..(first + ppp).min(self.pages.len().max(first))
    }

    /// Commit the current patient to `sink` and advance to the next.
    ///
    /// On success the checked state, stay number and barcode latches of
    /// the committed pages are reset; rotation and overlay rectangles are
    /// retained so the operator keeps their calibration. On failure
    /// nothing advances.
    pub fn commit_patient<S: EntrySink>(
        &mut self,
        sink: &mut S,
        doctor_id: Option<String>,
        dates: Vec<String>,
        created_at: String,
    ) -> SessionResult<PatientEntry> {
        let pages_range = self.patient_pages();
        let mut zones_checked = BTreeMap::new();
        for page in pages_range.clone() {
            let rel = self.relative_page(page);
            zones_checked.insert(rel, self.checked_state(page));
        }

        let entry = PatientEntry {
            patient_index: self.patient_index,
            pages: self.template.pages_per_patient,
            sheet_id: self.template.id.clone(),
            doctor_id,
            stay_number: self.stay_number.clone(),
            dates,
            zones_checked,
            created_at,
        };

        commit_entry(sink, &entry)?;
        tracing::debug!(patient = entry.patient_index, "patient committed");

        for page in pages_range {
            if let Some(state) = self.page_states.get_mut(&page) {
                state.checked.clear();
                state.barcode_attempted = false;
            }
        }
        self.stay_number = None;
        self.patient_index += 1;
        Ok(entry)
    }

    /// Re-open a committed patient for correction. Restores its checked
    /// state and stay number into the session; the eventual re-commit
    /// appends a fresh entry, the original record is never edited.
    pub fn unlock_patient(&mut self, entry: &PatientEntry) -> SessionResult<()> {
        self.patient_index = entry.patient_index;
        self.stay_number = entry.stay_number.clone();
        let pages_range = self.patient_pages();
        for page in pages_range {
            let rel = self.relative_page(page);
            if let Some(checked) = entry.zones_checked.get(&rel) {
                self.state_mut(page).checked = checked.clone();
            }
        }
        Ok(())
    }
}
