//! Per-page stroke storage
//!
//! Each page keeps two disjoint stroke sets: page-anchored strokes in
//! normalized page space, and margin-anchored strokes in raw surface space.
//! The union of both, converted to surface space for the current geometry,
//! is exactly what the user sees.

use crate::geometry::{Rect, Size};
use crate::stroke::{Affine, Stroke, StrokeId};
use crate::transform::{CoordinateTransformer, Region, FRAME_EPSILON};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Strokes stored for one page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageStrokeSet {
    /// Normalized ([0,1] relative to the true page size)
    pub page_anchored: Vec<Stroke>,

    /// Surface space at the time of drawing
    pub margin_anchored: Vec<Stroke>,

    /// Page frame the set was last saved against (not persisted)
    #[serde(skip)]
    saved_frame: Option<Rect>,
}

impl PageStrokeSet {
    pub fn new(page_anchored: Vec<Stroke>, margin_anchored: Vec<Stroke>) -> Self {
        Self { page_anchored, margin_anchored, saved_frame: None }
    }

    pub fn len(&self) -> usize {
        self.page_anchored.len() + self.margin_anchored.len()
    }

    pub fn is_empty(&self) -> bool {
        self.page_anchored.is_empty() && self.margin_anchored.is_empty()
    }

    /// Page frame the set was last saved against, if saved this session
    pub fn saved_frame(&self) -> Option<Rect> {
        self.saved_frame
    }

    /// Convert to surface space for `transformer`'s geometry.
    ///
    /// Page-anchored strokes come first, then margin-anchored ones.
    pub fn to_surface(&self, transformer: &CoordinateTransformer) -> Vec<Stroke> {
        self.page_anchored
            .iter()
            .map(|stroke| transformer.denormalize(stroke))
            .chain(self.margin_anchored.iter().cloned())
            .collect()
    }

    /// Partition a surface-space drawing against `transformer`'s page frame
    pub fn partition(drawing: &[Stroke], transformer: &CoordinateTransformer) -> Self {
        let mut page_anchored = Vec::new();
        let mut margin_anchored = Vec::new();

        for stroke in drawing {
            match transformer.classify_stroke(stroke) {
                Region::Page => page_anchored.push(transformer.normalize(stroke)),
                Region::Margin => margin_anchored.push(stroke.clone()),
            }
        }

        log::trace!(
            "partitioned {} strokes: {} page, {} margin",
            drawing.len(),
            page_anchored.len(),
            margin_anchored.len()
        );

        Self { page_anchored, margin_anchored, saved_frame: Some(transformer.page_rect()) }
    }
}

/// Stroke sets keyed by page index
#[derive(Debug, Clone, Default)]
pub struct PerPageStrokeStore {
    pages: BTreeMap<usize, PageStrokeSet>,
}

impl PerPageStrokeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Partition the live surface drawing and store it for `page_index`,
    /// replacing any prior entry.
    ///
    /// `transformer` must describe the geometry the drawing was made in.
    /// Without one nothing is stored and `false` is returned.
    pub fn save(
        &mut self,
        page_index: usize,
        drawing: &[Stroke],
        transformer: Option<&CoordinateTransformer>,
    ) -> bool {
        let Some(transformer) = transformer else {
            log::warn!("save for page {page_index} skipped: no page geometry established");
            return false;
        };

        let set = PageStrokeSet::partition(drawing, transformer);
        self.pages.insert(page_index, set);
        true
    }

    /// Classify one surface-space stroke and add it to the page's set.
    ///
    /// Only the new stroke is classified; strokes already stored keep their
    /// set. Returns the region the stroke landed in.
    pub fn append(
        &mut self,
        page_index: usize,
        stroke: Stroke,
        transformer: &CoordinateTransformer,
    ) -> Region {
        let region = transformer.classify_stroke(&stroke);
        let set = self.pages.entry(page_index).or_default();
        match region {
            Region::Page => set.page_anchored.push(transformer.normalize(&stroke)),
            Region::Margin => set.margin_anchored.push(stroke),
        }
        set.saved_frame = Some(transformer.page_rect());
        region
    }

    /// Drop strokes by id from both sets of a page. Returns how many went.
    pub fn remove_strokes(&mut self, page_index: usize, ids: &[StrokeId]) -> usize {
        let Some(set) = self.pages.get_mut(&page_index) else {
            return 0;
        };

        let before = set.len();
        set.page_anchored.retain(|stroke| !ids.contains(&stroke.id()));
        set.margin_anchored.retain(|stroke| !ids.contains(&stroke.id()));
        before - set.len()
    }

    /// Surface-space drawing for `page_index` under the current geometry.
    ///
    /// Empty when the page has no strokes or no geometry is established.
    pub fn load(
        &self,
        page_index: usize,
        transformer: Option<&CoordinateTransformer>,
    ) -> Vec<Stroke> {
        let Some(transformer) = transformer else {
            log::debug!("load for page {page_index} returned nothing: no page geometry");
            return Vec::new();
        };

        self.pages
            .get(&page_index)
            .map(|set| set.to_surface(transformer))
            .unwrap_or_default()
    }

    /// Re-partition a page after its margin settings changed.
    ///
    /// The drawing is materialized as it appeared under `old`, then every
    /// stroke is classified against `new` and the page subset renormalized.
    /// Strokes keep their on-screen position at the moment of the change and
    /// each lands in exactly one set. A set already saved against `new`'s
    /// frame is left untouched, so repeating the call is a no-op.
    pub fn reclassify_on_margin_change(
        &mut self,
        page_index: usize,
        old: &CoordinateTransformer,
        new: &CoordinateTransformer,
    ) {
        let Some(set) = self.pages.get(&page_index) else {
            return;
        };

        if set.saved_frame.is_some_and(|frame| frame.approx_eq(&new.page_rect(), FRAME_EPSILON)) {
            log::debug!("page {page_index} already expressed against the new frame");
            return;
        }

        let drawing = set.to_surface(old);
        let before = drawing.len();
        let reclassified = PageStrokeSet::partition(&drawing, new);
        debug_assert_eq!(reclassified.len(), before);

        log::debug!(
            "reclassified page {page_index}: {} page, {} margin",
            reclassified.page_anchored.len(),
            reclassified.margin_anchored.len()
        );
        self.pages.insert(page_index, reclassified);
    }

    /// Adopt strokes authored before the dual-space model.
    ///
    /// `strokes` are in page points (origin at the page's top-left corner,
    /// `true_page_size` being the on-screen page dimensions); all of them
    /// become page-anchored. Refused when the page already has strokes.
    pub fn migrate_legacy(
        &mut self,
        page_index: usize,
        strokes: Vec<Stroke>,
        true_page_size: Size,
    ) -> bool {
        if self.pages.get(&page_index).is_some_and(|set| !set.is_empty()) {
            log::warn!("legacy migration for page {page_index} skipped: page already has strokes");
            return false;
        }
        if !true_page_size.has_area() {
            log::warn!("legacy migration for page {page_index} skipped: page has no area");
            return false;
        }

        let to_unit = Affine::scale(1.0 / true_page_size.width, 1.0 / true_page_size.height);
        let page_anchored = strokes.iter().map(|stroke| stroke.transformed(&to_unit)).collect();
        self.pages.insert(page_index, PageStrokeSet::new(page_anchored, Vec::new()));
        true
    }

    pub fn get(&self, page_index: usize) -> Option<&PageStrokeSet> {
        self.pages.get(&page_index)
    }

    /// Replace the stored set for a page verbatim
    pub fn insert(&mut self, page_index: usize, set: PageStrokeSet) {
        self.pages.insert(page_index, set);
    }

    pub fn remove(&mut self, page_index: usize) -> Option<PageStrokeSet> {
        self.pages.remove(&page_index)
    }

    /// Pages with stored strokes, in index order
    pub fn pages(&self) -> impl Iterator<Item = (usize, &PageStrokeSet)> {
        self.pages.iter().map(|(index, set)| (*index, set))
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn clear(&mut self) {
        self.pages.clear();
    }
}
