//! Surface lifecycle coordination
//!
//! The façade the presentation layer drives. It owns the geometry, the
//! stroke store, the tool controller and the mode state machine, and keeps
//! the physical drawing surface in step with them:
//!
//! 1. Page switch: rebuild geometry -> load new page -> resize surface
//! 2. Rotation change: rebuild geometry -> load
//! 3. Margin change: rebuild geometry -> reclassify strokes -> load
//! 4. Stroke edit: classify the edited stroke -> normalize -> store
//!
//! The store is current after every edit, so geometry changes never
//! re-partition ink drawn under an earlier geometry.
//!
//! Every mutation completes before the triggering call returns. Repeating
//! an identical request is a no-op.

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::geometry::{GeometryModel, MarginSettings, PageFrame, Point, Rotation};
use crate::history::EditHistory;
use crate::layout;
use crate::margin_store::{fit_to_page_count, InMemoryMarginStore, MarginSettingsStore};
use crate::pages::PageSource;
use crate::persistence::{decode_page, encode_store, DecodedPage};
use crate::store::{PageStrokeSet, PerPageStrokeStore};
use crate::stroke::{Stroke, StrokeId, StrokeStyle};
use crate::tool::{DrawingSurface, Tool, ToolStateController};
use crate::transform::CoordinateTransformer;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

/// Interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// No interaction
    #[default]
    Idle,
    /// Ink or eraser active; content selection inert
    Drawing,
    /// Transient lasso/selection; drawing inert
    Selecting,
}

/// Callbacks to the presentation layer. All methods default to no-ops.
pub trait EngineObserver {
    fn on_drawing_changed(
        &self,
        _page_index: usize,
        _page_anchored: &[Stroke],
        _margin_anchored: &[Stroke],
    ) {
    }

    fn on_mode_changed(&self, _mode: Mode) {}

    fn on_tool_changed(&self, _tool: &Tool) {}
}

/// Outcome of importing persisted page blobs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Pages loaded from current-format blobs
    pub loaded: Vec<usize>,
    /// Pages migrated from legacy blobs
    pub migrated: Vec<usize>,
    /// Pages whose blob failed to decode (treated as empty)
    pub failed: Vec<usize>,
    /// Blobs for indices outside the document
    pub skipped: Vec<usize>,
}

/// Orchestrates geometry, stroke storage, tools and surfaces
pub struct SurfaceLifecycleCoordinator<P: PageSource> {
    pages: P,
    config: EngineConfig,
    margin_store: Box<dyn MarginSettingsStore>,
    page_set_id: String,
    margins: Vec<MarginSettings>,

    current_page: Option<usize>,
    view_rotation: Rotation,
    zoom: f32,
    pan: Point,
    geometry: Option<GeometryModel>,
    transformer: Option<CoordinateTransformer>,

    store: PerPageStrokeStore,
    tools: ToolStateController,
    mode: Mode,
    /// Live surface drawing for the current page (surface space)
    drawing: Vec<Stroke>,
    history: EditHistory,

    surface: Option<Weak<dyn DrawingSurface>>,
    observers: Vec<Box<dyn EngineObserver>>,
}

impl<P: PageSource> SurfaceLifecycleCoordinator<P> {
    /// Create a coordinator for a document.
    ///
    /// Margin settings for `page_set_id` are loaded from `margin_store`; a
    /// store failure is logged and every page starts with margins disabled.
    /// No page is current until [`set_current_page`](Self::set_current_page).
    pub fn new(
        pages: P,
        config: EngineConfig,
        margin_store: Box<dyn MarginSettingsStore>,
        page_set_id: impl Into<String>,
    ) -> EngineResult<Self> {
        config.validate()?;
        let page_set_id = page_set_id.into();

        let stored = margin_store.load(&page_set_id).unwrap_or_else(|err| {
            log::warn!("could not load margin settings for {page_set_id:?}: {err}");
            None
        });
        let margins = fit_to_page_count(stored, pages.page_count());

        Ok(Self {
            tools: ToolStateController::new(config.default_pen),
            history: EditHistory::new(config.max_undo_depth),
            pages,
            config,
            margin_store,
            page_set_id,
            margins,
            current_page: None,
            view_rotation: Rotation::Deg0,
            zoom: 1.0,
            pan: Point::default(),
            geometry: None,
            transformer: None,
            store: PerPageStrokeStore::new(),
            mode: Mode::Idle,
            drawing: Vec::new(),
            surface: None,
            observers: Vec::new(),
        })
    }

    /// Coordinator with margin settings kept in memory only
    pub fn in_memory(pages: P, config: EngineConfig) -> EngineResult<Self> {
        Self::new(pages, config, Box::new(InMemoryMarginStore::new()), "in-memory")
    }

    pub fn add_observer(&mut self, observer: Box<dyn EngineObserver>) {
        self.observers.push(observer);
    }

    // ---------------------------------------------------------------
    // Surfaces
    // ---------------------------------------------------------------

    /// Attach a freshly created physical surface.
    ///
    /// The surface is registered for tool broadcasts and brought up to date
    /// with the current size, drawing, tool and selection state. The engine
    /// keeps only a weak handle; dropping the surface is always safe.
    pub fn attach_surface(&mut self, surface: Rc<dyn DrawingSurface>) {
        self.tools.register(&surface);
        if let Some(frame) = self.page_frame() {
            surface.resize(frame.surface);
        }
        surface.set_drawing(&self.drawing);
        surface.set_selection_active(self.mode == Mode::Selecting);
        self.surface = Some(Rc::downgrade(&surface));
    }

    /// Detach a surface on teardown
    pub fn detach_surface(&mut self, surface: &Rc<dyn DrawingSurface>) {
        self.tools.unregister(surface);
        let is_primary = self
            .surface
            .as_ref()
            .is_some_and(|current| std::ptr::addr_eq(current.as_ptr(), Rc::as_ptr(surface)));
        if is_primary {
            self.surface = None;
        }
    }

    // ---------------------------------------------------------------
    // Geometry events
    // ---------------------------------------------------------------

    /// Switch the page being edited.
    ///
    /// An out-of-range index is logged and rejected without touching any
    /// state.
    pub fn set_current_page(&mut self, index: usize) -> EngineResult<()> {
        let count = self.pages.page_count();
        if index >= count {
            log::warn!("ignoring switch to page {index}: document has {count} page(s)");
            return Err(EngineError::InvalidPageIndex { index, count });
        }
        if self.current_page == Some(index) && self.geometry.is_some() {
            log::debug!("page {index} already current");
            return Ok(());
        }

        self.current_page = Some(index);
        self.history.clear();
        self.rebuild_geometry();
        self.drawing = self.store.load(index, self.transformer.as_ref());
        self.refresh_surface(true);
        self.notify_drawing_changed();
        Ok(())
    }

    /// Update the view rotation (composed with the page's own rotation) and
    /// zoom. A rotation change rebuilds the surface; a zoom change only
    /// updates the view mapping.
    pub fn set_rotation_and_zoom(&mut self, rotation: Rotation, zoom: f32) -> EngineResult<()> {
        if !(zoom.is_finite() && zoom > 0.0) {
            log::warn!("ignoring invalid zoom {zoom}");
            return Err(EngineError::InvalidZoom(zoom));
        }

        let rotation_changed = rotation != self.view_rotation;
        let zoom_changed = (zoom - self.zoom).abs() > f32::EPSILON;
        if !rotation_changed && !zoom_changed {
            return Ok(());
        }

        self.zoom = zoom;
        if !rotation_changed {
            if let Some(transformer) = self.transformer {
                self.transformer = Some(transformer.with_zoom_and_pan(self.zoom, self.pan)?);
            }
            return Ok(());
        }

        self.view_rotation = rotation;
        self.history.clear();
        self.rebuild_geometry();
        if let Some(index) = self.current_page {
            self.drawing = self.store.load(index, self.transformer.as_ref());
        }
        self.refresh_surface(true);
        self.notify_drawing_changed();
        Ok(())
    }

    /// Update the pan offset of the view mapping
    pub fn set_pan(&mut self, pan: Point) -> EngineResult<()> {
        self.pan = pan;
        if let Some(transformer) = self.transformer {
            self.transformer = Some(transformer.with_zoom_and_pan(self.zoom, self.pan)?);
        }
        Ok(())
    }

    /// Change the current page's margin settings.
    ///
    /// Strokes already on the surface are reclassified against the new page
    /// frame, then the settings list is persisted. Failing to persist is
    /// logged, not returned.
    pub fn update_margin_settings(&mut self, settings: MarginSettings) -> EngineResult<()> {
        if let Err(err) = settings.validate() {
            log::warn!("ignoring margin settings: {err}");
            return Err(err);
        }
        let Some(index) = self.current_page else {
            log::warn!("ignoring margin settings: no current page");
            return Ok(());
        };
        let Some(previous) = self.margins.get(index).copied() else {
            return Err(EngineError::InvalidPageIndex { index, count: self.margins.len() });
        };
        if previous == settings {
            return Ok(());
        }

        self.margins[index] = settings;
        self.persist_margins();

        if previous.same_placement(&settings) {
            log::debug!("margin settings for page {index} changed without moving the page");
            self.rebuild_geometry();
            return Ok(());
        }

        let old = self.transformer;
        self.rebuild_geometry();
        if let (Some(old), Some(new)) = (old.as_ref(), self.transformer.as_ref()) {
            self.store.reclassify_on_margin_change(index, old, new);
        }
        self.history.clear();
        self.drawing = self.store.load(index, self.transformer.as_ref());
        self.refresh_surface(false);
        self.notify_drawing_changed();
        Ok(())
    }

    // ---------------------------------------------------------------
    // Modes and tools
    // ---------------------------------------------------------------

    /// Switch interaction mode. Entering selection backs up the tool;
    /// leaving it restores and rebroadcasts the tool.
    pub fn set_mode(&mut self, mode: Mode) {
        if mode == self.mode {
            return;
        }
        let previous = self.mode;
        log::debug!("mode {previous:?} -> {mode:?}");

        if previous == Mode::Selecting {
            self.set_selection_routing(false);
            if let Some(tool) = self.tools.exit_selection_mode() {
                self.notify_tool_changed(&tool);
            }
        }
        if mode == Mode::Selecting {
            self.tools.enter_selection_mode();
            self.set_selection_routing(true);
        }

        self.mode = mode;
        for observer in &self.observers {
            observer.on_mode_changed(mode);
        }
    }

    pub fn set_ink_tool(&mut self, style: StrokeStyle) {
        self.pick_tool(Tool::Ink(style));
    }

    pub fn set_eraser(&mut self) {
        self.pick_tool(Tool::Eraser);
    }

    fn pick_tool(&mut self, tool: Tool) {
        if self.tools.current() == Some(tool) {
            log::debug!("tool {tool:?} already picked");
            return;
        }
        let tool = match tool {
            Tool::Ink(style) => self.tools.set_ink(style),
            Tool::Eraser => self.tools.set_eraser(),
        };
        self.notify_tool_changed(&tool);
    }

    // ---------------------------------------------------------------
    // Stroke edits
    // ---------------------------------------------------------------

    /// Commit a stroke captured by the surface (surface space).
    ///
    /// Accepted only while drawing with an ink tool on an established page.
    pub fn add_stroke(&mut self, stroke: Stroke) -> bool {
        if self.mode != Mode::Drawing || self.tools.active_tool().is_eraser() {
            log::debug!("stroke ignored: not inking (mode {:?})", self.mode);
            return false;
        }
        let Some((index, transformer)) = self.begin_edit() else {
            return false;
        };
        let region = self.store.append(index, stroke.clone(), &transformer);
        log::trace!("stroke {} on page {index} is {region:?}-anchored", stroke.id());
        self.drawing.push(stroke);
        self.commit_edit(false);
        true
    }

    /// Erase strokes under a surface-space point. `radius` defaults to the
    /// configured eraser radius. Returns how many strokes were removed.
    pub fn erase_at(&mut self, point: Point, radius: Option<f32>) -> usize {
        if self.mode != Mode::Drawing || !self.tools.active_tool().is_eraser() {
            log::debug!("erase ignored: eraser not active (mode {:?})", self.mode);
            return 0;
        }
        let radius = radius.unwrap_or(self.config.eraser_radius);
        let erased: Vec<StrokeId> = self
            .drawing
            .iter()
            .filter(|stroke| stroke.hits(&point, radius))
            .map(Stroke::id)
            .collect();
        if erased.is_empty() {
            return 0;
        }
        let Some((index, _)) = self.begin_edit() else {
            return 0;
        };
        let removed = self.store.remove_strokes(index, &erased);
        if removed != erased.len() {
            log::warn!("page {index}: erased {} stroke(s) but {removed} were stored", erased.len());
        }
        self.drawing.retain(|stroke| !erased.contains(&stroke.id()));
        self.commit_edit(true);
        erased.len()
    }

    /// Replace the whole surface drawing (e.g. after a lasso move).
    ///
    /// The only edit that re-partitions the page: every stroke is classified
    /// against the current frame.
    pub fn replace_drawing(&mut self, strokes: Vec<Stroke>) -> bool {
        let Some((index, transformer)) = self.begin_edit() else {
            return false;
        };
        self.drawing = strokes;
        self.store.save(index, &self.drawing, Some(&transformer));
        self.commit_edit(false);
        true
    }

    pub fn undo(&mut self) -> bool {
        let Some(index) = self.current_page else {
            return false;
        };
        let current = self.store.get(index).cloned().unwrap_or_default();
        let Some(previous) = self.history.undo(current) else {
            return false;
        };
        self.restore_snapshot(index, previous);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(index) = self.current_page else {
            return false;
        };
        let current = self.store.get(index).cloned().unwrap_or_default();
        let Some(next) = self.history.redo(current) else {
            return false;
        };
        self.restore_snapshot(index, next);
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ---------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------

    /// Serialize every page's strokes to independent blobs
    pub fn export_page_blobs(&self) -> EngineResult<BTreeMap<usize, Vec<u8>>> {
        encode_store(&self.store)
    }

    /// Load persisted page blobs, replacing stored strokes for those pages.
    ///
    /// A blob that fails to decode leaves its page empty; the rest still load.
    /// Legacy blobs are migrated as page-anchored strokes.
    pub fn import_page_blobs(&mut self, blobs: BTreeMap<usize, Vec<u8>>) -> ImportReport {
        let mut report = ImportReport::default();
        let count = self.pages.page_count();

        for (index, bytes) in blobs {
            if index >= count {
                log::warn!("skipping stroke blob for page {index}: document has {count} page(s)");
                report.skipped.push(index);
                continue;
            }

            match decode_page(&bytes) {
                Ok(DecodedPage::Current(set)) => {
                    self.store.insert(index, set);
                    report.loaded.push(index);
                }
                Ok(DecodedPage::Legacy(strokes)) => {
                    self.store.remove(index);
                    let true_size = self
                        .pages
                        .page_size(index)
                        .map(|size| layout::true_size(size, self.pages.page_rotation(index)))
                        .unwrap_or_default();
                    if self.store.migrate_legacy(index, strokes, true_size) {
                        report.migrated.push(index);
                    } else {
                        report.failed.push(index);
                    }
                }
                Err(err) => {
                    log::warn!("stroke blob for page {index} unreadable, treating as empty: {err}");
                    self.store.remove(index);
                    report.failed.push(index);
                }
            }
        }

        if let Some(index) = self.current_page {
            self.history.clear();
            self.drawing = self.store.load(index, self.transformer.as_ref());
            self.refresh_surface(false);
            self.notify_drawing_changed();
        }
        report
    }

    // ---------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn active_tool(&self) -> Tool {
        self.tools.active_tool()
    }

    pub fn tools(&self) -> &ToolStateController {
        &self.tools
    }

    pub fn current_page(&self) -> Option<usize> {
        self.current_page
    }

    /// Surface-space drawing currently shown
    pub fn drawing(&self) -> &[Stroke] {
        &self.drawing
    }

    pub fn geometry(&self) -> Option<&GeometryModel> {
        self.geometry.as_ref()
    }

    pub fn page_frame(&self) -> Option<PageFrame> {
        self.transformer.map(|transformer| *transformer.frame())
    }

    pub fn transformer(&self) -> Option<&CoordinateTransformer> {
        self.transformer.as_ref()
    }

    pub fn store(&self) -> &PerPageStrokeStore {
        &self.store
    }

    pub fn margin_settings(&self, index: usize) -> Option<MarginSettings> {
        self.margins.get(index).copied()
    }

    pub fn view_rotation(&self) -> Rotation {
        self.view_rotation
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn pages(&self) -> &P {
        &self.pages
    }

    // ---------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------

    fn rebuild_geometry(&mut self) {
        self.geometry = None;
        self.transformer = None;

        let Some(index) = self.current_page else {
            return;
        };
        let Some(page_size) = self.pages.page_size(index) else {
            log::warn!("page {index} has no size; nothing to draw");
            return;
        };

        let model = GeometryModel {
            page_index: index,
            page_size,
            rotation: self.pages.page_rotation(index).plus(self.view_rotation),
            margin: self.margins.get(index).copied().unwrap_or_default(),
            expansion_factor: self.config.expansion_factor,
        };
        let frame = layout::resolve_model(&model);
        self.geometry = Some(model);

        match CoordinateTransformer::with_view(frame, self.zoom, self.pan) {
            Ok(transformer) => {
                log::debug!(
                    "page {index}: frame {:?} in surface {:?} (rotation {}°)",
                    frame.rect,
                    frame.surface,
                    model.rotation.degrees()
                );
                self.transformer = Some(transformer);
            }
            Err(err) => log::warn!("page {index}: {err}; nothing to draw"),
        }
    }

    /// Snapshot the current page before an edit. None without geometry.
    fn begin_edit(&mut self) -> Option<(usize, CoordinateTransformer)> {
        let Some(index) = self.current_page else {
            log::debug!("edit ignored: no current page");
            return None;
        };
        let Some(transformer) = self.transformer else {
            log::warn!("edit on page {index} ignored: no page geometry established");
            return None;
        };
        let before = self.store.get(index).cloned().unwrap_or_default();
        self.history.record(before);
        Some((index, transformer))
    }

    fn commit_edit(&self, push_to_surface: bool) {
        if push_to_surface {
            self.refresh_surface(false);
        }
        self.notify_drawing_changed();
    }

    fn restore_snapshot(&mut self, index: usize, set: PageStrokeSet) {
        self.store.insert(index, set);
        self.drawing = self.store.load(index, self.transformer.as_ref());
        self.refresh_surface(false);
        self.notify_drawing_changed();
    }

    fn persist_margins(&self) {
        if let Err(err) = self.margin_store.save(&self.page_set_id, &self.margins) {
            log::warn!("could not save margin settings for {:?}: {err}", self.page_set_id);
        }
    }

    fn refresh_surface(&self, resize: bool) {
        let Some(surface) = self.surface.as_ref().and_then(Weak::upgrade) else {
            log::debug!("no live surface; drawing will be restored on next attach");
            return;
        };
        if resize {
            if let Some(frame) = self.page_frame() {
                surface.resize(frame.surface);
            }
        }
        surface.set_drawing(&self.drawing);
    }

    fn set_selection_routing(&mut self, active: bool) {
        for surface in self.tools.live_surfaces() {
            surface.set_selection_active(active);
        }
    }

    fn notify_tool_changed(&self, tool: &Tool) {
        for observer in &self.observers {
            observer.on_tool_changed(tool);
        }
    }

    fn notify_drawing_changed(&self) {
        let Some(index) = self.current_page else {
            return;
        };
        let (page_anchored, margin_anchored) = match self.store.get(index) {
            Some(set) => (set.page_anchored.as_slice(), set.margin_anchored.as_slice()),
            None => (&[][..], &[][..]),
        };
        for observer in &self.observers {
            observer.on_drawing_changed(index, page_anchored, margin_anchored);
        }
    }
}

impl<P: PageSource> std::fmt::Debug for SurfaceLifecycleCoordinator<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceLifecycleCoordinator")
            .field("page_set_id", &self.page_set_id)
            .field("current_page", &self.current_page)
            .field("mode", &self.mode)
            .field("geometry", &self.geometry)
            .field("strokes", &self.drawing.len())
            .field("tools", &self.tools)
            .finish()
    }
}
