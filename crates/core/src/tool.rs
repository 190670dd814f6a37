//! Drawing tool state
//!
//! The selected tool lives here rather than on any drawing surface, so it
//! survives surfaces being destroyed and recreated on every page switch or
//! rotation. Live surfaces register with the controller and are held
//! weakly; a dropped surface simply falls out of the broadcast list.

use crate::geometry::Size;
use crate::stroke::{Stroke, StrokeStyle};
use std::rc::{Rc, Weak};

/// Persistent drawing tool
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tool {
    Ink(StrokeStyle),
    Eraser,
}

impl Tool {
    pub fn is_eraser(&self) -> bool {
        matches!(self, Tool::Eraser)
    }
}

/// A physical drawing surface driven by the engine.
///
/// Implemented by the presentation layer. All methods take `&self`; the
/// implementor owns its interior mutability.
pub trait DrawingSurface {
    /// Reflect the active tool
    fn apply_tool(&self, tool: &Tool);

    /// Replace the displayed strokes (surface space)
    fn set_drawing(&self, strokes: &[Stroke]);

    /// Rebuild the surface at a new logical size
    fn resize(&self, size: Size);

    /// Toggle lasso/selection input routing
    fn set_selection_active(&self, active: bool);
}

/// Holds the persistent tool, the selection-mode backup slot and the weak
/// list of live surfaces
pub struct ToolStateController {
    current: Option<Tool>,
    backup: Option<Tool>,
    selecting: bool,
    fallback: Tool,
    surfaces: Vec<Weak<dyn DrawingSurface>>,
}

impl ToolStateController {
    /// Create a controller that falls back to `default_pen` until a tool is picked
    pub fn new(default_pen: StrokeStyle) -> Self {
        Self {
            current: None,
            backup: None,
            selecting: false,
            fallback: Tool::Ink(default_pen),
            surfaces: Vec::new(),
        }
    }

    /// Tool in effect: the picked tool, or the default pen if none was picked
    pub fn active_tool(&self) -> Tool {
        self.current.unwrap_or(self.fallback)
    }

    /// Explicitly picked tool, if any
    pub fn current(&self) -> Option<Tool> {
        self.current
    }

    pub fn backup(&self) -> Option<Tool> {
        self.backup
    }

    /// Pick an ink style and broadcast it. Returns the new active tool.
    pub fn set_ink(&mut self, style: StrokeStyle) -> Tool {
        self.pick(Tool::Ink(style))
    }

    /// Pick the eraser and broadcast it. Returns the new active tool.
    pub fn set_eraser(&mut self) -> Tool {
        self.pick(Tool::Eraser)
    }

    fn pick(&mut self, tool: Tool) -> Tool {
        self.current = Some(tool);
        // A pick made while selecting is what should come back afterwards
        if self.selecting {
            self.backup = Some(tool);
        }
        self.broadcast();
        tool
    }

    /// Copy the persistent tool into the backup slot.
    ///
    /// The persistent tool is kept; it is inert while selecting. Entering
    /// twice keeps the first backup.
    pub fn enter_selection_mode(&mut self) {
        if self.selecting {
            return;
        }
        self.selecting = true;
        self.backup = self.current;
    }

    /// Restore the tool saved on entry and broadcast it.
    ///
    /// Falls back to the current persistent tool when the backup is empty,
    /// then to the default pen. Returns the restored tool, or `None` when not
    /// in selection mode.
    pub fn exit_selection_mode(&mut self) -> Option<Tool> {
        if !self.selecting {
            return None;
        }
        self.selecting = false;

        let restored = self.backup.take().or(self.current).unwrap_or(self.fallback);
        self.current = Some(restored);
        self.broadcast();
        Some(restored)
    }

    /// Add a surface to the broadcast list and bring it up to date
    pub fn register(&mut self, surface: &Rc<dyn DrawingSurface>) {
        self.prune();
        let already = self
            .surfaces
            .iter()
            .any(|existing| std::ptr::addr_eq(existing.as_ptr(), Rc::as_ptr(surface)));
        if !already {
            self.surfaces.push(Rc::downgrade(surface));
        }
        surface.apply_tool(&self.active_tool());
    }

    /// Remove a surface explicitly (e.g. on teardown)
    pub fn unregister(&mut self, surface: &Rc<dyn DrawingSurface>) {
        self.surfaces.retain(|existing| {
            existing.strong_count() > 0
                && !std::ptr::addr_eq(existing.as_ptr(), Rc::as_ptr(surface))
        });
    }

    /// Number of surfaces still alive
    pub fn live_surface_count(&self) -> usize {
        self.surfaces.iter().filter(|surface| surface.strong_count() > 0).count()
    }

    /// Strong handles to every live surface, pruning dead entries
    pub fn live_surfaces(&mut self) -> Vec<Rc<dyn DrawingSurface>> {
        self.prune();
        self.surfaces.iter().filter_map(Weak::upgrade).collect()
    }

    /// Push the active tool to every live surface
    pub fn broadcast(&mut self) {
        let tool = self.active_tool();
        for surface in self.live_surfaces() {
            surface.apply_tool(&tool);
        }
    }

    fn prune(&mut self) {
        let before = self.surfaces.len();
        self.surfaces.retain(|surface| surface.strong_count() > 0);
        let dropped = before - self.surfaces.len();
        if dropped > 0 {
            log::debug!("dropped {dropped} destroyed surface(s) from tool broadcast");
        }
    }
}

impl std::fmt::Debug for ToolStateController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolStateController")
            .field("current", &self.current)
            .field("backup", &self.backup)
            .field("selecting", &self.selecting)
            .field("fallback", &self.fallback)
            .field("live_surfaces", &self.live_surface_count())
            .finish()
    }
}
