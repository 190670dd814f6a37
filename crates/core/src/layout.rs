//! Margin layout resolution
//!
//! Places the page inside the expanded drawing surface. Pure functions:
//! the frame is recomputed on every margin, page or rotation change and
//! never cached across them.

use crate::geometry::{
    GeometryModel, HorizontalAlign, MarginSettings, PageFrame, Rect, Rotation, Size, VerticalAlign,
};

/// On-screen page dimensions for a rotation (width/height swap at 90/270)
pub fn true_size(page_size: Size, rotation: Rotation) -> Size {
    if rotation.swaps_axes() {
        page_size.swapped()
    } else {
        page_size
    }
}

/// Drawing surface dimensions, oriented to match the rotation
pub fn surface_size(page_size: Size, rotation: Rotation, expansion_factor: f32) -> Size {
    true_size(page_size, rotation).scaled(expansion_factor)
}

/// Compute the page rectangle inside the drawing surface.
///
/// With margins disabled the page fills at its true size, centered. With
/// margins enabled the page is shrunk by `margin.scale` and placed on the
/// 3x3 anchor grid: left/top edges add no offset, centers add half the
/// leftover space, right/bottom edges add all of it.
pub fn resolve(
    page_size: Size,
    rotation: Rotation,
    margin: &MarginSettings,
    expansion_factor: f32,
) -> PageFrame {
    let page = true_size(page_size, rotation);
    let surface = surface_size(page_size, rotation, expansion_factor);
    let effective = page.scaled(margin.effective_scale());

    let anchor = margin.effective_anchor();
    let leftover_x = surface.width - effective.width;
    let leftover_y = surface.height - effective.height;

    let x = match anchor.horizontal() {
        HorizontalAlign::Left => 0.0,
        HorizontalAlign::Center => leftover_x / 2.0,
        HorizontalAlign::Right => leftover_x,
    };
    let y = match anchor.vertical() {
        VerticalAlign::Top => 0.0,
        VerticalAlign::Center => leftover_y / 2.0,
        VerticalAlign::Bottom => leftover_y,
    };

    PageFrame { rect: Rect::new(x, y, effective.width, effective.height), surface }
}

/// Resolve the frame for a full geometry model
pub fn resolve_model(model: &GeometryModel) -> PageFrame {
    resolve(model.page_size, model.rotation, &model.margin, model.expansion_factor)
}
