//! Inkmargin Core Library
//!
//! Annotation coordinate engine: keeps freehand ink attached to the right
//! thing when a page is shown inside a larger drawing surface. Ink on the
//! page moves and scales with the page; ink in the margin stays fixed to
//! the surface.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod geometry;
pub mod history;
pub mod layout;
pub mod margin_store;
pub mod pages;
pub mod persistence;
pub mod store;
pub mod stroke;
pub mod tool;
pub mod transform;

pub use config::EngineConfig;
pub use coordinator::{EngineObserver, ImportReport, Mode, SurfaceLifecycleCoordinator};
pub use error::{EngineError, EngineResult};
pub use geometry::{
    Anchor, GeometryModel, HorizontalAlign, MarginSettings, PageFrame, Point, Rect, Rotation, Size,
    VerticalAlign, DEFAULT_EXPANSION_FACTOR,
};
pub use history::EditHistory;
pub use margin_store::{InMemoryMarginStore, MarginSettingsStore};
pub use pages::{PageInfo, PageSource, StaticPages};
pub use persistence::{decode_page, encode_page, encode_store, DecodedPage, BLOB_VERSION};
pub use store::{PageStrokeSet, PerPageStrokeStore};
pub use stroke::{Affine, Color, InkKind, Stroke, StrokeId, StrokeStyle};
pub use tool::{DrawingSurface, Tool, ToolStateController};
pub use transform::{CoordinateTransformer, Region};
