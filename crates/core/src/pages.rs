//! Document collaborator interface
//!
//! The engine only reads page count, un-rotated page size and intrinsic
//! rotation. Page content stays with the document store.

use crate::geometry::{Rotation, Size};
use serde::{Deserialize, Serialize};

/// Read-only view of the document's pages
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// Un-rotated authoring size, `None` for an out-of-range index
    fn page_size(&self, index: usize) -> Option<Size>;

    /// Intrinsic page rotation (`Deg0` for an out-of-range index)
    fn page_rotation(&self, index: usize) -> Rotation;
}

/// Size and rotation of one page
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    pub size: Size,
    #[serde(default)]
    pub rotation: Rotation,
}

impl PageInfo {
    pub fn new(width: f32, height: f32) -> Self {
        Self { size: Size::new(width, height), rotation: Rotation::Deg0 }
    }

    pub fn rotated(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }
}

/// In-memory page list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticPages {
    pages: Vec<PageInfo>,
}

impl StaticPages {
    pub fn new(pages: Vec<PageInfo>) -> Self {
        Self { pages }
    }

    /// `count` pages of the same size
    pub fn uniform(count: usize, width: f32, height: f32) -> Self {
        Self { pages: vec![PageInfo::new(width, height); count] }
    }

    pub fn set_rotation(&mut self, index: usize, rotation: Rotation) {
        if let Some(page) = self.pages.get_mut(index) {
            page.rotation = rotation;
        }
    }
}

impl PageSource for StaticPages {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_size(&self, index: usize) -> Option<Size> {
        self.pages.get(index).map(|page| page.size)
    }

    fn page_rotation(&self, index: usize) -> Rotation {
        self.pages.get(index).map(|page| page.rotation).unwrap_or_default()
    }
}

impl<T: PageSource + ?Sized> PageSource for Box<T> {
    fn page_count(&self) -> usize {
        (**self).page_count()
    }

    fn page_size(&self, index: usize) -> Option<Size> {
        (**self).page_size(index)
    }

    fn page_rotation(&self, index: usize) -> Rotation {
        (**self).page_rotation(index)
    }
}
