//! Per-page annotation storage
//!
//! Strokes are owned per page. The active page's strokes form a live working
//! set that the editing controller mutates; `save_current_page` snapshots the
//! live set into the page's stored entry and `switch_to` loads another page's
//! entry as the new live set. Both are pure data operations, independent of
//! whatever surface displays the strokes.

use crate::geometry::PagePoint;
use crate::stroke::{Stroke, StrokeId};
use std::collections::BTreeMap;

/// Zero-based page identifier
pub type PageIndex = u32;

/// Page index → ordered strokes, plus the live set of the active page
#[derive(Debug, Clone, Default)]
pub struct PageAnnotationStore {
    /// Saved strokes per visited page, insertion order is z-order
    pages: BTreeMap<PageIndex, Vec<Stroke>>,

    /// Working set of the active page
    live: Vec<Stroke>,

    active_page: PageIndex,
}

impl PageAnnotationStore {
    /// Create a store whose active page is page 0
    pub fn new() -> Self {
        let mut pages = BTreeMap::new();
        pages.insert(0, Vec::new());
        Self { pages, live: Vec::new(), active_page: 0 }
    }

    pub fn active_page(&self) -> PageIndex {
        self.active_page
    }

    /// Strokes of the active page in insertion order
    pub fn current_strokes(&self) -> &[Stroke] {
        &self.live
    }

    /// Append a stroke to the active page
    pub fn add_stroke(&mut self, stroke: Stroke) {
        self.live.push(stroke);
    }

    /// Remove a stroke from the active page by identity
    ///
    /// Returns `None` when the stroke is not on the active page.
    pub fn remove_stroke(&mut self, id: StrokeId) -> Option<Stroke> {
        let index = self.live.iter().position(|stroke| stroke.id() == id)?;
        Some(self.live.remove(index))
    }

    pub fn get(&self, id: StrokeId) -> Option<&Stroke> {
        self.live.iter().find(|stroke| stroke.id() == id)
    }

    pub fn get_mut(&mut self, id: StrokeId) -> Option<&mut Stroke> {
        self.live.iter_mut().find(|stroke| stroke.id() == id)
    }

    /// Topmost stroke of the active page under `point`
    pub fn hit_test(&self, point: PagePoint) -> Option<StrokeId> {
        self.live.iter().rev().find(|stroke| stroke.hit_test(point)).map(Stroke::id)
    }

    /// Snapshot the live set into the active page's stored entry
    pub fn save_current_page(&mut self) {
        self.pages.insert(self.active_page, self.live.clone());
    }

    /// Make `page_index` the active page
    ///
    /// The live set becomes that page's stored strokes, or empty on a first
    /// visit. Unsaved edits to the outgoing page are discarded, so callers
    /// save first.
    pub fn switch_to(&mut self, page_index: PageIndex) {
        self.active_page = page_index;
        self.live = self.pages.entry(page_index).or_default().clone();
    }

    /// Stored snapshot for a page (empty if never visited)
    pub fn stored_strokes(&self, page_index: PageIndex) -> &[Stroke] {
        self.pages.get(&page_index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Pages that have an entry, in ascending order
    pub fn visited_pages(&self) -> impl Iterator<Item = PageIndex> + '_ {
        self.pages.keys().copied()
    }

    /// Drop every page's strokes and return to page 0
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}
