//! Page navigation
//!
//! Moving between pages saves the outgoing page's strokes, swaps the display
//! surface's background and stroke visuals, and loads the incoming page's
//! strokes. Every background request is identified by a [`RenderTicket`] so
//! that a result arriving after the user has moved on is never displayed.

use crate::error::{Result, SessionError};
use crate::geometry::ViewportSize;
use crate::render::{PageRenderer, RenderedPage};
use crate::store::{PageAnnotationStore, PageIndex};
use crate::surface::DisplaySurface;
use tracing::{debug, info, warn};

/// Identifies one background render request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTicket {
    pub page_index: PageIndex,
    pub size: ViewportSize,
    pub generation: u64,
}

/// What a navigation request did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageChange {
    /// Already at the target or at a document boundary
    Unchanged,
    Moved { from: PageIndex, to: PageIndex },
}

impl PageChange {
    pub fn is_moved(&self) -> bool {
        matches!(self, Self::Moved { .. })
    }
}

/// Tracks the displayed page and drives page switches
#[derive(Debug, Clone)]
pub struct NavigationController {
    page_index: PageIndex,
    page_count: u32,
    viewport: ViewportSize,
    /// Generation of the most recently issued ticket
    generation: u64,
}

impl NavigationController {
    pub fn new(page_count: u32, viewport: ViewportSize) -> Self {
        Self { page_index: 0, page_count, viewport, generation: 0 }
    }

    pub fn page_index(&self) -> PageIndex {
        self.page_index
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    pub fn is_first_page(&self) -> bool {
        self.page_index == 0
    }

    pub fn is_last_page(&self) -> bool {
        self.page_index + 1 >= self.page_count
    }

    /// Issue a ticket for rendering `page_index` at `size`
    ///
    /// Every ticket issued earlier becomes stale.
    pub fn request(&mut self, page_index: PageIndex, size: ViewportSize) -> RenderTicket {
        self.generation += 1;
        RenderTicket { page_index, size, generation: self.generation }
    }

    /// Whether `ticket` is the latest request
    pub fn is_current(&self, ticket: &RenderTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Pass a finished render through if its ticket is still current
    pub fn accept_render<B>(
        &self,
        ticket: RenderTicket,
        page: RenderedPage<B>,
    ) -> Option<RenderedPage<B>> {
        if self.is_current(&ticket) {
            Some(page)
        } else {
            debug!(
                page = ticket.page_index,
                generation = ticket.generation,
                latest = self.generation,
                "Dropping stale render"
            );
            None
        }
    }

    /// Render the current page and show it
    ///
    /// Used when a session opens; stroke visuals are left alone.
    pub fn show_current<R, S>(&mut self, renderer: &R, surface: &mut S) -> Result<()>
    where
        R: PageRenderer,
        S: DisplaySurface<Bitmap = R::Bitmap>,
    {
        if self.page_count == 0 {
            return Err(SessionError::EmptyDocument);
        }

        let ticket = self.request(self.page_index, self.viewport);
        let page = renderer
            .render(ticket.page_index, ticket.size)
            .map_err(|e| SessionError::render(ticket.page_index, ticket.size, e))?;
        if let Some(page) = self.accept_render(ticket, page) {
            surface.show_page(page);
        }
        Ok(())
    }

    pub fn next_page<R, S>(
        &mut self,
        store: &mut PageAnnotationStore,
        renderer: &R,
        surface: &mut S,
    ) -> Result<PageChange>
    where
        R: PageRenderer,
        S: DisplaySurface<Bitmap = R::Bitmap>,
    {
        if self.is_last_page() {
            debug!(page = self.page_index, "Already at last page");
            return Ok(PageChange::Unchanged);
        }
        self.go_to(self.page_index + 1, store, renderer, surface)
    }

    pub fn prev_page<R, S>(
        &mut self,
        store: &mut PageAnnotationStore,
        renderer: &R,
        surface: &mut S,
    ) -> Result<PageChange>
    where
        R: PageRenderer,
        S: DisplaySurface<Bitmap = R::Bitmap>,
    {
        if self.is_first_page() {
            debug!("Already at first page");
            return Ok(PageChange::Unchanged);
        }
        self.go_to(self.page_index - 1, store, renderer, surface)
    }

    /// Switch to `target`, clamped to the last page
    ///
    /// On a render failure the outgoing page stays displayed with its strokes
    /// re-attached and the error is returned.
    pub fn go_to<R, S>(
        &mut self,
        target: PageIndex,
        store: &mut PageAnnotationStore,
        renderer: &R,
        surface: &mut S,
    ) -> Result<PageChange>
    where
        R: PageRenderer,
        S: DisplaySurface<Bitmap = R::Bitmap>,
    {
        if self.page_count == 0 {
            return Ok(PageChange::Unchanged);
        }
        let target = target.min(self.page_count - 1);
        let from = self.page_index;
        if target == from {
            return Ok(PageChange::Unchanged);
        }

        store.save_current_page();
        surface.clear_strokes();

        let ticket = self.request(target, self.viewport);
        let page = match renderer.render(ticket.page_index, ticket.size) {
            Ok(page) => page,
            Err(e) => {
                warn!(from, to = target, error = %e, "Page render failed, staying on current page");
                surface.attach_strokes(store.current_strokes());
                return Err(SessionError::render(target, ticket.size, e));
            }
        };

        let Some(page) = self.accept_render(ticket, page) else {
            surface.attach_strokes(store.current_strokes());
            return Ok(PageChange::Unchanged);
        };

        surface.show_page(page);
        self.page_index = target;
        store.switch_to(target);
        surface.attach_strokes(store.current_strokes());

        info!(from, to = target, strokes = store.current_strokes().len(), "Switched page");
        Ok(PageChange::Moved { from, to: target })
    }

    /// Re-render the current background for a new viewport size
    ///
    /// Stroke geometry is untouched. Returns `false` when nothing was
    /// rendered because the viewport is empty. A failed render leaves the
    /// previous viewport in place so the same size can be retried.
    pub fn resize<R, S>(&mut self, size: ViewportSize, renderer: &R, surface: &mut S) -> Result<bool>
    where
        R: PageRenderer,
        S: DisplaySurface<Bitmap = R::Bitmap>,
    {
        if size.is_empty() || self.page_count == 0 {
            self.viewport = size;
            surface.set_viewport(size);
            return Ok(false);
        }

        let ticket = self.request(self.page_index, size);
        let page = renderer.render(ticket.page_index, ticket.size).map_err(|e| {
            warn!(page = ticket.page_index, %size, error = %e, "Resize render failed");
            SessionError::render(ticket.page_index, size, e)
        })?;

        self.viewport = size;
        surface.set_viewport(size);
        match self.accept_render(ticket, page) {
            Some(page) => {
                surface.show_page(page);
                debug!(page = self.page_index, %size, "Re-rendered page for new size");
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
