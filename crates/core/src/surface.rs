//! Display surface abstraction
//!
//! The two capabilities the core needs from whatever draws the page:
//! mapping viewport pixels to page coordinates, and being told what to show
//! (background, attached strokes, dirty regions). [`Canvas`] is the
//! toolkit-independent implementation the shell draws from.

use crate::geometry::{Bounds, PagePoint, ViewportPoint, ViewportSize};
use crate::render::RenderedPage;
use crate::stroke::{Stroke, StrokeId};

/// What the core requires from the display layer
pub trait DisplaySurface {
    type Bitmap;

    /// Map a viewport-local position to page coordinates
    fn map_to_page(&self, point: ViewportPoint) -> PagePoint;

    /// Replace the background with a freshly rendered page
    fn show_page(&mut self, page: RenderedPage<Self::Bitmap>);

    /// Detach every stroke visual
    fn clear_strokes(&mut self);

    /// Attach strokes to be drawn over the background, bottom to top
    fn attach_strokes(&mut self, strokes: &[Stroke]);

    /// Mark a page region as needing a repaint
    fn invalidate(&mut self, region: Bounds);

    /// Track a new viewport size
    fn set_viewport(&mut self, _viewport: ViewportSize) {}
}

/// Affine mapping between page points and viewport pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageTransform {
    /// Pixels per page point
    pub scale: f32,
    /// Viewport position of the page's top-left corner
    pub origin: ViewportPoint,
}

impl Default for PageTransform {
    fn default() -> Self {
        Self { scale: 1.0, origin: ViewportPoint::default() }
    }
}

impl PageTransform {
    pub fn to_page(&self, point: ViewportPoint) -> PagePoint {
        PagePoint::new((point.x - self.origin.x) / self.scale, (point.y - self.origin.y) / self.scale)
    }

    pub fn to_viewport(&self, point: PagePoint) -> ViewportPoint {
        ViewportPoint::new(point.x * self.scale + self.origin.x, point.y * self.scale + self.origin.y)
    }
}

/// Viewport state: background page, attached strokes and pending damage
#[derive(Debug)]
pub struct Canvas<B> {
    viewport: ViewportSize,
    background: Option<RenderedPage<B>>,
    transform: PageTransform,
    attached: Vec<StrokeId>,
    damage: Option<Bounds>,
    /// Incremented whenever the background is replaced
    background_generation: u64,
}

impl<B> Canvas<B> {
    pub fn new(viewport: ViewportSize) -> Self {
        Self {
            viewport,
            background: None,
            transform: PageTransform::default(),
            attached: Vec::new(),
            damage: None,
            background_generation: 0,
        }
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    pub fn background(&self) -> Option<&RenderedPage<B>> {
        self.background.as_ref()
    }

    pub fn background_generation(&self) -> u64 {
        self.background_generation
    }

    pub fn transform(&self) -> PageTransform {
        self.transform
    }

    /// Ids of the strokes currently attached, bottom to top
    pub fn attached(&self) -> &[StrokeId] {
        &self.attached
    }

    /// Take the accumulated dirty region, leaving none
    pub fn take_damage(&mut self) -> Option<Bounds> {
        self.damage.take()
    }

    fn update_transform(&mut self) {
        let Some(page) = &self.background else {
            self.transform = PageTransform::default();
            return;
        };

        let free_x = self.viewport.width.saturating_sub(page.width_px) as f32;
        let free_y = self.viewport.height.saturating_sub(page.height_px) as f32;
        self.transform = PageTransform {
            scale: page.scale(),
            origin: ViewportPoint::new((free_x / 2.0).floor(), (free_y / 2.0).floor()),
        };
    }

    fn damage_all(&mut self) {
        let Some(page) = &self.background else {
            return;
        };
        let whole = Bounds {
            min_x: 0.0,
            min_y: 0.0,
            max_x: page.page_size.width_pt,
            max_y: page.page_size.height_pt,
        };
        self.invalidate(whole);
    }
}

impl<B> DisplaySurface for Canvas<B> {
    type Bitmap = B;

    fn map_to_page(&self, point: ViewportPoint) -> PagePoint {
        self.transform.to_page(point)
    }

    fn show_page(&mut self, page: RenderedPage<B>) {
        self.background = Some(page);
        self.background_generation += 1;
        self.update_transform();
        self.damage_all();
    }

    fn clear_strokes(&mut self) {
        self.attached.clear();
        self.damage_all();
    }

    fn attach_strokes(&mut self, strokes: &[Stroke]) {
        self.attached.extend(strokes.iter().map(Stroke::id));
        self.damage_all();
    }

    fn invalidate(&mut self, region: Bounds) {
        self.damage = Some(match self.damage {
            Some(existing) => existing.union(&region),
            None => region,
        });
    }

    /// The page is re-centered in the new viewport
    fn set_viewport(&mut self, viewport: ViewportSize) {
        self.viewport = viewport;
        self.update_transform();
    }
}
