//! simplepres core
//!
//! Toolkit-independent model of a per-page ink annotator: strokes, per-page
//! storage, the pointer editing state machine, page navigation, and the
//! narrow contracts towards the page renderer and the display surface.

pub mod commands;
pub mod editing;
pub mod error;
pub mod geometry;
pub mod navigation;
pub mod render;
pub mod session;
pub mod store;
pub mod stroke;
pub mod surface;

pub use commands::{Action, HELP_TEXT};
pub use editing::{EditConfig, EditOutcome, EditState, PointerEditingController, StylePolicy};
pub use error::{Result, SessionError};
pub use geometry::{Bounds, PagePoint, PageSize, PageVector, ViewportPoint, ViewportSize};
pub use navigation::{NavigationController, PageChange, RenderTicket};
pub use render::{fit_page, PageRenderer, RenderedPage};
pub use session::{Response, Session};
pub use store::{PageAnnotationStore, PageIndex};
pub use stroke::{
    clamp_width, Color, Stroke, StrokeId, StrokeStyle, DEFAULT_WIDTH, DEFAULT_WIDTH_STEP,
    HIT_TOLERANCE, MAX_WIDTH, MIN_WIDTH,
};
pub use surface::{Canvas, DisplaySurface, PageTransform};
