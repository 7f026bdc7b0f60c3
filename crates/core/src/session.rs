//! One open document
//!
//! A [`Session`] owns the annotation store, the editing and navigation
//! controllers, the page renderer and the display surface. The shell feeds it
//! pointer events and [`Action`]s and reads back what to draw.

use crate::commands::Action;
use crate::editing::{EditConfig, EditOutcome, PointerEditingController};
use crate::error::{Result, SessionError};
use crate::geometry::{ViewportPoint, ViewportSize};
use crate::navigation::{NavigationController, PageChange};
use crate::render::PageRenderer;
use crate::store::{PageAnnotationStore, PageIndex};
use crate::stroke::{Color, Stroke, StrokeId};
use crate::surface::DisplaySurface;
use tracing::info;

/// Result of [`Session::perform`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Response {
    /// An editing action ran (possibly as a no-op)
    Edited(EditOutcome),
    Navigated(PageChange),
    /// The shell has to handle this one (quit, help, color picker)
    Forward(Action),
}

pub struct Session<R, S> {
    renderer: R,
    surface: S,
    store: PageAnnotationStore,
    editor: PointerEditingController,
    navigation: NavigationController,
}

impl<R, S> Session<R, S>
where
    R: PageRenderer,
    S: DisplaySurface<Bitmap = R::Bitmap>,
{
    /// Open a session showing page 0
    ///
    /// Fails without creating any annotation state when the document has no
    /// pages or page 0 cannot be rendered.
    pub fn open(renderer: R, mut surface: S, viewport: ViewportSize, config: EditConfig) -> Result<Self> {
        let page_count = renderer.page_count();
        if page_count == 0 {
            return Err(SessionError::EmptyDocument);
        }

        surface.set_viewport(viewport);
        let mut navigation = NavigationController::new(page_count, viewport);
        navigation.show_current(&renderer, &mut surface)?;

        let store = PageAnnotationStore::new();
        surface.attach_strokes(store.current_strokes());

        info!(page_count, %viewport, "Session opened");
        Ok(Self {
            renderer,
            surface,
            store,
            editor: PointerEditingController::new(config),
            navigation,
        })
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn store(&self) -> &PageAnnotationStore {
        &self.store
    }

    pub fn editor(&self) -> &PointerEditingController {
        &self.editor
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    pub fn page_index(&self) -> PageIndex {
        self.navigation.page_index()
    }

    pub fn page_count(&self) -> u32 {
        self.navigation.page_count()
    }

    /// Strokes of the displayed page, bottom to top
    pub fn strokes(&self) -> &[Stroke] {
        self.store.current_strokes()
    }

    pub fn selection(&self) -> Option<&Stroke> {
        self.editor.selection().and_then(|id| self.store.get(id))
    }

    pub fn pointer_down(&mut self, position: ViewportPoint) -> EditOutcome {
        let point = self.surface.map_to_page(position);
        let outcome = self.editor.pointer_down(&mut self.store, point);
        self.apply(outcome)
    }

    pub fn pointer_move(&mut self, position: ViewportPoint, primary_held: bool) -> EditOutcome {
        let point = self.surface.map_to_page(position);
        let outcome = self.editor.pointer_move(&mut self.store, point, primary_held);
        self.apply(outcome)
    }

    pub fn pointer_up(&mut self) -> EditOutcome {
        let outcome = self.editor.pointer_up();
        self.apply(outcome)
    }

    pub fn set_color(&mut self, color: Color) -> EditOutcome {
        let outcome = self.editor.set_color(&mut self.store, color);
        self.apply(outcome)
    }

    pub fn perform(&mut self, action: Action) -> Result<Response> {
        let response = match action {
            Action::IncreaseWidth => {
                let outcome = self.editor.increase_width(&mut self.store);
                Response::Edited(self.apply(outcome))
            }
            Action::DecreaseWidth => {
                let outcome = self.editor.decrease_width(&mut self.store);
                Response::Edited(self.apply(outcome))
            }
            Action::ArmDelete => {
                self.editor.arm_delete();
                Response::Edited(EditOutcome::Ignored)
            }
            Action::DisarmDelete => {
                self.editor.disarm_delete();
                Response::Edited(EditOutcome::Ignored)
            }
            Action::NextPage => {
                let change = self.navigation.next_page(&mut self.store, &self.renderer, &mut self.surface)?;
                self.after_navigation(change)
            }
            Action::PrevPage => {
                let change = self.navigation.prev_page(&mut self.store, &self.renderer, &mut self.surface)?;
                self.after_navigation(change)
            }
            Action::PickColor if self.editor.selection().is_none() => Response::Edited(EditOutcome::Ignored),
            Action::PickColor | Action::Quit | Action::ShowHelp => Response::Forward(action),
        };
        Ok(response)
    }

    /// Jump straight to a page, clamped to the last one
    pub fn go_to(&mut self, page_index: PageIndex) -> Result<PageChange> {
        let change = self.navigation.go_to(page_index, &mut self.store, &self.renderer, &mut self.surface)?;
        self.after_navigation(change);
        Ok(change)
    }

    /// Re-render the background for a new viewport size
    pub fn resize(&mut self, size: ViewportSize) -> Result<bool> {
        if size == self.navigation.viewport() {
            return Ok(false);
        }
        self.navigation.resize(size, &self.renderer, &mut self.surface)
    }

    fn after_navigation(&mut self, change: PageChange) -> Response {
        if change.is_moved() {
            self.editor.reset();
        }
        Response::Navigated(change)
    }

    fn apply(&mut self, outcome: EditOutcome) -> EditOutcome {
        match outcome {
            EditOutcome::StrokeStarted { id, .. } => self.attach(id),
            EditOutcome::StrokeDeleted { .. } => {
                self.surface.clear_strokes();
                self.surface.attach_strokes(self.store.current_strokes());
            }
            _ => {}
        }
        if let Some(region) = outcome.damage() {
            self.surface.invalidate(region);
        }
        outcome
    }

    fn attach(&mut self, id: StrokeId) {
        if let Some(stroke) = self.store.get(id) {
            self.surface.attach_strokes(std::slice::from_ref(stroke));
        }
    }
}
