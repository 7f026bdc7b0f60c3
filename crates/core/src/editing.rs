//! Pointer-driven editing state machine
//!
//! Interprets pointer and key input against the active page's strokes.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Drawing      (pointer down on empty space: new stroke)
//! Idle -> Dragging     (pointer down on a stroke: select it)
//! Drawing -> Drawing   (move with primary held: append point)
//! Dragging -> Dragging (move with primary held: translate by delta)
//! Any -> Idle          (pointer up)
//! ```
//!
//! Delete-armed is an orthogonal flag: while it is set, the first move over
//! a stroke deletes that stroke and clears the flag.
//!
//! Nothing here fails. Acting on no selection, missing every stroke or moving
//! without a button held are reported as [`EditOutcome::Ignored`].

use crate::geometry::{Bounds, PagePoint};
use crate::store::PageAnnotationStore;
use crate::stroke::{Color, Stroke, StrokeId, StrokeStyle, DEFAULT_WIDTH_STEP};
use tracing::debug;

/// Which style a freshly drawn stroke receives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StylePolicy {
    /// Always the configured default color and width
    #[default]
    SessionDefaults,
    /// The color and width most recently applied to a selected stroke
    LastUsed,
}

/// Editing configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditConfig {
    pub default_style: StrokeStyle,
    pub width_step: f32,
    pub style_policy: StylePolicy,
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            default_style: StrokeStyle::default(),
            width_step: DEFAULT_WIDTH_STEP,
            style_policy: StylePolicy::default(),
        }
    }
}

/// Current pointer interaction
///
/// Drawing and dragging are variants of one enum so they can never be
/// active together.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum EditState {
    /// No pointer interaction in progress
    #[default]
    Idle,

    /// Growing a new stroke
    Drawing { stroke: StrokeId },

    /// Moving an existing stroke
    Dragging {
        stroke: StrokeId,
        /// Pointer position of the previous event, for delta calculation
        last: PagePoint,
    },
}

impl EditState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self, Self::Drawing { .. })
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    /// Stroke this state refers to, if any
    pub fn stroke(&self) -> Option<StrokeId> {
        match self {
            Self::Idle => None,
            Self::Drawing { stroke } | Self::Dragging { stroke, .. } => Some(*stroke),
        }
    }
}

/// Result of feeding one event to the controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditOutcome {
    /// Nothing changed
    Ignored,
    /// A new stroke was created at the pointer
    StrokeStarted { id: StrokeId, region: Bounds },
    /// A point was appended to the stroke being drawn
    StrokeExtended { id: StrokeId, region: Bounds },
    /// Drawing finished on pointer up
    StrokeFinished { id: StrokeId },
    /// An existing stroke was picked up for dragging
    StrokeSelected { id: StrokeId },
    /// The dragged stroke moved; region covers old and new position
    StrokeMoved { id: StrokeId, region: Bounds },
    /// A stroke was removed from the page
    StrokeDeleted { id: StrokeId, region: Bounds },
    /// Color or width of the selected stroke changed
    StyleChanged { id: StrokeId, region: Bounds },
}

impl EditOutcome {
    /// Region of the page that has to be repainted
    pub fn damage(&self) -> Option<Bounds> {
        match self {
            Self::Ignored | Self::StrokeFinished { .. } | Self::StrokeSelected { .. } => None,
            Self::StrokeStarted { region, .. }
            | Self::StrokeExtended { region, .. }
            | Self::StrokeMoved { region, .. }
            | Self::StrokeDeleted { region, .. }
            | Self::StyleChanged { region, .. } => Some(*region),
        }
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored)
    }
}

/// Interactive editing state machine for one page at a time
#[derive(Debug, Clone)]
pub struct PointerEditingController {
    state: EditState,

    /// Last dragged stroke; survives pointer up
    selection: Option<StrokeId>,

    delete_armed: bool,

    config: EditConfig,

    /// Style most recently applied to a selection
    last_style: StrokeStyle,
}

impl PointerEditingController {
    pub fn new(config: EditConfig) -> Self {
        let config = EditConfig {
            default_style: StrokeStyle::new(config.default_style.color, config.default_style.width),
            ..config
        };
        Self {
            state: EditState::Idle,
            selection: None,
            delete_armed: false,
            last_style: config.default_style,
            config,
        }
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn selection(&self) -> Option<StrokeId> {
        self.selection
    }

    pub fn is_delete_armed(&self) -> bool {
        self.delete_armed
    }

    pub fn config(&self) -> &EditConfig {
        &self.config
    }

    /// Style the next new stroke will get
    pub fn next_stroke_style(&self) -> StrokeStyle {
        match self.config.style_policy {
            StylePolicy::SessionDefaults => self.config.default_style,
            StylePolicy::LastUsed => self.last_style,
        }
    }

    /// Pointer pressed at `point`
    pub fn pointer_down(&mut self, store: &mut PageAnnotationStore, point: PagePoint) -> EditOutcome {
        if let Some(id) = store.hit_test(point) {
            debug!(stroke = %id, "start dragging stroke");
            self.state = EditState::Dragging { stroke: id, last: point };
            self.selection = Some(id);
            return EditOutcome::StrokeSelected { id };
        }

        let stroke = Stroke::new(point, self.next_stroke_style());
        let id = stroke.id();
        let region = stroke.render_bounds();
        store.add_stroke(stroke);

        debug!(stroke = %id, x = point.x, y = point.y, "start drawing stroke");
        self.state = EditState::Drawing { stroke: id };
        self.selection = None;
        EditOutcome::StrokeStarted { id, region }
    }

    /// Pointer moved to `point`
    ///
    /// `primary_held` tells whether the primary button is still down.
    pub fn pointer_move(
        &mut self,
        store: &mut PageAnnotationStore,
        point: PagePoint,
        primary_held: bool,
    ) -> EditOutcome {
        if self.delete_armed {
            if let Some(id) = store.hit_test(point) {
                return self.delete(store, id);
            }
        }

        if !primary_held {
            return EditOutcome::Ignored;
        }

        match self.state {
            EditState::Idle => EditOutcome::Ignored,
            EditState::Drawing { stroke: id } => match store.get_mut(id) {
                Some(stroke) => {
                    let region = stroke.append_point(point);
                    EditOutcome::StrokeExtended { id, region }
                }
                None => {
                    self.state = EditState::Idle;
                    EditOutcome::Ignored
                }
            },
            EditState::Dragging { stroke: id, last } => match store.get_mut(id) {
                Some(stroke) => {
                    let before = stroke.render_bounds();
                    stroke.translate(point - last);
                    let region = before.union(&stroke.render_bounds());
                    self.state = EditState::Dragging { stroke: id, last: point };
                    EditOutcome::StrokeMoved { id, region }
                }
                None => {
                    self.state = EditState::Idle;
                    EditOutcome::Ignored
                }
            },
        }
    }

    /// Pointer released
    pub fn pointer_up(&mut self) -> EditOutcome {
        let outcome = match self.state {
            EditState::Drawing { stroke: id } => {
                debug!(stroke = %id, "finished drawing stroke");
                EditOutcome::StrokeFinished { id }
            }
            EditState::Dragging { .. } | EditState::Idle => EditOutcome::Ignored,
        };
        self.state = EditState::Idle;
        outcome
    }

    /// Delete key pressed: the next move over a stroke deletes it
    pub fn arm_delete(&mut self) {
        self.delete_armed = true;
    }

    /// Delete key released
    pub fn disarm_delete(&mut self) {
        self.delete_armed = false;
    }

    pub fn increase_width(&mut self, store: &mut PageAnnotationStore) -> EditOutcome {
        let step = self.config.width_step;
        self.adjust_selected_width(store, step)
    }

    /// Decrease the selected stroke's width, never below `MIN_WIDTH`
    pub fn decrease_width(&mut self, store: &mut PageAnnotationStore) -> EditOutcome {
        let step = self.config.width_step;
        self.adjust_selected_width(store, -step)
    }

    /// Recolor the selected stroke
    pub fn set_color(&mut self, store: &mut PageAnnotationStore, color: Color) -> EditOutcome {
        let Some(stroke) = self.selected_mut(store) else {
            return EditOutcome::Ignored;
        };

        stroke.set_color(color);
        let id = stroke.id();
        let region = stroke.render_bounds();
        self.last_style.color = color;
        EditOutcome::StyleChanged { id, region }
    }

    /// Forget every transient reference, e.g. when the active page changes
    pub fn reset(&mut self) {
        self.state = EditState::Idle;
        self.selection = None;
        self.delete_armed = false;
    }

    fn adjust_selected_width(&mut self, store: &mut PageAnnotationStore, delta: f32) -> EditOutcome {
        let Some(stroke) = self.selected_mut(store) else {
            return EditOutcome::Ignored;
        };

        let before = stroke.render_bounds();
        let width = stroke.adjust_width(delta);
        let id = stroke.id();
        let region = before.union(&stroke.render_bounds());
        self.last_style.width = width;

        debug!(stroke = %id, width, "stroke width changed");
        EditOutcome::StyleChanged { id, region }
    }

    /// Selected stroke, dropping a selection that no longer exists
    fn selected_mut<'a>(&mut self, store: &'a mut PageAnnotationStore) -> Option<&'a mut Stroke> {
        let id = self.selection?;
        if store.get(id).is_none() {
            self.selection = None;
            return None;
        }
        store.get_mut(id)
    }

    fn delete(&mut self, store: &mut PageAnnotationStore, id: StrokeId) -> EditOutcome {
        self.delete_armed = false;

        let Some(stroke) = store.remove_stroke(id) else {
            return EditOutcome::Ignored;
        };

        if self.state.stroke() == Some(id) {
            self.state = EditState::Idle;
        }
        if self.selection == Some(id) {
            self.selection = None;
        }

        debug!(stroke = %id, "deleted stroke");
        EditOutcome::StrokeDeleted { id, region: stroke.render_bounds() }
    }
}

impl Default for PointerEditingController {
    fn default() -> Self {
        Self::new(EditConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::{DEFAULT_WIDTH, MIN_WIDTH};

    fn p(x: f32, y: f32) -> PagePoint {
        PagePoint::new(x, y)
    }

    /// Draw a stroke through `points` and return its id
    fn draw(
        controller: &mut PointerEditingController,
        store: &mut PageAnnotationStore,
        points: &[PagePoint],
    ) -> StrokeId {
        let (first, rest) = points.split_first().expect("at least one point");
        let EditOutcome::StrokeStarted { id, .. } = controller.pointer_down(store, *first) else {
            panic!("pointer down on empty space should start a stroke");
        };
        for point in rest {
            controller.pointer_move(store, *point, true);
        }
        controller.pointer_up();
        id
    }

    #[test]
    fn test_default_state_is_idle() {
        let controller = PointerEditingController::default();
        assert!(controller.state().is_idle());
        assert!(controller.selection().is_none());
        assert!(!controller.is_delete_armed());
    }

    #[test]
    fn test_draw_creates_one_stroke_with_all_points() {
        let mut store = PageAnnotationStore::new();
        let mut controller = PointerEditingController::default();

        controller.pointer_down(&mut store, p(0.0, 0.0));
        assert!(controller.state().is_drawing());
        for k in 1..=5 {
            let outcome = controller.pointer_move(&mut store, p(k as f32 * 10.0, 0.0), true);
            assert!(matches!(outcome, EditOutcome::StrokeExtended { .. }));
        }
        assert!(matches!(controller.pointer_up(), EditOutcome::StrokeFinished { .. }));

        assert!(controller.state().is_idle());
        assert_eq!(store.current_strokes().len(), 1);
        let xs: Vec<f32> = store.current_strokes()[0].points().iter().map(|pt| pt.x).collect();
        assert_eq!(xs, vec![0.0, 10.0, 20.0, 30.0, 40.0, 50.0]);
    }

    #[test]
    fn test_move_without_button_does_not_draw() {
        let mut store = PageAnnotationStore::new();
        let mut controller = PointerEditingController::default();

        controller.pointer_down(&mut store, p(0.0, 0.0));
        let outcome = controller.pointer_move(&mut store, p(10.0, 10.0), false);

        assert!(outcome.is_ignored());
        assert_eq!(store.current_strokes()[0].points().len(), 1);
    }

    #[test]
    fn test_drag_translates_by_cumulative_delta() {
        let mut store = PageAnnotationStore::new();
        let mut controller = PointerEditingController::default();
        let id = draw(&mut controller, &mut store, &[p(0.0, 0.0), p(20.0, 0.0)]);

        let outcome = controller.pointer_down(&mut store, p(10.0, 0.0));
        assert_eq!(outcome, EditOutcome::StrokeSelected { id });
        controller.pointer_move(&mut store, p(15.0, 5.0), true);
        controller.pointer_move(&mut store, p(12.0, 30.0), true);
        controller.pointer_up();

        assert_eq!(store.current_strokes().len(), 1);
        assert_eq!(store.current_strokes()[0].points(), &[p(2.0, 30.0), p(22.0, 30.0)]);
        // Selection survives pointer up
        assert_eq!(controller.selection(), Some(id));
        assert!(controller.state().is_idle());
    }

    #[test]
    fn test_pointer_down_on_empty_space_clears_selection() {
        let mut store = PageAnnotationStore::new();
        let mut controller = PointerEditingController::default();
        draw(&mut controller, &mut store, &[p(0.0, 0.0), p(20.0, 0.0)]);
        controller.pointer_down(&mut store, p(5.0, 0.0));
        controller.pointer_up();
        assert!(controller.selection().is_some());

        controller.pointer_down(&mut store, p(200.0, 200.0));
        assert!(controller.selection().is_none());
        assert_eq!(store.current_strokes().len(), 2);
    }

    #[test]
    fn test_width_edits_without_selection_are_noops() {
        let mut store = PageAnnotationStore::new();
        let mut controller = PointerEditingController::default();
        draw(&mut controller, &mut store, &[p(0.0, 0.0)]);

        assert!(controller.increase_width(&mut store).is_ignored());
        assert!(controller.decrease_width(&mut store).is_ignored());
        assert!(controller.set_color(&mut store, Color::RED).is_ignored());
        assert_eq!(store.current_strokes()[0].width(), DEFAULT_WIDTH);
        assert_eq!(store.current_strokes()[0].color(), Color::BLACK);
    }

    #[test]
    fn test_decrement_width_clamps_at_floor() {
        let mut store = PageAnnotationStore::new();
        let mut controller = PointerEditingController::default();
        draw(&mut controller, &mut store, &[p(0.0, 0.0), p(10.0, 0.0)]);
        controller.pointer_down(&mut store, p(5.0, 0.0));
        controller.pointer_up();

        for _ in 0..100 {
            controller.decrease_width(&mut store);
            assert!(store.current_strokes()[0].width() >= MIN_WIDTH);
        }
        assert_eq!(store.current_strokes()[0].width(), MIN_WIDTH);

        controller.increase_width(&mut store);
        assert_eq!(store.current_strokes()[0].width(), MIN_WIDTH + 1.0);
    }

    #[test]
    fn test_set_color_applies_to_selection() {
        let mut store = PageAnnotationStore::new();
        let mut controller = PointerEditingController::default();
        let id = draw(&mut controller, &mut store, &[p(0.0, 0.0), p(10.0, 0.0)]);
        controller.pointer_down(&mut store, p(5.0, 0.0));
        controller.pointer_up();

        let outcome = controller.set_color(&mut store, Color::BLUE);

        assert!(matches!(outcome, EditOutcome::StyleChanged { id: changed, .. } if changed == id));
        assert_eq!(store.get(id).map(Stroke::color), Some(Color::BLUE));
    }

    #[test]
    fn test_armed_move_over_stroke_deletes_once() {
        let mut store = PageAnnotationStore::new();
        let mut controller = PointerEditingController::default();
        let first = draw(&mut controller, &mut store, &[p(0.0, 0.0), p(10.0, 0.0)]);
        let second = draw(&mut controller, &mut store, &[p(0.0, 50.0), p(10.0, 50.0)]);

        controller.arm_delete();
        // Moving over nothing keeps the flag
        assert!(controller.pointer_move(&mut store, p(300.0, 300.0), false).is_ignored());
        assert!(controller.is_delete_armed());

        let outcome = controller.pointer_move(&mut store, p(5.0, 0.0), false);
        assert!(matches!(outcome, EditOutcome::StrokeDeleted { id, .. } if id == first));
        assert!(!controller.is_delete_armed());
        assert!(store.hit_test(p(5.0, 0.0)).is_none());

        // Not continuous: the second stroke survives a later move
        controller.pointer_move(&mut store, p(5.0, 50.0), false);
        assert_eq!(store.get(second).map(Stroke::id), Some(second));
    }

    #[test]
    fn test_disarm_on_key_release() {
        let mut store = PageAnnotationStore::new();
        let mut controller = PointerEditingController::default();
        draw(&mut controller, &mut store, &[p(0.0, 0.0), p(10.0, 0.0)]);

        controller.arm_delete();
        controller.disarm_delete();
        controller.pointer_move(&mut store, p(5.0, 0.0), false);

        assert_eq!(store.current_strokes().len(), 1);
    }

    #[test]
    fn test_deleting_dragged_stroke_returns_to_idle() {
        let mut store = PageAnnotationStore::new();
        let mut controller = PointerEditingController::default();
        draw(&mut controller, &mut store, &[p(0.0, 0.0), p(10.0, 0.0)]);

        controller.pointer_down(&mut store, p(5.0, 0.0));
        assert!(controller.state().is_dragging());
        controller.arm_delete();
        controller.pointer_move(&mut store, p(6.0, 0.0), true);

        assert!(controller.state().is_idle());
        assert!(controller.selection().is_none());
        assert!(store.current_strokes().is_empty());
        assert!(controller.increase_width(&mut store).is_ignored());
    }

    #[test]
    fn test_stale_drawing_reference_goes_idle() {
        let mut store = PageAnnotationStore::new();
        let mut controller = PointerEditingController::default();
        let EditOutcome::StrokeStarted { id, .. } = controller.pointer_down(&mut store, p(0.0, 0.0))
        else {
            panic!("expected a new stroke");
        };
        store.remove_stroke(id);

        assert!(controller.pointer_move(&mut store, p(1.0, 1.0), true).is_ignored());
        assert!(controller.state().is_idle());
    }

    #[test]
    fn test_session_defaults_policy_ignores_edits() {
        let mut store = PageAnnotationStore::new();
        let mut controller = PointerEditingController::default();
        draw(&mut controller, &mut store, &[p(0.0, 0.0), p(10.0, 0.0)]);
        controller.pointer_down(&mut store, p(5.0, 0.0));
        controller.set_color(&mut store, Color::RED);
        controller.increase_width(&mut store);
        controller.pointer_up();

        let id = draw(&mut controller, &mut store, &[p(100.0, 100.0)]);
        let stroke = store.get(id).expect("new stroke on page");
        assert_eq!(stroke.style(), StrokeStyle::default());
    }

    #[test]
    fn test_last_used_policy_inherits_style() {
        let mut store = PageAnnotationStore::new();
        let mut controller = PointerEditingController::new(EditConfig {
            style_policy: StylePolicy::LastUsed,
            ..EditConfig::default()
        });
        draw(&mut controller, &mut store, &[p(0.0, 0.0), p(10.0, 0.0)]);
        controller.pointer_down(&mut store, p(5.0, 0.0));
        controller.set_color(&mut store, Color::RED);
        controller.increase_width(&mut store);
        controller.pointer_up();

        let id = draw(&mut controller, &mut store, &[p(100.0, 100.0)]);
        let stroke = store.get(id).expect("new stroke on page");
        assert_eq!(stroke.style(), StrokeStyle::new(Color::RED, DEFAULT_WIDTH + 1.0));
    }

    #[test]
    fn test_last_used_width_is_the_clamped_width() {
        let mut store = PageAnnotationStore::new();
        let mut controller = PointerEditingController::new(EditConfig {
            style_policy: StylePolicy::LastUsed,
            ..EditConfig::default()
        });
        draw(&mut controller, &mut store, &[p(0.0, 0.0), p(10.0, 0.0)]);
        controller.pointer_down(&mut store, p(5.0, 0.0));
        for _ in 0..50 {
            controller.decrease_width(&mut store);
        }
        controller.pointer_up();

        assert_eq!(controller.next_stroke_style().width, MIN_WIDTH);
        let id = draw(&mut controller, &mut store, &[p(100.0, 100.0)]);
        let stroke = store.get(id).expect("new stroke on page");
        assert_eq!(stroke.width(), MIN_WIDTH);
    }

    #[test]
    fn test_reset_clears_transient_state() {
        let mut store = PageAnnotationStore::new();
        let mut controller = PointerEditingController::default();
        draw(&mut controller, &mut store, &[p(0.0, 0.0), p(10.0, 0.0)]);
        controller.pointer_down(&mut store, p(5.0, 0.0));
        controller.arm_delete();

        controller.reset();

        assert!(controller.state().is_idle());
        assert!(controller.selection().is_none());
        assert!(!controller.is_delete_armed());
    }

    #[test]
    fn test_outcome_damage() {
        let region = Bounds::from_point(p(1.0, 1.0));
        let id = StrokeId::new_v4();
        assert_eq!(EditOutcome::StrokeMoved { id, region }.damage(), Some(region));
        assert_eq!(EditOutcome::StrokeSelected { id }.damage(), None);
        assert_eq!(EditOutcome::Ignored.damage(), None);
    }
}
