//! Pointer gestures: drag-move, resize, rotate, marquee, and pan.
//!
//! One gesture is active at a time. A gesture starts on pointer-down, streams
//! uncommitted updates to the scene on pointer-move, and commits one history
//! snapshot on pointer-up. Points arrive in screen space and are converted
//! through the scene's viewport.

use serde::{Deserialize, Serialize};

use crate::geometry::{rotate_vector, Bounds, Point};
use crate::layer::{LayerId, LayerPatch};
use crate::scene::Scene;
use crate::snap::{self, Axis, Guide, SnapTargets};

/// Wheel zoom step per notch.
const WHEEL_ZOOM_STEP: f64 = 1.1;

/// Keyboard modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Only shift held.
    #[must_use]
    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::default()
        }
    }
}

/// A resize handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Corner {
    /// Top-left handle.
    TopLeft,
    /// Top-right handle.
    TopRight,
    /// Bottom-left handle.
    BottomLeft,
    /// Bottom-right handle.
    BottomRight,
}

impl Corner {
    fn is_left(self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft)
    }

    fn is_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight)
    }
}

/// What the pointer went down on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PointerTarget {
    /// Empty canvas or workspace.
    Background,
    /// The body of a layer.
    Layer {
        /// Layer hit.
        id: LayerId,
    },
    /// A corner handle of a selected layer.
    ResizeHandle {
        /// Layer being resized.
        id: LayerId,
        /// Handle grabbed.
        corner: Corner,
    },
    /// The rotation handle of a selected layer.
    RotateHandle {
        /// Layer being rotated.
        id: LayerId,
    },
}

/// The active gesture.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    /// Waiting for the next pointer-down.
    #[default]
    Idle,
    /// Moving the selected unlocked layers.
    Dragging {
        /// Document point where the drag started.
        origin: Point,
        /// Each moving layer with its starting bounds.
        initial: Vec<(LayerId, Bounds)>,
    },
    /// Resizing one layer from a corner.
    Resizing {
        /// Layer being resized.
        id: LayerId,
        /// Handle being dragged.
        corner: Corner,
        /// Screen point where the resize started.
        origin: Point,
        /// Bounds at the start.
        initial: Bounds,
        /// Rotation at the start, in degrees.
        rotation: f64,
    },
    /// Rotating one layer about its center.
    Rotating {
        /// Layer being rotated.
        id: LayerId,
        /// Screen-space center of the layer.
        center: Point,
        /// Pointer angle at the start, in radians.
        start_angle: f64,
        /// Rotation at the start, in degrees.
        initial_rotation: f64,
    },
    /// Rubber-band selection.
    Marquee {
        /// Document point where the marquee started.
        origin: Point,
        /// Current document point.
        current: Point,
    },
    /// Moving the viewport.
    Panning {
        /// Screen point of the previous event.
        last: Point,
    },
}

impl Gesture {
    /// Short name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Dragging { .. } => "drag",
            Self::Resizing { .. } => "resize",
            Self::Rotating { .. } => "rotate",
            Self::Marquee { .. } => "marquee",
            Self::Panning { .. } => "pan",
        }
    }
}

/// Gesture state machine driving a [`Scene`].
#[derive(Debug, Clone, Default)]
pub struct Interaction {
    gesture: Gesture,
    guides: Vec<Guide>,
    space_held: bool,
}

impl Interaction {
    /// Create an idle controller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The active gesture.
    #[must_use]
    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Guides to draw for the active snap, if any.
    #[must_use]
    pub fn guides(&self) -> &[Guide] {
        &self.guides
    }

    /// Whether the space key is held, turning drags into pans.
    #[must_use]
    pub fn space_pan(&self) -> bool {
        self.space_held
    }

    /// Press or release the space key.
    pub fn set_space_pan(&mut self, held: bool) {
        self.space_held = held;
    }

    /// The marquee rectangle in document space, while one is being drawn.
    #[must_use]
    pub fn marquee_rect(&self) -> Option<Bounds> {
        match self.gesture {
            Gesture::Marquee { origin, current } => Some(Bounds::from_corners(origin, current)),
            _ => None,
        }
    }

    /// The layer body under a screen point, or the background.
    #[must_use]
    pub fn target_at(scene: &Scene, screen: Point) -> PointerTarget {
        scene
            .hit_test(scene.viewport.screen_to_document(screen))
            .map_or(PointerTarget::Background, |id| PointerTarget::Layer { id })
    }

    /// Start a gesture. Ignored while another gesture is active.
    pub fn pointer_down(
        &mut self,
        scene: &mut Scene,
        target: PointerTarget,
        screen: Point,
        modifiers: Modifiers,
    ) {
        if self.gesture != Gesture::Idle {
            return;
        }
        if self.space_held {
            scene.viewport.panning = true;
            self.gesture = Gesture::Panning { last: screen };
            return;
        }

        let doc = scene.viewport.screen_to_document(screen);
        self.gesture = match target {
            PointerTarget::Background => {
                scene.select_canvas();
                Gesture::Marquee {
                    origin: doc,
                    current: doc,
                }
            }
            PointerTarget::Layer { id } => Self::begin_drag(scene, id, doc, modifiers),
            PointerTarget::ResizeHandle { id, corner } => match scene.layer(id) {
                Some(layer) if !layer.locked => Gesture::Resizing {
                    id,
                    corner,
                    origin: screen,
                    initial: layer.bounds(),
                    rotation: layer.rotation,
                },
                _ => Gesture::Idle,
            },
            PointerTarget::RotateHandle { id } => match scene.layer(id) {
                Some(layer) if !layer.locked => {
                    let center = scene.viewport.document_to_screen(layer.bounds().center());
                    Gesture::Rotating {
                        id,
                        center,
                        start_angle: (screen.y - center.y).atan2(screen.x - center.x),
                        initial_rotation: layer.rotation,
                    }
                }
                _ => Gesture::Idle,
            },
        };
        if self.gesture != Gesture::Idle {
            tracing::debug!("Gesture started: {}", self.gesture.name());
        }
    }

    fn begin_drag(scene: &mut Scene, id: LayerId, doc: Point, modifiers: Modifiers) -> Gesture {
        let Some(locked) = scene.layer(id).map(|l| l.locked) else {
            return Gesture::Idle;
        };
        if modifiers.shift {
            scene.toggle_selection(id);
        } else if !scene.is_selected(id) {
            scene.set_selected_layers(&[id]);
        }
        if locked || !scene.is_selected(id) {
            return Gesture::Idle;
        }
        let initial: Vec<(LayerId, Bounds)> = scene
            .selected_layers()
            .filter(|l| !l.locked)
            .map(|l| (l.id, l.bounds()))
            .collect();
        if initial.is_empty() {
            return Gesture::Idle;
        }
        Gesture::Dragging {
            origin: doc,
            initial,
        }
    }

    /// Advance the active gesture.
    pub fn pointer_move(&mut self, scene: &mut Scene, screen: Point, modifiers: Modifiers) {
        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::Dragging { origin, initial } => {
                let doc = scene.viewport.screen_to_document(screen);
                let (origin, initial) = (*origin, initial.clone());
                self.guides = drag(scene, origin, &initial, doc);
            }
            Gesture::Resizing {
                id,
                corner,
                origin,
                initial,
                rotation,
            } => {
                let (id, corner, origin, initial, rotation) =
                    (*id, *corner, *origin, *initial, *rotation);
                let zoom = scene.viewport.zoom;
                let delta = Point::new((screen.x - origin.x) / zoom, (screen.y - origin.y) / zoom);
                let (bounds, guides) = resize(scene, id, corner, initial, rotation, delta, modifiers);
                scene.update_layer(id, &LayerPatch::bounds(bounds));
                self.guides = guides;
            }
            Gesture::Rotating {
                id,
                center,
                start_angle,
                initial_rotation,
            } => {
                let angle = (screen.y - center.y).atan2(screen.x - center.x);
                let rotation = *initial_rotation + (angle - *start_angle).to_degrees();
                scene.update_layer(*id, &LayerPatch::rotation(rotation));
            }
            Gesture::Marquee { current, .. } => {
                *current = scene.viewport.screen_to_document(screen);
            }
            Gesture::Panning { last } => {
                scene.viewport.pan_by(screen.x - last.x, screen.y - last.y);
                *last = screen;
            }
        }
    }

    /// Finish the active gesture.
    pub fn pointer_up(&mut self, scene: &mut Scene) {
        let gesture = std::mem::take(&mut self.gesture);
        self.guides.clear();
        match gesture {
            Gesture::Idle => {}
            Gesture::Dragging { .. } | Gesture::Resizing { .. } | Gesture::Rotating { .. } => {
                scene.take_snapshot();
            }
            Gesture::Marquee { origin, current } => {
                let rect = Bounds::from_corners(origin, current);
                let threshold = scene.config().marquee_threshold;
                if rect.width > threshold || rect.height > threshold {
                    let hits: Vec<LayerId> = scene
                        .layers()
                        .iter()
                        .filter(|l| l.bounds().intersects(&rect))
                        .map(|l| l.id)
                        .collect();
                    tracing::debug!("Marquee selected {} layers", hits.len());
                    if !hits.is_empty() {
                        scene.set_selected_layers(&hits);
                    }
                }
            }
            Gesture::Panning { .. } => {
                scene.viewport.panning = false;
            }
        }
    }

    /// Scroll: pans the view, or zooms about the pointer with ctrl or meta held.
    pub fn wheel(&mut self, scene: &mut Scene, screen: Point, dx: f64, dy: f64, modifiers: Modifiers) {
        if modifiers.ctrl || modifiers.meta {
            let factor = if dy < 0.0 {
                WHEEL_ZOOM_STEP
            } else if dy > 0.0 {
                1.0 / WHEEL_ZOOM_STEP
            } else {
                return;
            };
            let (min, max) = (scene.config().min_zoom, scene.config().max_zoom);
            scene.viewport.zoom_at(factor, screen, min, max);
        } else {
            scene.viewport.pan_by(-dx, -dy);
        }
    }
}

fn drag(scene: &mut Scene, origin: Point, initial: &[(LayerId, Bounds)], doc: Point) -> Vec<Guide> {
    let mut dx = doc.x - origin.x;
    let mut dy = doc.y - origin.y;
    let mut guides = Vec::new();

    if let Some(moving) = Bounds::union_all(initial.iter().map(|(_, b)| *b)) {
        let ids: Vec<LayerId> = initial.iter().map(|(id, _)| *id).collect();
        let targets = SnapTargets::collect(scene.canvas(), scene.layers(), &ids);
        let threshold = scene.config().snap_threshold_px / scene.viewport.zoom;
        let snap = snap::snap_bounds(&moving.translate(dx, dy), &targets, threshold);
        dx += snap.dx;
        dy += snap.dy;
        guides = snap.guides;
    }

    for (id, bounds) in initial {
        scene.update_layer(*id, &LayerPatch::position(bounds.x + dx, bounds.y + dy));
    }
    guides
}

fn resize(
    scene: &Scene,
    id: LayerId,
    corner: Corner,
    initial: Bounds,
    rotation: f64,
    delta: Point,
    modifiers: Modifiers,
) -> (Bounds, Vec<Guide>) {
    let min = scene.config().min_layer_size;
    let (lx, ly) = rotate_vector(delta.x, delta.y, -rotation);
    let dw = if corner.is_left() { -lx } else { lx };
    let dh = if corner.is_top() { -ly } else { ly };

    let mut width = initial.width + dw;
    let mut height = initial.height + dh;
    if modifiers.shift && initial.height > 0.0 {
        let aspect = initial.width / initial.height;
        if dw.abs() >= dh.abs() {
            height = width / aspect;
        } else {
            width = height * aspect;
        }
    }
    width = width.max(min);
    height = height.max(min);

    // Grow away from the opposite corner, which stays put in the layer frame.
    let sx = if corner.is_left() { -1.0 } else { 1.0 };
    let sy = if corner.is_top() { -1.0 } else { 1.0 };
    let anchor = (-sx * initial.width / 2.0, -sy * initial.height / 2.0);
    let local_center = (anchor.0 + sx * width / 2.0, anchor.1 + sy * height / 2.0);
    let (cx, cy) = rotate_vector(local_center.0, local_center.1, rotation);
    let center = initial.center();
    let mut bounds = Bounds::new(
        center.x + cx - width / 2.0,
        center.y + cy - height / 2.0,
        width,
        height,
    );

    let mut guides = Vec::new();
    let axis_aligned = (rotation % 360.0).abs() < f64::EPSILON;
    if axis_aligned && !modifiers.shift {
        let targets = SnapTargets::collect(scene.canvas(), scene.layers(), &[id]);
        let threshold = scene.config().snap_threshold_px / scene.viewport.zoom;
        if let Some(guide) = snap_edge(&mut bounds, corner.is_left(), Axis::Vertical, &targets.vertical, threshold, min) {
            guides.push(guide);
        }
        if let Some(guide) = snap_edge(&mut bounds, corner.is_top(), Axis::Horizontal, &targets.horizontal, threshold, min) {
            guides.push(guide);
        }
    }
    (bounds, guides)
}

/// Snap the dragged edge of `bounds` on one axis, keeping the opposite edge fixed.
fn snap_edge(
    bounds: &mut Bounds,
    leading: bool,
    axis: Axis,
    targets: &[f64],
    threshold: f64,
    min: f64,
) -> Option<Guide> {
    let (start, size) = match axis {
        Axis::Vertical => (bounds.x, bounds.width),
        Axis::Horizontal => (bounds.y, bounds.height),
    };
    let end = start + size;
    let edge = if leading { start } else { end };
    let target = snap::snap_value(edge, targets, threshold)?;
    let (new_start, new_size) = if leading {
        (target, end - target)
    } else {
        (start, target - start)
    };
    if new_size < min {
        return None;
    }
    match axis {
        Axis::Vertical => {
            bounds.x = new_start;
            bounds.width = new_size;
        }
        Axis::Horizontal => {
            bounds.y = new_start;
            bounds.height = new_size;
        }
    }
    Some(Guide {
        axis,
        position: target,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayerTemplate;
    use crate::shapes::ShapeKind;

    fn rect(scene: &mut Scene, x: f64, y: f64, w: f64, h: f64) -> LayerId {
        let id = scene.add_layer(LayerTemplate::Shape(ShapeKind::Rectangle));
        scene.update_layer(id, &LayerPatch::bounds(Bounds::new(x, y, w, h)));
        scene.take_snapshot();
        id
    }

    fn bounds_of(scene: &Scene, id: LayerId) -> Bounds {
        scene.layer(id).expect("layer").bounds()
    }

    fn assert_bounds(actual: Bounds, expected: Bounds) {
        assert!((actual.x - expected.x).abs() < 1e-9, "x {actual:?}");
        assert!((actual.y - expected.y).abs() < 1e-9, "y {actual:?}");
        assert!((actual.width - expected.width).abs() < 1e-9, "w {actual:?}");
        assert!((actual.height - expected.height).abs() < 1e-9, "h {actual:?}");
    }

    fn resize_by(scene: &mut Scene, id: LayerId, corner: Corner, dx: f64, dy: f64, modifiers: Modifiers) {
        let mut interaction = Interaction::new();
        let start = Point::new(1000.0, 1000.0);
        interaction.pointer_down(scene, PointerTarget::ResizeHandle { id, corner }, start, Modifiers::default());
        interaction.pointer_move(scene, Point::new(start.x + dx, start.y + dy), modifiers);
        interaction.pointer_up(scene);
    }

    #[test]
    fn test_add_and_resize_bottom_right() {
        let mut scene = Scene::default();
        let id = scene.add_layer(LayerTemplate::Shape(ShapeKind::Rectangle));
        let before = bounds_of(&scene, id);
        let steps = scene.history().past_len();

        resize_by(&mut scene, id, Corner::BottomRight, 50.0, 50.0, Modifiers::default());

        let after = bounds_of(&scene, id);
        assert_bounds(after, Bounds::new(before.x, before.y, 150.0, 150.0));
        assert_eq!(scene.history().past_len(), steps + 1);
    }

    #[test]
    fn test_resize_top_left_anchors_bottom_right() {
        let mut scene = Scene::default();
        let id = rect(&mut scene, 200.0, 200.0, 100.0, 100.0);
        resize_by(&mut scene, id, Corner::TopLeft, -30.0, -20.0, Modifiers::default());
        assert_bounds(bounds_of(&scene, id), Bounds::new(170.0, 180.0, 130.0, 120.0));
    }

    #[test]
    fn test_resize_clamps_to_minimum() {
        let mut scene = Scene::default();
        let id = rect(&mut scene, 200.0, 200.0, 100.0, 100.0);
        resize_by(&mut scene, id, Corner::BottomRight, -500.0, -500.0, Modifiers::default());
        let b = bounds_of(&scene, id);
        assert!((b.width - 10.0).abs() < 1e-9);
        assert!((b.height - 10.0).abs() < 1e-9);
        assert!((b.x - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_resize_shift_keeps_aspect() {
        let mut scene = Scene::default();
        let id = rect(&mut scene, 200.0, 200.0, 200.0, 100.0);
        resize_by(&mut scene, id, Corner::BottomRight, 100.0, 10.0, Modifiers::shift());
        let b = bounds_of(&scene, id);
        assert!((b.width - 300.0).abs() < 1e-9);
        assert!((b.height - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_resize_rotated_uses_local_axes() {
        let mut scene = Scene::default();
        let id = rect(&mut scene, 200.0, 200.0, 100.0, 100.0);
        scene.update_layer(id, &LayerPatch::rotation(90.0));
        // A quarter turn clockwise points the layer's local x axis down the screen.
        resize_by(&mut scene, id, Corner::BottomRight, 0.0, 40.0, Modifiers::default());
        let b = bounds_of(&scene, id);
        assert!((b.width - 140.0).abs() < 1e-9, "{b:?}");
        assert!((b.height - 100.0).abs() < 1e-9, "{b:?}");
    }

    #[test]
    fn test_resize_snaps_dragged_edge() {
        let mut scene = Scene::default();
        let _target = rect(&mut scene, 400.0, 0.0, 50.0, 50.0);
        let id = rect(&mut scene, 200.0, 200.0, 100.0, 100.0);
        resize_by(&mut scene, id, Corner::BottomRight, 97.0, 0.0, Modifiers::default());
        let b = bounds_of(&scene, id);
        assert!((b.right() - 400.0).abs() < f64::EPSILON, "{b:?}");
        assert!((b.x - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_drag_snaps_left_to_right_edge() {
        let mut scene = Scene::default();
        let _a = rect(&mut scene, 0.0, 0.0, 100.0, 100.0);
        let b = rect(&mut scene, 300.0, 300.0, 100.0, 100.0);
        let mut interaction = Interaction::new();

        interaction.pointer_down(&mut scene, PointerTarget::Layer { id: b }, Point::new(350.0, 350.0), Modifiers::default());
        interaction.pointer_move(&mut scene, Point::new(153.0, 350.0), Modifiers::default());
        assert_eq!(
            interaction.guides(),
            &[Guide {
                axis: Axis::Vertical,
                position: 100.0
            }]
        );
        interaction.pointer_up(&mut scene);

        let moved = bounds_of(&scene, b);
        assert!((moved.x - 100.0).abs() < f64::EPSILON);
        assert!((moved.y - 300.0).abs() < f64::EPSILON);
        assert!(interaction.guides().is_empty());
    }

    #[test]
    fn test_drag_threshold_scales_with_zoom() {
        let mut scene = Scene::default();
        let _a = rect(&mut scene, 0.0, 0.0, 100.0, 100.0);
        let b = rect(&mut scene, 300.0, 300.0, 100.0, 100.0);
        scene.viewport.zoom = 2.0;
        let mut interaction = Interaction::new();

        // 4 document units away is 8 screen pixels at 2x: outside the 5 px threshold.
        let start = scene.viewport.document_to_screen(Point::new(350.0, 350.0));
        interaction.pointer_down(&mut scene, PointerTarget::Layer { id: b }, start, Modifiers::default());
        interaction.pointer_move(&mut scene, Point::new(start.x - 392.0, start.y), Modifiers::default());
        interaction.pointer_up(&mut scene);
        assert!((bounds_of(&scene, b).x - 104.0).abs() < 1e-9);
    }

    #[test]
    fn test_drag_commits_once() {
        let mut scene = Scene::default();
        let a = rect(&mut scene, 300.0, 300.0, 100.0, 100.0);
        let steps = scene.history().past_len();
        let mut interaction = Interaction::new();

        interaction.pointer_down(&mut scene, PointerTarget::Layer { id: a }, Point::new(310.0, 310.0), Modifiers::default());
        for i in 1..=10 {
            let step = f64::from(i) * 7.0;
            interaction.pointer_move(&mut scene, Point::new(310.0 + step, 310.0 + step), Modifiers::default());
        }
        interaction.pointer_up(&mut scene);
        assert_eq!(scene.history().past_len(), steps + 1);
        scene.undo();
        assert!((bounds_of(&scene, a).x - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_drag_moves_whole_selection() {
        let mut scene = Scene::default();
        let a = rect(&mut scene, 300.0, 300.0, 20.0, 20.0);
        let b = rect(&mut scene, 400.0, 300.0, 20.0, 20.0);
        scene.set_selected_layers(&[a, b]);
        let mut interaction = Interaction::new();

        interaction.pointer_down(&mut scene, PointerTarget::Layer { id: a }, Point::new(305.0, 305.0), Modifiers::default());
        interaction.pointer_move(&mut scene, Point::new(325.0, 385.0), Modifiers::default());
        interaction.pointer_up(&mut scene);
        assert_eq!(scene.selected_ids(), &[a, b]);
        assert!((bounds_of(&scene, a).x - 320.0).abs() < f64::EPSILON);
        assert!((bounds_of(&scene, b).x - 420.0).abs() < f64::EPSILON);
        assert!((bounds_of(&scene, b).y - 380.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shift_click_toggles_selection() {
        let mut scene = Scene::default();
        let a = rect(&mut scene, 300.0, 300.0, 20.0, 20.0);
        let b = rect(&mut scene, 400.0, 300.0, 20.0, 20.0);
        scene.set_selected_layers(&[a]);
        let mut interaction = Interaction::new();

        interaction.pointer_down(&mut scene, PointerTarget::Layer { id: b }, Point::new(405.0, 305.0), Modifiers::shift());
        interaction.pointer_up(&mut scene);
        assert_eq!(scene.selected_ids(), &[a, b]);

        interaction.pointer_down(&mut scene, PointerTarget::Layer { id: a }, Point::new(305.0, 305.0), Modifiers::shift());
        assert_eq!(interaction.gesture(), &Gesture::Idle);
        assert_eq!(scene.selected_ids(), &[b]);
    }

    #[test]
    fn test_locked_layer_selects_without_drag() {
        let mut scene = Scene::default();
        let a = rect(&mut scene, 300.0, 300.0, 20.0, 20.0);
        scene.toggle_layer_lock(a);
        scene.deselect_all();
        let mut interaction = Interaction::new();

        interaction.pointer_down(&mut scene, PointerTarget::Layer { id: a }, Point::new(305.0, 305.0), Modifiers::default());
        assert_eq!(scene.selected_ids(), &[a]);
        assert_eq!(interaction.gesture(), &Gesture::Idle);
    }

    #[test]
    fn test_marquee_selects_overlapping() {
        let mut scene = Scene::default();
        let a = rect(&mut scene, 0.0, 0.0, 50.0, 50.0);
        let b = rect(&mut scene, 60.0, 0.0, 50.0, 50.0);
        let _c = rect(&mut scene, 200.0, 200.0, 50.0, 50.0);
        let mut interaction = Interaction::new();

        interaction.pointer_down(&mut scene, PointerTarget::Background, Point::new(0.0, 0.0), Modifiers::default());
        assert!(scene.is_canvas_selected());
        interaction.pointer_move(&mut scene, Point::new(70.0, 70.0), Modifiers::default());
        assert_eq!(interaction.marquee_rect(), Some(Bounds::new(0.0, 0.0, 70.0, 70.0)));
        interaction.pointer_up(&mut scene);

        assert_eq!(scene.selected_ids(), &[a, b]);
        assert!(!scene.is_canvas_selected());
    }

    #[test]
    fn test_small_marquee_keeps_canvas_selected() {
        let mut scene = Scene::default();
        rect(&mut scene, 0.0, 0.0, 50.0, 50.0);
        let mut interaction = Interaction::new();

        interaction.pointer_down(&mut scene, PointerTarget::Background, Point::new(10.0, 10.0), Modifiers::default());
        interaction.pointer_move(&mut scene, Point::new(13.0, 13.0), Modifiers::default());
        interaction.pointer_up(&mut scene);
        assert!(scene.is_canvas_selected());
        assert!(scene.selected_ids().is_empty());
    }

    #[test]
    fn test_rotate_adds_angle_delta() {
        let mut scene = Scene::default();
        let id = rect(&mut scene, 100.0, 100.0, 100.0, 100.0);
        let mut interaction = Interaction::new();

        // center (150, 150); start due east, end due south
        interaction.pointer_down(&mut scene, PointerTarget::RotateHandle { id }, Point::new(250.0, 150.0), Modifiers::default());
        interaction.pointer_move(&mut scene, Point::new(150.0, 250.0), Modifiers::default());
        interaction.pointer_up(&mut scene);
        let rotation = scene.layer(id).expect("layer").rotation;
        assert!((rotation - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_space_pan_never_commits() {
        let mut scene = Scene::default();
        rect(&mut scene, 0.0, 0.0, 50.0, 50.0);
        let steps = scene.history().past_len();
        let mut interaction = Interaction::new();
        interaction.set_space_pan(true);

        interaction.pointer_down(&mut scene, PointerTarget::Background, Point::new(10.0, 10.0), Modifiers::default());
        assert!(scene.viewport.panning);
        interaction.pointer_move(&mut scene, Point::new(40.0, 30.0), Modifiers::default());
        interaction.pointer_up(&mut scene);

        assert!(!scene.viewport.panning);
        assert!((scene.viewport.pan_x - 30.0).abs() < f64::EPSILON);
        assert!((scene.viewport.pan_y - 20.0).abs() < f64::EPSILON);
        assert_eq!(scene.history().past_len(), steps);
    }

    #[test]
    fn test_wheel_zoom_and_pan() {
        let mut scene = Scene::default();
        let mut interaction = Interaction::new();
        let ctrl = Modifiers {
            ctrl: true,
            ..Modifiers::default()
        };
        for _ in 0..100 {
            interaction.wheel(&mut scene, Point::new(0.0, 0.0), 0.0, -1.0, ctrl);
        }
        assert!((scene.viewport.zoom - 10.0).abs() < f64::EPSILON);

        interaction.wheel(&mut scene, Point::new(0.0, 0.0), 5.0, 10.0, Modifiers::default());
        assert!((scene.viewport.pan_x + 5.0).abs() < f64::EPSILON);
        assert!((scene.viewport.pan_y + 10.0).abs() < f64::EPSILON);
    }
}
