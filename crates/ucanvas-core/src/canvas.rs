//! Canvas runtime: routes input to the store and viewport and keeps the
//! persisted copy in sync.

use crate::config::CanvasConfig;
use crate::input::{InputEvent, PointerKind};
use crate::minimap::MiniMap;
use crate::shapes::{Primitive, PrimitiveId};
use crate::storage::{AutoSaver, Storage, StorageResult, load_or_default};
use crate::store::{Store, StoreEvent, SubscriptionId};
use crate::tools::{CanvasMode, ToolSettings};
use crate::viewport::Viewport;
use kurbo::{Point, Size};
use std::sync::Arc;

/// What the current single-pointer gesture is doing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum Gesture {
    #[default]
    Idle,
    /// Feeding samples to the store's live primitive.
    Drawing,
    /// Panning the viewport in move mode.
    Dragging { origin: Point, last: Point },
    /// Ignoring the rest of this gesture.
    Suppressed,
}

/// Runtime canvas state.
#[derive(Debug)]
pub struct Canvas {
    store: Store,
    /// Pan and zoom.
    pub viewport: Viewport,
    /// Style and mode for the next gesture.
    pub tools: ToolSettings,
    /// Overview projector.
    pub minimap: MiniMap,
    config: CanvasConfig,
    gesture: Gesture,
    autosaver: Option<AutoSaver>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

impl Canvas {
    /// Create an empty canvas that is not persisted.
    pub fn new(config: CanvasConfig) -> Self {
        Self {
            store: Store::with_max_history(config.max_history),
            viewport: Viewport::from_config(&config),
            tools: ToolSettings::default(),
            minimap: MiniMap::from_config(&config),
            config,
            gesture: Gesture::Idle,
            autosaver: None,
        }
    }

    /// Load the canvas stored under `config.document_key` and keep saving
    /// changes back to `storage`.
    pub fn open<S: Storage + 'static>(storage: Arc<S>, config: CanvasConfig) -> StorageResult<Self> {
        let primitives = load_or_default(storage.as_ref(), &config.document_key);
        let autosaver = AutoSaver::spawn(storage, config.document_key.clone())?;

        let mut canvas = Self::new(config);
        canvas.store.load(primitives);
        // Loading is not an edit.
        canvas.store.take_save_request();
        canvas.autosaver = Some(autosaver);
        Ok(canvas)
    }

    /// The primitive store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Active configuration.
    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// Committed primitives in drawing order.
    pub fn primitives(&self) -> &[Primitive] {
        self.store.primitives()
    }

    /// Register a listener for store changes.
    pub fn subscribe(&mut self, listener: impl FnMut(&StoreEvent) + Send + 'static) -> SubscriptionId {
        self.store.subscribe(listener)
    }

    /// Remove a store listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Update the on-screen size of the canvas view.
    pub fn set_viewport_size(&mut self, size: Size) {
        self.viewport.set_viewport_size(size);
    }

    /// Apply one input event. Returns true if anything visible changed.
    pub fn handle(&mut self, event: InputEvent) -> bool {
        if event.is_viewport_gesture() {
            self.interrupt_drawing();
        }
        let changed = match event {
            InputEvent::PointerDown { position, kind } => self.pointer_down(position, kind),
            InputEvent::PointerMove { position } => self.pointer_move(position),
            InputEvent::PointerUp => self.pointer_up(),
            InputEvent::PanDelta { translation } => {
                self.viewport.pan_update(translation);
                true
            }
            InputEvent::PanEnd { translation } => {
                self.viewport.pan_end(translation);
                true
            }
            InputEvent::PinchUpdate { scale, focal } => self.viewport.pinch_update(scale, focal),
            InputEvent::PinchEnd => {
                self.viewport.pinch_end();
                false
            }
        };
        self.sync_storage();
        changed
    }

    fn pointer_down(&mut self, position: Point, kind: PointerKind) -> bool {
        // A new pointer-down without an up; finish what we had.
        let ended = self.pointer_up();

        if kind == PointerKind::Stylus {
            log::debug!("Stylus input is not used for drawing; ignoring gesture");
            self.gesture = Gesture::Suppressed;
            return ended;
        }

        match self.tools.mode {
            CanvasMode::Move => {
                self.gesture = Gesture::Dragging {
                    origin: position,
                    last: position,
                };
                ended
            }
            CanvasMode::Draw => {
                let point = self.viewport.screen_to_canvas(position);
                let tools = self.tools;
                let id = self.store.begin(tools.shape_kind, point, tools.color, tools.line_width);
                log::debug!("Begin {:?} {} at {:?}", tools.shape_kind, id, point);
                self.gesture = Gesture::Drawing;
                true
            }
        }
    }

    fn pointer_move(&mut self, position: Point) -> bool {
        match &mut self.gesture {
            Gesture::Drawing => {
                let point = self.viewport.screen_to_canvas(position);
                self.store.extend(point)
            }
            Gesture::Dragging { origin, last } => {
                *last = position;
                let translation = position - *origin;
                self.viewport.pan_update(translation);
                true
            }
            Gesture::Idle | Gesture::Suppressed => false,
        }
    }

    fn pointer_up(&mut self) -> bool {
        match std::mem::take(&mut self.gesture) {
            Gesture::Drawing => {
                if let Some(id) = self.store.end() {
                    log::debug!("Committed {}", id);
                }
                true
            }
            Gesture::Dragging { origin, last } => {
                self.viewport.pan_end(last - origin);
                true
            }
            Gesture::Idle | Gesture::Suppressed => false,
        }
    }

    /// Drop the in-flight primitive when a two-finger gesture takes over.
    fn interrupt_drawing(&mut self) {
        if self.gesture == Gesture::Drawing {
            log::debug!("Viewport gesture started mid-draw; dropping live primitive");
            self.store.cancel();
            self.gesture = Gesture::Suppressed;
        }
    }

    /// Undo the most recent primitive.
    pub fn undo(&mut self) -> bool {
        let undone = self.store.undo();
        self.sync_storage();
        undone
    }

    /// Redo the last undone primitive.
    pub fn redo(&mut self) -> bool {
        let redone = self.store.redo();
        self.sync_storage();
        redone
    }

    /// Remove everything from the canvas.
    pub fn clear(&mut self) {
        if let Gesture::Dragging { origin, last } = std::mem::take(&mut self.gesture) {
            self.viewport.pan_end(last - origin);
        }
        self.store.clear();
        self.sync_storage();
    }

    /// Append a finished primitive, as if it had been drawn.
    pub fn push(&mut self, primitive: Primitive) -> Option<PrimitiveId> {
        let id = primitive.id();
        let pushed = self.store.push(primitive);
        self.sync_storage();
        pushed.then_some(id)
    }

    fn sync_storage(&mut self) {
        if !self.store.take_save_request() {
            return;
        }
        if let Some(saver) = &self.autosaver {
            saver.request_save(self.store.primitives().to_vec());
        }
    }

    /// Block until pending saves are written. Returns false if saving is
    /// disabled or the save thread has stopped.
    pub fn flush(&self) -> bool {
        self.autosaver.as_ref().is_some_and(AutoSaver::flush)
    }

    /// Flat point lists: one per stroke, and the two corners of each shape.
    pub fn export_points(&self) -> Vec<Vec<Point>> {
        self.store
            .primitives()
            .iter()
            .map(|primitive| match primitive {
                Primitive::Stroke(stroke) => stroke.points.clone(),
                Primitive::Shape(shape) => vec![shape.start, shape.end],
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{RgbaColor, ShapeKind};
    use crate::storage::MemoryStorage;
    use kurbo::Vec2;

    fn down(x: f64, y: f64) -> InputEvent {
        InputEvent::PointerDown {
            position: Point::new(x, y),
            kind: PointerKind::Touch,
        }
    }

    fn moved(x: f64, y: f64) -> InputEvent {
        InputEvent::PointerMove {
            position: Point::new(x, y),
        }
    }

    fn draw(canvas: &mut Canvas, points: &[(f64, f64)]) {
        let (first, rest) = points.split_first().unwrap();
        canvas.handle(down(first.0, first.1));
        for (x, y) in rest {
            canvas.handle(moved(*x, *y));
        }
        canvas.handle(InputEvent::PointerUp);
    }

    #[test]
    fn test_three_point_stroke() {
        let mut canvas = Canvas::default();
        canvas.tools.color = RgbaColor::red();
        canvas.tools.line_width = 2.0;

        draw(&mut canvas, &[(10.0, 10.0), (20.0, 10.0), (20.0, 20.0)]);

        assert_eq!(canvas.primitives().len(), 1);
        let stroke = canvas.primitives()[0].as_stroke().unwrap();
        assert_eq!(
            stroke.points,
            vec![Point::new(10.0, 10.0), Point::new(20.0, 10.0), Point::new(20.0, 20.0)]
        );
        assert_eq!(stroke.color, RgbaColor::red());
        assert!((stroke.line_width - 2.0).abs() < f64::EPSILON);
        let committed = stroke.clone();

        assert!(canvas.undo());
        assert!(canvas.primitives().is_empty());
        assert_eq!(canvas.store().deleted().len(), 1);

        assert!(canvas.redo());
        assert_eq!(canvas.primitives()[0].as_stroke(), Some(&committed));
    }

    #[test]
    fn test_drawing_maps_through_viewport() {
        let mut canvas = Canvas::default();
        canvas.viewport.zoom_by(2.0);
        canvas.viewport.pan_by(Vec2::new(100.0, 50.0));

        draw(&mut canvas, &[(300.0, 250.0)]);
        let stroke = canvas.primitives()[0].as_stroke().unwrap();
        assert_eq!(stroke.points, vec![Point::new(100.0, 100.0)]);
    }

    #[test]
    fn test_shape_gesture() {
        let mut canvas = Canvas::default();
        canvas.tools.shape_kind = ShapeKind::Circle;

        draw(&mut canvas, &[(0.0, 0.0), (5.0, 5.0), (10.0, 0.0)]);

        let shape = canvas.primitives()[0].as_shape().unwrap();
        assert_eq!(shape.kind, ShapeKind::Circle);
        assert_eq!(shape.start, Point::ZERO);
        assert_eq!(shape.end, Point::new(10.0, 0.0));
        assert!(shape.is_finalized);
        assert_eq!(canvas.export_points(), vec![vec![Point::ZERO, Point::new(10.0, 0.0)]]);
    }

    #[test]
    fn test_stylus_is_suppressed() {
        let mut canvas = Canvas::default();
        let changed = canvas.handle(InputEvent::PointerDown {
            position: Point::new(1.0, 1.0),
            kind: PointerKind::Stylus,
        });
        assert!(!changed);
        assert!(!canvas.handle(moved(2.0, 2.0)));
        assert!(!canvas.handle(InputEvent::PointerUp));
        assert!(canvas.primitives().is_empty());
        assert!(canvas.store().live().is_none());
    }

    #[test]
    fn test_move_mode_pans() {
        let mut canvas = Canvas::default();
        canvas.tools.mode = CanvasMode::Move;

        canvas.handle(down(100.0, 100.0));
        canvas.handle(moved(150.0, 120.0));
        assert_eq!(canvas.viewport.drag_offset, Vec2::new(50.0, 20.0));
        canvas.handle(InputEvent::PointerUp);

        assert_eq!(canvas.viewport.offset, Vec2::new(50.0, 20.0));
        assert_eq!(canvas.viewport.drag_offset, Vec2::ZERO);
        assert!(canvas.primitives().is_empty());
    }

    #[test]
    fn test_new_pointer_down_ends_drag() {
        let mut canvas = Canvas::default();
        canvas.tools.mode = CanvasMode::Move;
        canvas.handle(down(100.0, 100.0));
        canvas.handle(moved(150.0, 120.0));

        canvas.handle(InputEvent::PointerDown {
            position: Point::new(5.0, 5.0),
            kind: PointerKind::Stylus,
        });
        canvas.handle(InputEvent::PointerUp);
        assert_eq!(canvas.viewport.drag_offset, Vec2::ZERO);
        assert_eq!(canvas.viewport.offset, Vec2::new(50.0, 20.0));

        canvas.tools.mode = CanvasMode::Draw;
        draw(&mut canvas, &[(150.0, 120.0)]);
        let stroke = canvas.primitives()[0].as_stroke().unwrap();
        assert_eq!(stroke.points, vec![Point::new(100.0, 100.0)]);
    }

    #[test]
    fn test_clear_during_drag_commits_pan() {
        let mut canvas = Canvas::default();
        canvas.tools.mode = CanvasMode::Move;
        canvas.handle(down(100.0, 100.0));
        canvas.handle(moved(150.0, 120.0));

        canvas.clear();
        assert!(!canvas.handle(InputEvent::PointerUp));
        assert_eq!(canvas.viewport.drag_offset, Vec2::ZERO);
        assert_eq!(canvas.viewport.offset, Vec2::new(50.0, 20.0));

        canvas.tools.mode = CanvasMode::Draw;
        draw(&mut canvas, &[(100.0, 100.0)]);
        let stroke = canvas.primitives()[0].as_stroke().unwrap();
        assert_eq!(stroke.points, vec![Point::new(50.0, 80.0)]);
    }

    #[test]
    fn test_pinch_cancels_live_stroke() {
        let mut canvas = Canvas::default();
        canvas.handle(down(10.0, 10.0));
        canvas.handle(moved(20.0, 20.0));
        canvas.handle(InputEvent::PinchUpdate {
            scale: 1.5,
            focal: Point::new(400.0, 300.0),
        });
        assert!(canvas.store().live().is_none());

        // The lifted finger must not commit anything.
        canvas.handle(moved(30.0, 30.0));
        canvas.handle(InputEvent::PinchEnd);
        canvas.handle(InputEvent::PointerUp);
        assert!(canvas.primitives().is_empty());
        assert!((canvas.viewport.scale - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_two_finger_pan() {
        let mut canvas = Canvas::default();
        canvas.handle(InputEvent::PanDelta {
            translation: Vec2::new(30.0, -10.0),
        });
        assert_eq!(canvas.viewport.drag_offset, Vec2::new(30.0, -10.0));
        canvas.handle(InputEvent::PanEnd {
            translation: Vec2::new(40.0, -10.0),
        });
        assert_eq!(canvas.viewport.offset, Vec2::new(40.0, -10.0));
        assert_eq!(canvas.viewport.drag_offset, Vec2::ZERO);
    }

    #[test]
    fn test_commits_are_persisted() {
        let storage = Arc::new(MemoryStorage::new());
        let mut canvas = Canvas::open(storage.clone(), CanvasConfig::default()).unwrap();

        draw(&mut canvas, &[(1.0, 1.0), (2.0, 2.0)]);
        assert!(canvas.flush());

        let saved = storage.saved_documents("ucanvas");
        assert_eq!(saved.last().unwrap(), &canvas.primitives().to_vec());
    }

    #[test]
    fn test_live_changes_are_not_persisted() {
        let storage = Arc::new(MemoryStorage::new());
        let mut canvas = Canvas::open(storage.clone(), CanvasConfig::default()).unwrap();

        canvas.handle(down(1.0, 1.0));
        canvas.handle(moved(2.0, 2.0));
        assert!(canvas.flush());
        assert_eq!(storage.save_count(), 0);
    }

    #[test]
    fn test_clear_persists_one_empty_document() {
        let storage = Arc::new(MemoryStorage::new());
        let mut canvas = Canvas::open(storage.clone(), CanvasConfig::default()).unwrap();

        for i in 0..5 {
            let x = i as f64 * 10.0;
            draw(&mut canvas, &[(x, 0.0), (x, 10.0), (x + 5.0, 20.0)]);
        }
        canvas.tools.shape_kind = ShapeKind::Rectangle;
        draw(&mut canvas, &[(0.0, 0.0), (50.0, 50.0)]);
        canvas.tools.shape_kind = ShapeKind::Circle;
        draw(&mut canvas, &[(100.0, 100.0), (120.0, 100.0)]);
        assert_eq!(canvas.primitives().len(), 7);
        assert!(canvas.flush());

        let before = storage.saved_documents("ucanvas").len();
        canvas.clear();
        assert!(canvas.flush());

        let saved = storage.saved_documents("ucanvas");
        assert_eq!(saved.len(), before + 1);
        assert!(saved[before].is_empty());
        assert!(canvas.primitives().is_empty());
        assert!(!canvas.store().can_redo());
    }

    #[test]
    fn test_open_restores_saved_canvas() {
        let storage = Arc::new(MemoryStorage::new());
        {
            let mut canvas = Canvas::open(storage.clone(), CanvasConfig::default()).unwrap();
            draw(&mut canvas, &[(1.0, 1.0), (5.0, 5.0)]);
            canvas.tools.shape_kind = ShapeKind::Rectangle;
            draw(&mut canvas, &[(0.0, 0.0), (8.0, 8.0)]);
        }

        let canvas = Canvas::open(storage.clone(), CanvasConfig::default()).unwrap();
        assert_eq!(canvas.primitives().len(), 2);
        assert!(canvas.primitives()[0].as_stroke().is_some());
        assert!(canvas.primitives()[1].as_shape().is_some());
        assert!(!canvas.store().can_redo());
    }

    #[test]
    fn test_flush_without_storage() {
        let canvas = Canvas::default();
        assert!(!canvas.flush());
    }
}
