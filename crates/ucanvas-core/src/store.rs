//! Ordered, undoable collection of canvas primitives.

use crate::shapes::{Primitive, PrimitiveId, RgbaColor, Shape, ShapeKind, Stroke};
use kurbo::{Point, Rect};
use std::fmt;

/// Default number of undone primitives kept for redo.
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// A change to the store, delivered to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// The live (in-progress) primitive was created, extended or dropped.
    LiveChanged,
    /// A primitive was committed.
    Committed(PrimitiveId),
    /// A live primitive ended without anything worth keeping.
    Discarded,
    /// The most recent primitive was moved to the redo stack.
    Undone(PrimitiveId),
    /// A primitive was restored from the redo stack.
    Redone(PrimitiveId),
    /// Everything was removed.
    Cleared,
    /// The committed collection was replaced by persisted data.
    Loaded(usize),
}

impl StoreEvent {
    /// Whether the committed collection changed and should be written out.
    pub fn requires_save(&self) -> bool {
        matches!(
            self,
            StoreEvent::Committed(_) | StoreEvent::Undone(_) | StoreEvent::Redone(_) | StoreEvent::Cleared
        )
    }
}

/// Handle returned by [`Store::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&StoreEvent) + Send>;

/// Committed primitives in drawing order, the redo stack, and at most one
/// live primitive that is still being drawn.
pub struct Store {
    /// Committed primitives, oldest first.
    primitives: Vec<Primitive>,
    /// Undone primitives, most recently undone last.
    deleted: Vec<Primitive>,
    /// Primitive currently being drawn.
    live: Option<Primitive>,
    /// Cap on the redo stack.
    max_history: usize,
    /// Set when a change needs persisting, cleared by `take_save_request`.
    save_requested: bool,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("primitives", &self.primitives.len())
            .field("deleted", &self.deleted.len())
            .field("live", &self.live.as_ref().map(Primitive::id))
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::with_max_history(DEFAULT_MAX_HISTORY)
    }

    /// Create an empty store keeping at most `max_history` undone primitives.
    pub fn with_max_history(max_history: usize) -> Self {
        Self {
            primitives: Vec::new(),
            deleted: Vec::new(),
            live: None,
            max_history,
            save_requested: false,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Register a listener for store changes.
    pub fn subscribe(&mut self, listener: impl FnMut(&StoreEvent) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn emit(&mut self, event: StoreEvent) {
        if event.requires_save() {
            self.save_requested = true;
        }
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }

    /// Returns true once after every change that should be persisted.
    pub fn take_save_request(&mut self) -> bool {
        std::mem::take(&mut self.save_requested)
    }

    /// Start a new primitive of `kind` at `point`.
    ///
    /// Freeform starts a stroke; any other kind starts an unfinalized shape.
    /// A primitive that is still live is ended first.
    pub fn begin(&mut self, kind: ShapeKind, point: Point, color: RgbaColor, line_width: f64) -> PrimitiveId {
        match kind {
            ShapeKind::Freeform => self.begin_stroke(point, color, line_width),
            _ => self.begin_shape(kind, point, color, line_width),
        }
    }

    /// Start a new stroke with a single point.
    pub fn begin_stroke(&mut self, point: Point, color: RgbaColor, line_width: f64) -> PrimitiveId {
        let mut stroke = Stroke::new(color, line_width);
        stroke.add_point(point);
        self.start_live(Primitive::Stroke(stroke))
    }

    /// Start a new shape with start and end at `point`.
    ///
    /// Freeform is not a shape; it starts a stroke instead.
    pub fn begin_shape(&mut self, kind: ShapeKind, point: Point, color: RgbaColor, line_width: f64) -> PrimitiveId {
        if kind == ShapeKind::Freeform {
            return self.begin_stroke(point, color, line_width);
        }
        self.start_live(Primitive::Shape(Shape::new(kind, point, color, line_width)))
    }

    fn start_live(&mut self, primitive: Primitive) -> PrimitiveId {
        if self.live.is_some() {
            log::debug!("Beginning a new primitive while one is live; ending the previous one");
            self.end();
        }
        let id = primitive.id();
        self.live = Some(primitive);
        self.emit(StoreEvent::LiveChanged);
        id
    }

    /// Feed the next input sample to the live primitive.
    ///
    /// Returns false when nothing is being drawn.
    pub fn extend(&mut self, point: Point) -> bool {
        let changed = match &mut self.live {
            Some(Primitive::Stroke(stroke)) => {
                stroke.add_point(point);
                true
            }
            Some(Primitive::Shape(shape)) => shape.set_end(point),
            None => false,
        };
        if changed {
            self.emit(StoreEvent::LiveChanged);
        }
        changed
    }

    /// Finish the live primitive.
    ///
    /// Non-empty strokes and all shapes are committed; an empty stroke or a
    /// primitive without a positive line width is discarded. Returns the id of the committed primitive.
    pub fn end(&mut self) -> Option<PrimitiveId> {
        let mut primitive = self.live.take()?;
        if let Primitive::Shape(shape) = &mut primitive {
            shape.finalize();
        }

        if !primitive.is_committable() {
            log::debug!("Discarding uncommittable primitive {}", primitive.id());
            self.emit(StoreEvent::Discarded);
            return None;
        }

        let id = primitive.id();
        self.commit(primitive);
        Some(id)
    }

    /// Drop the live primitive without committing it.
    pub fn cancel(&mut self) -> bool {
        if self.live.take().is_some() {
            self.emit(StoreEvent::LiveChanged);
            true
        } else {
            false
        }
    }

    /// Append an already finished primitive.
    ///
    /// Anything that could not have been committed by drawing (empty strokes,
    /// unfinalized or freeform shapes, non-positive widths) is rejected.
    pub fn push(&mut self, primitive: Primitive) -> bool {
        if !primitive.is_committable() {
            return false;
        }
        self.commit(primitive);
        true
    }

    fn commit(&mut self, primitive: Primitive) {
        let id = primitive.id();
        self.primitives.push(primitive);
        // A fresh action invalidates everything that was undone.
        self.deleted.clear();
        self.emit(StoreEvent::Committed(id));
    }

    /// Undo the most recent primitive.
    /// Returns true if undo was performed, false if nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(primitive) = self.primitives.pop() else {
            return false;
        };
        let id = primitive.id();
        self.deleted.push(primitive);
        if self.deleted.len() > self.max_history {
            self.deleted.remove(0);
        }
        self.emit(StoreEvent::Undone(id));
        true
    }

    /// Redo the last undone primitive.
    /// Returns true if redo was performed, false if nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(primitive) = self.deleted.pop() else {
            return false;
        };
        let id = primitive.id();
        self.primitives.push(primitive);
        self.emit(StoreEvent::Redone(id));
        true
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        !self.primitives.is_empty()
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        !self.deleted.is_empty()
    }

    /// Remove every primitive, the redo stack and the live primitive.
    pub fn clear(&mut self) {
        self.primitives.clear();
        self.deleted.clear();
        self.live = None;
        self.emit(StoreEvent::Cleared);
    }

    /// Replace the committed collection with persisted primitives.
    ///
    /// Records that could never have been committed are skipped. History is
    /// reset and nothing is scheduled for saving.
    pub fn load(&mut self, primitives: Vec<Primitive>) {
        let total = primitives.len();
        self.primitives = primitives.into_iter().filter(Primitive::is_committable).collect();
        if self.primitives.len() != total {
            log::warn!(
                "Skipped {} persisted primitive(s) that were empty, unfinished or malformed",
                total - self.primitives.len()
            );
        }
        self.deleted.clear();
        self.live = None;
        self.emit(StoreEvent::Loaded(self.primitives.len()));
    }

    /// Committed primitives in drawing order.
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Undone primitives, most recently undone last.
    pub fn deleted(&self) -> &[Primitive] {
        &self.deleted
    }

    /// The primitive currently being drawn.
    pub fn live(&self) -> Option<&Primitive> {
        self.live.as_ref()
    }

    /// Committed primitives followed by the live one, in render order.
    pub fn render_order(&self) -> impl Iterator<Item = &Primitive> {
        self.primitives.iter().chain(self.live.iter())
    }

    /// Committed strokes.
    pub fn strokes(&self) -> impl Iterator<Item = &Stroke> {
        self.primitives.iter().filter_map(Primitive::as_stroke)
    }

    /// Committed shapes.
    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.primitives.iter().filter_map(Primitive::as_shape)
    }

    /// Check if nothing is committed.
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Number of committed primitives.
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    /// Get the bounding box of all committed primitives.
    pub fn bounds(&self) -> Option<Rect> {
        self.primitives
            .iter()
            .map(Primitive::bounds)
            .reduce(|acc, bounds| acc.union(bounds))
    }
}
