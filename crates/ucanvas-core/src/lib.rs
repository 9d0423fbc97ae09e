//! uCanvas Core Library
//!
//! Drawing and transform engine for the uCanvas touch canvas: curve
//! smoothing, shape outlines, the pan/zoom viewport, the undoable primitive
//! store, persistence and the mini-map projection.

pub mod canvas;
pub mod config;
pub mod curve;
pub mod input;
pub mod minimap;
pub mod shapes;
pub mod storage;
pub mod store;
pub mod tools;
pub mod viewport;

pub use canvas::Canvas;
pub use config::{CanvasConfig, ConfigError};
pub use curve::{build_curve, build_polyline, midpoint};
pub use input::{InputEvent, PointerKind};
pub use minimap::{MINIMAP_LINE_WIDTH, MiniMap, VIEWPORT_LINE_WIDTH};
pub use shapes::{Primitive, PrimitiveId, PrimitiveTrait, RgbaColor, Shape, ShapeKind, Stroke, build_outline};
pub use storage::{AutoSaver, FileStorage, MemoryStorage, Storage, StorageError, StorageResult};
pub use store::{Store, StoreEvent, SubscriptionId};
pub use tools::{CanvasMode, ToolSettings};
pub use viewport::Viewport;
