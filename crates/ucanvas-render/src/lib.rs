//! uCanvas Render Library
//!
//! Turns a canvas into ordered draw commands for the main view and the
//! mini-map, and defines the backend trait that consumes them.

mod recording;
mod renderer;

pub use recording::{Frame, RecordingRenderer};
pub use renderer::{DrawCommand, Layer, RenderContext, RenderResult, Renderer, RendererError};
