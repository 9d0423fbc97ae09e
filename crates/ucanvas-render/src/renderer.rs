//! Renderer trait abstraction.

use kurbo::{Affine, BezPath, Shape as _};
use peniko::Color;
use thiserror::Error;
use ucanvas_core::canvas::Canvas;
use ucanvas_core::minimap::{MINIMAP_LINE_WIDTH, VIEWPORT_LINE_WIDTH};

/// Flattening tolerance for the viewport marker.
const MARKER_TOLERANCE: f64 = 0.1;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("No frame in progress")]
    NoFrame,
    #[error("Frame already in progress")]
    FrameInProgress,
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Which surface a command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// The main canvas view.
    Canvas,
    /// The mini-map overview, in mini-map coordinates.
    MiniMap,
}

/// One stroked path.
#[derive(Debug, Clone)]
pub struct DrawCommand {
    pub layer: Layer,
    /// Geometry in the layer's own coordinate space.
    pub path: BezPath,
    pub color: Color,
    /// Stroke width in the path's coordinate space.
    pub width: f64,
    /// Transform from path space to the layer's screen space.
    pub transform: Affine,
}

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The canvas to render.
    pub canvas: &'a Canvas,
    /// Background color.
    pub background_color: Color,
    /// Whether to emit mini-map commands.
    pub show_minimap: bool,
    /// Color of the visible-area marker on the mini-map.
    pub viewport_color: Color,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(canvas: &'a Canvas) -> Self {
        Self {
            canvas,
            background_color: Color::from_rgba8(255, 255, 255, 255),
            show_minimap: true,
            viewport_color: Color::from_rgba8(0, 0, 255, 255),
        }
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    /// Set the color of the mini-map viewport marker.
    pub fn with_viewport_color(mut self, color: Color) -> Self {
        self.viewport_color = color;
        self
    }

    /// Toggle the mini-map overlay.
    pub fn with_minimap(mut self, show: bool) -> Self {
        self.show_minimap = show;
        self
    }

    /// Draw commands for this frame, in paint order.
    ///
    /// Committed primitives come first, then the live one. Canvas widths are
    /// divided by the zoom scale so strokes keep their on-screen width.
    pub fn commands(&self) -> Vec<DrawCommand> {
        let viewport = &self.canvas.viewport;
        let store = self.canvas.store();
        let transform = viewport.transform();

        let mut commands: Vec<DrawCommand> = store
            .render_order()
            .map(|primitive| DrawCommand {
                layer: Layer::Canvas,
                path: primitive.to_path(),
                color: primitive.color().into(),
                width: viewport.effective_line_width(primitive.line_width()),
                transform,
            })
            .collect();

        if self.show_minimap {
            let minimap = &self.canvas.minimap;
            commands.extend(store.primitives().iter().map(|primitive| DrawCommand {
                layer: Layer::MiniMap,
                path: minimap.outline(primitive),
                color: primitive.color().into(),
                width: MINIMAP_LINE_WIDTH,
                transform: Affine::IDENTITY,
            }));
            commands.push(DrawCommand {
                layer: Layer::MiniMap,
                path: minimap.project_viewport(viewport).to_path(MARKER_TOLERANCE),
                color: self.viewport_color,
                width: VIEWPORT_LINE_WIDTH,
                transform: Affine::IDENTITY,
            });
        }

        commands
    }
}

/// Trait for rendering backends.
pub trait Renderer {
    /// Start a frame cleared to `background`.
    fn begin_frame(&mut self, background: Color) -> RenderResult<()>;

    /// Stroke one path.
    fn draw(&mut self, command: &DrawCommand) -> RenderResult<()>;

    /// Finish the frame.
    fn end_frame(&mut self) -> RenderResult<()>;

    /// Render a whole frame from `ctx`.
    fn render(&mut self, ctx: &RenderContext) -> RenderResult<()> {
        let commands = ctx.commands();
        log::trace!("Rendering {} draw command(s)", commands.len());

        self.begin_frame(ctx.background_color)?;
        for command in &commands {
            self.draw(command)?;
        }
        self.end_frame()
    }
}
