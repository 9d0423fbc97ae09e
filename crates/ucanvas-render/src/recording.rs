//! Renderer that keeps every frame in memory.

use crate::renderer::{DrawCommand, RenderResult, Renderer, RendererError};
use peniko::Color;

/// A finished frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub background: Color,
    pub commands: Vec<DrawCommand>,
}

/// Collects frames instead of drawing them. Used for headless output and
/// tests.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    frames: Vec<Frame>,
    current: Option<Frame>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finished frames, oldest first.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// The most recent finished frame.
    pub fn last_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Drop recorded frames.
    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

impl Renderer for RecordingRenderer {
    fn begin_frame(&mut self, background: Color) -> RenderResult<()> {
        if self.current.is_some() {
            return Err(RendererError::FrameInProgress);
        }
        self.current = Some(Frame {
            background,
            commands: Vec::new(),
        });
        Ok(())
    }

    fn draw(&mut self, command: &DrawCommand) -> RenderResult<()> {
        let frame = self.current.as_mut().ok_or(RendererError::NoFrame)?;
        frame.commands.push(command.clone());
        Ok(())
    }

    fn end_frame(&mut self) -> RenderResult<()> {
        let frame = self.current.take().ok_or(RendererError::NoFrame)?;
        self.frames.push(frame);
        Ok(())
    }
}
