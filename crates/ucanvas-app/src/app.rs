//! Headless application shell around a persisted canvas.

use kurbo::{Point, Rect, Size};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use ucanvas_core::canvas::Canvas;
use ucanvas_core::config::{CanvasConfig, ConfigError};
use ucanvas_core::input::InputEvent;
use ucanvas_core::storage::{FileStorage, StorageError};
use ucanvas_render::{RecordingRenderer, RenderContext, Renderer, RendererError};

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Render error: {0}")]
    Render(#[from] RendererError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid event log: {0}")]
    Events(#[from] serde_json::Error),
}

pub type AppResult<T> = Result<T, AppError>;

/// Non-input steps that can appear in an event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Undo,
    Redo,
    Clear,
}

/// One line of a replayed session: an input event or an edit action.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ReplayStep {
    Input(InputEvent),
    Action { action: Action },
}

/// Summary of the stored canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasInfo {
    pub key: String,
    pub strokes: usize,
    pub shapes: usize,
    pub points: usize,
    pub bounds: Option<Rect>,
}

impl fmt::Display for CanvasInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "canvas:  {}", self.key)?;
        writeln!(f, "strokes: {} ({} points)", self.strokes, self.points)?;
        writeln!(f, "shapes:  {}", self.shapes)?;
        match self.bounds {
            Some(b) => write!(f, "bounds:  ({:.1}, {:.1}) - ({:.1}, {:.1})", b.x0, b.y0, b.x1, b.y1),
            None => write!(f, "bounds:  empty"),
        }
    }
}

/// Outcome of a replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub steps: usize,
    pub primitives: usize,
    /// Draw commands in the frame rendered after the last step.
    pub draw_commands: usize,
}

/// The application: a configuration plus file storage.
pub struct App {
    storage: Arc<FileStorage>,
    config: CanvasConfig,
}

impl App {
    /// Create the app storing canvases under `data_dir`, or the platform
    /// data directory when `None`.
    pub fn new(data_dir: Option<PathBuf>, config: CanvasConfig) -> AppResult<Self> {
        let storage = match data_dir {
            Some(dir) => FileStorage::new(dir)?,
            None => FileStorage::default_location()?,
        };
        log::info!("Using storage at {}", storage.base_path().display());
        Ok(Self {
            storage: Arc::new(storage),
            config,
        })
    }

    /// Read the configuration file if one is given.
    pub fn load_config(path: Option<&Path>) -> AppResult<CanvasConfig> {
        match path {
            Some(path) => {
                let config = CanvasConfig::from_json_file(path)?;
                log::info!("Loaded config from {}", path.display());
                Ok(config)
            }
            None => Ok(CanvasConfig::default()),
        }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    fn open_canvas(&self) -> AppResult<Canvas> {
        Ok(Canvas::open(self.storage.clone(), self.config.clone())?)
    }

    fn finish(canvas: &Canvas) {
        if !canvas.flush() {
            log::warn!("Pending changes may not have been saved");
        }
    }

    /// Summarize the stored canvas.
    pub fn info(&self) -> AppResult<CanvasInfo> {
        let canvas = self.open_canvas()?;
        let store = canvas.store();
        Ok(CanvasInfo {
            key: self.config.document_key.clone(),
            strokes: store.strokes().count(),
            shapes: store.shapes().count(),
            points: store.strokes().map(|s| s.len()).sum(),
            bounds: store.bounds(),
        })
    }

    /// Flat point lists as JSON.
    pub fn export(&self) -> AppResult<String> {
        let canvas = self.open_canvas()?;
        let points: Vec<Vec<Point>> = canvas.export_points();
        Ok(serde_json::to_string_pretty(&points)?)
    }

    /// Parse a JSON array of replay steps.
    pub fn parse_steps(json: &str) -> AppResult<Vec<ReplayStep>> {
        Ok(serde_json::from_str(json)?)
    }

    /// Feed recorded steps into the stored canvas and persist the result.
    pub fn replay(&self, steps: &[ReplayStep], viewport_size: Size) -> AppResult<ReplaySummary> {
        let mut canvas = self.open_canvas()?;
        canvas.set_viewport_size(viewport_size);

        for step in steps {
            match *step {
                ReplayStep::Input(event) => {
                    canvas.handle(event);
                }
                ReplayStep::Action { action: Action::Undo } => {
                    canvas.undo();
                }
                ReplayStep::Action { action: Action::Redo } => {
                    canvas.redo();
                }
                ReplayStep::Action { action: Action::Clear } => canvas.clear(),
            }
        }

        let mut renderer = RecordingRenderer::new();
        renderer.render(&RenderContext::new(&canvas))?;
        let draw_commands = renderer.last_frame().map_or(0, |frame| frame.commands.len());

        Self::finish(&canvas);
        Ok(ReplaySummary {
            steps: steps.len(),
            primitives: canvas.primitives().len(),
            draw_commands,
        })
    }

    /// Remove everything from the stored canvas.
    pub fn clear(&self) -> AppResult<()> {
        let mut canvas = self.open_canvas()?;
        canvas.clear();
        Self::finish(&canvas);
        Ok(())
    }
}
