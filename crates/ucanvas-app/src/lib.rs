//! uCanvas Application
//!
//! Headless shell over a persisted canvas: inspect, export, replay recorded
//! input and clear.

mod app;

pub use app::{Action, App, AppError, AppResult, CanvasInfo, ReplayStep, ReplaySummary};
