//! Naps: the idle intervals of a task between being switched out and being
//! woken up again, found in a loaded scheduler trace.
//!
//! While a trace loads, every `sched_switch` and `sched_waking` record goes
//! through the classifier and lands in a per-stream collector. On each redraw
//! the matcher pairs, for one task, every switch-out with the wake-up that
//! follows it inside the visible window, and the renderer turns each pair into
//! a colored rectangle labelled with the state the task slept in.
//!
//! # Modules
//!
//! - [`trace`] - Entries, raw records and constants shared by everything else
//! - [`stream`] - What the host knows about a loaded stream
//! - [`record`] - The append-only collector of selected events
//! - [`classify`] - Load-time selection of switch and waking events
//! - [`context`] - Per-stream plugin state and its registry
//! - [`histo`] - The visible window and plot row anchors
//! - [`matcher`] - Switch/waking pairing
//! - [`render`] - Nap rectangles and plot primitives
//! - [`config`] - Settings and the settings panel
//! - [`plugin`] - The interface the host drives
//! - [`loader`] - JSON trace fixtures
//!
//! # Example
//!
//! ```no_run
//! use naps::histo::{Graph, Histogram};
//! use naps::loader::TraceFile;
//! use naps::plugin::{DrawAction, DrawArgs, NapsPlugin, StreamPlugin};
//! use naps::render::ShapeList;
//! use std::path::Path;
//!
//! let plugin = NapsPlugin::new();
//! let trace = TraceFile::from_path(Path::new("trace.json"))
//!     .and_then(|file| file.ingest(&plugin))
//!     .expect("Failed to load trace");
//!
//! let (min, max) = trace.time_range().unwrap_or((0, 0));
//! let histo = Histogram::from_store(&trace.store, min, max, 500);
//! let graph = Graph::row(500, 1000, 40);
//! let args = DrawArgs {
//!     store: &trace.store,
//!     histo: &histo,
//!     graph: &graph,
//!     task_colors: &trace.task_colors,
//! };
//!
//! let mut surface = ShapeList::new();
//! plugin.draw(&args, trace.stream.stream_id, 1234, DrawAction::Task, &mut surface);
//! ```

pub mod classify;
pub mod config;
pub mod context;
pub mod error;
pub mod histo;
pub mod loader;
pub mod matcher;
pub mod plugin;
pub mod record;
pub mod render;
pub mod stream;
pub mod trace;

// Re-export for convenience
pub use config::{NapConfig, NapConfigPanel, SharedConfig};
pub use error::NapError;
pub use plugin::{DrawAction, DrawArgs, NapsPlugin, StreamPlugin};
pub use render::NapRectangle;
