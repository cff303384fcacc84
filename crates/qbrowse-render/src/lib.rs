//! qbrowse-render
//!
//! Streams ranked results to a [`qbrowse_core::traits::RenderSurface`] in
//! chunks, yielding to the tokio event loop between chunks so input handling
//! is never starved by a large result set. Every new job supersedes the
//! previous one through a shared generation counter.
//!
//! Jobs run as `spawn_local` tasks, so [`RenderScheduler::start`] must be
//! called from inside a [`tokio::task::LocalSet`].

pub mod recording;
pub mod scheduler;

pub use recording::{RecordingSurface, SurfaceOp};
pub use scheduler::{JobState, RenderEvent, RenderJobHandle, RenderProgress, RenderScheduler};
