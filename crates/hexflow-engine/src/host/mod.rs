//! Render-loop lifecycle.
//!
//! `RenderLoopHost` owns a drawing surface and drives a client `Scene`
//! through start, per-frame tick, context loss and context restore. The
//! platform pieces it needs (surface queries, frame scheduling) are traits so
//! the loop runs the same against a winit window or a test double.

mod render_loop;
mod scene;
mod scheduler;
mod surface;

pub use render_loop::{HostConfig, LoopPhase, RenderLoopHost};
pub use scene::Scene;
pub use scheduler::{FrameHandle, FrameScheduler, ManualScheduler};
pub use surface::Surface;
