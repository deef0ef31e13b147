//! Window + runtime loop.
//!
//! Owns the winit `EventLoop` and window, and wires them to the render-loop
//! host: redraw requests become frame ticks, suspend/resume and device loss
//! become context loss/restore.

mod runtime;
mod scheduler;
mod surface;

pub use runtime::{Runtime, RuntimeConfig};
pub use scheduler::RedrawScheduler;
pub use surface::WindowSurface;
