//! Viewport geometry shared by the host and the GPU layer.
//!
//! Sizes and offsets here are physical pixels of the backing surface, origin
//! top-left. Logical sizes come from `winit::dpi` and are converted by the host.

mod viewport;

pub use viewport::{letterbox, ViewportRect};
