//! hexflow engine crate.
//!
//! Owns the platform + GPU runtime pieces: the render-loop host and its
//! scheduling/surface seams, the wgpu context, and the winit runtime that
//! ties them to a window.

pub mod coords;
pub mod device;
pub mod host;
pub mod logging;
pub mod time;
pub mod window;
