//! Rainbow pipes over a seven-hexagon honeycomb.

pub mod mesh;
pub mod scene;

pub use mesh::{PipeMesh, PipeVertex};
pub use scene::{PipeScene, PipeSceneConfig, PipeState};
