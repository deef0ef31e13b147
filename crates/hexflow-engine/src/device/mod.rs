//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Adapter/Device/Queue and configuring the Surface
//! - compiling shaders and linking programs, with loss-aware error reporting
//! - acquiring frames and drawing one viewport-restricted pass per frame

mod context;
mod error;
mod frame;
mod init;
mod shader;
mod surface;

pub use context::Gpu;
pub use error::{BuildError, SurfaceErrorAction};
pub use frame::GpuFrame;
pub use init::GpuInit;
pub use shader::{Program, ProgramLayout, Shader, ShaderKind};
