use std::sync::Arc;

use anyhow::Result;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::window::Window;

use crate::coords::ViewportRect;
use crate::device::{Gpu, GpuInit};
use crate::host::Surface;

/// A winit window plus the GPU context rendering into it.
///
/// The context is rebuilt from scratch by `restore_context`; while absent the
/// surface reports itself lost.
pub struct WindowSurface {
    window: Arc<Window>,
    init: GpuInit,
    gpu: Option<Gpu>,
}

impl WindowSurface {
    pub async fn new(window: Arc<Window>, init: GpuInit) -> Result<Self> {
        let gpu = Gpu::new(Arc::clone(&window), init.clone()).await?;
        Ok(Self {
            window,
            init,
            gpu: Some(gpu),
        })
    }

    /// Drops the current context. The old wgpu surface is released before a
    /// new one is created for the same window.
    pub fn release_context(&mut self) {
        self.gpu = None;
    }

    /// Builds a fresh context for the window.
    pub async fn restore_context(&mut self) -> Result<()> {
        self.release_context();
        self.gpu = Some(Gpu::new(Arc::clone(&self.window), self.init.clone()).await?);
        Ok(())
    }
}

impl Surface for WindowSurface {
    type Context = Gpu;

    fn client_size(&self) -> LogicalSize<f64> {
        self.window.inner_size().to_logical(self.window.scale_factor())
    }

    fn scale_factor(&self) -> f64 {
        self.window.scale_factor()
    }

    fn resize_backing(&mut self, size: PhysicalSize<u32>) {
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.resize(size);
        }
    }

    fn set_viewport(&mut self, viewport: ViewportRect) {
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.set_viewport(viewport);
        }
    }

    fn context(&mut self) -> Option<&mut Gpu> {
        self.gpu.as_mut()
    }

    fn is_context_lost(&self) -> bool {
        self.gpu.as_ref().is_none_or(Gpu::is_lost)
    }
}
