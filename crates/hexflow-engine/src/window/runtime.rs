use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::device::{Gpu, GpuInit};
use crate::host::{HostConfig, LoopPhase, RenderLoopHost, Scene, Surface as _};

use super::{RedrawScheduler, WindowSurface};

/// Window configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "hexflow".to_string(),
            initial_size: LogicalSize::new(720.0, 720.0),
        }
    }
}

type WindowHost<Sc> = RenderLoopHost<WindowSurface, RedrawScheduler, Sc>;

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one window and renders `scene` into it until the window closes.
    ///
    /// Setup/paint futures are driven to completion on the event-loop thread,
    /// so frames never overlap. Returns the first error that stopped the loop.
    pub fn run<Sc>(
        config: RuntimeConfig,
        gpu_init: GpuInit,
        host_config: HostConfig,
        scene: Sc,
    ) -> Result<()>
    where
        Sc: Scene<Gpu> + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, host_config, scene);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Where the scene lives: waiting for a window, inside a host, or finished.
enum Slot<Sc>
where
    Sc: Scene<Gpu>,
{
    Idle(Sc),
    Hosting(WindowHost<Sc>),
    Done,
}

struct AppState<Sc>
where
    Sc: Scene<Gpu> + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    host_config: HostConfig,

    slot: Slot<Sc>,
    /// Between `suspended` and the next `resumed`; no context may be built.
    suspended: bool,
    failure: Option<anyhow::Error>,
}

impl<Sc> AppState<Sc>
where
    Sc: Scene<Gpu> + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, host_config: HostConfig, scene: Sc) -> Self {
        Self {
            config,
            gpu_init,
            host_config,
            slot: Slot::Idle(scene),
            suspended: false,
            failure: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        if self.failure.is_none() {
            self.failure = Some(err);
        }
        self.slot = Slot::Done;
        event_loop.exit();
    }

    fn create_host(&self, event_loop: &ActiveEventLoop, scene: Sc) -> Result<WindowHost<Sc>> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let surface = pollster::block_on(WindowSurface::new(Arc::clone(&window), self.gpu_init.clone()))
            .context("GPU initialization failed for window")?;
        let scheduler = RedrawScheduler::new(window);

        pollster::block_on(RenderLoopHost::create(surface, scheduler, self.host_config, scene))
    }

    /// Runs loss → restore on `host`: fresh context, then a fresh session.
    fn recover(host: &mut WindowHost<Sc>) -> Result<()> {
        host.context_lost();
        pollster::block_on(host.surface_mut().restore_context())
            .context("failed to rebuild GPU context")?;
        pollster::block_on(host.context_restored())
    }
}

impl<Sc> ApplicationHandler for AppState<Sc>
where
    Sc: Scene<Gpu> + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);
        self.suspended = false;

        match std::mem::replace(&mut self.slot, Slot::Done) {
            Slot::Idle(scene) => match self.create_host(event_loop, scene) {
                Ok(host) => self.slot = Slot::Hosting(host),
                Err(e) => self.fail(event_loop, e.context("failed to start render loop")),
            },

            // Resumed after a suspend: the surface was released, rebuild it.
            Slot::Hosting(mut host) if host.phase() == LoopPhase::Stopped => {
                match Self::recover(&mut host) {
                    Ok(()) => self.slot = Slot::Hosting(host),
                    Err(e) => self.fail(event_loop, e),
                }
            }

            other => self.slot = other,
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        self.suspended = true;
        if let Slot::Hosting(host) = &mut self.slot {
            host.context_lost();
            host.surface_mut().release_context();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.suspended {
            return;
        }
        let Slot::Hosting(host) = &mut self.slot else {
            return;
        };

        // Either still running on a dead device, or stopped by a frame that
        // found the context lost.
        if host.surface().is_context_lost() {
            if let Err(e) = Self::recover(host) {
                self.fail(event_loop, e);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                if let Slot::Hosting(host) = std::mem::replace(&mut self.slot, Slot::Done) {
                    drop(host.shutdown());
                }
                event_loop.exit();
            }

            WindowEvent::RedrawRequested => {
                let Slot::Hosting(host) = &mut self.slot else {
                    return;
                };
                let Some(handle) = host.scheduler_mut().take_due() else {
                    return;
                };
                if let Err(e) = pollster::block_on(host.tick(handle, Instant::now())) {
                    self.fail(event_loop, e);
                }
            }

            // The host compares sizes on every frame; nothing to do here.
            WindowEvent::Resized(size) => log::trace!("window resized to {}x{}", size.width, size.height),

            _ => {}
        }
    }
}
