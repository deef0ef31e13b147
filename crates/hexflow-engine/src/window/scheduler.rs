use std::sync::Arc;

use winit::window::Window;

use crate::host::{FrameHandle, FrameScheduler, ManualScheduler};

/// Frame scheduling over `Window::request_redraw`.
///
/// winit cannot withdraw a redraw request, so cancellation only forgets the
/// handle; the host ignores the resulting `RedrawRequested` because no frame
/// is pending.
pub struct RedrawScheduler {
    window: Arc<Window>,
    requests: ManualScheduler,
}

impl RedrawScheduler {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            requests: ManualScheduler::new(),
        }
    }

    /// Takes the request a `RedrawRequested` event answers, if any.
    pub fn take_due(&mut self) -> Option<FrameHandle> {
        self.requests.take_next()
    }
}

impl FrameScheduler for RedrawScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        let handle = self.requests.request_frame();
        self.window.request_redraw();
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.requests.cancel_frame(handle);
    }
}
