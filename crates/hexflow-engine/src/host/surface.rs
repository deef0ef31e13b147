use winit::dpi::{LogicalSize, PhysicalSize};

use crate::coords::ViewportRect;

/// Drawing surface driven by the host.
pub trait Surface {
    /// Rendering context handed to scene callbacks.
    type Context;

    /// Current on-screen size in logical pixels.
    fn client_size(&self) -> LogicalSize<f64>;

    /// Physical pixels per logical pixel.
    fn scale_factor(&self) -> f64;

    /// Resizes the backing store the context renders into.
    fn resize_backing(&mut self, size: PhysicalSize<u32>);

    /// Restricts subsequent drawing to `viewport` (physical pixels).
    fn set_viewport(&mut self, viewport: ViewportRect);

    /// The live context, or `None` while none is available.
    fn context(&mut self) -> Option<&mut Self::Context>;

    fn is_context_lost(&self) -> bool;
}
