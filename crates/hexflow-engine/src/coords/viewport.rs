/// Viewport rectangle in physical pixels, origin top-left of the backing surface.
///
/// This is what gets applied to each render pass via `set_viewport`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ViewportRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ViewportRect {
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Viewport covering the whole `width` x `height` surface.
    #[inline]
    pub const fn full(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Clamps the rectangle so it never extends past a `width` x `height` target.
    pub fn clamped_to(self, width: f32, height: f32) -> Self {
        let x = self.x.clamp(0.0, width);
        let y = self.y.clamp(0.0, height);
        Self::new(
            x,
            y,
            self.width.min(width - x).max(0.0),
            self.height.min(height - y).max(0.0),
        )
    }
}

/// Largest viewport with `width / height == aspect` that fits the surface,
/// centered on the axis that has slack (letterbox or pillarbox).
///
/// A non-positive or non-finite `aspect` falls back to the full surface.
pub fn letterbox(width: f32, height: f32, aspect: f32) -> ViewportRect {
    if !(aspect > 0.0 && aspect.is_finite()) {
        return ViewportRect::full(width, height);
    }

    let vw = width.min(height * aspect);
    let vh = (width / aspect).min(height);

    ViewportRect::new((width - vw) / 2.0, (height - vh) / 2.0, vw, vh)
}
