use anyhow::Result;

use crate::time::FrameTime;

/// Client contract implemented by content drawn through the host.
///
/// `State` holds everything created against one context: programs, buffers,
/// bind groups. A fresh value is built by `setup` for every session and
/// dropped when the context is lost, so it never outlives the context it was
/// created from.
#[allow(async_fn_in_trait)]
pub trait Scene<C> {
    type State;

    /// Creates the session's resources. Runs to completion before the first
    /// frame of the session is scheduled.
    async fn setup(&mut self, ctx: &mut C) -> Result<Self::State>;

    /// Draws one frame. The next frame is scheduled only after this returns.
    async fn paint(&mut self, ctx: &mut C, state: &mut Self::State, time: FrameTime) -> Result<()> {
        let _ = (ctx, state, time);
        Ok(())
    }
}
