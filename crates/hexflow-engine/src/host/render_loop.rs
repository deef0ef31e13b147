use std::time::Instant;

use anyhow::{Context as _, Result};
use winit::dpi::{LogicalSize, PhysicalSize};

use crate::coords::letterbox;
use crate::time::AnimationClock;

use super::{FrameHandle, FrameScheduler, Scene, Surface};

/// Host configuration.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct HostConfig {
    /// Target ratio, read as width / height: the viewport satisfies
    /// `vw / vh == aspect`. When set, every resize recomputes a centered
    /// viewport of that ratio; otherwise drawing covers the surface.
    ///
    /// A height / width reading gives a different rectangle for any ratio
    /// other than 1.0.
    pub aspect: Option<f32>,
}

impl HostConfig {
    pub fn with_aspect(aspect: f32) -> Self {
        Self { aspect: Some(aspect) }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopPhase {
    Stopped,
    Running,
}

fn zero_size() -> LogicalSize<f64> {
    LogicalSize::new(0.0, 0.0)
}

/// Owns a surface and drives a `Scene` through its session lifecycle.
///
/// A session spans one context: `start` builds fresh scene state, each
/// `tick` paints one frame and requests the next, and `context_lost` ends the
/// session. At most one frame request is outstanding at any time.
pub struct RenderLoopHost<S, F, Sc>
where
    S: Surface,
    F: FrameScheduler,
    Sc: Scene<S::Context>,
{
    surface: S,
    scheduler: F,
    config: HostConfig,
    scene: Sc,

    session: Option<Sc::State>,
    phase: LoopPhase,
    pending: Option<FrameHandle>,

    /// Logical size seen at the last recompute; zero forces the next one.
    last_client_size: LogicalSize<f64>,

    clock: AnimationClock,
    sessions_started: u64,
}

impl<S, F, Sc> RenderLoopHost<S, F, Sc>
where
    S: Surface,
    F: FrameScheduler,
    Sc: Scene<S::Context>,
{
    /// Creates the host and starts the first session.
    ///
    /// The animation epoch is the moment of creation.
    pub async fn create(surface: S, scheduler: F, config: HostConfig, scene: Sc) -> Result<Self> {
        Self::create_at(surface, scheduler, config, scene, Instant::now()).await
    }

    /// Like [`create`](Self::create) with an explicit animation epoch.
    pub async fn create_at(
        surface: S,
        scheduler: F,
        config: HostConfig,
        scene: Sc,
        epoch: Instant,
    ) -> Result<Self> {
        let mut host = Self {
            surface,
            scheduler,
            config,
            scene,
            session: None,
            phase: LoopPhase::Stopped,
            pending: None,
            last_client_size: zero_size(),
            clock: AnimationClock::starting_at(epoch),
            sessions_started: 0,
        };

        host.start().await?;
        Ok(host)
    }

    /// Starts a new session: discards any previous state, runs `setup` to
    /// completion, then requests the first frame.
    ///
    /// On failure the host stays stopped with nothing scheduled.
    pub async fn start(&mut self) -> Result<()> {
        self.cancel_pending();
        self.session = None;
        self.phase = LoopPhase::Stopped;
        self.last_client_size = zero_size();
        self.clock.reset_delta();

        self.sessions_started += 1;
        log::info!("starting render session #{}", self.sessions_started);

        let ctx = self
            .surface
            .context()
            .context("rendering context unavailable")?;

        let state = self
            .scene
            .setup(ctx)
            .await
            .context("scene setup failed")?;

        self.session = Some(state);
        self.phase = LoopPhase::Running;
        self.schedule_frame();

        log::debug!("render session #{} running", self.sessions_started);
        Ok(())
    }

    /// Runs the frame identified by `handle`.
    ///
    /// Handles other than the pending one (cancelled, or delivered after a
    /// loss) are ignored. A frame arriving while the surface reports its
    /// context lost ends the session instead of painting. A paint failure
    /// stops the loop and is returned.
    pub async fn tick(&mut self, handle: FrameHandle, now: Instant) -> Result<()> {
        if self.phase != LoopPhase::Running || self.pending != Some(handle) {
            log::trace!("ignoring stale frame {}", handle.get());
            return Ok(());
        }
        self.pending = None;

        if self.surface.is_context_lost() {
            log::debug!("frame {} arrived after context loss; not painting", handle.get());
            self.context_lost();
            return Ok(());
        }

        self.sync_size();

        let time = self.clock.tick_at(now);

        if let (Some(ctx), Some(state)) = (self.surface.context(), self.session.as_mut()) {
            if let Err(e) = self.scene.paint(ctx, state, time).await {
                self.phase = LoopPhase::Stopped;
                return Err(e.context(format!("paint failed on frame {}", time.frame_index)));
            }
        } else {
            log::debug!("no context for frame {}; skipping paint", time.frame_index);
        }

        self.schedule_frame();
        Ok(())
    }

    /// Ends the session after the context was lost.
    ///
    /// Cancels the pending frame synchronously and drops the session state.
    /// No scene callback runs. Calling it again while stopped is harmless.
    pub fn context_lost(&mut self) {
        let was_running = self.phase == LoopPhase::Running;

        self.cancel_pending();
        self.session = None;
        self.phase = LoopPhase::Stopped;
        self.last_client_size = zero_size();

        if was_running {
            log::warn!("rendering context lost; render loop stopped");
        }
    }

    /// Starts a fresh session on the restored context.
    pub async fn context_restored(&mut self) -> Result<()> {
        log::info!("rendering context restored");
        self.start().await
    }

    /// Stops the loop for good and hands the surface back.
    pub fn shutdown(mut self) -> S {
        self.cancel_pending();
        self.session = None;
        self.phase = LoopPhase::Stopped;
        log::info!("render loop shut down after {} session(s)", self.sessions_started);

        self.surface
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn session(&self) -> Option<&Sc::State> {
        self.session.as_ref()
    }

    pub fn sessions_started(&self) -> u64 {
        self.sessions_started
    }

    pub fn epoch(&self) -> Instant {
        self.clock.epoch()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut F {
        &mut self.scheduler
    }

    pub fn scene(&self) -> &Sc {
        &self.scene
    }

    // ── private helpers ────────────────────────────────────────────────────

    fn schedule_frame(&mut self) {
        debug_assert!(self.pending.is_none(), "a frame is already pending");
        self.pending = Some(self.scheduler.request_frame());
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
    }

    /// Resizes the backing store and recomputes the viewport if the logical
    /// size moved since the last call.
    fn sync_size(&mut self) {
        let client = self.surface.client_size();
        if client == self.last_client_size {
            return;
        }

        let backing: PhysicalSize<u32> = client.to_physical(self.surface.scale_factor());
        self.surface.resize_backing(backing);

        if let Some(aspect) = self.config.aspect {
            let viewport = letterbox(backing.width as f32, backing.height as f32, aspect);
            self.surface.set_viewport(viewport);
        }

        log::debug!(
            "surface resized to {}x{} logical, {}x{} backing",
            client.width,
            client.height,
            backing.width,
            backing.height
        );

        self.last_client_size = client;
    }
}

#[cfg(test)]
mod tests {
    use std::rc::{Rc, Weak};
    use std::time::Duration;

    use anyhow::bail;
    use pollster::block_on;

    use super::*;
    use crate::coords::ViewportRect;
    use crate::host::ManualScheduler;
    use crate::time::FrameTime;

    // ── test doubles ──────────────────────────────────────────────────────

    #[derive(Debug, Default)]
    struct FakeContext {
        draws: u32,
    }

    struct FakeSurface {
        client: LogicalSize<f64>,
        scale: f64,
        resizes: Vec<PhysicalSize<u32>>,
        viewports: Vec<ViewportRect>,
        ctx: Option<FakeContext>,
        /// Context still present but reported lost, as after a device-lost
        /// callback that the runtime has not acted on yet.
        flagged_lost: bool,
    }

    impl FakeSurface {
        fn new(width: f64, height: f64, scale: f64) -> Self {
            Self {
                client: LogicalSize::new(width, height),
                scale,
                resizes: Vec::new(),
                viewports: Vec::new(),
                ctx: Some(FakeContext::default()),
                flagged_lost: false,
            }
        }
    }

    impl Surface for FakeSurface {
        type Context = FakeContext;

        fn client_size(&self) -> LogicalSize<f64> {
            self.client
        }

        fn scale_factor(&self) -> f64 {
            self.scale
        }

        fn resize_backing(&mut self, size: PhysicalSize<u32>) {
            self.resizes.push(size);
        }

        fn set_viewport(&mut self, viewport: ViewportRect) {
            self.viewports.push(viewport);
        }

        fn context(&mut self) -> Option<&mut FakeContext> {
            self.ctx.as_mut()
        }

        fn is_context_lost(&self) -> bool {
            self.ctx.is_none() || self.flagged_lost
        }
    }

    struct SessionState {
        id: u64,
        token: Rc<()>,
    }

    #[derive(Default)]
    struct RecordingScene {
        setups: u64,
        paints: Vec<FrameTime>,
        fail_setup: bool,
        fail_paint: bool,
        last_token: Option<Weak<()>>,
    }

    impl Scene<FakeContext> for RecordingScene {
        type State = SessionState;

        async fn setup(&mut self, _ctx: &mut FakeContext) -> Result<SessionState> {
            if self.fail_setup {
                bail!("fragment shader failed to compile");
            }
            self.setups += 1;
            let token = Rc::new(());
            self.last_token = Some(Rc::downgrade(&token));
            Ok(SessionState { id: self.setups, token })
        }

        async fn paint(
            &mut self,
            ctx: &mut FakeContext,
            state: &mut SessionState,
            time: FrameTime,
        ) -> Result<()> {
            if self.fail_paint {
                bail!("device went away");
            }
            assert!(Rc::strong_count(&state.token) >= 1);
            ctx.draws += 1;
            self.paints.push(time);
            Ok(())
        }
    }

    type TestHost = RenderLoopHost<FakeSurface, ManualScheduler, RecordingScene>;

    fn host_with(surface: FakeSurface, config: HostConfig, scene: RecordingScene) -> TestHost {
        block_on(TestHost::create_at(
            surface,
            ManualScheduler::new(),
            config,
            scene,
            Instant::now(),
        ))
        .unwrap()
    }

    fn square_host(width: f64, height: f64, scale: f64) -> TestHost {
        host_with(
            FakeSurface::new(width, height, scale),
            HostConfig::with_aspect(1.0),
            RecordingScene::default(),
        )
    }

    /// Delivers the next scheduled frame `ms` after the epoch.
    fn run_frame(host: &mut TestHost, ms: u64) {
        let handle = host.scheduler_mut().take_next().expect("no frame scheduled");
        let now = host.epoch() + Duration::from_millis(ms);
        block_on(host.tick(handle, now)).unwrap();
    }

    // ── start ─────────────────────────────────────────────────────────────

    #[test]
    fn create_runs_setup_then_schedules_one_frame() {
        let host = square_host(200.0, 100.0, 1.0);
        assert_eq!(host.phase(), LoopPhase::Running);
        assert_eq!(host.scene().setups, 1);
        assert!(host.scene().paints.is_empty());
        assert!(host.pending_frame().is_some());
        assert_eq!(host.scheduler().pending_count(), 1);
        assert_eq!(host.session().map(|s| s.id), Some(1));
    }

    #[test]
    fn setup_failure_propagates_and_schedules_nothing() {
        let scene = RecordingScene { fail_setup: true, ..Default::default() };
        let result = block_on(TestHost::create_at(
            FakeSurface::new(10.0, 10.0, 1.0),
            ManualScheduler::new(),
            HostConfig::default(),
            scene,
            Instant::now(),
        ));
        let err = result.err().expect("setup failure must propagate");
        assert!(format!("{err:#}").contains("failed to compile"));
    }

    #[test]
    fn missing_context_fails_start() {
        let mut surface = FakeSurface::new(10.0, 10.0, 1.0);
        surface.ctx = None;
        let result = block_on(TestHost::create_at(
            surface,
            ManualScheduler::new(),
            HostConfig::default(),
            RecordingScene::default(),
            Instant::now(),
        ));
        assert!(result.is_err());
    }

    // ── resize ────────────────────────────────────────────────────────────

    #[test]
    fn first_frame_resizes_backing_and_letterboxes() {
        let mut host = square_host(200.0, 100.0, 1.0);
        run_frame(&mut host, 16);

        assert_eq!(host.surface().resizes, vec![PhysicalSize::new(200, 100)]);
        assert_eq!(
            host.surface().viewports,
            vec![ViewportRect::new(50.0, 0.0, 100.0, 100.0)]
        );
    }

    #[test]
    fn backing_size_scales_with_device_pixel_ratio() {
        let mut host = square_host(200.0, 100.0, 2.0);
        run_frame(&mut host, 16);

        assert_eq!(host.surface().resizes, vec![PhysicalSize::new(400, 200)]);
        assert_eq!(
            host.surface().viewports,
            vec![ViewportRect::new(100.0, 0.0, 200.0, 200.0)]
        );
    }

    #[test]
    fn viewport_recomputed_only_when_size_changes() {
        let mut host = square_host(200.0, 100.0, 1.0);
        run_frame(&mut host, 16);
        run_frame(&mut host, 32);
        run_frame(&mut host, 48);
        assert_eq!(host.surface().resizes.len(), 1);

        host.surface_mut().client = LogicalSize::new(100.0, 300.0);
        run_frame(&mut host, 64);
        run_frame(&mut host, 80);
        assert_eq!(host.surface().resizes.len(), 2);
        assert_eq!(
            host.surface().viewports.last(),
            Some(&ViewportRect::new(0.0, 100.0, 100.0, 100.0))
        );

        // Back to a previously seen size still counts as a change.
        host.surface_mut().client = LogicalSize::new(200.0, 100.0);
        run_frame(&mut host, 96);
        assert_eq!(host.surface().resizes.len(), 3);
        assert_eq!(host.scene().paints.len(), 6);
    }

    #[test]
    fn aspect_is_width_over_height() {
        let mut host = host_with(
            FakeSurface::new(400.0, 400.0, 1.0),
            HostConfig::with_aspect(2.0),
            RecordingScene::default(),
        );
        run_frame(&mut host, 16);

        // Twice as wide as tall, centered vertically.
        assert_eq!(
            host.surface().viewports,
            vec![ViewportRect::new(0.0, 100.0, 400.0, 200.0)]
        );
    }

    #[test]
    fn without_aspect_only_backing_is_resized() {
        let mut host = host_with(
            FakeSurface::new(300.0, 150.0, 1.5),
            HostConfig::default(),
            RecordingScene::default(),
        );
        run_frame(&mut host, 16);

        assert_eq!(host.surface().resizes, vec![PhysicalSize::new(450, 225)]);
        assert!(host.surface().viewports.is_empty());
    }

    // ── frames ────────────────────────────────────────────────────────────

    #[test]
    fn paint_receives_seconds_since_epoch() {
        let mut host = square_host(64.0, 64.0, 1.0);
        run_frame(&mut host, 500);
        run_frame(&mut host, 2250);

        let elapsed: Vec<f32> = host.scene().paints.iter().map(|t| t.elapsed).collect();
        assert!((elapsed[0] - 0.5).abs() < 1e-6);
        assert!((elapsed[1] - 2.25).abs() < 1e-6);
        assert_eq!(host.surface().ctx.as_ref().map(|c| c.draws), Some(2));
    }

    #[test]
    fn exactly_one_frame_pending_while_running() {
        let mut host = square_host(64.0, 64.0, 1.0);
        for i in 1..=5 {
            run_frame(&mut host, i * 16);
            assert_eq!(host.scheduler().pending_count(), 1);
            assert!(host.pending_frame().is_some());
        }
        assert_eq!(host.scheduler().requested_total(), 6);
    }

    #[test]
    fn stale_handle_is_ignored() {
        let mut host = square_host(64.0, 64.0, 1.0);
        let first = host.pending_frame().unwrap();
        run_frame(&mut host, 16);

        // `first` was already consumed; delivering it again does nothing.
        let now = host.epoch() + Duration::from_millis(32);
        block_on(host.tick(first, now)).unwrap();
        assert_eq!(host.scene().paints.len(), 1);
        assert_eq!(host.scheduler().pending_count(), 1);
    }

    #[test]
    fn paint_failure_stops_the_loop() {
        let mut host = host_with(
            FakeSurface::new(64.0, 64.0, 1.0),
            HostConfig::default(),
            RecordingScene { fail_paint: true, ..Default::default() },
        );
        let handle = host.scheduler_mut().take_next().unwrap();
        let now = host.epoch() + Duration::from_millis(16);

        let err = block_on(host.tick(handle, now)).unwrap_err();
        assert!(format!("{err:#}").contains("device went away"));
        assert_eq!(host.phase(), LoopPhase::Stopped);
        assert!(host.pending_frame().is_none());
        assert_eq!(host.scheduler().pending_count(), 0);
    }

    // ── loss / restore ────────────────────────────────────────────────────

    #[test]
    fn loss_cancels_pending_frame_and_stops_painting() {
        let mut host = square_host(64.0, 64.0, 1.0);
        run_frame(&mut host, 16);
        let pending = host.pending_frame().unwrap();

        host.context_lost();

        assert_eq!(host.phase(), LoopPhase::Stopped);
        assert!(host.pending_frame().is_none());
        assert_eq!(host.scheduler().pending_count(), 0);
        assert!(host.session().is_none());

        assert!(!host.scheduler().is_outstanding(pending));

        // A redraw that slipped through before cancellation must not paint.
        let now = host.epoch() + Duration::from_millis(32);
        block_on(host.tick(pending, now)).unwrap();
        assert_eq!(host.scene().paints.len(), 1);
        assert!(host.scheduler_mut().take_next().is_none());
    }

    #[test]
    fn frame_on_lost_context_ends_session_without_painting() {
        let mut host = square_host(64.0, 64.0, 1.0);
        run_frame(&mut host, 16);
        let token = host.scene().last_token.clone().unwrap();

        // Device lost, but the runtime has not reported it to the host yet.
        host.surface_mut().flagged_lost = true;
        run_frame(&mut host, 32);

        assert_eq!(host.scene().paints.len(), 1);
        assert_eq!(host.surface().ctx.as_ref().map(|c| c.draws), Some(1));
        assert_eq!(host.phase(), LoopPhase::Stopped);
        assert!(host.pending_frame().is_none());
        assert_eq!(host.scheduler().pending_count(), 0);
        assert!(token.upgrade().is_none());

        // Restore on a healthy context resumes painting.
        host.surface_mut().flagged_lost = false;
        block_on(host.context_restored()).unwrap();
        run_frame(&mut host, 48);
        assert_eq!(host.scene().paints.len(), 2);
    }

    #[test]
    fn loss_is_idempotent() {
        let mut host = square_host(64.0, 64.0, 1.0);
        host.context_lost();
        host.context_lost();
        assert_eq!(host.phase(), LoopPhase::Stopped);
        assert_eq!(host.scheduler().cancelled_total(), 1);
    }

    #[test]
    fn restore_builds_fresh_session_state() {
        let mut host = square_host(200.0, 100.0, 1.0);
        run_frame(&mut host, 16);
        let old_token = host.scene().last_token.clone().unwrap();
        assert_eq!(host.session().map(|s| s.id), Some(1));

        host.context_lost();
        assert!(old_token.upgrade().is_none(), "old session state must be dropped");

        block_on(host.context_restored()).unwrap();

        assert_eq!(host.phase(), LoopPhase::Running);
        assert_eq!(host.scene().setups, 2);
        assert_eq!(host.sessions_started(), 2);
        assert_eq!(host.session().map(|s| s.id), Some(2));
        assert_eq!(host.scheduler().pending_count(), 1);

        // Same client size as before the loss, yet the first frame recomputes.
        run_frame(&mut host, 1000);
        assert_eq!(host.surface().resizes.len(), 2);
        assert_eq!(host.surface().viewports.len(), 2);

        // The epoch survives the restore.
        let last = host.scene().paints.last().unwrap();
        assert!((last.elapsed - 1.0).abs() < 1e-6);
    }

    #[test]
    fn restart_while_running_keeps_single_pending_frame() {
        let mut host = square_host(64.0, 64.0, 1.0);
        block_on(host.start()).unwrap();
        assert_eq!(host.scheduler().pending_count(), 1);
        assert_eq!(host.scene().setups, 2);
    }

    // ── shutdown ──────────────────────────────────────────────────────────

    #[test]
    fn shutdown_cancels_pending_and_returns_surface() {
        let mut host = square_host(64.0, 64.0, 1.0);
        run_frame(&mut host, 16);
        let token = host.scene().last_token.clone().unwrap();

        let surface = host.shutdown();
        assert_eq!(surface.resizes.len(), 1);
        assert!(token.upgrade().is_none());
    }
}
