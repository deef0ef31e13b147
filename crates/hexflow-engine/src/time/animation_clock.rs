use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Seconds since the animation epoch. Drives shader animation.
    pub elapsed: f32,

    /// Time since the previous tick, in seconds (clamped).
    pub dt: f32,

    /// Monotonic frame counter, never reset.
    pub frame_index: u64,
}

/// Clock producing `FrameTime` snapshots relative to a fixed epoch.
///
/// `dt` is clamped so a stall (debugger, minimized window, restore) does not
/// produce a pathological step. `elapsed` is never clamped.
#[derive(Debug, Clone)]
pub struct AnimationClock {
    epoch: Instant,
    last: Option<Instant>,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl AnimationClock {
    /// Creates a clock whose epoch is now.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Creates a clock with an explicit epoch.
    pub fn starting_at(epoch: Instant) -> Self {
        Self {
            epoch,
            last: None,
            frame_index: 0,
            dt_min: Duration::from_micros(100),
            dt_max: Duration::from_millis(250),
        }
    }

    pub fn epoch(&self) -> Instant {
        self.epoch
    }

    /// Seconds between the epoch and `now`; zero if `now` precedes the epoch.
    pub fn elapsed_at(&self, now: Instant) -> f32 {
        now.saturating_duration_since(self.epoch).as_secs_f32()
    }

    /// Forgets the previous tick so the next `dt` starts from the minimum.
    ///
    /// Called when a session restarts; the epoch is kept.
    pub fn reset_delta(&mut self) {
        self.last = None;
    }

    /// Advances the clock to `now` and returns the frame snapshot.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = match self.last {
            Some(last) => now.saturating_duration_since(last).clamp(self.dt_min, self.dt_max),
            None => self.dt_min,
        };
        self.last = Some(now);

        let ft = FrameTime {
            elapsed: self.elapsed_at(now),
            dt: dt.as_secs_f32(),
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::new()
    }
}
