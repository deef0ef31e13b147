use std::collections::BTreeSet;
use std::num::NonZeroU64;

/// Identifier of a requested frame. "No frame pending" is `None`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FrameHandle(NonZeroU64);

impl FrameHandle {
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

/// Display-synchronized frame scheduling with cancellation by handle.
pub trait FrameScheduler {
    /// Requests one frame callback and returns its handle.
    fn request_frame(&mut self) -> FrameHandle;

    /// Withdraws a request. Unknown or already delivered handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Hands out increasing, never-zero handles.
#[derive(Debug, Clone, Default)]
pub(crate) struct HandleSeq {
    last: u64,
}

impl HandleSeq {
    pub(crate) fn next(&mut self) -> FrameHandle {
        self.last = self.last.checked_add(1).unwrap_or(1);
        FrameHandle(NonZeroU64::new(self.last).unwrap_or(NonZeroU64::MIN))
    }
}

/// In-memory scheduler: requests are queued until taken by the driver.
///
/// Drives the host headlessly; `take_next` plays the role of the display
/// refresh delivering the oldest outstanding request.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    seq: HandleSeq,
    outstanding: BTreeSet<FrameHandle>,
    requested: u64,
    cancelled: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of requests neither delivered nor cancelled.
    pub fn pending_count(&self) -> usize {
        self.outstanding.len()
    }

    pub fn is_outstanding(&self, handle: FrameHandle) -> bool {
        self.outstanding.contains(&handle)
    }

    /// Removes and returns the oldest outstanding request.
    pub fn take_next(&mut self) -> Option<FrameHandle> {
        self.outstanding.pop_first()
    }

    pub fn requested_total(&self) -> u64 {
        self.requested
    }

    pub fn cancelled_total(&self) -> u64 {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        let handle = self.seq.next();
        self.outstanding.insert(handle);
        self.requested += 1;
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.outstanding.remove(&handle) {
            self.cancelled += 1;
        }
    }
}
