//! Time subsystem.
//!
//! Frame timing without coupling to the runtime. The host owns one
//! `AnimationClock`; its epoch survives context loss so the animation keeps
//! flowing across a restore instead of jumping back to zero.

mod animation_clock;

pub use animation_clock::{AnimationClock, FrameTime};
