//! Platform services outside the core: clock, wake cause, retained memory,
//! deep sleep and restart.
use crate::core::{WakeCause, WakeCycleState};
use embassy_time::Duration;

/// Board services used by the scheduler and the orchestrator.
pub trait Platform {
    /// Monotonic time in µs. Must keep counting across deep sleep (RTC
    /// timer), otherwise retained timestamps lose their meaning.
    fn now_us(&self) -> u64;
    /// Reason for the current boot.
    fn wake_cause(&self) -> WakeCause;
    /// Read the state left by the previous cycle, `None` after power loss.
    fn load_retained(&self) -> Option<WakeCycleState>;
    /// Persist `state` into memory that survives deep sleep.
    fn store_retained(&mut self, state: WakeCycleState);
    /// Arm the wake timer and suspend. On hardware this never returns: the
    /// next wake is a fresh start that inspects the wake cause.
    fn deep_sleep(&mut self, duration: Duration);
    /// Reset the processor.
    fn restart(&mut self);
}
