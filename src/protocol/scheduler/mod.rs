//! Duty-cycle scheduler: keeps successive wake cycles on a stable period
//! whatever the active phase costs.
//!
//! The wake timestamp is taken when the cycle starts; right before
//! suspending, the time already spent awake is subtracted from the nominal
//! period. The result is clamped so that the node never sleeps longer than
//! one period and never requests a zero-length sleep.
use crate::config::ScheduleConfig;
use crate::core::{WakeCause, WakeCycleState};
use crate::protocol::transport::traits::platform::Platform;
use embassy_time::Duration;


/// Shortest sleep ever requested.
pub const MIN_SLEEP_FLOOR: Duration = Duration::from_millis(1);

/// Sleep needed to wake up one `period` after `wake_us`, floored at
/// [`MIN_SLEEP_FLOOR`].
#[inline]
pub fn compute_next_sleep(wake_us: u64, now_us: u64, period: Duration) -> Duration {
    compute_next_sleep_with_floor(wake_us, now_us, period, MIN_SLEEP_FLOOR)
}

/// Same as [`compute_next_sleep`] with an explicit floor.
///
/// - `now < wake` (clock anomaly): the full period.
/// - active phase longer than the period: the floor.
/// - otherwise `period - elapsed`, within `[floor, period]`.
pub fn compute_next_sleep_with_floor(
    wake_us: u64,
    now_us: u64,
    period: Duration,
    floor: Duration,
) -> Duration {
    let period_us = period.as_micros();
    let floor_us = floor.as_micros().min(period_us);

    let Some(elapsed_us) = now_us.checked_sub(wake_us) else {
        return period;
    };

    let remaining_us = period_us.saturating_sub(elapsed_us);
    Duration::from_micros(remaining_us.clamp(floor_us, period_us))
}

/// Per-cycle scheduler state.
pub struct DutyCycleScheduler {
    config: ScheduleConfig,
    wake_us: u64,
    wake_cause: WakeCause,
    /// Time actually spent asleep before this cycle, when known.
    previous_sleep_us: Option<u64>,
}

impl DutyCycleScheduler {
    pub const fn new(config: ScheduleConfig) -> Self {
        Self {
            config,
            wake_us: 0,
            wake_cause: WakeCause::FreshBoot,
            previous_sleep_us: None,
        }
    }

    /// Record the wake timestamp and inspect the wake cause and retained
    /// state. Diagnostics only: the cycle runs the same way either way.
    pub fn begin_cycle<P: Platform>(&mut self, platform: &P) -> WakeCause {
        self.wake_us = platform.now_us();
        self.wake_cause = platform.wake_cause();
        self.previous_sleep_us = match self.wake_cause {
            WakeCause::Timer => platform
                .load_retained()
                .and_then(|state| self.wake_us.checked_sub(state.last_sleep_entry_us)),
            WakeCause::FreshBoot => None,
        };

        #[cfg(feature = "defmt")]
        {
            match self.previous_sleep_us {
                Some(slept_us) => defmt::info!("Timer wake after {} ms asleep", slept_us / 1000),
                None => defmt::info!("Wake cause: {}", self.wake_cause),
            }
        }

        self.wake_cause
    }

    #[inline]
    pub fn wake_cause(&self) -> WakeCause {
        self.wake_cause
    }

    #[inline]
    pub fn wake_us(&self) -> u64 {
        self.wake_us
    }

    #[inline]
    pub fn previous_sleep_us(&self) -> Option<u64> {
        self.previous_sleep_us
    }

    /// Compute the sleep, persist the timestamps and suspend.
    ///
    /// On hardware the platform never returns from `deep_sleep`; the returned
    /// duration is for hosts and tests.
    pub fn enter_sleep<P: Platform>(&mut self, platform: &mut P) -> Duration {
        let now_us = platform.now_us();
        let floor = self.config.min_sleep().max(MIN_SLEEP_FLOOR);
        let sleep = compute_next_sleep_with_floor(self.wake_us, now_us, self.config.period(), floor);

        platform.store_retained(WakeCycleState {
            last_wake_us: self.wake_us,
            last_sleep_entry_us: now_us,
        });

        #[cfg(feature = "defmt")]
        defmt::info!(
            "Active for {} ms, sleeping {} ms",
            now_us.saturating_sub(self.wake_us) / 1000,
            sleep.as_millis()
        );

        platform.deep_sleep(sleep);
        sleep
    }
}
