//! Named configuration options for every subsystem.
//!
//! Defaults are generated at build time from `config/node_config.json`
//! (or the file pointed to by `TELENODE_CONFIG_PATH`) and exposed through
//! `NodeConfig::default()`. Firmware may still build a `NodeConfig` by hand.
use crate::core::{QoS, SENSOR_ADDRESS};
use embassy_time::Duration;

include!(concat!(env!("OUT_DIR"), "/node_config.rs"));

/// Board-level bus setup. Passed through untouched for the board support
/// code that builds the I²C driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusConfig {
    /// SCL frequency in kHz.
    pub clock_khz: u32,
    /// SDA pin number.
    pub sda_pin: u8,
    /// SCL pin number.
    pub scl_pin: u8,
}

/// Sensor protocol engine options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorConfig {
    /// 7-bit device address.
    pub address: u8,
    /// Maximum read attempts while the device NACKs (busy tier).
    pub max_busy_retries: u8,
    /// Maximum measurement sequences while frames fail the checksum.
    pub max_checksum_retries: u8,
    /// Delay after a soft reset (device maximum is 15 ms).
    pub reset_settle_ms: u32,
    /// Delay before each temperature read attempt.
    pub temperature_settle_ms: u32,
    /// Delay before each humidity read attempt.
    pub humidity_settle_ms: u32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            address: SENSOR_ADDRESS,
            max_busy_retries: 5,
            max_checksum_retries: 3,
            reset_settle_ms: 15,
            temperature_settle_ms: 50,
            humidity_settle_ms: 20,
        }
    }
}

/// Station-mode radio link options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    pub ssid: &'static str,
    pub password: &'static str,
    /// Reconnect attempts after a link-lost notification before giving up.
    pub max_reconnect_attempts: u8,
    /// Deadline for reaching `Connected` or `Failed`.
    pub connect_timeout_ms: u32,
}

/// Publish/subscribe client options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BrokerConfig {
    /// Broker URI, e.g. `mqtt://broker.local:1883`.
    pub uri: &'static str,
    pub username: &'static str,
    pub password: &'static str,
    /// Prefix for the per-metric topics, without trailing `/`.
    pub topic_prefix: &'static str,
    pub qos: QoS,
    /// Deadline for the broker handshake.
    pub connect_timeout_ms: u32,
}

/// Duty-cycle options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScheduleConfig {
    /// Nominal wake-to-wake period.
    pub wake_period_minutes: u32,
    /// Shortest sleep ever requested.
    pub min_sleep_ms: u32,
}

impl ScheduleConfig {
    /// Nominal period as a duration.
    #[inline]
    pub const fn period(&self) -> Duration {
        Duration::from_secs(self.wake_period_minutes as u64 * 60)
    }

    /// Sleep floor as a duration.
    #[inline]
    pub const fn min_sleep(&self) -> Duration {
        Duration::from_millis(self.min_sleep_ms as u64)
    }
}

/// Complete node configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NodeConfig {
    pub bus: BusConfig,
    pub sensor: SensorConfig,
    pub link: LinkConfig,
    pub broker: BrokerConfig,
    pub schedule: ScheduleConfig,
    /// Seconds counted down before restarting on a fatal error.
    pub restart_countdown_secs: u8,
}

impl Default for NodeConfig {
    fn default() -> Self {
        BUILD_CONFIG
    }
}
