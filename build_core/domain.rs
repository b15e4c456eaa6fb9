//! Schema of `node_config.json`. Optional entries fall back to the
//! defaults below, which match the sensor datasheet and the reference board.
use serde::Deserialize;

//==================================================================================NODE_CONFIG
#[derive(Debug, Deserialize)]
/// Root of the configuration document.
pub(crate) struct NodeConfigFile {
    #[serde(default)]
    pub(crate) bus: BusSection,
    #[serde(default)]
    pub(crate) sensor: SensorSection,
    pub(crate) link: LinkSection,
    pub(crate) broker: BrokerSection,
    #[serde(default)]
    pub(crate) schedule: ScheduleSection,
    #[serde(default = "default_restart_countdown_secs")]
    pub(crate) restart_countdown_secs: u8,
}

//==================================================================================BUS
#[derive(Debug, Deserialize)]
pub(crate) struct BusSection {
    pub(crate) clock_khz: u32,
    pub(crate) sda_pin: u8,
    pub(crate) scl_pin: u8,
}

impl Default for BusSection {
    fn default() -> Self {
        Self {
            clock_khz: 100,
            sda_pin: 21,
            scl_pin: 22,
        }
    }
}

//==================================================================================SENSOR
#[derive(Debug, Deserialize)]
#[serde(default)]
pub(crate) struct SensorSection {
    pub(crate) address: u8,
    pub(crate) max_busy_retries: u8,
    pub(crate) max_checksum_retries: u8,
    pub(crate) reset_settle_ms: u32,
    pub(crate) temperature_settle_ms: u32,
    pub(crate) humidity_settle_ms: u32,
}

impl Default for SensorSection {
    fn default() -> Self {
        Self {
            address: 0x40,
            max_busy_retries: 5,
            max_checksum_retries: 3,
            reset_settle_ms: 15,
            temperature_settle_ms: 50,
            humidity_settle_ms: 20,
        }
    }
}

//==================================================================================LINK
#[derive(Debug, Deserialize)]
pub(crate) struct LinkSection {
    pub(crate) ssid: String,
    pub(crate) password: String,
    #[serde(default = "default_max_reconnect_attempts")]
    pub(crate) max_reconnect_attempts: u8,
    #[serde(default = "default_link_timeout_ms")]
    pub(crate) connect_timeout_ms: u32,
}

//==================================================================================BROKER
#[derive(Debug, Deserialize)]
pub(crate) struct BrokerSection {
    pub(crate) uri: String,
    #[serde(default)]
    pub(crate) username: String,
    #[serde(default)]
    pub(crate) password: String,
    pub(crate) topic_prefix: String,
    #[serde(default = "default_qos")]
    pub(crate) qos: u8,
    #[serde(default = "default_broker_timeout_ms")]
    pub(crate) connect_timeout_ms: u32,
}

//==================================================================================SCHEDULE
#[derive(Debug, Deserialize)]
#[serde(default)]
pub(crate) struct ScheduleSection {
    pub(crate) wake_period_minutes: u32,
    pub(crate) min_sleep_ms: u32,
}

impl Default for ScheduleSection {
    fn default() -> Self {
        Self {
            wake_period_minutes: 10,
            min_sleep_ms: 1,
        }
    }
}

fn default_restart_countdown_secs() -> u8 {
    5
}

fn default_max_reconnect_attempts() -> u8 {
    5
}

fn default_link_timeout_ms() -> u32 {
    30_000
}

fn default_qos() -> u8 {
    1
}

fn default_broker_timeout_ms() -> u32 {
    15_000
}
