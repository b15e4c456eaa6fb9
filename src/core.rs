//! Data types shared by the sensor engine, the connectivity state machines,
//! the scheduler and the orchestrator.
//!
//! Everything here is plain data: no I/O, no timing.

/// 7-bit I²C address of the HTU21 family.
pub const SENSOR_ADDRESS: u8 = 0x40;

/// Number of bytes returned by a measurement read: `[data_high, data_low, checksum]`.
pub const RAW_FRAME_LEN: usize = 3;

/// Mask of the two status bits carried in the low bits of the payload.
pub const STATUS_MASK: u16 = 0b11;

/// Status bit flagging a humidity measurement (cleared for temperature).
pub const STATUS_HUMIDITY_BIT: u16 = 0b10;

//==================================================================================BUS_COMMAND
/// Opcodes understood by the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum BusCommand {
    /// Reboot the sensor; completes within 15 ms.
    SoftReset = 0xFE,
    /// Temperature measurement, the sensor holds SCL until data is ready.
    MeasureTemperatureHold = 0xE3,
    /// Temperature measurement, the sensor NACKs reads until data is ready.
    MeasureTemperatureNoHold = 0xF3,
    /// Humidity measurement, the sensor holds SCL until data is ready.
    MeasureHumidityHold = 0xE5,
    /// Humidity measurement, the sensor NACKs reads until data is ready.
    MeasureHumidityNoHold = 0xF5,
    /// Write the user configuration register.
    WriteUserRegister = 0xE6,
    /// Read the user configuration register.
    ReadUserRegister = 0xE7,
}

impl BusCommand {
    /// Raw opcode byte.
    #[inline]
    pub const fn opcode(self) -> u8 {
        self as u8
    }
}

//==================================================================================MEASUREMENT_KIND
/// Which channel a measurement targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MeasurementKind {
    Temperature,
    Humidity,
}

impl MeasurementKind {
    /// No-hold opcode used to trigger this measurement.
    #[inline]
    pub const fn command(self) -> BusCommand {
        match self {
            MeasurementKind::Temperature => BusCommand::MeasureTemperatureNoHold,
            MeasurementKind::Humidity => BusCommand::MeasureHumidityNoHold,
        }
    }

    /// Measurement kind encoded by the status bits of a payload.
    #[inline]
    pub const fn from_status(status_bits: u8) -> Self {
        if status_bits as u16 & STATUS_HUMIDITY_BIT != 0 {
            MeasurementKind::Humidity
        } else {
            MeasurementKind::Temperature
        }
    }
}

//==================================================================================RAW_FRAME
/// Three bytes exactly as read from the bus, before any validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawFrame(pub [u8; RAW_FRAME_LEN]);

impl RawFrame {
    /// Build a frame from a 16-bit payload and its checksum byte.
    #[inline]
    pub const fn new(payload: u16, checksum: u8) -> Self {
        let [high, low] = payload.to_be_bytes();
        Self([high, low, checksum])
    }

    /// `data_high << 8 | data_low`.
    #[inline]
    pub const fn payload(&self) -> u16 {
        u16::from_be_bytes([self.0[0], self.0[1]])
    }

    /// Checksum byte as transmitted.
    #[inline]
    pub const fn checksum(&self) -> u8 {
        self.0[2]
    }

    /// The frame packed into the low 24 bits of a register, checksum last.
    #[inline]
    pub const fn as_register(&self) -> u32 {
        (self.0[0] as u32) << 16 | (self.0[1] as u32) << 8 | self.0[2] as u32
    }
}

//==================================================================================MEASUREMENT_RESULT
/// A checksum-validated measurement whose status tag matched the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MeasurementResult {
    /// 16-bit payload with the two status bits cleared (14 significant bits).
    pub signal: u16,
    /// The two status bits as received.
    pub status_bits: u8,
}

impl MeasurementResult {
    /// Split a payload into signal and status bits.
    #[inline]
    pub const fn from_payload(payload: u16) -> Self {
        Self {
            signal: payload & !STATUS_MASK,
            status_bits: (payload & STATUS_MASK) as u8,
        }
    }

    /// Measurement kind announced by the status bits.
    #[inline]
    pub const fn kind(&self) -> MeasurementKind {
        MeasurementKind::from_status(self.status_bits)
    }
}

//==================================================================================SENSOR_READING
/// One compensated reading, owned by the orchestrator for a single cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorReading {
    /// Temperature in °C.
    pub temperature: f32,
    /// Temperature-compensated relative humidity in %.
    pub humidity: f32,
}

//==================================================================================LINK_STATE
/// Connectivity manager state. `Connected` and `Failed` are terminal for a
/// connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

/// Notifications delivered by the radio event context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// Station interface is up; a connect action may be issued.
    Started,
    /// Association dropped or failed.
    LinkLost,
    /// DHCP lease obtained.
    AddressAcquired,
}

/// Notifications delivered by the publish/subscribe client context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BrokerEvent {
    /// Broker handshake completed.
    Connected,
    /// Session closed or refused by the broker.
    Disconnected,
}

/// Delivery guarantee requested for a publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QoS {
    AtMostOnce = 0,
    #[default]
    AtLeastOnce = 1,
    ExactlyOnce = 2,
}

//==================================================================================RETRY_COUNTERS
/// Per-cycle retry bookkeeping. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RetryCounters {
    /// Reconnect attempts issued after a link-lost notification.
    pub link_reconnects: u8,
    /// Read attempts refused with a NACK during the last measurement.
    pub bus_busy_retries: u8,
    /// Measurement sequences re-sent because of a checksum failure.
    pub checksum_retries: u8,
}

//==================================================================================WAKE_CYCLE
/// Why the processor is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WakeCause {
    /// Deep-sleep timer expired.
    Timer,
    /// Power-on, reset pin, watchdog or any other non-timer cause.
    FreshBoot,
}

/// State kept in retained memory across the sleep transition. This is the
/// only data living longer than one wake cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WakeCycleState {
    /// Monotonic timestamp (µs) recorded when the previous cycle started.
    pub last_wake_us: u64,
    /// Monotonic timestamp (µs) recorded right before the previous suspend.
    pub last_sleep_entry_us: u64,
}
