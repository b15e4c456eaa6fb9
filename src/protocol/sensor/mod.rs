//! HTU21 protocol engine: soft reset, no-hold measurements with two retry
//! tiers, frame validation and conversion, user register access.
//!
//! # Measurement sequence
//!
//! 1. Send the no-hold opcode for the requested kind.
//! 2. Busy tier: before every read attempt (the first one included) wait the
//!    kind-specific settle time, then read 3 bytes. A NACK means the
//!    conversion is still running and the read is retried, up to
//!    `max_busy_retries` attempts in total. Any other bus error is fatal.
//! 3. Validate the checksum. A corrupt frame restarts the whole sequence at
//!    step 1, up to `max_checksum_retries` sequences in total.
//! 4. Check the status tag against the request. A mismatch is fatal and never
//!    retried: the device would answer the same way.
//! 5. Convert the 14-bit signal.
use crate::config::SensorConfig;
use crate::core::{
    BusCommand, MeasurementKind, MeasurementResult, RawFrame, RetryCounters, SensorReading,
    RAW_FRAME_LEN,
};
use crate::error::{BusError, SensorError};
use crate::infra::{checksum, conversion};
use crate::protocol::transport::classify;
use crate::protocol::transport::traits::node_timer::NodeTimer;
use embedded_hal_async::i2c::I2c;

pub mod user_register;

use user_register::UserRegister;


/// Reason a structurally complete frame was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrameRejection {
    /// Non-zero CRC residue.
    Checksum { residue: u8 },
    /// Status tag announces the other measurement kind.
    Mismatch { returned: MeasurementKind },
}

/// Validate a frame received for a `requested` measurement.
pub(crate) fn decode_frame(
    frame: &RawFrame,
    requested: MeasurementKind,
) -> Result<MeasurementResult, FrameRejection> {
    let residue = checksum::frame_residue(frame);
    if residue != 0 {
        return Err(FrameRejection::Checksum { residue });
    }

    let result = MeasurementResult::from_payload(frame.payload());
    let returned = result.kind();
    if returned != requested {
        return Err(FrameRejection::Mismatch { returned });
    }

    Ok(result)
}

/// Sensor engine owning its bus and timer.
pub struct Htu21<B, T> {
    /// I²C bus implementation; enforces the per-transaction timeout.
    bus: B,
    /// Timer used for reset and conversion settle times.
    timer: T,
    config: SensorConfig,
    /// Bookkeeping of the last measurement.
    counters: RetryCounters,
}

impl<B: I2c, T: NodeTimer> Htu21<B, T> {
    /// Wrap a bus and a timer. No bus traffic happens here.
    pub fn new(bus: B, timer: T, config: SensorConfig) -> Self {
        Self {
            bus,
            timer,
            config,
            counters: RetryCounters::default(),
        }
    }

    /// Retry counters of the last measurement.
    pub fn retry_counters(&self) -> RetryCounters {
        self.counters
    }

    /// Give the bus and timer back.
    pub fn release(self) -> (B, T) {
        (self.bus, self.timer)
    }

    /// Issue a soft reset; optionally wait the device's maximum reset latency.
    pub async fn reset(&mut self, wait_for_completion: bool) -> Result<(), BusError<B::Error>> {
        self.send_command(BusCommand::SoftReset).await?;

        #[cfg(feature = "defmt")]
        defmt::info!("Sent soft reset command");

        if wait_for_completion {
            self.timer.delay_ms(self.config.reset_settle_ms).await;
        }
        Ok(())
    }

    /// Measure the temperature in °C.
    pub async fn measure_temperature(&mut self) -> Result<f32, SensorError<B::Error>> {
        let result = self.measure(MeasurementKind::Temperature).await?;
        Ok(conversion::temperature_celsius(result.signal))
    }

    /// Measure the uncompensated relative humidity in %.
    pub async fn measure_humidity(&mut self) -> Result<f32, SensorError<B::Error>> {
        let result = self.measure(MeasurementKind::Humidity).await?;
        Ok(conversion::relative_humidity(result.signal))
    }

    /// Correct `raw_rh` for the sensor's temperature dependence.
    #[inline]
    pub fn compensate_humidity(raw_rh: f32, temperature_c: f32) -> f32 {
        conversion::compensate_humidity(raw_rh, temperature_c)
    }

    /// One temperature and one humidity measurement, humidity compensated.
    pub async fn read(&mut self) -> Result<SensorReading, SensorError<B::Error>> {
        let temperature = self.measure_temperature().await?;
        let raw_humidity = self.measure_humidity().await?;
        Ok(SensorReading {
            temperature,
            humidity: Self::compensate_humidity(raw_humidity, temperature),
        })
    }

    /// Run the full measurement sequence for `kind` and return the validated
    /// signal.
    pub async fn measure(
        &mut self,
        kind: MeasurementKind,
    ) -> Result<MeasurementResult, SensorError<B::Error>> {
        self.counters.bus_busy_retries = 0;
        self.counters.checksum_retries = 0;

        let max_attempts = self.config.max_checksum_retries.max(1);
        let mut attempts: u8 = 0;

        loop {
            attempts += 1;
            self.send_command(kind.command()).await?;
            let frame = self.read_frame(kind).await?;

            #[cfg(feature = "defmt")]
            defmt::debug!("Read {} frame: {:x}", kind, frame.0);

            match decode_frame(&frame, kind) {
                Ok(result) => return Ok(result),
                Err(FrameRejection::Checksum { residue }) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!(
                        "CRC check failed (residue {=u8:#x}), attempt {}/{}",
                        residue,
                        attempts,
                        max_attempts
                    );

                    if attempts >= max_attempts {
                        return Err(SensorError::Checksum { residue, attempts });
                    }
                    self.counters.checksum_retries =
                        self.counters.checksum_retries.saturating_add(1);
                }
                Err(FrameRejection::Mismatch { returned }) => {
                    #[cfg(feature = "defmt")]
                    defmt::error!("Sensor returned {} instead of {}", returned, kind);

                    return Err(SensorError::ProtocolMismatch {
                        requested: kind,
                        returned,
                    });
                }
            }
        }
    }

    /// Read the user configuration register.
    pub async fn read_user_register(&mut self) -> Result<UserRegister, BusError<B::Error>> {
        let mut value = [0u8; 1];
        self.bus
            .write_read(
                self.config.address,
                &[BusCommand::ReadUserRegister.opcode()],
                &mut value,
            )
            .await
            .map_err(classify)?;
        Ok(UserRegister::from_raw(value[0]))
    }

    /// Write the user configuration register, preserving the reserved bits
    /// currently held by the device.
    pub async fn write_user_register(
        &mut self,
        register: UserRegister,
    ) -> Result<(), BusError<B::Error>> {
        let current = self.read_user_register().await?;
        let merged = register.merge_reserved(current);
        self.bus
            .write(
                self.config.address,
                &[BusCommand::WriteUserRegister.opcode(), merged.raw()],
            )
            .await
            .map_err(classify)
    }

    async fn send_command(&mut self, command: BusCommand) -> Result<(), BusError<B::Error>> {
        self.bus
            .write(self.config.address, &[command.opcode()])
            .await
            .map_err(classify)
    }

    /// Busy tier: settle, read, repeat while the device NACKs.
    async fn read_frame(&mut self, kind: MeasurementKind) -> Result<RawFrame, SensorError<B::Error>> {
        let settle_ms = match kind {
            MeasurementKind::Temperature => self.config.temperature_settle_ms,
            MeasurementKind::Humidity => self.config.humidity_settle_ms,
        };
        let max_attempts = self.config.max_busy_retries.max(1);
        let mut buffer = [0u8; RAW_FRAME_LEN];

        for attempt in 1..=max_attempts {
            self.timer.delay_ms(settle_ms).await;

            match self.bus.read(self.config.address, &mut buffer).await {
                Ok(()) => return Ok(RawFrame(buffer)),
                Err(error) => match classify(error) {
                    BusError::PeerBusy => {
                        #[cfg(feature = "defmt")]
                        defmt::trace!("Sensor busy, read attempt {}/{}", attempt, max_attempts);

                        if attempt < max_attempts {
                            // Accumulates across checksum sequences.
                            self.counters.bus_busy_retries =
                                self.counters.bus_busy_retries.saturating_add(1);
                        }
                    }
                    transport => return Err(SensorError::Bus(transport)),
                },
            }
        }

        #[cfg(feature = "defmt")]
        defmt::error!("Sensor still busy after {} read attempts", max_attempts);

        Err(SensorError::MeasurementTimeout {
            attempts: max_attempts,
        })
    }
}
