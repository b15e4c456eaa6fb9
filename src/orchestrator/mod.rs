//! Application orchestrator: one wake cycle end to end.
//!
//! Every subsystem is initialized independently and its outcome only gates
//! the publish paths that depend on it. Whatever fails, the cycle ends in the
//! scheduler. The single exception is a broker client allocation failure,
//! which aborts the cycle through a visible countdown followed by a restart.
use crate::config::NodeConfig;
use crate::core::{RetryCounters, SensorReading, WakeCause};
use crate::error::{FatalError, FormatError, SensorError};
use crate::protocol::link::{ConnectivityManager, LinkEvents};
use crate::protocol::messaging::payload::{
    format_value, text, topic_for, Payload, DIAG_OK, DIAG_SENSOR_FAILED, METRIC_DIAG,
    METRIC_HUMIDITY, METRIC_TEMPERATURE,
};
use crate::protocol::messaging::{BrokerSignal, MessagingClient};
use crate::protocol::scheduler::DutyCycleScheduler;
use crate::protocol::sensor::Htu21;
use crate::protocol::transport::traits::{
    broker_driver::BrokerDriver, node_timer::NodeTimer, platform::Platform,
    radio_driver::RadioDriver,
};
use crate::protocol::transport::COUNTDOWN_TICK_MS;
use embassy_time::Duration;
use embedded_hal_async::i2c::I2c;

/// Diagnostic outcome of a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleOutcome {
    /// Readings and the "OK" diagnostic were handed to the broker client.
    Published,
    /// The sensor failed; the error diagnostic was handed to the broker client.
    SensorFailureReported,
    /// Readings taken, radio link failed: nothing published.
    SensorOkLinkFailed,
    /// Readings taken, link up, broker session failed: nothing published.
    SensorOkBrokerUnavailable,
    /// Neither a reading nor a session.
    NothingDelivered,
}

/// What happened during one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport {
    pub wake_cause: WakeCause,
    /// Time spent asleep before this cycle, known after a timer wake.
    pub previous_sleep_us: Option<u64>,
    pub sensor_ok: bool,
    pub link_ok: bool,
    pub mqtt_ok: bool,
    /// Compensated reading, when the sensor succeeded.
    pub reading: Option<SensorReading>,
    /// Messages accepted by the broker client.
    pub published: u8,
    pub retries: RetryCounters,
    /// Sleep requested from the platform.
    pub sleep: Duration,
    pub outcome: CycleOutcome,
}

/// The node: sensor, link, broker session, scheduler and platform.
///
/// Each engine gets its own copy of the timer.
pub struct TelemetryNode<'a, B, R, D, P, T> {
    sensor: Htu21<B, T>,
    link: ConnectivityManager<'a, R, T>,
    messaging: MessagingClient<'a, D, T>,
    scheduler: DutyCycleScheduler,
    platform: P,
    timer: T,
    config: NodeConfig,
}

impl<'a, B, R, D, P, T> TelemetryNode<'a, B, R, D, P, T>
where
    B: I2c,
    R: RadioDriver,
    D: BrokerDriver,
    P: Platform,
    T: NodeTimer + Clone,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        bus: B,
        radio: R,
        broker: D,
        platform: P,
        timer: T,
        link_events: &'a LinkEvents,
        broker_signal: &'a BrokerSignal,
        config: NodeConfig,
    ) -> Self {
        Self {
            sensor: Htu21::new(bus, timer.clone(), config.sensor),
            link: ConnectivityManager::new(radio, timer.clone(), link_events, config.link),
            messaging: MessagingClient::new(broker, timer.clone(), broker_signal, config.broker),
            scheduler: DutyCycleScheduler::new(config.schedule),
            platform,
            timer,
            config,
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn link(&self) -> &ConnectivityManager<'a, R, T> {
        &self.link
    }

    /// Run one wake cycle and suspend.
    ///
    /// Only a broker client allocation failure returns an error, after the
    /// restart countdown and `Platform::restart`.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, FatalError> {
        let wake_cause = self.scheduler.begin_cycle(&self.platform);
        let mut retries = RetryCounters::default();

        //------------------------------------------------------------------ sensor
        let mut sensor_ok = match self.sensor.reset(true).await {
            Ok(()) => true,
            Err(_error) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Sensor reset failed: {}", defmt::Debug2Format(&_error));
                false
            }
        };

        //------------------------------------------------------------------ link
        let link_result = match self.link.init().await {
            Ok(()) => self.link.connect().await,
            Err(error) => Err(error),
        };
        retries.link_reconnects = self.link.reconnect_attempts();
        let link_ok = match link_result {
            Ok(()) => true,
            Err(_error) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Link unavailable: {}", defmt::Debug2Format(&_error));
                false
            }
        };

        //------------------------------------------------------------------ broker
        let mqtt_ok = if link_ok {
            match self.messaging.init().await {
                Ok(()) => match self.messaging.start().await {
                    Ok(()) => true,
                    Err(_error) => {
                        #[cfg(feature = "defmt")]
                        defmt::warn!("Broker unavailable: {}", defmt::Debug2Format(&_error));
                        false
                    }
                },
                // `init` only fails when the client cannot be allocated.
                Err(_error) => {
                    #[cfg(feature = "defmt")]
                    defmt::error!(
                        "Broker client allocation failed: {}",
                        defmt::Debug2Format(&_error)
                    );
                    return Err(self.restart_after_countdown().await);
                }
            }
        } else {
            false
        };

        //------------------------------------------------------------------ measure
        let mut reading = None;
        if sensor_ok {
            match self.measure(&mut retries).await {
                Ok(value) => reading = Some(value),
                Err(_error) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("Measurement failed: {}", defmt::Debug2Format(&_error));
                    sensor_ok = false;
                }
            }
        }

        //------------------------------------------------------------------ publish
        let mut published = 0u8;
        if mqtt_ok {
            match reading {
                Some(value) => {
                    published += self
                        .publish_metric(METRIC_HUMIDITY, format_value(value.humidity))
                        .await as u8;
                    published += self
                        .publish_metric(METRIC_TEMPERATURE, format_value(value.temperature))
                        .await as u8;
                    published += self.publish_metric(METRIC_DIAG, text(DIAG_OK)).await as u8;
                }
                None => {
                    published += self
                        .publish_metric(METRIC_DIAG, text(DIAG_SENSOR_FAILED))
                        .await as u8;
                }
            }
        }

        let outcome = match (sensor_ok, link_ok, mqtt_ok) {
            (true, _, true) => CycleOutcome::Published,
            (false, _, true) => CycleOutcome::SensorFailureReported,
            (true, false, _) => CycleOutcome::SensorOkLinkFailed,
            (true, true, false) => CycleOutcome::SensorOkBrokerUnavailable,
            (false, _, false) => CycleOutcome::NothingDelivered,
        };

        #[cfg(feature = "defmt")]
        defmt::info!(
            "Cycle done: sensor={} link={} mqtt={} published={} ({})",
            sensor_ok,
            link_ok,
            mqtt_ok,
            published,
            outcome
        );

        //------------------------------------------------------------------ sleep
        let sleep = self.scheduler.enter_sleep(&mut self.platform);

        Ok(CycleReport {
            wake_cause,
            previous_sleep_us: self.scheduler.previous_sleep_us(),
            sensor_ok,
            link_ok,
            mqtt_ok,
            reading,
            published,
            retries,
            sleep,
            outcome,
        })
    }

    /// One temperature then one humidity measurement, humidity compensated.
    /// Retry counters of both measurements are added to `retries`.
    async fn measure(
        &mut self,
        retries: &mut RetryCounters,
    ) -> Result<SensorReading, SensorError<B::Error>> {
        let temperature = self.sensor.measure_temperature().await;
        accumulate(retries, self.sensor.retry_counters());
        let temperature = temperature?;

        let raw_humidity = self.sensor.measure_humidity().await;
        accumulate(retries, self.sensor.retry_counters());
        let raw_humidity = raw_humidity?;

        let humidity = Htu21::<B, T>::compensate_humidity(raw_humidity, temperature);

        #[cfg(feature = "defmt")]
        defmt::info!("Temperature {} C, humidity {} %", temperature, humidity);

        Ok(SensorReading {
            temperature,
            humidity,
        })
    }

    /// Publish one metric; returns whether the client accepted it. Formatting
    /// and publish failures are logged and skipped.
    async fn publish_metric(
        &mut self,
        metric: &str,
        payload: Result<Payload, FormatError>,
    ) -> bool {
        let topic = match topic_for(self.config.broker.topic_prefix, metric) {
            Ok(topic) => topic,
            Err(_error) => {
                #[cfg(feature = "defmt")]
                defmt::warn!(
                    "Skipping {}: topic does not fit ({})",
                    metric,
                    defmt::Debug2Format(&_error)
                );
                return false;
            }
        };
        let payload = match payload {
            Ok(payload) => payload,
            Err(_error) => {
                #[cfg(feature = "defmt")]
                defmt::warn!(
                    "Skipping {}: payload does not fit ({})",
                    metric,
                    defmt::Debug2Format(&_error)
                );
                return false;
            }
        };

        match self
            .messaging
            .publish(&topic, &payload, self.config.broker.qos)
            .await
        {
            Ok(_) => true,
            Err(_error) => {
                #[cfg(feature = "defmt")]
                defmt::warn!(
                    "Publish to {} failed: {}",
                    topic.as_str(),
                    defmt::Debug2Format(&_error)
                );
                false
            }
        }
    }

    /// Count down visibly, then restart the processor.
    async fn restart_after_countdown(&mut self) -> FatalError {
        for _remaining in (1..=self.config.restart_countdown_secs).rev() {
            #[cfg(feature = "defmt")]
            defmt::error!("Restarting in {} s...", _remaining);

            self.timer.delay_ms(COUNTDOWN_TICK_MS).await;
        }
        self.platform.restart();
        FatalError::ResourceAllocation
    }
}

fn accumulate(total: &mut RetryCounters, measurement: RetryCounters) {
    total.bus_busy_retries = total
        .bus_busy_retries
        .saturating_add(measurement.bus_busy_retries);
    total.checksum_retries = total
        .checksum_retries
        .saturating_add(measurement.checksum_retries);
}
