//! Publish/subscribe client: configure, wait for the broker handshake,
//! publish fixed-size text payloads.
//!
//! The driver's event context reports the handshake outcome through a
//! [`BrokerSignal`]. `start` waits on it with a deadline; a `Disconnected`
//! notification during that wait means the broker refused the session.
use crate::config::BrokerConfig;
use crate::core::{BrokerEvent, QoS};
use crate::error::BrokerError;
use crate::protocol::transport::traits::{
    broker_driver::BrokerDriver,
    node_timer::{with_deadline, NodeTimer},
};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

pub mod payload;

/// Handshake notification slot, signalled by the driver's event context.
pub type BrokerSignal = Signal<CriticalSectionRawMutex, BrokerEvent>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Session {
    /// `init` not called or failed.
    Idle,
    /// Client constructed, no handshake yet.
    Configured,
    /// Handshake completed; publishing allowed.
    Started,
}

/// Broker session owner.
pub struct MessagingClient<'a, D, T> {
    driver: D,
    timer: T,
    signal: &'a BrokerSignal,
    config: BrokerConfig,
    session: Session,
}

impl<'a, D: BrokerDriver, T: NodeTimer> MessagingClient<'a, D, T> {
    pub fn new(driver: D, timer: T, signal: &'a BrokerSignal, config: BrokerConfig) -> Self {
        Self {
            driver,
            timer,
            signal,
            config,
            session: Session::Idle,
        }
    }

    /// Construct the client with URI and credentials and register the event
    /// callback. Failure is an allocation failure: the caller restarts.
    pub async fn init(&mut self) -> Result<(), BrokerError<D::Error>> {
        self.signal.reset();
        self.session = Session::Idle;

        self.driver
            .configure(&self.config)
            .await
            .map_err(BrokerError::Allocation)?;
        self.session = Session::Configured;

        #[cfg(feature = "defmt")]
        defmt::info!("Broker client initialized for {}", self.config.uri);

        Ok(())
    }

    /// Issue the connect action and wait for the handshake, at most
    /// `connect_timeout_ms`.
    pub async fn start(&mut self) -> Result<(), BrokerError<D::Error>> {
        if self.session == Session::Idle {
            return Err(BrokerError::NotStarted);
        }
        // Only a notification caused by this start counts.
        self.signal.reset();

        self.driver.start().await.map_err(BrokerError::Driver)?;

        #[cfg(feature = "defmt")]
        defmt::info!("Broker client started, waiting for handshake...");

        let timeout_ms = self.config.connect_timeout_ms;
        match with_deadline(&mut self.timer, timeout_ms, self.signal.wait()).await {
            Some(BrokerEvent::Connected) => {
                #[cfg(feature = "defmt")]
                defmt::info!("Connected to broker");

                self.session = Session::Started;
                Ok(())
            }
            Some(BrokerEvent::Disconnected) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Broker refused the session");

                Err(BrokerError::Unavailable)
            }
            None => {
                #[cfg(feature = "defmt")]
                defmt::error!("Broker handshake timed out after {} ms", timeout_ms);

                Err(BrokerError::Timeout { timeout_ms })
            }
        }
    }

    /// Enqueue one message and return its identifier.
    pub async fn publish(
        &mut self,
        topic: &str,
        payload: &str,
        qos: QoS,
    ) -> Result<i32, BrokerError<D::Error>> {
        if self.session != Session::Started {
            return Err(BrokerError::NotStarted);
        }

        let message_id = self
            .driver
            .publish(topic, payload.as_bytes(), qos)
            .await
            .map_err(BrokerError::Driver)?;

        if message_id < 0 {
            #[cfg(feature = "defmt")]
            defmt::warn!("Publish to {} rejected (id {})", topic, message_id);

            return Err(BrokerError::PublishRejected { message_id });
        }

        #[cfg(feature = "defmt")]
        defmt::info!("Published \"{}\" to {} (id {})", payload, topic, message_id);

        Ok(message_id)
    }

    #[inline]
    pub fn session(&self) -> Session {
        self.session
    }

    #[inline]
    pub fn is_started(&self) -> bool {
        self.session == Session::Started
    }

    #[inline]
    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }
}
