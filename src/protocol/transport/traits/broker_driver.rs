//! Minimal abstraction over a publish/subscribe (MQTT) client.
//!
//! The connection outcome is delivered asynchronously as a
//! [`BrokerEvent`](crate::core::BrokerEvent) through the
//! [`BrokerSignal`](crate::protocol::messaging::BrokerSignal).
use crate::config::BrokerConfig;
use crate::core::QoS;
use core::future::Future;

/// Contract to configure, start and publish through a broker client.
pub trait BrokerDriver {
    type Error: core::fmt::Debug;
    /// Construct the client for `config` and register the event callback.
    /// An error here means the client could not be allocated.
    fn configure<'a>(
        &'a mut self,
        config: &'a BrokerConfig,
    ) -> impl Future<Output = Result<(), Self::Error>> + 'a;
    /// Issue the connect action.
    fn start(&mut self) -> impl Future<Output = Result<(), Self::Error>> + '_;
    /// Enqueue one message. Returns the client's message identifier, negative
    /// when the client refused to enqueue.
    fn publish<'a>(
        &'a mut self,
        topic: &'a str,
        payload: &'a [u8],
        qos: QoS,
    ) -> impl Future<Output = Result<i32, Self::Error>> + 'a;
}
