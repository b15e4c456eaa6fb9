//! Minimal abstraction over a station-mode radio (Wi-Fi STA or similar).
//!
//! Actions return as soon as they are issued; their outcome arrives later as
//! a [`LinkEvent`](crate::core::LinkEvent) pushed by the radio event context
//! into the [`LinkEvents`](crate::protocol::link::LinkEvents) channel.
use crate::config::LinkConfig;
use core::future::Future;

/// Contract to drive the radio link.
pub trait RadioDriver {
    type Error: core::fmt::Debug;
    /// Apply SSID and credentials. Called once before the first connect.
    fn configure<'a>(
        &'a mut self,
        config: &'a LinkConfig,
    ) -> impl Future<Output = Result<(), Self::Error>> + 'a;
    /// Bring the interface up; completion is reported by `LinkEvent::Started`.
    fn start(&mut self) -> impl Future<Output = Result<(), Self::Error>> + '_;
    /// Issue an association attempt.
    fn connect(&mut self) -> impl Future<Output = Result<(), Self::Error>> + '_;
    /// Drop the association.
    fn disconnect(&mut self) -> impl Future<Output = Result<(), Self::Error>> + '_;
    /// Bring the interface down.
    fn stop(&mut self) -> impl Future<Output = Result<(), Self::Error>> + '_;
}
