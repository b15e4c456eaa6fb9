//! Abstraction traits used by the engines (timer, radio, broker client, platform).
pub mod broker_driver;
pub mod node_timer;
pub mod platform;
pub mod radio_driver;
