//! `telenode` library: the firmware core of a battery-powered
//! temperature/humidity node. It wakes on a timer, reads an HTU21-class
//! sensor over I²C, optionally brings up a station-mode radio link and a
//! publish/subscribe session, publishes the readings, then computes a sleep
//! duration that keeps the wake period stable.
//!
//! The crate is `no_std` and executor-agnostic: every platform service is a
//! trait the board support code implements.
#![no_std]
//==================================================================================
/// Data model shared by every engine (opcodes, frames, readings, link state).
pub mod core;
/// Error taxonomy: bus, sensor, link, broker, formatting and fatal errors.
pub mod error;
/// Named configuration options, defaults generated at build time.
pub mod config;
/// Pure algorithms: CRC-8 validation and fixed-point conversions.
pub mod infra;
/// Transport seams and the sensor, link, messaging and scheduling engines.
pub mod protocol;
/// One wake cycle end to end: init, measure, publish, sleep.
pub mod orchestrator;
//==================================================================================
