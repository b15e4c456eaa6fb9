//! Transport layer: seams towards the board (I²C bus, timer, radio, broker
//! client, platform services) and bus error classification.
//!
//! ## Timing constants
//!
//! These constants document the limits the board support code is expected
//! to enforce; the engines only rely on them being finite.

pub mod traits;

use crate::error::BusError;
use embedded_hal::i2c::{Error, ErrorKind};

/// Per-transaction timeout the I²C driver must enforce (ms).
///
/// Every bus call made by the sensor engine is synchronous from the engine's
/// point of view and returns within this bound.
///
/// # Implementation notes
///
/// [`I2c`](embedded_hal_async::i2c::I2c) implementations **SHOULD** map the
/// device refusing its address (NACK) to
/// [`ErrorKind::NoAcknowledge`], which the engine treats as "device busy".
/// Any other error kind ends the measurement immediately.
pub const BUS_TRANSACTION_TIMEOUT_MS: u32 = 1000;

/// Recommended delay between two countdown messages on the fatal path (ms).
pub const COUNTDOWN_TICK_MS: u32 = 1000;

/// Classify a bus error: NACK means the peer is busy, everything else is a
/// transport failure.
#[inline]
pub fn classify<E: Error>(error: E) -> BusError<E> {
    match error.kind() {
        ErrorKind::NoAcknowledge(_) => BusError::PeerBusy,
        _ => BusError::Transport(error),
    }
}
