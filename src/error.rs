//! Error definitions shared across library modules.
//! Each type models one failure class of the node: bus transport, sensor
//! protocol, radio link, broker session, payload formatting and the fatal
//! resource-allocation path.
use crate::core::MeasurementKind;
use thiserror_no_std::Error;

//==================================================================================BUS_ERROR
#[derive(Error, Debug)]
/// Outcome of a failed bus transaction, classified by readiness.
pub enum BusError<E: core::fmt::Debug> {
    /// Bus-level failure unrelated to device readiness (arbitration loss,
    /// timeout, bus fault). Never retried.
    #[error("I2C transport error: {0:?}")]
    Transport(E),
    /// The device refused the transaction with a NACK.
    #[error("Peer busy (NACK)")]
    PeerBusy,
}

//==================================================================================SENSOR_ERROR
#[derive(Error, Debug)]
/// Errors raised by the sensor protocol engine.
pub enum SensorError<E: core::fmt::Debug> {
    /// Command send or non-busy read failure.
    #[error(transparent)]
    Bus(#[from] BusError<E>),

    /// The device was still busy after every allowed read attempt.
    #[error("Measurement timeout after {attempts} read attempts")]
    MeasurementTimeout { attempts: u8 },

    /// Every measurement sequence produced a corrupt frame.
    #[error("Checksum error (residue {residue:#04X}) after {attempts} attempts")]
    Checksum { residue: u8, attempts: u8 },

    /// The device answered with the other measurement kind.
    #[error("Protocol mismatch: requested {requested:?}, device returned {returned:?}")]
    ProtocolMismatch {
        requested: MeasurementKind,
        returned: MeasurementKind,
    },
}

//==================================================================================LINK_ERROR
#[derive(Error, Debug)]
/// Terminal failures of the connectivity manager.
pub enum LinkError<E: core::fmt::Debug> {
    /// The radio driver rejected an action.
    #[error("Radio driver error: {0:?}")]
    Driver(E),
    /// Reconnect attempts exhausted.
    #[error("Link failed after {attempts} reconnect attempts")]
    Failed { attempts: u8 },
    /// No terminal notification arrived before the deadline.
    #[error("Link connect timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u32 },
}

//==================================================================================BROKER_ERROR
#[derive(Error, Debug)]
/// Failures of the publish/subscribe client.
pub enum BrokerError<E: core::fmt::Debug> {
    /// Client construction or event registration failed.
    #[error("Broker client allocation failed: {0:?}")]
    Allocation(E),
    /// The driver rejected the start action.
    #[error("Broker driver error: {0:?}")]
    Driver(E),
    /// The broker closed or refused the session while connecting.
    #[error("Broker unavailable")]
    Unavailable,
    /// No handshake before the deadline.
    #[error("Broker connect timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u32 },
    /// Publication used before `init`/`start` succeeded.
    #[error("Broker client not started")]
    NotStarted,
    /// Enqueue reported a negative message identifier.
    #[error("Publish rejected (message id {message_id})")]
    PublishRejected { message_id: i32 },
}

//==================================================================================FORMAT_ERROR
#[derive(Error, Debug, PartialEq, Eq)]
/// Payload or topic construction failures.
pub enum FormatError {
    /// Rendered text does not fit the fixed-size buffer.
    #[error("Formatted text exceeds {capacity} bytes")]
    Overflow { capacity: usize },
}

//==================================================================================FATAL_ERROR
#[derive(Error, Debug)]
/// Failures that abort a wake cycle through the delayed restart path.
pub enum FatalError {
    /// A signaling primitive or client could not be allocated.
    #[error("Resource allocation failed, restart requested")]
    ResourceAllocation,
}
