//! Node protocol components: transport seams, the HTU21 protocol engine,
//! the radio link and broker state machines, and the duty-cycle scheduler.
pub mod link;
pub mod messaging;
pub mod scheduler;
pub mod sensor;
pub mod transport;
