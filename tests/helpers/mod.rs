/// Test doubles for the bus, timer, radio, broker client and platform.
///
/// Every mock keeps its log behind an `Arc`, so a test can hand the mock to
/// an engine and still inspect what happened afterwards.
use embassy_time::Duration;
use embedded_hal::i2c::{Error as I2cError, ErrorKind, NoAcknowledgeSource};
use embedded_hal_async::i2c::{ErrorType, I2c, Operation};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use telenode::{
    config::{BrokerConfig, LinkConfig},
    core::{BrokerEvent, LinkEvent, QoS, RawFrame, WakeCause, WakeCycleState},
    infra::checksum,
    protocol::{
        link::LinkEvents,
        messaging::BrokerSignal,
        transport::traits::{
            broker_driver::BrokerDriver, node_timer::NodeTimer, platform::Platform,
            radio_driver::RadioDriver,
        },
    },
};

//==================================================================================BUS
/// Error returned by [`MockBus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBusError {
    /// Address not acknowledged: the sensor is busy.
    Nack,
    /// Any non-readiness failure.
    ArbitrationLoss,
}

impl I2cError for MockBusError {
    fn kind(&self) -> ErrorKind {
        match self {
            MockBusError::Nack => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            MockBusError::ArbitrationLoss => ErrorKind::ArbitrationLoss,
        }
    }
}

/// Scripted answer to one measurement read.
#[derive(Debug, Clone, Copy)]
pub enum Reply {
    Frame(RawFrame),
    Busy,
    Fault,
}

impl Reply {
    /// Frame with a valid checksum for `payload`.
    pub fn valid(payload: u16) -> Self {
        Reply::Frame(checksum::encode(payload))
    }

    /// Frame for `payload` with a corrupted checksum byte.
    pub fn corrupt(payload: u16) -> Self {
        let frame = checksum::encode(payload);
        Reply::Frame(RawFrame::new(payload, frame.checksum() ^ 0x5A))
    }
}

#[derive(Default)]
pub struct BusLog {
    /// Every write, in order.
    pub writes: Vec<Vec<u8>>,
    /// Measurement read attempts (register reads excluded).
    pub reads: usize,
    /// Content of the user register.
    pub register: u8,
    /// Fail every write with a transport error.
    pub write_fault: bool,
    replies: VecDeque<Reply>,
}

/// In-memory HTU21. Reads past the end of the script answer NACK.
#[derive(Clone, Default)]
pub struct MockBus {
    log: Arc<Mutex<BusLog>>,
}

impl MockBus {
    pub fn with_replies(replies: impl IntoIterator<Item = Reply>) -> Self {
        let bus = Self::default();
        bus.log().replies.extend(replies);
        bus.log().register = 0x02;
        bus
    }

    pub fn log(&self) -> MutexGuard<'_, BusLog> {
        self.log.lock().unwrap()
    }

    /// First byte of every write.
    pub fn commands(&self) -> Vec<u8> {
        self.log().writes.iter().filter_map(|w| w.first().copied()).collect()
    }

    /// Number of writes carrying `opcode` as first byte.
    pub fn count_command(&self, opcode: u8) -> usize {
        self.commands().iter().filter(|&&c| c == opcode).count()
    }

    pub fn reads(&self) -> usize {
        self.log().reads
    }
}

impl ErrorType for MockBus {
    type Error = MockBusError;
}

impl I2c for MockBus {
    async fn transaction(
        &mut self,
        _address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut log = self.log.lock().unwrap();
        let mut last_command = None;

        for operation in operations.iter_mut() {
            match operation {
                Operation::Write(bytes) => {
                    if log.write_fault {
                        return Err(MockBusError::ArbitrationLoss);
                    }
                    log.writes.push(bytes.to_vec());
                    if bytes.len() == 2 && bytes[0] == 0xE6 {
                        log.register = bytes[1];
                    }
                    last_command = bytes.first().copied();
                }
                Operation::Read(buffer) => {
                    if last_command == Some(0xE7) {
                        buffer[0] = log.register;
                        continue;
                    }
                    log.reads += 1;
                    match log.replies.pop_front() {
                        Some(Reply::Frame(frame)) => buffer.copy_from_slice(&frame.0),
                        Some(Reply::Busy) | None => return Err(MockBusError::Nack),
                        Some(Reply::Fault) => return Err(MockBusError::ArbitrationLoss),
                    }
                }
            }
        }
        Ok(())
    }
}

//==================================================================================TIMER
/// Timer based on `tokio::time::sleep` that records every requested delay.
#[derive(Clone, Default)]
pub struct MockTimer {
    delays: Arc<Mutex<Vec<u32>>>,
}

impl MockTimer {
    pub fn delays(&self) -> Vec<u32> {
        self.delays.lock().unwrap().clone()
    }
}

impl NodeTimer for MockTimer {
    async fn delay_ms(&mut self, millis: u32) {
        self.delays.lock().unwrap().push(millis);
        tokio::time::sleep(tokio::time::Duration::from_millis(millis as u64)).await;
    }
}

//==================================================================================RADIO
/// Scripted answer to one connect action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Association {
    /// Associate and obtain an address.
    Accept,
    /// Association fails.
    Drop,
    /// No notification at all.
    Silent,
}

#[derive(Default)]
pub struct RadioLog {
    pub configured: Option<LinkConfig>,
    pub starts: usize,
    pub connects: usize,
    pub disconnects: usize,
    pub stops: usize,
    /// Fail `configure`.
    pub configure_fault: bool,
    /// Do not report `Started`.
    pub silent_start: bool,
    /// Notify `LinkLost` when disconnecting.
    pub lost_on_disconnect: bool,
    associations: VecDeque<Association>,
}

/// Station-mode radio pushing notifications like a driver event context.
/// Connects past the end of the script are dropped.
#[derive(Clone)]
pub struct MockRadio {
    events: &'static LinkEvents,
    log: Arc<Mutex<RadioLog>>,
}

impl MockRadio {
    pub fn new(events: &'static LinkEvents, script: impl IntoIterator<Item = Association>) -> Self {
        let radio = Self {
            events,
            log: Arc::default(),
        };
        radio.log().associations.extend(script);
        radio
    }

    pub fn log(&self) -> MutexGuard<'_, RadioLog> {
        self.log.lock().unwrap()
    }

    fn notify(&self, event: LinkEvent) {
        self.events.try_send(event).unwrap();
    }
}

impl RadioDriver for MockRadio {
    type Error = &'static str;

    async fn configure<'a>(&'a mut self, config: &'a LinkConfig) -> Result<(), Self::Error> {
        let mut log = self.log();
        if log.configure_fault {
            return Err("configure failed");
        }
        log.configured = Some(*config);
        Ok(())
    }

    async fn start(&mut self) -> Result<(), Self::Error> {
        let silent = {
            let mut log = self.log();
            log.starts += 1;
            log.silent_start
        };
        if !silent {
            self.notify(LinkEvent::Started);
        }
        Ok(())
    }

    async fn connect(&mut self) -> Result<(), Self::Error> {
        let association = {
            let mut log = self.log();
            log.connects += 1;
            log.associations.pop_front().unwrap_or(Association::Drop)
        };
        match association {
            Association::Accept => self.notify(LinkEvent::AddressAcquired),
            Association::Drop => self.notify(LinkEvent::LinkLost),
            Association::Silent => {}
        }
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), Self::Error> {
        let lost = {
            let mut log = self.log();
            log.disconnects += 1;
            log.lost_on_disconnect
        };
        if lost {
            self.notify(LinkEvent::LinkLost);
        }
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), Self::Error> {
        self.log().stops += 1;
        Ok(())
    }
}

//==================================================================================BROKER
/// Scripted answer to the connect action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handshake {
    Accept,
    Refuse,
    Silent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub topic: String,
    pub payload: String,
    pub qos: QoS,
}

pub struct BrokerLog {
    pub configured: Option<BrokerConfig>,
    pub starts: usize,
    pub published: Vec<Published>,
    /// Fail `configure` (client allocation).
    pub configure_fault: bool,
    pub handshake: Handshake,
    /// Identifiers returned by successive publishes; then counting from 1.
    pub message_ids: VecDeque<i32>,
    next_id: i32,
}

/// Broker client signalling its handshake like a driver event context.
#[derive(Clone)]
pub struct MockBroker {
    signal: &'static BrokerSignal,
    log: Arc<Mutex<BrokerLog>>,
}

impl MockBroker {
    pub fn new(signal: &'static BrokerSignal, handshake: Handshake) -> Self {
        Self {
            signal,
            log: Arc::new(Mutex::new(BrokerLog {
                configured: None,
                starts: 0,
                published: Vec::new(),
                configure_fault: false,
                handshake,
                message_ids: VecDeque::new(),
                next_id: 1,
            })),
        }
    }

    pub fn log(&self) -> MutexGuard<'_, BrokerLog> {
        self.log.lock().unwrap()
    }

    pub fn published(&self) -> Vec<Published> {
        self.log().published.clone()
    }
}

impl BrokerDriver for MockBroker {
    type Error = &'static str;

    async fn configure<'a>(&'a mut self, config: &'a BrokerConfig) -> Result<(), Self::Error> {
        let mut log = self.log();
        if log.configure_fault {
            return Err("client allocation failed");
        }
        log.configured = Some(*config);
        Ok(())
    }

    async fn start(&mut self) -> Result<(), Self::Error> {
        let handshake = {
            let mut log = self.log();
            log.starts += 1;
            log.handshake
        };
        match handshake {
            Handshake::Accept => self.signal.signal(BrokerEvent::Connected),
            Handshake::Refuse => self.signal.signal(BrokerEvent::Disconnected),
            Handshake::Silent => {}
        }
        Ok(())
    }

    async fn publish<'a>(
        &'a mut self,
        topic: &'a str,
        payload: &'a [u8],
        qos: QoS,
    ) -> Result<i32, Self::Error> {
        let mut log = self.log();
        let id = match log.message_ids.pop_front() {
            Some(id) => id,
            None => {
                log.next_id += 1;
                log.next_id - 1
            }
        };
        if id >= 0 {
            log.published.push(Published {
                topic: topic.to_string(),
                payload: String::from_utf8_lossy(payload).into_owned(),
                qos,
            });
        }
        Ok(id)
    }
}

//==================================================================================PLATFORM
pub struct PlatformLog {
    /// Current monotonic time (µs).
    pub now_us: u64,
    /// Added to the clock after every read.
    pub step_us: u64,
    pub wake_cause: WakeCause,
    pub retained: Option<WakeCycleState>,
    pub slept: Vec<Duration>,
    pub restarts: usize,
}

#[derive(Clone)]
pub struct MockPlatform {
    log: Arc<Mutex<PlatformLog>>,
}

impl MockPlatform {
    pub fn new(wake_cause: WakeCause, now_us: u64, step_us: u64) -> Self {
        Self {
            log: Arc::new(Mutex::new(PlatformLog {
                now_us,
                step_us,
                wake_cause,
                retained: None,
                slept: Vec::new(),
                restarts: 0,
            })),
        }
    }

    pub fn log(&self) -> MutexGuard<'_, PlatformLog> {
        self.log.lock().unwrap()
    }
}

impl Platform for MockPlatform {
    fn now_us(&self) -> u64 {
        let mut log = self.log();
        let now = log.now_us;
        log.now_us += log.step_us;
        now
    }

    fn wake_cause(&self) -> WakeCause {
        self.log().wake_cause
    }

    fn load_retained(&self) -> Option<WakeCycleState> {
        self.log().retained
    }

    fn store_retained(&mut self, state: WakeCycleState) {
        self.log().retained = Some(state);
    }

    fn deep_sleep(&mut self, duration: Duration) {
        self.log().slept.push(duration);
    }

    fn restart(&mut self) {
        self.log().restarts += 1;
    }
}
