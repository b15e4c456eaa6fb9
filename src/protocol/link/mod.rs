//! Station-mode link management: connect, bounded reconnect on link loss,
//! terminal outcome reported to the caller.
//!
//! The radio reports progress asynchronously. Its event context pushes
//! [`LinkEvent`]s into a [`LinkEvents`] channel owned by the firmware (static
//! storage); the manager consumes them while a connect is in flight and feeds
//! them to a [`LinkMachine`], which decides the next action.
//!
//! ```text
//!                connect()
//! Disconnected ────────────▶ Connecting ──AddressAcquired──▶ Connected
//!      ▲                       │   ▲                            │
//!      │ disconnect()          │   └──LinkLost (retries < max)──┘
//!      │                       │
//!      └────── Failed ◀────────┘ LinkLost (retries exhausted), deadline
//! ```
use crate::config::LinkConfig;
use crate::core::{LinkEvent, LinkState};
use crate::error::LinkError;
use crate::protocol::transport::traits::{
    node_timer::{with_deadline, NodeTimer},
    radio_driver::RadioDriver,
};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;


/// Depth of the link event queue.
pub const LINK_EVENT_CAPACITY: usize = 8;

/// Queue filled by the radio event context with `try_send`.
pub type LinkEvents = Channel<CriticalSectionRawMutex, LinkEvent, LINK_EVENT_CAPACITY>;

/// What the manager must do after an event was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkAction {
    /// Nothing to do, keep waiting.
    None,
    /// Issue a connect action on the radio.
    IssueConnect,
    /// Terminal: the link is up.
    Connected,
    /// Terminal: reconnect attempts exhausted.
    Failed,
}

/// Link state machine, free of I/O.
///
/// Tracks the actual state and the desired state separately: a link-lost
/// notification only triggers a reconnect while a connection is wanted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkMachine {
    state: LinkState,
    /// Caller wants the link up.
    desired: bool,
    /// Consecutive reconnects since the last successful association.
    retries: u8,
    /// Reconnects issued during the current connect request.
    reconnects: u8,
    max_reconnect_attempts: u8,
}

impl LinkMachine {
    pub const fn new(max_reconnect_attempts: u8) -> Self {
        Self {
            state: LinkState::Disconnected,
            desired: false,
            retries: 0,
            reconnects: 0,
            max_reconnect_attempts,
        }
    }

    #[inline]
    pub const fn state(&self) -> LinkState {
        self.state
    }

    #[inline]
    pub const fn is_desired(&self) -> bool {
        self.desired
    }

    /// Reconnects issued during the current (or last) connect request.
    #[inline]
    pub const fn reconnects(&self) -> u8 {
        self.reconnects
    }

    #[inline]
    pub const fn retries(&self) -> u8 {
        self.retries
    }

    /// A connect was requested.
    pub fn begin(&mut self) {
        self.desired = true;
        self.state = LinkState::Connecting;
        self.retries = 0;
        self.reconnects = 0;
    }

    /// Apply one notification and return the action it calls for.
    pub fn handle(&mut self, event: LinkEvent) -> LinkAction {
        match event {
            LinkEvent::Started if self.desired => LinkAction::IssueConnect,
            LinkEvent::Started => LinkAction::None,

            LinkEvent::LinkLost if !self.desired => {
                #[cfg(feature = "defmt")]
                defmt::info!("Link down (disconnect requested)");

                self.state = LinkState::Disconnected;
                LinkAction::None
            }
            LinkEvent::LinkLost => match self.state {
                LinkState::Connecting | LinkState::Connected => {
                    if self.retries < self.max_reconnect_attempts {
                        self.retries += 1;
                        self.reconnects = self.reconnects.saturating_add(1);
                        self.state = LinkState::Connecting;

                        #[cfg(feature = "defmt")]
                        defmt::warn!(
                            "Link lost, reconnect {}/{}",
                            self.retries,
                            self.max_reconnect_attempts
                        );

                        LinkAction::IssueConnect
                    } else {
                        #[cfg(feature = "defmt")]
                        defmt::error!("Link failed after {} reconnects", self.retries);

                        self.state = LinkState::Failed;
                        LinkAction::Failed
                    }
                }
                LinkState::Disconnected | LinkState::Failed => LinkAction::None,
            },

            LinkEvent::AddressAcquired if self.desired => {
                self.retries = 0;
                self.state = LinkState::Connected;

                #[cfg(feature = "defmt")]
                defmt::info!("Link up, address acquired");

                LinkAction::Connected
            }
            LinkEvent::AddressAcquired => LinkAction::None,
        }
    }

    /// Give up on the current request: stop wanting the link so late
    /// notifications cannot restart it.
    pub fn abandon(&mut self) {
        self.desired = false;
        if self.state == LinkState::Connecting {
            self.state = LinkState::Failed;
        }
    }

    /// Disconnect was requested.
    pub fn release(&mut self) {
        self.desired = false;
        self.state = LinkState::Disconnected;
    }
}

/// Owns the radio and the link state for the process lifetime.
pub struct ConnectivityManager<'a, R, T> {
    radio: R,
    timer: T,
    events: &'a LinkEvents,
    config: LinkConfig,
    machine: LinkMachine,
}

impl<'a, R: RadioDriver, T: NodeTimer> ConnectivityManager<'a, R, T> {
    pub fn new(radio: R, timer: T, events: &'a LinkEvents, config: LinkConfig) -> Self {
        Self {
            radio,
            timer,
            events,
            machine: LinkMachine::new(config.max_reconnect_attempts),
            config,
        }
    }

    /// Apply the station configuration to the radio.
    pub async fn init(&mut self) -> Result<(), LinkError<R::Error>> {
        self.radio
            .configure(&self.config)
            .await
            .map_err(LinkError::Driver)?;

        #[cfg(feature = "defmt")]
        defmt::info!("Radio configured for SSID {}", self.config.ssid);

        Ok(())
    }

    /// Bring the link up and wait for a terminal outcome, at most
    /// `connect_timeout_ms`.
    ///
    /// On failure the desired state is reset, so residual notifications do
    /// not trigger further reconnects.
    pub async fn connect(&mut self) -> Result<(), LinkError<R::Error>> {
        // Leftovers from a previous attempt must not be mistaken for answers.
        while self.events.try_receive().is_ok() {}

        self.machine.begin();

        #[cfg(feature = "defmt")]
        defmt::info!("Connecting to {}...", self.config.ssid);

        if let Err(error) = self.radio.start().await {
            self.machine.abandon();
            return Err(LinkError::Driver(error));
        }

        let timeout_ms = self.config.connect_timeout_ms;
        let outcome = with_deadline(
            &mut self.timer,
            timeout_ms,
            drive(&mut self.radio, self.events, &mut self.machine),
        )
        .await;

        match outcome {
            Some(Ok(())) => Ok(()),
            Some(Err(error)) => {
                self.machine.abandon();
                Err(error)
            }
            None => {
                #[cfg(feature = "defmt")]
                defmt::error!("Link connect timed out after {} ms", timeout_ms);

                self.machine.abandon();
                Err(LinkError::Timeout { timeout_ms })
            }
        }
    }

    /// Drop the association. A subsequent link-lost notification is a clean
    /// disconnect and is not retried.
    pub async fn disconnect(&mut self) -> Result<(), LinkError<R::Error>> {
        self.machine.release();
        self.radio.disconnect().await.map_err(LinkError::Driver)
    }

    /// Disconnect if still wanted, then bring the interface down.
    pub async fn stop(&mut self) -> Result<(), LinkError<R::Error>> {
        if self.machine.is_desired() {
            self.disconnect().await?;
        }
        self.radio.stop().await.map_err(LinkError::Driver)?;

        #[cfg(feature = "defmt")]
        defmt::info!("Radio stopped");

        Ok(())
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.machine.state() == LinkState::Connected
    }

    #[inline]
    pub fn state(&self) -> LinkState {
        self.machine.state()
    }

    /// Reconnects issued by the last `connect`.
    #[inline]
    pub fn reconnect_attempts(&self) -> u8 {
        self.machine.reconnects()
    }
}

/// Consume notifications until the machine reaches a terminal state.
async fn drive<R: RadioDriver>(
    radio: &mut R,
    events: &LinkEvents,
    machine: &mut LinkMachine,
) -> Result<(), LinkError<R::Error>> {
    loop {
        let event = events.receive().await;

        #[cfg(feature = "defmt")]
        defmt::debug!("Link event: {}", event);

        match machine.handle(event) {
            LinkAction::None => {}
            LinkAction::IssueConnect => radio.connect().await.map_err(LinkError::Driver)?,
            LinkAction::Connected => return Ok(()),
            LinkAction::Failed => {
                return Err(LinkError::Failed {
                    attempts: machine.retries(),
                })
            }
        }
    }
}
