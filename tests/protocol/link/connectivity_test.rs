//! Tests for the connectivity manager: connect, bounded reconnects, deadline,
//! disconnect and stop.
#[allow(dead_code)]
mod helpers {
    include!("../../helpers/mod.rs");
}

use helpers::{Association, MockRadio, MockTimer};
use static_cell::StaticCell;
use telenode::{
    config::LinkConfig,
    core::{LinkEvent, LinkState},
    error::LinkError,
    protocol::link::{ConnectivityManager, LinkEvents},
};

const CONFIG: LinkConfig = LinkConfig {
    ssid: "lab",
    password: "secret",
    max_reconnect_attempts: 2,
    connect_timeout_ms: 200,
};

fn manager(
    events: &'static LinkEvents,
    script: impl IntoIterator<Item = Association>,
) -> (ConnectivityManager<'static, MockRadio, MockTimer>, MockRadio) {
    let radio = MockRadio::new(events, script);
    let manager = ConnectivityManager::new(radio.clone(), MockTimer::default(), events, CONFIG);
    (manager, radio)
}

#[tokio::test]
async fn test_init_applies_config() {
    static EVENTS: StaticCell<LinkEvents> = StaticCell::new();
    let (mut link, radio) = manager(EVENTS.init(LinkEvents::new()), []);

    link.init().await.unwrap();

    assert_eq!(radio.log().configured, Some(CONFIG));
    assert_eq!(link.state(), LinkState::Disconnected);
}

#[tokio::test]
async fn test_init_driver_failure() {
    static EVENTS: StaticCell<LinkEvents> = StaticCell::new();
    let (mut link, radio) = manager(EVENTS.init(LinkEvents::new()), []);
    radio.log().configure_fault = true;

    assert!(matches!(link.init().await, Err(LinkError::Driver(_))));
}

#[tokio::test]
async fn test_connect_first_attempt() {
    static EVENTS: StaticCell<LinkEvents> = StaticCell::new();
    let (mut link, radio) = manager(EVENTS.init(LinkEvents::new()), [Association::Accept]);

    link.connect().await.unwrap();

    assert!(link.is_connected());
    assert_eq!(link.reconnect_attempts(), 0);
    assert_eq!(radio.log().starts, 1);
    assert_eq!(radio.log().connects, 1);
}

#[tokio::test]
async fn test_reconnect_after_link_lost() {
    static EVENTS: StaticCell<LinkEvents> = StaticCell::new();
    let (mut link, radio) = manager(
        EVENTS.init(LinkEvents::new()),
        [Association::Drop, Association::Drop, Association::Accept],
    );

    link.connect().await.unwrap();

    assert!(link.is_connected());
    assert_eq!(link.reconnect_attempts(), 2);
    assert_eq!(radio.log().connects, 3);
}

#[tokio::test]
async fn test_reconnects_exhausted() {
    static EVENTS: StaticCell<LinkEvents> = StaticCell::new();
    let (mut link, radio) = manager(EVENTS.init(LinkEvents::new()), [Association::Drop; 5]);

    let result = link.connect().await;

    assert!(matches!(result, Err(LinkError::Failed { attempts: 2 })));
    assert_eq!(link.state(), LinkState::Failed);
    assert_eq!(radio.log().connects, 3, "initial connect plus two reconnects");
}

#[tokio::test]
async fn test_connect_deadline() {
    static EVENTS: StaticCell<LinkEvents> = StaticCell::new();
    let (mut link, radio) = manager(EVENTS.init(LinkEvents::new()), [Association::Silent]);

    let result = link.connect().await;

    assert!(matches!(result, Err(LinkError::Timeout { timeout_ms: 200 })));
    assert_eq!(link.state(), LinkState::Failed);
    assert!(!link.is_connected());
    assert_eq!(radio.log().connects, 1);
}

#[tokio::test]
/// Notifications left over from an abandoned attempt are not taken as answers.
async fn test_stale_events_ignored() {
    static EVENTS: StaticCell<LinkEvents> = StaticCell::new();
    let events: &'static LinkEvents = EVENTS.init(LinkEvents::new());
    let (mut link, radio) = manager(events, []);
    radio.log().silent_start = true;

    assert!(link.connect().await.is_err());

    events.try_send(LinkEvent::AddressAcquired).unwrap();
    let result = link.connect().await;

    assert!(matches!(result, Err(LinkError::Timeout { .. })));
    assert_eq!(radio.log().connects, 0);
}

#[tokio::test]
async fn test_disconnect_is_not_retried() {
    static EVENTS: StaticCell<LinkEvents> = StaticCell::new();
    let (mut link, radio) = manager(EVENTS.init(LinkEvents::new()), [Association::Accept]);
    radio.log().lost_on_disconnect = true;

    link.connect().await.unwrap();
    link.disconnect().await.unwrap();

    assert_eq!(link.state(), LinkState::Disconnected);
    assert_eq!(radio.log().disconnects, 1);
    assert_eq!(radio.log().connects, 1);

    // Already released: stop only brings the interface down.
    link.stop().await.unwrap();
    assert_eq!(radio.log().disconnects, 1);
    assert_eq!(radio.log().stops, 1);
}

#[tokio::test]
async fn test_stop_disconnects_first() {
    static EVENTS: StaticCell<LinkEvents> = StaticCell::new();
    let (mut link, radio) = manager(EVENTS.init(LinkEvents::new()), [Association::Accept]);

    link.connect().await.unwrap();
    link.stop().await.unwrap();

    assert!(!link.is_connected());
    assert_eq!(radio.log().disconnects, 1);
    assert_eq!(radio.log().stops, 1);
}
