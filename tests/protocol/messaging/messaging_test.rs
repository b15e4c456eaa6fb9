//! Tests for the messaging client: handshake wait, refusal, deadline and
//! failure-checked publishing.
#[allow(dead_code)]
mod helpers {
    include!("../../helpers/mod.rs");
}

use helpers::{Handshake, MockBroker, MockTimer, Published};
use static_cell::StaticCell;
use telenode::{
    config::BrokerConfig,
    core::{BrokerEvent, QoS},
    error::BrokerError,
    protocol::messaging::{
        payload::{format_value, topic_for, METRIC_TEMPERATURE},
        BrokerSignal, MessagingClient, Session,
    },
};

const CONFIG: BrokerConfig = BrokerConfig {
    uri: "mqtt://broker.lab:1883",
    username: "node",
    password: "secret",
    topic_prefix: "lab/node",
    qos: QoS::AtLeastOnce,
    connect_timeout_ms: 200,
};

fn client(
    signal: &'static BrokerSignal,
    handshake: Handshake,
) -> (MessagingClient<'static, MockBroker, MockTimer>, MockBroker) {
    let broker = MockBroker::new(signal, handshake);
    let client = MessagingClient::new(broker.clone(), MockTimer::default(), signal, CONFIG);
    (client, broker)
}

#[tokio::test]
async fn test_start_waits_for_handshake() {
    static SIGNAL: StaticCell<BrokerSignal> = StaticCell::new();
    let (mut client, broker) = client(SIGNAL.init(BrokerSignal::new()), Handshake::Accept);

    client.init().await.unwrap();
    assert_eq!(client.session(), Session::Configured);
    client.start().await.unwrap();

    assert!(client.is_started());
    assert_eq!(broker.log().configured, Some(CONFIG));
    assert_eq!(broker.log().starts, 1);
}

#[tokio::test]
async fn test_allocation_failure() {
    static SIGNAL: StaticCell<BrokerSignal> = StaticCell::new();
    let (mut client, broker) = client(SIGNAL.init(BrokerSignal::new()), Handshake::Accept);
    broker.log().configure_fault = true;

    assert!(matches!(client.init().await, Err(BrokerError::Allocation(_))));
    assert_eq!(client.session(), Session::Idle);
    assert!(matches!(client.start().await, Err(BrokerError::NotStarted)));
    assert_eq!(broker.log().starts, 0);
}

#[tokio::test]
async fn test_refused_session() {
    static SIGNAL: StaticCell<BrokerSignal> = StaticCell::new();
    let (mut client, _broker) = client(SIGNAL.init(BrokerSignal::new()), Handshake::Refuse);

    client.init().await.unwrap();

    assert!(matches!(client.start().await, Err(BrokerError::Unavailable)));
    assert!(!client.is_started());
}

#[tokio::test]
async fn test_handshake_deadline() {
    static SIGNAL: StaticCell<BrokerSignal> = StaticCell::new();
    let (mut client, _broker) = client(SIGNAL.init(BrokerSignal::new()), Handshake::Silent);

    client.init().await.unwrap();

    assert!(matches!(
        client.start().await,
        Err(BrokerError::Timeout { timeout_ms: 200 })
    ));
}

#[tokio::test]
/// A notification raised before the connect action does not count.
async fn test_stale_handshake_ignored() {
    static SIGNAL: StaticCell<BrokerSignal> = StaticCell::new();
    let signal: &'static BrokerSignal = SIGNAL.init(BrokerSignal::new());
    let (mut client, _broker) = client(signal, Handshake::Silent);

    client.init().await.unwrap();
    signal.signal(BrokerEvent::Connected);

    assert!(matches!(client.start().await, Err(BrokerError::Timeout { .. })));
}

#[tokio::test]
async fn test_publish_requires_session() {
    static SIGNAL: StaticCell<BrokerSignal> = StaticCell::new();
    let (mut client, broker) = client(SIGNAL.init(BrokerSignal::new()), Handshake::Accept);

    client.init().await.unwrap();
    let result = client.publish("lab/node/diag", "OK", QoS::AtLeastOnce).await;

    assert!(matches!(result, Err(BrokerError::NotStarted)));
    assert!(broker.published().is_empty());
}

#[tokio::test]
async fn test_publish_records_message() {
    static SIGNAL: StaticCell<BrokerSignal> = StaticCell::new();
    let (mut client, broker) = client(SIGNAL.init(BrokerSignal::new()), Handshake::Accept);
    client.init().await.unwrap();
    client.start().await.unwrap();

    let topic = topic_for(CONFIG.topic_prefix, METRIC_TEMPERATURE).unwrap();
    let payload = format_value(21.5).unwrap();
    let id = client.publish(&topic, &payload, CONFIG.qos).await.unwrap();

    assert_eq!(id, 1);
    assert_eq!(
        broker.published(),
        vec![Published {
            topic: "lab/node/temperature".to_string(),
            payload: "21.50".to_string(),
            qos: QoS::AtLeastOnce,
        }]
    );
}

#[tokio::test]
/// A negative message identifier is a failure, not a silent success.
async fn test_negative_message_id_rejected() {
    static SIGNAL: StaticCell<BrokerSignal> = StaticCell::new();
    let (mut client, broker) = client(SIGNAL.init(BrokerSignal::new()), Handshake::Accept);
    broker.log().message_ids.push_back(-1);
    client.init().await.unwrap();
    client.start().await.unwrap();

    let result = client.publish("lab/node/diag", "OK", QoS::AtMostOnce).await;

    assert!(matches!(
        result,
        Err(BrokerError::PublishRejected { message_id: -1 })
    ));
    assert!(broker.published().is_empty());
}
