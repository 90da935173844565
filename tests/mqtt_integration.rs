// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the MQTT session using mockforge-mqtt.

mod common;

use std::cell::Cell;
use std::path::PathBuf;
use std::time::Duration;

use common::{next_frame, start_ws_server};
use devbridge::bridge::Bridge;
use devbridge::config::{BridgeSettings, SimulatorSettings};
use devbridge::error::ForwardError;
use devbridge::forward::Forwarder;
use devbridge::protocol::{IgnoreMessages, MessageHandler, MqttBrokerConfig, MqttSession};
use devbridge::simulator::Simulator;
use devbridge::state::ControlState;
use devbridge::telemetry::TelemetryFields;
use mockforge_mqtt::broker::MqttConfig;
use mockforge_mqtt::start_mqtt_server;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::json;
use tokio::time::sleep;

/// Helper to find an available port for testing.
fn get_test_port() -> u16 {
    use std::sync::atomic::{AtomicU16, Ordering};
    static PORT_COUNTER: AtomicU16 = AtomicU16::new(18850);
    PORT_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Starts a mock MQTT broker on the given port.
async fn start_mock_broker(port: u16) {
    let config = MqttConfig {
        port,
        host: "127.0.0.1".to_string(),
        ..Default::default()
    };

    tokio::spawn(async move {
        let _ = start_mqtt_server(config).await;
    });

    sleep(Duration::from_millis(500)).await;
}

fn broker(port: u16) -> MqttBrokerConfig {
    MqttBrokerConfig::new("127.0.0.1").with_port(port)
}

/// Writes a device configuration to a unique temporary file.
fn write_config(contents: &str) -> PathBuf {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let path = std::env::temp_dir().join(format!(
        "devbridge_it_{}_{n}.json",
        std::process::id()
    ));
    std::fs::write(&path, contents).unwrap();
    path
}

/// Pumps `session` in short windows until it reports a connection.
async fn pump_until_connected<H: MessageHandler>(session: &mut MqttSession, handler: &mut H) {
    for _ in 0..50 {
        session
            .pump_for(Duration::from_millis(100), handler)
            .await
            .unwrap();
        if session.is_connected() {
            return;
        }
    }
    panic!("session did not connect within 5s");
}

/// Counts how often the session asked for the subscription set.
#[derive(Default)]
struct TopicList {
    topics: Vec<String>,
    asked: Cell<u32>,
}

impl MessageHandler for TopicList {
    fn subscriptions(&self) -> Vec<String> {
        self.asked.set(self.asked.get() + 1);
        self.topics.clone()
    }

    async fn on_message(&mut self, _topic: &str, _payload: &[u8]) {}
}

mod session {
    use super::*;

    #[tokio::test]
    async fn connects_and_reports_state() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let mut session = MqttSession::new(broker(port)).unwrap();
        assert!(!session.is_connected());

        pump_until_connected(&mut session, &mut IgnoreMessages).await;

        assert!(session.is_connected());
        assert_eq!(session.consecutive_failures(), 0);
        session.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn subscribes_handler_topics_on_connect() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let mut session = MqttSession::new(broker(port)).unwrap();
        let mut handler = TopicList {
            topics: vec!["temp1".to_string(), "temp2".to_string()],
            ..TopicList::default()
        };

        pump_until_connected(&mut session, &mut handler).await;
        // Let the SUBSCRIBE go out and its SUBACK come back.
        session
            .pump_for(Duration::from_millis(300), &mut handler)
            .await
            .unwrap();

        assert!(session.is_connected());
        assert_eq!(handler.asked.get(), 1);
        session.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn publishes_while_connected() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let mut session = MqttSession::new(broker(port)).unwrap();
        pump_until_connected(&mut session, &mut IgnoreMessages).await;

        session
            .publish("temp1-control", ControlState::new(true, false, true).to_payload().unwrap())
            .unwrap();
        session
            .pump_for(Duration::from_millis(200), &mut IgnoreMessages)
            .await
            .unwrap();

        assert!(session.is_connected());
        session.disconnect().await.unwrap();
    }
}

mod bridge {
    use super::*;

    struct NullForwarder;

    impl Forwarder for NullForwarder {
        async fn forward(&self, _message: &TelemetryFields) -> Result<(), ForwardError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn ticks_publish_control_state_and_connect() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let path = write_config(
            r#"{"devices":[
                {"topic":"temp1","name":"Living Room Sensor","location":"LR","fansState":true},
                {"topic":"temp2","name":"Kitchen","location":"K","lightsState":true}
            ]}"#,
        );
        let settings = BridgeSettings::default()
            .with_broker(broker(port))
            .with_config_path(&path)
            .with_poll_interval(Duration::from_millis(100));
        let mut bridge = Bridge::with_forwarder(&settings, NullForwarder).unwrap();

        for _ in 0..20 {
            bridge.tick().await.unwrap();
            if bridge.session().is_connected() {
                break;
            }
        }

        assert!(bridge.session().is_connected());
        assert_eq!(bridge.previous_states().len(), 2);
        assert_eq!(
            bridge.previous_states().get("temp2"),
            Some(&ControlState::new(false, true, false))
        );

        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn run_stops_on_shutdown() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let path = write_config(r#"{"devices":[{"topic":"temp1"}]}"#);
        let settings = BridgeSettings::default()
            .with_broker(broker(port))
            .with_config_path(&path)
            .with_poll_interval(Duration::from_millis(50));
        let bridge = Bridge::with_forwarder(&settings, NullForwarder).unwrap();

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            bridge.run(sleep(Duration::from_millis(500))),
        )
        .await;

        assert!(matches!(result, Ok(Ok(()))));
        std::fs::remove_file(path).unwrap();
    }
}

mod simulator {
    use super::*;

    #[tokio::test]
    async fn cycle_publishes_one_reading_per_topic() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let settings = SimulatorSettings::default()
            .with_broker(broker(port))
            .with_topics(["temp1", "temp2", "temp3"])
            .with_publish_delay(Duration::from_millis(20));
        let mut simulator = Simulator::with_rng(&settings, StdRng::seed_from_u64(7)).unwrap();

        simulator.cycle().await.unwrap();

        assert_eq!(simulator.published(), 3);
    }
}

mod round_trip {
    use super::*;

    #[tokio::test]
    async fn simulated_reading_reaches_websocket_enriched() {
        let port = get_test_port();
        start_mock_broker(port).await;
        let (ws_url, mut frames) = start_ws_server().await;

        // More changed control states than the request queue holds, so the
        // queue is full when the bridge's ConnAck arrives.
        let mut devices = vec![json!({
            "topic": "temp1",
            "name": "Living Room Sensor",
            "location": "LR"
        })];
        devices.extend((0..150).map(|n| json!({ "topic": format!("room{n}"), "fansState": true })));
        let path = write_config(&json!({ "devices": devices }).to_string());

        let settings = BridgeSettings::default()
            .with_broker(broker(port))
            .with_config_path(&path)
            .with_websocket_url(ws_url)
            .with_poll_interval(Duration::from_millis(100));
        let mut bridge = Bridge::from_settings(&settings).unwrap();

        for _ in 0..30 {
            bridge.tick().await.unwrap();
            let session = bridge.session();
            if session.is_connected() && !session.has_pending_subscriptions() {
                break;
            }
        }
        assert!(bridge.session().is_connected());
        assert!(!bridge.session().has_pending_subscriptions());
        // Lets the SUBACK arrive before anything is published.
        bridge.tick().await.unwrap();

        let sim_settings = SimulatorSettings::default()
            .with_broker(broker(port))
            .with_topics(["temp1"]);
        let mut simulator = Simulator::with_rng(&sim_settings, StdRng::seed_from_u64(3)).unwrap();
        let reading = simulator.publish_reading("temp1").unwrap();
        for _ in 0..30 {
            simulator.flush(Duration::from_millis(100)).await.unwrap();
            if simulator.session().is_connected() {
                break;
            }
        }
        simulator.flush(Duration::from_millis(100)).await.unwrap();

        for _ in 0..30 {
            bridge.tick().await.unwrap();
            if bridge.handler().stats().forwarded > 0 {
                break;
            }
        }

        let mut expected = serde_json::to_value(reading).unwrap();
        let fields = expected.as_object_mut().unwrap();
        fields.insert("device_name".to_string(), json!("Living Room Sensor"));
        fields.insert("location".to_string(), json!("LR"));
        fields.insert("topic".to_string(), json!("temp1"));

        assert_eq!(next_frame(&mut frames).await, expected.to_string());
        assert_eq!(bridge.handler().stats().decode_failures, 0);

        std::fs::remove_file(path).unwrap();
    }
}
