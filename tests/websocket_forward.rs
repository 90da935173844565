// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for WebSocket forwarding against a local server.

mod common;

use std::time::Duration;

use common::{next_frame, start_ws_server};
use devbridge::bridge::TelemetryHandler;
use devbridge::config::{Device, DeviceConfig};
use devbridge::error::ForwardError;
use devbridge::forward::{Forwarder, WebSocketForwarder};
use devbridge::protocol::MessageHandler;
use devbridge::telemetry::decode_payload;
use tokio::net::TcpListener;

mod forwarder {
    use super::*;

    #[tokio::test]
    async fn delivers_message_as_json_text() {
        let (url, mut rx) = start_ws_server().await;
        let forwarder = WebSocketForwarder::new(url);

        let message = decode_payload(br#"{"temperature":22.5,"humidity":40}"#).unwrap();
        forwarder.forward(&message).await.unwrap();

        assert_eq!(
            next_frame(&mut rx).await,
            r#"{"temperature":22.5,"humidity":40}"#
        );
    }

    #[tokio::test]
    async fn uses_a_fresh_connection_per_message() {
        let (url, mut rx) = start_ws_server().await;
        let forwarder = WebSocketForwarder::new(url);

        for n in 0..3 {
            let payload = format!(r#"{{"n":{n}}}"#);
            let message = decode_payload(payload.as_bytes()).unwrap();
            forwarder.forward(&message).await.unwrap();
        }

        let mut frames = Vec::new();
        for _ in 0..3 {
            frames.push(next_frame(&mut rx).await);
        }
        frames.sort();
        assert_eq!(frames, vec![r#"{"n":0}"#, r#"{"n":1}"#, r#"{"n":2}"#]);
    }

    #[tokio::test]
    async fn silent_endpoint_times_out() {
        // Accepts TCP but never answers the WebSocket handshake.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });

        let forwarder = WebSocketForwarder::new(format!("ws://{addr}"))
            .with_timeout(Duration::from_millis(200));
        let message = decode_payload(b"{}").unwrap();

        let result = forwarder.forward(&message).await;
        assert!(matches!(result, Err(ForwardError::Timeout(200))));
    }
}

mod telemetry_pipeline {
    use super::*;

    fn living_room() -> DeviceConfig {
        DeviceConfig::new(vec![
            Device::new("temp1")
                .with_name("Living Room Sensor")
                .with_location("LR"),
        ])
    }

    #[tokio::test]
    async fn known_device_is_enriched_and_forwarded() {
        let (url, mut rx) = start_ws_server().await;
        let mut handler = TelemetryHandler::new(living_room(), WebSocketForwarder::new(url));

        handler
            .on_message("temp1", br#"{"temperature":22.5}"#)
            .await;

        assert_eq!(
            next_frame(&mut rx).await,
            r#"{"temperature":22.5,"device_name":"Living Room Sensor","location":"LR","topic":"temp1"}"#
        );
        assert_eq!(handler.stats().forwarded, 1);
    }

    #[tokio::test]
    async fn unknown_topic_gets_placeholder_metadata() {
        let (url, mut rx) = start_ws_server().await;
        let mut handler = TelemetryHandler::new(living_room(), WebSocketForwarder::new(url));

        handler.on_message("temp9", br#"{"co2":512}"#).await;

        assert_eq!(
            next_frame(&mut rx).await,
            r#"{"co2":512,"device_name":"Unknown","location":"Unknown","topic":"temp9"}"#
        );
    }

    #[tokio::test]
    async fn endpoint_down_counts_failure_and_continues() {
        let mut handler =
            TelemetryHandler::new(living_room(), WebSocketForwarder::new("ws://127.0.0.1:1"));

        handler.on_message("temp1", br#"{"a":1}"#).await;

        let stats = handler.stats();
        assert_eq!(stats.forwarded, 0);
        assert_eq!(stats.forward_failures, 1);
    }
}
