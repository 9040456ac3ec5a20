// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the HTTP device client and coordinator using wiremock.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use parking_lot::Mutex;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wordclock_lib::protocol::{HttpClient, HttpConfig, Protocol};
use wordclock_lib::state::{ConnectionStatus, PartialStateUpdate, StateSnapshot};
use wordclock_lib::subscription::Subscribable;
use wordclock_lib::types::{Brightness, Language, PrefixMode, RgbColor};
use wordclock_lib::{Coordinator, Error, TransportError};

fn status_body() -> serde_json::Value {
    serde_json::json!({
        "brightness": 128,
        "red": 255, "green": 255, "blue": 255,
        "enabled": true,
        "superBright": false,
        "language": "dialekt",
        "transition": 0,
        "prefixMode": 0,
        "transitionSpeed": 0
    })
}

fn client_for(server: &MockServer) -> HttpClient {
    HttpConfig::new(server.uri())
        .with_timeout(Duration::from_millis(500))
        .into_client()
        .unwrap()
}

async fn wait_for(condition: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met in time"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

// ============================================================================
// HttpClient Tests
// ============================================================================

mod http_client {
    use super::*;

    #[tokio::test]
    async fn fetch_status_decodes_payload() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(status_body()))
            .mount(&mock_server)
            .await;

        let status = client_for(&mock_server).fetch_status().await.unwrap();

        assert_eq!(status.is_on, Some(true));
        assert_eq!(status.brightness, Some(Brightness::new(128).unwrap()));
        assert_eq!(
            (status.red, status.green, status.blue),
            (Some(255), Some(255), Some(255))
        );
        assert_eq!(status.language, Some(Language::Dialekt));
        assert_eq!(status.prefix_mode, Some(PrefixMode::Always));
    }

    #[tokio::test]
    async fn fetch_status_reports_only_valid_fields() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"brightness": 0, "red": 20})),
            )
            .mount(&mock_server)
            .await;

        let status = client_for(&mock_server).fetch_status().await.unwrap();
        assert_eq!(status, PartialStateUpdate {
            red: Some(20),
            ..PartialStateUpdate::default()
        });
    }

    #[tokio::test]
    async fn fetch_status_non_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server).fetch_status().await;
        assert!(matches!(
            result,
            Err(TransportError::Status { code: 500, .. })
        ));
    }

    #[tokio::test]
    async fn fetch_status_malformed_payload() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server).fetch_status().await;
        assert!(matches!(result, Err(TransportError::MalformedPayload(_))));
    }

    #[tokio::test]
    async fn fetch_status_times_out() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(status_body())
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server).fetch_status().await;
        assert!(matches!(result, Err(TransportError::Timeout(500))));
    }

    #[tokio::test]
    async fn send_update_posts_only_present_fields() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/update"))
            .and(body_json(serde_json::json!({
                "brightness": 80,
                "red": 10, "green": 20, "blue": 30
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let update = PartialStateUpdate::new()
            .with_brightness(Brightness::new(80).unwrap())
            .with_color(RgbColor::new(10, 20, 30));

        client_for(&mock_server).send_update(&update).await.unwrap();
    }

    #[tokio::test]
    async fn send_update_rejected() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/update"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&mock_server)
            .await;

        let update = PartialStateUpdate::new().with_on(false);
        let result = client_for(&mock_server).send_update(&update).await;
        assert!(matches!(
            result,
            Err(TransportError::Status { code: 400, .. })
        ));
    }

    #[tokio::test]
    async fn open_event_stream_sends_stream_headers() {
        let mock_server = MockServer::start().await;
        let body = "event: settings\ndata: {\"red\":1}\n\n";

        Mock::given(method("GET"))
            .and(path("/events"))
            .and(header("accept", "text/event-stream"))
            .and(header("cache-control", "no-cache"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut stream = client_for(&mock_server).open_event_stream().await.unwrap();
        let mut received = Vec::new();
        while let Some(chunk) = stream.next().await {
            received.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(received, body.as_bytes());
    }

    #[tokio::test]
    async fn open_event_stream_handshake_times_out() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/events"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3600)))
            .mount(&mock_server)
            .await;

        let started = std::time::Instant::now();
        let result = client_for(&mock_server).open_event_stream().await;
        assert!(matches!(result, Err(TransportError::Timeout(500))));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn open_event_stream_rejected() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/events"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server).open_event_stream().await;
        assert!(matches!(
            result,
            Err(TransportError::Status { code: 404, .. })
        ));
    }
}

// ============================================================================
// Coordinator Tests
// ============================================================================

mod coordinator {
    use super::*;

    fn record(coordinator: &Coordinator<HttpClient>) -> Arc<Mutex<Vec<StateSnapshot>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        coordinator.subscribe(move |s| seen_clone.lock().push(s.clone()));
        seen
    }

    #[tokio::test]
    async fn snapshot_then_stream_frame() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(status_body()))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/events"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                "event: settings\ndata: {\"brightness\":80}\n\n",
                "text/event-stream",
            ))
            .mount(&mock_server)
            .await;

        let coordinator = Coordinator::http(mock_server.uri())
            .with_reconnect_delay(Duration::from_secs(60))
            .build()
            .unwrap();
        let seen = record(&coordinator);

        coordinator.start().await.unwrap();
        assert_eq!(coordinator.get_state().brightness().value(), 128);

        wait_for(|| coordinator.get_state().brightness().value() == 80).await;

        let state = coordinator.get_state();
        assert!(state.is_on());
        assert_eq!(state.color(), RgbColor::WHITE);
        assert_eq!(state.language(), Language::Dialekt);
        assert!(!state.super_bright());
        assert!(
            seen.lock()
                .iter()
                .any(|s| s.status == ConnectionStatus::Connected)
        );

        coordinator.stop().await;
    }

    #[tokio::test]
    async fn apply_reaches_device() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/update"))
            .and(body_json(serde_json::json!({"superBright": true})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let coordinator = Coordinator::http(mock_server.uri()).build().unwrap();
        let seen = record(&coordinator);

        let handle = coordinator
            .apply(PartialStateUpdate::new().with_super_bright(true))
            .unwrap();
        assert!(coordinator.get_state().super_bright());
        assert_eq!(seen.lock().len(), 1);

        handle.wait().await.unwrap();
    }

    #[tokio::test]
    async fn failed_apply_is_reported_not_rolled_back() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/update"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let coordinator = Coordinator::http(mock_server.uri()).build().unwrap();
        let update = PartialStateUpdate::new().with_brightness(Brightness::new(5).unwrap());

        let result = coordinator.apply(update).unwrap().wait().await;
        assert!(matches!(
            result,
            Err(Error::Transport(TransportError::Status { code: 503, .. }))
        ));
        assert_eq!(coordinator.get_state().brightness().value(), 5);
    }

    #[tokio::test]
    async fn unreachable_device_keeps_retrying_until_stopped() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let coordinator = Coordinator::http("127.0.0.1")
            .with_port(port)
            .with_reconnect_delay(Duration::from_secs(5))
            .build()
            .unwrap();

        coordinator.start().await.unwrap();
        assert!(!coordinator.has_data());

        wait_for(|| coordinator.connection_status() == ConnectionStatus::Reconnecting).await;

        let started = std::time::Instant::now();
        coordinator.stop().await;
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn stalled_event_handshake_is_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/events"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3600)))
            .mount(&mock_server)
            .await;

        let coordinator = Coordinator::http(mock_server.uri())
            .with_timeout(Duration::from_millis(200))
            .with_reconnect_delay(Duration::from_millis(100))
            .build()
            .unwrap();
        let seen = record(&coordinator);
        coordinator.start().await.unwrap();

        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            let attempts = mock_server
                .received_requests()
                .await
                .unwrap_or_default()
                .iter()
                .filter(|r| r.url.path() == "/events")
                .count();
            if attempts >= 3 {
                break;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "only {attempts} attempts"
            );
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        assert!(
            seen.lock()
                .iter()
                .any(|s| s.status == ConnectionStatus::Reconnecting)
        );
        assert!(
            !seen
                .lock()
                .iter()
                .any(|s| s.status == ConnectionStatus::Connected)
        );
        coordinator.stop().await;
    }

    #[tokio::test]
    async fn refresh_keeps_fields_missing_from_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "brightness": 50,
                "red": 10, "green": 11, "blue": 12,
                "enabled": true
            })))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"brightness": 0, "red": 20})),
            )
            .mount(&mock_server)
            .await;

        let coordinator = Coordinator::http(mock_server.uri()).build().unwrap();
        coordinator.refresh().await.unwrap();

        let state = coordinator.refresh().await.unwrap();
        assert_eq!(state.brightness().value(), 50);
        assert_eq!(state.color(), RgbColor::new(20, 11, 12));
        assert!(state.is_on());
        assert_eq!(coordinator.get_state(), state);
    }

    #[tokio::test]
    async fn refresh_adopts_device_state() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(status_body()))
            .mount(&mock_server)
            .await;

        let coordinator = Coordinator::http(mock_server.uri()).build().unwrap();
        assert!(!coordinator.has_data());

        let state = coordinator.refresh().await.unwrap();
        assert_eq!(state.brightness().value(), 128);
        assert!(coordinator.has_data());
    }
}
