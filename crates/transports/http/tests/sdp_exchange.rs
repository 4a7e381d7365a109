//! Wire-level SDP exchange tests
//!
//! Drives the router directly (held connections via spawned requests)
//! and end-to-end over a real listener with the signaling client.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use signalhub_core::{Coordinator, SessionDescription, SignalingConfig};
use signalhub_http::{ErrorResponse, HttpServer, SdpResponse, SignalingClient};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn sd(tag: &str) -> SessionDescription {
    SessionDescription::new("offer", format!("v=0 {tag}"))
}

fn coordinator(pairing_timeout_ms: u64) -> Arc<Coordinator> {
    Arc::new(Coordinator::new(SignalingConfig {
        pairing_timeout_ms,
        sweep_interval_ms: 50,
        ..SignalingConfig::default()
    }))
}

fn sdp_request(name: &str, description: &SessionDescription) -> Request<Body> {
    let body = serde_json::json!({ "Name": name, "SD": description }).to_string();

    Request::builder()
        .method("POST")
        .uri("/sdp")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn response_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn publisher_and_subscriber_exchange_descriptions() {
    let router = HttpServer::router(coordinator(2_000));

    // Publisher posts first; the request is held open
    let publisher = {
        let router = router.clone();
        tokio::spawn(async move { router.oneshot(sdp_request("Publisher", &sd("pub"))).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let response = router
        .clone()
        .oneshot(sdp_request("Client:171234:5678", &sd("sub")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("application/json; charset=utf-8")
    );
    let body: SdpResponse = response_json(response).await;
    assert_eq!(body.sd, sd("pub"));

    // The held publisher request resolves with the subscriber's SD
    let response = publisher.await.unwrap().unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: SdpResponse = response_json(response).await;
    assert_eq!(body.sd, sd("sub"));
}

#[tokio::test]
async fn browser_style_text_plain_payloads_are_accepted() {
    let router = HttpServer::router(coordinator(2_000));

    let publisher = {
        let router = router.clone();
        tokio::spawn(async move { router.oneshot(sdp_request("Publisher", &sd("pub"))).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    // The browser glue posts its JSON body under text/plain
    let body = serde_json::json!({ "Name": "Client:171234:5678", "SD": sd("sub") }).to_string();
    let request = Request::builder()
        .method("POST")
        .uri("/sdp")
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Body::from(body))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: SdpResponse = response_json(response).await;
    assert_eq!(body.sd, sd("pub"));

    let response = publisher.await.unwrap().unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn second_publisher_gets_409() {
    let router = HttpServer::router(coordinator(2_000));

    let first = {
        let router = router.clone();
        tokio::spawn(async move { router.oneshot(sdp_request("Publisher", &sd("pub1"))).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let response = router
        .clone()
        .oneshot(sdp_request("Publisher", &sd("pub2")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: ErrorResponse = response_json(response).await;
    assert_eq!(body.error_type, "conflict");

    // Unblock the first publisher
    router
        .clone()
        .oneshot(sdp_request("Client:1:1", &sd("sub")))
        .await
        .unwrap();
    let response = first.await.unwrap().unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn early_subscribers_drain_fifo_over_the_wire() {
    let router = HttpServer::router(coordinator(2_000));

    let mut subscribers = Vec::new();
    for i in 0..2 {
        let router = router.clone();
        let description = sd(&format!("sub{i}"));
        subscribers.push(tokio::spawn(async move {
            router
                .oneshot(sdp_request(&format!("Client:1:{i}"), &description))
                .await
        }));
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    let response = router
        .clone()
        .oneshot(sdp_request("Publisher", &sd("pub")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The publisher is acknowledged with the first subscriber's SD
    let body: SdpResponse = response_json(response).await;
    assert_eq!(body.sd, sd("sub0"));

    for handle in subscribers {
        let response = handle.await.unwrap().unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: SdpResponse = response_json(response).await;
        assert_eq!(body.sd, sd("pub"));
    }
}

#[tokio::test]
async fn closed_session_rejects_with_410() {
    let router = HttpServer::router(coordinator(2_000));

    let publisher = {
        let router = router.clone();
        tokio::spawn(async move { router.oneshot(sdp_request("Publisher", &sd("pub"))).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let close = Request::builder()
        .method("DELETE")
        .uri("/session/default")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(close).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The held publisher request resolves with Gone
    let response = publisher.await.unwrap().unwrap();
    assert_eq!(response.status(), StatusCode::GONE);

    // So do later subscribers, while the tombstone lives
    let response = router
        .clone()
        .oneshot(sdp_request("Client:1:1", &sd("sub")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::GONE);
    let body: ErrorResponse = response_json(response).await;
    assert_eq!(body.error_type, "gone");
}

#[tokio::test]
async fn held_publisher_times_out_with_408() {
    let router = HttpServer::router(coordinator(200));

    let response = router
        .oneshot(sdp_request("Publisher", &sd("pub")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    let body: ErrorResponse = response_json(response).await;
    assert_eq!(body.error_type, "timeout");
}

#[tokio::test]
async fn malformed_payloads_get_400() {
    let router = HttpServer::router(coordinator(2_000));

    // Invalid JSON
    let request = Request::builder()
        .method("POST")
        .uri("/sdp")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = response_json(response).await;
    assert_eq!(body.error_type, "malformed");

    // Unrecognized peer name
    let response = router
        .clone()
        .oneshot(sdp_request("Watcher:1:2", &sd("x")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Empty SDP payload
    let response = router
        .clone()
        .oneshot(sdp_request("Publisher", &SessionDescription::new("offer", "")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn closing_an_unknown_session_is_404() {
    let router = HttpServer::router(coordinator(2_000));

    let close = Request::builder()
        .method("DELETE")
        .uri("/session/nonexistent")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(close).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: ErrorResponse = response_json(response).await;
    assert_eq!(body.error_type, "not_found");
}

#[tokio::test]
async fn client_and_server_exchange_end_to_end() {
    let coordinator = coordinator(5_000);
    let sweeper = coordinator.spawn_sweeper();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = HttpServer::router(Arc::clone(&coordinator));
    let server = tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let client = SignalingClient::new(format!("http://{addr}")).unwrap();
    client.health().await.unwrap();

    let pub_sd = sd("pub");
    let publisher = client.publish(None, &pub_sd);
    let subscriber = async {
        // Let the publisher's request land first
        tokio::time::sleep(Duration::from_millis(200)).await;
        client.join(None, &sd("sub")).await
    };

    let (publisher_ack, subscriber_answer) = futures::future::join(publisher, subscriber).await;

    assert_eq!(publisher_ack.unwrap(), sd("sub"));
    let (peer_id, answer) = subscriber_answer.unwrap();
    assert_eq!(answer, sd("pub"));
    assert!(peer_id.starts_with("Client:"));

    // Resubmission under the same peer id returns the same answer
    let again = client.submit(&peer_id, None, &sd("sub")).await.unwrap();
    assert_eq!(again, sd("pub"));

    // Protocol rejections come back as signaling errors, not raw HTTP
    let err = client.close("nonexistent").await.unwrap_err();
    assert!(matches!(
        err,
        signalhub_http::Error::Signaling(signalhub_core::Error::NotFound(_))
    ));

    client.close(signalhub_http::DEFAULT_SESSION).await.unwrap();

    sweeper.abort();
    server.abort();
}
