use axum::{
    Json, Router,
    body::Bytes,
    http::{HeaderMap, StatusCode, header},
    routing::{any, get, post},
};
use promptdock::config::RelayConfig;
use promptdock::server::{RelayServer, RelayState, relay_router};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

async fn spawn_upstream(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind upstream listener");
    let addr = listener.local_addr().expect("upstream local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("upstream serve");
    });
    addr
}

async fn spawn_relay() -> SocketAddr {
    let state = RelayState::new(&RelayConfig::default());
    let relay = RelayServer::bind(
        "127.0.0.1:0".parse().expect("relay bind addr"),
        relay_router(state),
    )
    .await
    .expect("failed to bind relay");
    let addr = relay.local_addr();
    tokio::spawn(async move {
        relay.serve(std::future::pending()).await.expect("relay serve");
    });
    addr
}

fn no_redirect_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("failed to build test client")
}

#[tokio::test]
async fn forwards_verbatim_and_rewrites_host() {
    async fn echo(headers: HeaderMap, body: Bytes) -> Json<Value> {
        let pick = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-")
                .to_string()
        };
        Json(json!({
            "host": pick("host"),
            "authorization": pick("authorization"),
            "target": pick("x-target-url"),
            "body": String::from_utf8_lossy(&body),
        }))
    }

    let upstream = spawn_upstream(Router::new().route("/v1/chat", post(echo))).await;
    let relay = spawn_relay().await;

    let target = format!("http://{upstream}/v1/chat");
    let payload = r#"{"model":"m","messages":[{"role":"user","content":"hi"}]}"#;

    let resp = no_redirect_client()
        .post(format!("http://{relay}/"))
        .header("x-target-url", &target)
        .header(header::AUTHORIZATION, "Bearer sk-test-key")
        .header(header::CONTENT_TYPE, "application/json")
        .body(payload)
        .send()
        .await
        .expect("relay call failed");

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .expect("CORS header missing"),
        "*"
    );

    let seen: Value = resp.json().await.expect("echo body should be JSON");
    // Host names the upstream, not the relay.
    assert_eq!(seen["host"], upstream.to_string());
    assert_eq!(seen["authorization"], "Bearer sk-test-key");
    // The carrier header itself is forwarded untouched.
    assert_eq!(seen["target"], target);
    assert_eq!(seen["body"], payload);
}

#[tokio::test]
async fn passes_through_status_headers_and_raw_bytes() {
    const RAW: &[u8] = b"\x00\x01binary\xfftail";

    let upstream = spawn_upstream(Router::new().route(
        "/blob",
        get(|| async {
            (
                StatusCode::IM_A_TEAPOT,
                [
                    ("content-type", "application/vnd.custom"),
                    ("x-upstream-tag", "teapot"),
                ],
                RAW,
            )
        }),
    ))
    .await;
    let relay = spawn_relay().await;

    let resp = no_redirect_client()
        .get(format!("http://{relay}/blob"))
        .header("x-target-url", format!("http://{upstream}/blob"))
        .send()
        .await
        .expect("relay call failed");

    assert_eq!(resp.status(), StatusCode::IM_A_TEAPOT);
    assert_eq!(
        resp.headers().get("content-type").expect("content-type"),
        "application/vnd.custom"
    );
    assert_eq!(
        resp.headers().get("x-upstream-tag").expect("upstream tag"),
        "teapot"
    );
    let body = resp.bytes().await.expect("body read failed");
    assert_eq!(&body[..], RAW);
}

#[tokio::test]
async fn redirects_pass_through_unfollowed() {
    let upstream = spawn_upstream(Router::new().route(
        "/moved",
        get(|| async { (StatusCode::FOUND, [("location", "https://example.com/next")], "") }),
    ))
    .await;
    let relay = spawn_relay().await;

    let resp = no_redirect_client()
        .get(format!("http://{relay}/moved"))
        .header("x-target-url", format!("http://{upstream}/moved"))
        .send()
        .await
        .expect("relay call failed");

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get("location").expect("location header"),
        "https://example.com/next"
    );
}

#[tokio::test]
async fn unreachable_upstream_returns_500_and_listener_survives() {
    // Bind-then-drop reserves a port that is very likely closed.
    let dead_port = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to reserve dead port");
        listener.local_addr().expect("dead addr").port()
    };

    let relay = spawn_relay().await;
    let client = no_redirect_client();

    let resp = client
        .post(format!("http://{relay}/"))
        .header("x-target-url", format!("http://127.0.0.1:{dead_port}/v1/chat"))
        .body("{}")
        .send()
        .await
        .expect("relay call failed");

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = resp.text().await.expect("body read failed");
    assert!(body.starts_with("Proxy error: "));
    assert!(body.len() > "Proxy error: ".len(), "reason must be non-empty");

    // The failed forward must not poison the listener.
    let upstream = spawn_upstream(Router::new().route("/ok", get(|| async { "still alive" }))).await;
    let resp = client
        .get(format!("http://{relay}/ok"))
        .header("x-target-url", format!("http://{upstream}/ok"))
        .send()
        .await
        .expect("follow-up relay call failed");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.expect("body"), "still alive");
}

#[tokio::test]
async fn options_never_reaches_the_upstream() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counted = hits.clone();
    let upstream = spawn_upstream(Router::new().route(
        "/",
        any(move || {
            let counted = counted.clone();
            async move {
                counted.fetch_add(1, Ordering::SeqCst);
                "forwarded"
            }
        }),
    ))
    .await;
    let relay = spawn_relay().await;
    let client = no_redirect_client();
    let target = format!("http://{upstream}/");

    let resp = client
        .request(reqwest::Method::OPTIONS, format!("http://{relay}/"))
        .header("x-target-url", &target)
        .send()
        .await
        .expect("preflight call failed");
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.bytes().await.expect("body").is_empty());
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    // The same request with a forwardable method does reach it.
    let resp = client
        .post(format!("http://{relay}/"))
        .header("x-target-url", &target)
        .send()
        .await
        .expect("relay call failed");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn concurrent_forwards_receive_their_own_responses() {
    let slow = spawn_upstream(Router::new().route(
        "/",
        any(|| async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            "slow-upstream-body"
        }),
    ))
    .await;
    let fast = spawn_upstream(Router::new().route(
        "/",
        any(|| async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            "fast-upstream-body"
        }),
    ))
    .await;
    let relay = spawn_relay().await;
    let client = no_redirect_client();

    let call = |target: String| {
        let client = client.clone();
        let relay_url = format!("http://{relay}/");
        async move {
            client
                .get(relay_url)
                .header("x-target-url", target)
                .send()
                .await
                .expect("relay call failed")
                .text()
                .await
                .expect("body read failed")
        }
    };

    let (slow_body, fast_body) = tokio::join!(
        call(format!("http://{slow}/")),
        call(format!("http://{fast}/"))
    );

    assert_eq!(slow_body, "slow-upstream-body");
    assert_eq!(fast_body, "fast-upstream-body");
}
