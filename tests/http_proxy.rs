//! End-to-end tests for HTTP mode.

use std::time::Duration;

use lb_proxy::config::Algorithm;

mod common;

async fn get_body(client: &reqwest::Client, url: &str) -> (u16, String) {
    let res = client.get(url).send().await.unwrap();
    let status = res.status().as_u16();
    (status, res.text().await.unwrap())
}

#[tokio::test]
async fn round_robin_alternates_between_backends() {
    let a = common::start_mock_backend("A").await;
    let b = common::start_mock_backend("B").await;
    let (proxy, shutdown) = common::start_proxy(common::config(&[a, b])).await;

    let client = common::http_client();
    let url = format!("http://{}/", proxy);
    let mut bodies = Vec::new();
    for _ in 0..4 {
        let (status, body) = get_body(&client, &url).await;
        assert_eq!(status, 200);
        bodies.push(body);
    }

    assert_eq!(bodies, vec!["A", "B", "A", "B"]);
    shutdown.trigger();
}

#[tokio::test]
async fn weighted_follows_weights() {
    let a = common::start_mock_backend("A").await;
    let b = common::start_mock_backend("B").await;
    let mut config = common::config(&[a, b]);
    config.algorithm = Algorithm::Weighted;
    config.weights = vec![2, 1];
    let (proxy, shutdown) = common::start_proxy(config).await;

    let client = common::http_client();
    let url = format!("http://{}/", proxy);
    let mut bodies = Vec::new();
    for _ in 0..6 {
        bodies.push(get_body(&client, &url).await.1);
    }

    assert_eq!(bodies, vec!["A", "A", "B", "A", "A", "B"]);
    shutdown.trigger();
}

#[tokio::test]
async fn percentage_with_full_share_always_picks_that_backend() {
    let a = common::start_mock_backend("A").await;
    let b = common::start_mock_backend("B").await;
    let mut config = common::config(&[a, b]);
    config.algorithm = Algorithm::Percentage;
    config.percentages = vec![0, 100];
    let (proxy, shutdown) = common::start_proxy(config).await;

    let client = common::http_client();
    let url = format!("http://{}/", proxy);
    for _ in 0..20 {
        assert_eq!(get_body(&client, &url).await.1, "B");
    }
    shutdown.trigger();
}

#[tokio::test]
async fn all_backends_down_returns_503() {
    let dead = common::closed_port().await;
    let (proxy, shutdown) = common::start_proxy(common::config(&[dead])).await;

    let client = common::http_client();
    let url = format!("http://{}/anything", proxy);

    // Until the first probe lands the backend is assumed healthy and the
    // request fails with 502; after that the proxy answers 503 without dialing.
    let mut last = 0;
    for _ in 0..50 {
        let (status, body) = get_body(&client, &url).await;
        last = status;
        if status == 503 {
            assert_eq!(body, "No healthy backends available");
            break;
        }
        assert_eq!(status, 502);
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(last, 503);

    shutdown.trigger();
}

#[tokio::test]
async fn failing_backend_is_evicted_and_readmitted() {
    let a = common::start_mock_backend("A").await;
    let (b, toggle) = common::start_toggled_backend("B").await;
    let (proxy, shutdown) = common::start_proxy(common::config(&[a, b])).await;

    let client = common::http_client();
    let url = format!("http://{}/", proxy);

    toggle.set_up(false);
    tokio::time::sleep(Duration::from_millis(500)).await;
    for _ in 0..6 {
        let (status, body) = get_body(&client, &url).await;
        assert_eq!(status, 200);
        assert_eq!(body, "A");
    }

    toggle.set_up(true);
    tokio::time::sleep(Duration::from_millis(500)).await;
    let mut seen_b = false;
    for _ in 0..4 {
        if get_body(&client, &url).await.1 == "B" {
            seen_b = true;
        }
    }
    assert!(seen_b, "recovered backend should receive traffic again");

    shutdown.trigger();
}

#[tokio::test]
async fn response_carries_request_id() {
    let a = common::start_mock_backend("A").await;
    let (proxy, shutdown) = common::start_proxy(common::config(&[a])).await;

    let res = common::http_client()
        .get(format!("http://{}/some/path?q=1", proxy))
        .header("x-request-id", "abc-123")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(res.headers()["x-request-id"], "abc-123");
    shutdown.trigger();
}
