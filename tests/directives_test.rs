//! End-to-end checks of directive validation and plain responses.

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use testupstream::directive::DirectiveBuilder;
use testupstream::http::fake::FAKE_MESSAGES;

mod common;

const INTERVAL: Duration = Duration::from_millis(10);

#[tokio::test]
async fn test_fallback_chat_completion() {
    let upstream = common::spawn_upstream("primary", INTERVAL).await;
    let headers = DirectiveBuilder::new()
        .expected_path("/v1/chat/completions")
        .into_headers()
        .unwrap();

    let res = common::client()
        .post(upstream.url("/v1/chat/completions"))
        .headers(headers)
        .send()
        .await
        .expect("upstream unreachable");

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "application/json");

    let body: Value = res.json().await.unwrap();
    let content = body["choices"][0]["message"]["content"].as_str().unwrap();
    assert!(FAKE_MESSAGES.contains(&content), "{content} not in catalog");
}

#[tokio::test]
async fn test_fallback_without_any_directive() {
    let upstream = common::spawn_upstream("primary", INTERVAL).await;

    let res = common::client()
        .post(upstream.url("/v1/chat/completions"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = common::client().get(upstream.url("/v1/models")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        res.text().await.unwrap(),
        "no fake response available for path /v1/models\n"
    );
}

#[tokio::test]
async fn test_path_mismatch_body() {
    let upstream = common::spawn_upstream("primary", INTERVAL).await;
    let headers = DirectiveBuilder::new()
        .expected_path("/v1/chat/completions")
        .into_headers()
        .unwrap();

    let res = common::client()
        .post(upstream.url("/v1/embeddings"))
        .headers(headers)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        res.text().await.unwrap(),
        "unexpected path: got /v1/embeddings, expected /v1/chat/completions\n"
    );
}

#[tokio::test]
async fn test_status_headers_and_body() {
    let upstream = common::spawn_upstream("primary", INTERVAL).await;
    let headers = DirectiveBuilder::new()
        .response_status(404)
        .response_body("response body")
        .response_header("x", "y")
        .into_headers()
        .unwrap();

    let res = common::client()
        .get(upstream.url("/some/unmapped/path"))
        .headers(headers)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.headers()["x"], "y");
    assert_eq!(res.text().await.unwrap(), "response body");
}

#[tokio::test]
async fn test_response_header_round_trip() {
    let upstream = common::spawn_upstream("primary", INTERVAL).await;
    let pairs = [
        ("x-upstream-region", "eu-west-1"),
        ("x-ratelimit-remaining", "42"),
        ("x-empty", ""),
        ("x-spaced", "a b c"),
    ];

    let mut builder = DirectiveBuilder::new().response_body("{}");
    for (k, v) in pairs {
        builder = builder.response_header(k, v);
    }

    let res = common::client()
        .get(upstream.url("/"))
        .headers(builder.into_headers().unwrap())
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    for (k, v) in pairs {
        assert_eq!(res.headers()[k], v, "header {k}");
    }
}

#[tokio::test]
async fn test_host_check() {
    let upstream = common::spawn_upstream("primary", INTERVAL).await;

    let ok = DirectiveBuilder::new()
        .expected_host(upstream.host())
        .response_body("ok")
        .into_headers()
        .unwrap();
    let res = common::client().get(upstream.url("/")).headers(ok).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let bad = DirectiveBuilder::new()
        .expected_host("api.openai.com")
        .response_body("ok")
        .into_headers()
        .unwrap();
    let res = common::client().get(upstream.url("/")).headers(bad).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        res.text().await.unwrap(),
        format!("unexpected host: got {}, expected api.openai.com\n", upstream.host())
    );
}

#[tokio::test]
async fn test_header_presence_and_absence() {
    let upstream = common::spawn_upstream("primary", INTERVAL).await;
    let headers = DirectiveBuilder::new()
        .expected_header("authorization", "Bearer token")
        .absent_header("x-api-key")
        .response_body("ok")
        .into_headers()
        .unwrap();

    let res = common::client()
        .get(upstream.url("/"))
        .headers(headers.clone())
        .header("authorization", "Bearer token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = common::client()
        .get(upstream.url("/"))
        .headers(headers.clone())
        .header("authorization", "Bearer other")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        res.text().await.unwrap(),
        "unexpected header \"authorization\": got \"Bearer other\", expected \"Bearer token\"\n"
    );

    let res = common::client()
        .get(upstream.url("/"))
        .headers(headers)
        .header("authorization", "Bearer token")
        .header("x-api-key", "leaked")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        res.text().await.unwrap(),
        "unexpected header \"x-api-key\" presence with value \"leaked\"\n"
    );
}

#[tokio::test]
async fn test_upstream_identity() {
    let blue = common::spawn_upstream("blue", INTERVAL).await;
    let green = common::spawn_upstream("green", INTERVAL).await;
    let headers = DirectiveBuilder::new()
        .expected_upstream_id("blue")
        .response_body("ok")
        .into_headers()
        .unwrap();

    let res = common::client()
        .get(blue.url("/"))
        .headers(headers.clone())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = common::client().get(green.url("/")).headers(headers).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        res.text().await.unwrap(),
        "unexpected testupstream-id: received by \"green\", expected \"blue\"\n"
    );
}

#[tokio::test]
async fn test_request_body_check() {
    let upstream = common::spawn_upstream("primary", INTERVAL).await;
    let expected = r#"{"model":"gpt-4o","messages":[]}"#;
    let headers = DirectiveBuilder::new()
        .expected_request_body(expected)
        .into_headers()
        .unwrap();

    let res = common::client()
        .post(upstream.url("/v1/chat/completions"))
        .headers(headers.clone())
        .body(expected)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = common::client()
        .post(upstream.url("/v1/chat/completions"))
        .headers(headers)
        .body(r#"{"model":"other"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        res.text().await.unwrap(),
        format!("unexpected request body: got {{\"model\":\"other\"}}, expected {expected}\n")
    );
}

#[tokio::test]
async fn test_malformed_directives() {
    let upstream = common::spawn_upstream("primary", INTERVAL).await;

    let res = common::client()
        .get(upstream.url("/"))
        .header("expected-headers", "not-base64!")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(res
        .text()
        .await
        .unwrap()
        .starts_with("failed to decode expected-headers directive"));

    let res = common::client()
        .get(upstream.url("/"))
        .header("response-status", "teapot")
        .header("response-body", "")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_bypasses_directives() {
    let upstream = common::spawn_upstream("primary", INTERVAL).await;

    for method in [reqwest::Method::GET, reqwest::Method::POST] {
        let res = common::client()
            .request(method, upstream.url("/health"))
            .header("expected-path", "%%%")
            .header("expected-testupstream-id", "someone-else")
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.text().await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_repeated_request_is_identical() {
    let upstream = common::spawn_upstream("primary", INTERVAL).await;
    let headers = DirectiveBuilder::new()
        .response_status(201)
        .response_body(r#"{"id":"abc"}"#)
        .response_header("x-a", "b")
        .into_headers()
        .unwrap();

    let mut seen = Vec::new();
    for _ in 0..2 {
        let res = common::client()
            .post(upstream.url("/v1/anything"))
            .headers(headers.clone())
            .send()
            .await
            .unwrap();
        let status = res.status();
        let x_a = res.headers()["x-a"].clone();
        seen.push((status, x_a, res.bytes().await.unwrap()));
    }

    assert_eq!(seen[0], seen[1]);
}

#[tokio::test]
async fn test_empty_directives_are_unset() {
    let upstream = common::spawn_upstream("primary", INTERVAL).await;

    let res = common::client()
        .post(upstream.url("/v1/chat/completions"))
        .header("expected-host", "")
        .header("expected-testupstream-id", "")
        .header("response-type", "")
        .header("response-body", "")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "application/json");

    let body: Value = res.json().await.unwrap();
    let content = body["choices"][0]["message"]["content"].as_str().unwrap();
    assert!(FAKE_MESSAGES.contains(&content), "{content} not in catalog");
}
