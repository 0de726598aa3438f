use crate::helpers::TestApp;
use serde_json::{json, Value};

#[tokio::test]
async fn subscribe_returns_a_200_and_the_created_record() {
    // given
    let app = TestApp::spawn().await;
    let body = json!({ "name": "Imię Nazwisko", "email": "imie.nazwisko@example.com" });

    // when
    let response = app.post_email(body.to_string()).await;

    // then
    assert_eq!(response.status(), 200);
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["id"], 1);
    assert_eq!(created["name"], "Imię Nazwisko");
    assert_eq!(created["email"], "imie.nazwisko@example.com");
    assert_eq!(created["validated"], false);
    assert!(created["signup"].is_string());
}

#[tokio::test]
async fn subscribe_persists_the_record() {
    // given
    let app = TestApp::spawn().await;

    // when
    let created = app.subscribe("imie.nazwisko@example.com").await;

    // then
    assert_eq!(app.list().await, vec![created]);
}

#[tokio::test]
async fn subscribe_accepts_a_missing_name() {
    // given
    let app = TestApp::spawn().await;
    let body = json!({ "email": "imie.nazwisko@example.com" });

    // when
    let response = app.post_email(body.to_string()).await;

    // then
    assert_eq!(response.status(), 200);
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["name"], Value::Null);
}

#[tokio::test]
async fn subscribe_returns_a_400_for_an_invalid_email() {
    // given
    let app = TestApp::spawn().await;
    let test_cases = vec![
        (json!({ "name": "x", "email": "" }), "empty email"),
        (json!({ "name": "x", "email": "not-an-email" }), "invalid email"),
        (json!({ "name": "x", "email": "@example.com" }), "missing subject"),
    ];

    for (body, description) in test_cases {
        // when
        let response = app.post_email(body.to_string()).await;

        // then
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not return a 400 BAD_REQUEST when the payload was {}",
            description
        );
    }
    assert!(app.list().await.is_empty());
}

#[tokio::test]
async fn subscribe_rejects_malformed_bodies_without_storing_anything() {
    // given
    let app = TestApp::spawn().await;
    let test_cases = vec![
        (r#"{"name": "x"}"#, "missing the email"),
        (r#"{"name": "x", "email": 42}"#, "a non-string email"),
        (r#"{"name": "x", "#, "truncated JSON"),
        ("", "an empty body"),
    ];

    for (body, description) in test_cases {
        // when
        let response = app.post_email(body.into()).await;

        // then
        assert!(
            response.status().is_client_error(),
            "The API did not reject the payload with {}",
            description
        );
    }
    assert!(app.list().await.is_empty());
}

#[tokio::test]
async fn list_returns_subscriptions_in_ascending_id_order() {
    // given
    let app = TestApp::spawn().await;
    let mut created = Vec::new();
    for i in 0..5 {
        created.push(app.subscribe(&format!("user{i}@example.com")).await);
    }

    // when
    let listed = app.list().await;

    // then
    let ids: Vec<u64> = listed.iter().map(|s| s["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    assert_eq!(listed, created);
}

#[tokio::test]
async fn concurrent_subscribes_get_distinct_ids() {
    // given
    let app = TestApp::spawn().await;

    // when
    let created = subscribe_in_parallel(&app, 20).await;
    let mut ids: Vec<u64> = created.iter().map(|s| s["id"].as_u64().unwrap()).collect();

    // then
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 20);
    assert_eq!(app.list().await.len(), 20);
}

async fn subscribe_in_parallel(app: &TestApp, count: usize) -> Vec<Value> {
    let mut set = tokio::task::JoinSet::new();
    for i in 0..count {
        let address = app.address;
        set.spawn(async move {
            let body = json!({ "email": format!("parallel{i}@example.com") });
            reqwest::Client::new()
                .post(format!("http://{address}/email"))
                .json(&body)
                .send()
                .await
                .expect("Failed to execute request")
                .json::<Value>()
                .await
                .expect("Failed to decode the created subscription")
        });
    }

    let mut created = Vec::with_capacity(count);
    while let Some(result) = set.join_next().await {
        created.push(result.unwrap());
    }
    created
}

#[tokio::test]
async fn get_returns_a_404_for_an_unknown_id() {
    // given
    let app = TestApp::spawn().await;

    // when
    let response = app.get_email(7).await;

    // then
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn get_returns_the_stored_record() {
    // given
    let app = TestApp::spawn().await;
    let created = app.subscribe("imie.nazwisko@example.com").await;

    // when
    let response = app.get_email(&created["id"]).await;

    // then
    assert_eq!(response.status(), 200);
    assert_eq!(response.json::<Value>().await.unwrap(), created);
}

#[tokio::test]
async fn allowed_methods_are_advertised_for_cors() {
    // given
    let app = TestApp::spawn().await;

    // when
    let response = reqwest::Client::new()
        .request(
            reqwest::Method::OPTIONS,
            format!("http://{}/email", app.address),
        )
        .header("Origin", "http://example.com")
        .header("Access-Control-Request-Method", "PATCH")
        .send()
        .await
        .expect("Failed to execute request");

    // then
    let allowed = response
        .headers()
        .get("access-control-allow-methods")
        .expect("Missing access-control-allow-methods header")
        .to_str()
        .unwrap()
        .to_string();
    for method in ["GET", "POST", "PATCH", "DELETE"] {
        assert!(allowed.contains(method), "`{allowed}` does not allow {method}");
    }
}
