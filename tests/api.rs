use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use actix_web::{
    http::{header, StatusCode},
    test, web, App,
};
use serde_json::{json, Value};

use call_relay::{
    configuration::{AppState, Config, State},
    push::{DeliveryFuture, PushDelivery},
    server,
    types::{PushHeader, Urgency},
};

/// Records every payload and push header, answers with a fixed status.
struct RecordingDelivery {
    status: u16,
    payloads: Mutex<Vec<Value>>,
    headers: Mutex<Vec<PushHeader>>,
}

impl RecordingDelivery {
    fn new(status: u16) -> Arc<RecordingDelivery> {
        Arc::new(RecordingDelivery {
            status,
            payloads: Mutex::new(vec![]),
            headers: Mutex::new(vec![]),
        })
    }

    fn payloads(&self) -> Vec<Value> {
        self.payloads.lock().unwrap().clone()
    }

    fn headers(&self) -> Vec<PushHeader> {
        self.headers.lock().unwrap().clone()
    }
}

impl PushDelivery for RecordingDelivery {
    fn deliver<'a>(
        &'a self,
        _subscription: &'a Value,
        push_header: &'a PushHeader,
        payload: &'a [u8],
    ) -> DeliveryFuture<'a> {
        let payload = serde_json::from_slice(payload).unwrap();
        self.payloads.lock().unwrap().push(payload);
        self.headers.lock().unwrap().push(push_header.clone());
        let status = self.status;
        Box::pin(async move { Ok(status) })
    }
}

fn subscription() -> Value {
    json!({
        "endpoint": "https://x",
        "keys": { "p256dh": "a", "auth": "b" }
    })
}

fn config(dir: &Path) -> Config {
    Config {
        subscriptions_file: dir.join("subscriptions.json"),
        upload_dir: dir.join("uploads"),
        vapid_public_key: String::from("BTestPublicKey"),
        ..Config::default()
    }
}

fn app_state(dir: &Path, delivery: Arc<RecordingDelivery>) -> AppState<State> {
    AppState::new(State::new(config(dir), delivery))
}

fn voice_clip_body(data: &str) -> String {
    format!(
        "--BOUNDARY\r\n\
        Content-Disposition: form-data; name=\"audio\"; filename=\"clip.ogg\"\r\n\
        Content-Type: audio/ogg\r\n\
        \r\n\
        {}\r\n\
        --BOUNDARY--\r\n",
        data
    )
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .configure(server::routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_subscribe_stores_record() {
    let dir = tempfile::tempdir().unwrap();
    let state = app_state(dir.path(), RecordingDelivery::new(201));
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/subscribe")
        .set_json(subscription())
        .to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(resp, json!({ "status": "success" }));
    assert_eq!(state.store.load().await.unwrap(), vec![subscription()]);
}

#[actix_web::test]
async fn test_subscribe_twice_keeps_one_record() {
    let dir = tempfile::tempdir().unwrap();
    let state = app_state(dir.path(), RecordingDelivery::new(201));
    let app = init_app!(state);

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/subscribe")
            .set_json(subscription())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    assert_eq!(state.store.load().await.unwrap().len(), 1);
}

#[actix_web::test]
async fn test_subscribe_empty_body_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let state = app_state(dir.path(), RecordingDelivery::new(201));
    let app = init_app!(state);

    for body in ["", "{}", "null", "not json"] {
        let req = test::TestRequest::post()
            .uri("/api/subscribe")
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", body);

        let data = test::read_body(resp).await;
        let data: Value = serde_json::from_slice(&data).unwrap();
        assert_eq!(data, json!({ "error": "No subscription data" }));
    }

    assert!(state.store.load().await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_call_with_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let delivery = RecordingDelivery::new(201);
    let state = app_state(dir.path(), delivery.clone());
    let app = init_app!(state);

    let req = test::TestRequest::post().uri("/api/call").to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(resp, json!({ "results": [] }));
    assert!(delivery.payloads().is_empty());
}

#[actix_web::test]
async fn test_call_sends_payload() {
    let dir = tempfile::tempdir().unwrap();
    let delivery = RecordingDelivery::new(201);
    let state = app_state(dir.path(), delivery.clone());
    state.store.save(subscription()).await.unwrap();
    let app = init_app!(state);

    let req = test::TestRequest::post().uri("/api/call").to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(resp, json!({ "results": ["sent"] }));
    assert_eq!(
        delivery.payloads(),
        vec![json!({
            "title": "📢 Mom is calling",
            "body": "How long until you come?",
            "actions": [
                { "action": "1", "title": "1 min" },
                { "action": "5", "title": "5 min" },
                { "action": "10", "title": "10 min" }
            ]
        })]
    );

    let headers = delivery.headers();
    assert_eq!(headers.len(), 1);
    assert_eq!(headers[0].ttl, 60);
    assert_eq!(headers[0].urgency, Urgency::High);
}

#[actix_web::test]
async fn test_call_evicts_gone_subscription() {
    let dir = tempfile::tempdir().unwrap();
    let state = app_state(dir.path(), RecordingDelivery::new(410));
    state.store.save(subscription()).await.unwrap();
    let app = init_app!(state);

    let req = test::TestRequest::post().uri("/api/call").to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;

    let results = resp["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].as_str().unwrap().starts_with("failed: "));
    assert!(state.store.load().await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_call_fails_when_eviction_cannot_be_written() {
    let dir = tempfile::tempdir().unwrap();
    let state = app_state(dir.path(), RecordingDelivery::new(410));
    state.store.save(subscription()).await.unwrap();
    std::fs::create_dir(dir.path().join("subscriptions.json.tmp")).unwrap();
    let app = init_app!(state);

    let req = test::TestRequest::post().uri("/api/call").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(state.store.load().await.unwrap(), vec![subscription()]);
}

#[actix_web::test]
async fn test_call_with_voice_clip() {
    let dir = tempfile::tempdir().unwrap();
    let delivery = RecordingDelivery::new(201);
    let state = app_state(dir.path(), delivery.clone());
    state.store.save(subscription()).await.unwrap();
    let app = init_app!(state);

    let body = voice_clip_body("voice");
    let req = test::TestRequest::post()
        .uri("/api/call")
        .insert_header((
            header::CONTENT_TYPE,
            "multipart/form-data; boundary=BOUNDARY",
        ))
        .set_payload(body)
        .to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp, json!({ "results": ["sent"] }));

    let payloads = delivery.payloads();
    let url = payloads[0]["audioUrl"].as_str().unwrap();
    let name = url.strip_prefix("/static/uploads/").unwrap();

    assert!(name.ends_with(".ogg"));
    assert_eq!(
        std::fs::read(dir.path().join("uploads").join(name)).unwrap(),
        b"voice"
    );
}

#[actix_web::test]
async fn test_call_rejects_oversized_voice_clip() {
    let dir = tempfile::tempdir().unwrap();
    let delivery = RecordingDelivery::new(201);
    let config = Config {
        max_audio_bytes: 4,
        ..config(dir.path())
    };
    let state = AppState::new(State::new(config, delivery.clone()));
    state.store.save(subscription()).await.unwrap();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/call")
        .insert_header((
            header::CONTENT_TYPE,
            "multipart/form-data; boundary=BOUNDARY",
        ))
        .set_payload(voice_clip_body("voice"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(delivery.payloads().is_empty());
    assert!(!dir.path().join("uploads").exists());
}

#[actix_web::test]
async fn test_reply_then_poll_once() {
    let dir = tempfile::tempdir().unwrap();
    let state = app_state(dir.path(), RecordingDelivery::new(201));
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/reply")
        .set_json(json!({ "minutes": 5 }))
        .to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp, json!({ "status": "received" }));

    let req = test::TestRequest::get().uri("/api/poll_reply").to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp, json!({ "message": "I'll be there in 5 minutes." }));

    let req = test::TestRequest::get().uri("/api/poll_reply").to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp, json!({ "message": null }));
}

#[actix_web::test]
async fn test_reply_without_minutes() {
    let dir = tempfile::tempdir().unwrap();
    let state = app_state(dir.path(), RecordingDelivery::new(201));
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/reply")
        .set_json(json!({}))
        .to_request();
    test::call_service(&app, req).await;

    assert_eq!(
        state.mailbox.take_if_present().as_deref(),
        Some("I'll be there in unknown minutes.")
    );
}

#[actix_web::test]
async fn test_reply_invalid_json_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let state = app_state(dir.path(), RecordingDelivery::new(201));
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/reply")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{minutes")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(state.mailbox.take_if_present(), None);
}

#[actix_web::test]
async fn test_index_embeds_public_key() {
    let dir = tempfile::tempdir().unwrap();
    let state = app_state(dir.path(), RecordingDelivery::new(201));
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/").to_request();
    let body = test::call_and_read_body(&app, req).await;
    let page = String::from_utf8(body.to_vec()).unwrap();

    assert!(page.contains(r#"const VAPID_PUBLIC_KEY = "BTestPublicKey";"#));
    assert!(page.contains(r#"content="BTestPublicKey""#));
}

#[actix_web::test]
async fn test_service_worker_is_javascript() {
    let dir = tempfile::tempdir().unwrap();
    let state = app_state(dir.path(), RecordingDelivery::new(201));
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/sw.js").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/javascript"
    );
}
