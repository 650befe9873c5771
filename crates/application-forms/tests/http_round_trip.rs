use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use application_forms::forms::{ApplicationForm, ApplicationFormClient, ApplicationFormId};
use application_forms::resource::{ReqwestTransport, TransportError};
use application_forms::{ClientError, ServerDateConverter};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde_json::{json, Value};
use url::Url;

#[derive(Default, Clone)]
struct FormStore {
    records: Arc<Mutex<BTreeMap<i64, Value>>>,
    sequence: Arc<AtomicI64>,
}

async fn list_forms(State(store): State<FormStore>) -> Json<Vec<Value>> {
    let guard = store.records.lock().expect("store mutex poisoned");
    Json(guard.values().cloned().collect())
}

async fn create_form(State(store): State<FormStore>, Json(mut body): Json<Value>) -> Response {
    let id = store.sequence.fetch_add(1, Ordering::Relaxed) + 1;
    body["id"] = json!(id);
    store
        .records
        .lock()
        .expect("store mutex poisoned")
        .insert(id, body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn fetch_form(State(store): State<FormStore>, Path(id): Path<i64>) -> Response {
    let guard = store.records.lock().expect("store mutex poisoned");
    match guard.get(&id) {
        Some(record) => Json(record.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"title": "Not Found"}))).into_response(),
    }
}

async fn replace_form(
    State(store): State<FormStore>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut guard = store.records.lock().expect("store mutex poisoned");
    if !guard.contains_key(&id) {
        return StatusCode::NOT_FOUND.into_response();
    }
    guard.insert(id, body.clone());
    Json(body).into_response()
}

async fn remove_form(State(store): State<FormStore>, Path(id): Path<i64>) -> StatusCode {
    store
        .records
        .lock()
        .expect("store mutex poisoned")
        .remove(&id);
    StatusCode::OK
}

async fn search_forms(
    State(store): State<FormStore>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Vec<Value>> {
    let needle = params.get("query").cloned().unwrap_or_default();
    let guard = store.records.lock().expect("store mutex poisoned");
    Json(
        guard
            .values()
            .filter(|record| {
                record["name"]
                    .as_str()
                    .map(|name| name.contains(&needle))
                    .unwrap_or(false)
            })
            .cloned()
            .collect(),
    )
}

async fn spawn_backend() -> Url {
    let store = FormStore::default();
    let app = Router::new()
        .route("/api/application-forms", get(list_forms).post(create_form))
        .route(
            "/api/application-forms/:id",
            get(fetch_form).put(replace_form).delete(remove_form),
        )
        .route("/api/_search/application-forms", get(search_forms))
        .with_state(store);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server runs");
    });

    Url::parse(&format!("http://{addr}/")).expect("valid base url")
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

#[tokio::test]
async fn full_lifecycle_against_http_backend() {
    let base_url = spawn_backend().await;
    let client = ApplicationFormClient::new(
        Arc::new(ReqwestTransport::new(base_url)),
        Arc::new(ServerDateConverter::default()),
    );

    let draft = ApplicationForm::new()
        .with_dob(date(2001, 9, 11))
        .with_field("name", "Ada Lovelace")
        .with_field("competition", "CodeFest");
    let created = client
        .save(&draft)
        .await
        .expect("create succeeds")
        .expect("created record returned");
    let id = created
        .id()
        .and_then(Value::as_i64)
        .map(ApplicationFormId)
        .expect("server assigned an id");
    assert_eq!(created.dob(), Some(&json!("2001-09-11")));
    assert!(draft.id.is_none(), "caller's draft is not touched");

    let fetched = client
        .get(id)
        .await
        .expect("get succeeds")
        .expect("record exists");
    assert_eq!(fetched.dob, Some(date(2001, 9, 11)));
    assert_eq!(fetched.field("competition"), Some(&json!("CodeFest")));

    let mut edited = fetched.clone();
    edited.dob = Some(date(2001, 9, 12));
    client.update(&edited).await.expect("update succeeds");

    let listed = client.list(&[]).await.expect("list succeeds");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].dob(), Some(&json!("2001-09-12")));

    let hits = client.search("Ada", &[]).await.expect("search succeeds");
    assert_eq!(hits.len(), 1);
    let misses = client.search("Grace", &[]).await.expect("search succeeds");
    assert!(misses.is_empty());

    client.delete(id).await.expect("delete succeeds");
    assert!(client.list(&[]).await.expect("list succeeds").is_empty());
}

#[tokio::test]
async fn missing_records_surface_status_errors() {
    let base_url = spawn_backend().await;
    let client = ApplicationFormClient::new(
        Arc::new(ReqwestTransport::new(base_url)),
        Arc::new(ServerDateConverter::default()),
    );

    match client.get(ApplicationFormId(999)).await {
        Err(ClientError::Transport(TransportError::Status { status, body })) => {
            assert_eq!(status, 404);
            assert!(body.contains("Not Found"));
        }
        other => panic!("expected a 404 status error, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_backend_is_a_request_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let client = ApplicationFormClient::new(
        Arc::new(ReqwestTransport::new(
            Url::parse(&format!("http://{addr}/")).expect("valid base url"),
        )),
        Arc::new(ServerDateConverter::default()),
    );

    let result = client.list(&[]).await;

    assert!(matches!(
        result,
        Err(ClientError::Transport(TransportError::Request(_)))
    ));
}
