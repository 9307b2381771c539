use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Local, TimeZone};
use clap::Parser;
use collector::{
    client::HttpCameraApi,
    collector::Collector,
    config::{CollectorArgs, CollectorConfig},
    error::CollectorError,
    snapshot::SnapshotWriter,
};
use serde_json::{json, Value};
use std::{
    collections::HashMap,
    net::SocketAddr,
    path::Path,
    sync::{Arc, Mutex},
};
use tokio::{net::TcpListener, task::JoinHandle};

const SESSION: &str = "7d1f0c2e-session";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SeenRequest {
    query_limit: usize,
    query_offset: usize,
    header_limit: usize,
    header_offset: usize,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum LoginMode {
    Accept,
    OmitSession,
}

struct FakeVsaas {
    cameras: Mutex<Vec<Value>>,
    requests: Mutex<Vec<SeenRequest>>,
    login_mode: LoginMode,
    fail_at_offset: Option<usize>,
    malformed: bool,
}

impl FakeVsaas {
    fn with_cameras(total: usize) -> Self {
        Self {
            cameras: Mutex::new((0..total).map(camera).collect()),
            requests: Mutex::new(Vec::new()),
            login_mode: LoginMode::Accept,
            fail_at_offset: None,
            malformed: false,
        }
    }

    fn seen(&self) -> Vec<SeenRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Every tenth camera (index 5, 15, ...) has no stream status, every fourth is down.
fn camera(index: usize) -> Value {
    if index % 10 == 5 {
        return json!({ "name": format!("cam-{index}"), "title": "never started" });
    }
    let alive = index % 4 != 0;
    let mut status = json!({ "alive": alive, "name": format!("cam-{index}") });
    if !alive {
        status["source_error"] = json!("connection_refused");
    }
    json!({ "name": format!("cam-{index}"), "stream_status": status })
}

fn expected_offline(total: usize) -> usize {
    (0..total).filter(|i| i % 10 == 5 || i % 4 == 0).count()
}

fn header_usize(headers: &HeaderMap, name: &str) -> usize {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(usize::MAX)
}

async fn login(State(state): State<Arc<FakeVsaas>>, Json(body): Json<Value>) -> Response {
    if body["login"] != "operator" || body["password"] != "secret" {
        return (StatusCode::FORBIDDEN, Json(json!({ "error": "bad_credentials" }))).into_response();
    }
    match state.login_mode {
        LoginMode::Accept => Json(json!({ "session": SESSION, "user": "operator" })).into_response(),
        LoginMode::OmitSession => Json(json!({ "user": "operator" })).into_response(),
    }
}

async fn cameras(
    State(state): State<Arc<FakeVsaas>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if headers.get("x-vsaas-session").and_then(|v| v.to_str().ok()) != Some(SESSION) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let limit: usize = query.get("limit").and_then(|v| v.parse().ok()).unwrap_or(0);
    let offset: usize = query.get("offset").and_then(|v| v.parse().ok()).unwrap_or(0);
    state.requests.lock().unwrap().push(SeenRequest {
        query_limit: limit,
        query_offset: offset,
        header_limit: header_usize(&headers, "x-page-limit"),
        header_offset: header_usize(&headers, "x-page-offset"),
    });

    if state.fail_at_offset == Some(offset) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response();
    }
    if state.malformed {
        return Json(json!({ "error": "unexpected" })).into_response();
    }

    let page: Vec<Value> = state
        .cameras
        .lock()
        .unwrap()
        .iter()
        .skip(offset)
        .take(limit)
        .cloned()
        .collect();
    Json(page).into_response()
}

async fn spawn_vsaas(state: Arc<FakeVsaas>) -> Result<(SocketAddr, JoinHandle<()>)> {
    let router = Router::new()
        .route("/vsaas/api/v2/auth/login", post(login))
        .route("/vsaas/api/v2/cameras", get(cameras))
        .with_state(state);

    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let addr = listener.local_addr()?;
    let handle = tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .await
            .expect("server failed");
    });
    Ok((addr, handle))
}

fn collector_for(addr: SocketAddr, password: &str, page_limit: usize, out: &Path) -> Result<Collector<HttpCameraApi>> {
    let args = CollectorArgs::try_parse_from([
        "collect-inactive-cameras".to_string(),
        "--base-url".to_string(),
        format!("http://{addr}/vsaas/api/v2"),
        "--login".to_string(),
        "operator".to_string(),
        "--password".to_string(),
        password.to_string(),
        "--page-limit".to_string(),
        page_limit.to_string(),
        "--output-dir".to_string(),
        out.display().to_string(),
        "--request-timeout-secs".to_string(),
        "5".to_string(),
    ])?;
    let config = CollectorConfig::from_args(args)?;
    let api = HttpCameraApi::new(&config)?;
    Ok(Collector::new(
        api,
        config.credentials.clone(),
        config.page_limit,
        SnapshotWriter::new(config.output_dir.clone()),
    ))
}

fn captured_at() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 7, 14, 8, 30, 0).unwrap()
}

fn read_json(path: &Path) -> Value {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

#[tokio::test]
async fn collects_all_pages_and_writes_snapshot() -> Result<()> {
    let _ = tracing_subscriber::fmt::try_init();

    let state = Arc::new(FakeVsaas::with_cameras(237));
    let (addr, server) = spawn_vsaas(state.clone()).await?;
    let dir = tempfile::tempdir()?;
    let out = dir.path().join("data_collection");

    let outcome = collector_for(addr, "secret", 100, &out)?.run_at(captured_at()).await?;

    let seen = state.seen();
    assert_eq!(seen.len(), 3);
    for (i, request) in seen.iter().enumerate() {
        assert_eq!(request.query_limit, 100);
        assert_eq!(request.header_limit, 100);
        assert_eq!(request.query_offset, i * 100);
        assert_eq!(request.header_offset, i * 100);
    }

    assert_eq!(outcome.path, out.join("inactive_cameras_14-07-2024.json"));
    let snapshot = read_json(&outcome.path);
    let offline = expected_offline(237);

    assert_eq!(snapshot["total_cameras"], 237);
    assert_eq!(snapshot["offline_count"], offline);
    assert_eq!(snapshot["online_count"], 237 - offline);
    assert_eq!(snapshot["offline_cameras"].as_array().unwrap().len(), offline);
    assert!(snapshot["timestamp"].as_str().unwrap().starts_with("2024-07-14T08:30:00"));

    assert_eq!(
        snapshot["offline_cameras"][0],
        json!({ "name": "cam-0", "alive": false, "source_error": "connection_refused" })
    );
    assert_eq!(
        snapshot["offline_cameras"][2],
        json!({ "name": "N/A", "alive": "N/A", "source_error": "None" })
    );

    server.abort();
    Ok(())
}

#[tokio::test]
async fn exact_multiple_stops_on_empty_page() -> Result<()> {
    let state = Arc::new(FakeVsaas::with_cameras(200));
    let (addr, server) = spawn_vsaas(state.clone()).await?;
    let dir = tempfile::tempdir()?;

    let outcome = collector_for(addr, "secret", 100, dir.path())?.run_at(captured_at()).await?;

    let offsets: Vec<_> = state.seen().iter().map(|r| r.query_offset).collect();
    assert_eq!(offsets, vec![0, 100, 200]);
    assert_eq!(outcome.report.total_cameras, 200);

    server.abort();
    Ok(())
}

#[tokio::test]
async fn empty_inventory_still_writes_snapshot() -> Result<()> {
    let state = Arc::new(FakeVsaas::with_cameras(0));
    let (addr, server) = spawn_vsaas(state.clone()).await?;
    let dir = tempfile::tempdir()?;

    let outcome = collector_for(addr, "secret", 100, dir.path())?.run_at(captured_at()).await?;

    assert_eq!(state.seen().len(), 1);
    let snapshot = read_json(&outcome.path);
    assert_eq!(snapshot["total_cameras"], 0);
    assert_eq!(snapshot["online_count"], 0);
    assert_eq!(snapshot["offline_count"], 0);
    assert_eq!(snapshot["offline_cameras"], json!([]));

    server.abort();
    Ok(())
}

#[tokio::test]
async fn rejected_login_aborts_before_listing() -> Result<()> {
    let state = Arc::new(FakeVsaas::with_cameras(10));
    let (addr, server) = spawn_vsaas(state.clone()).await?;
    let dir = tempfile::tempdir()?;
    let out = dir.path().join("data_collection");

    let err = collector_for(addr, "wrong", 100, &out)?
        .run_at(captured_at())
        .await
        .unwrap_err();

    assert!(matches!(err, CollectorError::Authentication { .. }));
    assert!(state.seen().is_empty());
    assert!(!out.exists());

    server.abort();
    Ok(())
}

#[tokio::test]
async fn login_without_session_field_is_fatal() -> Result<()> {
    let state = Arc::new(FakeVsaas {
        login_mode: LoginMode::OmitSession,
        ..FakeVsaas::with_cameras(10)
    });
    let (addr, server) = spawn_vsaas(state.clone()).await?;
    let dir = tempfile::tempdir()?;

    let err = collector_for(addr, "secret", 100, dir.path())?
        .run_at(captured_at())
        .await
        .unwrap_err();

    assert!(matches!(err, CollectorError::Authentication { source: None, .. }));
    assert!(state.seen().is_empty());

    server.abort();
    Ok(())
}

#[tokio::test]
async fn failing_page_discards_partial_data() -> Result<()> {
    let state = Arc::new(FakeVsaas {
        fail_at_offset: Some(100),
        ..FakeVsaas::with_cameras(250)
    });
    let (addr, server) = spawn_vsaas(state.clone()).await?;
    let dir = tempfile::tempdir()?;
    let out = dir.path().join("data_collection");

    let err = collector_for(addr, "secret", 100, &out)?
        .run_at(captured_at())
        .await
        .unwrap_err();

    assert!(matches!(err, CollectorError::PageFetch { offset: 100, .. }));
    assert_eq!(state.seen().len(), 2);
    assert!(!out.exists());

    server.abort();
    Ok(())
}

#[tokio::test]
async fn non_list_body_is_fatal() -> Result<()> {
    let state = Arc::new(FakeVsaas {
        malformed: true,
        ..FakeVsaas::with_cameras(5)
    });
    let (addr, server) = spawn_vsaas(state.clone()).await?;
    let dir = tempfile::tempdir()?;
    let out = dir.path().join("data_collection");

    let err = collector_for(addr, "secret", 100, &out)?
        .run_at(captured_at())
        .await
        .unwrap_err();

    assert!(matches!(err, CollectorError::MalformedPage { offset: 0, .. }));
    assert!(!out.exists());

    server.abort();
    Ok(())
}

#[tokio::test]
async fn second_run_same_day_overwrites_snapshot() -> Result<()> {
    let state = Arc::new(FakeVsaas::with_cameras(40));
    let (addr, server) = spawn_vsaas(state.clone()).await?;
    let dir = tempfile::tempdir()?;

    let collector = collector_for(addr, "secret", 25, dir.path())?;
    let first = collector.run_at(captured_at()).await?;

    state.cameras.lock().unwrap().truncate(12);
    let later = Local.with_ymd_and_hms(2024, 7, 14, 20, 0, 0).unwrap();
    let second = collector.run_at(later).await?;

    assert_eq!(first.path, second.path);
    assert_eq!(std::fs::read_dir(dir.path())?.count(), 1);

    let snapshot = read_json(&second.path);
    assert_eq!(snapshot["total_cameras"], 12);
    assert_eq!(snapshot["offline_count"], expected_offline(12));
    assert!(snapshot["timestamp"].as_str().unwrap().starts_with("2024-07-14T20:00:00"));

    server.abort();
    Ok(())
}
