use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{DateTime, Duration, FixedOffset};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use leap::focus::FocusSession;
use leap::state::AppState;
use leap::store::MemoryStore;

fn noon() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2025-03-14T12:00:00+01:00").expect("timestamp")
}

fn state() -> Arc<AppState> {
    Arc::new(AppState::new(MemoryStore::new()).pinned_at(noon()))
}

fn app() -> Router {
    leap::api(state())
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn create_block(app: &Router, title: &str, start: &str, end: &str) -> String {
    let (status, block) = call(
        app,
        "POST",
        "/blocks",
        Some(json!({ "title": title, "startTime": start, "endTime": end, "color": "blue" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{block}");
    block["id"].as_str().expect("block id").to_string()
}

async fn create_task(app: &Router, title: &str, priority: &str, block_id: &str) -> Value {
    let (status, task) = call(
        app,
        "POST",
        "/tasks",
        Some(json!({
            "title": title,
            "priority": priority,
            "estimatedHours": 1.0,
            "blockId": block_id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{task}");
    task
}

#[tokio::test]
async fn tasks_chain_and_frog_follows_active_block() {
    let app = app();
    let work = create_block(&app, "Work", "09:00", "17:00").await;

    let report = create_task(&app, "Write report", "A", &work).await;
    let email = create_task(&app, "Email boss", "A", &work).await;
    assert_eq!(report["startHour"], json!(9.0));
    assert_eq!(email["startHour"], json!(10.0));
    assert_eq!(email["order"], json!(2));

    let (status, proposal) = call(&app, "GET", &format!("/blocks/{work}/proposal"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(proposal["startHour"], json!(11.0));

    let (_, plan) = call(&app, "GET", "/plan/now?at=10:00", None).await;
    assert_eq!(plan["activeBlock"]["id"], json!(work));
    assert_eq!(plan["frog"]["title"], json!("Write report"));
    assert_eq!(plan["otherTasks"].as_array().map(Vec::len), Some(1));
    assert_eq!(plan["clock"], json!("10:00"));

    let (_, plan) = call(&app, "GET", "/plan/now?at=20:00", None).await;
    assert_eq!(plan["activeBlock"], Value::Null);
    assert_eq!(plan["frog"], Value::Null);
}

#[tokio::test]
async fn completing_the_frog_marks_the_day() {
    let app = app();
    let work = create_block(&app, "Work", "09:00", "17:00").await;
    let report = create_task(&app, "Write report", "A", &work).await;
    let email = create_task(&app, "Email boss", "A", &work).await;

    let uri = format!("/tasks/{}/complete?at=10:00", report["id"].as_str().unwrap());
    let (status, done) = call(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::OK, "{done}");
    assert_eq!(done["wasFrog"], json!(true));
    assert_eq!(done["today"]["frogEaten"], json!(true));
    assert_eq!(done["today"]["date"], json!("2025-03-14"));

    let uri = format!("/tasks/{}/complete?at=10:00", email["id"].as_str().unwrap());
    let (_, done) = call(&app, "POST", &uri, None).await;
    assert_eq!(done["today"]["tasksCompleted"], json!(2));
    assert_eq!(done["today"]["frogEaten"], json!(true));

    let (status, _) = call(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, stats) = call(&app, "GET", "/stats", None).await;
    assert_eq!(stats.as_array().map(Vec::len), Some(1));
    assert_eq!(stats[0]["tasksCompleted"], json!(2));

    let (_, heatmap) = call(&app, "GET", "/stats/heatmap", None).await;
    let days = heatmap.as_array().expect("heatmap");
    assert_eq!(days.len(), 365);
    let frog_days: Vec<_> = days.iter().filter(|d| d["status"] == json!("frog_eaten")).collect();
    assert_eq!(frog_days.len(), 1);
    assert_eq!(frog_days[0]["date"], json!("2025-03-14"));
}

#[tokio::test]
async fn invalid_input_is_rejected() {
    let app = app();
    let work = create_block(&app, "Work", "09:00", "17:00").await;

    let (status, body) = call(
        &app,
        "POST",
        "/tasks",
        Some(json!({ "title": "   ", "priority": "A", "blockId": work })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("title required"));

    let (status, _) = call(
        &app,
        "POST",
        "/tasks",
        Some(json!({ "title": "x", "priority": "A", "blockId": uuid::Uuid::new_v4() })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &app,
        "POST",
        "/blocks",
        Some(json!({ "title": "Bad", "startTime": "25:00", "endTime": "26:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let task = create_task(&app, "Gym", "C", &work).await;
    let uri = format!("/tasks/{}/fail", task["id"].as_str().unwrap());
    let (status, _) = call(&app, "POST", &uri, Some(json!({ "reason": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, failed) = call(&app, "POST", &uri, Some(json!({ "reason": "too tired" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(failed["failureReason"], json!("too tired"));
    assert_eq!(failed["completed"], json!(false));

    let (status, _) = call(&app, "GET", "/plan/now?at=noon", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reorder_and_block_deletion() {
    let app = app();
    let work = create_block(&app, "Work", "09:00", "17:00").await;
    let first = create_task(&app, "first", "B", &work).await;
    create_task(&app, "second", "B", &work).await;

    let uri = format!("/tasks/{}/move", first["id"].as_str().unwrap());
    let (status, tasks) = call(&app, "POST", &uri, Some(json!({ "direction": "down" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tasks[0]["title"], json!("second"));
    assert_eq!(tasks[1]["title"], json!("first"));

    let (status, _) = call(&app, "DELETE", &format!("/blocks/{work}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, tasks) = call(&app, "GET", "/tasks", None).await;
    let tasks = tasks.as_array().expect("tasks");
    assert_eq!(tasks.len(), 2);
    assert!(tasks.iter().all(|t| t.get("blockId").is_none()));

    let (_, plan) = call(&app, "GET", "/plan/now?at=10:00", None).await;
    assert_eq!(plan["activeBlock"], Value::Null);
    assert_eq!(plan["contextCount"], json!(2));
    assert_eq!(plan["frog"]["title"], json!("second"));
}

#[tokio::test]
async fn focus_session_finishes_into_failure_or_completion() {
    let app = app();
    let work = create_block(&app, "Work", "09:00", "17:00").await;
    let task = create_task(&app, "Write report", "A", &work).await;
    let id = task["id"].as_str().unwrap().to_string();

    let (status, _) = call(&app, "POST", "/focus/finish", Some(json!({ "success": true }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, session) = call(&app, "POST", &format!("/focus/start/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["session"]["durationSecs"], json!(3600));

    let (status, _) = call(&app, "POST", "/focus/finish", Some(json!({ "success": false }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, running) = call(&app, "GET", "/focus", None).await;
    assert_eq!(running["session"]["taskId"], json!(id));

    let (status, finished) = call(
        &app,
        "POST",
        "/focus/finish?at=10:00",
        Some(json!({ "success": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(finished["wasFrog"], json!(true));

    let (_, running) = call(&app, "GET", "/focus", None).await;
    assert_eq!(running, Value::Null);
}

#[tokio::test]
async fn oversized_estimate_is_rejected() {
    let app = app();
    let work = create_block(&app, "Work", "09:00", "17:00").await;

    let (status, body) = call(
        &app,
        "POST",
        "/tasks",
        Some(json!({ "title": "Forever", "priority": "A", "estimatedHours": 1e13, "blockId": work })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (_, tasks) = call(&app, "GET", "/tasks", None).await;
    assert_eq!(tasks.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn finishing_after_the_timer_ran_out_still_completes() {
    let state = state();
    let app = leap::api(state.clone());
    let work = create_block(&app, "Work", "09:00", "17:00").await;
    let task = create_task(&app, "Write report", "A", &work).await;
    let id: Uuid = task["id"].as_str().expect("task id").parse().expect("uuid");

    state.set_focus(Some(FocusSession {
        task_id: id,
        started_at: noon() - Duration::hours(2),
        duration_secs: 3600,
    }));

    let (_, running) = call(&app, "GET", "/focus", None).await;
    assert_eq!(running["remainingSecs"], json!(0));
    assert_eq!(running["elapsed"], json!(true));

    let (status, finished) = call(
        &app,
        "POST",
        "/focus/finish?at=10:00",
        Some(json!({ "success": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{finished}");
    assert_eq!(finished["wasFrog"], json!(true));

    let (_, tasks) = call(&app, "GET", "/tasks", None).await;
    assert_eq!(tasks[0]["completed"], json!(true));
    let (_, running) = call(&app, "GET", "/focus", None).await;
    assert_eq!(running, Value::Null);
}
