//! In-process stand-in for the banana slides backend, served by axum on a loopback port.

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, Request, State},
    http::{StatusCode, Uri, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use banana_core::{NoticeKind, Notifier};
use banana_model::Settings;
use serde_json::{Value, json};

use crate::{ApiClient, ClientConfig};

type Shared = Arc<MockState>;

/// Multipart request as received by the mock.
#[derive(Debug, Clone, Default)]
pub struct RecordedForm {
    pub path: String,
    pub texts: Vec<(String, String)>,
    /// `(field, file name)` pairs.
    pub files: Vec<(String, String)>,
}

impl RecordedForm {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Default)]
pub struct MockState {
    requests: Mutex<Vec<String>>,
    forms: Mutex<Vec<RecordedForm>>,
    bodies: Mutex<Vec<(String, Value)>>,
    queries: Mutex<Vec<(String, HashMap<String, String>)>>,
    polls: Mutex<HashMap<String, u32>>,
    settings: Mutex<Option<Value>>,
}

impl MockState {
    /// Every request as `"METHOD /path"`, in arrival order.
    pub fn paths(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn forms(&self) -> Vec<RecordedForm> {
        self.forms.lock().unwrap().clone()
    }

    pub fn last_form(&self) -> RecordedForm {
        self.forms().pop().expect("no multipart request recorded")
    }

    pub fn last_json(&self, path: &str) -> Option<Value> {
        self.bodies
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(p, _)| p == path)
            .map(|(_, body)| body.clone())
    }

    pub fn last_query(&self, path: &str) -> Option<HashMap<String, String>> {
        self.queries
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(p, _)| p == path)
            .map(|(_, q)| q.clone())
    }

    fn record_json(&self, uri: &Uri, body: &Value) {
        self.bodies
            .lock()
            .unwrap()
            .push((uri.path().to_string(), body.clone()));
    }

    fn record_query(&self, uri: &Uri, query: &HashMap<String, String>) {
        self.queries
            .lock()
            .unwrap()
            .push((uri.path().to_string(), query.clone()));
    }

    fn settings(&self) -> Value {
        let mut stored = self.settings.lock().unwrap();
        stored
            .get_or_insert_with(|| serde_json::to_value(Settings::default()).unwrap())
            .clone()
    }
}

pub struct MockServer {
    pub client: ApiClient,
    pub state: Shared,
}

pub async fn spawn() -> MockServer {
    let state: Shared = Arc::new(MockState::default());
    let app = router(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = ClientConfig::new(format!("http://{addr}")).with_timeout(Duration::from_secs(10));
    MockServer {
        client: ApiClient::new(&config).unwrap(),
        state,
    }
}

/// Fresh per-test directory for upload fixtures.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("banana-client-{name}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Notifier collecting notices for assertions.
#[derive(Default)]
pub struct Notices(Mutex<Vec<(String, NoticeKind)>>);

impl Notices {
    pub fn take(&self) -> Vec<(String, NoticeKind)> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

impl Notifier for Notices {
    fn notify(&self, message: &str, kind: NoticeKind) {
        self.0.lock().unwrap().push((message.to_string(), kind));
    }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/projects/{pid}/materials/generate", post(generate_material))
        .route("/api/projects/{pid}/tasks/{tid}", get(task_status))
        .route("/api/settings/test/{service}", post(test_service))
        .route("/api/settings/test/status/{tid}", get(test_status))
        .route("/api/settings", get(get_settings).put(update_settings))
        .route("/api/settings/reset", post(reset_settings))
        .route("/api/materials", get(list_materials))
        .route("/api/materials/upload", post(upload_material))
        .route("/api/materials/associate", post(associate_materials))
        .route("/api/materials/download", post(download_materials))
        .route("/api/materials/{id}", delete(delete_material))
        .route("/api/projects", get(list_projects))
        .route("/api/projects/{id}", put(update_project).delete(delete_project))
        .route("/api/reference-files/upload", post(upload_reference_file))
        .route("/api/reference-files/{id}/associate", post(associate_reference_file))
        .route("/api/reference-files/{id}/parse", post(parse_reference_file))
        .route("/api/user-templates", get(list_templates).post(upload_template))
        .route("/api/user-templates/{id}", delete(delete_template))
        .layer(middleware::from_fn_with_state(state.clone(), record_request))
        .with_state(state)
}

async fn record_request(State(state): State<Shared>, req: Request, next: Next) -> Response {
    state
        .requests
        .lock()
        .unwrap()
        .push(format!("{} {}", req.method(), req.uri().path()));
    next.run(req).await
}

fn ok(data: Value) -> Response {
    Json(json!({ "success": true, "data": data })).into_response()
}

fn fail(status: StatusCode, message: &str) -> Response {
    let body = json!({ "success": false, "error": { "code": "MOCK", "message": message } });
    (status, Json(body)).into_response()
}

async fn read_form(uri: &Uri, mut multipart: Multipart) -> RecordedForm {
    let mut form = RecordedForm {
        path: uri.path().to_string(),
        ..Default::default()
    };
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                field.bytes().await.unwrap();
                form.files.push((name, file_name));
            }
            None => form.texts.push((name, field.text().await.unwrap())),
        }
    }
    form
}

async fn generate_material(
    State(state): State<Shared>,
    Path(_pid): Path<String>,
    uri: Uri,
    multipart: Multipart,
) -> Response {
    let form = read_form(&uri, multipart).await;
    let prompt = form.text("prompt").unwrap_or_default().to_string();
    state.forms.lock().unwrap().push(form);

    if prompt == "reject me" {
        return fail(StatusCode::BAD_REQUEST, "prompt rejected by moderation");
    }
    ok(json!({ "task_id": "mat-1" }))
}

async fn task_status(State(state): State<Shared>, Path((_pid, tid)): Path<(String, String)>) -> Response {
    if tid == "missing" {
        return fail(StatusCode::NOT_FOUND, "task not found");
    }
    let poll = {
        let mut polls = state.polls.lock().unwrap();
        let n = polls.entry(tid.clone()).or_default();
        *n += 1;
        *n
    };

    if poll == 1 {
        ok(json!({
            "task_id": tid,
            "task_type": "GENERATE_MATERIAL",
            "status": "RUNNING",
            "progress": { "total": 1, "completed": 0 }
        }))
    } else {
        ok(json!({
            "task_id": tid,
            "task_type": "GENERATE_MATERIAL",
            "status": "COMPLETED",
            "progress": {
                "total": 1,
                "completed": 1,
                "image_url": format!("/files/materials/{tid}.png")
            }
        }))
    }
}

async fn test_service(
    State(state): State<Shared>,
    Path(service): Path<String>,
    uri: Uri,
    Json(body): Json<Value>,
) -> Response {
    state.record_json(&uri, &body);
    if service == "mineru-pdf" {
        return ok(json!({}));
    }
    ok(json!({ "task_id": format!("test-{service}") }))
}

async fn test_status(Path(_tid): Path<String>) -> Response {
    // Settings tests answer without the envelope.
    Json(json!({ "status": "COMPLETED", "result": { "reply": "pong" } })).into_response()
}

async fn get_settings(State(state): State<Shared>) -> Response {
    ok(state.settings())
}

async fn update_settings(State(state): State<Shared>, uri: Uri, Json(body): Json<Value>) -> Response {
    state.record_json(&uri, &body);
    let mut current = state.settings();
    if let (Some(current), Some(update)) = (current.as_object_mut(), body.as_object()) {
        for (key, value) in update {
            match key.as_str() {
                "api_key" | "mineru_token" => {
                    let len = value.as_str().map(str::len).unwrap_or_default();
                    current.insert(format!("{key}_length"), json!(len));
                }
                _ => {
                    current.insert(key.clone(), value.clone());
                }
            }
        }
    }
    *state.settings.lock().unwrap() = Some(current.clone());
    ok(current)
}

async fn reset_settings(State(state): State<Shared>) -> Response {
    *state.settings.lock().unwrap() = None;
    ok(state.settings())
}

async fn list_materials(
    State(state): State<Shared>,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.record_query(&uri, &query);
    let all = [
        json!({ "id": "m1", "project_id": null, "filename": "m1.png", "url": "/files/materials/m1.png" }),
        json!({ "id": "m2", "project_id": "p1", "url": "/files/materials/m2.png" }),
    ];
    let scope = query.get("project_id").map(String::as_str).unwrap_or("all");
    let materials: Vec<Value> = all
        .into_iter()
        .filter(|m| match scope {
            "all" => true,
            "none" => m["project_id"].is_null(),
            id => m["project_id"] == id,
        })
        .collect();
    ok(json!({ "materials": materials, "count": materials.len() }))
}

async fn upload_material(
    State(state): State<Shared>,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    multipart: Multipart,
) -> Response {
    state.record_query(&uri, &query);
    let form = read_form(&uri, multipart).await;
    let filename = form.files.first().map(|(_, f)| f.clone()).unwrap_or_default();
    state.forms.lock().unwrap().push(form);

    ok(json!({
        "id": "m3",
        "project_id": query.get("project_id"),
        "filename": filename,
        "url": format!("/files/materials/{filename}")
    }))
}

async fn associate_materials(State(state): State<Shared>, uri: Uri, Json(body): Json<Value>) -> Response {
    state.record_json(&uri, &body);
    let count = body["material_urls"].as_array().map(Vec::len).unwrap_or_default();
    let ids: Vec<String> = (1..=count).map(|i| format!("m{i}")).collect();
    ok(json!({ "updated_ids": ids }))
}

async fn download_materials(State(state): State<Shared>, uri: Uri, Json(body): Json<Value>) -> Response {
    state.record_json(&uri, &body);
    ([(header::CONTENT_TYPE, "application/zip")], b"PK\x03\x04mock".to_vec()).into_response()
}

async fn delete_material(Path(id): Path<String>) -> Response {
    if id == "m404" {
        return fail(StatusCode::NOT_FOUND, "material not found");
    }
    Json(json!({ "success": true, "message": "deleted" })).into_response()
}

async fn list_projects(
    State(state): State<Shared>,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.record_query(&uri, &query);
    ok(json!({
        "projects": [
            { "project_id": "p1", "idea_prompt": "Quarterly review", "status": "COMPLETED", "pages": [{}, {}] },
            { "id": "p2", "status": "DRAFT" }
        ],
        "total": 3
    }))
}

async fn update_project(
    State(state): State<Shared>,
    Path(id): Path<String>,
    uri: Uri,
    Json(body): Json<Value>,
) -> Response {
    state.record_json(&uri, &body);
    ok(json!({ "project_id": id, "idea_prompt": body["idea_prompt"] }))
}

async fn delete_project(Path(id): Path<String>) -> Response {
    if id == "p404" {
        return fail(StatusCode::NOT_FOUND, "project not found");
    }
    ok(json!({}))
}

async fn upload_reference_file(State(state): State<Shared>, uri: Uri, multipart: Multipart) -> Response {
    let form = read_form(&uri, multipart).await;
    let filename = form.files.first().map(|(_, f)| f.clone()).unwrap_or_default();
    let project_id = form.text("project_id").map(str::to_string);
    state.forms.lock().unwrap().push(form);

    ok(json!({
        "file": { "id": "f1", "filename": filename, "project_id": project_id, "parse_status": "pending" }
    }))
}

async fn associate_reference_file(
    State(state): State<Shared>,
    Path(id): Path<String>,
    uri: Uri,
    Json(body): Json<Value>,
) -> Response {
    state.record_json(&uri, &body);
    ok(json!({
        "file": { "id": id, "filename": "brief.pdf", "project_id": body["project_id"], "parse_status": "pending" }
    }))
}

async fn parse_reference_file(Path(id): Path<String>) -> Response {
    ok(json!({ "file": { "id": id, "filename": "brief.pdf", "parse_status": "parsing" } }))
}

async fn list_templates() -> Response {
    ok(json!({
        "templates": [
            { "template_id": "t1", "name": "Corporate", "template_image_url": "/files/user-templates/t1.png" }
        ]
    }))
}

async fn upload_template(State(state): State<Shared>, uri: Uri, multipart: Multipart) -> Response {
    let form = read_form(&uri, multipart).await;
    let name = form.text("name").map(str::to_string);
    state.forms.lock().unwrap().push(form);

    ok(json!({
        "template_id": "t2",
        "name": name,
        "template_image_url": "/files/user-templates/t2.png"
    }))
}

async fn delete_template(Path(_id): Path<String>) -> Response {
    ok(json!({}))
}
