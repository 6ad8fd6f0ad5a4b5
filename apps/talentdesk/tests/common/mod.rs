//! Minimal candidate backend served by axum on an ephemeral port.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use serde_json::{json, Map, Value};

pub const TOKEN: &str = "good-token";
pub const EXTRACTED_TEXT: &str =
    "John A. Smith\nSenior Engineer\njohn.smith@example.com\n+91 98765 43210";

#[derive(Default)]
pub struct Recorded {
    pub hits: Vec<String>,
    pub last_query: HashMap<String, String>,
    pub last_body: Option<Value>,
    pub form: Vec<(String, String)>,
    /// (part name, file name, byte length)
    pub files: Vec<(String, String, usize)>,
}

pub struct MockBackend {
    pub records: Mutex<Vec<Value>>,
    pub recorded: Mutex<Recorded>,
}

impl MockBackend {
    fn hit(&self, what: &str) {
        self.recorded.lock().unwrap().hits.push(what.to_string());
    }

    pub fn hits(&self) -> Vec<String> {
        self.recorded.lock().unwrap().hits.clone()
    }
}

pub fn record(id: &str, name: &str, status: &str) -> Value {
    json!({
        "_id": id,
        "name": name,
        "email": format!("{id}@example.com"),
        "phone": "9876543210",
        "jobId": { "_id": "j1", "title": "Backend Engineer" },
        "clientId": "cl1",
        "status": status,
        "remarks": "",
        "resume_url": format!("/uploads/{id}.pdf"),
        "createdAt": "2024-03-01T10:00:00Z",
        "total_experience": "4 years",
    })
}

/// Starts the backend and returns its base URL.
pub async fn spawn(records: Vec<Value>) -> (String, Arc<MockBackend>) {
    let mock = Arc::new(MockBackend {
        records: Mutex::new(records),
        recorded: Mutex::new(Recorded::default()),
    });

    let app = Router::new()
        .route("/api/hr/candidates", get(list).post(create))
        .route("/api/hr/candidates/:id", put(edit))
        .route("/api/hr/candidates/:id/status", patch(set_status))
        .route("/api/hr/candidates/:id/remarks", put(set_remarks))
        .route("/api/hr/upload-resume", post(upload))
        .with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), mock)
}

fn authorize(headers: &HeaderMap) -> Result<(), Response> {
    let expected = format!("Bearer {TOKEN}");
    let given = headers.get("authorization").and_then(|v| v.to_str().ok());
    if given == Some(expected.as_str()) {
        Ok(())
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid or expired token" })),
        )
            .into_response())
    }
}

fn not_found(id: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": format!("Candidate {id} not found") })),
    )
        .into_response()
}

async fn list(
    State(mock): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    mock.hit("GET /candidates");
    if let Err(denied) = authorize(&headers) {
        return denied;
    }
    mock.recorded.lock().unwrap().last_query = params.clone();

    let scope = params.get("scope").cloned().unwrap_or_default();
    if scope == "job:broken" {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "database unavailable" })),
        )
            .into_response();
    }

    let limit: usize = params.get("limit").and_then(|v| v.parse().ok()).unwrap_or(10);
    let page: usize = params.get("page").and_then(|v| v.parse().ok()).unwrap_or(1);
    let term = params.get("q").map(|q| q.to_lowercase());

    let records = mock.records.lock().unwrap();
    let matching: Vec<Value> = records
        .iter()
        .filter(|c| match scope.strip_prefix("job:") {
            Some(id) => c["jobId"]["_id"] == id,
            None => true,
        })
        .filter(|c| params.get("status").map_or(true, |s| c["status"] == s.as_str()))
        .filter(|c| {
            term.as_ref().map_or(true, |t| {
                c["name"]
                    .as_str()
                    .map_or(false, |n| n.to_lowercase().contains(t.as_str()))
            })
        })
        .cloned()
        .collect();

    let total = matching.len();
    let total_pages = total.div_ceil(limit.max(1)).max(1);
    let candidates: Vec<Value> = matching
        .into_iter()
        .skip((page - 1) * limit)
        .take(limit)
        .collect();

    Json(json!({
        "candidates": candidates,
        "currentPage": page,
        "totalPages": total_pages,
        "totalCandidates": total,
    }))
    .into_response()
}

fn update_record(mock: &MockBackend, id: &str, body: &Value) -> Response {
    mock.recorded.lock().unwrap().last_body = Some(body.clone());
    let mut records = mock.records.lock().unwrap();
    let Some(record) = records.iter_mut().find(|c| c["_id"] == id) else {
        return not_found(id);
    };
    if let (Some(target), Some(fields)) = (record.as_object_mut(), body.as_object()) {
        for (k, v) in fields {
            target.insert(k.clone(), v.clone());
        }
    }
    Json(record.clone()).into_response()
}

async fn set_status(
    State(mock): State<Arc<MockBackend>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    mock.hit("PATCH /candidates/:id/status");
    if let Err(denied) = authorize(&headers) {
        return denied;
    }
    update_record(&mock, &id, &body)
}

async fn set_remarks(
    State(mock): State<Arc<MockBackend>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    mock.hit("PUT /candidates/:id/remarks");
    if let Err(denied) = authorize(&headers) {
        return denied;
    }
    update_record(&mock, &id, &body)
}

async fn edit(
    State(mock): State<Arc<MockBackend>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    mock.hit("PUT /candidates/:id");
    if let Err(denied) = authorize(&headers) {
        return denied;
    }
    update_record(&mock, &id, &body)
}

async fn read_multipart(mock: &MockBackend, mut multipart: Multipart) -> Map<String, Value> {
    let mut fields = Map::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let bytes = field.bytes().await.unwrap();
                mock.recorded
                    .lock()
                    .unwrap()
                    .files
                    .push((name, file_name, bytes.len()));
            }
            None => {
                let value = field.text().await.unwrap();
                mock.recorded
                    .lock()
                    .unwrap()
                    .form
                    .push((name.clone(), value.clone()));
                fields.insert(name, Value::String(value));
            }
        }
    }
    fields
}

async fn create(
    State(mock): State<Arc<MockBackend>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    mock.hit("POST /candidates");
    if let Err(denied) = authorize(&headers) {
        return denied;
    }
    let fields = read_multipart(&mock, multipart).await;
    let text = |key: &str| fields.get(key).and_then(Value::as_str).unwrap_or("").to_string();

    let mut records = mock.records.lock().unwrap();
    let created = json!({
        "_id": format!("new{}", records.len() + 1),
        "name": format!("{} {}", text("firstName"), text("lastName")).trim(),
        "email": text("email"),
        "phone": text("phone"),
        "jobId": { "_id": "j1", "title": text("jobTitle") },
        "clientId": text("clientId"),
        "status": fields.get("status").cloned().unwrap_or(json!("L1 Selected")),
        "remarks": text("remarks"),
    });
    records.insert(0, created.clone());
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn upload(
    State(mock): State<Arc<MockBackend>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    mock.hit("POST /upload-resume");
    if let Err(denied) = authorize(&headers) {
        return denied;
    }
    read_multipart(&mock, multipart).await;
    Json(json!({
        "message": "Resume uploaded",
        "extractedText": EXTRACTED_TEXT,
    }))
    .into_response()
}
