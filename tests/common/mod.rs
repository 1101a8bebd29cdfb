//! Mock inventory service for tests: an axum app on an ephemeral port,
//! served from its own thread and runtime so both sync and async tests
//! can use it.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use zip::write::SimpleFileOptions;

#[derive(Clone, Default)]
pub struct MockState {
    items: Arc<Mutex<Vec<Value>>>,
    fail_gets: Arc<AtomicUsize>,
    gets: Arc<AtomicUsize>,
    deletes: Arc<AtomicUsize>,
    restores: Arc<AtomicUsize>,
}

pub struct MockService {
    pub base_url: String,
    state: MockState,
}

impl MockService {
    /// Answer the next `n` item GETs with a 500.
    pub fn fail_next_gets(&self, n: usize) {
        self.state.fail_gets.store(n, Ordering::SeqCst);
    }

    pub fn item_gets(&self) -> usize {
        self.state.gets.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.state.deletes.load(Ordering::SeqCst)
    }

    pub fn restores(&self) -> usize {
        self.state.restores.load(Ordering::SeqCst)
    }

    pub fn item_count(&self) -> usize {
        self.state.items.lock().unwrap().len()
    }
}

/// Workshop items in the service's wire shape, mixing the flat and
/// nested description layouts.
pub fn sample_items() -> Vec<Value> {
    vec![
        json!({
            "id": 1, "category": "Power Tools", "subcategory": "Drills",
            "brand": "Makita", "model": "DF333D", "condition": "good",
            "technical_details": {"description": "12V cordless drill driver", "use_cases": ["drilling", "driving screws"]},
            "location": {"shelf": "Shelf A", "container": "Drawer 1"},
            "image_path": null,
            "date_added": "2024-01-02T03:04:05.123456", "last_modified": "2024-01-03T03:04:05.123456"
        }),
        json!({
            "id": 2, "category": "Electronics", "subcategory": "Soldering",
            "brand": "Hakko, Weller", "model": "FX-888D",
            "technical_description": "Soldering station with spare tips",
            "location": {"shelf": "Shelf B", "container": "Box 3"},
            "date_added": "2024-02-01T10:00:00", "last_modified": "2024-02-01T10:00:00"
        }),
        json!({
            "id": 3, "category": "Hardware", "subcategory": "Fasteners",
            "brand": null, "model": null,
            "technical_details": {"description": "Assorted M3 screws"},
            "location": {"shelf": "Shelf A", "container": null},
            "date_added": "2024-03-01T10:00:00", "last_modified": "2024-03-01T10:00:00"
        }),
        json!({
            "id": 4, "category": "Power Tools", "subcategory": "Heat",
            "brand": "Bosch", "model": "",
            "technical_details": {"description": "Heat gun for shrink tubing"},
            "location": {"shelf": "Shelf B", "container": "Box 3"},
            "date_added": "2024-04-01T10:00:00", "last_modified": "2024-04-01T10:00:00"
        }),
    ]
}

/// A backup archive as the service produces it.
pub fn backup_archive() -> Vec<u8> {
    let data = json!({
        "metadata": {"version": "1.0", "date": "2024-05-01T10:00:00", "type": "inventory_backup"},
        "storage": {"shelves": [{"id": 1, "name": "Shelf A"}, {"id": 2, "name": "Shelf B"}],
                    "containers": [{"id": 1, "shelf_id": 1, "name": "Drawer 1"}], "compartments": []},
        "items": sample_items()
    });
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("data.json", SimpleFileOptions::default())
        .unwrap();
    writer
        .write_all(serde_json::to_string_pretty(&data).unwrap().as_bytes())
        .unwrap();
    writer
        .start_file("images/drill.jpg", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"\xff\xd8\xff").unwrap();
    writer.finish().unwrap().into_inner()
}

pub fn start() -> MockService {
    start_with(sample_items())
}

pub fn start_with(items: Vec<Value>) -> MockService {
    let state = MockState {
        items: Arc::new(Mutex::new(items)),
        ..MockState::default()
    };
    let app = Router::new()
        .route("/api/inventory/items", get(list_items))
        .route("/api/inventory/items/{id}", delete(delete_item))
        .route("/api/storage/level1", get(storage))
        .route("/api/data/backup", post(backup))
        .route("/api/data/restore", post(restore))
        .route("/api/rag/query", post(ask))
        .with_state(state.clone());

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });

    MockService {
        base_url: format!("http://{}", addr),
        state,
    }
}

/// A base URL nothing is listening on.
pub fn dead_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

async fn list_items(State(state): State<MockState>) -> impl IntoResponse {
    state.gets.fetch_add(1, Ordering::SeqCst);
    let failing = state
        .fail_gets
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if failing {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "database is locked"})),
        );
    }
    let items = state.items.lock().unwrap().clone();
    (StatusCode::OK, Json(json!({ "items": items })))
}

async fn delete_item(State(state): State<MockState>, Path(id): Path<i64>) -> impl IntoResponse {
    state.deletes.fetch_add(1, Ordering::SeqCst);
    let mut items = state.items.lock().unwrap();
    let before = items.len();
    items.retain(|item| item["id"].as_i64() != Some(id));
    if items.len() == before {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Item not found"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({"message": "Item deleted successfully"})),
    )
}

async fn storage() -> Json<Value> {
    Json(json!([
        {
            "level1": {"id": 1, "name": "Shelf A", "description": "Left wall"},
            "level2": [
                {"id": 1, "name": "Drawer 1", "containerType": "drawer", "description": null},
                {"id": 2, "name": "Drawer 2", "containerType": "drawer", "description": null}
            ]
        },
        {
            "level1": {"id": 2, "name": "Shelf B", "description": null},
            "level2": [{"id": 3, "name": "Box 3", "containerType": "box", "description": "Clear lid"}]
        }
    ]))
}

async fn backup() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/zip")], backup_archive())
}

async fn restore(State(state): State<MockState>, body: Bytes) -> impl IntoResponse {
    let has_data = body.windows(b"data.json".len()).any(|w| w == b"data.json");
    let has_field = body
        .windows(b"name=\"backup\"".len())
        .any(|w| w == b"name=\"backup\"");
    if !has_field {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "No backup file provided"})),
        );
    }
    if !has_data {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Invalid backup file: missing data.json"})),
        );
    }
    state.restores.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::OK,
        Json(json!({"message": "Backup restored successfully"})),
    )
}

async fn ask(Json(body): Json<Value>) -> Json<Value> {
    let question = body["query"].as_str().unwrap_or_default();
    if question.to_lowercase().contains("drill") {
        Json(json!({
            "answer": "The cordless drill is on Shelf A, Drawer 1.",
            "items": [{"id": 1, "category": "Power Tools", "brand": "Makita", "model": "DF333D"}]
        }))
    } else {
        Json(json!({"answer": "I could not find anything matching that."}))
    }
}
