// tests/api_tests.rs

use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use ally_backend::{
    build_router,
    config::{AppState, Settings},
    db,
};

struct TestApp {
    dir: TempDir,
    router: Router,
    state: AppState,
}

impl TestApp {
    async fn new() -> Self {
        Self::in_dir(tempfile::tempdir().unwrap()).await
    }

    /// Starts the server on whatever database files `dir` already holds.
    async fn in_dir(dir: TempDir) -> Self {
        let settings = Settings {
            main_db_file: dir.path().join("prodigiAllyDatabase.db"),
            tracking_db_file: dir.path().join("trackingData.db"),
            missing_prod_types_file: dir.path().join("missing_prodTypes.txt"),
            ..Settings::default()
        };
        let (state, _worker) = AppState::new(settings).await.unwrap();
        let router = build_router(state.clone()).unwrap();
        Self { dir, router, state }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.post_raw(uri, body.to_string()).await
    }

    async fn post_raw(&self, uri: &str, body: impl Into<Body>) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
    }

    async fn drain(&self) {
        self.state.tracking_service.flush().await.unwrap();
    }

    async fn history(&self, body: Value) -> Vec<Value> {
        let (status, body) = self.post("/api/getTrackingHistory", body).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["history"].as_array().cloned().unwrap_or_default()
    }
}

#[tokio::test]
async fn alice_end_to_end() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/addOrUpdateEmployee",
            json!({"employeeName": "Alice", "password": "pw1", "hourlyRate": 15.0}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "success");

    let (_, body) = app.get("/api/employees").await;
    let alice = body["employees"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["employeeName"] == "Alice")
        .cloned()
        .unwrap();
    assert_eq!(alice["hourlyRate"], 15.0);
    assert_eq!(alice["password"], "pw1");

    let (status, body) = app
        .get("/api/orderTrack?isoBarcode=o1234567890&orderNumber=12345678&workstation=Scan1&employeeName=Alice")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "success", "queued": true}));

    app.drain().await;

    let history = app.history(json!({"isoBarcode": "o1234567890"})).await;
    assert_eq!(history.len(), 1);
    let row = history[0].as_array().unwrap();
    assert_eq!(row[1], "o1234567890");
    assert!(row[2..]
        .iter()
        .any(|line| line.as_str().unwrap().ends_with("Scan1 | Alice")));
}

#[tokio::test]
async fn next_container_id_fills_the_first_gap() {
    let app = TestApp::new().await;

    let (_, body) = app.get("/api/nextContainerID").await;
    assert_eq!(body, json!({"status": "success", "nextContainerID": 1}));

    for (container, iso) in [(1, "o0000000001"), (2, "o0000000002"), (4, "o0000000004")] {
        app.get(&format!(
            "/api/orderTrack?containerID={container}&isoBarcode={iso}&workstation=Pack&employeeName=Bob"
        ))
        .await;
    }
    app.drain().await;

    let (_, body) = app.get("/api/nextContainerID").await;
    assert_eq!(body["nextContainerID"], 3);
}

#[tokio::test]
async fn racing_scans_of_one_barcode_keep_one_row() {
    let app = TestApp::new().await;

    let mut requests = Vec::new();
    for i in 0..20 {
        let router = app.router.clone();
        requests.push(tokio::spawn(async move {
            let uri = format!(
                "/api/orderTrack?isoBarcode=o5555555555&workstation=Scan{i}&employeeName=Alice"
            );
            router
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap()
                .status()
        }));
    }
    for request in requests {
        assert_eq!(request.await.unwrap(), StatusCode::OK);
    }
    app.drain().await;

    let history = app.history(json!({"isoBarcode": "o5555555555"})).await;
    assert_eq!(history.len(), 1);
    // Twenty distinct workstations within the same minute: twenty lines.
    assert_eq!(history[0].as_array().unwrap().len(), 2 + 20);
}

#[tokio::test]
async fn later_scans_keep_fields_they_do_not_carry() {
    let app = TestApp::new().await;

    app.get("/api/orderTrack?isoBarcode=o1111111111&leadBarcode=B123456789&containerID=7&workstation=Scan1&employeeName=Alice")
        .await;
    app.get("/api/orderTrack?isoBarcode=o1111111111&workstation=Scan2&employeeName=Bob")
        .await;
    app.drain().await;

    let history = app.history(json!({"isoBarcode": "o1111111111"})).await;
    assert_eq!(history.len(), 1);
    let row = history[0].as_array().unwrap();
    assert_eq!(row[0], 7);

    let by_lead = app.history(json!({"leadBarcode": "B123456789"})).await;
    assert_eq!(by_lead, history);
}

#[tokio::test]
async fn order_placeholder_is_promoted_by_the_first_item_scan() {
    let app = TestApp::new().await;

    app.get("/api/orderTrack?orderNumber=12345678&workstation=Prep&employeeName=Alice")
        .await;
    app.drain().await;

    let history = app.history(json!({"orderNumber": "12345678"})).await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0][1], Value::Null);

    app.get("/api/orderTrack?orderNumber=12345678&isoBarcode=o2222222222&workstation=Scan1&employeeName=Alice")
        .await;
    app.drain().await;

    let history = app.history(json!({"orderNumber": "12345678"})).await;
    assert_eq!(history.len(), 1);
    let row = history[0].as_array().unwrap();
    assert_eq!(row[1], "o2222222222");
    assert_eq!(row.len(), 2 + 2);
}

#[tokio::test]
async fn history_reads_are_idempotent_and_deduplicated() {
    let app = TestApp::new().await;

    app.get("/api/orderTrack?isoBarcode=o3333333333&orderNumber=87654321&workstation=Scan1&employeeName=Alice")
        .await;
    app.drain().await;

    let query = json!({"isoBarcode": "o3333333333", "orderNumber": "87654321"});
    let first = app.history(query.clone()).await;
    let second = app.history(query).await;
    assert_eq!(first.len(), 1);
    assert_eq!(first, second);

    let unknown = app.history(json!({"isoBarcode": "o9999999999"})).await;
    assert!(unknown.is_empty());
}

#[tokio::test]
async fn history_without_keys_is_rejected() {
    let app = TestApp::new().await;
    let (status, body) = app
        .post("/api/getTrackingHistory", json!({"orderNumber": ""}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(
        body["message"],
        "Must provide at least one of orderNumber, leadBarcode, or isoBarcode"
    );
}

#[tokio::test]
async fn unknown_paths_and_methods_use_the_error_envelope() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/doesNotExist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({"status": "error", "message": "Endpoint '/api/doesNotExist' not found"})
    );

    let (status, body) = app.get("/api/loggedin").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn empty_and_malformed_bodies_are_bad_requests() {
    let app = TestApp::new().await;

    let (status, body) = app.post_raw("/api/loggedin", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"status": "error", "message": "No data provided"}));

    let (status, body) = app.post_raw("/api/loggedin", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().starts_with("Invalid JSON"));

    let (status, body) = app.post("/api/addOrUpdateEmployee", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "employeeName is required");
}

#[tokio::test]
async fn shift_endpoints_track_login_state() {
    let app = TestApp::new().await;

    let (status, _) = app
        .post("/api/loggedin", json!({"employeeName": "Ghost"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.post("/api/addOrUpdateEmployee", json!({"employeeName": "Alice"}))
        .await;

    let (_, body) = app
        .post("/api/getEmployeeLoginState", json!({"employeeName": "Alice"}))
        .await;
    assert_eq!(body["loggedIn"], false);

    let (status, _) = app
        .post("/api/loggedin", json!({"employeeName": "Alice"}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app
        .post("/api/getEmployeeLoginState", json!({"employeeName": "Alice"}))
        .await;
    assert_eq!(body, json!({"status": "success", "employeeName": "Alice", "loggedIn": true}));

    let (_, body) = app
        .post("/api/getEmployeeStartTime", json!({"employeeName": "Alice"}))
        .await;
    assert_eq!(body, json!({"status": "success", "start_time": null}));

    let (status, _) = app
        .post(
            "/api/logEmployeeTime",
            json!({"employeeName": "Alice", "start_time": "2025-03-14 08:00:00", "end_time": "2025-03-14 16:30:00"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app
        .post("/api/getEmployeeStartTime", json!({"employeeName": "Alice"}))
        .await;
    assert_eq!(body["start_time"], "2025-03-14 08:00:00");

    let (status, body) = app
        .post(
            "/api/logEmployeeTime",
            json!({"employeeName": "Alice", "start_time": "08:00", "end_time": "16:30"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "start_time and end_time must be in 'YYYY-MM-DD HH:MM:SS' format"
    );
}

#[tokio::test]
async fn eligibility_lists_never_repeat_an_employee() {
    let app = TestApp::new().await;

    app.post(
        "/api/addOrUpdateWorkstation",
        json!({"workstationName": "Scan1", "availableStations": 2}),
    )
    .await;
    for _ in 0..2 {
        app.post(
            "/api/addOrUpdateEmployee",
            json!({"employeeName": "Alice", "workstations": ["Scan1", "Scan1"]}),
        )
        .await;
    }

    let (_, body) = app.get("/api/facilityWorkstations").await;
    assert_eq!(body["workstations"], json!(["Scan1"]));
    assert_eq!(body["availableStations"], json!([2]));
    assert_eq!(body["eligibleList"], json!([["Alice"]]));

    let (status, _) = app
        .post(
            "/api/removeWorkstation",
            json!({"employeeName": "Alice", "workstationName": "Scan1"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.get("/api/facilityWorkstations").await;
    assert_eq!(body["eligibleList"], json!([[]]));

    let (status, _) = app
        .post(
            "/api/removeWorkstation",
            json!({"employeeName": "Alice", "workstationName": "Nowhere"}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn pulse_access_and_employee_removal() {
    let app = TestApp::new().await;

    app.post(
        "/api/addOrUpdateEmployee",
        json!({"employeeName": "Alice", "password": "pw1", "pulseAccess": ["Pulse"]}),
    )
    .await;
    app.post("/api/addOrUpdateEmployee", json!({"employeeName": "Bob"}))
        .await;

    let (_, body) = app.get("/api/pulseEmployees").await;
    let employees = body["employees"].as_array().unwrap();
    assert_eq!(employees.len(), 1);
    assert_eq!(employees[0]["employeeName"], "Alice");
    assert_eq!(employees[0]["pulseAccess"], json!(["Pulse"]));

    let (status, _) = app
        .post("/api/removeEmployee", json!({"employeeName": "Alice"}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.get("/api/pulseEmployees").await;
    assert_eq!(body["employees"], json!([]));
    let (_, body) = app.get("/api/employees").await;
    assert_eq!(body["employees"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn legacy_pulse_access_lists_are_migrated_and_served() {
    let dir = tempfile::tempdir().unwrap();
    let options = db::connect_options(
        &dir.path().join("prodigiAllyDatabase.db"),
        Duration::from_secs(5),
    );
    let mut conn = db::open_connection(&options).await.unwrap();
    sqlx::query(
        "CREATE TABLE employee_info (id INTEGER PRIMARY KEY AUTOINCREMENT,
         employeeName TEXT UNIQUE, password TEXT, hourlyRate REAL, pulseAccess TEXT)",
    )
    .execute(&mut conn)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO employee_info (employeeName, password, hourlyRate, pulseAccess)
         VALUES ('Alice', 'pw1', 15.0, '[\"Pulse\"]'), ('Bob', 'pw2', 12.0, NULL)",
    )
    .execute(&mut conn)
    .await
    .unwrap();
    db::close_quietly(conn).await;

    let app = TestApp::in_dir(dir).await;

    let (_, body) = app.get("/api/pulseEmployees").await;
    let employees = body["employees"].as_array().unwrap();
    assert_eq!(employees.len(), 1);
    assert_eq!(employees[0]["employeeName"], "Alice");
    assert_eq!(employees[0]["password"], "pw1");
    assert_eq!(employees[0]["pulseAccess"], json!(["Pulse"]));
}

#[tokio::test]
async fn task_endpoints() {
    let app = TestApp::new().await;

    app.post("/api/editTasks", json!({"taskName": "Sweep", "editFlag": true}))
        .await;
    app.post("/api/editTasks", json!({"taskName": "Sweep", "editFlag": true}))
        .await;
    let (_, body) = app.get("/api/manualTasks").await;
    assert_eq!(body["tasks"], json!(["Sweep"]));

    app.post(
        "/api/updateEmployeeTask",
        json!({"employeeName": "Alice", "liveTask": "Scan", "status": "active", "isobarcode": "o1234567890"}),
    )
    .await;
    app.post(
        "/api/updateEmployeeTask",
        json!({"employeeName": "Alice", "liveTask": "Scan", "status": "done", "isobarcode": "o1234567890"}),
    )
    .await;
    let (_, body) = app.get("/api/employeesTasks").await;
    assert_eq!(body["tasks"], json!([["Alice", "Scan", "done", "o1234567890"]]));

    let (_, body) = app
        .post(
            "/api/updateEmployeeTask",
            json!({"employeeName": "Alice", "erase": true}),
        )
        .await;
    assert_eq!(body["message"], "All tasks deleted for employee 'Alice'");
    let (_, body) = app.get("/api/employeesTasks").await;
    assert_eq!(body["tasks"], json!([]));

    app.post("/api/editTasks", json!({"taskName": "Sweep", "editFlag": false}))
        .await;
    let (_, body) = app.get("/api/manualTasks").await;
    assert_eq!(body["tasks"], json!([]));
}

#[tokio::test]
async fn prod_types_are_normalized_and_unknown_ones_logged_once() {
    let app = TestApp::new().await;

    let (status, _) = app
        .post(
            "/api/addProdCode",
            json!({"prodType": "poster 18x24", "worksheetRef": "POSTER-18x24"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.get("/api/fetchProdCodes").await;
    assert_eq!(body["prodCodes"], json!(["poster 18x24"]));

    app.get("/api/orderTrack?orderNumber=11111111&prodType=poster%2018x24&workstation=Prep&employeeName=Alice")
        .await;
    app.get("/api/orderTrack?orderNumber=22222222&prodType=mystery&workstation=Prep&employeeName=Alice")
        .await;
    app.get("/api/orderTrack?orderNumber=33333333&prodType=mystery&workstation=Prep&employeeName=Alice")
        .await;
    app.drain().await;

    let logged = tokio::fs::read_to_string(app.dir.path().join("missing_prodTypes.txt"))
        .await
        .unwrap();
    assert_eq!(logged, "mystery\n");
}

#[tokio::test]
async fn print_station_packs_items_into_a_container() {
    let app = TestApp::new().await;

    app.get("/api/receivePrintData?orderNumber=44444444&containerID=5&itemNum=1&prodType=raw%20type&size=A3&workstation=Print1&employeeName=Carol")
        .await;
    app.drain().await;

    let history = app.history(json!({"orderNumber": "44444444"})).await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0][0], 5);

    let (_, body) = app.get("/api/nextContainerID").await;
    assert_eq!(body["nextContainerID"], 1);
}

#[tokio::test]
async fn moving_a_container_stamps_every_item_in_it() {
    let app = TestApp::new().await;

    for iso in ["o6666666661", "o6666666662"] {
        app.get(&format!(
            "/api/orderTrack?isoBarcode={iso}&containerID=9&workstation=Pack&employeeName=Bob"
        ))
        .await;
    }
    app.drain().await;

    let (status, body) = app
        .get("/api/moveContainer?isoBarcode=o6666666661&workstation=Ship&employeeName=Dan")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["queued"], true);
    app.drain().await;

    let other = app.history(json!({"isoBarcode": "o6666666662"})).await;
    let lines = &other[0].as_array().unwrap()[2..];
    assert!(lines
        .iter()
        .any(|line| line.as_str().unwrap().ends_with("Ship | Dan")));
}

#[tokio::test]
async fn health_and_openapi() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "success"}));

    let (status, body) = app.get("/api-docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/orderTrack"].is_object());
}
