use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_config::AppConfig;
use shared_utils::test_utils::TestConfig;
use telemedicine_cell::telemedicine_routes;

const SESSIONS_PATH: &str = "/rest/v1/video_sessions";

fn create_config(supabase: &MockServer, rooms: &MockServer) -> Arc<AppConfig> {
    let mut config = TestConfig::default().to_app_config();
    config.supabase_url = supabase.uri();
    config.room_provider_base_url = rooms.uri();
    Arc::new(config)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, "Bearer test-token")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn session_json(session_id: Uuid, appointment_id: Uuid, status: &str) -> Value {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    json!({
        "id": session_id,
        "appointment_id": appointment_id,
        "practitioner_id": Uuid::new_v4(),
        "practitioner_name": "Dr. X",
        "patient_id": Uuid::new_v4(),
        "patient_name": "Jane",
        "room_id": Uuid::new_v4().to_string(),
        "room_name": "consult-room",
        "room_url": "https://rooms.example.com/consult-room",
        "status": status,
        "scheduled_start_time": "2025-06-01T10:00:00Z",
        "actual_start_time": now,
        "end_time": null,
        "duration_minutes": null,
        "practitioner_joined_at": now,
        "patient_joined_at": null,
        "ended_by": null,
        "cancellation_reason": null,
        "created_at": now,
        "updated_at": now
    })
}

#[tokio::test]
async fn test_health_reports_operational_when_configured() {
    let supabase = MockServer::start().await;
    let rooms = MockServer::start().await;
    let app = telemedicine_routes(create_config(&supabase, &rooms));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["room_provider_configured"], true);
}

#[tokio::test]
async fn test_health_reports_missing_room_provider() {
    let mut config = TestConfig::default().to_app_config();
    config.room_provider_api_key = String::new();
    let app = telemedicine_routes(Arc::new(config));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "not_configured");
    assert_eq!(body["room_provider_configured"], false);
}

#[tokio::test]
async fn test_start_endpoint_returns_session_summary() {
    let supabase = MockServer::start().await;
    let rooms = MockServer::start().await;

    let appointment_id = Uuid::new_v4();
    let practitioner_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": appointment_id,
            "practitioner_code": "DOC001",
            "practitioner_name": "Dr. X",
            "patient_id": Uuid::new_v4(),
            "patient_name": "Jane",
            "appointment_date": "2025-06-01T10:00:00Z",
            "consultation_mode": "REMOTE",
            "status": "CONFIRMED"
        }])))
        .mount(&supabase)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/practitioners"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "id": practitioner_id }])),
        )
        .mount(&supabase)
        .await;
    Mock::given(method("GET"))
        .and(path(SESSIONS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&supabase)
        .await;
    Mock::given(method("POST"))
        .and(path(SESSIONS_PATH))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{}])))
        .mount(&supabase)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&supabase)
        .await;
    Mock::given(method("POST"))
        .and(path("/rooms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": "https://rooms.example.com/consult-room",
            "name": "consult-room"
        })))
        .mount(&rooms)
        .await;

    let app = telemedicine_routes(create_config(&supabase, &rooms));

    let response = app
        .oneshot(post_json(
            &format!("/appointments/{}/start", appointment_id),
            json!({ "practitioner_id": "DOC001" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["session"]["status"], "IN_PROGRESS");
    assert_eq!(
        body["session"]["room_url"],
        "https://rooms.example.com/consult-room"
    );
}

#[tokio::test]
async fn test_start_endpoint_forbids_other_practitioner() {
    let supabase = MockServer::start().await;
    let rooms = MockServer::start().await;

    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": appointment_id,
            "practitioner_code": "DOC001",
            "practitioner_name": "Dr. X",
            "patient_id": Uuid::new_v4(),
            "patient_name": "Jane",
            "appointment_date": "2025-06-01T10:00:00Z",
            "consultation_mode": "REMOTE",
            "status": "CONFIRMED"
        }])))
        .mount(&supabase)
        .await;

    let app = telemedicine_routes(create_config(&supabase, &rooms));

    let response = app
        .oneshot(post_json(
            &format!("/appointments/{}/start", appointment_id),
            json!({ "practitioner_id": "DOC999" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = response_json(response).await;
    assert_eq!(
        body["error"],
        "You are not authorized to start this consultation"
    );
}

#[tokio::test]
async fn test_start_endpoint_rejects_in_person_appointment() {
    let supabase = MockServer::start().await;
    let rooms = MockServer::start().await;

    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": appointment_id,
            "practitioner_code": "DOC001",
            "practitioner_name": "Dr. X",
            "patient_id": Uuid::new_v4(),
            "patient_name": "Jane",
            "appointment_date": "2025-06-01T10:00:00Z",
            "consultation_mode": "IN_PERSON",
            "status": "CONFIRMED"
        }])))
        .mount(&supabase)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/practitioners"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "id": Uuid::new_v4() }])),
        )
        .mount(&supabase)
        .await;

    let app = telemedicine_routes(create_config(&supabase, &rooms));

    let response = app
        .oneshot(post_json(
            &format!("/appointments/{}/start", appointment_id),
            json!({ "practitioner_id": "DOC001" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_start_endpoint_requires_bearer_token() {
    let supabase = MockServer::start().await;
    let rooms = MockServer::start().await;
    let app = telemedicine_routes(create_config(&supabase, &rooms));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/appointments/{}/start", Uuid::new_v4()))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "practitioner_id": "DOC001" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_join_endpoint_returns_not_found_before_start() {
    let supabase = MockServer::start().await;
    let rooms = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SESSIONS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&supabase)
        .await;

    let app = telemedicine_routes(create_config(&supabase, &rooms));

    let response = app
        .oneshot(post_json(
            &format!("/appointments/{}/join", Uuid::new_v4()),
            json!({ "patient_id": Uuid::new_v4() }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response).await;
    assert_eq!(
        body["error"],
        "No active consultation found for this appointment"
    );
}

#[tokio::test]
async fn test_end_endpoint_rejects_completed_session() {
    let supabase = MockServer::start().await;
    let rooms = MockServer::start().await;

    let session_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(SESSIONS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([session_json(
            session_id,
            Uuid::new_v4(),
            "COMPLETED"
        )])))
        .mount(&supabase)
        .await;

    let app = telemedicine_routes(create_config(&supabase, &rooms));

    let response = app
        .oneshot(post_json(
            &format!("/sessions/{}/end", session_id),
            json!({ "practitioner_id": Uuid::new_v4() }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Consultation already ended");
}

#[tokio::test]
async fn test_end_endpoint_hides_sessions_of_other_practitioners() {
    let supabase = MockServer::start().await;
    let rooms = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SESSIONS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&supabase)
        .await;

    let app = telemedicine_routes(create_config(&supabase, &rooms));

    let response = app
        .oneshot(post_json(
            &format!("/sessions/{}/end", Uuid::new_v4()),
            json!({ "practitioner_id": Uuid::new_v4() }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_status_endpoint_returns_snapshot() {
    let supabase = MockServer::start().await;
    let rooms = MockServer::start().await;

    let session_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(SESSIONS_PATH))
        .and(query_param("id", format!("eq.{}", session_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([session_json(
            session_id,
            Uuid::new_v4(),
            "IN_PROGRESS"
        )])))
        .mount(&supabase)
        .await;

    let app = telemedicine_routes(create_config(&supabase, &rooms));

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/sessions/{}/status", session_id))
                .header(header::AUTHORIZATION, "Bearer test-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["session_id"], session_id.to_string());
    assert_eq!(body["status"], "IN_PROGRESS");
    assert_eq!(body["practitioner_joined"], true);
    assert_eq!(body["patient_joined"], false);
}

#[tokio::test]
async fn test_practitioner_history_endpoint_paginates() {
    let supabase = MockServer::start().await;
    let rooms = MockServer::start().await;

    let practitioner_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(SESSIONS_PATH))
        .and(query_param("practitioner_id", format!("eq.{}", practitioner_id)))
        .and(query_param("limit", "10"))
        .and(query_param("offset", "10"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Range", "10-10/25")
                .set_body_json(json!([session_json(
                    Uuid::new_v4(),
                    Uuid::new_v4(),
                    "COMPLETED"
                )])),
        )
        .mount(&supabase)
        .await;

    let app = telemedicine_routes(create_config(&supabase, &rooms));

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!(
                    "/practitioners/{}/sessions?page=2&page_size=10",
                    practitioner_id
                ))
                .header(header::AUTHORIZATION, "Bearer test-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["total"], 25);
    assert_eq!(body["page"], 2);
    assert_eq!(body["total_pages"], 3);
    assert_eq!(body["sessions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_reap_endpoint_uses_configured_grace_period() {
    let supabase = MockServer::start().await;
    let rooms = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SESSIONS_PATH))
        .and(query_param("status", "eq.IN_PROGRESS"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&supabase)
        .await;

    let app = telemedicine_routes(create_config(&supabase, &rooms));

    let response = app
        .oneshot(post_json("/admin/reap-no-shows", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["reaped_sessions"], 0);
    assert_eq!(body["grace_minutes"], 15);
}
