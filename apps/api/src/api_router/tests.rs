use std::io::Cursor;
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use surveyrpc_application::{SessionRecord, SurveyRepository};
use surveyrpc_core::{SessionKey, SurveyId, UserId};
use surveyrpc_domain::{DataTable, Survey, SurveyPartition, User, UserProfile};
use surveyrpc_infrastructure::InMemorySurveyStore;
use tower::ServiceExt;

use crate::api_services::build_in_memory_state;

use super::build_router;

const OWNER: UserId = UserId::new(1);
const SURVEY: SurveyId = SurveyId::new(42);
const SESSION: &str = "owner-session";

fn row(value: Value) -> serde_json::Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

async fn seeded_store() -> Arc<InMemorySurveyStore> {
    let store = Arc::new(InMemorySurveyStore::new());
    store
        .insert_user(User::new(
            UserProfile {
                uid: OWNER,
                users_name: "admin".to_owned(),
                full_name: "Administrator".to_owned(),
                parent_id: 0,
                lang: "en".to_owned(),
                email: "admin@example.test".to_owned(),
                created: Some("2024-01-01 00:00:00".to_owned()),
                modified: None,
            },
            "$2y$10$secret-hash",
        ))
        .await;
    store
        .insert_session(SessionRecord {
            key: SessionKey::new(SESSION),
            user_id: OWNER,
            expires_at: Utc::now() + Duration::hours(1),
        })
        .await;
    store
        .insert_survey(Survey::new(SURVEY, OWNER, true, false, true))
        .await;
    store
        .insert_structure_table(
            SURVEY,
            DataTable::new(
                "surveys",
                vec!["sid".to_owned()],
                vec![row(json!({"sid": 42}))],
            ),
        )
        .await;
    store
        .insert_partition(
            SURVEY,
            SurveyPartition::Responses,
            &["id", "token", "submitdate", "42X1X1"],
            vec![
                row(json!({"id": 1, "token": "t1", "submitdate": "2024-05-01 09:00:00", "42X1X1": "A1"})),
                row(json!({"id": 2, "token": "t2", "submitdate": null, "42X1X1": "A1"})),
            ],
        )
        .await;
    store
        .insert_partition(
            SURVEY,
            SurveyPartition::Timings,
            &["id", "interviewtime"],
            vec![
                row(json!({"id": 1, "interviewtime": 40.5})),
                row(json!({"id": 2, "interviewtime": 12.0})),
            ],
        )
        .await;
    store
}

fn app(store: Arc<InMemorySurveyStore>) -> Router {
    build_router(build_in_memory_state(store, &std::env::temp_dir()))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .oneshot(request)
        .await
        .unwrap_or_else(|_| unreachable!());
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_default();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn call(app: Router, method: &str, params: Value) -> Value {
    let request = Request::post("/rpc")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"method": method, "params": params, "id": 7}).to_string(),
        ))
        .unwrap_or_else(|_| unreachable!());

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], json!(7));
    body
}

#[tokio::test]
async fn health_reports_disabled_database_for_in_memory_storage() {
    let request = Request::get("/health")
        .body(Body::empty())
        .unwrap_or_else(|_| unreachable!());

    let (status, body) = send(app(seeded_store().await), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));
    assert_eq!(body["postgres"]["status"], json!("disabled"));
}

#[tokio::test]
async fn get_me_omits_credential_and_returns_null_for_bad_session() {
    let store = seeded_store().await;

    let me = call(app(store.clone()), "get_me", json!([SESSION])).await;
    let anonymous = call(app(store), "get_me", json!(["nope"])).await;

    assert_eq!(me["result"]["users_name"], json!("admin"));
    assert!(me["result"].get("password").is_none());
    assert!(!me.to_string().contains("secret-hash"));
    assert_eq!(anonymous["result"], Value::Null);
    assert_eq!(anonymous["error"], Value::Null);
}

#[tokio::test]
async fn permission_checks_answer_with_permission_key() {
    let store = seeded_store().await;

    let owner = call(
        app(store.clone()),
        "hasSurveyPermission",
        json!([SESSION, "42", "responses", "update"]),
    )
    .await;
    let global = call(
        app(store.clone()),
        "hasGlobalPermission",
        json!([SESSION, "surveys"]),
    )
    .await;
    let bad_verb = call(
        app(store),
        "hasGlobalPermission",
        json!([SESSION, "surveys", "destroy"]),
    )
    .await;

    assert_eq!(owner["result"], json!({"permission": true}));
    assert_eq!(global["result"], json!({"permission": false}));
    assert_eq!(
        bad_verb["result"],
        json!({"status": "Error: Invalid permission verb 'destroy'"})
    );
}

#[tokio::test]
async fn update_response_uses_capitalised_status_key() {
    let store = seeded_store().await;

    let updated = call(
        app(store.clone()),
        "update_response",
        json!([SESSION, 42, {"id": 1, "42X1X1": "A7"}]),
    )
    .await;
    let invalid_column = call(
        app(store.clone()),
        "update_response",
        json!([SESSION, 42, {"id": 1, "score": 3}]),
    )
    .await;
    let invalid_session = call(
        app(store.clone()),
        "update_response",
        json!(["nope", 42, {"id": 1}]),
    )
    .await;
    let unknown_survey = call(
        app(store.clone()),
        "update_response",
        json!([SESSION, "abc", {"id": 1}]),
    )
    .await;

    assert_eq!(updated["result"], json!(true));
    assert_eq!(
        invalid_column["result"],
        json!({"Status": "Error: Invalid Column names supplied: score"})
    );
    assert_eq!(
        invalid_session["result"],
        json!({"status": "Invalid sessionkey"})
    );
    assert_eq!(
        unknown_survey["result"],
        json!({"Status": "Error: Invalid survey ID"})
    );

    let rows = store
        .partition_rows(SURVEY, SurveyPartition::Responses)
        .await;
    assert_eq!(rows[0]["42X1X1"], json!("A7"));
    let flag = store
        .find_survey(SURVEY)
        .await
        .unwrap_or_default()
        .map(|survey| survey.allows_edit_after_completion());
    assert_eq!(flag, Some(false));
}

#[tokio::test]
async fn delete_responses_reports_partial_failure() {
    let store = seeded_store().await;

    let partial = call(
        app(store.clone()),
        "delete_responses",
        json!([SESSION, 42, [1, 99]]),
    )
    .await;

    assert_eq!(
        partial["result"],
        json!({"status": "Error: during response deletion"})
    );
    assert_eq!(
        store
            .partition_rows(SURVEY, SurveyPartition::Responses)
            .await
            .len(),
        1
    );
    assert_eq!(
        store
            .partition_rows(SURVEY, SurveyPartition::Timings)
            .await
            .len(),
        1
    );

    let clean = call(app(store), "delete_responses", json!([SESSION, 42, 2])).await;
    assert_eq!(clean["result"], json!({"status": "OK"}));
}

#[tokio::test]
async fn delete_responses_deletes_valid_ids_next_to_unusable_ones() {
    let store = seeded_store().await;

    let outcome = call(
        app(store.clone()),
        "delete_responses",
        json!([SESSION, 42, [1, "abc"]]),
    )
    .await;

    assert_eq!(
        outcome["result"],
        json!({"status": "Error: during response deletion"})
    );
    let remaining = store
        .partition_rows(SURVEY, SurveyPartition::Responses)
        .await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0]["id"], json!(2));
}

#[tokio::test]
async fn missing_session_key_is_an_invalid_session_result() {
    let store = seeded_store().await;

    let export = call(app(store.clone()), "export_survey", json!([null, 42])).await;
    let update = call(app(store.clone()), "update_response", json!([])).await;
    let me = call(app(store), "get_me", json!([])).await;

    assert_eq!(export["result"], json!({"status": "Invalid sessionkey"}));
    assert_eq!(export["error"], Value::Null);
    assert_eq!(update["result"], json!({"status": "Invalid sessionkey"}));
    assert_eq!(me["result"], Value::Null);
    assert_eq!(me["error"], Value::Null);
}

#[tokio::test]
async fn export_survey_returns_base64_zip() {
    let store = seeded_store().await;

    let exported = call(app(store.clone()), "export_survey", json!([SESSION, 42])).await;
    let missing = call(app(store), "export_survey", json!([SESSION, 7])).await;

    let encoded = exported["result"].as_str().unwrap_or_default();
    let bytes = BASE64_STANDARD.decode(encoded).unwrap_or_default();
    let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap_or_else(|_| unreachable!());
    let mut names: Vec<String> = archive.file_names().map(str::to_owned).collect();
    names.sort();

    assert_eq!(
        names,
        vec![
            "survey_42.lss".to_owned(),
            "survey_42_responses.lsr".to_owned(),
            "survey_42_timings.lsi".to_owned(),
        ]
    );
    assert_eq!(
        missing["result"],
        json!({"status": "Error: Invalid survey ID"})
    );
}

#[tokio::test]
async fn malformed_envelope_is_rejected_with_parse_error() {
    let request = Request::post("/rpc")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap_or_else(|_| unreachable!());

    let (status, body) = send(app(seeded_store().await), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!(-32700));
}

#[tokio::test]
async fn unknown_method_and_missing_params_are_rpc_errors() {
    let store = seeded_store().await;

    let unknown = call(app(store.clone()), "release_survey", json!([SESSION])).await;
    let missing = call(app(store), "hasGlobalPermission", json!([SESSION])).await;

    assert_eq!(unknown["error"]["code"], json!(-32601));
    assert_eq!(unknown["result"], Value::Null);
    assert_eq!(missing["error"]["code"], json!(-32602));
}
