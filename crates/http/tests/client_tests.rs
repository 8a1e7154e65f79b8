//! Integration tests for the CareerPath HTTP client

use careerpath_http::types::{RegisterRequest, ResetMethod, UserUpdate};
use careerpath_http::{ApiClient, ClientError, FileStorage, TokenStore};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

struct NoAuthorization;

impl Match for NoAuthorization {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("authorization")
    }
}

fn signed_in(server: &MockServer) -> ApiClient {
    let tokens = TokenStore::in_memory();
    tokens.set_tokens(Some("test-access"), Some("test-refresh"));
    ApiClient::builder()
        .base_url(server.uri())
        .token_store(tokens)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_client_builder() {
    let client = ApiClient::builder()
        .base_url("http://localhost:8000/api/")
        .build();

    assert!(client.is_ok());
    let client = client.unwrap();
    assert_eq!(client.base_url(), "http://localhost:8000/api");
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_client_builder_requires_base_url() {
    let result = ApiClient::builder().build();
    assert!(matches!(result, Err(ClientError::Configuration(_))));

    let result = ApiClient::builder().base_url("/").build();
    assert!(matches!(result, Err(ClientError::Configuration(_))));
}

#[tokio::test]
async fn test_login_stores_tokens_and_sends_no_credentials() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/accounts/token/"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"username": "ada@example.com", "password": "pw"})))
        .and(NoAuthorization)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "a1",
            "refresh": "r1"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri()).unwrap();
    client.tokens().set_access(Some("leftover"));

    let response = client.login("ada@example.com", "pw").await.unwrap();

    assert_eq!(response.access, "a1");
    assert_eq!(client.tokens().access().as_deref(), Some("a1"));
    assert_eq!(client.tokens().refresh().as_deref(), Some("r1"));
}

#[tokio::test]
async fn test_bad_credentials_do_not_trigger_refresh() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/accounts/token/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "No active account found with the given credentials"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/accounts/token/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "x"})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = signed_in(&mock_server);
    let mut events = client.session().subscribe();

    let result = client.login("ada@example.com", "wrong").await;

    match result {
        Err(ClientError::AuthenticationFailed(ref message)) => {
            assert!(message.contains("No active account"));
        }
        ref other => panic!("expected authentication failure, got {other:?}"),
    }
    assert!(!result.unwrap_err().is_session_expired());
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_google_login_revives_expired_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/accounts/google/"))
        .and(body_json(json!({"token": "google-id-token"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "g1",
            "refresh": "gr1",
            "user": {"email": "ada@example.com", "first_name": "Ada", "last_name": "Lovelace"}
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/notifications/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri()).unwrap();
    client.tokens().set_access(Some("stale"));
    assert!(client.notifications().await.is_err());
    assert!(client.session().is_expired());

    let response = client.google_login("google-id-token").await.unwrap();

    assert_eq!(response.user.unwrap().first_name, "Ada");
    assert!(!client.session().is_expired());
    assert_eq!(client.tokens().access().as_deref(), Some("g1"));
}

#[tokio::test]
async fn test_register_is_public() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/accounts/register/"))
        .and(NoAuthorization)
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 3,
            "username": "ada",
            "email": "ada@example.com"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = signed_in(&mock_server);
    let user = client
        .register(&RegisterRequest {
            username: "ada".into(),
            email: "ada@example.com".into(),
            password: "pw".into(),
        })
        .await
        .unwrap();

    assert_eq!(user.id, 3);
}

#[tokio::test]
async fn test_auth_with_bearer_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/accounts/me/"))
        .and(header("authorization", "Bearer test-access"))
        .and(body_json(json!({"privacy_mode_enabled": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "username": "ada",
            "email": "ada@example.com",
            "role": "admin",
            "privacy_mode_enabled": true
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = signed_in(&mock_server);
    let user = client
        .update_me(&UserUpdate {
            privacy_mode_enabled: Some(true),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(user.is_admin());
    assert!(user.privacy_mode_enabled);
}

#[tokio::test]
async fn test_empty_profile_update_is_rejected_locally() {
    let mock_server = MockServer::start().await;
    let client = signed_in(&mock_server);

    let result = client.update_me(&UserUpdate::default()).await;

    assert!(matches!(result, Err(ClientError::Validation(_))));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_error_handling() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/notifications/42/read/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/accounts/change-password/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "old_password": ["Wrong password."]
        })))
        .mount(&mock_server)
        .await;

    let client = signed_in(&mock_server);

    let result = client.mark_notification_read(42).await;
    match result {
        Err(ClientError::NotFound(msg)) => assert!(msg.contains("Not found")),
        other => panic!("expected NotFound, got {other:?}"),
    }

    let result = client.change_password("nope", "new-pw").await;
    match result {
        Err(ClientError::BadRequest(msg)) => assert!(msg.contains("Wrong password")),
        other => panic!("expected BadRequest, got {other:?}"),
    }
}

#[tokio::test]
async fn test_skills_prediction() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/predictions/skills/"))
        .and(body_json(json!({"skills": ["python", "sql"]})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 5,
            "input_skills": ["python", "sql"],
            "predicted_role": "Data Analyst",
            "role_category": "technical",
            "confidence": 0.72,
            "resume_file": null,
            "created_at": "2025-05-10T09:30:00Z"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = signed_in(&mock_server);
    let prediction = client
        .predict_from_skills([" python ", "", "sql"])
        .await
        .unwrap();

    assert_eq!(prediction.predicted_role, "Data Analyst");
    assert_eq!(prediction.skills(), vec!["python", "sql"]);

    let result = client.predict_from_skills(["  "]).await;
    assert!(matches!(result, Err(ClientError::Validation(_))));
}

#[tokio::test]
async fn test_resume_file_prediction() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/predictions/resume/"))
        .and(header("authorization", "Bearer test-access"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 6,
            "input_skills": {},
            "predicted_role": "Backend Developer",
            "resume_file": "/media/resumes/cv.txt",
            "created_at": "2025-05-10T09:30:00Z"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let resume = dir.path().join("cv.txt");
    std::fs::write(&resume, "Rust, Postgres, Kubernetes").unwrap();

    let client = signed_in(&mock_server);
    let prediction = client.predict_from_resume_file(&resume).await.unwrap();
    assert_eq!(prediction.id, 6);

    let requests = mock_server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("filename=\"cv.txt\""));
    assert!(body.contains("text/plain"));

    let missing = client
        .predict_from_resume_file(dir.path().join("missing.pdf"))
        .await;
    assert!(matches!(missing, Err(ClientError::Io(_))));
}

#[tokio::test]
async fn test_analytics_endpoints() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/analytics/monthly/"))
        .and(query_param("months", "12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "months": ["2025-04", "2025-05"],
            "counts": [3, 8]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/analytics/overview/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_users": 10,
            "total_predictions": 42,
            "most_predicted_role": "Data Analyst",
            "most_predicted_role_count": 11
        })))
        .mount(&mock_server)
        .await;

    let client = signed_in(&mock_server);

    let monthly = client.monthly(12).await.unwrap();
    let entries: Vec<_> = monthly.entries().collect();
    assert_eq!(entries, vec![("2025-04", 3), ("2025-05", 8)]);

    let overview = client.overview().await.unwrap();
    assert_eq!(overview.total_predictions, 42);
    assert_eq!(overview.most_predicted_role.as_deref(), Some("Data Analyst"));
}

#[tokio::test]
async fn test_logout_clears_tokens_even_when_server_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/accounts/logout/"))
        .and(body_json(json!({"refresh": "test-refresh"})))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = signed_in(&mock_server);
    let result = client.logout().await;

    assert!(matches!(result, Err(ClientError::ServerError { status: 500, .. })));
    assert_eq!(client.tokens().access(), None);
    assert_eq!(client.tokens().refresh(), None);
}

#[tokio::test]
async fn test_logout_without_session_makes_no_call() {
    let mock_server = MockServer::start().await;

    let client = ApiClient::new(mock_server.uri()).unwrap();
    client.tokens().set_access(Some("orphan"));
    let mut events = client.session().subscribe();

    client.logout().await.unwrap();

    assert!(mock_server.received_requests().await.unwrap().is_empty());
    assert_eq!(client.tokens().access(), None);
    assert!(events.try_recv().is_err());
    assert!(!client.session().is_expired());
}

#[tokio::test]
async fn test_password_reset_is_public() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/accounts/auth/request-reset/"))
        .and(body_json(json!({"email": "ada@example.com", "method": "otp"})))
        .and(NoAuthorization)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "OTP sent to email"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/accounts/auth/verify-otp/"))
        .and(NoAuthorization)
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "Invalid OTP"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = signed_in(&mock_server);
    client
        .request_password_reset("ada@example.com", ResetMethod::Otp)
        .await
        .unwrap();

    let result = client
        .reset_password_with_otp("ada@example.com", "000000", "new-pw")
        .await;
    assert!(matches!(result, Err(ClientError::BadRequest(_))));
    assert_eq!(client.tokens().access().as_deref(), Some("test-access"));
}

#[tokio::test]
async fn test_restore_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts/me/"))
        .and(header("authorization", "Bearer test-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "username": "ada",
            "email": "ada@example.com"
        })))
        .mount(&mock_server)
        .await;

    let client = signed_in(&mock_server);
    let user = client.restore_session().await.unwrap();
    assert_eq!(user.username, "ada");

    let anonymous = ApiClient::new(mock_server.uri()).unwrap();
    assert!(anonymous.restore_session().await.is_none());
}

#[tokio::test]
async fn test_restore_session_discards_unusable_tokens() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts/me/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = signed_in(&mock_server);
    assert!(client.restore_session().await.is_none());
    assert_eq!(client.tokens().access(), None);
    assert_eq!(client.tokens().refresh(), None);
}

#[tokio::test]
async fn test_file_backed_session_survives_restart() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/accounts/token/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "a1",
            "refresh": "r1"
        })))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let token_file = dir.path().join("tokens.json");

    let first = ApiClient::builder()
        .base_url(mock_server.uri())
        .token_store(TokenStore::new(FileStorage::open(&token_file).unwrap()))
        .build()
        .unwrap();
    first.login("ada@example.com", "pw").await.unwrap();

    let reopened = TokenStore::open_file(&token_file).unwrap();
    assert_eq!(reopened.access().as_deref(), Some("a1"));
    assert_eq!(reopened.refresh().as_deref(), Some("r1"));
}
