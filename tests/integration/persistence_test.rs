use std::sync::Arc;

use mockito::Matcher;

use liftlog_lib::auth::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use liftlog_lib::models::LoginCredentials;
use liftlog_lib::{CredentialPair, CredentialStore, FileStore, KeyValueStore, UserStore};

use crate::test_harness::{token_body, user_body, TestContext, REFRESH_PATH};

fn read_session_file(path: &std::path::Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn test_renewed_pair_is_on_disk_before_retry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("liftlog-session.json");
    std::fs::write(&path, r#"{"token": "T1", "refreshToken": "R1"}"#).unwrap();

    let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&path));
    let mut ctx = TestContext::with_storage(storage).await;

    ctx.server
        .mock("GET", "/api/workouts/templates/list")
        .match_header("authorization", "Bearer T1")
        .with_status(401)
        .create_async()
        .await;
    ctx.server
        .mock("POST", REFRESH_PATH)
        .match_body(Matcher::PartialJsonString(r#"{"refresh_token": "R1"}"#.to_string()))
        .with_status(200)
        .with_body(token_body("T2", "R2"))
        .create_async()
        .await;

    // The retry only succeeds if the file already holds the new pair
    let file = path.clone();
    ctx.server
        .mock("GET", "/api/workouts/templates/list")
        .match_header("authorization", "Bearer T2")
        .with_status(200)
        .with_body_from_request(move |_| {
            let on_disk = read_session_file(&file);
            if on_disk["token"] == "T2" && on_disk["refreshToken"] == "R2" {
                br#"{"templates": []}"#.to_vec()
            } else {
                b"storage lagged behind the retry".to_vec()
            }
        })
        .create_async()
        .await;

    let templates = ctx.client.list_templates().await.unwrap();
    assert!(templates.is_empty());

    // A fresh process sees the renewed pair
    let reopened = CredentialStore::load(Arc::new(FileStore::new(&path)))
        .await
        .unwrap();
    assert_eq!(reopened.get().await, Some(CredentialPair::new("T2", "R2")));
}

#[tokio::test]
async fn test_failed_renewal_removes_both_keys_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("liftlog-session.json");
    std::fs::write(
        &path,
        r#"{"token": "T1", "refreshToken": "R1", "theme": "dark"}"#,
    )
    .unwrap();

    let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&path));
    let mut ctx = TestContext::with_storage(storage).await;
    ctx.server
        .mock("GET", "/api/auth/me")
        .with_status(401)
        .create_async()
        .await;
    ctx.server
        .mock("POST", REFRESH_PATH)
        .with_status(500)
        .with_body("Internal Server Error")
        .create_async()
        .await;

    assert!(ctx.client.get_profile().await.is_err());

    let on_disk = read_session_file(&path);
    assert!(on_disk.get("token").is_none());
    assert!(on_disk.get("refreshToken").is_none());
    assert_eq!(on_disk["theme"], "dark");
}

#[tokio::test]
async fn test_login_writes_session_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("liftlog-session.json");

    let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&path));
    let mut ctx = TestContext::with_storage(storage).await;
    ctx.server
        .mock("POST", "/api/auth/login")
        .match_body(Matcher::Json(serde_json::json!({
            "email": "lifter@example.com",
            "password": "Secret123"
        })))
        .with_status(200)
        .with_body(token_body("T1", "R1"))
        .create_async()
        .await;
    ctx.server
        .mock("GET", "/api/auth/me")
        .match_header("authorization", "Bearer T1")
        .with_status(200)
        .with_body(user_body())
        .create_async()
        .await;

    let users = UserStore::new(ctx.client.clone());
    users
        .login(&LoginCredentials {
            email: "lifter@example.com".to_string(),
            password: "Secret123".to_string(),
        })
        .await
        .unwrap();

    let on_disk = read_session_file(&path);
    assert_eq!(on_disk[ACCESS_TOKEN_KEY], "T1");
    assert_eq!(on_disk[REFRESH_TOKEN_KEY], "R1");
    assert_eq!(users.display_name().await, "Ironside");
}
