use mockito::Matcher;
use serde_json::json;

use liftlog_lib::auth::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use liftlog_lib::{ClientError, SessionEvent, TerminationReason};

use crate::test_harness::{token_body, user_body, TestContext, REFRESH_PATH};

#[tokio::test]
async fn test_valid_token_sends_single_bearer_header() {
    let mut ctx = TestContext::signed_in().await;
    let me = ctx
        .server
        .mock("GET", "/api/auth/me")
        .match_header("authorization", "Bearer T1")
        .with_status(200)
        .with_body(user_body())
        .expect(1)
        .create_async()
        .await;

    let user = ctx.client.get_profile().await.unwrap();
    assert_eq!(user.nickname.as_deref(), Some("Ironside"));
    me.assert_async().await;
}

#[tokio::test]
async fn test_anonymous_request_has_no_authorization_header() {
    let mut ctx = TestContext::new(&[]).await;
    let list = ctx
        .server
        .mock("GET", "/api/exercises")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body(r#"{"total": 0, "items": []}"#)
        .create_async()
        .await;

    let page = ctx.client.list_exercises(&Default::default()).await.unwrap();
    assert_eq!(page.total, 0);
    list.assert_async().await;
}

#[tokio::test]
async fn test_expired_token_is_renewed_and_request_retried() {
    let mut ctx = TestContext::signed_in().await;
    let expired = ctx
        .server
        .mock("GET", "/api/auth/me")
        .match_header("authorization", "Bearer T1")
        .with_status(401)
        .with_body(r#"{"detail":"Could not validate credentials"}"#)
        .expect(1)
        .create_async()
        .await;
    let refresh = ctx
        .server
        .mock("POST", REFRESH_PATH)
        .match_header("authorization", Matcher::Missing)
        .match_body(Matcher::Json(json!({"refresh_token": "R1"})))
        .with_status(200)
        .with_body(token_body("T2", "R2"))
        .expect(1)
        .create_async()
        .await;
    let retried = ctx
        .server
        .mock("GET", "/api/auth/me")
        .match_header("authorization", "Bearer T2")
        .with_status(200)
        .with_body(user_body())
        .expect(1)
        .create_async()
        .await;
    let mut rx = ctx.events.subscribe();

    let user = ctx.client.get_profile().await.unwrap();
    assert_eq!(user.email, "lifter@example.com");

    assert_eq!(ctx.stored(ACCESS_TOKEN_KEY).await.as_deref(), Some("T2"));
    assert_eq!(ctx.stored(REFRESH_TOKEN_KEY).await.as_deref(), Some("R2"));
    assert_eq!(rx.recv().await.unwrap().event, SessionEvent::Renewed);

    expired.assert_async().await;
    refresh.assert_async().await;
    retried.assert_async().await;
    assert!(ctx.navigator.visited().is_empty());
}

#[tokio::test]
async fn test_unreachable_renewal_ends_session_and_redirects() {
    let mut ctx = TestContext::signed_in_offline_renewal().await;
    let expired = ctx
        .server
        .mock("GET", "/api/workouts")
        .with_status(401)
        .with_body(r#"{"detail":"Token expired"}"#)
        .expect(1)
        .create_async()
        .await;

    let err = ctx
        .client
        .list_workouts(&Default::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired { .. }));

    assert_eq!(ctx.stored(ACCESS_TOKEN_KEY).await, None);
    assert_eq!(ctx.stored(REFRESH_TOKEN_KEY).await, None);
    assert_eq!(ctx.wait_for_redirects(1).await, vec!["/login"]);
    expired.assert_async().await;
}

#[tokio::test]
async fn test_rejected_renewal_ends_session() {
    let mut ctx = TestContext::signed_in().await;
    ctx.server
        .mock("GET", "/api/workouts/templates/list")
        .with_status(401)
        .create_async()
        .await;
    let refresh = ctx
        .server
        .mock("POST", REFRESH_PATH)
        .with_status(401)
        .with_body(r#"{"detail":"Invalid refresh token"}"#)
        .expect(1)
        .create_async()
        .await;
    let mut rx = ctx.events.subscribe();

    let err = ctx.client.list_templates().await.unwrap_err();
    match err {
        ClientError::SessionExpired { reason } => assert!(reason.contains("Invalid refresh token")),
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(
        rx.recv().await.unwrap().event,
        SessionEvent::Terminated {
            reason: TerminationReason::RenewalRejected {
                status: 401,
                message: "Invalid refresh token".to_string(),
            }
        }
    );
    assert!(!ctx.client.session().is_authenticated().await);
    assert_eq!(ctx.wait_for_redirects(1).await, vec!["/login"]);
    refresh.assert_async().await;
}

#[tokio::test]
async fn test_missing_refresh_token_propagates_original_failure() {
    let mut ctx = TestContext::new(&[(ACCESS_TOKEN_KEY, "T1")]).await;
    let body = r#"{"detail":"Signature has expired"}"#;
    ctx.server
        .mock("GET", "/api/auth/me")
        .with_status(401)
        .with_body(body)
        .expect(1)
        .create_async()
        .await;
    let refresh = ctx
        .server
        .mock("POST", REFRESH_PATH)
        .expect(0)
        .create_async()
        .await;

    let err = ctx.client.get_profile().await.unwrap_err();
    match err {
        ClientError::Http {
            status,
            message,
            body: raw,
        } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Signature has expired");
            assert_eq!(raw, body);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(ctx.stored(ACCESS_TOKEN_KEY).await, None);
    assert_eq!(ctx.wait_for_redirects(1).await, vec!["/login"]);
    refresh.assert_async().await;
}

#[tokio::test]
async fn test_request_is_retried_at_most_once() {
    let mut ctx = TestContext::signed_in().await;
    let always_401 = ctx
        .server
        .mock("GET", "/api/exercises/muscle-groups")
        .with_status(401)
        .with_body(r#"{"detail":"Forbidden for this token"}"#)
        .expect(2)
        .create_async()
        .await;
    let refresh = ctx
        .server
        .mock("POST", REFRESH_PATH)
        .with_status(200)
        .with_body(token_body("T2", "R2"))
        .expect(1)
        .create_async()
        .await;

    let err = ctx.client.muscle_groups().await.unwrap_err();
    assert!(err.is_unauthorized());

    always_401.assert_async().await;
    refresh.assert_async().await;
    assert_eq!(ctx.stored(ACCESS_TOKEN_KEY).await.as_deref(), Some("T2"));
}

#[tokio::test]
async fn test_concurrent_expiry_triggers_one_renewal() {
    let mut ctx = TestContext::signed_in().await;
    ctx.server
        .mock("GET", "/api/workouts/templates/list")
        .match_header("authorization", "Bearer T1")
        .with_status(401)
        .create_async()
        .await;
    let refresh = ctx
        .server
        .mock("POST", REFRESH_PATH)
        .with_status(200)
        .with_body(token_body("T2", "R2"))
        .expect(1)
        .create_async()
        .await;
    let retried = ctx
        .server
        .mock("GET", "/api/workouts/templates/list")
        .match_header("authorization", "Bearer T2")
        .with_status(200)
        .with_body(r#"{"templates": [{"name": "Push A", "usage_count": 4}]}"#)
        .expect(4)
        .create_async()
        .await;

    let client = ctx.client.clone();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.list_templates().await })
        })
        .collect();

    for result in futures::future::join_all(handles).await {
        let templates = result.unwrap().unwrap();
        assert_eq!(templates[0].name, "Push A");
    }

    refresh.assert_async().await;
    retried.assert_async().await;
    assert_eq!(ctx.stored(ACCESS_TOKEN_KEY).await.as_deref(), Some("T2"));
}

#[tokio::test]
async fn test_non_401_errors_are_not_renewed() {
    let mut ctx = TestContext::signed_in().await;
    ctx.server
        .mock("DELETE", "/api/exercises/3")
        .with_status(403)
        .with_body(r#"{"detail":"Cannot delete a built-in exercise"}"#)
        .create_async()
        .await;
    let refresh = ctx
        .server
        .mock("POST", REFRESH_PATH)
        .expect(0)
        .create_async()
        .await;

    let err = ctx.client.delete_exercise(3).await.unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert_eq!(
        err.to_string(),
        "Server error 403: Cannot delete a built-in exercise"
    );
    assert_eq!(ctx.stored(ACCESS_TOKEN_KEY).await.as_deref(), Some("T1"));
    refresh.assert_async().await;
}
