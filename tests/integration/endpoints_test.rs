use chrono::NaiveDate;
use mockito::Matcher;
use serde_json::json;

use liftlog_lib::models::{
    ExerciseQuery, OneRmCalculateRequest, UserUpdate, VolumePeriod, WorkoutSessionDraft,
    WorkoutSetDraft,
};
use liftlog_lib::ClientError;

use crate::test_harness::{user_body, TestContext};

const TIMESTAMPS: &str = r#""created_at": "2024-05-06T18:00:00", "updated_at": "2024-05-06T18:00:00""#;

#[tokio::test]
async fn test_list_exercises_sends_only_set_filters() {
    let mut ctx = TestContext::signed_in().await;
    let list = ctx
        .server
        .mock("GET", "/api/exercises")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("muscle_group".into(), "chest".into()),
            Matcher::UrlEncoded("search".into(), "bench press".into()),
            Matcher::UrlEncoded("page".into(), "2".into()),
        ]))
        .with_status(200)
        .with_body(format!(
            r#"{{"total": 21, "items": [{{
                "id": 4, "name": "Bench Press", "name_en": "Bench Press",
                "primary_muscle": "chest", "secondary_muscles": ["triceps"],
                "category": "compound", "equipment": "barbell", "difficulty": 2,
                "is_custom": false, {TIMESTAMPS}
            }}]}}"#
        ))
        .expect(1)
        .create_async()
        .await;

    let page = ctx
        .client
        .list_exercises(&ExerciseQuery {
            muscle_group: Some("chest".to_string()),
            search: Some("bench press".to_string()),
            page: Some(2),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(page.total, 21);
    assert_eq!(page.items[0].name, "Bench Press");
    assert_eq!(page.items[0].secondary_muscles, Some(vec!["triceps".to_string()]));
    list.assert_async().await;
}

#[tokio::test]
async fn test_lookup_lists_are_unwrapped() {
    let mut ctx = TestContext::signed_in().await;
    ctx.server
        .mock("GET", "/api/exercises/muscle-groups")
        .with_status(200)
        .with_body(r#"{"muscle_groups": ["chest", "back", "legs"]}"#)
        .create_async()
        .await;
    ctx.server
        .mock("GET", "/api/exercises/equipment-types")
        .with_status(200)
        .with_body(r#"{"equipment_types": ["barbell", "dumbbell"]}"#)
        .create_async()
        .await;

    assert_eq!(ctx.client.muscle_groups().await.unwrap(), vec!["chest", "back", "legs"]);
    assert_eq!(ctx.client.equipment_types().await.unwrap(), vec!["barbell", "dumbbell"]);
}

#[tokio::test]
async fn test_create_workout_posts_draft_with_sets() {
    let mut ctx = TestContext::signed_in().await;
    let create = ctx
        .server
        .mock("POST", "/api/workouts")
        .match_body(Matcher::Json(json!({
            "date": "2024-05-06",
            "overall_rpe": 8,
            "sets": [
                {"exercise_id": 4, "set_order": 1, "weight": 100.0, "reps": 5, "rpe": 8}
            ]
        })))
        .with_status(201)
        .with_body(format!(
            r#"{{"id": 11, "user_id": 1, "date": "2024-05-06", "overall_rpe": 8, {TIMESTAMPS},
                "sets": [{{"id": 90, "session_id": 11, "exercise_id": 4, "set_order": 1,
                           "weight": 100.0, "reps": 5, "rpe": 8, {TIMESTAMPS}}}]}}"#
        ))
        .expect(1)
        .create_async()
        .await;

    let detail = ctx
        .client
        .create_workout(&WorkoutSessionDraft {
            date: NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
            duration_min: None,
            body_weight: None,
            overall_rpe: Some(8),
            notes: None,
            template_name: None,
            sets: vec![WorkoutSetDraft {
                exercise_id: 4,
                set_order: 1,
                weight: 100.0,
                reps: 5,
                rpe: Some(8),
                rest_seconds: None,
                tempo: None,
                notes: None,
            }],
        })
        .await
        .unwrap();

    assert_eq!(detail.session.id, 11);
    assert_eq!(detail.sets[0].session_id, 11);
    create.assert_async().await;
}

#[tokio::test]
async fn test_invalid_set_is_rejected_before_sending() {
    let mut ctx = TestContext::signed_in().await;
    let add = ctx
        .server
        .mock("POST", "/api/workouts/11/sets")
        .expect(0)
        .create_async()
        .await;

    let err = ctx
        .client
        .add_set(
            11,
            &WorkoutSetDraft {
                exercise_id: 4,
                set_order: 1,
                weight: 100.0,
                reps: 0,
                rpe: None,
                rest_seconds: None,
                tempo: None,
                notes: None,
            },
        )
        .await
        .unwrap_err();

    match err {
        ClientError::Validation(validation) => assert_eq!(validation.field, "reps"),
        other => panic!("unexpected error: {other:?}"),
    }
    add.assert_async().await;
}

#[tokio::test]
async fn test_delete_accepts_empty_response() {
    let mut ctx = TestContext::signed_in().await;
    let delete = ctx
        .server
        .mock("DELETE", "/api/workouts/11/sets/90")
        .with_status(204)
        .expect(1)
        .create_async()
        .await;

    ctx.client.delete_set(11, 90).await.unwrap();
    delete.assert_async().await;
}

#[tokio::test]
async fn test_templates_round_trip() {
    let mut ctx = TestContext::signed_in().await;
    let save = ctx
        .server
        .mock("POST", "/api/workouts/11/save-template")
        .match_body(Matcher::Json(json!({"template_name": "Push A"})))
        .with_status(201)
        .with_body(r#"{"message": "saved", "template_name": "Push A"}"#)
        .expect(1)
        .create_async()
        .await;
    let start = ctx
        .server
        .mock("POST", "/api/workouts/from-template")
        .match_body(Matcher::Json(json!({"template_name": "Push A", "date": "2024-05-13"})))
        .with_status(201)
        .with_body(format!(
            r#"{{"id": 12, "user_id": 1, "date": "2024-05-13", "template_name": "Push A", {TIMESTAMPS}, "sets": []}}"#
        ))
        .expect(1)
        .create_async()
        .await;

    let saved = ctx.client.save_as_template(11, "Push A").await.unwrap();
    assert_eq!(saved.template_name, "Push A");

    let session = ctx
        .client
        .start_from_template("Push A", NaiveDate::from_ymd_opt(2024, 5, 13).unwrap())
        .await
        .unwrap();
    assert_eq!(session.session.template_name.as_deref(), Some("Push A"));
    assert!(session.sets.is_empty());

    save.assert_async().await;
    start.assert_async().await;
}

#[tokio::test]
async fn test_analysis_parameters_are_forwarded() {
    let mut ctx = TestContext::signed_in().await;
    let volume = ctx
        .server
        .mock("GET", "/api/analysis/volume")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("period".into(), "month".into()),
            Matcher::UrlEncoded("start_date".into(), "2024-04-01".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{"period": "month", "start_date": "2024-04-01", "end_date": "2024-04-30",
                "total_sessions": 12, "total_sets": 180, "total_reps": 1100,
                "total_volume": 84250.5, "daily_stats": []}"#,
        )
        .expect(1)
        .create_async()
        .await;
    let trend = ctx
        .server
        .mock("GET", "/api/analysis/1rm/4")
        .match_query(Matcher::UrlEncoded("days".into(), "180".into()))
        .with_status(200)
        .with_body(
            r#"{"exercise_id": 4, "exercise_name": "Bench Press", "current_1rm": 120.0,
                "previous_1rm": 115.0, "change_percentage": 4.35,
                "trend": [{"date": "2024-04-01", "estimated_1rm": 115.0}]}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let stats = ctx
        .client
        .volume_stats(VolumePeriod::Month, NaiveDate::from_ymd_opt(2024, 4, 1))
        .await
        .unwrap();
    assert_eq!(stats.period, VolumePeriod::Month);
    assert_eq!(stats.total_sessions, 12);

    let one_rm = ctx.client.one_rm_trend(4, Some(180)).await.unwrap();
    assert_eq!(one_rm.current_1rm, Some(120.0));
    assert_eq!(one_rm.trend.len(), 1);

    volume.assert_async().await;
    trend.assert_async().await;
}

#[tokio::test]
async fn test_one_rm_calculation_passes_server_result_through() {
    let mut ctx = TestContext::signed_in().await;
    ctx.server
        .mock("POST", "/api/analysis/1rm/calculate")
        .match_body(Matcher::Json(json!({"weight": 100.0, "reps": 5, "rpe": 9})))
        .with_status(200)
        .with_body(
            r#"{"estimated_1rm": 117.6, "effective_reps": 6,
                "method_weights": {"epley": 120.0, "brzycki": 116.1}, "confidence": 0.9}"#,
        )
        .create_async()
        .await;

    let result = ctx
        .client
        .calculate_one_rm(&OneRmCalculateRequest {
            weight: 100.0,
            reps: 5,
            rpe: Some(9),
        })
        .await
        .unwrap();
    assert_eq!(result.estimated_1rm, 117.6);
    assert_eq!(result.method_weights.get("epley"), Some(&120.0));
}

#[tokio::test]
async fn test_profile_update_uses_put() {
    let mut ctx = TestContext::signed_in().await;
    let update = ctx
        .server
        .mock("PUT", "/api/auth/me")
        .match_header("authorization", "Bearer T1")
        .match_body(Matcher::Json(json!({"body_weight": 82.5})))
        .with_status(200)
        .with_body(user_body())
        .expect(1)
        .create_async()
        .await;

    let user = ctx
        .client
        .update_profile(&UserUpdate {
            body_weight: Some(82.5),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(user.body_weight, Some(82.5));
    update.assert_async().await;
}

#[tokio::test]
async fn test_login_failure_is_not_treated_as_expiry() {
    let mut ctx = TestContext::signed_in().await;
    ctx.server
        .mock("POST", "/api/auth/login")
        .match_header("authorization", Matcher::Missing)
        .with_status(401)
        .with_body(r#"{"detail":"Incorrect email or password"}"#)
        .create_async()
        .await;
    let refresh = ctx
        .server
        .mock("POST", "/api/auth/refresh")
        .expect(0)
        .create_async()
        .await;

    let err = ctx
        .client
        .login(&liftlog_lib::models::LoginCredentials {
            email: "lifter@example.com".to_string(),
            password: "wrong-password".to_string(),
        })
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
    assert!(ctx.client.session().is_authenticated().await);
    refresh.assert_async().await;
}
