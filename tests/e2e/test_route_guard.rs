use crate::e2e::helpers;

use helpers::{generate_test_jwt, generate_test_jwt_with_ttl, TestContext};
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_redirect_anonymous_visitors_to_login(ctx: &TestContext) {
    let response = ctx.client.get("/subscribe?plan=2").await.unwrap();

    response
        .assert_status(StatusCode::SEE_OTHER)
        .assert_header("location", "/login?redirect=%2Fsubscribe%3Fplan%3D2");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_render_for_any_signed_in_user(ctx: &TestContext) {
    let token = generate_test_jwt(11, "student");

    let response = ctx.client.get_with_auth("/dashboard", &token).await.unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.body,
        Some(json!({ "id": 11, "email": "user11@example.com", "role": "student" }))
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_deny_insufficient_roles_inline(ctx: &TestContext) {
    let token = generate_test_jwt(12, "editor");

    let response = ctx.client.get_with_auth("/admin", &token).await.unwrap();

    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.field("required_role"), Some("admin"));
    assert_eq!(response.field("user_role"), Some("editor"));
    assert!(response.header("location").is_none());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_let_higher_roles_through(ctx: &TestContext) {
    for role in ["editor", "admin"] {
        let token = generate_test_jwt(13, role);
        let response = ctx
            .client
            .get_with_auth("/templates/edit", &token)
            .await
            .unwrap();
        response.assert_status(StatusCode::OK);
    }

    let token = generate_test_jwt(13, "student");
    let response = ctx
        .client
        .get_with_auth("/templates/edit", &token)
        .await
        .unwrap();
    response.assert_status(StatusCode::FORBIDDEN);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_treat_legacy_user_role_as_student(ctx: &TestContext) {
    let token = generate_test_jwt(14, "user");

    let response = ctx.client.get_with_auth("/dashboard", &token).await.unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.field("role"), Some("student"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_redirect_when_the_token_has_expired(ctx: &TestContext) {
    let token = generate_test_jwt_with_ttl(15, "admin", chrono::Duration::hours(-1));

    let response = ctx.client.get_with_auth("/admin", &token).await.unwrap();

    response
        .assert_status(StatusCode::SEE_OTHER)
        .assert_header("location", "/login?redirect=%2Fadmin");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_redirect_on_malformed_authorization(ctx: &TestContext) {
    for value in ["Token abc", "Bearer not-a-jwt", "Bearer "] {
        let response = ctx
            .client
            .get_with_authorization("/dashboard", value)
            .await
            .unwrap();
        response.assert_status(StatusCode::SEE_OTHER);
    }
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_leave_unguarded_routes_alone(ctx: &TestContext) {
    let response = ctx.client.get("/api/payments/plans").await.unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.body.as_ref().and_then(|b| b.get("count")),
        Some(&json!(2))
    );
}
