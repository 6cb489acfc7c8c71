use crate::e2e::helpers;

use helpers::{generate_test_jwt_with_ttl, TestContext};
use pretty_assertions::assert_eq;
use runbox_client::domain::access::{AuthStatus, GuardDecision, Role, RouteGuard};
use runbox_client::domain::auth::SessionService;
use runbox_client::infrastructure::storage::TOKEN_KEY;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_resolve_the_signed_in_user(ctx: &TestContext) {
    let token = ctx.sign_in(21, "editor").await;
    let session = SessionService::new(ctx.store.clone());

    assert_eq!(ctx.store.peek(TOKEN_KEY), Some(token));

    let user = session.current_user().await.unwrap();
    assert_eq!(user.id, 21);
    assert_eq!(user.role, Role::Editor);

    let status = session.auth_status().await;
    assert_eq!(
        RouteGuard::requiring(Role::Editor).evaluate(&status, "/templates/edit"),
        GuardDecision::Render
    );
    assert_eq!(
        RouteGuard::requiring(Role::Admin).evaluate(&status, "/admin"),
        GuardDecision::AccessDenied {
            required: Role::Admin,
            actual: Role::Editor,
        }
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_sign_out(ctx: &TestContext) {
    ctx.sign_in(22, "student").await;
    let session = SessionService::new(ctx.store.clone());

    session.sign_out().await.unwrap();

    assert_eq!(ctx.store.peek(TOKEN_KEY), None);
    assert_eq!(session.auth_status().await, AuthStatus::Anonymous);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_refuse_to_store_an_expired_token(ctx: &TestContext) {
    let session = SessionService::new(ctx.store.clone());
    let token = generate_test_jwt_with_ttl(23, "student", chrono::Duration::hours(-1));

    assert!(session.sign_in(&token).await.is_err());
    assert_eq!(ctx.store.peek(TOKEN_KEY), None);
}
