use axum::{routing::get, Extension, Json, Router};
use runbox_client::domain::access::{Role, RouteGuard, User};
use runbox_client::domain::auth::{ClaimsReader, SessionService};
use runbox_client::domain::preferences::PreferenceStore;
use runbox_client::infrastructure::http::{guarded, ApiClient, GuardState};
use runbox_client::infrastructure::repositories::{
    BillingRepository, CachedPreferenceBackend, HttpBillingRepository, HttpPreferenceBackend,
};
use runbox_client::infrastructure::storage::MemoryStore;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use test_context::AsyncTestContext;
use tokio::net::TcpListener;

pub mod api_client;

use api_client::TestClient;
use fake_backend::{FakeBackend, BACKEND_SECRET};

pub const LOGIN_PATH: &str = "/login";

pub struct TestContext {
    /// Raw client for the guarded pages.
    pub client: TestClient,
    pub backend: Arc<FakeBackend>,
    pub store: Arc<MemoryStore>,
    pub api: Arc<ApiClient>,
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            let backend = Arc::new(FakeBackend::default());
            let app = create_app(backend.clone());

            // Start server
            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("Failed to bind listener");
            let addr = listener.local_addr().expect("Failed to get local addr");
            let base_url = format!("http://{}", addr);

            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            // Wait for server to be ready
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

            let store = Arc::new(MemoryStore::new());
            let api = Arc::new(
                ApiClient::new(&base_url, Duration::from_secs(5), store.clone())
                    .expect("Failed to build API client"),
            );

            Self {
                client: TestClient::new(&base_url),
                backend,
                store,
                api,
            }
        }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async {}
    }
}

impl TestContext {
    /// Store a backend-issued token in the local store, as the login page
    /// would.
    pub async fn sign_in(&self, user_id: i64, role: &str) -> String {
        let token = generate_test_jwt(user_id, role);
        SessionService::new(self.store.clone())
            .sign_in(&token)
            .await
            .expect("Failed to store session");
        token
    }

    pub fn billing(&self) -> Arc<dyn BillingRepository> {
        Arc::new(HttpBillingRepository::new(self.api.clone()))
    }

    pub fn preference_store(&self) -> PreferenceStore {
        PreferenceStore::new(
            Arc::new(HttpPreferenceBackend::new(self.api.clone())),
            Arc::new(CachedPreferenceBackend::new(self.store.clone())),
        )
    }
}

/// Fake backend API plus a few guarded pages.
fn create_app(backend: Arc<FakeBackend>) -> Router {
    let claims = Arc::new(ClaimsReader::new());

    let member_pages = guarded(
        Router::new()
            .route("/dashboard", get(whoami))
            .route("/subscribe", get(whoami)),
        GuardState::new(claims.clone(), RouteGuard::authenticated(), LOGIN_PATH),
    );
    let editor_pages = guarded(
        Router::new().route("/templates/edit", get(whoami)),
        GuardState::new(claims.clone(), RouteGuard::requiring(Role::Editor), LOGIN_PATH),
    );
    let admin_pages = guarded(
        Router::new().route("/admin", get(whoami)),
        GuardState::new(claims, RouteGuard::requiring(Role::Admin), LOGIN_PATH),
    );

    fake_backend::router(backend)
        .merge(member_pages)
        .merge(editor_pages)
        .merge(admin_pages)
}

async fn whoami(Extension(user): Extension<User>) -> Json<Value> {
    Json(json!({ "id": user.id, "email": user.email, "role": user.role }))
}

/// Access token signed the way the backend signs them.
pub fn generate_test_jwt(user_id: i64, role: &str) -> String {
    generate_test_jwt_with_ttl(user_id, role, chrono::Duration::hours(1))
}

pub fn generate_test_jwt_with_ttl(user_id: i64, role: &str, ttl: chrono::Duration) -> String {
    sign_test_jwt(user_id, role, ttl, BACKEND_SECRET)
}

/// Well-formed access token the backend will refuse.
pub fn generate_jwt_signed_with(user_id: i64, role: &str, secret: &str) -> String {
    sign_test_jwt(user_id, role, chrono::Duration::hours(1), secret)
}

fn sign_test_jwt(user_id: i64, role: &str, ttl: chrono::Duration, secret: &str) -> String {
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use serde::Serialize;

    #[derive(Serialize)]
    struct Claims {
        user_id: i64,
        email: String,
        role: String,
        exp: i64,
        iat: i64,
        #[serde(rename = "type")]
        token_type: &'static str,
    }

    let now = chrono::Utc::now();
    let claims = Claims {
        user_id,
        email: format!("user{}@example.com", user_id),
        role: role.to_string(),
        exp: (now + ttl).timestamp(),
        iat: now.timestamp(),
        token_type: "access",
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}
