#![allow(dead_code)]

use chrono::NaiveDateTime;
use reqwest::Client;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, Set, Statement};
use sea_orm_migration::MigratorTrait;
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Once,
};

static INIT: Once = Once::new();
static MIGRATIONS_RAN: AtomicBool = AtomicBool::new(false);
static CATEGORY_COUNTER: AtomicUsize = AtomicUsize::new(0);
static LOCATION_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn init_env() {
    INIT.call_once(|| {
        dotenv::dotenv().ok();
        std::env::set_var(
            "JWT_SECRET",
            "integration_test_secret_that_is_at_least_32_characters_long",
        );
        std::env::set_var("JWT_EXPIRATION", "86400");
        std::env::set_var("RATE_LIMIT_ENABLED", "false");
        std::env::set_var("POSTS_PER_PAGE", "10");
        let config = blogd::config::jwt::JwtConfig::from_env().unwrap();
        let _ = blogd::utils::jwt::init_jwt_config(config);
    });
}

pub struct TestApp {
    pub addr: String,
    pub db: DatabaseConnection,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.addr, path)
    }
}

pub async fn spawn_app() -> TestApp {
    init_env();

    let database_url = std::env::var("TEST_DATABASE_URL")
        .unwrap_or_else(|_| std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"));

    let db = sea_orm::Database::connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    // Run migrations only once globally (using atomic bool for thread safety)
    if !MIGRATIONS_RAN.swap(true, Ordering::SeqCst) {
        blogd::migration::Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");
    }

    // Clean data tables (reverse dependency order)
    cleanup_tables(&db).await;

    let app = axum::Router::new()
        .route("/", axum::routing::get(|| async { "ok" }))
        .merge(blogd::routes::create_routes())
        .layer(axum::extract::Extension(db.clone()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    let addr_str = format!("http://{}", addr);
    let client = Client::new();

    TestApp {
        addr: addr_str,
        db,
        client,
    }
}

async fn cleanup_tables(db: &DatabaseConnection) {
    let tables = ["comments", "posts", "locations", "categories", "users"];

    for table in tables {
        let sql = format!("TRUNCATE TABLE {} CASCADE", table);
        let _ = db
            .execute(Statement::from_string(
                sea_orm::DatabaseBackend::Postgres,
                sql,
            ))
            .await;
    }
}

/// Register a user and return (user_id, token).
pub async fn create_test_user(app: &TestApp, username_prefix: &str) -> (i32, String) {
    static USER_COUNTER: AtomicUsize = AtomicUsize::new(0);
    let counter = USER_COUNTER.fetch_add(1, Ordering::SeqCst);
    let unique_username = format!("{}_{}", username_prefix, counter);

    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&serde_json::json!({
            "username": unique_username,
            "email": format!("{}@test.com", unique_username),
            "password": "test_password_123"
        }))
        .send()
        .await
        .expect("Failed to register user");

    let status = resp.status();
    let body: serde_json::Value = resp.json().await.unwrap_or_else(|e| {
        panic!(
            "Failed to parse register response for user '{}': status={}, error={}",
            unique_username, status, e
        );
    });

    if !body["success"].as_bool().unwrap_or(false) {
        panic!(
            "Failed to register user '{}': status={}, body={}",
            unique_username, status, body
        );
    }

    let user_id = body["data"]["user_id"]
        .as_i64()
        .unwrap_or_else(|| panic!("Response missing user_id for '{}': {}", unique_username, body))
        as i32;
    let token = body["data"]["token"]
        .as_str()
        .unwrap_or_else(|| panic!("Response missing token for '{}': {}", unique_username, body))
        .to_string();
    (user_id, token)
}

/// Username as issued by the register endpoint for a given (id, token)
/// pair cannot be recovered from the token, so fetch it via /auth/me.
pub async fn username_of(app: &TestApp, token: &str) -> String {
    let body: serde_json::Value = app
        .client
        .get(app.url("/auth/me"))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to fetch current user")
        .json()
        .await
        .expect("Failed to parse current user");
    body["data"]["username"]
        .as_str()
        .expect("Response missing username")
        .to_string()
}

/// Insert a category directly; there is no admin API for categories.
pub async fn create_test_category(db: &DatabaseConnection, published: bool) -> (i32, String) {
    let counter = CATEGORY_COUNTER.fetch_add(1, Ordering::SeqCst);
    let slug = format!("test-category-{}", counter);

    let category = blogd::models::category::ActiveModel {
        title: Set(format!("Test Category {}", counter)),
        description: Set("A test category".to_string()),
        slug: Set(slug.clone()),
        is_published: Set(published),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert category");

    (category.id, slug)
}

/// Insert a location directly; locations are fixture data.
pub async fn create_test_location(db: &DatabaseConnection, published: bool) -> i32 {
    let counter = LOCATION_COUNTER.fetch_add(1, Ordering::SeqCst);

    let location = blogd::models::location::ActiveModel {
        name: Set(format!("Test Location {}", counter)),
        is_published: Set(published),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert location");

    location.id
}

/// Create a post through the API and return its id.
pub async fn create_test_post(
    app: &TestApp,
    token: &str,
    category_id: Option<i32>,
    pub_date: NaiveDateTime,
) -> i32 {
    let resp = app
        .client
        .post(app.url("/posts"))
        .bearer_auth(token)
        .json(&serde_json::json!({
            "title": "Test post",
            "text": "Test post body",
            "pub_date": pub_date,
            "category_id": category_id
        }))
        .send()
        .await
        .expect("Failed to create post");

    let status = resp.status();
    let body: serde_json::Value = resp.json().await.expect("Failed to parse post response");
    assert!(
        status.is_success(),
        "Failed to create post: status={}, body={}",
        status,
        body
    );
    body["data"]["id"].as_i64().expect("Response missing post id") as i32
}

/// Insert a post directly, bypassing the API. Needed for drafts: the
/// publish endpoint always sets is_published.
pub async fn insert_post(
    db: &DatabaseConnection,
    author_id: i32,
    category_id: Option<i32>,
    pub_date: NaiveDateTime,
    is_published: bool,
) -> i32 {
    let now = chrono::Utc::now().naive_utc();

    let post = blogd::models::post::ActiveModel {
        author_id: Set(author_id),
        category_id: Set(category_id),
        location_id: Set(None),
        title: Set("Inserted post".to_string()),
        text: Set("Inserted post body".to_string()),
        pub_date: Set(pub_date),
        is_published: Set(is_published),
        image_url: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert post");

    post.id
}

/// Add a comment through the API and return its id.
pub async fn create_test_comment(app: &TestApp, token: &str, post_id: i32, text: &str) -> i32 {
    let resp = app
        .client
        .post(app.url(&format!("/posts/{}/comments", post_id)))
        .bearer_auth(token)
        .json(&serde_json::json!({ "text": text }))
        .send()
        .await
        .expect("Failed to create comment");

    let status = resp.status();
    let body: serde_json::Value = resp.json().await.expect("Failed to parse comment response");
    assert!(
        status.is_success(),
        "Failed to create comment: status={}, body={}",
        status,
        body
    );
    body["data"]["id"].as_i64().expect("Response missing comment id") as i32
}

pub fn past(minutes: i64) -> NaiveDateTime {
    chrono::Utc::now().naive_utc() - chrono::Duration::minutes(minutes)
}

pub fn future(minutes: i64) -> NaiveDateTime {
    chrono::Utc::now().naive_utc() + chrono::Duration::minutes(minutes)
}
