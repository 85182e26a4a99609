//! Integration tests for the avatar endpoint.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`folio-cli migrate`)
//! - The site running against it (`cargo run -p folio-site`)
//! - For the rendering test, `AVATAR_SOURCE_URL` pointing at a reachable image

use folio_integration_tests::{delete_profile, seed_profile, site_base_url, test_pool};
use reqwest::{Client, StatusCode, header};
use serde_json::{Value, json};
use uuid::Uuid;

#[tokio::test]
#[ignore = "Requires running site server"]
async fn test_avatar_requires_profile_id() {
    let resp = Client::new()
        .get(format!("{}/avatar", site_base_url()))
        .send()
        .await
        .expect("Failed to get avatar");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body, json!({ "error": "profileId is required" }));
}

#[tokio::test]
#[ignore = "Requires running site server and database"]
async fn test_avatar_unknown_profile_is_not_found() {
    let resp = Client::new()
        .get(format!("{}/avatar?profileId={}", site_base_url(), Uuid::new_v4()))
        .send()
        .await
        .expect("Failed to get avatar");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running site server and database"]
async fn test_avatar_without_upload_is_not_found() {
    let pool = test_pool().await;
    let profile = seed_profile(&pool, "No Avatar", None).await;

    let resp = Client::new()
        .get(format!("{}/avatar?profileId={}", site_base_url(), profile.id))
        .send()
        .await
        .expect("Failed to get avatar");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body, json!({ "error": "avatar not found" }));

    delete_profile(&pool, profile.id).await;
}

#[tokio::test]
#[ignore = "Requires running site server, database and AVATAR_SOURCE_URL"]
async fn test_avatar_renders_square_jpeg() {
    let source = std::env::var("AVATAR_SOURCE_URL").expect("AVATAR_SOURCE_URL must be set");
    let pool = test_pool().await;
    let profile = seed_profile(&pool, "With Avatar", None).await;

    sqlx::query(
        r"
        UPDATE profiles
        SET avatar_url = $2, avatar_position = $3, avatar_zoom = 150
        WHERE id = $1
        ",
    )
    .bind(profile.id)
    .bind(&source)
    .bind(json!({ "x": 30, "y": 70 }))
    .execute(&pool)
    .await
    .expect("Failed to set avatar");

    let resp = Client::new()
        .get(format!("{}/avatar?profileId={}", site_base_url(), profile.id))
        .send()
        .await
        .expect("Failed to get avatar");

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/jpeg");
    assert_eq!(
        resp.headers()[header::CACHE_CONTROL],
        "public, max-age=31536000, immutable"
    );

    let bytes = resp.bytes().await.expect("Failed to read avatar");
    let image = image::load_from_memory(&bytes).expect("Avatar is not an image");
    assert_eq!((image.width(), image.height()), (512, 512));

    delete_profile(&pool, profile.id).await;
}
