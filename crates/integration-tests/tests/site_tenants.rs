//! Integration tests for host-based tenant resolution.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`folio-cli migrate`)
//! - The site running against it (`cargo run -p folio-site`)

use folio_integration_tests::{
    delete_profile, seed_profile, site_base_url, test_pool, unique_domain,
};
use folio_site::db::{ProfileRepository, RepositoryError};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

#[tokio::test]
#[ignore = "Requires running site server and database"]
async fn test_site_resolves_claimed_domain() {
    let pool = test_pool().await;
    let domain = unique_domain();
    let profile = seed_profile(&pool, "Integration Tenant", Some(&domain)).await;

    let resp = Client::new()
        .get(format!("{}/api/site", site_base_url()))
        .header("x-forwarded-host", format!("WWW.{}:443", domain.as_str().to_uppercase()))
        .send()
        .await
        .expect("Failed to get site");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["id"], json!(profile.id.to_string()));
    assert_eq!(body["display_name"], "Integration Tenant");
    assert_eq!(body["avatar_url"], Value::Null);

    delete_profile(&pool, profile.id).await;
}

#[tokio::test]
#[ignore = "Requires running site server and database"]
async fn test_site_unknown_domain_is_not_found() {
    let resp = Client::new()
        .get(format!("{}/api/site", site_base_url()))
        .header("x-forwarded-host", unique_domain().as_str())
        .send()
        .await
        .expect("Failed to get site");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body, json!({ "error": "profile not found" }));
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_domain_cannot_be_claimed_twice() {
    let pool = test_pool().await;
    let domain = unique_domain();
    let first = seed_profile(&pool, "First", Some(&domain)).await;
    let second = seed_profile(&pool, "Second", None).await;

    let result = ProfileRepository::new(&pool)
        .claim_domain(second.id, &domain)
        .await;
    assert!(matches!(result, Err(RepositoryError::Conflict(_))));

    let found = ProfileRepository::new(&pool)
        .find_by_domain(&domain)
        .await
        .expect("Failed to look up domain");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, first.id);

    delete_profile(&pool, first.id).await;
    delete_profile(&pool, second.id).await;
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_released_domain_no_longer_resolves() {
    let pool = test_pool().await;
    let domain = unique_domain();
    let profile = seed_profile(&pool, "Leaving", Some(&domain)).await;

    let repo = ProfileRepository::new(&pool);
    repo.release_domain(profile.id)
        .await
        .expect("Failed to release domain");

    let found = repo
        .find_by_domain(&domain)
        .await
        .expect("Failed to look up domain");
    assert!(found.is_empty());

    delete_profile(&pool, profile.id).await;
}
