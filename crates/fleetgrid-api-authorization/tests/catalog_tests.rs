//! Integration tests for the capability catalog: seeding idempotence,
//! lookup, search, and category summaries.

mod common;

use common::{capability_map, unique_name, TestFixture};

use fleetgrid_api_authorization::models::CreateCustomRoleRequest;
use fleetgrid_api_authorization::ApiError;
use fleetgrid_db::{AccessLevel, Capability};

#[tokio::test]
async fn seeding_twice_changes_nothing() {
    let fixture = TestFixture::new().await;
    let service = fixture.capability_service();

    let before = Capability::count(&fixture.pool).await.unwrap();

    let first = service.seed().await.unwrap();
    let after_first = Capability::count(&fixture.pool).await.unwrap();

    let second = service.seed().await.unwrap();
    let after_second = Capability::count(&fixture.pool).await.unwrap();

    // The fixture already seeded, so both runs are no-ops.
    assert_eq!(first.inserted, 0);
    assert_eq!(second.inserted, 0);
    assert_eq!(before, after_first);
    assert_eq!(after_first, after_second);

    fixture.cleanup().await;
}

#[tokio::test]
async fn reseeding_leaves_existing_grants_untouched() {
    let fixture = TestFixture::new().await;
    let roles = fixture.custom_role_service();

    let role = roles
        .create_from_scratch(
            CreateCustomRoleRequest {
                name: unique_name("reseed-probe"),
                description: None,
                capabilities: capability_map(&[("vehicle.edit", AccessLevel::Limited)]),
            },
            None,
        )
        .await
        .unwrap();

    fixture.capability_service().seed().await.unwrap();

    let reloaded = roles.get(role.id).await.unwrap();
    assert_eq!(reloaded.capabilities.len(), 1);
    assert_eq!(reloaded.capabilities[0].access_level, AccessLevel::Limited);

    roles.delete(role.id).await.unwrap();
    fixture.cleanup().await;
}

#[tokio::test]
async fn lookup_returns_seeded_definition() {
    let fixture = TestFixture::new().await;
    let service = fixture.capability_service();

    let capability = service.get("vehicle.delete").await.unwrap();

    assert_eq!(capability.category, "vehicles");
    assert!(capability.is_system_critical);
    assert_eq!(capability.allowed_levels, vec![AccessLevel::Full]);

    fixture.cleanup().await;
}

#[tokio::test]
async fn lookup_of_unknown_key_is_not_found() {
    let fixture = TestFixture::new().await;
    let service = fixture.capability_service();

    let err = service.get("vehicle.teleport").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    fixture.cleanup().await;
}

#[tokio::test]
async fn search_is_case_insensitive_substring() {
    let fixture = TestFixture::new().await;
    let service = fixture.capability_service();

    let results = service.search("VEHICLE").await.unwrap();

    assert!(!results.is_empty());
    assert!(results.iter().all(|c| {
        c.key.contains("vehicle")
            || c.name.to_lowercase().contains("vehicle")
            || c.description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains("vehicle"))
    }));
    assert!(results.iter().any(|c| c.key == "vehicle.create"));

    fixture.cleanup().await;
}

#[tokio::test]
async fn empty_search_keyword_is_rejected() {
    let fixture = TestFixture::new().await;
    let service = fixture.capability_service();

    let err = service.search("   ").await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));

    fixture.cleanup().await;
}

#[tokio::test]
async fn category_summaries_cover_the_whole_catalog() {
    let fixture = TestFixture::new().await;
    let service = fixture.capability_service();

    let categories = service.categories().await.unwrap();
    let total = Capability::count(&fixture.pool).await.unwrap();

    let summed: i64 = categories.iter().map(|c| c.capability_count).sum();
    assert_eq!(summed, total);

    let by_category = service.by_category("vehicles").await.unwrap();
    let vehicles = categories
        .iter()
        .find(|c| c.category == "vehicles")
        .expect("vehicles category missing");
    assert_eq!(by_category.len() as i64, vehicles.capability_count);

    fixture.cleanup().await;
}
