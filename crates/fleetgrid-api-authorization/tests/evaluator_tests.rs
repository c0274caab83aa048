//! Integration tests for the evaluation hot path: grant comparison,
//! bypass roles, fail-closed defaults, and effective-map agreement.

mod common;

use common::{capability_map, create_assignment, unique_name, TestFixture};
use uuid::Uuid;

use fleetgrid_api_authorization::models::CreateCustomRoleRequest;
use fleetgrid_authorization::DecisionSource;
use fleetgrid_db::AccessLevel;

#[tokio::test]
async fn limited_grant_satisfies_view_but_not_full() {
    let fixture = TestFixture::new().await;
    let roles = fixture.custom_role_service();
    let evaluator = fixture.evaluator();

    let role = roles
        .create_from_scratch(
            CreateCustomRoleRequest {
                name: unique_name("limited-editor"),
                description: None,
                capabilities: capability_map(&[("vehicle.edit", AccessLevel::Limited)]),
            },
            None,
        )
        .await
        .unwrap();

    let user_id = Uuid::new_v4();
    create_assignment(&fixture.pool, user_id, fixture.organization_id, role.id).await;

    assert!(
        evaluator
            .check(user_id, fixture.organization_id, "vehicle.edit", AccessLevel::View)
            .await
    );
    assert!(
        evaluator
            .check(
                user_id,
                fixture.organization_id,
                "vehicle.edit",
                AccessLevel::Limited
            )
            .await
    );
    assert!(
        !evaluator
            .check(user_id, fixture.organization_id, "vehicle.edit", AccessLevel::Full)
            .await
    );

    fixture.cleanup().await;
    roles.delete(role.id).await.unwrap();
}

#[tokio::test]
async fn owner_passes_every_check_without_grant_rows() {
    let fixture = TestFixture::new().await;
    let evaluator = fixture.evaluator();

    for key in ["vehicle.delete", "organization.billing.manage", "role.custom.create"] {
        assert!(
            evaluator
                .check(
                    fixture.owner_user_id,
                    fixture.organization_id,
                    key,
                    AccessLevel::Full
                )
                .await,
            "owner denied {key}"
        );
    }

    let decision = evaluator
        .check_detailed(
            fixture.owner_user_id,
            fixture.organization_id,
            "vehicle.delete",
            AccessLevel::Full,
        )
        .await;
    assert_eq!(decision.source, DecisionSource::BypassRole);

    fixture.cleanup().await;
}

#[tokio::test]
async fn user_without_assignment_is_denied() {
    let fixture = TestFixture::new().await;
    let evaluator = fixture.evaluator();

    let stranger = Uuid::new_v4();
    let decision = evaluator
        .check_detailed(
            stranger,
            fixture.organization_id,
            "vehicle.view",
            AccessLevel::View,
        )
        .await;

    assert!(!decision.allowed);
    assert_eq!(decision.source, DecisionSource::NoAssignment);

    fixture.cleanup().await;
}

#[tokio::test]
async fn missing_grant_is_denied() {
    let fixture = TestFixture::new().await;
    let roles = fixture.custom_role_service();
    let evaluator = fixture.evaluator();

    let role = roles
        .create_from_scratch(
            CreateCustomRoleRequest {
                name: unique_name("narrow"),
                description: None,
                capabilities: capability_map(&[("expense.view", AccessLevel::View)]),
            },
            None,
        )
        .await
        .unwrap();

    let user_id = Uuid::new_v4();
    create_assignment(&fixture.pool, user_id, fixture.organization_id, role.id).await;

    let decision = evaluator
        .check_detailed(
            user_id,
            fixture.organization_id,
            "vehicle.delete",
            AccessLevel::Full,
        )
        .await;

    assert!(!decision.allowed);
    assert_eq!(decision.source, DecisionSource::NoGrant);

    fixture.cleanup().await;
    roles.delete(role.id).await.unwrap();
}

#[tokio::test]
async fn effective_map_agrees_with_grants_and_checks() {
    let fixture = TestFixture::new().await;
    let roles = fixture.custom_role_service();
    let evaluator = fixture.evaluator();

    let role = roles
        .create_from_scratch(
            CreateCustomRoleRequest {
                name: unique_name("effective-probe"),
                description: None,
                capabilities: capability_map(&[
                    ("vehicle.view", AccessLevel::Full),
                    ("expense.view", AccessLevel::View),
                ]),
            },
            None,
        )
        .await
        .unwrap();

    let user_id = Uuid::new_v4();
    create_assignment(&fixture.pool, user_id, fixture.organization_id, role.id).await;

    let effective = evaluator
        .effective_capabilities(user_id, fixture.organization_id)
        .await
        .unwrap();

    assert_eq!(effective.len(), 2);
    assert_eq!(effective["vehicle.view"].access_level, AccessLevel::Full);
    assert_eq!(effective["expense.view"].access_level, AccessLevel::View);

    // Every effective entry must pass a check at its own level.
    for (key, entry) in &effective {
        assert!(
            evaluator
                .check(user_id, fixture.organization_id, key, entry.access_level)
                .await,
            "effective map and check disagree on {key}"
        );
    }

    fixture.cleanup().await;
    roles.delete(role.id).await.unwrap();
}

#[tokio::test]
async fn effective_map_for_owner_covers_the_catalog_at_full() {
    let fixture = TestFixture::new().await;
    let evaluator = fixture.evaluator();

    let effective = evaluator
        .effective_capabilities(fixture.owner_user_id, fixture.organization_id)
        .await
        .unwrap();

    let total = fleetgrid_db::Capability::count(&fixture.pool).await.unwrap();
    assert_eq!(effective.len() as i64, total);
    assert!(effective
        .values()
        .all(|e| e.access_level == AccessLevel::Full));

    fixture.cleanup().await;
}

#[tokio::test]
async fn effective_map_without_assignment_is_empty() {
    let fixture = TestFixture::new().await;
    let evaluator = fixture.evaluator();

    let effective = evaluator
        .effective_capabilities(Uuid::new_v4(), fixture.organization_id)
        .await
        .unwrap();

    assert!(effective.is_empty());

    fixture.cleanup().await;
}
