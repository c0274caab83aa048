//! Build-time capability catalog definitions and seeding.
//!
//! The definition table below is the deployed version's capability
//! namespace. It is compiled in, immutable at runtime, and written into the
//! `capabilities` table by [`seed_catalog`]: insert-missing-only, so
//! re-seeding never mutates or removes rows that existing grants reference.
//! At request time the *persisted* catalog is authoritative; changing this
//! table requires a redeploy plus a reseed.

use sqlx::PgPool;

use fleetgrid_db::models::capability::NewCapability;
use fleetgrid_db::{AccessLevel, Capability};

use crate::error::Result;

/// One build-time capability definition.
#[derive(Debug, Clone, Copy)]
pub struct CapabilityDef {
    /// Globally unique dotted key.
    pub key: &'static str,
    /// Grouping category.
    pub category: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// What the capability governs.
    pub description: &'static str,
    /// Legal grant strengths, weakest first.
    pub allowed_levels: &'static [AccessLevel],
    /// Deserves extra scrutiny when granted or weakened.
    pub is_system_critical: bool,
}

const VIEW_FULL: &[AccessLevel] = &[AccessLevel::View, AccessLevel::Full];
const LIMITED_FULL: &[AccessLevel] = &[AccessLevel::Limited, AccessLevel::Full];
const FULL_ONLY: &[AccessLevel] = &[AccessLevel::Full];
const ALL_GRANTABLE: &[AccessLevel] = &[AccessLevel::View, AccessLevel::Limited, AccessLevel::Full];

/// The versioned capability namespace for this deployment.
pub const CAPABILITY_DEFINITIONS: &[CapabilityDef] = &[
    // Vehicles
    CapabilityDef {
        key: "vehicle.view",
        category: "vehicles",
        name: "View vehicles",
        description: "See vehicle records and their status",
        allowed_levels: ALL_GRANTABLE,
        is_system_critical: false,
    },
    CapabilityDef {
        key: "vehicle.create",
        category: "vehicles",
        name: "Create vehicles",
        description: "Register new vehicles in the fleet",
        allowed_levels: LIMITED_FULL,
        is_system_critical: false,
    },
    CapabilityDef {
        key: "vehicle.edit",
        category: "vehicles",
        name: "Edit vehicles",
        description: "Modify vehicle records",
        allowed_levels: ALL_GRANTABLE,
        is_system_critical: false,
    },
    CapabilityDef {
        key: "vehicle.delete",
        category: "vehicles",
        name: "Delete vehicles",
        description: "Remove vehicles from the fleet",
        allowed_levels: FULL_ONLY,
        is_system_critical: true,
    },
    CapabilityDef {
        key: "vehicle.assign",
        category: "vehicles",
        name: "Assign vehicles",
        description: "Assign vehicles to drivers and routes",
        allowed_levels: LIMITED_FULL,
        is_system_critical: false,
    },
    // Drivers
    CapabilityDef {
        key: "driver.view",
        category: "drivers",
        name: "View drivers",
        description: "See driver profiles and availability",
        allowed_levels: ALL_GRANTABLE,
        is_system_critical: false,
    },
    CapabilityDef {
        key: "driver.create",
        category: "drivers",
        name: "Create drivers",
        description: "Onboard new drivers",
        allowed_levels: LIMITED_FULL,
        is_system_critical: false,
    },
    CapabilityDef {
        key: "driver.edit",
        category: "drivers",
        name: "Edit drivers",
        description: "Modify driver profiles",
        allowed_levels: ALL_GRANTABLE,
        is_system_critical: false,
    },
    CapabilityDef {
        key: "driver.delete",
        category: "drivers",
        name: "Delete drivers",
        description: "Remove driver profiles",
        allowed_levels: FULL_ONLY,
        is_system_critical: true,
    },
    CapabilityDef {
        key: "driver.license.verify",
        category: "drivers",
        name: "Verify licenses",
        description: "Record driver license verification results",
        allowed_levels: LIMITED_FULL,
        is_system_critical: false,
    },
    // Expenses
    CapabilityDef {
        key: "expense.view",
        category: "expenses",
        name: "View expenses",
        description: "See expense entries",
        allowed_levels: ALL_GRANTABLE,
        is_system_critical: false,
    },
    CapabilityDef {
        key: "expense.create",
        category: "expenses",
        name: "Create expenses",
        description: "Record new expenses",
        allowed_levels: LIMITED_FULL,
        is_system_critical: false,
    },
    CapabilityDef {
        key: "expense.edit",
        category: "expenses",
        name: "Edit expenses",
        description: "Modify expense entries",
        allowed_levels: ALL_GRANTABLE,
        is_system_critical: false,
    },
    CapabilityDef {
        key: "expense.approve",
        category: "expenses",
        name: "Approve expenses",
        description: "Approve or reject submitted expenses",
        allowed_levels: LIMITED_FULL,
        is_system_critical: false,
    },
    CapabilityDef {
        key: "expense.delete",
        category: "expenses",
        name: "Delete expenses",
        description: "Remove expense entries",
        allowed_levels: FULL_ONLY,
        is_system_critical: false,
    },
    // Invoices
    CapabilityDef {
        key: "invoice.view",
        category: "invoices",
        name: "View invoices",
        description: "See invoices and their payment state",
        allowed_levels: ALL_GRANTABLE,
        is_system_critical: false,
    },
    CapabilityDef {
        key: "invoice.create",
        category: "invoices",
        name: "Create invoices",
        description: "Issue new invoices",
        allowed_levels: LIMITED_FULL,
        is_system_critical: false,
    },
    CapabilityDef {
        key: "invoice.edit",
        category: "invoices",
        name: "Edit invoices",
        description: "Modify draft invoices",
        allowed_levels: ALL_GRANTABLE,
        is_system_critical: false,
    },
    CapabilityDef {
        key: "invoice.send",
        category: "invoices",
        name: "Send invoices",
        description: "Deliver invoices to customers",
        allowed_levels: LIMITED_FULL,
        is_system_critical: false,
    },
    CapabilityDef {
        key: "invoice.delete",
        category: "invoices",
        name: "Delete invoices",
        description: "Remove invoices",
        allowed_levels: FULL_ONLY,
        is_system_critical: true,
    },
    // Payments
    CapabilityDef {
        key: "payment.view",
        category: "payments",
        name: "View payments",
        description: "See recorded payments",
        allowed_levels: ALL_GRANTABLE,
        is_system_critical: false,
    },
    CapabilityDef {
        key: "payment.record",
        category: "payments",
        name: "Record payments",
        description: "Record incoming payments against invoices",
        allowed_levels: LIMITED_FULL,
        is_system_critical: false,
    },
    CapabilityDef {
        key: "payment.refund",
        category: "payments",
        name: "Issue refunds",
        description: "Issue refunds for recorded payments",
        allowed_levels: FULL_ONLY,
        is_system_critical: true,
    },
    // Reports
    CapabilityDef {
        key: "report.view",
        category: "reports",
        name: "View reports",
        description: "See operational reports",
        allowed_levels: VIEW_FULL,
        is_system_critical: false,
    },
    CapabilityDef {
        key: "report.export",
        category: "reports",
        name: "Export reports",
        description: "Export report data",
        allowed_levels: LIMITED_FULL,
        is_system_critical: false,
    },
    CapabilityDef {
        key: "report.financial",
        category: "reports",
        name: "Financial reports",
        description: "See revenue and cost reporting",
        allowed_levels: VIEW_FULL,
        is_system_critical: true,
    },
    // Tracking
    CapabilityDef {
        key: "tracking.view",
        category: "tracking",
        name: "Live tracking",
        description: "See live vehicle positions",
        allowed_levels: VIEW_FULL,
        is_system_critical: false,
    },
    CapabilityDef {
        key: "tracking.history",
        category: "tracking",
        name: "Tracking history",
        description: "See historical route playback",
        allowed_levels: VIEW_FULL,
        is_system_critical: false,
    },
    CapabilityDef {
        key: "tracking.geofence.manage",
        category: "tracking",
        name: "Manage geofences",
        description: "Create and edit geofence boundaries",
        allowed_levels: LIMITED_FULL,
        is_system_critical: false,
    },
    // Organization
    CapabilityDef {
        key: "organization.settings.view",
        category: "organization",
        name: "View settings",
        description: "See organization settings",
        allowed_levels: VIEW_FULL,
        is_system_critical: false,
    },
    CapabilityDef {
        key: "organization.settings.edit",
        category: "organization",
        name: "Edit settings",
        description: "Change organization settings",
        allowed_levels: FULL_ONLY,
        is_system_critical: true,
    },
    CapabilityDef {
        key: "organization.billing.manage",
        category: "organization",
        name: "Manage billing",
        description: "Manage the organization's subscription and billing",
        allowed_levels: FULL_ONLY,
        is_system_critical: true,
    },
    // Users
    CapabilityDef {
        key: "user.view",
        category: "users",
        name: "View users",
        description: "See organization members",
        allowed_levels: ALL_GRANTABLE,
        is_system_critical: false,
    },
    CapabilityDef {
        key: "user.invite",
        category: "users",
        name: "Invite users",
        description: "Invite new members to the organization",
        allowed_levels: LIMITED_FULL,
        is_system_critical: false,
    },
    CapabilityDef {
        key: "user.manage",
        category: "users",
        name: "Manage users",
        description: "Change member roles and deactivate accounts",
        allowed_levels: FULL_ONLY,
        is_system_critical: true,
    },
    // Role management (governs this engine's own management surface)
    CapabilityDef {
        key: "role.custom.view",
        category: "roles",
        name: "View custom roles",
        description: "See custom roles and their grants",
        allowed_levels: VIEW_FULL,
        is_system_critical: false,
    },
    CapabilityDef {
        key: "role.custom.create",
        category: "roles",
        name: "Create custom roles",
        description: "Create custom roles from scratch or from templates",
        allowed_levels: FULL_ONLY,
        is_system_critical: true,
    },
    CapabilityDef {
        key: "role.custom.edit",
        category: "roles",
        name: "Edit custom roles",
        description: "Change custom role grants and metadata",
        allowed_levels: FULL_ONLY,
        is_system_critical: true,
    },
    CapabilityDef {
        key: "role.custom.delete",
        category: "roles",
        name: "Delete custom roles",
        description: "Delete unused custom roles",
        allowed_levels: FULL_ONLY,
        is_system_critical: true,
    },
    CapabilityDef {
        key: "capability.catalog.view",
        category: "roles",
        name: "View capability catalog",
        description: "Browse and search the capability catalog",
        allowed_levels: VIEW_FULL,
        is_system_critical: false,
    },
];

/// Seed the persisted catalog from the build-time definitions.
///
/// Idempotent: only missing keys are inserted; existing rows are never
/// touched. Returns the number of rows inserted.
pub async fn seed_catalog(pool: &PgPool) -> Result<u64> {
    let mut inserted = 0u64;

    for def in CAPABILITY_DEFINITIONS {
        let input = NewCapability {
            key: def.key.to_string(),
            category: def.category.to_string(),
            name: def.name.to_string(),
            description: Some(def.description.to_string()),
            allowed_levels: def.allowed_levels.to_vec(),
            is_system_critical: def.is_system_critical,
        };

        if Capability::insert_missing(pool, &input).await? {
            inserted += 1;
        }
    }

    tracing::info!(
        target: "authorization",
        inserted,
        total = CAPABILITY_DEFINITIONS.len(),
        "Capability catalog seeded"
    );

    Ok(inserted)
}

/// Look up a build-time definition by key.
#[must_use]
pub fn find_definition(key: &str) -> Option<&'static CapabilityDef> {
    CAPABILITY_DEFINITIONS.iter().find(|d| d.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn definition_keys_are_unique() {
        let mut seen = HashSet::new();
        for def in CAPABILITY_DEFINITIONS {
            assert!(seen.insert(def.key), "duplicate capability key: {}", def.key);
        }
    }

    #[test]
    fn definition_keys_are_dotted_lowercase() {
        for def in CAPABILITY_DEFINITIONS {
            assert!(def.key.contains('.'), "key without namespace: {}", def.key);
            assert_eq!(def.key, def.key.to_lowercase());
        }
    }

    #[test]
    fn allowed_levels_are_nonempty_and_grantable() {
        for def in CAPABILITY_DEFINITIONS {
            assert!(
                !def.allowed_levels.is_empty(),
                "{} has no allowed levels",
                def.key
            );
            // None is the absence of a grant, never a grantable strength.
            assert!(
                !def.allowed_levels.contains(&AccessLevel::None),
                "{} allows None",
                def.key
            );
        }
    }

    #[test]
    fn every_capability_is_grantable_at_full() {
        for def in CAPABILITY_DEFINITIONS {
            assert!(
                def.allowed_levels.contains(&AccessLevel::Full),
                "{} cannot be granted at Full",
                def.key
            );
        }
    }

    #[test]
    fn role_management_keys_exist() {
        for key in [
            "role.custom.view",
            "role.custom.create",
            "role.custom.edit",
            "role.custom.delete",
            "capability.catalog.view",
        ] {
            assert!(find_definition(key).is_some(), "missing {key}");
        }
    }
}
