//! Template registry: immutable capability bundles for composing roles.
//!
//! Built-in templates are defined here at build time, loaded once into an
//! immutable static, and never mutated at runtime. Promoted templates
//! (save-as-template snapshots) live in the `role_templates` table; the
//! registry resolves built-ins first, then promoted rows.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use fleetgrid_db::{AccessLevel, RoleTemplateRecord};

use crate::error::{AuthorizationError, Result};

/// An immutable, named capability bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Template {
    /// Stable, unique key.
    pub template_key: String,

    /// Display name.
    pub name: String,

    /// Optional description.
    pub description: Option<String>,

    /// Capability key to access level, ordered by key.
    pub capabilities: BTreeMap<String, AccessLevel>,
}

fn template(
    key: &str,
    name: &str,
    description: &str,
    capabilities: &[(&str, AccessLevel)],
) -> Template {
    Template {
        template_key: key.to_string(),
        name: name.to_string(),
        description: Some(description.to_string()),
        capabilities: capabilities
            .iter()
            .map(|(k, v)| ((*k).to_string(), *v))
            .collect(),
    }
}

static BUILTIN_TEMPLATES: Lazy<Vec<Template>> = Lazy::new(|| {
    use AccessLevel::{Full, Limited, View};

    vec![
        template(
            "fleet_manager",
            "Fleet Manager",
            "Day-to-day fleet operations: vehicles, drivers, and tracking",
            &[
                ("vehicle.view", Full),
                ("vehicle.create", Full),
                ("vehicle.edit", Full),
                ("vehicle.assign", Full),
                ("driver.view", Full),
                ("driver.create", Full),
                ("driver.edit", Full),
                ("driver.license.verify", Full),
                ("tracking.view", Full),
                ("tracking.history", Full),
                ("tracking.geofence.manage", Limited),
                ("report.view", Full),
                ("report.export", Limited),
                ("expense.view", View),
            ],
        ),
        template(
            "dispatcher",
            "Dispatcher",
            "Vehicle assignment and live tracking",
            &[
                ("vehicle.view", Full),
                ("vehicle.assign", Full),
                ("driver.view", Full),
                ("tracking.view", Full),
                ("tracking.history", View),
            ],
        ),
        template(
            "accountant",
            "Accountant",
            "Expenses, invoicing, and payments",
            &[
                ("expense.view", Full),
                ("expense.create", Full),
                ("expense.edit", Full),
                ("expense.approve", Full),
                ("invoice.view", Full),
                ("invoice.create", Full),
                ("invoice.edit", Full),
                ("invoice.send", Full),
                ("payment.view", Full),
                ("payment.record", Full),
                ("report.financial", Full),
                ("report.export", Limited),
            ],
        ),
        template(
            "driver_supervisor",
            "Driver Supervisor",
            "Driver management with read access to operations",
            &[
                ("driver.view", Full),
                ("driver.edit", Limited),
                ("driver.license.verify", Full),
                ("vehicle.view", View),
                ("expense.view", View),
                ("tracking.view", View),
            ],
        ),
        template(
            "maintenance_coordinator",
            "Maintenance Coordinator",
            "Vehicle upkeep and related expenses",
            &[
                ("vehicle.view", Full),
                ("vehicle.edit", Limited),
                ("expense.view", Full),
                ("expense.create", Limited),
                ("report.view", View),
            ],
        ),
        template(
            "auditor",
            "Auditor",
            "Read-only access across operations and finance",
            &[
                ("vehicle.view", View),
                ("driver.view", View),
                ("expense.view", View),
                ("invoice.view", View),
                ("payment.view", View),
                ("report.view", View),
                ("report.financial", View),
                ("tracking.history", View),
            ],
        ),
    ]
});

/// The built-in template set.
#[must_use]
pub fn builtin_templates() -> &'static [Template] {
    &BUILTIN_TEMPLATES
}

/// Look up a built-in template by key.
#[must_use]
pub fn find_builtin(template_key: &str) -> Option<&'static Template> {
    BUILTIN_TEMPLATES
        .iter()
        .find(|t| t.template_key == template_key)
}

/// Convert a promoted `role_templates` row into a [`Template`].
pub fn template_from_record(record: RoleTemplateRecord) -> Result<Template> {
    let capabilities: BTreeMap<String, AccessLevel> =
        serde_json::from_value(record.capabilities).map_err(|e| {
            AuthorizationError::Validation(format!(
                "Promoted template '{}' has a malformed capability map: {e}",
                record.template_key
            ))
        })?;

    Ok(Template {
        template_key: record.template_key,
        name: record.name,
        description: record.description,
        capabilities,
    })
}

/// Resolve a template by key: built-in registry first, then promoted rows.
pub async fn resolve_template(pool: &PgPool, template_key: &str) -> Result<Template> {
    if let Some(builtin) = find_builtin(template_key) {
        return Ok(builtin.clone());
    }

    match RoleTemplateRecord::find_by_key(pool, template_key).await? {
        Some(record) => template_from_record(record),
        None => Err(AuthorizationError::TemplateNotFound(
            template_key.to_string(),
        )),
    }
}

/// List every template: built-ins followed by promoted snapshots.
pub async fn list_all(pool: &PgPool) -> Result<Vec<Template>> {
    let mut templates: Vec<Template> = BUILTIN_TEMPLATES.to_vec();

    for record in RoleTemplateRecord::list(pool).await? {
        templates.push(template_from_record(record)?);
    }

    Ok(templates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::find_definition;
    use std::collections::HashSet;

    #[test]
    fn builtin_keys_are_unique() {
        let mut seen = HashSet::new();
        for t in builtin_templates() {
            assert!(
                seen.insert(t.template_key.as_str()),
                "duplicate template key: {}",
                t.template_key
            );
        }
    }

    #[test]
    fn builtin_templates_are_nonempty() {
        for t in builtin_templates() {
            assert!(
                !t.capabilities.is_empty(),
                "{} grants nothing",
                t.template_key
            );
        }
    }

    #[test]
    fn builtin_capabilities_exist_in_catalog() {
        for t in builtin_templates() {
            for key in t.capabilities.keys() {
                assert!(
                    find_definition(key).is_some(),
                    "{} references unknown capability {}",
                    t.template_key,
                    key
                );
            }
        }
    }

    #[test]
    fn builtin_levels_are_legal_for_their_capability() {
        for t in builtin_templates() {
            for (key, level) in &t.capabilities {
                let def = find_definition(key).unwrap();
                assert!(
                    def.allowed_levels.contains(level),
                    "{} grants {} at {}, which the catalog does not allow",
                    t.template_key,
                    key,
                    level
                );
            }
        }
    }

    #[test]
    fn find_builtin_misses_unknown_keys() {
        assert!(find_builtin("dispatcher").is_some());
        assert!(find_builtin("no_such_template").is_none());
    }

    #[test]
    fn record_conversion_rejects_malformed_maps() {
        let record = RoleTemplateRecord {
            id: uuid::Uuid::new_v4(),
            template_key: "saved.broken.0000".to_string(),
            name: "Broken".to_string(),
            description: None,
            capabilities: serde_json::json!(["not", "a", "map"]),
            source_role_id: None,
            created_at: chrono::Utc::now(),
        };

        assert!(matches!(
            template_from_record(record),
            Err(AuthorizationError::Validation(_))
        ));
    }

    #[test]
    fn record_conversion_parses_level_map() {
        let record = RoleTemplateRecord {
            id: uuid::Uuid::new_v4(),
            template_key: "saved.ops.1111".to_string(),
            name: "Ops".to_string(),
            description: None,
            capabilities: serde_json::json!({"vehicle.view": "full", "driver.view": "view"}),
            source_role_id: None,
            created_at: chrono::Utc::now(),
        };

        let t = template_from_record(record).unwrap();
        assert_eq!(t.capabilities["vehicle.view"], AccessLevel::Full);
        assert_eq!(t.capabilities["driver.view"], AccessLevel::View);
    }
}
