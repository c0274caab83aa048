//! DTOs for template registry endpoints.

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use fleetgrid_authorization::templates::find_builtin;
use fleetgrid_authorization::Template;
use fleetgrid_db::AccessLevel;

/// A template as exposed by the registry endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TemplateResponse {
    /// Stable template key.
    pub template_key: String,

    /// Display name.
    pub name: String,

    /// Description.
    pub description: Option<String>,

    /// Capability key to access level.
    pub capabilities: BTreeMap<String, AccessLevel>,

    /// True for the build-time set; false for promoted snapshots.
    pub is_builtin: bool,
}

impl From<Template> for TemplateResponse {
    fn from(t: Template) -> Self {
        let is_builtin = find_builtin(&t.template_key).is_some();
        Self {
            template_key: t.template_key,
            name: t.name,
            description: t.description,
            capabilities: t.capabilities,
            is_builtin,
        }
    }
}

/// Listing of all templates.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TemplateListResponse {
    /// Built-in templates followed by promoted snapshots.
    pub items: Vec<TemplateResponse>,

    /// Total count.
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_flag_follows_registry() {
        let builtin = fleetgrid_authorization::builtin_templates()[0].clone();
        let response = TemplateResponse::from(builtin);
        assert!(response.is_builtin);

        let promoted = Template {
            template_key: "saved.ops.1234".to_string(),
            name: "Ops".to_string(),
            description: None,
            capabilities: BTreeMap::new(),
        };
        let response = TemplateResponse::from(promoted);
        assert!(!response.is_builtin);
    }
}
