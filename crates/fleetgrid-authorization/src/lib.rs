//! fleetgrid Authorization Engine
//!
//! Capability-based, multi-tenant authorization:
//!
//! - [`catalog`] - build-time capability definitions and idempotent seeding
//! - [`templates`] - immutable capability bundles for composing custom roles
//! - [`merge`] - pure template merge and customization-overlay functions
//! - [`grants`] - validated write path for role capability grants
//! - [`evaluator`] - the fail-closed evaluation hot path
//!
//! Role assignment itself lives in the identity layer; the engine reads the
//! `user_organizations` mapping and answers allow/deny against the grant
//! store.

pub mod catalog;
pub mod error;
pub mod evaluator;
pub mod grants;
pub mod merge;
pub mod templates;

pub use catalog::{seed_catalog, CapabilityDef, CAPABILITY_DEFINITIONS};
pub use error::AuthorizationError;
pub use evaluator::{AccessDecision, AccessEvaluator, DecisionSource, EffectiveCapability, BYPASS_ROLE_KEYS};
pub use grants::{write_grant_set, BulkGrantFailure, BulkGrantOutcome, GrantEntry, GrantService};
pub use merge::{apply_customizations, merge_templates, CapabilityOverride, MergeStrategy};
pub use templates::{builtin_templates, resolve_template, Template};
