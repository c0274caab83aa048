//! Capability catalog service.
//!
//! Read operations are served from the persisted catalog, which is
//! authoritative at request time; the build-time definition table only
//! reaches the store through [`seed`](CapabilityService::seed).

use sqlx::PgPool;

use fleetgrid_authorization::{seed_catalog, CAPABILITY_DEFINITIONS};
use fleetgrid_db::{Capability, CategorySummary};

use crate::error::{ApiError, ApiResult};
use crate::models::{CapabilityResponse, SeedResponse};

/// Service for browsing and seeding the capability catalog.
pub struct CapabilityService {
    pool: PgPool,
}

impl CapabilityService {
    /// Create a new capability service.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List the full catalog.
    pub async fn list(&self) -> ApiResult<Vec<CapabilityResponse>> {
        let capabilities = Capability::list_all(&self.pool).await?;
        Ok(capabilities.into_iter().map(Into::into).collect())
    }

    /// Summarize categories with capability counts.
    pub async fn categories(&self) -> ApiResult<Vec<CategorySummary>> {
        Ok(Capability::list_categories(&self.pool).await?)
    }

    /// List capabilities within one category.
    pub async fn by_category(&self, category: &str) -> ApiResult<Vec<CapabilityResponse>> {
        let capabilities = Capability::list_by_category(&self.pool, category).await?;
        Ok(capabilities.into_iter().map(Into::into).collect())
    }

    /// Look up one capability by key.
    pub async fn get(&self, key: &str) -> ApiResult<CapabilityResponse> {
        Capability::find_by_key(&self.pool, key)
            .await?
            .map(Into::into)
            .ok_or_else(|| ApiError::NotFound(format!("Capability not found: {key}")))
    }

    /// Case-insensitive substring search over key, name, and description.
    pub async fn search(&self, keyword: &str) -> ApiResult<Vec<CapabilityResponse>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(ApiError::Validation(
                "Search keyword cannot be empty".to_string(),
            ));
        }

        let capabilities = Capability::search(&self.pool, keyword).await?;
        Ok(capabilities.into_iter().map(Into::into).collect())
    }

    /// Seed the persisted catalog from the build-time definitions.
    ///
    /// Idempotent: existing rows are never touched.
    pub async fn seed(&self) -> ApiResult<SeedResponse> {
        let inserted = seed_catalog(&self.pool).await?;

        Ok(SeedResponse {
            inserted,
            total_defined: CAPABILITY_DEFINITIONS.len(),
        })
    }
}
