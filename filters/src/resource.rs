//! Declarative lifecycle for dashboard filters.
//!
//! Callers hold the last known state of a filter and converge it towards a
//! desired definition. Each operation goes through the [`FilterEngine`], so
//! writes are serialized with every other filter write of the process.

use crate::engine::FilterEngine;
use crate::equivalence::config_equivalent;
use crate::errors::Result;
use crate::metrics_defs::DRIFT_SUPPRESSED;
use crate::types::{DashboardFilter, DashboardId, FilterDefinition, FilterId};

pub struct FilterResource {
    engine: FilterEngine,
}

impl FilterResource {
    pub fn new(engine: FilterEngine) -> Self {
        FilterResource { engine }
    }

    pub fn engine(&self) -> &FilterEngine {
        &self.engine
    }

    /// Adds a new filter under a freshly generated id.
    pub async fn create(
        &self,
        dashboard_id: DashboardId,
        definition: FilterDefinition,
    ) -> Result<DashboardFilter> {
        let id = FilterId::generate();
        let written = self
            .engine
            .upsert(dashboard_id, &id, Some(definition.clone()))
            .await?;
        Ok(written_filter(written, definition, &id, dashboard_id))
    }

    /// Refreshes `state` from the dashboard.
    ///
    /// Returns `None` when the filter is gone. If the stored config is the
    /// same JSON value as `state.config`, the caller's text is kept so that
    /// reformatting on the server does not show up as a change.
    pub async fn read(&self, state: &DashboardFilter) -> Result<Option<DashboardFilter>> {
        let Some(mut current) = self
            .engine
            .get_by_id(state.dashboard_id, &state.id)
            .await?
        else {
            tracing::debug!(
                dashboard_id = state.dashboard_id,
                filter_id = %state.id,
                "Dashboard filter no longer exists"
            );
            return Ok(None);
        };

        if current.config != state.config && config_equivalent(&state.config, &current.config)? {
            crate::counter!(DRIFT_SUPPRESSED).increment(1);
            current.config = state.config.clone();
        }

        Ok(Some(current))
    }

    /// Rewrites the filter under its existing id.
    ///
    /// When `dashboard_id` differs from the one in `state`, the filter is
    /// written to the new dashboard first and then removed from the old one.
    pub async fn update(
        &self,
        state: &DashboardFilter,
        dashboard_id: DashboardId,
        definition: FilterDefinition,
    ) -> Result<DashboardFilter> {
        let written = self
            .engine
            .upsert(dashboard_id, &state.id, Some(definition.clone()))
            .await?;
        let filter = written_filter(written, definition, &state.id, dashboard_id);

        if state.dashboard_id != dashboard_id {
            tracing::info!(
                filter_id = %state.id,
                from = state.dashboard_id,
                to = dashboard_id,
                "Moving dashboard filter"
            );
            self.engine.upsert(state.dashboard_id, &state.id, None).await?;
        }

        Ok(filter)
    }

    pub async fn delete(&self, state: &DashboardFilter) -> Result<()> {
        self.engine.upsert(state.dashboard_id, &state.id, None).await?;
        Ok(())
    }

    pub async fn list(&self, dashboard_id: DashboardId) -> Result<Vec<DashboardFilter>> {
        self.engine.list(dashboard_id).await
    }
}

/// Picks the filter as it was stored, with `id` stripped and `name` filled in
/// the way a later read sees it.
fn written_filter(
    written: Vec<DashboardFilter>,
    definition: FilterDefinition,
    id: &FilterId,
    dashboard_id: DashboardId,
) -> DashboardFilter {
    written
        .into_iter()
        .rfind(|filter| &filter.id == id)
        .unwrap_or_else(|| definition.into_filter(id.clone(), dashboard_id))
}
