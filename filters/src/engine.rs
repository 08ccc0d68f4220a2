//! Read-modify-write of native filters inside dashboard metadata.
//!
//! A dashboard's filters all live in one JSON string, and the API can only
//! replace that string as a whole. Two upserts that interleave their GET and
//! PUT would silently drop one another's change, so every upsert runs under a
//! single [`UpsertLock`] from the GET until the PUT has completed, whichever
//! dashboard it targets.
//!
//! The lock only covers one process. Separate processes editing the same
//! dashboards can still lose updates.

use crate::client::DocumentClient;
use crate::errors::{FilterError, Result};
use crate::metrics_defs::{LOCK_WAIT_DURATION, UPSERT_DURATION, UPSERT_FAILED};
use crate::projector::{self, Projection};
use crate::types::{DashboardFilter, DashboardId, FilterDefinition, FilterId};
use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};
use tokio::sync::{AcquireError, Semaphore, SemaphorePermit};

/// Exclusive access to dashboard metadata writes.
///
/// Clones share the same lock. Engines built from independent locks do not
/// exclude each other.
#[derive(Clone)]
pub struct UpsertLock(Arc<Semaphore>);

impl UpsertLock {
    pub fn new() -> Self {
        UpsertLock(Arc::new(Semaphore::new(1)))
    }

    /// The lock shared by every caller in this process that asks for it.
    pub fn process_wide() -> Self {
        static PROCESS_LOCK: LazyLock<UpsertLock> = LazyLock::new(UpsertLock::new);
        PROCESS_LOCK.clone()
    }

    /// Guard that ensures only one upsert is in progress at a time.
    async fn acquire(&self) -> Result<SemaphorePermit<'_>, AcquireError> {
        self.0.acquire().await
    }
}

impl Default for UpsertLock {
    fn default() -> Self {
        Self::new()
    }
}

pub struct FilterEngine {
    client: Arc<dyn DocumentClient>,
    lock: UpsertLock,
    deadline: Option<Duration>,
}

impl FilterEngine {
    pub fn new(client: Arc<dyn DocumentClient>, lock: UpsertLock) -> Self {
        FilterEngine {
            client,
            lock,
            deadline: None,
        }
    }

    /// Bounds every call, lock wait included. A call that runs out of time
    /// fails with [`FilterError::Timeout`] and releases the lock.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Writes `definition` as the filter `filter_id` of the dashboard, or
    /// removes that filter when `definition` is `None`.
    ///
    /// The filter is appended after the dashboard's other filters. Returns the
    /// dashboard's full filter collection as written.
    pub async fn upsert(
        &self,
        dashboard_id: DashboardId,
        filter_id: &FilterId,
        definition: Option<FilterDefinition>,
    ) -> Result<Vec<DashboardFilter>> {
        let action = if definition.is_some() { "put" } else { "remove" };
        let start = Instant::now();

        let result = self
            .bounded(self.locked_upsert(dashboard_id, filter_id, definition))
            .await;

        crate::histogram!(UPSERT_DURATION, "action" => action).record(start.elapsed().as_secs_f64());

        match &result {
            Ok(filters) => tracing::info!(
                dashboard_id,
                filter_id = %filter_id,
                action,
                filters = filters.len(),
                "Upserted dashboard filter"
            ),
            Err(e) => {
                crate::counter!(UPSERT_FAILED, "reason" => e.kind()).increment(1);
                tracing::warn!(
                    dashboard_id,
                    filter_id = %filter_id,
                    action,
                    error = %e,
                    "Dashboard filter upsert failed"
                );
            }
        }

        result
    }

    async fn locked_upsert(
        &self,
        dashboard_id: DashboardId,
        filter_id: &FilterId,
        definition: Option<FilterDefinition>,
    ) -> Result<Vec<DashboardFilter>> {
        let wait_start = Instant::now();
        // Held until the PUT has returned, on every exit path
        let _permit = self.lock.acquire().await?;
        let waited = wait_start.elapsed();
        crate::histogram!(LOCK_WAIT_DURATION).record(waited.as_secs_f64());
        tracing::debug!(dashboard_id, waited_ms = waited.as_millis() as u64, "Acquired upsert lock");

        let metadata = self.client.get_metadata(dashboard_id).await?;
        let Projection { mut filters, tree } =
            projector::extract_metadata(dashboard_id, metadata.as_deref())?;

        filters.retain(|filter| &filter.id != filter_id);
        if let Some(definition) = definition {
            filters.push(definition.into_filter(filter_id.clone(), dashboard_id));
        }

        let tree = projector::inject(tree, &filters)?;
        let text = tree.serialize();
        // What was written, as a later read would see it
        let written = projector::extract(dashboard_id, tree)?;
        self.client.put_metadata(dashboard_id, &text).await?;

        Ok(written.filters)
    }

    /// Current filters of a dashboard. Reads do not take the upsert lock.
    pub async fn list(&self, dashboard_id: DashboardId) -> Result<Vec<DashboardFilter>> {
        self.bounded(async {
            let metadata = self.client.get_metadata(dashboard_id).await?;
            let projection = projector::extract_metadata(dashboard_id, metadata.as_deref())?;
            Ok(projection.filters)
        })
        .await
    }

    /// Looks up one filter. `None` means the dashboard no longer has it.
    pub async fn get_by_id(
        &self,
        dashboard_id: DashboardId,
        filter_id: &FilterId,
    ) -> Result<Option<DashboardFilter>> {
        let filters = self.list(dashboard_id).await?;
        Ok(filters.into_iter().find(|filter| &filter.id == filter_id))
    }

    async fn bounded<T>(&self, operation: impl Future<Output = Result<T>>) -> Result<T> {
        match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, operation)
                .await
                .map_err(|_| FilterError::Timeout(deadline))?,
            None => operation.await,
        }
    }
}
