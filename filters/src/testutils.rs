use crate::client::DocumentClient;
use crate::errors::RemoteError;
use crate::types::DashboardId;
use async_trait::async_trait;
use http::StatusCode;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// In-memory dashboards with the same whole-document semantics as the API.
///
/// `read_delay` holds every GET after the snapshot is taken, which widens the
/// read-modify-write window for concurrency tests.
#[derive(Default)]
pub struct MemoryDocumentClient {
    documents: Mutex<HashMap<DashboardId, Option<String>>>,
    read_delay: Option<Duration>,
    put_failure: Mutex<Option<StatusCode>>,
    puts: AtomicUsize,
}

impl MemoryDocumentClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = Some(delay);
        self
    }

    pub fn insert(&self, dashboard_id: DashboardId, metadata: Option<&str>) {
        self.documents
            .lock()
            .unwrap()
            .insert(dashboard_id, metadata.map(String::from));
    }

    pub fn metadata(&self, dashboard_id: DashboardId) -> Option<String> {
        self.documents
            .lock()
            .unwrap()
            .get(&dashboard_id)
            .cloned()
            .flatten()
    }

    /// Makes the next PUT fail with `status` without storing anything.
    pub fn fail_next_put(&self, status: StatusCode) {
        *self.put_failure.lock().unwrap() = Some(status);
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    fn not_found() -> RemoteError {
        RemoteError::Status {
            status: StatusCode::NOT_FOUND,
            body: r#"{"message":"Not found"}"#.into(),
        }
    }
}

#[async_trait]
impl DocumentClient for MemoryDocumentClient {
    async fn get_metadata(&self, dashboard_id: DashboardId) -> Result<Option<String>, RemoteError> {
        let snapshot = self
            .documents
            .lock()
            .unwrap()
            .get(&dashboard_id)
            .cloned()
            .ok_or_else(Self::not_found)?;

        if let Some(delay) = self.read_delay {
            tokio::time::sleep(delay).await;
        }

        Ok(snapshot)
    }

    async fn put_metadata(&self, dashboard_id: DashboardId, metadata: &str) -> Result<(), RemoteError> {
        if let Some(status) = self.put_failure.lock().unwrap().take() {
            return Err(RemoteError::Status {
                status,
                body: "rejected".into(),
            });
        }

        let mut documents = self.documents.lock().unwrap();
        let slot = documents.get_mut(&dashboard_id).ok_or_else(Self::not_found)?;
        *slot = Some(metadata.to_string());
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
